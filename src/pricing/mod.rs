pub mod engine;
pub mod models;
pub mod service;

pub use engine::{payment_fee, CostEngine};
pub use models::{
    CostBreakdown, FormattedBreakdown, LineCost, LineInput, PaymentFeeBase, PricingInputs,
    PricingPolicy,
};
pub use service::{PricedForm, PricingService, QuotePreview};
