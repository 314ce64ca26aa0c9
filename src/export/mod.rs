pub mod pdf;
pub mod text;

pub use pdf::quote_pdf;
pub use text::{breakdown_text, quote_text};
