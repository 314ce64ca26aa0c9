//! Multi-item customer quotes.
//!
//! Items carry their own unit price; delivery and the payment fee are charged
//! once for the whole quote.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::delivery::DeliveryRates;
use crate::error::AppError;
use crate::form::RateOverrides;
use crate::money::{checked_add, checked_mul, checked_sum};
use crate::payment::{PaymentMethod, PaymentMethods};
use crate::pricing::{payment_fee, PaymentFeeBase};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub product: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl QuoteItem {
    /// Line value for display. Totals go through [`QuoteItem::checked_subtotal`].
    pub fn subtotal(&self) -> Decimal {
        self.quantity.saturating_mul(self.unit_price)
    }

    pub fn checked_subtotal(&self) -> Result<Decimal, AppError> {
        checked_mul(
            self.quantity,
            self.unit_price,
            &format!("subtotal of '{}'", self.product),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "today")]
    pub date: NaiveDate,
    #[serde(default)]
    pub items: Vec<QuoteItem>,
    #[serde(default)]
    pub distance_km: Decimal,
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Flat packaging surcharge for the whole order
    #[serde(default)]
    pub packaging_fee: Decimal,
    #[serde(default)]
    pub rates: RateOverrides,
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl Default for Quote {
    fn default() -> Self {
        Self::new("", "", today())
    }
}

impl Quote {
    pub fn new(client_name: impl Into<String>, phone: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            client_name: client_name.into(),
            phone: phone.into(),
            date,
            items: Vec::new(),
            distance_km: Decimal::ZERO,
            payment_method: None,
            packaging_fee: Decimal::ZERO,
            rates: RateOverrides::default(),
        }
    }

    pub fn add_item(
        &mut self,
        product: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<&QuoteItem, AppError> {
        let product = product.into().trim().to_string();
        if product.is_empty() {
            return Err(AppError::ValidationError(
                "product name cannot be empty".to_string(),
            ));
        }
        if quantity <= Decimal::ZERO {
            return Err(AppError::ValidationError(format!(
                "quantity for '{}' must be positive",
                product
            )));
        }
        if unit_price < Decimal::ZERO {
            return Err(AppError::ValidationError(format!(
                "unit price for '{}' cannot be negative",
                product
            )));
        }

        self.items.push(QuoteItem {
            product,
            quantity,
            unit_price,
        });
        Ok(&self.items[self.items.len() - 1])
    }

    /// Remove exactly the item at `index`; the rest keep their order
    pub fn remove_item(&mut self, index: usize) -> Result<QuoteItem, AppError> {
        if index >= self.items.len() {
            return Err(AppError::QuoteItemOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn items_subtotal(&self) -> Result<Decimal, AppError> {
        let subtotals = self
            .items
            .iter()
            .map(QuoteItem::checked_subtotal)
            .collect::<Result<Vec<_>, _>>()?;
        checked_sum(subtotals, "items subtotal")
    }

    /// Comma-separated product names, used as the history "product" column
    pub fn product_summary(&self) -> String {
        self.items
            .iter()
            .map(|i| i.product.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.distance_km < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "distance_km cannot be negative".to_string(),
            ));
        }
        if self.packaging_fee < Decimal::ZERO {
            return Err(AppError::ValidationError(
                "packaging_fee cannot be negative".to_string(),
            ));
        }
        self.rates.validate()?;
        for item in &self.items {
            if item.quantity <= Decimal::ZERO || item.unit_price < Decimal::ZERO {
                return Err(AppError::ValidationError(format!(
                    "item '{}' has an invalid quantity or price",
                    item.product
                )));
            }
        }
        self.items_subtotal()?;
        Ok(())
    }

    /// Checks that must pass before a quote is written to history
    pub fn validate_for_save(&self) -> Result<(), AppError> {
        self.validate()?;
        if self.client_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "client name cannot be empty".to_string(),
            ));
        }
        if self.items.is_empty() {
            return Err(AppError::ValidationError("quote has no items".to_string()));
        }
        Ok(())
    }

    /// Delivery rates, payment method and fee base for this quote
    pub fn resolve_rates(
        &self,
        config: &Config,
    ) -> Result<(DeliveryRates, PaymentMethod, PaymentFeeBase), AppError> {
        let delivery = DeliveryRates::new(
            self.rates.free_km.unwrap_or(config.delivery.free_km),
            self.rates.per_km_rate.unwrap_or(config.delivery.per_km_rate),
        );
        let payment = PaymentMethods::from_config(&config.payment)
            .resolve(self.payment_method.as_deref(), self.rates.payment_fee_pct)?;
        let base = self
            .rates
            .payment_fee_base
            .unwrap_or(config.pricing.payment_fee_base);
        Ok((delivery, payment, base))
    }

    pub fn totals(
        &self,
        delivery: &DeliveryRates,
        payment: &PaymentMethod,
        base: PaymentFeeBase,
    ) -> Result<QuoteTotals, AppError> {
        let items_subtotal = self.items_subtotal()?;
        let goods = checked_add(items_subtotal, self.packaging_fee, "quote subtotal")?;
        let delivery_fee = delivery.fee(self.distance_km)?;
        let fee = payment_fee(base, goods, delivery_fee, payment.fee_pct)?;
        let total = checked_sum([goods, delivery_fee, fee], "quote total")?;

        Ok(QuoteTotals {
            items_subtotal,
            packaging_fee: self.packaging_fee,
            delivery_fee,
            payment_method: payment.name.clone(),
            payment_fee_pct: payment.fee_pct,
            payment_fee: fee,
            total,
        })
    }

    pub fn to_record(&self, totals: &QuoteTotals) -> QuoteRecord {
        QuoteRecord {
            id: Uuid::new_v4(),
            date: self.date,
            client: self.client_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            products: self.product_summary(),
            total: totals.total,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub items_subtotal: Decimal,
    pub packaging_fee: Decimal,
    pub delivery_fee: Decimal,
    pub payment_method: String,
    pub payment_fee_pct: Decimal,
    pub payment_fee: Decimal,
    pub total: Decimal,
}

/// One row of quote history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: Uuid,
    pub date: NaiveDate,
    pub client: String,
    pub phone: String,
    pub products: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}
