//! Request-scoped pricing form.
//!
//! A `PriceForm` carries everything one person typed into one pricing
//! session. Empty fields fall back to the configured defaults; nothing here
//! is shared between requests.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::delivery::DeliveryRates;
use crate::error::AppError;
use crate::payment::PaymentMethods;
use crate::pricing::{LineInput, PaymentFeeBase, PricingInputs, PricingPolicy};
use crate::recipe::{validate_lines, RecipeLine};
use crate::units::ConversionPolicy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceForm {
    pub product_name: String,
    pub items: Vec<RecipeLine>,
    pub waste_pct: Option<Decimal>,
    pub overhead_pct: Option<Decimal>,
    pub packaging_fee: Option<Decimal>,
    pub margin_pct: Option<Decimal>,
    pub distance_km: Option<Decimal>,
    pub payment_method: Option<String>,
    pub rates: RateOverrides,
}

/// Session-only overrides of the configured rates and policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateOverrides {
    pub free_km: Option<Decimal>,
    pub per_km_rate: Option<Decimal>,
    pub payment_fee_pct: Option<Decimal>,
    pub conversion: Option<ConversionPolicy>,
    pub payment_fee_base: Option<PaymentFeeBase>,
}

fn reject_negative(fields: &[(&str, Option<Decimal>)]) -> Result<(), AppError> {
    for (name, value) in fields {
        if let Some(v) = value {
            if *v < Decimal::ZERO {
                return Err(AppError::ValidationError(format!(
                    "{} cannot be negative (got {})",
                    name, v
                )));
            }
        }
    }
    Ok(())
}

impl RateOverrides {
    pub fn validate(&self) -> Result<(), AppError> {
        reject_negative(&[
            ("free_km", self.free_km),
            ("per_km_rate", self.per_km_rate),
            ("payment_fee_pct", self.payment_fee_pct),
        ])
    }
}

impl PriceForm {
    /// Same form with `other`'s non-empty pricing fields laid over it.
    /// Line items and product name are kept from `self`.
    pub fn with_overrides(mut self, other: &PriceForm) -> Self {
        fn pick<T: Clone>(base: &mut Option<T>, over: &Option<T>) {
            if over.is_some() {
                *base = over.clone();
            }
        }

        pick(&mut self.waste_pct, &other.waste_pct);
        pick(&mut self.overhead_pct, &other.overhead_pct);
        pick(&mut self.packaging_fee, &other.packaging_fee);
        pick(&mut self.margin_pct, &other.margin_pct);
        pick(&mut self.distance_km, &other.distance_km);
        pick(&mut self.payment_method, &other.payment_method);
        pick(&mut self.rates.free_km, &other.rates.free_km);
        pick(&mut self.rates.per_km_rate, &other.rates.per_km_rate);
        pick(&mut self.rates.payment_fee_pct, &other.rates.payment_fee_pct);
        pick(&mut self.rates.conversion, &other.rates.conversion);
        pick(&mut self.rates.payment_fee_base, &other.rates.payment_fee_base);
        self
    }

    pub fn validate(&self) -> Result<(), AppError> {
        validate_lines(&self.items)?;
        reject_negative(&[
            ("waste_pct", self.waste_pct),
            ("overhead_pct", self.overhead_pct),
            ("packaging_fee", self.packaging_fee),
            ("margin_pct", self.margin_pct),
            ("distance_km", self.distance_km),
        ])?;
        self.rates.validate()
    }

    /// Policy for this session: configured policy with the form's overrides
    pub fn policy(&self, config: &Config) -> PricingPolicy {
        let mut policy = PricingPolicy::from_config(&config.pricing);
        if let Some(conversion) = self.rates.conversion {
            policy.conversion = conversion;
        }
        if let Some(base) = self.rates.payment_fee_base {
            policy.payment_fee_base = base;
        }
        policy
    }

    /// Resolve ingredient names against the catalog and fill defaults
    pub fn resolve(&self, catalog: &Catalog, config: &Config) -> Result<PricingInputs, AppError> {
        self.validate()?;

        let lines = self
            .items
            .iter()
            .map(|item| {
                let ingredient = catalog
                    .get(&item.ingredient)
                    .cloned()
                    .ok_or_else(|| AppError::IngredientNotFound(item.ingredient.trim().to_string()))?;
                Ok(LineInput {
                    ingredient,
                    quantity: item.quantity,
                    unit: item.unit,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let defaults = &config.defaults;
        let delivery = DeliveryRates::new(
            self.rates.free_km.unwrap_or(config.delivery.free_km),
            self.rates.per_km_rate.unwrap_or(config.delivery.per_km_rate),
        );
        let payment = PaymentMethods::from_config(&config.payment)
            .resolve(self.payment_method.as_deref(), self.rates.payment_fee_pct)?;

        Ok(PricingInputs {
            lines,
            waste_pct: self.waste_pct.unwrap_or(defaults.waste_pct),
            overhead_pct: self.overhead_pct.unwrap_or(defaults.overhead_pct),
            packaging_fee: self.packaging_fee.unwrap_or(defaults.packaging_fee),
            margin_pct: self.margin_pct.unwrap_or(defaults.margin_pct),
            distance_km: self.distance_km.unwrap_or(Decimal::ZERO),
            delivery,
            payment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Ingredient;
    use crate::units::Unit;
    use rust_decimal_macros::dec;

    fn catalog() -> Catalog {
        Catalog::new(vec![Ingredient {
            name: "Chocolate ao Leite".to_string(),
            unit: Unit::Kilogram,
            unit_price: dec!(40),
        }])
    }

    fn config() -> Config {
        let mut cfg = Config::default();
        cfg.defaults.waste_pct = dec!(5);
        cfg.defaults.margin_pct = dec!(150);
        cfg.delivery.free_km = dec!(5);
        cfg.delivery.per_km_rate = dec!(2);
        cfg
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let form = PriceForm {
            product_name: "Ovo de Colher".to_string(),
            items: vec![RecipeLine {
                ingredient: " chocolate ao leite".to_string(),
                quantity: dec!(250),
                unit: Unit::Gram,
            }],
            ..PriceForm::default()
        };

        let inputs = form.resolve(&catalog(), &config()).unwrap();
        assert_eq!(inputs.lines.len(), 1);
        assert_eq!(inputs.lines[0].ingredient.name, "Chocolate ao Leite");
        assert_eq!(inputs.waste_pct, dec!(5));
        assert_eq!(inputs.overhead_pct, Decimal::ZERO);
        assert_eq!(inputs.margin_pct, dec!(150));
        assert_eq!(inputs.delivery.free_km, dec!(5));
        assert_eq!(inputs.payment.name, "pix");
    }

    #[test]
    fn test_form_values_win_over_defaults() {
        let form = PriceForm {
            margin_pct: Some(dec!(80)),
            payment_method: Some("credito".to_string()),
            rates: RateOverrides {
                per_km_rate: Some(dec!(3)),
                ..RateOverrides::default()
            },
            ..PriceForm::default()
        };

        let inputs = form.resolve(&catalog(), &config()).unwrap();
        assert_eq!(inputs.margin_pct, dec!(80));
        assert_eq!(inputs.delivery.per_km_rate, dec!(3));
        assert_eq!(inputs.payment.fee_pct, dec!(4.99));
    }

    #[test]
    fn test_unknown_ingredient() {
        let form = PriceForm {
            items: vec![RecipeLine {
                ingredient: "Pistache".to_string(),
                quantity: dec!(1),
                unit: Unit::Kilogram,
            }],
            ..PriceForm::default()
        };

        let err = form.resolve(&catalog(), &config()).unwrap_err();
        assert!(matches!(err, AppError::IngredientNotFound(n) if n == "Pistache"));
    }

    #[test]
    fn test_negative_values_rejected() {
        let form = PriceForm {
            distance_km: Some(dec!(-2)),
            ..PriceForm::default()
        };
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("distance_km"));

        let form = PriceForm {
            rates: RateOverrides {
                per_km_rate: Some(dec!(-5)),
                ..RateOverrides::default()
            },
            ..PriceForm::default()
        };
        let err = form.validate().unwrap_err();
        assert!(err.to_string().contains("per_km_rate"));
    }

    #[test]
    fn test_with_overrides_keeps_items() {
        let base = PriceForm {
            product_name: "Bolo".to_string(),
            items: vec![RecipeLine {
                ingredient: "Chocolate ao Leite".to_string(),
                quantity: dec!(1),
                unit: Unit::Kilogram,
            }],
            margin_pct: Some(dec!(100)),
            ..PriceForm::default()
        };
        let over = PriceForm {
            margin_pct: Some(dec!(120)),
            waste_pct: Some(dec!(3)),
            ..PriceForm::default()
        };

        let merged = base.with_overrides(&over);
        assert_eq!(merged.items.len(), 1);
        assert_eq!(merged.product_name, "Bolo");
        assert_eq!(merged.margin_pct, Some(dec!(120)));
        assert_eq!(merged.waste_pct, Some(dec!(3)));
    }

    #[test]
    fn test_policy_overrides() {
        let form = PriceForm {
            rates: RateOverrides {
                conversion: Some(ConversionPolicy::Lenient),
                ..RateOverrides::default()
            },
            ..PriceForm::default()
        };
        let policy = form.policy(&config());
        assert_eq!(policy.conversion, ConversionPolicy::Lenient);
        assert_eq!(policy.payment_fee_base, PaymentFeeBase::SaleAndDelivery);
    }

    #[test]
    fn test_deserialize_partial_form() {
        let form: PriceForm = serde_json::from_str(
            r#"{"product_name": "Trufa", "items": [{"ingredient": "Chocolate ao Leite", "quantity": "20", "unit": "g"}], "margin_pct": 150}"#,
        )
        .unwrap();
        assert_eq!(form.items[0].quantity, dec!(20));
        assert_eq!(form.margin_pct, Some(dec!(150)));
        assert!(form.waste_pct.is_none());
    }
}
