use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::money::{checked_add, checked_mul, checked_sum, percent_of};
use crate::pricing::models::{
    CostBreakdown, LineCost, LineInput, PaymentFeeBase, PricingInputs, PricingPolicy,
};
use crate::units::{conversion_factor, ConversionPolicy};
use crate::warnings::PricingWarnings;

/// Runs the fixed pricing chain:
/// ingredients -> waste/overhead -> packaging -> margin -> delivery -> payment fee.
#[derive(Debug, Clone, Copy, Default)]
pub struct CostEngine {
    policy: PricingPolicy,
}

impl CostEngine {
    pub fn new(policy: PricingPolicy) -> Self {
        Self { policy }
    }

    /// Cost one line in the ingredient's catalog unit
    pub fn line_cost(
        &self,
        line: &LineInput,
        warnings: &mut PricingWarnings,
    ) -> Result<LineCost, AppError> {
        let catalog_unit = line.ingredient.unit;
        let factor = match conversion_factor(line.unit, catalog_unit) {
            Some(factor) => factor,
            None => match self.policy.conversion {
                ConversionPolicy::Strict => {
                    return Err(AppError::UnitConversion {
                        ingredient: line.ingredient.name.clone(),
                        from: line.unit.to_string(),
                        to: catalog_unit.to_string(),
                    })
                }
                ConversionPolicy::Lenient => {
                    warn!(
                        ingredient = %line.ingredient.name,
                        from = %line.unit,
                        to = %catalog_unit,
                        "No unit conversion, assuming 1:1"
                    );
                    warnings.add_unit_fallback(&line.ingredient.name, line.unit, catalog_unit);
                    Decimal::ONE
                }
            },
        };

        let what = format!("cost of {}", line.ingredient.name);
        let cost = checked_mul(
            checked_mul(line.quantity, factor, &what)?,
            line.ingredient.unit_price,
            &what,
        )?;
        debug!(ingredient = %line.ingredient.name, %cost, "Line cost");

        Ok(LineCost {
            ingredient: line.ingredient.name.clone(),
            quantity: line.quantity,
            unit: line.unit,
            catalog_unit,
            factor,
            unit_price: line.ingredient.unit_price,
            cost,
        })
    }

    pub fn compute(&self, inputs: &PricingInputs) -> Result<CostBreakdown, AppError> {
        let mut warnings = PricingWarnings::new();

        let lines = inputs
            .lines
            .iter()
            .map(|line| self.line_cost(line, &mut warnings))
            .collect::<Result<Vec<_>, _>>()?;

        let ingredients_total = checked_sum(lines.iter().map(|l| l.cost), "ingredients total")?;
        let waste = percent_of(ingredients_total, inputs.waste_pct)?;
        let overhead = percent_of(ingredients_total, inputs.overhead_pct)?;
        let production_cost = checked_sum(
            [ingredients_total, waste, overhead, inputs.packaging_fee],
            "production cost",
        )?;

        let cmv = if self.policy.packaging_in_cmv {
            checked_sum([ingredients_total, waste, inputs.packaging_fee], "CMV")?
        } else {
            checked_add(ingredients_total, waste, "CMV")?
        };

        let profit = percent_of(production_cost, inputs.margin_pct)?;
        let sale_price = checked_add(production_cost, profit, "sale price")?;

        let delivery_fee = inputs.delivery.fee(inputs.distance_km)?;
        let payment_fee = payment_fee(
            self.policy.payment_fee_base,
            sale_price,
            delivery_fee,
            inputs.payment.fee_pct,
        )?;
        let final_price = checked_sum([sale_price, delivery_fee, payment_fee], "final price")?;

        Ok(CostBreakdown {
            lines,
            ingredients_total,
            waste_pct: inputs.waste_pct,
            waste,
            overhead_pct: inputs.overhead_pct,
            overhead,
            packaging_fee: inputs.packaging_fee,
            production_cost,
            cmv,
            margin_pct: inputs.margin_pct,
            profit,
            sale_price,
            distance_km: inputs.distance_km,
            delivery_fee,
            payment_method: inputs.payment.name.clone(),
            payment_fee_pct: inputs.payment.fee_pct,
            payment_fee,
            final_price,
            policy: self.policy,
            warnings,
        })
    }
}

/// Processor fee over `sale` (and `delivery`, depending on `base`)
pub fn payment_fee(
    base: PaymentFeeBase,
    sale: Decimal,
    delivery: Decimal,
    pct: Decimal,
) -> Result<Decimal, AppError> {
    if pct.is_zero() {
        return Ok(Decimal::ZERO);
    }
    match base {
        PaymentFeeBase::SaleAndDelivery => {
            percent_of(checked_add(sale, delivery, "payment fee base")?, pct)
        }
        PaymentFeeBase::SaleOnly => percent_of(sale, pct),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Ingredient;
    use crate::delivery::DeliveryRates;
    use crate::money::round_money;
    use crate::payment::PaymentMethod;
    use crate::units::Unit;
    use rust_decimal_macros::dec;

    fn ingredient(name: &str, unit: Unit, price: Decimal) -> Ingredient {
        Ingredient {
            name: name.to_string(),
            unit,
            unit_price: price,
        }
    }

    fn inputs(lines: Vec<LineInput>) -> PricingInputs {
        PricingInputs {
            lines,
            waste_pct: Decimal::ZERO,
            overhead_pct: Decimal::ZERO,
            packaging_fee: Decimal::ZERO,
            margin_pct: Decimal::ZERO,
            distance_km: Decimal::ZERO,
            delivery: DeliveryRates::default(),
            payment: PaymentMethod {
                name: "pix".to_string(),
                fee_pct: Decimal::ZERO,
            },
        }
    }

    #[test]
    fn test_line_cost_converts_grams_to_kilograms() {
        let engine = CostEngine::default();
        let line = LineInput {
            ingredient: ingredient("Chocolate", Unit::Kilogram, dec!(10)),
            quantity: dec!(500),
            unit: Unit::Gram,
        };

        let cost = engine.line_cost(&line, &mut PricingWarnings::new()).unwrap();
        assert_eq!(cost.factor, dec!(0.001));
        assert_eq!(cost.cost, dec!(5.00));
    }

    #[test]
    fn test_line_cost_converts_liters_to_milliliters() {
        let engine = CostEngine::default();
        let line = LineInput {
            ingredient: ingredient("Creme de Leite", Unit::Milliliter, dec!(0.02)),
            quantity: dec!(1.5),
            unit: Unit::Liter,
        };

        let cost = engine.line_cost(&line, &mut PricingWarnings::new()).unwrap();
        assert_eq!(cost.cost, dec!(30.00));
    }

    #[test]
    fn test_strict_policy_rejects_unmapped_pair() {
        let engine = CostEngine::default();
        let line = LineInput {
            ingredient: ingredient("Ovos", Unit::Each, dec!(0.8)),
            quantity: dec!(100),
            unit: Unit::Gram,
        };

        let err = engine.line_cost(&line, &mut PricingWarnings::new()).unwrap_err();
        assert!(matches!(err, AppError::UnitConversion { .. }));
    }

    #[test]
    fn test_lenient_policy_falls_back_and_warns() {
        let engine = CostEngine::new(PricingPolicy {
            conversion: ConversionPolicy::Lenient,
            ..PricingPolicy::default()
        });
        let result = engine
            .compute(&inputs(vec![LineInput {
                ingredient: ingredient("Ovos", Unit::Each, dec!(0.8)),
                quantity: dec!(3),
                unit: Unit::Gram,
            }]))
            .unwrap();

        assert_eq!(result.lines[0].factor, Decimal::ONE);
        assert_eq!(result.ingredients_total, dec!(2.4));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_full_chain() {
        let engine = CostEngine::default();
        let mut inputs = inputs(vec![LineInput {
            ingredient: ingredient("Chocolate", Unit::Kilogram, dec!(50)),
            quantity: dec!(1),
            unit: Unit::Kilogram,
        }]);
        inputs.waste_pct = dec!(5);
        inputs.overhead_pct = dec!(30);
        inputs.packaging_fee = dec!(8.67);
        inputs.margin_pct = dec!(150);
        inputs.distance_km = dec!(10);
        inputs.delivery = DeliveryRates::new(dec!(5), dec!(2));
        inputs.payment = PaymentMethod {
            name: "credito".to_string(),
            fee_pct: dec!(4.99),
        };

        let b = engine.compute(&inputs).unwrap();
        assert_eq!(b.ingredients_total, dec!(50.00));
        assert_eq!(b.waste, dec!(2.50));
        assert_eq!(b.overhead, dec!(15.00));
        assert_eq!(b.production_cost, dec!(76.17));
        assert_eq!(b.cmv, dec!(61.17));
        assert_eq!(b.profit, dec!(114.255));
        assert_eq!(b.sale_price, dec!(190.425));
        assert_eq!(b.delivery_fee, dec!(10.00));
        assert_eq!(round_money(b.payment_fee), dec!(10.00));
        assert_eq!(round_money(b.final_price), dec!(210.43));
        assert_eq!(b.formatted().final_price, "R$ 210.43");
    }

    #[test]
    fn test_cmv_without_packaging() {
        let engine = CostEngine::new(PricingPolicy {
            packaging_in_cmv: false,
            ..PricingPolicy::default()
        });
        let mut inputs = inputs(vec![LineInput {
            ingredient: ingredient("Farinha", Unit::Kilogram, dec!(6)),
            quantity: dec!(1),
            unit: Unit::Kilogram,
        }]);
        inputs.packaging_fee = dec!(2);

        let b = engine.compute(&inputs).unwrap();
        assert_eq!(b.cmv, dec!(6));
        assert_eq!(b.production_cost, dec!(8));
    }

    #[test]
    fn test_payment_fee_bases() {
        assert_eq!(
            payment_fee(PaymentFeeBase::SaleAndDelivery, dec!(100), dec!(10), dec!(10)).unwrap(),
            dec!(11)
        );
        assert_eq!(
            payment_fee(PaymentFeeBase::SaleOnly, dec!(100), dec!(10), dec!(10)).unwrap(),
            dec!(10)
        );
        assert_eq!(
            payment_fee(PaymentFeeBase::SaleAndDelivery, dec!(100), dec!(10), Decimal::ZERO)
                .unwrap(),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_empty_recipe_prices_packaging_only() {
        let engine = CostEngine::default();
        let mut inputs = inputs(vec![]);
        inputs.packaging_fee = dec!(3);
        inputs.margin_pct = dec!(100);

        let b = engine.compute(&inputs).unwrap();
        assert_eq!(b.ingredients_total, Decimal::ZERO);
        assert_eq!(b.sale_price, dec!(6));
    }

    #[test]
    fn test_huge_quantity_is_rejected_not_panicking() {
        let engine = CostEngine::default();
        let line = LineInput {
            ingredient: ingredient("Chocolate", Unit::Gram, dec!(0.05)),
            quantity: Decimal::MAX,
            unit: Unit::Kilogram,
        };

        let err = engine.line_cost(&line, &mut PricingWarnings::new()).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(ref msg) if msg.contains("Chocolate")));

        let err = engine.compute(&inputs(vec![line])).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_margin_overflow_is_rejected() {
        let engine = CostEngine::default();
        let mut inputs = inputs(vec![LineInput {
            ingredient: ingredient("Ouro", Unit::Kilogram, Decimal::MAX / dec!(2)),
            quantity: dec!(1),
            unit: Unit::Kilogram,
        }]);
        inputs.margin_pct = dec!(150);

        assert!(matches!(
            engine.compute(&inputs),
            Err(AppError::ValidationError(_))
        ));
    }
}
