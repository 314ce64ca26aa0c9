use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Ingredient;
use crate::config::PricingPolicyConfig;
use crate::delivery::DeliveryRates;
use crate::money::format_brl;
use crate::payment::PaymentMethod;
use crate::units::{ConversionPolicy, Unit};
use crate::warnings::PricingWarnings;

/// Amount the payment-processor fee is charged on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFeeBase {
    /// Fee on sale price plus delivery
    #[default]
    SaleAndDelivery,
    /// Fee on the sale price alone, delivery added afterwards
    SaleOnly,
}

/// Named switches for the points where pricing variants disagree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub conversion: ConversionPolicy,
    pub payment_fee_base: PaymentFeeBase,
    pub packaging_in_cmv: bool,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::from_config(&PricingPolicyConfig::default())
    }
}

impl PricingPolicy {
    pub fn from_config(cfg: &PricingPolicyConfig) -> Self {
        Self {
            conversion: cfg.conversion,
            payment_fee_base: cfg.payment_fee_base,
            packaging_in_cmv: cfg.packaging_in_cmv,
        }
    }
}

/// A recipe line resolved against the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct LineInput {
    pub ingredient: Ingredient,
    pub quantity: Decimal,
    pub unit: Unit,
}

/// Everything the engine needs for one computation
#[derive(Debug, Clone)]
pub struct PricingInputs {
    pub lines: Vec<LineInput>,
    pub waste_pct: Decimal,
    pub overhead_pct: Decimal,
    pub packaging_fee: Decimal,
    pub margin_pct: Decimal,
    pub distance_km: Decimal,
    pub delivery: DeliveryRates,
    pub payment: PaymentMethod,
}

/// Cost of one line after unit conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineCost {
    pub ingredient: String,
    pub quantity: Decimal,
    pub unit: Unit,
    pub catalog_unit: Unit,
    pub factor: Decimal,
    pub unit_price: Decimal,
    pub cost: Decimal,
}

/// Every step of the pricing chain, unrounded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub lines: Vec<LineCost>,
    pub ingredients_total: Decimal,
    pub waste_pct: Decimal,
    pub waste: Decimal,
    pub overhead_pct: Decimal,
    pub overhead: Decimal,
    pub packaging_fee: Decimal,
    pub production_cost: Decimal,
    /// Ingredients + waste (+ packaging, per policy), overhead excluded
    pub cmv: Decimal,
    pub margin_pct: Decimal,
    pub profit: Decimal,
    pub sale_price: Decimal,
    pub distance_km: Decimal,
    pub delivery_fee: Decimal,
    pub payment_method: String,
    pub payment_fee_pct: Decimal,
    pub payment_fee: Decimal,
    pub final_price: Decimal,
    pub policy: PricingPolicy,
    pub warnings: PricingWarnings,
}

/// Display strings for a breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedBreakdown {
    pub ingredients_total: String,
    pub waste: String,
    pub overhead: String,
    pub packaging_fee: String,
    pub production_cost: String,
    pub cmv: String,
    pub profit: String,
    pub sale_price: String,
    pub delivery_fee: String,
    pub payment_fee: String,
    pub final_price: String,
}

impl CostBreakdown {
    pub fn formatted(&self) -> FormattedBreakdown {
        FormattedBreakdown {
            ingredients_total: format_brl(self.ingredients_total),
            waste: format_brl(self.waste),
            overhead: format_brl(self.overhead),
            packaging_fee: format_brl(self.packaging_fee),
            production_cost: format_brl(self.production_cost),
            cmv: format_brl(self.cmv),
            profit: format_brl(self.profit),
            sale_price: format_brl(self.sale_price),
            delivery_fee: format_brl(self.delivery_fee),
            payment_fee: format_brl(self.payment_fee),
            final_price: format_brl(self.final_price),
        }
    }

    /// Rows for a "description / basis / value" summary table
    pub fn summary_rows(&self) -> Vec<(String, String, String)> {
        vec![
            (
                "Total Ingredientes".to_string(),
                "Soma dos itens".to_string(),
                format_brl(self.ingredients_total),
            ),
            (
                "Quebra/Desperdício".to_string(),
                format!("{}% s/ ingredientes", self.waste_pct.normalize()),
                format_brl(self.waste),
            ),
            (
                "Despesas Gerais".to_string(),
                format!("{}% s/ ingredientes", self.overhead_pct.normalize()),
                format_brl(self.overhead),
            ),
            (
                "Embalagem".to_string(),
                "Valor fixo".to_string(),
                format_brl(self.packaging_fee),
            ),
            (
                "CUSTO TOTAL".to_string(),
                "Custo de Produção".to_string(),
                format_brl(self.production_cost),
            ),
            (
                "Lucro".to_string(),
                format!("{}% s/ custo", self.margin_pct.normalize()),
                format_brl(self.profit),
            ),
            (
                "Preço de Venda".to_string(),
                "Custo + Lucro".to_string(),
                format_brl(self.sale_price),
            ),
            (
                "Entrega".to_string(),
                format!("{} km", self.distance_km.normalize()),
                format_brl(self.delivery_fee),
            ),
            (
                "Taxa Financeira".to_string(),
                format!(
                    "{}% ({})",
                    self.payment_fee_pct.normalize(),
                    self.payment_method
                ),
                format_brl(self.payment_fee),
            ),
            (
                "PREÇO FINAL".to_string(),
                String::new(),
                format_brl(self.final_price),
            ),
        ]
    }
}
