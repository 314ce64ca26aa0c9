use serde::{Deserialize, Serialize};

use crate::units::Unit;

/// Warning collected while loading data or pricing a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    /// Warning level ("warning" or "info")
    pub level: String,
    /// What was assumed, skipped or changed
    pub message: String,
}

/// Collection of pricing warnings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingWarnings {
    warnings: Vec<Warning>,
}

impl PricingWarnings {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Record a lenient 1:1 fallback for a unit pair with no known factor
    pub fn add_unit_fallback(&mut self, ingredient: &str, from: Unit, to: Unit) {
        self.warnings.push(Warning {
            level: "warning".to_string(),
            message: format!(
                "No conversion from '{}' to '{}' for '{}', assumed 1:1",
                from, to, ingredient
            ),
        });
    }

    /// Record a catalog row that could not be used
    pub fn add_skipped_row(&mut self, row: usize, reason: &str) {
        self.warnings.push(Warning {
            level: "warning".to_string(),
            message: format!("Catalog row {} skipped: {}", row, reason),
        });
    }

    pub fn add_info(&mut self, message: String) {
        self.warnings.push(Warning {
            level: "info".to_string(),
            message,
        });
    }

    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(Warning {
            level: "warning".to_string(),
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn merge(&mut self, other: PricingWarnings) {
        self.warnings.extend(other.warnings);
    }
}
