use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::units::Unit;

/// One ingredient line as entered on the form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLine {
    pub ingredient: String,
    #[serde(default)]
    pub quantity: Decimal,
    pub unit: Unit,
}

/// Named, ordered list of lines. Saving under an existing name replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedRecipe {
    pub name: String,
    pub lines: Vec<RecipeLine>,
}

impl SavedRecipe {
    pub fn new(name: impl Into<String>, lines: Vec<RecipeLine>) -> Result<Self, AppError> {
        let recipe = Self {
            name: name.into().trim().to_string(),
            lines,
        };
        recipe.validate()?;
        Ok(recipe)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "recipe name cannot be empty".to_string(),
            ));
        }
        if self.lines.is_empty() {
            return Err(AppError::ValidationError(format!(
                "recipe '{}' has no ingredients",
                self.name
            )));
        }
        validate_lines(&self.lines)
    }
}

pub fn validate_lines(lines: &[RecipeLine]) -> Result<(), AppError> {
    for (i, line) in lines.iter().enumerate() {
        if line.ingredient.trim().is_empty() {
            return Err(AppError::ValidationError(format!(
                "line {} has no ingredient",
                i + 1
            )));
        }
        if line.quantity < Decimal::ZERO {
            return Err(AppError::ValidationError(format!(
                "line {} ({}) has a negative quantity",
                i + 1,
                line.ingredient
            )));
        }
    }
    Ok(())
}
