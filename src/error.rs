//! Error types for the industry calculator

use thiserror::Error;

use crate::models::BlueprintId;

#[derive(Error, Debug)]
pub enum IndustryError {
    #[error("Blueprint not found: {0}")]
    BlueprintNotFound(BlueprintId),

    #[error("Unknown {kind} option: '{value}'")]
    UnknownOption { kind: &'static str, value: String },

    #[error("Invalid setting {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },

    #[error(
        "Maximum expansion depth {depth} exceeded at blueprint {blueprint} - possible cycle in blueprint graph"
    )]
    CyclicBlueprintGraph { blueprint: BlueprintId, depth: usize },

    #[error("Quantity overflow while expanding blueprint {blueprint}")]
    QuantityOverflow { blueprint: BlueprintId },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl IndustryError {
    /// True for faults in reference data or storage rather than in the request
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            IndustryError::CyclicBlueprintGraph { .. } | IndustryError::Database(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, IndustryError>;
