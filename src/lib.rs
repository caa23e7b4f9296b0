//! EVE Online industry calculator
//!
//! Expands a blueprint into its full multi-tier bill of materials, deciding
//! for each intermediate whether to build or buy it, and prices the result
//! against market data.

pub mod bonuses;
pub mod calculator;
pub mod db;
pub mod error;
pub mod formulas;
pub mod logging;
pub mod models;
pub mod pricing;
pub mod reference;
pub mod sample;

pub use bonuses::{SettingsRequest, resolve_settings};
pub use calculator::{AdjustedPrices, ExcessLedger, Expander, calculate_recursive_build};
pub use error::{IndustryError, Result};
pub use models::{
    ActivityKind, BlueprintDefinition, BlueprintId, BuildStep, CalculationResult, IndustrySettings, ItemTypeId,
    MaterialRequirement,
};
pub use pricing::{MarketPrice, PriceMap, price_result};
pub use reference::{ReferenceData, ReferenceLookup};
