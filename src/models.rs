//! Data models for blueprints, item types and calculation results

use std::fmt;

/// Identifier of an item type (minerals, components, ships...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemTypeId(pub u32);

/// Identifier of a blueprint. Blueprints are item types themselves but are
/// kept apart so they can't be confused with the products they make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlueprintId(pub u32);

/// Identifier of an item group (e.g. "Mineral", "Composite")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(pub u32);

impl fmt::Display for ItemTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for BlueprintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Industry activity a blueprint runs under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    Manufacturing,
    Reaction,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Manufacturing => "manufacturing",
            ActivityKind::Reaction => "reaction",
        }
    }

    pub fn from_db(value: &str) -> Option<Self> {
        match value {
            "manufacturing" => Some(ActivityKind::Manufacturing),
            "reaction" => Some(ActivityKind::Reaction),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintMaterial {
    pub type_id: ItemTypeId,
    pub quantity_per_run: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintDefinition {
    pub blueprint_id: BlueprintId,
    pub blueprint_name: String,
    pub product_id: ItemTypeId,
    pub product_name: String,
    pub activity: ActivityKind,
    pub base_time_seconds: u64,
    pub materials: Vec<BlueprintMaterial>,
    pub produced_per_run: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub type_id: ItemTypeId,
    pub name: String,
    pub volume: f64, // m3 per unit
    pub group_id: GroupId,
}

/// Facility bonuses of the structure the job is installed in (fractions)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StructureBonus {
    pub material_efficiency: f64,
    pub time_efficiency: f64,
    pub job_cost: f64,
}

/// Rig bonuses before the security multiplier is applied (fractions)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RigBonus {
    pub material_efficiency: f64,
    pub time_efficiency: f64,
}

/// Everything the expansion engine needs to know about how a build is run.
///
/// Built once per request by [`crate::bonuses::resolve_settings`] and never
/// mutated while an expansion is running.
#[derive(Debug, Clone, PartialEq)]
pub struct IndustrySettings {
    pub blueprint_me: u32,
    pub blueprint_te: u32,
    pub runs_per_batch: u64,
    pub number_of_batches: u64,
    pub structure: StructureBonus,
    pub rig: RigBonus,
    pub security_multiplier: f64,
    /// ME assumed for every recursively built component
    pub component_me: u32,
    /// TE assumed for every recursively built component
    pub component_te: u32,
    pub system_cost_index: f64,
    pub facility_tax: f64,
    pub job_cost_scale: f64,
}

/// One material line of a build step, or one aggregated raw material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialRequirement {
    pub type_id: ItemTypeId,
    pub name: String,
    pub group_name: Option<String>,
    pub base_quantity: u64,
    pub adjusted_quantity: u64,
    pub unit_volume: f64,
    pub volume_total: f64,
    /// Whether the engine decided to buy this rather than build it
    pub is_raw_material: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildStep {
    pub blueprint_id: BlueprintId,
    pub blueprint_name: String,
    pub product_id: ItemTypeId,
    pub product_name: String,
    pub activity: ActivityKind,
    pub is_top_level: bool,
    pub depth: usize,
    pub runs: u64,
    pub produced_quantity: u64,
    pub excess_quantity: u64,
    pub time_seconds: u64,
    pub job_cost: f64,
    pub materials: Vec<MaterialRequirement>,
}

/// Surplus left over from over-batched component runs
#[derive(Debug, Clone, PartialEq)]
pub struct ExcessMaterial {
    pub type_id: ItemTypeId,
    pub name: String,
    pub group_name: Option<String>,
    pub quantity: u64,
    pub volume_total: f64,
}

/// Result of a recursive build calculation
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationResult {
    pub target_blueprint: BlueprintDefinition,
    pub settings: IndustrySettings,
    pub raw_materials: Vec<MaterialRequirement>,
    /// Final product first, ingredients after
    pub build_steps: Vec<BuildStep>,
    pub total_time_seconds: u64,
    pub total_job_cost: f64,
    pub excess_materials: Vec<ExcessMaterial>,
}

impl CalculationResult {
    pub fn raw_material(&self, type_id: ItemTypeId) -> Option<&MaterialRequirement> {
        self.raw_materials.iter().find(|m| m.type_id == type_id)
    }

    pub fn steps_for(&self, blueprint_id: BlueprintId) -> impl Iterator<Item = &BuildStep> {
        self.build_steps
            .iter()
            .filter(move |s| s.blueprint_id == blueprint_id)
    }

    pub fn total_raw_volume(&self) -> f64 {
        self.raw_materials.iter().map(|m| m.volume_total).sum()
    }
}
