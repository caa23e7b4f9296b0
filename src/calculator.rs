//! Recursive build expansion
//!
//! Expands a target blueprint's material graph top-down. Every material that
//! has a producing blueprint of the same activity as the target is built;
//! everything else is bought and lands in the raw materials list. Component
//! runs are whole numbers, so over-production is banked in an
//! [`ExcessLedger`] and consumed by later demand for the same type.
//!
//! The recursion covers exactly one batch. Multiple batches are a linear
//! scale of that single batch, applied as a post-pass.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{debug, info};

use crate::bonuses::validate_settings;
use crate::error::{IndustryError, Result};
use crate::formulas::{calculate_job_time, calculate_material_quantity};
use crate::models::{
    ActivityKind, BlueprintDefinition, BlueprintId, BuildStep, CalculationResult, ExcessMaterial,
    IndustrySettings, ItemTypeId, MaterialRequirement,
};
use crate::reference::ReferenceLookup;

/// Deepest blueprint nesting accepted before the graph is considered cyclic
pub const MAX_EXPANSION_DEPTH: usize = 20;

/// Adjusted (not market) price per unit, used for job cost estimation only
pub type AdjustedPrices = HashMap<ItemTypeId, f64>;

/// Surplus component units banked during one expansion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExcessLedger {
    balances: BTreeMap<ItemTypeId, u64>,
}

impl ExcessLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, type_id: ItemTypeId) -> u64 {
        self.balances.get(&type_id).copied().unwrap_or(0)
    }

    /// Bank `quantity` units. Returns `None`, leaving the balance untouched,
    /// if it would overflow.
    pub fn deposit(&mut self, type_id: ItemTypeId, quantity: u64) -> Option<()> {
        if quantity > 0 {
            let balance = self.balances.entry(type_id).or_default();
            *balance = balance.checked_add(quantity)?;
        }
        Some(())
    }

    /// Take up to `wanted` units, returning how many were taken
    pub fn withdraw(&mut self, type_id: ItemTypeId, wanted: u64) -> u64 {
        let Some(balance) = self.balances.get_mut(&type_id) else {
            return 0;
        };
        let taken = wanted.min(*balance);
        *balance -= taken;
        if *balance == 0 {
            self.balances.remove(&type_id);
        }
        taken
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemTypeId, u64)> + '_ {
        self.balances.iter().map(|(id, qty)| (*id, *qty))
    }

    fn scale(&mut self, factor: u64) -> Option<()> {
        for qty in self.balances.values_mut() {
            *qty = qty.checked_mul(factor)?;
        }
        Some(())
    }
}

/// Materials keyed by type, merged by addition on insert
#[derive(Debug, Clone, Default)]
pub struct MaterialLedger {
    entries: BTreeMap<ItemTypeId, MaterialRequirement>,
}

impl MaterialLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` if a summed quantity would overflow; the existing entry
    /// is left as it was.
    pub fn merge(&mut self, requirement: MaterialRequirement) -> Option<()> {
        match self.entries.get_mut(&requirement.type_id) {
            Some(existing) => {
                let base_quantity = existing.base_quantity.checked_add(requirement.base_quantity)?;
                let adjusted_quantity = existing.adjusted_quantity.checked_add(requirement.adjusted_quantity)?;
                existing.base_quantity = base_quantity;
                existing.adjusted_quantity = adjusted_quantity;
                existing.volume_total = existing.unit_volume * adjusted_quantity as f64;
            }
            None => {
                self.entries.insert(requirement.type_id, requirement);
            }
        }
        Some(())
    }

    pub fn get(&self, type_id: ItemTypeId) -> Option<&MaterialRequirement> {
        self.entries.get(&type_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<MaterialRequirement> {
        self.entries.into_values().collect()
    }
}

/// Runs a single expansion. Holds the ledgers for the duration of the run
/// and is consumed by [`Expander::run`].
pub struct Expander<'a, R: ReferenceLookup + ?Sized> {
    reference: &'a R,
    settings: &'a IndustrySettings,
    adjusted_prices: &'a AdjustedPrices,
    top_activity: ActivityKind,
    raw_materials: MaterialLedger,
    excess: ExcessLedger,
    // Collected leaves-first, reversed once at the end
    steps: Vec<BuildStep>,
}

impl<'a, R: ReferenceLookup + ?Sized> Expander<'a, R> {
    pub fn new(reference: &'a R, settings: &'a IndustrySettings, adjusted_prices: &'a AdjustedPrices) -> Self {
        Expander {
            reference,
            settings,
            adjusted_prices,
            top_activity: ActivityKind::Manufacturing,
            raw_materials: MaterialLedger::new(),
            excess: ExcessLedger::new(),
            steps: Vec::new(),
        }
    }

    /// Start the run with surplus already banked
    pub fn with_excess_ledger(mut self, ledger: ExcessLedger) -> Self {
        self.excess = ledger;
        self
    }

    /// Validate the settings, expand `target` and assemble the result.
    ///
    /// Any error discards the partially filled ledgers along with the
    /// expander.
    pub fn run(mut self, target: &BlueprintDefinition) -> Result<CalculationResult> {
        validate_settings(self.settings)?;
        self.expand(target)?;
        self.finish(target)
    }

    /// Expand `target` for one batch of `runs_per_batch` runs
    fn expand(&mut self, target: &BlueprintDefinition) -> Result<()> {
        self.top_activity = target.activity;
        self.process_blueprint(
            target,
            self.settings.runs_per_batch,
            0,
            self.settings.blueprint_me,
            self.settings.blueprint_te,
        )
    }

    /// Scale the single batch up and build the final result for `target`
    fn finish(self, target: &BlueprintDefinition) -> Result<CalculationResult> {
        let batches = self.settings.number_of_batches;
        let reference = self.reference;
        let overflow = || IndustryError::QuantityOverflow {
            blueprint: target.blueprint_id,
        };

        let mut raw_materials = self.raw_materials.into_vec();
        let mut excess = self.excess;
        let mut build_steps = self.steps;
        build_steps.reverse();

        if batches > 1 {
            for material in &mut raw_materials {
                scale_requirement(material, batches).ok_or_else(overflow)?;
            }
            excess.scale(batches).ok_or_else(overflow)?;
            for step in &mut build_steps {
                step.runs = step.runs.checked_mul(batches).ok_or_else(overflow)?;
                step.produced_quantity = step.produced_quantity.checked_mul(batches).ok_or_else(overflow)?;
                step.excess_quantity = step.excess_quantity.checked_mul(batches).ok_or_else(overflow)?;
                step.time_seconds = step.time_seconds.checked_mul(batches).ok_or_else(overflow)?;
                step.job_cost *= batches as f64;
                for material in &mut step.materials {
                    scale_requirement(material, batches).ok_or_else(overflow)?;
                }
            }
        }

        let excess_materials = excess
            .iter()
            .map(|(type_id, quantity)| {
                let unit_volume = reference.type_info(type_id).map_or(0.0, |t| t.volume);
                ExcessMaterial {
                    type_id,
                    name: reference.type_name(type_id),
                    group_name: reference.group_name(type_id).map(str::to_string),
                    quantity,
                    volume_total: unit_volume * quantity as f64,
                }
            })
            .collect();

        let total_time_seconds = build_steps
            .iter()
            .try_fold(0u64, |total, s| total.checked_add(s.time_seconds))
            .ok_or_else(overflow)?;
        let total_job_cost = build_steps.iter().map(|s| s.job_cost).sum();

        Ok(CalculationResult {
            target_blueprint: target.clone(),
            settings: self.settings.clone(),
            raw_materials,
            build_steps,
            total_time_seconds,
            total_job_cost,
            excess_materials,
        })
    }

    /// The component blueprint to build `type_id` with, if it should be built
    fn component_blueprint(&self, type_id: ItemTypeId) -> Option<&'a BlueprintDefinition> {
        self.reference
            .blueprint_by_product_id(type_id)
            .filter(|bp| bp.activity == self.top_activity)
    }

    fn requirement(&self, type_id: ItemTypeId, base_quantity: u64, adjusted_quantity: u64) -> MaterialRequirement {
        let (name, unit_volume) = match self.reference.type_info(type_id) {
            Some(info) => (info.name.clone(), info.volume),
            None => {
                debug!(type_id = %type_id, "no type info, using placeholder");
                (self.reference.type_name(type_id), 0.0)
            }
        };
        MaterialRequirement {
            type_id,
            name,
            group_name: self.reference.group_name(type_id).map(str::to_string),
            base_quantity,
            adjusted_quantity,
            unit_volume,
            volume_total: unit_volume * adjusted_quantity as f64,
            is_raw_material: true,
        }
    }

    fn process_blueprint(
        &mut self,
        blueprint: &BlueprintDefinition,
        runs: u64,
        depth: usize,
        material_efficiency: u32,
        time_efficiency: u32,
    ) -> Result<()> {
        if depth > MAX_EXPANSION_DEPTH {
            return Err(IndustryError::CyclicBlueprintGraph {
                blueprint: blueprint.blueprint_id,
                depth,
            });
        }

        debug!(
            blueprint = %blueprint.blueprint_id,
            name = %blueprint.blueprint_name,
            runs,
            depth,
            "expanding blueprint"
        );

        let settings = self.settings;
        let overflow = || IndustryError::QuantityOverflow {
            blueprint: blueprint.blueprint_id,
        };
        let mut step_materials = MaterialLedger::new();

        for material in &blueprint.materials {
            let adjusted = calculate_material_quantity(
                material.quantity_per_run,
                runs,
                material_efficiency,
                settings.structure.material_efficiency,
                settings.rig.material_efficiency,
                settings.security_multiplier,
            );
            let base_quantity = material.quantity_per_run.checked_mul(runs).ok_or_else(overflow)?;
            let mut requirement = self.requirement(material.type_id, base_quantity, adjusted);

            match self.component_blueprint(material.type_id) {
                Some(component) => {
                    requirement.is_raw_material = false;

                    let reused = self.excess.withdraw(material.type_id, adjusted);
                    let needed = adjusted - reused;
                    if needed > 0 {
                        let component_runs = needed.div_ceil(component.produced_per_run);
                        let produced = component_runs
                            .checked_mul(component.produced_per_run)
                            .ok_or_else(overflow)?;
                        self.excess
                            .deposit(material.type_id, produced - needed)
                            .ok_or_else(overflow)?;

                        self.process_blueprint(
                            component,
                            component_runs,
                            depth + 1,
                            settings.component_me,
                            settings.component_te,
                        )?;
                    } else {
                        debug!(type_id = %material.type_id, reused, "demand covered by banked excess");
                    }
                }
                None => self.raw_materials.merge(requirement.clone()).ok_or_else(overflow)?,
            }

            step_materials.merge(requirement).ok_or_else(overflow)?;
        }

        let materials = step_materials.into_vec();
        let job_cost = self.job_cost(&materials, runs);
        let time_seconds = calculate_job_time(
            blueprint.base_time_seconds,
            runs,
            time_efficiency,
            settings.structure.time_efficiency,
            settings.rig.time_efficiency,
            settings.security_multiplier,
        );

        let produced_quantity = runs.checked_mul(blueprint.produced_per_run).ok_or_else(overflow)?;
        let is_top_level = depth == 0;
        let excess_quantity = if is_top_level {
            0
        } else {
            self.excess.balance(blueprint.product_id)
        };

        self.steps.push(BuildStep {
            blueprint_id: blueprint.blueprint_id,
            blueprint_name: blueprint.blueprint_name.clone(),
            product_id: blueprint.product_id,
            product_name: blueprint.product_name.clone(),
            activity: blueprint.activity,
            is_top_level,
            depth,
            runs,
            produced_quantity,
            excess_quantity,
            time_seconds,
            job_cost,
            materials,
        });
        Ok(())
    }

    /// Installation cost of one step, from the value of what it consumes
    fn job_cost(&self, materials: &[MaterialRequirement], runs: u64) -> f64 {
        let settings = self.settings;
        let material_value: f64 = materials
            .iter()
            .map(|m| {
                let price = self.adjusted_prices.get(&m.type_id).copied().unwrap_or(0.0);
                price * m.adjusted_quantity as f64
            })
            .sum();

        material_value
            * settings.system_cost_index
            * settings.job_cost_scale
            * runs as f64
            * (1.0 - settings.structure.job_cost)
            * (1.0 + settings.facility_tax)
    }
}

fn scale_requirement(material: &mut MaterialRequirement, factor: u64) -> Option<()> {
    let base_quantity = material.base_quantity.checked_mul(factor)?;
    let adjusted_quantity = material.adjusted_quantity.checked_mul(factor)?;
    material.base_quantity = base_quantity;
    material.adjusted_quantity = adjusted_quantity;
    material.volume_total = material.unit_volume * adjusted_quantity as f64;
    Some(())
}

/// Calculate the full build tree for a blueprint.
///
/// Returns the aggregated raw materials, one build step per blueprint
/// invocation (final product first) and the leftover excess. Fails without a
/// partial result if the blueprint is unknown, the settings are out of range,
/// a quantity overflows or the blueprint graph nests deeper than
/// [`MAX_EXPANSION_DEPTH`].
pub fn calculate_recursive_build<R: ReferenceLookup + ?Sized>(
    reference: &R,
    target_blueprint_id: BlueprintId,
    settings: &IndustrySettings,
    adjusted_prices: &AdjustedPrices,
) -> Result<CalculationResult> {
    validate_settings(settings)?;
    let target = reference
        .blueprint_by_id(target_blueprint_id)
        .ok_or(IndustryError::BlueprintNotFound(target_blueprint_id))?;

    let result = Expander::new(reference, settings, adjusted_prices).run(target)?;

    info!(
        blueprint = %target.blueprint_id,
        name = %target.blueprint_name,
        steps = result.build_steps.len(),
        raw_materials = result.raw_materials.len(),
        total_time = result.total_time_seconds,
        "build calculated"
    );
    Ok(result)
}

/// Format seconds as `1d 2h 3m 4s`, skipping leading zero units
pub fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 || !parts.is_empty() {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || !parts.is_empty() {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", secs));
    parts.join(" ")
}

/// Format the build steps as an indented tree-like listing
pub fn format_build_steps(result: &CalculationResult) -> String {
    let mut output = String::new();

    for step in &result.build_steps {
        let prefix = "  ".repeat(step.depth);
        output.push_str(&format!(
            "{}{}x {} ({}, {} runs, {})\n",
            prefix,
            step.produced_quantity,
            step.product_name,
            step.activity,
            step.runs,
            format_duration(step.time_seconds)
        ));
        if step.excess_quantity > 0 {
            output.push_str(&format!("{}  excess: {}\n", prefix, step.excess_quantity));
        }

        for material in &step.materials {
            let marker = if material.is_raw_material { "buy" } else { "build" };
            output.push_str(&format!(
                "{}  needs {} x {} [{}]\n",
                prefix, material.adjusted_quantity, material.name, marker
            ));
        }
    }

    output
}

impl fmt::Display for CalculationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Build Summary ===")?;
        writeln!(
            f,
            "Target: {} ({} runs x {} batches)",
            self.target_blueprint.product_name, self.settings.runs_per_batch, self.settings.number_of_batches
        )?;
        writeln!(f)?;

        writeln!(f, "Raw materials:")?;
        for material in &self.raw_materials {
            writeln!(
                f,
                "  {:>12} x {} ({:.2} m3)",
                material.adjusted_quantity, material.name, material.volume_total
            )?;
        }
        writeln!(f, "  Total volume: {:.2} m3", self.total_raw_volume())?;
        writeln!(f)?;

        writeln!(f, "Build steps:")?;
        for step in &self.build_steps {
            writeln!(
                f,
                "  {:>6} runs  {} ({})",
                step.runs,
                step.blueprint_name,
                format_duration(step.time_seconds)
            )?;
        }
        writeln!(f)?;

        if !self.excess_materials.is_empty() {
            writeln!(f, "Excess:")?;
            for excess in &self.excess_materials {
                writeln!(f, "  {:>12} x {}", excess.quantity, excess.name)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Totals:")?;
        writeln!(f, "  Job time: {}", format_duration(self.total_time_seconds))?;
        writeln!(f, "  Job cost: {:.2} ISK", self.total_job_cost)?;

        Ok(())
    }
}
