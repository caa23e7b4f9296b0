//! In-memory reference data: blueprints, item types and groups
//!
//! Loaded once at startup (see [`crate::db::load_reference_data`]) and only
//! read afterwards. Missing entries are reported as `None`, never as errors;
//! callers fall back to raw-material treatment or placeholder names.

use std::collections::HashMap;

use tracing::warn;

use crate::models::{BlueprintDefinition, BlueprintId, GroupId, ItemTypeId, TypeInfo};

/// Read-only lookups the expansion engine needs from reference data
pub trait ReferenceLookup {
    fn blueprint_by_id(&self, id: BlueprintId) -> Option<&BlueprintDefinition>;

    fn blueprint_by_product_id(&self, type_id: ItemTypeId) -> Option<&BlueprintDefinition>;

    fn type_info(&self, type_id: ItemTypeId) -> Option<&TypeInfo>;

    fn group_name(&self, type_id: ItemTypeId) -> Option<&str>;

    fn type_name(&self, type_id: ItemTypeId) -> String {
        match self.type_info(type_id) {
            Some(info) => info.name.clone(),
            None => format!("Unknown Type {}", type_id),
        }
    }

    /// True if some blueprint produces this type
    fn can_be_manufactured(&self, type_id: ItemTypeId) -> bool {
        self.blueprint_by_product_id(type_id).is_some()
    }
}

#[derive(Debug, Default, Clone)]
pub struct ReferenceData {
    blueprints: HashMap<BlueprintId, BlueprintDefinition>,
    by_product: HashMap<ItemTypeId, BlueprintId>,
    types: HashMap<ItemTypeId, TypeInfo>,
    groups: HashMap<GroupId, String>,
}

impl ReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_group(&mut self, group_id: GroupId, name: impl Into<String>) {
        self.groups.insert(group_id, name.into());
    }

    pub fn insert_type(&mut self, info: TypeInfo) {
        self.types.insert(info.type_id, info);
    }

    /// Add a blueprint. Returns false if it was rejected.
    ///
    /// Blueprints without materials or with a zero produced quantity can't be
    /// expanded and are dropped. When two blueprints produce the same type the
    /// first one keeps the product lookup. Re-inserting a blueprint id that now
    /// makes a different product hands its old product to the lowest-id
    /// remaining producer, if any.
    pub fn insert_blueprint(&mut self, blueprint: BlueprintDefinition) -> bool {
        if blueprint.materials.is_empty() || blueprint.produced_per_run == 0 {
            warn!(
                blueprint = %blueprint.blueprint_id,
                name = %blueprint.blueprint_name,
                "dropping blueprint without materials or output"
            );
            return false;
        }

        let blueprint_id = blueprint.blueprint_id;
        let product_id = blueprint.product_id;
        if let Some(previous) = self.blueprints.insert(blueprint_id, blueprint) {
            let old_product = previous.product_id;
            if old_product != product_id && self.by_product.get(&old_product) == Some(&blueprint_id) {
                self.by_product.remove(&old_product);
                let next = self
                    .blueprints
                    .values()
                    .filter(|bp| bp.product_id == old_product)
                    .map(|bp| bp.blueprint_id)
                    .min();
                if let Some(next) = next {
                    self.by_product.insert(old_product, next);
                }
            }
        }
        self.by_product.entry(product_id).or_insert(blueprint_id);
        true
    }

    pub fn blueprint_count(&self) -> usize {
        self.blueprints.len()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// All blueprints ordered by name
    pub fn blueprints(&self) -> Vec<&BlueprintDefinition> {
        let mut list: Vec<_> = self.blueprints.values().collect();
        list.sort_by(|a, b| {
            a.blueprint_name
                .cmp(&b.blueprint_name)
                .then(a.blueprint_id.cmp(&b.blueprint_id))
        });
        list
    }

    /// Resolve a blueprint from a numeric id, a blueprint name or a product name
    pub fn find_blueprint(&self, query: &str) -> Option<&BlueprintDefinition> {
        let query = query.trim();
        if let Ok(id) = query.parse::<u32>() {
            return self.blueprint_by_id(BlueprintId(id));
        }

        let needle = query.to_lowercase();
        self.blueprints()
            .into_iter()
            .find(|bp| {
                bp.blueprint_name.to_lowercase() == needle
                    || bp.product_name.to_lowercase() == needle
            })
    }
}

impl ReferenceLookup for ReferenceData {
    fn blueprint_by_id(&self, id: BlueprintId) -> Option<&BlueprintDefinition> {
        self.blueprints.get(&id)
    }

    fn blueprint_by_product_id(&self, type_id: ItemTypeId) -> Option<&BlueprintDefinition> {
        self.by_product
            .get(&type_id)
            .and_then(|id| self.blueprints.get(id))
    }

    fn type_info(&self, type_id: ItemTypeId) -> Option<&TypeInfo> {
        self.types.get(&type_id)
    }

    fn group_name(&self, type_id: ItemTypeId) -> Option<&str> {
        let info = self.types.get(&type_id)?;
        self.groups.get(&info.group_id).map(String::as_str)
    }
}
