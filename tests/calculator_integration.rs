//! Build expansion integration tests
//!
//! Small hand-built blueprint graphs with round numbers, so every expected
//! quantity can be worked out on paper.

use industry_calculator::calculator::{AdjustedPrices, ExcessLedger, Expander, calculate_recursive_build};
use industry_calculator::formulas::calculate_material_quantity;
use industry_calculator::models::{
    ActivityKind, BlueprintDefinition, BlueprintId, BlueprintMaterial, GroupId, IndustrySettings, ItemTypeId,
    TypeInfo,
};
use industry_calculator::reference::{ReferenceData, ReferenceLookup};
use industry_calculator::{IndustryError, logging};

const MINERAL_X: ItemTypeId = ItemTypeId(34);
const MINERAL_Z: ItemTypeId = ItemTypeId(35);
const COMPONENT_Y: ItemTypeId = ItemTypeId(500);

fn blueprint(
    id: u32,
    product: ItemTypeId,
    activity: ActivityKind,
    produced_per_run: u64,
    materials: &[(ItemTypeId, u64)],
) -> BlueprintDefinition {
    BlueprintDefinition {
        blueprint_id: BlueprintId(id),
        blueprint_name: format!("Item {} Blueprint", product),
        product_id: product,
        product_name: format!("Item {}", product),
        activity,
        base_time_seconds: 600,
        materials: materials
            .iter()
            .map(|(type_id, quantity_per_run)| BlueprintMaterial {
                type_id: *type_id,
                quantity_per_run: *quantity_per_run,
            })
            .collect(),
        produced_per_run,
    }
}

fn manufacturing(id: u32, product: ItemTypeId, produced: u64, materials: &[(ItemTypeId, u64)]) -> BlueprintDefinition {
    blueprint(id, product, ActivityKind::Manufacturing, produced, materials)
}

fn reaction(id: u32, product: ItemTypeId, produced: u64, materials: &[(ItemTypeId, u64)]) -> BlueprintDefinition {
    blueprint(id, product, ActivityKind::Reaction, produced, materials)
}

fn base_reference() -> ReferenceData {
    let mut data = ReferenceData::new();
    data.insert_group(GroupId(18), "Mineral");
    for (type_id, name) in [(MINERAL_X, "Tritanium"), (MINERAL_Z, "Pyerite")] {
        data.insert_type(TypeInfo {
            type_id,
            name: name.to_string(),
            volume: 0.01,
            group_id: GroupId(18),
        });
    }
    data
}

/// No efficiency anywhere: quantities are plain multiplication
fn zero_efficiency(runs: u64) -> IndustrySettings {
    IndustrySettings {
        blueprint_me: 0,
        blueprint_te: 0,
        runs_per_batch: runs,
        number_of_batches: 1,
        component_me: 0,
        component_te: 0,
        ..IndustrySettings::default()
    }
}

#[test]
fn two_tier_build_matches_hand_calculation() {
    logging::init_test();
    let mut data = base_reference();
    data.insert_blueprint(manufacturing(1, ItemTypeId(100), 1, &[(MINERAL_X, 10), (COMPONENT_Y, 5)]));
    data.insert_blueprint(manufacturing(2, COMPONENT_Y, 2, &[(MINERAL_Z, 3)]));

    let result = calculate_recursive_build(&data, BlueprintId(1), &zero_efficiency(4), &AdjustedPrices::new()).unwrap();

    assert_eq!(result.raw_materials.len(), 2);
    assert_eq!(result.raw_material(MINERAL_X).unwrap().adjusted_quantity, 40);
    assert_eq!(result.raw_material(MINERAL_Z).unwrap().adjusted_quantity, 30);
    assert!(result.raw_material(COMPONENT_Y).is_none());

    let steps: Vec<_> = result.steps_for(BlueprintId(2)).collect();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].runs, 10);
    assert_eq!(steps[0].produced_quantity, 20);
    assert_eq!(steps[0].excess_quantity, 0);

    let top = &result.build_steps[0];
    assert!(top.is_top_level);
    assert_eq!(top.runs, 4);
    assert_eq!(top.produced_quantity, 4);
    let y_line = top.materials.iter().find(|m| m.type_id == COMPONENT_Y).unwrap();
    assert!(!y_line.is_raw_material);
    assert_eq!(y_line.adjusted_quantity, 20);

    // 600s * 4 runs + 600s * 10 runs
    assert_eq!(result.total_time_seconds, 8_400);
    assert!(result.excess_materials.is_empty());
}

#[test]
fn shared_raw_material_is_aggregated_once() {
    let component_a = ItemTypeId(200);
    let component_b = ItemTypeId(300);
    let mut data = base_reference();
    data.insert_blueprint(manufacturing(1, ItemTypeId(100), 1, &[(component_a, 1), (component_b, 1)]));
    data.insert_blueprint(manufacturing(2, component_a, 1, &[(MINERAL_X, 5)]));
    data.insert_blueprint(manufacturing(3, component_b, 1, &[(MINERAL_X, 5)]));

    let settings = IndustrySettings {
        component_me: 10,
        ..zero_efficiency(1)
    };
    let result = calculate_recursive_build(&data, BlueprintId(1), &settings, &AdjustedPrices::new()).unwrap();

    // Each branch rounds on its own: 4.5 -> 5 twice, not 9 for the pooled 10
    let per_branch = calculate_material_quantity(5, 1, 10, 0.0, 0.0, 1.0);
    assert_eq!(per_branch, 5);

    let tritanium: Vec<_> = result.raw_materials.iter().filter(|m| m.type_id == MINERAL_X).collect();
    assert_eq!(tritanium.len(), 1);
    assert_eq!(tritanium[0].adjusted_quantity, 2 * per_branch);
    assert_eq!(tritanium[0].base_quantity, 10);
    assert!((tritanium[0].volume_total - 0.1).abs() < 1e-9);
    assert_eq!(tritanium[0].group_name.as_deref(), Some("Mineral"));
}

#[test]
fn excess_from_one_branch_covers_later_demand() {
    let component_a = ItemTypeId(200);
    let component_c = ItemTypeId(300);
    let mut data = base_reference();
    // The target needs 7 A, but A comes in runs of 10: 3 are banked.
    // C then needs 2 A, which the bank covers without another A run.
    data.insert_blueprint(manufacturing(1, ItemTypeId(100), 1, &[(component_a, 7), (component_c, 1)]));
    data.insert_blueprint(manufacturing(2, component_a, 10, &[(MINERAL_X, 1)]));
    data.insert_blueprint(manufacturing(3, component_c, 1, &[(component_a, 2), (MINERAL_Z, 1)]));

    let settings = zero_efficiency(1);
    let prices = AdjustedPrices::new();
    let target = data.blueprint_by_id(BlueprintId(1)).unwrap();

    let result = Expander::new(&data, &settings, &prices).run(target).unwrap();
    let a_steps: Vec<_> = result.steps_for(BlueprintId(2)).collect();
    assert_eq!(a_steps.len(), 1);
    assert_eq!(a_steps[0].runs, 1);
    assert_eq!(a_steps[0].produced_quantity, 10);
    assert_eq!(a_steps[0].excess_quantity, 3);

    assert_eq!(result.raw_material(MINERAL_X).unwrap().adjusted_quantity, 1);
    assert_eq!(result.excess_materials.len(), 1);
    assert_eq!(result.excess_materials[0].type_id, component_a);
    assert_eq!(result.excess_materials[0].quantity, 1);

    let order: Vec<_> = result.build_steps.iter().map(|s| s.blueprint_id.0).collect();
    assert_eq!(order, vec![1, 3, 2]);
}

#[test]
fn excess_shortfall_triggers_only_the_missing_runs() {
    let component_a = ItemTypeId(200);
    let component_c = ItemTypeId(300);
    let mut data = base_reference();
    data.insert_blueprint(manufacturing(1, ItemTypeId(100), 1, &[(component_a, 7), (component_c, 1)]));
    data.insert_blueprint(manufacturing(2, component_a, 10, &[(MINERAL_X, 1)]));
    data.insert_blueprint(manufacturing(3, component_c, 1, &[(component_a, 5)]));

    let result = calculate_recursive_build(&data, BlueprintId(1), &zero_efficiency(1), &AdjustedPrices::new()).unwrap();

    // 3 banked, 5 wanted: 2 more needed, one new run of 10 leaves 8
    let a_steps: Vec<_> = result.steps_for(BlueprintId(2)).collect();
    assert_eq!(a_steps.len(), 2);
    assert!(a_steps.iter().all(|s| s.runs == 1));
    assert_eq!(result.excess_materials[0].quantity, 8);
    assert_eq!(result.raw_material(MINERAL_X).unwrap().adjusted_quantity, 2);
}

#[test]
fn preloaded_ledger_is_respected() {
    let mut data = base_reference();
    data.insert_blueprint(manufacturing(1, ItemTypeId(100), 1, &[(COMPONENT_Y, 4)]));
    data.insert_blueprint(manufacturing(2, COMPONENT_Y, 1, &[(MINERAL_Z, 3)]));

    let settings = zero_efficiency(1);
    let prices = AdjustedPrices::new();
    let target = data.blueprint_by_id(BlueprintId(1)).unwrap();
    let mut bank = ExcessLedger::new();
    bank.deposit(COMPONENT_Y, 10);

    let result = Expander::new(&data, &settings, &prices)
        .with_excess_ledger(bank)
        .run(target)
        .unwrap();
    assert_eq!(result.build_steps.len(), 1);
    assert!(result.raw_materials.is_empty());
    assert_eq!(result.excess_materials.len(), 1);
    assert_eq!(result.excess_materials[0].type_id, COMPONENT_Y);
    assert_eq!(result.excess_materials[0].quantity, 6);
}

#[test]
fn reaction_inputs_are_bought_for_manufacturing() {
    let composite = ItemTypeId(16672);
    let moon_goo = ItemTypeId(16637);
    let mut data = base_reference();
    data.insert_blueprint(manufacturing(1, ItemTypeId(100), 1, &[(composite, 22), (MINERAL_X, 10)]));
    data.insert_blueprint(reaction(2, composite, 10_000, &[(moon_goo, 100)]));

    assert!(data.can_be_manufactured(composite));
    let result = calculate_recursive_build(&data, BlueprintId(1), &zero_efficiency(2), &AdjustedPrices::new()).unwrap();

    let bought = result.raw_material(composite).unwrap();
    assert!(bought.is_raw_material);
    assert_eq!(bought.adjusted_quantity, 44);
    assert!(result.raw_material(moon_goo).is_none());
    assert_eq!(result.steps_for(BlueprintId(2)).count(), 0);
    assert_eq!(result.build_steps.len(), 1);
}

#[test]
fn reaction_targets_only_expand_reactions() {
    let intermediate = ItemTypeId(16660);
    let composite = ItemTypeId(16672);
    let moon_goo = ItemTypeId(16637);
    let fuel_block = ItemTypeId(4051);
    let mut data = base_reference();
    data.insert_blueprint(reaction(1, composite, 200, &[(intermediate, 100), (fuel_block, 5)]));
    data.insert_blueprint(reaction(2, intermediate, 200, &[(moon_goo, 100)]));
    data.insert_blueprint(manufacturing(3, fuel_block, 40, &[(MINERAL_X, 100)]));

    let result = calculate_recursive_build(&data, BlueprintId(1), &zero_efficiency(3), &AdjustedPrices::new()).unwrap();

    // 300 intermediate from 2 runs of 200, leaving 100 banked
    let steps: Vec<_> = result.steps_for(BlueprintId(2)).collect();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].runs, 2);
    assert_eq!(steps[0].excess_quantity, 100);
    assert_eq!(steps[0].activity, ActivityKind::Reaction);

    assert_eq!(result.raw_material(moon_goo).unwrap().adjusted_quantity, 200);
    assert_eq!(result.raw_material(fuel_block).unwrap().adjusted_quantity, 15);
    assert_eq!(result.steps_for(BlueprintId(3)).count(), 0);
}

#[test]
fn components_use_component_efficiency() {
    let mut data = base_reference();
    data.insert_blueprint(manufacturing(1, ItemTypeId(100), 1, &[(COMPONENT_Y, 1), (MINERAL_X, 100)]));
    data.insert_blueprint(manufacturing(2, COMPONENT_Y, 1, &[(MINERAL_Z, 100)]));

    let settings = IndustrySettings {
        blueprint_me: 0,
        component_me: 10,
        ..zero_efficiency(1)
    };
    let result = calculate_recursive_build(&data, BlueprintId(1), &settings, &AdjustedPrices::new()).unwrap();
    assert_eq!(result.raw_material(MINERAL_X).unwrap().adjusted_quantity, 100);
    assert_eq!(result.raw_material(MINERAL_Z).unwrap().adjusted_quantity, 90);

    let settings = IndustrySettings {
        blueprint_me: 10,
        component_me: 0,
        ..zero_efficiency(1)
    };
    let result = calculate_recursive_build(&data, BlueprintId(1), &settings, &AdjustedPrices::new()).unwrap();
    assert_eq!(result.raw_material(MINERAL_X).unwrap().adjusted_quantity, 90);
    assert_eq!(result.raw_material(MINERAL_Z).unwrap().adjusted_quantity, 100);
}

#[test]
fn batches_scale_every_total() {
    let component_a = ItemTypeId(200);
    let mut data = base_reference();
    data.insert_blueprint(manufacturing(1, ItemTypeId(100), 1, &[(component_a, 7), (MINERAL_X, 3)]));
    data.insert_blueprint(manufacturing(2, component_a, 10, &[(MINERAL_Z, 2)]));

    let mut prices = AdjustedPrices::new();
    prices.insert(MINERAL_X, 10.0);
    prices.insert(component_a, 50.0);

    let single = calculate_recursive_build(&data, BlueprintId(1), &zero_efficiency(1), &prices).unwrap();
    let settings = IndustrySettings {
        number_of_batches: 5,
        ..zero_efficiency(1)
    };
    let batched = calculate_recursive_build(&data, BlueprintId(1), &settings, &prices).unwrap();

    for (one, many) in single.raw_materials.iter().zip(&batched.raw_materials) {
        assert_eq!(many.type_id, one.type_id);
        assert_eq!(many.adjusted_quantity, one.adjusted_quantity * 5);
        assert!((many.volume_total - one.volume_total * 5.0).abs() < 1e-9);
    }
    for (one, many) in single.build_steps.iter().zip(&batched.build_steps) {
        assert_eq!(many.runs, one.runs * 5);
        assert_eq!(many.produced_quantity, one.produced_quantity * 5);
        assert_eq!(many.excess_quantity, one.excess_quantity * 5);
        assert_eq!(many.time_seconds, one.time_seconds * 5);
        assert!((many.job_cost - one.job_cost * 5.0).abs() < 1e-6);
    }
    assert_eq!(batched.excess_materials[0].quantity, 15);
    assert_eq!(batched.total_time_seconds, single.total_time_seconds * 5);
    assert!(batched.total_job_cost > 0.0);
    assert!((batched.total_job_cost - single.total_job_cost * 5.0).abs() < 1e-6);
}

#[test]
fn deep_chain_within_limit_succeeds() {
    let mut data = base_reference();
    // 20 nested components below the target
    for level in 0..=20u32 {
        let product = ItemTypeId(1_000 + level);
        let input = if level == 20 { MINERAL_X } else { ItemTypeId(1_000 + level + 1) };
        data.insert_blueprint(manufacturing(level + 1, product, 1, &[(input, 1)]));
    }

    let result = calculate_recursive_build(&data, BlueprintId(1), &zero_efficiency(1), &AdjustedPrices::new()).unwrap();
    assert_eq!(result.build_steps.len(), 21);
    assert_eq!(result.raw_material(MINERAL_X).unwrap().adjusted_quantity, 1);
}

#[test]
fn self_referencing_blueprint_is_rejected() {
    let mut data = base_reference();
    data.insert_blueprint(manufacturing(1, ItemTypeId(100), 1, &[(ItemTypeId(100), 1)]));

    let err = calculate_recursive_build(&data, BlueprintId(1), &zero_efficiency(1), &AdjustedPrices::new())
        .unwrap_err();
    match err {
        IndustryError::CyclicBlueprintGraph { blueprint, .. } => assert_eq!(blueprint, BlueprintId(1)),
        other => panic!("expected CyclicBlueprintGraph, got {:?}", other),
    }
}
