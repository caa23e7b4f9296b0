//! Sample reference data for trying the calculator without a full data import

use rusqlite::Connection;

use crate::db;
use crate::error::Result;
use crate::models::{
    ActivityKind, BlueprintDefinition, BlueprintId, BlueprintMaterial, GroupId, ItemTypeId, TypeInfo,
};
use crate::pricing::MarketPrice;

pub const WOLF_BLUEPRINT: BlueprintId = BlueprintId(11372);
pub const RIFTER_BLUEPRINT: BlueprintId = BlueprintId(691);
pub const TUNGSTEN_CARBIDE_FORMULA: BlueprintId = BlueprintId(46167);

const GROUPS: &[(u32, &str)] = &[
    (18, "Mineral"),
    (25, "Frigate"),
    (324, "Assault Frigate"),
    (334, "Construction Components"),
    (383, "Advanced Component"),
    (427, "Moon Materials"),
    (429, "Composite"),
    (1136, "Fuel Block"),
];

// (type id, name, volume, group id)
const TYPES: &[(u32, &str, f64, u32)] = &[
    (34, "Tritanium", 0.01, 18),
    (35, "Pyerite", 0.01, 18),
    (36, "Mexallon", 0.01, 18),
    (37, "Isogen", 0.01, 18),
    (38, "Nocxium", 0.01, 18),
    (11399, "Morphite", 0.01, 18),
    (587, "Rifter", 27_289.0, 25),
    (11371, "Wolf", 28_100.0, 324),
    (11478, "R.A.M.- Starship Tech", 0.04, 383),
    (11543, "Tungsten Carbide Armor Plate", 1.0, 334),
    (11532, "Fusion Thruster", 1.0, 334),
    (16637, "Tungsten", 0.05, 427),
    (16633, "Hydrocarbons", 0.05, 427),
    (16672, "Tungsten Carbide", 0.01, 429),
    (4051, "Nitrogen Fuel Block", 5.0, 1136),
];

// (type id, buy, sell, adjusted)
const PRICES: &[(u32, f64, f64, f64)] = &[
    (34, 3.9, 4.2, 4.0),
    (35, 7.5, 8.1, 7.8),
    (36, 42.0, 47.0, 45.0),
    (37, 55.0, 62.0, 58.0),
    (38, 610.0, 680.0, 650.0),
    (11399, 9_800.0, 10_900.0, 10_200.0),
    (587, 520_000.0, 610_000.0, 560_000.0),
    (11371, 21_000_000.0, 24_500_000.0, 22_000_000.0),
    (11478, 4_100.0, 5_200.0, 4_600.0),
    (11543, 95_000.0, 112_000.0, 101_000.0),
    (11532, 41_000.0, 48_000.0, 44_000.0),
    (16637, 480.0, 560.0, 520.0),
    (16633, 220.0, 270.0, 240.0),
    (16672, 28.0, 34.0, 31.0),
    (4051, 16_500.0, 18_200.0, 17_000.0),
];

fn materials(lines: &[(u32, u64)]) -> Vec<BlueprintMaterial> {
    lines
        .iter()
        .map(|(type_id, quantity_per_run)| BlueprintMaterial {
            type_id: ItemTypeId(*type_id),
            quantity_per_run: *quantity_per_run,
        })
        .collect()
}

fn sample_blueprints() -> Vec<BlueprintDefinition> {
    vec![
        // Wolf: T2 hull built on a Rifter plus advanced components
        BlueprintDefinition {
            blueprint_id: WOLF_BLUEPRINT,
            blueprint_name: "Wolf Blueprint".to_string(),
            product_id: ItemTypeId(11371),
            product_name: "Wolf".to_string(),
            activity: ActivityKind::Manufacturing,
            base_time_seconds: 18_000,
            materials: materials(&[(587, 1), (11543, 45), (11532, 15), (11399, 30), (11478, 6)]),
            produced_per_run: 1,
        },
        BlueprintDefinition {
            blueprint_id: RIFTER_BLUEPRINT,
            blueprint_name: "Rifter Blueprint".to_string(),
            product_id: ItemTypeId(587),
            product_name: "Rifter".to_string(),
            activity: ActivityKind::Manufacturing,
            base_time_seconds: 6_000,
            materials: materials(&[(34, 32_000), (35, 6_000), (36, 2_500), (37, 500)]),
            produced_per_run: 1,
        },
        BlueprintDefinition {
            blueprint_id: BlueprintId(17330),
            blueprint_name: "Tungsten Carbide Armor Plate Blueprint".to_string(),
            product_id: ItemTypeId(11543),
            product_name: "Tungsten Carbide Armor Plate".to_string(),
            activity: ActivityKind::Manufacturing,
            base_time_seconds: 1_800,
            materials: materials(&[(16672, 22)]),
            produced_per_run: 1,
        },
        BlueprintDefinition {
            blueprint_id: BlueprintId(17331),
            blueprint_name: "Fusion Thruster Blueprint".to_string(),
            product_id: ItemTypeId(11532),
            product_name: "Fusion Thruster".to_string(),
            activity: ActivityKind::Manufacturing,
            base_time_seconds: 1_800,
            materials: materials(&[(16672, 8), (38, 2)]),
            produced_per_run: 1,
        },
        BlueprintDefinition {
            blueprint_id: BlueprintId(11479),
            blueprint_name: "R.A.M.- Starship Tech Blueprint".to_string(),
            product_id: ItemTypeId(11478),
            product_name: "R.A.M.- Starship Tech".to_string(),
            activity: ActivityKind::Manufacturing,
            base_time_seconds: 1_500,
            materials: materials(&[(34, 500), (35, 400), (36, 200), (37, 75), (38, 8)]),
            produced_per_run: 100,
        },
        // Reaction product: bought when building the Wolf, expanded when
        // reacting on its own
        BlueprintDefinition {
            blueprint_id: TUNGSTEN_CARBIDE_FORMULA,
            blueprint_name: "Tungsten Carbide Reaction Formula".to_string(),
            product_id: ItemTypeId(16672),
            product_name: "Tungsten Carbide".to_string(),
            activity: ActivityKind::Reaction,
            base_time_seconds: 10_800,
            materials: materials(&[(16637, 100), (16633, 100), (4051, 5)]),
            produced_per_run: 10_000,
        },
    ]
}

/// Replace the database contents with the sample data set
pub fn load_sample_data(conn: &Connection) -> Result<usize> {
    db::clear_reference_data(conn)?;

    for (group_id, name) in GROUPS {
        db::upsert_group(conn, GroupId(*group_id), name)?;
    }

    for (type_id, name, volume, group_id) in TYPES {
        db::upsert_type(
            conn,
            &TypeInfo {
                type_id: ItemTypeId(*type_id),
                name: name.to_string(),
                volume: *volume,
                group_id: GroupId(*group_id),
            },
        )?;
    }

    let blueprints = sample_blueprints();
    for blueprint in &blueprints {
        db::upsert_blueprint(conn, blueprint)?;
    }

    for (type_id, buy, sell, adjusted) in PRICES {
        db::upsert_price(
            conn,
            ItemTypeId(*type_id),
            MarketPrice {
                buy: *buy,
                sell: *sell,
            },
            Some(*adjusted),
        )?;
    }

    Ok(blueprints.len())
}
