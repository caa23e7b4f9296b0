//! Database schema and operations

use rusqlite::{Connection, OptionalExtension};
use tracing::{info, warn};

use crate::calculator::AdjustedPrices;
use crate::error::Result;
use crate::models::{
    ActivityKind, BlueprintDefinition, BlueprintId, BlueprintMaterial, GroupId, ItemTypeId, TypeInfo,
};
use crate::pricing::{MarketPrice, PriceMap};
use crate::reference::ReferenceData;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Item groups (Mineral, Composite, ...)
        CREATE TABLE IF NOT EXISTS item_groups (
            group_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );

        -- Item types
        CREATE TABLE IF NOT EXISTS types (
            type_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            volume REAL NOT NULL DEFAULT 0,
            group_id INTEGER NOT NULL
        );

        -- Blueprint definitions, one activity each
        CREATE TABLE IF NOT EXISTS blueprints (
            blueprint_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            product_id INTEGER NOT NULL,
            activity TEXT NOT NULL,
            base_time_s INTEGER NOT NULL,
            produced_per_run INTEGER NOT NULL
        );

        -- Materials per run, kept in blueprint order
        CREATE TABLE IF NOT EXISTS blueprint_materials (
            blueprint_id INTEGER,
            position INTEGER,
            type_id INTEGER NOT NULL,
            quantity INTEGER NOT NULL,
            PRIMARY KEY (blueprint_id, position)
        );

        -- Market and adjusted prices
        CREATE TABLE IF NOT EXISTS market_prices (
            type_id INTEGER PRIMARY KEY,
            buy REAL NOT NULL DEFAULT 0,
            sell REAL NOT NULL DEFAULT 0,
            adjusted REAL
        );

        CREATE INDEX IF NOT EXISTS idx_blueprints_product ON blueprints(product_id);
        "#,
    )?;
    Ok(())
}

pub fn upsert_group(conn: &Connection, group_id: GroupId, name: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO item_groups (group_id, name) VALUES (?1, ?2)",
        (group_id.0, name),
    )?;
    Ok(())
}

pub fn upsert_type(conn: &Connection, info: &TypeInfo) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO types (type_id, name, volume, group_id) VALUES (?1, ?2, ?3, ?4)",
        (info.type_id.0, &info.name, info.volume, info.group_id.0),
    )?;
    Ok(())
}

/// Insert or replace a blueprint together with its material rows
pub fn upsert_blueprint(conn: &Connection, blueprint: &BlueprintDefinition) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT OR REPLACE INTO blueprints (blueprint_id, name, product_id, activity, base_time_s, produced_per_run)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            blueprint.blueprint_id.0,
            &blueprint.blueprint_name,
            blueprint.product_id.0,
            blueprint.activity.as_str(),
            blueprint.base_time_seconds as i64,
            blueprint.produced_per_run as i64,
        ),
    )?;
    tx.execute(
        "DELETE FROM blueprint_materials WHERE blueprint_id = ?1",
        [blueprint.blueprint_id.0],
    )?;
    for (position, material) in blueprint.materials.iter().enumerate() {
        tx.execute(
            "INSERT INTO blueprint_materials (blueprint_id, position, type_id, quantity)
             VALUES (?1, ?2, ?3, ?4)",
            (
                blueprint.blueprint_id.0,
                position as i64,
                material.type_id.0,
                material.quantity_per_run as i64,
            ),
        )?;
    }
    tx.commit()?;
    Ok(())
}

/// Store buy/sell prices, keeping any adjusted price unless one is given
pub fn upsert_price(conn: &Connection, type_id: ItemTypeId, price: MarketPrice, adjusted: Option<f64>) -> Result<()> {
    conn.execute(
        "INSERT INTO market_prices (type_id, buy, sell, adjusted) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(type_id) DO UPDATE SET
            buy = excluded.buy,
            sell = excluded.sell,
            adjusted = COALESCE(excluded.adjusted, market_prices.adjusted)",
        (type_id.0, price.buy, price.sell, adjusted),
    )?;
    Ok(())
}

/// Clear all reference data (for re-import)
pub fn clear_reference_data(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DELETE FROM blueprint_materials;
        DELETE FROM blueprints;
        DELETE FROM types;
        DELETE FROM item_groups;
        DELETE FROM market_prices;
        "#,
    )?;
    Ok(())
}

fn load_materials(conn: &Connection, blueprint_id: BlueprintId) -> Result<Vec<BlueprintMaterial>> {
    let mut stmt = conn.prepare(
        "SELECT type_id, quantity FROM blueprint_materials WHERE blueprint_id = ?1 ORDER BY position",
    )?;

    let rows = stmt.query_map([blueprint_id.0], |row| {
        Ok(BlueprintMaterial {
            type_id: ItemTypeId(row.get(0)?),
            quantity_per_run: row.get::<_, i64>(1)?.max(0) as u64,
        })
    })?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Load one blueprint directly from the database
pub fn get_blueprint(conn: &Connection, blueprint_id: BlueprintId) -> Result<Option<BlueprintDefinition>> {
    let row = conn
        .query_row(
            "SELECT b.name, b.product_id, t.name, b.activity, b.base_time_s, b.produced_per_run
             FROM blueprints b
             LEFT JOIN types t ON t.type_id = b.product_id
             WHERE b.blueprint_id = ?1",
            [blueprint_id.0],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u32>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            },
        )
        .optional()?;

    let Some((name, product_id, product_name, activity, base_time, produced)) = row else {
        return Ok(None);
    };
    let Some(activity) = ActivityKind::from_db(&activity) else {
        warn!(blueprint = %blueprint_id, activity = %activity, "unknown activity");
        return Ok(None);
    };

    Ok(Some(BlueprintDefinition {
        blueprint_id,
        blueprint_name: name,
        product_id: ItemTypeId(product_id),
        product_name: product_name.unwrap_or_else(|| format!("Unknown Type {}", product_id)),
        activity,
        base_time_seconds: base_time.max(0) as u64,
        materials: load_materials(conn, blueprint_id)?,
        produced_per_run: produced.max(0) as u64,
    }))
}

/// List all blueprint ids in the database
pub fn list_blueprint_ids(conn: &Connection) -> Result<Vec<BlueprintId>> {
    let mut stmt = conn.prepare("SELECT blueprint_id FROM blueprints ORDER BY blueprint_id")?;
    let rows = stmt.query_map([], |row| Ok(BlueprintId(row.get(0)?)))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(row?);
    }
    Ok(results)
}

/// Load the full reference snapshot into memory
pub fn load_reference_data(conn: &Connection) -> Result<ReferenceData> {
    let mut data = ReferenceData::new();

    let mut stmt = conn.prepare("SELECT group_id, name FROM item_groups")?;
    let groups = stmt.query_map([], |row| Ok((GroupId(row.get(0)?), row.get::<_, String>(1)?)))?;
    for group in groups {
        let (group_id, name) = group?;
        data.insert_group(group_id, name);
    }

    let mut stmt = conn.prepare("SELECT type_id, name, volume, group_id FROM types")?;
    let types = stmt.query_map([], |row| {
        Ok(TypeInfo {
            type_id: ItemTypeId(row.get(0)?),
            name: row.get(1)?,
            volume: row.get(2)?,
            group_id: GroupId(row.get(3)?),
        })
    })?;
    for info in types {
        data.insert_type(info?);
    }

    let mut skipped = 0;
    for blueprint_id in list_blueprint_ids(conn)? {
        match get_blueprint(conn, blueprint_id)? {
            Some(blueprint) => {
                if !data.insert_blueprint(blueprint) {
                    skipped += 1;
                }
            }
            None => skipped += 1,
        }
    }

    info!(
        blueprints = data.blueprint_count(),
        types = data.type_count(),
        skipped,
        "reference data loaded"
    );
    Ok(data)
}

/// Market buy/sell prices for every priced type
pub fn load_market_prices(conn: &Connection) -> Result<PriceMap> {
    let mut stmt = conn.prepare("SELECT type_id, buy, sell FROM market_prices")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            ItemTypeId(row.get(0)?),
            MarketPrice {
                buy: row.get(1)?,
                sell: row.get(2)?,
            },
        ))
    })?;

    let mut results = PriceMap::new();
    for row in rows {
        let (type_id, price) = row?;
        results.insert(type_id, price);
    }
    Ok(results)
}

/// Adjusted prices used for job cost estimation
pub fn load_adjusted_prices(conn: &Connection) -> Result<AdjustedPrices> {
    let mut stmt = conn.prepare("SELECT type_id, adjusted FROM market_prices WHERE adjusted IS NOT NULL")?;
    let rows = stmt.query_map([], |row| Ok((ItemTypeId(row.get(0)?), row.get::<_, f64>(1)?)))?;

    let mut results = AdjustedPrices::new();
    for row in rows {
        let (type_id, price) = row?;
        results.insert(type_id, price);
    }
    Ok(results)
}
