//! Market pricing and build-vs-buy comparison on top of a calculation

use std::collections::HashMap;
use std::fmt;

use crate::models::{BuildStep, CalculationResult, ItemTypeId, MaterialRequirement};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MarketPrice {
    pub buy: f64,
    pub sell: f64,
}

/// Market prices per type. Types without an entry are priced at zero.
#[derive(Debug, Clone, Default)]
pub struct PriceMap {
    prices: HashMap<ItemTypeId, MarketPrice>,
}

impl PriceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_id: ItemTypeId, price: MarketPrice) {
        self.prices.insert(type_id, price);
    }

    pub fn get(&self, type_id: ItemTypeId) -> MarketPrice {
        self.prices.get(&type_id).copied().unwrap_or_default()
    }

    pub fn contains(&self, type_id: ItemTypeId) -> bool {
        self.prices.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl FromIterator<(ItemTypeId, MarketPrice)> for PriceMap {
    fn from_iter<I: IntoIterator<Item = (ItemTypeId, MarketPrice)>>(iter: I) -> Self {
        PriceMap {
            prices: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedMaterial {
    pub material: MaterialRequirement,
    pub buy_total: f64,
    pub sell_total: f64,
}

/// Whether an intermediate component is cheaper to build or to buy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentEconomics {
    pub build_cost: f64,
    pub market_cost: f64,
    pub should_buy: bool,
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedStep {
    pub step: BuildStep,
    pub product_buy_total: f64,
    pub product_sell_total: f64,
    /// `None` for the final product
    pub economics: Option<ComponentEconomics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PricingSummary {
    pub raw_buy_total: f64,
    pub raw_sell_total: f64,
    pub job_cost_total: f64,
    /// Raw materials at sell price plus all job costs
    pub total_build_cost: f64,
    pub product_sell_value: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PricedCalculation {
    pub product_name: String,
    pub raw_materials: Vec<PricedMaterial>,
    pub steps: Vec<PricedStep>,
    pub summary: PricingSummary,
}

fn price_material(material: &MaterialRequirement, prices: &PriceMap) -> PricedMaterial {
    let price = prices.get(material.type_id);
    let quantity = material.adjusted_quantity as f64;
    PricedMaterial {
        material: material.clone(),
        buy_total: price.buy * quantity,
        sell_total: price.sell * quantity,
    }
}

/// Compare building one component step against buying its output
pub fn component_economics(step: &BuildStep, prices: &PriceMap) -> ComponentEconomics {
    let material_cost: f64 = step
        .materials
        .iter()
        .map(|m| prices.get(m.type_id).sell * m.adjusted_quantity as f64)
        .sum();
    let build_cost = material_cost + step.job_cost;
    let market_cost = prices.get(step.product_id).sell * step.produced_quantity as f64;

    ComponentEconomics {
        build_cost,
        market_cost,
        should_buy: market_cost < build_cost,
        savings: (build_cost - market_cost).abs(),
    }
}

/// Annotate a calculation with market totals
pub fn price_result(result: &CalculationResult, prices: &PriceMap) -> PricedCalculation {
    let raw_materials: Vec<_> = result
        .raw_materials
        .iter()
        .map(|m| price_material(m, prices))
        .collect();

    let steps: Vec<_> = result
        .build_steps
        .iter()
        .map(|step| {
            let price = prices.get(step.product_id);
            let quantity = step.produced_quantity as f64;
            PricedStep {
                step: step.clone(),
                product_buy_total: price.buy * quantity,
                product_sell_total: price.sell * quantity,
                economics: (!step.is_top_level).then(|| component_economics(step, prices)),
            }
        })
        .collect();

    let raw_buy_total: f64 = raw_materials.iter().map(|m| m.buy_total).sum();
    let raw_sell_total: f64 = raw_materials.iter().map(|m| m.sell_total).sum();
    let total_build_cost = raw_sell_total + result.total_job_cost;
    let product_sell_value: f64 = steps
        .iter()
        .filter(|s| s.step.is_top_level)
        .map(|s| s.product_sell_total)
        .sum();

    PricedCalculation {
        product_name: result.target_blueprint.product_name.clone(),
        raw_materials,
        steps,
        summary: PricingSummary {
            raw_buy_total,
            raw_sell_total,
            job_cost_total: result.total_job_cost,
            total_build_cost,
            product_sell_value,
            profit: product_sell_value - total_build_cost,
        },
    }
}

impl fmt::Display for PricedCalculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Pricing: {} ===", self.product_name)?;

        writeln!(f, "Raw materials:")?;
        for priced in &self.raw_materials {
            writeln!(
                f,
                "  {:>12} x {:<30} buy {:>16.2}  sell {:>16.2}",
                priced.material.adjusted_quantity, priced.material.name, priced.buy_total, priced.sell_total
            )?;
        }
        writeln!(f)?;

        let components: Vec<_> = self
            .steps
            .iter()
            .filter_map(|s| s.economics.map(|e| (s, e)))
            .collect();
        if !components.is_empty() {
            writeln!(f, "Components:")?;
            for (priced, economics) in components {
                let verdict = if economics.should_buy { "BUY" } else { "BUILD" };
                writeln!(
                    f,
                    "  {:<30} build {:>16.2}  market {:>16.2}  {} (saves {:.2})",
                    priced.step.product_name, economics.build_cost, economics.market_cost, verdict, economics.savings
                )?;
            }
            writeln!(f)?;
        }

        let s = &self.summary;
        writeln!(f, "Raw materials (buy):  {:>16.2} ISK", s.raw_buy_total)?;
        writeln!(f, "Raw materials (sell): {:>16.2} ISK", s.raw_sell_total)?;
        writeln!(f, "Job costs:            {:>16.2} ISK", s.job_cost_total)?;
        writeln!(f, "Total build cost:     {:>16.2} ISK", s.total_build_cost)?;
        writeln!(f, "Product value (sell): {:>16.2} ISK", s.product_sell_value)?;
        writeln!(f, "Profit:               {:>16.2} ISK", s.profit)?;
        Ok(())
    }
}
