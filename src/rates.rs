//! Base-rate resolution and default cost configuration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{ProductClass, ProjectInput};

/// Indoor/outdoor environment key for the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Environment {
    Indoor,
    Outdoor,
}

impl Environment {
    pub fn from_outdoor(is_outdoor: bool) -> Self {
        if is_outdoor {
            Environment::Outdoor
        } else {
            Environment::Indoor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Indoor => "Indoor",
            Environment::Outdoor => "Outdoor",
        }
    }
}

/// Hardware rate card: (floor of pixel pitch in mm, environment) -> $/sqft.
///
/// A card can be loaded from the SQLite catalog or injected by a caller;
/// `RateCard::default()` carries the built-in industry-average table.
#[derive(Debug, Clone, PartialEq)]
pub struct RateCard {
    cells: BTreeMap<(u32, Environment), f64>,
}

/// Fallback cell used when a pitch is not in the table: 10mm/Indoor.
const FALLBACK_RATE: f64 = 1200.0;

impl Default for RateCard {
    fn default() -> Self {
        let mut cells = BTreeMap::new();
        // Fine pitch (1.5mm keys as floor = 1)
        cells.insert((1, Environment::Indoor), 3500.0);
        cells.insert((1, Environment::Outdoor), 4500.0);
        cells.insert((4, Environment::Indoor), 2500.0);
        cells.insert((4, Environment::Outdoor), 3200.0);
        cells.insert((6, Environment::Indoor), 1800.0);
        cells.insert((6, Environment::Outdoor), 2400.0);
        cells.insert((10, Environment::Indoor), 1200.0);
        cells.insert((10, Environment::Outdoor), 1800.0);
        RateCard { cells }
    }
}

impl RateCard {
    pub fn new(cells: BTreeMap<(u32, Environment), f64>) -> Self {
        RateCard { cells }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn insert(&mut self, pitch_mm: u32, env: Environment, rate_per_sqft: f64) {
        self.cells.insert((pitch_mm, env), rate_per_sqft);
    }

    /// Iterate cells in (pitch, environment) order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Environment, f64)> + '_ {
        self.cells.iter().map(|(&(p, e), &r)| (p, e, r))
    }

    /// Resolve the $/sqft base rate for a project.
    ///
    /// A positive manual override always wins. Otherwise the table is keyed
    /// by the rounded-down integer pitch; an unknown pitch falls back to the
    /// 10mm/Indoor cell (flagged, never an error). Ribbon displays carry the
    /// custom-cabinet premium on top of the resolved rate.
    pub fn resolve(&self, input: &ProjectInput, config: &CostConfig) -> f64 {
        if let Some(rate) = input.unit_cost_override {
            if rate > 0.0 {
                return rate;
            }
        }

        let pitch_key = input.pixel_pitch_mm.floor() as u32;
        let env = Environment::from_outdoor(input.is_outdoor);

        let mut base_rate = match self.cells.get(&(pitch_key, env)) {
            Some(&rate) => rate,
            None => {
                log::warn!(
                    "no rate for {}mm/{}; falling back to 10mm/Indoor",
                    pitch_key,
                    env.as_str()
                );
                self.cells
                    .get(&(10, Environment::Indoor))
                    .copied()
                    .unwrap_or(FALLBACK_RATE)
            }
        };

        if input.product_class == ProductClass::Ribbon {
            base_rate *= config.ribbon_premium;
        }

        base_rate
    }
}

/// Every default percentage and unit cost used by the cost stages, gathered
/// into one immutable structure so tests can override them deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostConfig {
    /// Default margin fraction when the input does not set one.
    pub default_margin: f64,
    /// Ribbon custom-cabinet premium on the base rate.
    pub ribbon_premium: f64,

    /// Structural materials as a share of hardware cost.
    pub structural_materials_pct: f64,
    /// Structural labor as a share of hardware + structural materials.
    pub structural_labor_pct: f64,

    /// LED installation hours per square foot.
    pub hours_per_sqft: f64,
    pub lead_tech_rate: f64,
    pub tech_rate: f64,

    pub pdus_per_display: f64,
    pub pdu_unit_cost: f64,
    pub cable_cost_per_ft: f64,
    pub displays_per_switch: f64,
    pub switch_unit_cost: f64,
    pub panel_upgrade_cost: f64,
    pub electrical_hours_per_pdu: f64,
    pub electrician_rate: f64,

    pub cms_base_cost: f64,
    pub displays_per_player: f64,
    pub player_unit_cost: f64,
    pub cms_install_hours_per_display: f64,
    pub cms_commissioning_hours_per_display: f64,

    /// Project management as a share of the hard-cost subtotal.
    pub pm_pct: f64,
    /// General conditions as a share of the marked-up running total.
    pub general_conditions_pct: f64,
    /// Permits as a share of the marked-up running total.
    pub permit_pct: f64,
    /// Bond as a share of the marked-up running total (not marked up again).
    pub bond_pct: f64,

    pub submittal_per_display: f64,
    pub structural_engineering_fee: f64,
    pub electrical_engineering_fee: f64,
    pub testing_hours_per_display: f64,
    pub testing_equipment_cost: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        CostConfig {
            default_margin: 0.30,
            ribbon_premium: 1.20,

            structural_materials_pct: 0.20,
            structural_labor_pct: 0.15,

            hours_per_sqft: 0.5,
            lead_tech_rate: 150.0,
            tech_rate: 100.0,

            pdus_per_display: 1.5,
            pdu_unit_cost: 2500.0,
            cable_cost_per_ft: 15.0,
            displays_per_switch: 4.0,
            switch_unit_cost: 5000.0,
            panel_upgrade_cost: 15000.0,
            electrical_hours_per_pdu: 40.0,
            electrician_rate: 150.0,

            cms_base_cost: 25000.0,
            displays_per_player: 3.0,
            player_unit_cost: 3500.0,
            cms_install_hours_per_display: 20.0,
            cms_commissioning_hours_per_display: 10.0,

            pm_pct: 0.08,
            general_conditions_pct: 0.05,
            permit_pct: 0.02,
            bond_pct: 0.015,

            submittal_per_display: 2500.0,
            structural_engineering_fee: 15000.0,
            electrical_engineering_fee: 10000.0,
            testing_hours_per_display: 20.0,
            testing_equipment_cost: 5000.0,
        }
    }
}
