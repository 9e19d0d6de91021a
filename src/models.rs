//! Input and output models for the quoting engine

use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductClass {
    Ribbon,
    Scoreboard,
    CenterHung,
    FinePitch,
    Kiosk,
    Facade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueType {
    Nfl,
    Nba,
    Ncaa,
    Transit,
    Corporate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureCondition {
    Existing,
    NewSteel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationType {
    New,
    Retrofit,
    Replacement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaborType {
    NonUnion,
    Union,
    Prevailing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Front,
    Rear,
    Crane,
    Lift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerDistance {
    Close,
    Medium,
    Far,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElectricalCapacity {
    Adequate,
    Limited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Complexity {
    Standard,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSystem {
    Include,
    Exclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceLevel {
    Gold,
    Silver,
    Bronze,
    #[serde(rename = "self")]
    SelfService,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeline {
    Standard,
    Rush,
    Asap,
    Multiphase,
}

/// Full project configuration for one quote.
///
/// Owned by the caller and read-only to the engine; every field with a
/// sensible business default carries a serde default so sparse JSON inputs
/// stay valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub client_name: String,
    pub product_class: ProductClass,
    #[serde(default = "default_venue")]
    pub venue_type: VenueType,

    pub width_ft: f64,
    pub height_ft: f64,
    pub pixel_pitch_mm: f64,
    #[serde(default)]
    pub is_outdoor: bool,

    #[serde(default = "default_structure")]
    pub structure_condition: StructureCondition,
    #[serde(default = "default_installation")]
    pub installation_type: InstallationType,
    #[serde(default = "default_labor")]
    pub labor_type: LaborType,
    #[serde(default = "default_access")]
    pub access: Access,
    #[serde(default = "default_power_distance")]
    pub power_distance: PowerDistance,
    #[serde(default = "default_capacity")]
    pub electrical_capacity: ElectricalCapacity,
    #[serde(default = "default_complexity")]
    pub complexity: Complexity,
    #[serde(default = "default_control_system")]
    pub control_system: ControlSystem,

    #[serde(default = "default_num_displays")]
    pub num_displays: u32,
    #[serde(default = "default_team_size")]
    pub team_size: u32,
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,

    #[serde(default)]
    pub unit_cost_override: Option<f64>,
    #[serde(default)]
    pub target_margin_pct: f64,
    #[serde(default = "default_contingency_pct")]
    pub contingency_pct: f64,
    #[serde(default)]
    pub bond_required: bool,
    #[serde(default = "default_service_level")]
    pub service_level: ServiceLevel,
    #[serde(default = "default_timeline")]
    pub timeline: Timeline,
}

fn default_venue() -> VenueType {
    VenueType::Corporate
}

fn default_structure() -> StructureCondition {
    StructureCondition::Existing
}

fn default_installation() -> InstallationType {
    InstallationType::New
}

fn default_labor() -> LaborType {
    LaborType::NonUnion
}

fn default_access() -> Access {
    Access::Front
}

fn default_power_distance() -> PowerDistance {
    PowerDistance::Close
}

fn default_capacity() -> ElectricalCapacity {
    ElectricalCapacity::Adequate
}

fn default_complexity() -> Complexity {
    Complexity::Standard
}

fn default_control_system() -> ControlSystem {
    ControlSystem::Include
}

fn default_num_displays() -> u32 {
    1
}

fn default_team_size() -> u32 {
    4
}

fn default_duration_days() -> u32 {
    14
}

fn default_contingency_pct() -> f64 {
    5.0
}

fn default_service_level() -> ServiceLevel {
    ServiceLevel::Bronze
}

fn default_timeline() -> Timeline {
    Timeline::Standard
}

impl ProjectInput {
    /// Check every input invariant before any cost stage runs.
    ///
    /// A margin at or above 100% would make the markup factor infinite or
    /// negative, so it is rejected here rather than surfacing as `inf`
    /// downstream.
    pub fn validate(&self) -> Result<(), QuoteError> {
        fn positive(field: &'static str, value: f64) -> Result<(), QuoteError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(QuoteError::invalid(field, "must be strictly positive"))
            }
        }

        positive("width_ft", self.width_ft)?;
        positive("height_ft", self.height_ft)?;
        positive("pixel_pitch_mm", self.pixel_pitch_mm)?;

        if self.num_displays == 0 {
            return Err(QuoteError::invalid("num_displays", "must be at least 1"));
        }
        if self.team_size == 0 {
            return Err(QuoteError::invalid("team_size", "must be at least 1"));
        }
        if self.duration_days == 0 {
            return Err(QuoteError::invalid("duration_days", "must be at least 1"));
        }

        if let Some(rate) = self.unit_cost_override {
            if !rate.is_finite() || rate < 0.0 {
                return Err(QuoteError::invalid(
                    "unit_cost_override",
                    "must be a positive dollar rate",
                ));
            }
        }

        if !(0.0..100.0).contains(&self.target_margin_pct) {
            return Err(QuoteError::invalid(
                "target_margin_pct",
                "must be in [0, 100); a 100% margin would divide by zero",
            ));
        }
        if !(0.0..100.0).contains(&self.contingency_pct) {
            return Err(QuoteError::invalid("contingency_pct", "must be in [0, 100)"));
        }

        Ok(())
    }
}

/// One computed cost category: the internal raw cost, the client-facing
/// marked-up cost, and a display-only note on how the raw figure was built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub category: String,
    pub description: String,
    pub raw_cost: f64,
    pub marked_up_cost: f64,
    pub calculation: String,
}

impl CostLine {
    pub fn new(category: &str, description: &str, raw_cost: f64, calculation: String) -> Self {
        CostLine {
            category: category.to_string(),
            description: description.to_string(),
            raw_cost,
            marked_up_cost: 0.0,
            calculation,
        }
    }
}

/// Pricing knobs as resolved for this quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingMeta {
    /// Effective margin as a fraction (0.30 for the 30% default).
    pub margin: f64,
    /// 1 / (1 - margin).
    pub markup_factor: f64,
    /// Contingency as a fraction.
    pub contingency: f64,
    pub timeline_multiplier: f64,
    pub timeline_surcharge: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSummary {
    /// Marked-up total including bond, before contingency.
    pub subtotal: f64,
    pub contingency: f64,
    pub timeline_surcharge: f64,
    pub final_sell_price: f64,
    /// Annual service contract estimate; reporting metadata, not part of the
    /// contract price.
    pub annual_service: f64,
}

/// Complete output of one quote computation. Immutable; the line order is
/// the display order of the audit-trail table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub lines: Vec<CostLine>,
    pub pricing: PricingMeta,
    pub summary: QuoteSummary,
}

impl QuoteResult {
    /// Marked-up cost for a category label, if present.
    pub fn marked_up(&self, category: &str) -> Option<f64> {
        self.lines
            .iter()
            .find(|l| l.category == category)
            .map(|l| l.marked_up_cost)
    }
}

/// Input plus result, bundled for persistence collaborators that only need
/// a byte-for-byte round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub input: ProjectInput,
    pub result: QuoteResult,
}
