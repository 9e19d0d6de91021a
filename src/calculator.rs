//! Cost stage functions and the quote composition pipeline
//!
//! The pipeline order is the load-bearing contract: General Conditions,
//! Permits, Bond, and Contingency each read a running total that already
//! includes previously applied markup and fees. Reordering these stages, or
//! feeding them raw (pre-markup) figures, silently changes the final price.

use crate::error::QuoteError;
use crate::models::{
    Access, Complexity, ControlSystem, CostLine, ElectricalCapacity, InstallationType, LaborType,
    PowerDistance, PricingMeta, ProjectInput, QuoteResult, QuoteSummary, ServiceLevel,
    StructureCondition, Timeline, VenueType,
};
use crate::rates::{CostConfig, RateCard};

/// Display labels for the eighteen cost lines, in audit-trail order.
pub mod category {
    pub const HARDWARE: &str = "Hardware";
    pub const STRUCTURAL_MATERIALS: &str = "Structural Materials";
    pub const STRUCTURAL_LABOR: &str = "Structural Labor";
    pub const LED_INSTALLATION: &str = "LED Installation";
    pub const ELECTRICAL_MATERIALS: &str = "Electrical Materials";
    pub const ELECTRICAL_LABOR: &str = "Electrical Labor";
    pub const CMS_EQUIPMENT: &str = "CMS Equipment";
    pub const CMS_INSTALLATION: &str = "CMS Installation";
    pub const CMS_COMMISSIONING: &str = "CMS Commissioning";
    pub const PROJECT_MANAGEMENT: &str = "Project Management";
    pub const GENERAL_CONDITIONS: &str = "General Conditions";
    pub const TRAVEL_EXPENSES: &str = "Travel & Expenses";
    pub const SUBMITTALS: &str = "Submittals";
    pub const ENGINEERING: &str = "Engineering";
    pub const PERMITS: &str = "Permits";
    pub const FINAL_COMMISSIONING: &str = "Final Commissioning";
    pub const BOND: &str = "Bond";
    pub const CONTINGENCY: &str = "Contingency";
}

/// PM overhead grows with project length past the two-week baseline.
fn duration_factor(duration_days: u32) -> f64 {
    (f64::from(duration_days) / 14.0).max(1.0)
}

/// Complexity factor for Project Management and Submittals.
fn complexity_overhead_factor(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Standard => 1.0,
        Complexity::High => 1.5,
        Complexity::VeryHigh => 2.0,
    }
}

/// Complexity factor for install-hour stages (LED install, final testing).
/// Only High scales hours here; the 2.0 factor is an overhead-only knob.
fn complexity_install_factor(complexity: Complexity) -> f64 {
    match complexity {
        Complexity::Standard | Complexity::VeryHigh => 1.0,
        Complexity::High => 1.5,
    }
}

fn access_install_factor(access: Access) -> f64 {
    match access {
        Access::Rear => 1.15,
        Access::Crane => 1.4,
        Access::Front | Access::Lift => 1.0,
    }
}

fn venue_permit_multiplier(venue: VenueType) -> f64 {
    match venue {
        VenueType::Nfl => 1.5,
        VenueType::Nba => 1.3,
        VenueType::Ncaa => 1.2,
        VenueType::Transit => 1.8,
        VenueType::Corporate => 1.0,
    }
}

/// Per-head travel rates by venue: (flight, hotel/night, per diem/day).
fn venue_travel_rates(venue: VenueType) -> (f64, f64, f64) {
    match venue {
        VenueType::Nfl => (400.0, 200.0, 75.0),
        VenueType::Nba => (300.0, 180.0, 70.0),
        VenueType::Ncaa => (350.0, 160.0, 65.0),
        VenueType::Transit => (500.0, 250.0, 85.0),
        VenueType::Corporate => (200.0, 150.0, 60.0),
    }
}

fn timeline_multiplier(timeline: Timeline) -> f64 {
    match timeline {
        Timeline::Standard | Timeline::Multiphase => 1.0,
        Timeline::Rush => 1.2,
        Timeline::Asap => 1.5,
    }
}

fn service_multiplier(level: ServiceLevel) -> f64 {
    match level {
        ServiceLevel::Gold => 0.15,
        ServiceLevel::Silver => 0.08,
        ServiceLevel::Bronze => 0.05,
        ServiceLevel::SelfService => 0.0,
    }
}

fn power_distance_ft(distance: PowerDistance) -> f64 {
    match distance {
        PowerDistance::Close => 50.0,
        PowerDistance::Medium => 150.0,
        PowerDistance::Far => 300.0,
    }
}

/// Category 1: LED panels, cabinets, mounting hardware.
fn hardware_cost(input: &ProjectInput, base_rate: f64) -> CostLine {
    let sq_ft = input.width_ft * input.height_ft;
    let raw = sq_ft * base_rate * f64::from(input.num_displays);

    CostLine::new(
        category::HARDWARE,
        "LED display panels, cabinets, mounting hardware",
        raw,
        format!(
            "{sq_ft} sq ft × ${base_rate}/sq ft × {} displays",
            input.num_displays
        ),
    )
}

/// Category 2: steel, truss, concrete, fasteners.
fn structural_materials(input: &ProjectInput, hardware_raw: f64, config: &CostConfig) -> CostLine {
    let condition_multiplier = if input.structure_condition == StructureCondition::NewSteel {
        1.3
    } else if input.installation_type == InstallationType::Retrofit {
        1.15
    } else {
        1.0
    };

    let raw = hardware_raw * config.structural_materials_pct * condition_multiplier;

    CostLine::new(
        category::STRUCTURAL_MATERIALS,
        "Steel, truss, concrete, fasteners",
        raw,
        format!(
            "Hardware × {:.0}% × {condition_multiplier:.2} (condition factor)",
            config.structural_materials_pct * 100.0
        ),
    )
}

/// Category 3: structural installation labor.
fn structural_labor(
    input: &ProjectInput,
    hardware_raw: f64,
    materials_raw: f64,
    config: &CostConfig,
) -> CostLine {
    let mut labor_multiplier = match input.labor_type {
        LaborType::NonUnion => 1.0,
        LaborType::Union => 1.3,
        LaborType::Prevailing => 1.5,
    };
    if input.access == Access::Rear {
        labor_multiplier += 0.15;
    }

    let raw = (hardware_raw + materials_raw) * config.structural_labor_pct * labor_multiplier;

    CostLine::new(
        category::STRUCTURAL_LABOR,
        "Structural installation labor",
        raw,
        format!(
            "(Hardware + Structural Materials) × {:.0}% × {labor_multiplier:.2} (labor/access factor)",
            config.structural_labor_pct * 100.0
        ),
    )
}

/// Category 4: display mounting, alignment, testing.
fn led_installation(input: &ProjectInput, config: &CostConfig) -> CostLine {
    let sq_ft = input.width_ft * input.height_ft;
    let total_hours = sq_ft
        * config.hours_per_sqft
        * f64::from(input.num_displays)
        * complexity_install_factor(input.complexity)
        * access_install_factor(input.access);

    // 20% of hours at the lead-tech rate, the rest at the tech rate.
    let raw = total_hours * 0.2 * config.lead_tech_rate + total_hours * 0.8 * config.tech_rate;
    let blended = 0.2 * config.lead_tech_rate + 0.8 * config.tech_rate;

    CostLine::new(
        category::LED_INSTALLATION,
        "Display mounting, alignment, testing",
        raw,
        format!("{total_hours:.1} hours × blended rate ${blended:.2}/hr"),
    )
}

fn pdu_count(input: &ProjectInput, config: &CostConfig) -> f64 {
    (f64::from(input.num_displays) * config.pdus_per_display).ceil()
}

/// Category 5: PDUs, cabling, switches, plus a panel upgrade when the
/// existing service is undersized.
fn electrical_materials(input: &ProjectInput, config: &CostConfig) -> CostLine {
    let displays = f64::from(input.num_displays);

    let pdu_cost = pdu_count(input, config) * config.pdu_unit_cost;
    let cabling_cost = displays * power_distance_ft(input.power_distance) * config.cable_cost_per_ft;
    let switch_cost = (displays / config.displays_per_switch).ceil() * config.switch_unit_cost;
    let upgrades = if input.electrical_capacity == ElectricalCapacity::Limited {
        config.panel_upgrade_cost
    } else {
        0.0
    };

    CostLine::new(
        category::ELECTRICAL_MATERIALS,
        "PDUs, cabling, switches, equipment",
        pdu_cost + cabling_cost + switch_cost + upgrades,
        format!(
            "PDU: ${pdu_cost:.0} + Cabling: ${cabling_cost:.0} + Switches: ${switch_cost:.0} + Upgrades: ${upgrades:.0}"
        ),
    )
}

/// Category 6: licensed electrical contractor installation.
fn electrical_labor(input: &ProjectInput, config: &CostConfig) -> CostLine {
    let hours = pdu_count(input, config) * config.electrical_hours_per_pdu;
    let raw = hours * config.electrician_rate;

    CostLine::new(
        category::ELECTRICAL_LABOR,
        "Licensed electrical contractor installation",
        raw,
        format!("{hours:.0} hours × ${:.0}/hr", config.electrician_rate),
    )
}

/// Category 7: control system licenses/servers plus content players.
fn cms_equipment(input: &ProjectInput, config: &CostConfig) -> CostLine {
    let base = if input.control_system == ControlSystem::Include {
        config.cms_base_cost
    } else {
        0.0
    };
    let player_cost = (f64::from(input.num_displays) / config.displays_per_player).ceil()
        * config.player_unit_cost;

    CostLine::new(
        category::CMS_EQUIPMENT,
        "Control system licenses, servers, content players",
        base + player_cost,
        format!("CMS: ${base:.0} + Players: ${player_cost:.0}"),
    )
}

/// Category 8: CMS setup and configuration.
fn cms_installation(input: &ProjectInput, config: &CostConfig) -> CostLine {
    let hours = f64::from(input.num_displays) * config.cms_install_hours_per_display;
    let raw = hours * config.lead_tech_rate;

    CostLine::new(
        category::CMS_INSTALLATION,
        "CMS setup and configuration",
        raw,
        format!("{hours:.0} hours × ${:.0}/hr", config.lead_tech_rate),
    )
}

/// Category 9: CMS testing and final configuration.
fn cms_commissioning(input: &ProjectInput, config: &CostConfig) -> CostLine {
    let hours = f64::from(input.num_displays) * config.cms_commissioning_hours_per_display;
    let raw = hours * config.lead_tech_rate;

    CostLine::new(
        category::CMS_COMMISSIONING,
        "CMS testing and final configuration",
        raw,
        format!("{hours:.0} hours × ${:.0}/hr", config.lead_tech_rate),
    )
}

/// Category 10: PM oversight, scaled by complexity and project length.
/// Reads the raw hard-cost subtotal of categories 1-9.
fn project_management(
    input: &ProjectInput,
    subtotal_before_soft: f64,
    config: &CostConfig,
) -> CostLine {
    let complexity_factor = complexity_overhead_factor(input.complexity);
    let duration = duration_factor(input.duration_days);
    let raw = (subtotal_before_soft * config.pm_pct * complexity_factor * duration).round();

    CostLine::new(
        category::PROJECT_MANAGEMENT,
        "PM oversight and coordination",
        raw,
        format!(
            "Subtotal × {:.0}% × {complexity_factor:.2} (complexity) × {duration:.2} (duration)",
            config.pm_pct * 100.0
        ),
    )
}

/// Category 11: insurance and site overhead. Reads the marked-up running
/// total, never raw costs.
fn general_conditions(input: &ProjectInput, total_marked_up: f64, config: &CostConfig) -> CostLine {
    let duration = duration_factor(input.duration_days);
    let raw = (total_marked_up * config.general_conditions_pct * duration).round();

    CostLine::new(
        category::GENERAL_CONDITIONS,
        "Insurance, site overhead",
        raw,
        format!(
            "Marked-up total × {:.0}% × {duration:.2} (duration factor)",
            config.general_conditions_pct * 100.0
        ),
    )
}

/// Category 12: flights, hotels, per diem for the installation team.
fn travel_expenses(input: &ProjectInput) -> CostLine {
    let (flight, hotel, per_diem) = venue_travel_rates(input.venue_type);
    let team = f64::from(input.team_size);
    let days = f64::from(input.duration_days);

    let flight_cost = flight * team * 2.0; // one round trip
    let hotel_cost = hotel * team * days;
    let per_diem_cost = per_diem * team * days;

    CostLine::new(
        category::TRAVEL_EXPENSES,
        "Flights, hotels, per diem for installation team",
        (flight_cost + hotel_cost + per_diem_cost).round(),
        format!(
            "Flights: ${flight_cost:.0} + Hotel: ${hotel_cost:.0} + Per Diem: ${per_diem_cost:.0}"
        ),
    )
}

/// Category 13: engineering documents, permit paperwork.
fn submittals(input: &ProjectInput, config: &CostConfig) -> CostLine {
    let complexity_factor = complexity_overhead_factor(input.complexity);
    let raw = (config.submittal_per_display * f64::from(input.num_displays) * complexity_factor)
        .round();

    CostLine::new(
        category::SUBMITTALS,
        "Engineering documents, permits paperwork",
        raw,
        format!(
            "${:.0} × {} displays × {complexity_factor:.2}",
            config.submittal_per_display, input.num_displays
        ),
    )
}

/// Category 14: structural study for new steel; electrical study for the
/// major-league venues.
fn engineering(input: &ProjectInput, config: &CostConfig) -> CostLine {
    let structural = if input.structure_condition == StructureCondition::NewSteel {
        config.structural_engineering_fee
    } else {
        0.0
    };
    let electrical = if matches!(input.venue_type, VenueType::Nfl | VenueType::Nba) {
        config.electrical_engineering_fee
    } else {
        0.0
    };

    CostLine::new(
        category::ENGINEERING,
        "Structural and electrical engineering studies",
        structural + electrical,
        format!("Structural: ${structural:.0} + Electrical: ${electrical:.0}"),
    )
}

/// Category 15: local jurisdiction permitting. Reads the marked-up running
/// total after General Conditions has been folded in.
fn permits(input: &ProjectInput, total_marked_up: f64, config: &CostConfig) -> CostLine {
    let venue_factor = venue_permit_multiplier(input.venue_type);
    let raw = (total_marked_up * config.permit_pct * venue_factor).round();

    CostLine::new(
        category::PERMITS,
        "Local jurisdiction permitting costs",
        raw,
        format!(
            "Project value × {:.0}% × {venue_factor:.2} (venue factor)",
            config.permit_pct * 100.0
        ),
    )
}

/// Category 16: final testing, calibration, and handoff.
fn final_commissioning(input: &ProjectInput, config: &CostConfig) -> CostLine {
    let hours = f64::from(input.num_displays)
        * config.testing_hours_per_display
        * complexity_install_factor(input.complexity);
    let raw = (hours * config.lead_tech_rate).round() + config.testing_equipment_cost;

    CostLine::new(
        category::FINAL_COMMISSIONING,
        "Final testing, calibration, and handoff",
        raw,
        format!(
            "{hours:.0} hours × ${:.0}/hr + Equipment: ${:.0}",
            config.lead_tech_rate, config.testing_equipment_cost
        ),
    )
}

/// Compute a full quote with the default rate card and cost configuration.
pub fn compute_quote_default(input: &ProjectInput) -> Result<QuoteResult, QuoteError> {
    compute_quote(input, &RateCard::default(), &CostConfig::default())
}

/// Compute the eighteen-line quote for one project.
///
/// Pure and stateless: identical inputs always produce identical output.
/// The stage order below is normative; see the module docs.
pub fn compute_quote(
    input: &ProjectInput,
    rates: &RateCard,
    config: &CostConfig,
) -> Result<QuoteResult, QuoteError> {
    input.validate()?;

    // Stages 1-9: hard costs, raw.
    let base_rate = rates.resolve(input, config);
    let mut hardware = hardware_cost(input, base_rate);
    let mut struct_mat = structural_materials(input, hardware.raw_cost, config);
    let mut struct_lab = structural_labor(input, hardware.raw_cost, struct_mat.raw_cost, config);
    let mut led = led_installation(input, config);
    let mut elec_mat = electrical_materials(input, config);
    let mut elec_lab = electrical_labor(input, config);
    let mut cms_eq = cms_equipment(input, config);
    let mut cms_inst = cms_installation(input, config);
    let mut cms_comm = cms_commissioning(input, config);

    let subtotal_before_soft = hardware.raw_cost
        + struct_mat.raw_cost
        + struct_lab.raw_cost
        + led.raw_cost
        + elec_mat.raw_cost
        + elec_lab.raw_cost
        + cms_eq.raw_cost
        + cms_inst.raw_cost
        + cms_comm.raw_cost;

    // Stages 10, 12-15: soft costs, raw. PM reads the hard-cost subtotal.
    let mut pm = project_management(input, subtotal_before_soft, config);
    let mut travel = travel_expenses(input);
    let mut subm = submittals(input, config);
    let mut eng = engineering(input, config);
    let mut final_comm = final_commissioning(input, config);

    // Margin resolution. validate() already bounds the input percentage,
    // so the division below can never hit zero or go negative.
    let margin = if input.target_margin_pct > 0.0 {
        input.target_margin_pct / 100.0
    } else {
        config.default_margin
    };
    if margin >= 1.0 {
        return Err(QuoteError::invalid(
            "target_margin_pct",
            "effective margin must be below 100%",
        ));
    }
    let markup_factor = 1.0 / (1.0 - margin);

    // Mark up categories 1-10 and 12-15 individually, rounding each line.
    let mut total_marked_up = 0.0;
    for line in [
        &mut hardware,
        &mut struct_mat,
        &mut struct_lab,
        &mut led,
        &mut elec_mat,
        &mut elec_lab,
        &mut cms_eq,
        &mut cms_inst,
        &mut cms_comm,
        &mut pm,
        &mut travel,
        &mut subm,
        &mut eng,
        &mut final_comm,
    ] {
        line.marked_up_cost = (line.raw_cost * markup_factor).round();
        total_marked_up += line.marked_up_cost;
    }

    // General Conditions consumes the marked-up running total, then is
    // itself marked up and folded back in.
    let mut gc = general_conditions(input, total_marked_up, config);
    gc.marked_up_cost = (gc.raw_cost * markup_factor).round();
    total_marked_up += gc.marked_up_cost;

    // Permits reads the running total updated with General Conditions.
    let mut permit = permits(input, total_marked_up, config);
    permit.marked_up_cost = (permit.raw_cost * markup_factor).round();
    total_marked_up += permit.marked_up_cost;

    // Bond is a percentage of an already-marked-up total; no second markup.
    let bond_cost = if input.bond_required {
        (total_marked_up * config.bond_pct).round()
    } else {
        0.0
    };
    let mut bond = CostLine::new(
        category::BOND,
        "Performance bond",
        bond_cost,
        format!(
            "Marked-up total × {:.1}% (if required)",
            config.bond_pct * 100.0
        ),
    );
    bond.marked_up_cost = bond_cost;

    let subtotal = total_marked_up + bond_cost;

    let contingency_frac = input.contingency_pct / 100.0;
    let contingency_cost = (subtotal * contingency_frac).round();
    let mut contingency = CostLine::new(
        category::CONTINGENCY,
        "Project contingency reserve",
        contingency_cost,
        format!("Subtotal × {:.1}%", input.contingency_pct),
    );
    contingency.marked_up_cost = contingency_cost;

    let sell_price_before_timeline = subtotal + contingency_cost;

    // Timeline surcharge lands last, on the contingency-inclusive price.
    let multiplier = timeline_multiplier(input.timeline);
    let surcharge = (sell_price_before_timeline * (multiplier - 1.0)).round();
    let final_sell_price = (sell_price_before_timeline * multiplier).round();

    let annual_service = (final_sell_price * service_multiplier(input.service_level)).round();

    let lines = vec![
        hardware, struct_mat, struct_lab, led, elec_mat, elec_lab, cms_eq, cms_inst, cms_comm,
        pm, gc, travel, subm, eng, permit, final_comm, bond, contingency,
    ];

    Ok(QuoteResult {
        lines,
        pricing: PricingMeta {
            margin,
            markup_factor,
            contingency: contingency_frac,
            timeline_multiplier: multiplier,
            timeline_surcharge: surcharge,
        },
        summary: QuoteSummary {
            subtotal,
            contingency: contingency_cost,
            timeline_surcharge: surcharge,
            final_sell_price,
            annual_service,
        },
    })
}

/// Format the audit-trail table a proposal renderer would show:
/// category | description | raw cost | calculation | marked-up price.
pub fn format_breakdown(result: &QuoteResult, verbose: bool) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<4}{:<22}{:>14}{:>14}\n",
        "#", "Category", "Raw $", "Price $"
    ));
    output.push_str(&format!("{}\n", "-".repeat(54)));

    for (i, line) in result.lines.iter().enumerate() {
        output.push_str(&format!(
            "{:<4}{:<22}{:>14.0}{:>14.0}\n",
            format!("{}.", i + 1),
            line.category,
            line.raw_cost,
            line.marked_up_cost
        ));
        if verbose {
            output.push_str(&format!("      {}\n", line.description));
            output.push_str(&format!("      {}\n", line.calculation));
        }
    }

    output.push_str(&format!("{}\n", "-".repeat(54)));
    output.push_str(&format!(
        "{:<26}{:>28.0}\n",
        "Grand Total", result.summary.final_sell_price
    ));

    output
}

impl std::fmt::Display for QuoteSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Quote Summary ===")?;
        writeln!(f, "Subtotal (incl. bond): ${:.0}", self.subtotal)?;
        writeln!(f, "Contingency:           ${:.0}", self.contingency)?;
        writeln!(f, "Timeline surcharge:    ${:.0}", self.timeline_surcharge)?;
        writeln!(f, "Final sell price:      ${:.0}", self.final_sell_price)?;
        writeln!(f, "Annual service:        ${:.0}", self.annual_service)?;
        Ok(())
    }
}
