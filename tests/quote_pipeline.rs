//! End-to-end pipeline scenarios and contract properties.

use led_cpq::calculator::{category, compute_quote, compute_quote_default};
use led_cpq::models::*;
use led_cpq::rates::{CostConfig, RateCard};

/// Scenario A's fixture: 40x6 outdoor 10mm ribbon, 30% margin, defaults.
fn ribbon_board() -> ProjectInput {
    ProjectInput {
        client_name: "Scenario A".to_string(),
        product_class: ProductClass::Ribbon,
        venue_type: VenueType::Corporate,
        width_ft: 40.0,
        height_ft: 6.0,
        pixel_pitch_mm: 10.0,
        is_outdoor: true,
        structure_condition: StructureCondition::Existing,
        installation_type: InstallationType::New,
        labor_type: LaborType::NonUnion,
        access: Access::Front,
        power_distance: PowerDistance::Close,
        electrical_capacity: ElectricalCapacity::Adequate,
        complexity: Complexity::Standard,
        control_system: ControlSystem::Include,
        num_displays: 1,
        team_size: 4,
        duration_days: 14,
        unit_cost_override: None,
        target_margin_pct: 30.0,
        contingency_pct: 5.0,
        bond_required: false,
        service_level: ServiceLevel::Bronze,
        timeline: Timeline::Standard,
    }
}

fn line<'a>(result: &'a QuoteResult, cat: &str) -> &'a CostLine {
    result
        .lines
        .iter()
        .find(|l| l.category == cat)
        .unwrap_or_else(|| panic!("missing line {cat}"))
}

#[test]
fn scenario_a_hardware_from_rate_table() {
    let result = compute_quote_default(&ribbon_board()).unwrap();
    let hardware = line(&result, category::HARDWARE);

    // 240 sq ft x (1800 x 1.20) = 518,400 raw.
    assert_eq!(hardware.raw_cost, 518_400.0);
    assert_eq!(hardware.marked_up_cost, (518_400.0 / 0.7_f64).round());
    assert_eq!(
        result.marked_up(category::HARDWARE),
        Some(hardware.marked_up_cost)
    );
}

#[test]
fn scenario_b_manual_override_bypasses_table() {
    let mut input = ribbon_board();
    input.unit_cost_override = Some(500.0);
    let result = compute_quote_default(&input).unwrap();

    // 240 sq ft x $500 exactly, pitch/environment table ignored.
    assert_eq!(line(&result, category::HARDWARE).raw_cost, 120_000.0);
}

#[test]
fn scenario_c_zero_margin_uses_default() {
    let mut input = ribbon_board();
    input.target_margin_pct = 0.0;
    let result = compute_quote_default(&input).unwrap();
    assert_eq!(result.pricing.margin, 0.30);
    assert!((result.pricing.markup_factor - 1.428_571_428_571_428_6).abs() < 1e-12);
}

#[test]
fn scenario_d_full_margin_rejected() {
    let mut input = ribbon_board();
    input.target_margin_pct = 100.0;
    let err = compute_quote_default(&input).unwrap_err();
    assert!(err.to_string().contains("target_margin_pct"));
}

#[test]
fn scenario_e_rush_surcharge() {
    let mut input = ribbon_board();
    input.timeline = Timeline::Rush;
    let rush = compute_quote_default(&input).unwrap();

    input.timeline = Timeline::Standard;
    let standard = compute_quote_default(&input).unwrap();
    let before = standard.summary.final_sell_price;

    assert_eq!(rush.pricing.timeline_multiplier, 1.2);
    assert_eq!(rush.summary.timeline_surcharge, (before * 0.2).round());
    assert_eq!(rush.summary.final_sell_price, (before * 1.2).round());
}

#[test]
fn all_lines_non_negative_and_price_positive() {
    let fixtures = vec![
        ribbon_board(),
        {
            let mut i = ribbon_board();
            i.product_class = ProductClass::CenterHung;
            i.venue_type = VenueType::Nba;
            i.num_displays = 6;
            i.complexity = Complexity::VeryHigh;
            i.bond_required = true;
            i.timeline = Timeline::Asap;
            i
        },
        {
            let mut i = ribbon_board();
            i.pixel_pitch_mm = 1.5;
            i.is_outdoor = false;
            i.labor_type = LaborType::Prevailing;
            i.access = Access::Crane;
            i.duration_days = 45;
            i
        },
    ];

    for input in fixtures {
        let result = compute_quote_default(&input).unwrap();
        assert!(result.summary.final_sell_price > 0.0);
        assert_eq!(result.lines.len(), 18);
        for l in &result.lines {
            assert!(l.marked_up_cost >= 0.0, "{} went negative", l.category);
        }
    }
}

#[test]
fn identical_inputs_yield_identical_output() {
    let input = ribbon_board();
    let a = compute_quote_default(&input).unwrap();
    let b = compute_quote_default(&input).unwrap();
    assert_eq!(a, b);

    let ja = serde_json::to_string(&a).unwrap();
    let jb = serde_json::to_string(&b).unwrap();
    assert_eq!(ja, jb);
}

#[test]
fn wider_displays_never_get_cheaper() {
    let mut previous = 0.0;
    for width in [10.0, 20.0, 40.0, 80.0, 160.0] {
        let mut input = ribbon_board();
        input.width_ft = width;
        let price = compute_quote_default(&input)
            .unwrap()
            .summary
            .final_sell_price;
        assert!(
            price >= previous,
            "price dropped from {previous} to {price} at width {width}"
        );
        previous = price;
    }
}

#[test]
fn each_line_is_rounded_markup_of_its_raw_cost() {
    let result = compute_quote_default(&ribbon_board()).unwrap();
    let mf = result.pricing.markup_factor;

    for l in &result.lines {
        match l.category.as_str() {
            category::BOND | category::CONTINGENCY => {
                assert_eq!(l.raw_cost, l.marked_up_cost)
            }
            _ => assert_eq!(l.marked_up_cost, (l.raw_cost * mf).round(), "{}", l.category),
        }
    }
}

/// The fee chain must consume post-markup running totals in order:
/// General Conditions reads the 14 marked-up lines, Permits reads that plus
/// General Conditions, Bond reads that plus Permits, Contingency reads the
/// bond-inclusive subtotal.
#[test]
fn fee_stages_consume_running_totals_in_order() {
    let mut input = ribbon_board();
    input.venue_type = VenueType::Transit;
    input.bond_required = true;
    input.duration_days = 28;
    let result = compute_quote_default(&input).unwrap();
    let mf = result.pricing.markup_factor;

    let fee_lines = [
        category::GENERAL_CONDITIONS,
        category::PERMITS,
        category::BOND,
        category::CONTINGENCY,
    ];
    let base: f64 = result
        .lines
        .iter()
        .filter(|l| !fee_lines.contains(&l.category.as_str()))
        .map(|l| l.marked_up_cost)
        .sum();

    let duration_factor = 28.0 / 14.0;
    let gc = line(&result, category::GENERAL_CONDITIONS);
    assert_eq!(gc.raw_cost, (base * 0.05 * duration_factor).round());

    let after_gc = base + gc.marked_up_cost;
    let permits = line(&result, category::PERMITS);
    assert_eq!(permits.raw_cost, (after_gc * 0.02 * 1.8_f64).round());

    let after_permits = after_gc + permits.marked_up_cost;
    let bond = line(&result, category::BOND);
    assert_eq!(bond.marked_up_cost, (after_permits * 0.015).round());

    let subtotal = after_permits + bond.marked_up_cost;
    assert_eq!(result.summary.subtotal, subtotal);
    let contingency = line(&result, category::CONTINGENCY);
    assert_eq!(contingency.marked_up_cost, (subtotal * 0.05).round());
    assert_eq!(
        result.summary.final_sell_price,
        subtotal + contingency.marked_up_cost
    );

    // Markup applied to the fee lines themselves.
    assert_eq!(gc.marked_up_cost, (gc.raw_cost * mf).round());
    assert_eq!(permits.marked_up_cost, (permits.raw_cost * mf).round());
}

/// Locks the dependency-order contract: permits computed from raw,
/// pre-markup totals would be a different number.
#[test]
fn permits_from_raw_totals_would_differ() {
    let result = compute_quote_default(&ribbon_board()).unwrap();

    let raw_total: f64 = result
        .lines
        .iter()
        .filter(|l| {
            ![
                category::GENERAL_CONDITIONS,
                category::PERMITS,
                category::BOND,
                category::CONTINGENCY,
            ]
            .contains(&l.category.as_str())
        })
        .map(|l| l.raw_cost)
        .sum();

    let wrong_permits = (raw_total * 0.02).round();
    let canonical = line(&result, category::PERMITS).raw_cost;
    assert_ne!(
        canonical, wrong_permits,
        "permits must read the post-markup running total"
    );
}

#[test]
fn breakdown_order_is_stable() {
    let result = compute_quote_default(&ribbon_board()).unwrap();
    let order: Vec<&str> = result.lines.iter().map(|l| l.category.as_str()).collect();
    assert_eq!(
        order,
        vec![
            category::HARDWARE,
            category::STRUCTURAL_MATERIALS,
            category::STRUCTURAL_LABOR,
            category::LED_INSTALLATION,
            category::ELECTRICAL_MATERIALS,
            category::ELECTRICAL_LABOR,
            category::CMS_EQUIPMENT,
            category::CMS_INSTALLATION,
            category::CMS_COMMISSIONING,
            category::PROJECT_MANAGEMENT,
            category::GENERAL_CONDITIONS,
            category::TRAVEL_EXPENSES,
            category::SUBMITTALS,
            category::ENGINEERING,
            category::PERMITS,
            category::FINAL_COMMISSIONING,
            category::BOND,
            category::CONTINGENCY,
        ]
    );
}

#[test]
fn snapshot_round_trips_through_json() {
    let input = ribbon_board();
    let result = compute_quote_default(&input).unwrap();
    let snapshot = QuoteSnapshot {
        input,
        result,
    };

    let json = serde_json::to_string(&snapshot).unwrap();
    let restored: QuoteSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot, restored);
}

#[test]
fn config_overrides_flow_through_the_pipeline() {
    let input = ribbon_board();
    let rates = RateCard::default();

    let config = CostConfig {
        pm_pct: 0.0,
        ..CostConfig::default()
    };
    let result = compute_quote(&input, &rates, &config).unwrap();
    assert_eq!(line(&result, category::PROJECT_MANAGEMENT).raw_cost, 0.0);

    let baseline = compute_quote(&input, &rates, &CostConfig::default()).unwrap();
    assert!(result.summary.final_sell_price < baseline.summary.final_sell_price);
}
