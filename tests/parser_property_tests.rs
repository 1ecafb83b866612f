//! Property-based tests for report parsing and unit normalisation

mod utils;

use greenci::parser::{
    parse_eco_report, DurationUnit, EnergyUnit, LogScanner, MassUnit, TimeReportParser,
};
use proptest::prelude::*;
use std::path::Path;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_time_report_never_panics(content in ".{0,400}") {
        let parser = TimeReportParser::new().unwrap();
        // any outcome is fine as long as it is not a panic
        let _ = parser.parse(Path::new("metrics.txt"), &content);
    }

    #[test]
    fn prop_elapsed_time_round_trips(hours in 0u64..3, minutes in 0u64..60, centis in 0u64..6000) {
        let seconds = centis as f64 / 100.0;
        let line = if hours > 0 {
            format!("\tElapsed (wall clock) time (h:mm:ss or m:ss): {}:{:02}:{:05.2}\n", hours, minutes, seconds)
        } else {
            format!("\tElapsed (wall clock) time (h:mm:ss or m:ss): {}:{:05.2}\n", minutes, seconds)
        };
        let record = TimeReportParser::new().unwrap().parse(Path::new("metrics.txt"), &line).unwrap();
        let expected = (hours * 3600 + minutes * 60) as f64 + seconds;
        prop_assert!((record.wall_time_s.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_generated_report_fields(
        wall in 0.01f64..500.0,
        user in 0.0f64..500.0,
        sys in 0.0f64..50.0,
        passed in 0u32..5000,
    ) {
        let content = utils::time_report("parallel", wall, user, sys, passed);
        let record = TimeReportParser::new().unwrap().parse(Path::new("metrics.txt"), &content).unwrap();
        prop_assert_eq!(record.strategy.as_deref(), Some("parallel"));
        prop_assert!((record.wall_time_s.unwrap() - wall).abs() < 0.006);
        prop_assert!((record.cpu_user_s.unwrap() - user).abs() < 0.006);
        prop_assert_eq!(record.tests_executed, Some(passed as u64));
        prop_assert_eq!(record.max_rss_kb, Some(51200));
    }

    #[test]
    fn prop_milli_units_scale_by_thousand(value in 0.0f64..1e9) {
        let joules = EnergyUnit::parse("mJ").unwrap().to_canonical(value);
        let seconds = DurationUnit::parse("ms").unwrap().to_canonical(value);
        let grams = MassUnit::parse("mg").unwrap().to_canonical(value);
        prop_assert!((joules * 1000.0 - value).abs() <= value * 1e-12);
        prop_assert_eq!(joules, seconds);
        prop_assert_eq!(joules, grams);
    }

    #[test]
    fn prop_eco_report_energy_in_joules(energy_mj in 0.0f64..1e9, duration_ms in 0.0f64..1e7) {
        let json = utils::eco_report(energy_mj, duration_ms, 0.01);
        let record = parse_eco_report(Path::new("eco-ci-output.json"), &json).unwrap();
        prop_assert!((record.energy_j.unwrap() - energy_mj / 1000.0).abs() < 1e-6);
        prop_assert!((record.wall_time_s.unwrap() - duration_ms / 1000.0).abs() < 1e-6);
    }

    #[test]
    fn prop_log_scan_energy(value in 0u32..10_000_000) {
        let log = format!("2024-01-01T00:00:00Z Energy: {} mJ\n", value);
        let metrics = LogScanner::new().unwrap().scan("1", &log).unwrap();
        prop_assert!((metrics.energy_j.unwrap() - value as f64 / 1000.0).abs() < 1e-9);
    }
}

#[test]
fn test_unknown_units_rejected() {
    assert!(EnergyUnit::parse("kWh").is_err());
    assert!(DurationUnit::parse("min").is_err());
    assert!(MassUnit::parse("kg").is_err());
}
