#![no_main]

use greenci::parser::parse_eco_report;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _ = parse_eco_report(Path::new("eco-ci-output.json"), input);
    }
});
