#![no_main]

use greenci::parser::TimeReportParser;
use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    // Reports are read as UTF-8; anything else never reaches the parser
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok(parser) = TimeReportParser::new() {
            let _ = parser.parse(Path::new("metrics.txt"), input);
        }
    }
});
