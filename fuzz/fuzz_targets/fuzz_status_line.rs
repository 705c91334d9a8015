//! Fuzz target: `StatusRecord::parse_line`
//!
//! Arbitrary text must never panic the parser.  Anything it accepts must
//! format back to a line that parses to the same mode and flags.
//!
//! cargo fuzz run fuzz_status_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use thermostat::app::telemetry::StatusRecord;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(record) = StatusRecord::parse_line(text) else {
        return;
    };

    let line = record.to_string();
    assert_eq!(line.split(',').count(), 5, "wire form must have five fields");

    let again = StatusRecord::parse_line(&line).expect("own output must parse");
    assert_eq!(again.mode, record.mode);
    assert_eq!(again.heating_active, record.heating_active);
    assert_eq!(again.cooling_active, record.cooling_active);
    assert_eq!(again.temperature.is_some(), record.temperature.is_some());
});
