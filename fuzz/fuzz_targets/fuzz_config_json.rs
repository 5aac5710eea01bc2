//! Fuzz target: `SorterConfig::from_json`
//!
//! Arbitrary override documents must either be rejected with a typed
//! error or produce a config; a config that validates must have distinct
//! sort directions.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use wastesort::config::SorterConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = SorterConfig::from_json(raw) {
        if config.validate().is_ok() {
            assert_ne!(config.recyclable_direction, config.non_recyclable_direction);
        }
    }
});
