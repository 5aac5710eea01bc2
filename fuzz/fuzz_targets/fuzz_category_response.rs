//! Fuzz target: classifier response parsing
//!
//! Drives arbitrary bytes through the response parser and the text-to-
//! category mapping.  Neither may panic, and a category other than
//! `Unknown` must come from one of the exact tokens.
//!
//! cargo fuzz run fuzz_category_response

#![no_main]

use libfuzzer_sys::fuzz_target;
use wastesort::app::model::WasteCategory;
use wastesort::classifier::{candidate_text, parse_response};

fuzz_target!(|data: &[u8]| {
    let parsed = parse_response(data);

    if let Ok(text) = candidate_text(data) {
        let category = WasteCategory::from_response(&text);
        assert_eq!(parsed, Ok(category));
        if category != WasteCategory::Unknown {
            let token = text.trim_matches(|c: char| c.is_ascii_whitespace());
            assert_eq!(token, category.label());
        }
    }

    // Raw text goes through the same mapping.
    if let Ok(text) = core::str::from_utf8(data) {
        let _ = WasteCategory::from_response(text);
    }
});
