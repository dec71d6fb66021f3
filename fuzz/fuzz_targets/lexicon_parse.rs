//! Fuzz target for lexicon parsing.
//!
//! Ensures that malformed store files, import files and JSON mappings
//! don't cause panics.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lexicorrect::store::{parse_import, parse_terms};
use lexicorrect::{Config, ResolvedLexicon};

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8 strings
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_terms(s);
        let _ = parse_import(s);
        let _ = ResolvedLexicon::from_json_str(s);
        let _ = toml::from_str::<Config>(s);
    }
});
