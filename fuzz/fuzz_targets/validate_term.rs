//! Fuzz target for term validation.
//!
//! Checks that validation terminates on arbitrary term graphs (including
//! pre-existing cycles) and that the verdict matches the error list.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lexicorrect::{Term, Validator};

#[derive(Arbitrary, Debug)]
struct Input {
    existing: Vec<(String, String, bool)>,
    term: String,
    replacement: String,
    exclude: Option<u8>,
}

fuzz_target!(|input: Input| {
    let existing: Vec<Term> = input
        .existing
        .into_iter()
        .take(128)
        .enumerate()
        .map(|(i, (term, replacement, active))| {
            let mut t = Term::new(i.to_string(), "fuzz", term, replacement);
            t.active = active;
            t
        })
        .collect();
    let exclude = input.exclude.map(|i| i.to_string());

    let result = Validator::default().validate_term(
        &existing,
        "fuzz",
        &input.term,
        &input.replacement,
        exclude.as_deref(),
    );
    assert_eq!(result.is_valid(), result.errors.is_empty());
});
