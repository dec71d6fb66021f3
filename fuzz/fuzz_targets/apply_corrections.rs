//! Fuzz target for text correction.
//!
//! Arbitrary mappings and text must never panic, and an empty mapping must
//! leave the text untouched.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lexicorrect::{apply_corrections, ResolvedLexicon};

#[derive(Arbitrary, Debug)]
struct Input {
    mapping: Vec<(String, String)>,
    text: String,
}

fuzz_target!(|input: Input| {
    let lexicon: ResolvedLexicon = input.mapping.iter().take(64).cloned().collect();
    let _ = apply_corrections(&input.text, &lexicon);

    assert_eq!(
        apply_corrections(&input.text, &ResolvedLexicon::new()),
        input.text
    );
});
