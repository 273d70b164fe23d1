//! Proptest strategies for titles and service responses.

use proptest::prelude::*;

/// Single-line ASCII market title
pub fn title_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ?$]{0,40}".prop_map(|s| s.trim().to_string())
        .prop_filter("non-empty title", |s| !s.is_empty())
}

pub fn titles_strategy(max: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(title_strategy(), 1..=max)
}

/// Hangul-only text that contains no glossary entry
pub fn hangul_strategy() -> impl Strategy<Value = String> {
    "[가-힣 ]{0,30}"
}

/// A subset of `1..=n` to keep in a response, plus noise lines
pub fn response_shape(n: usize) -> impl Strategy<Value = (Vec<bool>, Vec<String>)> {
    (
        prop::collection::vec(any::<bool>(), n),
        prop::collection::vec("[a-z ]{0,20}", 0..5),
    )
}
