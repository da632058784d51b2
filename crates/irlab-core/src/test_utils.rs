//! Test utilities for irlab-core.
//!
//! Shared fixtures for unit tests. Only compiled when running tests.

use crate::index::{Index, InMemoryIndexBuilder, SimpleAnalyzer};
use crate::search::{Query, Track};
use std::sync::Arc;

/// Documents of the fixture index, in document-number order.
///
/// Documents `d3` and `d4` are identical so ties can be exercised.
pub const FIXTURE_DOCS: &[(&str, &str)] = &[
    ("d0", "apple banana apple"),
    ("d1", "banana cherry"),
    ("d2", "apple banana cherry fig"),
    ("d3", "durian grape"),
    ("d4", "durian grape"),
    ("d5", "lemon lime lemon melon apple"),
];

/// Builds the fixture index.
pub fn fixture_index() -> Arc<dyn Index> {
    let mut builder = InMemoryIndexBuilder::new(SimpleAnalyzer);
    for (id, text) in FIXTURE_DOCS {
        builder.add_document(*id, text).unwrap();
    }
    Arc::new(builder.build())
}

/// Three queries against the fixture index; query 3 matches nothing.
pub fn fixture_track() -> Track {
    Track::new(
        "FIX",
        vec![
            Query::new(1, "apple banana"),
            Query::new(2, "cherry fig"),
            Query::new(3, "zebra"),
        ],
    )
}
