//! Source coverage: how many scored articles came from each (source, tier) pair.

use std::collections::HashMap;

use crate::model::{Article, SourceCoverage, TrustTier};

pub const MAX_COVERAGE_ROWS: usize = 12;

pub fn aggregate_coverage<'a>(articles: impl IntoIterator<Item = &'a Article>) -> Vec<SourceCoverage> {
    let mut counts: HashMap<(String, TrustTier), u32> = HashMap::new();
    for a in articles {
        *counts.entry((a.source.clone(), a.trust_tier)).or_insert(0) += 1;
    }

    let mut rows: Vec<SourceCoverage> = counts
        .into_iter()
        .map(|((source, tier), count)| SourceCoverage { source, tier, count })
        .collect();
    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.tier.cmp(&b.tier))
    });
    rows.truncate(MAX_COVERAGE_ROWS);
    rows
}
