//! Cross-provider merge for one topic, keyed by canonical URL.
//!
//! - First occurrence seeds the entry.
//! - Later occurrences append their citations (no de-dup) and contribute their summary
//!   when it is longer.
//! - Differing provider tags collapse to `MIXED`.
//!
//! Output keeps first-seen order; final ranking happens after scoring.

use std::collections::HashMap;

use crate::model::{Article, ProviderTag};
use crate::text::canonical_url;

pub fn merge_articles(items: impl IntoIterator<Item = Article>) -> Vec<Article> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Article> = Vec::new();

    for item in items {
        let key = canonical_url(&item.url);
        match index.get(&key) {
            Some(&i) => absorb(&mut out[i], item),
            None => {
                index.insert(key, out.len());
                out.push(item);
            }
        }
    }
    out
}

fn absorb(into: &mut Article, other: Article) {
    into.citations.extend(other.citations);
    if other.summary.chars().count() > into.summary.chars().count() {
        into.summary = other.summary;
    }
    if into.provider != other.provider {
        into.provider = ProviderTag::Mixed;
    }
    if into.source_url.is_none() {
        into.source_url = other.source_url;
    }
}
