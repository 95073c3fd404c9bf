// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashSet;

use crate::error::{ParseError, Result};

/// Ordered, deduplicated, bounded list of candidate URLs.
#[derive(Debug)]
pub(crate) struct CandidateList {
    urls: Vec<String>,
    seen: HashSet<String>,
    max_results: usize,
}

impl CandidateList {
    pub(crate) fn new(max_results: usize) -> Self {
        Self {
            urls: Vec::new(),
            seen: HashSet::new(),
            max_results,
        }
    }

    pub(crate) fn is_full(&self) -> bool {
        self.urls.len() >= self.max_results
    }

    /// Adds `url` unless the list is full or it was already collected.
    pub(crate) fn push(&mut self, url: String) -> bool {
        if self.is_full() || url.is_empty() || self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub(crate) fn finish(self) -> Result<Vec<String>> {
        if self.urls.is_empty() {
            return Err(ParseError::NoMatches);
        }
        Ok(self.urls)
    }
}

/// Precise matches first, then fallback matches fill whatever room is left.
///
/// Both passes walk `items` in the order given and share one seen-set, so an
/// entry accepted in the first pass is never repeated by the second.
pub(crate) fn collect_two_pass<T>(
    items: &[T],
    max_results: usize,
    precise: impl Fn(&T) -> bool,
    fallback: impl Fn(&T) -> bool,
    url_of: impl Fn(&T) -> Option<String>,
) -> Result<Vec<String>> {
    let mut list = CandidateList::new(max_results);

    for item in items {
        if list.is_full() {
            break;
        }
        if precise(item) {
            if let Some(url) = url_of(item) {
                list.push(url);
            }
        }
    }

    for item in items {
        if list.is_full() {
            break;
        }
        if fallback(item) {
            if let Some(url) = url_of(item) {
                list.push(url);
            }
        }
    }

    list.finish()
}
