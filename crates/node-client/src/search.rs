// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Free-text explorer search
//!
//! A query is classified by its shape into an ordered list of lookups; the
//! first lookup that finds something wins.

use std::sync::LazyLock;

use api_client::Transport;
use regex::Regex;
use shared_types::SearchResult;
use tracing::{debug, info};

use crate::ResilientClient;

/// Length above which an unclassified query is also tried as a hash
const HASH_LIKE_LEN: usize = 30;

/// Prefix of the node's own wallet addresses
const WALLET_ADDRESS_PREFIX: &str = "wallet_addr_";

#[allow(clippy::expect_used)]
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

#[allow(clippy::expect_used)]
static HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0x)?[0-9a-fA-F]{64}$").expect("valid regex"));

#[allow(clippy::expect_used)]
static ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0x)?[0-9a-fA-F]{40}$").expect("valid regex"));

/// A lookup a query qualifies for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchTarget {
    /// Block at this height
    Block(u64),
    /// Transaction with this hash
    Transaction(String),
    /// Address
    Address(String),
}

/// Lookups to attempt for `query`, in order
///
/// Empty for a blank query.
pub fn plan(query: &str) -> Vec<SearchTarget> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    // Digits too large for a height are classified like any other text
    let height = NUMBER
        .is_match(query)
        .then(|| query.parse::<u64>().ok())
        .flatten();
    let is_number = height.is_some();
    let is_hash = HASH.is_match(query);
    let is_address = ADDRESS.is_match(query) || query.starts_with(WALLET_ADDRESS_PREFIX);

    let mut targets = Vec::new();
    if let Some(height) = height {
        targets.push(SearchTarget::Block(height));
    }
    if is_hash || (!is_number && !is_address && query.len() > HASH_LIKE_LEN) {
        targets.push(SearchTarget::Transaction(query.to_string()));
    }
    if is_address || (!is_number && !is_hash) {
        targets.push(SearchTarget::Address(query.to_string()));
    }
    targets
}

impl<T: Transport> ResilientClient<T> {
    /// Search blocks, transactions and addresses by free text
    pub async fn search(&self, query: &str) -> SearchResult {
        if query.trim().is_empty() {
            debug!("rejecting empty search query");
            return SearchResult::empty_query();
        }

        for target in plan(query) {
            debug!(?target, "search lookup");
            let found = match target {
                SearchTarget::Block(height) => self
                    .get_block_by_id(height)
                    .await
                    .map(|data| SearchResult::Block { data }),
                SearchTarget::Transaction(hash) => self
                    .get_transaction_by_hash(&hash)
                    .await
                    .map(|data| SearchResult::Transaction { data }),
                SearchTarget::Address(address) => self
                    .get_address_info(&address)
                    .await
                    .map(|data| SearchResult::Address { data }),
            };
            if let Some(result) = found {
                return result;
            }
        }

        info!(query = query.trim(), "search found nothing");
        SearchResult::not_found()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_plans_nothing() {
        assert!(plan("").is_empty());
        assert!(plan("   ").is_empty());
    }

    #[test]
    fn digits_are_a_block() {
        assert_eq!(plan("12345"), vec![SearchTarget::Block(12345)]);
        assert_eq!(plan(" 7 "), vec![SearchTarget::Block(7)]);
    }

    #[test]
    fn hashes_are_transactions() {
        let hash = format!("0x{}", "a".repeat(64));
        assert_eq!(plan(&hash), vec![SearchTarget::Transaction(hash.clone())]);

        let bare = "F".repeat(64);
        assert_eq!(plan(&bare), vec![SearchTarget::Transaction(bare.clone())]);
    }

    #[test]
    fn addresses_go_straight_to_address_lookup() {
        let address = format!("0x{}", "a".repeat(40));
        assert_eq!(plan(&address), vec![SearchTarget::Address(address.clone())]);

        assert_eq!(
            plan("wallet_addr_1234567890abcdef1234567890"),
            vec![SearchTarget::Address(
                "wallet_addr_1234567890abcdef1234567890".to_string()
            )]
        );
    }

    #[test]
    fn long_unknown_queries_try_transaction_then_address() {
        let query = "x".repeat(31);
        assert_eq!(
            plan(&query),
            vec![
                SearchTarget::Transaction(query.clone()),
                SearchTarget::Address(query.clone())
            ]
        );
        assert_eq!(plan("alice"), vec![SearchTarget::Address("alice".to_string())]);
    }

    #[test]
    fn digits_beyond_a_height_are_an_address() {
        let digits = "9".repeat(23);
        assert_eq!(plan(&digits), vec![SearchTarget::Address(digits.clone())]);
    }

    #[test]
    fn numeric_hash_tries_block_then_transaction() {
        let digits = "1".repeat(64);
        // too large for a height, so only the hash lookup remains
        assert_eq!(plan(&digits), vec![SearchTarget::Transaction(digits.clone())]);
    }
}
