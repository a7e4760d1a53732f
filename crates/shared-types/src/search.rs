// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Explorer search results

use serde::{Deserialize, Serialize};

use crate::{AddressInfo, Block, Transaction};

/// Outcome of a free-text explorer search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum SearchResult {
    /// Query matched a block
    Block { data: Block },
    /// Query matched a transaction
    Transaction { data: Transaction },
    /// Query matched an address
    Address { data: AddressInfo },
    /// Every lookup the query qualified for came back empty
    NotFound { message: String },
    /// Query was rejected before any lookup
    Invalid { message: String },
}

impl SearchResult {
    /// Result for a query matching nothing
    pub fn not_found() -> Self {
        Self::NotFound {
            message: "No results found for query".to_string(),
        }
    }

    /// Result for an empty query
    pub fn empty_query() -> Self {
        Self::Invalid {
            message: "Empty search query".to_string(),
        }
    }

    /// Whether the search produced an entity
    pub fn is_found(&self) -> bool {
        matches!(
            self,
            Self::Block { .. } | Self::Transaction { .. } | Self::Address { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tagged_serialization() {
        let value = serde_json::to_value(SearchResult::empty_query()).unwrap();
        assert_eq!(value, json!({"type": "invalid", "message": "Empty search query"}));

        let value = serde_json::to_value(SearchResult::not_found()).unwrap();
        assert_eq!(value["type"], "not_found");
        assert!(!SearchResult::not_found().is_found());
    }
}
