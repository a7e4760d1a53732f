// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Logical operations and the paths that serve them
//!
//! Ledger nodes do not agree on where a dataset lives, so each logical
//! operation lists its candidate paths in priority order together with the
//! extraction strategies used to flatten whatever envelope comes back.

use api_client::ApiError;
use url::Url;

use crate::extract::Extraction;

const LIST_BLOCKS: &[Extraction] = &[
    Extraction::DirectArray,
    Extraction::NamedArray("blocks"),
    Extraction::ObjectValues,
];

const LIST_TRANSACTIONS: &[Extraction] = &[
    Extraction::DirectArray,
    Extraction::NamedArray("transactions"),
    Extraction::ObjectValues,
];

/// A named capability mapped to candidate relative paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalOperation {
    /// Name used in logs
    pub name: &'static str,
    /// Relative paths to try, in order
    pub candidates: &'static [&'static str],
    /// Strategies flattening a response into a record sequence; empty for
    /// operations returning a single object
    pub strategies: &'static [Extraction],
}

/// Node-wide counters
pub const STATISTICS: LogicalOperation = LogicalOperation {
    name: "statistics",
    candidates: &["/statistics"],
    strategies: &[],
};

/// Most recent blocks
pub const LATEST_BLOCKS: LogicalOperation = LogicalOperation {
    name: "latest blocks",
    candidates: &[
        "/explorer/latest-blocks",
        "/blocks/latest",
        "/blockchain/latest-blocks",
    ],
    strategies: LIST_BLOCKS,
};

/// The whole chain, oldest block first
pub const CHAIN: LogicalOperation = LogicalOperation {
    name: "chain",
    candidates: &["/blockchain"],
    strategies: &[
        Extraction::DirectArray,
        Extraction::NamedArray("chain"),
        Extraction::NamedArray("blocks"),
        Extraction::ObjectValues,
    ],
};

/// Most recent transactions
pub const LATEST_TRANSACTIONS: LogicalOperation = LogicalOperation {
    name: "latest transactions",
    candidates: &["/explorer/latest-transactions", "/transactions/latest"],
    strategies: LIST_TRANSACTIONS,
};

/// One block by height
pub const BLOCK_BY_ID: LogicalOperation = LogicalOperation {
    name: "block by id",
    candidates: &["/explorer/block"],
    strategies: &[],
};

/// One transaction by hash
pub const TRANSACTION_BY_HASH: LogicalOperation = LogicalOperation {
    name: "transaction by hash",
    candidates: &["/explorer/transaction"],
    strategies: &[],
};

/// Explorer view of an address
pub const ADDRESS_INFO: LogicalOperation = LogicalOperation {
    name: "address info",
    candidates: &["/explorer/address"],
    strategies: &[],
};

/// Richest addresses
pub const TOP_ADDRESSES: LogicalOperation = LogicalOperation {
    name: "top addresses",
    candidates: &["/explorer/top-addresses"],
    strategies: &[
        Extraction::DirectArray,
        Extraction::NamedArray("addresses"),
        Extraction::ObjectValues,
    ],
};

/// Pending transactions
pub const MEMPOOL: LogicalOperation = LogicalOperation {
    name: "mempool",
    candidates: &["/mempool", "/explorer/mempool"],
    strategies: LIST_TRANSACTIONS,
};

/// The node's own wallet
pub const WALLET: LogicalOperation = LogicalOperation {
    name: "wallet",
    candidates: &["/wallet", "/explorer/wallet"],
    strategies: &[],
};

/// Connected peers
pub const PEERS: LogicalOperation = LogicalOperation {
    name: "peers",
    candidates: &["/peers", "/network/peers"],
    strategies: &[
        Extraction::DirectArray,
        Extraction::NamedArray("peers"),
        Extraction::ObjectValues,
    ],
};

/// Mining difficulty
pub const DIFFICULTY: LogicalOperation = LogicalOperation {
    name: "difficulty",
    candidates: &["/difficulty"],
    strategies: &[],
};

/// Node settings
pub const SETTINGS: LogicalOperation = LogicalOperation {
    name: "settings",
    candidates: &["/settings"],
    strategies: &[],
};

/// Write targets, one path each
pub mod writes {
    /// Submit a transfer
    pub const CREATE_TRANSACTION: &str = "/transaction";
    /// Mine the mempool into a block
    pub const MINE_BLOCK: &str = "/mine";
    /// Change the mining difficulty
    pub const SET_DIFFICULTY: &str = "/difficulty";
    /// Replace node settings
    pub const UPDATE_SETTINGS: &str = "/settings";
    /// Connect to another node
    pub const CONNECT_PEER: &str = "/peers/connect";
    /// Ask peers for their chain
    pub const SYNC_BLOCKCHAIN: &str = "/blockchain/sync";
}

/// A logical operation bound to its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// The operation being performed
    pub operation: LogicalOperation,
    /// Trailing path segment, such as a block height or hash
    pub segment: Option<String>,
    /// Query parameters sent with every candidate
    pub query: Vec<(String, String)>,
}

impl LogicalOperation {
    /// Bind the operation without arguments
    pub fn call(self) -> Call {
        Call {
            operation: self,
            segment: None,
            query: Vec::new(),
        }
    }

    /// Bind the operation with a trailing path segment
    pub fn call_with(self, segment: impl Into<String>) -> Call {
        Call {
            operation: self,
            segment: Some(segment.into()),
            query: Vec::new(),
        }
    }
}

impl Call {
    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Relative paths to try, with the segment applied
    pub fn paths(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        self.operation
            .candidates
            .iter()
            .map(|path| (*path, self.segment.as_deref()))
    }
}

/// Build `<base>/<path>[/<segment>]`, percent-encoding the segment
///
/// # Errors
///
/// Returns a transport error when `base` is not an absolute url
pub fn endpoint_url(base: &str, path: &str, segment: Option<&str>) -> Result<String, ApiError> {
    let mut url = Url::parse(base)
        .map_err(|e| ApiError::transport(format!("invalid node url {base}: {e}")))?;

    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| ApiError::transport(format!("node url {base} cannot be a base")))?;
        segments.pop_if_empty();
        segments.extend(path.split('/').filter(|part| !part.is_empty()));
        if let Some(segment) = segment {
            segments.push(segment);
        }
    }

    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_path_and_segment() {
        assert_eq!(
            endpoint_url("http://localhost:8080/api", "/statistics", None).unwrap(),
            "http://localhost:8080/api/statistics"
        );
        assert_eq!(
            endpoint_url("http://localhost:8080/api/", "/explorer/block", Some("7")).unwrap(),
            "http://localhost:8080/api/explorer/block/7"
        );
        assert_eq!(
            endpoint_url("http://h:1/api", "/explorer/address", Some("a b/c")).unwrap(),
            "http://h:1/api/explorer/address/a%20b%2Fc"
        );
    }

    #[test]
    fn endpoint_rejects_relative_base() {
        let error = endpoint_url("localhost/api", "/statistics", None).unwrap_err();
        assert!(error.is_transport());
    }

    #[test]
    fn calls_carry_segment_and_query() {
        let call = LATEST_BLOCKS.call().query("limit", 5);
        assert_eq!(call.query, vec![("limit".to_string(), "5".to_string())]);
        assert_eq!(call.paths().count(), 3);

        let call = BLOCK_BY_ID.call_with("12");
        let (path, segment) = call.paths().next().unwrap();
        assert_eq!(path, "/explorer/block");
        assert_eq!(segment, Some("12"));
    }

    #[test]
    fn latest_blocks_prefers_explorer_path() {
        assert_eq!(LATEST_BLOCKS.candidates[0], "/explorer/latest-blocks");
        assert_eq!(MEMPOOL.candidates.len(), 2);
        assert!(STATISTICS.strategies.is_empty());
    }
}
