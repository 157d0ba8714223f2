//! Figma URL field extraction.
//!
//! extract_file_key / extract_node_id / extract_depth -> DesignReference
//! No network access; every call works on the raw input string.
//!
//! Accepted shapes (scheme and `www.` optional):
//!   https://www.figma.com/file/<KEY>/<title>?node-id=<ID>
//!   figma.com/design/<KEY>/<title>-<DEPTH>
//!
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::LazyLock;

use crate::error::ClientError;

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https?://)?(www\.)?").expect("static regex"));
static FILE_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"figma\.com/(file|design)/([^/?]+)").expect("static regex"));
static NODE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"node-id=([^&]+)").expect("static regex"));
// Last hyphen-prefixed digit run with no further hyphen before end of input.
static DEPTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)[^-]*$").expect("static regex"));

pub const MIN_DEPTH: u8 = 1;
pub const MAX_DEPTH: u8 = 10;

/// Which optional fields are pulled out of a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSet {
    pub node_id: bool,
    pub depth: bool,
}

impl Default for FieldSet {
    fn default() -> Self {
        Self {
            node_id: true,
            depth: true,
        }
    }
}

/// The (file key, node id, depth) triple identifying what to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesignReference {
    pub file_key: String,
    pub node_id: Option<String>,
    pub depth: Option<u8>,
}

impl DesignReference {
    /// Build a reference from one input line. Only the file key is mandatory.
    pub fn parse(url: &str, fields: FieldSet) -> Result<Self, ClientError> {
        let file_key = extract_file_key(url)?;
        let node_id = if fields.node_id {
            extract_node_id(url)
        } else {
            None
        };
        let depth = if fields.depth {
            extract_depth(url)
        } else {
            None
        };
        Ok(Self {
            file_key,
            node_id,
            depth,
        })
    }

    /// Tool arguments: `fileKey` always, `nodeId` / `depth` only when known.
    pub fn to_arguments(&self) -> Map<String, Value> {
        let mut args = Map::new();
        args.insert("fileKey".into(), Value::String(self.file_key.clone()));
        if let Some(node_id) = &self.node_id {
            args.insert("nodeId".into(), Value::String(node_id.clone()));
        }
        if let Some(depth) = self.depth {
            args.insert("depth".into(), Value::Number(depth.into()));
        }
        args
    }
}

impl fmt::Display for DesignReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File key: {}, Node ID: {}, Depth: {}",
            self.file_key,
            self.node_id.as_deref().unwrap_or("none"),
            self.depth
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string())
        )
    }
}

/// Extract the file key following `figma.com/file/` or `figma.com/design/`.
pub fn extract_file_key(url: &str) -> Result<String, ClientError> {
    let normalized = PREFIX_RE.replace(url, "");
    FILE_KEY_RE
        .captures(&normalized)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ClientError::InvalidUrlFormat {
            url: url.to_string(),
        })
}

/// Value of the `node-id` query parameter, kept percent-encoded as given.
pub fn extract_node_id(url: &str) -> Option<String> {
    NODE_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Trailing `-<n>` token as a depth, when 1 <= n <= 10.
///
/// Anything else (no token, zero, out of range, overflow) is "unspecified".
/// This can misfire on URLs whose key or title happens to end in `-<digits>`.
pub fn extract_depth(url: &str) -> Option<u8> {
    let digits = DEPTH_RE.captures(url)?.get(1)?.as_str();
    let n = digits.parse::<u8>().ok()?;
    (MIN_DEPTH..=MAX_DEPTH).contains(&n).then_some(n)
}
