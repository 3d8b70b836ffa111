//! Git tree API Data Transfer Objects
//!
//! These types match EXACTLY what the tree-listing endpoint returns.
//! DO NOT use these types outside the thumbs module - convert to manifest
//! entries in the client.
//!
//! API Reference: https://docs.github.com/en/rest/git/trees
//!
//! Example response:
//! ```json
//! {
//!   "sha": "abc",
//!   "tree": [
//!     {"path": "Named_Boxarts/Game (USA).png", "type": "blob", "size": 12345},
//!     {"path": "Named_Snaps", "type": "tree"}
//!   ],
//!   "truncated": false
//! }
//! ```

use serde::Deserialize;

/// Top-level tree listing response
#[derive(Debug, Clone, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub tree: Vec<TreeNode>,
    /// True when the listing was cut off server-side
    #[serde(default)]
    pub truncated: bool,
}

/// One entry in the repository tree
#[derive(Debug, Clone, Deserialize)]
pub struct TreeNode {
    /// Path relative to the repository root
    pub path: String,
    /// "blob" for files, "tree" for directories
    #[serde(rename = "type")]
    pub kind: String,
}
