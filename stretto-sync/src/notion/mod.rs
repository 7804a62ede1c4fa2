//! Remote document API boundary
//!
//! Everything the mirror needs from the document tool goes through
//! [`DocumentApi`]. [`NotionClient`] talks to the real REST API;
//! `FakeDocumentApi` (feature `test-util`) keeps pages and blocks in memory
//! for tests.

pub mod blocks;
mod client;
#[cfg(any(test, feature = "test-util"))]
mod fake;
mod properties;

pub use blocks::{Color, ContentBlock, HeadingLevel, RichText, MAX_CHILDREN_PER_APPEND, MAX_TEXT_LEN};
pub use client::NotionClient;
#[cfg(any(test, feature = "test-util"))]
pub use fake::{FakeDocumentApi, FakeOp};
pub use properties::page_properties;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stretto_common::Result;

/// A page in the repertoire database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Reference to a block created by an append
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A block as listed from a remote page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteBlock {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub has_children: bool,
    /// Remaining fields, including the payload keyed by `kind`
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RemoteBlock {
    /// Build the listed form of a locally constructed block
    pub fn from_content(id: impl Into<String>, block: &ContentBlock) -> Self {
        let mut fields = Map::new();
        fields.insert(block.kind().to_string(), block.payload());
        Self {
            id: id.into(),
            kind: block.kind().to_string(),
            has_children: !block.children().is_empty(),
            fields,
        }
    }

    /// Kind-specific payload
    pub fn payload(&self) -> Option<&Value> {
        self.fields.get(&self.kind)
    }

    /// Concatenated text of the block's rich text
    pub fn label_text(&self) -> String {
        let Some(items) = self
            .payload()
            .and_then(|payload| payload.get("rich_text"))
            .and_then(Value::as_array)
        else {
            return String::new();
        };

        items
            .iter()
            .filter_map(|item| {
                item.get("plain_text")
                    .and_then(Value::as_str)
                    .or_else(|| item.pointer("/text/content").and_then(Value::as_str))
            })
            .collect()
    }

    /// Toggles and toggleable headings can hold a date section
    pub fn is_container(&self) -> bool {
        match self.kind.as_str() {
            "toggle" => true,
            "heading_1" | "heading_2" | "heading_3" => self
                .payload()
                .and_then(|payload| payload.get("is_toggleable"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Capabilities used against the remote document tool
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Page whose `piece_id` property equals `key`
    async fn find_page_by_key(&self, key: &str) -> Result<Option<PageRef>>;

    /// Create a page in the repertoire database with the given properties
    async fn create_page(&self, properties: Value) -> Result<PageRef>;

    /// Direct children of a block or page; only the first `page_size` are returned
    async fn list_children(&self, block_id: &str, page_size: u32) -> Result<Vec<RemoteBlock>>;

    /// Append blocks as the last children of a block or page
    async fn append_children(&self, block_id: &str, blocks: &[ContentBlock]) -> Result<Vec<BlockRef>>;

    /// Delete a block together with all of its descendants
    async fn delete_block(&self, block_id: &str) -> Result<()>;
}
