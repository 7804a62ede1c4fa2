//! In-memory [`DocumentApi`] with failure injection

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use stretto_common::{Error, Result};

use super::{BlockRef, ContentBlock, DocumentApi, PageRef, RemoteBlock, MAX_CHILDREN_PER_APPEND, MAX_TEXT_LEN};

/// Operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeOp {
    FindPage,
    CreatePage,
    ListChildren,
    AppendChildren,
    DeleteBlock,
}

#[derive(Debug, Clone)]
struct FakePage {
    id: String,
    key: String,
    properties: Value,
}

#[derive(Debug, Default)]
struct State {
    pages: Vec<FakePage>,
    /// Block content without children
    blocks: HashMap<String, ContentBlock>,
    /// Ordered child ids per parent (pages included)
    children: HashMap<String, Vec<String>>,
    failing: HashSet<FakeOp>,
    calls: Vec<FakeOp>,
}

impl State {
    fn check(&mut self, op: FakeOp) -> Result<()> {
        self.calls.push(op);
        if self.failing.contains(&op) {
            return Err(Error::RemoteApi(format!("injected {:?} failure", op)));
        }
        Ok(())
    }

    fn insert(&mut self, parent: &str, block: &ContentBlock) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let shallow = match block {
            ContentBlock::Toggle { rich_text, .. } => ContentBlock::Toggle {
                rich_text: rich_text.clone(),
                children: Vec::new(),
            },
            other => other.clone(),
        };
        self.blocks.insert(id.clone(), shallow);
        self.children.entry(parent.to_string()).or_default().push(id.clone());
        for child in block.children() {
            self.insert(&id, child);
        }
        id
    }

    fn remove(&mut self, id: &str) {
        self.blocks.remove(id);
        for child in self.children.remove(id).unwrap_or_default() {
            self.remove(&child);
        }
    }

    fn tree(&self, parent: &str) -> Vec<ContentBlock> {
        self.children
            .get(parent)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| {
                        let block = self.blocks.get(id)?;
                        Some(match block {
                            ContentBlock::Toggle { rich_text, .. } => ContentBlock::Toggle {
                                rich_text: rich_text.clone(),
                                children: self.tree(id),
                            },
                            other => other.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Reject what the real API answers with a 400
fn validate(blocks: &[ContentBlock]) -> Result<()> {
    if blocks.len() > MAX_CHILDREN_PER_APPEND {
        return Err(Error::RemoteApi(format!(
            "400: children length {} exceeds {}",
            blocks.len(),
            MAX_CHILDREN_PER_APPEND
        )));
    }
    for block in blocks {
        if let Some(run) = block.rich_text().iter().find(|run| run.len() > MAX_TEXT_LEN) {
            return Err(Error::RemoteApi(format!(
                "400: text.content length {} exceeds {}",
                run.len(),
                MAX_TEXT_LEN
            )));
        }
        validate(block.children())?;
    }
    Ok(())
}

/// Document tool kept entirely in memory
///
/// Deleting a block removes its descendants, like the real API. Appends
/// over the API's request limits are rejected with a 400.
#[derive(Debug, Default)]
pub struct FakeDocumentApi {
    state: Mutex<State>,
}

impl FakeDocumentApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register an existing page for `key`; returns its id
    pub fn add_page(&self, key: &str) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.lock().pages.push(FakePage {
            id: id.clone(),
            key: key.to_string(),
            properties: Value::Null,
        });
        id
    }

    /// Place blocks under `parent` without recording a call
    pub fn seed_children(&self, parent: &str, blocks: &[ContentBlock]) -> Vec<String> {
        let mut state = self.lock();
        blocks.iter().map(|block| state.insert(parent, block)).collect()
    }

    /// Make `op` fail until [`FakeDocumentApi::recover`] is called
    pub fn fail(&self, op: FakeOp) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: FakeOp) {
        self.lock().failing.remove(&op);
    }

    /// Current content of `parent`, children nested
    pub fn tree(&self, parent: &str) -> Vec<ContentBlock> {
        self.lock().tree(parent)
    }

    /// Number of blocks held across all pages
    pub fn block_count(&self) -> usize {
        self.lock().blocks.len()
    }

    /// Id of the page registered for `key`
    pub fn page_id(&self, key: &str) -> Option<String> {
        self.lock().pages.iter().find(|p| p.key == key).map(|p| p.id.clone())
    }

    /// Properties a page was created with
    pub fn page_properties(&self, page_id: &str) -> Option<Value> {
        self.lock()
            .pages
            .iter()
            .find(|p| p.id == page_id)
            .map(|p| p.properties.clone())
    }

    /// Operations attempted so far, in order
    pub fn calls(&self) -> Vec<FakeOp> {
        self.lock().calls.clone()
    }
}

#[async_trait]
impl DocumentApi for FakeDocumentApi {
    async fn find_page_by_key(&self, key: &str) -> Result<Option<PageRef>> {
        let mut state = self.lock();
        state.check(FakeOp::FindPage)?;
        Ok(state
            .pages
            .iter()
            .find(|page| page.key == key)
            .map(|page| PageRef { id: page.id.clone(), url: None }))
    }

    async fn create_page(&self, properties: Value) -> Result<PageRef> {
        let mut state = self.lock();
        state.check(FakeOp::CreatePage)?;
        let key = properties
            .pointer("/piece_id/rich_text/0/text/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let id = uuid::Uuid::new_v4().to_string();
        state.pages.push(FakePage {
            id: id.clone(),
            key,
            properties,
        });
        Ok(PageRef { id, url: None })
    }

    async fn list_children(&self, block_id: &str, page_size: u32) -> Result<Vec<RemoteBlock>> {
        let mut state = self.lock();
        state.check(FakeOp::ListChildren)?;
        let ids = state.children.get(block_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .take(page_size as usize)
            .filter_map(|id| {
                let block = state.blocks.get(id)?;
                let mut listed = RemoteBlock::from_content(id.clone(), block);
                listed.has_children = state.children.get(id).is_some_and(|c| !c.is_empty());
                Some(listed)
            })
            .collect())
    }

    async fn append_children(&self, block_id: &str, blocks: &[ContentBlock]) -> Result<Vec<BlockRef>> {
        let mut state = self.lock();
        state.check(FakeOp::AppendChildren)?;
        validate(blocks)?;
        Ok(blocks
            .iter()
            .map(|block| BlockRef {
                id: state.insert(block_id, block),
                kind: block.kind().to_string(),
            })
            .collect())
    }

    async fn delete_block(&self, block_id: &str) -> Result<()> {
        let mut state = self.lock();
        state.check(FakeOp::DeleteBlock)?;
        if !state.blocks.contains_key(block_id) {
            return Err(Error::RemoteApi(format!("404: block {} not found", block_id)));
        }
        state.remove(block_id);
        for siblings in state.children.values_mut() {
            siblings.retain(|id| id != block_id);
        }
        Ok(())
    }
}
