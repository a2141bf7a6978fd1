//! Search and lookup collaborators
//!
//! Providers are blocking; the runtime calls them on worker threads and
//! posts the outcome back to the update loop as a message.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::entity::{EntityPath, RawEntity, RawId};
use crate::trigger::Category;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Resolves candidate entities for a mention query
pub trait SearchProvider: Send + Sync {
    fn search(&self, category: Category, query: &str) -> Result<Vec<RawEntity>, ProviderError>;
}

/// Resolves a same-origin link path to the entity it names.
/// `Ok(None)` means no entity matches, which is not an error.
pub trait EntityLookupProvider: Send + Sync {
    fn lookup(&self, path: &str) -> Result<Option<RawEntity>, ProviderError>;
}

// ============================================================================
// Fixture provider
// ============================================================================

/// In-memory provider backed by a JSON document shaped like the search API:
/// `{"users": [...], "channels": [...], "blocks": [...]}`
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    entities: Vec<RawEntity>,
}

#[derive(Debug, Default, Deserialize)]
struct FixtureFile {
    #[serde(default)]
    users: Vec<serde_json::Value>,
    #[serde(default)]
    channels: Vec<serde_json::Value>,
    #[serde(default)]
    blocks: Vec<serde_json::Value>,
}

impl FixtureProvider {
    pub fn new(entities: Vec<RawEntity>) -> Self {
        Self { entities }
    }

    pub fn from_json(json: &str) -> Result<Self, ProviderError> {
        let file: FixtureFile =
            serde_json::from_str(json).map_err(|e| ProviderError::Decode(e.to_string()))?;

        let mut entities = Vec::new();
        for (category, records) in [
            (Category::User, file.users),
            (Category::Channel, file.channels),
            (Category::Block, file.blocks),
        ] {
            for record in records {
                match RawEntity::from_value(category, record) {
                    Ok(raw) => entities.push(raw),
                    Err(e) => tracing::warn!("Skipping malformed {} fixture: {}", category, e),
                }
            }
        }
        Ok(Self { entities })
    }

    pub fn load(path: &Path) -> Result<Self, ProviderError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ProviderError::Transport(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Lowercased identity and display strings a query is matched against
fn searchable_text(raw: &RawEntity) -> Vec<String> {
    let fields = match raw {
        RawEntity::User(u) => vec![u.slug.clone(), u.username.clone()],
        RawEntity::Channel(c) => vec![c.slug.clone(), c.title.clone()],
        RawEntity::Block(b) => vec![b.title.clone(), b.description.clone()],
    };
    fields.into_iter().flatten().map(|s| s.to_lowercase()).collect()
}

fn identity(raw: &RawEntity) -> Option<String> {
    match raw {
        RawEntity::User(u) => u.slug.clone(),
        RawEntity::Channel(c) => c.slug.clone(),
        RawEntity::Block(b) => b.id.clone().map(RawId::into_string),
    }
}

impl SearchProvider for FixtureProvider {
    fn search(&self, category: Category, query: &str) -> Result<Vec<RawEntity>, ProviderError> {
        let needle = query.to_lowercase();
        Ok(self
            .entities
            .iter()
            .filter(|raw| raw.category() == category)
            .filter(|raw| searchable_text(raw).iter().any(|s| s.contains(&needle)))
            .cloned()
            .collect())
    }
}

impl EntityLookupProvider for FixtureProvider {
    fn lookup(&self, path: &str) -> Result<Option<RawEntity>, ProviderError> {
        let Some(target) = EntityPath::parse(path) else {
            return Ok(None);
        };
        Ok(self
            .entities
            .iter()
            .find(|raw| {
                raw.category() == target.category
                    && identity(raw).as_deref() == Some(target.id.as_str())
            })
            .cloned())
    }
}
