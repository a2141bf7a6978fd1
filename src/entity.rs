//! Entity payloads and their normalized form
//!
//! Search and lookup responses carry three different record shapes (users,
//! channels, blocks). They are decoded into the `RawEntity` sum type at the
//! provider boundary and coerced into one canonical `Entity` here, so nothing
//! downstream branches on field presence.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::trigger::{Category, TriggerTable};

/// Descriptions longer than this are shortened for previews
pub const DESCRIPTION_SHORT_CHARS: usize = 150;

// ============================================================================
// Raw wire shapes
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetadata {
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAvatar {
    pub thumb: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawThumb {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImage {
    pub thumb: Option<RawThumb>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOwner {
    pub slug: Option<String>,
    pub username: Option<String>,
}

/// Block ids arrive as numbers from the API but may be strings elsewhere
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(u64),
    Text(String),
}

impl RawId {
    pub fn into_string(self) -> String {
        match self {
            RawId::Number(n) => n.to_string(),
            RawId::Text(s) => s,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawUser {
    pub slug: Option<String>,
    pub username: Option<String>,
    pub avatar_image: Option<RawAvatar>,
    pub metadata: Option<RawMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChannel {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub user: Option<RawOwner>,
    pub metadata: Option<RawMetadata>,
    /// Number of blocks in the channel
    pub length: Option<u64>,
    pub collaborators: Option<Vec<RawOwner>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    pub id: Option<RawId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<RawImage>,
}

/// A decoded but not yet normalized entity record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RawEntity {
    User(RawUser),
    Channel(RawChannel),
    Block(RawBlock),
}

impl RawEntity {
    pub fn category(&self) -> Category {
        match self {
            RawEntity::User(_) => Category::User,
            RawEntity::Channel(_) => Category::Channel,
            RawEntity::Block(_) => Category::Block,
        }
    }

    /// Decode a search record whose category is known from the request
    pub fn from_value(
        category: Category,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match category {
            Category::User => RawEntity::User(serde_json::from_value(value)?),
            Category::Channel => RawEntity::Channel(serde_json::from_value(value)?),
            Category::Block => RawEntity::Block(serde_json::from_value(value)?),
        })
    }

    /// Decode a lookup record. A record that names its own kind in
    /// `base_class` (or `class`) wins over `expected`; any class other than
    /// user or channel is a block.
    pub fn from_lookup_value(
        expected: Category,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        let class = value
            .get("base_class")
            .or_else(|| value.get("class"))
            .and_then(|v| v.as_str());
        let category = match class {
            None => expected,
            Some("User") => Category::User,
            Some("Channel") => Category::Channel,
            Some(_) => Category::Block,
        };
        Self::from_value(category, value)
    }
}

// ============================================================================
// Normalized entity
// ============================================================================

/// What gets spliced into the buffer when an entity is picked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertionStyle {
    /// `[title](url)`
    #[default]
    Markdown,
    /// Trigger character followed by the id, e.g. `@ann`
    Trigger,
}

/// Resolved insertion form for one normalization pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Markdown,
    Trigger(char),
}

impl InsertionStyle {
    /// Falls back to markdown when no trigger maps to `category`
    pub fn for_category(self, category: Category, table: &TriggerTable) -> Insertion {
        match self {
            InsertionStyle::Markdown => Insertion::Markdown,
            InsertionStyle::Trigger => table
                .trigger_for(category)
                .map_or(Insertion::Markdown, Insertion::Trigger),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{category} payload is missing its {field}")]
    MissingIdentity {
        category: Category,
        field: &'static str,
    },
}

/// Canonical mention. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub image_url: Option<String>,
    /// Same-origin path of the entity's page
    pub url: String,
    pub description: String,
    pub description_short: String,
    pub insertion_text: String,
    /// Extra preview line (channels: block count and members)
    pub meta: Option<String>,
}

/// Normalize with the canonical markdown insertion form
pub fn normalize(raw: &RawEntity) -> Result<Entity, NormalizeError> {
    normalize_with(raw, Insertion::Markdown)
}

pub fn normalize_with(raw: &RawEntity, insertion: Insertion) -> Result<Entity, NormalizeError> {
    let category = raw.category();
    let missing = |field| NormalizeError::MissingIdentity { category, field };

    let (id, title, url, image_url, description, meta) = match raw {
        RawEntity::User(user) => {
            let slug = non_empty(&user.slug).ok_or_else(|| missing("slug"))?;
            let title = non_empty(&user.username).unwrap_or_else(|| slug.clone());
            let image = user.avatar_image.as_ref().and_then(|a| a.thumb.clone());
            let url = format!("/{slug}");
            (slug, title, url, image, metadata_description(&user.metadata), None)
        }
        RawEntity::Channel(channel) => {
            let slug = non_empty(&channel.slug).ok_or_else(|| missing("slug"))?;
            let title = non_empty(&channel.title).unwrap_or_else(|| slug.clone());
            let owner = channel.user.as_ref().and_then(|u| non_empty(&u.slug));
            let url = match owner {
                Some(owner) => format!("/{owner}/{slug}"),
                None => format!("/{slug}"),
            };
            let meta = channel_meta(channel);
            (slug, title, url, None, metadata_description(&channel.metadata), meta)
        }
        RawEntity::Block(block) => {
            let id = block
                .id
                .clone()
                .map(RawId::into_string)
                .filter(|s| !s.is_empty())
                .ok_or_else(|| missing("id"))?;
            let title = non_empty(&block.title).unwrap_or_else(|| id.clone());
            let image = block
                .image
                .as_ref()
                .and_then(|i| i.thumb.as_ref())
                .and_then(|t| t.url.clone());
            let url = format!("/block/{id}");
            let description = block.description.clone().unwrap_or_default();
            (id, title, url, image, description, None)
        }
    };

    let insertion_text = match insertion {
        Insertion::Markdown => format!("[{title}]({url})"),
        Insertion::Trigger(trigger) => format!("{trigger}{id}"),
    };

    Ok(Entity {
        description_short: shorten_description(&description),
        id,
        title,
        category,
        image_url,
        url,
        description,
        insertion_text,
        meta,
    })
}

/// Truncate to `DESCRIPTION_SHORT_CHARS` characters, appending `...` when cut
pub fn shorten_description(description: &str) -> String {
    match description.char_indices().nth(DESCRIPTION_SHORT_CHARS) {
        None => description.to_string(),
        Some((cut, _)) => format!("{}...", &description[..cut]),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

fn metadata_description(metadata: &Option<RawMetadata>) -> String {
    metadata
        .as_ref()
        .and_then(|m| m.description.clone())
        .unwrap_or_default()
}

fn channel_meta(channel: &RawChannel) -> Option<String> {
    let length = channel.length?;
    let members: Vec<&str> = channel
        .user
        .iter()
        .chain(channel.collaborators.iter().flatten())
        .filter_map(|u| u.username.as_deref())
        .collect();
    if members.is_empty() {
        Some(format!("{length} blocks"))
    } else {
        Some(format!("{length} blocks; {}", members.join(", ")))
    }
}

// ============================================================================
// Entity paths
// ============================================================================

/// A same-origin link path that names an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityPath {
    pub category: Category,
    pub id: String,
}

impl EntityPath {
    /// Classify a URL path:
    /// `/block/<digits>` is a block, `/<owner>/<slug>` a channel, `/<slug>` a user.
    /// Two-segment paths whose owner starts with `block` are never channels.
    pub fn parse(path: &str) -> Option<EntityPath> {
        let rest = path.strip_prefix('/')?;
        let segments: Vec<&str> = rest.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }

        match segments.as_slice() {
            ["block", id] => id
                .chars()
                .all(|c| c.is_ascii_digit())
                .then(|| EntityPath::new(Category::Block, id)),
            [owner, _] if owner.starts_with("block") => None,
            [_, slug] => Some(EntityPath::new(Category::Channel, slug)),
            [slug] => Some(EntityPath::new(Category::User, slug)),
            _ => None,
        }
    }

    fn new(category: Category, id: &str) -> Self {
        Self {
            category,
            id: id.to_string(),
        }
    }

    /// API endpoint for fetching this entity, e.g. `/users/ann`
    pub fn endpoint(&self) -> String {
        format!("/{}/{}", self.category.plural(), self.id)
    }
}
