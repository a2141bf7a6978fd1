//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mention_editor::commands::Cmd;
use mention_editor::config::MentionConfig;
use mention_editor::entity::{RawBlock, RawChannel, RawEntity, RawId, RawOwner, RawUser};
use mention_editor::messages::{Msg, QueryMsg};
use mention_editor::model::EditorModel;
use mention_editor::provider::{EntityLookupProvider, ProviderError, SearchProvider};
use mention_editor::query::{QueryToken, TimerId};
use mention_editor::trigger::Category;
use mention_editor::update::update;

/// Config with a short debounce so runtime tests stay fast
pub fn fast_config() -> MentionConfig {
    MentionConfig {
        debounce_ms: 20,
        ..Default::default()
    }
}

/// Create a test model and type `text` with the caret at `caret`
pub fn test_model(text: &str, caret: usize) -> EditorModel {
    let mut model = EditorModel::default();
    update(&mut model, Msg::input(text, caret));
    model
}

pub fn raw_user(slug: &str, username: &str) -> RawEntity {
    RawEntity::User(RawUser {
        slug: Some(slug.into()),
        username: Some(username.into()),
        ..Default::default()
    })
}

pub fn raw_channel(owner: &str, slug: &str, title: &str) -> RawEntity {
    RawEntity::Channel(RawChannel {
        slug: Some(slug.into()),
        title: Some(title.into()),
        user: Some(RawOwner {
            slug: Some(owner.into()),
            username: Some(owner.into()),
        }),
        ..Default::default()
    })
}

pub fn raw_block(id: u64, title: &str) -> RawEntity {
    RawEntity::Block(RawBlock {
        id: Some(RawId::Number(id)),
        title: Some(title.into()),
        ..Default::default()
    })
}

/// Find the debounce timer scheduled by `cmd`
pub fn scheduled_timer(cmd: &Cmd) -> Option<TimerId> {
    cmd.flatten().into_iter().find_map(|c| match c {
        Cmd::ScheduleSearch { timer, .. } => Some(*timer),
        _ => None,
    })
}

/// Find the query dispatched by `cmd`
pub fn dispatched_search(cmd: &Cmd) -> Option<(QueryToken, Category, String)> {
    cmd.flatten().into_iter().find_map(|c| match c {
        Cmd::RunSearch {
            token,
            category,
            query,
        } => Some((*token, *category, query.clone())),
        _ => None,
    })
}

pub fn dispatched_lookup(cmd: &Cmd) -> Option<(QueryToken, String)> {
    cmd.flatten().into_iter().find_map(|c| match c {
        Cmd::RunLookup { token, path } => Some((*token, path.clone())),
        _ => None,
    })
}

/// Type `text`, let the debounce elapse, and return the dispatched token
pub fn type_and_fire(model: &mut EditorModel, text: &str, caret: usize) -> QueryToken {
    let cmd = update(model, Msg::input(text, caret)).expect("input always redraws");
    let timer = scheduled_timer(&cmd).expect("expected a debounce timer");
    let cmd = update(model, Msg::Query(QueryMsg::DebounceElapsed { timer }))
        .expect("expected the search to dispatch");
    dispatched_search(&cmd).expect("expected RunSearch").0
}

pub fn complete(
    model: &mut EditorModel,
    token: QueryToken,
    outcome: Result<Vec<RawEntity>, ProviderError>,
) -> Option<Cmd> {
    update(model, Msg::Query(QueryMsg::SearchCompleted { token, outcome }))
}

pub fn titles(model: &EditorModel) -> Vec<String> {
    model
        .dispatcher
        .results()
        .iter()
        .map(|e| e.title.clone())
        .collect()
}

/// Search provider with per-query latency that records every call
#[derive(Default)]
pub struct ScriptedProvider {
    responses: HashMap<String, (Duration, Result<Vec<RawEntity>, ProviderError>)>,
    calls: Mutex<Vec<(Category, String)>>,
    entities: HashMap<String, RawEntity>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, query: &str, delay_ms: u64, results: Vec<RawEntity>) -> Self {
        self.responses.insert(
            query.to_string(),
            (Duration::from_millis(delay_ms), Ok(results)),
        );
        self
    }

    pub fn fail(mut self, query: &str, error: ProviderError) -> Self {
        self.responses
            .insert(query.to_string(), (Duration::ZERO, Err(error)));
        self
    }

    pub fn with_entity(mut self, path: &str, raw: RawEntity) -> Self {
        self.entities.insert(path.to_string(), raw);
        self
    }

    pub fn calls(&self) -> Vec<(Category, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl SearchProvider for ScriptedProvider {
    fn search(&self, category: Category, query: &str) -> Result<Vec<RawEntity>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((category, query.to_string()));
        match self.responses.get(query) {
            Some((delay, outcome)) => {
                std::thread::sleep(*delay);
                outcome.clone()
            }
            None => Ok(Vec::new()),
        }
    }
}

impl EntityLookupProvider for ScriptedProvider {
    fn lookup(&self, path: &str) -> Result<Option<RawEntity>, ProviderError> {
        Ok(self.entities.get(path).cloned())
    }
}

/// Fixture document in the search API's shape
pub const FIXTURES: &str = r#"{
  "users": [
    {"slug": "ann", "username": "Ann", "metadata": {"description": "Writes things"}},
    {"slug": "annika", "username": "Annika"},
    {"slug": "bob", "username": "Bob"}
  ],
  "channels": [
    {"slug": "nice-places", "title": "Nice Places", "user": {"slug": "ann", "username": "Ann"}, "length": 12}
  ],
  "blocks": [
    {"id": 2187236, "title": "Harbor", "image": {"thumb": {"url": "https://img.example/harbor.png"}}}
  ]
}"#;
