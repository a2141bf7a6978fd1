//! HTTP providers for the Are.na-style REST API
//!
//! - search: `GET {base}/search/{users|channels|blocks}?q=<query>`, results
//!   under the key named after the category
//! - lookup: `GET {base}/{users|channels|blocks}/{id}`, 404 resolves to None

use std::time::Duration;

use crate::entity::{EntityPath, RawEntity};
use crate::provider::{EntityLookupProvider, ProviderError, SearchProvider};
use crate::trigger::Category;

/// Blocking API client implementing both provider traits
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: String,
    agent: ureq::Agent,
}

impl ApiClient {
    pub fn new(base: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base: base.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Option<String>, ProviderError> {
        let url = format!("{}{}", self.base, endpoint);
        tracing::debug!("GET {}", url);

        let mut request = self
            .agent
            .get(&url)
            .set("Accept", "application/json")
            .set("User-Agent", "mention-editor");
        for (key, value) in query {
            request = request.query(key, value);
        }

        match request.call() {
            Ok(response) => response
                .into_string()
                .map(Some)
                .map_err(|e| ProviderError::Transport(e.to_string())),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(ureq::Error::Status(code, _)) => {
                tracing::debug!("GET {} responded {}", url, code);
                Err(ProviderError::Status(code))
            }
            Err(ureq::Error::Transport(e)) => {
                tracing::debug!("HTTP request failed: {}", e);
                Err(ProviderError::Transport(e.to_string()))
            }
        }
    }
}

fn decode(body: &str) -> Result<serde_json::Value, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))
}

/// Pull the record array for `category` out of a search response.
/// Records that fail to decode are dropped individually.
pub fn parse_search_response(
    category: Category,
    body: &str,
) -> Result<Vec<RawEntity>, ProviderError> {
    let mut value = decode(body)?;
    let records = match value.get_mut(category.plural()).map(serde_json::Value::take) {
        Some(serde_json::Value::Array(records)) => records,
        Some(serde_json::Value::Null) | None => Vec::new(),
        Some(other) => {
            return Err(ProviderError::Decode(format!(
                "expected an array under '{}', got {}",
                category.plural(),
                other
            )))
        }
    };

    Ok(records
        .into_iter()
        .filter_map(|record| match RawEntity::from_value(category, record) {
            Ok(raw) => Some(raw),
            Err(e) => {
                tracing::warn!("Dropping malformed {} record: {}", category, e);
                None
            }
        })
        .collect())
}

/// Decode a single-entity lookup body, trusting its `base_class` tag over
/// the category the path implied
pub fn parse_lookup_response(expected: Category, body: &str) -> Result<RawEntity, ProviderError> {
    RawEntity::from_lookup_value(expected, decode(body)?)
        .map_err(|e| ProviderError::Decode(e.to_string()))
}

impl SearchProvider for ApiClient {
    fn search(&self, category: Category, query: &str) -> Result<Vec<RawEntity>, ProviderError> {
        let endpoint = format!("/search/{}", category.plural());
        match self.get(&endpoint, &[("q", query)])? {
            Some(body) => parse_search_response(category, &body),
            None => Ok(Vec::new()),
        }
    }
}

impl EntityLookupProvider for ApiClient {
    fn lookup(&self, path: &str) -> Result<Option<RawEntity>, ProviderError> {
        let Some(target) = EntityPath::parse(path) else {
            return Ok(None);
        };
        let Some(body) = self.get(&target.endpoint(), &[])? else {
            return Ok(None);
        };
        parse_lookup_response(target.category, &body).map(Some)
    }
}
