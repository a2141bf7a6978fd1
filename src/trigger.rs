//! Trigger characters and mention categories
//!
//! A focused token is a mention when its first character is a key of the
//! host-supplied trigger table (e.g. `@` for users). Quoted multi-word
//! mentions (`@"multi word"`) are matched with a regex derived from the same
//! table and take precedence over the bare token when both cover the caret.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cursor::{analyze, FocusedToken};
use crate::model::buffer::byte_to_char;
use crate::model::TextBuffer;

/// The kind of entity a mention resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    User,
    Channel,
    Block,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::User, Category::Channel, Category::Block];

    /// Plural path segment used by the search API (`/search/users`)
    pub fn plural(self) -> &'static str {
        match self {
            Category::User => "users",
            Category::Channel => "channels",
            Category::Block => "blocks",
        }
    }

    /// Parse `user`, `users`, `User`, ...
    pub fn parse(s: &str) -> Option<Category> {
        let lower = s.to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| lower == c.plural() || lower == c.plural().trim_end_matches('s'))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural().trim_end_matches('s'))
    }
}

/// Mapping from single trigger characters to categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerTable(BTreeMap<char, Category>);

impl Default for TriggerTable {
    fn default() -> Self {
        Self::from_pairs([
            ('@', Category::User),
            ('%', Category::Block),
            ('#', Category::Channel),
        ])
    }
}

impl TriggerTable {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (char, Category)>) -> Self {
        Self(pairs.into_iter().collect())
    }

    pub fn get(&self, trigger: char) -> Option<Category> {
        self.0.get(&trigger).copied()
    }

    /// Reverse lookup: the first trigger mapped to `category`
    pub fn trigger_for(&self, category: Category) -> Option<char> {
        self.0
            .iter()
            .find(|(_, &c)| c == category)
            .map(|(&ch, _)| ch)
    }

    pub fn triggers(&self) -> impl Iterator<Item = char> + '_ {
        self.0.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Regex matching quoted mentions for every trigger in the table.
    ///
    /// Group 1 is the trigger, group 2 the quoted text. The closing quote is
    /// optional so a mention still being typed matches.
    pub fn quoted_matcher(&self) -> Option<Regex> {
        if self.is_empty() {
            return None;
        }
        let alternation = self
            .triggers()
            .map(|c| regex::escape(&c.to_string()))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r#"(?:^|\s)({alternation})"([^"\n]*)"?"#);
        Regex::new(&pattern).ok()
    }
}

/// A focused token recognised as a mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerMatch {
    pub trigger: char,
    pub category: Category,
    /// The mention text without its trigger (and quotes)
    pub query: String,
    /// Char offset where the mention starts (the trigger character)
    pub start: usize,
    /// Char offset one past the end of the mention
    pub end: usize,
    /// Matched the `@"multi word"` form
    pub quoted: bool,
}

/// Resolve a bare focused token against the trigger table
pub fn resolve(token: &FocusedToken, table: &TriggerTable) -> Option<TriggerMatch> {
    let mut chars = token.text.chars();
    let trigger = chars.next()?;
    let category = table.get(trigger)?;
    Some(TriggerMatch {
        trigger,
        category,
        query: chars.collect(),
        start: token.start,
        end: token.end,
        quoted: false,
    })
}

/// Trigger resolution over a whole buffer, with quoted-mention support
#[derive(Debug, Clone)]
pub struct TriggerResolver {
    table: TriggerTable,
    quoted: Option<Regex>,
}

impl TriggerResolver {
    pub fn new(table: TriggerTable, quoted_mentions: bool) -> Self {
        let quoted = if quoted_mentions {
            table.quoted_matcher()
        } else {
            None
        };
        Self { table, quoted }
    }

    pub fn table(&self) -> &TriggerTable {
        &self.table
    }

    /// Resolve the mention at the caret, preferring a quoted form that
    /// covers the caret over the bare focused token.
    pub fn resolve_at(&self, buffer: &TextBuffer, token: &FocusedToken) -> Option<TriggerMatch> {
        self.resolve_quoted(buffer)
            .or_else(|| resolve(token, &self.table))
    }

    fn resolve_quoted(&self, buffer: &TextBuffer) -> Option<TriggerMatch> {
        let regex = self.quoted.as_ref()?;
        let text = buffer.text();
        let caret = buffer.caret();

        let mut at = 0;
        while let Some(caps) = regex.captures_at(text, at) {
            let trigger_group = caps.get(1)?;
            let body = caps.get(2)?;
            let whole = caps.get(0)?;
            let closed = whole.end() > body.end();

            // An unclosed quote ends before the next word that starts a mention
            let (body_end, match_end) = match self.inner_mention(body.as_str()) {
                Some(cut) if !closed => (body.start() + cut, body.start() + cut),
                _ => (body.end(), whole.end()),
            };

            let start = byte_to_char(text, trigger_group.start());
            let end = byte_to_char(text, match_end);
            if (start..=end).contains(&caret) {
                let trigger = trigger_group.as_str().chars().next()?;
                return Some(TriggerMatch {
                    trigger,
                    category: self.table.get(trigger)?,
                    query: text[body.start()..body_end].to_string(),
                    start,
                    end,
                    quoted: true,
                });
            }
            at = match_end.max(trigger_group.end());
        }
        None
    }

    /// Byte length of the quoted text before the first whitespace-delimited
    /// word that begins with a trigger, trailing whitespace excluded
    fn inner_mention(&self, body: &str) -> Option<usize> {
        let mut word_boundary = None;
        for (i, c) in body.char_indices() {
            if let Some(ws) = word_boundary {
                if self.table.get(c).is_some() {
                    return Some(body[..ws].trim_end().len());
                }
            }
            word_boundary = c.is_whitespace().then_some(i);
        }
        None
    }

    /// Analyze and resolve in one step
    pub fn resolve_buffer(&self, buffer: &TextBuffer) -> Option<TriggerMatch> {
        self.resolve_at(buffer, &analyze(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TriggerResolver {
        TriggerResolver::new(TriggerTable::default(), true)
    }

    #[test]
    fn test_resolve_user_mention() {
        let table = TriggerTable::from_pairs([('@', Category::User)]);
        let buffer = TextBuffer::with_caret("hello @fra", 10);
        let matched = resolve(&analyze(&buffer), &table).unwrap();
        assert_eq!(matched.category, Category::User);
        assert_eq!(matched.query, "fra");
        assert_eq!((matched.start, matched.end), (6, 10));
    }

    #[test]
    fn test_resolve_requires_trigger_first() {
        let table = TriggerTable::default();
        let token = FocusedToken {
            text: "fr@a".into(),
            start: 0,
            end: 4,
        };
        assert!(resolve(&token, &table).is_none());
        assert!(resolve(&FocusedToken::default(), &table).is_none());
    }

    #[test]
    fn test_bare_trigger_has_empty_query() {
        let buffer = TextBuffer::with_caret("hi #", 4);
        let matched = resolver().resolve_buffer(&buffer).unwrap();
        assert_eq!(matched.category, Category::Channel);
        assert_eq!(matched.query, "");
    }

    #[test]
    fn test_quoted_mention_takes_precedence() {
        let buffer = TextBuffer::with_caret(r#"see @"multi word" now"#, 14);
        let matched = resolver().resolve_buffer(&buffer).unwrap();
        assert_eq!(matched.query, "multi word");
        assert_eq!((matched.start, matched.end), (4, 17));
    }

    #[test]
    fn test_unclosed_quoted_mention() {
        let text = r#"ping %"two wor"#;
        let buffer = TextBuffer::with_caret(text, text.chars().count());
        let matched = resolver().resolve_buffer(&buffer).unwrap();
        assert_eq!(matched.category, Category::Block);
        assert_eq!(matched.query, "two wor");
    }

    #[test]
    fn test_unclosed_quote_yields_to_later_mention() {
        let text = r#"say @"hi there and later @bob"#;
        let buffer = TextBuffer::with_caret(text, text.chars().count());
        let matched = resolver().resolve_buffer(&buffer).unwrap();
        assert!(!matched.quoted);
        assert_eq!(matched.category, Category::User);
        assert_eq!(matched.query, "bob");
        assert_eq!(matched.start, 25);

        let text = r#"#" is a hashtag, ping @ann"#;
        let buffer = TextBuffer::with_caret(text, text.chars().count());
        let matched = resolver().resolve_buffer(&buffer).unwrap();
        assert_eq!(matched.category, Category::User);
        assert_eq!(matched.query, "ann");
    }

    #[test]
    fn test_unclosed_quote_stops_before_later_mention() {
        let text = r#"say @"hi there and later @bob"#;
        let buffer = TextBuffer::with_caret(text, 10);
        let matched = resolver().resolve_buffer(&buffer).unwrap();
        assert!(matched.quoted);
        assert_eq!(matched.query, "hi there and later");
        assert_eq!((matched.start, matched.end), (4, 24));
    }

    #[test]
    fn test_quoted_disabled_falls_back_to_bare_token() {
        let resolver = TriggerResolver::new(TriggerTable::default(), false);
        let buffer = TextBuffer::with_caret(r#"@"multi word""#, 13);
        let matched = resolver.resolve_buffer(&buffer);
        assert!(matched.is_none());
    }

    #[test]
    fn test_quoted_mention_away_from_caret_is_ignored() {
        let buffer = TextBuffer::with_caret(r#"@"a b" and @ann"#, 15);
        let matched = resolver().resolve_buffer(&buffer).unwrap();
        assert_eq!(matched.query, "ann");
    }

    #[test]
    fn test_category_parse_and_reverse_lookup() {
        assert_eq!(Category::parse("users"), Some(Category::User));
        assert_eq!(Category::parse("Channel"), Some(Category::Channel));
        assert_eq!(Category::parse("nope"), None);
        assert_eq!(TriggerTable::default().trigger_for(Category::Block), Some('%'));
    }
}
