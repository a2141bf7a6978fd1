//! Markdown helpers for the preview pane using pulldown-cmark
//!
//! Rendering the buffer is the host's business; these helpers give it the
//! HTML fragment and the list of mention links it contains so pointer
//! movement over rendered links can be routed to the hover resolver.

use std::ops::Range;

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;

use crate::entity::EntityPath;

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Convert markdown to an HTML fragment
pub fn render_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, options());
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}

/// A same-origin link in the source that names an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionLink {
    /// Link text as rendered
    pub text: String,
    pub path: String,
    pub target: EntityPath,
    /// Byte range of the whole link in the markdown source
    pub range: Range<usize>,
}

/// Path-only hrefs are same-origin; `//host/...` and absolute URLs are not
pub fn is_internal_href(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

/// Collect every link whose destination is an internal entity path
pub fn mention_links(markdown: &str) -> Vec<MentionLink> {
    let mut links = Vec::new();
    let mut open: Option<(String, Range<usize>, String)> = None;

    for (event, range) in Parser::new_ext(markdown, options()).into_offset_iter() {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                open = Some((dest_url.to_string(), range, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, label)) = open.as_mut() {
                    label.push_str(&text);
                }
            }
            Event::End(TagEnd::Link) => {
                let Some((href, range, text)) = open.take() else {
                    continue;
                };
                if !is_internal_href(&href) {
                    continue;
                }
                // Drop any query string or fragment before classifying
                let path = href
                    .split(['?', '#'])
                    .next()
                    .unwrap_or_default()
                    .to_string();
                if let Some(target) = EntityPath::parse(&path) {
                    links.push(MentionLink {
                        text,
                        path,
                        target,
                        range,
                    });
                }
            }
            _ => {}
        }
    }
    links
}
