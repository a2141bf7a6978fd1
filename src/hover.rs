//! Hover previews for rendered mention links
//!
//! Pointer movement over a link starts a lookup; the tooltip shows once the
//! entity resolves. Lookups are tagged with a `QueryToken` the same way
//! searches are, so a slow lookup for a link the pointer already left never
//! replaces a newer preview.

use serde::{Deserialize, Serialize};

use crate::commands::Cmd;
use crate::entity::{normalize, Entity, EntityPath, RawEntity};
use crate::overlay::{AnchorRect, Offset, OverlayPlacement, OverlayPositioner, Size};
use crate::provider::ProviderError;
use crate::query::QueryToken;

/// A link under the pointer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoverTarget {
    /// Same-origin path of the link
    pub path: String,
    /// Bounding box of the link element
    pub anchor: AnchorRect,
}

impl HoverTarget {
    pub fn new(path: impl Into<String>, anchor: AnchorRect) -> Self {
        Self {
            path: path.into(),
            anchor,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HoverResolver {
    path: Option<String>,
    anchor: Option<AnchorRect>,
    loading: bool,
    token: Option<QueryToken>,
    next_id: u64,
    entity: Option<Entity>,
    visible: bool,
    hovering: bool,
    positioner: OverlayPositioner,
    /// Bumped whenever the previewed entity changes
    generation: u64,
}

impl HoverResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(&self) -> Option<&Entity> {
        self.entity.as_ref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn anchor(&self) -> Option<AnchorRect> {
        self.anchor
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn current_token(&self) -> Option<QueryToken> {
        self.token
    }

    pub fn placement(&self) -> OverlayPlacement {
        self.positioner.placement()
    }

    fn set_visible(&mut self, visible: bool) -> Option<Cmd> {
        if self.visible == visible {
            return None;
        }
        self.visible = visible;
        Some(Cmd::Redraw)
    }

    /// Forget the current link entirely. In-flight lookups become stale.
    fn reset(&mut self) -> Option<Cmd> {
        self.path = None;
        self.token = None;
        self.loading = false;
        if self.entity.take().is_some() {
            self.generation += 1;
        }
        self.set_visible(false)
    }

    /// Pointer moved onto a link (`Some`) or off every link (`None`)
    pub fn on_pointer_moved(&mut self, target: Option<HoverTarget>) -> Option<Cmd> {
        let Some(target) = target else {
            self.hovering = false;
            return self.set_visible(false);
        };
        self.hovering = true;
        let moved = self.anchor != Some(target.anchor);
        self.anchor = Some(target.anchor);

        if self.path.as_deref() == Some(target.path.as_str()) {
            if self.loading {
                return None;
            }
            let loaded = self.entity.is_some();
            let shown = self.set_visible(loaded);
            // Another link to the same entity: redraw so the host re-measures
            if shown.is_none() && moved && self.visible {
                return Some(Cmd::Redraw);
            }
            return shown;
        }

        if EntityPath::parse(&target.path).is_none() {
            tracing::trace!("Not a mention link: {}", target.path);
            return self.reset();
        }

        let hide = self.reset();
        self.next_id += 1;
        let token = QueryToken(self.next_id);
        self.token = Some(token);
        self.loading = true;
        self.path = Some(target.path.clone());
        tracing::debug!("Looking up {} (token {})", target.path, token.0);

        Cmd::combine([
            Some(Cmd::RunLookup {
                token,
                path: target.path,
            }),
            hide,
        ])
    }

    /// Apply a lookup completion. Stale tokens are dropped silently.
    pub fn on_lookup_completed(
        &mut self,
        token: QueryToken,
        outcome: Result<Option<RawEntity>, ProviderError>,
    ) -> Option<Cmd> {
        if self.token != Some(token) {
            tracing::debug!(
                "Discarding stale lookup: token {} != current {:?}",
                token.0,
                self.token.map(|t| t.0)
            );
            return None;
        }
        self.loading = false;

        let entity = match outcome {
            Ok(Some(raw)) => match normalize(&raw) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    tracing::warn!("Dropping hover preview: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Lookup failed for token {}: {}", token.0, e);
                None
            }
        };

        match entity {
            Some(entity) => {
                self.entity = Some(entity);
                self.generation += 1;
                self.visible = self.hovering;
                Some(Cmd::Redraw)
            }
            None => {
                // Keep the path so hovering the same link does not refetch
                self.token = None;
                self.entity = None;
                self.set_visible(false)
            }
        }
    }

    /// The host measured the tooltip; place it against the link anchor
    pub fn on_measured(&mut self, panel: Size, viewport: Size, offset: Offset) -> Option<Cmd> {
        if !self.visible {
            return None;
        }
        let anchor = self.anchor?;
        let before = self.positioner.placement();
        let after = self
            .positioner
            .reposition(anchor, self.generation, panel, viewport, offset);
        (after != before).then_some(Cmd::Redraw)
    }

    /// Hide the tooltip (pointer left the preview area or focus moved)
    pub fn hide(&mut self) -> Option<Cmd> {
        self.hovering = false;
        self.set_visible(false)
    }
}
