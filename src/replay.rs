//! Scripted input replay
//!
//! A replay script is a YAML list of host events. Each step is fed to a
//! `Runtime` as the matching message, which makes whole editing sessions
//! reproducible from the command line:
//!
//! ```yaml
//! steps:
//!   - input: { text: "hi @fr", caret: 6 }
//!   - caret: { top: 20, left: 48, width: 1, height: 18 }
//!   - settle
//!   - key: tab
//!   - key: enter
//! ```

use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hover::HoverTarget;
use crate::messages::{EditorMsg, HoverMsg, KeyPress, MenuMsg, Msg};
use crate::overlay::{AnchorRect, Size};
use crate::runtime::Runtime;

/// Longest a `settle` step waits for the runtime to go idle
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse script: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("step {index}: {message}")]
    Step { index: usize, message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    /// Steps are single-key maps (`- key: tab`); unit steps are bare strings
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// New input value; the selection defaults to a caret at the end
    Input {
        text: String,
        #[serde(default)]
        caret: Option<usize>,
        #[serde(default)]
        selection_start: Option<usize>,
    },
    /// Key name such as `tab`, `shift+tab`, `down`, `enter`, `escape`
    Key(String),
    /// Caret rectangle measured by the host
    Caret(AnchorRect),
    /// Menu panel measured by the host
    Panel { panel: Size, viewport: Size },
    /// Tooltip measured by the host
    Tooltip { panel: Size, viewport: Size },
    /// Click on a menu item
    Click(usize),
    /// Pointer over a link, or off every link when null
    Hover(Option<HoverTarget>),
    /// Focus left the menu
    Blur,
    /// Keep pumping for this many milliseconds
    WaitMs(u64),
    /// Pump until no timer or provider call is outstanding
    Settle,
}

impl ReplayScript {
    pub fn from_yaml(source: &str) -> Result<Self, ReplayError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml(&source)
    }
}

impl Step {
    /// The message this step delivers, if it is an input event
    fn to_msg(&self) -> Result<Option<Msg>, String> {
        let msg = match self {
            Step::Input {
                text,
                caret,
                selection_start,
            } => {
                let end = caret.unwrap_or_else(|| text.chars().count());
                Msg::Editor(EditorMsg::InputChanged {
                    text: text.clone(),
                    selection_start: selection_start.unwrap_or(end),
                    selection_end: end,
                })
            }
            Step::Key(name) => Msg::key(name.parse::<KeyPress>()?),
            Step::Caret(anchor) => Msg::Editor(EditorMsg::CaretMeasured(*anchor)),
            Step::Panel { panel, viewport } => Msg::Menu(MenuMsg::PanelMeasured {
                panel: *panel,
                viewport: *viewport,
            }),
            Step::Tooltip { panel, viewport } => Msg::Hover(HoverMsg::TooltipMeasured {
                panel: *panel,
                viewport: *viewport,
            }),
            Step::Click(index) => Msg::Menu(MenuMsg::ItemClicked(*index)),
            Step::Hover(target) => Msg::Hover(HoverMsg::PointerMoved(target.clone())),
            Step::Blur => Msg::Menu(MenuMsg::Blurred),
            Step::WaitMs(_) | Step::Settle => return Ok(None),
        };
        Ok(Some(msg))
    }
}

/// Drive `runtime` through every step of `script`
pub fn run(script: &ReplayScript, runtime: &mut Runtime) -> Result<(), ReplayError> {
    for (index, step) in script.steps.iter().enumerate() {
        tracing::debug!(index, ?step, "replay step");
        let msg = step
            .to_msg()
            .map_err(|message| ReplayError::Step { index, message })?;

        match (msg, step) {
            (Some(msg), _) => runtime.dispatch(msg),
            (None, Step::WaitMs(ms)) => {
                let deadline = Instant::now() + Duration::from_millis(*ms);
                while let Some(left) = deadline.checked_duration_since(Instant::now()) {
                    if left.is_zero() {
                        break;
                    }
                    runtime.pump(left);
                }
            }
            (None, _) => {
                if !runtime.run_until_idle(SETTLE_TIMEOUT) {
                    return Err(ReplayError::Step {
                        index,
                        message: "runtime did not settle".to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}
