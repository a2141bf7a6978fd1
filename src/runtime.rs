//! Runtime that executes commands for an `EditorModel`
//!
//! Everything that mutates the model happens on the thread that owns the
//! runtime. Provider calls run on worker threads and report back over a
//! channel; the debounce timer is a single deadline slot checked by `pump`.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::commands::Cmd;
use crate::config::MentionConfig;
use crate::messages::{HoverMsg, Msg, QueryMsg};
use crate::model::EditorModel;
use crate::provider::{EntityLookupProvider, SearchProvider};
use crate::query::TimerId;
use crate::update::update;
use crate::view::{RenderSnapshot, RenderSurface};

pub struct Runtime {
    model: EditorModel,
    search: Arc<dyn SearchProvider>,
    lookup: Arc<dyn EntityLookupProvider>,
    surface: Option<Box<dyn RenderSurface>>,
    msg_tx: Sender<Msg>,
    msg_rx: Receiver<Msg>,
    /// Pending debounce timer and its deadline
    timer: Option<(TimerId, Instant)>,
    /// Provider calls whose completion has not been received yet
    in_flight: usize,
    disposed: bool,
}

impl Runtime {
    pub fn new(
        config: MentionConfig,
        search: Arc<dyn SearchProvider>,
        lookup: Arc<dyn EntityLookupProvider>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        Self {
            model: EditorModel::new(config),
            search,
            lookup,
            surface: None,
            msg_tx,
            msg_rx,
            timer: None,
            in_flight: 0,
            disposed: false,
        }
    }

    /// Attach the host surface that receives a snapshot on every redraw
    pub fn with_surface(mut self, surface: impl RenderSurface + 'static) -> Self {
        self.surface = Some(Box::new(surface));
        self
    }

    pub fn model(&self) -> &EditorModel {
        &self.model
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        self.model.snapshot()
    }

    /// Sender for messages produced outside the runtime thread
    pub fn sender(&self) -> Sender<Msg> {
        self.msg_tx.clone()
    }

    /// No timer pending and no provider call outstanding
    pub fn is_idle(&self) -> bool {
        self.timer.is_none() && self.in_flight == 0
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Apply one message and execute the resulting commands
    pub fn dispatch(&mut self, msg: Msg) {
        if self.disposed {
            tracing::debug!("Runtime disposed, dropping message");
            return;
        }
        if let Some(cmd) = update(&mut self.model, msg) {
            let needs_redraw = cmd.needs_redraw();
            self.process_cmd(cmd);
            if needs_redraw {
                self.render();
            }
        }
    }

    fn render(&mut self) {
        if let Some(surface) = self.surface.as_mut() {
            let snapshot = self.model.snapshot();
            surface.render(&snapshot);
        }
    }

    fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::None => {}
            Cmd::Redraw => {}
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }
            Cmd::ScheduleSearch { timer, delay_ms } => {
                let deadline = Instant::now() + Duration::from_millis(delay_ms);
                self.timer = Some((timer, deadline));
            }
            Cmd::CancelSearchTimer => {
                self.timer = None;
            }
            Cmd::RunSearch {
                token,
                category,
                query,
            } => {
                self.in_flight += 1;
                let tx = self.msg_tx.clone();
                let provider = Arc::clone(&self.search);
                std::thread::spawn(move || {
                    let outcome = provider.search(category, &query);
                    let _ = tx.send(Msg::Query(QueryMsg::SearchCompleted { token, outcome }));
                });
            }
            Cmd::RunLookup { token, path } => {
                self.in_flight += 1;
                let tx = self.msg_tx.clone();
                let provider = Arc::clone(&self.lookup);
                std::thread::spawn(move || {
                    let outcome = provider.lookup(&path);
                    let _ = tx.send(Msg::Hover(HoverMsg::LookupCompleted { token, outcome }));
                });
            }
        }
    }

    fn fire_due_timer(&mut self, now: Instant) -> bool {
        match self.timer {
            Some((timer, deadline)) if deadline <= now => {
                self.timer = None;
                self.dispatch(Msg::Query(QueryMsg::DebounceElapsed { timer }));
                true
            }
            _ => false,
        }
    }

    /// Wait up to `max_wait` for the next async message or the debounce
    /// deadline, whichever comes first, and apply it.
    /// Returns true if something was handled.
    pub fn pump(&mut self, max_wait: Duration) -> bool {
        if self.disposed {
            return false;
        }
        let now = Instant::now();
        if self.fire_due_timer(now) {
            return true;
        }

        let wait = match self.timer {
            Some((_, deadline)) => max_wait.min(deadline.saturating_duration_since(now)),
            None => max_wait,
        };

        match self.msg_rx.recv_timeout(wait) {
            Ok(msg) => {
                if matches!(
                    msg,
                    Msg::Query(QueryMsg::SearchCompleted { .. })
                        | Msg::Hover(HoverMsg::LookupCompleted { .. })
                ) {
                    self.in_flight = self.in_flight.saturating_sub(1);
                }
                self.dispatch(msg);
                true
            }
            Err(RecvTimeoutError::Timeout) => self.fire_due_timer(Instant::now()),
            // The runtime holds a sender, so the channel never disconnects
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Pump until no timer is pending and no provider call is outstanding,
    /// or until `timeout` elapses. Returns true if the runtime went idle.
    pub fn run_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.is_idle() {
            let now = Instant::now();
            if now >= deadline || self.disposed {
                return false;
            }
            self.pump(deadline - now);
        }
        true
    }

    /// Cancel the pending timer and stop applying messages.
    /// Completions that arrive later are dropped.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        tracing::debug!(in_flight = self.in_flight, "Disposing runtime");
        self.timer = None;
        self.disposed = true;
        while self.msg_rx.try_recv().is_ok() {}
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.dispose();
    }
}
