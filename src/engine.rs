//! Drives the tracker reducer from a channel of engine calls and popup actions.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ViewConfig;
use crate::diagnostics::{self, DiagnosticKind};
use crate::error::CoreError;
use crate::tracker::{
    apply_action, reduce, Effect, SessionId, TrackerAction, TrackerEvent, TrackerProps,
    TrackerState, Transition,
};
use crate::wire::decode_tracker_event;
use crate::wire::identify::UserSummary;

/// Handle to the engine calls the tracker needs. Injected so the listener can
/// run against a real transport or a test double.
pub trait IdentifyRpc {
    fn register_identify_ui(&self) -> Result<(), CoreError>;
    fn load_unchecked_user_summaries(
        &self,
        uids: &[String],
    ) -> Result<Vec<UserSummary>, CoreError>;
    fn confirm_reply(&self, session_id: SessionId, confirmed: bool) -> Result<(), CoreError>;
    fn open_url(&self, url: &str) -> Result<(), CoreError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// A named identify-UI call still in wire form.
    Call { method: String, params: Value },
    Event(TrackerEvent),
    Action(TrackerAction),
    Shutdown,
}

pub struct TrackerListener<R: IdentifyRpc> {
    rpc: R,
    config: ViewConfig,
    state: TrackerState,
}

impl<R: IdentifyRpc> TrackerListener<R> {
    pub fn new(rpc: R, config: ViewConfig) -> Self {
        let state = TrackerState::new(&config);
        Self { rpc, config, state }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// Consume messages until shutdown or either channel end disconnects.
    pub fn run(
        mut self,
        inbox: Receiver<EngineMessage>,
        sink: Sender<TrackerProps>,
    ) -> TrackerState {
        match self.rpc.register_identify_ui() {
            Ok(()) => info!("registered identify ui"),
            Err(err) => {
                warn!(error = %err, "error registering identify ui");
                self.record(DiagnosticKind::Registration, &err);
            }
        }

        for message in inbox {
            let transition = match message {
                EngineMessage::Call { method, params } => {
                    match decode_tracker_event(&method, params) {
                        Ok(event) => reduce(&self.state, event),
                        Err(err) => {
                            warn!(%method, error = %err, "undecodable identify ui call dropped");
                            self.record(DiagnosticKind::Decode, &err);
                            continue;
                        }
                    }
                }
                EngineMessage::Event(event) => reduce(&self.state, event),
                EngineMessage::Action(action) => apply_action(&self.state, action),
                EngineMessage::Shutdown => {
                    debug!("tracker listener shutting down");
                    break;
                }
            };
            if self.commit(transition, &sink).is_err() {
                debug!("snapshot receiver dropped");
                break;
            }
        }
        self.state
    }

    fn commit(
        &mut self,
        transition: Transition,
        sink: &Sender<TrackerProps>,
    ) -> Result<(), CoreError> {
        let Transition { state, effects } = transition;
        self.state = state;
        sink.send(self.state.props()).map_err(|_| CoreError::ChannelClosed)?;
        for effect in effects {
            if let Some(follow_up) = self.perform(effect) {
                let next = reduce(&self.state, follow_up);
                self.commit(next, sink)?;
            }
        }
        Ok(())
    }

    /// Runs one effect; a user summary comes back as a follow-up event.
    fn perform(&self, effect: Effect) -> Option<TrackerEvent> {
        let result = match effect {
            Effect::LoadUserSummary { uid } => {
                match self.rpc.load_unchecked_user_summaries(std::slice::from_ref(&uid)) {
                    Ok(summaries) => {
                        return match summaries.into_iter().next() {
                            Some(summary) => Some(TrackerEvent::UserSummaryLoaded { summary }),
                            None => {
                                warn!(%uid, "did not get back a user summary");
                                None
                            }
                        };
                    }
                    Err(err) => Err(err),
                }
            }
            Effect::ConfirmReply {
                session_id,
                confirmed,
            } => self.rpc.confirm_reply(session_id, confirmed),
            Effect::OpenUrl(url) => self.rpc.open_url(&url),
        };
        if let Err(err) = result {
            warn!(error = %err, "tracker effect failed");
            self.record(DiagnosticKind::Rpc, &err);
        }
        None
    }

    fn record(&self, kind: DiagnosticKind, err: &CoreError) {
        let Some(dir) = self.config.diagnostics_dir.as_deref() else {
            return;
        };
        let message = err.to_string();
        if let Err(io_err) = diagnostics::log_event(dir, kind, self.state.session_id, &message) {
            warn!(error = %io_err, "diagnostics write failed");
        }
    }
}

/// Run a listener on its own thread. Returns the inbox sender, the snapshot
/// receiver and the handle yielding the final state.
pub fn spawn_listener<R>(
    rpc: R,
    config: ViewConfig,
) -> Result<(Sender<EngineMessage>, Receiver<TrackerProps>, JoinHandle<TrackerState>), CoreError>
where
    R: IdentifyRpc + Send + 'static,
{
    let (tx, inbox) = mpsc::channel();
    let (sink, snapshots) = mpsc::channel();
    let listener = TrackerListener::new(rpc, config);
    let handle = thread::Builder::new()
        .name("tracker-listener".to_string())
        .spawn(move || listener.run(inbox, sink))?;
    Ok((tx, snapshots, handle))
}
