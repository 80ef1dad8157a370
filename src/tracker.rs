//! Tracker popup state as an immutable value plus a pure transition function.
//!
//! Identify-UI calls from the engine and clicks from the popup are both
//! reduced here; anything that needs the engine comes back as an [`Effect`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::config::ViewConfig;
use crate::proofs::{apply_check, checks_from_identity, overall_status, OverallStatus, ProofCheck};
use crate::wire::identify::{
    Cryptocurrency, Identity, IdentifyKey, IdentifyOutcome, LinkCheckResult, RemoteProof,
    TrackSummary, User, UserSummary,
};

pub type SessionId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub fullname: String,
    pub followers_count: i64,
    pub following_count: i64,
    pub follows_you: bool,
    pub avatar: String,
    pub location: String,
}

impl UserInfo {
    fn placeholder(text: &str) -> Self {
        Self {
            fullname: text.to_string(),
            followers_count: -1,
            following_count: -1,
            follows_you: false,
            avatar: text.to_string(),
            location: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BioProps {
    pub username: Option<String>,
    pub state: OverallStatus,
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionProps {
    pub state: OverallStatus,
    pub username: Option<String>,
    pub should_follow: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderProps {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProofsProps {
    pub proofs_and_checks: Vec<ProofCheck>,
}

/// Snapshot handed to the renderer after every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerProps {
    pub header: HeaderProps,
    pub bio: BioProps,
    pub proofs: ProofsProps,
    pub action: ActionProps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerState {
    pub session_id: Option<SessionId>,
    /// Proofs whose check has not reported back yet.
    pub outstanding_reqs: Vec<RemoteProof>,
    pub overall_status: OverallStatus,
    pub bio: BioProps,
    pub action: ActionProps,
    pub header: HeaderProps,
    pub proofs: ProofsProps,
    follow_help_url: String,
    placeholder_text: String,
}

/// One inbound identify-UI call.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    Start {
        session_id: SessionId,
        username: String,
    },
    DisplayKey {
        session_id: SessionId,
        key: IdentifyKey,
    },
    ReportLastTrack {
        session_id: SessionId,
        track: Option<TrackSummary>,
    },
    LaunchNetworkChecks {
        session_id: SessionId,
        identity: Identity,
        user: User,
    },
    DisplayTrackStatement {
        session_id: SessionId,
        stmt: String,
    },
    FinishWebProofCheck {
        session_id: SessionId,
        rp: RemoteProof,
        lcr: LinkCheckResult,
    },
    FinishSocialProofCheck {
        session_id: SessionId,
        rp: RemoteProof,
        lcr: LinkCheckResult,
    },
    DisplayCryptocurrency {
        session_id: SessionId,
        c: Cryptocurrency,
    },
    ReportTrackToken {
        session_id: SessionId,
        track_token: String,
    },
    Confirm {
        session_id: SessionId,
        outcome: IdentifyOutcome,
    },
    Finish {
        session_id: SessionId,
    },
    UserSummaryLoaded {
        summary: UserSummary,
    },
}

impl TrackerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TrackerEvent::Start { .. } => "start",
            TrackerEvent::DisplayKey { .. } => "displayKey",
            TrackerEvent::ReportLastTrack { .. } => "reportLastTrack",
            TrackerEvent::LaunchNetworkChecks { .. } => "launchNetworkChecks",
            TrackerEvent::DisplayTrackStatement { .. } => "displayTrackStatement",
            TrackerEvent::FinishWebProofCheck { .. } => "finishWebProofCheck",
            TrackerEvent::FinishSocialProofCheck { .. } => "finishSocialProofCheck",
            TrackerEvent::DisplayCryptocurrency { .. } => "displayCryptocurrency",
            TrackerEvent::ReportTrackToken { .. } => "reportTrackToken",
            TrackerEvent::Confirm { .. } => "confirm",
            TrackerEvent::Finish { .. } => "finish",
            TrackerEvent::UserSummaryLoaded { .. } => "userSummaryLoaded",
        }
    }
}

/// User interaction with the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerAction {
    Close,
    Refollow,
    Unfollow,
    FollowHelp,
    FollowChecked(bool),
}

/// Work the reducer asks the caller to perform against the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadUserSummary { uid: String },
    ConfirmReply { session_id: SessionId, confirmed: bool },
    OpenUrl(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: TrackerState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &TrackerState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

impl TrackerState {
    pub fn new(config: &ViewConfig) -> Self {
        let status = OverallStatus::Pending;
        Self {
            session_id: None,
            outstanding_reqs: Vec::new(),
            overall_status: status,
            bio: BioProps {
                username: None,
                state: status,
                user_info: UserInfo::placeholder(&config.placeholder_text),
            },
            action: ActionProps {
                state: status,
                username: None,
                should_follow: true,
            },
            header: HeaderProps {
                reason: config.placeholder_text.clone(),
            },
            proofs: ProofsProps::default(),
            follow_help_url: config.follow_help_url.clone(),
            placeholder_text: config.placeholder_text.clone(),
        }
    }

    pub fn props(&self) -> TrackerProps {
        TrackerProps {
            header: self.header.clone(),
            bio: self.bio.clone(),
            proofs: self.proofs.clone(),
            action: self.action.clone(),
        }
    }

    fn with_username(&self, username: String) -> Self {
        Self {
            bio: BioProps {
                username: Some(username.clone()),
                ..self.bio.clone()
            },
            action: ActionProps {
                username: Some(username),
                ..self.action.clone()
            },
            ..self.clone()
        }
    }

    fn with_checks(&self, proofs_and_checks: Vec<ProofCheck>) -> Self {
        let outstanding_reqs = proofs_and_checks
            .iter()
            .filter(|check| check.result.is_none())
            .map(|check| check.proof.clone())
            .collect();
        Self {
            outstanding_reqs,
            proofs: ProofsProps { proofs_and_checks },
            ..self.clone()
        }
    }

    fn with_status(&self, status: OverallStatus) -> Self {
        Self {
            overall_status: status,
            bio: BioProps {
                state: status,
                ..self.bio.clone()
            },
            action: ActionProps {
                state: status,
                ..self.action.clone()
            },
            ..self.clone()
        }
    }

    fn with_user_summary(&self, summary: &UserSummary) -> Self {
        Self {
            bio: BioProps {
                user_info: UserInfo {
                    fullname: summary.full_name.clone(),
                    avatar: summary.thumbnail.clone(),
                    ..UserInfo::placeholder(&self.placeholder_text)
                },
                ..self.bio.clone()
            },
            ..self.clone()
        }
    }
}

pub fn reduce(state: &TrackerState, event: TrackerEvent) -> Transition {
    trace!(event = event.name(), "tracker event");
    match event {
        TrackerEvent::Start {
            session_id,
            username,
        } => {
            info!(session_id, %username, "identify session started");
            Transition {
                state: TrackerState {
                    session_id: Some(session_id),
                    ..state.with_username(username)
                },
                effects: Vec::new(),
            }
        }
        TrackerEvent::LaunchNetworkChecks { identity, user, .. } => {
            let checks = checks_from_identity(&identity);
            debug!(uid = %user.uid, proofs = checks.len(), "network checks launched");
            Transition {
                state: state.with_checks(checks),
                effects: vec![Effect::LoadUserSummary { uid: user.uid }],
            }
        }
        TrackerEvent::FinishWebProofCheck { rp, lcr, .. }
        | TrackerEvent::FinishSocialProofCheck { rp, lcr, .. } => {
            debug!(key = %rp.key, state = ?lcr.state(), "proof check finished");
            let checks = apply_check(&state.proofs.proofs_and_checks, &rp, &lcr);
            Transition {
                state: state.with_checks(checks),
                effects: Vec::new(),
            }
        }
        TrackerEvent::Finish { session_id } => {
            let status = overall_status(&state.proofs.proofs_and_checks);
            info!(session_id, ?status, "identify session finished");
            Transition {
                state: state.with_status(status),
                effects: Vec::new(),
            }
        }
        TrackerEvent::UserSummaryLoaded { summary } => {
            debug!(uid = %summary.uid, "user summary loaded");
            Transition {
                state: state.with_user_summary(&summary),
                effects: Vec::new(),
            }
        }
        TrackerEvent::Confirm { session_id, .. } => Transition {
            state: state.clone(),
            effects: vec![Effect::ConfirmReply {
                session_id,
                confirmed: false,
            }],
        },
        TrackerEvent::DisplayKey { session_id, key } => {
            debug!(session_id, key = %key.0, "display key");
            Transition::unchanged(state)
        }
        TrackerEvent::ReportLastTrack { session_id, track } => {
            debug!(session_id, tracked = track.is_some(), "report last track");
            Transition::unchanged(state)
        }
        TrackerEvent::DisplayTrackStatement { session_id, .. } => {
            debug!(session_id, "display track statement");
            Transition::unchanged(state)
        }
        TrackerEvent::DisplayCryptocurrency { session_id, c } => {
            debug!(session_id, currency = %c.0, "display cryptocurrency");
            Transition::unchanged(state)
        }
        TrackerEvent::ReportTrackToken { session_id, .. } => {
            debug!(session_id, "report track token");
            Transition::unchanged(state)
        }
    }
}

pub fn apply_action(state: &TrackerState, action: TrackerAction) -> Transition {
    debug!(?action, "tracker action");
    match action {
        TrackerAction::FollowChecked(should_follow) => Transition {
            state: TrackerState {
                action: ActionProps {
                    should_follow,
                    ..state.action.clone()
                },
                ..state.clone()
            },
            effects: Vec::new(),
        },
        TrackerAction::FollowHelp => Transition {
            state: state.clone(),
            effects: vec![Effect::OpenUrl(state.follow_help_url.clone())],
        },
        TrackerAction::Close | TrackerAction::Refollow | TrackerAction::Unfollow => {
            Transition::unchanged(state)
        }
    }
}
