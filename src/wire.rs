//! Engine wire payloads and decoding of inbound identify-UI calls.

#[path = "wire/chat.rs"]
pub mod chat;
#[path = "wire/identify.rs"]
pub mod identify;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::CoreError;
use crate::tracker::{SessionId, TrackerEvent};

use self::chat::UiMessage;
use self::identify::{
    Cryptocurrency, Identity, IdentifyKey, IdentifyOutcome, LinkCheckResult, RemoteProof,
    TrackSummary, User,
};

pub const IDENTIFY_UI_PREFIX: &str = "keybase.1.identifyUi.";

pub fn decode_ui_message(raw: &str) -> Result<UiMessage, CoreError> {
    Ok(serde_json::from_str(raw)?)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartParams {
    #[serde(rename = "sessionID")]
    session_id: SessionId,
    username: String,
}

#[derive(Deserialize)]
struct DisplayKeyParams {
    #[serde(rename = "sessionID")]
    session_id: SessionId,
    key: IdentifyKey,
}

#[derive(Deserialize)]
struct ReportLastTrackParams {
    #[serde(rename = "sessionID")]
    session_id: SessionId,
    #[serde(default)]
    track: Option<TrackSummary>,
}

#[derive(Deserialize)]
struct LaunchNetworkChecksParams {
    #[serde(rename = "sessionID")]
    session_id: SessionId,
    identity: Identity,
    user: User,
}

#[derive(Deserialize)]
struct DisplayTrackStatementParams {
    #[serde(rename = "sessionID")]
    session_id: SessionId,
    stmt: String,
}

#[derive(Deserialize)]
struct ProofCheckParams {
    #[serde(rename = "sessionID")]
    session_id: SessionId,
    rp: RemoteProof,
    lcr: LinkCheckResult,
}

#[derive(Deserialize)]
struct DisplayCryptocurrencyParams {
    #[serde(rename = "sessionID")]
    session_id: SessionId,
    c: Cryptocurrency,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportTrackTokenParams {
    #[serde(rename = "sessionID")]
    session_id: SessionId,
    track_token: String,
}

#[derive(Deserialize)]
struct ConfirmParams {
    #[serde(rename = "sessionID")]
    session_id: SessionId,
    outcome: IdentifyOutcome,
}

#[derive(Deserialize)]
struct FinishParams {
    #[serde(rename = "sessionID")]
    session_id: SessionId,
}

fn params<T: DeserializeOwned>(value: Value) -> Result<T, CoreError> {
    Ok(serde_json::from_value(value)?)
}

/// Map a named identify-UI call (with or without the protocol prefix) to an event.
pub fn decode_tracker_event(method: &str, value: Value) -> Result<TrackerEvent, CoreError> {
    let name = method.strip_prefix(IDENTIFY_UI_PREFIX).unwrap_or(method);
    let event = match name {
        "start" => {
            let p: StartParams = params(value)?;
            TrackerEvent::Start {
                session_id: p.session_id,
                username: p.username,
            }
        }
        "displayKey" => {
            let p: DisplayKeyParams = params(value)?;
            TrackerEvent::DisplayKey {
                session_id: p.session_id,
                key: p.key,
            }
        }
        "reportLastTrack" => {
            let p: ReportLastTrackParams = params(value)?;
            TrackerEvent::ReportLastTrack {
                session_id: p.session_id,
                track: p.track,
            }
        }
        "launchNetworkChecks" => {
            let p: LaunchNetworkChecksParams = params(value)?;
            TrackerEvent::LaunchNetworkChecks {
                session_id: p.session_id,
                identity: p.identity,
                user: p.user,
            }
        }
        "displayTrackStatement" => {
            let p: DisplayTrackStatementParams = params(value)?;
            TrackerEvent::DisplayTrackStatement {
                session_id: p.session_id,
                stmt: p.stmt,
            }
        }
        "finishWebProofCheck" => {
            let p: ProofCheckParams = params(value)?;
            TrackerEvent::FinishWebProofCheck {
                session_id: p.session_id,
                rp: p.rp,
                lcr: p.lcr,
            }
        }
        "finishSocialProofCheck" => {
            let p: ProofCheckParams = params(value)?;
            TrackerEvent::FinishSocialProofCheck {
                session_id: p.session_id,
                rp: p.rp,
                lcr: p.lcr,
            }
        }
        "displayCryptocurrency" => {
            let p: DisplayCryptocurrencyParams = params(value)?;
            TrackerEvent::DisplayCryptocurrency {
                session_id: p.session_id,
                c: p.c,
            }
        }
        "reportTrackToken" => {
            let p: ReportTrackTokenParams = params(value)?;
            TrackerEvent::ReportTrackToken {
                session_id: p.session_id,
                track_token: p.track_token,
            }
        }
        "confirm" => {
            let p: ConfirmParams = params(value)?;
            TrackerEvent::Confirm {
                session_id: p.session_id,
                outcome: p.outcome,
            }
        }
        "finish" => {
            let p: FinishParams = params(value)?;
            TrackerEvent::Finish {
                session_id: p.session_id,
            }
        }
        other => {
            return Err(CoreError::InvalidArgument(format!(
                "unknown identify ui method: {}",
                other
            )))
        }
    };
    Ok(event)
}
