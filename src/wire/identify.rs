//! Identify-UI payloads delivered by the engine while tracking a user.

use serde::{Deserialize, Serialize};

/// Outcome code of a single remote proof check. Codes without a named
/// variant (newer engine states) are kept as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ProofState {
    None,
    Ok,
    TempFailure,
    PermFailure,
    Looking,
    Superseded,
    Posted,
    Revoked,
    Deleted,
    UnknownType,
    SigHintMissing,
    Unchecked,
    Other(i64),
}

impl From<i64> for ProofState {
    fn from(code: i64) -> Self {
        match code {
            0 => ProofState::None,
            1 => ProofState::Ok,
            2 => ProofState::TempFailure,
            3 => ProofState::PermFailure,
            4 => ProofState::Looking,
            5 => ProofState::Superseded,
            6 => ProofState::Posted,
            7 => ProofState::Revoked,
            8 => ProofState::Deleted,
            9 => ProofState::UnknownType,
            10 => ProofState::SigHintMissing,
            11 => ProofState::Unchecked,
            other => ProofState::Other(other),
        }
    }
}

impl From<ProofState> for i64 {
    fn from(state: ProofState) -> Self {
        match state {
            ProofState::None => 0,
            ProofState::Ok => 1,
            ProofState::TempFailure => 2,
            ProofState::PermFailure => 3,
            ProofState::Looking => 4,
            ProofState::Superseded => 5,
            ProofState::Posted => 6,
            ProofState::Revoked => 7,
            ProofState::Deleted => 8,
            ProofState::UnknownType => 9,
            ProofState::SigHintMissing => 10,
            ProofState::Unchecked => 11,
            ProofState::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofResult {
    pub state: ProofState,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub desc: String,
}

impl ProofResult {
    pub fn new(state: ProofState) -> Self {
        Self {
            state,
            status: 0,
            desc: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCheckResult {
    #[serde(default)]
    pub proof_id: i64,
    pub proof_result: ProofResult,
    #[serde(default)]
    pub snoozed_until: i64,
    #[serde(default)]
    pub tor_warning: bool,
}

impl LinkCheckResult {
    pub fn with_state(proof_id: i64, state: ProofState) -> Self {
        Self {
            proof_id,
            proof_result: ProofResult::new(state),
            snoozed_until: 0,
            tor_warning: false,
        }
    }

    pub fn state(&self) -> ProofState {
        self.proof_result.state
    }
}

/// An asserted identity proof awaiting verification. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProof {
    pub proof_type: i64,
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub display_markup: String,
    #[serde(rename = "sigID", default)]
    pub sig_id: String,
    #[serde(default)]
    pub m_time: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyRow {
    #[serde(default)]
    pub row_id: i64,
    pub proof: RemoteProof,
    #[serde(default)]
    pub track_diff: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default)]
    pub when_last_tracked: i64,
    #[serde(default)]
    pub proofs: Vec<IdentifyRow>,
    #[serde(default)]
    pub breaks_tracking: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub uid: String,
    pub username: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub id_version: i64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub bio: String,
}

/// Payloads the tracker only logs; kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifyKey(pub serde_json::Value);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackSummary(pub serde_json::Value);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cryptocurrency(pub serde_json::Value);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifyOutcome(pub serde_json::Value);
