//! Folding per-proof check results into the tracker's overall status.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::wire::identify::{Identity, LinkCheckResult, ProofState, RemoteProof};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Normal,
    Warning,
    Error,
    Pending,
}

/// A claim paired with its check result; `None` means the check is still running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofCheck {
    pub proof: RemoteProof,
    pub result: Option<LinkCheckResult>,
}

impl ProofCheck {
    pub fn pending(proof: RemoteProof) -> Self {
        Self { proof, result: None }
    }

    pub fn state(&self) -> Option<ProofState> {
        self.result.as_ref().map(LinkCheckResult::state)
    }
}

fn is_soft(state: ProofState) -> bool {
    matches!(state, ProofState::Ok | ProofState::TempFailure)
}

/// First matching rule wins: all ok, then all ok/temp-failure/missing, then
/// any hard failure, then any missing. An empty list is `Normal`.
pub fn overall_status(checks: &[ProofCheck]) -> OverallStatus {
    let all_ok = checks
        .iter()
        .all(|check| check.state() == Some(ProofState::Ok));
    let all_warnings_or_ok = checks
        .iter()
        .all(|check| check.state().map_or(true, is_soft));
    let any_error = checks
        .iter()
        .any(|check| check.state().is_some_and(|state| !is_soft(state)));
    let any_pending = checks.iter().any(|check| check.result.is_none());

    if all_ok {
        OverallStatus::Normal
    } else if all_warnings_or_ok {
        OverallStatus::Warning
    } else if any_error {
        OverallStatus::Error
    } else if any_pending {
        OverallStatus::Pending
    } else {
        OverallStatus::Error
    }
}

/// Attach `lcr` to every pair whose proof equals `rp`.
pub fn apply_check(
    checks: &[ProofCheck],
    rp: &RemoteProof,
    lcr: &LinkCheckResult,
) -> Vec<ProofCheck> {
    let mut matched = 0usize;
    let updated: Vec<ProofCheck> = checks
        .iter()
        .map(|check| {
            if check.proof == *rp {
                matched += 1;
                ProofCheck {
                    proof: check.proof.clone(),
                    result: Some(lcr.clone()),
                }
            } else {
                check.clone()
            }
        })
        .collect();
    if matched == 0 {
        debug!(key = %rp.key, value = %rp.value, "check result for unknown proof ignored");
    }
    updated
}

pub fn checks_from_identity(identity: &Identity) -> Vec<ProofCheck> {
    identity
        .proofs
        .iter()
        .map(|row| ProofCheck::pending(row.proof.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proof(value: &str) -> RemoteProof {
        RemoteProof {
            proof_type: 2,
            key: "twitter".to_string(),
            value: value.to_string(),
            display_markup: value.to_string(),
            sig_id: format!("sig-{value}"),
            m_time: 0,
        }
    }

    fn checked(value: &str, state: ProofState) -> ProofCheck {
        ProofCheck {
            proof: proof(value),
            result: Some(LinkCheckResult::with_state(0, state)),
        }
    }

    #[test]
    fn empty_list_is_normal() {
        assert_eq!(overall_status(&[]), OverallStatus::Normal);
    }

    #[test]
    fn temp_failure_is_warning() {
        let checks = vec![checked("a", ProofState::Ok), checked("b", ProofState::TempFailure)];
        assert_eq!(overall_status(&checks), OverallStatus::Warning);
    }

    #[test]
    fn all_pending_is_warning_not_pending() {
        let checks = vec![ProofCheck::pending(proof("a")), ProofCheck::pending(proof("b"))];
        assert_eq!(overall_status(&checks), OverallStatus::Warning);
    }

    #[test]
    fn hard_failure_with_pending_is_error() {
        let checks = vec![checked("a", ProofState::Revoked), ProofCheck::pending(proof("b"))];
        assert_eq!(overall_status(&checks), OverallStatus::Error);
    }

    #[test]
    fn apply_check_only_touches_matching_proof() {
        let checks = vec![ProofCheck::pending(proof("a")), ProofCheck::pending(proof("b"))];
        let lcr = LinkCheckResult::with_state(1, ProofState::Ok);
        let updated = apply_check(&checks, &proof("b"), &lcr);
        assert_eq!(updated[0].result, None);
        assert_eq!(updated[1].result, Some(lcr));
        assert!(checks[1].result.is_none());
    }
}
