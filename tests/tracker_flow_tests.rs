use std::sync::{mpsc, Arc, Mutex};

use keybase_view_core::engine::{spawn_listener, EngineMessage, IdentifyRpc, TrackerListener};
use keybase_view_core::proofs::OverallStatus;
use keybase_view_core::tracker::{reduce, Effect, TrackerAction, TrackerEvent, TrackerState};
use keybase_view_core::wire::decode_tracker_event;
use keybase_view_core::wire::identify::{
    IdentifyOutcome, IdentifyRow, Identity, LinkCheckResult, ProofState, RemoteProof, User,
    UserSummary,
};
use keybase_view_core::{CoreError, ViewConfig};
use serde_json::json;

#[derive(Clone, Default)]
struct MockRpc {
    calls: Arc<Mutex<Vec<String>>>,
    fail_summaries: bool,
}

impl MockRpc {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl IdentifyRpc for MockRpc {
    fn register_identify_ui(&self) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push("register".to_string());
        Ok(())
    }

    fn load_unchecked_user_summaries(
        &self,
        uids: &[String],
    ) -> Result<Vec<UserSummary>, CoreError> {
        self.calls.lock().unwrap().push(format!("summaries:{}", uids.join(",")));
        if self.fail_summaries {
            return Err(CoreError::Rpc("engine unavailable".to_string()));
        }
        Ok(uids
            .iter()
            .map(|uid| UserSummary {
                uid: uid.clone(),
                username: "max".to_string(),
                thumbnail: "https://example.test/max.jpg".to_string(),
                id_version: 3,
                full_name: "Max Krohn".to_string(),
                bio: String::new(),
            })
            .collect())
    }

    fn confirm_reply(&self, session_id: i64, confirmed: bool) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(format!("confirm:{session_id}:{confirmed}"));
        Ok(())
    }

    fn open_url(&self, url: &str) -> Result<(), CoreError> {
        self.calls.lock().unwrap().push(format!("open:{url}"));
        Ok(())
    }
}

fn proof(value: &str) -> RemoteProof {
    RemoteProof {
        proof_type: 2,
        key: "twitter".to_string(),
        value: value.to_string(),
        display_markup: value.to_string(),
        sig_id: format!("{value}-sig"),
        m_time: 0,
    }
}

fn identity(values: &[&str]) -> Identity {
    Identity {
        when_last_tracked: 0,
        proofs: values
            .iter()
            .enumerate()
            .map(|(idx, value)| IdentifyRow {
                row_id: idx as i64,
                proof: proof(value),
                track_diff: None,
            })
            .collect(),
        breaks_tracking: false,
    }
}

fn session_events() -> Vec<TrackerEvent> {
    vec![
        TrackerEvent::Start {
            session_id: 9,
            username: "max".to_string(),
        },
        TrackerEvent::LaunchNetworkChecks {
            session_id: 9,
            identity: identity(&["max", "maxtaco"]),
            user: User {
                uid: "dbb165b7879fe7b1174df73bed0b9500".to_string(),
                username: "max".to_string(),
            },
        },
        TrackerEvent::FinishSocialProofCheck {
            session_id: 9,
            rp: proof("max"),
            lcr: LinkCheckResult::with_state(0, ProofState::Ok),
        },
        TrackerEvent::FinishWebProofCheck {
            session_id: 9,
            rp: proof("maxtaco"),
            lcr: LinkCheckResult::with_state(1, ProofState::TempFailure),
        },
        TrackerEvent::Finish { session_id: 9 },
    ]
}

#[test]
fn reducer_sets_username_and_requests_summary() {
    let state = TrackerState::new(&ViewConfig::default());
    let started = reduce(
        &state,
        TrackerEvent::Start {
            session_id: 1,
            username: "chris".to_string(),
        },
    )
    .state;
    assert_eq!(started.bio.username.as_deref(), Some("chris"));
    assert_eq!(started.action.username.as_deref(), Some("chris"));
    assert!(state.bio.username.is_none());

    let launched = reduce(
        &started,
        TrackerEvent::LaunchNetworkChecks {
            session_id: 1,
            identity: identity(&["a", "b"]),
            user: User {
                uid: "u1".to_string(),
                username: "chris".to_string(),
            },
        },
    );
    assert_eq!(launched.effects, vec![Effect::LoadUserSummary { uid: "u1".to_string() }]);
    assert_eq!(launched.state.proofs.proofs_and_checks.len(), 2);
    assert_eq!(launched.state.outstanding_reqs.len(), 2);
}

#[test]
fn status_is_only_recomputed_on_finish() {
    let mut state = TrackerState::new(&ViewConfig::default());
    let events = session_events();
    let (finish, before) = events.split_last().unwrap();
    for event in before.iter().cloned() {
        state = reduce(&state, event).state;
    }
    assert_eq!(state.overall_status, OverallStatus::Pending);
    assert!(state.outstanding_reqs.is_empty());

    state = reduce(&state, finish.clone()).state;
    assert_eq!(state.overall_status, OverallStatus::Warning);
    assert_eq!(state.bio.state, OverallStatus::Warning);
    assert_eq!(state.action.state, OverallStatus::Warning);
}

#[test]
fn confirm_never_auto_confirms() {
    let state = TrackerState::new(&ViewConfig::default());
    let transition = reduce(
        &state,
        TrackerEvent::Confirm {
            session_id: 4,
            outcome: IdentifyOutcome::default(),
        },
    );
    assert_eq!(
        transition.effects,
        vec![Effect::ConfirmReply {
            session_id: 4,
            confirmed: false
        }]
    );
    assert_eq!(transition.state, state);
}

#[test]
fn listener_folds_session_into_snapshots() {
    let rpc = MockRpc::default();
    let listener = TrackerListener::new(rpc.clone(), ViewConfig::default());
    let (tx, inbox) = mpsc::channel();
    let (sink, snapshots) = mpsc::channel();
    for event in session_events() {
        tx.send(EngineMessage::Event(event)).unwrap();
    }
    tx.send(EngineMessage::Action(TrackerAction::FollowChecked(false))).unwrap();
    tx.send(EngineMessage::Shutdown).unwrap();

    let final_state = listener.run(inbox, sink);
    let props: Vec<_> = snapshots.try_iter().collect();
    // one per event, one for the loaded summary, one for the action
    assert_eq!(props.len(), 7);
    let last = props.last().unwrap();
    assert_eq!(last.bio.username.as_deref(), Some("max"));
    assert_eq!(last.bio.user_info.fullname, "Max Krohn");
    assert_eq!(last.bio.state, OverallStatus::Warning);
    assert!(!last.action.should_follow);
    assert_eq!(final_state.session_id, Some(9));
    assert_eq!(
        rpc.calls(),
        vec![
            "register".to_string(),
            "summaries:dbb165b7879fe7b1174df73bed0b9500".to_string()
        ]
    );
}

#[test]
fn failing_summary_lookup_does_not_stop_listener() {
    let dir = tempfile::tempdir().expect("temp");
    let rpc = MockRpc {
        fail_summaries: true,
        ..MockRpc::default()
    };
    let config = ViewConfig {
        diagnostics_dir: Some(dir.path().to_path_buf()),
        ..ViewConfig::default()
    };
    let (tx, snapshots, handle) = spawn_listener(rpc.clone(), config).expect("spawn");
    for event in session_events() {
        tx.send(EngineMessage::Event(event)).unwrap();
    }
    drop(tx);
    let final_state = handle.join().expect("join");

    assert_eq!(snapshots.try_iter().count(), 5);
    assert_eq!(final_state.overall_status, OverallStatus::Warning);
    assert_eq!(final_state.bio.user_info.followers_count, -1);
    let log = std::fs::read_to_string(dir.path().join("tracker-diagnostics.log")).expect("log");
    assert!(log.contains("engine unavailable"));
}

#[test]
fn follow_help_action_opens_url() {
    let rpc = MockRpc::default();
    let (tx, _snapshots, handle) =
        spawn_listener(rpc.clone(), ViewConfig::default()).expect("spawn");
    tx.send(EngineMessage::Action(TrackerAction::FollowHelp)).unwrap();
    tx.send(EngineMessage::Shutdown).unwrap();
    handle.join().expect("join");
    assert!(rpc
        .calls()
        .contains(&"open:https://keybase.io/docs/tracking".to_string()));
}

#[test]
fn decode_named_engine_calls() {
    let event = decode_tracker_event(
        "keybase.1.identifyUi.start",
        json!({"sessionID": 3, "username": "chris"}),
    )
    .expect("start");
    assert_eq!(
        event,
        TrackerEvent::Start {
            session_id: 3,
            username: "chris".to_string()
        }
    );

    let event = decode_tracker_event(
        "finishWebProofCheck",
        json!({
            "sessionID": 3,
            "rp": {"proofType": 1000, "key": "https", "value": "chris.example", "sigID": "abc"},
            "lcr": {"proofId": 4, "proofResult": {"state": 3}}
        }),
    )
    .expect("finish web proof");
    let TrackerEvent::FinishWebProofCheck { rp, lcr, .. } = event else {
        panic!("wrong event");
    };
    assert_eq!(rp.sig_id, "abc");
    assert_eq!(lcr.state(), ProofState::PermFailure);

    let err = decode_tracker_event("keybase.1.identifyUi.dismiss", json!({})).unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument(_)));
}

#[test]
fn newer_proof_state_counts_as_failure() {
    let mut state = TrackerState::new(&ViewConfig::default());
    let calls = [
        ("start", json!({"sessionID": 5, "username": "max"})),
        (
            "launchNetworkChecks",
            json!({
                "sessionID": 5,
                "identity": {"proofs": [{"rowId": 0, "proof": {
                    "proofType": 1000, "key": "https", "value": "max.example", "sigID": "s1"
                }}]},
                "user": {"uid": "u5", "username": "max"}
            }),
        ),
        (
            "finishWebProofCheck",
            json!({
                "sessionID": 5,
                "rp": {"proofType": 1000, "key": "https", "value": "max.example", "sigID": "s1"},
                "lcr": {"proofResult": {"state": 9}}
            }),
        ),
        ("finish", json!({"sessionID": 5})),
    ];
    for (method, params) in calls {
        let event = decode_tracker_event(method, params).expect("decode");
        state = reduce(&state, event).state;
    }
    assert_eq!(
        state.proofs.proofs_and_checks[0]
            .result
            .as_ref()
            .map(LinkCheckResult::state),
        Some(ProofState::UnknownType)
    );
    assert_eq!(state.overall_status, OverallStatus::Error);
}

#[test]
fn listener_decodes_calls_and_logs_bad_ones() {
    let dir = tempfile::tempdir().expect("temp");
    let rpc = MockRpc::default();
    let config = ViewConfig {
        diagnostics_dir: Some(dir.path().to_path_buf()),
        ..ViewConfig::default()
    };
    let listener = TrackerListener::new(rpc, config);
    let (tx, inbox) = mpsc::channel();
    let (sink, snapshots) = mpsc::channel();
    tx.send(EngineMessage::Call {
        method: "keybase.1.identifyUi.start".to_string(),
        params: json!({"sessionID": 8, "username": "chris"}),
    })
    .unwrap();
    tx.send(EngineMessage::Call {
        method: "keybase.1.identifyUi.finish".to_string(),
        params: json!({"session": "not a number"}),
    })
    .unwrap();
    tx.send(EngineMessage::Call {
        method: "keybase.1.identifyUi.dismiss".to_string(),
        params: json!({}),
    })
    .unwrap();
    drop(tx);

    let final_state = listener.run(inbox, sink);
    assert_eq!(snapshots.try_iter().count(), 1);
    assert_eq!(final_state.bio.username.as_deref(), Some("chris"));

    let log = std::fs::read_to_string(dir.path().join("tracker-diagnostics.log")).expect("log");
    let kinds: Vec<serde_json::Value> = log
        .lines()
        .map(|line| serde_json::from_str::<serde_json::Value>(line).expect("json")["kind"].clone())
        .collect();
    assert_eq!(kinds, vec![json!("decode"), json!("decode")]);
    assert!(log.contains("dismiss"));
}
