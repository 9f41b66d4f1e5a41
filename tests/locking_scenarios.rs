mod common;

use common::fixtures::{RecordingObserver, blocking_candidate, denied};
use dslock::error::DsLockError;
use dslock::locking::{LockOperation, LockRequest, RetryLimit, UnlockOperation};
use dslock::rpc::{
    Datastore, ErrorSeverity, Operation, RaiseMode, RpcError, ScriptedChannel, ScriptedReply,
};
use std::time::{Duration, Instant};

fn scenario_request() -> LockRequest {
    LockRequest::new(Datastore::candidate())
        .blocking(RetryLimit::bounded(3))
        .with_interval(Duration::from_millis(10))
}

#[test]
fn denied_three_times_then_too_many_sessions_raises() {
    for raise in [RaiseMode::RaiseAlways, RaiseMode::RaiseOnError] {
        let mut replies = denied(3);
        replies.push(ScriptedReply::error("too-many-sessions"));
        let channel = ScriptedChannel::new(replies);

        let err = LockOperation::new(&channel)
            .acquire(&scenario_request(), raise)
            .unwrap_err();

        assert_eq!(channel.sent_count(), 4);
        match err {
            DsLockError::Rpc(error) => {
                assert_eq!(error.tag, "too-many-sessions");
                assert_eq!(error.severity, ErrorSeverity::Error);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn denied_once_then_ok_succeeds_on_second_attempt() {
    let channel = ScriptedChannel::new([ScriptedReply::lock_denied(), ScriptedReply::Ok]);

    let started = Instant::now();
    let reply = LockOperation::new(&channel)
        .acquire(&scenario_request(), RaiseMode::RaiseAlways)
        .unwrap();

    assert!(reply.ok());
    assert_eq!(channel.sent_count(), 2);
    assert!(started.elapsed() >= Duration::from_millis(10));
}

#[test]
fn bounded_retries_send_one_more_attempt_than_the_bound() {
    for retries in [1u32, 2, 5, 12] {
        let channel = ScriptedChannel::new(denied(retries as usize + 5));

        let reply = LockOperation::new(&channel)
            .acquire(
                &blocking_candidate(RetryLimit::bounded(retries)),
                RaiseMode::Suppress,
            )
            .unwrap();

        assert!(!reply.ok());
        assert!(reply.error().unwrap().is_lock_denied());
        assert_eq!(channel.sent_count(), retries as usize + 1);
    }
}

#[test]
fn unbounded_retries_keep_going_until_the_device_changes_its_answer() {
    let mut replies = denied(400);
    replies.push(ScriptedReply::error("resource-denied"));
    let channel = ScriptedChannel::new(replies);

    let err = LockOperation::new(&channel)
        .acquire(
            &blocking_candidate(RetryLimit::from_count(0)),
            RaiseMode::RaiseOnError,
        )
        .unwrap_err();

    assert!(channel.sent_count() >= 400);
    assert_eq!(channel.sent_count(), 401);
    assert_eq!(err.primary_rpc_error().unwrap().tag, "resource-denied");
}

#[test]
fn every_blocking_attempt_reuses_one_message_id_under_suppress() {
    let mut replies = denied(4);
    replies.push(ScriptedReply::Ok);
    let channel = ScriptedChannel::new(replies);

    LockOperation::new(&channel)
        .acquire(
            &blocking_candidate(RetryLimit::Unbounded),
            RaiseMode::RaiseAlways,
        )
        .unwrap();

    let sent = channel.sent();
    assert_eq!(sent.len(), 5);
    assert!(sent.iter().all(|s| s.message_id == sent[0].message_id));
    assert!(sent.iter().all(|s| s.raise == RaiseMode::Suppress));
    assert!(!sent[0].resent);
    assert!(sent[1..].iter().all(|s| s.resent));
    assert!(
        sent.iter()
            .all(|s| s.operation == Operation::lock(Datastore::candidate()))
    );
}

#[test]
fn non_blocking_sends_exactly_one_request() {
    let cases = [
        (ScriptedReply::Ok, true),
        (ScriptedReply::lock_denied(), false),
        (ScriptedReply::error("in-use"), false),
    ];

    for (reply, expect_ok) in cases {
        let channel = ScriptedChannel::new([reply, ScriptedReply::Ok]);
        let outcome = LockOperation::new(&channel)
            .acquire(&LockRequest::new(Datastore::running()), RaiseMode::Suppress)
            .unwrap();

        assert_eq!(outcome.ok(), expect_ok);
        assert_eq!(channel.sent_count(), 1);
        assert_eq!(channel.remaining(), 1);
        assert_eq!(channel.sent()[0].raise, RaiseMode::Suppress);
    }
}

#[test]
fn non_blocking_leaves_escalation_to_the_channel() {
    let channel = ScriptedChannel::new([ScriptedReply::lock_denied()]);
    let err = LockOperation::new(&channel)
        .acquire(&LockRequest::new(Datastore::candidate()), RaiseMode::RaiseOnError)
        .unwrap_err();

    assert!(err.is_lock_denied());
    assert_eq!(channel.sent()[0].raise, RaiseMode::RaiseOnError);
}

#[test]
fn raise_always_with_several_errors_raises_all_in_order() {
    let errors = vec![
        RpcError::new("lock-denied", ErrorSeverity::Warning),
        RpcError::new("in-use", ErrorSeverity::Error),
        RpcError::new("operation-failed", ErrorSeverity::Error),
    ];
    let channel = ScriptedChannel::new([ScriptedReply::Errors(errors.clone())]);

    let err = LockOperation::new(&channel)
        .acquire(
            &LockRequest::new(Datastore::candidate()),
            RaiseMode::RaiseAlways,
        )
        .unwrap_err();

    match &err {
        DsLockError::Aggregate { errors: raised, .. } => assert_eq!(raised, &errors),
        other => panic!("expected aggregate, got {other:?}"),
    }
    assert_eq!(err.rpc_errors().len(), 3);
}

#[test]
fn raise_on_error_returns_warning_replies_unraised() {
    let channel = ScriptedChannel::new([
        ScriptedReply::lock_denied(),
        ScriptedReply::Errors(vec![
            RpcError::new("partial-operation", ErrorSeverity::Warning),
            RpcError::new("in-use", ErrorSeverity::Error),
        ]),
    ]);

    let reply = LockOperation::new(&channel)
        .acquire(
            &blocking_candidate(RetryLimit::bounded(3)),
            RaiseMode::RaiseOnError,
        )
        .unwrap();

    assert!(!reply.ok());
    assert_eq!(reply.errors().len(), 2);
    assert_eq!(reply.error().unwrap().tag, "partial-operation");
    assert_eq!(channel.sent_count(), 2);
}

#[test]
fn observer_sees_the_whole_wait() {
    let channel = ScriptedChannel::new([
        ScriptedReply::lock_denied_by(7),
        ScriptedReply::lock_denied(),
        ScriptedReply::Ok,
    ]);
    let observer = RecordingObserver::default();

    LockOperation::new(&channel)
        .with_observer(Some(&observer))
        .acquire(
            &blocking_candidate(RetryLimit::bounded(4)),
            RaiseMode::RaiseAlways,
        )
        .unwrap();

    assert_eq!(
        observer.events(),
        vec![
            "start candidate 4",
            "retry candidate 1 held by 7",
            "retry candidate 2",
            "acquired candidate 3",
        ]
    );
}

#[test]
fn observer_is_told_when_the_budget_runs_out() {
    let channel = ScriptedChannel::new(denied(3));
    let observer = RecordingObserver::default();

    let err = LockOperation::new(&channel)
        .with_observer(Some(&observer))
        .acquire(
            &blocking_candidate(RetryLimit::bounded(2)),
            RaiseMode::RaiseOnError,
        )
        .unwrap_err();

    assert!(err.is_lock_denied());
    assert_eq!(
        observer.events(),
        vec![
            "start candidate 2",
            "retry candidate 1",
            "retry candidate 2",
            "gave-up candidate 3 lock-denied",
        ]
    );
}

#[test]
fn transport_failure_ends_the_wait() {
    let channel = ScriptedChannel::new([
        ScriptedReply::lock_denied(),
        ScriptedReply::TransportFailure("session closed".to_string()),
        ScriptedReply::Ok,
    ]);

    let err = LockOperation::new(&channel)
        .acquire(
            &blocking_candidate(RetryLimit::Unbounded),
            RaiseMode::Suppress,
        )
        .unwrap_err();

    assert!(matches!(err, DsLockError::Transport(_)));
    assert_eq!(channel.sent_count(), 2);
}

#[test]
fn unlock_sends_one_request_and_never_retries() {
    let channel = ScriptedChannel::new([ScriptedReply::lock_denied(), ScriptedReply::Ok]);

    let reply = UnlockOperation::new(&channel)
        .release(&Datastore::candidate(), RaiseMode::Suppress)
        .unwrap();

    assert!(!reply.ok());
    let sent = channel.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].operation, Operation::unlock(Datastore::candidate()));
}
