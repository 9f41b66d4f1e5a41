mod common;

use common::fixtures::denied;
use dslock::error::{DsLockError, Result};
use dslock::locking::{LockRequest, LockScope, RetryLimit, SCOPE_RAISE_MODE, ScopeError};
use dslock::rpc::{
    Datastore, ErrorSeverity, Operation, RaiseMode, RpcChannel, RpcError, RpcReply, RpcRequest,
    ScriptedChannel, ScriptedReply,
};
use mockall::{Sequence, mock};
use std::time::Duration;

mock! {
    Channel {}

    impl RpcChannel for Channel {
        fn send(&self, request: &RpcRequest, raise: RaiseMode) -> Result<RpcReply>;
        fn resend(&self, request: &RpcRequest, raise: RaiseMode) -> Result<RpcReply>;
    }
}

fn ok_reply(request: &RpcRequest) -> RpcReply {
    RpcReply::new(request.message_id().clone(), Vec::new(), "<ok/>")
}

fn is_op(name: &'static str) -> impl Fn(&RpcRequest, &RaiseMode) -> bool + Send + 'static {
    move |request, raise| request.operation().name() == name && *raise == SCOPE_RAISE_MODE
}

#[test]
fn release_follows_failed_work_exactly_once() {
    let mut channel = MockChannel::new();
    let mut seq = Sequence::new();
    channel
        .expect_send()
        .withf(is_op("lock"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|request, _| Ok(ok_reply(request)));
    channel
        .expect_send()
        .withf(is_op("unlock"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|request, _| Ok(ok_reply(request)));
    channel.expect_resend().never();

    let scope = LockScope::new(&channel, LockRequest::new(Datastore::candidate()));
    let err = scope
        .run(|_| Err::<(), _>(DsLockError::Transport("edit-config failed".to_string())))
        .unwrap_err();

    assert!(matches!(
        err,
        ScopeError::Work {
            error: DsLockError::Transport(_),
            release: None
        }
    ));
}

#[test]
fn acquire_failure_never_runs_work_or_unlock() {
    let mut channel = MockChannel::new();
    channel
        .expect_send()
        .withf(is_op("lock"))
        .times(1)
        .returning(|request, raise| {
            raise.escalate(RpcReply::new(
                request.message_id().clone(),
                vec![RpcError::lock_denied(Some(3))],
                "",
            ))
        });

    let mut ran = false;
    let err = LockScope::new(&channel, LockRequest::new(Datastore::running()))
        .run(|_| {
            ran = true;
            Ok::<_, DsLockError>(())
        })
        .unwrap_err();

    assert!(!ran);
    match err {
        ScopeError::Acquire(err) => {
            assert_eq!(err.primary_rpc_error().unwrap().holding_session(), Some(3));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn warnings_abort_entry() {
    let channel = ScriptedChannel::new([ScriptedReply::warning("partial-operation")]);

    let err = LockScope::new(&channel, LockRequest::new(Datastore::candidate()))
        .run(|_| Ok::<_, DsLockError>(()))
        .unwrap_err();

    assert!(err.is_acquire());
    assert_eq!(channel.sent_count(), 1);
}

#[test]
fn work_and_release_failures_are_both_kept() {
    let channel = ScriptedChannel::new([
        ScriptedReply::Ok,
        ScriptedReply::Errors(vec![RpcError::new(
            "operation-failed",
            ErrorSeverity::Warning,
        )]),
    ]);

    let err = LockScope::new(&channel, LockRequest::new(Datastore::candidate()))
        .run(|_| Err::<(), _>(DsLockError::Transport("commit failed".to_string())))
        .unwrap_err();

    match err {
        ScopeError::Work {
            error,
            release: Some(release),
        } => {
            assert!(matches!(error, DsLockError::Transport(_)));
            assert_eq!(release.primary_rpc_error().unwrap().tag, "operation-failed");
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(channel.sent_count(), 2);
}

#[test]
fn guard_releases_on_drop() {
    let channel = ScriptedChannel::new([ScriptedReply::Ok, ScriptedReply::Ok]);
    let scope = LockScope::new(&channel, LockRequest::new(Datastore::startup()));

    {
        let guard = scope.enter().unwrap();
        assert!(guard.lock_reply().ok());
        assert_eq!(channel.sent_count(), 1);
    }

    let sent = channel.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].operation, Operation::unlock(Datastore::startup()));
}

#[test]
fn blocking_scope_waits_then_holds() {
    let mut replies = denied(2);
    replies.extend([ScriptedReply::Ok, ScriptedReply::Ok]);
    let channel = ScriptedChannel::new(replies);
    let request = LockRequest::new(Datastore::candidate())
        .blocking(RetryLimit::bounded(2))
        .with_interval(Duration::from_millis(1));

    let value = LockScope::new(&channel, request)
        .run(|target| Ok::<_, DsLockError>(target.to_string()))
        .unwrap();

    assert_eq!(value, "candidate");
    let names: Vec<_> = channel.sent().iter().map(|s| s.operation.name()).collect();
    assert_eq!(names, ["lock", "lock", "lock", "unlock"]);
}
