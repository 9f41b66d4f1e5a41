use dslock::locking::{LockRequest, LockWaitObserver, RetryLimit};
use dslock::rpc::{Datastore, RpcReply, ScriptedReply};
use std::sync::Mutex;
use std::time::Duration;

/// `count` consecutive `lock-denied` replies.
pub fn denied(count: usize) -> Vec<ScriptedReply> {
    vec![ScriptedReply::lock_denied(); count]
}

/// Blocking request on `candidate` with no wait between attempts.
pub fn blocking_candidate(retries: RetryLimit) -> LockRequest {
    LockRequest::new(Datastore::candidate())
        .blocking(retries)
        .with_interval(Duration::ZERO)
}

/// Observer that records every event as a short line.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl LockWaitObserver for RecordingObserver {
    fn on_wait_start(&self, target: &Datastore, retries: RetryLimit) {
        self.record(format!("start {target} {retries}"));
    }

    fn on_retry(&self, target: &Datastore, attempt: u64, holding_session: Option<u32>) {
        match holding_session {
            Some(session) => self.record(format!("retry {target} {attempt} held by {session}")),
            None => self.record(format!("retry {target} {attempt}")),
        }
    }

    fn on_acquired(&self, target: &Datastore, attempts: u64, _waited: Duration) {
        self.record(format!("acquired {target} {attempts}"));
    }

    fn on_gave_up(&self, target: &Datastore, attempts: u64, reply: &RpcReply) {
        let tag = reply.error().map(|e| e.tag.as_str()).unwrap_or("none");
        self.record(format!("gave-up {target} {attempts} {tag}"));
    }
}
