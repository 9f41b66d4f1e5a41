// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory channel that answers requests from a queue of canned device replies.
//!
//! The channel tracks correlation the way a session listener does: a sent
//! message id is registered until its reply is delivered, after which the id may
//! be re-armed with [`RpcChannel::resend`]. A transport failure delivers no
//! reply, so its id stays pending and cannot be sent or re-armed again. Every
//! request is recorded so callers can assert on what went over the wire.

use crate::error::{DsLockError, Result};
use crate::rpc::channel::RpcChannel;
use crate::rpc::message::{MessageId, Operation, RpcRequest};
use crate::rpc::raise::RaiseMode;
use crate::rpc::reply::{ErrorSeverity, LOCK_DENIED, RpcError, RpcReply};
use log::trace;
use std::collections::{HashSet, VecDeque};
use std::str::FromStr;
use std::sync::Mutex;

/// One canned device response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedReply {
    Ok,
    Errors(Vec<RpcError>),
    /// The transport fails before any reply arrives.
    TransportFailure(String),
}

impl ScriptedReply {
    pub fn error(tag: &str) -> Self {
        ScriptedReply::Errors(vec![RpcError::new(tag, ErrorSeverity::Error)])
    }

    pub fn warning(tag: &str) -> Self {
        ScriptedReply::Errors(vec![RpcError::new(tag, ErrorSeverity::Warning)])
    }

    pub fn lock_denied() -> Self {
        ScriptedReply::Errors(vec![RpcError::lock_denied(None)])
    }

    pub fn lock_denied_by(session: u32) -> Self {
        ScriptedReply::Errors(vec![RpcError::lock_denied(Some(session))])
    }
}

impl FromStr for ScriptedReply {
    type Err = DsLockError;

    /// Parses `ok`, `<tag>`, `<tag>:warning`, `lock-denied@<session>` and
    /// `+`-joined lists of errors such as `in-use+partial-operation:warning`.
    fn from_str(s: &str) -> Result<Self> {
        let spec = s.trim();
        if spec.eq_ignore_ascii_case("ok") {
            return Ok(ScriptedReply::Ok);
        }
        if let Some(detail) = spec.strip_prefix("transport:") {
            return Ok(ScriptedReply::TransportFailure(detail.to_string()));
        }

        let errors = spec
            .split('+')
            .map(parse_error_spec)
            .collect::<Result<Vec<_>>>()?;
        Ok(ScriptedReply::Errors(errors))
    }
}

fn parse_error_spec(spec: &str) -> Result<RpcError> {
    let spec = spec.trim();
    let (tag_part, severity) = match spec.rsplit_once(':') {
        Some((tag, "warning")) => (tag, ErrorSeverity::Warning),
        Some((tag, "error")) => (tag, ErrorSeverity::Error),
        Some((_, other)) => {
            return Err(DsLockError::InvalidConfig(format!(
                "Unknown severity '{other}' in reply '{spec}'. Use 'error' or 'warning'."
            )));
        }
        None => (spec, ErrorSeverity::Error),
    };

    let (tag, session) = match tag_part.split_once('@') {
        Some((tag, session)) => {
            let session = session.parse::<u32>().map_err(|_| {
                DsLockError::InvalidConfig(format!(
                    "Session id '{session}' in reply '{spec}' is not a number"
                ))
            })?;
            (tag, Some(session))
        }
        None => (tag_part, None),
    };

    if tag.is_empty() {
        return Err(DsLockError::InvalidConfig(format!(
            "Reply '{spec}' has an empty error tag"
        )));
    }

    if tag == LOCK_DENIED {
        let mut error = RpcError::lock_denied(session);
        error.severity = severity;
        return Ok(error);
    }

    let mut error = RpcError::new(tag, severity);
    if let Some(session) = session {
        error = error.with_info("session-id", session.to_string());
    }
    Ok(error)
}

/// What a [`ScriptedChannel`] saw for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    pub message_id: MessageId,
    pub operation: Operation,
    pub raise: RaiseMode,
    pub resent: bool,
}

#[derive(Debug, Default)]
struct ChannelState {
    script: VecDeque<ScriptedReply>,
    pending: HashSet<MessageId>,
    answered: HashSet<MessageId>,
    sent: Vec<SentRequest>,
}

#[derive(Debug, Default)]
pub struct ScriptedChannel {
    state: Mutex<ChannelState>,
}

impl ScriptedChannel {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = ScriptedReply>,
    {
        Self {
            state: Mutex::new(ChannelState {
                script: replies.into_iter().collect(),
                ..ChannelState::default()
            }),
        }
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.lock_state().sent.clone()
    }

    pub fn sent_count(&self) -> usize {
        self.lock_state().sent.len()
    }

    pub fn remaining(&self) -> usize {
        self.lock_state().script.len()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ChannelState> {
        // A poisoned script is still readable; the data is only ever appended to.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn exchange(&self, request: &RpcRequest, raise: RaiseMode, resent: bool) -> Result<RpcReply> {
        let mut state = self.lock_state();
        let message_id = request.message_id().clone();

        if state.pending.contains(&message_id) {
            return Err(DsLockError::Transport(format!(
                "message-id {message_id} is already awaiting a reply"
            )));
        }
        if resent {
            if !state.answered.remove(&message_id) {
                return Err(DsLockError::Transport(format!(
                    "message-id {message_id} was never answered and cannot be re-armed"
                )));
            }
        } else if state.answered.contains(&message_id) {
            return Err(DsLockError::Transport(format!(
                "message-id {message_id} was already used; retries must go through resend"
            )));
        }

        state.pending.insert(message_id.clone());
        state.sent.push(SentRequest {
            message_id: message_id.clone(),
            operation: request.operation().clone(),
            raise,
            resent,
        });
        trace!("-> {}", request.to_xml());

        // The id stays pending unless a reply is actually delivered for it.
        let errors = match state.script.pop_front() {
            Some(ScriptedReply::Ok) => Vec::new(),
            Some(ScriptedReply::Errors(errors)) => errors,
            Some(ScriptedReply::TransportFailure(detail)) => {
                return Err(DsLockError::Transport(detail));
            }
            None => {
                return Err(DsLockError::Transport(format!(
                    "no reply scripted for {}",
                    request.operation()
                )));
            }
        };
        state.pending.remove(&message_id);
        state.answered.insert(message_id.clone());
        drop(state);

        let raw = render_reply(&message_id, &errors);
        trace!("<- {raw}");
        raise.escalate(RpcReply::new(message_id, errors, raw))
    }
}

impl RpcChannel for ScriptedChannel {
    fn send(&self, request: &RpcRequest, raise: RaiseMode) -> Result<RpcReply> {
        self.exchange(request, raise, false)
    }

    fn resend(&self, request: &RpcRequest, raise: RaiseMode) -> Result<RpcReply> {
        self.exchange(request, raise, true)
    }
}

fn render_reply(message_id: &MessageId, errors: &[RpcError]) -> String {
    let mut body = String::new();
    if errors.is_empty() {
        body.push_str("<ok/>");
    }
    for error in errors {
        body.push_str("<rpc-error>");
        body.push_str(&format!("<error-type>{}</error-type>", error.error_type));
        body.push_str(&format!("<error-tag>{}</error-tag>", error.tag));
        body.push_str(&format!(
            "<error-severity>{}</error-severity>",
            error.severity
        ));
        if let Some(message) = &error.message {
            body.push_str(&format!("<error-message>{message}</error-message>"));
        }
        if !error.info.is_empty() {
            body.push_str("<error-info>");
            for (key, value) in &error.info {
                body.push_str(&format!("<{key}>{value}</{key}>"));
            }
            body.push_str("</error-info>");
        }
        body.push_str("</rpc-error>");
    }
    format!("<rpc-reply message-id=\"{message_id}\">{body}</rpc-reply>")
}
