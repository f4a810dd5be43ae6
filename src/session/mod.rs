//! Best-effort mirror of the local playback session on the remote store.
//!
//! Only session creation is awaited. Every other call is spawned onto the
//! runtime and forgotten: its outcome is logged and never read back, so a slow
//! or failing store can never stall or roll back local playback. Spawned calls
//! are tracked so the player can let them land before the process exits.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::api::{CompletionFeedback, SessionId, SessionStore};
use crate::errors::ApiError;

/// A lifecycle call against an existing remote session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Progress { step_index: usize },
    Pause,
    Resume,
    Complete(CompletionFeedback),
    Abandon,
}

impl SessionCall {
    pub fn name(&self) -> &'static str {
        match self {
            SessionCall::Progress { .. } => "progress",
            SessionCall::Pause => "pause",
            SessionCall::Resume => "resume",
            SessionCall::Complete(_) => "complete",
            SessionCall::Abandon => "abandon",
        }
    }

    async fn send(&self, store: &dyn SessionStore, session: &SessionId) -> Result<(), ApiError> {
        match self {
            SessionCall::Progress { step_index } => {
                store.update_progress(session, *step_index).await
            }
            SessionCall::Pause => store.pause_session(session).await,
            SessionCall::Resume => store.resume_session(session).await,
            SessionCall::Complete(feedback) => store.complete_session(session, feedback).await,
            SessionCall::Abandon => store.abandon_session(session).await,
        }
    }
}

/// Issues session calls against the remote store.
///
/// The client holds no session state of its own; the caller passes the
/// session id it owns, and a missing id turns every call into a no-op.
pub struct SessionClient {
    store: Arc<dyn SessionStore>,
    call_timeout: Duration,
    in_flight: JoinSet<()>,
}

impl SessionClient {
    pub fn new(store: Arc<dyn SessionStore>, call_timeout: Duration) -> Self {
        Self {
            store,
            call_timeout,
            in_flight: JoinSet::new(),
        }
    }

    /// Upper bound on a single fire-and-forget call.
    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Number of spawned calls that have not finished yet.
    pub fn pending(&mut self) -> usize {
        while self.in_flight.try_join_next().is_some() {}
        self.in_flight.len()
    }

    /// Wait up to `within` for spawned calls to finish; abort the rest.
    ///
    /// Returns the number of calls that were cut off.
    pub async fn drain(&mut self, within: Duration) -> usize {
        let in_flight = &mut self.in_flight;
        let finished = tokio::time::timeout(within, async {
            while in_flight.join_next().await.is_some() {}
        })
        .await;
        if finished.is_ok() {
            return 0;
        }
        let cut_off = self.in_flight.len();
        warn!(cut_off, "Session calls still pending at shutdown; dropping them");
        self.in_flight.shutdown().await;
        cut_off
    }

    /// Create the remote session for a ritual.
    ///
    /// Failure and timeout are tolerated and yield `None`; playback then runs
    /// without a remote mirror.
    pub async fn open(&self, ritual_id: &str, create_timeout: Duration) -> Option<SessionId> {
        match tokio::time::timeout(create_timeout, self.store.create_session(ritual_id)).await {
            Ok(Ok(id)) => {
                info!(ritual_id, session_id = %id, "Remote session created");
                Some(id)
            }
            Ok(Err(e)) => {
                warn!(ritual_id, error = %e, "Session create failed; playing without remote mirror");
                None
            }
            Err(_) => {
                warn!(
                    ritual_id,
                    timeout_secs = create_timeout.as_secs(),
                    "Session create timed out; playing without remote mirror"
                );
                None
            }
        }
    }

    pub fn progress(&mut self, session: Option<&SessionId>, step_index: usize) -> bool {
        self.fire(session, SessionCall::Progress { step_index })
    }

    pub fn pause(&mut self, session: Option<&SessionId>) -> bool {
        self.fire(session, SessionCall::Pause)
    }

    pub fn resume(&mut self, session: Option<&SessionId>) -> bool {
        self.fire(session, SessionCall::Resume)
    }

    pub fn complete(
        &mut self,
        session: Option<&SessionId>,
        feedback: CompletionFeedback,
    ) -> bool {
        self.fire(session, SessionCall::Complete(feedback))
    }

    pub fn abandon(&mut self, session: Option<&SessionId>) -> bool {
        self.fire(session, SessionCall::Abandon)
    }

    /// Spawn `call` and return immediately. Returns `false` when there is no
    /// remote session to call.
    pub fn fire(&mut self, session: Option<&SessionId>, call: SessionCall) -> bool {
        let Some(session) = session.cloned() else {
            debug!(call = call.name(), "No remote session; skipping call");
            return false;
        };
        while self.in_flight.try_join_next().is_some() {}
        let store = Arc::clone(&self.store);
        let call_timeout = self.call_timeout;

        self.in_flight.spawn(async move {
            let name = call.name();
            let result = match tokio::time::timeout(call_timeout, call.send(store.as_ref(), &session))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout {
                    endpoint: name.to_string(),
                    secs: call_timeout.as_secs(),
                }),
            };
            match result {
                Ok(()) => debug!(session_id = %session, call = name, "Session call succeeded"),
                Err(e) => {
                    warn!(session_id = %session, call = name, error = %e, "Session call failed; ignoring")
                }
            }
        });
        true
    }
}
