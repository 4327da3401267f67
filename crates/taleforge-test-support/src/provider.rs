//! Scripted `NarrationProvider` for orchestrator tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use taleforge_gateway::{NarrationProvider, NarrationRequest, ProviderError, ProviderKind};

/// Replays scripted replies in order and records every request it receives.
///
/// Once the script is exhausted the last reply is repeated; an empty script
/// fails every call with `ProviderError::EmptyResponse`.
#[derive(Debug)]
pub struct ScriptedProvider {
    kind: ProviderKind,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    last: Mutex<Option<Result<String, ProviderError>>>,
    requests: Mutex<Vec<NarrationRequest>>,
}

impl ScriptedProvider {
    /// A provider of `kind` that returns `replies` in order.
    #[must_use]
    pub fn new(kind: ProviderKind, replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            kind,
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A cloud-primary provider that always answers with `reply`.
    #[must_use]
    pub fn replying(reply: &str) -> Self {
        Self::new(ProviderKind::CloudPrimary, vec![Ok(reply.to_owned())])
    }

    /// Requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<NarrationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrationProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn generate(&self, request: &NarrationRequest) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.replies.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(reply) => {
                *last = Some(reply.clone());
                reply
            }
            None => last.clone().unwrap_or(Err(ProviderError::EmptyResponse)),
        }
    }
}
