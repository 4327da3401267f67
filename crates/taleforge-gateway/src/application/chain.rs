//! The ordered provider chain.

use std::sync::{Arc, Mutex};

use taleforge_core::rng::DeterministicRng;
use tracing::{debug, info, warn};

use crate::domain::error::{GatewayError, ProviderError};
use crate::domain::provider::{NarrationProvider, NarrationRequest, ProviderKind};
use crate::domain::retry::RetryPolicy;

/// Narration text and the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Narration {
    /// Raw provider text.
    pub text: String,
    /// Producing provider.
    pub provider: ProviderKind,
}

struct Link {
    provider: Arc<dyn NarrationProvider>,
    policy: RetryPolicy,
}

/// Providers tried in priority order until one succeeds.
pub struct NarrationGateway {
    links: Vec<Link>,
    jitter: Arc<Mutex<dyn DeterministicRng + Send>>,
}

impl std::fmt::Debug for NarrationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrationGateway")
            .field("providers", &self.providers())
            .finish_non_exhaustive()
    }
}

impl NarrationGateway {
    /// An empty chain drawing backoff jitter from `jitter`.
    #[must_use]
    pub fn new(jitter: Arc<Mutex<dyn DeterministicRng + Send>>) -> Self {
        Self {
            links: Vec::new(),
            jitter,
        }
    }

    /// Appends `provider` with `policy`.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn NarrationProvider>, policy: RetryPolicy) -> Self {
        self.links.push(Link { provider, policy });
        self
    }

    /// Provider kinds in chain order.
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderKind> {
        self.links.iter().map(|l| l.provider.kind()).collect()
    }

    fn jitter(&self) -> f64 {
        match self.jitter.lock() {
            Ok(mut rng) => rng.next_f64(),
            Err(e) => {
                warn!(error = %e, "jitter RNG mutex poisoned, retrying without jitter");
                0.0
            }
        }
    }

    async fn attempt(link: &Link, request: &NarrationRequest) -> Result<String, ProviderError> {
        let text = link.provider.generate(request).await?;
        if text.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }

    async fn call_with_retry(
        &self,
        link: &Link,
        request: &NarrationRequest,
    ) -> Result<String, ProviderError> {
        let kind = link.provider.kind();
        let attempts = link.policy.attempts();
        let mut attempt = 0;
        loop {
            match Self::attempt(link, request).await {
                Ok(text) => return Ok(text),
                Err(err) if err.is_transient() && attempt + 1 < attempts => {
                    let delay = link.policy.delay_for(attempt, self.jitter());
                    warn!(
                        provider = %kind,
                        attempt = attempt + 1,
                        max_attempts = attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient provider error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Generates narration from the first provider that succeeds.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::ProviderUnavailable` listing every failure when
    /// no provider produced text.
    pub async fn generate(&self, request: &NarrationRequest) -> Result<Narration, GatewayError> {
        let mut failures = Vec::new();
        for link in &self.links {
            let kind = link.provider.kind();
            debug!(provider = %kind, "requesting narration");
            match self.call_with_retry(link, request).await {
                Ok(text) => {
                    if !failures.is_empty() {
                        info!(provider = %kind, failed = failures.len(), "narration served after failover");
                    }
                    return Ok(Narration { text, provider: kind });
                }
                Err(err) => {
                    warn!(provider = %kind, error = %err, "narration provider failed, failing over");
                    failures.push((kind, err));
                }
            }
        }
        Err(GatewayError::ProviderUnavailable { failures })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    struct FixedJitter;

    impl DeterministicRng for FixedJitter {
        fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
            min
        }

        fn next_f64(&mut self) -> f64 {
            0.0
        }
    }

    struct FakeProvider {
        kind: ProviderKind,
        replies: Mutex<VecDeque<Result<String, ProviderError>>>,
        calls: Mutex<u32>,
    }

    impl FakeProvider {
        fn new(kind: ProviderKind, replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
            Arc::new(Self {
                kind,
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl NarrationProvider for FakeProvider {
        fn kind(&self) -> ProviderKind {
            self.kind
        }

        async fn generate(&self, _request: &NarrationRequest) -> Result<String, ProviderError> {
            *self.calls.lock().unwrap() += 1;
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(ProviderError::EmptyResponse))
        }
    }

    fn gateway() -> NarrationGateway {
        NarrationGateway::new(Arc::new(Mutex::new(FixedJitter)))
    }

    fn request() -> NarrationRequest {
        NarrationRequest {
            system_prompt: "system".to_owned(),
            user_prompt: "user".to_owned(),
            player_action: "look around".to_owned(),
        }
    }

    fn retrying() -> RetryPolicy {
        RetryPolicy::rate_limited(3, Duration::from_secs(2))
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_primary_recovers_after_backoff() {
        // Arrange
        let primary = FakeProvider::new(
            ProviderKind::CloudPrimary,
            vec![Err(ProviderError::RateLimited), Ok("The gate opens.".to_owned())],
        );
        let gateway = gateway().with_provider(primary.clone(), retrying());
        let started = tokio::time::Instant::now();

        // Act
        let narration = gateway.generate(&request()).await.unwrap();

        // Assert
        assert_eq!(narration.text, "The gate opens.");
        assert_eq!(narration.provider, ProviderKind::CloudPrimary);
        assert_eq!(primary.calls(), 2);
        assert!(started.elapsed() >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_fall_through_to_next_provider() {
        // Arrange
        let primary = FakeProvider::new(
            ProviderKind::CloudPrimary,
            vec![
                Err(ProviderError::RateLimited),
                Err(ProviderError::RateLimited),
                Err(ProviderError::RateLimited),
            ],
        );
        let secondary = FakeProvider::new(
            ProviderKind::CloudSecondary,
            vec![Ok("Rain falls.".to_owned())],
        );
        let gateway = gateway()
            .with_provider(primary.clone(), retrying())
            .with_provider(secondary.clone(), RetryPolicy::single_attempt());
        let started = tokio::time::Instant::now();

        // Act
        let narration = gateway.generate(&request()).await.unwrap();

        // Assert
        assert_eq!(narration.provider, ProviderKind::CloudSecondary);
        assert_eq!(primary.calls(), 3);
        assert_eq!(secondary.calls(), 1);
        assert!(started.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test]
    async fn test_non_transient_error_fails_provider_immediately() {
        // Arrange
        let primary = FakeProvider::new(
            ProviderKind::CloudPrimary,
            vec![Err(ProviderError::Http {
                status: 401,
                body: "bad key".to_owned(),
            })],
        );
        let stub = FakeProvider::new(
            ProviderKind::DeterministicStub,
            vec![Ok("Canned.".to_owned())],
        );
        let gateway = gateway()
            .with_provider(primary.clone(), retrying())
            .with_provider(stub, RetryPolicy::single_attempt());

        // Act
        let narration = gateway.generate(&request()).await.unwrap();

        // Assert
        assert_eq!(primary.calls(), 1);
        assert_eq!(narration.text, "Canned.");
    }

    #[tokio::test]
    async fn test_blank_reply_counts_as_empty_response() {
        // Arrange
        let local = FakeProvider::new(ProviderKind::LocalInference, vec![Ok("   ".to_owned())]);
        let gateway = gateway().with_provider(local, RetryPolicy::single_attempt());

        // Act
        let result = gateway.generate(&request()).await;

        // Assert
        match result.unwrap_err() {
            GatewayError::ProviderUnavailable { failures } => {
                assert_eq!(
                    failures,
                    vec![(ProviderKind::LocalInference, ProviderError::EmptyResponse)]
                );
            }
            other => panic!("expected ProviderUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_every_failure_is_reported_in_order() {
        // Arrange
        let local = FakeProvider::new(
            ProviderKind::LocalInference,
            vec![Err(ProviderError::Network("refused".to_owned()))],
        );
        let tertiary = FakeProvider::new(
            ProviderKind::CloudTertiary,
            vec![Err(ProviderError::Parse("no choices".to_owned()))],
        );
        let gateway = gateway()
            .with_provider(local, RetryPolicy::single_attempt())
            .with_provider(tertiary, RetryPolicy::single_attempt());

        // Act
        let result = gateway.generate(&request()).await;

        // Assert
        match result.unwrap_err() {
            GatewayError::ProviderUnavailable { failures } => {
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].0, ProviderKind::LocalInference);
                assert_eq!(failures[1].0, ProviderKind::CloudTertiary);
            }
            other => panic!("expected ProviderUnavailable, got {other:?}"),
        }
    }
}
