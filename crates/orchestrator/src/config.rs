//! Orchestrator configuration.

use resilience::{CircuitBreakerConfig, DispatchConfig, RetryConfig};

/// Fault-tolerance settings for each dependency the orchestrator calls.
///
/// Defaults: inventory breaker opens after 3 consecutive failures and
/// recovers after 10s; payment gets 3 attempts, 2s apart, 5s each;
/// notification gets one 5s attempt.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub inventory_breaker: CircuitBreakerConfig,
    pub payment_retry: RetryConfig,
    pub notification: DispatchConfig,
}
