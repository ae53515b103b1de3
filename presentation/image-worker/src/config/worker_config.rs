use std::time::Duration;

use business::application::image::deadline::CallTimeouts;
use messaging::retry::RetryPolicy;

use super::env;

/// Deadlines and redelivery behavior of the consumers.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub timeouts: CallTimeouts,
    pub retry: RetryPolicy,
    pub shutdown_timeout: Duration,
}

impl WorkerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = CallTimeouts::default();
        let timeouts = CallTimeouts {
            asset_store: seconds("ASSET_CALL_TIMEOUT_SECS", defaults.asset_store)?,
            image_record: seconds("RECORD_CALL_TIMEOUT_SECS", defaults.image_record)?,
            publish: seconds("PUBLISH_TIMEOUT_SECS", defaults.publish)?,
        };

        let policy = RetryPolicy::default();
        let retry = RetryPolicy {
            max_retries: env::parsed_or("RETRY_MAX_RETRIES", policy.max_retries)?,
            initial_interval: millis("RETRY_INITIAL_INTERVAL_MS", policy.initial_interval)?,
            multiplier: env::parsed_or("RETRY_MULTIPLIER", policy.multiplier)?,
            max_interval: millis("RETRY_MAX_INTERVAL_MS", policy.max_interval)?,
        };
        if !retry.multiplier.is_finite() || retry.multiplier < 1.0 {
            anyhow::bail!("RETRY_MULTIPLIER must be at least 1.0");
        }

        Ok(Self {
            timeouts,
            retry,
            shutdown_timeout: seconds("SHUTDOWN_TIMEOUT_SECS", Duration::from_secs(10))?,
        })
    }
}

fn seconds(name: &str, default: Duration) -> anyhow::Result<Duration> {
    env::parsed_or(name, default.as_secs()).map(Duration::from_secs)
}

fn millis(name: &str, default: Duration) -> anyhow::Result<Duration> {
    env::parsed_or(name, default.as_millis() as u64).map(Duration::from_millis)
}
