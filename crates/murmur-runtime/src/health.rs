//! Availability probing against the model server's `/health` endpoint.

use std::time::Duration;

use murmur_core::{ReadinessSignal, UnavailableReason};
use reqwest::{Client, StatusCode};
use tracing::debug;

/// Timeout for a single health probe.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// Map a `/health` status code to a readiness signal.
///
/// llama-server answers 503 while it is still loading the model.
pub fn readiness_from_status(status: StatusCode) -> ReadinessSignal {
    match status {
        StatusCode::OK => ReadinessSignal::Available,
        StatusCode::SERVICE_UNAVAILABLE => {
            ReadinessSignal::Unavailable(UnavailableReason::ModelNotReady)
        }
        StatusCode::NOT_FOUND => {
            ReadinessSignal::Unavailable(UnavailableReason::DeviceNotEligible)
        }
        other => ReadinessSignal::Unavailable(UnavailableReason::Other(format!(
            "model server health check returned {other}"
        ))),
    }
}

/// Probe `health_url` once.
pub async fn probe(client: &Client, health_url: &str) -> ReadinessSignal {
    match client.get(health_url).timeout(HEALTH_TIMEOUT).send().await {
        Ok(response) => readiness_from_status(response.status()),
        Err(e) if e.is_connect() || e.is_timeout() => {
            debug!("Model server unreachable at {health_url}: {e}");
            ReadinessSignal::Unavailable(UnavailableReason::IntelligenceNotEnabled)
        }
        Err(e) => ReadinessSignal::Unavailable(UnavailableReason::Other(format!(
            "health check failed: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            readiness_from_status(StatusCode::OK),
            ReadinessSignal::Available
        );
        assert_eq!(
            readiness_from_status(StatusCode::SERVICE_UNAVAILABLE),
            ReadinessSignal::Unavailable(UnavailableReason::ModelNotReady)
        );
        assert_eq!(
            readiness_from_status(StatusCode::NOT_FOUND),
            ReadinessSignal::Unavailable(UnavailableReason::DeviceNotEligible)
        );
    }

    #[test]
    fn test_unexpected_status_described() {
        let ReadinessSignal::Unavailable(UnavailableReason::Other(reason)) =
            readiness_from_status(StatusCode::INTERNAL_SERVER_ERROR)
        else {
            panic!("expected Other");
        };
        assert!(reason.contains("500"));
    }
}
