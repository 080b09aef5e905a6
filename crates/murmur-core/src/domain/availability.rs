//! Model availability classification.
//!
//! The model runtime reports a raw readiness signal; the UI works with the
//! closed [`AvailabilityState`] and its fixed presentation metadata.

use serde::{Deserialize, Serialize};

/// Readiness signal reported by a model runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum ReadinessSignal {
    Available,
    Unavailable(UnavailableReason),
}

/// Why a model runtime cannot serve requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The host cannot run a local model at all.
    DeviceNotEligible,
    /// The local model service exists but is switched off or not running.
    IntelligenceNotEnabled,
    /// The model is still being fetched or loaded.
    ModelNotReady,
    /// Any other reason, described by the runtime.
    Other(String),
}

/// User-facing availability of the chat model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum AvailabilityState {
    Available,
    DeviceIncompatible,
    IntelligenceDisabled,
    ModelDownloading,
    Unknown(String),
}

/// Map a readiness signal to its availability state.
///
/// Total: unrecognized reasons keep their description verbatim.
#[must_use]
pub fn classify(signal: &ReadinessSignal) -> AvailabilityState {
    match signal {
        ReadinessSignal::Available => AvailabilityState::Available,
        ReadinessSignal::Unavailable(reason) => match reason {
            UnavailableReason::DeviceNotEligible => AvailabilityState::DeviceIncompatible,
            UnavailableReason::IntelligenceNotEnabled => AvailabilityState::IntelligenceDisabled,
            UnavailableReason::ModelNotReady => AvailabilityState::ModelDownloading,
            UnavailableReason::Other(reason) => AvailabilityState::Unknown(reason.clone()),
        },
    }
}

impl From<&ReadinessSignal> for AvailabilityState {
    fn from(signal: &ReadinessSignal) -> Self {
        classify(signal)
    }
}

impl AvailabilityState {
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// Whether polling again may change the outcome without user setup.
    #[must_use]
    pub const fn can_recheck(&self) -> bool {
        matches!(self, Self::ModelDownloading | Self::IntelligenceDisabled)
    }

    /// Short heading. Empty when available.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Available => "",
            Self::DeviceIncompatible => "Device Not Compatible",
            Self::IntelligenceDisabled => "Local Model Not Enabled",
            Self::ModelDownloading => "Model Downloading",
            Self::Unknown(_) => "Local Model Unavailable",
        }
    }

    /// Icon identifier. Empty when available.
    #[must_use]
    pub const fn icon(&self) -> &'static str {
        match self {
            Self::Available => "",
            Self::DeviceIncompatible => "exclamationmark.triangle.fill",
            Self::IntelligenceDisabled | Self::Unknown(_) => "brain.head.profile.fill",
            Self::ModelDownloading => "arrow.down.circle.fill",
        }
    }

    /// Longer explanation. Empty when available.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Available => String::new(),
            Self::DeviceIncompatible => "This device can't run the local language model. \
                 A compatible device is required for chat."
                .to_string(),
            Self::IntelligenceDisabled => "The local language model is required for chat. \
                 Start the model server or enable it in settings."
                .to_string(),
            Self::ModelDownloading => "The language model is still loading. \
                 Please wait for it to finish before chatting."
                .to_string(),
            Self::Unknown(reason) => {
                format!("The local language model is currently unavailable: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable(reason: UnavailableReason) -> ReadinessSignal {
        ReadinessSignal::Unavailable(reason)
    }

    #[test]
    fn test_classify_known_signals() {
        let cases = [
            (ReadinessSignal::Available, AvailabilityState::Available),
            (
                unavailable(UnavailableReason::DeviceNotEligible),
                AvailabilityState::DeviceIncompatible,
            ),
            (
                unavailable(UnavailableReason::IntelligenceNotEnabled),
                AvailabilityState::IntelligenceDisabled,
            ),
            (
                unavailable(UnavailableReason::ModelNotReady),
                AvailabilityState::ModelDownloading,
            ),
        ];

        for (signal, expected) in cases {
            assert_eq!(classify(&signal), expected, "signal: {signal:?}");
        }
    }

    #[test]
    fn test_unknown_reason_kept_verbatim() {
        for reason in ["", "thermal throttling", "  spaced  ", "ünïcødé ✨"] {
            let state = classify(&unavailable(UnavailableReason::Other(reason.to_string())));
            assert_eq!(state, AvailabilityState::Unknown(reason.to_string()));
            assert!(state.description().ends_with(reason));
        }
    }

    #[test]
    fn test_available_has_empty_metadata() {
        let state = AvailabilityState::Available;
        assert!(state.is_available());
        assert!(state.title().is_empty());
        assert!(state.icon().is_empty());
        assert!(state.description().is_empty());
    }

    #[test]
    fn test_unavailable_states_have_metadata() {
        for state in [
            AvailabilityState::DeviceIncompatible,
            AvailabilityState::IntelligenceDisabled,
            AvailabilityState::ModelDownloading,
            AvailabilityState::Unknown("x".into()),
        ] {
            assert!(!state.is_available());
            assert!(!state.title().is_empty());
            assert!(!state.icon().is_empty());
            assert!(!state.description().is_empty());
        }
    }

    #[test]
    fn test_can_recheck() {
        assert!(AvailabilityState::ModelDownloading.can_recheck());
        assert!(AvailabilityState::IntelligenceDisabled.can_recheck());
        assert!(!AvailabilityState::DeviceIncompatible.can_recheck());
        assert!(!AvailabilityState::Unknown("x".into()).can_recheck());
        assert!(!AvailabilityState::Available.can_recheck());
    }

    #[test]
    fn test_from_signal() {
        let state: AvailabilityState = (&ReadinessSignal::Available).into();
        assert_eq!(state, AvailabilityState::Available);
    }
}
