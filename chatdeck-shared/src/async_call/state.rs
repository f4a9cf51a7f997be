use serde::{Deserialize, Serialize};

/// Coarse lifecycle position of an [`AsyncCall`](super::AsyncCall).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallPhase {
    /// Nothing has run yet.
    Idle,
    /// At least one invocation is awaiting its operation.
    InFlight,
    /// The last applied completion produced a value.
    Succeeded,
    /// The last applied completion failed.
    Failed,
}

/// How completions from overlapping invocations are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Every completion writes state; whichever settles last wins.
    #[default]
    LastSettled,
    /// Only the most recently started invocation may write state.
    LatestStarted,
}

/// Observable state of a wrapped operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallState<T> {
    /// Last value produced by a successful invocation.
    pub result: Option<T>,
    /// Whether an invocation is currently awaiting its operation.
    pub in_flight: bool,
    /// Description of the most recent failure. Cleared when an invocation starts.
    pub last_error: Option<String>,
}

impl<T> Default for CallState<T> {
    fn default() -> Self {
        Self {
            result: None,
            in_flight: false,
            last_error: None,
        }
    }
}

impl<T> CallState<T> {
    /// Derives the lifecycle phase from the current fields.
    pub const fn phase(&self) -> CallPhase {
        if self.in_flight {
            CallPhase::InFlight
        } else if self.last_error.is_some() {
            CallPhase::Failed
        } else if self.result.is_some() {
            CallPhase::Succeeded
        } else {
            CallPhase::Idle
        }
    }

    /// True when nothing has run, or everything that ran has settled.
    pub const fn is_idle(&self) -> bool {
        !self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let state = CallState::<u32>::default();
        assert_eq!(state.phase(), CallPhase::Idle);
        assert!(state.is_idle());
    }

    #[test]
    fn phase_prefers_in_flight_over_previous_outcome() {
        let state = CallState {
            result: Some(1),
            in_flight: true,
            last_error: Some("boom".to_string()),
        };
        assert_eq!(state.phase(), CallPhase::InFlight);
    }

    #[test]
    fn phase_reports_failure_even_with_stale_result() {
        let state = CallState {
            result: Some(1),
            in_flight: false,
            last_error: Some("boom".to_string()),
        };
        assert_eq!(state.phase(), CallPhase::Failed);
    }

    #[test]
    fn completion_policy_serializes_snake_case() {
        let json = serde_json::to_string(&CompletionPolicy::LatestStarted).unwrap();
        assert_eq!(json, "\"latest_started\"");
        let parsed: CompletionPolicy = serde_json::from_str("\"last_settled\"").unwrap();
        assert_eq!(parsed, CompletionPolicy::LastSettled);
    }
}
