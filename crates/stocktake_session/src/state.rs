//! Session states and the transition table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SessionError;

// ============================================================================
// Session State
// ============================================================================

/// Lifecycle of an inventory session for one location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// No snapshot requested yet
    Idle,
    /// Snapshot fetch in flight
    Loading,
    /// Snapshot loaded (possibly empty after a failed fetch), scanning not started
    Ready,
    /// Scanning enabled, discrepancies tracked
    Active,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "IDLE",
            SessionState::Loading => "LOADING",
            SessionState::Ready => "READY",
            SessionState::Active => "ACTIVE",
        }
    }

    /// Valid targets from this state.
    ///
    /// `Loading → Loading` covers a retry after a fetch that never settled.
    /// `Active → Loading → Active` is a refresh during scanning.
    pub fn valid_transitions(&self) -> &'static [SessionState] {
        match self {
            SessionState::Idle => &[SessionState::Loading],
            SessionState::Loading => &[
                SessionState::Ready,
                SessionState::Active,
                SessionState::Loading,
            ],
            SessionState::Ready => &[SessionState::Loading, SessionState::Active],
            SessionState::Active => &[SessionState::Ready, SessionState::Loading],
        }
    }

    pub fn can_transition_to(&self, target: SessionState) -> bool {
        self.valid_transitions().contains(&target)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// State Transition
// ============================================================================

/// A recorded state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: SessionState,
    pub to: SessionState,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StateTransition {
    pub fn new(from: SessionState, to: SessionState) -> Self {
        Self {
            from,
            to,
            timestamp: Utc::now(),
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

// ============================================================================
// State Machine
// ============================================================================

#[derive(Debug)]
pub struct StateMachine {
    current: SessionState,
    history: Vec<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: SessionState::Idle,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> SessionState {
        self.current
    }

    pub fn history(&self) -> &[StateTransition] {
        &self.history
    }

    /// Check a transition without applying it.
    pub fn check(&self, to: SessionState) -> Result<(), SessionError> {
        if self.current.can_transition_to(to) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.current,
                to,
            })
        }
    }

    pub fn transition(
        &mut self,
        to: SessionState,
        reason: &str,
    ) -> Result<StateTransition, SessionError> {
        self.check(to)?;
        let transition = StateTransition::new(self.current, to).with_reason(reason);
        tracing::debug!(from = %self.current, to = %to, reason, "session transition");
        self.current = to;
        self.history.push(transition.clone());
        Ok(transition)
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
