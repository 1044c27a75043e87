use crate::PreconditionError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identifies one observable task on behalf of one principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PollTarget {
    pub task_id: String,
    pub principal_id: String,
}

impl PollTarget {
    pub fn new(task_id: impl Into<String>, principal_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            principal_id: principal_id.into(),
        }
    }

    pub fn validate(&self) -> Result<(), PreconditionError> {
        if self.task_id.trim().is_empty() {
            return Err(PreconditionError::EmptyTaskId);
        }
        if self.principal_id.trim().is_empty() {
            return Err(PreconditionError::EmptyPrincipalId);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PollState {
    #[default]
    Idle,
    Active(PollTarget),
    Stopped,
}

impl PollState {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    #[must_use]
    pub const fn target(&self) -> Option<&PollTarget> {
        match self {
            Self::Active(target) => Some(target),
            Self::Idle | Self::Stopped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identifiers_are_rejected() {
        assert_eq!(
            PollTarget::new("", "u-1").validate(),
            Err(PreconditionError::EmptyTaskId)
        );
        assert_eq!(
            PollTarget::new("t-1", "   ").validate(),
            Err(PreconditionError::EmptyPrincipalId)
        );
        assert!(PollTarget::new("t-1", "u-1").validate().is_ok());
    }

    #[test]
    fn only_active_state_exposes_target() {
        let target = PollTarget::new("t-1", "u-1");
        assert_eq!(PollState::Active(target.clone()).target(), Some(&target));
        assert!(PollState::Idle.target().is_none());
        assert!(!PollState::Stopped.is_active());
    }
}
