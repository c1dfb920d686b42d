//! Validated transitions for lifecycle enums.

use super::ValidationError;

/// A lifecycle enum whose legal moves are listed per state.
///
/// Implementors only list `valid_transitions`; checking and performing a
/// move are derived from it.
///
/// ```ignore
/// let next = SessionStatus::Unauthenticated.transition_to(SessionStatus::Authenticating)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// States reachable from `self` in one move.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns `target` if the move is legal.
    ///
    /// # Errors
    ///
    /// `ValidationError::InvalidFormat` on field `state_transition`, naming
    /// both states.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if !self.can_transition_to(&target) {
            return Err(ValidationError::invalid_format(
                "state_transition",
                format!("{:?} cannot move to {:?}", self, target),
            ));
        }
        Ok(target)
    }

    /// True if no move leaves this state.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
