//! State machine trait for lifecycle enums.
//!
//! Gives every lifecycle enum (currently the connection lifecycle) the same
//! vocabulary for checking and performing transitions.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their legal edges once; checking and validated
/// transitions are derived from that table.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for ConnectionState {
///     fn valid_transitions(&self) -> Vec<Self> {
///         match self {
///             Disconnected => vec![Connecting, Retrying, Failed],
///             // ...
///         }
///     }
/// }
///
/// let next = ConnectionState::Disconnected.transition_to(ConnectionState::Connecting)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_transition(self, target))
        }
    }
}
