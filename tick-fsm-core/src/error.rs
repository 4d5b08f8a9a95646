//! Error types for machine setup.
//!
//! Dispatch never fails: an unmatched trigger is ignored and using a machine before
//! `start` is a no-op. Only building the transition table can go wrong.

use core::fmt;

use crate::state::StateId;

/// Error types for transition-table construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsmError {
    /// A fixed-capacity edge store has no free slot left.
    TableFull { capacity: usize },
    /// The id was not handed out by this machine's `add_state`.
    UnknownState(StateId),
    /// Code `0` means "no trigger" and cannot label an edge.
    ReservedTrigger,
}

impl fmt::Display for FsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableFull { capacity } => {
                write!(f, "transition table is full ({capacity} edges)")
            }
            Self::UnknownState(id) => write!(f, "state {id} is not registered"),
            Self::ReservedTrigger => f.write_str("trigger code 0 is reserved"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FsmError {}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_problem() {
        assert_eq!(
            FsmError::TableFull { capacity: 4 }.to_string(),
            "transition table is full (4 edges)"
        );
        assert_eq!(
            FsmError::UnknownState(StateId::from_index(3)).to_string(),
            "state #3 is not registered"
        );
        assert_eq!(
            FsmError::ReservedTrigger.to_string(),
            "trigger code 0 is reserved"
        );
    }
}
