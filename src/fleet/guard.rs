//! Fleet-wide availability floor.

use super::node::NodeState;

/// Decides whether one more node may enter `Crashed`.
///
/// The caller must hold the fleet lock across `may_crash` and the
/// transition it approves, otherwise two concurrent approvals can jointly
/// breach the floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetGuard {
    availability_floor: usize,
}

impl FleetGuard {
    pub fn new(availability_floor: usize) -> Self {
        Self { availability_floor }
    }

    pub fn availability_floor(&self) -> usize {
        self.availability_floor
    }

    /// `current_states` covers every node in the fleet, including the
    /// candidate (which is not yet Crashed). Approves only if at least
    /// `availability_floor` nodes remain non-crashed afterwards.
    pub fn may_crash<I>(&self, current_states: I) -> bool
    where
        I: IntoIterator<Item = NodeState>,
    {
        let (total, crashed) = current_states
            .into_iter()
            .fold((0usize, 0usize), |(total, crashed), state| {
                (total + 1, crashed + usize::from(state == NodeState::Crashed))
            });

        total
            .checked_sub(crashed + 1)
            .is_some_and(|remaining| remaining >= self.availability_floor)
    }
}
