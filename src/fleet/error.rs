//! Errors for operator commands against the fleet.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FleetError {
    #[error("unknown node: {0}")]
    UnknownNode(String),
}
