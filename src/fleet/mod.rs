//! Fleet state: per-node records, the transition function, the fleet-wide
//! crash guard and the restart budget, plus the shared runtime tying them
//! together under one lock.

mod accumulator;
mod error;
mod guard;
mod machine;
mod node;
mod orchestrator;
mod runtime;

pub use accumulator::FailureAccumulator;
pub use error::FleetError;
pub use guard::FleetGuard;
pub use machine::{NodeStateMachine, Transition};
pub use node::{FleetSnapshot, Node, NodeSnapshot, NodeState};
pub use orchestrator::{RestartDecision, RestartOrchestrator, RestartOrder};
pub use runtime::{GuardianRuntime, NodeStep, ProbeTarget};
