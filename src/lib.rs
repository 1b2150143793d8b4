//! Fleet guardian - health monitoring and auto-recovery for a small fleet
//! of backend nodes.
//!
//! The guardian probes every node on a fixed interval, tracks consecutive
//! failures per node, moves nodes through `Healthy -> Unhealthy -> Crashed
//! -> Restarting -> Healthy`, and issues bounded restarts through a process
//! supervisor. A fleet-wide availability floor is never crossed: at least
//! `availability_floor` nodes are always left un-crashed.

pub mod alerts;
pub mod api;
pub mod cli;
pub mod config;
pub mod fleet;
pub mod logging;
pub mod metrics;
pub mod probe;
pub mod restart;
pub mod scheduler;
