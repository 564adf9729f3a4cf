//! Carbon- and cost-aware scheduling for time-shiftable compute workloads.
//!
//! A simulated grid oracle forecasts hourly price, carbon intensity, and
//! renewable share per region; the autopilot scans every feasible start
//! offset within a workload's deadline and picks the one minimizing a
//! weighted cost/carbon score.

#[cfg(feature = "api")]
pub mod api;
pub mod autopilot;
pub mod config;
pub mod grid;
pub mod io;
pub mod model;
