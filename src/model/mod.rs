//! Data model: workloads, forecast windows, weights, and schedule results.

pub mod error;
pub mod types;

pub use error::OptimizeError;
pub use types::{
    BlockMetrics, FleetReport, GridWindow, OptimizationWeights, Savings, ScheduleRecord,
    ScheduleResult, Workload, WorkloadPriority, WorkloadSpec, WorkloadType,
};
