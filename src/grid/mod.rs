//! Simulated grid: region profile table and forecast oracle.

pub mod oracle;
pub mod profile;

pub use oracle::GridOracle;
pub use profile::{Region, RegionProfile, RegionTable};
