//! Shared test fixtures for integration tests.

use gridpilot::grid::{GridOracle, Region, RegionTable};
use gridpilot::model::{GridWindow, OptimizationWeights, Workload};

/// Built-in region profile table.
pub fn table() -> RegionTable {
    RegionTable::builtin()
}

/// Deterministic forecast for a region over `hours` hours.
pub fn forecast(table: &RegionTable, region: Region, hours: usize) -> Vec<GridWindow> {
    GridOracle::new(table, region)
        .forecast(hours)
        .expect("forecast succeeds for positive horizon")
}

/// Workload with the given shape and default type/priority.
pub fn workload(name: &str, duration: f32, power: f32, deadline: f32) -> Workload {
    Workload::new(name, duration, power, deadline).expect("valid workload")
}

/// Default weights (0.7 price / 0.3 carbon).
pub fn default_weights() -> OptimizationWeights {
    OptimizationWeights::default()
}

/// Hand-built 24-hour forecast with a clean midday trough.
///
/// Price and carbon both bottom out at hours 10 to 15, so any
/// weighting should steer a short workload into that band.
pub fn trough_day() -> Vec<GridWindow> {
    (0..24)
        .map(|h| {
            let (price, carbon) = if (10..=15).contains(&h) {
                (0.04, 120.0)
            } else {
                (0.16, 420.0)
            };
            GridWindow {
                hour_offset: h,
                price,
                carbon_intensity: carbon,
                renewable_fraction: 0.3,
            }
        })
        .collect()
}
