//! Scheduling optimizer: scans feasible start offsets within a workload's
//! deadline and selects the one minimizing the weighted cost/carbon score.

use crate::model::error::OptimizeError;
use crate::model::types::{
    BlockMetrics, FleetReport, GridWindow, OptimizationWeights, ScheduleResult, Workload,
    WorkloadPriority,
};

/// Price normalization ceiling (currency/kWh). Shared by all regions so
/// cross-region scores remain comparable.
pub const PRICE_NORM_CEILING: f32 = 0.30;
/// Carbon normalization ceiling (gCO2/kWh). Shared by all regions.
pub const CARBON_NORM_CEILING: f32 = 600.0;

/// Tolerance for floating-point feasibility comparisons on hour arithmetic.
const HOURS_EPSILON: f32 = 1e-4;

/// Composite desirability score in [0, 1], lower is better.
///
/// Price and carbon are normalized by fixed ceilings with clamping, so a
/// value above the ceiling scores identically to one exactly at it and
/// never goes negative.
pub fn score_window(avg_price: f32, avg_carbon: f32, weights: &OptimizationWeights) -> f32 {
    let price_norm = (avg_price / PRICE_NORM_CEILING).clamp(0.0, 1.0);
    let carbon_norm = (avg_carbon / CARBON_NORM_CEILING).clamp(0.0, 1.0);
    weights.price_weight() * price_norm + weights.carbon_weight() * carbon_norm
}

/// Average price and carbon over the aggregate window.
#[derive(Debug, Clone, Copy)]
struct WindowAggregate {
    avg_price: f32,
    avg_carbon: f32,
}

/// Single- and fleet-workload scheduling optimizer.
///
/// Pure and synchronous: every call allocates its own working state over
/// immutable inputs, so one `Autopilot` may be shared across threads.
///
/// # Examples
///
/// ```
/// use gridpilot::autopilot::Autopilot;
/// use gridpilot::grid::{GridOracle, Region, RegionTable};
/// use gridpilot::model::{OptimizationWeights, Workload};
///
/// let table = RegionTable::builtin();
/// let forecast = GridOracle::new(&table, Region::UsWest).forecast(24).unwrap();
/// let workload = Workload::new("train", 6.0, 120.0, 24.0).unwrap();
/// let result = Autopilot::new(OptimizationWeights::default())
///     .optimize(&workload, &forecast)
///     .unwrap();
/// assert!(result.start_offset_hours as f32 + 6.0 <= 24.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    weights: OptimizationWeights,
    min_delay_hours: f32,
}

impl Autopilot {
    /// Creates an optimizer with the given weights and no minimum delay.
    pub fn new(weights: OptimizationWeights) -> Self {
        Self {
            weights,
            min_delay_hours: 0.0,
        }
    }

    /// Sets a minimum delay before any start (e.g., provisioning time).
    /// Negative values are treated as zero.
    pub fn with_min_delay(mut self, hours: f32) -> Self {
        self.min_delay_hours = hours.max(0.0);
        self
    }

    /// The weights this optimizer scores with.
    pub fn weights(&self) -> &OptimizationWeights {
        &self.weights
    }

    /// Finds the start offset minimizing the composite score.
    ///
    /// The baseline block is always computed at offset 0 for comparison,
    /// even when a minimum delay excludes offset 0 from selection. Ties
    /// resolve to the earliest feasible start.
    ///
    /// # Errors
    ///
    /// * [`OptimizeError::Validation`] if the forecast is empty or shorter
    ///   than the workload duration.
    /// * [`OptimizeError::Infeasible`] if no feasible start offset exists.
    pub fn optimize(
        &self,
        workload: &Workload,
        forecast: &[GridWindow],
    ) -> Result<ScheduleResult, OptimizeError> {
        if forecast.is_empty() {
            return Err(OptimizeError::validation("forecast", "must not be empty"));
        }

        let baseline_agg = aggregate(forecast, 0, workload.duration_hours).ok_or_else(|| {
            OptimizeError::validation("forecast", "shorter than the workload duration")
        })?;
        let baseline = block_metrics(0, baseline_agg, workload);

        // Critical workloads run immediately; no scan.
        if workload.priority == WorkloadPriority::Critical {
            return Ok(ScheduleResult {
                workload: workload.clone(),
                start_offset_hours: 0,
                baseline,
                optimized: baseline,
            });
        }

        let min_start = self.min_delay_hours.ceil() as usize;
        if min_start as f32 + workload.duration_hours > workload.deadline_hours + HOURS_EPSILON {
            return Err(OptimizeError::Infeasible {
                message: format!(
                    "duration {:.1}h cannot finish by deadline {:.1}h with min delay {:.1}h",
                    workload.duration_hours, workload.deadline_hours, self.min_delay_hours
                ),
            });
        }
        let max_start =
            (workload.deadline_hours - workload.duration_hours + HOURS_EPSILON).floor() as usize;

        let mut best: Option<(usize, f32, WindowAggregate)> = None;
        for start in min_start..=max_start {
            let Some(agg) = aggregate(forecast, start, workload.duration_hours) else {
                break; // forecast exhausted; later starts cannot fit either
            };
            let score = score_window(agg.avg_price, agg.avg_carbon, &self.weights);
            if best.is_none_or(|(_, best_score, _)| score < best_score) {
                best = Some((start, score, agg));
            }
        }

        let Some((start, _, agg)) = best else {
            return Err(OptimizeError::Infeasible {
                message: format!(
                    "forecast horizon ({} h) does not cover any feasible start",
                    forecast.len()
                ),
            });
        };

        Ok(ScheduleResult {
            workload: workload.clone(),
            start_offset_hours: start,
            baseline,
            optimized: block_metrics(start, agg, workload),
        })
    }

    /// Optimizes each workload independently against the same forecast.
    ///
    /// Results preserve input order; no cross-workload resource constraint
    /// is modeled, so chosen offsets may coincide.
    ///
    /// # Errors
    ///
    /// Propagates the first per-workload error.
    pub fn optimize_fleet(
        &self,
        workloads: &[Workload],
        forecast: &[GridWindow],
    ) -> Result<FleetReport, OptimizeError> {
        let schedules = workloads
            .iter()
            .map(|w| self.optimize(w, forecast))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FleetReport::from_schedules(schedules))
    }
}

/// Averages price and carbon over `[start, start + duration)`, weighting a
/// partially covered final hour by its covered fraction. Returns `None`
/// when the forecast does not cover the full window.
fn aggregate(forecast: &[GridWindow], start: usize, duration_hours: f32) -> Option<WindowAggregate> {
    let mut remaining = duration_hours;
    let mut idx = start;
    let mut price_sum = 0.0_f32;
    let mut carbon_sum = 0.0_f32;

    while remaining > HOURS_EPSILON {
        let w = forecast.get(idx)?;
        let covered = remaining.min(1.0);
        price_sum += w.price * covered;
        carbon_sum += w.carbon_intensity * covered;
        remaining -= covered;
        idx += 1;
    }

    Some(WindowAggregate {
        avg_price: price_sum / duration_hours,
        avg_carbon: carbon_sum / duration_hours,
    })
}

/// Expands an aggregate into full block metrics for a workload.
fn block_metrics(start: usize, agg: WindowAggregate, workload: &Workload) -> BlockMetrics {
    let energy_kwh = workload.energy_kwh();
    BlockMetrics {
        start,
        avg_price: agg.avg_price,
        avg_carbon: agg.avg_carbon,
        total_cost: agg.avg_price * energy_kwh,
        // gCO2 to kg
        total_carbon_kg: agg.avg_carbon * energy_kwh / 1000.0,
    }
}
