//! Core value types shared between the grid oracle and the autopilot.
//!
//! All entities are immutable value objects. The only cross-reference is
//! [`ScheduleResult`] holding a copy of the [`Workload`] it was computed
//! from; nothing here shares mutable state between calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::OptimizeError;

/// Classification of workload types for display and future heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadType {
    MlTraining,
    MlInference,
    EtlPipeline,
    BatchProcessing,
    DataAnalytics,
    #[default]
    Generic,
}

/// Scheduling priority. `Critical` forces immediate execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkloadPriority {
    /// Must run immediately; the optimizer returns the baseline schedule.
    Critical,
    /// Prefer sooner.
    High,
    /// Flexible timing.
    #[default]
    Normal,
    /// Maximum flexibility for optimization.
    Low,
}

/// A time-shiftable compute workload.
///
/// Constructed via [`Workload::new`], which enforces all invariants up
/// front; immutable once passed to the optimizer.
///
/// # Examples
///
/// ```
/// use gridpilot::model::Workload;
///
/// let w = Workload::new("nightly-etl", 4.0, 80.0, 12.0).unwrap();
/// assert_eq!(w.energy_kwh(), 320.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workload {
    /// Human-readable workload name.
    pub name: String,
    /// Expected runtime in hours (> 0).
    pub duration_hours: f32,
    /// Average power consumption in kilowatts (> 0).
    pub power_draw_kw: f32,
    /// Must complete within this many hours from now (>= duration).
    pub deadline_hours: f32,
    /// Workload classification.
    pub workload_type: WorkloadType,
    /// Scheduling priority.
    pub priority: WorkloadPriority,
}

impl Workload {
    /// Creates a validated workload.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::Validation`] if the name is empty, any
    /// numeric field is non-positive or non-finite, or the deadline does
    /// not leave enough time to complete the workload.
    pub fn new(
        name: impl Into<String>,
        duration_hours: f32,
        power_draw_kw: f32,
        deadline_hours: f32,
    ) -> Result<Self, OptimizeError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(OptimizeError::validation("workload.name", "must not be empty"));
        }
        if !duration_hours.is_finite() || duration_hours <= 0.0 {
            return Err(OptimizeError::validation(
                "workload.duration_hours",
                "must be > 0",
            ));
        }
        if !power_draw_kw.is_finite() || power_draw_kw <= 0.0 {
            return Err(OptimizeError::validation(
                "workload.power_draw_kw",
                "must be > 0",
            ));
        }
        if !deadline_hours.is_finite() || deadline_hours <= 0.0 {
            return Err(OptimizeError::validation(
                "workload.deadline_hours",
                "must be > 0",
            ));
        }
        if deadline_hours < duration_hours {
            return Err(OptimizeError::validation(
                "workload.deadline_hours",
                "must be >= duration_hours",
            ));
        }
        Ok(Self {
            name,
            duration_hours,
            power_draw_kw,
            deadline_hours,
            workload_type: WorkloadType::default(),
            priority: WorkloadPriority::default(),
        })
    }

    /// Sets the workload type tag.
    pub fn with_workload_type(mut self, workload_type: WorkloadType) -> Self {
        self.workload_type = workload_type;
        self
    }

    /// Sets the scheduling priority.
    pub fn with_priority(mut self, priority: WorkloadPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Total energy consumption over the full runtime (kWh).
    pub fn energy_kwh(&self) -> f32 {
        self.power_draw_kw * self.duration_hours
    }
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.1}h @ {:.1} kW, deadline {:.1}h)",
            self.name, self.duration_hours, self.power_draw_kw, self.deadline_hours
        )
    }
}

/// Unvalidated workload fields as they arrive from JSON (CLI fleet files
/// and API requests). Converted into a [`Workload`] via
/// [`WorkloadSpec::into_workload`], which applies all invariant checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkloadSpec {
    pub name: String,
    pub duration_hours: f32,
    pub power_draw_kw: f32,
    pub deadline_hours: f32,
    #[serde(default)]
    pub workload_type: Option<WorkloadType>,
    #[serde(default)]
    pub priority: Option<WorkloadPriority>,
}

impl WorkloadSpec {
    /// Validates and converts into a [`Workload`].
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::Validation`] for the same reasons as
    /// [`Workload::new`].
    pub fn into_workload(self) -> Result<Workload, OptimizeError> {
        let mut w = Workload::new(
            self.name,
            self.duration_hours,
            self.power_draw_kw,
            self.deadline_hours,
        )?;
        if let Some(t) = self.workload_type {
            w = w.with_workload_type(t);
        }
        if let Some(p) = self.priority {
            w = w.with_priority(p);
        }
        Ok(w)
    }
}

/// One hour of the simulated grid forecast.
///
/// Produced only by the grid oracle: one window per hour of the requested
/// horizon, ordered by offset, contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridWindow {
    /// Hour offset from "now" (0 = now).
    pub hour_offset: usize,
    /// Electricity price in currency/kWh (>= 0).
    pub price: f32,
    /// Carbon intensity in gCO2/kWh (>= 0).
    pub carbon_intensity: f32,
    /// Fraction of generation from renewables (0.0 to 1.0).
    pub renewable_fraction: f32,
}

impl GridWindow {
    /// True for low-carbon windows (< 200 gCO2/kWh).
    pub fn is_green(&self) -> bool {
        self.carbon_intensity < 200.0
    }

    /// True for low-price windows (< 0.08 currency/kWh).
    pub fn is_cheap(&self) -> bool {
        self.price < 0.08
    }
}

impl fmt::Display for GridWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "h+{:02} | ${:.3}/kWh  {:>3.0} gCO2/kWh  RE {:>2.0}%",
            self.hour_offset,
            self.price,
            self.carbon_intensity,
            self.renewable_fraction * 100.0
        )
    }
}

/// Price/carbon weight pair for composite scoring.
///
/// Both weights must lie in [0, 1] and sum to 1; invalid combinations are
/// a validation failure, never silently normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimizationWeights {
    price_weight: f32,
    carbon_weight: f32,
}

/// Tolerance for the weights-sum-to-one check.
const WEIGHT_SUM_TOLERANCE: f32 = 0.01;

impl OptimizationWeights {
    /// Creates a validated weight pair.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::Validation`] if either weight is outside
    /// [0, 1] or the pair does not sum to 1 within a small tolerance.
    pub fn new(price_weight: f32, carbon_weight: f32) -> Result<Self, OptimizeError> {
        if !(0.0..=1.0).contains(&price_weight) || !price_weight.is_finite() {
            return Err(OptimizeError::validation(
                "weights.price_weight",
                "must be in [0.0, 1.0]",
            ));
        }
        if !(0.0..=1.0).contains(&carbon_weight) || !carbon_weight.is_finite() {
            return Err(OptimizeError::validation(
                "weights.carbon_weight",
                "must be in [0.0, 1.0]",
            ));
        }
        if (price_weight + carbon_weight - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(OptimizeError::validation(
                "weights",
                "price_weight and carbon_weight must sum to 1.0",
            ));
        }
        Ok(Self {
            price_weight,
            carbon_weight,
        })
    }

    /// Weight applied to the normalized price term.
    pub fn price_weight(&self) -> f32 {
        self.price_weight
    }

    /// Weight applied to the normalized carbon term.
    pub fn carbon_weight(&self) -> f32 {
        self.carbon_weight
    }
}

impl Default for OptimizationWeights {
    /// Cost-first default: 0.7 price / 0.3 carbon.
    fn default() -> Self {
        Self {
            price_weight: 0.7,
            carbon_weight: 0.3,
        }
    }
}

/// Aggregate metrics for one candidate execution block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BlockMetrics {
    /// Start offset in hours from now.
    pub start: usize,
    /// Average price over the covered hours (currency/kWh).
    pub avg_price: f32,
    /// Average carbon intensity over the covered hours (gCO2/kWh).
    pub avg_carbon: f32,
    /// Total energy cost for the workload in this block.
    pub total_cost: f32,
    /// Total carbon emitted in kilograms.
    pub total_carbon_kg: f32,
}

/// Derived baseline-vs-optimized savings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Savings {
    /// Absolute cost reduction (currency).
    pub cost_abs: f32,
    /// Cost reduction as a percentage of baseline (0 when baseline is 0).
    pub cost_pct: f32,
    /// Absolute carbon reduction (kg).
    pub carbon_abs: f32,
    /// Carbon reduction as a percentage of baseline (0 when baseline is 0).
    pub carbon_pct: f32,
}

/// Result of one optimization call: the chosen start offset with baseline
/// and optimized metrics. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleResult {
    /// The workload this schedule was computed for.
    pub workload: Workload,
    /// Chosen start offset in hours from now.
    pub start_offset_hours: usize,
    /// Metrics for immediate execution (offset 0).
    pub baseline: BlockMetrics,
    /// Metrics at the chosen start offset.
    pub optimized: BlockMetrics,
}

/// Guards the percentage computation against a zero baseline.
fn pct(saved: f32, baseline: f32) -> f32 {
    if baseline == 0.0 {
        0.0
    } else {
        saved / baseline * 100.0
    }
}

impl ScheduleResult {
    /// Absolute cost savings from shifting (currency).
    pub fn cost_savings(&self) -> f32 {
        self.baseline.total_cost - self.optimized.total_cost
    }

    /// Absolute carbon savings from shifting (kg).
    pub fn carbon_savings_kg(&self) -> f32 {
        self.baseline.total_carbon_kg - self.optimized.total_carbon_kg
    }

    /// All four savings figures in one value.
    pub fn savings(&self) -> Savings {
        Savings {
            cost_abs: self.cost_savings(),
            cost_pct: pct(self.cost_savings(), self.baseline.total_cost),
            carbon_abs: self.carbon_savings_kg(),
            carbon_pct: pct(self.carbon_savings_kg(), self.baseline.total_carbon_kg),
        }
    }

    /// Hours delayed relative to immediate start.
    pub fn delay_hours(&self) -> usize {
        self.start_offset_hours
    }
}

impl fmt::Display for ScheduleResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.savings();
        writeln!(f, "Schedule for {}", self.workload)?;
        writeln!(
            f,
            "  start     : +{} h (baseline +0 h)",
            self.start_offset_hours
        )?;
        writeln!(
            f,
            "  baseline  : ${:>8.2}  {:>8.2} kg CO2  (avg ${:.3}/kWh, {:.0} gCO2/kWh)",
            self.baseline.total_cost,
            self.baseline.total_carbon_kg,
            self.baseline.avg_price,
            self.baseline.avg_carbon
        )?;
        writeln!(
            f,
            "  optimized : ${:>8.2}  {:>8.2} kg CO2  (avg ${:.3}/kWh, {:.0} gCO2/kWh)",
            self.optimized.total_cost,
            self.optimized.total_carbon_kg,
            self.optimized.avg_price,
            self.optimized.avg_carbon
        )?;
        write!(
            f,
            "  savings   : ${:.2} ({:.1}%)  {:.2} kg CO2 ({:.1}%)",
            s.cost_abs, s.cost_pct, s.carbon_abs, s.carbon_pct
        )
    }
}

/// Wire-format view of a [`ScheduleResult`], shared by JSON export and the
/// REST API.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleRecord {
    /// Workload name.
    pub workload: String,
    /// Chosen start offset (hours).
    pub start_offset_hours: usize,
    /// Baseline block (start = 0).
    pub baseline: BlockMetrics,
    /// Optimized block at the chosen offset.
    pub optimized: BlockMetrics,
    /// Derived savings.
    pub savings: Savings,
}

impl From<&ScheduleResult> for ScheduleRecord {
    fn from(r: &ScheduleResult) -> Self {
        Self {
            workload: r.workload.name.clone(),
            start_offset_hours: r.start_offset_hours,
            baseline: r.baseline,
            optimized: r.optimized,
            savings: r.savings(),
        }
    }
}

/// Aggregated results for a fleet of independently optimized workloads.
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    /// One schedule per input workload, in input order.
    pub schedules: Vec<ScheduleResult>,
    /// Sum of absolute cost savings across the fleet.
    pub total_cost_savings: f32,
    /// Sum of absolute carbon savings across the fleet (kg).
    pub total_carbon_savings_kg: f32,
}

impl FleetReport {
    /// Builds the report and its aggregate totals from per-workload results.
    pub fn from_schedules(schedules: Vec<ScheduleResult>) -> Self {
        let total_cost_savings = schedules.iter().map(ScheduleResult::cost_savings).sum();
        let total_carbon_savings_kg = schedules
            .iter()
            .map(ScheduleResult::carbon_savings_kg)
            .sum();
        Self {
            schedules,
            total_cost_savings,
            total_carbon_savings_kg,
        }
    }

    /// Mean cost savings percentage across the fleet.
    pub fn average_cost_savings_pct(&self) -> f32 {
        if self.schedules.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.schedules.iter().map(|s| s.savings().cost_pct).sum();
        sum / self.schedules.len() as f32
    }

    /// Mean carbon savings percentage across the fleet.
    pub fn average_carbon_savings_pct(&self) -> f32 {
        if self.schedules.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.schedules.iter().map(|s| s.savings().carbon_pct).sum();
        sum / self.schedules.len() as f32
    }
}

impl fmt::Display for FleetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fleet report ({} workloads)", self.schedules.len())?;
        for s in &self.schedules {
            writeln!(f, "{s}")?;
        }
        write!(
            f,
            "  fleet totals: ${:.2} saved, {:.2} kg CO2 avoided \
             (avg {:.1}% cost, {:.1}% carbon)",
            self.total_cost_savings,
            self.total_carbon_savings_kg,
            self.average_cost_savings_pct(),
            self.average_carbon_savings_pct()
        )
    }
}
