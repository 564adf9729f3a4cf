//! API request and response types.

use serde::{Deserialize, Serialize};

use crate::grid::profile::Region;
use crate::model::types::{FleetReport, GridWindow, ScheduleRecord, WorkloadSpec};

/// Liveness probe response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error body returned with a 400 status.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query parameters for `GET /forecast`.
#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    /// Region identifier; defaults to the configured region.
    pub region: Option<String>,
    /// Forecast horizon in hours (1 to 168); defaults to 24.
    pub hours: Option<usize>,
}

/// Response body for `GET /forecast`.
#[derive(Debug, Serialize)]
pub struct ForecastResponse {
    /// Region the forecast was generated for.
    pub region: Region,
    /// Requested horizon in hours.
    pub hours: usize,
    /// Number of windows returned (equals `hours`).
    pub data_points: usize,
    /// The hourly windows, ordered by offset.
    pub windows: Vec<GridWindow>,
}

/// Optional overrides shared by the optimize and fleet requests. Omitted
/// fields fall back to the server's configured defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeOptions {
    pub region: Option<String>,
    /// Forecast horizon; defaults to the deadline rounded up (minimum 24).
    pub hours: Option<usize>,
    pub price_weight: Option<f32>,
    pub carbon_weight: Option<f32>,
    pub min_delay_hours: Option<f32>,
}

/// Request body for `POST /optimize`.
#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub workload: WorkloadSpec,
    #[serde(flatten)]
    pub options: OptimizeOptions,
}

/// Request body for `POST /fleet`.
#[derive(Debug, Deserialize)]
pub struct FleetRequest {
    pub workloads: Vec<WorkloadSpec>,
    #[serde(flatten)]
    pub options: OptimizeOptions,
}

/// Response body for `POST /fleet`.
#[derive(Debug, Serialize)]
pub struct FleetResponse {
    /// One record per workload, in request order.
    pub schedules: Vec<ScheduleRecord>,
    pub total_cost_savings: f32,
    pub total_carbon_savings_kg: f32,
    pub average_cost_savings_pct: f32,
    pub average_carbon_savings_pct: f32,
}

impl From<&FleetReport> for FleetResponse {
    fn from(report: &FleetReport) -> Self {
        Self {
            schedules: report.schedules.iter().map(ScheduleRecord::from).collect(),
            total_cost_savings: report.total_cost_savings,
            total_carbon_savings_kg: report.total_carbon_savings_kg,
            average_cost_savings_pct: report.average_cost_savings_pct(),
            average_carbon_savings_pct: report.average_carbon_savings_pct(),
        }
    }
}
