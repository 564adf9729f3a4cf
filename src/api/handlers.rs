//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use super::AppState;
use super::types::{
    ErrorResponse, FleetRequest, FleetResponse, ForecastQuery, ForecastResponse, HealthResponse,
    OptimizeOptions, OptimizeRequest,
};
use crate::autopilot::Autopilot;
use crate::grid::GridOracle;
use crate::grid::profile::Region;
use crate::model::error::OptimizeError;
use crate::model::types::{OptimizationWeights, ScheduleRecord, Workload};

/// Maximum forecast horizon the API will generate (one week).
const MAX_FORECAST_HOURS: usize = 168;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a core error to a 400 with a JSON error body.
fn bad_request(err: OptimizeError) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// `GET /health` → 200 + `{"status":"ok"}`
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `GET /forecast?region=US-WEST&hours=24` → 200 + `ForecastResponse`
pub async fn get_forecast(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastResponse>, ApiError> {
    let region_str = query
        .region
        .unwrap_or_else(|| state.config.defaults.region.clone());
    let region = Region::parse(&region_str).map_err(bad_request)?;

    let hours = query.hours.unwrap_or(24);
    if hours == 0 || hours > MAX_FORECAST_HOURS {
        return Err(bad_request(OptimizeError::validation(
            "hours",
            format!("must be in 1..={MAX_FORECAST_HOURS}"),
        )));
    }

    let windows = GridOracle::new(&state.table, region)
        .forecast(hours)
        .map_err(bad_request)?;

    Ok(Json(ForecastResponse {
        region,
        hours,
        data_points: windows.len(),
        windows,
    }))
}

/// Resolves optional request overrides against configured defaults.
fn build_autopilot(state: &AppState, options: &OptimizeOptions) -> Result<Autopilot, ApiError> {
    let o = &state.config.optimization;
    let weights = OptimizationWeights::new(
        options.price_weight.unwrap_or(o.price_weight),
        options.carbon_weight.unwrap_or(o.carbon_weight),
    )
    .map_err(bad_request)?;
    let min_delay = options.min_delay_hours.unwrap_or(o.min_delay_hours);
    if min_delay < 0.0 {
        return Err(bad_request(OptimizeError::validation(
            "min_delay_hours",
            "must be >= 0",
        )));
    }
    Ok(Autopilot::new(weights).with_min_delay(min_delay))
}

/// Generates the forecast the optimization will scan.
///
/// Horizon defaults to the longest deadline rounded up, with a 24-hour
/// floor so short-deadline workloads still see a full diurnal cycle.
fn build_forecast(
    state: &AppState,
    options: &OptimizeOptions,
    max_deadline_hours: f32,
) -> Result<(Region, Vec<crate::model::types::GridWindow>), ApiError> {
    let region_str = options
        .region
        .clone()
        .unwrap_or_else(|| state.config.defaults.region.clone());
    let region = Region::parse(&region_str).map_err(bad_request)?;

    let hours = options
        .hours
        .unwrap_or_else(|| (max_deadline_hours.ceil() as usize).max(24));
    if hours == 0 || hours > MAX_FORECAST_HOURS {
        return Err(bad_request(OptimizeError::validation(
            "hours",
            format!("must be in 1..={MAX_FORECAST_HOURS}"),
        )));
    }

    let windows = GridOracle::new(&state.table, region)
        .forecast(hours)
        .map_err(bad_request)?;
    Ok((region, windows))
}

/// `POST /optimize` → 200 + `ScheduleRecord`, 400 on validation failure
pub async fn post_optimize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<ScheduleRecord>, ApiError> {
    let workload = request.workload.into_workload().map_err(bad_request)?;
    let pilot = build_autopilot(&state, &request.options)?;
    let (_, forecast) = build_forecast(&state, &request.options, workload.deadline_hours)?;

    let result = pilot.optimize(&workload, &forecast).map_err(bad_request)?;
    Ok(Json(ScheduleRecord::from(&result)))
}

/// `POST /fleet` → 200 + `FleetResponse`, 400 on any per-workload failure
pub async fn post_fleet(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FleetRequest>,
) -> Result<Json<FleetResponse>, ApiError> {
    let workloads = request
        .workloads
        .into_iter()
        .map(|spec| spec.into_workload())
        .collect::<Result<Vec<Workload>, _>>()
        .map_err(bad_request)?;

    let max_deadline = workloads
        .iter()
        .map(|w| w.deadline_hours)
        .fold(0.0_f32, f32::max);
    let pilot = build_autopilot(&state, &request.options)?;
    let (_, forecast) = build_forecast(&state, &request.options, max_deadline)?;

    let report = pilot
        .optimize_fleet(&workloads, &forecast)
        .map_err(bad_request)?;
    Ok(Json(FleetResponse::from(&report)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::config::AppConfig;
    use crate::grid::profile::RegionTable;

    fn make_test_state() -> Arc<AppState> {
        Arc::new(AppState {
            table: RegionTable::builtin(),
            config: AppConfig::default(),
        })
    }

    fn json_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("body is JSON")
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = router(make_test_state());
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request builds");
        let resp = app.oneshot(req).await.expect("handler runs");
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn forecast_returns_requested_hours() {
        let app = router(make_test_state());
        let req = Request::builder()
            .uri("/forecast?region=US-WEST&hours=48")
            .body(Body::empty())
            .expect("request builds");
        let resp = app.oneshot(req).await.expect("handler runs");
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["region"], "US-WEST");
        assert_eq!(json["data_points"], 48);
        assert_eq!(json["windows"].as_array().map(Vec::len), Some(48));
        assert_eq!(json["windows"][0]["hour_offset"], 0);
    }

    #[tokio::test]
    async fn forecast_defaults_to_configured_region() {
        let app = router(make_test_state());
        let req = Request::builder()
            .uri("/forecast")
            .body(Body::empty())
            .expect("request builds");
        let resp = app.oneshot(req).await.expect("handler runs");
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["region"], "US-WEST");
        assert_eq!(json["data_points"], 24);
    }

    #[tokio::test]
    async fn forecast_unknown_region_returns_400() {
        let app = router(make_test_state());
        let req = Request::builder()
            .uri("/forecast?region=ATLANTIS")
            .body(Body::empty())
            .expect("request builds");
        let resp = app.oneshot(req).await.expect("handler runs");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|e| e.contains("ATLANTIS"))
        );
    }

    #[tokio::test]
    async fn forecast_excessive_horizon_returns_400() {
        let app = router(make_test_state());
        let req = Request::builder()
            .uri("/forecast?hours=169")
            .body(Body::empty())
            .expect("request builds");
        let resp = app.oneshot(req).await.expect("handler runs");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn optimize_returns_schedule_record() {
        let app = router(make_test_state());
        let body = r#"{
            "workload": {
                "name": "train",
                "duration_hours": 6.0,
                "power_draw_kw": 120.0,
                "deadline_hours": 24.0
            },
            "region": "US-WEST"
        }"#;
        let resp = app
            .oneshot(json_request("/optimize", body))
            .await
            .expect("handler runs");
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["workload"], "train");
        assert_eq!(json["baseline"]["start"], 0);
        assert!(json["start_offset_hours"].is_number());
        assert!(json["savings"]["cost_abs"].is_number());
    }

    #[tokio::test]
    async fn optimize_invalid_deadline_returns_400() {
        let app = router(make_test_state());
        let body = r#"{
            "workload": {
                "name": "etl",
                "duration_hours": 12.0,
                "power_draw_kw": 50.0,
                "deadline_hours": 4.0
            }
        }"#;
        let resp = app
            .oneshot(json_request("/optimize", body))
            .await
            .expect("handler runs");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(
            json["error"]
                .as_str()
                .is_some_and(|e| e.contains("deadline"))
        );
    }

    #[tokio::test]
    async fn optimize_rejects_bad_weight_override() {
        let app = router(make_test_state());
        let body = r#"{
            "workload": {
                "name": "train",
                "duration_hours": 2.0,
                "power_draw_kw": 10.0,
                "deadline_hours": 8.0
            },
            "price_weight": 0.9,
            "carbon_weight": 0.9
        }"#;
        let resp = app
            .oneshot(json_request("/optimize", body))
            .await
            .expect("handler runs");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn fleet_returns_record_per_workload() {
        let app = router(make_test_state());
        let body = r#"{
            "workloads": [
                {
                    "name": "a",
                    "duration_hours": 4.0,
                    "power_draw_kw": 100.0,
                    "deadline_hours": 24.0
                },
                {
                    "name": "b",
                    "duration_hours": 2.0,
                    "power_draw_kw": 50.0,
                    "deadline_hours": 12.0
                }
            ],
            "region": "EU-WEST"
        }"#;
        let resp = app
            .oneshot(json_request("/fleet", body))
            .await
            .expect("handler runs");
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["schedules"].as_array().map(Vec::len), Some(2));
        assert_eq!(json["schedules"][0]["workload"], "a");
        assert_eq!(json["schedules"][1]["workload"], "b");
        assert!(json["total_cost_savings"].is_number());
        assert!(json["average_carbon_savings_pct"].is_number());
    }
}
