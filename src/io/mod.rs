/// CSV and JSON export of forecasts and schedule results.
pub mod export;
