//! Static per-region grid profiles.
//!
//! The table is an explicit immutable structure built once at process
//! start ([`RegionTable::builtin`]) and passed by reference into the
//! oracle; it is never a mutable singleton.

use std::fmt;

use serde::Serialize;

use crate::model::error::OptimizeError;

/// Supported grid regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Region {
    #[serde(rename = "US-WEST")]
    UsWest,
    #[serde(rename = "US-EAST")]
    UsEast,
    #[serde(rename = "EU-WEST")]
    EuWest,
    #[serde(rename = "NORDIC")]
    Nordic,
}

impl Region {
    /// All supported regions, in table order.
    pub const ALL: [Region; 4] = [
        Region::UsWest,
        Region::UsEast,
        Region::EuWest,
        Region::Nordic,
    ];

    /// Canonical identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::UsWest => "US-WEST",
            Region::UsEast => "US-EAST",
            Region::EuWest => "EU-WEST",
            Region::Nordic => "NORDIC",
        }
    }

    /// Parses a region identifier (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::UnknownRegion`] for identifiers not in the
    /// profile table.
    pub fn parse(s: &str) -> Result<Self, OptimizeError> {
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OptimizeError::UnknownRegion {
                region: s.to_string(),
            })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Baseline curve parameters for one region.
#[derive(Debug, Clone, Copy)]
pub struct RegionProfile {
    /// Baseline carbon intensity (gCO2/kWh).
    pub base_carbon: f32,
    /// Carbon swing from solar displacement (gCO2/kWh).
    pub carbon_amplitude: f32,
    /// Lowest plausible carbon intensity for the region (gCO2/kWh).
    pub carbon_floor: f32,
    /// Highest plausible carbon intensity for the region (gCO2/kWh).
    pub carbon_ceiling: f32,
    /// Baseline price (currency/kWh).
    pub base_price: f32,
    /// Price swing amplitude (currency/kWh).
    pub price_amplitude: f32,
    /// Hour of day when solar output peaks.
    pub solar_peak_hour: f32,
    /// Hour of day when the evening price ramp peaks.
    pub price_peak_hour: f32,
    /// Always-on renewable share (hydro/nuclear), 0.0 to 1.0.
    pub base_renewable: f32,
    /// Region seed for all stochastic curve terms.
    pub noise_seed: u64,
}

/// Immutable table of all built-in region profiles.
#[derive(Debug, Clone)]
pub struct RegionTable {
    profiles: [RegionProfile; 4],
}

impl RegionTable {
    /// Builds the table of built-in regional baselines.
    pub fn builtin() -> Self {
        Self {
            profiles: [
                // US-WEST: high solar penetration, pronounced duck curve
                RegionProfile {
                    base_carbon: 350.0,
                    carbon_amplitude: 200.0,
                    carbon_floor: 50.0,
                    carbon_ceiling: 800.0,
                    base_price: 0.12,
                    price_amplitude: 0.08,
                    solar_peak_hour: 13.0,
                    price_peak_hour: 18.0,
                    base_renewable: 0.10,
                    noise_seed: 0x5753_u64, // "WS"
                },
                // US-EAST: more fossil baseline, milder solar swing
                RegionProfile {
                    base_carbon: 420.0,
                    carbon_amplitude: 150.0,
                    carbon_floor: 80.0,
                    carbon_ceiling: 800.0,
                    base_price: 0.14,
                    price_amplitude: 0.07,
                    solar_peak_hour: 13.0,
                    price_peak_hour: 17.0,
                    base_renewable: 0.10,
                    noise_seed: 0x4553_u64,
                },
                // EU-WEST: expensive power, strong renewables buildout
                RegionProfile {
                    base_carbon: 280.0,
                    carbon_amplitude: 180.0,
                    carbon_floor: 40.0,
                    carbon_ceiling: 700.0,
                    base_price: 0.18,
                    price_amplitude: 0.10,
                    solar_peak_hour: 14.0,
                    price_peak_hour: 19.0,
                    base_renewable: 0.10,
                    noise_seed: 0x4555_u64,
                },
                // NORDIC: hydro-dominated, low and flat
                RegionProfile {
                    base_carbon: 80.0,
                    carbon_amplitude: 40.0,
                    carbon_floor: 20.0,
                    carbon_ceiling: 300.0,
                    base_price: 0.08,
                    price_amplitude: 0.04,
                    solar_peak_hour: 13.0,
                    price_peak_hour: 18.0,
                    base_renewable: 0.60,
                    noise_seed: 0x4f4e_u64,
                },
            ],
        }
    }

    /// Returns the profile for a region.
    pub fn profile(&self, region: Region) -> &RegionProfile {
        let idx = Region::ALL
            .iter()
            .position(|r| *r == region)
            .unwrap_or_default();
        &self.profiles[idx]
    }
}
