//! Forecast oracle: synthesizes hourly grid windows from region profiles.
//!
//! Models two phenomena observed in high-solar markets: the duck curve
//! (midday carbon and price trough from solar oversupply) and time-of-use
//! pricing (evening demand ramp). Every stochastic term is seeded from
//! (region, offset) or (region, day), so repeated calls with the same
//! inputs reproduce the same forecast; nothing reads the wall clock.

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::profile::{Region, RegionProfile, RegionTable};
use crate::model::error::OptimizeError;
use crate::model::types::GridWindow;

/// Width of the Gaussian solar peak window (hours).
const SOLAR_WIDTH_HOURS: f32 = 2.5;
/// Hour when the evening carbon ramp (peaker plants) is strongest.
const CARBON_EVENING_PEAK_HOUR: f32 = 19.0;
/// Width of the evening carbon ramp (hours).
const CARBON_EVENING_WIDTH: f32 = 2.5;
/// Width of the evening price spike (hours).
const PRICE_EVENING_WIDTH: f32 = 2.0;
/// Price clamp range (currency/kWh).
const PRICE_RANGE: (f32, f32) = (0.02, 0.50);
/// Renewable fraction clamp range.
const RENEWABLE_RANGE: (f32, f32) = (0.05, 0.95);
/// Hour-seed mixing constant (splitmix64 increment).
const HOUR_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;
/// Day-seed mixing constant.
const DAY_SEED_MIX: u64 = 0xD1B5_4A32_D192_ED03;

/// Per-day variation shared by all windows of one forecast day.
struct DayFactors {
    /// Cloud-cover multiplier applied to solar output (0.8 to 1.2).
    weather: f32,
    /// Carbon baseline shift for the day (gCO2/kWh).
    carbon_shift: f32,
    /// Price baseline shift for the day (currency/kWh).
    price_shift: f32,
}

/// Deterministic forecast generator for one region.
///
/// Pure function of its inputs and the static profile table; holds a
/// reference into the table and no other state.
///
/// # Examples
///
/// ```
/// use gridpilot::grid::{GridOracle, Region, RegionTable};
///
/// let table = RegionTable::builtin();
/// let oracle = GridOracle::new(&table, Region::UsWest);
/// let forecast = oracle.forecast(24).unwrap();
/// assert_eq!(forecast.len(), 24);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct GridOracle<'a> {
    region: Region,
    profile: &'a RegionProfile,
}

impl<'a> GridOracle<'a> {
    /// Creates an oracle for a region backed by the given profile table.
    pub fn new(table: &'a RegionTable, region: Region) -> Self {
        Self {
            region,
            profile: table.profile(region),
        }
    }

    /// The region this oracle forecasts for.
    pub fn region(&self) -> Region {
        self.region
    }

    /// Generates `horizon_hours` contiguous hourly windows, offsets
    /// `0..horizon_hours`.
    ///
    /// Hour-of-day is taken modulo 24, so multi-day horizons repeat the
    /// diurnal pattern with per-day variance.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizeError::Validation`] if `horizon_hours` is zero.
    pub fn forecast(&self, horizon_hours: usize) -> Result<Vec<GridWindow>, OptimizeError> {
        if horizon_hours == 0 {
            return Err(OptimizeError::validation("horizon_hours", "must be > 0"));
        }

        let mut windows = Vec::with_capacity(horizon_hours);
        for offset in 0..horizon_hours {
            windows.push(self.window_at(offset));
        }
        Ok(windows)
    }

    /// Computes the single window at an hour offset.
    fn window_at(&self, offset: usize) -> GridWindow {
        let hour = (offset % 24) as f32;
        let day = self.day_factors(offset / 24);
        let mut rng = StdRng::seed_from_u64(self.hour_seed(offset));

        let solar = self.solar_factor(hour, day.weather);
        let carbon_noise = gaussian_noise(&mut rng, 10.0);
        let price_noise = gaussian_noise(&mut rng, 0.005);
        let renewable_noise = gaussian_noise(&mut rng, 0.03);

        GridWindow {
            hour_offset: offset,
            price: self.price_at(hour, solar, day.price_shift + price_noise),
            carbon_intensity: self.carbon_at(hour, solar, day.carbon_shift + carbon_noise),
            renewable_fraction: self.renewable_at(hour, day.weather, renewable_noise),
        }
    }

    /// Solar generation factor in [0, 1]: Gaussian around the region's
    /// solar peak, scaled by weather, zero at night.
    fn solar_factor(&self, hour: f32, weather: f32) -> f32 {
        if !(6.0..=20.0).contains(&hour) {
            return 0.0;
        }
        let d = hour - self.profile.solar_peak_hour;
        let shape = (-(d * d) / (2.0 * SOLAR_WIDTH_HOURS * SOLAR_WIDTH_HOURS)).exp();
        (shape * weather).clamp(0.0, 1.0)
    }

    /// Carbon intensity: solar displaces fossil generation, evening ramp
    /// brings peaker plants online, overnight loses solar and most wind.
    fn carbon_at(&self, hour: f32, solar: f32, shift: f32) -> f32 {
        let p = self.profile;
        let solar_reduction = p.carbon_amplitude * 1.2 * solar;

        let evening = if (16.0..=22.0).contains(&hour) {
            let d = hour - CARBON_EVENING_PEAK_HOUR;
            p.carbon_amplitude
                * 0.6
                * (-(d * d) / (2.0 * CARBON_EVENING_WIDTH * CARBON_EVENING_WIDTH)).exp()
        } else {
            0.0
        };

        let night = if !(6.0..=21.0).contains(&hour) {
            p.carbon_amplitude * 0.4
        } else {
            0.0
        };

        (p.base_carbon - solar_reduction + evening + night + shift)
            .clamp(p.carbon_floor, p.carbon_ceiling)
    }

    /// Wholesale price: the same solar factor that suppresses carbon also
    /// suppresses price (oversupply), keeping the two curves correlated.
    /// The evening spike peaks at the region's own demand peak hour.
    fn price_at(&self, hour: f32, solar: f32, shift: f32) -> f32 {
        let p = self.profile;
        let solar_reduction = p.price_amplitude * 1.5 * solar;

        let evening = if (15.0..=22.0).contains(&hour) {
            let d = hour - p.price_peak_hour;
            p.price_amplitude
                * 1.2
                * (-(d * d) / (2.0 * PRICE_EVENING_WIDTH * PRICE_EVENING_WIDTH)).exp()
        } else {
            0.0
        };

        let night = if !(6.0..=22.0).contains(&hour) {
            p.price_amplitude * 0.3
        } else {
            0.0
        };

        (p.base_price - solar_reduction + evening + night + shift)
            .clamp(PRICE_RANGE.0, PRICE_RANGE.1)
    }

    /// Renewable share: midday solar plus a wind component peaking in the
    /// small hours, on top of the region's always-on base share.
    fn renewable_at(&self, hour: f32, weather: f32, noise: f32) -> f32 {
        let p = self.profile;
        let two_pi = 2.0 * std::f32::consts::PI;

        let solar = 0.40 * weather * (two_pi * (hour - p.solar_peak_hour) / 24.0).cos().max(0.0);
        let wind = (0.15 + 0.10 * (two_pi * (hour - 4.0) / 24.0).cos()).max(0.0);

        (p.base_renewable + solar + wind + noise).clamp(RENEWABLE_RANGE.0, RENEWABLE_RANGE.1)
    }

    /// Per-day variance terms, seeded from (region, day index).
    fn day_factors(&self, day: usize) -> DayFactors {
        let seed = self
            .profile
            .noise_seed
            .wrapping_add((day as u64 + 1).wrapping_mul(DAY_SEED_MIX));
        let mut rng = StdRng::seed_from_u64(seed);
        DayFactors {
            weather: rng.random_range(0.8..1.2),
            carbon_shift: rng.random_range(-0.15..0.15) * self.profile.carbon_amplitude,
            price_shift: rng.random_range(-0.25..0.25) * self.profile.price_amplitude,
        }
    }

    /// Seed for the per-hour noise RNG, mixed from (region, offset).
    fn hour_seed(&self, offset: usize) -> u64 {
        self.profile
            .noise_seed
            .wrapping_add((offset as u64 + 1).wrapping_mul(HOUR_SEED_MIX))
    }
}

/// Gaussian noise via the Box-Muller transform, mean 0.
fn gaussian_noise(rng: &mut StdRng, std_dev: f32) -> f32 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f32 = rng.random::<f32>().clamp(1e-6, 1.0);
    let u2: f32 = rng.random::<f32>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f32::consts::PI * u2).cos();
    z0 * std_dev
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oracle(table: &RegionTable, region: Region) -> GridOracle<'_> {
        GridOracle::new(table, region)
    }

    #[test]
    fn forecast_has_requested_length_and_contiguous_offsets() {
        let table = RegionTable::builtin();
        let forecast = oracle(&table, Region::UsWest).forecast(36).expect("forecast");
        assert_eq!(forecast.len(), 36);
        for (i, w) in forecast.iter().enumerate() {
            assert_eq!(w.hour_offset, i);
        }
    }

    #[test]
    fn zero_horizon_is_a_validation_error() {
        let table = RegionTable::builtin();
        let err = oracle(&table, Region::UsWest).forecast(0).unwrap_err();
        assert!(matches!(err, OptimizeError::Validation { ref field, .. }
            if field == "horizon_hours"));
    }

    #[test]
    fn forecast_is_deterministic() {
        let table = RegionTable::builtin();
        for region in Region::ALL {
            let a = oracle(&table, region).forecast(72).expect("forecast");
            let b = oracle(&table, region).forecast(72).expect("forecast");
            assert_eq!(a, b, "forecast for {region} must be reproducible");
        }
    }

    #[test]
    fn shorter_horizon_is_a_prefix_of_a_longer_one() {
        let table = RegionTable::builtin();
        let short = oracle(&table, Region::EuWest).forecast(12).expect("forecast");
        let long = oracle(&table, Region::EuWest).forecast(48).expect("forecast");
        assert_eq!(short[..], long[..12]);
    }

    #[test]
    fn values_stay_within_bounds() {
        let table = RegionTable::builtin();
        for region in Region::ALL {
            let p = *table.profile(region);
            for w in oracle(&table, region).forecast(96).expect("forecast") {
                assert!(w.price >= PRICE_RANGE.0 && w.price <= PRICE_RANGE.1);
                assert!(
                    w.carbon_intensity >= p.carbon_floor && w.carbon_intensity <= p.carbon_ceiling
                );
                assert!(
                    w.renewable_fraction >= RENEWABLE_RANGE.0
                        && w.renewable_fraction <= RENEWABLE_RANGE.1
                );
            }
        }
    }

    #[test]
    fn midday_trough_exists_in_us_west() {
        let table = RegionTable::builtin();
        let forecast = oracle(&table, Region::UsWest).forecast(24).expect("forecast");

        let midday_carbon = forecast[12].carbon_intensity.min(forecast[13].carbon_intensity);
        let night_carbon = forecast[2].carbon_intensity;
        let evening_carbon = forecast[19].carbon_intensity;
        assert!(midday_carbon < night_carbon);
        assert!(midday_carbon < evening_carbon);

        let midday_price = forecast[12].price.min(forecast[13].price);
        let evening_price = forecast[18].price;
        assert!(midday_price < evening_price);
    }

    #[test]
    fn renewable_fraction_peaks_midday() {
        let table = RegionTable::builtin();
        let forecast = oracle(&table, Region::UsWest).forecast(24).expect("forecast");
        assert!(forecast[13].renewable_fraction > forecast[20].renewable_fraction);
    }

    #[test]
    fn higher_renewables_mean_lower_carbon() {
        // Inverse correlation over the day, checked pairwise at the extremes.
        let table = RegionTable::builtin();
        let forecast = oracle(&table, Region::UsWest).forecast(24).expect("forecast");
        let midday = &forecast[13];
        let evening = &forecast[19];
        assert!(midday.renewable_fraction > evening.renewable_fraction);
        assert!(midday.carbon_intensity < evening.carbon_intensity);
    }

    #[test]
    fn multi_day_horizon_repeats_diurnal_shape_with_variance() {
        let table = RegionTable::builtin();
        let forecast = oracle(&table, Region::UsWest).forecast(48).expect("forecast");
        // Same diurnal shape: midday of each day below that day's evening.
        assert!(forecast[13].carbon_intensity < forecast[19].carbon_intensity);
        assert!(forecast[37].carbon_intensity < forecast[43].carbon_intensity);
        // Day-to-day variance term: days are not identical copies.
        let day_one: Vec<f32> = forecast[..24].iter().map(|w| w.price).collect();
        let day_two: Vec<f32> = forecast[24..].iter().map(|w| w.price).collect();
        assert_ne!(day_one, day_two);
    }

    #[test]
    fn regions_produce_distinct_forecasts() {
        let table = RegionTable::builtin();
        let west = oracle(&table, Region::UsWest).forecast(24).expect("forecast");
        let nordic = oracle(&table, Region::Nordic).forecast(24).expect("forecast");
        assert_ne!(west, nordic);
        // Hydro-dominated NORDIC is far cleaner on average.
        let avg = |f: &[GridWindow]| {
            f.iter().map(|w| w.carbon_intensity).sum::<f32>() / f.len() as f32
        };
        assert!(avg(&nordic) < avg(&west) / 2.0);
    }

    #[test]
    fn gaussian_noise_zero_std_is_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(gaussian_noise(&mut rng, 0.0), 0.0);
        assert_eq!(gaussian_noise(&mut rng, -1.0), 0.0);
    }
}
