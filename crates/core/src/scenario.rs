// SkyBench - Flight Sensor Simulation Bench
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Deterministic flight scenarios.
//!
//! A scenario is a pure function from simulated elapsed time to a complete
//! [`FlightSample`]. Equal inputs produce bit-identical outputs; all
//! variation over a run comes from the writer advancing `t`, and any
//! randomness is layered on afterwards by [`crate::noise`].

use serde::Serialize;

/// Length of one full Approach descent before the pattern restarts.
pub const APPROACH_PERIOD_SEC: f64 = 360.0;

const GRAVITY_MS2: f64 = 9.81;
const KT_TO_MS: f64 = 0.514444;

// Loiter hold fix: the Brasília plateau.
const HOLD_LAT: f64 = -15.793889;
const HOLD_LON: f64 = -47.882778;
const HOLD_ALT_M: f64 = 1100.0;

// Approach: straight-in to the EDDF threshold.
const THRESHOLD_LAT: f64 = 50.0379;
const THRESHOLD_LON: f64 = 8.5622;
const FIELD_ELEV_M: f64 = 111.0;
const START_LAT: f64 = 50.0400;
const START_LON: f64 = 8.3500;
const START_ALT_M: f64 = 900.0;
const START_KT: f64 = 80.0;
const FINAL_KT: f64 = 65.0;

/// One tick's worth of simulated sensor state, in the units of the
/// register map: m/s², rad/s, µT, Pa, °C, degrees, m, m/s, V, A.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlightSample {
    pub accel: [f32; 3],
    pub gyro: [f32; 3],
    pub mag: [f32; 3],
    pub baro_pressure_pa: f32,
    pub baro_temp_c: f32,
    pub gps_lat_deg: f64,
    pub gps_lon_deg: f64,
    pub gps_alt_m: f32,
    pub airspeed_ms: f32,
    pub battery_v: f32,
    pub battery_a: f32,
}

/// Selectable flight pattern. CTRL bit 1 picks the variant at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Stationary orbit over a fixed ground point with small attitude
    /// and GPS jitter.
    Loiter,
    /// Looping straight-in approach; restarts from the initial pose every
    /// [`APPROACH_PERIOD_SEC`].
    Approach,
}

impl Scenario {
    pub fn sample(self, t_seconds: f64) -> FlightSample {
        match self {
            Scenario::Loiter => loiter(t_seconds),
            Scenario::Approach => approach(t_seconds),
        }
    }
}

fn lerp(a: f64, b: f64, s: f64) -> f64 {
    let s = s.clamp(0.0, 1.0);
    a + (b - a) * s
}

fn loiter(t: f64) -> FlightSample {
    FlightSample {
        accel: [
            (0.1 * (0.5 * t).sin()) as f32,
            (0.1 * (0.5 * t).cos()) as f32,
            GRAVITY_MS2 as f32,
        ],
        gyro: [
            (0.01 * (0.7 * t).sin()) as f32,
            (0.01 * (0.7 * t).cos()) as f32,
            (0.02 * (0.2 * t).sin()) as f32,
        ],
        mag: [25.0, 0.0, 40.0],
        baro_pressure_pa: (101_325.0 - 12.0 * (0.1 * t).sin()) as f32,
        baro_temp_c: (25.0 + 0.2 * (0.05 * t).sin()) as f32,
        gps_lat_deg: HOLD_LAT + 0.0001 * (0.001 * t).sin(),
        gps_lon_deg: HOLD_LON + 0.0001 * (0.001 * t).cos(),
        gps_alt_m: (HOLD_ALT_M + 2.0 * (0.01 * t).sin()) as f32,
        airspeed_ms: (15.0 + 2.0 * (0.3 * t).sin()) as f32,
        battery_v: (12.3 - 0.0001 * t) as f32,
        battery_a: (2.1 + 0.1 * (0.5 * t).sin()) as f32,
    }
}

fn approach(t: f64) -> FlightSample {
    // Time within the current loop. The modulo restarts each descent at
    // phase zero instead of jumping backward mid-glide, and every term of
    // the published pose depends on tau only, so the pose repeats exactly
    // once per period.
    let tau = t % APPROACH_PERIOD_SEC;
    let phase = tau / APPROACH_PERIOD_SEC;

    let lat = lerp(START_LAT, THRESHOLD_LAT, phase);
    let lon = lerp(START_LON, THRESHOLD_LON, phase);
    let alt = lerp(START_ALT_M, FIELD_ELEV_M + 5.0, phase);
    let airspeed = lerp(START_KT, FINAL_KT, phase) * KT_TO_MS + 0.8 * (0.6 * tau).sin();

    FlightSample {
        accel: [
            (0.05 * (0.4 * t).sin()) as f32,
            (0.03 * (0.9 * t + 1.2).sin()) as f32,
            (GRAVITY_MS2 + 0.02 * (1.3 * t).sin()) as f32,
        ],
        gyro: [
            (0.02 * (0.5 * t).sin()) as f32,
            (0.01 * (0.6 * t).cos()) as f32,
            (0.03 * (0.2 * t).sin()) as f32,
        ],
        mag: [25.0, 0.0, 40.0],
        // Sea-level pressure with a slow swing, minus a first-order
        // altitude correction of 12 Pa per 100 m.
        baro_pressure_pa: (101_325.0 - 12.0 * (0.1 * t).sin() - alt * 12.0 / 100.0) as f32,
        baro_temp_c: (15.0 - 0.0065 * alt + 0.3 * (0.03 * t).sin()) as f32,
        gps_lat_deg: lat,
        gps_lon_deg: lon,
        gps_alt_m: alt as f32,
        airspeed_ms: airspeed as f32,
        battery_v: (12.3 - 0.0001 * t) as f32,
        battery_a: (2.1 + 0.1 * (0.5 * t).sin()) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sampling_is_deterministic() {
        for t in [0.0, 0.01, 1.5, 359.99, 360.0, 12_345.678] {
            assert_eq!(Scenario::Loiter.sample(t), Scenario::Loiter.sample(t));
            assert_eq!(Scenario::Approach.sample(t), Scenario::Approach.sample(t));
        }
    }

    #[test]
    fn test_loiter_stays_on_the_hold_fix() {
        for t in [0.0, 10.0, 100.0, 1000.0] {
            let s = Scenario::Loiter.sample(t);
            assert!((s.gps_lat_deg - HOLD_LAT).abs() <= 0.0001);
            assert!((s.gps_lon_deg - HOLD_LON).abs() <= 0.0001);
            assert!((f64::from(s.gps_alt_m) - HOLD_ALT_M).abs() <= 2.0);
        }
    }

    #[test]
    fn test_approach_pose_wraps_at_the_period() {
        for t in [0.0, 12.5, 100.25, 359.5] {
            let a = Scenario::Approach.sample(t);
            let b = Scenario::Approach.sample(t + APPROACH_PERIOD_SEC);
            assert_eq!(a.gps_lat_deg.to_bits(), b.gps_lat_deg.to_bits());
            assert_eq!(a.gps_lon_deg.to_bits(), b.gps_lon_deg.to_bits());
            assert_eq!(a.gps_alt_m.to_bits(), b.gps_alt_m.to_bits());
            assert_eq!(a.airspeed_ms.to_bits(), b.airspeed_ms.to_bits());
        }
    }

    #[test]
    fn test_approach_starts_at_the_initial_pose() {
        let s = Scenario::Approach.sample(0.0);
        assert_eq!(s.gps_lat_deg, START_LAT);
        assert_eq!(s.gps_lon_deg, START_LON);
        assert_eq!(s.gps_alt_m, START_ALT_M as f32);
    }

    #[test]
    fn test_approach_descends_toward_the_threshold() {
        let early = Scenario::Approach.sample(10.0);
        let late = Scenario::Approach.sample(350.0);
        assert!(late.gps_alt_m < early.gps_alt_m);
        assert!((late.gps_lat_deg - THRESHOLD_LAT).abs() < (early.gps_lat_deg - THRESHOLD_LAT).abs());
        assert!((late.gps_lon_deg - THRESHOLD_LON).abs() < (early.gps_lon_deg - THRESHOLD_LON).abs());
    }

    #[test]
    fn test_lerp_fraction_is_clamped() {
        assert_eq!(lerp(900.0, 116.0, -0.25), 900.0);
        assert_eq!(lerp(900.0, 116.0, 0.0), 900.0);
        assert_eq!(lerp(900.0, 116.0, 1.0), 116.0);
        assert_eq!(lerp(900.0, 116.0, 1.0001), 116.0);
    }

    #[test]
    fn test_variants_share_the_field_set_and_units() {
        // Both variants feed the same registers; spot-check that the
        // common physics agree in magnitude.
        let a = Scenario::Loiter.sample(5.0);
        let b = Scenario::Approach.sample(5.0);
        assert!((f64::from(a.accel[2]) - GRAVITY_MS2).abs() < 0.1);
        assert!((f64::from(b.accel[2]) - GRAVITY_MS2).abs() < 0.1);
        assert_eq!(a.mag, b.mag);
        assert!(a.baro_pressure_pa > 80_000.0 && b.baro_pressure_pa > 80_000.0);
    }
}
