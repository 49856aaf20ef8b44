// SkyBench - Flight Sensor Simulation Bench
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Read-side decoding of the register page.
//!
//! All decoders are stateless and take the page's raw bytes, so they work
//! against a live mapping or a copied snapshot alike. A multi-field
//! decode performed against a live page is **not** an atomic snapshot:
//! the writer may publish a new tick between any two field reads, so a
//! frame can mix fields from adjacent ticks. TICK_US is monotonic
//! non-decreasing while the writer is not frozen, and that is the only
//! cross-field guarantee.

use serde::Serialize;

use crate::regmap;
use crate::scenario::FlightSample;

/// Fixed header registers written once at writer startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageHeader {
    pub magic: u32,
    pub version: u32,
    pub status: u32,
    pub rng_seed: u32,
}

impl PageHeader {
    /// True when the block carries the expected format and layout
    /// revision.
    pub fn is_valid(&self) -> bool {
        self.magic == regmap::MAGIC_VALUE && self.version == regmap::LAYOUT_VERSION
    }

    pub fn writer_alive(&self) -> bool {
        regmap::Status::from_bits_retain(self.status).contains(regmap::Status::ALIVE)
    }
}

/// One decoded poll: the tick counter plus every scientific field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleFrame {
    pub tick_us: u32,
    #[serde(flatten)]
    pub sample: FlightSample,
}

pub fn decode_header(bytes: &[u8]) -> PageHeader {
    PageHeader {
        magic: regmap::get_u32(bytes, regmap::MAGIC),
        version: regmap::get_u32(bytes, regmap::VERSION),
        status: regmap::get_u32(bytes, regmap::STATUS),
        rng_seed: regmap::get_u32(bytes, regmap::RNG_SEED),
    }
}

pub fn decode_tick_us(bytes: &[u8]) -> u32 {
    regmap::get_u32(bytes, regmap::TICK_US)
}

pub fn decode_ctrl(bytes: &[u8]) -> u32 {
    regmap::get_u32(bytes, regmap::CTRL)
}

pub fn decode_sample(bytes: &[u8]) -> SampleFrame {
    SampleFrame {
        tick_us: decode_tick_us(bytes),
        sample: FlightSample {
            accel: [
                regmap::get_f32(bytes, regmap::ACCEL_X),
                regmap::get_f32(bytes, regmap::ACCEL_Y),
                regmap::get_f32(bytes, regmap::ACCEL_Z),
            ],
            gyro: [
                regmap::get_f32(bytes, regmap::GYRO_X),
                regmap::get_f32(bytes, regmap::GYRO_Y),
                regmap::get_f32(bytes, regmap::GYRO_Z),
            ],
            mag: [
                regmap::get_f32(bytes, regmap::MAG_X),
                regmap::get_f32(bytes, regmap::MAG_Y),
                regmap::get_f32(bytes, regmap::MAG_Z),
            ],
            baro_pressure_pa: regmap::get_f32(bytes, regmap::BARO_P),
            baro_temp_c: regmap::get_f32(bytes, regmap::BARO_T),
            gps_lat_deg: regmap::get_f64(bytes, regmap::GPS_LAT64),
            gps_lon_deg: regmap::get_f64(bytes, regmap::GPS_LON64),
            gps_alt_m: regmap::get_f32(bytes, regmap::GPS_ALT),
            airspeed_ms: regmap::get_f32(bytes, regmap::AIRSPEED),
            battery_v: regmap::get_f32(bytes, regmap::BAT_V),
            battery_a: regmap::get_f32(bytes, regmap::BAT_I),
        },
    }
}
