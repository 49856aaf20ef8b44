// SkyBench - Flight Sensor Simulation Bench
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The single writer owning the register page.
//!
//! The writer publishes one flight sample per tick at a fixed rate and is
//! steered entirely through the CTRL word, which it re-reads every tick.
//! Scheduling is best-effort soft real time: each tick computes its target
//! wake time and sleeps the remainder; an overrunning tick simply starts
//! the next one immediately, with no catch-up burst.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::backend::RegisterPageMut;
use crate::ctrl::CtrlWord;
use crate::metrics::TickMetrics;
use crate::noise::NoiseInjector;
use crate::regmap::{self, Status};
use crate::scenario::FlightSample;

/// Serializes one frame into the page in the fixed register order:
/// TICK_US, accel, gyro, mag, baro, GPS, airspeed, battery. Every tick
/// writes the full set in this order; no field is refreshed in isolation.
pub fn encode_frame(bytes: &mut [u8], tick_us: u32, s: &FlightSample) {
    regmap::put_u32(bytes, regmap::TICK_US, tick_us);
    regmap::put_f32(bytes, regmap::ACCEL_X, s.accel[0]);
    regmap::put_f32(bytes, regmap::ACCEL_Y, s.accel[1]);
    regmap::put_f32(bytes, regmap::ACCEL_Z, s.accel[2]);
    regmap::put_f32(bytes, regmap::GYRO_X, s.gyro[0]);
    regmap::put_f32(bytes, regmap::GYRO_Y, s.gyro[1]);
    regmap::put_f32(bytes, regmap::GYRO_Z, s.gyro[2]);
    regmap::put_f32(bytes, regmap::MAG_X, s.mag[0]);
    regmap::put_f32(bytes, regmap::MAG_Y, s.mag[1]);
    regmap::put_f32(bytes, regmap::MAG_Z, s.mag[2]);
    regmap::put_f32(bytes, regmap::BARO_P, s.baro_pressure_pa);
    regmap::put_f32(bytes, regmap::BARO_T, s.baro_temp_c);
    regmap::put_f64(bytes, regmap::GPS_LAT64, s.gps_lat_deg);
    regmap::put_f64(bytes, regmap::GPS_LON64, s.gps_lon_deg);
    regmap::put_f32(bytes, regmap::GPS_ALT, s.gps_alt_m);
    regmap::put_f32(bytes, regmap::AIRSPEED, s.airspeed_ms);
    regmap::put_f32(bytes, regmap::BAT_V, s.battery_v);
    regmap::put_f32(bytes, regmap::BAT_I, s.battery_a);
}

/// Tick-driven simulator publishing into a read-write page.
#[derive(Debug)]
pub struct Writer {
    page: RegisterPageMut,
    rate_hz: f64,
    period: Duration,
    seed: u32,
    noise: NoiseInjector,
    metrics: TickMetrics,
}

impl Writer {
    pub fn new(page: RegisterPageMut, rate_hz: f64, seed: u32) -> Self {
        let rate_hz = rate_hz.max(1e-6);
        Self {
            page,
            rate_hz,
            period: Duration::from_secs_f64(1.0 / rate_hz),
            seed,
            noise: NoiseInjector::new(seed),
            metrics: TickMetrics::new(),
        }
    }

    /// Writes the header registers and marks the block alive. Called once
    /// before the first tick.
    pub fn init_page(&mut self) {
        self.page.write_u32(regmap::MAGIC, regmap::MAGIC_VALUE);
        self.page.write_u32(regmap::VERSION, regmap::LAYOUT_VERSION);
        self.page.write_u32(regmap::STATUS, Status::ALIVE.bits());
        self.page.write_u32(regmap::RNG_SEED, self.seed);
    }

    /// One simulation step at `t_seconds` since writer start. [`run`]
    /// drives this at the tick rate.
    ///
    /// [`run`]: Writer::run
    pub fn tick(&mut self, t_seconds: f64) {
        let ctrl = CtrlWord::from_register(self.page.read_u32(regmap::CTRL));
        if ctrl.frozen() {
            // Nothing is written, TICK_US included: the visible page is
            // byte-stable until unfrozen. The elapsed-time clock keeps
            // running underneath.
            self.metrics.record_frozen();
            return;
        }

        let mut sample = ctrl.scenario().sample(t_seconds);
        if ctrl.noise_enabled() {
            self.noise.perturb(&mut sample);
        }

        encode_frame(self.page.bytes_mut(), (t_seconds * 1e6) as u32, &sample);
        self.metrics.record_published();

        // Kernel write-back is advisory for a shared mapping; a failure
        // costs this tick nothing and the next tick rewrites everything.
        if let Err(e) = self.page.flush_async() {
            tracing::warn!("page write-back failed: {e}");
        }
    }

    /// Runs until `running` goes false, then clears the alive bit and
    /// logs a tick summary. The page mapping is released when the writer
    /// is dropped, on every exit path.
    pub fn run(&mut self, running: &AtomicBool) {
        self.init_page();
        tracing::info!(
            page = %self.page.path().display(),
            rate_hz = self.rate_hz,
            seed = self.seed,
            "sensor writer started; CTRL bits: 0=freeze 1=scenario(0 loiter,1 approach) 2=noise"
        );

        let start = Instant::now();
        let mut wake = start;
        while running.load(Ordering::SeqCst) {
            wake += self.period;
            self.tick(start.elapsed().as_secs_f64());

            let now = Instant::now();
            if wake > now {
                thread::sleep(wake - now);
            } else {
                self.metrics.record_overrun();
                wake = now;
            }
        }

        let status = Status::from_bits_retain(self.page.read_u32(regmap::STATUS));
        self.page
            .write_u32(regmap::STATUS, status.difference(Status::ALIVE).bits());
        if let Err(e) = self.page.flush() {
            tracing::warn!("final page write-back failed: {e}");
        }
        self.metrics.log_summary(start.elapsed());
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }
}
