// energy/mod.rs
//! Power and energy accounting for the simulated light.
//!
//! Power is a pure function of status and brightness. Energy is the running
//! integral of power over wall-clock time, advanced whenever the state is
//! re-derived. Accrual always runs before the new power is derived so each
//! interval is billed at the power that was actually in effect.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use crate::models::{LightReport, LightState, LightUpdate, PowerStatus};

pub const MAX_POWER: f64 = 10.0;
pub const BASE_POWER: f64 = 0.5;
pub const RATE: f64 = 0.12;

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Electrical characteristics and tariff of the bulb.
///
/// All figures must be non-negative, otherwise accrued energy could shrink.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Validate)]
#[serde(default)]
pub struct PowerProfile {
    /// Watts at 100% brightness.
    #[validate(range(min = 0.0, message = "max_power must not be negative"))]
    pub max_power: f64,
    /// Standby watts while off.
    #[validate(range(min = 0.0, message = "base_power must not be negative"))]
    pub base_power: f64,
    /// Currency per kWh.
    #[validate(range(min = 0.0, message = "rate must not be negative"))]
    pub rate: f64,
}

impl Default for PowerProfile {
    fn default() -> Self {
        Self {
            max_power: MAX_POWER,
            base_power: BASE_POWER,
            rate: RATE,
        }
    }
}

impl PowerProfile {
    pub fn derive_power(&self, status: PowerStatus, brightness: u8) -> f64 {
        match status {
            PowerStatus::On => f64::from(brightness) / 100.0 * self.max_power,
            PowerStatus::Off => self.base_power,
        }
    }

    /// Converts watts (or watt-hours) into currency per hour (or currency).
    pub fn cost(&self, watts: f64) -> f64 {
        watts * self.rate / 1000.0
    }

    /// Startup state: off, half brightness, nothing consumed yet.
    pub fn initial_state(&self, now: DateTime<Utc>) -> LightState {
        let status = PowerStatus::Off;
        let brightness = 50;
        LightState {
            status,
            brightness,
            current_power: self.derive_power(status, brightness),
            last_updated: now,
            energy_consumed: 0.0,
        }
    }

    pub fn report(&self, state: &LightState) -> LightReport {
        LightReport {
            status: state.status,
            brightness: state.brightness,
            current_power: state.current_power,
            last_updated: state.last_updated,
            energy_consumed: state.energy_consumed,
            cost_estimate: self.cost(state.current_power),
            total_cost: self.cost(state.energy_consumed),
        }
    }

    /// Accrue, apply the requested fields, re-derive power.
    pub fn apply_update(&self, state: &mut LightState, update: LightUpdate, now: DateTime<Utc>) {
        accrue_energy(state, now);
        if let Some(status) = update.status {
            state.status = status;
        }
        if let Some(brightness) = update.brightness {
            state.brightness = brightness;
        }
        state.current_power = self.derive_power(state.status, state.brightness);
        state.last_updated = now;
    }

    /// Same sequence as [`apply_update`](Self::apply_update) with no field
    /// changes, so reading the light still advances the energy clock.
    pub fn read_state(&self, state: &mut LightState, now: DateTime<Utc>) {
        self.apply_update(state, LightUpdate::default(), now);
    }
}

/// Bills the interval since `last_updated` at the current power.
///
/// A clock that moved backwards accrues nothing but still resets the
/// reference point.
pub fn accrue_energy(state: &mut LightState, now: DateTime<Utc>) {
    let elapsed = now - state.last_updated;
    // Nanoseconds overflow i64 after ~292 years; fall back to milliseconds.
    let seconds = match elapsed.num_nanoseconds() {
        Some(nanos) => nanos.max(0) as f64 / 1e9,
        None => elapsed.num_milliseconds().max(0) as f64 / 1e3,
    };
    let hours = seconds / SECONDS_PER_HOUR;
    state.energy_consumed += state.current_power * hours;
    state.last_updated = now;
}
