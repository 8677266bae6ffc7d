// metrics/mod.rs
use metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

use crate::models::{LightReport, PowerStatus};

/// Serves `/metrics` on its own port. Needs a running tokio runtime.
pub fn setup_metrics(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()
}

// No-ops until a recorder is installed.
pub fn record_light(report: &LightReport) {
    gauge!("light_power_watts").set(report.current_power);
    gauge!("light_energy_watt_hours").set(report.energy_consumed);
    gauge!("light_brightness_percent").set(f64::from(report.brightness));
    let on = if report.status == PowerStatus::On { 1.0 } else { 0.0 };
    gauge!("light_on").set(on);
}

pub fn record_update() {
    counter!("light_updates_total").increment(1);
}
