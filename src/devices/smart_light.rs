// smart_light.rs
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    clock::Clock,
    energy::PowerProfile,
    events::EventBus,
    metrics,
    models::{LightReport, LightState, LightUpdate, UpdateLightResponse, WsMessage},
};

/// Owns the one light state. Every operation, reads included, runs under the
/// same lock so accrual intervals never overlap and feed subscribers see
/// updates in the order they were applied.
pub struct SmartLight {
    state: Mutex<LightState>,
    profile: PowerProfile,
    clock: Arc<dyn Clock>,
    events: Arc<EventBus>,
}

impl SmartLight {
    pub fn new(profile: PowerProfile, clock: Arc<dyn Clock>, events: Arc<EventBus>) -> Self {
        let state = profile.initial_state(clock.now());
        Self {
            state: Mutex::new(state),
            profile,
            clock,
            events,
        }
    }

    async fn read(&self) -> (tokio::sync::MutexGuard<'_, LightState>, LightReport) {
        let mut state = self.state.lock().await;
        self.profile.read_state(&mut state, self.clock.now());
        let report = self.profile.report(&state);
        (state, report)
    }
}

#[async_trait]
impl super::Device for SmartLight {
    async fn get_status(&self) -> LightReport {
        let (state, report) = self.read().await;
        drop(state);

        debug!(energy_wh = report.energy_consumed, "Light status read");
        metrics::record_light(&report);
        report
    }

    async fn apply(&self, update: LightUpdate) -> LightReport {
        let mut state = self.state.lock().await;
        self.profile.apply_update(&mut state, update, self.clock.now());
        let report = self.profile.report(&state);
        self.events
            .publish(WsMessage::Updated(UpdateLightResponse::from(report.clone())));
        drop(state);

        info!(
            status = %report.status,
            brightness = report.brightness,
            power_w = report.current_power,
            "Light updated"
        );
        metrics::record_light(&report);
        metrics::record_update();
        report
    }

    async fn watch(&self) -> (Uuid, broadcast::Receiver<WsMessage>, LightReport) {
        let (state, report) = self.read().await;
        let (id, rx) = self.events.subscribe();
        drop(state);

        metrics::record_light(&report);
        (id, rx, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, devices::Device, models::PowerStatus};
    use chrono::{Duration, TimeZone, Utc};

    fn light() -> (Arc<ManualClock>, SmartLight) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
        ));
        let light = SmartLight::new(
            PowerProfile::default(),
            clock.clone(),
            Arc::new(EventBus::new()),
        );
        (clock, light)
    }

    #[tokio::test]
    async fn status_read_advances_energy() {
        let (clock, light) = light();
        clock.advance(Duration::hours(2));

        let report = light.get_status().await;
        assert_eq!(report.status, PowerStatus::Off);
        assert!((report.energy_consumed - 1.0).abs() < 1e-9);

        // Polling again at the same instant bills nothing more.
        let again = light.get_status().await;
        assert_eq!(again.energy_consumed, report.energy_consumed);
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let (_, light) = light();
        let report = light
            .apply(LightUpdate {
                status: None,
                brightness: Some(80),
            })
            .await;
        assert_eq!(report.status, PowerStatus::Off);
        assert_eq!(report.brightness, 80);
        assert_eq!(report.current_power, 0.5);

        let report = light
            .apply(LightUpdate {
                status: Some(PowerStatus::On),
                brightness: None,
            })
            .await;
        assert_eq!(report.brightness, 80);
        assert_eq!(report.current_power, 8.0);
    }

    #[tokio::test]
    async fn concurrent_reads_bill_each_interval_once() {
        let (clock, light) = light();
        let light = Arc::new(light);
        light
            .apply(LightUpdate {
                status: Some(PowerStatus::On),
                brightness: Some(100),
            })
            .await;
        clock.advance(Duration::minutes(30));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let light = light.clone();
                tokio::spawn(async move { light.get_status().await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let report = light.get_status().await;
        assert!((report.energy_consumed - 5.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn concurrent_updates_publish_in_apply_order() {
        let (_, light) = light();
        let light = Arc::new(light);
        let (_, mut rx, _) = light.watch().await;

        let tasks: Vec<_> = (0..20u8)
            .map(|brightness| {
                let light = light.clone();
                tokio::spawn(async move {
                    light
                        .apply(LightUpdate {
                            status: None,
                            brightness: Some(brightness),
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let mut last = None;
        while let Ok(WsMessage::Updated(update)) = rx.try_recv() {
            last = Some(update.report.brightness);
        }
        let current = light.get_status().await;
        assert_eq!(last, Some(current.brightness));
    }

    #[tokio::test]
    async fn watch_snapshot_precedes_later_updates() {
        let (_, light) = light();
        let (_, mut rx, snapshot) = light.watch().await;
        assert_eq!(snapshot.brightness, 50);

        light
            .apply(LightUpdate {
                status: Some(PowerStatus::On),
                brightness: Some(70),
            })
            .await;

        match rx.try_recv().unwrap() {
            WsMessage::Updated(update) => assert_eq!(update.report.brightness, 70),
            other => panic!("unexpected message: {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }
}
