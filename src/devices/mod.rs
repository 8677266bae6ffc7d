// devices/mod.rs
mod smart_light;
pub use smart_light::SmartLight;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{LightReport, LightUpdate, WsMessage};

#[async_trait::async_trait]
pub trait Device: Send + Sync {
    /// Re-derives the state (accruing energy) and returns it.
    async fn get_status(&self) -> LightReport;
    /// Applies the update and publishes it before another operation can run.
    async fn apply(&self, update: LightUpdate) -> LightReport;
    /// Subscribes to updates and returns the state they start from.
    async fn watch(&self) -> (Uuid, broadcast::Receiver<WsMessage>, LightReport);
}
