// utils.rs
use super::models::AppState;
use uuid::Uuid;
use tracing::info;

pub async fn cleanup_client_connection(client_id: Uuid, state: &AppState) {
    state.events.unsubscribe(&client_id);
    info!(
        "Live feed client {} disconnected, {} remaining",
        client_id,
        state.events.subscriber_count()
    );
}
