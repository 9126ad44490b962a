use crate::view::ViewSnapshot;
use tokio::sync::watch::Receiver;
use tracing::{info, instrument};

#[instrument(skip_all)]
pub async fn view_listener(mut rx: Receiver<ViewSnapshot>) {
    while rx.changed().await.is_ok() {
        let snapshot: ViewSnapshot = rx.borrow_and_update().clone();
        log_snapshot(&snapshot);
    }
}

fn log_snapshot(snapshot: &ViewSnapshot) {
    info!(
        map = %snapshot.map_state,
        query = snapshot.query,
        "🧭 Showing {} entries in {} marker(s), {} unmapped",
        snapshot.visible,
        snapshot.groups,
        snapshot.unmapped
    );

    if let Some(group) = &snapshot.selected_group {
        info!("📋 {} entries around '{}':", group.len(), group.representative().label);
        for member in group.members() {
            info!("📋   [{}] {}", member.id, member.label);
        }
    }

    if let Some(entry) = &snapshot.selected_entry {
        let date = entry.timestamp.map_or_else(|| "undated".to_string(), |timestamp| timestamp.format("%Y-%m-%d").to_string());
        match entry.position() {
            Some(position) => info!(entry_id = entry.id, "📖 '{}' at {} on {}", entry.label, position, date),
            None => info!(entry_id = entry.id, "📖 '{}' (no location) on {}", entry.label, date),
        }
    }

    if let Some(entry) = &snapshot.preview {
        info!(entry_id = entry.id, "👀 {}", entry.label);
    }
}
