//! Change notification for mirrored collections

#[cfg(test)]
use mockall::automock;
use tokio::sync::broadcast;
use tracing::debug;

/// Collections of the mirror observers can watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Realm,
    Champions,
    ChampionSkins,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Realm => "realm",
            Collection::Champions => "champion",
            Collection::ChampionSkins => "champion/skin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOperation {
    Insert,
    Delete,
}

/// A collection changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub operation: ChangeOperation,
}

impl ChangeEvent {
    pub fn new(collection: Collection, operation: ChangeOperation) -> Self {
        Self {
            collection,
            operation,
        }
    }
}

/// Delivers change events to registered observers
#[cfg_attr(test, automock)]
pub trait ChangeNotifier: Send + Sync {
    fn notify_change(&self, event: ChangeEvent);
}

/// Notifier backed by a broadcast channel
pub struct BroadcastNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl BroadcastNotifier {
    /// Capacity is raised to at least one
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register an observer
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl ChangeNotifier for BroadcastNotifier {
    fn notify_change(&self, event: ChangeEvent) {
        match self.sender.send(event) {
            Ok(observers) => debug!(
                "Notified {} observer(s) of {:?} on {}",
                observers,
                event.operation,
                event.collection.as_str()
            ),
            // No observers registered
            Err(_) => debug!("No observers for {}", event.collection.as_str()),
        }
    }
}
