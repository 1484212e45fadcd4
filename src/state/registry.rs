//! Topic-keyed fan-out of push events to SSE and WebSocket viewers.

use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Stream of push events a viewer can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Per-room game state, pushed every game tick.
    Game(i64),
    /// Room feed snapshots.
    RoomsFeed,
    /// Global leaderboard snapshots.
    GlobalLeaderboard,
}

/// Simple broadcast hub wrapper backing a single topic.
pub struct TopicHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl TopicHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, returning how many received it.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of live receivers.
    pub fn subscribers(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Registry of topic hubs. A viewer unsubscribes by dropping its receiver.
pub struct SubscriptionRegistry {
    hubs: DashMap<Topic, TopicHub>,
    capacity: usize,
}

impl SubscriptionRegistry {
    /// Create an empty registry whose hubs buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            hubs: DashMap::new(),
            capacity,
        }
    }

    /// Subscribe to `topic`, creating its hub on first use.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<ServerEvent> {
        self.hubs
            .entry(topic)
            .or_insert_with(|| TopicHub::new(self.capacity))
            .subscribe()
    }

    /// Publish to `topic`. Topics nobody watches are skipped.
    pub fn publish(&self, topic: Topic, event: ServerEvent) -> usize {
        self.hubs
            .get(&topic)
            .map(|hub| hub.broadcast(event))
            .unwrap_or(0)
    }

    /// Whether at least one receiver listens on `topic`.
    pub fn has_subscribers(&self, topic: Topic) -> bool {
        self.hubs
            .get(&topic)
            .is_some_and(|hub| hub.subscribers() > 0)
    }

    /// Rooms with at least one game viewer.
    pub fn active_game_rooms(&self) -> Vec<i64> {
        let mut rooms: Vec<i64> = self
            .hubs
            .iter()
            .filter(|entry| entry.value().subscribers() > 0)
            .filter_map(|entry| match entry.key() {
                Topic::Game(room_id) => Some(*room_id),
                _ => None,
            })
            .collect();
        rooms.sort_unstable();
        rooms
    }

    /// Drop hubs that lost all their receivers, returning how many were removed.
    pub fn prune(&self) -> usize {
        let before = self.hubs.len();
        self.hubs.retain(|_, hub| hub.subscribers() > 0);
        before.saturating_sub(self.hubs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(data: &str) -> ServerEvent {
        ServerEvent {
            event: Some("game_state".into()),
            data: data.into(),
        }
    }

    #[tokio::test]
    async fn published_events_reach_topic_subscribers_only() {
        let registry = SubscriptionRegistry::new(4);
        let mut room_one = registry.subscribe(Topic::Game(1));
        let mut room_two = registry.subscribe(Topic::Game(2));

        assert_eq!(registry.publish(Topic::Game(1), event("one")), 1);

        assert_eq!(room_one.recv().await.unwrap().data, "one");
        assert!(room_two.try_recv().is_err());
    }

    #[test]
    fn unwatched_topics_are_skipped() {
        let registry = SubscriptionRegistry::new(4);
        assert_eq!(registry.publish(Topic::RoomsFeed, event("{}")), 0);
        assert!(!registry.has_subscribers(Topic::RoomsFeed));
    }

    #[test]
    fn dropping_receivers_deactivates_rooms() {
        let registry = SubscriptionRegistry::new(4);
        let first = registry.subscribe(Topic::Game(9));
        let second = registry.subscribe(Topic::Game(3));
        let _feed = registry.subscribe(Topic::RoomsFeed);
        assert_eq!(registry.active_game_rooms(), vec![3, 9]);

        drop(first);
        assert_eq!(registry.active_game_rooms(), vec![3]);
        assert_eq!(registry.prune(), 1);

        drop(second);
        assert!(registry.active_game_rooms().is_empty());
        assert_eq!(registry.prune(), 1);
        assert!(registry.has_subscribers(Topic::RoomsFeed));
    }
}
