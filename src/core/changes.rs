//! Change feed - Broadcasts table mutations so views and caches re-fetch.

use serde::Serialize;
use std::collections::HashSet;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

/// Default number of buffered events per subscriber
pub const DEFAULT_CAPACITY: usize = 256;

/// Tables whose mutations are published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    /// Members
    Membres,
    /// Cotisations and their types
    Cotisations,
    /// Savings
    Epargnes,
    /// Loans
    Prets,
    /// Sanctions and their types
    Sanctions,
    /// Meetings and attendance
    Reunions,
    /// Cash-register operations and closes
    FondCaisse,
    /// Tontine attributions
    Tontine,
    /// Matches and player statistics
    Sport,
    /// Notification templates
    Notifications,
}

/// Kind of mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Rows inserted
    Insert,
    /// Rows updated
    Update,
    /// Rows deleted
    Delete,
    /// Events were dropped for a slow subscriber; everything must be re-fetched
    Resync,
}

/// A published mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    /// Mutated table
    pub table: Table,
    /// Mutation kind
    pub kind: ChangeKind,
}

/// Publisher side of the feed, cheap to clone.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeFeed {
    /// Creates a feed buffering `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a mutation; having no subscriber is not an error.
    pub fn publish(&self, table: Table, kind: ChangeKind) {
        let delivered = self.sender.send(ChangeEvent { table, kind }).unwrap_or(0);
        debug!("Change {kind:?} on {table:?} delivered to {delivered} subscriber(s)");
    }

    /// Subscribes to mutations of the given tables.
    #[must_use]
    pub fn subscribe(&self, tables: &[Table]) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            tables: tables.iter().copied().collect(),
        }
    }
}

/// Receiving side filtered to a set of tables.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    tables: HashSet<Table>,
}

impl Subscription {
    /// Waits for the next relevant event; `None` once every publisher is gone.
    ///
    /// When the subscriber lagged behind, a [`ChangeKind::Resync`] event is
    /// returned instead of the dropped ones.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.tables.contains(&event.table) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Change subscriber lagged, {skipped} event(s) dropped");
                    let table = self.tables.iter().next().copied()?;
                    return Some(ChangeEvent {
                        table,
                        kind: ChangeKind::Resync,
                    });
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscription_filters_tables() {
        let feed = ChangeFeed::default();
        let mut sub = feed.subscribe(&[Table::Cotisations]);

        feed.publish(Table::Membres, ChangeKind::Insert);
        feed.publish(Table::Cotisations, ChangeKind::Update);

        assert_eq!(
            sub.next().await,
            Some(ChangeEvent {
                table: Table::Cotisations,
                kind: ChangeKind::Update
            })
        );
    }

    #[tokio::test]
    async fn test_publish_without_subscriber() {
        let feed = ChangeFeed::new(4);
        feed.publish(Table::Prets, ChangeKind::Delete);
    }

    #[tokio::test]
    async fn test_lagged_subscriber_gets_resync() {
        let feed = ChangeFeed::new(2);
        let mut sub = feed.subscribe(&[Table::Epargnes]);
        for _ in 0..5 {
            feed.publish(Table::Epargnes, ChangeKind::Insert);
        }
        let event = sub.next().await;
        assert_eq!(event.map(|e| e.kind), Some(ChangeKind::Resync));
    }

    #[tokio::test]
    async fn test_closed_feed_ends_subscription() {
        let feed = ChangeFeed::new(4);
        let mut sub = feed.subscribe(&[Table::Sport]);
        drop(feed);
        assert_eq!(sub.next().await, None);
    }
}
