use std::sync::Arc;

use tokio::sync::watch;

use crate::domain::{Account, Transaction};

/// The whole ledger as of one moment. Never mutated after publication;
/// a change produces a new snapshot.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// Increases by one with every publication
    pub version: u64,
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
}

/// Broadcasts "current collection changed" to any number of readers.
///
/// Readers only ever see complete snapshots: a publication swaps the
/// `Arc` atomically, so there is no partially applied insert or delete.
pub struct SnapshotFeed {
    sender: watch::Sender<Arc<LedgerSnapshot>>,
}

impl SnapshotFeed {
    pub fn new(accounts: Vec<Account>, transactions: Vec<Transaction>) -> Self {
        let (sender, _) = watch::channel(Arc::new(LedgerSnapshot {
            version: 0,
            accounts,
            transactions,
        }));
        Self { sender }
    }

    /// Replace the current snapshot and wake subscribers.
    pub fn publish(
        &self,
        accounts: Vec<Account>,
        transactions: Vec<Transaction>,
    ) -> Arc<LedgerSnapshot> {
        let version = self.sender.borrow().version + 1;
        let snapshot = Arc::new(LedgerSnapshot {
            version,
            accounts,
            transactions,
        });
        // send_replace stores the value even while nobody is subscribed.
        self.sender.send_replace(Arc::clone(&snapshot));
        tracing::debug!(
            version,
            transactions = snapshot.transactions.len(),
            "published ledger snapshot"
        );
        snapshot
    }

    pub fn current(&self) -> Arc<LedgerSnapshot> {
        Arc::clone(&self.sender.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<LedgerSnapshot>> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_bumps_version() {
        let feed = SnapshotFeed::new(Vec::new(), Vec::new());
        assert_eq!(feed.current().version, 0);

        feed.publish(Vec::new(), vec![Transaction::income(100, "cash")]);
        let current = feed.current();

        assert_eq!(current.version, 1);
        assert_eq!(current.transactions.len(), 1);
    }

    #[test]
    fn test_old_snapshot_is_untouched() {
        let feed = SnapshotFeed::new(Vec::new(), vec![Transaction::income(100, "cash")]);
        let before = feed.current();

        feed.publish(Vec::new(), Vec::new());

        assert_eq!(before.transactions.len(), 1);
        assert!(feed.current().transactions.is_empty());
    }

    #[tokio::test]
    async fn test_subscriber_sees_latest() {
        let feed = SnapshotFeed::new(Vec::new(), Vec::new());
        let mut receiver = feed.subscribe();

        feed.publish(Vec::new(), vec![Transaction::expense(50, "cash")]);
        feed.publish(Vec::new(), vec![Transaction::expense(75, "cash")]);

        receiver.changed().await.unwrap();
        let latest = receiver.borrow_and_update().clone();
        assert_eq!(latest.version, 2);
        assert_eq!(latest.transactions[0].amount, 75);
    }
}
