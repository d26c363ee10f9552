//! Change-feed worker.
//!
//! Consumes one feed subscription, collects the tables that changed within
//! a debounce window, then refreshes each of them once. A subscription
//! that ends on its own is reported to the user.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::synchronizer::Synchronizer;
use crate::backend::{FeedSubscription, Table};

/// Owns the worker task. Dropping or aborting it also drops the
/// subscription, which closes the feed channel.
pub struct ResyncHandle {
    task: JoinHandle<()>,
}

impl ResyncHandle {
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for ResyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn spawn_resync_worker(
    subscription: FeedSubscription,
    synchronizer: Arc<Synchronizer>,
    debounce: Duration,
) -> ResyncHandle {
    ResyncHandle {
        task: tokio::spawn(run(subscription, synchronizer, debounce)),
    }
}

async fn run(mut subscription: FeedSubscription, synchronizer: Arc<Synchronizer>, debounce: Duration) {
    info!("Change feed worker started");
    let mut pending: BTreeSet<Table> = BTreeSet::new();
    let mut deadline = Instant::now();

    loop {
        if pending.is_empty() {
            match subscription.next().await {
                Some(change) => {
                    debug!("{:?} on {}", change.kind, change.table);
                    pending.insert(change.table);
                    deadline = Instant::now() + debounce;
                }
                None => {
                    synchronizer.report_feed_lost();
                    break;
                }
            }
        } else {
            tokio::select! {
                change = subscription.next() => match change {
                    Some(change) => {
                        debug!("{:?} on {}", change.kind, change.table);
                        pending.insert(change.table);
                    }
                    None => {
                        flush(&mut pending, &synchronizer).await;
                        synchronizer.report_feed_lost();
                        break;
                    }
                },
                _ = tokio::time::sleep_until(deadline) => {
                    flush(&mut pending, &synchronizer).await;
                }
            }
        }
    }

    info!("Change feed worker shutting down");
}

async fn flush(pending: &mut BTreeSet<Table>, synchronizer: &Synchronizer) {
    let tables: Vec<Table> = std::mem::take(pending).into_iter().collect();
    debug!("Resyncing {} table(s)", tables.len());
    synchronizer.refresh_many(&tables).await;
}
