use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::app::{Result, RunnelError};
use crate::domain::Feed;
use crate::updater::Updater;

pub const DEFAULT_WORKERS: usize = 10;

/// Runs [`Updater::update`] over many feeds with bounded concurrency.
///
/// Each feed is moved into its own task, so no feed is ever updated twice
/// at once.
pub struct ParallelUpdater {
    updater: Arc<Updater>,
    semaphore: Arc<Semaphore>,
}

impl ParallelUpdater {
    pub fn new(updater: Arc<Updater>) -> Self {
        Self::with_workers(updater, DEFAULT_WORKERS)
    }

    pub fn with_workers(updater: Arc<Updater>, workers: usize) -> Self {
        Self {
            updater,
            semaphore: Arc::new(Semaphore::new(workers.max(1))),
        }
    }

    /// Update every feed and hand each one back with the number of items it
    /// admitted. Results keep the input order and always hold every feed: a
    /// feed whose task panicked comes back as it was before the update.
    pub async fn update_all(&self, feeds: Vec<Feed>) -> Vec<(Feed, Result<usize>)> {
        let mut handles = Vec::with_capacity(feeds.len());

        for mut feed in feeds {
            let original = feed.clone();
            let updater = self.updater.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                // The semaphore is never closed.
                let _permit = semaphore.acquire().await.ok();

                let before = feed.items().len();
                let result = updater
                    .update(&mut feed)
                    .await
                    .map(|()| feed.items().len() - before);
                (feed, result)
            });

            handles.push((original, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (original, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!(url = %original.update_url, "Task join error: {}", e);
                    results.push((original, Err(RunnelError::TaskFailed(e.to_string()))));
                }
            }
        }

        results
    }
}
