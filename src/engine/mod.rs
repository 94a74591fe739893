// src/engine/mod.rs
pub mod queue;
pub mod worker;

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::download::DownloadClient;
use crate::lookup::LookupClient;
use crate::output::OutputFile;
use crate::proxy::ProxyPool;
use crate::report::ResultRecord;
use crate::target::Target;

use queue::WorkQueue;

/// Everything one run's workers share, constructed by the dispatcher and
/// handed out by `Arc`. Lives exactly as long as the run.
pub struct RunContext {
    pub work: WorkQueue<Target>,
    pub results: mpsc::UnboundedSender<ResultRecord>,
    pub proxies: ProxyPool,
    pub output: Arc<OutputFile>,
    pub lookup: LookupClient,
    pub download: DownloadClient,
    pub config: Arc<RunConfig>,
}

/// Worker pool size for a run.
pub fn worker_count(threads: usize, total_targets: usize) -> usize {
    threads.min(total_targets)
}

/// Dispatch a run: enqueue every target, start the workers, wait for the
/// queue to drain, and collect the terminal records.
pub async fn run(
    config: Arc<RunConfig>,
    targets: Vec<Target>,
    output: Arc<OutputFile>,
    threads: usize,
) -> Vec<ResultRecord> {
    let total = targets.len();
    let (results_tx, mut results_rx) = mpsc::unbounded_channel();

    let descriptors = config.proxy_descriptors();
    if descriptors.iter().all(|d| d.is_direct()) {
        debug!("No upstream proxies configured; egress is direct");
    }

    let ctx = Arc::new(RunContext {
        work: WorkQueue::new(),
        results: results_tx,
        proxies: ProxyPool::new(descriptors),
        output,
        lookup: LookupClient::new(config.clone()),
        download: DownloadClient::new(config.clone()),
        config,
    });

    for target in targets {
        ctx.work.push(target).await;
    }

    let workers = worker_count(threads, total);
    info!("Starting {} workers for {} targets", workers, total);
    for worker_id in 0..workers {
        tokio::spawn(worker::run(worker_id, ctx.clone()));
    }

    // Workers are detached; each exits on its own once the queue stays
    // empty past the dequeue wait.
    ctx.work.join().await;

    // Every record for a completed item is sent before its task_done, so
    // after the join the channel holds the full run.
    let mut records = Vec::new();
    while let Ok(record) = results_rx.try_recv() {
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_count_is_clamped_to_the_target_total() {
        assert_eq!(worker_count(100, 3), 3);
        assert_eq!(worker_count(2, 50), 2);
        assert_eq!(worker_count(10, 10), 10);
        assert_eq!(worker_count(100, 0), 0);
    }
}
