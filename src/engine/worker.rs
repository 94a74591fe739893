// src/engine/worker.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::RevLookupResult;
use crate::print;
use crate::proxy::ProxyDescriptor;
use crate::report::ResultRecord;
use crate::target::{Target, TargetKind};
use crate::utils::backoff::jittered;

use super::RunContext;

/// How long a worker waits on an empty queue before concluding the run is
/// over.
const DEQUEUE_WAIT: Duration = Duration::from_secs(1);

/// Backoff after finding the proxy pool permanently empty.
const NO_PROXY_BACKOFF: Duration = Duration::from_secs(1);

/// Worker loop: pull targets until the queue stays empty for a full
/// dequeue wait, then exit.
pub async fn run(worker_id: usize, ctx: Arc<RunContext>) {
    loop {
        let target = match ctx.work.pop(DEQUEUE_WAIT).await {
            Some(target) => target,
            None => break,
        };

        let route = match ctx.proxies.acquire().await {
            Some(route) => route,
            None => {
                // Exhausted pool: hand the target back without marking the
                // dequeue done, back off, try again.
                ctx.work.push(target).await;
                sleep(NO_PROXY_BACKOFF).await;
                continue;
            }
        };

        match process(&ctx, &target, &route).await {
            Ok(record) => {
                if record.success {
                    print::status_success(&record.target, record.kind, record.count);
                } else {
                    print::status_failed(&record.target, record.kind);
                }
                let _ = ctx.results.send(record);
                sleep(jittered(ctx.config.timing.target_pause_secs)).await;
            }
            Err(e) => {
                // The attempt failed outright: record the failure AND give
                // the target another chance. Both happen, so the failure
                // tally counts attempts, not distinct targets.
                warn!("Worker {}: {} failed: {}; requeueing", worker_id, target.value, e);
                print::status_failed(&target.value, target.kind);
                let _ = ctx.results.send(ResultRecord {
                    target: target.value.clone(),
                    count: None,
                    success: false,
                    kind: target.kind,
                });
                ctx.work.push(target).await;
            }
        }

        ctx.proxies.release(route).await;
        ctx.work.task_done();
    }

    debug!("Worker {} exiting, queue drained", worker_id);
}

/// One processing attempt: lookup, politeness pause, then download when
/// the lookup produced a count.
async fn process(
    ctx: &RunContext,
    target: &Target,
    route: &ProxyDescriptor,
) -> RevLookupResult<ResultRecord> {
    print::status_processing(&target.value, target.kind);

    let count = match target.kind {
        TargetKind::Ip => ctx.lookup.ip_count(&target.value, route).await,
        TargetKind::Domain => ctx.lookup.domain_count(&target.value, route).await,
    };

    // Pause after every lookup, found or not.
    sleep(jittered(ctx.config.timing.lookup_pause_secs)).await;

    let record = match count {
        Some(total) => {
            let success = match target.kind {
                TargetKind::Ip => {
                    ctx.download
                        .ip_results(&target.value, total, route, &ctx.output)
                        .await?
                }
                TargetKind::Domain => {
                    ctx.download
                        .domain_results(&target.value, total, route, &ctx.output)
                        .await?
                }
            };
            ResultRecord {
                target: target.value.clone(),
                count: Some(total),
                success,
                kind: target.kind,
            }
        }
        None => ResultRecord {
            target: target.value.clone(),
            count: None,
            success: false,
            kind: target.kind,
        },
    };

    Ok(record)
}
