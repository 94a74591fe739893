// src/engine/queue.rs
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};
use tokio::time::{timeout, Instant};

/// Joinable work queue. `push` adds an item and raises the outstanding
/// count; `task_done` lowers it; `join` resolves once every push has been
/// matched by a `task_done`. Popping alone does not change the count, so
/// a requeued item keeps the join waiting until its retry completes.
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    item_ready: Notify,
    outstanding_tx: watch::Sender<usize>,
    outstanding_rx: watch::Receiver<usize>,
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        let (outstanding_tx, outstanding_rx) = watch::channel(0);
        Self {
            items: Mutex::new(VecDeque::new()),
            item_ready: Notify::new(),
            outstanding_tx,
            outstanding_rx,
        }
    }

    pub async fn push(&self, item: T) {
        self.items.lock().await.push_back(item);
        self.outstanding_tx.send_modify(|outstanding| *outstanding += 1);
        self.item_ready.notify_one();
    }

    /// Take the next item, waiting up to `wait` for one to show up.
    pub async fn pop(&self, wait: Duration) -> Option<T> {
        let deadline = Instant::now() + wait;
        loop {
            if let Some(item) = self.items.lock().await.pop_front() {
                return Some(item);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            // A missed wakeup only costs the remainder of the wait.
            let _ = timeout(deadline - now, self.item_ready.notified()).await;
        }
    }

    /// Mark one dequeued item as fully handled.
    pub fn task_done(&self) {
        self.outstanding_tx
            .send_modify(|outstanding| *outstanding = outstanding.saturating_sub(1));
    }

    /// Wait until every pushed item (including requeues) has been marked
    /// done.
    pub async fn join(&self) {
        let mut outstanding = self.outstanding_rx.clone();
        // The sender lives inside self, so wait_for cannot fail here.
        let _ = outstanding.wait_for(|outstanding| *outstanding == 0).await;
    }

    #[cfg(test)]
    pub fn outstanding(&self) -> usize {
        *self.outstanding_rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn pop_times_out_on_an_empty_queue() {
        let queue: WorkQueue<u32> = WorkQueue::new();
        assert_eq!(queue.pop(SHORT).await, None);
    }

    #[tokio::test]
    async fn pop_returns_pushed_items_in_order() {
        let queue = WorkQueue::new();
        queue.push(1u32).await;
        queue.push(2u32).await;

        assert_eq!(queue.pop(SHORT).await, Some(1));
        assert_eq!(queue.pop(SHORT).await, Some(2));
    }

    #[tokio::test]
    async fn join_blocks_until_every_item_is_marked_done() {
        let queue = WorkQueue::new();
        queue.push(7u32).await;

        assert!(timeout(SHORT, queue.join()).await.is_err());

        assert_eq!(queue.pop(SHORT).await, Some(7));
        // Popped but not yet done: join still waits.
        assert!(timeout(SHORT, queue.join()).await.is_err());

        queue.task_done();
        assert!(timeout(SHORT, queue.join()).await.is_ok());
    }

    #[tokio::test]
    async fn requeued_item_keeps_join_waiting_until_its_retry_is_done() {
        let queue = WorkQueue::new();
        queue.push(1u32).await;

        // First attempt fails: requeue, then mark the attempt done.
        let item = queue.pop(SHORT).await.unwrap();
        queue.push(item).await;
        queue.task_done();
        assert_eq!(queue.outstanding(), 1);
        assert!(timeout(SHORT, queue.join()).await.is_err());

        // Retry succeeds.
        assert_eq!(queue.pop(SHORT).await, Some(1));
        queue.task_done();
        assert!(timeout(SHORT, queue.join()).await.is_ok());
    }

    #[tokio::test]
    async fn join_on_a_never_used_queue_returns_immediately() {
        let queue: WorkQueue<u32> = WorkQueue::new();
        assert!(timeout(SHORT, queue.join()).await.is_ok());
    }

    #[tokio::test]
    async fn pop_wakes_up_when_an_item_arrives() {
        use std::sync::Arc;

        let queue = Arc::new(WorkQueue::new());
        let popper = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.pop(Duration::from_secs(5)).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(9u32).await;

        let got = timeout(Duration::from_secs(1), popper)
            .await
            .expect("popper wakes before its deadline")
            .unwrap();
        assert_eq!(got, Some(9));
    }
}
