//! Time-driven dispatcher of ready order slices, with bounded retry.
//!
//! Snapshot-then-release discipline per the concurrency model: pending
//! slices due for dispatch are collected under `state`'s lock, the lock is
//! released, and only then is the execution callback invoked. The callback
//! may block on I/O but must never call back into this scheduler — its
//! signature gives it no handle to do so.

use crate::error::ExecutionError;
use crate::slicer::{OrderSlice, SliceStatus};
use parking_lot::Mutex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

pub type ExecuteFuture = Pin<Box<dyn Future<Output = Result<(), ExecutionError>> + Send>>;
pub type ExecuteCallback = Arc<dyn Fn(OrderSlice) -> ExecuteFuture + Send + Sync>;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SchedulerStats {
    pub total: u64,
    pub executed: u64,
    pub failed: u64,
    pub retries: u64,
    pub avg_latency_ms: f64,
}

struct SchedulerState {
    pending: Vec<OrderSlice>,
    stats: SchedulerStats,
    running: bool,
}

/// Drives `OrderSlice` execution on a ticker of period `check_interval`.
pub struct ExecutionScheduler {
    state: Arc<Mutex<SchedulerState>>,
    check_interval: Duration,
    max_retries: u32,
    retry_delay: Duration,
    callback: Arc<Mutex<Option<ExecuteCallback>>>,
    executed_tx: mpsc::UnboundedSender<OrderSlice>,
    executed_rx: Mutex<Option<mpsc::UnboundedReceiver<OrderSlice>>>,
    error_tx: mpsc::UnboundedSender<(OrderSlice, ExecutionError)>,
    error_rx: Mutex<Option<mpsc::UnboundedReceiver<(OrderSlice, ExecutionError)>>>,
    stop: Arc<Notify>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ExecutionScheduler {
    pub fn new(check_interval: Duration, max_retries: u32, retry_delay: Duration) -> Self {
        let (executed_tx, executed_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        Self {
            state: Arc::new(Mutex::new(SchedulerState {
                pending: Vec::new(),
                stats: SchedulerStats::default(),
                running: false,
            })),
            check_interval,
            max_retries,
            retry_delay,
            callback: Arc::new(Mutex::new(None)),
            executed_tx,
            executed_rx: Mutex::new(Some(executed_rx)),
            error_tx,
            error_rx: Mutex::new(Some(error_rx)),
            stop: Arc::new(Notify::new()),
            task: Mutex::new(None),
        }
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    pub fn add_slices(&self, slices: Vec<OrderSlice>) {
        let mut state = self.state.lock();
        state.stats.total += slices.len() as u64;
        state.pending.extend(slices);
    }

    pub fn set_execution_callback(&self, callback: ExecuteCallback) {
        *self.callback.lock() = Some(callback);
    }

    pub fn take_executed_receiver(&self) -> Option<mpsc::UnboundedReceiver<OrderSlice>> {
        self.executed_rx.lock().take()
    }

    pub fn take_error_receiver(
        &self,
    ) -> Option<mpsc::UnboundedReceiver<(OrderSlice, ExecutionError)>> {
        self.error_rx.lock().take()
    }

    pub fn stats(&self) -> SchedulerStats {
        self.state.lock().stats
    }

    /// Marks every `Pending` slice `Canceled` and returns how many were affected.
    pub fn cancel_pending_slices(&self) -> usize {
        let mut state = self.state.lock();
        let mut count = 0;
        for slice in state.pending.iter_mut() {
            if slice.status == SliceStatus::Pending {
                slice.status = SliceStatus::Canceled;
                count += 1;
            }
        }
        count
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Starts the tick task. Idempotent start is rejected with `StateError`.
    pub fn start(self: &Arc<Self>) -> Result<(), ExecutionError> {
        {
            let mut state = self.state.lock();
            if state.running {
                return Err(ExecutionError::State("scheduler already running".into()));
            }
            state.running = true;
        }

        let scheduler = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(scheduler.check_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => scheduler.tick().await,
                    _ = scheduler.stop.notified() => break,
                }
            }
        });
        *self.task.lock() = Some(handle);
        Ok(())
    }

    /// Stops the tick task. In-flight callbacks run to completion.
    pub fn stop(&self) -> Result<(), ExecutionError> {
        let mut state = self.state.lock();
        if !state.running {
            return Err(ExecutionError::State("scheduler already stopped".into()));
        }
        state.running = false;
        drop(state);
        self.stop.notify_one();
        Ok(())
    }

    async fn tick(&self) {
        let now = chrono::Utc::now();

        // Snapshot due slices under the lock, then release it before any
        // callback invocation or awaiting.
        let due: Vec<OrderSlice> = {
            let mut state = self.state.lock();
            let mut due = Vec::new();
            for slice in state.pending.iter_mut() {
                if slice.status == SliceStatus::Pending && slice.scheduled_time <= now {
                    slice.status = SliceStatus::Sent;
                    due.push(slice.clone());
                }
            }
            due
        };

        let Some(callback) = self.callback.lock().clone() else {
            return;
        };

        for mut slice in due {
            let started = std::time::Instant::now();
            let mut attempt = 0;
            let outcome = loop {
                attempt += 1;
                match callback(slice.clone()).await {
                    Ok(()) => break Ok(()),
                    Err(err) if attempt <= self.max_retries => {
                        {
                            let mut state = self.state.lock();
                            state.stats.retries += 1;
                        }
                        tokio::time::sleep(self.retry_delay).await;
                        let _ = &err;
                    }
                    Err(err) => break Err(err),
                }
            };
            slice.attempts = attempt;

            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
            let mut state = self.state.lock();
            match outcome {
                Ok(()) => {
                    slice.status = SliceStatus::Filled;
                    self.update_slice(&mut state, &slice);
                    state.stats.executed += 1;
                    state.stats.avg_latency_ms = running_average(
                        state.stats.avg_latency_ms,
                        state.stats.executed,
                        latency_ms,
                    );
                    drop(state);
                    let _ = self.executed_tx.send(slice);
                }
                Err(err) => {
                    slice.status = SliceStatus::Canceled;
                    self.update_slice(&mut state, &slice);
                    state.stats.failed += 1;
                    drop(state);
                    let _ = self.error_tx.send((slice, err));
                }
            }
        }
    }

    fn update_slice(&self, state: &mut SchedulerState, updated: &OrderSlice) {
        if let Some(slot) = state
            .pending
            .iter_mut()
            .find(|s| s.slice_id == updated.slice_id)
        {
            *slot = updated.clone();
        }
    }
}

fn running_average(prev_avg: f64, count: u64, new_value: f64) -> f64 {
    if count == 0 {
        return new_value;
    }
    prev_avg + (new_value - prev_avg) / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slicer::OrderSlicer;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn past_due_slices(n: u32) -> Vec<OrderSlice> {
        let mut next_id = 0;
        let slicer = OrderSlicer::new_time_weighted(
            1,
            dec!(100) * rust_decimal::Decimal::from(n),
            n,
            chrono::Utc::now() - chrono::Duration::seconds(10),
            chrono::Utc::now() - chrono::Duration::seconds(5),
            &mut next_id,
        )
        .unwrap();
        slicer.get_slices()
    }

    #[tokio::test]
    async fn tick_executes_due_slices_and_reports_success() {
        let scheduler = Arc::new(ExecutionScheduler::new(
            Duration::from_millis(10),
            1,
            Duration::from_millis(1),
        ));
        scheduler.add_slices(past_due_slices(2));

        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        scheduler.set_execution_callback(Arc::new(move |_slice| {
            let calls = Arc::clone(&calls_clone);
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }));

        scheduler.tick().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let stats = scheduler.stats();
        assert_eq!(stats.executed, 2);
        assert_eq!(stats.failed, 0);
    }

    #[tokio::test]
    async fn tick_retries_then_cancels_after_exhaustion() {
        let scheduler = Arc::new(ExecutionScheduler::new(
            Duration::from_millis(10),
            2,
            Duration::from_millis(1),
        ));
        scheduler.add_slices(past_due_slices(1));

        scheduler.set_execution_callback(Arc::new(|_slice| {
            Box::pin(async move { Err(ExecutionError::Execution { attempts: 1, reason: "boom".into() }) })
        }));

        scheduler.tick().await;

        let stats = scheduler.stats();
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.retries, 2);
    }

    #[test]
    fn cancel_pending_slices_marks_only_pending() {
        let scheduler = ExecutionScheduler::new(Duration::from_secs(1), 0, Duration::from_millis(1));
        let mut slices = past_due_slices(2);
        slices[0].status = SliceStatus::Filled;
        scheduler.add_slices(slices);

        let count = scheduler.cancel_pending_slices();
        assert_eq!(count, 1);
    }
}
