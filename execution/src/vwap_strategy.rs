//! Composes [`OrderSlicer`], [`VwapTracker`] and [`ExecutionScheduler`] into
//! a single VWAP execution algorithm.

use crate::error::ExecutionError;
use crate::scheduler::{ExecuteCallback, ExecutionScheduler};
use crate::slicer::OrderSlicer;
use crate::vwap::VwapTracker;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VwapStatus {
    Pending,
    Running,
    Completed,
    Canceled,
    Failed,
}

impl VwapStatus {
    fn to_u8(self) -> u8 {
        match self {
            VwapStatus::Pending => 0,
            VwapStatus::Running => 1,
            VwapStatus::Completed => 2,
            VwapStatus::Canceled => 3,
            VwapStatus::Failed => 4,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => VwapStatus::Pending,
            1 => VwapStatus::Running,
            2 => VwapStatus::Completed,
            3 => VwapStatus::Canceled,
            _ => VwapStatus::Failed,
        }
    }
}

pub enum SliceMethod<'a> {
    TimeWeighted { slice_count: u32 },
    VolumeWeighted { profile: &'a [f64], interval: Duration },
}

/// A single-shot VWAP execution: one parent order, sliced and scheduled once.
pub struct VwapStrategy {
    parent_id: u64,
    slicer: OrderSlicer,
    tracker: Arc<VwapTracker>,
    scheduler: Arc<ExecutionScheduler>,
    status: AtomicU8,
    started: bool,
}

impl VwapStrategy {
    pub fn initialize(
        parent_id: u64,
        total_quantity: Decimal,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        method: SliceMethod<'_>,
        check_interval: StdDuration,
        max_retries: u32,
        retry_delay: StdDuration,
    ) -> Result<Self, ExecutionError> {
        let mut next_slice_id = parent_id * 1_000_000;
        let slicer = match method {
            SliceMethod::TimeWeighted { slice_count } => OrderSlicer::new_time_weighted(
                parent_id,
                total_quantity,
                slice_count,
                start,
                end,
                &mut next_slice_id,
            ),
            SliceMethod::VolumeWeighted { profile, interval } => OrderSlicer::new_volume_weighted(
                parent_id,
                total_quantity,
                profile,
                start,
                interval,
                &mut next_slice_id,
            ),
        }
        .map_err(|e| ExecutionError::Config(e.to_string()))?;

        let scheduler = Arc::new(ExecutionScheduler::new(check_interval, max_retries, retry_delay));
        scheduler.add_slices(slicer.get_slices());

        Ok(Self {
            parent_id,
            slicer,
            tracker: Arc::new(VwapTracker::new()),
            scheduler,
            status: AtomicU8::new(VwapStatus::Pending.to_u8()),
            started: false,
        })
    }

    pub fn parent_id(&self) -> u64 {
        self.parent_id
    }

    pub fn status(&self) -> VwapStatus {
        VwapStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    fn set_status(&self, status: VwapStatus) {
        self.status.store(status.to_u8(), Ordering::SeqCst);
    }

    /// Starts scheduled execution. `on_slice_execute` is the adapter that
    /// actually routes a slice to the order-routing layer; the scheduler
    /// invokes it outside its own lock, and it must not call back into this
    /// strategy or the scheduler.
    ///
    /// Also spawns a monitor task that polls [`poll_completion`](Self::poll_completion)
    /// on the scheduler's own check interval, flipping the strategy to
    /// `Completed`/`Failed` once every slice has resolved without the caller
    /// having to drive that transition by hand.
    pub fn start(self: &Arc<Self>, on_slice_execute: ExecuteCallback) -> Result<(), ExecutionError> {
        if self.status() != VwapStatus::Pending {
            return Err(ExecutionError::State(
                "VWAP strategy can only start from Pending".into(),
            ));
        }
        self.scheduler.set_execution_callback(on_slice_execute);
        self.scheduler.start()?;
        self.set_status(VwapStatus::Running);

        let monitored = Arc::clone(self);
        let interval = self.scheduler.check_interval();
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if monitored.status() != VwapStatus::Running {
                    break;
                }
                monitored.poll_completion();
                if monitored.status() != VwapStatus::Running {
                    break;
                }
            }
        });

        Ok(())
    }

    /// Feeds a real fill into the VWAP tracker as execution proceeds.
    pub fn record_trade(&self, price: Decimal, volume: Decimal, timestamp: DateTime<Utc>) {
        self.tracker.record_trade(price, volume, timestamp);
    }

    /// Fraction of the parent quantity no longer pending/in-flight.
    pub fn progress(&self) -> f64 {
        let total = self.slicer.total_quantity();
        if total.is_zero() {
            return 1.0;
        }
        let remaining = self.scheduler_remaining();
        let done = total - remaining;
        (done / total).to_string().parse().unwrap_or(1.0)
    }

    fn scheduler_remaining(&self) -> Decimal {
        // The scheduler owns slice status; the slicer's own bookkeeping is
        // only used for the initial allocation, so remaining quantity is
        // derived from stats tracked by the scheduler via executed count.
        let stats = self.scheduler.stats();
        let total_slices = self.slicer.slices().len() as u64;
        if total_slices == 0 {
            return Decimal::ZERO;
        }
        let done_slices = stats.executed;
        let fraction_remaining = 1.0 - (done_slices as f64 / total_slices as f64);
        self.slicer.total_quantity() * Decimal::try_from(fraction_remaining).unwrap_or(Decimal::ZERO)
    }

    /// Completes once all slices have executed; call periodically (e.g. from
    /// a monitor task) to advance the status FSM.
    pub fn poll_completion(&self) {
        if self.status() != VwapStatus::Running {
            return;
        }
        let stats = self.scheduler.stats();
        let total_slices = self.slicer.slices().len() as u64;
        if total_slices > 0 && stats.executed + stats.failed >= total_slices {
            if stats.failed > 0 && stats.executed == 0 {
                self.set_status(VwapStatus::Failed);
            } else {
                self.set_status(VwapStatus::Completed);
            }
        }
    }

    pub fn cancel(&self) -> Result<(), ExecutionError> {
        self.scheduler.cancel_pending_slices();
        if self.scheduler.is_running() {
            self.scheduler.stop()?;
        }
        self.set_status(VwapStatus::Canceled);
        Ok(())
    }

    pub fn stop(&self) -> Result<(), ExecutionError> {
        self.cancel()
    }

    pub fn vwap(&self) -> Decimal {
        self.tracker.vwap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn initializes_in_pending_status() {
        let strategy = VwapStrategy::initialize(
            1,
            dec!(1000),
            Utc::now(),
            Utc::now() + Duration::seconds(400),
            SliceMethod::TimeWeighted { slice_count: 4 },
            StdDuration::from_millis(10),
            3,
            StdDuration::from_millis(1),
        )
        .unwrap();

        assert_eq!(strategy.status(), VwapStatus::Pending);
    }

    #[tokio::test]
    async fn start_transitions_to_running() {
        let strategy = Arc::new(
            VwapStrategy::initialize(
                1,
                dec!(1000),
                Utc::now() - Duration::seconds(10),
                Utc::now() - Duration::seconds(5),
                SliceMethod::TimeWeighted { slice_count: 2 },
                StdDuration::from_millis(5),
                1,
                StdDuration::from_millis(1),
            )
            .unwrap(),
        );

        strategy
            .start(Arc::new(|_slice| Box::pin(async move { Ok(()) })))
            .unwrap();

        assert_eq!(strategy.status(), VwapStatus::Running);
        strategy.cancel().unwrap();
        assert_eq!(strategy.status(), VwapStatus::Canceled);
    }

    #[tokio::test]
    async fn monitor_task_completes_strategy_once_all_slices_execute() {
        let strategy = Arc::new(
            VwapStrategy::initialize(
                1,
                dec!(1000),
                Utc::now() - Duration::seconds(10),
                Utc::now() - Duration::seconds(5),
                SliceMethod::TimeWeighted { slice_count: 2 },
                StdDuration::from_millis(5),
                1,
                StdDuration::from_millis(1),
            )
            .unwrap(),
        );

        strategy
            .start(Arc::new(|_slice| Box::pin(async move { Ok(()) })))
            .unwrap();

        tokio::time::sleep(StdDuration::from_millis(200)).await;
        assert_eq!(strategy.status(), VwapStatus::Completed);
    }
}
