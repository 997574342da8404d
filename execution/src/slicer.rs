//! Decomposes a parent order into time- or volume-weighted child slices.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceStatus {
    Pending,
    Sent,
    Filled,
    Canceled,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderSlice {
    pub slice_id: u64,
    pub parent_id: u64,
    pub quantity: Decimal,
    pub scheduled_time: DateTime<Utc>,
    pub status: SliceStatus,
    pub attempts: u32,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SlicerError {
    #[error("slice count must be positive, got {0}")]
    InvalidSliceCount(u32),
    #[error("volume profile sums to {0}, expected within [0.99, 1.01]")]
    InvalidProfileSum(f64),
    #[error("no slice with id {0}")]
    UnknownSlice(u64),
}

/// Decomposes one parent order and tracks remaining/slice status.
#[derive(Debug)]
pub struct OrderSlicer {
    parent_id: u64,
    total_quantity: Decimal,
    slices: Vec<OrderSlice>,
}

impl OrderSlicer {
    /// Time-weighted slicing: `N` equal-ish slices over `[start, end]`,
    /// allocated via integer-bucket boundaries so `Σ qty == total` exactly.
    pub fn new_time_weighted(
        parent_id: u64,
        total_quantity: Decimal,
        slice_count: u32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        next_slice_id: &mut u64,
    ) -> Result<Self, SlicerError> {
        if slice_count == 0 {
            return Err(SlicerError::InvalidSliceCount(slice_count));
        }
        let n = Decimal::from(slice_count);
        let span = end - start;

        let mut slices = Vec::with_capacity(slice_count as usize);
        let mut prev_boundary = Decimal::ZERO;
        for i in 0..slice_count {
            let boundary = (total_quantity * Decimal::from(i + 1) / n).trunc();
            let qty = boundary - prev_boundary;
            prev_boundary = boundary;

            let offset_ms = span.num_milliseconds() * i64::from(i) / i64::from(slice_count);
            let scheduled_time = start + Duration::milliseconds(offset_ms);

            slices.push(OrderSlice {
                slice_id: *next_slice_id,
                parent_id,
                quantity: qty,
                scheduled_time,
                status: SliceStatus::Pending,
                attempts: 0,
            });
            *next_slice_id += 1;
        }

        Ok(Self {
            parent_id,
            total_quantity,
            slices,
        })
    }

    /// Volume-weighted slicing from a profile whose weights must sum to
    /// within `[0.99, 1.01]`. The final slice absorbs any rounding remainder
    /// so `Σ qty == total` exactly.
    pub fn new_volume_weighted(
        parent_id: u64,
        total_quantity: Decimal,
        profile: &[f64],
        start: DateTime<Utc>,
        interval: Duration,
        next_slice_id: &mut u64,
    ) -> Result<Self, SlicerError> {
        let sum: f64 = profile.iter().sum();
        if !(0.99..=1.01).contains(&sum) {
            return Err(SlicerError::InvalidProfileSum(sum));
        }

        let mut slices = Vec::with_capacity(profile.len());
        let mut allocated = Decimal::ZERO;
        for (i, weight) in profile.iter().enumerate() {
            let qty = if i + 1 == profile.len() {
                total_quantity - allocated
            } else {
                let w = Decimal::try_from(*weight).unwrap_or(Decimal::ZERO);
                (total_quantity * w).round()
            };
            allocated += qty;

            slices.push(OrderSlice {
                slice_id: *next_slice_id,
                parent_id,
                quantity: qty,
                scheduled_time: start + Duration::milliseconds(interval.num_milliseconds() * i as i64),
                status: SliceStatus::Pending,
                attempts: 0,
            });
            *next_slice_id += 1;
        }

        Ok(Self {
            parent_id,
            total_quantity,
            slices,
        })
    }

    pub fn parent_id(&self) -> u64 {
        self.parent_id
    }

    pub fn slices(&self) -> &[OrderSlice] {
        &self.slices
    }

    pub fn get_slices(&self) -> Vec<OrderSlice> {
        self.slices.clone()
    }

    pub fn get_remaining_quantity(&self) -> Decimal {
        self.slices
            .iter()
            .filter(|s| s.status == SliceStatus::Pending || s.status == SliceStatus::Sent)
            .map(|s| s.quantity)
            .sum()
    }

    pub fn total_quantity(&self) -> Decimal {
        self.total_quantity
    }

    pub fn update_slice_status(
        &mut self,
        slice_id: u64,
        status: SliceStatus,
    ) -> Result<(), SlicerError> {
        let slice = self
            .slices
            .iter_mut()
            .find(|s| s.slice_id == slice_id)
            .ok_or(SlicerError::UnknownSlice(slice_id))?;
        slice.status = status;
        Ok(())
    }
}
