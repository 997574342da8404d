//! Strategy run-state machine.
//!
//! `Init -> Active -> Flattening -> Stopped`, with `Active` reachable again
//! from `Stopped` via [`StrategyControlState::activate`]. Flattening is
//! entered by either [`trigger_exit`](StrategyControlState::trigger_exit)
//! (graceful, waits for natural fills) or
//! [`trigger_flatten`](StrategyControlState::trigger_flatten) (may request
//! aggressive IOC closure); it only reaches `Stopped` once the caller
//! confirms the position is flat via
//! [`complete_exit`](StrategyControlState::complete_exit).

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::error::StrategyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    Active,
    Flattening,
    Stopped,
}

#[derive(Debug, Clone)]
pub struct StrategyControlState {
    pub run_state: RunState,
    pub active: bool,
    /// Whether this strategy is currently permitted to trade at all (set by
    /// `activate`/`deactivate`), independent of whether its own entry
    /// conditions are met.
    pub eligible: bool,
    /// Strategy-specific entry conditions, set by the concrete strategy via
    /// [`set_conditions_met`](StrategyControlState::set_conditions_met).
    pub conditions_met: bool,
    /// Set once a graceful or forced exit has been requested; cleared when
    /// the exit completes.
    pub exit_requested: bool,
    /// Set while a cancel request is outstanding against a resting order.
    pub cancel_pending: bool,
    pub flatten_reason: Option<String>,
    pub flatten_aggressive: bool,
    pub indicators: HashMap<String, f64>,
    pub last_transition: DateTime<Utc>,
}

impl StrategyControlState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            run_state: RunState::Init,
            active: false,
            eligible: false,
            conditions_met: false,
            exit_requested: false,
            cancel_pending: false,
            flatten_reason: None,
            flatten_aggressive: false,
            indicators: HashMap::new(),
            last_transition: now,
        }
    }

    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError> {
        match self.run_state {
            RunState::Init | RunState::Stopped => {
                self.run_state = RunState::Active;
                self.active = true;
                self.eligible = true;
                self.flatten_reason = None;
                self.flatten_aggressive = false;
                self.exit_requested = false;
                self.last_transition = now;
                Ok(())
            }
            RunState::Active | RunState::Flattening => Err(StrategyError::State(format!(
                "cannot activate from {:?}",
                self.run_state
            ))),
        }
    }

    /// Deactivates the strategy: clears `active`/`eligible` and sets
    /// `flatten_reason` (unless a more specific reason is already set) so
    /// downstream consumers can tell this was a manual stop.
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.eligible = false;
        self.flatten_reason.get_or_insert_with(|| "deactivated".to_string());
        self.last_transition = now;
    }

    /// Graceful exit request: stop adding new signals, let standing orders
    /// fill naturally, transition to `Flattening`.
    pub fn trigger_exit(&mut self, now: DateTime<Utc>) -> Result<(), StrategyError> {
        match self.run_state {
            RunState::Active => {
                self.run_state = RunState::Flattening;
                self.active = false;
                self.exit_requested = true;
                self.flatten_reason.get_or_insert_with(|| "exit_requested".to_string());
                self.last_transition = now;
                Ok(())
            }
            _ => Err(StrategyError::State(format!(
                "cannot trigger exit from {:?}",
                self.run_state
            ))),
        }
    }

    /// Forced flatten, optionally via aggressive (IOC/market) closure.
    pub fn trigger_flatten(
        &mut self,
        reason: impl Into<String>,
        aggressive: bool,
        now: DateTime<Utc>,
    ) -> Result<(), StrategyError> {
        match self.run_state {
            RunState::Active | RunState::Flattening => {
                self.run_state = RunState::Flattening;
                self.active = false;
                self.exit_requested = true;
                self.flatten_reason = Some(reason.into());
                self.flatten_aggressive = aggressive;
                self.last_transition = now;
                Ok(())
            }
            _ => Err(StrategyError::State(format!(
                "cannot trigger flatten from {:?}",
                self.run_state
            ))),
        }
    }

    /// Completes the flatten; the caller must confirm `position_is_flat`
    /// (typically `position.net_qty.is_zero()`) before calling this.
    pub fn complete_exit(&mut self, position_is_flat: bool, now: DateTime<Utc>) -> Result<(), StrategyError> {
        if self.run_state != RunState::Flattening {
            return Err(StrategyError::State(format!(
                "cannot complete exit from {:?}",
                self.run_state
            )));
        }
        if !position_is_flat {
            return Err(StrategyError::State("position is not flat".to_string()));
        }
        self.run_state = RunState::Stopped;
        self.exit_requested = false;
        self.cancel_pending = false;
        self.last_transition = now;
        Ok(())
    }

    /// Records whether the strategy's own entry conditions currently hold;
    /// set by the concrete strategy's signal logic, read by anything that
    /// needs to distinguish "not eligible" from "eligible but no setup".
    pub fn set_conditions_met(&mut self, met: bool) {
        self.conditions_met = met;
    }

    /// Marks a cancel request as outstanding against a resting order.
    pub fn request_cancel(&mut self) {
        self.cancel_pending = true;
    }

    /// Clears the outstanding cancel flag once the cancel is confirmed or
    /// rejected.
    pub fn clear_cancel_pending(&mut self) {
        self.cancel_pending = false;
    }

    pub fn is_active(&self) -> bool {
        self.active && self.run_state == RunState::Active
    }
}
