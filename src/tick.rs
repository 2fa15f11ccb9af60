//! Per-tick state and the ordered index of initialized ticks.
//!
//! Grounded on Uniswap V3's `tick::Info`/`update`, adapted from an
//! async RPC-backed `HashMap<i32, Info>` to a synchronous, in-memory
//! `BTreeMap`/`BTreeSet` pair. The word-compressed bitmap
//! (`tick_bitmap.rs`) is a Solidity gas optimization with no analogue
//! here; a `BTreeSet<i32>` gives the same ordered neighbor-lookup
//! behavior in plain Rust.

use std::collections::{BTreeMap, BTreeSet};

use alloy_primitives::U256;

/// Per-tick liquidity and fee-growth bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickData {
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    pub fee_growth_outside0_x64: U256,
    pub fee_growth_outside1_x64: U256,
}

/// The tick-indexed liquidity book: per-tick data plus the ordered set
/// of initialized ticks used for neighbor lookup during a swap.
#[derive(Debug, Clone, Default)]
pub struct TickBook {
    pub ticks: BTreeMap<i32, TickData>,
    pub initialized: BTreeSet<i32>,
}

impl TickBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tick: i32) -> Option<&TickData> {
        self.ticks.get(&tick)
    }

    /// Applies `net_delta`/`gross_delta` to the tick, creating the entry
    /// if absent and removing it if it has drained back to nothing.
    pub fn update_tick(&mut self, tick: i32, net_delta: i128, gross_delta: i128) {
        let entry = self.ticks.entry(tick).or_default();

        entry.liquidity_net = entry.liquidity_net.saturating_add(net_delta);
        entry.liquidity_gross = if gross_delta >= 0 {
            entry.liquidity_gross.saturating_add(gross_delta as u128)
        } else {
            entry.liquidity_gross.saturating_sub(gross_delta.unsigned_abs())
        };

        if entry.liquidity_gross == 0 && entry.liquidity_net == 0 {
            self.ticks.remove(&tick);
            self.initialized.remove(&tick);
        } else {
            self.initialized.insert(tick);
        }
    }

    /// Nearest initialized tick strictly below `current` (descending
    /// swaps) or strictly above it (ascending swaps).
    pub fn next_initialized_tick(&self, current: i32, zero_for_one: bool) -> Option<i32> {
        if zero_for_one {
            self.initialized.range(..current).next_back().copied()
        } else {
            self.initialized.range(current + 1..).next().copied()
        }
    }

    /// Snapshots fee-growth-outside for the input-token side on a tick
    /// crossing. Only the input side is updated, matching the source
    /// oracle's single-side behavior rather than the dual-side snapshot
    /// real CLMMs take.
    pub fn update_fee_growth_outside(
        &mut self,
        tick: i32,
        zero_for_one: bool,
        fee_growth_global0_x64: U256,
        fee_growth_global1_x64: U256,
    ) {
        if let Some(entry) = self.ticks.get_mut(&tick) {
            if zero_for_one {
                entry.fee_growth_outside0_x64 = fee_growth_global0_x64;
            } else {
                entry.fee_growth_outside1_x64 = fee_growth_global1_x64;
            }
        }
    }

    /// Decomposes fee growth for range `[tick_lower, tick_upper)` into
    /// the portion accrued while price was inside the range.
    pub fn fee_growth_inside(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        tick_current: i32,
        fee_growth_global0_x64: U256,
        fee_growth_global1_x64: U256,
    ) -> (U256, U256) {
        let lower = match self.ticks.get(&tick_lower) {
            Some(t) => t,
            None => return (U256::ZERO, U256::ZERO),
        };
        let upper = match self.ticks.get(&tick_upper) {
            Some(t) => t,
            None => return (U256::ZERO, U256::ZERO),
        };

        let below0;
        let below1;
        if tick_current < tick_lower {
            below0 = crate::math::submod(lower.fee_growth_outside0_x64, upper.fee_growth_outside0_x64);
            below1 = crate::math::submod(lower.fee_growth_outside1_x64, upper.fee_growth_outside1_x64);
        } else if tick_current >= tick_upper {
            below0 = crate::math::submod(upper.fee_growth_outside0_x64, lower.fee_growth_outside0_x64);
            below1 = crate::math::submod(upper.fee_growth_outside1_x64, lower.fee_growth_outside1_x64);
        } else {
            below0 = crate::math::submod(
                crate::math::submod(fee_growth_global0_x64, lower.fee_growth_outside0_x64),
                upper.fee_growth_outside0_x64,
            );
            below1 = crate::math::submod(
                crate::math::submod(fee_growth_global1_x64, lower.fee_growth_outside1_x64),
                upper.fee_growth_outside1_x64,
            );
        }

        (below0, below1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_tick_creates_and_drains() {
        let mut book = TickBook::new();
        book.update_tick(10, 500, 500);
        assert!(book.ticks.contains_key(&10));
        assert!(book.initialized.contains(&10));

        book.update_tick(10, -500, -500);
        assert!(!book.ticks.contains_key(&10));
        assert!(!book.initialized.contains(&10));
    }

    #[test]
    fn next_initialized_tick_directions() {
        let mut book = TickBook::new();
        book.update_tick(5, 10, 10);
        book.update_tick(10, 10, 10);
        book.update_tick(20, 10, 10);

        assert_eq!(book.next_initialized_tick(12, true), Some(10));
        assert_eq!(book.next_initialized_tick(12, false), Some(20));
        assert_eq!(book.next_initialized_tick(5, true), None);
        assert_eq!(book.next_initialized_tick(20, false), None);
    }
}
