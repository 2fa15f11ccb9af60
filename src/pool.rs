//! The `Pool` aggregate: reserves, active liquidity, the current price,
//! fee accumulators, and the tick book. Grounded on Uniswap V3's
//! `pool::PoolState`, stripped of everything RPC-shaped (multicall
//! loading, `Slot0.unlocked`, `LoadingPattern`) since this engine has no
//! chain to talk to — state here is simply constructed and mutated
//! in-process.

use alloy_primitives::U256;

use crate::config::PoolConfig;
use crate::math;
use crate::tick::TickBook;

/// Running counters for [`Pool::apply_swap_with_validation`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationStats {
    pub total_swaps: u64,
    pub amount_out_mismatches: u64,
    pub fee_mismatches: u64,
    pub protocol_fee_mismatches: u64,
    pub exact_matches: u64,
    pub amount_out_diff_total: i128,
    pub fee_diff_total: i128,
    pub protocol_fee_diff_total: i128,
}

/// An in-memory concentrated liquidity pool.
#[derive(Debug, Clone)]
pub struct Pool {
    pub reserve_a: U256,
    pub reserve_b: U256,
    pub sqrt_price_x64: U256,
    pub liquidity: u128,
    pub tick_current: i32,

    pub fee_rate_ppm: u32,
    pub tick_spacing: u32,
    pub protocol_fee_share_numerator: u64,
    pub protocol_fee_share_denominator: u64,

    pub fee_growth_global0_x64: U256,
    pub fee_growth_global1_x64: U256,
    pub total_swap_fee0: U256,
    pub total_swap_fee1: U256,

    pub tick_book: TickBook,
    pub validation_stats: ValidationStats,
}

impl Pool {
    /// Builds a pool from `config`, deriving `tick_current` from
    /// `sqrt_price_x64` so the two stay consistent per the data-model
    /// bracketing invariant.
    pub fn new(config: PoolConfig, sqrt_price_x64: U256) -> Self {
        let tick_current = math::sqrt_price_to_tick_x64(sqrt_price_x64);
        tracing::debug!(
            fee_rate_ppm = config.fee_rate_ppm,
            tick_spacing = config.tick_spacing,
            tick_current,
            "constructed pool"
        );

        Self {
            reserve_a: U256::ZERO,
            reserve_b: U256::ZERO,
            sqrt_price_x64,
            liquidity: 0,
            tick_current,
            fee_rate_ppm: config.fee_rate_ppm,
            tick_spacing: config.tick_spacing,
            protocol_fee_share_numerator: config.protocol_fee_share_numerator,
            protocol_fee_share_denominator: config.protocol_fee_share_denominator,
            fee_growth_global0_x64: U256::ZERO,
            fee_growth_global1_x64: U256::ZERO,
            total_swap_fee0: U256::ZERO,
            total_swap_fee1: U256::ZERO,
            tick_book: TickBook::new(),
            validation_stats: ValidationStats::default(),
        }
    }

    /// Current price, `(sqrt_price_x64 / 2^64)^2`, as an `f64`. For
    /// display/estimation purposes only; never fed back into integer
    /// arithmetic.
    pub fn price(&self) -> f64 {
        let sqrt = self.sqrt_price_x64.to_string().parse::<f64>().unwrap_or(0.0);
        let scale = (2f64).powi(64);
        (sqrt / scale).powi(2)
    }

    pub fn reset_validation_stats(&mut self) {
        self.validation_stats = ValidationStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_to_sqrt_price_x64;

    #[test]
    fn new_derives_tick_current_from_price() {
        let sqrt_price = tick_to_sqrt_price_x64(7);
        let pool = Pool::new(PoolConfig::new(100, 60), sqrt_price);
        assert_eq!(pool.tick_current, 7);
    }
}
