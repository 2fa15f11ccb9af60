//! Fee split and fee-growth accounting. Grounded on Uniswap V3's
//! `swap_math::compute_swap_step` fee slice and `tick::update`'s
//! fee-growth-outside snapshot, generalized to the explicit
//! ceil-based LP/protocol split this engine's source oracle uses.

use alloy_primitives::U256;

use crate::math;
use crate::pool::Pool;

/// Result of splitting a gross swap input into LP fee, protocol fee,
/// and the net amount left to swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub raw_fee: U256,
    pub lp_fee: U256,
    pub protocol_fee: U256,
}

impl FeeSplit {
    pub fn total_fee(&self) -> U256 {
        self.lp_fee + self.protocol_fee
    }
}

impl Pool {
    /// Splits `amount_in` into LP and protocol fee shares. The LP share
    /// is hard-wired to a ceil(4/5) split of the raw fee regardless of
    /// the pool's configured protocol fee ratio, matching the source
    /// oracle's literal behavior rather than the nominally-configurable
    /// one (see design notes on the hard-coded split).
    pub fn calculate_fees(&self, amount_in: U256) -> FeeSplit {
        if self.fee_rate_ppm == 0 || amount_in.is_zero() {
            return FeeSplit {
                raw_fee: U256::ZERO,
                lp_fee: U256::ZERO,
                protocol_fee: U256::ZERO,
            };
        }

        let raw_fee = math::mul_div_ceil(amount_in, U256::from(self.fee_rate_ppm), U256::from(1_000_000u64));
        if raw_fee.is_zero() {
            return FeeSplit {
                raw_fee: U256::ZERO,
                lp_fee: U256::ZERO,
                protocol_fee: U256::ZERO,
            };
        }

        let mut lp_fee = math::mul_div_ceil(raw_fee, U256::from(4u64), U256::from(5u64));
        if lp_fee.is_zero() {
            lp_fee = U256::from(1u64);
        }
        let protocol_fee = math::submod(raw_fee, lp_fee);

        FeeSplit { raw_fee, lp_fee, protocol_fee }
    }

    /// Adds `fee_amount`'s per-liquidity share to the global fee-growth
    /// accumulator for the input token. No-op when liquidity is zero:
    /// the fee is still collected (see `total_swap_fee*`) but has no
    /// liquidity to distribute across.
    pub fn update_fee_growth(&mut self, fee_amount: U256, zero_for_one: bool) {
        if self.liquidity == 0 || fee_amount.is_zero() {
            return;
        }
        let growth = math::mul_div_floor(fee_amount, U256::from(1u64) << 64, U256::from(self.liquidity));
        if zero_for_one {
            self.fee_growth_global0_x64 += growth;
        } else {
            self.fee_growth_global1_x64 += growth;
        }
    }

    /// Snapshots fee-growth-outside on the input-token side for the
    /// tick being crossed.
    pub fn update_fee_growth_outside(&mut self, tick: i32, zero_for_one: bool) {
        self.tick_book.update_fee_growth_outside(
            tick,
            zero_for_one,
            self.fee_growth_global0_x64,
            self.fee_growth_global1_x64,
        );
    }

    /// Fee growth accrued while price sat inside `[tick_lower, tick_upper)`.
    pub fn fee_growth_inside(&self, tick_lower: i32, tick_upper: i32) -> (U256, U256) {
        self.tick_book.fee_growth_inside(
            tick_lower,
            tick_upper,
            self.tick_current,
            self.fee_growth_global0_x64,
            self.fee_growth_global1_x64,
        )
    }

    /// Fees owed to a position of `liquidity` over `[tick_lower, tick_upper)`.
    pub fn estimate_position_fees(&self, tick_lower: i32, tick_upper: i32, liquidity: u128) -> (U256, U256) {
        let (inside0, inside1) = self.fee_growth_inside(tick_lower, tick_upper);
        let l = U256::from(liquidity);
        (
            math::mul_div_floor(inside0, l, U256::from(1u64) << 64),
            math::mul_div_floor(inside1, l, U256::from(1u64) << 64),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::math::tick_to_sqrt_price_x64;

    fn pool() -> Pool {
        Pool::new(PoolConfig::new(100, 60), tick_to_sqrt_price_x64(7))
    }

    #[test]
    fn fee_split_conserves_and_floors_lp_to_one() {
        let p = pool();
        let split = p.calculate_fees(U256::from(10_000u64));
        assert!(split.raw_fee > U256::ZERO);
        assert!(split.lp_fee >= U256::from(1u64));
        assert_eq!(split.lp_fee + split.protocol_fee, split.raw_fee);
        assert!(split.total_fee() <= U256::from(10_000u64));
    }

    #[test]
    fn zero_fee_rate_yields_zero_split() {
        let mut p = pool();
        p.fee_rate_ppm = 0;
        let split = p.calculate_fees(U256::from(10_000u64));
        assert_eq!(split.total_fee(), U256::ZERO);
    }

    #[test]
    fn update_fee_growth_is_noop_without_liquidity() {
        let mut p = pool();
        assert_eq!(p.liquidity, 0);
        p.update_fee_growth(U256::from(100u64), true);
        assert_eq!(p.fee_growth_global0_x64, U256::ZERO);
    }
}
