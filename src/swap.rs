//! The swap engine: tick-walk loop, analytic within-tick price update,
//! and the flash-swap/validation wrappers around it.
//!
//! Grounded on Uniswap V3's `swap::swap` (the `while
//! amount_specified_remaining != 0` loop shape, `StepComputations`,
//! crossing via `liquidity_math::add_delta`) and `sqrt_price_math.rs`'s
//! overflow-avoidance idiom: never multiply two full-width sqrt prices
//! together directly (a single `a*b` exceeds 256 bits near the edges of
//! the tick range), instead divide by one price via `mul_div_floor`
//! and then by the other via a plain `U256` division, mirroring
//! `get_amount0_delta_round_up`'s two-step division by
//! `sqrt_ratio_bx96` then `sqrt_ratio_ax96`.

use alloy_primitives::U256;

use crate::math;
use crate::pool::Pool;

const Q64: u32 = 64;

fn q64() -> U256 {
    U256::from(1u64) << Q64
}

/// One step of price movement within a single tick segment, holding
/// liquidity constant.
struct StepResult {
    amount_out: U256,
    new_sqrt_price: U256,
}

/// Maximum input consumable before price reaches `tick_to_sqrt_price(next_tick)`.
fn max_input_to_reach(liquidity: u128, sqrt_price: U256, next_sqrt_price: U256, zero_for_one: bool) -> U256 {
    if liquidity == 0 {
        return U256::ZERO;
    }
    let l_q64 = U256::from(liquidity) << Q64;

    if zero_for_one {
        // current > next
        if sqrt_price <= next_sqrt_price || sqrt_price.is_zero() || next_sqrt_price.is_zero() {
            return U256::ZERO;
        }
        let delta = sqrt_price - next_sqrt_price;
        math::mul_div_floor(l_q64, delta, sqrt_price).wrapping_div(next_sqrt_price)
    } else {
        if next_sqrt_price <= sqrt_price {
            return U256::ZERO;
        }
        let delta = next_sqrt_price - sqrt_price;
        math::mul_div_floor(U256::from(liquidity), delta, q64())
    }
}

/// Analytic price update for an input amount that stays within the
/// current tick segment (constant liquidity).
fn swap_within_range(liquidity: u128, sqrt_price: U256, amount_in: U256, zero_for_one: bool) -> StepResult {
    if liquidity == 0 {
        return StepResult { amount_out: U256::ZERO, new_sqrt_price: sqrt_price };
    }

    if zero_for_one {
        let l_q64 = U256::from(liquidity) << Q64;
        let product = amount_in.overflowing_mul(sqrt_price);
        let denominator = if !product.1 {
            l_q64.checked_add(product.0)
        } else {
            None
        };

        let new_sqrt_price = match denominator {
            Some(d) if !d.is_zero() => math::mul_div_floor(l_q64, sqrt_price, d),
            _ => {
                // Fall back to an overflow-safe equivalent form, mirroring
                // the rounding-up counterpart in
                // `get_next_sqrt_price_from_amount0_rounding_up`.
                let inv_term = l_q64.wrapping_div(sqrt_price).checked_add(amount_in);
                match inv_term {
                    Some(d) if !d.is_zero() => l_q64.wrapping_div(d),
                    _ => sqrt_price,
                }
            }
        };

        let delta = sqrt_price.saturating_sub(new_sqrt_price);
        let amount_out = math::mul_div_floor(U256::from(liquidity), delta, q64());
        StepResult { amount_out, new_sqrt_price }
    } else {
        let step = math::mul_div_floor(amount_in, q64(), U256::from(liquidity));
        let new_sqrt_price = sqrt_price + step;
        let delta = new_sqrt_price.saturating_sub(sqrt_price);
        let l_q64 = U256::from(liquidity) << Q64;
        let amount_out = if new_sqrt_price.is_zero() || sqrt_price.is_zero() {
            U256::ZERO
        } else {
            math::mul_div_floor(l_q64, delta, new_sqrt_price).wrapping_div(sqrt_price)
        };
        StepResult { amount_out, new_sqrt_price }
    }
}

/// Outcome of a full tick-walk swap.
pub(crate) struct SwapOutcome {
    pub amount_out: U256,
}

impl Pool {
    /// Tick-walk loop: advances price tick by tick, consuming
    /// `amount_in` (already net of fees) along `zero_for_one`.
    pub(crate) fn execute_clmm_swap(&mut self, amount_in: U256, zero_for_one: bool) -> SwapOutcome {
        let mut current_sqrt_price = self.sqrt_price_x64;
        let mut current_tick = self.tick_current;
        let mut amount_out = U256::ZERO;
        let mut remaining = amount_in;

        while !remaining.is_zero() {
            let next_tick = self.tick_book.next_initialized_tick(current_tick, zero_for_one);

            let Some(next_tick) = next_tick else {
                let step = swap_within_range(self.liquidity, current_sqrt_price, remaining, zero_for_one);
                amount_out += step.amount_out;
                current_sqrt_price = step.new_sqrt_price;
                current_tick = math::sqrt_price_to_tick_x64(current_sqrt_price);
                break;
            };

            let next_sqrt_price = math::tick_to_sqrt_price_x64(next_tick);
            let max_at_current_price = max_input_to_reach(self.liquidity, current_sqrt_price, next_sqrt_price, zero_for_one);
            if max_at_current_price.is_zero() {
                break;
            }

            if remaining <= max_at_current_price {
                let step = swap_within_range(self.liquidity, current_sqrt_price, remaining, zero_for_one);
                amount_out += step.amount_out;
                current_sqrt_price = step.new_sqrt_price;
                current_tick = math::sqrt_price_to_tick_x64(current_sqrt_price);
                break;
            }

            let step = swap_within_range(self.liquidity, current_sqrt_price, max_at_current_price, zero_for_one);
            amount_out += step.amount_out;
            remaining -= max_at_current_price;
            current_sqrt_price = next_sqrt_price;
            current_tick = next_tick;

            self.update_fee_growth_outside(next_tick, zero_for_one);

            if let Some(tick_data) = self.tick_book.get(next_tick) {
                let liquidity_net = tick_data.liquidity_net;
                let signed_delta = if zero_for_one { -liquidity_net } else { liquidity_net };
                let new_liquidity = self.liquidity as i128 + signed_delta;
                if new_liquidity < 0 {
                    tracing::warn!(tick = next_tick, "liquidity crossed below zero; clamping");
                }
                self.liquidity = new_liquidity.max(0) as u128;
                tracing::trace!(tick = next_tick, liquidity = self.liquidity, zero_for_one, "crossed tick");
            }
        }

        self.sqrt_price_x64 = current_sqrt_price;
        self.tick_current = current_tick;

        SwapOutcome { amount_out }
    }

    /// Applies a swap of `amount_in` along `zero_for_one`, deducting fees
    /// first and returning the realized output amount.
    pub fn apply_swap(&mut self, amount_in: U256, zero_for_one: bool) -> U256 {
        if amount_in.is_zero() {
            return U256::ZERO;
        }

        let fees = self.calculate_fees(amount_in);
        self.apply_swap_internal(amount_in, zero_for_one, fees.total_fee(), fees.lp_fee)
    }

    fn apply_swap_internal(&mut self, amount_in: U256, zero_for_one: bool, total_fee: U256, lp_fee: U256) -> U256 {
        if amount_in.is_zero() {
            return U256::ZERO;
        }

        if !total_fee.is_zero() {
            if zero_for_one {
                self.total_swap_fee0 += total_fee;
            } else {
                self.total_swap_fee1 += total_fee;
            }
        }

        if !lp_fee.is_zero() {
            self.update_fee_growth(lp_fee, zero_for_one);
        }

        let amount_in_after_fee = math::submod(amount_in, total_fee);
        if amount_in_after_fee.is_zero() {
            return U256::ZERO;
        }

        self.execute_clmm_swap(amount_in_after_fee, zero_for_one).amount_out
    }

    /// Same as [`Pool::apply_swap`] but lets a host supply externally
    /// computed fee figures (for comparing this engine's fee math
    /// against an oracle) and tracks match/mismatch counters.
    pub fn apply_swap_with_validation(
        &mut self,
        amount_in: U256,
        zero_for_one: bool,
        expected_amount_out: Option<U256>,
        expected_fee: Option<U256>,
        expected_protocol_fee: Option<U256>,
    ) -> ValidatedSwap {
        self.validation_stats.total_swaps += 1;

        let computed = self.calculate_fees(amount_in);
        let lp_fee = expected_fee.unwrap_or(computed.lp_fee);
        let protocol_fee = expected_protocol_fee.unwrap_or(computed.protocol_fee);
        let total_fee = lp_fee + protocol_fee;

        let amount_out = self.apply_swap_internal(amount_in, zero_for_one, total_fee, lp_fee);

        let amount_out_match = expected_amount_out.map_or(true, |e| amount_out == e);
        let fee_match = expected_fee.map_or(true, |e| lp_fee == e);
        let protocol_fee_match = expected_protocol_fee.map_or(true, |e| protocol_fee == e);
        let is_exact_match = amount_out_match && fee_match && protocol_fee_match;

        if !amount_out_match {
            self.validation_stats.amount_out_mismatches += 1;
            if let Some(expected) = expected_amount_out {
                self.validation_stats.amount_out_diff_total += signed_diff(amount_out, expected);
            }
        }
        if !fee_match {
            self.validation_stats.fee_mismatches += 1;
            if let Some(expected) = expected_fee {
                self.validation_stats.fee_diff_total += signed_diff(lp_fee, expected);
            }
        }
        if !protocol_fee_match {
            self.validation_stats.protocol_fee_mismatches += 1;
            if let Some(expected) = expected_protocol_fee {
                self.validation_stats.protocol_fee_diff_total += signed_diff(protocol_fee, expected);
            }
        }
        if is_exact_match {
            self.validation_stats.exact_matches += 1;
        }

        ValidatedSwap {
            amount_out,
            fee_amount: lp_fee,
            protocol_fee,
            amount_out_match,
            fee_match,
            protocol_fee_match,
            is_exact_match,
        }
    }

    /// Settles a flash-swap repayment: any surplus over the declared
    /// debt is treated as fee income, and every tick's fee-growth-outside
    /// snapshot is caught up to the post-fee globals. This is a coarse
    /// approximation (it invalidates `fee_growth_inside` for existing
    /// ranges) carried over unchanged from the source oracle.
    pub fn apply_repay_flash_swap(
        &mut self,
        amount_x_debt: U256,
        amount_y_debt: U256,
        paid_x: U256,
        paid_y: U256,
        new_reserve_x: Option<U256>,
        new_reserve_y: Option<U256>,
    ) {
        let fee_x = math::submod(paid_x, amount_x_debt);
        let fee_y = math::submod(paid_y, amount_y_debt);

        if !fee_x.is_zero() {
            self.update_fee_growth(fee_x, true);
            self.total_swap_fee0 += fee_x;
        }
        if !fee_y.is_zero() {
            self.update_fee_growth(fee_y, false);
            self.total_swap_fee1 += fee_y;
        }

        if let Some(reserve_x) = new_reserve_x {
            self.reserve_a = reserve_x;
        }
        if let Some(reserve_y) = new_reserve_y {
            self.reserve_b = reserve_y;
        }

        let (g0, g1) = (self.fee_growth_global0_x64, self.fee_growth_global1_x64);
        for tick_data in self.tick_book.ticks.values_mut() {
            tick_data.fee_growth_outside0_x64 = g0;
            tick_data.fee_growth_outside1_x64 = g1;
        }
    }
}

/// Signed difference between `actual` and `expected`, saturating to
/// `i128::MAX`/`i128::MIN` rather than panicking when the gap itself
/// doesn't fit in 128 bits (`Uint::to` aborts on overflow).
fn signed_diff(actual: U256, expected: U256) -> i128 {
    if actual >= expected {
        (actual - expected).try_into().unwrap_or(i128::MAX)
    } else {
        (expected - actual).try_into().map_or(i128::MIN, |v: i128| -v)
    }
}

/// Result of [`Pool::apply_swap_with_validation`].
#[derive(Debug, Clone, Copy)]
pub struct ValidatedSwap {
    pub amount_out: U256,
    pub fee_amount: U256,
    pub protocol_fee: U256,
    pub amount_out_match: bool,
    pub fee_match: bool,
    pub protocol_fee_match: bool,
    pub is_exact_match: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::math::tick_to_sqrt_price_x64;

    fn seeded_pool() -> Pool {
        let mut pool = Pool::new(PoolConfig::new(100, 60), tick_to_sqrt_price_x64(7));
        pool.liquidity = 1_000_000;
        pool
    }

    #[test]
    fn swap_with_no_ticks_consumes_all_liquidity_range() {
        let mut pool = seeded_pool();
        let out = pool.apply_swap(U256::from(10_000u64), true);
        assert!(out > U256::ZERO);
        assert!(pool.sqrt_price_x64 < tick_to_sqrt_price_x64(7));
    }

    #[test]
    fn zero_amount_in_is_a_noop() {
        let mut pool = seeded_pool();
        let before = pool.sqrt_price_x64;
        let out = pool.apply_swap(U256::ZERO, true);
        assert_eq!(out, U256::ZERO);
        assert_eq!(pool.sqrt_price_x64, before);
    }

    #[test]
    fn swap_output_is_bounded_by_constant_product_estimate() {
        let mut pool = seeded_pool();
        let l = pool.liquidity as f64;
        let p = pool.price().sqrt();
        let amount_in = 10_000f64;
        // constant-product upper bound: dy = L*dx / (L/p + dx) roughly;
        // just assert realized output doesn't exceed the naive L*p bound.
        let naive_bound = l * p;
        let out = pool.apply_swap(U256::from(10_000u64), true);
        let out_f: f64 = out.to_string().parse().unwrap();
        assert!(out_f <= naive_bound + 1.0, "amount_in={amount_in}");
    }

    #[test]
    fn crossing_a_tick_updates_active_liquidity() {
        let mut pool = seeded_pool();
        pool.apply_liquidity_delta(3, 10, 500);
        let before = pool.liquidity;
        pool.apply_swap(U256::from(5_000_000u64), true);
        assert_ne!(pool.liquidity, before + 500);
    }
}
