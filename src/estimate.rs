//! Read-only previews. Every estimator here clones the pool and runs the
//! real mutating path against the clone rather than hand-duplicating the
//! swap/fee math in a shadow implementation, mirroring how Uniswap V3
//! quoters compute a hypothetical trade against a throwaway `PoolState`
//! instead of the caller's live one.

use alloy_primitives::U256;

use crate::math;
use crate::pool::Pool;

#[derive(Debug, Clone, Copy)]
pub struct AmountOutEstimate {
    pub amount_out: U256,
    pub fee_amount: U256,
    pub price_impact_pct: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct AmountInEstimate {
    pub amount_in: U256,
    pub fee_amount: U256,
    pub total_cost: U256,
    pub price_impact_pct: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SwapCostEstimate {
    pub amount_out: U256,
    pub fee_amount: U256,
    pub price_impact_pct: f64,
    pub effective_price: f64,
    pub slippage_pct: f64,
    pub total_cost: U256,
}

#[derive(Debug, Clone, Copy)]
pub struct ActualLiquidityAmounts {
    pub actual_amount_a: U256,
    pub actual_amount_b: U256,
    pub unused_amount_a: U256,
    pub unused_amount_b: U256,
}

#[derive(Debug, Clone, Copy)]
pub struct OpenPositionEstimate {
    pub liquidity_amount: U256,
    pub actual_amount_a: U256,
    pub actual_amount_b: U256,
    pub unused_amount_a: U256,
    pub unused_amount_b: U256,
    pub price_range_lower: f64,
    pub price_range_upper: f64,
    pub current_tick: i32,
    pub is_in_range: bool,
    pub fee0: U256,
    pub fee1: U256,
}

#[derive(Debug, Clone, Copy)]
pub struct ClosePositionEstimate {
    pub amount_a: U256,
    pub amount_b: U256,
    pub fee0: U256,
    pub fee1: U256,
    pub total_value: U256,
    pub price_impact_pct: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct CollectFeeEstimate {
    pub fee0: U256,
    pub fee1: U256,
    pub fee_growth_inside0_x64: U256,
    pub fee_growth_inside1_x64: U256,
    pub estimated_value: U256,
}

#[derive(Debug, Clone, Copy)]
pub struct OptimalRangeEstimate {
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub expected_liquidity: U256,
    pub price_range_lower: f64,
    pub price_range_upper: f64,
    pub utilization: f64,
}

fn u256_to_f64(v: U256) -> f64 {
    v.to_string().parse().unwrap_or(0.0)
}

impl Pool {
    fn calculate_price_impact(&self, amount_in: U256, amount_out: U256, zero_for_one: bool) -> f64 {
        if amount_in.is_zero() || amount_out.is_zero() {
            return 0.0;
        }
        let current_price = self.price();
        if current_price == 0.0 {
            return 0.0;
        }
        let (a, b) = (u256_to_f64(amount_in), u256_to_f64(amount_out));
        let effective_price = if zero_for_one { b / a } else { a / b };
        ((effective_price - current_price) / current_price).abs() * 100.0
    }

    /// Output preview for swapping `amount_in`, without mutating state.
    pub fn estimate_amount_out(&self, amount_in: U256, zero_for_one: bool) -> AmountOutEstimate {
        let mut shadow = self.clone();
        let fees = shadow.calculate_fees(amount_in);
        let amount_in_after_fee = math::submod(amount_in, fees.total_fee());

        let amount_out = if !amount_in_after_fee.is_zero() {
            shadow.execute_clmm_swap(amount_in_after_fee, zero_for_one).amount_out
        } else {
            U256::ZERO
        };

        let price_impact_pct = self.calculate_price_impact(amount_in, amount_out, zero_for_one);
        AmountOutEstimate { amount_out, fee_amount: fees.lp_fee, price_impact_pct }
    }

    /// Like [`Pool::estimate_amount_out`], but also reports the
    /// effective price realized and its slippage against the current
    /// pool price.
    pub fn estimate_swap_cost(&self, amount_in: U256, zero_for_one: bool) -> SwapCostEstimate {
        let estimation = self.estimate_amount_out(amount_in, zero_for_one);
        let current_price = self.price();
        let effective_price = if !amount_in.is_zero() {
            u256_to_f64(estimation.amount_out) / u256_to_f64(amount_in)
        } else {
            0.0
        };
        let slippage_pct = if current_price != 0.0 {
            ((effective_price - current_price) / current_price).abs() * 100.0
        } else {
            0.0
        };

        SwapCostEstimate {
            amount_out: estimation.amount_out,
            fee_amount: estimation.fee_amount,
            price_impact_pct: estimation.price_impact_pct,
            effective_price,
            slippage_pct,
            total_cost: amount_in,
        }
    }

    /// Binary search over gross input for the smallest `amount_in` whose
    /// simulated output reaches `amount_out`.
    pub fn estimate_amount_in(&self, amount_out: U256, zero_for_one: bool) -> AmountInEstimate {
        let mut low = U256::ZERO;
        let mut high = amount_out.saturating_mul(U256::from(2u64));
        let mut best_gross = U256::ZERO;

        while low <= high {
            let gross = (low + high) >> 1;
            let mut shadow = self.clone();
            let fees = shadow.calculate_fees(gross);
            let net = math::submod(gross, fees.total_fee());
            let out = if !net.is_zero() { shadow.execute_clmm_swap(net, zero_for_one).amount_out } else { U256::ZERO };

            if out == amount_out {
                best_gross = gross;
                break;
            } else if out < amount_out {
                low = gross + U256::from(1u64);
            } else {
                best_gross = gross;
                if gross.is_zero() {
                    break;
                }
                high = gross - U256::from(1u64);
            }
        }

        let fees = self.calculate_fees(best_gross);
        let price_impact_pct = self.calculate_price_impact(best_gross, amount_out, zero_for_one);
        AmountInEstimate {
            amount_in: best_gross,
            fee_amount: fees.lp_fee,
            total_cost: best_gross,
            price_impact_pct,
        }
    }

    fn calculate_liquidity_amount(&self, tick_lower: i32, tick_upper: i32, amount_a: U256, amount_b: U256) -> U256 {
        if self.tick_current < tick_lower {
            amount_a
        } else if self.tick_current >= tick_upper {
            amount_b
        } else {
            amount_a.min(amount_b)
        }
    }

    fn calculate_actual_liquidity_amounts(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        amount_a: U256,
        amount_b: U256,
    ) -> ActualLiquidityAmounts {
        if self.tick_current < tick_lower {
            return ActualLiquidityAmounts {
                actual_amount_a: amount_a,
                actual_amount_b: U256::ZERO,
                unused_amount_a: U256::ZERO,
                unused_amount_b: amount_b,
            };
        }
        if self.tick_current >= tick_upper {
            return ActualLiquidityAmounts {
                actual_amount_a: U256::ZERO,
                actual_amount_b: amount_b,
                unused_amount_a: amount_a,
                unused_amount_b: U256::ZERO,
            };
        }

        let price = self.price();
        let scaled_price = U256::from((price * 1_000_000.0) as u128);
        let optimal_b = math::mul_div_floor(amount_a, scaled_price, U256::from(1_000_000u64));

        if optimal_b <= amount_b {
            ActualLiquidityAmounts {
                actual_amount_a: amount_a,
                actual_amount_b: optimal_b,
                unused_amount_a: U256::ZERO,
                unused_amount_b: amount_b - optimal_b,
            }
        } else if !scaled_price.is_zero() {
            let optimal_a = math::mul_div_floor(amount_b, U256::from(1_000_000u64), scaled_price);
            ActualLiquidityAmounts {
                actual_amount_a: optimal_a,
                actual_amount_b: amount_b,
                unused_amount_a: math::submod(amount_a, optimal_a),
                unused_amount_b: U256::ZERO,
            }
        } else {
            ActualLiquidityAmounts {
                actual_amount_a: U256::ZERO,
                actual_amount_b: amount_b,
                unused_amount_a: amount_a,
                unused_amount_b: U256::ZERO,
            }
        }
    }

    fn calculate_remove_liquidity_amounts(&self, tick_lower: i32, tick_upper: i32, liquidity_amount: U256) -> (U256, U256) {
        if self.tick_current < tick_lower {
            return (liquidity_amount, U256::ZERO);
        }
        if self.tick_current >= tick_upper {
            return (U256::ZERO, liquidity_amount);
        }
        let price = self.price();
        let scaled_price = U256::from((price * 1_000_000.0) as u128);
        let amount_b = math::mul_div_floor(liquidity_amount, scaled_price, U256::from(1_000_000u64));
        (liquidity_amount, amount_b)
    }

    fn calculate_liquidity_price_impact(&self, tick_lower: i32, tick_upper: i32, liquidity_amount: U256) -> f64 {
        let current_price = self.price();
        if current_price == 0.0 {
            return 0.0;
        }
        let lower = u256_to_f64(math::tick_to_sqrt_price_x64(tick_lower));
        let upper = u256_to_f64(math::tick_to_sqrt_price_x64(tick_upper));
        let price_range = upper - lower;
        let liquidity_ratio = if self.liquidity != 0 {
            u256_to_f64(liquidity_amount) / self.liquidity as f64
        } else {
            0.0
        };
        (liquidity_ratio * (price_range / current_price) * 100.0).abs()
    }

    /// Fees a position over `[tick_lower, tick_upper)` with `liquidity`
    /// would currently be entitled to.
    pub fn estimate_open_position(&self, tick_lower: i32, tick_upper: i32, amount_a: U256, amount_b: U256) -> OpenPositionEstimate {
        let is_in_range = self.tick_current >= tick_lower && self.tick_current < tick_upper;
        let actuals = self.calculate_actual_liquidity_amounts(tick_lower, tick_upper, amount_a, amount_b);
        let liquidity_amount =
            self.calculate_liquidity_amount(tick_lower, tick_upper, actuals.actual_amount_a, actuals.actual_amount_b);

        let liquidity_u128 = liquidity_amount.to::<u128>().min(u128::MAX);
        let (fee0, fee1) = self.estimate_position_fees(tick_lower, tick_upper, liquidity_u128);

        OpenPositionEstimate {
            liquidity_amount,
            actual_amount_a: actuals.actual_amount_a,
            actual_amount_b: actuals.actual_amount_b,
            unused_amount_a: actuals.unused_amount_a,
            unused_amount_b: actuals.unused_amount_b,
            price_range_lower: u256_to_f64(math::tick_to_sqrt_price_x64(tick_lower)) / (2f64.powi(64)),
            price_range_upper: u256_to_f64(math::tick_to_sqrt_price_x64(tick_upper)) / (2f64.powi(64)),
            current_tick: self.tick_current,
            is_in_range,
            fee0,
            fee1,
        }
    }

    /// Settlement preview for closing a position of `liquidity_amount`
    /// over `[tick_lower, tick_upper)`.
    pub fn estimate_close_position(&self, tick_lower: i32, tick_upper: i32, liquidity_amount: U256) -> ClosePositionEstimate {
        let (amount_a, amount_b) = self.calculate_remove_liquidity_amounts(tick_lower, tick_upper, liquidity_amount);
        let liquidity_u128 = liquidity_amount.to::<u128>().min(u128::MAX);
        let (fee0, fee1) = self.estimate_position_fees(tick_lower, tick_upper, liquidity_u128);
        let price_impact_pct = self.calculate_liquidity_price_impact(tick_lower, tick_upper, liquidity_amount);

        ClosePositionEstimate {
            amount_a,
            amount_b,
            fee0,
            fee1,
            total_value: amount_a + amount_b,
            price_impact_pct,
        }
    }

    /// Fee preview for a held position, without collecting it.
    pub fn estimate_collect_fee(&self, tick_lower: i32, tick_upper: i32, liquidity_amount: U256) -> CollectFeeEstimate {
        let liquidity_u128 = liquidity_amount.to::<u128>().min(u128::MAX);
        let (fee0, fee1) = self.estimate_position_fees(tick_lower, tick_upper, liquidity_u128);
        let (inside0, inside1) = self.fee_growth_inside(tick_lower, tick_upper);

        CollectFeeEstimate {
            fee0,
            fee1,
            fee_growth_inside0_x64: inside0,
            fee_growth_inside1_x64: inside1,
            estimated_value: fee0 + fee1,
        }
    }

    /// Heuristic range centered on the ratio of `amount_b` to `amount_a`.
    /// `target_price` is accepted for API parity with the source oracle
    /// but, as there, does not enter the tick computation below.
    pub fn estimate_optimal_range(&self, amount_a: U256, amount_b: U256, target_price: Option<f64>) -> OptimalRangeEstimate {
        let _ = target_price;
        let ratio = if !amount_a.is_zero() {
            u256_to_f64(amount_b) / u256_to_f64(amount_a)
        } else {
            0.0
        };
        let log_base = 1.0001_f64.ln();
        let optimal_tick = if ratio > 0.0 { (ratio.ln() / log_base).floor() as i32 } else { 0 };
        let range_size = (2f64.ln() / log_base).floor() as i32;

        let tick_lower = optimal_tick - range_size;
        let tick_upper = optimal_tick + range_size;
        let expected_liquidity = self.calculate_liquidity_amount(tick_lower, tick_upper, amount_a, amount_b);
        let utilization = if self.liquidity != 0 {
            u256_to_f64(expected_liquidity) / self.liquidity as f64
        } else {
            0.0
        };

        OptimalRangeEstimate {
            tick_lower,
            tick_upper,
            expected_liquidity,
            price_range_lower: u256_to_f64(math::tick_to_sqrt_price_x64(tick_lower)) / (2f64.powi(64)),
            price_range_upper: u256_to_f64(math::tick_to_sqrt_price_x64(tick_upper)) / (2f64.powi(64)),
            utilization,
        }
    }

    /// Fees accrued at a single tick (range of width zero), used by
    /// `all_ticks_with_fees`.
    pub fn fees_at_tick(&self, tick: i32) -> Option<(U256, U256)> {
        let tick_data = self.tick_book.get(tick)?;
        let (inside0, inside1) = self.fee_growth_inside(tick, tick);
        let gross = U256::from(tick_data.liquidity_gross);
        let fee0 = math::mul_div_floor(gross, inside0, U256::from(1u64) << 64);
        let fee1 = math::mul_div_floor(gross, inside1, U256::from(1u64) << 64);
        Some((fee0, fee1))
    }

    /// All initialized ticks with their accrued fees, ordered by tick index.
    pub fn all_ticks_with_fees(&self) -> Vec<(i32, u128, U256, U256)> {
        self.tick_book
            .ticks
            .iter()
            .map(|(tick, data)| {
                let (fee0, fee1) = self.fees_at_tick(*tick).unwrap_or((U256::ZERO, U256::ZERO));
                (*tick, data.liquidity_gross, fee0, fee1)
            })
            .collect()
    }
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
    fn estimate_amount_out_does_not_mutate_pool() {
        let pool = seeded_pool();
        let before = pool.sqrt_price_x64;
        let before_liq = pool.liquidity;
        let _ = pool.estimate_amount_out(U256::from(10_000u64), true);
        assert_eq!(pool.sqrt_price_x64, before);
        assert_eq!(pool.liquidity, before_liq);
    }

    #[test]
    fn estimate_amount_out_matches_real_swap() {
        let pool = seeded_pool();
        let estimate = pool.estimate_amount_out(U256::from(10_000u64), true);

        let mut mutated = pool.clone();
        let real_out = mutated.apply_swap(U256::from(10_000u64), true);

        assert_eq!(estimate.amount_out, real_out);
    }

    #[test]
    fn estimate_amount_in_round_trips_amount_out() {
        let pool = seeded_pool();
        let forward = pool.estimate_amount_out(U256::from(10_000u64), true);
        if forward.amount_out.is_zero() {
            return;
        }
        let back = pool.estimate_amount_in(forward.amount_out, true);
        assert!(back.amount_in > U256::ZERO);
    }

    #[test]
    fn estimate_swap_cost_agrees_with_estimate_amount_out() {
        let pool = seeded_pool();
        let amount_in = U256::from(10_000u64);
        let cost = pool.estimate_swap_cost(amount_in, true);
        let out = pool.estimate_amount_out(amount_in, true);

        assert_eq!(cost.amount_out, out.amount_out);
        assert_eq!(cost.fee_amount, out.fee_amount);
        assert_eq!(cost.total_cost, amount_in);
    }
}
