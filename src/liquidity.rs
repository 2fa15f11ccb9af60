//! Liquidity manager: applying signed liquidity deltas across a tick
//! range. Grounded on Uniswap V3's `tick::update`, generalized from
//! the position-upper/lower two-call shape into a single entry point
//! that updates both boundary ticks and the active liquidity.

use crate::pool::Pool;

impl Pool {
    /// Applies `liquidity_delta` over `[tick_lower, tick_upper)`.
    /// Updates both boundary ticks unconditionally, and the pool's
    /// active liquidity only when the current tick sits inside the
    /// range. Active liquidity is clamped to non-negative: a caller
    /// applying an inconsistent sequence of deltas (e.g. removing more
    /// than was added) cannot drive liquidity negative.
    pub fn apply_liquidity_delta(&mut self, tick_lower: i32, tick_upper: i32, liquidity_delta: i128) {
        if liquidity_delta == 0 {
            return;
        }

        let gross_delta = liquidity_delta.unsigned_abs() as i128;
        self.tick_book.update_tick(tick_lower, liquidity_delta, gross_delta);
        self.tick_book.update_tick(tick_upper, -liquidity_delta, gross_delta);

        if tick_lower <= self.tick_current && self.tick_current < tick_upper {
            let new_liquidity = self.liquidity as i128 + liquidity_delta;
            if new_liquidity < 0 {
                tracing::warn!(
                    tick_lower,
                    tick_upper,
                    liquidity_delta,
                    "liquidity delta would drive active liquidity negative; clamping to zero"
                );
            }
            self.liquidity = new_liquidity.max(0) as u128;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::math::tick_to_sqrt_price_x64;

    #[test]
    fn delta_inside_range_adjusts_active_liquidity() {
        let mut pool = crate::pool::Pool::new(PoolConfig::new(100, 60), tick_to_sqrt_price_x64(7));
        pool.apply_liquidity_delta(5, 10, 1000);

        assert_eq!(pool.liquidity, 1000);
        assert_eq!(pool.tick_book.get(5).unwrap().liquidity_net, 1000);
        assert_eq!(pool.tick_book.get(5).unwrap().liquidity_gross, 1000);
        assert_eq!(pool.tick_book.get(10).unwrap().liquidity_net, -1000);
        assert_eq!(pool.tick_book.get(10).unwrap().liquidity_gross, 1000);
    }

    #[test]
    fn delta_outside_range_does_not_touch_active_liquidity() {
        let mut pool = crate::pool::Pool::new(PoolConfig::new(100, 60), tick_to_sqrt_price_x64(7));
        pool.apply_liquidity_delta(100, 200, 1000);
        assert_eq!(pool.liquidity, 0);
    }

    #[test]
    fn round_trip_net_zero_removes_ticks() {
        let mut pool = crate::pool::Pool::new(PoolConfig::new(100, 60), tick_to_sqrt_price_x64(7));
        pool.apply_liquidity_delta(5, 10, 1000);
        pool.apply_liquidity_delta(5, 10, -1000);

        assert_eq!(pool.liquidity, 0);
        assert!(pool.tick_book.get(5).is_none());
        assert!(pool.tick_book.get(10).is_none());
    }
}
