//! End-to-end scenarios exercising the pool through its public surface
//! the way a host embedding this engine would: construct, add liquidity,
//! swap, estimate, serialize.

use alloy_primitives::U256;
use clmm_pool_engine::config::PoolConfig;
use clmm_pool_engine::math;
use clmm_pool_engine::Pool;

fn seeded_pool() -> Pool {
    let mut pool = Pool::new(PoolConfig::new(100, 60), math::tick_to_sqrt_price_x64(7));
    pool.liquidity = 1_000_000;
    pool
}

#[test]
fn new_pool_derives_tick_current_and_starts_at_zero_liquidity() {
    let pool = Pool::new(PoolConfig::new(100, 60), math::tick_to_sqrt_price_x64(7));
    assert_eq!(pool.tick_current, 7);
    assert_eq!(pool.liquidity, 0);
    assert_eq!(pool.fee_growth_global0_x64, U256::ZERO);
}

#[test]
fn calculate_fees_matches_the_hardcoded_four_fifths_split() {
    let pool = seeded_pool();
    let split = pool.calculate_fees(U256::from(10_000u64));

    // fee_rate_ppm = 100 -> raw_fee = ceil(10_000 * 100 / 1_000_000) = 1.
    assert_eq!(split.raw_fee, U256::from(1u64));
    // lp_fee = ceil(1 * 4 / 5) = 1, floored to 1 since raw_fee > 0.
    assert_eq!(split.lp_fee, U256::from(1u64));
    assert_eq!(split.protocol_fee, U256::ZERO);
    assert_eq!(split.total_fee(), split.raw_fee);
}

#[test]
fn apply_liquidity_delta_updates_active_liquidity_and_boundary_ticks() {
    let mut pool = Pool::new(PoolConfig::new(100, 60), math::tick_to_sqrt_price_x64(7));
    pool.apply_liquidity_delta(5, 10, 1000);

    assert_eq!(pool.liquidity, 1000);
    assert_eq!(pool.tick_book.get(5).unwrap().liquidity_net, 1000);
    assert_eq!(pool.tick_book.get(10).unwrap().liquidity_net, -1000);

    pool.liquidity = 1_000_000;
    pool.apply_liquidity_delta(5, 10, 1000);
    assert_eq!(pool.liquidity, 1_001_000);
}

#[test]
fn mul_div_floor_spot_checks() {
    assert_eq!(
        math::mul_div_floor(U256::from(7u64), U256::from(3u64), U256::from(2u64)),
        U256::from(10u64)
    );
    assert_eq!(math::mul_div_floor(U256::ZERO, U256::from(3u64), U256::from(2u64)), U256::ZERO);
    assert_eq!(
        math::mul_div_ceil(U256::from(7u64), U256::from(3u64), U256::from(2u64)),
        U256::from(11u64)
    );
}

#[test]
fn serialize_round_trip_preserves_ticks_and_price() {
    let mut pool = seeded_pool();
    pool.apply_liquidity_delta(5, 10, 1000);
    pool.apply_swap(U256::from(50_000u64), true);

    let json = pool.serialize().unwrap();
    let restored = Pool::deserialize(&json).unwrap();

    assert_eq!(restored.sqrt_price_x64, pool.sqrt_price_x64);
    assert_eq!(restored.tick_current, pool.tick_current);
    assert_eq!(restored.liquidity, pool.liquidity);
    assert_eq!(restored.tick_book.ticks.len(), pool.tick_book.ticks.len());
    for (tick, data) in &pool.tick_book.ticks {
        let restored_data = restored.tick_book.get(*tick).unwrap();
        assert_eq!(restored_data.liquidity_net, data.liquidity_net);
        assert_eq!(restored_data.liquidity_gross, data.liquidity_gross);
    }
}

#[test]
fn estimate_amount_out_is_pure_and_repeatable() {
    let pool = seeded_pool();
    let first = pool.estimate_amount_out(U256::from(25_000u64), true);
    let second = pool.estimate_amount_out(U256::from(25_000u64), true);

    assert_eq!(first.amount_out, second.amount_out);
    assert_eq!(pool.liquidity, 1_000_000);
    assert_eq!(pool.tick_current, 7);

    let mut mutated = pool.clone();
    let real_out = mutated.apply_swap(U256::from(25_000u64), true);
    assert_eq!(first.amount_out, real_out);
}

#[test]
fn flash_swap_repay_books_surplus_as_fee_and_replaces_reserves() {
    let mut pool = seeded_pool();
    pool.apply_repay_flash_swap(
        U256::from(1000u64),
        U256::from(2000u64),
        U256::from(1100u64),
        U256::from(2000u64),
        Some(U256::from(5000u64)),
        None,
    );

    assert!(pool.fee_growth_global0_x64 > U256::ZERO);
    assert_eq!(pool.fee_growth_global1_x64, U256::ZERO);
    assert_eq!(pool.total_swap_fee0, U256::from(100u64));
    assert_eq!(pool.reserve_a, U256::from(5000u64));
}
