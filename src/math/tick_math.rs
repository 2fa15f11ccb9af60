//! Tick <-> Q64.64 sqrt-price conversion.
//!
//! `tick_to_sqrt_price_x64` ports Uniswap V3's `get_sqrt_ratio_at_tick`
//! bit-table verbatim: the per-bit magic constants are Q128.128 values
//! independent of the output scale, so only the final shift (64 instead
//! of 32) changes. `sqrt_price_to_tick_x64` deliberately does *not* port
//! the upstream `get_tick_at_sqrt_ratio` MSB/log2 bit-scan, which would
//! be too easy to silently mis-port without a compiler to check it.
//! Instead it takes a floating-point estimate and self-corrects it
//! against `tick_to_sqrt_price_x64` until the bracketing invariant holds
//! exactly, which gives the same integer-exact guarantee.

use super::constants::*;
use alloy_primitives::U256;

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = -MIN_TICK;

/// `floor(sqrt(1.0001^tick) * 2^64)`, clamping out-of-range ticks to the
/// nearest bound rather than aborting.
pub fn tick_to_sqrt_price_x64(tick: i32) -> U256 {
    let tick = tick.clamp(MIN_TICK, MAX_TICK);
    let abs_tick: U256 = U256::from(tick.unsigned_abs());

    let mut ratio = if abs_tick & U256_1 != U256::ZERO {
        U256::from_limbs([12262481743371124737, 18445821805675392311, 0, 0])
    } else {
        U256::from_limbs([0, 0, 1, 0])
    };

    if !(abs_tick & U256_2).is_zero() {
        ratio = (ratio * U256::from_limbs([6459403834229662010, 18444899583751176498, 0, 0])) >> 128
    }
    if !(abs_tick & U256_4).is_zero() {
        ratio = (ratio * U256::from_limbs([17226890335427755468, 18443055278223354162, 0, 0])) >> 128
    }
    if !(abs_tick & U256_8).is_zero() {
        ratio = (ratio * U256::from_limbs([2032852871939366096, 18439367220385604838, 0, 0])) >> 128
    }
    if !(abs_tick & U256_16).is_zero() {
        ratio = (ratio * U256::from_limbs([14545316742740207172, 18431993317065449817, 0, 0])) >> 128
    }
    if !(abs_tick & U256_32).is_zero() {
        ratio = (ratio * U256::from_limbs([5129152022828963008, 18417254355718160513, 0, 0])) >> 128
    }
    if !(abs_tick & U256_64).is_zero() {
        ratio = (ratio * U256::from_limbs([4894419605888772193, 18387811781193591352, 0, 0])) >> 128
    }
    if !(abs_tick & U256_128).is_zero() {
        ratio = (ratio * U256::from_limbs([1280255884321894483, 18329067761203520168, 0, 0])) >> 128
    }
    if !(abs_tick & U256_256).is_zero() {
        ratio = (ratio * U256::from_limbs([15924666964335305636, 18212142134806087854, 0, 0])) >> 128
    }
    if !(abs_tick & U256_512).is_zero() {
        ratio = (ratio * U256::from_limbs([8010504389359918676, 17980523815641551639, 0, 0])) >> 128
    }
    if !(abs_tick & U256_1024).is_zero() {
        ratio = (ratio * U256::from_limbs([10668036004952895731, 17526086738831147013, 0, 0])) >> 128
    }
    if !(abs_tick & U256_2048).is_zero() {
        ratio = (ratio * U256::from_limbs([4878133418470705625, 16651378430235024244, 0, 0])) >> 128
    }
    if !(abs_tick & U256_4096).is_zero() {
        ratio = (ratio * U256::from_limbs([9537173718739605541, 15030750278693429944, 0, 0])) >> 128
    }
    if !(abs_tick & U256_8192).is_zero() {
        ratio = (ratio * U256::from_limbs([9972618978014552549, 12247334978882834399, 0, 0])) >> 128
    }
    if !(abs_tick & U256_16384).is_zero() {
        ratio = (ratio * U256::from_limbs([10428997489610666743, 8131365268884726200, 0, 0])) >> 128
    }
    if !(abs_tick & U256_32768).is_zero() {
        ratio = (ratio * U256::from_limbs([9305304367709015974, 3584323654723342297, 0, 0])) >> 128
    }
    if !(abs_tick & U256_65536).is_zero() {
        ratio = (ratio * U256::from_limbs([14301143598189091785, 696457651847595233, 0, 0])) >> 128
    }
    if !(abs_tick & U256_131072).is_zero() {
        ratio = (ratio * U256::from_limbs([7393154844743099908, 26294789957452057, 0, 0])) >> 128
    }
    if !(abs_tick & U256_262144).is_zero() {
        ratio = (ratio * U256::from_limbs([2209338891292245656, 37481735321082, 0, 0])) >> 128
    }
    if !(abs_tick & U256_524288).is_zero() {
        ratio = (ratio * U256::from_limbs([10518117631919034274, 76158723, 0, 0])) >> 128
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q64.64, strict floor (no rounding-up correction: the
    // spec requires floor, and the sequence is already monotone).
    ratio >> (FIXED_POINT128_RESOLUTION - FIXED_POINT64_RESOLUTION)
}

/// Approximate `log2(x)` for a U256 treated as an integer, used only to
/// seed the self-correcting search below. Precision loss here is fine;
/// the subsequent bracket check makes the final tick exact.
fn approx_log2(x: U256) -> f64 {
    if x.is_zero() {
        return f64::NEG_INFINITY;
    }
    let bits = 256 - x.leading_zeros();
    // Take the top 64 bits as a mantissa to get sub-integer precision.
    let shift = bits.saturating_sub(64);
    let top = (x >> shift).to::<u64>() as f64;
    (bits as f64 - 64.0) + top.log2()
}

/// `floor(log(sqrtX64 / 2^64) * 2 / log(1.0001))`, returning 0 when
/// `sqrt_price <= 0`. The floating-point estimate is corrected against
/// `tick_to_sqrt_price_x64` so the returned tick always satisfies the
/// data-model bracketing invariant exactly.
pub fn sqrt_price_to_tick_x64(sqrt_price: U256) -> i32 {
    if sqrt_price.is_zero() {
        return 0;
    }

    let log2_price = approx_log2(sqrt_price) - FIXED_POINT64_RESOLUTION as f64;
    let log2_base = 1.0001_f64.log2();
    let estimate = (2.0 * log2_price / log2_base).floor();

    let mut tick = (estimate as i64).clamp(MIN_TICK as i64, MAX_TICK as i64) as i32;

    // Self-correct: walk until tick_to_sqrt_price(tick) <= sqrt_price <
    // tick_to_sqrt_price(tick + 1). Floating point error here is at most
    // a handful of ticks even at the extremes of the range, so this loop
    // terminates quickly.
    loop {
        let lower = tick_to_sqrt_price_x64(tick);
        if sqrt_price < lower {
            if tick <= MIN_TICK {
                break;
            }
            tick -= 1;
            continue;
        }
        if tick >= MAX_TICK {
            break;
        }
        let upper = tick_to_sqrt_price_x64(tick + 1);
        if sqrt_price >= upper {
            tick += 1;
            continue;
        }
        break;
    }

    tick
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotone_over_range() {
        let mut prev = tick_to_sqrt_price_x64(MIN_TICK);
        for t in (MIN_TICK + 1..=MAX_TICK).step_by(2003) {
            let cur = tick_to_sqrt_price_x64(t);
            assert!(cur >= prev, "not monotone at tick {t}");
            prev = cur;
        }
    }

    #[test]
    fn round_trip_small_ticks() {
        for t in -500..500 {
            let p = tick_to_sqrt_price_x64(t);
            assert_eq!(sqrt_price_to_tick_x64(p), t, "round trip failed at tick {t}");
        }
    }

    #[test]
    fn tick_zero_is_one() {
        // sqrt(1.0001^0) * 2^64 == 2^64 exactly.
        let one_x64 = U256::from(1u64) << 64;
        assert_eq!(tick_to_sqrt_price_x64(0), one_x64);
    }

    #[test]
    fn zero_price_maps_to_zero_tick() {
        assert_eq!(sqrt_price_to_tick_x64(U256::ZERO), 0);
    }
}
