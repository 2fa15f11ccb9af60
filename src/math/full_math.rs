//! Overflow-safe 256-bit multiply-divide, ported from Uniswap V3's
//! `full_math::mul_div` (itself Remco Bloemen's algorithm). These never
//! abort on degenerate input: unlike the upstream `Result<U256, String>`
//! signature, zero divisor/operands are folded into the plain-value
//! return rather than surfaced as an error.

use super::constants::{U256_1, U256_2, U256_3};
use alloy_primitives::U256;

/// `floor(a * b / denominator)`, correct even when `a * b` overflows 256
/// bits, as long as the quotient itself fits in 256 bits. Returns 0 when
/// `a`, `b`, or `denominator` is zero.
pub fn mul_div_floor(a: U256, b: U256, denominator: U256) -> U256 {
    if a.is_zero() || b.is_zero() || denominator.is_zero() {
        return U256::ZERO;
    }

    let mm = a.mul_mod(b, U256::MAX);
    let mut prod0 = a.overflowing_mul(b).0;
    let mut prod1 = mm
        .overflowing_sub(prod0)
        .0
        .overflowing_sub(U256::from(mm < prod0))
        .0;

    if prod1.is_zero() {
        return prod0.wrapping_div(denominator);
    }

    if denominator <= prod1 {
        // Quotient would not fit in 256 bits; saturate rather than abort.
        return U256::MAX;
    }

    let remainder = a.mul_mod(b, denominator);
    prod1 = prod1.overflowing_sub(U256::from(remainder > prod0)).0;
    prod0 = prod0.overflowing_sub(remainder).0;

    let mut denominator = denominator;
    let mut twos = -denominator & denominator;
    denominator = denominator.wrapping_div(twos);
    prod0 = prod0.wrapping_div(twos);
    twos = (U256::ZERO.overflowing_sub(twos).0.wrapping_div(twos)).overflowing_add(U256_1).0;
    prod0 |= prod1 * twos;

    let mut inv = (U256_3 * denominator) ^ U256_2;
    inv = inv * (U256_2 - denominator * inv);
    inv = inv * (U256_2 - denominator * inv);
    inv = inv * (U256_2 - denominator * inv);
    inv = inv * (U256_2 - denominator * inv);
    inv = inv * (U256_2 - denominator * inv);
    inv = inv * (U256_2 - denominator * inv);

    prod0 * inv
}

/// `ceil(a * b / denominator)`. Returns 0 under the same degenerate
/// conditions as [`mul_div_floor`].
pub fn mul_div_ceil(a: U256, b: U256, denominator: U256) -> U256 {
    if a.is_zero() || b.is_zero() || denominator.is_zero() {
        return U256::ZERO;
    }
    let floor = mul_div_floor(a, b, denominator);
    if a.mul_mod(b, denominator) > U256::ZERO {
        floor.saturating_add(U256_1)
    } else {
        floor
    }
}

/// Saturating subtraction: `max(a - b, 0)`. This engine intentionally
/// departs from the modular two's-complement wraparound used by
/// on-chain fee-growth accounting.
pub fn submod(a: U256, b: U256) -> U256 {
    a.saturating_sub(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_div_floor_basic() {
        assert_eq!(mul_div_floor(U256::from(10u64), U256::from(5u64), U256::from(2u64)), U256::from(25u64));
        assert_eq!(mul_div_floor(U256::from(10u64), U256::from(5u64), U256::from(3u64)), U256::from(16u64));
    }

    #[test]
    fn mul_div_floor_zero_operands() {
        assert_eq!(mul_div_floor(U256::ZERO, U256::from(5u64), U256::from(3u64)), U256::ZERO);
        assert_eq!(mul_div_floor(U256::from(5u64), U256::from(5u64), U256::ZERO), U256::ZERO);
    }

    #[test]
    fn submod_saturates() {
        assert_eq!(submod(U256::from(3u64), U256::from(5u64)), U256::ZERO);
        assert_eq!(submod(U256::from(5u64), U256::from(3u64)), U256::from(2u64));
    }

    #[test]
    fn mul_div_handles_wide_intermediate() {
        let a = U256::MAX / U256::from(2u64);
        let b = U256::from(4u64);
        let d = U256::from(4u64);
        // a*b overflows 256 bits, but (a*b)/d == a exactly.
        assert_eq!(mul_div_floor(a, b, d), a);
    }
}
