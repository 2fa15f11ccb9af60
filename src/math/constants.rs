//! Magic constants for the tick <-> sqrt-price bit-table, carried over
//! from the canonical Uniswap v3 `TickMath` table. The table entries are
//! Q128.128 values (`sqrt(1.0001^(2^i)) * 2^128`), independent of the
//! final fixed-point scale the caller wants, so they port unchanged from
//! a Q64.96 host to the Q64.64 one this crate uses; only the final
//! right-shift amount in `tick_math` changes.

use alloy_primitives::U256;

pub const U256_1: U256 = U256::from_limbs([1, 0, 0, 0]);
pub const U256_2: U256 = U256::from_limbs([2, 0, 0, 0]);
pub const U256_3: U256 = U256::from_limbs([3, 0, 0, 0]);

pub const FIXED_POINT64_RESOLUTION: u8 = 64;
pub const U256_MAX_TICK: U256 = U256::from_limbs([887272, 0, 0, 0]);

pub const FIXED_POINT128_RESOLUTION: u8 = 128;
pub const Q128: U256 = U256::from_limbs([0, 0, 1, 0]);

pub const U256_4: U256 = U256::from_limbs([4, 0, 0, 0]);
pub const U256_8: U256 = U256::from_limbs([8, 0, 0, 0]);
pub const U256_16: U256 = U256::from_limbs([16, 0, 0, 0]);
pub const U256_32: U256 = U256::from_limbs([32, 0, 0, 0]);
pub const U256_64: U256 = U256::from_limbs([64, 0, 0, 0]);
pub const U256_128: U256 = U256::from_limbs([128, 0, 0, 0]);
pub const U256_256: U256 = U256::from_limbs([256, 0, 0, 0]);
pub const U256_512: U256 = U256::from_limbs([512, 0, 0, 0]);
pub const U256_1024: U256 = U256::from_limbs([1024, 0, 0, 0]);
pub const U256_2048: U256 = U256::from_limbs([2048, 0, 0, 0]);
pub const U256_4096: U256 = U256::from_limbs([4096, 0, 0, 0]);
pub const U256_8192: U256 = U256::from_limbs([8192, 0, 0, 0]);
pub const U256_16384: U256 = U256::from_limbs([16384, 0, 0, 0]);
pub const U256_32768: U256 = U256::from_limbs([32768, 0, 0, 0]);
pub const U256_65536: U256 = U256::from_limbs([65536, 0, 0, 0]);
pub const U256_131072: U256 = U256::from_limbs([131072, 0, 0, 0]);
pub const U256_262144: U256 = U256::from_limbs([262144, 0, 0, 0]);
pub const U256_524288: U256 = U256::from_limbs([524288, 0, 0, 0]);
