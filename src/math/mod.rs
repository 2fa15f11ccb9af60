pub mod constants;
pub mod full_math;
pub mod tick_math;

pub use full_math::{mul_div_ceil, mul_div_floor, submod};
pub use tick_math::{sqrt_price_to_tick_x64, tick_to_sqrt_price_x64, MAX_TICK, MIN_TICK};
