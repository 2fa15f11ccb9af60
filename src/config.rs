/// Configuration consumed by [`crate::pool::Pool::new`]. Keeps pool
/// construction to a small typed surface instead of a long positional
/// argument list, the way Uniswap V3's `PoolState` and `Slot0` are
/// assembled field-by-field.
#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub fee_rate_ppm: u32,
    pub tick_spacing: u32,
    pub protocol_fee_share_numerator: u64,
    pub protocol_fee_share_denominator: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            fee_rate_ppm: 3000,
            tick_spacing: 60,
            protocol_fee_share_numerator: 1,
            protocol_fee_share_denominator: 5,
        }
    }
}

impl PoolConfig {
    pub fn new(fee_rate_ppm: u32, tick_spacing: u32) -> Self {
        Self {
            fee_rate_ppm,
            tick_spacing,
            ..Default::default()
        }
    }
}
