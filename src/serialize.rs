//! Textual snapshot format. JSON numbers cannot losslessly carry
//! 128/256-bit integers, so every big integer crosses the wire as a
//! decimal string; `u256_decimal` is a small `serde` `with`-module doing
//! that conversion for the `serialize` direction. Grounded on the
//! source oracle's `serialize`/`deserialize` (itself `json.dumps`/
//! `json.loads` with `str(...)` around every big int, and plain
//! `dict`-key access — `state["field"]`/`int(state["field"])` — raising
//! `KeyError`/`ValueError` on missing or malformed fields) and, for the
//! `serde`-module idiom, on how `FeelsDEX-feels` carries its own
//! decimal-string amounts through `serde_json`.
//!
//! `deserialize` reads the snapshot as a bare `serde_json::Value` and
//! extracts each field itself rather than deriving `Deserialize`, so it
//! can distinguish *which* boundary failure occurred: malformed JSON
//! syntax (`EngineError::InvalidJson`), a required field absent
//! (`EngineError::MissingField`), and a present field that isn't a
//! valid integer (`EngineError::InvalidInteger`) are reported as
//! different variants instead of being flattened into one.

use std::str::FromStr;

use alloy_primitives::U256;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::EngineError;
use crate::pool::{Pool, ValidationStats};
use crate::tick::TickData;

pub mod u256_decimal {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickSnapshot {
    pub tick: i32,
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    #[serde(with = "u256_decimal")]
    pub fee_growth_outside0_x64: U256,
    #[serde(with = "u256_decimal")]
    pub fee_growth_outside1_x64: U256,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshot {
    #[serde(with = "u256_decimal")]
    pub reserve_a: U256,
    #[serde(with = "u256_decimal")]
    pub reserve_b: U256,
    #[serde(with = "u256_decimal")]
    pub sqrt_price_x64: U256,
    #[serde(with = "u256_decimal")]
    pub liquidity: U256,
    pub tick_current: i32,
    pub fee_rate: f64,
    pub tick_spacing: u32,
    pub fee_rate_ppm: u32,
    pub protocol_fee_share_numerator: u64,
    pub protocol_fee_share_denominator: u64,
    #[serde(with = "u256_decimal")]
    pub fee_growth_global0_x64: U256,
    #[serde(with = "u256_decimal")]
    pub fee_growth_global1_x64: U256,
    #[serde(with = "u256_decimal")]
    pub total_swap_fee0: U256,
    #[serde(with = "u256_decimal")]
    pub total_swap_fee1: U256,
    pub ticks: Vec<TickSnapshot>,
    pub tick_bitmap: Vec<i32>,
}

/// Looks up a required field, distinguishing its absence from any later
/// parse failure.
fn require<'a>(obj: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value, EngineError> {
    obj.get(field).ok_or(EngineError::MissingField(field))
}

/// Decodes a required decimal-string big integer.
fn require_u256(obj: &Map<String, Value>, field: &'static str) -> Result<U256, EngineError> {
    parse_u256(field, require(obj, field)?)
}

/// Decodes an optional decimal-string big integer, defaulting when the
/// field is absent entirely (still a typed error if present but
/// malformed).
fn optional_u256(obj: &Map<String, Value>, field: &'static str, default: U256) -> Result<U256, EngineError> {
    match obj.get(field) {
        None => Ok(default),
        Some(value) => parse_u256(field, value),
    }
}

fn parse_u256(field: &'static str, value: &Value) -> Result<U256, EngineError> {
    let s = value
        .as_str()
        .ok_or_else(|| EngineError::InvalidInteger { field, value: value.to_string() })?;
    U256::from_str(s).map_err(|_| EngineError::InvalidInteger { field, value: s.to_string() })
}

/// Decodes a required plain-JSON-number field (anything that fits
/// natively, i.e. not one of the big integers carried as a decimal
/// string).
fn require_number<T: serde::de::DeserializeOwned>(obj: &Map<String, Value>, field: &'static str) -> Result<T, EngineError> {
    let value = require(obj, field)?;
    serde_json::from_value(value.clone()).map_err(|_| EngineError::InvalidInteger { field, value: value.to_string() })
}

fn optional_number<T: serde::de::DeserializeOwned>(obj: &Map<String, Value>, field: &'static str, default: T) -> Result<T, EngineError> {
    match obj.get(field) {
        None => Ok(default),
        Some(value) => {
            serde_json::from_value(value.clone()).map_err(|_| EngineError::InvalidInteger { field, value: value.to_string() })
        }
    }
}

fn parse_tick_snapshot(value: &Value) -> Result<TickSnapshot, EngineError> {
    let obj = value
        .as_object()
        .ok_or_else(|| EngineError::InvalidInteger { field: "ticks[]", value: value.to_string() })?;

    Ok(TickSnapshot {
        tick: require_number(obj, "tick")?,
        liquidity_net: require_number(obj, "liquidityNet")?,
        liquidity_gross: require_number(obj, "liquidityGross")?,
        fee_growth_outside0_x64: require_u256(obj, "feeGrowthOutside0X64")?,
        fee_growth_outside1_x64: require_u256(obj, "feeGrowthOutside1X64")?,
    })
}

impl Pool {
    /// Renders the full pool state as the textual snapshot format.
    pub fn serialize(&self) -> Result<String, EngineError> {
        let snapshot = PoolSnapshot {
            reserve_a: self.reserve_a,
            reserve_b: self.reserve_b,
            sqrt_price_x64: self.sqrt_price_x64,
            liquidity: U256::from(self.liquidity),
            tick_current: self.tick_current,
            fee_rate: self.fee_rate_ppm as f64 / 1_000_000.0,
            tick_spacing: self.tick_spacing,
            fee_rate_ppm: self.fee_rate_ppm,
            protocol_fee_share_numerator: self.protocol_fee_share_numerator,
            protocol_fee_share_denominator: self.protocol_fee_share_denominator,
            fee_growth_global0_x64: self.fee_growth_global0_x64,
            fee_growth_global1_x64: self.fee_growth_global1_x64,
            total_swap_fee0: self.total_swap_fee0,
            total_swap_fee1: self.total_swap_fee1,
            ticks: self
                .tick_book
                .ticks
                .iter()
                .map(|(tick, data)| TickSnapshot {
                    tick: *tick,
                    liquidity_net: data.liquidity_net,
                    liquidity_gross: data.liquidity_gross,
                    fee_growth_outside0_x64: data.fee_growth_outside0_x64,
                    fee_growth_outside1_x64: data.fee_growth_outside1_x64,
                })
                .collect(),
            tick_bitmap: self.tick_book.initialized.iter().copied().collect(),
        };

        serde_json::to_string_pretty(&snapshot).map_err(EngineError::InvalidJson)
    }

    /// Reconstructs a pool from a snapshot produced by [`Pool::serialize`].
    pub fn deserialize(json: &str) -> Result<Pool, EngineError> {
        let value: Value = serde_json::from_str(json)?;
        let obj = value
            .as_object()
            .ok_or_else(|| EngineError::InvalidInteger { field: "<root>", value: value.to_string() })?;

        let reserve_a = require_u256(obj, "reserveA")?;
        let reserve_b = require_u256(obj, "reserveB")?;
        let sqrt_price_x64 = require_u256(obj, "sqrtPriceX64")?;
        let liquidity = require_u256(obj, "liquidity")?.to::<u128>();
        let tick_current = require_number(obj, "tickCurrent")?;
        require(obj, "feeRate")?; // carried on the wire, not authoritative; see design notes.
        let tick_spacing = require_number(obj, "tickSpacing")?;
        let fee_rate_ppm = require_number(obj, "feeRatePpm")?;
        let protocol_fee_share_numerator = optional_number(obj, "protocolFeeShareNumerator", 1u64)?;
        let protocol_fee_share_denominator = optional_number(obj, "protocolFeeShareDenominator", 5u64)?;
        let fee_growth_global0_x64 = require_u256(obj, "feeGrowthGlobal0X64")?;
        let fee_growth_global1_x64 = require_u256(obj, "feeGrowthGlobal1X64")?;
        let total_swap_fee0 = optional_u256(obj, "totalSwapFee0", U256::ZERO)?;
        let total_swap_fee1 = optional_u256(obj, "totalSwapFee1", U256::ZERO)?;

        let ticks_value = require(obj, "ticks")?;
        let ticks = ticks_value
            .as_array()
            .ok_or_else(|| EngineError::InvalidInteger { field: "ticks", value: ticks_value.to_string() })?;
        let mut tick_book = crate::tick::TickBook::new();
        for t in ticks {
            let snapshot = parse_tick_snapshot(t)?;
            tick_book.ticks.insert(
                snapshot.tick,
                TickData {
                    liquidity_net: snapshot.liquidity_net,
                    liquidity_gross: snapshot.liquidity_gross,
                    fee_growth_outside0_x64: snapshot.fee_growth_outside0_x64,
                    fee_growth_outside1_x64: snapshot.fee_growth_outside1_x64,
                },
            );
        }

        let tick_bitmap: Vec<i32> = require_number(obj, "tickBitmap")?;
        tick_book.initialized = tick_bitmap.into_iter().collect();

        Ok(Pool {
            reserve_a,
            reserve_b,
            sqrt_price_x64,
            liquidity,
            tick_current,
            fee_rate_ppm,
            tick_spacing,
            protocol_fee_share_numerator,
            protocol_fee_share_denominator,
            fee_growth_global0_x64,
            fee_growth_global1_x64,
            total_swap_fee0,
            total_swap_fee1,
            tick_book,
            validation_stats: ValidationStats::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::math::tick_to_sqrt_price_x64;

    #[test]
    fn round_trip_preserves_state() {
        let mut pool = Pool::new(PoolConfig::new(100, 60), tick_to_sqrt_price_x64(7));
        pool.liquidity = 1_000_000;
        pool.apply_liquidity_delta(5, 10, 1000);
        pool.apply_swap(U256::from(10_000u64), true);

        let json = pool.serialize().unwrap();
        let restored = Pool::deserialize(&json).unwrap();

        assert_eq!(restored.liquidity, pool.liquidity);
        assert_eq!(restored.tick_current, pool.tick_current);
        assert_eq!(restored.sqrt_price_x64, pool.sqrt_price_x64);
        assert_eq!(restored.tick_book.ticks.len(), pool.tick_book.ticks.len());
        assert_eq!(restored.tick_book.initialized, pool.tick_book.initialized);
    }

    #[test]
    fn missing_optional_fields_default() {
        let pool = Pool::new(PoolConfig::new(100, 60), tick_to_sqrt_price_x64(0));
        let json = pool.serialize().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value.as_object_mut().unwrap().remove("protocolFeeShareNumerator");
        value.as_object_mut().unwrap().remove("totalSwapFee0");

        let restored = Pool::deserialize(&value.to_string()).unwrap();
        assert_eq!(restored.protocol_fee_share_numerator, 1);
        assert_eq!(restored.total_swap_fee0, U256::ZERO);
    }

    #[test]
    fn malformed_json_is_a_typed_error() {
        let err = Pool::deserialize("not json").unwrap_err();
        assert!(matches!(err, EngineError::InvalidJson(_)));
    }

    #[test]
    fn missing_required_field_is_a_typed_error() {
        let pool = Pool::new(PoolConfig::new(100, 60), tick_to_sqrt_price_x64(0));
        let json = pool.serialize().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value.as_object_mut().unwrap().remove("sqrtPriceX64");

        let err = Pool::deserialize(&value.to_string()).unwrap_err();
        assert!(matches!(err, EngineError::MissingField("sqrtPriceX64")));
    }

    #[test]
    fn non_decimal_big_integer_is_a_typed_error() {
        let pool = Pool::new(PoolConfig::new(100, 60), tick_to_sqrt_price_x64(0));
        let json = pool.serialize().unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value.as_object_mut().unwrap().insert("reserveA".to_string(), serde_json::json!("not-a-number"));

        let err = Pool::deserialize(&value.to_string()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInteger { field: "reserveA", .. }));
    }
}
