//! In-memory concentrated liquidity market maker pool engine.
//!
//! A [`Pool`](pool::Pool) tracks tick-indexed liquidity, a Q64.64
//! fixed-point price, and per-token fee-growth accumulators, and applies
//! swaps by walking the tick book one initialized tick at a time. The
//! engine is synchronous and has no I/O; a host embeds it and owns
//! concurrency, persistence, and networking around it.

pub mod config;
pub mod error;
pub mod estimate;
pub mod fee;
pub mod liquidity;
pub mod math;
pub mod pool;
pub mod serialize;
pub mod swap;
pub mod tick;

pub use config::PoolConfig;
pub use error::EngineError;
pub use pool::Pool;
