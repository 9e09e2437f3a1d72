use crate::RateField;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GachaError {
    #[error("pool {pool} unavailable: {reason}")]
    PoolUnavailable { pool: u32, reason: String },
    #[error("pool {0} has no cards")]
    EmptyPool(u32),
    #[error("pool {pool} has no drawable weight for {field:?} rate")]
    NoDrawableWeight { pool: u32, field: RateField },
    #[error("invalid draw count {count} (expected 1..={max})")]
    InvalidDrawCount { count: u32, max: u32 },
}
