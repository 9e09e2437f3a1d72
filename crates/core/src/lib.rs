//! Gacha pool model and roll engine. Keep this crate free of IO and platform concerns.

pub mod aggregate;
pub mod card;
pub mod config;
pub mod error;
pub mod pool;
pub mod rates;
pub mod rng;
pub mod roll;
pub mod sampler;

pub use aggregate::*;
pub use card::*;
pub use config::*;
pub use error::*;
pub use pool::*;
pub use rates::*;
pub use rng::*;
pub use roll::*;
pub use sampler::*;
