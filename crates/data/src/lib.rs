//! Pool repository: upstream tables, name translation, and the on-disk pool cache.

pub mod cache;
pub mod load;
pub mod repository;
pub mod schema;

pub use cache::*;
pub use load::*;
pub use repository::*;
pub use schema::*;
