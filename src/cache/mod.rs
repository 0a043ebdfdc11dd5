pub mod query;

pub use query::CacheKey;
pub use query::QueryCache;
