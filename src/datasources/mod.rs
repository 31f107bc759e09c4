mod datasource;
mod metapool;
mod ticker;

pub use datasource::{FieldSource, PoolStats, TokenTicker};
pub use metapool::MetapoolDataSource;
pub use ticker::TickerDataSource;
