pub mod executor;
pub mod mappers;
pub mod models;
pub mod pool;
pub mod schema;
pub mod store;

pub use executor::{DbExecutor, DieselSqliteExecutor};
pub use pool::{init_db_pool, DbPool};
pub use store::DieselLocalStore;
