pub mod db;
pub mod media;
pub mod time;

pub use time::SystemClock;
