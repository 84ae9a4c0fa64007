//! Ports implemented by the outer layers.

mod clock;
mod media;
mod notify;
mod remote;
mod store;

pub use clock::ClockPort;
pub use media::{ImageProcessorPort, TagClassifierPort};
pub use notify::{ChangeNotifier, NoopNotifier};
pub use remote::RemoteClientPort;
pub use store::{EvictedItem, LocalStorePort};
