//! Coordinator dependency grouping.
//!
//! Not a builder: no defaults, no hidden construction logic, just the set of
//! collaborators the coordinator needs, grouped so construction sites stay
//! readable. All ports are required.

use std::path::PathBuf;
use std::sync::Arc;

use cc_core::ports::{
    ChangeNotifier, ClockPort, ImageProcessorPort, LocalStorePort, RemoteClientPort,
    TagClassifierPort,
};

pub struct CoordinatorDeps {
    pub store: Arc<dyn LocalStorePort>,
    pub remote: Arc<dyn RemoteClientPort>,
    pub image_processor: Arc<dyn ImageProcessorPort>,
    pub classifier: Arc<dyn TagClassifierPort>,
    pub clock: Arc<dyn ClockPort>,
    pub notifier: Arc<dyn ChangeNotifier>,

    /// Directory downloaded originals and thumbnails are written under.
    pub download_dir: PathBuf,
}
