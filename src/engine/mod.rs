pub mod aggregator;
pub mod dispatcher;
pub mod events;
pub mod executor;
pub mod session;

pub use aggregator::Aggregator;
pub use dispatcher::Dispatcher;
pub use events::ScanEvent;
pub use executor::ProbeExecutor;
pub use session::{ScanConfig, ScanSession};
