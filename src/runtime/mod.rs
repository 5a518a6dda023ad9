//! Runtime adapters: task spawning and host shutdown notification.

pub mod shutdown;
pub mod tokio_spawner;

pub use shutdown::{CtrlCShutdown, ManualShutdown, ShutdownHook, ShutdownSignal};
pub use tokio_spawner::TokioSpawner;
