//! Shared utilities.

pub mod clock;
pub mod panic;
pub mod telemetry;

pub use clock::now_ms;
pub use panic::{contain_panic, panic_message};
pub use telemetry::init_tracing;
