//! Panic containment for user-supplied callbacks.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Best-effort text of a panic payload.
pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into())
}

/// Run `f`, logging a panic at `error` instead of unwinding.
///
/// Returns false if `f` panicked.
pub fn contain_panic<F: FnOnce()>(context: &str, f: F) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(panic) => {
            tracing::error!("{} panicked: {}", context, panic_message(&*panic));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }

    #[test]
    fn test_contain_panic() {
        assert!(contain_panic("noop", || {}));
        assert!(!contain_panic("observer", || panic!("boom")));
    }
}
