//! Non-fatal layout warnings.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the style adapter and the box tree builder to report unsupported
//! values that were replaced by their initial value.
//!
//! The set of reported warnings belongs to the calling thread. A layout
//! runs on the thread that requested it, so layouts on other threads keep
//! their own deduplication state and [`clear_warnings`] only resets the
//! caller's.

use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
    /// Warnings this thread has already emitted (to deduplicate)
    static WARNED: RefCell<HashSet<String>> = RefCell::new(HashSet::new());
}

/// Warn about an unsupported value (emits once per unique message)
///
/// # Example
/// ```
/// use flowbox_common::warning::warn_once;
///
/// warn_once("style", "unsupported display value 'grid', using block");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let first = WARNED.with(|warned| warned.borrow_mut().insert(key));

    if first {
        log::warn!(target: "flowbox", "[{component}] {message}");
    }
}

/// Whether `message` has been reported for `component` on this thread since
/// the last [`clear_warnings`].
#[must_use]
pub fn has_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    WARNED.with(|warned| warned.borrow().contains(&key))
}

/// Clear this thread's recorded warnings (call at the start of a new layout
/// pass)
pub fn clear_warnings() {
    WARNED.with(|warned| warned.borrow_mut().clear());
}
