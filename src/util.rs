use std::sync::atomic::{AtomicBool, Ordering};

/// Check whether a cancellation flag has been raised.
#[must_use]
pub fn cancel_requested(cancel: &AtomicBool) -> bool {
    cancel.load(Ordering::SeqCst)
}

/// Shorten `text` to `max_len` characters, marking the cut with an ellipsis.
#[must_use]
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max_len).collect();
    out.push_str("...");
    out
}
