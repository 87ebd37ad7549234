use std::sync::atomic::{AtomicU64, Ordering};

// The formatting functions never fail outward; this counter is how a
// caller can tell that values were handed back unchanged.
static UNFORMATTED: AtomicU64 = AtomicU64::new(0);

pub(crate) fn note_unformatted() {
    UNFORMATTED.fetch_add(1, Ordering::Relaxed);
}

/// Number of values left unformatted since the last reset.
pub fn unformatted_count() -> u64 {
    UNFORMATTED.load(Ordering::Relaxed)
}

/// Clears the counter, typically at the start of a run so the summary
/// covers one invocation.
pub fn reset_unformatted() {
    UNFORMATTED.store(0, Ordering::Relaxed);
}
