use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Tag stamped on every route intent. Tokens are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Total order over route intents.
///
/// `0` is the "nothing issued yet" state; the first token handed out is `1`.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_generation(&self) -> Generation {
        Generation(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: Generation) -> bool {
        token.0 != 0 && self.latest.load(Ordering::SeqCst) == token.0
    }

    pub fn latest(&self) -> Generation {
        Generation(self.latest.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
#[path = "tests/sequencer_tests.rs"]
mod tests;
