//! Engine time source.

use spell_core::Millis;
use tokio::time::Instant;

/// Milliseconds since engine start.
///
/// Built on tokio's clock so paused-time tests can advance it.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn now(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
