//! Loop layouts: which tick loop runs a task anchored at a location.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use spell_core::{Location, RegionId};
use tracing::debug;

use super::tick_loop::TickLoop;

/// Resolves the loop that owns a location.
///
/// Resolution happens per invocation, so a task whose anchor moves is
/// dispatched to whichever loop owns its current position.
pub trait LoopTopology: Send + Sync {
    /// Loop for `anchor`; `None` anchors run on the global loop. Returns
    /// `None` once the topology has been stopped.
    fn loop_for(&self, anchor: Option<&Location>) -> Option<TickLoop>;

    /// Number of live loops.
    fn loop_count(&self) -> usize;

    /// Closes every loop. Queued jobs still drain.
    fn stop(&self);
}

// ============================================================================
// Single loop
// ============================================================================

/// Everything runs on one global loop.
pub struct SingleLoop {
    global: Mutex<Option<TickLoop>>,
}

impl SingleLoop {
    pub fn new() -> Self {
        let (global, _) = TickLoop::spawn("global");
        Self {
            global: Mutex::new(Some(global)),
        }
    }
}

impl LoopTopology for SingleLoop {
    fn loop_for(&self, _anchor: Option<&Location>) -> Option<TickLoop> {
        self.global
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn loop_count(&self) -> usize {
        usize::from(self.loop_for(None).is_some())
    }

    fn stop(&self) {
        self.global
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

// ============================================================================
// Regional loops
// ============================================================================

/// A global loop plus one loop per region, created on first use.
///
/// Opening a new region drops every region loop that is idle, so the number
/// of live loops follows the regions with work in flight.
pub struct RegionalLoops {
    region_size: u32,
    state: Mutex<RegionalState>,
}

struct RegionalState {
    /// `None` once stopped.
    global: Option<TickLoop>,
    regions: HashMap<RegionId, TickLoop>,
}

impl RegionalLoops {
    pub fn new(region_size: u32) -> Self {
        let (global, _) = TickLoop::spawn("global");
        Self {
            region_size: region_size.max(1),
            state: Mutex::new(RegionalState {
                global: Some(global),
                regions: HashMap::new(),
            }),
        }
    }

    pub fn region_size(&self) -> u32 {
        self.region_size
    }
}

impl LoopTopology for RegionalLoops {
    fn loop_for(&self, anchor: Option<&Location>) -> Option<TickLoop> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let global = state.global.clone()?;

        let Some(anchor) = anchor else {
            return Some(global);
        };

        let region = RegionId::containing(anchor, self.region_size);
        if !state.regions.contains_key(&region) {
            let before = state.regions.len();
            state.regions.retain(|_, tick_loop| !tick_loop.is_idle());
            let reaped = before - state.regions.len();
            if reaped > 0 {
                debug!(target: "runtime::scheduler", reaped, "dropped idle region loops");
            }
        }
        let tick_loop = state.regions.entry(region).or_insert_with(|| {
            debug!(
                target: "runtime::scheduler",
                world = region.world.0,
                x = region.x,
                z = region.z,
                "starting region loop"
            );
            let name = format!("region[{}:{},{}]", region.world.0, region.x, region.z);
            TickLoop::spawn(name).0
        });
        Some(tick_loop.clone())
    }

    fn loop_count(&self) -> usize {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match state.global {
            Some(_) => state.regions.len() + 1,
            None => 0,
        }
    }

    fn stop(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        // Dropping the senders lets each loop drain and exit.
        state.global = None;
        state.regions.clear();
    }
}
