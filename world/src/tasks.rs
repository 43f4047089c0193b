//! Work deferred to the next tick of the owning simulation loop.

use std::collections::VecDeque;

use snare_core::{CreatureId, TrapId};

/// Mutation requested from a foreign iteration context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DeferredTask {
    /// Close the trap on the creature that ate its bait.
    Snap { trap: TrapId, creature: CreatureId },
}

/// FIFO of deferred tasks, drained once at the start of every tick.
#[derive(Debug, Default)]
pub(crate) struct MainThreadQueue {
    tasks: VecDeque<DeferredTask>,
}

impl MainThreadQueue {
    pub(crate) fn push(&mut self, task: DeferredTask) {
        self.tasks.push_back(task);
    }

    /// Takes every task queued so far. Tasks pushed while the batch runs wait
    /// for the following tick.
    pub(crate) fn take_batch(&mut self) -> Vec<DeferredTask> {
        self.tasks.drain(..).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.tasks.len()
    }
}
