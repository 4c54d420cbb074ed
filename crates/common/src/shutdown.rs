//! Shutdown observation for long-running loops.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use strata_tasks::ShutdownGuard;

/// Something a loop can poll to learn that the process is stopping.
pub trait ShutdownSignal: Send + Sync {
    fn should_shutdown(&self) -> bool;
}

impl ShutdownSignal for ShutdownGuard {
    fn should_shutdown(&self) -> bool {
        ShutdownGuard::should_shutdown(self)
    }
}

/// Manually triggered signal, used where no task manager is around.
#[derive(Debug, Clone, Default)]
pub struct ShutdownFlag(Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl ShutdownSignal for ShutdownFlag {
    fn should_shutdown(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
