//! One-time initialization driver
//!
//! Consumes the index's results for a marker capability and invokes each
//! matching type's initializer exactly once per process. Concurrent callers
//! for the same capability block until the sweep finishes; a reentrant call
//! from inside the sweep (an initializer transitively asking for the same
//! capability) is detected by owner thread and no-ops instead of
//! deadlocking. Callers for different capabilities never contend: there is
//! one slot per capability, not a global lock.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashMap;

use crate::capability::CapabilityId;
use crate::index::TypeIndex;
use crate::predicate::QueryPredicate;

/// Failure reported by a single type's initializer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct InitError {
    message: String,
}

impl InitError {
    /// Describe an initializer failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Failure of a one-time initialization sweep.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SweepError {
    /// A discovered type's initializer failed. The sweep was aborted and
    /// the capability was left unmarked, so a later call may retry.
    #[error("initializer for type `{type_name}` failed: {source}")]
    InitializerFailed {
        /// The type whose initializer failed.
        type_name: String,
        /// The underlying failure.
        source: InitError,
    },
}

/// Result alias for sweeps.
pub type SweepResult = Result<(), SweepError>;

/// The "default-construct and initialize" hook attached to a discoverable
/// type by its marker declaration.
#[derive(Clone)]
pub struct LaunchInitializer(Arc<dyn Fn() -> Result<(), InitError> + Send + Sync>);

impl LaunchInitializer {
    /// Wrap an initializer function.
    pub fn new<F>(initializer: F) -> Self
    where
        F: Fn() -> Result<(), InitError> + Send + Sync + 'static,
    {
        Self(Arc::new(initializer))
    }

    /// Construct and initialize the type.
    pub fn invoke(&self) -> Result<(), InitError> {
        (self.0)()
    }
}

impl fmt::Debug for LaunchInitializer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LaunchInitializer")
    }
}

/// Explicit per-capability sweep state.
///
/// The Running arm records the owning thread, which is what distinguishes
/// a reentrant call (same thread, no-op) from a concurrent one (block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SweepState {
    NotStarted,
    Running(ThreadId),
    Done,
}

#[derive(Default)]
struct CapabilitySlot {
    state: Mutex<SweepState>,
    finished: Condvar,
}

impl Default for SweepState {
    fn default() -> Self {
        SweepState::NotStarted
    }
}

/// Drives one-time initialization sweeps, one slot per capability.
#[derive(Default)]
pub struct LaunchDriver {
    slots: Mutex<FxHashMap<CapabilityId, Arc<CapabilitySlot>>>,
}

impl LaunchDriver {
    /// Create a driver with no sweeps run.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the one-time initialization sweep for `capability`.
    ///
    /// On the first call, fetches every type conforming to the capability
    /// from `index` and invokes each one's initializer exactly once, in
    /// index order (unspecified between unrelated types). Later calls
    /// return immediately; concurrent calls block until the running sweep
    /// finishes; a reentrant call from inside the sweep no-ops.
    ///
    /// If an initializer fails, the remaining sweep is aborted, the error
    /// propagates, and the capability is *not* marked run — a subsequent
    /// call retries. A panicking initializer, by contrast, is a fatal
    /// startup condition: it leaves the capability permanently running.
    pub fn run_once(&self, index: &TypeIndex, capability: &CapabilityId) -> SweepResult {
        let slot = self.slot(capability);

        {
            let mut state = slot.state.lock();
            loop {
                match *state {
                    SweepState::Done => return Ok(()),
                    SweepState::Running(owner) if owner == thread::current().id() => {
                        log::debug!("reentrant run_once for `{capability}`; skipping");
                        return Ok(());
                    }
                    SweepState::Running(_) => {
                        // Another thread owns the sweep; wait and re-decide.
                        // It may finish (Done) or fail (NotStarted, which we
                        // then take over).
                        slot.finished.wait(&mut state);
                    }
                    SweepState::NotStarted => {
                        *state = SweepState::Running(thread::current().id());
                        break;
                    }
                }
            }
        }

        // The lock is released during the sweep so reentrant calls can
        // reach the owner check above instead of self-deadlocking.
        let outcome = self.sweep(index, capability);

        let mut state = slot.state.lock();
        *state = if outcome.is_ok() {
            SweepState::Done
        } else {
            SweepState::NotStarted
        };
        slot.finished.notify_all();
        drop(state);

        outcome
    }

    /// Whether the capability's sweep has completed successfully.
    pub fn has_run(&self, capability: &CapabilityId) -> bool {
        let slots = self.slots.lock();
        slots
            .get(capability)
            .map(|slot| *slot.state.lock() == SweepState::Done)
            .unwrap_or(false)
    }

    fn sweep(&self, index: &TypeIndex, capability: &CapabilityId) -> SweepResult {
        let matched = index.fetch(&[QueryPredicate::ConformsTo(capability.clone())]);
        log::debug!("sweep `{capability}`: {} conforming types", matched.len());

        for entry in &matched {
            let Some(initializer) = entry.initializer() else {
                continue;
            };

            initializer
                .invoke()
                .map_err(|source| SweepError::InitializerFailed {
                    type_name: entry.name().to_owned(),
                    source,
                })?;
        }

        Ok(())
    }

    fn slot(&self, capability: &CapabilityId) -> Arc<CapabilitySlot> {
        let mut slots = self.slots.lock();
        slots.entry(capability.clone()).or_default().clone()
    }
}
