use std::sync::{Arc, Condvar, Mutex, OnceLock, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::shader::{ShaderConfig, ShaderLoader};

use super::initialize::initialize;
use super::{ContextSlots, GpuContext, Platform};

/// Upper bound between readiness re-checks while waiting.
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Progress of the one-shot initialization.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InitState {
    Pending,
    Ready,
    /// Initialization failed; readiness will never be reached.
    Failed,
}

/// Monotonic readiness flag with a wake-up signal.
///
/// Waiters block on the condition variable and re-check the flag at least
/// once per poll interval.
#[derive(Debug, Default)]
pub struct Readiness {
    ready: Mutex<bool>,
    signal: Condvar,
}

impl Readiness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the flag and wakes every waiter. Later calls are no-ops.
    pub fn mark_ready(&self) {
        let mut ready = self.ready.lock().unwrap_or_else(PoisonError::into_inner);
        *ready = true;
        self.signal.notify_all();
    }

    /// Blocks until the flag is set.
    pub fn wait(&self, poll: Duration) {
        let mut ready = self.ready.lock().unwrap_or_else(PoisonError::into_inner);
        while !*ready {
            ready = self
                .signal
                .wait_timeout(ready, poll)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Blocks until the flag is set or `timeout` elapses. Returns the flag.
    pub fn wait_for(&self, timeout: Duration, poll: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut ready = self.ready.lock().unwrap_or_else(PoisonError::into_inner);
        while !*ready {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let step = poll.min(deadline - now);
            ready = self
                .signal
                .wait_timeout(ready, step)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *ready
    }
}

struct Shared<P: Platform> {
    context: OnceLock<Arc<GpuContext<P>>>,
    readiness: Readiness,
    failure: OnceLock<String>,
}

impl<P: Platform> Shared<P> {
    fn new() -> Self {
        Self {
            context: OnceLock::new(),
            readiness: Readiness::new(),
            failure: OnceLock::new(),
        }
    }

    /// Stores the context, then raises the flag. Returns false if already published.
    fn publish(&self, ctx: GpuContext<P>) -> bool {
        if self.context.set(Arc::new(ctx)).is_err() {
            return false;
        }
        self.readiness.mark_ready();
        true
    }
}

/// Owns the one-shot acquisition of GPU resources and publishes readiness.
///
/// Cloning yields another handle to the same state. Initialization starts in
/// [`spawn`](Self::spawn) and is never retried. After a failed attempt the
/// readiness flag stays false, so [`wait_until_ready`](Self::wait_until_ready)
/// never returns.
pub struct GpuContextManager<P: Platform> {
    shared: Arc<Shared<P>>,
}

impl<P: Platform> Clone for GpuContextManager<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P: Platform> GpuContextManager<P> {
    /// Creates the manager and starts initialization on a background thread.
    pub fn spawn<L>(mut platform: P, loader: L, shaders: ShaderConfig) -> Result<Self>
    where
        P: Send + 'static,
        L: ShaderLoader + Send + 'static,
    {
        let shared = Arc::new(Shared::new());
        let worker = Arc::clone(&shared);

        thread::Builder::new()
            .name("tessera-gpu-init".to_string())
            .spawn(move || {
                let mut slots = ContextSlots::new();
                let acquired =
                    pollster::block_on(initialize(&mut platform, &loader, &shaders, &mut slots));
                let outcome = acquired.and_then(|()| slots.into_context());

                match outcome {
                    Ok(ctx) => {
                        let format = ctx.format;
                        worker.publish(ctx);
                        log::info!("GPU initialization complete (format {format:?})");
                    }
                    Err(e) => {
                        let msg = format!("{:#}", anyhow::Error::new(e));
                        log::error!("GPU initialization failed: {msg}");
                        let _ = worker.failure.set(msg);
                    }
                }
            })
            .context("failed to spawn GPU initialization thread")?;

        Ok(Self { shared })
    }

    /// Returns true once every resource is published.
    pub fn is_ready(&self) -> bool {
        self.shared.readiness.is_ready()
    }

    pub fn state(&self) -> InitState {
        if self.is_ready() {
            InitState::Ready
        } else if self.shared.failure.get().is_some() {
            InitState::Failed
        } else {
            InitState::Pending
        }
    }

    /// Message of the failed initialization attempt, if any.
    pub fn failure(&self) -> Option<&str> {
        self.shared.failure.get().map(String::as_str)
    }

    /// The published context, without waiting.
    pub fn context(&self) -> Option<Arc<GpuContext<P>>> {
        self.shared.context.get().cloned()
    }

    /// Blocks until the context is published. Never times out.
    pub fn wait_until_ready(&self) -> Arc<GpuContext<P>> {
        loop {
            if let Some(ctx) = self.shared.context.get() {
                return Arc::clone(ctx);
            }
            self.shared.readiness.wait(READY_POLL_INTERVAL);
        }
    }

    /// Like [`wait_until_ready`](Self::wait_until_ready) but gives up after `timeout`.
    pub fn wait_until_ready_for(&self, timeout: Duration) -> Option<Arc<GpuContext<P>>> {
        if self.shared.readiness.wait_for(timeout, READY_POLL_INTERVAL) {
            self.context()
        } else {
            None
        }
    }
}

#[cfg(test)]
impl<P: Platform> GpuContextManager<P> {
    /// A manager with no initialization running; tests publish by hand.
    pub(crate) fn pending() -> Self {
        Self {
            shared: Arc::new(Shared::new()),
        }
    }

    pub(crate) fn publish(&self, ctx: GpuContext<P>) -> bool {
        self.shared.publish(ctx)
    }
}
