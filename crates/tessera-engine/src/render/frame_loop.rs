use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::Context;
use winit::window::Window;

use crate::device::{GpuContext, GpuContextManager, GpuError, Platform, READY_POLL_INTERVAL};

use super::FramePlan;

/// Host primitive that runs the next frame before the next repaint.
pub trait FrameScheduler {
    fn schedule(&self);
}

impl FrameScheduler for Window {
    fn schedule(&self) {
        self.request_redraw();
    }
}

impl<T: FrameScheduler + ?Sized> FrameScheduler for Arc<T> {
    fn schedule(&self) {
        (**self).schedule();
    }
}

/// Shared stop request for a [`FrameLoop`].
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Outcome of one [`FrameLoop::render_frame`] call.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameControl {
    /// A frame was submitted and the next one scheduled.
    Scheduled,
    /// The stop token was set; nothing was rendered or scheduled.
    Stopped,
}

/// How often the frame counter is logged.
const FRAME_LOG_INTERVAL: u64 = 600;

/// Waits for the manager's context, re-checking `stop` every poll interval.
///
/// Returns `None` once `stop` is set.
fn wait_for_context<P: Platform>(
    manager: &GpuContextManager<P>,
    stop: &StopToken,
) -> Option<Arc<GpuContext<P>>> {
    loop {
        if stop.is_stopped() {
            return None;
        }
        if let Some(ctx) = manager.wait_until_ready_for(READY_POLL_INTERVAL) {
            return Some(ctx);
        }
    }
}

/// Renders one frame per call and schedules the next.
///
/// The first call blocks until the manager is ready or the stop token is set.
/// The context obtained then is kept for every later frame. Hosts that must
/// not block use [`notify_when_ready`](Self::notify_when_ready) and call
/// [`start`](Self::start) from the callback.
pub struct FrameLoop<P: Platform, S: FrameScheduler> {
    manager: GpuContextManager<P>,
    scheduler: S,
    stop: StopToken,
    plan: FramePlan,
    context: Option<Arc<GpuContext<P>>>,
    frames: u64,
}

impl<P: Platform, S: FrameScheduler> FrameLoop<P, S> {
    pub fn new(manager: GpuContextManager<P>, scheduler: S, stop: StopToken) -> Self {
        Self {
            manager,
            scheduler,
            stop,
            plan: FramePlan::triangle(),
            context: None,
            frames: 0,
        }
    }

    pub fn stop_token(&self) -> &StopToken {
        &self.stop
    }

    /// Number of frames submitted so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    /// Schedules the first frame.
    pub fn start(&self) {
        if !self.stop.is_stopped() {
            self.scheduler.schedule();
        }
    }

    /// Runs `on_ready` on a helper thread once the context is published.
    ///
    /// The helper exits without calling `on_ready` once the stop token is set.
    pub fn notify_when_ready<F>(&self, on_ready: F) -> anyhow::Result<()>
    where
        P: 'static,
        F: FnOnce() + Send + 'static,
    {
        let manager = self.manager.clone();
        let stop = self.stop.clone();

        thread::Builder::new()
            .name("tessera-ready-wait".to_string())
            .spawn(move || {
                if wait_for_context(&manager, &stop).is_some() {
                    on_ready();
                } else {
                    log::debug!("frame loop: stopped before the context was ready");
                }
            })
            .context("failed to spawn readiness waiter thread")?;

        Ok(())
    }

    /// Renders and submits one frame, then schedules the next.
    ///
    /// Errors from the surface or device are returned as-is; the loop does
    /// not try to recover.
    pub fn render_frame(&mut self) -> Result<FrameControl, GpuError> {
        if self.stop.is_stopped() {
            return Ok(FrameControl::Stopped);
        }

        let ctx = match &self.context {
            Some(ctx) => Arc::clone(ctx),
            None => {
                let Some(ctx) = wait_for_context(&self.manager, &self.stop) else {
                    return Ok(FrameControl::Stopped);
                };
                log::debug!("frame loop: context ready");
                self.context = Some(Arc::clone(&ctx));
                ctx
            }
        };

        let mut frame = P::acquire_frame(&ctx)?;
        P::encode_frame(&ctx, &mut frame, &self.plan);
        P::submit_frame(&ctx, frame);

        self.frames += 1;
        if self.frames % FRAME_LOG_INTERVAL == 0 {
            log::debug!("frame loop: {} frames rendered", self.frames);
        }

        self.scheduler.schedule();
        Ok(FrameControl::Scheduled)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::mpsc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::device::testing::{Call, MockAdapter, MockDevice, MockPipeline, MockPlatform};
    use crate::render::{CLEAR_COLOR, ColorAttachment};

    #[derive(Default, Clone)]
    struct CountingScheduler(Arc<AtomicUsize>);

    impl CountingScheduler {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl FrameScheduler for CountingScheduler {
        fn schedule(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn mock_context(device: MockDevice) -> GpuContext<MockPlatform> {
        GpuContext {
            surface: (),
            adapter: MockAdapter,
            device,
            presentation: wgpu::TextureFormat::Bgra8Unorm,
            format: wgpu::TextureFormat::Bgra8Unorm,
            pipeline: MockPipeline,
        }
    }

    type TestLoop = FrameLoop<MockPlatform, CountingScheduler>;

    fn ready_loop() -> (TestLoop, MockDevice, CountingScheduler) {
        let manager = GpuContextManager::<MockPlatform>::pending();
        let device = MockDevice::default();
        manager.publish(mock_context(device.clone()));

        let scheduler = CountingScheduler::default();
        let frame_loop = FrameLoop::new(manager, scheduler.clone(), StopToken::new());
        (frame_loop, device, scheduler)
    }

    #[test]
    fn first_frame_waits_for_readiness() {
        let manager = GpuContextManager::<MockPlatform>::pending();
        let device = MockDevice::default();
        let scheduler = CountingScheduler::default();
        let mut frame_loop = FrameLoop::new(manager.clone(), scheduler.clone(), StopToken::new());

        let worker = thread::spawn(move || {
            let control = frame_loop.render_frame().unwrap();
            (control, frame_loop.frames_rendered())
        });

        thread::sleep(Duration::from_millis(150));
        assert_eq!(device.log.count(Call::is_frame_work), 0);
        assert_eq!(scheduler.count(), 0);

        manager.publish(mock_context(device.clone()));
        let (control, frames) = worker.join().unwrap();

        assert_eq!(control, FrameControl::Scheduled);
        assert_eq!(frames, 1);
        assert_eq!(device.log.calls().first(), Some(&Call::Acquire));
        assert_eq!(scheduler.count(), 1);
    }

    #[test]
    fn frame_records_one_pass_one_draw_one_submit() {
        let (mut frame_loop, device, _) = ready_loop();
        frame_loop.render_frame().unwrap();

        assert_eq!(
            device.log.calls(),
            vec![
                Call::Acquire,
                Call::BeginPass {
                    attachments: vec![wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    }],
                },
                Call::SetPipeline,
                Call::Draw {
                    vertices: 0..3,
                    instances: 0..1,
                },
                Call::EndPass,
                Call::Submit { command_buffers: 1 },
                Call::Present,
            ]
        );
    }

    #[test]
    fn pass_attachments_come_from_the_plan() {
        let (mut frame_loop, device, _) = ready_loop();
        let keep = wgpu::Operations {
            load: wgpu::LoadOp::Load,
            store: wgpu::StoreOp::Store,
        };
        frame_loop.plan.pass.attachments = vec![ColorAttachment { ops: keep }; 2];
        frame_loop.render_frame().unwrap();

        let passes: Vec<_> = device
            .log
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::BeginPass { .. }))
            .collect();
        assert_eq!(passes, vec![Call::BeginPass { attachments: vec![keep, keep] }]);
    }

    #[test]
    fn every_frame_draws_and_submits_exactly_once() {
        let (mut frame_loop, device, scheduler) = ready_loop();
        for _ in 0..5 {
            assert_eq!(frame_loop.render_frame().unwrap(), FrameControl::Scheduled);
        }

        let log = &device.log;
        assert_eq!(log.count(|c| matches!(c, Call::Draw { .. })), 5);
        assert_eq!(log.count(|c| matches!(c, Call::Submit { .. })), 5);
        assert_eq!(log.count(|c| matches!(c, Call::BeginPass { .. })), 5);
        assert_eq!(frame_loop.frames_rendered(), 5);
        assert_eq!(scheduler.count(), 5);
    }

    #[test]
    fn stop_token_halts_without_gpu_work() {
        let (mut frame_loop, device, scheduler) = ready_loop();
        frame_loop.render_frame().unwrap();

        frame_loop.stop_token().stop();
        assert_eq!(frame_loop.render_frame().unwrap(), FrameControl::Stopped);
        assert_eq!(frame_loop.render_frame().unwrap(), FrameControl::Stopped);

        assert_eq!(device.log.count(|c| matches!(c, Call::Submit { .. })), 1);
        assert_eq!(scheduler.count(), 1);
    }

    #[test]
    fn stopped_loop_does_not_wait_for_readiness() {
        let manager = GpuContextManager::<MockPlatform>::pending();
        let stop = StopToken::new();
        stop.stop();

        let scheduler = CountingScheduler::default();
        let mut frame_loop = FrameLoop::new(manager, scheduler.clone(), stop);
        frame_loop.start();

        assert_eq!(frame_loop.render_frame().unwrap(), FrameControl::Stopped);
        assert_eq!(scheduler.count(), 0);
    }

    #[test]
    fn stop_during_first_wait_returns_promptly() {
        let manager = GpuContextManager::<MockPlatform>::pending();
        let stop = StopToken::new();
        let scheduler = CountingScheduler::default();
        let mut frame_loop = FrameLoop::new(manager, scheduler.clone(), stop.clone());

        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let control = frame_loop.render_frame().unwrap();
            tx.send(control).unwrap();
        });

        thread::sleep(Duration::from_millis(50));
        let stopped_at = Instant::now();
        stop.stop();

        let control = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(control, FrameControl::Stopped);
        assert!(stopped_at.elapsed() < Duration::from_secs(1));
        assert_eq!(scheduler.count(), 0);
        worker.join().unwrap();
    }

    #[test]
    fn ready_notification_fires_once_published() {
        let manager = GpuContextManager::<MockPlatform>::pending();
        let scheduler = CountingScheduler::default();
        let frame_loop = FrameLoop::new(manager.clone(), scheduler, StopToken::new());

        let (tx, rx) = mpsc::channel();
        frame_loop.notify_when_ready(move || tx.send(()).unwrap()).unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
        manager.publish(mock_context(MockDevice::default()));
        rx.recv_timeout(Duration::from_secs(2)).unwrap();
    }

    #[test]
    fn ready_notification_is_dropped_when_stopped() {
        let manager = GpuContextManager::<MockPlatform>::pending();
        let stop = StopToken::new();
        let frame_loop = FrameLoop::new(manager, CountingScheduler::default(), stop.clone());

        let (tx, rx) = mpsc::channel::<()>();
        frame_loop.notify_when_ready(move || tx.send(()).unwrap()).unwrap();
        stop.stop();

        // The waiter drops the sender without calling back.
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn start_schedules_first_frame() {
        let (frame_loop, device, scheduler) = ready_loop();
        frame_loop.start();
        assert_eq!(scheduler.count(), 1);
        assert!(device.log.calls().is_empty());
    }
}
