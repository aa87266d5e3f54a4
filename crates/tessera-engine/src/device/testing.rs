//! Recording platform used by unit tests; needs no GPU.

use std::ops::Range;
use std::sync::{Arc, Mutex};

use futures::channel::oneshot;

use crate::render::FramePlan;

use super::{GpuContext, GpuError, PipelineDesc, Platform};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    ResolveSurface,
    RequestAdapter,
    RequestDevice,
    Configure(wgpu::TextureFormat),
    CreatePipeline {
        vertex: String,
        fragment: String,
        vertex_entry: Option<String>,
        fragment_entry: Option<String>,
        format: wgpu::TextureFormat,
        topology: wgpu::PrimitiveTopology,
    },
    Acquire,
    BeginPass {
        attachments: Vec<wgpu::Operations<wgpu::Color>>,
    },
    SetPipeline,
    Draw {
        vertices: Range<u32>,
        instances: Range<u32>,
    },
    EndPass,
    Submit {
        command_buffers: usize,
    },
    Present,
}

impl Call {
    pub(crate) fn is_frame_work(&self) -> bool {
        matches!(
            self,
            Call::Acquire
                | Call::BeginPass { .. }
                | Call::SetPipeline
                | Call::Draw { .. }
                | Call::EndPass
                | Call::Submit { .. }
                | Call::Present
        )
    }
}

#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub(crate) fn record(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }
}

pub(crate) struct MockAdapter;

#[derive(Clone, Default)]
pub(crate) struct MockDevice {
    pub log: CallLog,
}

pub(crate) struct MockPipeline;

pub(crate) struct MockFrame {
    pub encoded: bool,
}

pub(crate) struct MockPlatform {
    pub log: CallLog,
    pub surface_available: bool,
    pub adapter_available: bool,
    pub format: wgpu::TextureFormat,
    pub device_gate: Option<oneshot::Receiver<()>>,
}

impl MockPlatform {
    pub(crate) fn new() -> Self {
        Self {
            log: CallLog::default(),
            surface_available: true,
            adapter_available: true,
            format: wgpu::TextureFormat::Bgra8Unorm,
            device_gate: None,
        }
    }

    pub(crate) fn without_adapter(mut self) -> Self {
        self.adapter_available = false;
        self
    }

    pub(crate) fn without_surface(mut self) -> Self {
        self.surface_available = false;
        self
    }

    /// Holds the device request until the returned sender fires or drops.
    pub(crate) fn gated(mut self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.device_gate = Some(rx);
        (self, tx)
    }
}

impl Platform for MockPlatform {
    type Surface = ();
    type Adapter = MockAdapter;
    type Device = MockDevice;
    type Presentation = wgpu::TextureFormat;
    type Pipeline = MockPipeline;
    type Frame = MockFrame;

    fn resolve_surface(&mut self) -> Result<(), GpuError> {
        self.log.record(Call::ResolveSurface);
        if self.surface_available {
            Ok(())
        } else {
            Err(GpuError::Surface("no window".into()))
        }
    }

    async fn request_adapter(&mut self, _surface: &()) -> Option<MockAdapter> {
        self.log.record(Call::RequestAdapter);
        self.adapter_available.then_some(MockAdapter)
    }

    async fn request_device(&mut self, _adapter: &MockAdapter) -> Result<MockDevice, GpuError> {
        self.log.record(Call::RequestDevice);
        if let Some(gate) = self.device_gate.take() {
            let _ = gate.await;
        }
        Ok(MockDevice {
            log: self.log.clone(),
        })
    }

    fn preferred_format(&self, _surface: &(), _adapter: &MockAdapter) -> Option<wgpu::TextureFormat> {
        Some(self.format)
    }

    fn configure(
        &mut self,
        _surface: &(),
        _adapter: &MockAdapter,
        _device: &MockDevice,
        format: wgpu::TextureFormat,
    ) -> Result<wgpu::TextureFormat, GpuError> {
        self.log.record(Call::Configure(format));
        Ok(format)
    }

    fn create_pipeline(
        &mut self,
        _device: &MockDevice,
        desc: &PipelineDesc<'_>,
    ) -> Result<MockPipeline, GpuError> {
        self.log.record(Call::CreatePipeline {
            vertex: desc.vertex.source.clone(),
            fragment: desc.fragment.source.clone(),
            vertex_entry: desc.vertex.entry_point.clone(),
            fragment_entry: desc.fragment.entry_point.clone(),
            format: desc.format,
            topology: desc.topology,
        });
        Ok(MockPipeline)
    }

    fn acquire_frame(ctx: &GpuContext<Self>) -> Result<MockFrame, GpuError> {
        ctx.device.log.record(Call::Acquire);
        Ok(MockFrame { encoded: false })
    }

    fn encode_frame(ctx: &GpuContext<Self>, frame: &mut MockFrame, plan: &FramePlan) {
        let log = &ctx.device.log;
        log.record(Call::BeginPass {
            attachments: plan.pass.attachments.iter().map(|a| a.ops).collect(),
        });
        log.record(Call::SetPipeline);
        log.record(Call::Draw {
            vertices: plan.draw.vertices.clone(),
            instances: plan.draw.instances.clone(),
        });
        log.record(Call::EndPass);
        frame.encoded = true;
    }

    fn submit_frame(ctx: &GpuContext<Self>, frame: MockFrame) {
        assert!(frame.encoded, "frame submitted before encoding");
        ctx.device.log.record(Call::Submit { command_buffers: 1 });
        ctx.device.log.record(Call::Present);
    }
}
