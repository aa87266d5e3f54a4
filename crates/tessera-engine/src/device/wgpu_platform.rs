use std::sync::Arc;

use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::render::FramePlan;

use super::surface::{choose_alpha_mode, choose_surface_format, surface_extent};
use super::{GpuContext, GpuError, GpuInit, PipelineDesc, Platform};

/// Logical device and its submission queue.
pub struct WgpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// Surface texture, its view and the encoder recording into it.
///
/// Lives from [`Platform::acquire_frame`] to [`Platform::submit_frame`];
/// the next texture cannot be acquired while this one is held.
pub struct WgpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// [`Platform`] backed by wgpu, presenting into a winit window.
///
/// Everything that touches the window happens in [`new`](Self::new), on the
/// event-loop thread. The platform itself only holds the created surface and
/// the size read at that point, so the remaining steps can run elsewhere.
pub struct WgpuPlatform {
    /// wgpu instance used to create the adapter and surface.
    instance: wgpu::Instance,

    /// Surface created at construction; taken by `resolve_surface`.
    surface: Option<Result<wgpu::Surface<'static>, GpuError>>,

    /// Window size in physical pixels when the surface was created.
    size: PhysicalSize<u32>,

    init: GpuInit,
}

impl WgpuPlatform {
    /// Creates the surface for `window`. Call on the event-loop thread.
    ///
    /// A zero-size window or a surface creation error is kept and reported
    /// by the first initialization step.
    pub fn new(window: Arc<Window>, init: GpuInit) -> Self {
        // Use all backends to allow wgpu to select the optimal platform backend.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let size = window.inner_size();
        let surface = surface_extent(size).and_then(|_| {
            instance
                .create_surface(window)
                .map_err(|e| GpuError::Surface(Box::new(e)))
        });

        Self {
            instance,
            surface: Some(surface),
            size,
            init,
        }
    }
}

impl Platform for WgpuPlatform {
    type Surface = wgpu::Surface<'static>;
    type Adapter = wgpu::Adapter;
    type Device = WgpuDevice;
    type Presentation = wgpu::SurfaceConfiguration;
    type Pipeline = wgpu::RenderPipeline;
    type Frame = WgpuFrame;

    fn resolve_surface(&mut self) -> Result<Self::Surface, GpuError> {
        self.surface
            .take()
            .unwrap_or_else(|| Err(GpuError::Surface("surface already resolved".into())))
    }

    async fn request_adapter(&mut self, surface: &Self::Surface) -> Option<Self::Adapter> {
        let requested = self
            .instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: self.init.power_preference,
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await;

        match requested {
            Ok(adapter) => {
                let info = adapter.get_info();
                log::info!("using adapter {} ({:?})", info.name, info.backend);
                Some(adapter)
            }
            Err(e) => {
                log::warn!("no suitable GPU adapter: {e}");
                None
            }
        }
    }

    async fn request_device(&mut self, adapter: &Self::Adapter) -> Result<Self::Device, GpuError> {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("tessera device"),
                required_features: self.init.required_features,
                required_limits: self.init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| GpuError::Device(Box::new(e)))?;

        Ok(WgpuDevice { device, queue })
    }

    fn preferred_format(
        &self,
        surface: &Self::Surface,
        adapter: &Self::Adapter,
    ) -> Option<wgpu::TextureFormat> {
        let caps = surface.get_capabilities(adapter);
        choose_surface_format(&caps.formats, self.init.prefer_srgb)
    }

    fn configure(
        &mut self,
        surface: &Self::Surface,
        adapter: &Self::Adapter,
        device: &Self::Device,
        format: wgpu::TextureFormat,
    ) -> Result<Self::Presentation, GpuError> {
        let caps = surface.get_capabilities(adapter);
        let size = surface_extent(self.size)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: self.init.present_mode,
            alpha_mode: choose_alpha_mode(&caps.alpha_modes, self.init.alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency: self.init.desired_maximum_frame_latency,
        };

        surface.configure(&device.device, &config);
        Ok(config)
    }

    fn create_pipeline(
        &mut self,
        device: &Self::Device,
        desc: &PipelineDesc<'_>,
    ) -> Result<Self::Pipeline, GpuError> {
        let device = &device.device;

        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera vertex shader"),
            source: wgpu::ShaderSource::Wgsl(desc.vertex.source.as_str().into()),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tessera fragment shader"),
            source: wgpu::ShaderSource::Wgsl(desc.fragment.source.as_str().into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("tessera pipeline"),
            // Derived from the shaders.
            layout: None,

            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: desc.vertex.entry_point.as_deref(),
                compilation_options: Default::default(),
                buffers: &[],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: desc.fragment.entry_point.as_deref(),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: desc.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: desc.topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(pipeline)
    }

    fn acquire_frame(ctx: &GpuContext<Self>) -> Result<Self::Frame, GpuError> {
        let surface_texture = ctx
            .surface
            .get_current_texture()
            .map_err(|e| GpuError::Frame(Box::new(e)))?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = ctx
            .device
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("tessera frame encoder"),
            });

        Ok(WgpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    fn encode_frame(ctx: &GpuContext<Self>, frame: &mut Self::Frame, plan: &FramePlan) {
        let color_attachments: Vec<_> = plan
            .pass
            .attachments
            .iter()
            .map(|attachment| {
                Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: attachment.ops,
                    depth_slice: None,
                })
            })
            .collect();

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("tessera frame pass"),
            color_attachments: &color_attachments,
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&ctx.pipeline);
        rpass.draw(plan.draw.vertices.clone(), plan.draw.instances.clone());
    }

    fn submit_frame(ctx: &GpuContext<Self>, frame: Self::Frame) {
        let WgpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        ctx.device.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }
}
