mod animation;
mod config;
mod overlay;
mod surface;

use anyhow::{Context, Result};
use canvasfit_observe::SizeObserverRegistry;
use canvasfit_render_wgpu::{
    CubeRenderer, PerspectiveCamera, SurfaceTarget, device_limits, supported_sample_count,
};
use canvasfit_resolve::{Surface, apply_resize_to_surface, layout_size, resolve_size};
use canvasfit_tools::SurfaceInspector;
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use animation::AnimationLoop;
use config::DemoConfig;
use overlay::{Controls, OverlayFit};
use surface::ObservedWindow;

#[derive(Parser)]
#[command(
    name = "canvasfit-demo",
    about = "Rotating cube whose swapchain follows the window size"
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fixed layout-to-buffer multiplier (default: window scale factor)
    #[arg(long)]
    multiplier: Option<f64>,

    /// Cap the device's max texture dimension, e.g. 4096
    #[arg(long)]
    max_dimension: Option<u32>,

    /// MSAA sample count (1, 2, 4 or 8)
    #[arg(long)]
    msaa: Option<u32>,

    /// Present without vsync
    #[arg(long)]
    no_vsync: bool,

    /// Start with the sizing overlay hidden
    #[arg(long)]
    hide_overlay: bool,
}

impl Cli {
    /// Config file values, overridden by flags.
    fn demo_config(&self) -> Result<DemoConfig> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => DemoConfig::default(),
        };
        if let Some(m) = self.multiplier {
            config.multiplier = Some(m);
        }
        if let Some(max) = self.max_dimension {
            config.max_texture_dimension_2d = Some(max);
        }
        if let Some(samples) = self.msaa {
            config.msaa_samples = samples;
        }
        if self.no_vsync {
            config.vsync = false;
        }
        if self.hide_overlay {
            config.show_overlay = false;
        }
        config.validate()?;
        Ok(config)
    }
}

/// wgpu objects bound to the window.
struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    device_max: u32,
}

/// Everything that exists once the window is up.
struct Viewer {
    window: ObservedWindow,
    gpu: Gpu,
    renderer: CubeRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct DemoApp<'r> {
    config: DemoConfig,
    registry: &'r mut SizeObserverRegistry,
    controls: Controls,
    camera: PerspectiveCamera,
    animation: AnimationLoop,
    egui_ctx: EguiContext,
    viewer: Option<Viewer>,
    error: Option<anyhow::Error>,
}

impl<'r> DemoApp<'r> {
    fn new(config: DemoConfig, registry: &'r mut SizeObserverRegistry) -> Self {
        Self {
            controls: Controls::from_config(&config),
            config,
            registry,
            camera: PerspectiveCamera::default(),
            animation: AnimationLoop::new(Instant::now()),
            egui_ctx: EguiContext::default(),
            viewer: None,
            error: None,
        }
    }

    /// Error that stopped the event loop, if any.
    fn into_result(self) -> Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.error = Some(error);
        event_loop.exit();
    }

    fn init_viewer(&mut self, event_loop: &ActiveEventLoop) -> Result<Viewer> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        let observed = ObservedWindow::new(window.clone());

        let redraw_target = window.clone();
        self.registry
            .register_with_callback(observed.id(), move || redraw_target.request_redraw());

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create wgpu surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("failed to find a suitable GPU adapter")?;

        // Ask for the adapter's real texture size limits; the resolver clamps to them.
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("canvasfit_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no supported formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        // No observation has arrived yet, so this resolves from the window's own size.
        let limits = device_limits(&device, self.controls.cap);
        let multiplier = self.controls.multiplier(observed.scale_factor());
        let size = resolve_size(self.registry, &observed, limits, multiplier);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: if self.config.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count =
            supported_sample_count(&adapter, surface_format, self.config.msaa_samples);
        let renderer = CubeRenderer::new(&device, surface_format, size, sample_count);
        self.camera.set_viewport(layout_size(self.registry, &observed));

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &*window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        let device_max = device.limits().max_texture_dimension_2d;
        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            format = ?surface_format,
            sample_count,
            device_max,
            buffer = %size,
            "GPU initialized"
        );

        Ok(Viewer {
            window: observed,
            gpu: Gpu {
                surface,
                device,
                queue,
                config,
                device_max,
            },
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Self {
            registry,
            controls,
            camera,
            animation,
            egui_ctx,
            viewer,
            error,
            ..
        } = self;
        let Some(viewer) = viewer.as_mut() else {
            return;
        };
        if !animation.should_draw() {
            return;
        }

        let gpu = &mut viewer.gpu;
        let limits = device_limits(&gpu.device, controls.cap);
        let multiplier = controls.multiplier(viewer.window.scale_factor());

        // Poll once per frame; the registry only holds the latest observation.
        let size = {
            let mut target =
                SurfaceTarget::new(&viewer.window, &gpu.surface, &gpu.device, &mut gpu.config);
            apply_resize_to_surface(registry, &mut target, limits, multiplier)
        };
        viewer.renderer.resize(&gpu.device, size);
        // The projection follows what is on screen, not the possibly clamped buffer.
        camera.set_viewport(layout_size(registry, &viewer.window));

        let frame = match gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("surface out of memory");
                *error = Some(anyhow::anyhow!("surface out of memory"));
                event_loop.exit();
                return;
            }
            Err(e) => {
                tracing::warn!("skipping frame: {e}");
                return;
            }
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let time = animation.time_at(Instant::now());
        viewer
            .renderer
            .render(&gpu.device, &gpu.queue, &view, camera, time);

        if controls.show_overlay {
            let summary = SurfaceInspector::summary(registry, &viewer.window, limits, multiplier);
            let stats = registry.stats();
            let window = viewer.window.window();

            let sample_count = viewer.renderer.sample_count();

            let mut raw_input = viewer.egui_winit.take_egui_input(window);
            let inner = window.inner_size();
            OverlayFit::new([inner.width, inner.height], size).apply(&mut raw_input);
            let full_output = egui_ctx.run(raw_input, |ctx| {
                overlay::draw(ctx, &summary, &stats, controls, gpu.device_max, sample_count);
            });
            viewer
                .egui_winit
                .handle_platform_output(window, full_output.platform_output);

            let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size.width, size.height],
                pixels_per_point: full_output.pixels_per_point,
            };

            let egui_renderer = &mut viewer.egui_renderer;
            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(&gpu.device, &gpu.queue, *id, image_delta);
            }
            let mut encoder = gpu
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("egui_encoder"),
                });
            egui_renderer.update_buffers(
                &gpu.device,
                &gpu.queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            gpu.queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
        }

        frame.present();
    }
}

impl ApplicationHandler for DemoApp<'_> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }
        match self.init_viewer(event_loop) {
            Ok(viewer) => self.viewer = Some(viewer),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        let consumed = viewer
            .egui_winit
            .on_window_event(viewer.window.window(), &event)
            .consumed;

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical) => {
                self.animation
                    .set_window_area(physical.width, physical.height);
                let entry = viewer.window.resize_entry(physical);
                self.registry.notify([entry]);
            }
            WindowEvent::Occluded(occluded) => {
                self.animation.set_occluded(occluded);
                if !occluded {
                    viewer.window.window().request_redraw();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if !consumed => match key {
                KeyCode::F1 => {
                    self.controls.show_overlay = !self.controls.show_overlay;
                }
                KeyCode::Escape => event_loop.exit(),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if !self.animation.should_draw() {
            return;
        }
        if let Some(viewer) = &self.viewer {
            viewer.window.window().request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(viewer) = &self.viewer {
            self.registry.unregister(viewer.window.id());
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.demo_config()?;
    tracing::info!(?config, "canvasfit-demo starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut registry = SizeObserverRegistry::new();
    let mut app = DemoApp::new(config, &mut registry);
    let run = event_loop.run_app(&mut app);
    let outcome = app.into_result();
    registry.teardown();

    run?;
    outcome
}
