use anyhow::{Context as _, Result};
use blockfield_heightmap::RASTER_SIZE;
use blockfield_render::{HeightTexture, TextureId};
use blockfield_render_wgpu::{OrbitCamera, RenderError, WgpuRenderer, choose_surface_format};
use blockfield_session::{Session, SessionConfig};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// On-screen size of the heightmap preview, in points.
const PREVIEW_SIZE: f32 = RASTER_SIZE as f32;

#[derive(Parser)]
#[command(name = "blockfield-desktop", about = "Height-displaced block field viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON session config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between heightmap regenerations
    #[arg(long)]
    period_ms: Option<u64>,
}

impl Cli {
    fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => SessionConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SessionConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(period) = self.period_ms {
            config.regen_period_ms = period;
        }
        Ok(config)
    }
}

#[derive(Default)]
struct DragState {
    rotating: bool,
    panning: bool,
}

/// Application state that lives independently of the GPU.
struct AppState {
    session: Session,
    camera: OrbitCamera,
    started: Instant,
    drag: DragState,
    show_preview: bool,
    preview: Option<egui::TextureHandle>,
    preview_source: Option<TextureId>,
}

impl AppState {
    fn new(config: SessionConfig) -> Result<Self> {
        let camera = OrbitCamera::from_view(&config.view);
        Ok(Self {
            session: Session::new(config)?,
            camera,
            started: Instant::now(),
            drag: DragState::default(),
            show_preview: true,
            preview: None,
            preview_source: None,
        })
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            return;
        }
        if key == KeyCode::F1 {
            self.show_preview = !self.show_preview;
        }
    }

    fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.drag.rotating = pressed,
            MouseButton::Right => self.drag.panning = pressed,
            _ => {}
        }
    }

    fn handle_mouse_motion(&mut self, dx: f32, dy: f32) {
        if self.drag.rotating {
            self.camera.rotate(dx, dy);
        } else if self.drag.panning {
            self.camera.pan(dx, dy);
        }
    }

    fn handle_scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
        };
        self.camera.zoom(lines);
    }

    /// Refresh the egui copy of the heightmap when a new texture was published.
    fn sync_preview(&mut self, ctx: &EguiContext) {
        let Some(current) = self.session.bridge().current() else {
            self.preview = None;
            self.preview_source = None;
            return;
        };
        if self.preview_source == Some(current.id()) {
            return;
        }
        let image = preview_image(current);
        match &mut self.preview {
            Some(handle) => handle.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.preview = Some(ctx.load_texture(
                    "heightmap_preview",
                    image,
                    egui::TextureOptions::LINEAR,
                ));
            }
        }
        self.preview_source = Some(current.id());
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_preview {
            return;
        }
        let Some(preview) = &self.preview else {
            return;
        };

        egui::Area::new(egui::Id::new("heightmap_preview_area"))
            .fixed_pos(egui::pos2(10.0, 10.0))
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(0, 255, 255)))
                    .show(ui, |ui| {
                        ui.add(egui::Image::new((
                            preview.id(),
                            egui::vec2(PREVIEW_SIZE, PREVIEW_SIZE),
                        )));
                    });
                ui.small("F1: Toggle heightmap | LMB: Rotate | RMB: Pan | Wheel: Zoom");
            });
    }
}

fn preview_image(texture: &HeightTexture) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [texture.width() as usize, texture.height() as usize],
        texture.texels(),
    )
}

/// GPU objects created once the window exists.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: SessionConfig) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config)?,
            gpu: None,
            egui_ctx: EguiContext::default(),
            fatal: None,
        })
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Block Field")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(RenderError::from)?;

        let adapter =
            pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            }))
            .ok_or(RenderError::NoAdapter)?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("blockfield_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(RenderError::from)?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = choose_surface_format(&surface_caps.formats)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.aspect = config.width as f32 / config.height as f32;

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            self.state.session.layout(),
        )?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.fatal = Some(err);
        self.state.session.teardown();
        event_loop.exit();
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(
            &gpu.device,
            &gpu.queue,
            &view,
            &self.state.camera,
            self.state.session.scene(),
        );

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
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
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(err) => {
                self.fail(event_loop, err);
                return;
            }
        }

        // The drawing surface exists now, so the session can start its clock.
        self.state.started = Instant::now();
        self.state.session.mount(self.state.started.elapsed());
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.session.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    self.state.camera.aspect = gpu.config.width as f32 / gpu.config.height as f32;
                    gpu.renderer
                        .resize(&gpu.device, gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => {
                self.state
                    .handle_mouse_button(button, btn_state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.handle_scroll(delta);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state
                .handle_mouse_motion(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Regeneration and upload both finish here, before the next frame.
        let now = self.state.started.elapsed();
        self.state.session.advance(now);

        if let Some(gpu) = &mut self.gpu {
            gpu.renderer
                .sync_height_texture(&gpu.device, &gpu.queue, self.state.session.bridge_mut());
        }
        self.state.sync_preview(&self.egui_ctx);
        self.state.camera.update();

        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let config = cli.session_config()?;
    tracing::info!(seed = config.seed, "blockfield-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config)?;
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
