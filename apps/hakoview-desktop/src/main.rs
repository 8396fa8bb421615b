use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use hakoview_input::{InputEvent, MouseButton as Button, PointerState};
use hakoview_link::{
    DemoFlight, LinkConfig, MAX_DELTA_MSEC, MemoryBus, PduConfig, PoseChannel, SyncHandle,
    SyncLoop, register,
};
use hakoview_render::{
    CameraRig, DRONE_START, FrameTasks, OrbitCamera, OrbitConfig, Scene, TaskStatus,
};
use hakoview_render_wgpu::WgpuRenderer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

const ASSET_NAME: &str = "Visualizer";
const STOP_TIMEOUT: Duration = Duration::from_secs(2);
/// Pixels of trackpad scroll that count as one wheel notch.
const PIXELS_PER_NOTCH: f64 = 40.0;

#[derive(Parser)]
#[command(name = "hakoview-desktop", about = "Drone simulation visualizer")]
struct Cli {
    /// PDU configuration JSON
    config_path: PathBuf,

    /// Simulation step in milliseconds
    #[arg(value_parser = clap::value_parser!(u64).range(1..=MAX_DELTA_MSEC))]
    delta_time_msec: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Everything the per-frame tasks touch.
struct Visualizer {
    scene: Scene,
    camera: OrbitCamera,
    pointer: PointerState,
    channel: PoseChannel,
    /// Sequence number of the last pose applied to the scene.
    seen: u64,
}

impl Visualizer {
    fn new(channel: PoseChannel) -> Self {
        Self {
            scene: Scene::default(),
            camera: OrbitCamera::new(OrbitConfig::default(), CameraRig::close_up(DRONE_START)),
            pointer: PointerState::new(),
            channel,
            seen: 0,
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Digit1 => self.scene.lights.toggle(true),
            KeyCode::Digit2 => self.scene.lights.toggle(false),
            _ => {}
        }
    }

    fn handle_button(&mut self, button: MouseButton, state: ElementState) {
        let button = match button {
            MouseButton::Left => Button::Primary,
            MouseButton::Right => Button::Secondary,
            MouseButton::Middle => Button::Middle,
            _ => return,
        };
        let event = match state {
            ElementState::Pressed => InputEvent::ButtonDown(button),
            ElementState::Released => InputEvent::ButtonUp(button),
        };
        self.camera.handle_event(event, &self.pointer);
    }

    fn handle_wheel(&mut self, delta: MouseScrollDelta) {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => y as f64,
            MouseScrollDelta::PixelDelta(pos) => pos.y / PIXELS_PER_NOTCH,
        };
        for event in InputEvent::scroll_notches(notches) {
            self.camera.handle_event(event, &self.pointer);
        }
    }

    fn draw_hud(&self, ctx: &EguiContext) {
        egui::Area::new(egui::Id::new("hud"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .show(ctx, |ui| {
                ui.label(
                    egui::RichText::new(self.scene.hud_text())
                        .monospace()
                        .color(egui::Color32::WHITE),
                );
            });
    }
}

fn frame_tasks() -> FrameTasks<Visualizer> {
    let mut tasks = FrameTasks::new();
    tasks.add("orbit_camera_update", |vis: &mut Visualizer, _| {
        vis.camera.update(&vis.pointer);
        TaskStatus::Continue
    });
    tasks.add("apply_pose", |vis: &mut Visualizer, frame| {
        if let Some(sample) = vis.channel.read_newer(vis.seen) {
            vis.seen = sample.seq;
            vis.scene.drone.apply_pose(&sample.pose, sample.rotor_speed);
        }
        vis.scene.drone.advance_rotors(frame.dt);
        TaskStatus::Continue
    });
    tasks
}

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

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(ASSET_NAME)
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("hakoview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

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

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            "GPU initialized"
        );

        Ok(Self {
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

    fn aspect(&self) -> f64 {
        self.config.width as f64 / self.config.height.max(1) as f64
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw(&mut self, egui_ctx: &EguiContext, vis: &Visualizer) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
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

        self.renderer.render(
            &self.device,
            &self.queue,
            &view,
            &vis.camera.render_view(),
            &vis.scene,
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| vis.draw_hud(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
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
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct App {
    vis: Visualizer,
    tasks: FrameTasks<Visualizer>,
    sync: Option<SyncHandle>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    last_frame: Instant,
}

impl App {
    fn new(channel: PoseChannel, sync: SyncHandle) -> Self {
        Self {
            vis: Visualizer::new(channel),
            tasks: frame_tasks(),
            sync: Some(sync),
            gpu: None,
            egui_ctx: EguiContext::default(),
            last_frame: Instant::now(),
        }
    }

    fn stop_sync(&mut self) {
        let Some(handle) = self.sync.take() else {
            return;
        };
        if let Some(report) = handle.stop(STOP_TIMEOUT) {
            tracing::info!(
                cycles = report.cycles,
                published = report.published,
                skipped = report.skipped,
                "sync thread joined"
            );
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.vis.camera.aspect = gpu.aspect();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("graphics setup failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if gpu.egui_winit.on_window_event(&gpu.window, &event).consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                self.vis.camera.aspect = gpu.aspect();
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
            } => {
                self.vis.handle_key(key);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.vis.pointer.set_modifier(modifiers.state().alt_key());
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.vis.pointer.moved(position.x, position.y);
            }
            WindowEvent::CursorLeft { .. } => {
                self.vis.pointer.left();
            }
            WindowEvent::MouseInput { button, state, .. } => {
                self.vis.handle_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.vis.handle_wheel(delta);
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.last_frame).as_secs_f64().min(0.1);
                self.last_frame = now;
                self.tasks.run_frame(&mut self.vis, dt);

                gpu.draw(&self.egui_ctx, &self.vis);
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.stop_sync();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("hakoview-desktop starting");

    let link = LinkConfig::with_delta_msec(cli.delta_time_msec);
    let registration = match PduConfig::load(&cli.config_path)
        .and_then(|pdu| register(ASSET_NAME, &pdu, &link))
    {
        Ok(registration) => registration,
        Err(e) => {
            tracing::error!(path = %cli.config_path.display(), "asset registration failed: {e}");
            return Err(e.into());
        }
    };
    tracing::debug!(robot = %registration.robot, "using PDU channels");

    let channel = PoseChannel::new();
    let bus = MemoryBus::new();
    let flight = DemoFlight::new(bus.clone(), &link);
    let sync = SyncLoop::new(flight, bus, channel.clone(), link)
        .spawn()
        .context("start sync thread")?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(channel, sync);
    let result = event_loop.run_app(&mut app);
    app.stop_sync();
    result?;

    Ok(())
}
