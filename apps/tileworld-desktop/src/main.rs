use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tileworld_assets::TextureStore;
use tileworld_common::CellType;
use tileworld_kernel::{Level, MoveInput, World};
use tileworld_render::{
    FramePlan, Renderer, SceneRenderer, TerrainTextureMapping, draw_count, sprite::SpriteCell,
};
use tileworld_render_wgpu::{FollowCamera, WgpuRenderer};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "tileworld-desktop", about = "Tileworld desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Level file (YAML); the built-in demo level when omitted
    #[arg(long)]
    level: Option<PathBuf>,
}

/// Application state.
struct AppState {
    world: World,
    scene: SceneRenderer,
    textures: TextureStore,
    camera: FollowCamera,
    keys_held: HashSet<KeyCode>,
    show_hud: bool,
    started: Instant,
    last_frame: Instant,
    last_draws: usize,
}

impl AppState {
    fn load(level: Option<PathBuf>) -> Result<Self> {
        let level = match level {
            Some(path) => Level::load(&path)
                .with_context(|| format!("loading level {}", path.display()))?,
            None => Level::demo(),
        };
        let world = level.into_world()?;
        let textures = TextureStore::with_builtin();

        let mut camera = FollowCamera::default();
        let player = world.player().position;
        camera.follow(player.x, player.y);

        let scene = SceneRenderer::load(
            world.grid(),
            &textures,
            &TerrainTextureMapping::default(),
            &camera,
        )?;

        tracing::info!(
            width = world.grid().width(),
            height = world.grid().height(),
            items = world.items().len(),
            "level loaded"
        );

        let now = Instant::now();
        Ok(Self {
            world,
            scene,
            textures,
            camera,
            keys_held: HashSet::new(),
            show_hud: true,
            started: now,
            last_frame: now,
            last_draws: 0,
        })
    }

    fn input(&self) -> MoveInput {
        let held =
            |a: KeyCode, b: KeyCode| self.keys_held.contains(&a) || self.keys_held.contains(&b);
        MoveInput {
            left: held(KeyCode::KeyA, KeyCode::ArrowLeft),
            right: held(KeyCode::KeyD, KeyCode::ArrowRight),
            up: held(KeyCode::KeyW, KeyCode::ArrowUp),
            down: held(KeyCode::KeyS, KeyCode::ArrowDown),
        }
    }

    fn update(&mut self, dt: f32) {
        self.world.update(self.input(), dt);
        let player = self.world.player().position;
        self.camera.follow(player.x, player.y);
    }

    fn plan(&mut self) -> FramePlan {
        let plan = self
            .scene
            .render(&self.world, &self.camera, self.started.elapsed());
        self.last_draws = draw_count(&plan);
        plan
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.scene.set_projection(&self.camera);
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.keys_held.insert(key);
        } else {
            self.keys_held.remove(&key);
        }

        if pressed && key == KeyCode::F1 {
            self.show_hud = !self.show_hud;
        }
    }

    fn cell_under_player(&self) -> Option<CellType> {
        let p = self.world.player().position;
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        self.world.grid().cell(p.x as u32, p.y as u32)
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let player = self.world.player();
        let sprite = SpriteCell::for_player(player.state, player.angle, self.started.elapsed());
        egui::Window::new("Tileworld")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!(
                    "Player: ({:.2}, {:.2}) {:?}",
                    player.position.x, player.position.y, player.state
                ));
                ui.label(format!("Sprite: col {} row {}", sprite.column, sprite.row));
                match self.cell_under_player() {
                    Some(cell) => ui.label(format!("Cell: {cell}")),
                    None => ui.label("Cell: outside grid"),
                };
                ui.label(format!(
                    "Grid: {}x{}  Items: {}",
                    self.world.grid().width(),
                    self.world.grid().height(),
                    self.world.items().len()
                ));
                ui.label(format!("Draws: {}", self.last_draws));
                ui.separator();
                ui.small("F1: Toggle HUD | WASD/Arrows: Move");
            });
    }
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
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Tileworld")
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
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tileworld_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        self.state.resize(config.width, config.height);

        let renderer = WgpuRenderer::new(
            &device,
            &queue,
            surface_format,
            self.state.scene.mesh(),
            &self.state.textures,
        );

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

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).min(Duration::from_millis(100));
        self.state.last_frame = now;
        self.state.update(dt.as_secs_f32());

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

        let plan = {
            let _span = tracing::info_span!("frame").entered();
            self.state.plan()
        };
        gpu.renderer.execute(&gpu.device, &gpu.queue, &view, &plan);

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
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
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
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    self.state.resize(gpu.config.width, gpu.config.height);
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
                if key == KeyCode::Escape {
                    event_loop.exit();
                    return;
                }
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("tileworld-desktop starting");

    let state = AppState::load(cli.level)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
