// Water town editor viewer.
// Every terrain cell, placed object and the boat is one instance of a unit
// cube, drawn in a single instanced call; the egui HUD goes on top.

use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use log::{error, info, warn};
use thiserror::Error;
use wgpu::util::DeviceExt;
use winit::{
    event::{ElementState, Event as WinitEvent, KeyEvent, MouseButton, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

use water_town::config::{CONFIG_FILE, EditorConfig, EditorSession};
use water_town::editor::{EditorMode, SceneEditor};
use water_town::engine::debug_overlay::{DebugOverlay, HudCommand, HudView};
use water_town::engine::input::InputState;
use water_town::engine::mesh::{GpuVertex, unit_cube};
use water_town::engine::objects::ObjectType;
use water_town::engine::terrain::{CELL_SIZE, TerrainCell};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Longest simulated step; a stalled frame must not launch the boat.
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Error, Debug)]
enum AppError {
    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter")]
    NoAdapter,
    #[error("device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

// ============================================================================
// INSTANCE DATA (per-cube)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    position: [f32; 3],
    /// Radians about +Y.
    yaw: f32,
    scale: [f32; 3],
    _padding: f32,  // Align color to 16 bytes
    color: [f32; 4],
}

impl InstanceData {
    fn new(position: Vec3, yaw: f32, scale: Vec3, color: [f32; 4]) -> Self {
        Self {
            position: position.to_array(),
            yaw,
            scale: scale.to_array(),
            _padding: 0.0,
            color,
        }
    }

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const F32: wgpu::BufferAddress = std::mem::size_of::<f32>() as wgpu::BufferAddress;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,  // One per instance, not per vertex
            attributes: &[
                wgpu::VertexAttribute { offset: 0, shader_location: 2, format: wgpu::VertexFormat::Float32x3 },
                wgpu::VertexAttribute { offset: 3 * F32, shader_location: 3, format: wgpu::VertexFormat::Float32 },
                wgpu::VertexAttribute { offset: 4 * F32, shader_location: 4, format: wgpu::VertexFormat::Float32x3 },
                wgpu::VertexAttribute { offset: 8 * F32, shader_location: 5, format: wgpu::VertexFormat::Float32x4 },
            ],
        }
    }
}

// ============================================================================
// UNIFORM DATA
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    light_dir: [f32; 4],
}

impl Uniforms {
    fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            light_dir: [0.4, 1.0, 0.3, 0.0],
        }
    }
}

// ============================================================================
// SCENE → INSTANCES
// ============================================================================

fn terrain_style(cell: TerrainCell) -> (f32, [f32; 4]) {
    // (top height, color)
    match cell {
        TerrainCell::Empty => (0.0, [0.12, 0.12, 0.12, 1.0]),
        TerrainCell::Grass => (0.1, [0.30, 0.55, 0.25, 1.0]),
        TerrainCell::Water => (0.0, [0.15, 0.35, 0.60, 1.0]),
        TerrainCell::Stone => (0.15, [0.55, 0.55, 0.52, 1.0]),
    }
}

/// (footprint x, height, footprint z) and color.
fn object_style(kind: ObjectType) -> (Vec3, [f32; 4]) {
    const WHITE_WALL: [f32; 4] = [0.90, 0.88, 0.82, 1.0];
    const DARK_ROOF: [f32; 4] = [0.25, 0.25, 0.28, 1.0];
    const WOOD: [f32; 4] = [0.45, 0.30, 0.18, 1.0];
    const RED: [f32; 4] = [0.65, 0.15, 0.12, 1.0];
    match kind {
        ObjectType::House => (Vec3::new(1.2, 1.2, 1.2), WHITE_WALL),
        ObjectType::HouseStyle1 => (Vec3::new(1.3, 1.4, 1.1), WHITE_WALL),
        ObjectType::HouseStyle2 => (Vec3::new(1.5, 1.1, 1.5), [0.85, 0.82, 0.75, 1.0]),
        ObjectType::HouseStyle3 => (Vec3::new(1.6, 1.6, 1.2), DARK_ROOF),
        ObjectType::HouseStyle4 => (Vec3::new(1.4, 1.8, 1.4), [0.80, 0.80, 0.85, 1.0]),
        ObjectType::HouseStyle5 => (Vec3::new(1.2, 1.0, 1.4), [0.75, 0.65, 0.50, 1.0]),
        ObjectType::LongHouse => (Vec3::new(2.4, 1.1, 1.0), WHITE_WALL),
        ObjectType::Temple => (Vec3::new(2.0, 2.2, 2.0), RED),
        ObjectType::Pavilion => (Vec3::new(1.2, 1.3, 1.2), RED),
        ObjectType::WaterPavilion => (Vec3::new(1.4, 1.2, 1.4), [0.70, 0.20, 0.15, 1.0]),
        ObjectType::Paifang => (Vec3::new(1.6, 1.8, 0.3), DARK_ROOF),
        ObjectType::Bridge => (Vec3::new(1.0, 0.3, 2.2), [0.60, 0.60, 0.58, 1.0]),
        ObjectType::ArchBridge => (Vec3::new(1.0, 0.6, 2.6), [0.62, 0.60, 0.55, 1.0]),
        ObjectType::Pier => (Vec3::new(0.8, 0.15, 1.6), WOOD),
        ObjectType::FishingBoat => (Vec3::new(0.6, 0.3, 1.4), WOOD),
        ObjectType::Boat => (Vec3::new(0.3, 0.1, 0.3), [1.0, 0.85, 0.2, 1.0]),
        ObjectType::LotusPond => (Vec3::new(1.0, 0.08, 1.0), [0.85, 0.45, 0.65, 1.0]),
        ObjectType::Wall => (Vec3::new(2.0, 0.9, 0.25), WHITE_WALL),
        ObjectType::Tree => (Vec3::new(0.6, 1.5, 0.6), [0.18, 0.45, 0.20, 1.0]),
        ObjectType::Bamboo => (Vec3::new(0.3, 2.0, 0.3), [0.40, 0.65, 0.30, 1.0]),
        ObjectType::Lantern => (Vec3::new(0.25, 0.7, 0.25), [0.95, 0.30, 0.15, 1.0]),
        ObjectType::StoneLion => (Vec3::new(0.4, 0.5, 0.6), [0.60, 0.58, 0.55, 1.0]),
    }
}

fn build_instances(editor: &SceneEditor, out: &mut Vec<InstanceData>) {
    out.clear();
    let grid = editor.terrain();
    let water = editor.water_surface();
    let time = editor.sim_time();

    for (x, z, cell) in grid.iter() {
        let center = grid.cell_center(x, z);
        let (top, color) = terrain_style(cell);
        let (top, depth) = if cell == TerrainCell::Water {
            (water.sample_height(center.x, center.z, time), 0.2)
        } else {
            (top, top + 0.1)
        };
        out.push(InstanceData::new(
            Vec3::new(center.x, top - depth, center.z),
            0.0,
            Vec3::new(CELL_SIZE, depth, CELL_SIZE),
            color,
        ));
    }

    for obj in editor.placed_objects() {
        let (scale, color) = object_style(obj.kind);
        out.push(InstanceData::new(obj.position, 0.0, scale, color));
    }

    let boat = editor.boat_pose();
    let tuning = editor.boat().tuning();
    out.push(InstanceData::new(
        boat.position,
        boat.rotation.to_radians(),
        Vec3::new(tuning.width, 0.35, tuning.length),
        [0.55, 0.20, 0.12, 1.0],
    ));
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

struct State {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    instance_buffer: wgpu::Buffer,
    max_instances: usize,
    instances: Vec<InstanceData>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,

    editor: SceneEditor,
    session: EditorSession,
    status: String,
    input: InputState,
    overlay: DebugOverlay,
    last_update: Instant,

    // Frame stats
    frame_count: u32,
    last_fps_update: Instant,
    fps: u32,
    frame_time_avg_ms: f32,
}

fn create_depth_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Instance Buffer"),
        size: (capacity * std::mem::size_of::<InstanceData>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl State {
    async fn new(window: Arc<Window>, editor_config: EditorConfig) -> Result<Self, AppError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(AppError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader_instanced.wgsl").into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[Uniforms::new(Mat4::IDENTITY)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::desc(), InstanceData::desc()],  // Vertex + Instance buffers
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let cube = unit_cube();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: cube.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: cube.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Whole grid plus headroom for objects; grown on demand.
        let max_instances = 4096;
        let instance_buffer = create_instance_buffer(&device, max_instances);

        let overlay = DebugOverlay::new(&window, &device, surface_format);
        let aspect = config.width as f32 / config.height as f32;
        let editor = SceneEditor::new(editor_config, aspect);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            depth_view,
            vertex_buffer,
            index_buffer,
            num_indices: cube.index_count() as u32,
            instance_buffer,
            max_instances,
            instances: Vec::with_capacity(max_instances),
            uniform_buffer,
            uniform_bind_group,
            editor,
            session: EditorSession::default(),
            status: String::new(),
            input: InputState::new(),
            overlay,
            last_update: Instant::now(),
            frame_count: 0,
            last_fps_update: Instant::now(),
            fps: 0,
            frame_time_avg_ms: 0.0,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, &self.config);
            self.editor
                .update_aspect_ratio(new_size.width as f32 / new_size.height as f32);
        }
    }

    /// Route one frame of input into the editor, then advance the simulation.
    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_update).as_secs_f32().min(MAX_FRAME_DT);
        self.last_update = now;

        let input = &self.input;
        let pointer_free = !self.overlay.wants_pointer();
        let keys_free = !self.overlay.wants_keyboard();

        if keys_free {
            for (key, mode) in [
                (KeyCode::Digit1, EditorMode::Terrain),
                (KeyCode::Digit2, EditorMode::Building),
                (KeyCode::Digit3, EditorMode::Game),
            ] {
                if input.was_key_pressed(key) {
                    self.editor.switch_mode(mode);
                }
            }
            if input.ctrl_held() && input.was_key_pressed(KeyCode::KeyZ) {
                self.editor.undo_last_action();
            }
            if input.was_key_pressed(KeyCode::F3) {
                self.overlay.toggle_stats();
            }
        }

        let (dx, dy) = input.mouse_delta;
        self.editor
            .handle_mouse_movement(dx, dy, input.is_button_held(MouseButton::Right));
        if input.is_button_held(MouseButton::Middle) {
            self.editor.handle_middle_mouse_movement(dx, dy);
        }
        if pointer_free && input.scroll_delta != 0.0 {
            self.editor.handle_mouse_scroll(input.scroll_delta);
        }

        // Terrain paints while held; placement is one object per click.
        let click = match self.editor.current_mode() {
            EditorMode::Terrain => input.is_button_held(MouseButton::Left),
            _ => input.was_button_pressed(MouseButton::Left),
        };
        if pointer_free && click {
            let (mx, my) = input.mouse_position;
            self.editor.handle_mouse_click(
                mx,
                my,
                self.size.width as f32,
                self.size.height as f32,
                input.ctrl_held(),
            );
        }

        let (forward, turn) = if keys_free {
            (input.axis(KeyCode::KeyS, KeyCode::KeyW), input.axis(KeyCode::KeyD, KeyCode::KeyA))
        } else {
            (0.0, 0.0)
        };
        self.editor.handle_game_input(forward, turn);

        self.editor.update(dt);
        self.input.end_frame();
    }

    fn apply_hud_command(&mut self, command: HudCommand) {
        match command {
            HudCommand::SwitchMode(mode) => self.editor.switch_mode(mode),
            HudCommand::SetTerrainBrush(cell) => self.editor.set_current_terrain_type(cell),
            HudCommand::SetObjectType(kind) => self.editor.set_current_object_type(kind),
            HudCommand::Undo => {
                self.editor.undo_last_action();
            }
            HudCommand::RemoveLastObject => {
                self.editor.remove_last_object();
            }
            HudCommand::ClearAllObjects => self.editor.clear_all_objects(),
            HudCommand::ClearScene => {
                self.editor.clear_scene();
                self.status = "Scene reset".to_string();
            }
            HudCommand::SaveScene => {
                self.status = match self.editor.save_scene(&self.session) {
                    Ok(path) => format!("Saved {}", path.display()),
                    Err(e) => {
                        warn!("save failed: {e}");
                        format!("Save failed: {e}")
                    }
                };
            }
            HudCommand::LoadScene => {
                self.status = match self.editor.load_scene(&self.session) {
                    Ok(()) => format!("Loaded {}", self.session.scene_path().display()),
                    Err(e) => {
                        warn!("load failed: {e}");
                        format!("Load failed: {e}")
                    }
                };
            }
        }
    }

    fn hud_view(&self) -> HudView {
        let boat = self.editor.boat_pose();
        HudView {
            fps: self.fps,
            frame_time_avg_ms: self.frame_time_avg_ms,
            resolution: (self.size.width, self.size.height),
            mode: self.editor.current_mode(),
            transitioning: self.editor.is_transitioning(),
            terrain_brush: self.editor.current_terrain_type(),
            object_type: self.editor.current_object_type(),
            object_count: self.editor.placed_objects().len(),
            terrain_counts: self.editor.terrain_counts(),
            boat_position: (boat.position.x, boat.position.y, boat.position.z),
            boat_rotation: boat.rotation,
            boat_speed: self.editor.boat().speed(),
            terrain_undo_depth: self.editor.terrain_undo_depth(),
            object_undo_depth: self.editor.object_undo_depth(),
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Collect instance data BEFORE creating the render pass
        let mut instances = std::mem::take(&mut self.instances);
        build_instances(&self.editor, &mut instances);
        if instances.len() > self.max_instances {
            self.max_instances = instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(&self.device, self.max_instances);
            info!("instance buffer grown to {}", self.max_instances);
        }
        self.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        let instance_count = instances.len() as u32;
        self.instances = instances;

        let uniforms = Uniforms::new(self.editor.current_camera().view_projection());
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.55,
                            g: 0.70,
                            b: 0.85,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));  // Instance data
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

            // ONE DRAW CALL for the whole scene
            render_pass.draw_indexed(0..self.num_indices, 0, 0..instance_count);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };
        let hud = self.hud_view();
        let commands = self.overlay.render(
            &self.device,
            &self.queue,
            &mut encoder,
            &self.window,
            &view,
            &screen_descriptor,
            &hud,
            &mut self.session,
            &self.status,
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        for command in commands {
            self.apply_hud_command(command);
        }

        Ok(())
    }

    fn tick_stats(&mut self) {
        self.frame_count += 1;
        let now = Instant::now();
        let elapsed = (now - self.last_fps_update).as_secs_f32();
        if elapsed >= 1.0 {
            self.fps = self.frame_count;
            self.frame_time_avg_ms = elapsed * 1000.0 / self.frame_count as f32;
            log::debug!(
                "FPS: {} | Instances: {} | Mode: {}",
                self.fps,
                self.instances.len(),
                self.editor.current_mode().label()
            );
            self.frame_count = 0;
            self.last_fps_update = now;
        }
    }
}

// ============================================================================
// MAIN
// ============================================================================

fn main() -> Result<(), AppError> {
    env_logger::init();

    let editor_config = EditorConfig::load_or_default(CONFIG_FILE);
    let event_loop = EventLoop::new()?;

    let window_attributes = Window::default_attributes()
        .with_title("Water Town Editor")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

    let window = Arc::new(event_loop.create_window(window_attributes)?);

    let mut state = pollster::block_on(State::new(window.clone(), editor_config))?;
    info!("1/2/3 switch terrain/building/game, Ctrl+Z undo, F3 stats");

    event_loop.run(move |event, control_flow| {
        match event {
            WinitEvent::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                let response = state.overlay.handle_window_event(&window, event);
                state.input.process_event(event, response.consumed);

                match event {
                    WindowEvent::CloseRequested
                    | WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(KeyCode::Escape),
                                ..
                            },
                        ..
                    } => control_flow.exit(),
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        state.update();
                        match state.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                                state.resize(state.size)
                            }
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                error!("GPU out of memory");
                                control_flow.exit()
                            }
                            Err(e) => warn!("{:?}", e),
                        }
                        state.tick_stats();
                    }
                    _ => {}
                }
            }
            WinitEvent::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
