// Editor HUD drawn with egui on top of the scene.
//
// The overlay never touches the editor directly: it reads a `HudView`
// snapshot and returns the `HudCommand`s the user clicked, which the app
// applies after the frame. Only the session (scene name) is edited in place.

use egui::epaint::Shadow;

use crate::config::EditorSession;
use crate::editor::EditorMode;
use crate::engine::objects::ObjectType;
use crate::engine::terrain::TerrainCell;

/// Read-only snapshot of what the HUD displays.
pub struct HudView {
    pub fps: u32,
    pub frame_time_avg_ms: f32,
    pub resolution: (u32, u32),
    pub mode: EditorMode,
    pub transitioning: bool,
    pub terrain_brush: TerrainCell,
    pub object_type: ObjectType,
    pub object_count: usize,
    /// Indexed by `TerrainCell::code()`.
    pub terrain_counts: [usize; 4],
    pub boat_position: (f32, f32, f32),
    pub boat_rotation: f32,
    pub boat_speed: f32,
    pub terrain_undo_depth: usize,
    pub object_undo_depth: usize,
}

/// A user action picked in the HUD this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HudCommand {
    SwitchMode(EditorMode),
    SetTerrainBrush(TerrainCell),
    SetObjectType(ObjectType),
    Undo,
    RemoveLastObject,
    ClearAllObjects,
    ClearScene,
    SaveScene,
    LoadScene,
}

pub struct DebugOverlay {
    /// Stats panel (F3).
    pub stats_visible: bool,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl DebugOverlay {
    pub fn new(
        window: &winit::window::Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let egui_ctx = egui::Context::default();

        // Style: dark, semi-transparent, small monospace white font
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_premultiplied(0, 0, 0, 180);
        visuals.window_stroke = egui::Stroke::NONE;
        visuals.window_shadow = Shadow::NONE;
        visuals.override_text_color = Some(egui::Color32::WHITE);
        egui_ctx.set_visuals(visuals);

        let mut style = (*egui_ctx.style()).clone();
        style.override_font_id = Some(egui::FontId::monospace(13.0));
        egui_ctx.set_style(style);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            None,  // no depth
            1,     // msaa samples
            false, // no dithering
        );

        Self {
            stats_visible: false,
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    pub fn toggle_stats(&mut self) {
        self.stats_visible = !self.stats_visible;
    }

    pub fn handle_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// True while the cursor is over a HUD panel; scene clicks are ignored then.
    pub fn wants_pointer(&self) -> bool {
        self.egui_ctx.wants_pointer_input() || self.egui_ctx.is_pointer_over_area()
    }

    /// True while a text field has focus; editor shortcuts are ignored then.
    pub fn wants_keyboard(&self) -> bool {
        self.egui_ctx.wants_keyboard_input()
    }

    /// Build, tessellate and draw one HUD frame. Returns the clicked commands.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &winit::window::Window,
        view: &wgpu::TextureView,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        hud: &HudView,
        session: &mut EditorSession,
        status: &str,
    ) -> Vec<HudCommand> {
        let raw_input = self.egui_state.take_egui_input(window);
        let mut commands = Vec::new();
        let stats_visible = self.stats_visible;

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            egui::Window::new("Water Town")
                .default_pos(egui::pos2(10.0, 10.0))
                .resizable(false)
                .show(ctx, |ui| {
                    editor_panel(ui, hud, session, status, &mut commands);
                });

            // ── F3: stats panel ──────────────────────────────────────────────
            if stats_visible {
                let screen = ctx.screen_rect();
                egui::Area::new(egui::Id::new("stats_overlay"))
                    .fixed_pos(egui::pos2(screen.right() - 260.0, 10.0))
                    .show(ctx, |ui| {
                        egui::Frame::none()
                            .fill(egui::Color32::from_rgba_premultiplied(0, 0, 0, 180))
                            .inner_margin(egui::Margin::same(8.0))
                            .rounding(4.0)
                            .show(ui, |ui: &mut egui::Ui| stats_panel(ui, hud));
                    });
            }
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &tris, screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        commands
    }
}

fn editor_panel(
    ui: &mut egui::Ui,
    hud: &HudView,
    session: &mut EditorSession,
    status: &str,
    commands: &mut Vec<HudCommand>,
) {
    ui.horizontal(|ui| {
        for mode in EditorMode::ALL {
            if ui.selectable_label(hud.mode == mode, mode.label()).clicked() && hud.mode != mode {
                commands.push(HudCommand::SwitchMode(mode));
            }
        }
    });
    ui.separator();

    match hud.mode {
        EditorMode::Terrain => {
            ui.label("Brush");
            ui.horizontal(|ui| {
                for cell in TerrainCell::ALL {
                    if ui.selectable_label(hud.terrain_brush == cell, cell.label()).clicked() {
                        commands.push(HudCommand::SetTerrainBrush(cell));
                    }
                }
            });
            ui.label("LMB paint | RMB drag pan | wheel zoom | Ctrl+Z undo");
        }
        EditorMode::Building => {
            let mut selected = hud.object_type;
            egui::ComboBox::from_label("Object")
                .selected_text(selected.label())
                .show_ui(ui, |ui| {
                    for kind in ObjectType::ALL {
                        ui.selectable_value(&mut selected, kind, kind.label());
                    }
                });
            if selected != hud.object_type {
                commands.push(HudCommand::SetObjectType(selected));
            }
            if selected.is_water_compatible() {
                ui.label("May stand on water");
            }
            ui.label("LMB place | Ctrl+LMB remove | RMB orbit | MMB pan");
        }
        EditorMode::Game => {
            ui.label("W/S throttle | A/D steer | RMB look");
            ui.label(format!("Speed: {:.2}", hud.boat_speed));
        }
    }

    ui.separator();
    let editing = hud.mode != EditorMode::Game;
    ui.horizontal(|ui| {
        if ui.add_enabled(editing, egui::Button::new("Undo")).clicked() {
            commands.push(HudCommand::Undo);
        }
        if ui.button("Remove last").clicked() {
            commands.push(HudCommand::RemoveLastObject);
        }
        if ui.button("Clear objects").clicked() {
            commands.push(HudCommand::ClearAllObjects);
        }
    });

    ui.separator();
    ui.horizontal(|ui| {
        ui.label("Scene");
        ui.text_edit_singleline(&mut session.scene_name);
    });
    ui.horizontal(|ui| {
        let has_name = !session.scene_name.trim().is_empty();
        if ui.add_enabled(editing && has_name, egui::Button::new("Save")).clicked() {
            commands.push(HudCommand::SaveScene);
        }
        if ui.add_enabled(editing && has_name, egui::Button::new("Load")).clicked() {
            commands.push(HudCommand::LoadScene);
        }
        if ui.add_enabled(editing, egui::Button::new("Reset scene")).clicked() {
            commands.push(HudCommand::ClearScene);
        }
    });
    if !status.is_empty() {
        ui.label(status);
    }
}

fn stats_panel(ui: &mut egui::Ui, hud: &HudView) {
    ui.label(format!("FPS: {}  ({:.2} ms)", hud.fps, hud.frame_time_avg_ms));
    ui.label(format!("Resolution: {} x {}", hud.resolution.0, hud.resolution.1));
    ui.label(format!(
        "Mode: {}{}",
        hud.mode.label(),
        if hud.transitioning { " (blending)" } else { "" }
    ));
    for cell in TerrainCell::ALL {
        ui.label(format!("{:<6} {}", cell.label(), hud.terrain_counts[cell.code() as usize]));
    }
    ui.label(format!("Objects: {}", hud.object_count));
    ui.label(format!(
        "Undo: terrain {}  objects {}",
        hud.terrain_undo_depth, hud.object_undo_depth
    ));
    let (x, y, z) = hud.boat_position;
    ui.label(format!("Boat: ({x:.1}, {y:.2}, {z:.1})  {:.0}°", hud.boat_rotation));
}
