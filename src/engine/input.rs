// Input state tracking for keyboard and mouse
// Folds winit window events into a per-frame snapshot the editor loop polls

use std::collections::HashSet;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

#[derive(Default)]
pub struct InputState {
    // Keyboard
    keys_held: HashSet<KeyCode>,
    /// Keys that went down since the last end_frame(); repeats are ignored.
    keys_pressed: HashSet<KeyCode>,
    modifiers: ModifiersState,

    // Mouse
    pub mouse_position: (f32, f32),
    /// Cursor travel since the last end_frame(), in pixels (y grows downward).
    pub mouse_delta: (f32, f32),
    buttons_held: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    has_cursor: bool,

    // Scroll: accumulated vertical scroll this frame, reset in end_frame()
    pub scroll_delta: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a winit WindowEvent into the input state.
    /// `consumed` marks events the HUD already handled: they still release
    /// held state but never start a new press.
    pub fn process_event(&mut self, event: &WindowEvent, consumed: bool) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed if !consumed => {
                            if self.keys_held.insert(key) {
                                self.keys_pressed.insert(key);
                            }
                        }
                        ElementState::Pressed => {}
                        ElementState::Released => {
                            self.keys_held.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::ModifiersChanged(mods) => {
                self.modifiers = mods.state();
            }
            WindowEvent::CursorMoved { position, .. } => {
                let pos = (position.x as f32, position.y as f32);
                if self.has_cursor {
                    self.mouse_delta.0 += pos.0 - self.mouse_position.0;
                    self.mouse_delta.1 += pos.1 - self.mouse_position.1;
                }
                self.mouse_position = pos;
                self.has_cursor = true;
            }
            WindowEvent::CursorLeft { .. } => {
                self.has_cursor = false;
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed if !consumed => {
                    self.buttons_held.insert(*button);
                    self.buttons_pressed.insert(*button);
                }
                ElementState::Pressed => {}
                ElementState::Released => {
                    self.buttons_held.remove(button);
                }
            },
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.scroll_delta += y;
            }
            WindowEvent::Focused(false) => {
                self.keys_held.clear();
                self.buttons_held.clear();
            }
            _ => {}
        }
    }

    /// Call once per frame after the editor has consumed input.
    /// Resets per-frame accumulators.
    pub fn end_frame(&mut self) {
        self.scroll_delta = 0.0;
        self.mouse_delta = (0.0, 0.0);
        self.keys_pressed.clear();
        self.buttons_pressed.clear();
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn was_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn is_button_held(&self, button: MouseButton) -> bool {
        self.buttons_held.contains(&button)
    }

    pub fn was_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    pub fn ctrl_held(&self) -> bool {
        self.modifiers.control_key() || self.modifiers.super_key()
    }

    /// -1, 0 or +1 from a negative/positive key pair.
    pub fn axis(&self, negative: KeyCode, positive: KeyCode) -> f32 {
        let mut v = 0.0;
        if self.is_key_held(positive) {
            v += 1.0;
        }
        if self.is_key_held(negative) {
            v -= 1.0;
        }
        v
    }
}
