//! Input handling for the field.
//!
//! Collects raw winit window events into per-frame state: where the pointer
//! is, where it was when the previous frame ended, and which keys went down
//! this frame.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::swarm::Pointer;

/// Pointer and keyboard state for one frame.
#[derive(Debug, Default)]
pub struct Input {
    keys_pressed: HashSet<KeyCode>,
    keys_held: HashSet<KeyCode>,

    pointer_position: Vec2,
    /// Pointer position when the previous frame ended.
    frame_start_position: Vec2,
    pointer_inside: bool,
    /// Next pointer sample starts a fresh track (no velocity from the old spot).
    resync_pointer: bool,

    window_size: (u32, u32),
}

impl Input {
    pub fn new() -> Self {
        Self {
            window_size: (800, 600),
            resync_pointer: true,
            ..Default::default()
        }
    }

    /// Key went down this frame (auto-repeat ignored).
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Pointer position in window pixels.
    pub fn pointer_position(&self) -> Vec2 {
        self.pointer_position
    }

    /// Whether the cursor is currently over the window.
    pub fn pointer_inside(&self) -> bool {
        self.pointer_inside
    }

    /// Pointer this frame, paired with its position at the end of last frame.
    pub fn pointer(&self) -> Pointer {
        Pointer {
            position: self.pointer_position,
            previous: self.frame_start_position,
        }
    }

    /// Pointer position divided by the window size, in `0.0..=1.0` when inside.
    pub fn pointer_normalized(&self) -> Vec2 {
        let (w, h) = self.window_size;
        if w == 0 || h == 0 {
            return Vec2::ZERO;
        }
        self.pointer_position / Vec2::new(w as f32, h as f32)
    }

    /// Per-frame pointer displacement divided by the window width.
    pub fn pointer_velocity_normalized(&self) -> f32 {
        let (w, _) = self.window_size;
        if w == 0 {
            return 0.0;
        }
        self.pointer().velocity() / w as f32
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    pub(crate) fn set_window_size(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Close the frame: the current pointer becomes next frame's previous one.
    pub(crate) fn end_frame(&mut self) {
        self.keys_pressed.clear();
        self.frame_start_position = self.pointer_position;
    }

    pub(crate) fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            if self.keys_held.insert(key) {
                                self.keys_pressed.insert(key);
                            }
                        }
                        ElementState::Released => {
                            self.keys_held.remove(&key);
                        }
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.move_pointer(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorEntered { .. } => {
                self.pointer_inside = true;
                self.resync_pointer = true;
            }
            WindowEvent::CursorLeft { .. } => self.pointer_inside = false,
            WindowEvent::Focused(false) => self.keys_held.clear(),
            _ => {}
        }
    }

    fn move_pointer(&mut self, position: Vec2) {
        if self.resync_pointer || !self.pointer_inside {
            self.frame_start_position = position;
            self.resync_pointer = false;
            self.pointer_inside = true;
        }
        self.pointer_position = position;
    }
}
