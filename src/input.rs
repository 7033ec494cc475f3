// Platform-agnostic input for the frame loop

use std::collections::HashSet;

use glam::Vec2;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    Control,
    Shift,
    /// Toggle gravity.
    G,
    /// Vertical impulse.
    Z,
    /// Deselect.
    Enter,
    /// Toggle normals view.
    N,
    Digit1,
    Digit2,
    Digit3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// Everything the core needs from the shell for one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Elapsed time since the previous frame, in milliseconds.
    pub dt_ms: f32,
    pub keys_down: HashSet<Key>,
    pub keys_pressed: HashSet<Key>,
    /// Cursor position in physical pixels.
    pub mouse_pos: Vec2,
    pub mouse_delta: Vec2,
    pub left_down: bool,
    pub right_pressed: bool,
}

impl FrameInput {
    pub fn idle(dt_ms: f32) -> Self {
        Self {
            dt_ms,
            ..Self::default()
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }
}

/// Accumulates shell events between frames.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
    keys_pressed: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    pointer_pos: Option<Vec2>,
    pointer_delta: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, key: Key, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    pub fn button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if self.buttons_down.insert(button) {
                self.buttons_pressed.insert(button);
            }
        } else {
            self.buttons_down.remove(&button);
        }
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        if let Some(last) = self.pointer_pos {
            self.pointer_delta += pos - last;
        }
        self.pointer_pos = Some(pos);
    }

    /// Releases everything, e.g. on focus loss.
    pub fn clear(&mut self) {
        self.keys_down.clear();
        self.buttons_down.clear();
    }

    /// Snapshot for this frame; per-frame transitions are reset.
    pub fn take_frame(&mut self, dt_ms: f32) -> FrameInput {
        let frame = FrameInput {
            dt_ms,
            keys_down: self.keys_down.clone(),
            keys_pressed: std::mem::take(&mut self.keys_pressed),
            mouse_pos: self.pointer_pos.unwrap_or_default(),
            mouse_delta: std::mem::take(&mut self.pointer_delta),
            left_down: self.buttons_down.contains(&MouseButton::Left),
            right_pressed: self.buttons_pressed.contains(&MouseButton::Right),
        };
        self.buttons_pressed.clear();
        frame
    }
}
