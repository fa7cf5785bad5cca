//! Per-frame input snapshot consumed by the editor core.
//!
//! The platform layer (`main.rs`) assembles one `FrameInput` per rendered
//! frame; everything downstream reads from it and never touches egui's input
//! state directly. Tests build snapshots by mutating `FrameInput::default()`.

use eframe::egui::{DroppedFile, Key, Modifiers, PointerButton, Pos2, Vec2};
use std::collections::HashSet;

/// Events surfaced through the generic per-frame event queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The platform asked the application to shut down.
    Quit,
    /// Clipboard text was pasted this frame.
    Paste(String),
}

/// Snapshot of every input source for one frame.
///
/// Button arrays are indexed by `PointerButton as usize`
/// (primary / secondary / middle); `pressed` is edge state, true only on the
/// frame the button went down, while `down` is level state.
#[derive(Default)]
pub struct FrameInput {
    pub pointer: Pos2,
    /// Pointer motion since the previous frame.
    pub motion: Vec2,
    pub pressed: [bool; 3],
    pub down: [bool; 3],
    pub modifiers: Modifiers,
    pub keys_held: HashSet<Key>,
    /// Key-down events in arrival order, resolved to lowercase names
    /// ("a", "7", "backspace", "return", "space", ...). Drained once per
    /// frame by whichever block is selected, then discarded.
    pub key_presses: Vec<String>,
    pub events: Vec<AppEvent>,
    pub dropped_files: Vec<DroppedFile>,
}

impl FrameInput {
    /// Edge state: true only on the frame `button` transitioned down.
    pub fn button_pressed(&self, button: PointerButton) -> bool {
        self.pressed.get(button as usize).copied().unwrap_or(false)
    }

    /// Level state: true for every frame `button` is held.
    pub fn button_down(&self, button: PointerButton) -> bool {
        self.down.get(button as usize).copied().unwrap_or(false)
    }

    pub fn key_held(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }

    pub fn quit_requested(&self) -> bool {
        self.events.iter().any(|event| matches!(event, AppEvent::Quit))
    }
}
