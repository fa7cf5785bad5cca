//! Canvas blocks: shared geometry and selection handling plus the text and
//! image specializations.
//!
//! A `Block` is center-anchored at `pos`; its bounding `rect` is derived from
//! the rendered content size and the four link anchors sit on the rect edge
//! midpoints. `update_geometry` keeps rect and anchors in sync after every
//! position or content change, so they are never stale at draw time.

use crate::constants::{
    DEFAULT_IMAGE_BOUND, MAX_IMAGE_BOUND, MIN_IMAGE_BOUND, SCALE_HANDLE_RADIUS_SQ,
    TEXT_CHAR_WIDTH, TEXT_LINE_HEIGHT, TEXT_PLACEHOLDER,
};
use crate::image_loader::{self, ImageLoadError};
use crate::input::FrameInput;
use eframe::egui::{self, vec2, ColorImage, PointerButton, Pos2, Rect, Vec2};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One of the four fixed connection points on a block's bounding rectangle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
}

impl Anchor {
    /// Iteration order for hit-testing and drawing.
    pub const ALL: [Anchor; 4] = [Anchor::Top, Anchor::Bottom, Anchor::Left, Anchor::Right];
}

pub struct Block {
    pub id: Uuid,
    /// Center of the block in canvas coordinates.
    pub pos: Pos2,
    pub rect: Rect,
    anchors: [Pos2; 4],
    pub selected: bool,
    pub content: BlockContent,
}

pub enum BlockContent {
    Text(TextContent),
    Image(ImageContent),
}

impl Block {
    pub fn new_text(pos: Pos2) -> Self {
        Self::with_content(pos, BlockContent::Text(TextContent::new()))
    }

    /// Decodes the image at `path` and builds a block around it. The decoded
    /// original is owned by the block and never re-read; on failure no block
    /// exists at all.
    pub fn new_image(pos: Pos2, path: &Path) -> Result<Self, ImageLoadError> {
        let original = image_loader::load_original(path)?;
        Ok(Self::with_content(
            pos,
            BlockContent::Image(ImageContent::new(Some(path.to_path_buf()), original)),
        ))
    }

    /// Builds an image block from bytes already in memory (dropped files).
    pub fn new_image_from_bytes(pos: Pos2, bytes: &[u8]) -> Result<Self, ImageLoadError> {
        let original = image_loader::load_original_from_bytes(bytes)?;
        Ok(Self::with_content(
            pos,
            BlockContent::Image(ImageContent::new(None, original)),
        ))
    }

    fn with_content(pos: Pos2, content: BlockContent) -> Self {
        let mut block = Self {
            id: Uuid::new_v4(),
            pos,
            rect: Rect::ZERO,
            anchors: [Pos2::ZERO; 4],
            selected: false,
            content,
        };
        block.update_geometry();
        block
    }

    /// Recomputes the bounding rect from the content size, centered at `pos`,
    /// then the anchors. Call after any change to position or content.
    pub fn update_geometry(&mut self) {
        let size = match &self.content {
            BlockContent::Text(text) => text.size(),
            BlockContent::Image(image) => image.size(),
        };
        self.rect = Rect::from_center_size(self.pos, size);
        self.anchors = [
            self.rect.center_top(),
            self.rect.center_bottom(),
            self.rect.left_center(),
            self.rect.right_center(),
        ];
    }

    pub fn anchor(&self, anchor: Anchor) -> Pos2 {
        self.anchors[anchor as usize]
    }

    pub fn anchor_points(&self) -> [(Anchor, Pos2); 4] {
        Anchor::ALL.map(|anchor| (anchor, self.anchor(anchor)))
    }

    /// Moves the block by a per-frame pointer delta. Using the delta rather
    /// than the absolute pointer position lets several blocks follow a
    /// middle-button pan at once without drifting apart.
    pub fn handle_drag(&mut self, delta: Vec2) {
        self.pos += delta;
        self.update_geometry();
    }

    /// Runs one frame of the selection / drag / edit state machine.
    ///
    /// Returns true when the block asked to be removed from the collection
    /// (delete key held while selected).
    pub fn update(&mut self, input: &FrameInput) -> bool {
        // The image resize handle takes priority over selection: a press that
        // starts scaling forcibly deselects and is not reused for picking.
        let mut press_consumed = false;
        if let BlockContent::Image(image) = &mut self.content {
            match image.step_scaling(self.rect, input) {
                ScaleStep::Started => {
                    self.selected = false;
                    press_consumed = true;
                }
                ScaleStep::Resized | ScaleStep::Committed => self.update_geometry(),
                ScaleStep::Idle => {}
            }
        }

        if input.button_pressed(PointerButton::Primary) && !press_consumed {
            if self.rect.contains(input.pointer) {
                self.on_selected();
            } else {
                self.on_deselected();
            }
        }

        let mut remove = false;
        if self.selected {
            if input.button_down(PointerButton::Primary) {
                self.handle_drag(input.motion);
            }
            remove = self.while_selected(input);
        }

        // Middle button pans by grabbing, selected or not.
        if input.button_down(PointerButton::Middle) {
            self.handle_drag(input.motion);
        }

        remove
    }

    fn on_selected(&mut self) {
        self.selected = true;
        self.refresh_content();
    }

    fn on_deselected(&mut self) {
        self.selected = false;
        self.refresh_content();
    }

    /// Per-frame hook while the block is selected. Text blocks drain the
    /// frame's key queue here; every block honors the delete key.
    fn while_selected(&mut self, input: &FrameInput) -> bool {
        let mut text_changed = false;
        if let BlockContent::Text(text) = &mut self.content {
            text_changed = text.consume_key_presses(&input.key_presses);
        }
        if text_changed {
            self.update_geometry();
        }
        input.key_held(egui::Key::Delete)
    }

    /// Selection shading is baked into regenerated text content, so both
    /// selection transitions re-render.
    fn refresh_content(&mut self) {
        if let BlockContent::Text(text) = &mut self.content {
            text.regenerate();
        }
        self.update_geometry();
    }
}

/// Inline-editable multi-line text.
pub struct TextContent {
    pub text: String,
    lines: Vec<String>,
    size: Vec2,
}

impl TextContent {
    fn new() -> Self {
        let mut content = Self {
            text: TEXT_PLACEHOLDER.to_string(),
            lines: Vec::new(),
            size: Vec2::ZERO,
        };
        content.regenerate();
        content
    }

    /// Rebuilds the rendered lines and block size from the buffer. Pure
    /// function of `text`, so repeated calls are idempotent. Each line gets a
    /// padding space on either side so multi-line text left-aligns cleanly.
    pub fn regenerate(&mut self) {
        self.lines = self
            .text
            .split('\n')
            .map(|line| format!(" {line} "))
            .collect();
        let widest = self
            .lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        self.size = vec2(
            widest as f32 * TEXT_CHAR_WIDTH,
            self.lines.len() as f32 * TEXT_LINE_HEIGHT,
        );
    }

    /// Applies this frame's key-down events in order. The placeholder is
    /// discarded on the first event; backspace on an empty buffer is a no-op.
    /// Multi-character key names (modifiers, function keys) are ignored.
    /// Returns whether the buffer changed.
    fn consume_key_presses(&mut self, presses: &[String]) -> bool {
        let mut changed = false;
        for name in presses {
            if self.text == TEXT_PLACEHOLDER {
                self.text.clear();
            }
            match name.as_str() {
                "backspace" => {
                    self.text.pop();
                }
                "return" => self.text.push('\n'),
                "space" => self.text.push(' '),
                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next()) {
                        (Some(ch), None) => self.text.push(ch),
                        _ => continue,
                    }
                }
            }
            // Synchronous regeneration: the visible box resizes as you type.
            self.regenerate();
            changed = true;
        }
        changed
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }
}

/// Outcome of one frame of the image resize state machine.
enum ScaleStep {
    Idle,
    Started,
    Resized,
    Committed,
}

/// A lazily-rescaled image with its decoded original kept for re-rendering.
pub struct ImageContent {
    pub path: Option<PathBuf>,
    original: DynamicImage,
    pub rendered: ColorImage,
    /// Bounding dimension the rendered image fits inside, in [20, 500].
    pub max_size: f32,
    pub scaling: bool,
    pub texture: Option<egui::TextureHandle>,
    texture_dirty: bool,
}

impl ImageContent {
    fn new(path: Option<PathBuf>, original: DynamicImage) -> Self {
        let rendered = image_loader::rescale_smooth(&original, DEFAULT_IMAGE_BOUND);
        Self {
            path,
            original,
            rendered,
            max_size: DEFAULT_IMAGE_BOUND,
            scaling: false,
            texture: None,
            texture_dirty: false,
        }
    }

    pub fn size(&self) -> Vec2 {
        let [width, height] = self.rendered.size;
        vec2(width as f32, height as f32)
    }

    /// Drives the `{idle, scaling}` state machine for one frame.
    ///
    /// A primary press near the bottom-right corner enters scaling; while the
    /// button stays held the bound follows the summed pointer motion with a
    /// fast preview rescale, and release commits one smooth rescale.
    fn step_scaling(&mut self, rect: Rect, input: &FrameInput) -> ScaleStep {
        if input.button_pressed(PointerButton::Primary) {
            if rect.right_bottom().distance_sq(input.pointer) < SCALE_HANDLE_RADIUS_SQ {
                self.scaling = true;
                return ScaleStep::Started;
            }
        } else if input.button_down(PointerButton::Primary) {
            if self.scaling {
                self.max_size = (self.max_size + input.motion.x + input.motion.y)
                    .clamp(MIN_IMAGE_BOUND, MAX_IMAGE_BOUND);
                self.rendered = image_loader::rescale_preview(&self.original, self.max_size);
                self.texture_dirty = true;
                return ScaleStep::Resized;
            }
        } else if self.scaling {
            self.scaling = false;
            self.rendered = image_loader::rescale_smooth(&self.original, self.max_size);
            self.texture_dirty = true;
            return ScaleStep::Committed;
        }
        ScaleStep::Idle
    }

    /// Uploads or refreshes the GPU texture for the current rendered image.
    pub fn ensure_texture(&mut self, ctx: &egui::Context) {
        match &mut self.texture {
            None => {
                let label = self
                    .path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "pasted-image".to_string());
                self.texture = Some(ctx.load_texture(
                    label,
                    self.rendered.clone(),
                    egui::TextureOptions::LINEAR,
                ));
            }
            Some(texture) if self.texture_dirty => {
                texture.set(self.rendered.clone(), egui::TextureOptions::LINEAR);
            }
            Some(_) => {}
        }
        self.texture_dirty = false;
    }
}
