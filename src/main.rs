mod block;
mod constants;
mod editor;
mod image_loader;
mod input;
mod link;

use block::{Block, BlockContent};
use constants::{
    ANCHOR_MARKER_SIZE, COLOR_ANCHOR, COLOR_BACKGROUND, COLOR_LINK, COLOR_TEXT,
    COLOR_TEXT_BG_ACTIVE, COLOR_TEXT_BG_IDLE, INITIAL_WINDOW_HEIGHT, INITIAL_WINDOW_WIDTH,
    LINK_STROKE_WIDTH, TEXT_FONT_SIZE, TEXT_LINE_HEIGHT,
};
use editor::EditorState;
use eframe::egui::{
    self, pos2, Align2, Color32, FontId, Key, PointerButton, Pos2, Rect, Stroke, Vec2,
};
use input::{AppEvent, FrameInput};
use std::path::Path;

const HELP_TEXT: &str = "right click: text block\n\
    shift + right click: image block\n\
    drag anchors together to link, pan with middle-click";

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([INITIAL_WINDOW_WIDTH, INITIAL_WINDOW_HEIGHT])
            .with_title("Blocklink")
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Blocklink",
        options,
        Box::new(|_cc| Ok(Box::new(BlocklinkApp::new()))),
    )
}

struct BlocklinkApp {
    editor: EditorState,
}

impl BlocklinkApp {
    fn new() -> Self {
        Self {
            editor: EditorState::new(),
        }
    }

    /// Global creation shortcuts, run before hit-testing and block updates.
    fn handle_creation(&mut self, ctx: &egui::Context, input: &FrameInput) {
        for event in &input.events {
            if let AppEvent::Paste(text) = event {
                // Clipboard text is treated as an image path; the new block
                // lands at the center of the screen.
                let center = ctx.screen_rect().center();
                self.spawn_image_logged(center, Path::new(text.trim()));
            }
        }

        for file in &input.dropped_files {
            if let Some(path) = &file.path {
                self.spawn_image_logged(input.pointer, path);
            } else if let Some(bytes) = &file.bytes {
                if let Err(err) = self
                    .editor
                    .spawn_image_block_from_bytes(input.pointer, bytes)
                {
                    log::error!("dropped image rejected: {err}");
                }
            }
        }

        if input.button_pressed(PointerButton::Secondary) {
            if input.modifiers.shift {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &["png", "jpg", "jpeg", "gif", "webp"])
                    .pick_file()
                {
                    self.spawn_image_logged(input.pointer, &path);
                }
            } else {
                self.editor.spawn_text_block(input.pointer);
            }
        }
    }

    fn spawn_image_logged(&mut self, pos: Pos2, path: &Path) {
        if let Err(err) = self.editor.spawn_image_block(pos, path) {
            log::error!("image block not created: {err}");
        }
    }

    /// Draw pass: background, in-progress link with anchor markers,
    /// committed links (pruning stale ones), then every block.
    fn draw(&mut self, ui: &mut egui::Ui, input: &FrameInput) {
        let ctx = ui.ctx().clone();
        for block in &mut self.editor.blocks {
            if let BlockContent::Image(image) = &mut block.content {
                image.ensure_texture(&ctx);
            }
        }

        let painter = ui.painter();

        if self.editor.blocks.is_empty() {
            painter.text(
                ui.max_rect().center(),
                Align2::CENTER_CENTER,
                HELP_TEXT,
                FontId::proportional(20.0),
                COLOR_TEXT,
            );
        }

        if let Some(pick) = self.editor.links.pending() {
            // Offer every anchor as a target, hiding the picked role so the
            // rubber band stays visible at its origin.
            for block in &self.editor.blocks {
                for (anchor, point) in block.anchor_points() {
                    if anchor == pick.anchor {
                        continue;
                    }
                    painter.rect_filled(
                        Rect::from_center_size(point, Vec2::splat(ANCHOR_MARKER_SIZE)),
                        0.0,
                        COLOR_ANCHOR,
                    );
                }
            }
            if let Some(start) = self.editor.anchor_pos(pick) {
                painter.line_segment(
                    [start, input.pointer],
                    Stroke::new(LINK_STROKE_WIDTH, COLOR_LINK),
                );
            }
        }

        let EditorState { blocks, links } = &mut self.editor;
        for (from, to) in links.prune_and_segments(blocks) {
            painter.line_segment([from, to], Stroke::new(LINK_STROKE_WIDTH, COLOR_LINK));
        }

        for block in &self.editor.blocks {
            draw_block(painter, block);
        }

        let dt = ui.input(|i| i.unstable_dt).max(f32::EPSILON);
        painter.text(
            pos2(16.0, 16.0),
            Align2::LEFT_TOP,
            format!("{:.0}", (1.0 / dt).round()),
            FontId::monospace(14.0),
            COLOR_TEXT,
        );
    }
}

impl eframe::App for BlocklinkApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // One snapshot per frame; everything below reads only from it.
        let input = snapshot_input(ctx);

        if input.quit_requested() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        self.handle_creation(ctx, &input);
        self.editor.handle_pointer_press(&input);
        self.editor.update_blocks(&input);

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(COLOR_BACKGROUND))
            .show(ctx, |ui| self.draw(ui, &input));
    }
}

/// Assembles the per-frame snapshot from egui's input state.
fn snapshot_input(ctx: &egui::Context) -> FrameInput {
    ctx.input(|i| {
        let buttons = [
            PointerButton::Primary,
            PointerButton::Secondary,
            PointerButton::Middle,
        ];

        let mut key_presses = Vec::new();
        let mut events = Vec::new();
        for event in &i.events {
            match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    ..
                } => key_presses.push(resolve_key_name(*key)),
                egui::Event::Paste(text) => events.push(AppEvent::Paste(text.clone())),
                _ => {}
            }
        }
        if i.viewport().close_requested() || (i.modifiers.command && i.key_pressed(Key::Q)) {
            events.push(AppEvent::Quit);
        }

        FrameInput {
            pointer: i.pointer.latest_pos().unwrap_or(Pos2::ZERO),
            motion: i.pointer.delta(),
            pressed: buttons.map(|button| i.pointer.button_pressed(button)),
            down: buttons.map(|button| i.pointer.button_down(button)),
            modifiers: i.modifiers,
            keys_held: i.keys_down.clone(),
            key_presses,
            events,
            dropped_files: i.raw.dropped_files.clone(),
        }
    })
}

/// Maps an egui key to the lowercase names the text editor consumes,
/// mirroring the single-character / special-name convention.
fn resolve_key_name(key: Key) -> String {
    match key {
        Key::Backspace => "backspace".to_string(),
        Key::Enter => "return".to_string(),
        Key::Space => "space".to_string(),
        other => other.name().to_lowercase(),
    }
}

fn draw_block(painter: &egui::Painter, block: &Block) {
    match &block.content {
        BlockContent::Text(text) => {
            let background = if block.selected {
                COLOR_TEXT_BG_ACTIVE
            } else {
                COLOR_TEXT_BG_IDLE
            };
            painter.rect_filled(block.rect, 0.0, background);
            for (row, line) in text.lines().iter().enumerate() {
                painter.text(
                    pos2(
                        block.rect.min.x,
                        block.rect.min.y + row as f32 * TEXT_LINE_HEIGHT,
                    ),
                    Align2::LEFT_TOP,
                    line,
                    FontId::monospace(TEXT_FONT_SIZE),
                    COLOR_TEXT,
                );
            }
        }
        BlockContent::Image(image) => {
            if let Some(texture) = &image.texture {
                painter.image(
                    texture.id(),
                    block.rect,
                    Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
        }
    }
}
