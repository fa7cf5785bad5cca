//! Centralized constants for interaction thresholds, sizing, and colors.
//!
//! This module consolidates the magic numbers used throughout the application
//! to improve maintainability and provide semantic meaning to values.

use eframe::egui::Color32;

// =============================================================================
// INTERACTION THRESHOLDS
// =============================================================================

/// Squared pointer distance within which a click counts as hitting an anchor
/// (15 px radius). The squared form avoids a sqrt in the per-press scan.
pub const ANCHOR_HIT_RADIUS_SQ: f32 = 225.0;

/// Squared pointer distance to a block's bottom-right corner that starts an
/// image resize (10 px radius).
pub const SCALE_HANDLE_RADIUS_SQ: f32 = 100.0;

// =============================================================================
// IMAGE BLOCK BOUNDS
// =============================================================================

/// Smallest allowed value for an image block's bounding dimension.
pub const MIN_IMAGE_BOUND: f32 = 20.0;

/// Largest allowed value for an image block's bounding dimension.
pub const MAX_IMAGE_BOUND: f32 = 500.0;

/// Bounding dimension assigned to freshly created image blocks.
pub const DEFAULT_IMAGE_BOUND: f32 = 160.0;

// =============================================================================
// TEXT BLOCK METRICS
// =============================================================================

/// Initial contents of a new text block, discarded on the first keystroke.
pub const TEXT_PLACEHOLDER: &str = "TEXT";

/// Font size used to render text block contents.
pub const TEXT_FONT_SIZE: f32 = 16.0;

/// Advance width of one monospace glyph cell at `TEXT_FONT_SIZE`.
pub const TEXT_CHAR_WIDTH: f32 = 9.6;

/// Vertical spacing of one text row.
pub const TEXT_LINE_HEIGHT: f32 = 20.0;

// =============================================================================
// DRAWING
// =============================================================================

/// Side length of the square markers drawn on anchors during link formation.
pub const ANCHOR_MARKER_SIZE: f32 = 12.0;

/// Stroke width for in-progress and committed link lines.
pub const LINK_STROKE_WIDTH: f32 = 2.0;

/// Canvas background.
pub const COLOR_BACKGROUND: Color32 = Color32::from_rgb(26, 26, 26);

/// Text block background while idle.
pub const COLOR_TEXT_BG_IDLE: Color32 = Color32::from_rgb(38, 38, 38);

/// Text block background while selected for editing.
pub const COLOR_TEXT_BG_ACTIVE: Color32 = Color32::from_rgb(64, 57, 48);

/// Anchor marker fill.
pub const COLOR_ANCHOR: Color32 = Color32::RED;

/// Link line color.
pub const COLOR_LINK: Color32 = Color32::WHITE;

/// Text block foreground.
pub const COLOR_TEXT: Color32 = Color32::WHITE;

// =============================================================================
// WINDOW
// =============================================================================

/// Initial window width when the application starts.
pub const INITIAL_WINDOW_WIDTH: f32 = 1280.0;

/// Initial window height when the application starts.
pub const INITIAL_WINDOW_HEIGHT: f32 = 800.0;
