//! Editor-wide state: the block collection plus link state, mutated only by
//! the frame controller's single update pass.

use crate::block::Block;
use crate::image_loader::ImageLoadError;
use crate::input::FrameInput;
use crate::link::{AnchorPick, Links};
use eframe::egui::{PointerButton, Pos2};
use std::path::Path;
use uuid::Uuid;

/// Owns every block and every link. Blocks are kept in insertion order,
/// which doubles as the hit-test tie-break order; links refer to blocks by
/// id and tolerate their removal.
#[derive(Default)]
pub struct EditorState {
    pub blocks: Vec<Block>,
    pub links: Links,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn_text_block(&mut self, pos: Pos2) -> Uuid {
        let block = Block::new_text(pos);
        let id = block.id;
        self.blocks.push(block);
        id
    }

    /// Decodes and inserts an image block. On decode failure nothing is
    /// inserted and the error propagates to the caller.
    pub fn spawn_image_block(&mut self, pos: Pos2, path: &Path) -> Result<Uuid, ImageLoadError> {
        let block = Block::new_image(pos, path)?;
        let id = block.id;
        self.blocks.push(block);
        Ok(id)
    }

    pub fn spawn_image_block_from_bytes(
        &mut self,
        pos: Pos2,
        bytes: &[u8],
    ) -> Result<Uuid, ImageLoadError> {
        let block = Block::new_image_from_bytes(pos, bytes)?;
        let id = block.id;
        self.blocks.push(block);
        Ok(id)
    }

    /// Runs anchor hit-testing for this frame's pointer edge state.
    pub fn handle_pointer_press(&mut self, input: &FrameInput) {
        if input.button_pressed(PointerButton::Primary) {
            self.links.handle_press(&self.blocks, input.pointer);
        }
    }

    /// Dispatches the frame snapshot to every live block, dropping blocks
    /// that request removal.
    pub fn update_blocks(&mut self, input: &FrameInput) {
        self.blocks.retain_mut(|block| !block.update(input));
    }

    pub fn block(&self, id: Uuid) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    /// Current canvas position of a picked anchor, if its block still lives.
    pub fn anchor_pos(&self, pick: AnchorPick) -> Option<Pos2> {
        self.block(pick.block).map(|block| block.anchor(pick.anchor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Anchor;
    use eframe::egui::{pos2, Key};
    use std::collections::HashSet;

    #[test]
    fn spawned_text_block_sits_at_requested_position() {
        let mut editor = EditorState::new();
        let id = editor.spawn_text_block(pos2(50.0, 60.0));
        let block = editor.block(id).unwrap();
        assert_eq!(block.pos, pos2(50.0, 60.0));
        assert_eq!(block.rect.center(), pos2(50.0, 60.0));
    }

    #[test]
    fn bad_image_path_inserts_nothing() {
        let mut editor = EditorState::new();
        let result = editor.spawn_image_block(pos2(0.0, 0.0), Path::new("/no/such/image.png"));
        assert!(result.is_err());
        assert!(editor.blocks.is_empty());
    }

    #[test]
    fn anchor_press_only_reacts_to_primary_edge() {
        let mut editor = EditorState::new();
        let id = editor.spawn_text_block(pos2(100.0, 100.0));
        let anchor = editor.block(id).unwrap().anchor(Anchor::Top);

        // Held but not newly pressed: no pick.
        editor.handle_pointer_press(&FrameInput {
            pointer: anchor,
            down: [true, false, false],
            ..Default::default()
        });
        assert!(editor.links.pending().is_none());

        editor.handle_pointer_press(&FrameInput {
            pointer: anchor,
            pressed: [true, false, false],
            down: [true, false, false],
            ..Default::default()
        });
        assert_eq!(editor.links.pending().map(|pick| pick.block), Some(id));
    }

    #[test]
    fn deleting_a_linked_block_prunes_its_links_before_next_draw() {
        let mut editor = EditorState::new();
        let a = editor.spawn_text_block(pos2(100.0, 100.0));
        let b = editor.spawn_text_block(pos2(400.0, 100.0));

        let top_a = editor.anchor_pos(AnchorPick { block: a, anchor: Anchor::Top }).unwrap();
        let left_b = editor.anchor_pos(AnchorPick { block: b, anchor: Anchor::Left }).unwrap();
        editor.handle_pointer_press(&FrameInput {
            pointer: top_a,
            pressed: [true, false, false],
            ..Default::default()
        });
        editor.handle_pointer_press(&FrameInput {
            pointer: left_b,
            pressed: [true, false, false],
            ..Default::default()
        });
        assert_eq!(editor.links.committed.len(), 1);

        // Select block A, then hold delete: the update pass removes it.
        if let Some(block) = editor.blocks.iter_mut().find(|block| block.id == a) {
            block.selected = true;
        }
        let mut held = HashSet::new();
        held.insert(Key::Delete);
        editor.update_blocks(&FrameInput {
            keys_held: held,
            ..Default::default()
        });
        assert!(editor.block(a).is_none());
        assert!(editor.block(b).is_some());

        // The next draw pass renders no segment for the stale link.
        let EditorState { blocks, links } = &mut editor;
        assert!(links.prune_and_segments(blocks).is_empty());
        assert!(links.committed.is_empty());
    }

    #[test]
    fn anchor_pos_reflects_block_motion() {
        let mut editor = EditorState::new();
        let id = editor.spawn_text_block(pos2(100.0, 100.0));
        let pick = AnchorPick { block: id, anchor: Anchor::Right };
        let before = editor.anchor_pos(pick).unwrap();

        editor.update_blocks(&FrameInput {
            down: [false, false, true],
            motion: eframe::egui::vec2(10.0, 0.0),
            ..Default::default()
        });
        assert_eq!(editor.anchor_pos(pick).unwrap(), before + eframe::egui::vec2(10.0, 0.0));
    }
}
