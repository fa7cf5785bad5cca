//! Anchor-to-anchor link formation and lifetime.
//!
//! Links never own their endpoints: they refer to blocks by `Uuid`, and a
//! link whose endpoint block has disappeared is pruned lazily while the link
//! list is walked for drawing. Hit-testing uses squared distance with a
//! 15 px radius (`ANCHOR_HIT_RADIUS_SQ`).

use crate::block::{Anchor, Block};
use crate::constants::ANCHOR_HIT_RADIUS_SQ;
use eframe::egui::Pos2;
use uuid::Uuid;

/// One chosen anchor: which block and which of its four anchor points.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AnchorPick {
    pub block: Uuid,
    pub anchor: Anchor,
}

/// A committed connection between two anchors. The pair is unordered and
/// duplicates are allowed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Link {
    pub a: AnchorPick,
    pub b: AnchorPick,
}

/// Pending picks and the committed link list.
#[derive(Default)]
pub struct Links {
    pub first_pick: Option<AnchorPick>,
    pub second_pick: Option<AnchorPick>,
    pub committed: Vec<Link>,
}

impl Links {
    /// Handles a primary-button edge-down at `pointer`.
    ///
    /// Blocks are scanned in insertion order and anchors in declaration
    /// order; the first anchor within the hit radius wins (first-match, not
    /// closest-match). Two distinct picks commit a link and clear the
    /// pending slots; a press that hits nothing cancels any pending pick.
    pub fn handle_press(&mut self, blocks: &[Block], pointer: Pos2) {
        let hit = blocks.iter().find_map(|block| {
            Anchor::ALL.iter().find_map(|&anchor| {
                (block.anchor(anchor).distance_sq(pointer) < ANCHOR_HIT_RADIUS_SQ).then_some(
                    AnchorPick {
                        block: block.id,
                        anchor,
                    },
                )
            })
        });

        match hit {
            None => {
                // Click on empty canvas breaks the line in progress.
                self.first_pick = None;
                self.second_pick = None;
            }
            Some(pick) => {
                if self.first_pick.is_none() {
                    self.first_pick = Some(pick);
                } else if self.first_pick != Some(pick) && self.second_pick.is_none() {
                    self.second_pick = Some(pick);
                }
                if let (Some(a), Some(b)) = (self.first_pick, self.second_pick) {
                    self.committed.push(Link { a, b });
                    self.first_pick = None;
                    self.second_pick = None;
                }
            }
        }
    }

    /// The pick a rubber-band line should be drawn from, if a link is in
    /// progress.
    pub fn pending(&self) -> Option<AnchorPick> {
        if self.second_pick.is_none() {
            self.first_pick
        } else {
            None
        }
    }

    /// Resolves every committed link against the current anchor positions,
    /// dropping links whose endpoint blocks are gone. Called once per draw
    /// pass, so a stale link disappears on the first draw after its block.
    pub fn prune_and_segments(&mut self, blocks: &[Block]) -> Vec<(Pos2, Pos2)> {
        let mut segments = Vec::with_capacity(self.committed.len());
        self.committed.retain(|link| {
            let a = blocks.iter().find(|block| block.id == link.a.block);
            let b = blocks.iter().find(|block| block.id == link.b.block);
            match (a, b) {
                (Some(block_a), Some(block_b)) => {
                    segments.push((block_a.anchor(link.a.anchor), block_b.anchor(link.b.anchor)));
                    true
                }
                _ => false,
            }
        });
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::{pos2, vec2};

    fn blocks_apart() -> Vec<Block> {
        vec![
            Block::new_text(pos2(100.0, 100.0)),
            Block::new_text(pos2(400.0, 100.0)),
        ]
    }

    #[test]
    fn two_picks_commit_exactly_one_link() {
        let blocks = blocks_apart();
        let mut links = Links::default();

        links.handle_press(&blocks, blocks[0].anchor(Anchor::Top));
        assert_eq!(
            links.first_pick,
            Some(AnchorPick {
                block: blocks[0].id,
                anchor: Anchor::Top
            })
        );
        assert!(links.committed.is_empty());

        links.handle_press(&blocks, blocks[1].anchor(Anchor::Left));
        assert_eq!(links.committed.len(), 1);
        assert_eq!(
            links.committed[0],
            Link {
                a: AnchorPick {
                    block: blocks[0].id,
                    anchor: Anchor::Top
                },
                b: AnchorPick {
                    block: blocks[1].id,
                    anchor: Anchor::Left
                },
            }
        );
        assert!(links.first_pick.is_none());
        assert!(links.second_pick.is_none());
    }

    #[test]
    fn empty_click_cancels_pending_pick() {
        let blocks = blocks_apart();
        let mut links = Links::default();

        links.handle_press(&blocks, blocks[0].anchor(Anchor::Top));
        assert!(links.pending().is_some());

        links.handle_press(&blocks, pos2(2000.0, 2000.0));
        assert!(links.pending().is_none());
        assert!(links.committed.is_empty());
    }

    #[test]
    fn repicking_the_same_anchor_does_not_link() {
        let blocks = blocks_apart();
        let mut links = Links::default();

        let top = blocks[0].anchor(Anchor::Top);
        links.handle_press(&blocks, top);
        links.handle_press(&blocks, top);
        assert!(links.committed.is_empty());
        assert!(links.first_pick.is_some());
    }

    #[test]
    fn hit_test_is_first_match_in_insertion_order() {
        // Two blocks stacked at the same position share anchor coordinates;
        // the earlier insertion wins.
        let blocks = vec![
            Block::new_text(pos2(100.0, 100.0)),
            Block::new_text(pos2(100.0, 100.0)),
        ];
        let mut links = Links::default();

        links.handle_press(&blocks, blocks[0].anchor(Anchor::Top));
        assert_eq!(links.first_pick.map(|pick| pick.block), Some(blocks[0].id));
        assert_eq!(links.first_pick.map(|pick| pick.anchor), Some(Anchor::Top));
    }

    #[test]
    fn near_miss_outside_radius_breaks_the_line() {
        let blocks = blocks_apart();
        let mut links = Links::default();

        links.handle_press(&blocks, blocks[0].anchor(Anchor::Top));
        let far = blocks[1].anchor(Anchor::Left) + vec2(16.0, 0.0);
        links.handle_press(&blocks, far);
        assert!(links.pending().is_none());
        assert!(links.committed.is_empty());
    }

    #[test]
    fn segments_track_current_anchor_positions() {
        let mut blocks = blocks_apart();
        let mut links = Links::default();
        links.handle_press(&blocks, blocks[0].anchor(Anchor::Top));
        links.handle_press(&blocks, blocks[1].anchor(Anchor::Left));

        let before = links.prune_and_segments(&blocks);
        blocks[0].handle_drag(vec2(50.0, 25.0));
        let after = links.prune_and_segments(&blocks);

        assert_eq!(after.len(), 1);
        assert_eq!(after[0].0, before[0].0 + vec2(50.0, 25.0));
        assert_eq!(after[0].1, before[0].1);
    }

    #[test]
    fn stale_links_pruned_on_first_draw_after_removal() {
        let mut blocks = blocks_apart();
        let mut links = Links::default();
        links.handle_press(&blocks, blocks[0].anchor(Anchor::Top));
        links.handle_press(&blocks, blocks[1].anchor(Anchor::Left));
        assert_eq!(links.committed.len(), 1);

        let removed = blocks[0].id;
        blocks.retain(|block| block.id != removed);

        let segments = links.prune_and_segments(&blocks);
        assert!(segments.is_empty());
        assert!(links.committed.is_empty());
    }
}
