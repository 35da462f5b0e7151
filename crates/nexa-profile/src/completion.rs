//! Completion tracking over the set of confirmed blocks.

use crate::block::BlockId;
use std::collections::BTreeSet;

/// Blocks the user has explicitly confirmed.
pub type CompletedBlocks = BTreeSet<BlockId>;

/// Percentage of completed blocks, rounded to the nearest integer.
///
/// Always within 0..=100; a form with no blocks is 0% complete.
pub fn completion_percentage(completed: &CompletedBlocks, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = completed.len().min(total);
    ((done * 100 + total / 2) / total) as u8
}

/// First block of `order` that is not completed.
pub fn next_incomplete_block(completed: &CompletedBlocks, order: &[BlockId]) -> Option<BlockId> {
    order.iter().copied().find(|b| !completed.contains(b))
}
