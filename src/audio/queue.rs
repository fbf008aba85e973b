//! Shuffle traversal order over the flat playlist.
//!
//! The order is a permutation of playlist indices. The cursor starts before
//! the first element, so the first `advance` yields `order[0]`.

use rand::Rng;
use rand::seq::SliceRandom;

#[derive(Debug, Clone, Default)]
pub struct ShuffleState {
    enabled: bool,
    order: Vec<usize>,
    cursor: Option<usize>,
    /// Playlist length the order was built against.
    covered_len: usize,
}

impl ShuffleState {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Index into `order` of the entry last played, if any.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Turn shuffle on with a fresh order that leaves out `current`.
    pub fn enable<R: Rng + ?Sized>(&mut self, len: usize, current: Option<usize>, rng: &mut R) {
        self.order = (0..len).filter(|&i| Some(i) != current).collect();
        self.order.shuffle(rng);
        self.cursor = None;
        self.covered_len = len;
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
        self.order.clear();
        self.cursor = None;
        self.covered_len = 0;
    }

    /// New pass over every index; nothing is excluded.
    pub fn rebuild<R: Rng + ?Sized>(&mut self, len: usize, rng: &mut R) {
        self.order = (0..len).collect();
        self.order.shuffle(rng);
        self.cursor = None;
        self.covered_len = len;
    }

    /// Move to the next unvisited entry.
    pub fn advance(&mut self) -> Option<usize> {
        let next = self.cursor.map_or(0, |c| c + 1);
        let idx = *self.order.get(next)?;
        self.cursor = Some(next);
        Some(idx)
    }

    /// Step back through entries already generated. No-op at the start.
    pub fn retreat(&mut self) -> Option<usize> {
        let prev = self.cursor?.checked_sub(1)?;
        let idx = *self.order.get(prev)?;
        self.cursor = Some(prev);
        Some(idx)
    }

    /// Follow a playlist whose length changed: drop indices that no longer
    /// exist and append newly added ones, shuffled, after the unvisited tail.
    pub fn sync_len<R: Rng + ?Sized>(&mut self, len: usize, rng: &mut R) {
        if !self.enabled {
            return;
        }
        if len < self.covered_len {
            let removed_upto_cursor = self.cursor.map_or(0, |c| {
                self.order[..=c].iter().filter(|&&i| i >= len).count()
            });
            self.order.retain(|&i| i < len);
            self.cursor = self
                .cursor
                .and_then(|c| (c + 1).checked_sub(removed_upto_cursor))
                .and_then(|n| n.checked_sub(1));
        } else if len > self.covered_len {
            let mut added: Vec<usize> = (self.covered_len..len).collect();
            added.shuffle(rng);
            self.order.extend(added);
        }
        self.covered_len = len;
    }
}
