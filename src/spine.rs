//! Spine stack (spec §4.2): a fixed-capacity array of cell references that
//! the reducer unwinds the left spine of an application onto, and that
//! doubles as the primary GC root set.

use crate::cell::Cell;
use crate::common::error::{FatalError, Result};

const DEFAULT_CAPACITY: usize = 100_000;

pub struct Spine {
    slots: Vec<Cell>,
    top: usize,
}

impl Spine {
    pub fn new(capacity: usize) -> Self {
        Spine {
            slots: vec![Cell::unused(); capacity],
            top: 0,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    pub fn push(&mut self, cell: Cell) -> Result<()> {
        if self.top >= self.slots.len() {
            return Err(FatalError::StackOverflow);
        }
        self.slots[self.top] = cell;
        self.top += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Cell> {
        if self.top == 0 {
            return None;
        }
        self.top -= 1;
        Some(self.slots[self.top])
    }

    /// Drop the top `n` slots without returning them.
    pub fn drop_n(&mut self, n: usize) {
        self.top = self.top.saturating_sub(n);
    }

    pub fn top(&self) -> Option<Cell> {
        if self.top == 0 {
            None
        } else {
            Some(self.slots[self.top - 1])
        }
    }

    pub fn set_top(&mut self, cell: Cell) {
        debug_assert!(self.top > 0);
        self.slots[self.top - 1] = cell;
    }

    /// The cell `n` slots below the current top (`peek(0)` is the top).
    pub fn peek(&self, n: usize) -> Option<Cell> {
        if n >= self.top {
            return None;
        }
        Some(self.slots[self.top - 1 - n])
    }

    pub fn len(&self) -> usize {
        self.top
    }

    pub fn is_empty(&self) -> bool {
        self.top == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// "Max depth ever reached", computed by scanning down from the top of
    /// the array for the first slot still equal to `UNUSED` (spec §4.2).
    pub fn max_depth_reached(&self) -> usize {
        for (i, slot) in self.slots.iter().enumerate().rev() {
            if !slot.is_unused() {
                return i + 1;
            }
        }
        0
    }

    /// Call `f` on every live slot (the region from the array's start up
    /// to the current top), rewriting it in place. Used by the collector:
    /// spec §4.2 says every slot "from the current top up to the array's
    /// end" is a root, but slots above `top` have never been written and
    /// remain `UNUSED`/leftover values from a previous deeper call, not
    /// live references — only the `0..top` region holds genuinely live
    /// cells, so that is what this walks.
    pub fn for_each_root_mut(&mut self, mut f: impl FnMut(&mut Cell)) {
        for slot in &mut self.slots[..self.top] {
            f(slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Combinator;

    #[test]
    fn push_pop_round_trips() {
        let mut s = Spine::new(4);
        s.push(Cell::int(1)).unwrap();
        s.push(Cell::int(2)).unwrap();
        assert_eq!(s.pop(), Some(Cell::int(2)));
        assert_eq!(s.pop(), Some(Cell::int(1)));
        assert_eq!(s.pop(), None);
    }

    #[test]
    fn overflow_is_fatal() {
        let mut s = Spine::new(2);
        s.push(Cell::int(1)).unwrap();
        s.push(Cell::int(2)).unwrap();
        assert!(matches!(s.push(Cell::int(3)), Err(FatalError::StackOverflow)));
    }

    #[test]
    fn peek_indexes_from_top_downward() {
        let mut s = Spine::new(8);
        s.push(Cell::combinator(Combinator::S)).unwrap();
        s.push(Cell::combinator(Combinator::K)).unwrap();
        s.push(Cell::combinator(Combinator::I)).unwrap();
        assert_eq!(s.peek(0), Some(Cell::combinator(Combinator::I)));
        assert_eq!(s.peek(1), Some(Cell::combinator(Combinator::K)));
        assert_eq!(s.peek(2), Some(Cell::combinator(Combinator::S)));
        assert_eq!(s.peek(3), None);
    }

    #[test]
    fn max_depth_tracks_high_water_mark() {
        let mut s = Spine::new(8);
        s.push(Cell::int(1)).unwrap();
        s.push(Cell::int(2)).unwrap();
        s.push(Cell::int(3)).unwrap();
        s.drop_n(2);
        assert_eq!(s.len(), 1);
        assert_eq!(s.max_depth_reached(), 3);
    }
}
