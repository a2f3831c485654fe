use std::ops::Range;

use crate::models::{Slot, WEEK_SLOTS};

/// One preference symbol per week slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceGrid {
    cells: [char; WEEK_SLOTS],
}

impl PreferenceGrid {
    /// A grid with every slot set to `symbol`.
    pub fn filled(symbol: char) -> Self {
        Self {
            cells: [symbol; WEEK_SLOTS],
        }
    }

    /// Overwrites the slots in `range`. Slots past the week are ignored.
    pub fn paint(&mut self, range: Range<Slot>, symbol: char) {
        let end = range.end.min(WEEK_SLOTS);
        let start = range.start.min(end);
        self.cells[start..end].fill(symbol);
    }

    pub fn get(&self, slot: Slot) -> Option<char> {
        self.cells.get(slot).copied()
    }

    pub fn render(&self) -> String {
        self.cells.iter().collect()
    }
}
