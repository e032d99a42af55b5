use log::debug;

use super::bank_store::BankStore;
use super::triple::Triple;

/// what the fill engine did with one triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// written or accumulated into the store
    Accepted,
    /// column outside the addressable range, dropped
    OutOfRange,
    /// the triple starts a new row, nothing was stored
    RowBoundary,
}

/// # Description
/// - the fill engine places incoming triples into the store
/// - it owns the row state: `current_row` is the row of everything stored
///   right now, `first_element` is true until the first accept after a clear
/// - duplicate (row, col) triples are summed on contact, one store access
///   per triple
#[derive(Debug)]
pub struct FillEngine {
    current_row: u16,
    first_element: bool,
}

impl FillEngine {
    pub fn new() -> Self {
        FillEngine {
            current_row: 0,
            first_element: true,
        }
    }

    pub fn current_row(&self) -> u16 {
        self.current_row
    }

    pub fn first_element(&self) -> bool {
        self.first_element
    }

    /// forget the row state, the next accept starts a fresh row
    pub fn reset_row(&mut self) {
        self.first_element = true;
    }

    /// # Description
    /// - place one triple, three outcomes:
    /// - out of range columns are dropped with a diagnostic, they are not a
    ///   stream error
    /// - a row mismatch stores nothing, the controller has to drain the
    ///   current row first
    /// - otherwise write into an empty slot or accumulate into an occupied
    ///   one and take over the triple's row
    pub fn place(&mut self, store: &mut BankStore, triple: &Triple) -> FillOutcome {
        if triple.col as usize >= store.column_range() {
            debug!(
                "dropping out of range triple row {} col {} (range {})",
                triple.row,
                triple.col,
                store.column_range()
            );
            return FillOutcome::OutOfRange;
        }
        if !self.first_element && triple.row != self.current_row {
            return FillOutcome::RowBoundary;
        }
        let (bank, addr) = store.bank_addr(triple.col);
        if store.occupied(bank, addr) {
            store.accumulate(bank, addr, triple.value);
        } else {
            store.write(bank, addr, triple.value);
        }
        self.current_row = triple.row;
        self.first_element = false;
        FillOutcome::Accepted
    }
}
