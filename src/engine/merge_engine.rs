use super::bank_store::BankStore;
use super::triple::OutputRecord;

/// # Description
/// - the merge engine drains one finished row out of the store
/// - banks are walked in ascending index and each bank bitmap is scanned in
///   ascending address, with the bank in the high bits of the column this
///   gives globally ascending column order
/// - a record stays presented until the consumer takes it, only then is the
///   slot cleared and the cursor moved
#[derive(Debug)]
pub struct MergeEngine {
    row: u16,
    bank: usize,
    scan_addr: usize,
    presented: Option<usize>,
}

impl MergeEngine {
    pub fn new() -> Self {
        MergeEngine {
            row: 0,
            bank: 0,
            scan_addr: 0,
            presented: None,
        }
    }

    /// start draining `row`, cursor back to bank 0
    pub fn begin(&mut self, row: u16) {
        self.row = row;
        self.bank = 0;
        self.scan_addr = 0;
        self.presented = None;
    }

    pub fn bank(&self) -> usize {
        self.bank
    }

    pub fn on_last_bank(&self, store: &BankStore) -> bool {
        self.bank + 1 == store.bank_count()
    }

    /// give up on the current bank and move to the next one
    pub fn next_bank(&mut self) {
        self.bank += 1;
        self.scan_addr = 0;
        self.presented = None;
    }

    /// # Description
    /// - scan the current bank from the cursor and present the next occupied
    ///   slot as a record
    /// - returns None when the bank has nothing left at or above the cursor
    pub fn find(&mut self, store: &BankStore) -> Option<OutputRecord> {
        let addr = store.find_next_occupied(self.bank, self.scan_addr)?;
        self.presented = Some(addr);
        Some(OutputRecord::new(
            self.row,
            store.col_at(self.bank, addr),
            store.value(self.bank, addr),
        ))
    }

    /// # Description
    /// - the consumer took the presented record: clear its slot, advance the
    ///   cursor past it and present the next record of the same bank
    /// - returns None when the bank is drained
    pub fn consume_and_find(&mut self, store: &mut BankStore) -> Option<OutputRecord> {
        let addr = match self.presented.take() {
            Some(addr) => addr,
            None => panic!("consume_and_find: no record is presented"),
        };
        store.clear(self.bank, addr);
        self.scan_addr = addr + 1;
        self.find(store)
    }
}
