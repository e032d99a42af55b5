//! # Description
//! - the row controller sequences the fill and merge phases of the engine
//! - one `tick()` is one step: one FSM transition, at most one transfer on
//!   each of the input and output handshakes
//! - read the state enum below together with the transition match in
//!   `tick()`, the merge path mirrors the bank walk of the merge engine
//!

use super::bank_store::BankStore;
use super::component::Component;
use super::fill_engine::{FillEngine, FillOutcome};
use super::merge_engine::MergeEngine;
use super::triple::{OutputRecord, Triple};

/// # Description
/// the state of the controller
/// * `Reset` clears the store, entered only at construction
/// * `Fill` accepts triples, the only state with `in_ready` high
/// * `Flush` one step between the last accept of a row and the merge
/// * `MergeStart` rewinds the merge cursor to bank 0
/// * `MergeFind` looks for the next non empty bank
/// * `MergeOutput` holds one record until the consumer takes it
/// * `MergeDone` hands the pending triple back to the fill path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Reset,
    Fill,
    Flush,
    MergeStart,
    MergeFind,
    MergeOutput,
    MergeDone,
}

/// what happened to a submitted triple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// stored (or summed into an occupied slot)
    Accepted,
    /// column out of range, dropped with a diagnostic
    Refused,
    /// the triple opens a new row, the engine holds it and drains the
    /// current row first, do not resubmit
    RowBoundary,
    /// the engine is mid merge, the triple was not captured, resubmit after
    /// draining
    NotReady,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EngineCounters {
    pub triples_submitted: u64,
    pub triples_accepted: u64,
    pub triples_rejected: u64,
    pub records_emitted: u64,
    pub rows_emitted: u64,
}

/// # Description
/// - the accumulation engine: consumes partial product triples, emits each
///   finished row as records in ascending column order
/// - the store is owned here and touched by exactly one of the fill or merge
///   paths per step, the state machine keeps them mutually exclusive
///
/// # Example
/// ```ignore
/// let mut engine = CobEngine::new(8, 256);
/// engine.tick(); // leave reset
/// engine.submit(Triple::new(10, 0, 5, true));
/// loop {
///     if let Some(record) = engine.poll_output() {
///         println!("{:?}", record);
///         engine.ack_output();
///     }
///     if engine.idle() {
///         break;
///     }
///     engine.tick();
/// }
/// ```
#[derive(Debug)]
pub struct CobEngine {
    state: EngineState,
    store: BankStore,
    fill: FillEngine,
    merge: MergeEngine,
    pending: Option<Triple>,
    flush_scheduled: bool,
    finishing: bool,
    output_reg: Option<OutputRecord>,
    out_acked: bool,
    counters: EngineCounters,
}

impl CobEngine {
    pub fn new(bank_count: usize, bank_depth: usize) -> Self {
        CobEngine {
            state: EngineState::Reset,
            store: BankStore::new(bank_count, bank_depth),
            fill: FillEngine::new(),
            merge: MergeEngine::new(),
            pending: None,
            flush_scheduled: false,
            finishing: false,
            output_reg: None,
            out_acked: false,
            counters: EngineCounters::default(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn counters(&self) -> &EngineCounters {
        &self.counters
    }

    /// true when a triple submitted this step can be consumed
    pub fn in_ready(&self) -> bool {
        matches!(self.state, EngineState::Fill)
            && !self.flush_scheduled
            && !self.finishing
            && self.pending.is_none()
    }

    /// # Description
    /// - the input side of the handshake, this is the fill step
    /// - only call while `in_ready()`, otherwise the triple is not captured
    ///   and `NotReady` comes back
    pub fn submit(&mut self, triple: Triple) -> SubmitOutcome {
        if !self.in_ready() {
            return SubmitOutcome::NotReady;
        }
        self.counters.triples_submitted += 1;
        match self.fill.place(&mut self.store, &triple) {
            FillOutcome::Accepted => {
                self.counters.triples_accepted += 1;
                if triple.last {
                    self.flush_scheduled = true;
                }
                SubmitOutcome::Accepted
            }
            FillOutcome::OutOfRange => {
                self.counters.triples_rejected += 1;
                SubmitOutcome::Refused
            }
            FillOutcome::RowBoundary => {
                self.pending = Some(triple);
                self.state = EngineState::Flush;
                SubmitOutcome::RowBoundary
            }
        }
    }

    /// the record currently presented on the output side, if any
    pub fn poll_output(&self) -> Option<OutputRecord> {
        self.output_reg
    }

    /// consumer took the presented record, the slot is cleared on the next
    /// step
    pub fn ack_output(&mut self) {
        if self.output_reg.is_some() {
            self.out_acked = true;
        }
    }

    /// # Description
    /// - end of stream: the current row is flushed as soon as the engine is
    ///   back in the fill state, no further input is accepted
    pub fn finish(&mut self) {
        self.finishing = true;
    }

    /// nothing stored, nothing pending, nothing presented
    pub fn idle(&self) -> bool {
        matches!(self.state, EngineState::Fill)
            && self.fill.first_element()
            && !self.flush_scheduled
            && self.pending.is_none()
            && self.output_reg.is_none()
    }

    /// # Description
    /// - advance one step without an input transfer
    /// - in `Fill` this is the idle transition (or the scheduled entry into
    ///   `Flush`), everywhere else it moves the merge along
    pub fn tick(&mut self) {
        match self.state {
            EngineState::Reset => {
                self.store.clear_all();
                self.fill.reset_row();
                self.state = EngineState::Fill;
            }
            EngineState::Fill => {
                if self.flush_scheduled || (self.finishing && !self.fill.first_element()) {
                    self.flush_scheduled = false;
                    self.state = EngineState::Flush;
                }
            }
            EngineState::Flush => {
                self.state = EngineState::MergeStart;
            }
            EngineState::MergeStart => {
                self.merge.begin(self.fill.current_row());
                self.state = EngineState::MergeFind;
            }
            EngineState::MergeFind => match self.merge.find(&self.store) {
                Some(record) => {
                    self.output_reg = Some(record);
                    self.out_acked = false;
                    self.state = EngineState::MergeOutput;
                }
                None => {
                    if self.merge.on_last_bank(&self.store) {
                        self.state = EngineState::MergeDone;
                    } else {
                        self.merge.next_bank();
                    }
                }
            },
            EngineState::MergeOutput => {
                if self.out_acked {
                    self.counters.records_emitted += 1;
                    self.out_acked = false;
                    match self.merge.consume_and_find(&mut self.store) {
                        Some(record) => {
                            self.output_reg = Some(record);
                        }
                        None => {
                            self.output_reg = None;
                            self.state = EngineState::MergeFind;
                        }
                    }
                }
                // not acked: hold the record
            }
            EngineState::MergeDone => {
                self.counters.rows_emitted += 1;
                self.fill.reset_row();
                self.state = EngineState::Fill;
                if let Some(pending) = self.pending.take() {
                    match self.fill.place(&mut self.store, &pending) {
                        FillOutcome::Accepted => {
                            self.counters.triples_accepted += 1;
                            if pending.last {
                                self.flush_scheduled = true;
                            }
                        }
                        outcome => {
                            panic!("pending triple came back {:?} after a merge", outcome)
                        }
                    }
                }
            }
        }
    }
}

impl Component for CobEngine {
    fn cycle(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.tick();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// feed every triple (stepping through merges as needed), then drain
    fn run_stream(bank_count: usize, bank_depth: usize, triples: &[Triple]) -> Vec<OutputRecord> {
        let mut engine = CobEngine::new(bank_count, bank_depth);
        engine.tick();
        let mut out = Vec::new();
        for triple in triples {
            let mut guard = 0;
            loop {
                if let Some(record) = engine.poll_output() {
                    out.push(record);
                    engine.ack_output();
                }
                if engine.in_ready() {
                    assert_ne!(engine.submit(*triple), SubmitOutcome::NotReady);
                    break;
                }
                engine.tick();
                guard += 1;
                assert!(guard < 100_000, "engine never became ready");
            }
        }
        engine.finish();
        let mut guard = 0;
        while !engine.idle() {
            if let Some(record) = engine.poll_output() {
                out.push(record);
                engine.ack_output();
            }
            engine.tick();
            guard += 1;
            assert!(guard < 100_000, "engine never drained");
        }
        out
    }

    fn rec(row: u16, col: u16, value: i32) -> OutputRecord {
        OutputRecord::new(row, col, value)
    }

    #[test]
    fn test_duplicate_columns_accumulate() {
        let out = run_stream(
            8,
            256,
            &[
                Triple::new(10, 0, 5, false),
                Triple::new(20, 0, 5, false),
                Triple::new(3, 0, 5, true),
            ],
        );
        assert_eq!(out, vec![rec(0, 5, 33)]);
    }

    #[test]
    fn test_output_is_sorted_across_banks() {
        let out = run_stream(
            8,
            256,
            &[
                Triple::new(1, 0, 7, false),
                Triple::new(2, 0, 0, false),
                Triple::new(3, 0, 255, false),
                Triple::new(4, 0, 4, false),
                Triple::new(6, 0, 2047, false),
                Triple::new(5, 0, 256, true),
            ],
        );
        assert_eq!(
            out,
            vec![
                rec(0, 0, 2),
                rec(0, 4, 4),
                rec(0, 7, 1),
                rec(0, 255, 3),
                rec(0, 256, 5),
                rec(0, 2047, 6),
            ]
        );
    }

    #[test]
    fn test_row_change_drains_then_resumes() {
        let out = run_stream(
            8,
            256,
            &[
                Triple::new(100, 0, 2, false),
                Triple::new(1, 0, 2, false),
                Triple::new(7, 1, 2, true),
            ],
        );
        assert_eq!(out, vec![rec(0, 2, 101), rec(1, 2, 7)]);
    }

    #[test]
    fn test_out_of_range_column_is_refused() {
        let mut engine = CobEngine::new(8, 256);
        engine.tick();
        assert_eq!(
            engine.submit(Triple::new(1, 0, 5, false)),
            SubmitOutcome::Accepted
        );
        assert_eq!(
            engine.submit(Triple::new(99, 0, 2048, false)),
            SubmitOutcome::Refused
        );
        assert_eq!(
            engine.submit(Triple::new(2, 0, 6, true)),
            SubmitOutcome::Accepted
        );
        let mut out = Vec::new();
        while !engine.idle() {
            if let Some(record) = engine.poll_output() {
                out.push(record);
                engine.ack_output();
            }
            engine.tick();
        }
        assert_eq!(out, vec![rec(0, 5, 1), rec(0, 6, 2)]);
        assert_eq!(engine.counters().triples_rejected, 1);
        assert_eq!(engine.counters().triples_accepted, 2);
    }

    #[test]
    fn test_full_bank_drains_in_order() {
        let mut triples: Vec<Triple> = (0..256u16)
            .map(|c| Triple::new(c as i32, 0, c, false))
            .collect();
        triples.push(Triple::new(0, 0, 0, true));
        let out = run_stream(8, 256, &triples);
        assert_eq!(out.len(), 256);
        for (c, record) in out.iter().enumerate() {
            assert_eq!(*record, rec(0, c as u16, c as i32));
        }
    }

    #[test]
    fn test_accumulation_wraps() {
        let out = run_stream(
            8,
            256,
            &[
                Triple::new(2_000_000_000, 0, 1, false),
                Triple::new(2_000_000_000, 0, 1, true),
            ],
        );
        assert_eq!(out, vec![rec(0, 1, -294_967_296)]);
    }

    #[test]
    fn test_back_to_back_rows_do_not_leak() {
        // both rows use the same columns, the second must see a clean store
        let out = run_stream(
            8,
            256,
            &[
                Triple::new(1, 4, 10, false),
                Triple::new(2, 4, 20, false),
                Triple::new(3, 5, 10, false),
                Triple::new(4, 5, 20, true),
            ],
        );
        assert_eq!(
            out,
            vec![rec(4, 10, 1), rec(4, 20, 2), rec(5, 10, 3), rec(5, 20, 4)]
        );
    }

    #[test]
    fn test_last_on_first_triple_of_row() {
        let out = run_stream(8, 256, &[Triple::new(9, 7, 0, true)]);
        assert_eq!(out, vec![rec(7, 0, 9)]);
    }

    #[test]
    fn test_pending_triple_with_last_flushes_both_rows() {
        // the boundary triple carries the last flag, its row must still come out
        let out = run_stream(
            8,
            256,
            &[Triple::new(5, 0, 3, false), Triple::new(6, 1, 3, true)],
        );
        assert_eq!(out, vec![rec(0, 3, 5), rec(1, 3, 6)]);
    }

    #[test]
    fn test_not_ready_while_merging() {
        let mut engine = CobEngine::new(8, 256);
        engine.tick();
        engine.submit(Triple::new(1, 0, 0, false));
        assert_eq!(
            engine.submit(Triple::new(2, 1, 0, false)),
            SubmitOutcome::RowBoundary
        );
        assert!(!engine.in_ready());
        assert_eq!(
            engine.submit(Triple::new(3, 1, 1, false)),
            SubmitOutcome::NotReady
        );
        assert_eq!(engine.state(), EngineState::Flush);
    }

    #[test]
    fn test_fsm_walks_the_merge_states() {
        let mut engine = CobEngine::new(8, 256);
        assert_eq!(engine.state(), EngineState::Reset);
        engine.tick();
        assert_eq!(engine.state(), EngineState::Fill);
        engine.submit(Triple::new(1, 0, 0, true));
        engine.tick();
        assert_eq!(engine.state(), EngineState::Flush);
        engine.tick();
        assert_eq!(engine.state(), EngineState::MergeStart);
        engine.tick();
        assert_eq!(engine.state(), EngineState::MergeFind);
        engine.tick();
        assert_eq!(engine.state(), EngineState::MergeOutput);
        // no ack yet, the record is held
        engine.tick();
        assert_eq!(engine.state(), EngineState::MergeOutput);
        assert_eq!(engine.poll_output(), Some(rec(0, 0, 1)));
        engine.ack_output();
        engine.tick();
        assert_eq!(engine.state(), EngineState::MergeFind);
        // banks 0..7 are walked one per step, bank 0 cursor is spent first
        for _ in 0..7 {
            engine.tick();
            assert_eq!(engine.state(), EngineState::MergeFind);
        }
        engine.tick();
        assert_eq!(engine.state(), EngineState::MergeDone);
        engine.tick();
        assert_eq!(engine.state(), EngineState::Fill);
        assert!(engine.idle());
        assert_eq!(engine.counters().rows_emitted, 1);
        assert_eq!(engine.counters().records_emitted, 1);
    }

    #[test]
    fn test_finish_on_empty_stream_is_a_no_op() {
        let mut engine = CobEngine::new(8, 256);
        engine.tick();
        engine.finish();
        engine.tick();
        assert_eq!(engine.state(), EngineState::Fill);
        assert!(engine.idle());
    }
}
