//! the step driven pump around the engine
//!
//! one loop iteration of [`System::run`] is one step: the output handshake
//! is drained first, then either one triple is fed on the input handshake or
//! the engine advances on its own. this keeps the per step contract of the
//! engine observable from the outside, at most one transfer per side.
//!

use std::error::Error;
use std::io::{Read, Write};

use log::{debug, info};

use crate::cob_result::CobStatistics;
use crate::engine::{CobEngine, Component, SubmitOutcome};
use crate::transport::{FrameReader, RecordWriter};

#[derive(Debug)]
pub struct System<R: Read, W: Write> {
    engine: CobEngine,
    source: FrameReader<R>,
    sink: RecordWriter<W>,
    total_cycle: u64,
}

impl<R: Read, W: Write> System<R, W> {
    pub fn new(engine: CobEngine, source: FrameReader<R>, sink: RecordWriter<W>) -> Self {
        System {
            engine,
            source,
            sink,
            total_cycle: 0,
        }
    }

    /// # Description
    /// * run the stream to completion and return the statistics
    /// * the source ending cleanly raises finish on the engine, the loop
    ///   then keeps stepping until the last row is drained
    /// * frame errors from the source abort the run, the engine never sees
    ///   the bad frame
    pub fn run(&mut self) -> Result<CobStatistics, Box<dyn Error>> {
        let mut source_drained = false;
        loop {
            self.total_cycle += 1;

            if let Some(record) = self.engine.poll_output() {
                self.sink.write_record(&record)?;
                self.engine.ack_output();
            }

            if self.engine.in_ready() && !source_drained {
                match self.source.next_frame()? {
                    Some(triple) => {
                        if self.engine.submit(triple) == SubmitOutcome::RowBoundary {
                            debug!("row boundary at row {}", triple.row);
                        }
                    }
                    None => {
                        source_drained = true;
                        self.engine.finish();
                        self.engine.cycle()?;
                    }
                }
            } else {
                self.engine.cycle()?;
            }

            if source_drained && self.engine.idle() {
                break;
            }
        }
        self.sink.flush()?;

        let counters = self.engine.counters();
        info!(
            "stream done: {} cycles, {} rows, {} records, {} triples dropped",
            self.total_cycle, counters.rows_emitted, counters.records_emitted,
            counters.triples_rejected
        );
        let mut stat = CobStatistics::new();
        stat.cycle = self.total_cycle;
        stat.triples_submitted = counters.triples_submitted;
        stat.triples_accepted = counters.triples_accepted;
        stat.triples_rejected = counters.triples_rejected;
        stat.rows_emitted = counters.rows_emitted;
        stat.records_emitted = counters.records_emitted;
        Ok(stat)
    }

    /// hand the sink back, mostly for tests that collect into memory
    pub fn into_sink(self) -> RecordWriter<W> {
        self.sink
    }
}
