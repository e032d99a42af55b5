//! # Description
//! - this module is the accumulation engine
//! - the main sub module is controller, it owns the store and sequences the
//!   fill and merge phases
//! - read controller.rs for more details
//!
//! # Components
//! - bank_store: column indexed slot storage with occupancy bitmaps
//! - fill_engine: places triples, sums duplicates on contact
//! - merge_engine: drains a finished row in ascending column order
//! - controller: the state machine and the streaming interface
//!

pub(self) mod bank_store;
pub(self) mod component;
pub(self) mod controller;
pub(self) mod fill_engine;
pub(self) mod merge_engine;
pub(self) mod triple;

pub use component::Component;
pub use controller::{CobEngine, EngineCounters, EngineState, SubmitOutcome};
pub use triple::{OutputRecord, Triple};
