//! the crate spgemm_cob is a cycle level model of a row wise sparse matrix
//! multiplication accumulation engine. there are 4 parts in the crate:
//!
//! - engine: the column banked accumulation engine (store, fill engine,
//!   merge engine and the row controller)
//! - transport: the byte framed input side and the text record output side
//! - partial_products: the loader for the preprocessed product stream
//! - system: the step driven pump that wires a product stream through the
//!   engine into a record sink
//!
//!

pub mod cmd_args;
pub mod cob_result;
pub mod engine;
pub mod partial_products;
pub mod settings;
pub mod system;
pub mod transport;

pub use cob_result::{CobResult, CobStatistics};
pub use engine::{CobEngine, OutputRecord, SubmitOutcome, Triple};
pub use partial_products::PartialProducts;
pub use system::System;
