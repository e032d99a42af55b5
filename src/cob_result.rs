use crate::settings::Settings;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CobResult {
    pub settings: Option<Settings>,
    pub stats: Option<CobStatistics>,
}

impl CobResult {
    pub fn new() -> Self {
        CobResult {
            settings: None,
            stats: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CobStatistics {
    pub cycle: u64,
    pub triples_submitted: u64,
    pub triples_accepted: u64,
    pub triples_rejected: u64,
    pub rows_emitted: u64,
    pub records_emitted: u64,
    pub simulation_time: String,
}

impl CobStatistics {
    pub fn new() -> Self {
        CobStatistics {
            cycle: 0,
            triples_submitted: 0,
            triples_accepted: 0,
            triples_rejected: 0,
            rows_emitted: 0,
            records_emitted: 0,
            simulation_time: String::new(),
        }
    }
}
