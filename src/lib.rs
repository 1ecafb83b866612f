//! greenci - energy and performance harness for CI test-execution strategies
//!
//! Compares a sequential baseline, a parallelized run and test-impact
//! analysis on wall time, CPU, memory and estimated energy. The crate
//! covers dispatching the CI runs, collecting their reports, deriving
//! energy and EDP figures, and testing the resulting hypotheses.

pub mod analysis;
pub mod cli;
pub mod collect;
pub mod command;
pub mod config;
pub mod csv_output;
pub mod derive;
pub mod html_output;
pub mod hypothesis;
pub mod log_extract;
pub mod orchestrator;
pub mod parser;
pub mod record;
pub mod report;
pub mod trigger;
pub mod workload;
