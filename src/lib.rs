//! tradebot: single-instrument strategy backtesting and robustness analysis.
//!
//! The simulation engine, signal modules and analyzers live in [`domain`] and
//! never touch I/O. [`ports`] declares the seams for configuration, bar data
//! and paper-trading sessions; [`adapters`] fills them with INI files, CSV
//! files and an in-memory store. [`cli`] wires everything behind `clap`.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
