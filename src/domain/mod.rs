//! Core domain types and logic.

pub mod backtest;
pub mod catalog;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod heatmap;
pub mod indicator;
pub mod metrics;
pub mod monte_carlo;
pub mod numeric;
pub mod ohlcv;
pub mod paper;
pub mod portfolio;
pub mod position;
pub mod signal;
pub mod strategy;
pub mod walk_forward;
