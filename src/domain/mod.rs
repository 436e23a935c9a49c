//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod rank;
pub mod distribution;
pub mod settings;
pub mod bias_model;
pub mod error;
