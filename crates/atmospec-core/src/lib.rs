//! Numeric core of the ATMOSPEC UV/vis workflow.
//!
//! Conformer transitions flow through [`spectrum`] (per-conformer broadening),
//! [`ensemble`] (Boltzmann-weighted total and the nanometer hand-off) and
//! [`photolysis`] (actinic-flux convolution and rate integration).

pub mod analysis;
pub mod common;
pub mod config;
pub mod domain;
pub mod ensemble;
pub mod experimental;
pub mod export;
pub mod numerics;
pub mod photolysis;
pub mod session;
pub mod spectrum;
pub mod units;
