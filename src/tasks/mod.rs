//! Background Tasks Module
//!
//! Contains background tasks that run during server operation.
//!
//! # Tasks
//! - Draft sweep: removes expired draft records on a fixed cadence

mod sweep;

pub use sweep::SweepTask;
