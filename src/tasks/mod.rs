//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Eviction sweep: drops cached documents idle longer than the retention

mod sweeper;

pub use sweeper::spawn_sweeper;
