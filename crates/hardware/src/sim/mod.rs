//! Simulation drivers and program loading.
//!
//! Provides the assembly loader, the cycle-capped run loop around the
//! pipeline engine, and a sequential reference interpreter used to check
//! pipeline results.

/// Assembly source loading.
pub mod loader;

/// Sequential reference interpreter.
pub mod reference;

/// Run loop and cycle cap.
pub mod simulator;

pub use loader::{Program, assemble, load_file};
pub use reference::ReferenceInterpreter;
pub use simulator::{Simulator, run_source};
