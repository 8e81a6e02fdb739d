//! Instruction pipeline implementation.
//!
//! This module contains the implementation of the five-stage in-order pipeline
//! (Fetch, Decode, `RegisterRead`, Execute, Store). It includes the following components:
//! 1. **Engine:** The clock that advances every stage in a fixed per-cycle order.
//! 2. **Hazards:** Dynamic detection of read-after-write dependencies.
//! 3. **Latches:** Payloads handed between stages, ending in a commit package.
//! 4. **Signals:** Control signals derived from the opcode.
//! 5. **Stage:** The generic stage state machine with latency countdown.
//! 6. **Stages:** Per-stage transfer logic.
//! 7. **Traits:** Common interfaces for latches and register-writing payloads.

/// Cycle-level pipeline engine.
pub mod engine;

/// Pipeline hazard detection.
pub mod hazards;

/// Inter-stage payloads and commit packages.
pub mod latches;

/// Control signals generated from the opcode.
pub mod signals;

/// Generic pipeline stage.
pub mod stage;

/// Pipeline stage implementations (fetch, decode, register read, execute, store).
pub mod stages;

/// Traits for pipeline components.
pub mod traits;

pub use engine::{FinalState, PipelineEngine};
pub use stage::{PipelineStage, StageKind};
