//! Stress scenarios for individual positions.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                Stress Runner                 │
//! ├──────────────────────────────────────────────┤
//! │  StressSeverity    - preset loss severities  │
//! │  StressRunner      - one position, N stresses│
//! │  StressReport      - outcomes per severity   │
//! │  BatchStressRunner - many positions (rayon)  │
//! └──────────────────────────────────────────────┘
//! ```

mod batch;
mod engine;
mod presets;

pub use batch::BatchStressRunner;
pub use engine::{StressOutcome, StressReport, StressRunner};
pub use presets::{severity_label, StressSeverity};
