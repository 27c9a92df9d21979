//! DOCSIS Proactive Network Maintenance capture decoding and analysis
//!
//! **Module Organization**:
//! - `pnm` - capture header, type dispatch and per-type decoders
//! - `fixed_point` - Q-format fixed-point codec for complex payloads
//! - `stats` - min/avg/max aggregation and signal statistics
//! - `dsp` - regression, group delay, Shannon bit loading, QAM tables, tap metrics
//! - `echo` - phase-slope and IFFT echo detectors
//! - `anomaly` - z-score anomaly regions over 2D grids
//!
//! Everything is synchronous and free of shared mutable state; decoded records
//! are plain values that can be analysed from any thread.

pub mod anomaly;
pub mod dsp;
pub mod echo;
pub mod fixed_point;
pub mod pnm;
pub mod stats;
pub mod tracing_init;

pub use anomaly::{AnomalyConfig, AnomalyDetector, AnomalyReport, BoundingBox};
pub use dsp::AnalysisError;
pub use echo::{EchoReport, IfftEchoConfig, IfftEchoDetector, PhaseSlopeEchoDetector};
pub use fixed_point::{FixedPointError, FixedPointFormat};
pub use pnm::{decode, decode_many, DecodeError, PnmFile, PnmFileType, PnmHeader};
pub use stats::{MinAvgMax, MinAvgMaxComplex, SignalStatistics, StatsError};
