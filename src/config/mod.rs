//! Engine configuration (timing, color, fit, capture, fonts).

/// Policy structs and the JSON-loadable [`EngineConfig`](policy::EngineConfig).
pub mod policy;
