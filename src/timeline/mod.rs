//! Ordered creative timelines and their loop schedule.

/// Entries, placement rules and reordering.
pub mod model;
/// Segment lookup and cross-fade law.
pub mod schedule;
