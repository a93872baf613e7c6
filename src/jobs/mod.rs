//! The batch jobs shipped with mrjobs.
//!
//! - `std_subscribers` - subscribers with at least an hour of STD calls
//! - `unique_listeners` - distinct listeners per track

pub mod std_subscribers;
pub mod unique_listeners;
