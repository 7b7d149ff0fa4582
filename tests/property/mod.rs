//! Property-based tests

mod binding_order;
mod round_trip;
