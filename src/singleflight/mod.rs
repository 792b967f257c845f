//! Request Deduplication Module
//!
//! Collapses concurrent loads of the same key into a single execution. The
//! first caller for a key runs the load; everyone arriving while it is in
//! flight waits for, and receives a clone of, the same result. Nothing is
//! remembered once the load completes.

pub mod flight;

pub use flight::Flight;
