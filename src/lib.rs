//! Teamboard API Library
//!
//! Team approval and ordering workflow: a tri-state approval per reviewer
//! role, a persisted linear team order, and the controller that applies
//! both optimistically against a persistence gateway.

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
