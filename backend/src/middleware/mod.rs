//! Request middleware.
//!
//! Purpose: attach the trace identifier and request context every handler
//! and error response relies on.

pub mod trace;

pub use trace::{RequestContext, Trace};
