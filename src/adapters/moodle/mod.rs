//! Moodle web-service adapter
//!
//! This module provides the gateway to a Moodle site's REST web service:
//! parameter flattening, the HTTP transport seam and the typed client.

pub mod client;
pub mod functions;
pub mod params;
pub mod transport;

pub use client::{MoodleClient, DEFAULT_TIMEOUT};
pub use params::{flatten, flatten_with_prefix, FlatParams, ParamValue, Scalar};
pub use transport::{ReqwestTransport, Transport, WireParams};
