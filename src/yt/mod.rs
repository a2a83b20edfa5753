//! YouTube Data API v3 plumbing: request parameters, the transport seam, the
//! endpoint client and the raw response types.

pub mod client;
pub mod pages;
pub mod params;
pub mod transport;
pub mod types;
