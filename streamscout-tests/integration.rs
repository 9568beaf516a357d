//! Integration tests for Streamscout
//!
//! Drive the full router against scripted providers, and the provider bridge
//! against an in-process sidecar speaking the HTTP protocol.

#[path = "integration/common.rs"]
mod common;

#[path = "integration/stream_routes.rs"]
mod stream_routes;

#[path = "integration/sources_route.rs"]
mod sources_route;

#[path = "integration/sidecar_end_to_end.rs"]
mod sidecar_end_to_end;
