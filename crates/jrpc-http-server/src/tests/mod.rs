//! Test modules for jrpc-http-server
//!
//! Handler tests drive [`crate::RpcHttpHandler::handle`] directly with
//! in-memory bodies; server tests cover configuration and the builder.

pub mod support;
