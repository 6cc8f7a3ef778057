//! JSON-RPC API Layer
//!
//! Exposes the Waitline queue service as a JSON-RPC 2.0 server.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
