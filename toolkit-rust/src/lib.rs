//! # Tool Toolkit
//!
//! The Tool Toolkit is a Rust library that provides a trait to define a Tool.
//! A Tool is a named operation that can be invoked by an external caller over
//! a local request/response channel. The Toolkit takes care of the channel: it
//! speaks newline-delimited JSON-RPC 2.0 on stdin/stdout, answers the
//! `initialize`, `ping`, `tools/list` and `tools/call` methods and routes each
//! call to the right Tool.

mod jsonrpc;
mod runtime;
mod tool;

pub use {
    anyhow::Result as AnyResult,
    jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, JSONRPC_VERSION},
    runtime::{ToolServer, LATEST_PROTOCOL_VERSION, SUPPORTED_PROTOCOL_VERSIONS},
    tool::Tool,
};
