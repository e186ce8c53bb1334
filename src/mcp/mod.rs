//! MCP server module for Sundial.

mod server;
mod transport;

pub use server::*;
pub use transport::*;
