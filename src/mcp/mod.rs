//! Model Context Protocol server layer.

pub mod handler;
pub mod session;
pub mod sse;
pub mod tools;
pub mod transport;
