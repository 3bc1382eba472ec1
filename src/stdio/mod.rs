//! Stdio transport layer for the Model Context Protocol
//!
//! Newline-delimited JSON over the process stdin/stdout pair, one envelope
//! per line.

mod transport;

pub use transport::{dispatch_line, run};
