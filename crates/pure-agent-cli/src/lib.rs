//! Command surface for agent runs: the export pass, the continuation router
//! and the stdio tool server.

pub mod cmd;
pub mod envelope;
pub mod hooks;
pub mod logging;
pub mod tools;
