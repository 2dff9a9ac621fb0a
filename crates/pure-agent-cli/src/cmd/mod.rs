pub mod export;
pub mod mcp;
pub mod route;
