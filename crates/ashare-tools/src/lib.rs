//! Tool abstraction for the analyst agent
//!
//! A [`Tool`] is a callable the LLM can invoke by name with JSON parameters.
//! The market-data crate implements one tool per data category; the agent
//! executor looks tools up in a [`ToolRegistry`] and runs them.

mod registry;
mod tool;

pub use registry::ToolRegistry;
pub use tool::{Tool, ToolError};

/// Result type alias for tool execution
pub type Result<T> = std::result::Result<T, ToolError>;
