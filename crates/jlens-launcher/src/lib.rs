//! Bootstrap launcher for the jlens MCP server JAR.
//!
//! Resolves a Java runtime and the server artifact (local directories, cache,
//! or a pinned GitHub release), then runs `java -jar` with inherited stdio and
//! mirrors the child's exit code.

pub mod args;
pub mod artifact;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod launcher;
pub mod model;
pub mod runtime;
pub mod settings;
pub mod supervisor;
