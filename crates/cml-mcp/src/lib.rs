//! # cml-mcp
//!
//! MCP (Model Context Protocol) server exposing Cisco Modeling Labs lab
//! building to AI agents.
//!
//! ## Quick Start
//!
//! Run the server with default configuration (stdio transport):
//!
//! ```bash
//! cargo run -p cml-mcp
//! ```
//!
//! Optionally log in at startup via environment variables (or a `.env` file):
//!
//! ```bash
//! export CML_URL=https://cml.example.com
//! export CML_USERNAME=admin
//! export CML_PASSWORD=secret
//! export CML_VERIFY_SSL=false
//! cargo run -p cml-mcp
//! ```
//!
//! ## MCP Tools
//!
//! | Tool | Description |
//! |------|-------------|
//! | `initialize_client` | Authenticate with a CML server |
//! | `create_lab` | Create a new lab |
//! | `start_lab` | Start a lab |
//! | `stop_lab` | Stop a lab |
//! | `add_node` | Add a node to a lab |
//! | `link_nodes` | Link two nodes using auto-selected interfaces |
//! | `create_link_v3` | Link two explicit interfaces |
//! | `get_lab_topology` | Summarize nodes, interfaces and links |

pub mod config;
pub mod http;
pub mod request;
pub mod server;
pub mod types;

pub use config::{CmlMcpConfig, ConfigError, TransportMode, MAX_FIELD_LENGTH};
pub use request::{ToolRequest, TOOL_NAMES};
pub use server::CmlServer;
pub use types::*;
