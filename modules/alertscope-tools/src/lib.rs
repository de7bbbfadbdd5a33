pub mod client;
pub mod descriptor;
pub mod envelope;
pub mod registry;
pub mod server;

pub use client::{ToolClient, ToolTransport};
pub use descriptor::ToolDescriptor;
pub use registry::{ApiTool, ApiToolSet, GraphTool, GraphToolSet, ToolSet};
pub use server::tool_router;
