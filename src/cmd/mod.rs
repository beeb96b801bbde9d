/*!
Subcommand dispatch.

  src/cmd/
    mod.rs     (this file)
    serve.rs   (execute_serve: MCP over stdio, the default command)
    tools.rs   (ToolsArgs + execute_tools: print the tool catalog)
    call.rs    (CallArgs  + execute_call: run one tool in-process)
    shared.rs  (parameter collection + schema-driven argument building)
    format.rs  (human-readable output helpers)

Each subcommand exposes one `execute_*` function returning `anyhow::Result<()>`.
*/

pub mod call;
pub mod format;
pub mod serve;
pub mod shared;
pub mod tools;

pub use call::{CallArgs, execute_call};
pub use serve::execute_serve;
pub use tools::{ToolsArgs, execute_tools};
