//! # Botforge Framework
//!
//! Prefix-based command routing on top of the core types.
//!
//! This layer provides:
//! - [`CommandRouter`]: the command table and the dispatch logic
//! - [`CommandHandler`]: async closures or custom types that run commands
//! - [`CommandResponse`]: what a handler's return value turns into
//! - [`CommandContext`]: the message, client, config and event bus a handler sees
//!
//! ```rust,ignore
//! use botforge_framework::CommandRouter;
//!
//! let router = CommandRouter::new(";", events.clone());
//! router.add_command("dank", |_args, _ctx| async { "memes" });
//!
//! // ";dank please" → replies "memes"
//! router.dispatch(message, client, config).await?;
//! ```

pub mod command;
pub mod context;
pub mod error;
pub mod handler;
pub mod router;

pub use command::{CommandArgs, Invocation, parse_invocation};
pub use context::CommandContext;
pub use error::{CommandError, CommandResult};
pub use handler::{BoxedCommandHandler, CommandHandler, CommandResponse, HandlerFn, into_handler};
pub use router::{CommandMatch, CommandRouter, Dispatch};
