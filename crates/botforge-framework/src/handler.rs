//! Command handlers.
//!
//! Any async closure or function taking `(CommandArgs, CommandContext)` is a
//! handler. What it returns decides what happens next, via
//! [`CommandResponse`]:
//!
//! ```rust,ignore
//! // Nothing to send
//! router.add_command("noop", |_args, _ctx| async {});
//!
//! // Reply with a string
//! router.add_command("dank", |_args, _ctx| async { "memes" });
//!
//! // Fallible; the error is reported as CommandError::Handler
//! router.add_command("roll", |args: CommandArgs, _ctx| async move {
//!     let sides: u32 = args.get(0).unwrap_or("6").parse()?;
//!     Ok::<_, std::num::ParseIntError>(format!("rolled a d{sides}"))
//! });
//! ```

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::command::CommandArgs;
use crate::context::CommandContext;
use crate::error::{CommandError, CommandResult};

// ============================================================================
// CommandResponse - Handle handler return values
// ============================================================================

/// A trait for types a command handler may return.
#[async_trait]
pub trait CommandResponse: Send {
    /// Acts on the value: sends a reply, reports an error, or nothing.
    async fn respond(self, ctx: &CommandContext) -> CommandResult<()>;
}

/// `()` - no reply.
#[async_trait]
impl CommandResponse for () {
    async fn respond(self, _ctx: &CommandContext) -> CommandResult<()> {
        Ok(())
    }
}

/// `String` - sent as a reply.
#[async_trait]
impl CommandResponse for String {
    async fn respond(self, ctx: &CommandContext) -> CommandResult<()> {
        ctx.reply(&self).await?;
        Ok(())
    }
}

/// `&'static str` - sent as a reply.
#[async_trait]
impl CommandResponse for &'static str {
    async fn respond(self, ctx: &CommandContext) -> CommandResult<()> {
        ctx.reply(self).await?;
        Ok(())
    }
}

/// `Option<T>` - responds with the inner value, if any.
#[async_trait]
impl<T: CommandResponse> CommandResponse for Option<T> {
    async fn respond(self, ctx: &CommandContext) -> CommandResult<()> {
        match self {
            Some(t) => t.respond(ctx).await,
            None => Ok(()),
        }
    }
}

/// `Result<T, E>` - responds with `T` on success, reports `E` otherwise.
#[async_trait]
impl<T, E> CommandResponse for Result<T, E>
where
    T: CommandResponse,
    E: std::fmt::Display + Send,
{
    async fn respond(self, ctx: &CommandContext) -> CommandResult<()> {
        match self {
            Ok(t) => t.respond(ctx).await,
            Err(e) => Err(CommandError::Handler {
                command: ctx.command().to_string(),
                message: e.to_string(),
            }),
        }
    }
}

// ============================================================================
// CommandHandler Trait
// ============================================================================

/// An object-safe command handler.
///
/// Implement it directly for handlers that carry state; closures are
/// converted with [`into_handler`].
pub trait CommandHandler: Send + Sync + 'static {
    /// Runs the handler to completion, including its response.
    fn call(&self, args: CommandArgs, ctx: CommandContext) -> BoxFuture<'static, CommandResult<()>>;
}

/// A type-erased handler that can be stored in the command table.
pub type BoxedCommandHandler = Arc<dyn CommandHandler>;

/// Adapts an async closure into a [`CommandHandler`].
pub struct HandlerFn<F, Fut> {
    f: F,
    _marker: PhantomData<fn() -> Fut>,
}

impl<F, Fut> CommandHandler for HandlerFn<F, Fut>
where
    F: Fn(CommandArgs, CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: CommandResponse + 'static,
{
    fn call(&self, args: CommandArgs, ctx: CommandContext) -> BoxFuture<'static, CommandResult<()>> {
        let fut = (self.f)(args, ctx.clone());
        Box::pin(async move { fut.await.respond(&ctx).await })
    }
}

/// Converts an async closure into a boxed handler.
pub fn into_handler<F, Fut>(f: F) -> BoxedCommandHandler
where
    F: Fn(CommandArgs, CommandContext) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: CommandResponse + 'static,
{
    Arc::new(HandlerFn {
        f,
        _marker: PhantomData,
    })
}
