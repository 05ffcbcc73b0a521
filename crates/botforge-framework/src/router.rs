//! Prefix command router.
//!
//! The [`CommandRouter`] owns the command table (trigger → handler) and the
//! prefix. For each inbound message it:
//!
//! 1. splits the body on whitespace into a command word and arguments,
//! 2. looks for the trigger whose `prefix + trigger` equals the command word,
//! 3. on a match emits [`BotEvent::CommandTriggered`] and runs the handler.
//!
//! Triggers are unique keys, so at most one handler runs per message.
//!
//! # Thread Safety
//!
//! Commands can be registered at any time, including while dispatches are
//! running. A dispatch clones the matched handler out of the table before
//! awaiting it, so registrations only affect later dispatches.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{Instrument, Level, debug, info, span, trace};

use crate::command::{CommandArgs, parse_invocation};
use crate::context::CommandContext;
use crate::error::CommandResult;
use crate::handler::{BoxedCommandHandler, CommandResponse, into_handler};
use botforge_core::{BotConfig, BotEvent, BoxedClient, EventBus, InboundMessage};

/// Outcome of a successful [`CommandRouter::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The message was not a command invocation.
    NoMatch,
    /// A handler ran to completion.
    Handled {
        /// The full command word, prefix included.
        command: String,
    },
}

/// A command word that matched a registered trigger.
#[derive(Clone)]
pub struct CommandMatch {
    /// The full command word, prefix included.
    pub command: String,
    /// The registered trigger, without prefix.
    pub trigger: String,
    /// The tokens after the command word.
    pub args: CommandArgs,
    handler: BoxedCommandHandler,
}

impl fmt::Debug for CommandMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandMatch")
            .field("command", &self.command)
            .field("trigger", &self.trigger)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// Maps command words to handlers.
pub struct CommandRouter {
    prefix: RwLock<String>,
    commands: RwLock<HashMap<String, BoxedCommandHandler>>,
    events: EventBus,
}

impl CommandRouter {
    /// Creates an empty router that reports matches on `events`.
    pub fn new(prefix: impl Into<String>, events: EventBus) -> Self {
        Self {
            prefix: RwLock::new(prefix.into()),
            commands: RwLock::new(HashMap::new()),
            events,
        }
    }

    /// Returns the current prefix.
    pub fn prefix(&self) -> String {
        self.prefix.read().clone()
    }

    /// Replaces the prefix. Applies to later dispatches.
    ///
    /// An empty prefix makes every trigger addressable by its bare name.
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        *self.prefix.write() = prefix.into();
    }

    /// Registers an async closure under `trigger`.
    ///
    /// A previous handler for the same trigger is replaced; returns `true`
    /// in that case. The trigger is not validated.
    pub fn add_command<F, Fut>(&self, trigger: impl Into<String>, handler: F) -> bool
    where
        F: Fn(CommandArgs, CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: CommandResponse + 'static,
    {
        self.add_handler(trigger, into_handler(handler))
    }

    /// Registers a boxed handler under `trigger`. See [`add_command`](Self::add_command).
    pub fn add_handler(&self, trigger: impl Into<String>, handler: BoxedCommandHandler) -> bool {
        let trigger = trigger.into();
        let replaced = self
            .commands
            .write()
            .insert(trigger.clone(), handler)
            .is_some();

        if replaced {
            debug!(trigger = %trigger, "Replaced command handler");
        } else {
            debug!(trigger = %trigger, "Registered command");
        }
        replaced
    }

    /// Returns whether `trigger` has a handler.
    pub fn has_command(&self, trigger: &str) -> bool {
        self.commands.read().contains_key(trigger)
    }

    /// Returns the number of registered triggers.
    pub fn command_count(&self) -> usize {
        self.commands.read().len()
    }

    /// Returns the registered triggers, sorted.
    pub fn triggers(&self) -> Vec<String> {
        let mut triggers: Vec<String> = self.commands.read().keys().cloned().collect();
        triggers.sort();
        triggers
    }

    /// Matches `body` against the command table without running anything.
    ///
    /// `prefix + trigger` equals the command word exactly when the word
    /// starts with the prefix and the remainder is the trigger, so a single
    /// lookup replaces the scan over all triggers.
    pub fn match_command(&self, body: &str) -> Option<CommandMatch> {
        let invocation = parse_invocation(body);
        let prefix = self.prefix.read();
        let trigger = invocation.word.strip_prefix(prefix.as_str())?;
        let handler = Arc::clone(self.commands.read().get(trigger)?);

        Some(CommandMatch {
            command: invocation.word.to_string(),
            trigger: trigger.to_string(),
            args: CommandArgs::new(invocation.args),
            handler,
        })
    }

    /// Dispatches one inbound message.
    ///
    /// On a match, emits `command-triggered` and then runs the handler with
    /// a [`CommandContext`] built from `client` and `config`. Handler and
    /// reply failures are returned, not logged; panics are not caught.
    pub async fn dispatch(
        &self,
        message: InboundMessage,
        client: BoxedClient,
        config: Arc<BotConfig>,
    ) -> CommandResult<Dispatch> {
        match self.match_command(&message.body) {
            Some(matched) => self.run(matched, message, client, config).await,
            None => {
                trace!(message_id = %message.id, "Message is not a command");
                Ok(Dispatch::NoMatch)
            }
        }
    }

    /// Runs a match produced by [`match_command`](Self::match_command).
    ///
    /// Lets a caller match and pick the config under one lock, then run the
    /// handler after releasing it.
    pub async fn run(
        &self,
        matched: CommandMatch,
        message: InboundMessage,
        client: BoxedClient,
        config: Arc<BotConfig>,
    ) -> CommandResult<Dispatch> {
        let CommandMatch {
            command,
            args,
            handler,
            ..
        } = matched;

        info!(
            user = %message.author,
            user_id = %message.author.id,
            command = %command,
            args = ?&*args,
            "User ran command"
        );

        self.events.emit(&BotEvent::CommandTriggered {
            command: command.clone(),
            author: message.author.clone(),
        });

        let span = span!(Level::DEBUG, "command", command = %command);
        let ctx = CommandContext::new(
            command.clone(),
            Arc::new(message),
            client,
            config,
            self.events.clone(),
        );
        handler.call(args, ctx).instrument(span).await?;

        Ok(Dispatch::Handled { command })
    }
}

impl fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRouter")
            .field("prefix", &*self.prefix.read())
            .field("command_count", &self.command_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommandError;
    use crate::handler::CommandHandler;
    use async_trait::async_trait;
    use futures::future::BoxFuture;
    use botforge_core::{
        Client, ClientError, ClientEvents, ClientResult, ConnectOptions, EventKind, User,
    };
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockClient {
        replies: Mutex<Vec<(String, String)>>,
        fail_replies: bool,
    }

    #[async_trait]
    impl Client for MockClient {
        fn platform(&self) -> &'static str {
            "mock"
        }

        async fn connect(&self, _token: &str, _options: ConnectOptions) -> ClientResult<ClientEvents> {
            Err(ClientError::Other("not supported".into()))
        }

        async fn reply(&self, message: &InboundMessage, content: &str) -> ClientResult<String> {
            if self.fail_replies {
                return Err(ClientError::SendFailed("offline".into()));
            }
            self.replies
                .lock()
                .push((message.id.clone(), content.to_string()));
            Ok("reply-1".to_string())
        }
    }

    fn message(body: &str) -> InboundMessage {
        InboundMessage::new("m1", "c1", body, User::new("7", "alice", "0001"))
    }

    fn router(prefix: &str) -> (CommandRouter, EventBus) {
        let events = EventBus::new();
        (CommandRouter::new(prefix, events.clone()), events)
    }

    async fn dispatch(router: &CommandRouter, client: &Arc<MockClient>, body: &str) -> CommandResult<Dispatch> {
        router
            .dispatch(message(body), client.clone(), Arc::new(BotConfig::default()))
            .await
    }

    fn recorder() -> (Arc<Mutex<Vec<Vec<String>>>>, impl Fn(CommandArgs, CommandContext) -> futures::future::Ready<()> + Send + Sync + 'static) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let c = Arc::clone(&calls);
        let handler = move |args: CommandArgs, _ctx: CommandContext| {
            c.lock().push(args.into_vec());
            futures::future::ready(())
        };
        (calls, handler)
    }

    #[tokio::test]
    async fn test_matching_command_gets_remaining_tokens() {
        let (router, _) = router(";");
        let (calls, handler) = recorder();
        router.add_command("dank", handler);

        let client = Arc::new(MockClient::default());
        let result = dispatch(&router, &client, ";dank please").await.unwrap();

        assert_eq!(
            result,
            Dispatch::Handled {
                command: ";dank".into()
            }
        );
        assert_eq!(*calls.lock(), vec![vec!["please".to_string()]]);
    }

    #[tokio::test]
    async fn test_missing_prefix_does_not_match() {
        let (router, events) = router(";");
        let (calls, handler) = recorder();
        router.add_command("dank", handler);

        let triggered = Arc::new(AtomicUsize::new(0));
        let t = Arc::clone(&triggered);
        events.on(EventKind::CommandTriggered, move |_| {
            t.fetch_add(1, Ordering::SeqCst);
        });

        let client = Arc::new(MockClient::default());
        for body in ["dank please", ";dankplease", ";dan", "hello ;dank", ";DANK"] {
            let result = dispatch(&router, &client, body).await.unwrap();
            assert_eq!(result, Dispatch::NoMatch, "body {body:?} should not match");
        }

        assert!(calls.lock().is_empty());
        assert_eq!(triggered.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_body_never_matches() {
        let (router, _) = router("!");
        let (calls, handler) = recorder();
        router.add_command("ping", handler);

        let client = Arc::new(MockClient::default());
        assert_eq!(dispatch(&router, &client, "").await.unwrap(), Dispatch::NoMatch);
        assert_eq!(dispatch(&router, &client, "   ").await.unwrap(), Dispatch::NoMatch);
        assert!(calls.lock().is_empty());
    }

    #[tokio::test]
    async fn test_reregistering_overwrites() {
        let (router, _) = router("!");
        let hits = Arc::new(Mutex::new(Vec::new()));

        let h = Arc::clone(&hits);
        assert!(!router.add_command("dank", move |_, _| {
            h.lock().push("A");
            async {}
        }));
        let h = Arc::clone(&hits);
        assert!(router.add_command("dank", move |_, _| {
            h.lock().push("B");
            async {}
        }));

        let client = Arc::new(MockClient::default());
        dispatch(&router, &client, "!dank").await.unwrap();

        assert_eq!(*hits.lock(), vec!["B"]);
        assert_eq!(router.command_count(), 1);
    }

    #[tokio::test]
    async fn test_command_triggered_emitted_before_handler() {
        let (router, events) = router(";");
        let order = Arc::new(Mutex::new(Vec::new()));

        let o = Arc::clone(&order);
        events.on(EventKind::CommandTriggered, move |event| {
            if let BotEvent::CommandTriggered { command, author } = event {
                o.lock().push(format!("event {command} {author}"));
            }
        });
        let o = Arc::clone(&order);
        router.add_command("dank", move |_, _| {
            o.lock().push("handler".to_string());
            async {}
        });

        let client = Arc::new(MockClient::default());
        dispatch(&router, &client, ";dank").await.unwrap();

        assert_eq!(
            *order.lock(),
            vec!["event ;dank alice#0001".to_string(), "handler".to_string()]
        );
    }

    #[tokio::test]
    async fn test_string_response_is_sent_as_reply() {
        let (router, _) = router(";");
        router.add_command("dank", |_, _| async { "memes" });

        let client = Arc::new(MockClient::default());
        dispatch(&router, &client, ";dank please").await.unwrap();

        assert_eq!(
            *client.replies.lock(),
            vec![("m1".to_string(), "memes".to_string())]
        );
    }

    #[tokio::test]
    async fn test_handler_error_is_returned() {
        let (router, _) = router("!");
        router.add_command("fail", |_, _| async { Err::<(), _>("boom") });

        let client = Arc::new(MockClient::default());
        let err = dispatch(&router, &client, "!fail").await.unwrap_err();

        match err {
            CommandError::Handler { command, message } => {
                assert_eq!(command, "!fail");
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_reply_failure_is_returned() {
        let (router, _) = router("!");
        router.add_command("dank", |_, _| async { "memes" });

        let client = Arc::new(MockClient {
            fail_replies: true,
            ..Default::default()
        });
        let err = dispatch(&router, &client, "!dank").await.unwrap_err();
        assert!(matches!(err, CommandError::Reply(ClientError::SendFailed(_))));
    }

    #[tokio::test]
    async fn test_context_carries_message() {
        let (router, _) = router("!");
        let seen = Arc::new(Mutex::new(None));

        let s = Arc::clone(&seen);
        router.add_command("whoami", move |_, ctx: CommandContext| {
            *s.lock() = Some((
                ctx.command().to_string(),
                ctx.author().tag(),
                ctx.message().channel_id.clone(),
                ctx.config().prefix.clone(),
            ));
            async {}
        });

        let client = Arc::new(MockClient::default());
        dispatch(&router, &client, "!whoami").await.unwrap();

        assert_eq!(
            *seen.lock(),
            Some((
                "!whoami".to_string(),
                "alice#0001".to_string(),
                "c1".to_string(),
                "!".to_string()
            ))
        );
    }

    #[test]
    fn test_empty_prefix_addresses_bare_trigger() {
        let (router, _) = router("");
        router.add_command("help", |_, _| async {});

        let matched = router.match_command("help me").unwrap();
        assert_eq!(matched.command, "help");
        assert_eq!(matched.trigger, "help");
        assert_eq!(matched.args.to_vec(), vec!["me"]);
    }

    #[test]
    fn test_set_prefix_applies_to_later_matches() {
        let (router, _) = router("!");
        router.add_command("ping", |_, _| async {});

        assert!(router.match_command("!ping").is_some());
        router.set_prefix("?");
        assert_eq!(router.prefix(), "?");
        assert!(router.match_command("!ping").is_none());
        assert!(router.match_command("?ping").is_some());
    }

    #[test]
    fn test_multi_char_prefix() {
        let (router, _) = router("bot.");
        router.add_command("ping", |_, _| async {});

        assert!(router.match_command("bot.ping").is_some());
        assert!(router.match_command("bot.").is_none());
        assert!(router.match_command("bot ping").is_none());
    }

    #[test]
    fn test_triggers_listing() {
        let (router, _) = router("!");
        router.add_command("b", |_, _| async {});
        router.add_command("a", |_, _| async {});

        assert!(router.has_command("a"));
        assert!(!router.has_command("!a"));
        assert_eq!(router.triggers(), vec!["a", "b"]);
    }

    #[test]
    fn test_dispatch_blocks_on_handler() {
        let (router, _) = router("!");
        let (calls, handler) = recorder();
        router.add_command("x", handler);

        let client = Arc::new(MockClient::default());
        let result = tokio_test::block_on(dispatch(&router, &client, "!x 1 2"));
        assert!(result.is_ok());
        assert_eq!(*calls.lock(), vec![vec!["1".to_string(), "2".to_string()]]);
    }

    #[tokio::test]
    async fn test_option_response_replies_only_when_some() {
        let (router, _) = router("!");
        router.add_command("maybe", |args: CommandArgs, _| async move {
            if args.is_empty() {
                None
            } else {
                Some("x")
            }
        });

        let client = Arc::new(MockClient::default());
        dispatch(&router, &client, "!maybe please").await.unwrap();
        dispatch(&router, &client, "!maybe").await.unwrap();

        assert_eq!(
            *client.replies.lock(),
            vec![("m1".to_string(), "x".to_string())]
        );
    }

    #[derive(Default)]
    struct Counter {
        hits: AtomicUsize,
    }

    impl CommandHandler for Counter {
        fn call(&self, args: CommandArgs, ctx: CommandContext) -> BoxFuture<'static, CommandResult<()>> {
            let n = self.hits.fetch_add(1, Ordering::SeqCst) + 1;
            Box::pin(async move {
                ctx.reply(&format!("{n}: {}", args.rest())).await?;
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_stateful_handler_registered_with_add_handler() {
        let (router, _) = router("!");
        let counter = Arc::new(Counter::default());
        assert!(!router.add_handler("count", counter.clone()));

        let client = Arc::new(MockClient::default());
        dispatch(&router, &client, "!count a b").await.unwrap();
        let result = dispatch(&router, &client, "!count").await.unwrap();

        assert_eq!(
            result,
            Dispatch::Handled {
                command: "!count".into()
            }
        );
        assert_eq!(counter.hits.load(Ordering::SeqCst), 2);
        let replies: Vec<String> = client.replies.lock().iter().map(|(_, r)| r.clone()).collect();
        assert_eq!(replies, vec!["1: a b", "2: "]);

        assert!(router.add_handler("count", Arc::new(Counter::default())));
    }

    #[tokio::test]
    async fn test_run_executes_an_earlier_match() {
        let (router, _) = router("!");
        let (calls, handler) = recorder();
        router.add_command("ping", handler);

        let matched = router.match_command("!ping now").unwrap();
        router.set_prefix("?");

        let client = Arc::new(MockClient::default());
        let result = router
            .run(matched, message("!ping now"), client, Arc::new(BotConfig::default()))
            .await
            .unwrap();

        assert_eq!(
            result,
            Dispatch::Handled {
                command: "!ping".into()
            }
        );
        assert_eq!(*calls.lock(), vec![vec!["now".to_string()]]);
    }

}
