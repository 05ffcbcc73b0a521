//! The console client.
//!
//! Every line read from the input becomes one `MessageCreate` from the
//! configured console user; replies are written to the output, one per line.
//! End of input closes the session with code 1000.

use std::sync::Arc;

use async_trait::async_trait;
use botforge_core::{
    Client, ClientError, ClientEvent, ClientEvents, ClientResult, ConnectOptions, InboundMessage,
    User,
};
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

type BoxedReader = Box<dyn AsyncRead + Send + Unpin>;
type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Close code sent when the input reaches end of file.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Close code sent when reading the input fails.
pub const ABNORMAL_CLOSURE: u16 = 1006;

const EVENT_BUFFER: usize = 64;

/// A [`Client`] that talks to a terminal (or any reader/writer pair).
pub struct ConsoleClient {
    reader: Mutex<Option<BoxedReader>>,
    writer: Arc<tokio::sync::Mutex<BoxedWriter>>,
    author: User,
    channel_id: String,
    bot_id: String,
    bot_name: Mutex<String>,
    shutdown: CancellationToken,
}

impl ConsoleClient {
    /// Creates a client over stdin and stdout.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a client over the given reader and writer.
    pub fn with_io<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::builder().io(reader, writer).build()
    }

    /// Creates a client builder.
    pub fn builder() -> ConsoleClientBuilder {
        ConsoleClientBuilder::default()
    }

    /// The user every input line is attributed to.
    pub fn author(&self) -> &User {
        &self.author
    }

    /// The channel every input line is posted in.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }
}

impl Default for ConsoleClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Client for ConsoleClient {
    fn platform(&self) -> &'static str {
        "console"
    }

    async fn connect(&self, token: &str, options: ConnectOptions) -> ClientResult<ClientEvents> {
        if token.trim().is_empty() {
            return Err(ClientError::authentication("token is empty"));
        }

        let reader = self.reader.lock().take().ok_or_else(|| ClientError::ConnectionFailed {
            reason: "console input is already in use".to_string(),
        })?;

        debug!(
            use_compact_encoding = options.use_compact_encoding,
            "Compact encoding has no effect on the console"
        );
        *self.bot_name.lock() = options.name.clone();

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let me = User::new(self.bot_id.clone(), options.name, "0000");
        let author = self.author.clone();
        let channel_id = self.channel_id.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            if tx.send(ClientEvent::Ready(me)).await.is_err() {
                return;
            }
            info!(channel = %channel_id, "Console session started");

            let mut lines = BufReader::new(reader).lines();
            loop {
                let line = tokio::select! {
                    _ = shutdown.cancelled() => {
                        debug!("Console session cancelled");
                        break;
                    }
                    line = lines.next_line() => line,
                };

                let event = match line {
                    Ok(Some(line)) => {
                        let id = Uuid::new_v4().to_string();
                        trace!(message_id = %id, body = %line, "Read console line");
                        ClientEvent::MessageCreate(InboundMessage::new(
                            id,
                            channel_id.clone(),
                            line,
                            author.clone(),
                        ))
                    }
                    Ok(None) => {
                        let _ = tx
                            .send(ClientEvent::Close {
                                code: NORMAL_CLOSURE,
                                reason: "input closed".to_string(),
                            })
                            .await;
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read console input");
                        let _ = tx.send(ClientEvent::Error(e.into())).await;
                        let _ = tx
                            .send(ClientEvent::Close {
                                code: ABNORMAL_CLOSURE,
                                reason: "input error".to_string(),
                            })
                            .await;
                        break;
                    }
                };

                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }

    async fn reply(&self, message: &InboundMessage, content: &str) -> ClientResult<String> {
        if self.shutdown.is_cancelled() {
            return Err(ClientError::closed("console client is closed"));
        }

        let line = format!("{}: {}\n", self.bot_name.lock(), content);
        let mut writer = self.writer.lock().await;
        writer
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ClientError::SendFailed(e.to_string()))?;
        writer.flush().await?;

        let id = Uuid::new_v4().to_string();
        trace!(reply_to = %message.id, message_id = %id, "Wrote console reply");
        Ok(id)
    }

    async fn close(&self) {
        self.shutdown.cancel();
    }
}

/// Builder for [`ConsoleClient`].
pub struct ConsoleClientBuilder {
    reader: Option<BoxedReader>,
    writer: Option<BoxedWriter>,
    username: String,
    discriminator: String,
    channel_id: String,
}

impl Default for ConsoleClientBuilder {
    fn default() -> Self {
        Self {
            reader: None,
            writer: None,
            username: "console".to_string(),
            discriminator: "0001".to_string(),
            channel_id: "console".to_string(),
        }
    }
}

impl ConsoleClientBuilder {
    /// Reads from `reader` and writes to `writer` instead of stdin/stdout.
    pub fn io<R, W>(mut self, reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        self.reader = Some(Box::new(reader));
        self.writer = Some(Box::new(writer));
        self
    }

    /// Sets the username input lines are attributed to.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Sets the console user's discriminator.
    pub fn discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = discriminator.into();
        self
    }

    /// Sets the channel id input lines are posted in.
    pub fn channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = channel_id.into();
        self
    }

    /// Builds the client.
    pub fn build(self) -> ConsoleClient {
        let reader = self
            .reader
            .unwrap_or_else(|| Box::new(tokio::io::stdin()));
        let writer = self
            .writer
            .unwrap_or_else(|| Box::new(tokio::io::stdout()));

        ConsoleClient {
            reader: Mutex::new(Some(reader)),
            writer: Arc::new(tokio::sync::Mutex::new(writer)),
            author: User::new(
                Uuid::new_v4().to_string(),
                self.username,
                self.discriminator,
            ),
            channel_id: self.channel_id,
            bot_id: Uuid::new_v4().to_string(),
            bot_name: Mutex::new(String::new()),
            shutdown: CancellationToken::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, duplex};

    fn options() -> ConnectOptions {
        ConnectOptions {
            use_compact_encoding: true,
            name: "Dank Bot".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_token_is_rejected() {
        let client = ConsoleClient::with_io(tokio::io::empty(), tokio::io::sink());
        let result = client.connect("  ", options()).await;
        assert!(matches!(result, Err(ClientError::Authentication { .. })));
    }

    #[tokio::test]
    async fn test_lines_become_messages() {
        let input: &[u8] = b";dank please\nhello\n";
        let client = ConsoleClient::builder()
            .io(input, tokio::io::sink())
            .username("alice")
            .discriminator("4242")
            .channel("general")
            .build();

        let mut events = client.connect("token", options()).await.unwrap();

        match events.recv().await {
            Some(ClientEvent::Ready(user)) => assert_eq!(user.tag(), "Dank Bot#0000"),
            other => panic!("expected ready, got {other:?}"),
        }

        let mut bodies = Vec::new();
        for _ in 0..2 {
            match events.recv().await {
                Some(ClientEvent::MessageCreate(message)) => {
                    assert_eq!(message.channel_id, "general");
                    assert_eq!(message.author.tag(), "alice#4242");
                    bodies.push(message.body);
                }
                other => panic!("expected message, got {other:?}"),
            }
        }
        assert_eq!(bodies, vec![";dank please", "hello"]);

        match events.recv().await {
            Some(ClientEvent::Close { code, reason }) => {
                assert_eq!(code, NORMAL_CLOSURE);
                assert_eq!(reason, "input closed");
            }
            other => panic!("expected close, got {other:?}"),
        }
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_second_connect_fails() {
        let client = ConsoleClient::with_io(tokio::io::empty(), tokio::io::sink());
        let _events = client.connect("token", options()).await.unwrap();
        let result = client.connect("token", options()).await;
        assert!(matches!(result, Err(ClientError::ConnectionFailed { .. })));
    }

    #[tokio::test]
    async fn test_reply_writes_line() {
        let (writer, mut output) = duplex(256);
        let client = ConsoleClient::with_io(tokio::io::empty(), writer);
        let _events = client.connect("token", options()).await.unwrap();

        let message = InboundMessage::new("1", "console", ";dank", client.author().clone());
        let id = client.reply(&message, "memes").await.unwrap();
        assert!(!id.is_empty());

        let mut buf = vec![0; "Dank Bot: memes\n".len()];
        output.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, b"Dank Bot: memes\n");
    }

    #[tokio::test]
    async fn test_close_ends_stream_and_rejects_replies() {
        let (_input, reader) = duplex(64);
        let client = ConsoleClient::with_io(reader, tokio::io::sink());
        let mut events = client.connect("token", options()).await.unwrap();
        assert!(matches!(events.recv().await, Some(ClientEvent::Ready(_))));

        client.close().await;
        let end = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap();
        assert!(end.is_none());

        let message = InboundMessage::new("1", "console", "hi", client.author().clone());
        assert!(matches!(
            client.reply(&message, "late").await,
            Err(ClientError::Closed { .. })
        ));
    }
}
