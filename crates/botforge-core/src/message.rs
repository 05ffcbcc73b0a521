//! Message and user types shared by clients and the command router.
//!
//! These are owned and produced by the [`Client`](crate::client::Client);
//! the rest of the framework only reads them.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// A platform user: either a message author or the bot's own account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Platform-specific user identifier.
    pub id: String,
    /// Display name.
    pub username: String,
    /// Discriminator that disambiguates equal usernames (e.g. `"0042"`).
    pub discriminator: String,
}

impl User {
    /// Creates a new user.
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        discriminator: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            discriminator: discriminator.into(),
        }
    }

    /// Returns the `username#discriminator` tag.
    pub fn tag(&self) -> String {
        self.to_string()
    }
}

impl Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.username, self.discriminator)
    }
}

/// A chat message delivered by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Platform-specific message identifier.
    pub id: String,
    /// The channel the message was posted in.
    pub channel_id: String,
    /// Raw message text.
    pub body: String,
    /// Who sent it.
    pub author: User,
}

impl InboundMessage {
    /// Creates a new inbound message.
    pub fn new(
        id: impl Into<String>,
        channel_id: impl Into<String>,
        body: impl Into<String>,
        author: User,
    ) -> Self {
        Self {
            id: id.into(),
            channel_id: channel_id.into(),
            body: body.into(),
            author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_tag() {
        let user = User::new("1", "alice", "0042");
        assert_eq!(user.tag(), "alice#0042");
        assert_eq!(format!("{user}"), "alice#0042");
    }
}
