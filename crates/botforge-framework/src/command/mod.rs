//! Command words and their arguments.
//!
//! A message is a command invocation when its first whitespace-delimited
//! token equals `prefix + trigger` for a registered trigger. The remaining
//! tokens are handed to the handler as [`CommandArgs`].

use std::ops::Deref;

pub mod split;

pub use split::{Invocation, parse_invocation};

/// The arguments that followed a command word.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs(Vec<String>);

impl CommandArgs {
    /// Creates an argument list.
    pub fn new(args: Vec<String>) -> Self {
        Self(args)
    }

    /// Returns the argument at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Joins all arguments with single spaces.
    pub fn rest(&self) -> String {
        self.0.join(" ")
    }

    /// Consumes the list.
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl Deref for CommandArgs {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<String>> for CommandArgs {
    fn from(args: Vec<String>) -> Self {
        Self(args)
    }
}

impl IntoIterator for CommandArgs {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_access() {
        let args = CommandArgs::new(vec!["a".into(), "b".into()]);
        assert_eq!(args.get(0), Some("a"));
        assert_eq!(args.get(2), None);
        assert_eq!(args.len(), 2);
        assert_eq!(args.rest(), "a b");
    }

    #[test]
    fn test_empty_args() {
        let args = CommandArgs::default();
        assert!(args.is_empty());
        assert_eq!(args.rest(), "");
    }
}
