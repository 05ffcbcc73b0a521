/// A message body broken into a command word and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    /// The first whitespace-delimited token, or `""` for a blank body.
    pub word: &'a str,
    /// The remaining tokens, in order.
    pub args: Vec<String>,
}

impl Invocation<'_> {
    /// Returns `true` if the body had no tokens at all.
    pub fn is_blank(&self) -> bool {
        self.word.is_empty()
    }
}

/// Splits a message body on whitespace.
///
/// Runs of whitespace count as one separator, and leading or trailing
/// whitespace is ignored. A blank body yields the empty command word.
pub fn parse_invocation(body: &str) -> Invocation<'_> {
    let mut tokens = body.split_whitespace();
    let word = tokens.next().unwrap_or("");
    let args = tokens.map(str::to_string).collect();

    Invocation { word, args }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let inv = parse_invocation(";dank please");
        assert_eq!(inv.word, ";dank");
        assert_eq!(inv.args, vec!["please"]);
    }

    #[test]
    fn test_parse_collapses_whitespace() {
        let inv = parse_invocation("  !roll   2d6 \t +3\n");
        assert_eq!(inv.word, "!roll");
        assert_eq!(inv.args, vec!["2d6", "+3"]);
    }

    #[test]
    fn test_parse_word_only() {
        let inv = parse_invocation("!ping");
        assert_eq!(inv.word, "!ping");
        assert!(inv.args.is_empty());
    }

    #[test]
    fn test_parse_empty() {
        let inv = parse_invocation("");
        assert!(inv.is_blank());
        assert_eq!(inv.word, "");
        assert!(inv.args.is_empty());
    }

    #[test]
    fn test_parse_whitespace_only() {
        let inv = parse_invocation("   \t  ");
        assert!(inv.is_blank());
        assert!(inv.args.is_empty());
    }
}
