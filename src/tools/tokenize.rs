//! Shell-style Argument Tokenizer
//!
//! Splits a single argument string into an argument vector using POSIX shell
//! quoting rules, without ever handing the string to a shell.
//!
//! # Rules
//!
//! - Unquoted space, tab, CR and LF separate tokens
//! - Single quotes preserve everything literally up to the closing quote
//! - Double quotes preserve everything except `\"` and `\\`, which are unescaped
//! - A backslash outside quotes escapes the next character
//! - Adjacent quoted and unquoted parts join into one token (`a'b c'` is `ab c`)
//! - An empty quoted string (`''` or `""`) is an empty token
//!
//! Shell metacharacters (`;`, `|`, `&`, `$`, backticks, redirections) have no
//! special meaning here. They end up as ordinary characters in a token.

/// Error types for argument tokenization
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("No closing quotation")]
    UnterminatedQuote(char),

    #[error("No escaped character")]
    TrailingEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unquoted,
    SingleQuoted,
    DoubleQuoted,
}

/// Split `input` into tokens using shell quoting rules
///
/// # Example
///
/// ```
/// use netops_mcp::tools::split;
///
/// let tokens = split(r#"-H "Accept: application/json" https://example.com"#).unwrap();
/// assert_eq!(tokens, ["-H", "Accept: application/json", "https://example.com"]);
/// ```
pub fn split(input: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Tracks whether a token has started, so that `''` still yields a token
    let mut in_token = false;
    let mut state = State::Unquoted;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match state {
            State::Unquoted => match c {
                ' ' | '\t' | '\r' | '\n' => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                '\'' => {
                    state = State::SingleQuoted;
                    in_token = true;
                }
                '"' => {
                    state = State::DoubleQuoted;
                    in_token = true;
                }
                '\\' => {
                    let escaped = chars.next().ok_or(TokenizeError::TrailingEscape)?;
                    current.push(escaped);
                    in_token = true;
                }
                _ => {
                    current.push(c);
                    in_token = true;
                }
            },
            State::SingleQuoted => {
                if c == '\'' {
                    state = State::Unquoted;
                } else {
                    current.push(c);
                }
            }
            State::DoubleQuoted => match c {
                '"' => state = State::Unquoted,
                '\\' => {
                    let escaped = chars.next().ok_or(TokenizeError::TrailingEscape)?;
                    if escaped != '"' && escaped != '\\' {
                        current.push('\\');
                    }
                    current.push(escaped);
                }
                _ => current.push(c),
            },
        }
    }

    match state {
        State::SingleQuoted => return Err(TokenizeError::UnterminatedQuote('\'')),
        State::DoubleQuoted => return Err(TokenizeError::UnterminatedQuote('"')),
        State::Unquoted => {}
    }

    if in_token {
        tokens.push(current);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_plain_words() {
        assert_eq!(
            split("-X GET https://api.example.com").unwrap(),
            vec!["-X", "GET", "https://api.example.com"]
        );
    }

    #[test]
    fn test_split_collapses_whitespace() {
        assert_eq!(split("  -s \t\n -i  ").unwrap(), vec!["-s", "-i"]);
    }

    #[test]
    fn test_split_empty_input() {
        assert!(split("").unwrap().is_empty());
        assert!(split("   ").unwrap().is_empty());
    }

    #[test]
    fn test_split_double_quoted_value() {
        let tokens = split(r#"-d "{\"name\": \"pool 1\"}" -H "Content-Type: application/json""#).unwrap();
        assert_eq!(
            tokens,
            vec![
                "-d",
                r#"{"name": "pool 1"}"#,
                "-H",
                "Content-Type: application/json"
            ]
        );
    }

    #[test]
    fn test_split_single_quotes_are_literal() {
        assert_eq!(split(r#"'a \"b\" $HOME'"#).unwrap(), vec![r#"a \"b\" $HOME"#]);
    }

    #[test]
    fn test_split_backslash_in_double_quotes() {
        // Only \" and \\ are unescaped inside double quotes
        assert_eq!(split(r#""a\nb""#).unwrap(), vec![r"a\nb"]);
        assert_eq!(split(r#""a\\b""#).unwrap(), vec![r"a\b"]);
    }

    #[test]
    fn test_split_unquoted_escape() {
        assert_eq!(split(r"a\ b c").unwrap(), vec!["a b", "c"]);
        assert_eq!(split(r"\'").unwrap(), vec!["'"]);
    }

    #[test]
    fn test_split_adjacent_parts_join() {
        assert_eq!(split(r#"pre'fix 'mid"dle "end"#).unwrap(), vec!["prefix middle end"]);
    }

    #[test]
    fn test_split_empty_quoted_token() {
        assert_eq!(split("-d '' -v").unwrap(), vec!["-d", "", "-v"]);
        assert_eq!(split(r#""""#).unwrap(), vec![""]);
    }

    #[test]
    fn test_split_metacharacters_are_not_special() {
        assert_eq!(
            split("https://example.com; rm -rf / | cat && echo $(id)").unwrap(),
            vec![
                "https://example.com;",
                "rm",
                "-rf",
                "/",
                "|",
                "cat",
                "&&",
                "echo",
                "$(id)"
            ]
        );
    }

    #[test]
    fn test_split_unterminated_double_quote() {
        let err = split(r#"-X GET ""#).unwrap_err();
        assert_eq!(err, TokenizeError::UnterminatedQuote('"'));
        assert_eq!(err.to_string(), "No closing quotation");
    }

    #[test]
    fn test_split_unterminated_single_quote() {
        assert_eq!(
            split("-d 'abc").unwrap_err(),
            TokenizeError::UnterminatedQuote('\'')
        );
    }

    #[test]
    fn test_split_trailing_escape() {
        let err = split("abc \\").unwrap_err();
        assert_eq!(err, TokenizeError::TrailingEscape);
        assert_eq!(err.to_string(), "No escaped character");

        assert_eq!(split("\"abc\\").unwrap_err(), TokenizeError::TrailingEscape);
    }

    proptest! {
        #[test]
        fn prop_plain_words_roundtrip(
            words in prop::collection::vec("[a-zA-Z0-9_./:=-]+", 0..8)
        ) {
            let joined = words.join(" ");
            prop_assert_eq!(split(&joined).unwrap(), words);
        }

        #[test]
        fn prop_single_quoted_is_literal(body in "[^']*") {
            let quoted = format!("'{}'", body);
            prop_assert_eq!(split(&quoted).unwrap(), vec![body]);
        }

        #[test]
        fn prop_never_panics(input in any::<String>()) {
            let _ = split(&input);
        }
    }
}
