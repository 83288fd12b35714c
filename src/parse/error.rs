use thiserror::Error;

use super::token::{Position, Token, TokenKind};

/// Why a construct could not be parsed.
///
/// The partially built construct is discarded; the error carries the position
/// of the token where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{position}: expected {expected}, found {found}")]
    Unexpected {
        expected: &'static str,
        found: String,
        position: Position,
    },
    #[error("{position}: invalid input {text:?}")]
    Lexical { text: String, position: Position },
    #[error("{position}: in substitution: {source}")]
    Substitution {
        position: Position,
        source: Box<ParseError>,
    },
    #[error("{position}: nesting deeper than {limit} levels")]
    TooDeep { position: Position, limit: usize },
}

impl ParseError {
    /// Error for a lookahead token that fits no production here.
    pub fn unexpected(token: &Token, expected: &'static str) -> Self {
        if token.kind == TokenKind::Error {
            return ParseError::Lexical {
                text: token.text.clone(),
                position: token.position,
            };
        }
        let found = match token.kind {
            TokenKind::Word | TokenKind::String | TokenKind::Variable => {
                format!("{} {:?}", token.kind.describe(), token.text)
            }
            kind => kind.describe().to_string(),
        };
        ParseError::Unexpected {
            expected,
            found,
            position: token.position,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::Unexpected { position, .. }
            | ParseError::Lexical { position, .. }
            | ParseError::Substitution { position, .. }
            | ParseError::TooDeep { position, .. } => *position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_token_becomes_lexical() {
        let token = Token::new(TokenKind::Error, "|", Position::new(1, 3));
        let err = ParseError::unexpected(&token, "a command");
        assert_eq!(
            err,
            ParseError::Lexical {
                text: "|".into(),
                position: Position::new(1, 3)
            }
        );
        assert_eq!(err.to_string(), "1:3: invalid input \"|\"");
    }

    #[test]
    fn unexpected_message() {
        let token = Token::new(TokenKind::Fi, "fi", Position::new(2, 1));
        let err = ParseError::unexpected(&token, "'then'");
        assert_eq!(err.to_string(), "2:1: expected 'then', found 'fi'");
        assert_eq!(err.position(), Position::new(2, 1));
    }

    #[test]
    fn unexpected_word_shows_text() {
        let token = Token::new(TokenKind::Word, "echo", Position::new(1, 9));
        let err = ParseError::unexpected(&token, "'fi'");
        assert_eq!(err.to_string(), "1:9: expected 'fi', found word \"echo\"");
    }
}
