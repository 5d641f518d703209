// expr        = term term*              (left-folded into applications)
// term        = variable | abstraction
// variable    = single alphabetic character
// abstraction = '(' variable '.' expr ')'

use std::fmt::Display;

use nom::{
    character::complete::{char, multispace0, satisfy},
    error::Error,
    IResult,
};
use thiserror::Error;
use tracing::trace;

use super::term::{Link, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Term,
    Variable,
    OpenParen,
    Dot,
    CloseParen,
}

impl Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Term => write!(f, "a variable or '('"),
            Expected::Variable => write!(f, "a variable"),
            Expected::OpenParen => write!(f, "'('"),
            Expected::Dot => write!(f, "'.'"),
            Expected::CloseParen => write!(f, "')'"),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("unexpected character {found:?} at byte {offset}, expected {expected}")]
    UnexpectedChar {
        found: char,
        offset: usize,
        expected: Expected,
    },
    #[error("unexpected end of input at byte {offset}, expected {expected}")]
    UnexpectedEnd { offset: usize, expected: Expected },
    #[error("unmatched ')' at byte {offset}")]
    UnmatchedParen { offset: usize },
}

pub fn parse(src: &[u8]) -> Result<Link, ParseError> {
    let mut parser = Parser::new(src);
    let term = parser.parse_expr()?;

    match parser.peek() {
        None => Ok(term),
        Some(_) => Err(ParseError::UnmatchedParen {
            offset: parser.offset(),
        }),
    }
}

struct Parser<'a> {
    src: &'a [u8],
    rest: &'a [u8],
}

impl<'a> Parser<'a> {
    fn new(src: &'a [u8]) -> Self {
        Parser { src, rest: src }
    }

    fn offset(&self) -> usize {
        self.src.len() - self.rest.len()
    }

    fn skip_whitespace(&mut self) {
        let res: IResult<&[u8], &[u8]> = multispace0(self.rest);
        if let Ok((rest, _)) = res {
            self.rest = rest;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_whitespace();
        self.rest.first().copied()
    }

    fn unexpected(&self, expected: Expected) -> ParseError {
        let offset = self.offset();
        match self.rest.first() {
            Some(&byte) => ParseError::UnexpectedChar {
                found: char::from(byte),
                offset,
                expected,
            },
            None => ParseError::UnexpectedEnd { offset, expected },
        }
    }

    fn expect(&mut self, c: char, expected: Expected) -> Result<(), ParseError> {
        self.skip_whitespace();
        let res: IResult<&[u8], char, Error<&[u8]>> = char(c)(self.rest);
        match res {
            Ok((rest, _)) => {
                self.rest = rest;
                Ok(())
            }
            Err(_) => Err(self.unexpected(expected)),
        }
    }

    fn parse_expr(&mut self) -> Result<Link, ParseError> {
        let Some(mut expr) = self.parse_term()? else {
            return Err(self.unexpected(Expected::Term));
        };

        while let Some(next) = self.parse_term()? {
            expr = Term::app(expr, next);
        }

        Ok(expr)
    }

    // `None` means the sequence of juxtaposed terms has ended, either at a
    // ')' (left for the caller) or at the end of input.
    fn parse_term(&mut self) -> Result<Option<Link>, ParseError> {
        let Some(byte) = self.peek() else {
            return Ok(None);
        };
        trace!(offset = self.offset(), byte = %char::from(byte), "consuming");

        match byte {
            b')' => Ok(None),
            b'(' => self.parse_abstraction().map(Some),
            _ => self.parse_variable().map(Some),
        }
    }

    fn parse_abstraction(&mut self) -> Result<Link, ParseError> {
        self.expect('(', Expected::OpenParen)?;
        let name = self.parse_name()?;
        self.expect('.', Expected::Dot)?;
        let body = self.parse_expr()?;
        self.expect(')', Expected::CloseParen)?;

        Ok(Term::lam(name, body))
    }

    fn parse_variable(&mut self) -> Result<Link, ParseError> {
        Ok(Term::var(self.parse_name()?))
    }

    fn parse_name(&mut self) -> Result<char, ParseError> {
        self.skip_whitespace();
        let res: IResult<&[u8], char, Error<&[u8]>> =
            satisfy(|c: char| c.is_ascii_alphabetic())(self.rest);
        match res {
            Ok((rest, name)) => {
                self.rest = rest;
                Ok(name)
            }
            Err(_) => Err(self.unexpected(Expected::Variable)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Result = core::result::Result<(), ParseError>;

    fn round_trip(src: &str) -> Result {
        assert_eq!(parse(src.as_bytes())?.to_string(), src);
        Ok(())
    }

    #[test]
    fn test_round_trip() -> Result {
        round_trip("x")?;
        round_trip("(x.x)")?;
        round_trip("(f.(x.fx))")?;
        round_trip("(x.xx)(x.xx)")?;
        round_trip("xyz")
    }

    #[test]
    fn test_identity() -> Result {
        assert_eq!(parse(b"(x.x)")?, Term::lam('x', Term::var('x')));
        Ok(())
    }

    #[test]
    fn test_left_associative() -> Result {
        let expected = Term::app(Term::app(Term::var('x'), Term::var('y')), Term::var('z'));
        assert_eq!(parse(b"x y z")?, expected);
        Ok(())
    }

    #[test]
    fn test_whitespace() -> Result {
        let term = parse(b" \t( x\r\n. \tx y )\n (y . y) ")?;
        assert_eq!(term.to_string(), "(x.xy)(y.y)");
        Ok(())
    }

    #[test]
    fn test_application_inside_body() -> Result {
        let expected = Term::lam(
            'x',
            Term::app(Term::app(Term::var('a'), Term::var('b')), Term::var('c')),
        );
        assert_eq!(parse(b"(x.abc)")?, expected);
        Ok(())
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            parse(b"  \n"),
            Err(ParseError::UnexpectedEnd {
                offset: 3,
                expected: Expected::Term
            })
        );
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(
            parse(b"(x.)"),
            Err(ParseError::UnexpectedChar {
                found: ')',
                offset: 3,
                expected: Expected::Term
            })
        );
    }

    #[test]
    fn test_missing_dot() {
        assert_eq!(
            parse(b"(x x)"),
            Err(ParseError::UnexpectedChar {
                found: 'x',
                offset: 3,
                expected: Expected::Dot
            })
        );
    }

    #[test]
    fn test_multi_character_binder() {
        assert_eq!(
            parse(b"(xy.x)"),
            Err(ParseError::UnexpectedChar {
                found: 'y',
                offset: 2,
                expected: Expected::Dot
            })
        );
    }

    #[test]
    fn test_non_alphabetic_binder() {
        assert_eq!(
            parse(b"(1.x)"),
            Err(ParseError::UnexpectedChar {
                found: '1',
                offset: 1,
                expected: Expected::Variable
            })
        );
    }

    #[test]
    fn test_unclosed_abstraction() {
        assert_eq!(
            parse(b"(x.x"),
            Err(ParseError::UnexpectedEnd {
                offset: 4,
                expected: Expected::CloseParen
            })
        );
    }

    #[test]
    fn test_unmatched_close_paren() {
        assert_eq!(
            parse(b"x y)"),
            Err(ParseError::UnmatchedParen { offset: 3 })
        );
    }

    #[test]
    fn test_stray_character() {
        assert_eq!(
            parse(b"x.y"),
            Err(ParseError::UnexpectedChar {
                found: '.',
                offset: 1,
                expected: Expected::Variable
            })
        );
    }

    #[test]
    fn test_error_message() {
        let err = parse(b"(x.x").expect_err("unclosed");
        assert_eq!(
            err.to_string(),
            "unexpected end of input at byte 4, expected ')'"
        );
    }
}
