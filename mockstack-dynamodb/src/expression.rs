//! Textual condition expressions
//!
//! Key-condition and filter expressions arrive as a small textual grammar
//! with values bound through `:placeholder` tokens:
//!
//! ```text
//! expression := term (('and'|'or') term)*
//! term       := name '=' placeholder | '(' expression ')'
//! ```
//!
//! Only `=` is supported inside a term. The parser produces exactly the
//! [`Predicate`] tree the builder API would: `a = :x and b = :y` is
//! `Predicate::test("a", eq).and(Predicate::test("b", eq))`. Mixed `and`/`or`
//! without parentheses folds left to right.

use std::collections::HashMap;

use crate::condition::{Condition, Predicate};
use crate::error::DynamoError;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Placeholder(String),
    Equals,
    LeftParen,
    RightParen,
    And,
    Or,
}

fn tokenize(input: &str) -> Result<Vec<Token>, DynamoError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LeftParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RightParen);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Equals);
            }
            ':' => {
                chars.next();
                let name = take_word(&mut chars);
                if name.is_empty() {
                    return Err(DynamoError::validation(
                        "Invalid expression: empty value placeholder",
                    ));
                }
                tokens.push(Token::Placeholder(format!(":{name}")));
            }
            c if is_word_char(c) => {
                let word = take_word(&mut chars);
                match word.to_ascii_lowercase().as_str() {
                    "and" => tokens.push(Token::And),
                    "or" => tokens.push(Token::Or),
                    _ => tokens.push(Token::Ident(word)),
                }
            }
            other => {
                return Err(DynamoError::validation(format!(
                    "Invalid expression: unexpected character '{other}'"
                )));
            }
        }
    }

    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.' || c == '-'
}

fn take_word(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut word = String::new();
    while let Some(&c) = chars.peek() {
        if !is_word_char(c) {
            break;
        }
        word.push(c);
        chars.next();
    }
    word
}

/// Parse an expression into a [`Predicate`], binding `:placeholder` tokens
/// through `values`.
pub fn parse_expression(
    expression: &str,
    values: &HashMap<String, Value>,
) -> Result<Predicate, DynamoError> {
    let tokens = tokenize(expression)?;
    let mut parser = Parser {
        tokens,
        position: 0,
        values,
    };

    let predicate = parser.expression()?;
    if let Some(token) = parser.peek() {
        return Err(DynamoError::validation(format!(
            "Invalid expression: unexpected trailing {token:?}"
        )));
    }
    Ok(predicate)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    values: &'a HashMap<String, Value>,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn expression(&mut self) -> Result<Predicate, DynamoError> {
        let mut predicate = self.term()?;

        loop {
            match self.peek() {
                Some(Token::And) => {
                    self.position += 1;
                    predicate = predicate.and(self.term()?);
                }
                Some(Token::Or) => {
                    self.position += 1;
                    predicate = predicate.or(self.term()?);
                }
                _ => break,
            }
        }

        Ok(predicate)
    }

    fn term(&mut self) -> Result<Predicate, DynamoError> {
        match self.advance() {
            Some(Token::LeftParen) => {
                let inner = self.expression()?;
                match self.advance() {
                    Some(Token::RightParen) => Ok(inner),
                    _ => Err(DynamoError::validation(
                        "Invalid expression: missing closing parenthesis",
                    )),
                }
            }
            Some(Token::Ident(attribute)) => {
                match self.advance() {
                    Some(Token::Equals) => {}
                    _ => {
                        return Err(DynamoError::validation(format!(
                            "Invalid expression: expected '=' after {attribute}"
                        )));
                    }
                }
                match self.advance() {
                    Some(Token::Placeholder(placeholder)) => {
                        let value = self.values.get(&placeholder).ok_or_else(|| {
                            DynamoError::validation(format!(
                                "Missing expression attribute value: {placeholder}"
                            ))
                        })?;
                        Ok(Predicate::test(attribute, Condition::eq(value.clone())))
                    }
                    _ => Err(DynamoError::validation(format!(
                        "Invalid expression: expected value placeholder after {attribute} ="
                    ))),
                }
            }
            _ => Err(DynamoError::validation(
                "Invalid expression: expected a condition term",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: Vec<(&str, Value)>) -> HashMap<String, Value> {
        pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }

    #[test]
    fn test_tokenize_term() {
        let tokens = tokenize("gender = :i1").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("gender".to_string()),
                Token::Equals,
                Token::Placeholder(":i1".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_nested() {
        let tokens = tokenize("(a = :v) or b = :w").unwrap();
        assert_eq!(tokens[0], Token::LeftParen);
        assert_eq!(tokens[4], Token::RightParen);
        assert_eq!(tokens[5], Token::Or);
    }

    #[test]
    fn test_tokenize_rejects_garbage() {
        assert!(tokenize("a = :v & b = :w").is_err());
        assert!(tokenize("a = :").is_err());
    }

    #[test]
    fn test_parse_produces_builder_tree() {
        let bound = values(vec![
            (":v", Value::string("female")),
            (":w", Value::string("Toggles")),
        ]);

        let parsed = parse_expression("gender = :v and name = :w", &bound).unwrap();
        let built = Predicate::test("gender", Condition::eq(Value::string("female")))
            .and(Predicate::test("name", Condition::eq(Value::string("Toggles"))));

        assert_eq!(parsed, built);
    }

    #[test]
    fn test_parse_missing_placeholder() {
        let err = parse_expression("gender = :v", &HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing expression attribute value: :v");
    }

    #[test]
    fn test_parse_rejects_dangling_operator() {
        let bound = values(vec![(":v", Value::string("female"))]);
        assert!(parse_expression("gender = :v and", &bound).is_err());
        assert!(parse_expression("and gender = :v", &bound).is_err());
        assert!(parse_expression("(gender = :v", &bound).is_err());
        assert!(parse_expression("gender = :v)", &bound).is_err());
    }

    #[test]
    fn test_parse_empty_expression() {
        assert!(parse_expression("", &HashMap::new()).is_err());
    }
}
