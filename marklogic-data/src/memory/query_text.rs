use crate::client::{StoreError, StoreResult, CODE_QUERY_SYNTAX};
use crate::query::{RangeOperator, StructuredQuery};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"\(|\)|"[^"]*"|"|[^\s()"]+"#).ok());

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Open,
    Close,
    Or,
    And,
    Minus,
    Phrase(String),
    Word(String),
}

fn syntax_error(message: String) -> StoreError {
    log::error!("{}", message);
    StoreError::with_code(CODE_QUERY_SYNTAX, message)
}

fn tokenize(text: &str) -> StoreResult<Vec<Token>> {
    let pattern = TOKEN
        .as_ref()
        .ok_or_else(|| syntax_error("Query tokenizer is unavailable".to_string()))?;

    let mut tokens = Vec::new();
    for m in pattern.find_iter(text) {
        let raw = m.as_str();
        let token = match raw {
            "(" => Token::Open,
            ")" => Token::Close,
            "\"" => {
                return Err(syntax_error(format!(
                    "Unterminated phrase at position {} in \"{}\"",
                    m.start(),
                    text
                )))
            }
            "OR" => Token::Or,
            "AND" => Token::And,
            "-" => Token::Minus,
            _ if raw.starts_with('"') => Token::Phrase(raw.trim_matches('"').to_string()),
            _ if raw.starts_with('-') => {
                tokens.push(Token::Minus);
                Token::Word(raw[1..].to_string())
            }
            _ => Token::Word(raw.to_string()),
        };
        tokens.push(token);
    }
    Ok(tokens)
}

struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    text: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn parse_or(&mut self) -> StoreResult<StructuredQuery> {
        let mut operands = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.advance();
            operands.push(self.parse_and()?);
        }
        if operands.len() == 1 {
            Ok(operands.remove(0))
        } else {
            Ok(StructuredQuery::Or(operands))
        }
    }

    fn parse_and(&mut self) -> StoreResult<StructuredQuery> {
        let mut query = self.parse_unary()?;
        loop {
            match self.peek() {
                None | Some(Token::Close) | Some(Token::Or) => return Ok(query),
                Some(Token::And) => {
                    self.advance();
                }
                _ => {}
            }
            query = query.and(self.parse_unary()?);
        }
    }

    fn parse_unary(&mut self) -> StoreResult<StructuredQuery> {
        if self.peek() == Some(&Token::Minus) {
            self.advance();
            return Ok(self.parse_unary()?.negate());
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> StoreResult<StructuredQuery> {
        match self.advance() {
            Some(Token::Open) => {
                if self.peek() == Some(&Token::Close) {
                    return Err(syntax_error(format!("Empty group in \"{}\"", self.text)));
                }
                let inner = self.parse_or()?;
                match self.advance() {
                    Some(Token::Close) => Ok(inner),
                    _ => Err(syntax_error(format!("Missing ')' in \"{}\"", self.text))),
                }
            }
            Some(Token::Phrase(phrase)) => {
                if phrase.trim().is_empty() {
                    return Err(syntax_error(format!("Empty phrase in \"{}\"", self.text)));
                }
                Ok(StructuredQuery::Word {
                    property: None,
                    text: phrase,
                })
            }
            Some(Token::Word(word)) => self.term(&word),
            Some(token) => Err(syntax_error(format!(
                "Unexpected {:?} in \"{}\"",
                token, self.text
            ))),
            None => Err(syntax_error(format!(
                "Unexpected end of query \"{}\"",
                self.text
            ))),
        }
    }

    fn term(&mut self, word: &str) -> StoreResult<StructuredQuery> {
        let Some((property, value)) = word.split_once(':') else {
            return Ok(StructuredQuery::Word {
                property: None,
                text: word.to_string(),
            });
        };

        let value = if value.is_empty() {
            match self.peek() {
                Some(Token::Phrase(phrase)) => {
                    let phrase = phrase.clone();
                    self.advance();
                    return constraint(property, &phrase, self.text);
                }
                _ => value,
            }
        } else {
            value
        };
        constraint(property, value, self.text)
    }
}

fn constraint(property: &str, value: &str, text: &str) -> StoreResult<StructuredQuery> {
    if property.is_empty() || value.is_empty() {
        return Err(syntax_error(format!(
            "Incomplete constraint \"{}:{}\" in \"{}\"",
            property, value, text
        )));
    }

    for (prefix, operator) in [
        (">=", RangeOperator::Ge),
        ("<=", RangeOperator::Le),
        (">", RangeOperator::Gt),
        ("<", RangeOperator::Lt),
    ] {
        if let Some(bound) = value.strip_prefix(prefix) {
            if bound.is_empty() {
                return Err(syntax_error(format!(
                    "Missing bound for \"{}:{}\" in \"{}\"",
                    property, value, text
                )));
            }
            return Ok(StructuredQuery::Range {
                property: property.to_string(),
                operator,
                value: typed_value(bound),
            });
        }
    }

    match typed_value(value) {
        Value::String(s) => Ok(StructuredQuery::Word {
            property: Some(property.to_string()),
            text: s,
        }),
        typed => Ok(StructuredQuery::Value {
            property: property.to_string(),
            values: vec![typed],
        }),
    }
}

fn typed_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Parses a string query into a structured query.
///
/// Terms are implicitly AND-ed; `OR`, `AND`, leading `-` and parentheses
/// combine them. `prop:value` constrains a property (with `>`, `>=`, `<`,
/// `<=` prefixes for ranges) and `"..."` matches a phrase. Blank text
/// matches everything.
pub(crate) fn parse(text: &str) -> StoreResult<StructuredQuery> {
    let tokens = tokenize(text)?;
    if tokens.is_empty() {
        return Ok(StructuredQuery::All);
    }

    let mut parser = Parser {
        tokens,
        position: 0,
        text,
    };
    let query = parser.parse_or()?;
    match parser.peek() {
        None => Ok(query),
        Some(token) => Err(syntax_error(format!(
            "Unexpected {:?} in \"{}\"",
            token, text
        ))),
    }
}
