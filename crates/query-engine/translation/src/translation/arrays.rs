//! Scanning of server array literals such as `{1,2,3}` or `{"a,b",NULL}`.
//!
//! Quoted elements may contain delimiters, braces and escaped quotes. Multi-dimensional arrays
//! are flattened in row-major order and an optional dimension decoration (`[0:2]=`) is skipped.

use std::borrow::Cow;

use super::error::ArrayLiteralError;

const DELIMITER: u8 = b',';

/// One element of an array literal, with quoting and escapes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayElement<'a> {
    Null,
    Text(Cow<'a, str>),
}

/// Count the elements of a literal without splitting it, counting every delimiter outside
/// quotes. Used to size the element buffer before splitting.
pub fn count_elements(literal: &str) -> usize {
    let mut delimiters = 0;
    let mut has_content = false;
    let mut in_quotes = false;
    let mut escaped = false;

    for byte in strip_dimensions(literal).unwrap_or(literal).bytes() {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' => {
                escaped = true;
                has_content = true;
            }
            b'"' => {
                in_quotes = !in_quotes;
                has_content = true;
            }
            DELIMITER if !in_quotes => delimiters += 1,
            b'{' | b'}' if !in_quotes => {}
            byte if byte.is_ascii_whitespace() && !in_quotes => {}
            _ => has_content = true,
        }
    }

    if has_content {
        delimiters + 1
    } else {
        0
    }
}

/// Split a literal into its elements, in left-to-right order.
pub fn split_elements(literal: &str) -> Result<Vec<ArrayElement<'_>>, ArrayLiteralError> {
    let body = strip_dimensions(literal)?;
    let mut scanner = Scanner::new(body);
    let mut elements = Vec::with_capacity(count_elements(body));

    scanner.skip_whitespace();
    if scanner.peek() != Some(b'{') {
        return Err(ArrayLiteralError::MissingOpeningBrace);
    }
    scanner.bump();
    let mut depth = 1_usize;

    loop {
        scanner.skip_whitespace();
        match scanner.peek() {
            None => return Err(ArrayLiteralError::UnexpectedEnd),
            Some(b'{') => {
                scanner.bump();
                depth += 1;
            }
            Some(b'}') => {
                scanner.bump();
                depth -= 1;
                if depth == 0 {
                    break;
                }
                scanner.skip_delimiter()?;
            }
            Some(_) => {
                elements.push(scanner.element()?);
                scanner.skip_delimiter()?;
            }
        }
    }

    scanner.skip_whitespace();
    if scanner.peek().is_some() {
        return Err(ArrayLiteralError::TrailingCharacters);
    }
    Ok(elements)
}

/// Drop a leading `[lower:upper]...=` decoration.
fn strip_dimensions(literal: &str) -> Result<&str, ArrayLiteralError> {
    let trimmed = literal.trim_start();
    if !trimmed.starts_with('[') {
        return Ok(trimmed);
    }
    match trimmed.find('=') {
        Some(index) => Ok(&trimmed[index + 1..]),
        None => Err(ArrayLiteralError::MalformedDimensions),
    }
}

struct Scanner<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Scanner { text, offset: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.offset).copied()
    }

    fn bump(&mut self) {
        self.offset += 1;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn unexpected(&self) -> ArrayLiteralError {
        match self.text[self.offset..].chars().next() {
            Some(character) => ArrayLiteralError::UnexpectedCharacter {
                character,
                offset: self.offset,
            },
            None => ArrayLiteralError::UnexpectedEnd,
        }
    }

    /// After an element or a nested array: consume a delimiter, or leave a closing brace.
    fn skip_delimiter(&mut self) -> Result<(), ArrayLiteralError> {
        self.skip_whitespace();
        match self.peek() {
            Some(DELIMITER) => {
                self.bump();
                Ok(())
            }
            Some(b'}') => Ok(()),
            _ => Err(self.unexpected()),
        }
    }

    fn element(&mut self) -> Result<ArrayElement<'a>, ArrayLiteralError> {
        if self.peek() == Some(b'"') {
            self.quoted()
        } else {
            self.unquoted()
        }
    }

    fn quoted(&mut self) -> Result<ArrayElement<'a>, ArrayLiteralError> {
        let opening = self.offset;
        self.bump();
        let start = self.offset;
        let mut escaped = false;

        loop {
            match self.peek() {
                None => return Err(ArrayLiteralError::UnterminatedQuote { offset: opening }),
                Some(b'\\') => {
                    escaped = true;
                    self.bump();
                    if self.peek().is_none() {
                        return Err(ArrayLiteralError::UnterminatedQuote { offset: opening });
                    }
                    self.bump();
                }
                Some(b'"') => break,
                Some(_) => self.bump(),
            }
        }

        let raw = &self.text[start..self.offset];
        self.bump();
        Ok(ArrayElement::Text(unescape(raw, escaped)))
    }

    fn unquoted(&mut self) -> Result<ArrayElement<'a>, ArrayLiteralError> {
        let start = self.offset;
        let mut escaped = false;

        while let Some(byte) = self.peek() {
            match byte {
                DELIMITER | b'}' => break,
                b'{' | b'"' => return Err(self.unexpected()),
                b'\\' => {
                    escaped = true;
                    self.bump();
                    if self.peek().is_none() {
                        return Err(ArrayLiteralError::UnexpectedEnd);
                    }
                    self.bump();
                }
                _ => self.bump(),
            }
        }

        let raw = self.text[start..self.offset].trim();
        if raw.is_empty() {
            return Err(self.unexpected());
        }
        if !escaped && raw.eq_ignore_ascii_case("NULL") {
            return Ok(ArrayElement::Null);
        }
        Ok(ArrayElement::Text(unescape(raw, escaped)))
    }
}

fn unescape(raw: &str, escaped: bool) -> Cow<'_, str> {
    if !escaped {
        return Cow::Borrowed(raw);
    }
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                text.push(next);
            }
        } else {
            text.push(c);
        }
    }
    Cow::Owned(text)
}
