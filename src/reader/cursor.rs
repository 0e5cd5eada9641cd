use super::{ReadResult, ReaderError, ReaderErrorKind};
use crate::{ParamValue, param::Delimiter};

/// Walks a single line, keeping track of the byte offset for error columns
pub(crate) struct LineCursor<'a> {
    text: &'a str,
    line: usize,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub(crate) const fn new(text: &'a str, line: usize) -> Self {
        Self { text, line, pos: 0 }
    }

    /// The unread part of the line
    pub(crate) fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub(crate) fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    pub(crate) fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// 1-based column of the current position, in characters
    pub(crate) fn column(&self) -> usize {
        self.text[..self.pos].chars().count() + 1
    }

    pub(crate) fn error(&self, kind: ReaderErrorKind) -> ReaderError {
        ReaderError::new(self.line, self.column(), kind)
    }

    /// Everything up to the next whitespace
    pub(crate) fn read_bare(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// A quoted string, without its delimiters. The cursor sits on the opening one.
    fn read_quoted(&mut self, delimiter: Delimiter) -> ReadResult<&'a str> {
        let start = self.pos + 1;
        match self.text[start..].find(delimiter.as_char()) {
            Some(len) => {
                self.pos = start + len + 1;
                Ok(&self.text[start..start + len])
            }
            None => Err(self.error(ReaderErrorKind::UnterminatedString(delimiter))),
        }
    }

    /// A single string token, quoted or bare
    pub(crate) fn read_string(&mut self) -> ReadResult<String> {
        match self.peek().and_then(Delimiter::from_char) {
            Some(delimiter) => self.read_quoted(delimiter).map(str::to_owned),
            None => Ok(self.read_bare().to_owned()),
        }
    }

    /// A single parameter. Quoted forms are always strings.
    pub(crate) fn read_param(&mut self) -> ReadResult<ParamValue> {
        let param = match self.peek().and_then(Delimiter::from_char) {
            Some(delimiter) => ParamValue::String(self.read_quoted(delimiter)?.to_owned()),
            None => ParamValue::from_bare(self.read_bare()),
        };
        if self.peek().is_some_and(|c| !c.is_whitespace()) {
            return Err(self.error(ReaderErrorKind::MissingSeparator));
        }
        Ok(param)
    }

    /// All parameters up to the end of the line
    pub(crate) fn read_params(&mut self) -> ReadResult<Vec<ParamValue>> {
        let mut params = Vec::new();
        loop {
            self.skip_whitespace();
            if self.at_end() {
                return Ok(params);
            }
            params.push(self.read_param()?);
        }
    }
}

#[test]
fn quoted_params() {
    let mut cursor = LineCursor::new(r#" "a b" 'c"d' `e'f"g` h"i"#, 1);
    assert_eq!(
        cursor.read_params().unwrap(),
        crate::params!["a b", "c\"d", "e'f\"g", "h\"i"]
    );
}

#[test]
fn columns_count_characters() {
    let mut cursor = LineCursor::new("  \"äöü", 3);
    cursor.skip_whitespace();
    let err = cursor.read_param().unwrap_err();
    assert_eq!((err.line(), err.column()), (3, 3));
    assert_eq!(err.error_kind(), &ReaderErrorKind::UnterminatedString(Delimiter::Double));
}

#[test]
fn params_need_separators() {
    let err = LineCursor::new(r#""a"b"#, 1).read_params().unwrap_err();
    assert_eq!(err.error_kind(), &ReaderErrorKind::MissingSeparator);
    assert_eq!(err.column(), 4);
}
