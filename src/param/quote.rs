use num_enum::{IntoPrimitive, TryFromPrimitive};

#[doc = r#"
One of the three characters a string parameter can be wrapped in.

The format has no escape sequences, so a string can only be wrapped in a
delimiter it does not contain. They are tried in declaration order.
"#]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Delimiter {
    /// `"`
    Double = b'"',
    /// `'`
    Single = b'\'',
    /// `` ` ``
    Backtick = b'`',
}

impl Delimiter {
    /// All delimiters, in order of preference
    pub const ALL: [Delimiter; 3] = [Delimiter::Double, Delimiter::Single, Delimiter::Backtick];

    /// The delimiter character
    pub fn as_char(self) -> char {
        char::from(u8::from(self))
    }

    /// Identify a delimiter character
    pub fn from_char(c: char) -> Option<Self> {
        u8::try_from(c).ok().and_then(|b| Self::try_from(b).ok())
    }
}

/// How a string parameter is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    /// Written as is
    Bare,
    /// Wrapped in a delimiter absent from the string
    Quoted(Delimiter),
    /// No delimiter can hold the string. The parameter is written as a
    /// backtick-quoted [`multiline_placeholder`] and the value itself goes
    /// into a `<NAME` child block made of `|` lines.
    Multiline,
}

#[doc = r#"
Choose how `s` is written.

1. the empty string is `""`;
2. strings with a line break need the multiline form;
3. strings without whitespace or quote characters that would not read as a
   number are bare;
4. otherwise the first of `"`, `'`, `` ` `` missing from `s` wraps it;
5. strings containing all three fall back to the multiline form.

# Example
```rust
# use rppx::prelude::*;
# use rppx::param::quote_style;
assert_eq!(quote_style("!@#$%^&*()_+"), QuoteStyle::Bare);
assert_eq!(quote_style("! ok"), QuoteStyle::Quoted(Delimiter::Double));
assert_eq!(quote_style("10"), QuoteStyle::Quoted(Delimiter::Double));
assert_eq!(quote_style("'\"'"), QuoteStyle::Quoted(Delimiter::Backtick));
assert_eq!(quote_style("'`\""), QuoteStyle::Multiline);
```
"#]
pub fn quote_style(s: &str) -> QuoteStyle {
    if s.is_empty() {
        return QuoteStyle::Quoted(Delimiter::Double);
    }
    if s.contains(['\n', '\r']) {
        return QuoteStyle::Multiline;
    }
    let needs_quotes = s
        .chars()
        .any(|c| c.is_whitespace() || Delimiter::from_char(c).is_some())
        || super::numeric_kind(s).is_some();
    if !needs_quotes {
        return QuoteStyle::Bare;
    }
    Delimiter::ALL
        .into_iter()
        .find(|d| !s.contains(d.as_char()))
        .map_or(QuoteStyle::Multiline, QuoteStyle::Quoted)
}

/// Write a string parameter the way [`quote_style`] decides.
///
/// For [`QuoteStyle::Multiline`] this only returns the placeholder; the
/// writer adds the block carrying the real value.
pub fn quote_string(s: &str) -> String {
    match quote_style(s) {
        QuoteStyle::Bare => s.to_owned(),
        QuoteStyle::Quoted(d) => wrap(s, d),
        QuoteStyle::Multiline => wrap(&multiline_placeholder(s), Delimiter::Backtick),
    }
}

/// The stand-in value written in place of a multiline string: backticks
/// become `'` and line breaks become spaces.
///
/// It does not read back to the original. The reader matches it against the
/// `<NAME` block that follows to restore the value.
pub fn multiline_placeholder(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '`' => '\'',
            '\n' | '\r' => ' ',
            c => c,
        })
        .collect()
}

fn wrap(s: &str, delimiter: Delimiter) -> String {
    let d = delimiter.as_char();
    let mut out = String::with_capacity(s.len() + 2);
    out.push(d);
    out.push_str(s);
    out.push(d);
    out
}

#[test]
fn quote_plain_strings() {
    assert_eq!(quote_string("Okay this is a string"), "\"Okay this is a string\"");
    assert_eq!(quote_string(""), "\"\"");
    assert_eq!(quote_string("! ok"), "\"! ok\"");
    assert_eq!(quote_string("ok !"), "\"ok !\"");
    assert_eq!(quote_string("!@#$%^&*()_+"), "!@#$%^&*()_+");
    assert_eq!(quote_string("1234{}"), "1234{}");
}

#[test]
fn quote_strings_with_delimiters() {
    assert_eq!(quote_string("''"), "\"''\"");
    assert_eq!(quote_string("'\"'"), "`'\"'`");
    assert_eq!(quote_string("```"), "\"```\"");
    assert_eq!(quote_string("\""), "'\"'");
    assert_eq!(quote_string("'\""), "`'\"`");
    assert_eq!(quote_string("hel\"lo"), "'hel\"lo'");
}

#[test]
fn quote_numeric_looking_strings() {
    assert_eq!(quote_string("0"), "\"0\"");
    assert_eq!(quote_string("-10.5"), "\"-10.5\"");
    assert_eq!(quote_string("3c"), "3c");
}

#[test]
fn multiline_fallback() {
    let all = "'''```\"\"\"";
    assert_eq!(quote_style(all), QuoteStyle::Multiline);
    assert_eq!(quote_string(all), "`''''''\"\"\"`");
    assert_eq!(quote_style("two\nlines"), QuoteStyle::Multiline);
    assert_eq!(quote_string("two\nlines"), "`two lines`");
}

#[test]
fn delimiter_chars() {
    for d in Delimiter::ALL {
        assert_eq!(Delimiter::from_char(d.as_char()), Some(d));
    }
    assert_eq!(Delimiter::from_char('a'), None);
    assert_eq!(Delimiter::from_char('é'), None);
}
