/// Character cursor over the unconsumed part of a SIEVE script (RFC 5228).
///
/// Reads never backtrack: a failed `extract_*` leaves the cursor untouched and
/// returns a [`Mismatch`], so callers probe first or give up on the parse.
/// Lookahead is done on a copy, the cursor is `Copy`.

/// Number of characters of remaining input quoted back in errors.
pub const SNIPPET_LENGTH: usize = 50;

/// A failed read: what was expected and the text found instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub expected: String,
    pub snippet: String,
}

/// Pieces of a length-prefixed literal `{N[+]}CRLF<N bytes>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralParts<'a> {
    pub length: &'a str,
    pub plus: bool,
    pub text: &'a str,
}

/// Pieces of a `text:` multi-line string, each exactly as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiLineParts<'a> {
    /// `text:` in its source spelling.
    pub keyword: &'a str,
    /// Blanks plus either CRLF or a hash comment (which ends in CRLF).
    pub header: &'a str,
    /// Dot-stuffed content lines, each including its CRLF.
    pub body: &'a str,
    /// The closing `.` line.
    pub terminator: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    source: &'a str,
    pos: usize,
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unconsumed text.
    pub fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.source.len()
    }

    pub fn snippet(&self) -> String {
        self.rest().chars().take(SNIPPET_LENGTH).collect()
    }

    pub fn mismatch(&self, expected: impl Into<String>) -> Mismatch {
        Mismatch {
            expected: expected.into(),
            snippet: self.snippet(),
        }
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn is_char(&self, ch: char) -> bool {
        self.peek() == Some(ch)
    }

    /// Case-insensitive prefix test.
    pub fn starts_with(&self, token: &str) -> bool {
        let rest = self.rest().as_bytes();
        rest.len() >= token.len() && rest[..token.len()].eq_ignore_ascii_case(token.as_bytes())
    }

    /// Like [`Cursor::starts_with`], but a token ending in an identifier
    /// character must not run on into a longer identifier (`if` vs `ifx`).
    pub fn starts_with_keyword(&self, token: &str) -> bool {
        if !self.starts_with(token) {
            return false;
        }
        match token.chars().last() {
            Some(last) if is_identifier_char(last) => !self
                .rest()
                .get(token.len()..)
                .and_then(|tail| tail.chars().next())
                .is_some_and(is_identifier_char),
            _ => true,
        }
    }

    fn advance(&mut self, len: usize) -> &'a str {
        let end = (self.pos + len).min(self.source.len());
        let taken = &self.source[self.pos..end];
        self.pos = end;
        taken
    }

    /// Removes `token` (case-insensitive) and returns it in its source spelling.
    pub fn extract(&mut self, token: &str) -> Result<&'a str, Mismatch> {
        if !self.starts_with(token) {
            return Err(self.mismatch(format!("\"{token}\"")));
        }
        Ok(self.advance(token.len()))
    }

    pub fn extract_keyword(&mut self, token: &str) -> Result<&'a str, Mismatch> {
        if !self.starts_with_keyword(token) {
            return Err(self.mismatch(format!("\"{token}\"")));
        }
        Ok(self.advance(token.len()))
    }

    pub fn extract_char(&mut self, ch: char) -> Result<char, Mismatch> {
        if !self.is_char(ch) {
            return Err(self.mismatch(format!("'{ch}'")));
        }
        self.advance(ch.len_utf8());
        Ok(ch)
    }

    pub fn extract_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let len = self
            .rest()
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map(|(i, _)| i)
            .unwrap_or_else(|| self.rest().len());
        self.advance(len)
    }

    /// Returns the text up to `delimiter` and consumes both.
    pub fn extract_until(&mut self, delimiter: &str) -> Result<&'a str, Mismatch> {
        let Some(idx) = self.rest().find(delimiter) else {
            return Err(self.mismatch(format!("\"{}\"", delimiter.escape_debug())));
        };
        let text = self.advance(idx);
        self.advance(delimiter.len());
        Ok(text)
    }

    /// Reads `digits [K|M|G]`, keeping the digits as written.
    pub fn extract_number(&mut self) -> Result<(&'a str, Option<char>), Mismatch> {
        let mut look = *self;
        let digits = look.extract_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return Err(self.mismatch("number"));
        }
        let unit = match look.peek() {
            Some(c @ ('K' | 'k' | 'M' | 'm' | 'G' | 'g')) => {
                look.advance(1);
                Some(c)
            }
            _ => None,
        };
        *self = look;
        Ok((digits, unit))
    }

    /// Reads a quoted string and returns its body with escapes untouched.
    pub fn extract_quoted(&mut self) -> Result<&'a str, Mismatch> {
        if !self.is_char('"') {
            return Err(self.mismatch("quoted string"));
        }
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => i += 2,
                b'"' => {
                    let raw = &rest[1..i];
                    self.advance(i + 1);
                    return Ok(raw);
                }
                _ => i += 1,
            }
        }
        Err(self.mismatch("closing '\"'"))
    }

    /// Reads `{N[+]}CRLF` followed by exactly N bytes. The payload is counted,
    /// never scanned, so it may contain CRLF, quotes or braces.
    pub fn extract_literal(&mut self) -> Result<LiteralParts<'a>, Mismatch> {
        let mut look = *self;
        look.extract_char('{')?;
        let length = look.extract_while(|c| c.is_ascii_digit());
        if length.is_empty() {
            return Err(look.mismatch("literal length"));
        }
        let plus = look.is_char('+');
        if plus {
            look.advance(1);
        }
        look.extract_char('}')?;
        look.extract("\r\n")?;

        let count: usize = length
            .parse()
            .map_err(|_| look.mismatch("literal length"))?;
        let text = look
            .rest()
            .get(..count)
            .ok_or_else(|| look.mismatch(format!("{count} bytes of literal data")))?;
        look.advance(count);

        *self = look;
        Ok(LiteralParts { length, plus, text })
    }

    /// Reads `text:` [blanks] (hash-comment / CRLF) *line "." CRLF.
    pub fn extract_multiline(&mut self) -> Result<MultiLineParts<'a>, Mismatch> {
        let mut look = *self;
        let keyword = look.extract("text:")?;

        let header_start = look.pos;
        look.extract_while(|c| c == ' ' || c == '\t');
        if look.is_char('#') {
            look.extract_until("\r\n")?;
        } else {
            look.extract("\r\n")?;
        }
        let header = &look.source[header_start..look.pos];

        let body_start = look.pos;
        loop {
            let rest = look.rest();
            if rest == "." || rest.starts_with(".\r\n") {
                let body = &look.source[body_start..look.pos];
                let terminator = look.advance(rest.len().min(3));
                *self = look;
                return Ok(MultiLineParts {
                    keyword,
                    header,
                    body,
                    terminator,
                });
            }
            match rest.find("\r\n") {
                Some(end) => {
                    look.advance(end + 2);
                }
                None => return Err(look.mismatch("\".\" closing the multi-line string")),
            }
        }
    }

    /// True if whitespace or a comment starts here.
    pub fn is_dead_code(&self) -> bool {
        self.is_char(' ')
            || self.is_char('\t')
            || self.is_char('#')
            || self.starts_with("\r\n")
            || self.starts_with("/*")
    }

    /// Skips whitespace and comments without recording them. Lookahead only.
    pub fn skip_dead_code(&mut self) {
        loop {
            if self.is_char(' ') || self.is_char('\t') {
                self.extract_while(|c| c == ' ' || c == '\t');
            } else if self.starts_with("\r\n") {
                self.advance(2);
            } else if self.is_char('#') {
                if self.extract_until("\r\n").is_err() {
                    self.advance(self.rest().len());
                }
            } else if self.starts_with("/*") {
                let mut look = *self;
                look.advance(2);
                if look.extract_until("*/").is_err() {
                    return;
                }
                *self = look;
            } else {
                return;
            }
        }
    }

    pub fn is_string(&self) -> bool {
        self.is_char('"') || self.is_char('{') || self.starts_with("text:")
    }

    fn skip_string(&mut self) -> bool {
        if self.is_char('"') {
            return self.extract_quoted().is_ok();
        }
        if self.is_char('{') {
            return self.extract_literal().is_ok();
        }
        self.starts_with("text:") && self.extract_multiline().is_ok()
    }

    fn skip_string_list(&mut self) -> bool {
        let mut look = *self;
        if look.extract_char('[').is_err() {
            return false;
        }
        loop {
            look.skip_dead_code();
            if !look.skip_string() {
                return false;
            }
            look.skip_dead_code();
            if look.extract_char(',').is_ok() {
                continue;
            }
            if look.extract_char(']').is_ok() {
                *self = look;
                return true;
            }
            return false;
        }
    }

    /// Skips one string, string list or number. Used to count how many
    /// positional values follow before deciding on optional parameters.
    pub fn skip_value(&mut self) -> bool {
        if self.is_char('[') {
            return self.skip_string_list();
        }
        self.skip_string() || self.extract_number().is_ok()
    }
}

/// Decodes the body of a quoted string: `\x` stands for `x`.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Drops one leading dot from every line of a multi-line body, and its final CRLF.
pub fn unstuff(body: &str) -> String {
    let text = body.strip_suffix("\r\n").unwrap_or(body);
    text.split("\r\n")
        .map(|line| line.strip_prefix('.').unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\r\n")
}

/// Inverse of [`unstuff`].
pub fn stuff(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut body = text
        .split("\r\n")
        .map(|line| {
            if line.starts_with('.') {
                format!(".{line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\r\n");
    body.push_str("\r\n");
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_boundary() {
        let cursor = Cursor::new("ifx");
        assert!(cursor.starts_with("if"));
        assert!(!cursor.starts_with_keyword("if"));
        assert!(Cursor::new("IF true").starts_with_keyword("if"));
        assert!(Cursor::new(":is\"x\"").starts_with_keyword(":is"));
    }

    #[test]
    fn test_extract_keeps_source_spelling() {
        let mut cursor = Cursor::new("KeEp;");
        assert_eq!(cursor.extract("keep").unwrap(), "KeEp");
        assert_eq!(cursor.rest(), ";");
    }

    #[test]
    fn test_failed_extract_does_not_move() {
        let mut cursor = Cursor::new("discard;");
        let err = cursor.extract("keep").unwrap_err();
        assert_eq!(err.snippet, "discard;");
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_snippet_is_bounded() {
        let text = "x".repeat(200);
        assert_eq!(Cursor::new(&text).snippet().len(), SNIPPET_LENGTH);
    }

    #[test]
    fn test_number_with_suffix() {
        let mut cursor = Cursor::new("100K;");
        assert_eq!(cursor.extract_number().unwrap(), ("100", Some('K')));
        assert_eq!(cursor.rest(), ";");
        assert!(Cursor::new("K").extract_number().is_err());
    }

    #[test]
    fn test_quoted_string_escapes() {
        let mut cursor = Cursor::new(r#""a \"b\" \\c" rest"#);
        let raw = cursor.extract_quoted().unwrap();
        assert_eq!(raw, r#"a \"b\" \\c"#);
        assert_eq!(unescape(raw), r#"a "b" \c"#);
        assert_eq!(escape(&unescape(raw)), raw);
        assert_eq!(cursor.rest(), " rest");
    }

    #[test]
    fn test_unterminated_quoted_string() {
        let mut cursor = Cursor::new("\"abc");
        assert!(cursor.extract_quoted().is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_literal_counts_bytes() {
        let mut cursor = Cursor::new("{11+}\r\nhello world;");
        let literal = cursor.extract_literal().unwrap();
        assert_eq!(literal.text, "hello world");
        assert_eq!(literal.length, "11");
        assert!(literal.plus);
        assert_eq!(cursor.rest(), ";");
    }

    #[test]
    fn test_literal_payload_may_contain_crlf_and_braces() {
        let mut cursor = Cursor::new("{6}\r\n{}\r\n\"\"x");
        let literal = cursor.extract_literal().unwrap();
        assert_eq!(literal.text, "{}\r\n\"\"");
        assert!(!literal.plus);
        assert_eq!(cursor.rest(), "x");
    }

    #[test]
    fn test_literal_too_short() {
        let mut cursor = Cursor::new("{20}\r\nshort");
        assert!(cursor.extract_literal().is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_multiline_string() {
        let mut cursor = Cursor::new("text: # note\r\nline one\r\n..dotted\r\n.\r\n;");
        let parts = cursor.extract_multiline().unwrap();
        assert_eq!(parts.keyword, "text:");
        assert_eq!(parts.header, " # note\r\n");
        assert_eq!(parts.body, "line one\r\n..dotted\r\n");
        assert_eq!(parts.terminator, ".\r\n");
        assert_eq!(unstuff(parts.body), "line one\r\n.dotted");
        assert_eq!(stuff(&unstuff(parts.body)), parts.body);
        assert_eq!(cursor.rest(), ";");
    }

    #[test]
    fn test_multiline_unterminated() {
        let mut cursor = Cursor::new("text:\r\nno end\r\n");
        assert!(cursor.extract_multiline().is_err());
    }

    #[test]
    fn test_skip_dead_code() {
        let mut cursor = Cursor::new(" \t# c\r\n/* x */\r\nkeep;");
        cursor.skip_dead_code();
        assert_eq!(cursor.rest(), "keep;");
    }

    #[test]
    fn test_skip_value() {
        let mut cursor = Cursor::new("[\"a\", \"b\"] \"c\"");
        assert!(cursor.skip_value());
        cursor.skip_dead_code();
        assert!(cursor.skip_value());
        assert!(cursor.is_empty());
        assert!(!Cursor::new(":tag").skip_value());
    }

    #[test]
    fn test_unstuff_drops_any_leading_dot() {
        assert_eq!(unstuff(".x\r\n..y\r\nz\r\n"), "x\r\n.y\r\nz");
        assert_eq!(unstuff("...\r\n"), "..");
    }
}
