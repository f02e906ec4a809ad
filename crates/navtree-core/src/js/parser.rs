//! Parser for the JavaScript subset used by navigation scripts.
//!
//! Accepts a sequence of `var NAME = VALUE;` statements where values are
//! `null`, integers, single- or double-quoted strings, arrays and objects.
//! Line (`//`) and block (`/* */`) comments are skipped.

/// A parsed JavaScript literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JsValue {
    /// `null`.
    Null,
    /// Integer literal.
    Number(i64),
    /// String literal with escapes resolved.
    String(String),
    /// Array literal.
    Array(Vec<JsValue>),
    /// Object literal in source order.
    Object(Vec<(String, JsValue)>),
}

impl JsValue {
    /// Short description of the value kind for error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

/// A `var NAME = VALUE;` statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Statement {
    /// Variable name.
    pub name: String,
    /// Assigned value.
    pub value: JsValue,
}

/// All statements of a script, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    /// Parsed statements.
    pub statements: Vec<Statement>,
}

impl Script {
    /// Value assigned to `name`. The last assignment wins.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&JsValue> {
        self.statements
            .iter()
            .rev()
            .find(|s| s.name == name)
            .map(|s| &s.value)
    }
}

/// Syntax error with a 1-based source position.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    /// Line number (1-based).
    pub line: usize,
    /// Column number in characters (1-based).
    pub column: usize,
    /// What went wrong.
    pub message: String,
}

/// Parse a navigation script.
///
/// # Errors
///
/// Returns [`ParseError`] at the first construct outside the supported subset.
///
/// # Example
///
/// ```
/// use navtree_core::js::{JsValue, parse_script};
///
/// let script = parse_script("var hierarchy = [ [ \"Layer\", \"classarmnn_1_1_layer.xhtml\", null ] ];").unwrap();
/// let Some(JsValue::Array(nodes)) = script.get("hierarchy") else { panic!() };
/// assert_eq!(nodes.len(), 1);
/// ```
pub fn parse_script(source: &str) -> Result<Script, ParseError> {
    Parser::new(source).script()
}

/// Deepest array/object nesting accepted before parsing fails.
pub const MAX_NESTING: usize = 256;

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    fn script(mut self) -> Result<Script, ParseError> {
        let mut statements = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek().is_none() {
                break;
            }
            statements.push(self.statement()?);
        }
        Ok(Script { statements })
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        let keyword = self.identifier()?;
        if keyword != "var" {
            return Err(self.error(format!("expected `var`, found `{keyword}`")));
        }
        self.skip_trivia()?;
        let name = self.identifier()?;
        self.skip_trivia()?;
        self.expect('=')?;
        self.skip_trivia()?;
        let value = self.value()?;
        self.skip_trivia()?;
        if self.peek() == Some(';') {
            self.bump();
        }
        Ok(Statement { name, value })
    }

    fn value(&mut self) -> Result<JsValue, ParseError> {
        match self.peek() {
            Some('[') => self.nested(Self::array),
            Some('{') => self.nested(Self::object),
            Some(quote @ ('"' | '\'')) => self.string(quote).map(JsValue::String),
            Some(c) if c == '-' || c.is_ascii_digit() => self.number(),
            Some(c) if is_ident_start(c) => {
                let word = self.identifier()?;
                if word == "null" {
                    Ok(JsValue::Null)
                } else {
                    Err(self.error(format!("unexpected identifier `{word}`")))
                }
            }
            Some(c) => Err(self.error(format!("unexpected character `{c}`"))),
            None => Err(self.error("unexpected end of input".to_owned())),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<JsValue, ParseError>,
    ) -> Result<JsValue, ParseError> {
        if self.depth == MAX_NESTING {
            return Err(self.error(format!("nesting deeper than {MAX_NESTING} levels")));
        }
        self.depth += 1;
        let value = parse(self);
        self.depth -= 1;
        value
    }

    fn array(&mut self) -> Result<JsValue, ParseError> {
        self.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(']') {
                self.bump();
                return Ok(JsValue::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                _ => return Err(self.error("expected `,` or `]` in array".to_owned())),
            }
        }
    }

    fn object(&mut self) -> Result<JsValue, ParseError> {
        self.expect('{')?;
        let mut fields = Vec::new();
        loop {
            self.skip_trivia()?;
            let key = match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(JsValue::Object(fields));
                }
                Some(quote @ ('"' | '\'')) => self.string(quote)?,
                Some(c) if is_ident_start(c) => self.identifier()?,
                _ => return Err(self.error("expected object key".to_owned())),
            };
            self.skip_trivia()?;
            self.expect(':')?;
            self.skip_trivia()?;
            let value = self.value()?;
            fields.push((key, value));
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('}') => {}
                _ => return Err(self.error("expected `,` or `}` in object".to_owned())),
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<String, ParseError> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => return Err(self.error("unterminated string".to_owned())),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self) -> Result<char, ParseError> {
        let c = self
            .bump()
            .ok_or_else(|| self.error("unterminated escape".to_owned()))?;
        Ok(match c {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'b' => '\u{8}',
            'f' => '\u{c}',
            '0' => '\0',
            'u' => return self.unicode_escape(),
            // \" \' \\ \/ and any other escaped character map to themselves
            other => other,
        })
    }

    fn unicode_escape(&mut self) -> Result<char, ParseError> {
        let high = self.hex4()?;
        if !(0xD800..0xDC00).contains(&high) {
            return char::from_u32(high)
                .ok_or_else(|| self.error(format!("invalid code point \\u{high:04x}")));
        }
        // Surrogate pair: a low surrogate escape must follow
        if self.bump() != Some('\\') || self.bump() != Some('u') {
            return Err(self.error("unpaired surrogate in string".to_owned()));
        }
        let low = self.hex4()?;
        if !(0xDC00..0xE000).contains(&low) {
            return Err(self.error("unpaired surrogate in string".to_owned()));
        }
        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        char::from_u32(code).ok_or_else(|| self.error("invalid surrogate pair".to_owned()))
    }

    fn hex4(&mut self) -> Result<u32, ParseError> {
        let mut code = 0;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid \\u escape".to_owned()))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    fn number(&mut self) -> Result<JsValue, ParseError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') {
            return Err(self.error("fractional numbers are not supported".to_owned()));
        }
        let text = &self.src[start..self.pos];
        text.parse()
            .map(JsValue::Number)
            .map_err(|_| self.error(format!("invalid number `{text}`")))
    }

    fn identifier(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some(c) if is_ident_start(c) => {
                self.bump();
            }
            _ => return Err(self.error("expected identifier".to_owned())),
        }
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        {
            self.bump();
        }
        Ok(self.src[start..self.pos].to_owned())
    }

    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            let rest = &self.src[self.pos..];
            if rest.starts_with("//") {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
            } else if rest.starts_with("/*") {
                let (line, column) = (self.line, self.column);
                self.bump();
                self.bump();
                loop {
                    if self.src[self.pos..].starts_with("*/") {
                        self.bump();
                        self.bump();
                        break;
                    }
                    if self.bump().is_none() {
                        return Err(ParseError {
                            line,
                            column,
                            message: "unterminated block comment".to_owned(),
                        });
                    }
                }
            } else if self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            } else {
                return Ok(());
            }
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected `{expected}`")))
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: String) -> ParseError {
        ParseError {
            line: self.line,
            column: self.column,
            message,
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn string(s: &str) -> JsValue {
        JsValue::String(s.to_owned())
    }

    #[test]
    fn test_parse_empty_script() {
        let script = parse_script("  \n// nothing here\n").unwrap();
        assert!(script.statements.is_empty());
    }

    #[test]
    fn test_parse_node_array() {
        let src = r#"
var _types_8hpp =
[
    [ "IBackend", "classarmnn_1_1_i_backend.xhtml", "classarmnn_1_1_i_backend" ],
    [ "ProfilingDynamicGuid", "structarmnn_1_1profiling_1_1_profiling_dynamic_guid.xhtml", null ]
];
"#;
        let script = parse_script(src).unwrap();

        assert_eq!(script.statements.len(), 1);
        assert_eq!(script.statements[0].name, "_types_8hpp");
        assert_eq!(
            script.get("_types_8hpp"),
            Some(&JsValue::Array(vec![
                JsValue::Array(vec![
                    string("IBackend"),
                    string("classarmnn_1_1_i_backend.xhtml"),
                    string("classarmnn_1_1_i_backend"),
                ]),
                JsValue::Array(vec![
                    string("ProfilingDynamicGuid"),
                    string("structarmnn_1_1profiling_1_1_profiling_dynamic_guid.xhtml"),
                    JsValue::Null,
                ]),
            ]))
        );
    }

    #[test]
    fn test_parse_multiple_statements_and_single_quotes() {
        let src = "var A = 'click to disable';\nvar B = \"x\"\nvar C = null;";
        let script = parse_script(src).unwrap();

        assert_eq!(script.get("A"), Some(&string("click to disable")));
        assert_eq!(script.get("B"), Some(&string("x")));
        assert_eq!(script.get("C"), Some(&JsValue::Null));
        assert_eq!(script.get("D"), None);
    }

    #[test]
    fn test_parse_block_comment_header() {
        let src = "/*\n @licstart  The following is the entire license notice\n*/\nvar NAVTREE = [];";
        let script = parse_script(src).unwrap();
        assert_eq!(script.get("NAVTREE"), Some(&JsValue::Array(Vec::new())));
    }

    #[test]
    fn test_parse_object_with_numbers() {
        let src = r#"var NAVTREEINDEX0 = { "_abs_8hpp.xhtml":[2,4,0], key:[-1] };"#;
        let script = parse_script(src).unwrap();

        assert_eq!(
            script.get("NAVTREEINDEX0"),
            Some(&JsValue::Object(vec![
                (
                    "_abs_8hpp.xhtml".to_owned(),
                    JsValue::Array(vec![
                        JsValue::Number(2),
                        JsValue::Number(4),
                        JsValue::Number(0)
                    ])
                ),
                ("key".to_owned(), JsValue::Array(vec![JsValue::Number(-1)])),
            ]))
        );
    }

    #[test]
    fn test_parse_trailing_comma() {
        let script = parse_script(r#"var x = [ "a", "b", ];"#).unwrap();
        assert_eq!(
            script.get("x"),
            Some(&JsValue::Array(vec![string("a"), string("b")]))
        );
    }

    #[test]
    fn test_parse_escapes() {
        let src = r#"var x = "hash< armnn::Guid > \"q\" \\ \/ \né😀";"#;
        let script = parse_script(src).unwrap();
        assert_eq!(
            script.get("x"),
            Some(&string("hash< armnn::Guid > \"q\" \\ / \né\u{1F600}"))
        );
    }

    #[test]
    fn test_error_position() {
        let err = parse_script("var x = [\n  \"a\" \"b\"\n];").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 7);
        assert!(err.message.contains("expected `,` or `]`"));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("var x = {}{};", "[".repeat(MAX_NESTING), "]".repeat(MAX_NESTING));
        assert!(parse_script(&deep).is_ok());

        let src = format!("var x = {}", "[".repeat(100_000));
        let err = parse_script(&src).unwrap_err();
        assert_eq!((err.line, err.column), (1, 9 + MAX_NESTING));
        assert!(err.message.contains("nesting deeper than 256 levels"));
    }

    #[test]
    fn test_error_unterminated_string() {
        let err = parse_script("var x = \"abc").unwrap_err();
        assert!(err.message.contains("unterminated string"));
    }

    #[test]
    fn test_error_unterminated_comment() {
        let err = parse_script("/* open\nvar x = 1;").unwrap_err();
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn test_error_unknown_keyword() {
        let err = parse_script("let x = 1;").unwrap_err();
        assert!(err.message.contains("expected `var`"));
        let err = parse_script("var x = true;").unwrap_err();
        assert!(err.message.contains("unexpected identifier `true`"));
    }

    #[test]
    fn test_error_fraction() {
        let err = parse_script("var x = 1.5;").unwrap_err();
        assert!(err.message.contains("fractional"));
    }

    #[test]
    fn test_error_display() {
        let err = parse_script("var = 1").unwrap_err();
        assert_eq!(err.to_string(), "1:5: expected identifier");
    }
}
