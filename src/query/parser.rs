use super::ast::{CompareOp, Expr};
use crate::date::DateKey;
use crate::error::{Error, Result};

/// Bound on both parenthesis nesting and the height of the built tree, so
/// parsing, evaluation and drop stay well inside the stack.
pub const MAX_DEPTH: usize = 256;

pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            nesting: 0,
        }
    }

    pub fn parse(mut self) -> Result<Expr> {
        self.skip_whitespace();
        if self.at_end() {
            return Ok(Expr::Empty);
        }

        let (expr, _) = self.parse_or()?;
        self.skip_whitespace();
        if !self.at_end() {
            return Err(self.error(format!("Unexpected '{}' after condition", self.current_char())));
        }
        Ok(expr)
    }

    // The parse_* methods return the subtree with its height.

    fn parse_or(&mut self) -> Result<(Expr, usize)> {
        let (mut left, mut height) = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if !self.match_keyword("OR") {
                break;
            }
            self.expect_operand("OR")?;
            let (right, right_height) = self.parse_and()?;
            height = self.join_height(height, right_height)?;
            left = Expr::or(left, right);
        }
        Ok((left, height))
    }

    fn parse_and(&mut self) -> Result<(Expr, usize)> {
        let (mut left, mut height) = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            if !self.match_keyword("AND") {
                break;
            }
            self.expect_operand("AND")?;
            let (right, right_height) = self.parse_primary()?;
            height = self.join_height(height, right_height)?;
            left = Expr::and(left, right);
        }
        Ok((left, height))
    }

    fn parse_primary(&mut self) -> Result<(Expr, usize)> {
        self.skip_whitespace();

        if self.match_char('(') {
            self.nesting += 1;
            if self.nesting > MAX_DEPTH {
                return Err(self.error("Condition nested too deeply"));
            }
            self.expect_operand("'('")?;
            let parsed = self.parse_or()?;
            self.skip_whitespace();
            if !self.match_char(')') {
                return Err(self.error("Expected ')'"));
            }
            self.nesting -= 1;
            return Ok(parsed);
        }

        self.parse_comparison().map(|expr| (expr, 1))
    }

    fn join_height(&self, left: usize, right: usize) -> Result<usize> {
        let height = left.max(right) + 1;
        if height > MAX_DEPTH {
            return Err(self.error("Condition nested too deeply"));
        }
        Ok(height)
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let start = self.pos;
        let field = self.parse_identifier()?;
        match field {
            "date" => {
                let op = self.parse_operator()?;
                let date = self.parse_date_value()?;
                Ok(Expr::DateCompare { op, date })
            }
            "event" => {
                let op = self.parse_operator()?;
                self.skip_whitespace();
                if !self.match_char('"') {
                    return Err(self.error("Expected quoted event text"));
                }
                let value = self.parse_string()?;
                Ok(Expr::EventCompare { op, value })
            }
            other => Err(Error::syntax(format!("Unknown keyword '{}'", other), start)),
        }
    }

    fn parse_identifier(&mut self) -> Result<&'a str> {
        self.skip_whitespace();
        let start = self.pos;

        while !self.at_end() {
            let c = self.current_char();
            if c.is_alphanumeric() || c == '_' {
                self.advance(c);
            } else {
                break;
            }
        }

        if self.pos == start {
            if self.at_end() {
                return Err(self.error("Expected 'date', 'event' or '('"));
            }
            return Err(self.error(format!("Unexpected '{}'", self.current_char())));
        }

        Ok(&self.input[start..self.pos])
    }

    fn parse_operator(&mut self) -> Result<CompareOp> {
        self.skip_whitespace();

        if self.match_str("==") {
            return Ok(CompareOp::Eq);
        }
        if self.match_str("!=") {
            return Ok(CompareOp::Ne);
        }
        if self.match_str(">=") {
            return Ok(CompareOp::Ge);
        }
        if self.match_str("<=") {
            return Ok(CompareOp::Le);
        }
        if self.match_char('>') {
            return Ok(CompareOp::Gt);
        }
        if self.match_char('<') {
            return Ok(CompareOp::Lt);
        }

        Err(self.error("Expected operator (==, !=, <, <=, >, >=)"))
    }

    fn parse_date_value(&mut self) -> Result<DateKey> {
        self.skip_whitespace();

        // Quoted dates take no escapes, so positions stay raw offsets.
        if self.match_char('"') {
            let date = self.parse_date_literal()?;
            if !self.match_char('"') {
                return Err(self.error("Expected closing '\"' after date"));
            }
            return Ok(date);
        }

        self.parse_date_literal()
    }

    /// `integer '-' integer '-' integer`; the range check is left to
    /// `DateKey`.
    fn parse_date_literal(&mut self) -> Result<DateKey> {
        let start = self.pos;
        self.expect_digits()?;
        for _ in 0..2 {
            if !self.match_char('-') {
                return Err(self.error("Expected '-' in date"));
            }
            self.expect_digits()?;
        }
        self.input[start..self.pos].parse()
    }

    fn expect_digits(&mut self) -> Result<()> {
        let start = self.pos;
        while !self.at_end() && self.current_char().is_ascii_digit() {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("Expected date in YYYY-MM-DD form"));
        }
        Ok(())
    }

    /// Reads up to the closing quote. The opening quote is already consumed.
    fn parse_string(&mut self) -> Result<String> {
        let open = self.pos - 1;
        let mut s = String::new();

        while !self.at_end() {
            let c = self.current_char();
            self.advance(c);
            match c {
                '"' => return Ok(s),
                '\\' if !self.at_end() && matches!(self.current_char(), '"' | '\\') => {
                    let escaped = self.current_char();
                    self.advance(escaped);
                    s.push(escaped);
                }
                _ => s.push(c),
            }
        }

        Err(Error::syntax("Unterminated string", open))
    }

    fn expect_operand(&mut self, after: &str) -> Result<()> {
        self.skip_whitespace();
        if self.at_end() {
            return Err(self.error(format!("Missing operand after {}", after)));
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while !self.at_end() && self.current_char().is_whitespace() {
            let c = self.current_char();
            self.advance(c);
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> char {
        self.input[self.pos..].chars().next().unwrap_or('\0')
    }

    fn advance(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn match_char(&mut self, c: char) -> bool {
        if !self.at_end() && self.current_char() == c {
            self.advance(c);
            true
        } else {
            false
        }
    }

    fn match_str(&mut self, s: &str) -> bool {
        if self.input[self.pos..].starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    fn match_keyword(&mut self, kw: &str) -> bool {
        let remaining = &self.input[self.pos..];
        if !remaining.starts_with(kw) {
            return false;
        }
        let after = remaining[kw.len()..].chars().next();
        if after.map_or(true, |c| !c.is_alphanumeric() && c != '_') {
            self.pos += kw.len();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::syntax(message, self.pos)
    }
}

pub fn parse(input: &str) -> Result<Expr> {
    Parser::new(input).parse()
}
