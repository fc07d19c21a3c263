//! Tokenizer and recursive-descent parser.
//!
//! The grammar is intentionally wider than what the evaluator accepts: it
//! produces calls, names, attribute access, comparisons, boolean operators,
//! strings and collections so that the evaluator can refuse them by kind.
//! Anything the grammar does not know at all is a syntax error.

use lazy_static::lazy_static;
use regex::Regex;

use super::error::EvalError;

/// Nesting limit for parentheses, brackets and prefix operators.
const MAX_DEPTH: usize = 100;

/// Token limit; keeps the tree shallow enough for a recursive walk.
const MAX_TOKENS: usize = 4096;

lazy_static! {
    /// Decimal integer or float literal with optional exponent.
    static ref NUMBER: Regex = Regex::new(
        r"^(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?"
    ).unwrap();

    /// Identifier or keyword.
    static ref NAME: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap();
}

/// Operators and punctuation, longest first.
const SYMBOLS: &[&str] = &[
    "**", "//", "<<", ">>", "<=", ">=", "==", "!=", "+", "-", "*", "/", "%", "@", "&", "|", "^",
    "~", "<", ">", "(", ")", "[", "]", ",", ".",
];

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(String),
    Str(String),
    Name(String),
    Symbol(&'static str),
    End,
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

/// A literal as written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i128),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Invert,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    MatMul,
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
}

/// Expression tree produced by [`parse`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    BoolOp {
        op: BoolOp,
        values: Vec<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<CompareOp>,
        comparators: Vec<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
}

impl Expr {
    /// Short name of the node kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Literal(_) => "literal",
            Self::Name(_) => "name",
            Self::Unary { .. } => "unary operator",
            Self::Binary { .. } => "binary operator",
            Self::BoolOp { .. } => "boolean operator",
            Self::Compare { .. } => "comparison",
            Self::Call { .. } => "call",
            Self::Attribute { .. } => "attribute access",
            Self::Subscript { .. } => "subscript",
            Self::Tuple(_) => "tuple",
            Self::List(_) => "list",
        }
    }
}

/// Parse `input` into an expression tree.
pub fn parse(input: &str) -> Result<Expr, EvalError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };

    if parser.peek() == &TokenKind::End {
        return Err(EvalError::syntax(0, "empty expression"));
    }

    let expr = parser.expression()?;
    match parser.peek() {
        TokenKind::End => Ok(expr),
        _ => Err(parser.unexpected()),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    while offset < input.len() {
        let rest = &input[offset..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        if c.is_whitespace() {
            offset += c.len_utf8();
            continue;
        }

        if tokens.len() >= MAX_TOKENS {
            return Err(EvalError::syntax(offset, "expression too long"));
        }

        let (kind, len) = if let Some(m) = NUMBER.find(rest) {
            let text = m.as_str();
            check_number(text, offset)?;
            // "1abc" or "2e" run straight into an identifier
            if rest[m.end()..]
                .chars()
                .next()
                .is_some_and(|next| next.is_alphanumeric() || next == '_')
            {
                return Err(EvalError::syntax(offset, "invalid number literal"));
            }
            (TokenKind::Number(text.to_string()), m.end())
        } else if let Some(m) = NAME.find(rest) {
            (TokenKind::Name(m.as_str().to_string()), m.end())
        } else if c == '\'' || c == '"' {
            let (text, len) = read_string(rest, c, offset)?;
            (TokenKind::Str(text), len)
        } else if let Some(symbol) = SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            (TokenKind::Symbol(*symbol), symbol.len())
        } else {
            return Err(EvalError::syntax(
                offset,
                format!("unexpected character '{}'", c),
            ));
        };

        tokens.push(Token { kind, offset });
        offset += len;
    }

    tokens.push(Token {
        kind: TokenKind::End,
        offset: input.len(),
    });
    Ok(tokens)
}

/// Reject decimal integers with leading zeros ("07"), which are ambiguous
/// with octal notation. "0", "00" and "07.5" are fine.
fn check_number(text: &str, offset: usize) -> Result<(), EvalError> {
    let is_integer = text.bytes().all(|b| b.is_ascii_digit());
    if is_integer && text.starts_with('0') && text.bytes().any(|b| b != b'0') {
        return Err(EvalError::syntax(
            offset,
            "leading zeros in integer literals are not permitted",
        ));
    }
    Ok(())
}

/// Read a quoted string starting at the opening quote. Returns the contents
/// and the consumed byte length.
fn read_string(rest: &str, quote: char, offset: usize) -> Result<(String, usize), EvalError> {
    let mut text = String::new();
    let mut chars = rest.char_indices().skip(1);

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    text.push(escaped);
                }
            }
            c if c == quote => return Ok((text, i + c.len_utf8())),
            '\n' => break,
            c => text.push(c),
        }
    }

    Err(EvalError::syntax(offset, "unterminated string literal"))
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos].kind
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].offset
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.tokens[self.pos].kind.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        kind
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if matches!(self.peek(), TokenKind::Symbol(s) if *s == symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), TokenKind::Name(n) if n == keyword) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<(), EvalError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> EvalError {
        let message = match self.peek() {
            TokenKind::End => "unexpected end of expression".to_string(),
            TokenKind::Number(n) => format!("unexpected number '{}'", n),
            TokenKind::Str(_) => "unexpected string".to_string(),
            TokenKind::Name(n) => format!("unexpected name '{}'", n),
            TokenKind::Symbol(s) => format!("unexpected '{}'", s),
        };
        EvalError::syntax(self.offset(), message)
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::syntax(self.offset(), "expression nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expression(&mut self) -> Result<Expr, EvalError> {
        self.or_expr()
    }

    fn or_expr(&mut self) -> Result<Expr, EvalError> {
        let first = self.and_expr()?;
        let mut values = vec![first];
        while self.eat_keyword("or") {
            values.push(self.and_expr()?);
        }
        Ok(collapse_bool(BoolOp::Or, values))
    }

    fn and_expr(&mut self) -> Result<Expr, EvalError> {
        let first = self.not_expr()?;
        let mut values = vec![first];
        while self.eat_keyword("and") {
            values.push(self.not_expr()?);
        }
        Ok(collapse_bool(BoolOp::And, values))
    }

    fn not_expr(&mut self) -> Result<Expr, EvalError> {
        if self.eat_keyword("not") {
            self.enter()?;
            let operand = self.not_expr()?;
            self.leave();
            return Ok(Expr::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            });
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expr, EvalError> {
        let left = self.bit_or()?;
        let mut ops = Vec::new();
        let mut comparators = Vec::new();

        loop {
            let op = match self.peek() {
                TokenKind::Symbol("==") => CompareOp::Eq,
                TokenKind::Symbol("!=") => CompareOp::NotEq,
                TokenKind::Symbol("<") => CompareOp::Lt,
                TokenKind::Symbol("<=") => CompareOp::LtE,
                TokenKind::Symbol(">") => CompareOp::Gt,
                TokenKind::Symbol(">=") => CompareOp::GtE,
                _ => break,
            };
            self.advance();
            ops.push(op);
            comparators.push(self.bit_or()?);
        }

        if ops.is_empty() {
            Ok(left)
        } else {
            Ok(Expr::Compare {
                left: Box::new(left),
                ops,
                comparators,
            })
        }
    }

    fn bit_or(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(&[("|", BinaryOp::BitOr)], Self::bit_xor)
    }

    fn bit_xor(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(&[("^", BinaryOp::BitXor)], Self::bit_and)
    }

    fn bit_and(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(&[("&", BinaryOp::BitAnd)], Self::shift)
    }

    fn shift(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(
            &[("<<", BinaryOp::LShift), (">>", BinaryOp::RShift)],
            Self::arith,
        )
    }

    fn arith(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(&[("+", BinaryOp::Add), ("-", BinaryOp::Sub)], Self::term)
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        self.binary_level(
            &[
                ("*", BinaryOp::Mul),
                ("/", BinaryOp::Div),
                ("//", BinaryOp::FloorDiv),
                ("%", BinaryOp::Mod),
                ("@", BinaryOp::MatMul),
            ],
            Self::factor,
        )
    }

    /// One left-associative precedence level.
    fn binary_level(
        &mut self,
        ops: &[(&str, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, EvalError>,
    ) -> Result<Expr, EvalError> {
        let mut left = next(self)?;

        loop {
            let op = match self.peek() {
                TokenKind::Symbol(s) => ops.iter().find(|(sym, _)| sym == s).map(|(_, op)| *op),
                _ => None,
            };
            let Some(op) = op else {
                break;
            };
            self.advance();
            let right = next(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn factor(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            TokenKind::Symbol("+") => Some(UnaryOp::Plus),
            TokenKind::Symbol("-") => Some(UnaryOp::Minus),
            TokenKind::Symbol("~") => Some(UnaryOp::Invert),
            _ => None,
        };

        match op {
            Some(op) => {
                self.advance();
                self.enter()?;
                let operand = self.factor()?;
                self.leave();
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                })
            }
            None => self.power(),
        }
    }

    /// `primary ['**' factor]`; the exponent may carry its own sign and
    /// nests to the right.
    fn power(&mut self) -> Result<Expr, EvalError> {
        let base = self.primary()?;
        if self.eat_symbol("**") {
            self.enter()?;
            let exponent = self.factor()?;
            self.leave();
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, EvalError> {
        let mut expr = self.atom()?;

        loop {
            if self.eat_symbol("(") {
                self.enter()?;
                let args = self.sequence(")")?;
                self.leave();
                expr = Expr::Call {
                    func: Box::new(expr),
                    args,
                };
            } else if self.eat_symbol("[") {
                self.enter()?;
                let index = self.expression()?;
                self.expect_symbol("]")?;
                self.leave();
                expr = Expr::Subscript {
                    value: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.eat_symbol(".") {
                let TokenKind::Name(attr) = self.peek().clone() else {
                    return Err(self.unexpected());
                };
                self.advance();
                expr = Expr::Attribute {
                    value: Box::new(expr),
                    attr,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn atom(&mut self) -> Result<Expr, EvalError> {
        let offset = self.offset();
        match self.peek().clone() {
            TokenKind::Number(text) => {
                self.advance();
                Ok(Expr::Literal(number_literal(&text, offset)?))
            }
            TokenKind::Str(text) => {
                self.advance();
                Ok(Expr::Literal(Literal::Str(text)))
            }
            TokenKind::Name(name) => {
                // Keywords that cannot start an operand
                if matches!(name.as_str(), "and" | "or" | "not") {
                    return Err(self.unexpected());
                }
                self.advance();
                Ok(match name.as_str() {
                    "True" => Expr::Literal(Literal::Bool(true)),
                    "False" => Expr::Literal(Literal::Bool(false)),
                    "None" => Expr::Literal(Literal::None),
                    _ => Expr::Name(name),
                })
            }
            TokenKind::Symbol("(") => {
                self.advance();
                self.enter()?;
                let expr = self.parenthesized()?;
                self.leave();
                Ok(expr)
            }
            TokenKind::Symbol("[") => {
                self.advance();
                self.enter()?;
                let items = self.sequence("]")?;
                self.leave();
                Ok(Expr::List(items))
            }
            _ => Err(self.unexpected()),
        }
    }

    /// After an opening parenthesis: a grouped expression or a tuple.
    fn parenthesized(&mut self) -> Result<Expr, EvalError> {
        if self.eat_symbol(")") {
            return Ok(Expr::Tuple(Vec::new()));
        }

        let first = self.expression()?;
        if self.eat_symbol(")") {
            return Ok(first);
        }

        self.expect_symbol(",")?;
        let mut items = vec![first];
        items.extend(self.sequence(")")?);
        Ok(Expr::Tuple(items))
    }

    /// Comma-separated expressions up to `close`, trailing comma allowed.
    fn sequence(&mut self, close: &str) -> Result<Vec<Expr>, EvalError> {
        let mut items = Vec::new();
        loop {
            if self.eat_symbol(close) {
                return Ok(items);
            }
            items.push(self.expression()?);
            if !self.eat_symbol(",") {
                self.expect_symbol(close)?;
                return Ok(items);
            }
        }
    }
}

fn collapse_bool(op: BoolOp, mut values: Vec<Expr>) -> Expr {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Expr::BoolOp { op, values }
    }
}

fn number_literal(text: &str, offset: usize) -> Result<Literal, EvalError> {
    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text
            .parse::<i128>()
            .map(Literal::Int)
            .map_err(|_| EvalError::IntegerOverflow);
    }

    text.parse::<f64>()
        .map(Literal::Float)
        .map_err(|_| EvalError::syntax(offset, format!("invalid number literal '{}'", text)))
}
