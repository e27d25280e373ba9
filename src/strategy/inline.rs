//! 行表达式分片算法
//!
//! 表达式形如 `t_order_${order_id % 2}` 或 `ds$->{user_id % 4 / 2}`，
//! 占位符内支持整数字面量、分片列、括号以及 `+ - * / %` 运算。
//! `%` 取非负余数，保证负数分片键也落在合法分片上。
//! 字符串分片键只能直接出现在占位符中，例如 `t_user_${region}`。

use crate::core::error::{ConfigError, ConfigResult, RoutingError, RoutingResult};
use crate::core::value::ShardingValue;
use crate::rule::expression::{pieces, Piece};
use crate::strategy::algorithm::{PreciseShardingAlgorithm, PreciseShardingValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Num(i64),
    Column,
    Neg(Box<Expr>),
    Binary(Op, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Num(i64),
    Ident(String),
    Op(Op),
    LParen,
    RParen,
}

fn tokenize(source: &str, text: &str) -> ConfigResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '0'..='9' => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let literal: String = chars[start..i].iter().collect();
                let n = literal
                    .parse()
                    .map_err(|_| ConfigError::expression(source, format!("整数溢出 '{}'", literal)))?;
                tokens.push(Token::Num(n));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            '+' | '-' | '*' | '/' | '%' => {
                tokens.push(Token::Op(match c {
                    '+' => Op::Add,
                    '-' => Op::Sub,
                    '*' => Op::Mul,
                    '/' => Op::Div,
                    _ => Op::Rem,
                }));
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            other => {
                return Err(ConfigError::expression(source, format!("无法识别的字符 '{}'", other)));
            }
        }
    }
    Ok(tokens)
}

/// 递归下降解析器，`* / %` 优先于 `+ -`
struct Parser<'a> {
    source: &'a str,
    column: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn parse(source: &'a str, column: &'a str, text: &str) -> ConfigResult<Expr> {
        let mut parser = Parser {
            source,
            column,
            tokens: tokenize(source, text)?,
            pos: 0,
        };
        let expr = parser.additive()?;
        if parser.pos != parser.tokens.len() {
            return Err(ConfigError::expression(source, "表达式末尾存在多余内容"));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn additive(&mut self) -> ConfigResult<Expr> {
        let mut left = self.multiplicative()?;
        while let Some(Token::Op(op @ (Op::Add | Op::Sub))) = self.peek().cloned() {
            self.pos += 1;
            let right = self.multiplicative()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> ConfigResult<Expr> {
        let mut left = self.unary()?;
        while let Some(Token::Op(op @ (Op::Mul | Op::Div | Op::Rem))) = self.peek().cloned() {
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> ConfigResult<Expr> {
        if let Some(Token::Op(Op::Sub)) = self.peek() {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> ConfigResult<Expr> {
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| ConfigError::expression(self.source, "表达式不完整"))?;
        self.pos += 1;
        match token {
            Token::Num(n) => Ok(Expr::Num(n)),
            Token::Ident(name) if name.eq_ignore_ascii_case(self.column) => Ok(Expr::Column),
            Token::Ident(name) => Err(ConfigError::expression(
                self.source,
                format!("表达式只能引用分片列 '{}'，实际为 '{}'", self.column, name),
            )),
            Token::LParen => {
                let inner = self.additive()?;
                match self.peek() {
                    Some(Token::RParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(ConfigError::expression(self.source, "括号未闭合")),
                }
            }
            Token::RParen | Token::Op(_) => {
                Err(ConfigError::expression(self.source, "表达式语法错误"))
            }
        }
    }
}

/// 行表达式分片算法
#[derive(Debug, Clone)]
pub struct InlineShardingAlgorithm {
    expression: String,
    segments: Vec<Segment>,
}

impl InlineShardingAlgorithm {
    pub const NAME: &'static str = "inline";

    pub fn new(column: &str, expression: &str) -> ConfigResult<Self> {
        if column.trim().is_empty() {
            return Err(ConfigError::EmptyShardingColumn);
        }
        let mut segments = Vec::new();
        let mut has_placeholder = false;
        for piece in pieces(expression)? {
            match piece {
                Piece::Literal(text) => segments.push(Segment::Literal(text.to_string())),
                Piece::Placeholder(text) => {
                    has_placeholder = true;
                    segments.push(Segment::Expr(Parser::parse(expression, column.trim(), text)?));
                }
            }
        }
        if !has_placeholder {
            return Err(ConfigError::expression(expression, "行表达式至少需要一个占位符"));
        }
        Ok(Self {
            expression: expression.to_string(),
            segments,
        })
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// 计算取值对应的目标名称
    pub fn evaluate(&self, value: &ShardingValue) -> RoutingResult<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Expr(Expr::Column) => match value {
                    ShardingValue::Int(n) => out.push_str(&n.to_string()),
                    ShardingValue::Str(s) => out.push_str(s),
                },
                Segment::Expr(expr) => {
                    let n = value.as_i64().ok_or_else(|| RoutingError::UnsupportedValue {
                        algorithm: Self::NAME.to_string(),
                        value: value.to_string(),
                    })?;
                    out.push_str(&self.eval(expr, n)?.to_string());
                }
            }
        }
        Ok(out)
    }

    fn eval(&self, expr: &Expr, column: i64) -> RoutingResult<i64> {
        let overflow = || self.failure("整数溢出");
        match expr {
            Expr::Num(n) => Ok(*n),
            Expr::Column => Ok(column),
            Expr::Neg(inner) => self.eval(inner, column)?.checked_neg().ok_or_else(overflow),
            Expr::Binary(op, left, right) => {
                let (l, r) = (self.eval(left, column)?, self.eval(right, column)?);
                match op {
                    Op::Add => l.checked_add(r).ok_or_else(overflow),
                    Op::Sub => l.checked_sub(r).ok_or_else(overflow),
                    Op::Mul => l.checked_mul(r).ok_or_else(overflow),
                    Op::Div if r == 0 => Err(self.failure("除数为零")),
                    Op::Div => l.checked_div(r).ok_or_else(overflow),
                    Op::Rem if r == 0 => Err(self.failure("除数为零")),
                    Op::Rem => l.checked_rem_euclid(r).ok_or_else(overflow),
                }
            }
        }
    }

    fn failure(&self, reason: &str) -> RoutingError {
        RoutingError::InlineEvaluation {
            expression: self.expression.clone(),
            reason: reason.to_string(),
        }
    }
}

impl PreciseShardingAlgorithm for InlineShardingAlgorithm {
    fn do_sharding(
        &self,
        available_targets: &[String],
        value: &PreciseShardingValue<'_>,
    ) -> RoutingResult<Option<String>> {
        let target = self.evaluate(value.value)?;
        Ok(available_targets
            .iter()
            .find(|t| t.eq_ignore_ascii_case(&target))
            .cloned())
    }
}
