//! 行表达式
//!
//! 数据节点使用行表达式批量声明，例如 `ds${0..1}.t_order_${0..1}`：
//! - `${a..b}` 展开为 a 到 b（含）的每个整数
//! - `${[x, y, z]}` 展开为列表中的每一项，允许带引号
//! - `$->{...}` 与 `${...}` 等价
//! - 逗号分隔多个表达式，占位符内部的逗号不参与分隔
//!
//! 同一表达式中的多个占位符做笛卡尔积，左侧占位符变化最慢。

use regex::Regex;
use std::sync::OnceLock;

use crate::core::error::{ConfigError, ConfigResult};

/// 单个表达式展开结果的上限
pub const MAX_EXPANSION: usize = 100_000;

fn placeholder_regex(expression: &str) -> ConfigResult<&'static Regex> {
    static PLACEHOLDER: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PLACEHOLDER
        .get_or_init(|| Regex::new(r"\$(?:->)?\{([^{}]*)\}"))
        .as_ref()
        .map_err(|e| ConfigError::expression(expression, e.to_string()))
}

/// 表达式片段
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Piece<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

/// 将单个表达式拆分为字面量与占位符片段
pub(crate) fn pieces(expression: &str) -> ConfigResult<Vec<Piece<'_>>> {
    let mut result = Vec::new();
    let mut last = 0;
    for caps in placeholder_regex(expression)?.captures_iter(expression) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_literal(expression, &expression[last..whole.start()], &mut result)?;
        result.push(Piece::Placeholder(inner.as_str().trim()));
        last = whole.end();
    }
    push_literal(expression, &expression[last..], &mut result)?;
    Ok(result)
}

fn push_literal<'a>(
    expression: &str,
    literal: &'a str,
    out: &mut Vec<Piece<'a>>,
) -> ConfigResult<()> {
    if literal.contains("${") || literal.contains("$->{") {
        return Err(ConfigError::expression(expression, "占位符未闭合"));
    }
    if !literal.is_empty() {
        out.push(Piece::Literal(literal));
    }
    Ok(())
}

/// 按顶层逗号拆分表达式
pub fn split(expression: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in expression.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(expression[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(expression[start..].trim());
    parts
}

/// 展开行表达式，保持声明顺序
pub fn expand(expression: &str) -> ConfigResult<Vec<String>> {
    let mut result = Vec::new();
    for part in split(expression) {
        if part.is_empty() {
            return Err(ConfigError::expression(expression, "存在空的表达式片段"));
        }
        result.extend(expand_one(part)?);
        if result.len() > MAX_EXPANSION {
            return Err(ConfigError::expression(expression, "展开结果过多"));
        }
    }
    Ok(result)
}

fn expand_one(expression: &str) -> ConfigResult<Vec<String>> {
    let mut results = vec![String::new()];
    for piece in pieces(expression)? {
        match piece {
            Piece::Literal(text) => {
                for r in &mut results {
                    r.push_str(text);
                }
            }
            Piece::Placeholder(content) => {
                let values = placeholder_values(expression, content)?;
                if results.len().saturating_mul(values.len()) > MAX_EXPANSION {
                    return Err(ConfigError::expression(expression, "展开结果过多"));
                }
                results = results
                    .iter()
                    .flat_map(|prefix| values.iter().map(move |v| format!("{}{}", prefix, v)))
                    .collect();
            }
        }
    }
    Ok(results)
}

fn placeholder_values(expression: &str, content: &str) -> ConfigResult<Vec<String>> {
    if let Some(list) = content
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        let items: Vec<String> = list.split(',').map(unquote).collect();
        if items.iter().any(|item| item.is_empty()) {
            return Err(ConfigError::expression(expression, "列表中存在空项"));
        }
        return Ok(items);
    }

    if let Some((start, end)) = content.split_once("..") {
        let start: i64 = start
            .trim()
            .parse()
            .map_err(|_| ConfigError::expression(expression, format!("无效的范围起点 '{}'", start.trim())))?;
        let end: i64 = end
            .trim()
            .parse()
            .map_err(|_| ConfigError::expression(expression, format!("无效的范围终点 '{}'", end.trim())))?;
        if start > end {
            return Err(ConfigError::expression(
                expression,
                format!("范围起点 {} 大于终点 {}", start, end),
            ));
        }
        if (end as i128 - start as i128) >= MAX_EXPANSION as i128 {
            return Err(ConfigError::expression(expression, "展开结果过多"));
        }
        return Ok((start..=end).map(|n| n.to_string()).collect());
    }

    Err(ConfigError::expression(
        expression,
        format!("不支持的占位符 '{}'", content),
    ))
}

fn unquote(item: &str) -> String {
    let item = item.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = item
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner.to_string();
        }
    }
    item.to_string()
}
