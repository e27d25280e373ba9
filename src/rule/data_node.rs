//! 数据节点
//!
//! 数据节点是数据源与真实表名组成的二元组，是逻辑表的一个物理分片

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{ConfigError, ConfigResult};

const DELIMITER: char = '.';

/// 真实数据节点 `(数据源, 真实表名)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataNode {
    data_source: String,
    table: String,
}

impl DataNode {
    pub fn new(data_source: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            table: table.into(),
        }
    }

    /// 解析 `ds.table` 形式的数据节点，两部分都不能为空且只能有一个分隔符
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let text = text.trim();
        let mut parts = text.split(DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ds), Some(table), None) if !ds.trim().is_empty() && !table.trim().is_empty() => {
                Ok(Self::new(ds.trim(), table.trim()))
            }
            _ => Err(ConfigError::InvalidDataNode(text.to_string())),
        }
    }

    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn matches(&self, data_source: &str, table: &str) -> bool {
        self.data_source == data_source && self.table.eq_ignore_ascii_case(table)
    }
}

impl fmt::Display for DataNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.data_source, DELIMITER, self.table)
    }
}
