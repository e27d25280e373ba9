//! 绑定表组
//!
//! 同组的逻辑表分片方式完全一致，同一条语句中总是路由到相同的分片下标，
//! 关联查询因此不会产生跨分片的笛卡尔积。

use std::collections::HashMap;

use crate::core::error::{ConfigError, ConfigResult};
use crate::rule::table_rule::TableRule;

/// 绑定表组，成员按配置顺序排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTableGroup {
    tables: Vec<String>,
}

impl BindingTableGroup {
    /// 解析逗号分隔的表名并校验成员的分片布局
    ///
    /// `table_rules` 以小写逻辑表名为键
    pub fn build(text: &str, table_rules: &HashMap<String, TableRule>) -> ConfigResult<Self> {
        let mut tables: Vec<String> = Vec::new();
        for name in text.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            if tables.iter().any(|t| t.eq_ignore_ascii_case(name)) {
                return Err(ConfigError::DuplicateBindingTable(name.to_string()));
            }
            tables.push(name.to_string());
        }
        if tables.len() < 2 {
            return Err(ConfigError::BindingGroupTooSmall(text.trim().to_string()));
        }

        let rules = tables
            .iter()
            .map(|name| {
                table_rules
                    .get(&name.to_ascii_lowercase())
                    .ok_or_else(|| ConfigError::BindingTableWithoutRule(name.clone()))
            })
            .collect::<ConfigResult<Vec<_>>>()?;

        let first = rules[0];
        for other in &rules[1..] {
            check_layout(first, other)?;
        }
        Ok(Self { tables })
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn contains(&self, logic_table: &str) -> bool {
        self.tables.iter().any(|t| t.eq_ignore_ascii_case(logic_table))
    }
}

/// 成员必须拥有相同数量的数据节点，且同一下标位于同一数据源
fn check_layout(left: &TableRule, right: &TableRule) -> ConfigResult<()> {
    let left_nodes = left.actual_data_nodes();
    let right_nodes = right.actual_data_nodes();
    if left_nodes.len() != right_nodes.len() {
        return Err(ConfigError::BindingCardinalityMismatch {
            left: left.logic_table().to_string(),
            left_count: left_nodes.len(),
            right: right.logic_table().to_string(),
            right_count: right_nodes.len(),
        });
    }
    if let Some(position) = left_nodes
        .iter()
        .zip(right_nodes)
        .position(|(l, r)| l.data_source() != r.data_source())
    {
        return Err(ConfigError::BindingDataSourceMismatch {
            left: left.logic_table().to_string(),
            right: right.logic_table().to_string(),
            position,
        });
    }
    Ok(())
}
