//! 路由
//!
//! 路由结果是一组 `(数据源, 真实表)`，按分片下标排序。
//! 绑定表的协调状态保存在单条语句的 [`RouteContext`] 中，不在进程内共享。

pub mod condition;
pub mod engine;

pub use condition::{ShardingConditions, ShardingPredicate};
pub use engine::InsertRoute;

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::rule::DataNode;

/// 语句类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Query,
    Write,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Query => f.write_str("query"),
            StatementKind::Write => f.write_str("write"),
        }
    }
}

/// 单个路由目标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteUnit {
    #[serde(flatten)]
    pub data_node: DataNode,
    /// 数据节点在表规则中的下标
    pub position: usize,
}

impl RouteUnit {
    pub fn new(data_node: DataNode, position: usize) -> Self {
        Self {
            data_node,
            position,
        }
    }

    pub fn data_source(&self) -> &str {
        self.data_node.data_source()
    }

    pub fn table(&self) -> &str {
        self.data_node.table()
    }
}

/// 一张逻辑表的路由结果，非空
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteResult {
    pub logic_table: String,
    pub units: Vec<RouteUnit>,
    /// 是否没有任何分片条件参与裁剪
    pub broadcast: bool,
}

impl RouteResult {
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.units.len() == 1
    }

    pub fn data_nodes(&self) -> impl Iterator<Item = &DataNode> {
        self.units.iter().map(|u| &u.data_node)
    }

    pub fn positions(&self) -> Vec<usize> {
        self.units.iter().map(|u| u.position).collect()
    }

    /// 涉及的数据源，按出现顺序去重
    pub fn data_source_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for unit in &self.units {
            if !names.contains(&unit.data_source()) {
                names.push(unit.data_source());
            }
        }
        names
    }

    pub fn contains(&self, data_source: &str, table: &str) -> bool {
        self.units
            .iter()
            .any(|u| u.data_node.matches(data_source, table))
    }
}

/// 已路由的绑定表分片
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BindingRoute {
    pub(crate) source_table: String,
    pub(crate) positions: Vec<usize>,
}

/// 单条语句的路由上下文
#[derive(Debug, Clone)]
pub struct RouteContext {
    kind: StatementKind,
    /// 绑定表组下标 -> 组内首个被路由的表的结果
    bindings: HashMap<usize, BindingRoute>,
}

impl RouteContext {
    pub fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            bindings: HashMap::new(),
        }
    }

    pub fn query() -> Self {
        Self::new(StatementKind::Query)
    }

    pub fn write() -> Self {
        Self::new(StatementKind::Write)
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// 绑定表组是否已在本语句中路由过
    pub fn is_group_routed(&self, group: usize) -> bool {
        self.bindings.contains_key(&group)
    }

    pub(crate) fn binding(&self, group: usize) -> Option<&BindingRoute> {
        self.bindings.get(&group)
    }

    pub(crate) fn record_binding(&mut self, group: usize, source_table: &str, positions: Vec<usize>) {
        self.bindings.entry(group).or_insert_with(|| BindingRoute {
            source_table: source_table.to_string(),
            positions,
        });
    }
}

impl Default for RouteContext {
    fn default() -> Self {
        Self::query()
    }
}
