//! 逻辑表分片规则
//!
//! 一张逻辑表对应一组有序、去重的真实数据节点。节点的顺序决定分片下标，
//! 绑定表之间按下标对齐。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::TableRuleConfig;
use crate::core::error::{ConfigError, ConfigResult};
use crate::keygen::{create_key_generator, KeyGenerator};
use crate::rule::data_node::DataNode;
use crate::rule::expression;
use crate::strategy::{AlgorithmRegistry, ShardingStrategy};

/// 表级主键生成器
#[derive(Debug, Clone)]
pub struct TableKeyGenerator {
    pub column: String,
    pub generator: Arc<dyn KeyGenerator>,
}

/// 单张逻辑表的分片规则，构建后不可变
#[derive(Debug)]
pub struct TableRule {
    logic_table: String,
    data_nodes: Vec<DataNode>,
    data_source_names: Vec<String>,
    table_names: Vec<String>,
    /// 数据源 -> 该数据源上的真实表，保持节点顺序
    tables_by_data_source: HashMap<String, Vec<String>>,
    database_strategy: Option<ShardingStrategy>,
    table_strategy: Option<ShardingStrategy>,
    key_generator: Option<TableKeyGenerator>,
}

impl TableRule {
    /// 根据配置构建表规则
    ///
    /// 未配置数据节点时，为每个数据源生成与逻辑表同名的真实表
    pub fn build(
        config: &TableRuleConfig,
        data_sources: &[String],
        registry: &AlgorithmRegistry,
    ) -> ConfigResult<Self> {
        let logic_table = config.logic_table.trim();
        if logic_table.is_empty() {
            return Err(ConfigError::EmptyLogicTable);
        }

        let candidates = match &config.actual_data_nodes {
            Some(expr) => expression::expand(expr)?
                .iter()
                .map(|text| DataNode::parse(text))
                .collect::<ConfigResult<Vec<_>>>()?,
            None => data_sources
                .iter()
                .map(|ds| DataNode::new(ds.as_str(), logic_table))
                .collect(),
        };

        let mut seen = HashSet::new();
        let mut data_nodes = Vec::with_capacity(candidates.len());
        for node in candidates {
            if !data_sources.iter().any(|ds| ds == node.data_source()) {
                return Err(ConfigError::UnknownDataSource {
                    logic_table: logic_table.to_string(),
                    data_source: node.data_source().to_string(),
                });
            }
            // 真实表名不区分大小写，与路由时的节点匹配保持一致
            if seen.insert((node.data_source().to_string(), node.table().to_ascii_lowercase())) {
                data_nodes.push(node);
            }
        }
        if data_nodes.is_empty() {
            return Err(ConfigError::EmptyDataNodes(logic_table.to_string()));
        }

        let mut data_source_names: Vec<String> = Vec::new();
        let mut table_names: Vec<String> = Vec::new();
        let mut tables_by_data_source: HashMap<String, Vec<String>> = HashMap::new();
        for node in &data_nodes {
            if !data_source_names.iter().any(|ds| ds == node.data_source()) {
                data_source_names.push(node.data_source().to_string());
            }
            if !table_names.iter().any(|t| t.eq_ignore_ascii_case(node.table())) {
                table_names.push(node.table().to_string());
            }
            tables_by_data_source
                .entry(node.data_source().to_string())
                .or_default()
                .push(node.table().to_string());
        }

        let database_strategy = config
            .database_strategy
            .as_ref()
            .map(|s| registry.build_strategy(s))
            .transpose()?;
        let table_strategy = config
            .table_strategy
            .as_ref()
            .map(|s| registry.build_strategy(s))
            .transpose()?;

        let key_generator = match config.key_generators.as_slice() {
            [] => None,
            [key_generator] => Some(TableKeyGenerator {
                column: key_generator.column.trim().to_string(),
                generator: create_key_generator(key_generator)?,
            }),
            _ => return Err(ConfigError::DuplicateKeyGenerator(logic_table.to_string())),
        };

        Ok(Self {
            logic_table: logic_table.to_string(),
            data_nodes,
            data_source_names,
            table_names,
            tables_by_data_source,
            database_strategy,
            table_strategy,
            key_generator,
        })
    }

    pub fn logic_table(&self) -> &str {
        &self.logic_table
    }

    pub fn actual_data_nodes(&self) -> &[DataNode] {
        &self.data_nodes
    }

    /// 涉及的数据源，按首次出现的顺序
    pub fn actual_data_source_names(&self) -> &[String] {
        &self.data_source_names
    }

    /// 全部真实表名，按首次出现的顺序
    pub fn actual_table_names(&self) -> &[String] {
        &self.table_names
    }

    /// 指定数据源上的真实表
    pub fn actual_table_names_in(&self, data_source: &str) -> &[String] {
        self.tables_by_data_source
            .get(data_source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 数据节点的分片下标
    pub fn position_of(&self, data_source: &str, table: &str) -> Option<usize> {
        self.data_nodes
            .iter()
            .position(|node| node.matches(data_source, table))
    }

    pub fn node_at(&self, position: usize) -> Option<&DataNode> {
        self.data_nodes.get(position)
    }

    pub fn database_strategy(&self) -> Option<&ShardingStrategy> {
        self.database_strategy.as_ref()
    }

    pub fn table_strategy(&self) -> Option<&ShardingStrategy> {
        self.table_strategy.as_ref()
    }

    pub fn key_generator(&self) -> Option<&TableKeyGenerator> {
        self.key_generator.as_ref()
    }

    pub fn generate_key_column(&self) -> Option<&str> {
        self.key_generator.as_ref().map(|k| k.column.as_str())
    }
}
