//! 分片规则
//!
//! 规则在启动时一次性构建并完成全部校验，之后只读共享，路由时无需加锁。
//! 逻辑表名不区分大小写。

use std::collections::{HashMap, HashSet};

use crate::config::ShardingRuleConfig;
use crate::core::error::{ConfigError, ConfigResult};
use crate::core::value::ShardingValue;
use crate::rule::binding::BindingTableGroup;
use crate::rule::table_rule::TableRule;
use crate::strategy::{AlgorithmRegistry, ShardingStrategy};

/// 分片规则
#[derive(Debug)]
pub struct ShardingRule {
    data_source_names: Vec<String>,
    /// 配置顺序的逻辑表名
    logic_tables: Vec<String>,
    /// 小写逻辑表名 -> 表规则
    table_rules: HashMap<String, TableRule>,
    binding_groups: Vec<BindingTableGroup>,
    /// 小写逻辑表名 -> 绑定表组下标
    binding_index: HashMap<String, usize>,
    broadcast_tables: Vec<String>,
    default_data_source: Option<String>,
    default_database_strategy: ShardingStrategy,
    default_table_strategy: ShardingStrategy,
}

impl ShardingRule {
    /// 使用配置中的数据源和内置算法构建规则
    pub fn from_config(config: &ShardingRuleConfig) -> ConfigResult<Self> {
        Self::build(config, &config.data_sources, &AlgorithmRegistry::default())
    }

    /// 使用配置中的数据源和自定义算法注册表构建规则
    pub fn with_registry(config: &ShardingRuleConfig, registry: &AlgorithmRegistry) -> ConfigResult<Self> {
        Self::build(config, &config.data_sources, registry)
    }

    /// 构建分片规则，任何不一致都会在这里报错
    pub fn build(
        config: &ShardingRuleConfig,
        data_sources: &[String],
        registry: &AlgorithmRegistry,
    ) -> ConfigResult<Self> {
        let data_source_names = validate_data_sources(data_sources)?;

        let mut logic_tables = Vec::with_capacity(config.tables.len());
        let mut table_rules = HashMap::with_capacity(config.tables.len());
        for table_config in &config.tables {
            let rule = TableRule::build(table_config, &data_source_names, registry)?;
            let key = rule.logic_table().to_ascii_lowercase();
            if table_rules.contains_key(&key) {
                return Err(ConfigError::DuplicateLogicTable(rule.logic_table().to_string()));
            }
            logic_tables.push(rule.logic_table().to_string());
            table_rules.insert(key, rule);
        }

        let mut binding_groups = Vec::with_capacity(config.binding_table_groups.len());
        let mut binding_index = HashMap::new();
        for text in &config.binding_table_groups {
            let group = BindingTableGroup::build(text, &table_rules)?;
            for table in group.tables() {
                if binding_index
                    .insert(table.to_ascii_lowercase(), binding_groups.len())
                    .is_some()
                {
                    return Err(ConfigError::DuplicateBindingTable(table.clone()));
                }
            }
            binding_groups.push(group);
        }

        let mut broadcast_tables: Vec<String> = Vec::with_capacity(config.broadcast_tables.len());
        for table in &config.broadcast_tables {
            let table = table.trim();
            if table.is_empty() {
                return Err(ConfigError::EmptyLogicTable);
            }
            if table_rules.contains_key(&table.to_ascii_lowercase())
                || broadcast_tables.iter().any(|t| t.eq_ignore_ascii_case(table))
            {
                return Err(ConfigError::DuplicateBroadcastTable(table.to_string()));
            }
            broadcast_tables.push(table.to_string());
        }

        if let Some(ds) = &config.default_data_source {
            if !data_source_names.contains(ds) {
                return Err(ConfigError::InvalidDefaultDataSource(ds.clone()));
            }
        }

        let default_database_strategy = match &config.default_database_strategy {
            Some(strategy) => registry.build_strategy(strategy)?,
            None => ShardingStrategy::None,
        };
        let default_table_strategy = match &config.default_table_strategy {
            Some(strategy) => registry.build_strategy(strategy)?,
            None => ShardingStrategy::None,
        };

        log::info!(
            "分片规则构建完成: {} 个数据源, {} 张分片表, {} 个绑定表组, {} 张广播表",
            data_source_names.len(),
            logic_tables.len(),
            binding_groups.len(),
            broadcast_tables.len()
        );

        Ok(Self {
            data_source_names,
            logic_tables,
            table_rules,
            binding_groups,
            binding_index,
            broadcast_tables,
            default_data_source: config.default_data_source.clone(),
            default_database_strategy,
            default_table_strategy,
        })
    }

    pub fn data_source_names(&self) -> &[String] {
        &self.data_source_names
    }

    /// 已配置分片规则的逻辑表，按配置顺序
    pub fn logic_tables(&self) -> &[String] {
        &self.logic_tables
    }

    pub fn table_rule(&self, logic_table: &str) -> Option<&TableRule> {
        self.table_rules.get(&logic_table.to_ascii_lowercase())
    }

    /// 逻辑表是否配置了分片规则
    pub fn is_sharding_table(&self, logic_table: &str) -> bool {
        self.table_rule(logic_table).is_some()
    }

    pub fn is_broadcast_table(&self, logic_table: &str) -> bool {
        self.broadcast_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(logic_table))
    }

    pub fn broadcast_tables(&self) -> &[String] {
        &self.broadcast_tables
    }

    pub fn default_data_source(&self) -> Option<&str> {
        self.default_data_source.as_deref()
    }

    pub fn binding_groups(&self) -> &[BindingTableGroup] {
        &self.binding_groups
    }

    pub(crate) fn binding_group_index(&self, logic_table: &str) -> Option<usize> {
        self.binding_index
            .get(&logic_table.to_ascii_lowercase())
            .copied()
    }

    pub fn find_binding_group(&self, logic_table: &str) -> Option<&BindingTableGroup> {
        self.binding_group_index(logic_table)
            .map(|index| &self.binding_groups[index])
    }

    pub fn is_binding_table(&self, logic_table: &str) -> bool {
        self.binding_group_index(logic_table).is_some()
    }

    /// 给定的逻辑表是否全部属于同一个绑定表组
    pub fn all_binding<S: AsRef<str>>(&self, logic_tables: &[S]) -> bool {
        let mut groups = logic_tables
            .iter()
            .map(|t| self.binding_group_index(t.as_ref()));
        match groups.next() {
            Some(Some(first)) => groups.all(|g| g == Some(first)),
            _ => false,
        }
    }

    /// 表规则生效的分库策略：表级覆盖，否则使用默认策略
    pub fn database_strategy_for<'a>(&'a self, table_rule: &'a TableRule) -> &'a ShardingStrategy {
        table_rule
            .database_strategy()
            .unwrap_or(&self.default_database_strategy)
    }

    /// 表规则生效的分表策略：表级覆盖，否则使用默认策略
    pub fn table_strategy_for<'a>(&'a self, table_rule: &'a TableRule) -> &'a ShardingStrategy {
        table_rule
            .table_strategy()
            .unwrap_or(&self.default_table_strategy)
    }

    pub fn generate_key_column(&self, logic_table: &str) -> Option<&str> {
        self.table_rule(logic_table)
            .and_then(TableRule::generate_key_column)
    }

    /// 为逻辑表生成下一个主键
    pub fn generate_key(&self, logic_table: &str) -> ConfigResult<ShardingValue> {
        let key_generator = self
            .table_rule(logic_table)
            .and_then(TableRule::key_generator)
            .ok_or_else(|| ConfigError::KeyGeneratorNotFound(logic_table.to_string()))?;
        key_generator.generator.next_key()
    }
}

fn validate_data_sources(data_sources: &[String]) -> ConfigResult<Vec<String>> {
    if data_sources.is_empty() {
        return Err(ConfigError::NoDataSource);
    }
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(data_sources.len());
    for ds in data_sources {
        let name = ds.trim();
        if name.is_empty() || name.contains('.') {
            return Err(ConfigError::InvalidDataSourceName(ds.clone()));
        }
        if !seen.insert(name) {
            return Err(ConfigError::DuplicateDataSource(name.to_string()));
        }
        names.push(name.to_string());
    }
    Ok(names)
}
