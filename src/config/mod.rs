use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::ConfigResult;

pub mod key_generator;
pub mod strategy;

pub use key_generator::{KeyGeneratorConfig, KeyGeneratorKind, KeyGeneratorProps};
pub use strategy::{AlgorithmConfig, ShardingStrategyConfig};

/// 单张逻辑表的分片规则配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TableRuleConfig {
    pub logic_table: String,
    /// 行表达式，例如 `ds${0..1}.t_order_${0..1}`；缺省时为每个数据源生成同名表
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_data_nodes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_strategy: Option<ShardingStrategyConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_strategy: Option<ShardingStrategyConfig>,
    /// 每张表最多一个，多于一个时构建失败
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_generators: Vec<KeyGeneratorConfig>,
}

impl TableRuleConfig {
    pub fn new(logic_table: impl Into<String>) -> Self {
        Self {
            logic_table: logic_table.into(),
            actual_data_nodes: None,
            database_strategy: None,
            table_strategy: None,
            key_generators: Vec::new(),
        }
    }

    pub fn with_actual_data_nodes(mut self, expression: impl Into<String>) -> Self {
        self.actual_data_nodes = Some(expression.into());
        self
    }

    pub fn with_database_strategy(mut self, strategy: ShardingStrategyConfig) -> Self {
        self.database_strategy = Some(strategy);
        self
    }

    pub fn with_table_strategy(mut self, strategy: ShardingStrategyConfig) -> Self {
        self.table_strategy = Some(strategy);
        self
    }

    pub fn with_key_generator(mut self, key_generator: KeyGeneratorConfig) -> Self {
        self.key_generators.push(key_generator);
        self
    }
}

/// 日志配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "shardrule".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

/// 分片规则配置
///
/// 由外部加载器生成，或通过 [`ShardingRuleConfig::load`] 从 TOML 文件读取
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ShardingRuleConfig {
    pub data_sources: Vec<String>,
    pub tables: Vec<TableRuleConfig>,
    /// 每项为逗号分隔的逻辑表名，例如 `"t_order, t_order_item"`
    pub binding_table_groups: Vec<String>,
    pub broadcast_tables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_data_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_database_strategy: Option<ShardingStrategyConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_table_strategy: Option<ShardingStrategyConfig>,
    pub log: LogConfig,
}

impl ShardingRuleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> ConfigResult<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn with_data_sources<I, S>(mut self, data_sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_sources = data_sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_table(mut self, table: TableRuleConfig) -> Self {
        self.tables.push(table);
        self
    }

    pub fn with_binding_group(mut self, group: impl Into<String>) -> Self {
        self.binding_table_groups.push(group.into());
        self
    }

    pub fn with_broadcast_table(mut self, table: impl Into<String>) -> Self {
        self.broadcast_tables.push(table.into());
        self
    }

    pub fn with_default_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.default_data_source = Some(data_source.into());
        self
    }

    pub fn with_default_database_strategy(mut self, strategy: ShardingStrategyConfig) -> Self {
        self.default_database_strategy = Some(strategy);
        self
    }

    pub fn with_default_table_strategy(mut self, strategy: ShardingStrategyConfig) -> Self {
        self.default_table_strategy = Some(strategy);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
data_sources = ["ds0", "ds1"]
binding_table_groups = ["t_order, t_order_item"]
broadcast_tables = ["t_dict"]

[default_database_strategy]
type = "standard"
sharding_column = "user_id"
precise_algorithm = { type = "mod", sharding_count = 2 }
range_algorithm = { type = "mod", sharding_count = 2 }

[[tables]]
logic_table = "t_order"
actual_data_nodes = "ds${0..1}.t_order_${0..1}"

[tables.table_strategy]
type = "inline"
sharding_column = "order_id"
algorithm_expression = "t_order_${order_id % 2}"

[[tables]]
logic_table = "t_order_item"
actual_data_nodes = "ds${0..1}.t_order_item_${0..1}"

[[tables.key_generators]]
column = "item_id"
type = "INCREMENT"
props = { seed = 100 }

[log]
level = "debug"
"#;

    #[test]
    fn test_config_default() {
        let config = ShardingRuleConfig::default();
        assert!(config.tables.is_empty());
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.max_files, 5);
    }

    #[test]
    fn test_parse_sample() {
        let config = ShardingRuleConfig::from_toml_str(SAMPLE).expect("Failed to parse sample config");
        assert_eq!(config.data_sources, vec!["ds0", "ds1"]);
        assert_eq!(config.tables.len(), 2);
        assert!(matches!(
            config.tables[0].table_strategy,
            Some(ShardingStrategyConfig::Inline { .. })
        ));
        let key_generator = &config.tables[1].key_generators[0];
        assert_eq!(key_generator.kind, KeyGeneratorKind::Increment);
        assert_eq!(key_generator.props.seed, Some(100));
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.dir, "logs");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = ShardingRuleConfig::from_toml_str("data_source = [\"ds0\"]");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_load_save() {
        let config = ShardingRuleConfig::from_toml_str(SAMPLE).expect("Failed to parse sample config");

        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        let toml_content = config.to_toml_string().expect("Failed to serialize config to TOML");
        temp_file
            .write_all(toml_content.as_bytes())
            .expect("Failed to write TOML content to temporary file");

        let loaded = ShardingRuleConfig::load(temp_file.path())
            .expect("Failed to load config from temporary file");
        assert_eq!(config, loaded);
    }
}
