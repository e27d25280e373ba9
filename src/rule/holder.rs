//! 分片规则持有者
//!
//! 规则本身不可变，配置变更时整体替换为新实例。
//! 已取得快照的读者继续使用旧规则，直到释放为止。

use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

use crate::config::ShardingRuleConfig;
use crate::core::error::ConfigResult;
use crate::rule::ShardingRule;
use crate::strategy::AlgorithmRegistry;

#[derive(Debug)]
pub struct ShardingRuleHolder {
    current: RwLock<Arc<ShardingRule>>,
}

impl ShardingRuleHolder {
    pub fn new(rule: ShardingRule) -> Self {
        Self {
            current: RwLock::new(Arc::new(rule)),
        }
    }

    /// 获取当前规则的快照
    pub fn load(&self) -> Arc<ShardingRule> {
        self.current.read().clone()
    }

    /// 替换规则，返回被替换的旧规则
    pub fn swap(&self, rule: ShardingRule) -> Arc<ShardingRule> {
        std::mem::replace(&mut *self.current.write(), Arc::new(rule))
    }

    /// 从新配置重建规则，构建失败时保留旧规则
    pub fn reload(&self, config: &ShardingRuleConfig, registry: &AlgorithmRegistry) -> ConfigResult<()> {
        let rule = ShardingRule::with_registry(config, registry)?;
        self.swap(rule);
        log::info!("分片规则已重新加载");
        Ok(())
    }

    /// 从配置文件重建规则
    pub fn reload_from<P: AsRef<Path>>(&self, path: P, registry: &AlgorithmRegistry) -> ConfigResult<()> {
        let config = ShardingRuleConfig::load(path)?;
        self.reload(&config, registry)
    }
}
