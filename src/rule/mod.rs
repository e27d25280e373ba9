//! 分片规则模型

pub mod binding;
pub mod data_node;
pub mod expression;
pub mod holder;
pub mod sharding_rule;
pub mod table_rule;

pub use binding::BindingTableGroup;
pub use data_node::DataNode;
pub use holder::ShardingRuleHolder;
pub use sharding_rule::ShardingRule;
pub use table_rule::{TableKeyGenerator, TableRule};
