//! ShardRule - sharding rule resolution and routing engine
//!
//! Given a logical table and the shard-key predicates of one SQL statement,
//! the engine decides which physical data sources and actual tables must
//! receive the statement. It keeps binding tables aligned on the same shard
//! and generates distributed keys for inserts that carry none.
//!
//! SQL parsing, rewriting, connection pooling and result merging live
//! outside this crate.

pub mod config;
pub mod core;
pub mod keygen;
pub mod route;
pub mod rule;
pub mod strategy;
pub mod utils;

// 错误和结果类型
pub use crate::core::error::{
    ConfigError, ConfigResult, ErrorCode, PublicError, RoutingError, RoutingResult, ShardingError,
    ShardingResult, ToPublicError,
};

// 核心数据类型
pub use crate::core::value::{ShardingValue, ValueRange};

pub use config::ShardingRuleConfig;
pub use keygen::KeyGenerator;
pub use route::{
    InsertRoute, RouteContext, RouteResult, RouteUnit, ShardingConditions, ShardingPredicate,
    StatementKind,
};
pub use rule::{DataNode, ShardingRule, ShardingRuleHolder};
pub use strategy::{AlgorithmRegistry, ShardingStrategy};
