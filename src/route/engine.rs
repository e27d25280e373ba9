//! 路由引擎
//!
//! 分片表的路由步骤：
//! 1. 绑定表组内已有成员在本语句中路由过时，直接复用其分片下标
//! 2. 分库策略从表的数据源中选出候选数据源
//! 3. 分表策略从表的真实表中选出候选表
//! 4. 两者交叉，只保留已声明的数据节点
//!
//! 未配置分片规则的表：广播表查询走第一个数据源、写入走全部数据源；
//! 配置了默认数据源时路由到默认数据源；否则报错。

use serde::Serialize;

use crate::core::error::{RoutingError, RoutingResult, ShardingResult};
use crate::core::value::ShardingValue;
use crate::route::condition::{ShardingConditions, ShardingPredicate};
use crate::route::{RouteContext, RouteResult, RouteUnit, StatementKind};
use crate::rule::{DataNode, ShardingRule, TableRule};

/// 插入语句的路由结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertRoute {
    pub route: RouteResult,
    /// 由主键生成器补齐的主键值
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_key: Option<ShardingValue>,
}

impl ShardingRule {
    /// 在独立的查询上下文中路由一张逻辑表
    pub fn route(&self, logic_table: &str, conditions: &ShardingConditions) -> RoutingResult<RouteResult> {
        self.route_with_context(logic_table, conditions, &mut RouteContext::query())
    }

    /// 在语句上下文中路由一张逻辑表
    ///
    /// 同一条语句涉及的所有表应共用一个上下文，绑定表才能对齐
    pub fn route_with_context(
        &self,
        logic_table: &str,
        conditions: &ShardingConditions,
        context: &mut RouteContext,
    ) -> RoutingResult<RouteResult> {
        let result = match self.table_rule(logic_table) {
            Some(table_rule) => self.route_sharding_table(table_rule, conditions, context)?,
            None => self.route_unconfigured_table(logic_table, context.kind())?,
        };
        log::debug!(
            "{} 路由 {} -> [{}]",
            context.kind(),
            logic_table,
            result
                .data_nodes()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(result)
    }

    /// 路由一条插入语句
    ///
    /// 表配置了主键生成器且条件中缺少主键列时，先生成主键再参与路由。
    /// 分片表的插入必须落在唯一的数据节点上。
    pub fn route_insert(
        &self,
        logic_table: &str,
        mut conditions: ShardingConditions,
        context: &mut RouteContext,
    ) -> ShardingResult<InsertRoute> {
        let mut generated_key = None;
        if let Some(key_generator) = self.table_rule(logic_table).and_then(TableRule::key_generator) {
            if !conditions.contains(&key_generator.column) {
                let key = key_generator.generator.next_key()?;
                conditions.insert(&key_generator.column, ShardingPredicate::Equal(vec![key.clone()]));
                generated_key = Some(key);
            }
        }

        let route = self.route_with_context(logic_table, &conditions, context)?;
        if self.is_sharding_table(logic_table) && !route.is_single() {
            return Err(RoutingError::InsertMultipleNodes {
                logic_table: logic_table.to_string(),
                node_count: route.len(),
            }
            .into());
        }
        Ok(InsertRoute {
            route,
            generated_key,
        })
    }

    fn route_sharding_table(
        &self,
        table_rule: &TableRule,
        conditions: &ShardingConditions,
        context: &mut RouteContext,
    ) -> RoutingResult<RouteResult> {
        let logic_table = table_rule.logic_table();
        let group = self.binding_group_index(logic_table);

        if let Some(binding) = group.and_then(|g| context.binding(g)) {
            let units = binding
                .positions
                .iter()
                .map(|&position| {
                    table_rule
                        .node_at(position)
                        .map(|node| RouteUnit::new(node.clone(), position))
                        .ok_or_else(|| RoutingError::BindingPositionOutOfRange {
                            logic_table: logic_table.to_string(),
                            source_table: binding.source_table.clone(),
                            position,
                        })
                })
                .collect::<RoutingResult<Vec<_>>>()?;
            log::debug!("绑定表 {} 复用 {} 的分片 {:?}", logic_table, binding.source_table, binding.positions);
            return Ok(RouteResult {
                logic_table: logic_table.to_string(),
                units,
                broadcast: false,
            });
        }

        let database_strategy = self.database_strategy_for(table_rule);
        let table_strategy = self.table_strategy_for(table_rule);
        let data_sources =
            database_strategy.resolve(logic_table, table_rule.actual_data_source_names(), conditions)?;
        let tables = table_strategy.resolve(logic_table, table_rule.actual_table_names(), conditions)?;

        let mut units = Vec::new();
        for ds in &data_sources.targets {
            for table in table_rule.actual_table_names_in(ds) {
                if !tables.targets.contains(table) {
                    continue;
                }
                if let Some(position) = table_rule.position_of(ds, table) {
                    units.push(RouteUnit::new(DataNode::new(ds.as_str(), table.as_str()), position));
                }
            }
        }
        if units.is_empty() {
            return Err(RoutingError::EmptyRoute(logic_table.to_string()));
        }
        units.sort_by_key(|u| u.position);

        if context.kind() == StatementKind::Write
            && units.len() > 1
            && !database_strategy.is_sharding()
            && !table_strategy.is_sharding()
        {
            return Err(RoutingError::AmbiguousRoute {
                logic_table: logic_table.to_string(),
                node_count: units.len(),
            });
        }

        if let Some(group) = group {
            context.record_binding(group, logic_table, units.iter().map(|u| u.position).collect());
        }
        Ok(RouteResult {
            logic_table: logic_table.to_string(),
            units,
            broadcast: data_sources.broadcast && tables.broadcast,
        })
    }

    fn route_unconfigured_table(&self, logic_table: &str, kind: StatementKind) -> RoutingResult<RouteResult> {
        let data_sources: Vec<&String> = if self.is_broadcast_table(logic_table) {
            match kind {
                StatementKind::Query => self.data_source_names().iter().take(1).collect(),
                StatementKind::Write => self.data_source_names().iter().collect(),
            }
        } else if let Some(ds) = self.default_data_source() {
            let units = vec![RouteUnit::new(DataNode::new(ds, logic_table), 0)];
            return Ok(RouteResult {
                logic_table: logic_table.to_string(),
                units,
                broadcast: false,
            });
        } else {
            return Err(RoutingError::TableRuleNotFound(logic_table.to_string()));
        };

        let units = data_sources
            .into_iter()
            .enumerate()
            .map(|(position, ds)| RouteUnit::new(DataNode::new(ds.as_str(), logic_table), position))
            .collect();
        Ok(RouteResult {
            logic_table: logic_table.to_string(),
            units,
            broadcast: kind == StatementKind::Write,
        })
    }
}
