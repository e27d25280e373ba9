//! 绑定表集成测试
//!
//! 测试范围:
//! - 同一语句上下文中绑定表对齐到相同分片下标
//! - 不同语句上下文互不影响
//! - 绑定表组构建期校验

mod common;

use common::{nodes, order_rule, order_rule_config};

use shardrule::config::TableRuleConfig;
use shardrule::core::error::ConfigError;
use shardrule::route::{RouteContext, ShardingConditions};
use shardrule::rule::ShardingRule;

#[test]
fn test_binding_tables_share_positions() {
    let rule = order_rule();
    let conditions = ShardingConditions::new().with_equal("user_id", 3).with_equal("order_id", 5);
    let mut context = RouteContext::query();

    let order = rule
        .route_with_context("t_order", &conditions, &mut context)
        .expect("Failed to route t_order");
    let item = rule
        .route_with_context("t_order_item", &conditions, &mut context)
        .expect("Failed to route t_order_item");

    assert_eq!(nodes(&order), vec!["ds1.t_order_1"]);
    assert_eq!(nodes(&item), vec!["ds1.t_order_item_1"]);
    assert_eq!(order.positions(), item.positions());
}

#[test]
fn test_sibling_follows_first_routed_member() {
    let rule = order_rule();
    let mut context = RouteContext::query();

    let item = rule
        .route_with_context(
            "t_order_item",
            &ShardingConditions::new().with_equal("user_id", 0).with_in("order_id", [1, 3]),
            &mut context,
        )
        .expect("Failed to route t_order_item");
    assert!(context.is_group_routed(0));

    // t_order 没有任何条件，仍然只落在 t_order_item 命中的分片上
    let order = rule
        .route_with_context("t_order", &ShardingConditions::new(), &mut context)
        .expect("Failed to route t_order");

    assert_eq!(nodes(&item), vec!["ds0.t_order_item_1"]);
    assert_eq!(nodes(&order), vec!["ds0.t_order_1"]);
    assert!(!order.broadcast);
}

#[test]
fn test_binding_state_is_per_statement() {
    let rule = order_rule();

    let mut first = RouteContext::query();
    rule.route_with_context(
        "t_order",
        &ShardingConditions::new().with_equal("user_id", 0).with_equal("order_id", 0),
        &mut first,
    )
    .expect("Failed to route t_order");

    let mut second = RouteContext::query();
    let item = rule
        .route_with_context("t_order_item", &ShardingConditions::new(), &mut second)
        .expect("Failed to route t_order_item");
    assert_eq!(item.len(), 4);
}

#[test]
fn test_broadcast_member_aligns_sibling() {
    let rule = order_rule();
    let mut context = RouteContext::query();

    let order = rule
        .route_with_context("t_order", &ShardingConditions::new(), &mut context)
        .expect("Failed to route t_order");
    let item = rule
        .route_with_context(
            "t_order_item",
            &ShardingConditions::new().with_equal("order_id", 1),
            &mut context,
        )
        .expect("Failed to route t_order_item");

    assert_eq!(order.len(), 4);
    assert_eq!(order.positions(), item.positions());
}

#[test]
fn test_binding_cardinality_mismatch_rejected() {
    let config = order_rule_config()
        .with_table(TableRuleConfig::new("t_order_ext").with_actual_data_nodes("ds${0..1}.t_order_ext"))
        .with_binding_group("t_order_ext, t_order_item");
    let result = ShardingRule::from_config(&config);
    assert!(matches!(
        result,
        Err(ConfigError::BindingCardinalityMismatch {
            left_count: 2,
            right_count: 4,
            ..
        })
    ));

    let mut config = order_rule_config();
    config.tables[1].actual_data_nodes = Some("ds${0..1}.t_order_item".to_string());
    assert_eq!(
        ShardingRule::from_config(&config).err(),
        Some(ConfigError::BindingCardinalityMismatch {
            left: "t_order".to_string(),
            left_count: 4,
            right: "t_order_item".to_string(),
            right_count: 2,
        })
    );
}

#[test]
fn test_binding_member_without_rule_rejected() {
    let config = order_rule_config().with_binding_group("t_user, t_order_detail");
    assert!(matches!(
        ShardingRule::from_config(&config),
        Err(ConfigError::BindingTableWithoutRule(_))
    ));
}
