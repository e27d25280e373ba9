//! 路由性质测试
//!
//! - 行表达式展开为声明顺序的笛卡尔积且没有重复
//! - 精确条件只命中一个数据节点
//! - 范围条件的结果覆盖区间内每个取值的精确路由结果

mod common;

use proptest::prelude::*;

use shardrule::config::{AlgorithmConfig, ShardingRuleConfig, ShardingStrategyConfig, TableRuleConfig};
use shardrule::route::ShardingConditions;
use shardrule::rule::expression::expand;
use shardrule::rule::ShardingRule;
use shardrule::ValueRange;

fn range_rule(table_algorithm: AlgorithmConfig) -> ShardingRule {
    let config = ShardingRuleConfig::new()
        .with_data_sources(["ds0", "ds1"])
        .with_table(
            TableRuleConfig::new("t_order")
                .with_actual_data_nodes("ds${0..1}.t_order_${0..3}")
                .with_database_strategy(ShardingStrategyConfig::standard_with_range(
                    "user_id",
                    AlgorithmConfig::modulo(2),
                    AlgorithmConfig::modulo(2),
                ))
                .with_table_strategy(ShardingStrategyConfig::standard_with_range(
                    "order_id",
                    table_algorithm.clone(),
                    table_algorithm,
                )),
        );
    ShardingRule::from_config(&config).expect("Failed to build rule")
}

fn table_algorithm() -> impl Strategy<Value = AlgorithmConfig> {
    prop_oneof![
        Just(AlgorithmConfig::modulo(4)),
        Just(AlgorithmConfig::BoundaryRange {
            boundaries: vec![0, 100, 1000],
        }),
        Just(AlgorithmConfig::VolumeRange {
            lower: -50,
            upper: 150,
            volume: 100,
        }),
    ]
}

proptest! {
    #[test]
    fn prop_expansion_is_ordered_cross_product(
        ds_start in 0i64..5,
        ds_len in 0i64..4,
        table_start in 0i64..20,
        table_len in 0i64..6,
    ) {
        let ds_end = ds_start + ds_len;
        let table_end = table_start + table_len;
        let expression = format!("ds${{{}..{}}}.t_${{{}..{}}}", ds_start, ds_end, table_start, table_end);
        let nodes = expand(&expression).expect("Failed to expand expression");

        let expected: Vec<String> = (ds_start..=ds_end)
            .flat_map(|d| (table_start..=table_end).map(move |t| format!("ds{}.t_{}", d, t)))
            .collect();
        prop_assert_eq!(&nodes, &expected);

        let distinct: std::collections::HashSet<&String> = nodes.iter().collect();
        prop_assert_eq!(distinct.len(), nodes.len());
    }

    #[test]
    fn prop_precise_route_hits_one_node(
        algorithm in table_algorithm(),
        user_id in any::<i64>(),
        order_id in -5_000i64..5_000,
    ) {
        let rule = range_rule(algorithm);
        let result = rule
            .route(
                "t_order",
                &ShardingConditions::new().with_equal("user_id", user_id).with_equal("order_id", order_id),
            )
            .expect("Failed to route");
        prop_assert_eq!(result.len(), 1);
    }

    #[test]
    fn prop_range_route_covers_every_value(
        algorithm in table_algorithm(),
        user_id in 0i64..100,
        lower in -2_000i64..2_000,
        width in 0i64..64,
    ) {
        let rule = range_rule(algorithm);
        let upper = lower + width;
        let range_result = rule
            .route(
                "t_order",
                &ShardingConditions::new()
                    .with_equal("user_id", user_id)
                    .with_range("order_id", ValueRange::closed(lower, upper)),
            )
            .expect("Failed to route range");

        for order_id in lower..=upper {
            let precise = rule
                .route(
                    "t_order",
                    &ShardingConditions::new().with_equal("user_id", user_id).with_equal("order_id", order_id),
                )
                .expect("Failed to route precise");
            let unit = &precise.units[0];
            prop_assert!(
                range_result.contains(unit.data_source(), unit.table()),
                "{} 不在范围路由结果 {:?} 中",
                unit.data_node,
                common::nodes(&range_result)
            );
        }
    }
}
