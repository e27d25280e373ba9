use criterion::{black_box, criterion_group, criterion_main, Criterion};

use shardrule::config::{AlgorithmConfig, KeyGeneratorConfig, ShardingRuleConfig, ShardingStrategyConfig, TableRuleConfig};
use shardrule::route::{RouteContext, ShardingConditions};
use shardrule::rule::ShardingRule;
use shardrule::ValueRange;

fn create_rule() -> ShardingRule {
    let config = ShardingRuleConfig::new()
        .with_data_sources((0..8).map(|i| format!("ds{}", i)))
        .with_table(
            TableRuleConfig::new("t_order")
                .with_actual_data_nodes("ds${0..7}.t_order_${0..15}")
                .with_table_strategy(ShardingStrategyConfig::standard_with_range(
                    "order_id",
                    AlgorithmConfig::modulo(16),
                    AlgorithmConfig::modulo(16),
                ))
                .with_key_generator(KeyGeneratorConfig::increment("order_id")),
        )
        .with_table(
            TableRuleConfig::new("t_order_item")
                .with_actual_data_nodes("ds${0..7}.t_order_item_${0..15}")
                .with_table_strategy(ShardingStrategyConfig::inline(
                    "order_id",
                    "t_order_item_${order_id % 16}",
                )),
        )
        .with_binding_group("t_order, t_order_item")
        .with_default_database_strategy(ShardingStrategyConfig::standard(
            "user_id",
            AlgorithmConfig::modulo(8),
        ));
    ShardingRule::from_config(&config).expect("Failed to build rule")
}

fn bench_route(c: &mut Criterion) {
    let rule = create_rule();

    let precise = ShardingConditions::new().with_equal("user_id", 42).with_equal("order_id", 1001);
    c.bench_function("route_precise", |b| {
        b.iter(|| rule.route(black_box("t_order"), black_box(&precise)))
    });

    let range = ShardingConditions::new()
        .with_equal("user_id", 42)
        .with_range("order_id", ValueRange::closed(1000, 1005));
    c.bench_function("route_range", |b| {
        b.iter(|| rule.route(black_box("t_order"), black_box(&range)))
    });

    let broadcast = ShardingConditions::new();
    c.bench_function("route_broadcast", |b| {
        b.iter(|| rule.route(black_box("t_order"), black_box(&broadcast)))
    });

    c.bench_function("route_binding_pair", |b| {
        b.iter(|| {
            let mut context = RouteContext::query();
            let order = rule.route_with_context("t_order", &precise, &mut context);
            let item = rule.route_with_context("t_order_item", &precise, &mut context);
            (order, item)
        })
    });

    c.bench_function("route_insert_generated_key", |b| {
        b.iter(|| {
            rule.route_insert(
                "t_order",
                ShardingConditions::new().with_equal("user_id", 7),
                &mut RouteContext::write(),
            )
        })
    });
}

criterion_group!(benches, bench_route);
criterion_main!(benches);
