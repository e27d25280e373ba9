//! 自定义断言辅助模块
//!
//! 提供测试中的常用断言函数

use shardrule::route::RouteResult;

/// 断言结果失败并匹配错误消息
pub fn assert_err_with<T: std::fmt::Debug, E: std::fmt::Display>(result: Result<T, E>, expected_msg: &str) {
    let err = result.expect_err("操作应该失败");
    let err_str = err.to_string();
    assert!(
        err_str.contains(expected_msg),
        "错误消息应包含 '{}', 实际是 '{}'",
        expected_msg,
        err_str
    );
}

/// 断言路由结果命中指定数量的数据节点
pub fn assert_route_count(result: &RouteResult, expected: usize) {
    assert_eq!(
        result.len(),
        expected,
        "{} 路由数量不匹配: 期望 {}, 实际 {:?}",
        result.logic_table,
        expected,
        result.units
    );
}

/// 断言路由结果按分片下标严格递增
pub fn assert_positions_sorted(result: &RouteResult) {
    assert!(
        result.units.windows(2).all(|w| w[0].position < w[1].position),
        "{} 路由结果未按分片下标排序: {:?}",
        result.logic_table,
        result.units
    );
}
