use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::ops::Bound;

use shardrule::config::ShardingRuleConfig;
use shardrule::route::{RouteContext, ShardingConditions, ShardingPredicate, StatementKind};
use shardrule::rule::ShardingRule;
use shardrule::utils::logging;
use shardrule::{ShardingValue, ValueRange};

#[derive(Parser)]
#[command(version = "0.1.0", author = "ShardRule Contributors")]
enum Cli {
    /// Route one logical table and print the target data nodes
    Route {
        #[arg(short, long, default_value = "shardrule.toml")]
        config: String,
        #[arg(short, long)]
        table: String,
        /// Equality predicate `column=value`, repeat for IN lists
        #[arg(long = "eq")]
        equals: Vec<String>,
        /// Range predicate `column=lower..upper`, either end may be empty
        #[arg(long = "range")]
        ranges: Vec<String>,
        /// Route as a write statement
        #[arg(long)]
        write: bool,
        /// Route as an insert, generating the key column when absent
        #[arg(long, conflicts_with = "write")]
        insert: bool,
    },
    /// Print the actual data nodes of a logical table
    Nodes {
        #[arg(short, long, default_value = "shardrule.toml")]
        config: String,
        #[arg(short, long)]
        table: String,
    },
    /// Generate keys with the table's key generator
    Keygen {
        #[arg(short, long, default_value = "shardrule.toml")]
        config: String,
        #[arg(short, long)]
        table: String,
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let result = run(cli);
    logging::shutdown();
    result
}

fn run(cli: Cli) -> Result<()> {
    match cli {
        Cli::Route {
            config,
            table,
            equals,
            ranges,
            write,
            insert,
        } => {
            let rule = load_rule(&config)?;
            let conditions = parse_conditions(&equals, &ranges)?;
            let output = if insert {
                let insert = rule.route_insert(&table, conditions, &mut RouteContext::write())?;
                serde_json::to_string_pretty(&insert)?
            } else {
                let kind = if write {
                    StatementKind::Write
                } else {
                    StatementKind::Query
                };
                let route = rule.route_with_context(&table, &conditions, &mut RouteContext::new(kind))?;
                serde_json::to_string_pretty(&route)?
            };
            println!("{}", output);
        }
        Cli::Nodes { config, table } => {
            let rule = load_rule(&config)?;
            let table_rule = rule
                .table_rule(&table)
                .ok_or_else(|| anyhow!("逻辑表 '{}' 没有配置分片规则", table))?;
            println!("{}", serde_json::to_string_pretty(table_rule.actual_data_nodes())?);
        }
        Cli::Keygen {
            config,
            table,
            count,
        } => {
            let rule = load_rule(&config)?;
            let keys = (0..count)
                .map(|_| rule.generate_key(&table))
                .collect::<Result<Vec<_>, _>>()?;
            println!("{}", serde_json::to_string_pretty(&keys)?);
        }
    }
    Ok(())
}

fn load_rule(path: &str) -> Result<ShardingRule> {
    let config = ShardingRuleConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path))?;
    if let Err(e) = logging::init(&config.log) {
        eprintln!("日志初始化失败: {}", e);
    }
    Ok(ShardingRule::from_config(&config)?)
}

fn parse_conditions(equals: &[String], ranges: &[String]) -> Result<ShardingConditions> {
    let mut conditions = ShardingConditions::new();
    for text in equals {
        let (column, value) = split_assignment(text)?;
        let value: ShardingValue = value.parse()?;
        match conditions.get(column).cloned() {
            Some(ShardingPredicate::Equal(mut values)) => {
                values.push(value);
                conditions.insert(column, ShardingPredicate::Equal(values));
            }
            Some(ShardingPredicate::Range(_)) => {
                bail!("列 '{}' 不能同时使用等值和范围条件", column)
            }
            None => {
                conditions.insert(column, ShardingPredicate::equal(value));
            }
        }
    }
    for text in ranges {
        let (column, range) = split_assignment(text)?;
        if conditions.contains(column) {
            bail!("列 '{}' 重复指定了条件", column);
        }
        let (lower, upper) = range
            .split_once("..")
            .ok_or_else(|| anyhow!("范围条件 '{}' 应为 lower..upper", text))?;
        conditions.insert(
            column,
            ShardingPredicate::range(ValueRange::new(parse_bound(lower)?, parse_bound(upper)?)),
        );
    }
    Ok(conditions)
}

fn split_assignment(text: &str) -> Result<(&str, &str)> {
    let (column, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("条件 '{}' 应为 column=value", text))?;
    let column = column.trim();
    if column.is_empty() {
        bail!("条件 '{}' 缺少列名", text);
    }
    Ok((column, value.trim()))
}

fn parse_bound(text: &str) -> Result<Bound<ShardingValue>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Bound::Unbounded);
    }
    Ok(Bound::Included(text.parse()?))
}
