pub mod error;
pub mod murmur;
pub mod value;

// 错误和结果类型
pub use error::{
    ConfigError, ConfigResult, ErrorCode, PublicError, RoutingError, RoutingResult, ShardingError,
    ShardingResult, ToPublicError,
};

// 核心数据类型
pub use value::{ShardingValue, ValueRange};
