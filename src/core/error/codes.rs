//! 对外错误码定义
//!
//! 本模块定义标准化的错误码体系，供执行管道和运维工具使用：
//! - 执行管道根据错误码决定是否中止语句
//! - 命令行工具输出稳定的错误码
//!
//! 错误码格式: XXYY
//! - XX: 错误类别 (00=成功, 01=配置, 02=路由, 03=主键生成, 09=系统)
//! - YY: 具体错误

use serde::{Deserialize, Serialize};

/// 对外错误码
///
/// 错误码一旦定义不应随意修改，保证调用方兼容性
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // ==================== 成功 (00xx) ====================
    Success = 0,

    // ==================== 配置错误 (01xx) ====================
    /// 通用配置错误
    InvalidConfiguration = 100,
    /// 数据节点表达式或行表达式无效
    InvalidExpression = 101,
    /// 引用了未配置的数据源
    UnknownDataSource = 102,
    /// 重复定义（逻辑表、数据源、主键生成器等）
    DuplicateDefinition = 103,
    /// 绑定表组不一致
    BindingMismatch = 104,
    /// 分片算法未知或参数无效
    InvalidAlgorithm = 105,

    // ==================== 路由错误 (02xx) ====================
    /// 通用路由错误
    RoutingFailed = 200,
    /// 逻辑表没有对应的分片规则
    TableRuleNotFound = 201,
    /// 分片值无法匹配任何分片
    NoMatchingShard = 202,
    /// 路由结果不唯一
    AmbiguousRoute = 203,
    /// 分片值类型不受支持
    UnsupportedValue = 204,

    // ==================== 主键生成错误 (03xx) ====================
    /// 未配置主键生成器
    KeyGeneratorMissing = 300,
    /// 主键生成器耗尽或时钟异常
    KeyGeneratorUnavailable = 301,

    // ==================== 系统错误 (09xx) ====================
    /// 内部错误
    InternalError = 900,
    /// 未知错误
    Unknown = 999,
}

impl ErrorCode {
    /// 获取错误码的 i32 值
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    /// 根据 i32 值获取错误码
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(ErrorCode::Success),
            100 => Some(ErrorCode::InvalidConfiguration),
            101 => Some(ErrorCode::InvalidExpression),
            102 => Some(ErrorCode::UnknownDataSource),
            103 => Some(ErrorCode::DuplicateDefinition),
            104 => Some(ErrorCode::BindingMismatch),
            105 => Some(ErrorCode::InvalidAlgorithm),
            200 => Some(ErrorCode::RoutingFailed),
            201 => Some(ErrorCode::TableRuleNotFound),
            202 => Some(ErrorCode::NoMatchingShard),
            203 => Some(ErrorCode::AmbiguousRoute),
            204 => Some(ErrorCode::UnsupportedValue),
            300 => Some(ErrorCode::KeyGeneratorMissing),
            301 => Some(ErrorCode::KeyGeneratorUnavailable),
            900 => Some(ErrorCode::InternalError),
            999 => Some(ErrorCode::Unknown),
            _ => None,
        }
    }

    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self.as_i32() {
            0 => ErrorCategory::Success,
            100..=199 => ErrorCategory::Configuration,
            200..=299 => ErrorCategory::Routing,
            300..=399 => ErrorCategory::KeyGeneration,
            900..=999 => ErrorCategory::System,
            _ => ErrorCategory::Unknown,
        }
    }

    /// 获取默认的错误消息
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "成功",
            ErrorCode::InvalidConfiguration => "配置错误",
            ErrorCode::InvalidExpression => "表达式无效",
            ErrorCode::UnknownDataSource => "数据源未配置",
            ErrorCode::DuplicateDefinition => "重复定义",
            ErrorCode::BindingMismatch => "绑定表不一致",
            ErrorCode::InvalidAlgorithm => "分片算法无效",
            ErrorCode::RoutingFailed => "路由失败",
            ErrorCode::TableRuleNotFound => "分片规则不存在",
            ErrorCode::NoMatchingShard => "分片值无法匹配",
            ErrorCode::AmbiguousRoute => "路由结果不唯一",
            ErrorCode::UnsupportedValue => "分片值类型不受支持",
            ErrorCode::KeyGeneratorMissing => "未配置主键生成器",
            ErrorCode::KeyGeneratorUnavailable => "主键生成器不可用",
            ErrorCode::InternalError => "内部错误",
            ErrorCode::Unknown => "未知错误",
        }
    }

    /// 判断是否为成功状态
    pub fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// 判断是否为启动期错误
    ///
    /// 启动期错误意味着规则无法构建，进程应当快速失败
    pub fn is_startup_error(&self) -> bool {
        matches!(self.category(), ErrorCategory::Configuration)
    }
}

impl Default for ErrorCode {
    fn default() -> Self {
        ErrorCode::Success
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.as_i32(), self.default_message())
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Success,
    Configuration,
    Routing,
    KeyGeneration,
    System,
    Unknown,
}

/// 对外错误信息 - 用于序列化输出
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicError {
    /// 错误码
    pub code: ErrorCode,
    /// 错误消息
    pub message: String,
}

impl PublicError {
    /// 创建新的对外错误
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// 使用默认消息创建错误
    pub fn with_default_message(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
        }
    }
}

/// 内部错误到对外错误的转换 trait
pub trait ToPublicError {
    /// 转换为对外错误
    fn to_public_error(&self) -> PublicError {
        PublicError::new(self.to_error_code(), self.to_public_message())
    }

    /// 获取对外错误码
    fn to_error_code(&self) -> ErrorCode;

    /// 获取对外错误消息
    fn to_public_message(&self) -> String;
}
