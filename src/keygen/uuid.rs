//! UUID 主键生成器

use ::uuid::Uuid;

use crate::config::KeyGeneratorKind;
use crate::core::error::ConfigResult;
use crate::core::value::ShardingValue;
use crate::keygen::KeyGenerator;

/// 生成不带连字符的 32 位十六进制随机 UUID
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidKeyGenerator;

impl UuidKeyGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn next_uuid(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

impl KeyGenerator for UuidKeyGenerator {
    fn kind(&self) -> KeyGeneratorKind {
        KeyGeneratorKind::Uuid
    }

    fn next_key(&self) -> ConfigResult<ShardingValue> {
        Ok(ShardingValue::Str(self.next_uuid()))
    }
}
