//! 通用工具函数

use crate::error::{RegistryError, Result};

/// 评分上限
pub const MAX_RATING: u8 = 5;

/// 校验必填字符串字段非空
pub fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(RegistryError::InvalidArgument(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// 校验评分在 [0, 5] 范围内，返回收窄后的评分
pub fn validate_rating(rating: i64) -> Result<u8> {
    match u8::try_from(rating) {
        Ok(rating) if rating <= MAX_RATING => Ok(rating),
        _ => Err(RegistryError::InvalidArgument(format!(
            "rating {} out of range 0..={}",
            rating, MAX_RATING
        ))),
    }
}
