//! 所有者访问控制

use registry_core::{Identity, RegistryError, Result};
use std::fmt::Display;

/// 校验调用者是否为记录的所有者
///
/// 未设置的身份永远无法通过校验，因此对不存在记录（零值所有者）的写入会被拒绝。
pub fn authorize(owner: &Identity, caller: &Identity, resource: impl Display) -> Result<()> {
    if caller.is_unset() || owner != caller {
        tracing::warn!("Unauthorized access to {} by {}", resource, caller);
        return Err(RegistryError::Unauthorized(format!(
            "{} is not owned by {}",
            resource, caller
        )));
    }
    Ok(())
}
