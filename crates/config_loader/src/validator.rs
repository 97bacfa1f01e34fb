//! 配置校验模块
//!
//! 校验规则：
//! - pool.max_concurrent >= 1
//! - batch.chunk_size >= 1
//! - adapter_timeout_ms > 0 (如设置)

use contracts::{DispatchEngineConfig, DispatchError};

/// 校验 DispatchEngineConfig
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &DispatchEngineConfig) -> Result<(), DispatchError> {
    if config.pool.max_concurrent == 0 {
        return Err(DispatchError::config_validation(
            "pool.max_concurrent",
            "must be >= 1",
        ));
    }
    if config.batch.chunk_size == 0 {
        return Err(DispatchError::config_validation(
            "batch.chunk_size",
            "must be >= 1",
        ));
    }
    if let Some(timeout_ms) = config.adapter_timeout_ms {
        if timeout_ms == 0 {
            return Err(DispatchError::config_validation(
                "adapter_timeout_ms",
                "must be > 0 when set",
            ));
        }
    }
    Ok(())
}
