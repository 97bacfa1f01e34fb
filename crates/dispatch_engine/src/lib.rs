//! # Dispatch Engine
//!
//! 生物特征下发引擎。
//!
//! 负责：
//! - 校验下发请求
//! - 构建规范载荷（按需读缓存）
//! - 经注册表解析适配器并逐设备 fan-out
//! - 聚合逐设备结果，隔离局部失败
//!
//! 同步路径在调用方任务内执行；异步与批量路径经有界工作池执行。

mod batch;
mod engine;
mod handle;
mod memory;
mod metrics;
mod payload;
mod validate;

pub use contracts::{DispatchRequest, DispatchResult};
pub use engine::DispatchEngine;
pub use handle::DispatchHandle;
pub use memory::{MemoryPayloadCache, MemoryTemplateStore};
pub use metrics::{EngineMetrics, EngineMetricsSnapshot};
pub use validate::validate_request;
