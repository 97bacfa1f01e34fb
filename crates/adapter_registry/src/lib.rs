//! # Adapter Registry
//!
//! 适配器注册与解析模块。
//!
//! 负责：
//! - 按名称注册/注销设备适配器
//! - 按声明类型建立解析索引
//! - 为每个目标设备解析可用适配器
//!
//! 注册与解析可并发进行，调用方无需额外加锁。

mod mock;
mod registry;

pub use contracts::DeviceAdapter;
pub use mock::{MockAdapter, MockBehavior};
pub use registry::{AdapterRegistry, RegistryStats};
