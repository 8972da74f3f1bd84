//! # Dependency Injection Abstractions
//!
//! 服务注册表的抽象层，定义注册表与服务、订阅者、注入目标以及宿主环境之间的接口。
//!
//! ## 核心接口
//!
//! - [`Service`] - 可注册服务的可选能力（依赖声明与生命周期回调）
//! - [`ServiceLocator`] - 注册表的只读视图
//! - [`ServiceObserver`] - 服务注册/注销订阅者
//! - [`Injectable`] - 依赖注入目标
//! - [`DependencyReader`] - 依赖声明读取器
//! - [`FallbackLocator`] / [`DefaultConstructor`] - 宿主环境提供的后备查找与默认构造

pub mod container;
pub mod discovery;
pub mod factory;
pub mod injection;
pub mod observer;
pub mod registry;
pub mod resolver;

pub use container::*;
pub use discovery::*;
pub use factory::*;
pub use injection::*;
pub use observer::*;
pub use registry::*;
pub use resolver::*;

pub use infrastructure_common::{RegistryError, RegistryResult, ServiceKey};
