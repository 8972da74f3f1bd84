//! # 服务注册表实现
//!
//! 进程级服务注册表：按类型键存放共享服务实例，自动处理服务之间的依赖顺序。
//!
//! ## 主要能力
//!
//! - 注册时依赖未满足的服务进入等待队列，依赖到齐后自动完成注册
//! - 订阅服务的注册/注销事件
//! - 同步、延迟和异步三种依赖注入方式
//! - 一组服务全部就绪时触发的一次性回调
//!
//! ## 使用示例
//!
//! ```rust
//! use di_impl::{Service, ServiceKey, ServiceRegistry};
//! use std::sync::Arc;
//!
//! struct Database;
//! impl Service for Database {}
//!
//! struct Repository;
//! impl Service for Repository {
//!     fn dependencies() -> Vec<ServiceKey> {
//!         vec![ServiceKey::of::<Database>()]
//!     }
//! }
//!
//! let registry = ServiceRegistry::new();
//! registry.register(Arc::new(Repository));
//! assert!(!registry.has::<Repository>());
//!
//! registry.register(Arc::new(Database));
//! assert!(registry.has::<Repository>());
//! ```

mod catalog;
mod completion;
mod global;
mod injector;
mod observers;
mod pending;
mod registry;
mod store;
mod waiters;

pub use catalog::DependencyCatalog;
pub use global::{global, install_global, uninstall_global};
pub use registry::ServiceRegistry;

pub use di_abstractions::{
    CompletionHandle, Injectable, InjectionStatus, Registration, RegistryOptions, ResetReport,
    Service, ServiceEvent, ServiceKey, ServiceLocator, ServiceObserver, Slot,
};
pub use infrastructure_common::{RegistryError, RegistryResult};
pub use tokio_util::sync::CancellationToken;
