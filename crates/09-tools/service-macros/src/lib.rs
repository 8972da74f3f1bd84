//! # Service Macros
//!
//! 为服务注册表生成 `Service` 与 `Injectable` 实现的派生宏。
//!
//! ## 核心宏
//!
//! - [`Service`](derive@Service) - 依赖声明与生命周期回调
//! - [`Injectable`](derive@Injectable) - 依赖注入槽位
//!
//! ## 使用示例
//!
//! ```rust
//! use di_abstractions::{ServiceKey, Slot};
//! use service_macros::{Injectable, Service};
//!
//! #[derive(Service)]
//! pub struct Database;
//!
//! #[derive(Service)]
//! #[service(depends_on(Database))]
//! pub struct Repository;
//!
//! #[derive(Injectable, Default)]
//! pub struct ReportJob {
//!     database: Slot<Database>,
//! }
//!
//! assert_eq!(
//!     <Repository as di_abstractions::Service>::dependencies(),
//!     vec![ServiceKey::of::<Database>()]
//! );
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod injectable;
mod service;
mod utils;

/// 服务派生宏
///
/// 为类型实现 `di_abstractions::Service`。
///
/// # 参数
///
/// - `depends_on(TypeA, TypeB)` - 注册前必须存在的服务类型
/// - `can_be_registered = "method"` - 否决回调，签名 `fn(&self, &dyn ServiceLocator) -> bool`
/// - `on_registered = "method"` - 注册完成回调，签名 `fn(&self, &dyn ServiceLocator)`
/// - `on_unregistered = "method"` - 注销前回调，签名 `fn(&self, &dyn ServiceLocator)`
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Service)]
/// #[service(depends_on(Database, Cache), on_registered = "warm_up")]
/// pub struct Repository {
///     // 字段
/// }
/// ```
#[proc_macro_derive(Service, attributes(service))]
pub fn derive_service(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    service::derive_service_impl(input)
}

/// 注入目标派生宏
///
/// 为结构体实现 `di_abstractions::Injectable`。类型为 `Slot<T>` 的字段
/// 和标记了 `#[inject]` 的字段都会作为注入槽位。
///
/// # 参数
///
/// - `on_injected = "method"` - 注入完成回调，签名 `fn(&self)`
///
/// # 示例
///
/// ```rust,ignore
/// #[derive(Injectable)]
/// #[injectable(on_injected = "start")]
/// pub struct Dashboard {
///     repository: Slot<Repository>,
///     #[inject]
///     clock: ClockSlot,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::derive_injectable_impl(input)
}
