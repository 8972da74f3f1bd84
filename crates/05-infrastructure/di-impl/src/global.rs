//! 进程级注册表访问入口
//!
//! 注册表本身可以有多个实例，这里只保存"当前"注册表的句柄

use crate::registry::ServiceRegistry;
use di_abstractions::ResetReport;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{info, warn};

static GLOBAL_SERVICE_REGISTRY: Lazy<RwLock<Option<ServiceRegistry>>> =
    Lazy::new(|| RwLock::new(None));

/// 安装全局注册表，返回被替换的旧注册表
pub fn install_global(registry: ServiceRegistry) -> Option<ServiceRegistry> {
    let previous = GLOBAL_SERVICE_REGISTRY.write().replace(registry);
    if previous.is_some() {
        warn!("全局服务注册表已被替换");
    } else {
        info!("全局服务注册表已安装");
    }
    previous
}

/// 获取全局注册表
pub fn global() -> Option<ServiceRegistry> {
    GLOBAL_SERVICE_REGISTRY.read().clone()
}

/// 卸载全局注册表并清空其中的服务
pub fn uninstall_global() -> Option<ResetReport> {
    let removed = GLOBAL_SERVICE_REGISTRY.write().take();
    removed.map(|registry| {
        info!("全局服务注册表已卸载");
        registry.unregister_all()
    })
}
