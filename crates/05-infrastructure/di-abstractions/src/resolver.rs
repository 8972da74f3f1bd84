//! 依赖声明读取接口

use infrastructure_common::ServiceKey;

/// 依赖声明读取器 trait
///
/// 给定服务类型，返回其注册前必须存在的服务键；
/// 返回 `None` 表示该类型没有声明，等同于没有前置依赖
pub trait DependencyReader: Send + Sync {
    /// 读取类型的依赖声明
    fn dependencies_of(&self, type_key: &ServiceKey) -> Option<Vec<ServiceKey>>;

    /// 计算在给定存在判定下仍缺失的依赖
    fn missing_dependencies(
        &self,
        type_key: &ServiceKey,
        is_present: &dyn Fn(&ServiceKey) -> bool,
    ) -> Vec<ServiceKey> {
        self.dependencies_of(type_key)
            .unwrap_or_default()
            .into_iter()
            .filter(|dependency| !is_present(dependency))
            .collect()
    }
}
