//! 依赖声明目录
//!
//! 类型到依赖声明的显式映射。显式声明优先，其次是类型首次注册时记录的
//! [`Service::dependencies`](di_abstractions::Service::dependencies)。

use di_abstractions::DependencyReader;
use infrastructure_common::ServiceKey;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct DependencyCatalog {
    declarations: HashMap<ServiceKey, Vec<ServiceKey>>,
}

impl DependencyCatalog {
    /// 创建空目录
    pub fn new() -> Self {
        Self::default()
    }

    /// 显式声明（覆盖已有声明）
    pub fn declare(&mut self, type_key: ServiceKey, dependencies: Vec<ServiceKey>) {
        self.declarations.insert(type_key, dependencies);
    }

    /// 类型尚无声明时记录
    pub fn record_if_absent(&mut self, type_key: ServiceKey, declaration: Vec<ServiceKey>) {
        self.declarations.entry(type_key).or_insert(declaration);
    }

    /// 已记录声明的类型数量
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl DependencyReader for DependencyCatalog {
    fn dependencies_of(&self, type_key: &ServiceKey) -> Option<Vec<ServiceKey>> {
        self.declarations.get(type_key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Api;
    struct Database;
    struct Cache;

    #[test]
    fn test_explicit_declaration_wins() {
        let mut catalog = DependencyCatalog::new();
        catalog.declare(ServiceKey::of::<Api>(), vec![ServiceKey::of::<Cache>()]);
        catalog.record_if_absent(ServiceKey::of::<Api>(), vec![ServiceKey::of::<Database>()]);

        assert_eq!(
            catalog.dependencies_of(&ServiceKey::of::<Api>()),
            Some(vec![ServiceKey::of::<Cache>()])
        );
    }

    #[test]
    fn test_missing_dependencies_filters_present_keys() {
        let mut catalog = DependencyCatalog::new();
        catalog.declare(
            ServiceKey::of::<Api>(),
            vec![ServiceKey::of::<Database>(), ServiceKey::of::<Cache>()],
        );
        let database = ServiceKey::of::<Database>();
        let missing =
            catalog.missing_dependencies(&ServiceKey::of::<Api>(), &|key| *key == database);
        assert_eq!(missing, vec![ServiceKey::of::<Cache>()]);
    }

    #[test]
    fn test_undeclared_type_has_no_prerequisites() {
        let catalog = DependencyCatalog::new();
        assert!(catalog.dependencies_of(&ServiceKey::of::<Api>()).is_none());
        assert!(catalog
            .missing_dependencies(&ServiceKey::of::<Api>(), &|_| false)
            .is_empty());
    }
}
