//! 服务类型元数据
//!
//! 提供以类型为寻址方式的服务键

use std::any::TypeId;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 服务键
///
/// 以 [`TypeId`] 标识一个服务契约，注册表中每个键同一时刻最多对应一个实例。
/// 相等性、哈希与排序只依据 `TypeId`，类型名称仅用于日志和诊断。
#[derive(Clone, Copy)]
pub struct ServiceKey {
    id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    /// 从类型获取服务键，支持 `dyn Trait` 之类的非定长类型
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 类型ID
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// 完整类型名称（包含模块路径）
    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }

    /// 检查服务键是否对应类型 `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

/// 去掉模块路径，保留泛型参数部分
fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(pos) => &full[pos + 2..],
        None => full,
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for ServiceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ServiceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceKey").field(&self.name).finish()
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// 将服务键列表格式化为逗号分隔的名称，用于日志和错误信息
pub fn describe_keys<'a, I>(keys: I) -> String
where
    I: IntoIterator<Item = &'a ServiceKey>,
{
    keys.into_iter()
        .map(|key| key.short_name())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Database;
    trait Logger {}

    mod nested {
        pub struct Wrapper<T>(pub T);
    }

    #[test]
    fn test_key_identity_follows_type() {
        assert_eq!(ServiceKey::of::<Database>(), ServiceKey::of::<Database>());
        assert_ne!(ServiceKey::of::<Database>(), ServiceKey::of::<String>());
        assert!(ServiceKey::of::<dyn Logger>().is::<dyn Logger>());
    }

    #[test]
    fn test_short_name() {
        assert_eq!(ServiceKey::of::<Database>().short_name(), "Database");
        assert_eq!(ServiceKey::of::<Database>().to_string(), "Database");
        let generic = ServiceKey::of::<nested::Wrapper<u32>>();
        assert!(generic.short_name().starts_with("Wrapper<"));
    }

    #[test]
    fn test_describe_keys() {
        let keys = [ServiceKey::of::<Database>(), ServiceKey::of::<String>()];
        assert_eq!(describe_keys(&keys), "Database, String");
    }
}
