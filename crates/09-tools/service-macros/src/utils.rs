//! 宏工具函数

use syn::{Attribute, Ident, LitStr, Result, Type};

/// 将字符串字面量解析为方法名
pub fn method_ident(lit: &LitStr) -> Result<Ident> {
    lit.parse::<Ident>()
        .map_err(|_| syn::Error::new(lit.span(), format!("无效的方法名: {}", lit.value())))
}

/// 检查类型是否为 Slot<T>
pub fn is_slot_type(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Slot"),
        _ => false,
    }
}

/// 检查属性列表中是否包含指定名称的属性
pub fn has_attribute(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}
