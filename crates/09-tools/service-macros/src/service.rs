//! 服务派生宏实现

use crate::utils::method_ident;
use proc_macro::TokenStream;
use quote::quote;
use syn::{
    parenthesized, punctuated::Punctuated, DeriveInput, Ident, LitStr, Result, Token, Type,
};

/// 服务参数
#[derive(Default)]
pub struct ServiceArgs {
    /// 依赖的服务类型
    pub dependencies: Vec<Type>,
    /// 否决回调
    pub can_be_registered: Option<Ident>,
    /// 注册完成回调
    pub on_registered: Option<Ident>,
    /// 注销前回调
    pub on_unregistered: Option<Ident>,
}

impl ServiceArgs {
    /// 从 `#[service(...)]` 属性中解析参数
    pub fn from_input(input: &DeriveInput) -> Result<Self> {
        let mut args = ServiceArgs::default();

        for attr in &input.attrs {
            if !attr.path().is_ident("service") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("depends_on") {
                    let content;
                    parenthesized!(content in meta.input);
                    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                    args.dependencies.extend(types);
                    Ok(())
                } else if meta.path.is_ident("can_be_registered") {
                    args.can_be_registered = Some(method_ident(&meta.value()?.parse::<LitStr>()?)?);
                    Ok(())
                } else if meta.path.is_ident("on_registered") {
                    args.on_registered = Some(method_ident(&meta.value()?.parse::<LitStr>()?)?);
                    Ok(())
                } else if meta.path.is_ident("on_unregistered") {
                    args.on_unregistered = Some(method_ident(&meta.value()?.parse::<LitStr>()?)?);
                    Ok(())
                } else {
                    Err(meta.error("不支持的 service 参数"))
                }
            })?;
        }

        Ok(args)
    }
}

/// 实现 #[derive(Service)] 宏
pub fn derive_service_impl(input: DeriveInput) -> TokenStream {
    let args = match ServiceArgs::from_input(&input) {
        Ok(args) => args,
        Err(e) => return e.to_compile_error().into(),
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let dependencies_fn = if args.dependencies.is_empty() {
        quote! {}
    } else {
        let dependencies = &args.dependencies;
        quote! {
            fn dependencies() -> ::std::vec::Vec<::di_abstractions::ServiceKey> {
                ::std::vec![
                    #(::di_abstractions::ServiceKey::of::<#dependencies>()),*
                ]
            }
        }
    };

    let can_be_registered_fn = args.can_be_registered.as_ref().map(|method| {
        quote! {
            fn can_be_registered(&self, registry: &dyn ::di_abstractions::ServiceLocator) -> bool {
                self.#method(registry)
            }
        }
    });

    let on_registered_fn = args.on_registered.as_ref().map(|method| {
        quote! {
            fn on_registered(&self, registry: &dyn ::di_abstractions::ServiceLocator) {
                self.#method(registry)
            }
        }
    });

    let on_unregistered_fn = args.on_unregistered.as_ref().map(|method| {
        quote! {
            fn on_unregistered(&self, registry: &dyn ::di_abstractions::ServiceLocator) {
                self.#method(registry)
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::di_abstractions::Service for #name #ty_generics #where_clause {
            #dependencies_fn
            #can_be_registered_fn
            #on_registered_fn
            #on_unregistered_fn
        }
    };

    TokenStream::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_parses_dependencies_and_hooks() {
        let input: DeriveInput = parse_quote! {
            #[service(depends_on(Database, cache::Cache), on_registered = "warm_up")]
            struct Repository;
        };

        let args = ServiceArgs::from_input(&input).unwrap();
        assert_eq!(args.dependencies.len(), 2);
        assert_eq!(args.on_registered.unwrap().to_string(), "warm_up");
        assert!(args.can_be_registered.is_none());
    }

    #[test]
    fn test_attributes_may_be_split() {
        let input: DeriveInput = parse_quote! {
            #[service(depends_on(Database))]
            #[service(depends_on(Cache), can_be_registered = "allowed")]
            struct Repository;
        };

        let args = ServiceArgs::from_input(&input).unwrap();
        assert_eq!(args.dependencies.len(), 2);
        assert!(args.can_be_registered.is_some());
    }

    #[test]
    fn test_rejects_unknown_argument() {
        let input: DeriveInput = parse_quote! {
            #[service(priority = 3)]
            struct Repository;
        };

        assert!(ServiceArgs::from_input(&input).is_err());
    }

    #[test]
    fn test_rejects_invalid_method_name() {
        let input: DeriveInput = parse_quote! {
            #[service(on_registered = "not a method")]
            struct Repository;
        };

        assert!(ServiceArgs::from_input(&input).is_err());
    }
}
