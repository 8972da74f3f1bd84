//! 注入目标派生宏实现

use crate::utils::{has_attribute, is_slot_type, method_ident};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, Index, LitStr, Result};

/// 注入目标参数
#[derive(Default)]
pub struct InjectableArgs {
    /// 注入完成回调
    pub on_injected: Option<Ident>,
}

impl InjectableArgs {
    /// 从 `#[injectable(...)]` 属性中解析参数
    pub fn from_input(input: &DeriveInput) -> Result<Self> {
        let mut args = InjectableArgs::default();

        for attr in &input.attrs {
            if !attr.path().is_ident("injectable") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("on_injected") {
                    args.on_injected = Some(method_ident(&meta.value()?.parse::<LitStr>()?)?);
                    Ok(())
                } else {
                    Err(meta.error("不支持的 injectable 参数"))
                }
            })?;
        }

        Ok(args)
    }
}

/// 收集注入槽位字段的访问表达式
pub fn slot_accessors(input: &DeriveInput) -> Result<Vec<TokenStream2>> {
    let data = match &input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Injectable 只能用于结构体",
            ))
        }
    };

    let accessors = match &data.fields {
        Fields::Named(fields) => fields
            .named
            .iter()
            .filter(|field| has_attribute(&field.attrs, "inject") || is_slot_type(&field.ty))
            .filter_map(|field| field.ident.as_ref())
            .map(|ident| quote! { self.#ident })
            .collect(),
        Fields::Unnamed(fields) => fields
            .unnamed
            .iter()
            .enumerate()
            .filter(|(_, field)| has_attribute(&field.attrs, "inject") || is_slot_type(&field.ty))
            .map(|(position, _)| {
                let index = Index::from(position);
                quote! { self.#index }
            })
            .collect(),
        Fields::Unit => Vec::new(),
    };

    Ok(accessors)
}

/// 实现 #[derive(Injectable)] 宏
pub fn derive_injectable_impl(input: DeriveInput) -> TokenStream {
    let args = match InjectableArgs::from_input(&input) {
        Ok(args) => args,
        Err(e) => return e.to_compile_error().into(),
    };
    let accessors = match slot_accessors(&input) {
        Ok(accessors) => accessors,
        Err(e) => return e.to_compile_error().into(),
    };

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let on_injected_fn = args.on_injected.as_ref().map(|method| {
        quote! {
            fn on_injected(&self) {
                self.#method()
            }
        }
    });

    let expanded = quote! {
        impl #impl_generics ::di_abstractions::Injectable for #name #ty_generics #where_clause {
            fn injection_slots(&self) -> ::std::vec::Vec<&dyn ::di_abstractions::InjectionSlot> {
                ::std::vec![
                    #(&#accessors as &dyn ::di_abstractions::InjectionSlot),*
                ]
            }

            #on_injected_fn
        }
    };

    TokenStream::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_collects_slot_and_marked_fields() {
        let input: DeriveInput = parse_quote! {
            struct Dashboard {
                repository: Slot<Repository>,
                #[inject]
                clock: ClockSlot,
                title: String,
            }
        };

        let accessors = slot_accessors(&input).unwrap();
        let rendered: Vec<String> = accessors.iter().map(|tokens| tokens.to_string()).collect();
        assert_eq!(rendered, vec!["self . repository", "self . clock"]);
    }

    #[test]
    fn test_tuple_struct_uses_indices() {
        let input: DeriveInput = parse_quote! {
            struct Pair(String, Slot<Database>);
        };

        let accessors = slot_accessors(&input).unwrap();
        assert_eq!(accessors.len(), 1);
        assert_eq!(accessors[0].to_string(), "self . 1");
    }

    #[test]
    fn test_rejects_enums() {
        let input: DeriveInput = parse_quote! {
            enum Mode { A, B }
        };

        assert!(slot_accessors(&input).is_err());
    }

    #[test]
    fn test_parses_on_injected() {
        let input: DeriveInput = parse_quote! {
            #[injectable(on_injected = "start")]
            struct Dashboard;
        };

        let args = InjectableArgs::from_input(&input).unwrap();
        assert_eq!(args.on_injected.unwrap().to_string(), "start");
    }
}
