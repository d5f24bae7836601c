//! Derive macros for syntax tree types.
//!
//! `ToTokens` refers to `hare_tokens` by absolute path. `SyntaxNode` and `ChildNodes` generate
//! implementations of the traits in `crate::tree`, so they are only usable within `hare_syntax`.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Field, Fields, LitStr};

#[proc_macro_derive(ToTokens)]
pub fn derive_to_tokens(tokens: TokenStream) -> TokenStream {
    let derive_input = parse_macro_input!(tokens as DeriveInput);
    let ident = &derive_input.ident;
    let (impl_generics, ty_generics, where_clause) = derive_input.generics.split_for_impl();
    match &derive_input.data {
        Data::Struct(s) => {
            let fields = s
                .fields
                .iter()
                .enumerate()
                .map(|(index, field)| {
                    field
                        .ident
                        .as_ref()
                        .map(|id| quote!( #id ))
                        .unwrap_or_else(|| {
                            let index = syn::Index::from(index);
                            quote! { #index }
                        })
                })
                .collect::<Vec<_>>();

            quote! (
                #[automatically_derived]
                impl #impl_generics ::hare_tokens::token::ToTokens for #ident #ty_generics #where_clause {
                    fn to_tokens(&self) -> ::hare_tokens::token::TokenStream {
                        ::hare_tokens::token::TokenStream::from_iter(
                            [#(
                                ::hare_tokens::token::ToTokens::to_tokens(&self.#fields)
                            ),*]
                            .into_iter()
                            .flatten()
                        )
                    }

                    fn to_token_tree(&self) -> ::hare_tokens::token::TokenTree {
                        ::hare_tokens::token::TokenTree::Node(Vec::from_iter(
                            [
                                #(::hare_tokens::token::ToTokens::to_token_tree(&self.#fields)),*
                            ]
                        ))
                    }
                }
            )
            .into()
        }
        Data::Enum(en) => {
            let mut matches = vec![];
            for variant in &en.variants {
                let id = &variant.ident;
                let fields = &variant.fields;

                let match_case = match fields {
                    Fields::Named(named) => {
                        let names = named
                            .named
                            .iter()
                            .flat_map(|i| i.ident.as_ref())
                            .collect::<Vec<_>>();
                        let bindings = names
                            .iter()
                            .map(|i| format_ident!("__self_{i}"))
                            .collect::<Vec<_>>();

                        (
                            quote! {
                                #ident::#id { #(#names: #bindings),* } => {
                                    ::hare_tokens::token::TokenStream::from_iter(
                                        [#(
                                           ::hare_tokens::token::ToTokens::to_tokens(#bindings)
                                        ),*]
                                        .into_iter()
                                        .flatten()
                                    )
                                }
                            },
                            quote! {
                                #ident::#id { #(#names: #bindings),* } => {
                                    ::hare_tokens::token::TokenTree::Node(
                                        Vec::from([
                                            #(::hare_tokens::token::ToTokens::to_token_tree(#bindings)),*
                                        ])
                                    )
                                }
                            },
                        )
                    }
                    Fields::Unnamed(unnamed) => {
                        let bindings = (0..unnamed.unnamed.len())
                            .map(|i| format_ident!("__self_{i}"))
                            .collect::<Vec<_>>();
                        (
                            quote! {
                                #ident::#id(#(#bindings),*) => {
                                    ::hare_tokens::token::TokenStream::from_iter(
                                        [#(
                                           ::hare_tokens::token::ToTokens::to_tokens(#bindings)
                                        ),*]
                                        .into_iter()
                                        .flatten()
                                    )
                                }
                            },
                            quote! {
                                #ident::#id(#(#bindings),*) => {
                                    ::hare_tokens::token::TokenTree::Node(
                                        Vec::from([
                                            #(::hare_tokens::token::ToTokens::to_token_tree(#bindings)),*
                                        ])
                                    )
                                }
                            },
                        )
                    }
                    Fields::Unit => (
                        quote! {
                            #ident::#id => { ::hare_tokens::token::TokenStream::new() }
                        },
                        quote! { #ident::#id => { ::hare_tokens::token::TokenTree::Leaf(vec![]) }},
                    ),
                };

                matches.push(match_case);
            }

            let (to_token_matches, to_token_tree_matches) =
                matches.into_iter().unzip::<_, _, Vec<_>, Vec<_>>();

            quote! (
                #[automatically_derived]
                impl #impl_generics ::hare_tokens::token::ToTokens for #ident #ty_generics #where_clause {
                    fn to_tokens(&self) -> ::hare_tokens::token::TokenStream {
                        match self {
                            #(#to_token_matches)*
                        }
                    }

                    fn to_token_tree(&self) -> ::hare_tokens::token::TokenTree {
                        match self {
                            #(#to_token_tree_matches)*
                        }
                    }
                }
            )
            .into()
        }
        Data::Union(_) => syn::Error::new(derive_input.span(), "unions not supported")
            .into_compile_error()
            .into(),
    }
}

/// Derives `SyntaxNode` (and `ChildNodes`).
///
/// On a struct, the struct becomes a node whose kind is its snake cased name, or the value of
/// `#[syntax(kind = "...")]`. Its children are collected from every field not marked
/// `#[syntax(skip)]`.
///
/// On an enum, every variant must hold exactly one node, and the enum is transparent: it reports
/// the kind and children of whichever node it holds.
#[proc_macro_derive(SyntaxNode, attributes(syntax))]
pub fn derive_syntax_node(tokens: TokenStream) -> TokenStream {
    let derive_input = parse_macro_input!(tokens as DeriveInput);
    let ident = &derive_input.ident;
    let (impl_generics, ty_generics, where_clause) = derive_input.generics.split_for_impl();
    match &derive_input.data {
        Data::Struct(s) => {
            let kind = match node_kind(&derive_input.attrs) {
                Ok(Some(kind)) => kind,
                Ok(None) => snake_case(&ident.to_string()),
                Err(e) => return e.into_compile_error().into(),
            };
            let fields = match child_fields(&s.fields) {
                Ok(fields) => fields,
                Err(e) => return e.into_compile_error().into(),
            };

            quote! (
                #[automatically_derived]
                impl #impl_generics crate::tree::SyntaxNode for #ident #ty_generics #where_clause {
                    fn kind(&self) -> &'static str {
                        #kind
                    }

                    fn children(&self) -> Vec<&dyn crate::tree::SyntaxNode> {
                        let mut children = Vec::new();
                        #(crate::tree::ChildNodes::collect_children(&self.#fields, &mut children);)*
                        children
                    }
                }

                #[automatically_derived]
                impl #impl_generics crate::tree::ChildNodes for #ident #ty_generics #where_clause {
                    fn collect_children<'a>(&'a self, out: &mut Vec<&'a dyn crate::tree::SyntaxNode>) {
                        out.push(self);
                    }
                }
            )
            .into()
        }
        Data::Enum(en) => {
            let mut variants = vec![];
            for variant in &en.variants {
                match &variant.fields {
                    Fields::Unnamed(unnamed) if unnamed.unnamed.len() == 1 => {
                        variants.push(&variant.ident);
                    }
                    _ => {
                        return syn::Error::new(
                            variant.span(),
                            "syntax node enums must have exactly one unnamed field per variant",
                        )
                        .into_compile_error()
                        .into()
                    }
                }
            }

            quote! (
                #[automatically_derived]
                impl #impl_generics crate::tree::SyntaxNode for #ident #ty_generics #where_clause {
                    fn kind(&self) -> &'static str {
                        match self {
                            #(#ident::#variants(node) => crate::tree::SyntaxNode::kind(node),)*
                        }
                    }

                    fn children(&self) -> Vec<&dyn crate::tree::SyntaxNode> {
                        match self {
                            #(#ident::#variants(node) => crate::tree::SyntaxNode::children(node),)*
                        }
                    }
                }

                #[automatically_derived]
                impl #impl_generics crate::tree::ChildNodes for #ident #ty_generics #where_clause {
                    fn collect_children<'a>(&'a self, out: &mut Vec<&'a dyn crate::tree::SyntaxNode>) {
                        match self {
                            #(#ident::#variants(node) => crate::tree::ChildNodes::collect_children(node, out),)*
                        }
                    }
                }
            )
            .into()
        }
        Data::Union(_) => syn::Error::new(derive_input.span(), "unions not supported")
            .into_compile_error()
            .into(),
    }
}

/// Derives `ChildNodes` for a type that groups nodes without being a node itself.
///
/// Structs contribute the children of every field not marked `#[syntax(skip)]`. Enum variants
/// contribute the children of all their fields.
#[proc_macro_derive(ChildNodes, attributes(syntax))]
pub fn derive_child_nodes(tokens: TokenStream) -> TokenStream {
    let derive_input = parse_macro_input!(tokens as DeriveInput);
    let ident = &derive_input.ident;
    let (impl_generics, ty_generics, where_clause) = derive_input.generics.split_for_impl();
    match &derive_input.data {
        Data::Struct(s) => {
            let fields = match child_fields(&s.fields) {
                Ok(fields) => fields,
                Err(e) => return e.into_compile_error().into(),
            };
            quote! (
                #[automatically_derived]
                impl #impl_generics crate::tree::ChildNodes for #ident #ty_generics #where_clause {
                    fn collect_children<'a>(&'a self, out: &mut Vec<&'a dyn crate::tree::SyntaxNode>) {
                        #(crate::tree::ChildNodes::collect_children(&self.#fields, out);)*
                    }
                }
            )
            .into()
        }
        Data::Enum(en) => {
            let arms = en.variants.iter().map(|variant| {
                let id = &variant.ident;
                match &variant.fields {
                    Fields::Named(named) => {
                        let names = named
                            .named
                            .iter()
                            .flat_map(|f| f.ident.as_ref())
                            .collect::<Vec<_>>();
                        quote! {
                            #ident::#id { #(#names),* } => {
                                #(crate::tree::ChildNodes::collect_children(#names, out);)*
                            }
                        }
                    }
                    Fields::Unnamed(unnamed) => {
                        let bindings = (0..unnamed.unnamed.len())
                            .map(|i| format_ident!("__self_{i}"))
                            .collect::<Vec<_>>();
                        quote! {
                            #ident::#id(#(#bindings),*) => {
                                #(crate::tree::ChildNodes::collect_children(#bindings, out);)*
                            }
                        }
                    }
                    Fields::Unit => quote! { #ident::#id => {} },
                }
            });
            quote! (
                #[automatically_derived]
                impl #impl_generics crate::tree::ChildNodes for #ident #ty_generics #where_clause {
                    fn collect_children<'a>(&'a self, out: &mut Vec<&'a dyn crate::tree::SyntaxNode>) {
                        match self {
                            #(#arms)*
                        }
                    }
                }
            )
            .into()
        }
        Data::Union(_) => syn::Error::new(derive_input.span(), "unions not supported")
            .into_compile_error()
            .into(),
    }
}

fn node_kind(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut kind = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("syntax")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("kind") {
                let lit: LitStr = meta.value()?.parse()?;
                kind = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("expected `kind = \"...\"`"))
            }
        })?;
    }
    Ok(kind)
}

fn is_skipped(field: &Field) -> syn::Result<bool> {
    let mut skip = false;
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("syntax")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

fn child_fields(fields: &Fields) -> syn::Result<Vec<syn::Member>> {
    let mut members = vec![];
    for (index, field) in fields.iter().enumerate() {
        if is_skipped(field)? {
            continue;
        }
        members.push(match &field.ident {
            Some(ident) => syn::Member::Named(ident.clone()),
            None => syn::Member::Unnamed(syn::Index::from(index)),
        });
    }
    Ok(members)
}

fn snake_case(ident: &str) -> String {
    let mut snake = String::with_capacity(ident.len() + 4);
    for (idx, c) in ident.char_indices() {
        if c.is_uppercase() {
            if idx != 0 {
                snake.push('_');
            }
            snake.extend(c.to_lowercase());
        } else {
            snake.push(c);
        }
    }
    snake
}
