//! Casebench Macros
//!
//! Procedural macro for entry-point registration.
//!
//! `#[casebench::solution]` turns a free function into an `Invokable`
//! registration: it generates a call shim that takes each parameter out of
//! an `ArgumentVector`, a function listing the parameter kinds, and an
//! `inventory` submission of a `SolutionDef`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{FnArg, ItemFn, Type, parse_macro_input};

// ============================================================================
// Attribute Parsing Helpers
// ============================================================================

mod attr {
    use syn::meta::ParseNestedMeta;

    /// Get the attribute name as a string
    pub fn name(meta: &ParseNestedMeta) -> String {
        meta.path
            .get_ident()
            .map(|i| i.to_string())
            .unwrap_or_default()
    }

    /// Parse a string literal attribute: `attr = "value"`
    pub fn string(meta: &ParseNestedMeta) -> syn::Result<String> {
        let value: syn::LitStr = meta.value()?.parse()?;
        Ok(value.value())
    }

    /// Parse a boolean literal attribute: `attr = true`
    pub fn bool(meta: &ParseNestedMeta) -> syn::Result<bool> {
        let value: syn::LitBool = meta.value()?.parse()?;
        Ok(value.value())
    }

    /// Create an unknown attribute error
    pub fn unknown(meta: &ParseNestedMeta, name: &str) -> syn::Error {
        meta.error(format!("unknown attribute: {}", name))
    }
}

/// Register a solution entry point
///
/// # Example
///
/// ```ignore
/// #[casebench::solution]
/// fn solution(nums: Vec<i64>, target: i64) -> Vec<usize> { ... }
///
/// // Registered under another name, writing through the injected console
/// #[casebench::solution(name = "solution")]
/// fn solve(n: u32, out: &mut Console) -> u64 { ... }
///
/// // Driven on a current-thread tokio runtime
/// #[casebench::solution]
/// async fn solution(delay_ms: u64) -> String { ... }
/// ```
#[proc_macro_attribute]
pub fn solution(args: TokenStream, item: TokenStream) -> TokenStream {
    let args = TokenStream2::from(args);
    let func = parse_macro_input!(item as ItemFn);

    solution_impl(args, func)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// How one declared parameter is fed
enum Slot {
    /// Bound from the argument vector at this signature position
    Value { index: usize, ty: Box<Type> },
    /// The injected console
    Console,
}

fn solution_impl(args: TokenStream2, func: ItemFn) -> Result<TokenStream2, syn::Error> {
    validate_signature(&func)?;
    let mut config = parse_solution_config(args)?;
    let slots = classify_params(&func)?;

    let fn_name = &func.sig.ident;
    let name = config.name.take().unwrap_or_else(|| fn_name.to_string());
    let call_name = format_ident!("_casebench_call_{}", fn_name);
    let kinds_name = format_ident!("_casebench_kinds_{}", fn_name);

    let mut bindings = Vec::new();
    let mut call_args = Vec::new();
    let mut kinds = Vec::new();
    let mut uses_console = false;

    for slot in &slots {
        match slot {
            Slot::Value { index, ty } => {
                let var = format_ident!("__casebench_arg{}", index);
                bindings.push(quote! {
                    let #var: #ty = __casebench_args.take::<#ty>(#index)?;
                });
                call_args.push(quote! { #var });
                kinds.push(quote! { <#ty as ::casebench::Param>::kind() });
            }
            Slot::Console => {
                uses_console = true;
                call_args.push(quote! { &mut *__casebench_console });
            }
        }
    }

    let console_guard = if uses_console {
        quote! {}
    } else {
        quote! { let _ = __casebench_console; }
    };

    let invoke_block = if func.sig.asyncness.is_some() {
        generate_async_invoke(&config, fn_name, &call_args)
    } else {
        quote! { #fn_name(#(#call_args),*) }
    };

    Ok(quote! {
        #func

        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #call_name(
            __casebench_args: &mut ::casebench::ArgumentVector,
            __casebench_console: &mut ::casebench::Console,
        ) -> ::core::result::Result<::casebench::internal::serde_json::Value, ::casebench::CallError> {
            #console_guard
            #(#bindings)*
            let __casebench_ret = #invoke_block;
            ::casebench::encode_return(&__casebench_ret)
        }

        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #kinds_name() -> ::std::vec::Vec<::casebench::Kind> {
            ::std::vec![#(#kinds),*]
        }

        ::casebench::internal::inventory::submit! {
            ::casebench::SolutionDef {
                name: #name,
                call: #call_name,
                kinds: #kinds_name,
                file: file!(),
                line: line!(),
                module_path: module_path!(),
            }
        }
    })
}

fn generate_async_invoke(
    config: &SolutionConfig,
    fn_name: &syn::Ident,
    call_args: &[TokenStream2],
) -> TokenStream2 {
    let time = if config.enable_time {
        quote! { .enable_time() }
    } else {
        quote! {}
    };
    let io = if config.enable_io {
        quote! { .enable_io() }
    } else {
        quote! {}
    };

    quote! {
        {
            let rt = ::casebench::internal::tokio::runtime::Builder::new_current_thread()
                #time #io
                .build()
                .map_err(::casebench::CallError::Runtime)?;
            rt.block_on(#fn_name(#(#call_args),*))
        }
    }
}

struct SolutionConfig {
    name: Option<String>,
    enable_time: bool,
    enable_io: bool,
}

impl Default for SolutionConfig {
    fn default() -> Self {
        Self {
            name: None,
            enable_time: true,
            enable_io: true,
        }
    }
}

fn parse_solution_config(args: TokenStream2) -> Result<SolutionConfig, syn::Error> {
    let mut config = SolutionConfig::default();

    if args.is_empty() {
        return Ok(config);
    }

    let parser = syn::meta::parser(|meta| {
        let name = attr::name(&meta);
        match name.as_str() {
            "name" => config.name = Some(attr::string(&meta)?),
            "enable_time" => config.enable_time = attr::bool(&meta)?,
            "enable_io" => config.enable_io = attr::bool(&meta)?,
            _ => return Err(attr::unknown(&meta, &name)),
        }
        Ok(())
    });

    syn::parse::Parser::parse2(parser, args)?;

    if config.name.as_deref() == Some("") {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "Casebench: `name` must not be empty",
        ));
    }

    Ok(config)
}

fn validate_signature(func: &ItemFn) -> syn::Result<()> {
    if let Some(FnArg::Receiver(receiver)) = func.sig.inputs.first() {
        return Err(syn::Error::new_spanned(
            receiver,
            "Casebench: methods are not supported, annotate a free function",
        ));
    }
    if !func.sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &func.sig.generics,
            "Casebench: entry points must not be generic",
        ));
    }
    if let Some(variadic) = &func.sig.variadic {
        return Err(syn::Error::new_spanned(
            variadic,
            "Casebench: variadic entry points are not supported",
        ));
    }
    Ok(())
}

fn classify_params(func: &ItemFn) -> syn::Result<Vec<Slot>> {
    let mut slots = Vec::new();
    let mut index = 0usize;
    let mut seen_console = false;

    for input in &func.sig.inputs {
        let FnArg::Typed(pat_type) = input else {
            continue;
        };
        let ty = pat_type.ty.as_ref();

        if is_console(ty) {
            if seen_console {
                return Err(syn::Error::new_spanned(
                    ty,
                    "Casebench: at most one `&mut Console` parameter is allowed",
                ));
            }
            seen_console = true;
            slots.push(Slot::Console);
        } else if let Type::Reference(_) = ty {
            return Err(syn::Error::new_spanned(
                ty,
                "Casebench: parameters must be owned types (only `&mut Console` may be borrowed)",
            ));
        } else {
            slots.push(Slot::Value {
                index,
                ty: Box::new(ty.clone()),
            });
            index += 1;
        }
    }

    Ok(slots)
}

/// `&mut Console` under any path prefix
fn is_console(ty: &Type) -> bool {
    let Type::Reference(reference) = ty else {
        return false;
    };
    if reference.mutability.is_none() {
        return false;
    }
    match reference.elem.as_ref() {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Console"),
        _ => false,
    }
}
