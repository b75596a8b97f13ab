//! Derive macros for the backdrop pattern engine.
//!
//! This crate provides one derive macro:
//!
//! - [`ShaderUniforms`] - Turns a typed uniform record into GLSL declarations
//!   and an ordered list of named uniform values
//!
//! # Usage
//!
//! The macro is re-exported from the main `backdrop` crate. You don't need
//! to add this crate directly:
//!
//! ```ignore
//! use backdrop::prelude::*;
//!
//! #[derive(ShaderUniforms, Clone, Debug)]
//! struct Glow {
//!     time: f32,
//!     color_a: Vec3,
//!     #[uniform(name = "bgColor")]
//!     background: Vec3,
//!     use_gradient: bool,
//! }
//! ```
//!
//! # Naming
//!
//! Field names are converted from `snake_case` to the `camelCase` names the
//! shader programs use (`max_distance` becomes `maxDistance`). Override a name
//! with `#[uniform(name = "...")]`.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Type};

/// Derive macro for typed shader uniform records.
///
/// Every field is always present, so the render stage never has to check
/// whether a uniform exists before assigning it.
///
/// # Generated Items
///
/// For a struct `PlaneUniforms`:
///
/// - `impl backdrop::uniforms::ShaderUniforms for PlaneUniforms`
/// - `GLSL_DECLARATIONS` - one `uniform <type> <name>;` line per field, in
///   declaration order
/// - `entries()` - `(glsl_name, UniformValue)` pairs in the same order
///
/// # Supported Types
///
/// | Rust Type | GLSL Type | Value |
/// |-----------|-----------|-------|
/// | `f32` | `float` | `UniformValue::F32` |
/// | `u32` | `float` | `UniformValue::F32` (converted) |
/// | `bool` | `float` | `UniformValue::F32` (1.0 / 0.0) |
/// | `Vec2` | `vec2` | `UniformValue::Vec2` |
/// | `Vec3` | `vec3` | `UniformValue::Vec3` |
///
/// # Panics
///
/// The macro panics at compile time if:
/// - Applied to an enum or a tuple struct
/// - Any field has an unsupported type
/// - A `#[uniform(...)]` attribute is malformed
#[proc_macro_derive(ShaderUniforms, attributes(uniform))]
pub fn derive_shader_uniforms(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("ShaderUniforms derive only supports structs with named fields"),
        },
        _ => panic!("ShaderUniforms derive only supports structs"),
    };

    let mut declarations = String::new();
    let mut entries = Vec::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .expect("named fields always carry an identifier");
        let glsl_name =
            uniform_rename(&field.attrs).unwrap_or_else(|| camel_case(&field_name.to_string()));
        let type_info = uniform_type_info(&field.ty);

        declarations.push_str(&format!("uniform {} {};\n", type_info.glsl_type, glsl_name));

        let value = value_expr(field_name, type_info.kind);
        entries.push(quote! { (#glsl_name, #value) });
    }

    let count = entries.len();

    let expanded = quote! {
        impl backdrop::uniforms::ShaderUniforms for #name {
            const GLSL_DECLARATIONS: &'static str = #declarations;

            fn entries(&self) -> Vec<(&'static str, backdrop::uniforms::UniformValue)> {
                let mut entries = Vec::with_capacity(#count);
                #(entries.push(#entries);)*
                entries
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Clone, Copy)]
enum UniformKind {
    Float,
    Unsigned,
    Flag,
    Vec2,
    Vec3,
}

struct UniformTypeInfo {
    glsl_type: &'static str,
    kind: UniformKind,
}

/// Map a Rust field type to its GLSL uniform type.
fn uniform_type_info(ty: &Type) -> UniformTypeInfo {
    let type_str = quote!(#ty).to_string().replace(' ', "");

    match type_str.as_str() {
        "f32" => UniformTypeInfo {
            glsl_type: "float",
            kind: UniformKind::Float,
        },
        "u32" => UniformTypeInfo {
            glsl_type: "float",
            kind: UniformKind::Unsigned,
        },
        "bool" => UniformTypeInfo {
            glsl_type: "float",
            kind: UniformKind::Flag,
        },
        "Vec2" | "glam::Vec2" => UniformTypeInfo {
            glsl_type: "vec2",
            kind: UniformKind::Vec2,
        },
        "Vec3" | "glam::Vec3" => UniformTypeInfo {
            glsl_type: "vec3",
            kind: UniformKind::Vec3,
        },
        _ => panic!("Unsupported type in ShaderUniforms struct: {}", type_str),
    }
}

/// Generate the `UniformValue` expression reading one field.
fn value_expr(field_name: &Ident, kind: UniformKind) -> proc_macro2::TokenStream {
    match kind {
        UniformKind::Float => {
            quote! { backdrop::uniforms::UniformValue::F32(self.#field_name) }
        }
        UniformKind::Unsigned => {
            quote! { backdrop::uniforms::UniformValue::F32(self.#field_name as f32) }
        }
        UniformKind::Flag => {
            quote! {
                backdrop::uniforms::UniformValue::F32(if self.#field_name { 1.0 } else { 0.0 })
            }
        }
        UniformKind::Vec2 => {
            quote! { backdrop::uniforms::UniformValue::Vec2(self.#field_name) }
        }
        UniformKind::Vec3 => {
            quote! { backdrop::uniforms::UniformValue::Vec3(self.#field_name) }
        }
    }
}

/// Read `#[uniform(name = "...")]` if present.
fn uniform_rename(attrs: &[Attribute]) -> Option<String> {
    let mut rename = None;
    for attr in attrs {
        if !attr.path().is_ident("uniform") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let lit: LitStr = meta.value()?.parse()?;
                rename = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("expected `name = \"...\"`"))
            }
        })
        .unwrap_or_else(|e| panic!("invalid #[uniform] attribute: {}", e));
    }
    rename
}

/// `snake_case` to `camelCase`.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}
