//! Module: discover
//! Responsibility: find entity declarations in Rust source text.
//!
//! Every struct with named fields is a declaration unless it carries
//! `#[flatschema(skip)]`. A field's tag text comes from
//! `#[flatschema(tag = "...")]`; fields without it have an empty tag.

use darling::{Error as DarlingError, FromDeriveInput, FromField, ast::Data};
use flatschema_schema::build::{Declaration, FieldDecl};
use proc_macro2::Ident;
use quote::ToTokens;
use syn::{DeriveInput, Fields, Item, Type};
use thiserror::Error as ThisError;

///
/// DiscoverError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
pub enum DiscoverError {
    #[error("invalid flatschema attribute: {0}")]
    Attribute(#[from] DarlingError),

    #[error("cannot parse source: {0}")]
    Parse(#[from] syn::Error),
}

///
/// StructReceiver
///

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(flatschema), supports(struct_named))]
struct StructReceiver {
    ident: Ident,
    data: Data<(), FieldReceiver>,

    #[darling(default)]
    skip: bool,
}

///
/// FieldReceiver
///

#[derive(Debug, FromField)]
#[darling(attributes(flatschema))]
struct FieldReceiver {
    ident: Option<Ident>,
    ty: Type,

    #[darling(default)]
    tag: Option<String>,
}

impl FieldReceiver {
    fn into_decl(self) -> Option<FieldDecl> {
        let name = self.ident?.to_string();

        Some(FieldDecl::new(
            name,
            type_text(&self.ty),
            self.tag.unwrap_or_default(),
        ))
    }
}

/// Collect declarations from one source file, in source order.
///
/// Inline modules are searched too; out-of-line `mod x;` items are not
/// followed.
pub fn discover(source: &str) -> Result<Vec<Declaration>, DiscoverError> {
    let file = syn::parse_file(source)?;
    let mut decls = Vec::new();

    collect(&file.items, &mut decls)?;
    tracing::debug!(declarations = decls.len(), "discovered declarations");

    Ok(decls)
}

fn collect(items: &[Item], decls: &mut Vec<Declaration>) -> Result<(), DiscoverError> {
    for item in items {
        match item {
            Item::Struct(item) if matches!(item.fields, Fields::Named(_)) => {
                let input = DeriveInput::from(item.clone());
                if let Some(decl) = declaration(&input)? {
                    decls.push(decl);
                }
            }
            Item::Mod(module) => {
                if let Some((_, items)) = &module.content {
                    collect(items, decls)?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn declaration(input: &DeriveInput) -> Result<Option<Declaration>, DiscoverError> {
    let receiver = StructReceiver::from_derive_input(input)?;
    if receiver.skip {
        tracing::debug!(entity = %receiver.ident, "skipping struct");
        return Ok(None);
    }

    let Data::Struct(fields) = receiver.data else {
        return Ok(None);
    };

    let fields = fields.fields.into_iter().filter_map(FieldReceiver::into_decl);

    Ok(Some(Declaration::new(receiver.ident.to_string(), fields)))
}

// Type tokens rendered without any whitespace, e.g. `Vec<u8>`.
fn type_text(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

///
/// TESTS
///
