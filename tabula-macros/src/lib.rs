mod decode_field;

use decode_field::{FieldMetadata, decode_field};
use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashSet;
use syn::{Fields, ItemStruct, parse_macro_input};

/// Derives `tabula::Record` for a struct with named fields.
///
/// Every field maps to the column with the same name, unless renamed with
/// `#[record(name = "column")]`. Fields marked `#[record(skip)]` are never read
/// nor written and keep their `Default` value on readback.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    let Fields::Named(..) = &item.fields else {
        panic!("Record can only be derived for structs with named fields");
    };
    let fields: Vec<FieldMetadata> = item
        .fields
        .iter()
        .map(decode_field)
        .filter(|f| !f.skip)
        .collect();
    let mut seen = HashSet::new();
    for field in &fields {
        if !seen.insert(field.name.as_str()) {
            panic!(
                "Column `{}` is mapped by more than one field of `{}`",
                field.name, name
            );
        }
    }
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let names = fields.iter().map(|f| &f.name);
    let describe = fields.iter().map(|f| {
        let column = &f.name;
        let ident = &f.ident;
        quote! {
            (#column, ::tabula::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)))
        }
    });
    let assign = fields.iter().map(|f| {
        let column = &f.name;
        let ident = &f.ident;
        let ty = &f.ty;
        quote! {
            #column => {
                self.#ident = <#ty as ::tabula::AsValue>::try_from_value(value)?;
                Ok(())
            }
        }
    });
    let type_name = name.to_string();
    quote! {
        impl #impl_generics ::tabula::Record for #name #ty_generics #where_clause {
            fn field_names() -> &'static [&'static str] {
                &[#(#names),*]
            }
            fn describe_fields(&self) -> ::std::vec::Vec<(&'static str, ::tabula::Value)> {
                vec![#(#describe),*]
            }
            fn set_field(&mut self, name: &str, value: ::tabula::Value) -> ::tabula::Result<()> {
                match name {
                    #(#assign)*
                    _ => Err(::tabula::Error::msg(format!(
                        "{} has no field mapped to column `{}` (value of type {})",
                        #type_name,
                        name,
                        value.type_name(),
                    ))),
                }
            }
        }
    }
    .into()
}
