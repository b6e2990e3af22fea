//! Derive macros for the `tlv` crate
//!
//! - `#[derive(Tlv)]` turns a struct with named fields into a TLV record.
//!   Every field carries its tag as `#[tlv("1E")]`; tags are checked at
//!   compile time.
//! - `#[derive(TlvCustom)]` hands a type implementing `tlv::BinaryCodec`
//!   to the engine as a custom-codec value.
//!
//! ```ignore
//! use tlv::Tlv;
//!
//! #[derive(Debug, Default, Tlv)]
//! struct Item {
//!     #[tlv("14")]
//!     name: bytes::Bytes,
//!     #[tlv("28")]
//!     sequence: u16,
//! }
//! ```

extern crate proc_macro;

use proc_macro::TokenStream;
use proc_macro2::Literal;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};
use tlv_core::Tag;

/// One tagged field of a record
struct TaggedField {
    ident: syn::Ident,
    ty: syn::Type,
    tag: LitStr,
}

/// `#[derive(Tlv)]`: implements `tlv::TlvRecord` and `tlv::TlvValue`
#[proc_macro_derive(Tlv, attributes(tlv))]
pub fn derive_tlv(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_record(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// `#[derive(TlvCustom)]`: implements `tlv::TlvValue` through `tlv::BinaryCodec`
#[proc_macro_derive(TlvCustom)]
pub fn derive_tlv_custom(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_custom(&input).into()
}

fn expand_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "generic TLV records are not supported",
        ));
    }

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Only named fields are supported",
                ))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Only structs are supported")),
    };

    let mut fields = Vec::with_capacity(named.len());
    let mut seen: Vec<(Tag, syn::Ident)> = Vec::new();
    for field in named {
        let Some(ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        if is_byte_vec(&field.ty) {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "`Vec<u8>` would be written as one record per byte; use `bytes::Bytes` for a byte sequence",
            ));
        }
        let tag = field_tag(field)?;
        let parsed = Tag::from_hex(&tag.value())
            .map_err(|e| syn::Error::new_spanned(&tag, format!("invalid tag: {e}")))?;
        if let Some((_, other)) = seen.iter().find(|(t, _)| *t == parsed) {
            return Err(syn::Error::new_spanned(
                &tag,
                format!("tag {parsed} is already used by field `{other}`"),
            ));
        }
        seen.push((parsed, ident.clone()));
        fields.push(TaggedField {
            ident,
            ty: field.ty.clone(),
            tag,
        });
    }

    let name = &input.ident;
    let name_str = name.to_string();
    let idents: Vec<_> = fields.iter().map(|f| &f.ident).collect();
    let names: Vec<_> = fields.iter().map(|f| f.ident.unraw().to_string()).collect();
    let tys: Vec<_> = fields.iter().map(|f| &f.ty).collect();
    let tags: Vec<_> = fields.iter().map(|f| &f.tag).collect();
    let indices: Vec<_> = (0..fields.len()).map(Literal::usize_unsuffixed).collect();

    Ok(quote! {
        impl ::tlv::TlvRecord for #name {
            fn schema() -> ::tlv::TlvResult<&'static ::tlv::RecordSchema> {
                static SCHEMA: ::std::sync::OnceLock<::tlv::TlvResult<::tlv::RecordSchema>> =
                    ::std::sync::OnceLock::new();
                SCHEMA
                    .get_or_init(|| {
                        ::tlv::RecordSchema::builder(#name_str)
                            #(.field(#names, #tags, <#tys as ::tlv::TlvValue>::shape()))*
                            .build()
                    })
                    .as_ref()
                    .map_err(::std::clone::Clone::clone)
            }

            #[allow(unused_variables)]
            fn encode_fields(
                &self,
                schema: &::tlv::RecordSchema,
                writer: &mut ::tlv::TlvWriter,
            ) -> ::tlv::TlvResult<()> {
                #(::tlv::record::encode_field(&self.#idents, schema.field(#indices)?, writer)?;)*
                ::std::result::Result::Ok(())
            }

            fn decode_field(&mut self, index: usize, fragment: &[u8]) -> ::tlv::TlvResult<()> {
                match index {
                    #(#indices => ::tlv::TlvValue::decode_from(&mut self.#idents, fragment),)*
                    _ => ::std::result::Result::Err(::tlv::record::unknown_field::<Self>(index)),
                }
            }
        }

        impl ::tlv::TlvValue for #name {
            fn shape() -> ::tlv::Shape {
                ::tlv::Shape::Record(::tlv::RecordRef::of::<Self>())
            }

            fn is_present(&self) -> bool {
                false #(|| ::tlv::TlvValue::is_present(&self.#idents))*
            }

            fn encode_into(
                &self,
                tag: ::std::option::Option<::tlv::Tag>,
                writer: &mut ::tlv::TlvWriter,
            ) -> ::tlv::TlvResult<()> {
                ::tlv::record::encode_record(self, tag, writer)
            }

            fn decode_from(&mut self, region: &[u8]) -> ::tlv::TlvResult<()> {
                ::tlv::record::decode_record(self, region)
            }
        }
    })
}

/// Whether `ty` is spelled `Vec<u8>`
fn is_byte_vec(ty: &syn::Type) -> bool {
    let syn::Type::Path(path) = ty else {
        return false;
    };
    let Some(segment) = path.path.segments.last() else {
        return false;
    };
    if segment.ident != "Vec" {
        return false;
    }
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };
    matches!(
        args.args.first(),
        Some(syn::GenericArgument::Type(syn::Type::Path(inner))) if inner.path.is_ident("u8")
    )
}

/// Read the tag annotation of one field
fn field_tag(field: &syn::Field) -> syn::Result<LitStr> {
    let mut found = None;
    for attr in field.attrs.iter().filter(|a| a.path().is_ident("tlv")) {
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[tlv] attribute"));
        }
        found = Some(attr.parse_args::<LitStr>()?);
    }
    found.ok_or_else(|| {
        syn::Error::new_spanned(field, "missing tag annotation, expected #[tlv(\"XX\")]")
    })
}

fn expand_custom(input: &DeriveInput) -> proc_macro2::TokenStream {
    let name = &input.ident;
    let mut generics = input.generics.clone();
    let (_, ty_generics, _) = input.generics.split_for_impl();
    generics
        .make_where_clause()
        .predicates
        .push(syn::parse_quote!(#name #ty_generics: ::tlv::BinaryCodec));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics ::tlv::TlvValue for #name #ty_generics #where_clause {
            fn shape() -> ::tlv::Shape {
                ::tlv::Shape::Custom
            }

            fn is_present(&self) -> bool {
                ::tlv::BinaryCodec::is_present(self)
            }

            fn encode_into(
                &self,
                tag: ::std::option::Option<::tlv::Tag>,
                writer: &mut ::tlv::TlvWriter,
            ) -> ::tlv::TlvResult<()> {
                ::tlv::custom::encode_custom(self, tag, writer)
            }

            fn decode_from(&mut self, region: &[u8]) -> ::tlv::TlvResult<()> {
                ::tlv::custom::decode_custom(self, region)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn record_error(input: DeriveInput) -> String {
        match expand_record(&input) {
            Ok(_) => panic!("expected expansion to fail"),
            Err(e) => e.to_string(),
        }
    }

    #[test]
    fn test_record_expands() {
        let input: DeriveInput = parse_quote! {
            struct Item {
                #[tlv("14")]
                name: Bytes,
                #[tlv("28")]
                r#type: u16,
            }
        };
        let tokens = expand_record(&input).unwrap().to_string();
        assert!(tokens.contains("TlvRecord for Item"));
        assert!(tokens.contains("\"type\""));
        assert!(tokens.contains("\"28\""));
    }

    #[test]
    fn test_record_requires_tags() {
        let err = record_error(parse_quote! {
            struct Item {
                #[tlv("14")]
                name: Bytes,
                sequence: u16,
            }
        });
        assert!(err.contains("missing tag annotation"));
    }

    #[test]
    fn test_record_rejects_bad_tags() {
        let err = record_error(parse_quote! {
            struct Item {
                #[tlv("1F")]
                value: u8,
            }
        });
        assert!(err.contains("invalid tag"));

        let err = record_error(parse_quote! {
            struct Item {
                #[tlv("XYZ")]
                value: u8,
            }
        });
        assert!(err.contains("invalid tag"));
    }

    #[test]
    fn test_record_rejects_duplicate_tags() {
        let err = record_error(parse_quote! {
            struct Item {
                #[tlv("20")]
                first: u8,
                #[tlv("20")]
                second: u8,
            }
        });
        assert!(err.contains("already used by field `first`"));
    }

    #[test]
    fn test_record_rejects_byte_vec() {
        let err = record_error(parse_quote! {
            struct Blob {
                #[tlv("14")]
                data: Vec<u8>,
            }
        });
        assert!(err.contains("bytes::Bytes"));

        let input: DeriveInput = parse_quote! {
            struct Sequences {
                #[tlv("28")]
                values: Vec<u16>,
            }
        };
        assert!(expand_record(&input).is_ok());
    }

    #[test]
    fn test_record_rejects_generics_and_tuples() {
        let err = record_error(parse_quote! {
            struct Wrapper<T> {
                #[tlv("20")]
                inner: T,
            }
        });
        assert!(err.contains("generic"));

        let err = record_error(parse_quote! {
            struct Pair(u8, u8);
        });
        assert!(err.contains("named fields"));
    }

    #[test]
    fn test_custom_adds_codec_bound() {
        let input: DeriveInput = parse_quote! {
            struct Wrapped<T>(T);
        };
        let tokens = expand_custom(&input).to_string();
        assert!(tokens.contains("Custom"));
        assert!(tokens.contains("where"));
        assert!(tokens.contains("BinaryCodec"));
    }
}
