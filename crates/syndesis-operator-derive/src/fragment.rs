use darling::{
    FromDeriveInput, FromField, FromMeta,
    ast::Data,
    util::{Flag, Ignored},
};
use proc_macro2::{Ident, TokenStream, TokenTree};
use quote::{ToTokens, format_ident, quote};
use syn::{
    Attribute, DeriveInput, Generics, Meta, MetaList, Path, Type, Visibility, WherePredicate,
    parse_quote,
};

#[derive(FromMeta)]
struct PathOverrides {
    #[darling(default = "PathOverrides::default_fragment")]
    fragment: Path,
    #[darling(default = "PathOverrides::default_result")]
    result: Path,
}
impl Default for PathOverrides {
    fn default() -> Self {
        Self {
            fragment: Self::default_fragment(),
            result: Self::default_result(),
        }
    }
}
impl PathOverrides {
    fn default_fragment() -> Path {
        parse_quote!(::syndesis_operator::config::fragment)
    }

    fn default_result() -> Path {
        parse_quote!(::core::result)
    }
}

#[derive(FromDeriveInput)]
#[darling(
    attributes(fragment),
    forward_attrs(fragment_attrs, doc),
    supports(struct_named)
)]
struct FragmentInput {
    ident: Ident,
    vis: Visibility,
    generics: Generics,
    data: Data<Ignored, FragmentField>,
    attrs: Vec<Attribute>,
    #[darling(default)]
    path_overrides: PathOverrides,
    #[darling(default)]
    bound: Option<Vec<WherePredicate>>,
}

#[derive(FromField)]
#[darling(attributes(fragment), forward_attrs(fragment_attrs, doc))]
struct FragmentField {
    vis: Visibility,
    ident: Option<Ident>,
    ty: Type,
    attrs: Vec<Attribute>,
    #[darling(default)]
    default: Flag,
}

fn split_by_comma(tokens: TokenStream) -> Vec<TokenStream> {
    let mut iter = tokens.into_iter().fuse().peekable();
    let mut groups = Vec::new();
    while iter.peek().is_some() {
        groups.push(
            iter.by_ref()
                .take_while(
                    |token| !matches!(token, TokenTree::Punct(punct) if punct.as_char() == ','),
                )
                .collect(),
        );
    }
    groups
}

/// Collects `#[fragment_attrs(a, b)]` into `#[a] #[b]`, and copies doc comments verbatim
fn extract_forwarded_attrs(attrs: &[Attribute]) -> Result<TokenStream, TokenStream> {
    attrs
        .iter()
        .flat_map(|attr| {
            if attr.path().is_ident("fragment_attrs") {
                match &attr.meta {
                    Meta::List(MetaList { tokens, .. }) => {
                        split_by_comma(tokens.clone()).into_iter().map(Ok).collect()
                    }
                    _ => vec![Err(quote! {
                        compile_error!("`#[fragment_attrs]` only takes list-form parameters");
                    })],
                }
            } else if attr.path().is_ident("doc") {
                vec![Ok(attr.meta.to_token_stream())]
            } else {
                Vec::new()
            }
        })
        .map(|attr| attr.map(|attr| quote! { #[#attr] }))
        .collect()
}

pub fn derive(input: DeriveInput) -> TokenStream {
    let FragmentInput {
        ident,
        vis,
        data,
        attrs,
        mut generics,
        bound,
        path_overrides:
            PathOverrides {
                fragment: fragment_mod,
                result: result_mod,
            },
    } = match FragmentInput::from_derive_input(&input) {
        Ok(input) => input,
        Err(err) => return err.write_errors(),
    };
    let Some(fields) = data.take_struct() else {
        return quote! {
            compile_error!("`#[derive(Fragment)]` only supports structs with named fields");
        };
    };

    let fragment_ident = format_ident!("{ident}Fragment");
    let mut fragment_fields = TokenStream::new();
    let mut from_fragment_fields = TokenStream::new();
    for FragmentField {
        vis: field_vis,
        ident: field_ident,
        ty,
        attrs: field_attrs,
        default,
    } in fields.iter()
    {
        let field_attrs = match extract_forwarded_attrs(field_attrs) {
            Ok(x) => x,
            Err(err) => return err,
        };
        fragment_fields.extend(quote! {
            #field_attrs #field_vis #field_ident: <#ty as #fragment_mod::FromFragment>::Fragment,
        });

        let field_name = field_ident.as_ref().map(ToString::to_string);
        let from_fragment = if default.is_present() {
            quote! { #fragment_mod::from_fragment_or_default }
        } else {
            quote! { #fragment_mod::FromFragment::from_fragment }
        };
        from_fragment_fields.extend(quote! {
            #field_ident: {
                let validator = validator.field(&#field_name);
                #from_fragment(fragment.#field_ident, validator)?
            },
        });
    }

    let attrs = match extract_forwarded_attrs(&attrs) {
        Ok(x) => x,
        Err(err) => return err,
    };
    if let Some(bound) = bound {
        let where_clause = generics.make_where_clause();
        where_clause.predicates.extend(bound);
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    quote! {
        #attrs
        #vis struct #fragment_ident #generics #where_clause {
            #fragment_fields
        }

        impl #impl_generics #fragment_mod::FromFragment for #ident #ty_generics #where_clause {
            type Fragment = #fragment_ident #ty_generics;
            type RequiredFragment = #fragment_ident #ty_generics;

            fn from_fragment(
                fragment: Self::Fragment,
                validator: #fragment_mod::Validator,
            ) -> #result_mod::Result<Self, #fragment_mod::ValidationError> {
                #result_mod::Result::Ok(Self {
                    #from_fragment_fields
                })
            }
        }
    }
}
