use nftr_parser::GlyphMapping;
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use std::{fs, path::PathBuf};
use syn::{
    parse::{Parse, ParseStream},
    parse_macro_input,
    punctuated::Punctuated,
    LitChar, LitInt, LitStr, Result, Token,
};

struct IncludeGlyphMap {
    filename: LitStr,
    slot_ranges: Option<SlotRanges>,
}

impl IncludeGlyphMap {
    fn contains(&self, index: usize) -> bool {
        self.slot_ranges
            .as_ref()
            .map(|ranges| ranges.contains(index))
            .unwrap_or(true)
    }
}

impl Parse for IncludeGlyphMap {
    fn parse(input: ParseStream) -> Result<Self> {
        let filename = input.parse()?;

        let slot_ranges = if input.lookahead1().peek(Token![,]) {
            Some(input.parse()?)
        } else {
            None
        };

        Ok(Self {
            filename,
            slot_ranges,
        })
    }
}

struct SlotRanges {
    ranges: Punctuated<SlotRange, Token![|]>,
}

impl SlotRanges {
    fn contains(&self, index: usize) -> bool {
        self.ranges.iter().any(|range| range.contains(index))
    }
}

impl Parse for SlotRanges {
    fn parse(input: ParseStream) -> Result<Self> {
        input.parse::<Token![,]>()?;

        Ok(Self {
            ranges: Punctuated::parse_separated_nonempty(input)?,
        })
    }
}

/// `32` or `32..=64`
struct SlotRange {
    from: usize,
    to: usize,
}

impl SlotRange {
    fn contains(&self, index: usize) -> bool {
        (self.from..=self.to).contains(&index)
    }
}

impl Parse for SlotRange {
    fn parse(input: ParseStream) -> Result<Self> {
        let from = input.parse::<LitInt>()?.base10_parse()?;
        let to = if input.lookahead1().peek(Token![..=]) {
            input.parse::<Token![..=]>()?;
            input.parse::<LitInt>()?.base10_parse()?
        } else {
            from
        };

        Ok(Self { from, to })
    }
}

/// Embeds a slot mapping file as `&'static [(usize, char)]`.
///
/// The path is relative to the invoking crate's manifest directory. Optional slot
/// ranges keep only the matching entries:
/// `include_glyph_map!("maps/cyrillic.map", 32..=64 | 70)`.
#[proc_macro]
pub fn include_glyph_map(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as IncludeGlyphMap);

    match load_entries(&input) {
        Ok(entries) => {
            let entries = entries.iter().map(|(index, character)| {
                let character = LitChar::new(*character, Span::call_site());
                quote! { (#index, #character) }
            });

            quote! { &[ #( #entries ),* ] }.into()
        }
        Err(message) => syn::Error::new(input.filename.span(), message)
            .to_compile_error()
            .into(),
    }
}

fn load_entries(input: &IncludeGlyphMap) -> std::result::Result<Vec<(usize, char)>, String> {
    let mut path = PathBuf::from(
        std::env::var_os("CARGO_MANIFEST_DIR").ok_or("CARGO_MANIFEST_DIR is not set")?,
    );
    path.push(input.filename.value());

    let text = fs::read_to_string(&path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mapping =
        GlyphMapping::parse(&text).map_err(|e| format!("{}: {e}", path.display()))?;

    Ok(mapping
        .iter()
        .filter(|(index, _)| input.contains(*index))
        .collect())
}
