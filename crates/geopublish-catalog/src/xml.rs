//! XML request bodies for the catalog REST API.

use crate::objects::{CoverageDescription, LayerDescription, StoreDescription};

/// Escape text for use inside an XML element.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn store_xml(store: &StoreDescription) -> String {
    format!(
        "<coverageStore>\n\
         \x20 <name>{name}</name>\n\
         \x20 <description>{description}</description>\n\
         \x20 <type>{datatype}</type>\n\
         \x20 <enabled>true</enabled>\n\
         \x20 <workspace>\n\
         \x20   <name>{workspace}</name>\n\
         \x20 </workspace>\n\
         \x20 <__default>false</__default>\n\
         \x20 <url>file:{url}</url>\n\
         </coverageStore>",
        name = escape(&store.name),
        description = escape(&store.description),
        datatype = escape(&store.datatype),
        workspace = escape(&store.workspace),
        url = escape(&store.source_path),
    )
}

pub fn coverage_xml(coverage: &CoverageDescription) -> String {
    let keywords: String = coverage
        .keywords
        .iter()
        .map(|k| format!("    <string>{}</string>\n", escape(k)))
        .collect();

    format!(
        "<coverage>\n\
         \x20 <name>{name}</name>\n\
         \x20 <nativeName>{name}</nativeName>\n\
         \x20 <title>{title}</title>\n\
         \x20 <description>{description}</description>\n\
         \x20 <abstract>{abstract_text}</abstract>\n\
         \x20 <keywords>\n\
         {keywords}\
         \x20 </keywords>\n\
         \x20 <enabled>true</enabled>\n\
         \x20 <store class=\"coverageStore\">\n\
         \x20   <name>{store}</name>\n\
         \x20 </store>\n\
         </coverage>",
        name = escape(&coverage.name),
        title = escape(&coverage.title),
        description = escape(&coverage.description),
        abstract_text = escape(&coverage.abstract_text),
        keywords = keywords,
        store = escape(&coverage.store),
    )
}

pub fn layer_xml(layer: &LayerDescription) -> String {
    format!(
        "<layer>\n\
         \x20 <name>{name}</name>\n\
         \x20 <type>RASTER</type>\n\
         \x20 <defaultStyle>\n\
         \x20   <name>{style}</name>\n\
         \x20 </defaultStyle>\n\
         \x20 <resource class=\"coverage\">\n\
         \x20   <name>{name}</name>\n\
         \x20 </resource>\n\
         \x20 <enabled>true</enabled>\n\
         </layer>",
        name = escape(&layer.name),
        style = escape(&layer.default_style),
    )
}
