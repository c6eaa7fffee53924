//! Sitemap XML parser
//!
//! This module turns a fetched sitemap body into a [`SitemapDocument`]:
//! - whether the document is a sitemap index or a leaf URL set
//! - the `<loc>` entries it lists, in document order

use roxmltree::{Document, ParsingOptions};

/// Namespace of sitemap protocol 0.9 elements
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// The two kinds of sitemap document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// `<sitemapindex>`: every location is another sitemap
    Index,

    /// Anything else (normally `<urlset>`): every location is a page
    UrlSet,
}

/// A parsed sitemap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    kind: DocumentKind,
    locations: Vec<String>,
}

impl SitemapDocument {
    pub fn new(kind: DocumentKind, locations: Vec<String>) -> Self {
        Self { kind, locations }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn is_index(&self) -> bool {
        self.kind == DocumentKind::Index
    }

    /// Location entries in document order
    pub fn locations(&self) -> &[String] {
        &self.locations
    }
}

/// Parses sitemap XML
///
/// # Classification Rules
///
/// - The document is an index when its root element is `sitemapindex` in any
///   namespace. A root without a namespace is treated as a URL set.
/// - Locations are the `loc` elements in the sitemap 0.9 namespace, at any
///   depth. Empty `loc` elements are skipped; text is kept verbatim.
///
/// # Example
///
/// ```
/// use sitemap_walker::crawler::parse_sitemap;
///
/// let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
///   <sitemap><loc>https://example.com/child.xml</loc></sitemap>
/// </sitemapindex>"#;
/// let doc = parse_sitemap(xml).unwrap();
/// assert!(doc.is_index());
/// assert_eq!(doc.locations(), ["https://example.com/child.xml"]);
/// ```
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, roxmltree::Error> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document = Document::parse_with_options(xml, options)?;
    let root = document.root_element();

    let kind = if root.tag_name().name() == "sitemapindex" && root.tag_name().namespace().is_some()
    {
        DocumentKind::Index
    } else {
        DocumentKind::UrlSet
    };

    let locations = root
        .descendants()
        .filter(|node| node.is_element() && node.has_tag_name((SITEMAP_NAMESPACE, "loc")))
        .filter_map(|node| node.text())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect();

    Ok(SitemapDocument::new(kind, locations))
}

/// Parses a raw response body
///
/// The body is decoded as strict UTF-8 (after dropping a byte-order mark). If
/// that fails it is re-decoded lossily before parsing, so stray invalid bytes
/// in text content do not sink an otherwise well-formed sitemap.
pub fn parse_sitemap_bytes(body: &[u8]) -> Result<SitemapDocument, roxmltree::Error> {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);

    match std::str::from_utf8(body) {
        Ok(text) => parse_sitemap(text),
        Err(e) => {
            tracing::debug!("Sitemap body is not valid UTF-8 ({}), re-decoding", e);
            parse_sitemap(&String::from_utf8_lossy(body))
        }
    }
}
