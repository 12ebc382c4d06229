//! Sitemap XML (urlset and sitemap index)

use crate::slug::slugify;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Locations per `sitemap-locations.xml?batch=N` page.
pub const LOCATION_SITEMAP_BATCH: i64 = 1000;

/// Paths listed in `sitemap-static.xml`.
pub const STATIC_PATHS: &[&str] = &[
    "/",
    "/states",
    "/dryer-vent-cleaning-near-me",
    "/privacy",
    "/terms",
];

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// `<urlset>` of page locations.
#[derive(Debug, Default, Clone)]
pub struct UrlSet {
    locs: Vec<String>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, loc: impl Into<String>) {
        self.locs.push(loc.into());
    }

    pub fn len(&self) -> usize {
        self.locs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locs.is_empty()
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!("{XML_HEADER}\n<urlset xmlns=\"{SITEMAP_NS}\">\n");
        for loc in &self.locs {
            xml.push_str("<url><loc>");
            xml.push_str(&escape_xml(loc));
            xml.push_str("</loc></url>\n");
        }
        xml.push_str("</urlset>");
        xml
    }
}

impl<S: Into<String>> FromIterator<S> for UrlSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            locs: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// `<sitemapindex>` pointing at child sitemaps.
#[derive(Debug, Default, Clone)]
pub struct SitemapIndex {
    sitemaps: Vec<String>,
}

impl SitemapIndex {
    /// Static and city sitemaps plus one entry per location batch.
    pub fn for_site(base_url: &str, total_locations: i64) -> Self {
        let base = base_url.trim_end_matches('/');
        let mut sitemaps = vec![
            format!("{base}/sitemap-static.xml"),
            format!("{base}/sitemap-cities.xml"),
        ];
        for batch in 1..=location_batch_count(total_locations) {
            sitemaps.push(format!("{base}/sitemap-locations.xml?batch={batch}"));
        }
        Self { sitemaps }
    }

    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!("{XML_HEADER}\n<sitemapindex xmlns=\"{SITEMAP_NS}\">\n");
        for loc in &self.sitemaps {
            xml.push_str("<sitemap><loc>");
            xml.push_str(&escape_xml(loc));
            xml.push_str("</loc></sitemap>\n");
        }
        xml.push_str("</sitemapindex>");
        xml
    }
}

/// `ceil(total / batch)`, at least one.
pub fn location_batch_count(total_locations: i64) -> i64 {
    if total_locations <= 0 {
        return 1;
    }
    (total_locations + LOCATION_SITEMAP_BATCH - 1) / LOCATION_SITEMAP_BATCH
}

/// Row offset of a 1-based batch number. Batches below 1 clamp to 1.
///
/// `None` when the offset does not fit in an `i64`; no such batch can
/// hold rows.
pub fn batch_offset(batch: i64) -> Option<i64> {
    (batch.max(1) - 1).checked_mul(LOCATION_SITEMAP_BATCH)
}

/// `{base}/states/{state}/{city_slug}/{slug}`
pub fn location_url(base_url: &str, state: &str, city_slug: &str, slug: &str) -> String {
    format!(
        "{}/states/{}/{}/{}",
        base_url.trim_end_matches('/'),
        slugify(state),
        city_slug,
        slug
    )
}

/// `{base}/cities/{city_slug}-{state}`
pub fn city_url(base_url: &str, city_slug: &str, state: &str) -> String {
    format!(
        "{}/cities/{}-{}",
        base_url.trim_end_matches('/'),
        city_slug,
        slugify(state)
    )
}

pub fn static_urls(base_url: &str) -> UrlSet {
    let base = base_url.trim_end_matches('/');
    STATIC_PATHS
        .iter()
        .map(|path| match *path {
            "/" => format!("{base}/"),
            other => format!("{base}{other}"),
        })
        .collect()
}
