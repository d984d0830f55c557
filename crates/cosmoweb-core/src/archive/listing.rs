use std::sync::OnceLock;

use regex::Regex;

use crate::consts::{ARCHIVE_ROOT_URL, LISTING_NAV_ANCHORS, RELEASE_SUBPATH};

/// Directory URL of the NIRCam mosaics of one data release, with trailing slash.
pub fn archive_url(release: &str) -> String {
    release_url(ARCHIVE_ROOT_URL, release)
}

pub(super) fn release_url(root: &str, release: &str) -> String {
    format!("{}/DR{release}/{RELEASE_SUBPATH}/", root.trim_end_matches('/'))
}

/// Anchor pattern of a directory listing.
///
/// Group 1: the href target
fn anchor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*)["']"#).expect("Valid regex")
    })
}

/// File names linked from an HTML directory listing.
///
/// The first anchors of the listing are navigation links and are skipped;
/// remaining directory and query links are dropped as well.
pub fn parse_listing(html: &str) -> Vec<String> {
    anchor_pattern()
        .captures_iter(html)
        .skip(LISTING_NAV_ANCHORS)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim_start_matches("./").to_string())
        .filter(|href| !href.is_empty() && !href.ends_with('/') && !href.contains('?'))
        .collect()
}

/// Optional criteria selecting archive files by substring.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileQuery {
    pub filter: Option<String>,
    pub pixel_scale_mas: Option<u32>,
    pub tile: Option<String>,
}

impl FileQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: &str) -> Self {
        self.filter = Some(filter.to_string());
        self
    }

    pub fn pixel_scale_mas(mut self, scale: u32) -> Self {
        self.pixel_scale_mas = Some(scale);
        self
    }

    pub fn tile(mut self, tile: &str) -> Self {
        self.tile = Some(tile.to_string());
        self
    }

    /// Whether `name` satisfies every provided criterion.
    ///
    /// Matching is by substring, so tile `A1` also selects `A10`.
    pub fn matches(&self, name: &str) -> bool {
        let scale = self.pixel_scale_mas.map(|s| format!("{s}mas"));
        let matched = [self.filter.as_deref(), scale.as_deref(), self.tile.as_deref()]
            .into_iter()
            .flatten()
            .all(|needle| name.contains(needle));
        matched
    }

    pub fn apply(&self, names: Vec<String>) -> Vec<String> {
        names.into_iter().filter(|n| self.matches(n)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_url_has_single_slashes() {
        assert_eq!(
            release_url("https://example.org/pub/", "0.5"),
            "https://example.org/pub/DR0.5/NIRCam/Apr23/"
        );
    }

    #[test]
    fn query_matches_every_given_criterion() {
        let name = "mosaic_nircam_f444w_COSMOS-Web_30mas_A10_v0_5_i2d.fits";
        assert!(FileQuery::new().matches(name));
        assert!(FileQuery::new().filter("f444w").pixel_scale_mas(30).tile("A1").matches(name));
        assert!(!FileQuery::new().filter("f444w").pixel_scale_mas(60).matches(name));
    }

    #[test]
    fn anchor_pattern_handles_attributes_and_quotes() {
        let html = r#"<A class="x" HREF='a.fits'>a</A>"#;
        let caps = anchor_pattern().captures(html).unwrap();
        assert_eq!(&caps[1], "a.fits");
    }
}
