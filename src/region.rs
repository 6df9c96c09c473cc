//! Geographic catalog partitions on the source site.
//!
//! The site serves one catalog per region plus an unfiltered national one.
//! A region is only used to build the request URL and to tag output rows.

use std::fmt;

/// Base URL of the source site. Every catalog page and every product page
/// lives under this prefix.
pub const SITE_BASE: &str = "https://aratiendas.com/";

/// A catalog partition: either a named region or the national (unfiltered)
/// scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Region {
    /// No region filter — the unqualified national catalog.
    National,
    /// A named regional catalog (e.g. "norte").
    Named(String),
}

impl Region {
    pub fn named(name: impl Into<String>) -> Self {
        Region::Named(name.into())
    }

    /// URL of the catalog page for this region.
    pub fn catalog_url(&self) -> String {
        match self {
            Region::National => format!("{SITE_BASE}rebajon/"),
            Region::Named(name) => format!("{SITE_BASE}rebajon/{name}/"),
        }
    }

    /// Value used to tag output rows. `None` marks the national scope.
    pub fn tag(&self) -> Option<String> {
        match self {
            Region::National => None,
            Region::Named(name) => Some(name.clone()),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::National => write!(f, "national"),
            Region::Named(name) => write!(f, "{name}"),
        }
    }
}

/// The full region list the site partitions its catalog into, national
/// scope first.
pub fn default_regions() -> Vec<Region> {
    let mut regions = vec![Region::National];
    regions.extend(default_named_regions());
    regions
}

/// The named regions only, in site order.
pub fn default_named_regions() -> Vec<Region> {
    ["norte", "sur", "oriente", "occidente", "centro"]
        .into_iter()
        .map(Region::named)
        .collect()
}
