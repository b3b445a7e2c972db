//! The navigable views and their paths.

use std::fmt;

use mob_types::ListingId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Explore,
    AddListing,
    ListingDetail(ListingId),
    Favorites,
    Profile,
}

impl View {
    /// Resolve a path such as `/property/42`. Query strings, fragments and
    /// a trailing slash are ignored.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Some(Self::Home),
            ["explore"] => Some(Self::Explore),
            ["add"] => Some(Self::AddListing),
            ["property", id] => id.parse().ok().map(Self::ListingDetail),
            ["favorites"] => Some(Self::Favorites),
            ["profile"] => Some(Self::Profile),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Explore => "/explore".to_string(),
            Self::AddListing => "/add".to_string(),
            Self::ListingDetail(id) => format!("/property/{id}"),
            Self::Favorites => "/favorites".to_string(),
            Self::Profile => "/profile".to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Explore => "explore",
            Self::AddListing => "add",
            Self::ListingDetail(_) => "property-details",
            Self::Favorites => "favorites",
            Self::Profile => "profile",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
