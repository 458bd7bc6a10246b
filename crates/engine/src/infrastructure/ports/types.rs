//! Data carried across the metadata ports.

/// Tile size the status page displays.
pub const TILE_IMAGE_SIZE: u32 = 14;

/// Image entry from a marketplace catalog document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogImage {
    pub size: Option<u32>,
    pub file_url: String,
}

/// The parts of a marketplace catalog entry the service uses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TitleCatalog {
    pub title: Option<String>,
    pub full_title: Option<String>,
    pub images: Vec<CatalogImage>,
}

/// Name, icon and info of one title, resolved together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TitleMetadata {
    pub name: String,
    /// `data:` URI of the tile image, or empty.
    pub icon: String,
    pub info: Option<serde_json::Value>,
}

impl TitleCatalog {
    /// `a:title`, falling back to `fullTitle`.
    pub fn display_name(&self) -> Option<&str> {
        [self.title.as_deref(), self.full_title.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|name| !name.is_empty())
    }

    /// URL of the display tile, or of the first image when no tile is listed.
    pub fn tile_url(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|image| image.size == Some(TILE_IMAGE_SIZE))
            .or_else(|| self.images.first())
            .map(|image| image.file_url.as_str())
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(size: Option<u32>, url: &str) -> CatalogImage {
        CatalogImage {
            size,
            file_url: url.to_string(),
        }
    }

    #[test]
    fn display_name_prefers_title_then_full_title() {
        let mut catalog = TitleCatalog {
            title: Some("  ".to_string()),
            full_title: Some("Halo 3".to_string()),
            images: vec![],
        };
        assert_eq!(catalog.display_name(), Some("Halo 3"));

        catalog.title = Some("Halo".to_string());
        assert_eq!(catalog.display_name(), Some("Halo"));

        assert_eq!(TitleCatalog::default().display_name(), None);
    }

    #[test]
    fn tile_url_prefers_size_fourteen() {
        let catalog = TitleCatalog {
            images: vec![image(Some(23), "http://a/box"), image(Some(14), "http://a/tile")],
            ..Default::default()
        };
        assert_eq!(catalog.tile_url(), Some("http://a/tile"));

        let catalog = TitleCatalog {
            images: vec![image(None, "http://a/first"), image(Some(23), "http://a/box")],
            ..Default::default()
        };
        assert_eq!(catalog.tile_url(), Some("http://a/first"));
        assert_eq!(TitleCatalog::default().tile_url(), None);
    }
}
