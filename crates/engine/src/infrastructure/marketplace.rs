//! Marketplace catalog backends.
//!
//! All three known catalog hosts return the same Atom-style feed:
//!
//! ```xml
//! <a:feed><a:entry>
//!   <a:title>Halo 3</a:title><fullTitle>Halo 3</fullTitle>
//!   <images><image><size>14</size><fileUrl>http://...</fileUrl></image></images>
//! </a:entry></a:feed>
//! ```

use std::time::Duration;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use xsession_domain::TitleId;

use crate::infrastructure::ports::{
    BackendError, BackendSource, CatalogImage, TitleCatalog, TitleCatalogSource,
};

/// Archive mirror of the retired marketplace API.
pub const ARCHIVE_CATALOG_URL: &str = "https://archive.rushhosting.net/api/xml/{title_id}";

/// Community-restored catalog documents on GitHub.
pub const RESTORED_MEDIA_CATALOG_URL: &str = "https://raw.githubusercontent.com/wildmaster84/restored-media/refs/heads/main/{title_id}/{title_id_lower}.xml";

/// Live marketplace catalog.
pub const MARKETPLACE_CATALOG_URL: &str = "https://marketplace-xb.xboxlive.com/marketplacecatalog/v1/product/en-US/66ACD000-77FE-1000-9115-D802{title_id}?bodytypes=1.3&detailview=detaillevel5&pagenum=1&pagesize=1&stores=1&tiers=2.3&offerfilter=1&producttypes=1.5.18.19.20.21.22.23.30.34.37.46.47.61";

/// Catalog backend reached over HTTP.
///
/// `{title_id}` and `{title_id_lower}` in the URL template are replaced with
/// the 8-digit hex title id.
pub struct HttpCatalogSource {
    client: Client,
    name: String,
    url_template: String,
    timeout: Duration,
}

impl HttpCatalogSource {
    pub fn new(
        client: Client,
        name: impl Into<String>,
        url_template: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            name: name.into(),
            url_template: url_template.into(),
            timeout,
        }
    }

    pub fn url_for(&self, title_id: TitleId) -> String {
        expand_template(&self.url_template, title_id)
    }
}

impl BackendSource for HttpCatalogSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl TitleCatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self, title_id: TitleId) -> Result<TitleCatalog, BackendError> {
        let response = self
            .client
            .get(self.url_for(title_id))
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BackendError::Unavailable(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        parse_catalog(&body)
    }
}

/// The prioritised catalog chain.
pub fn default_catalog_sources(client: &Client) -> Vec<HttpCatalogSource> {
    vec![
        HttpCatalogSource::new(
            client.clone(),
            "archive",
            ARCHIVE_CATALOG_URL,
            Duration::from_millis(1000),
        ),
        HttpCatalogSource::new(
            client.clone(),
            "restored-media",
            RESTORED_MEDIA_CATALOG_URL,
            Duration::from_millis(500),
        ),
        HttpCatalogSource::new(
            client.clone(),
            "marketplace",
            MARKETPLACE_CATALOG_URL,
            Duration::from_millis(1000),
        ),
    ]
}

pub(crate) fn expand_template(template: &str, title_id: TitleId) -> String {
    let id = title_id.to_string();
    template
        .replace("{title_id_lower}", &id.to_ascii_lowercase())
        .replace("{title_id}", &id)
}

/// Parse a catalog feed.
///
/// A document without an `a:feed/a:entry` element is rejected so the next
/// backend gets a chance.
pub fn parse_catalog(xml: &str) -> Result<TitleCatalog, BackendError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut catalog = TitleCatalog::default();
    let mut saw_entry = false;
    let mut image: Option<CatalogImage> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| BackendError::InvalidResponse(format!("XML: {e}")))?;

        match event {
            Event::Start(start) => {
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                if path_is(&path, &["a:feed"]) && name == "a:entry" {
                    saw_entry = true;
                }
                if path_is(&path, &["a:feed", "a:entry", "images"]) && name == "image" {
                    image = Some(CatalogImage::default());
                }
                path.push(name);
            }
            Event::End(_) => {
                if path_is(&path, &["a:feed", "a:entry", "images", "image"]) {
                    if let Some(done) = image.take() {
                        catalog.images.push(done);
                    }
                }
                path.pop();
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| BackendError::InvalidResponse(format!("XML text: {e}")))?;
                apply_text(&path, &text, &mut catalog, image.as_mut());
            }
            Event::CData(data) => {
                let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                apply_text(&path, &text, &mut catalog, image.as_mut());
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_entry {
        return Err(BackendError::InvalidResponse(
            "document has no a:feed/a:entry".to_string(),
        ));
    }

    Ok(catalog)
}

fn apply_text(
    path: &[String],
    text: &str,
    catalog: &mut TitleCatalog,
    image: Option<&mut CatalogImage>,
) {
    match path {
        [feed, entry, field] if feed == "a:feed" && entry == "a:entry" => match field.as_str() {
            "a:title" => catalog.title = Some(text.to_string()),
            "fullTitle" => catalog.full_title = Some(text.to_string()),
            _ => {}
        },
        [feed, entry, images, img, field]
            if feed == "a:feed" && entry == "a:entry" && images == "images" && img == "image" =>
        {
            if let Some(image) = image {
                match field.as_str() {
                    "size" => image.size = text.trim().parse().ok(),
                    "fileUrl" => image.file_url = text.trim().to_string(),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn path_is(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a == b)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<a:feed xmlns:a="http://www.w3.org/2005/Atom" xmlns="http://marketplace.xboxlive.com/resource/product/v1">
  <a:entry>
    <a:title>Halo 3 &amp; Friends</a:title>
    <fullTitle>Halo 3</fullTitle>
    <images>
      <image><size>23</size><fileUrl>http://img.example/box.jpg</fileUrl></image>
      <image><size>14</size><fileUrl>http://img.example/tile.png</fileUrl></image>
    </images>
  </a:entry>
</a:feed>"#;

    #[test]
    fn parses_title_and_images() {
        let catalog = parse_catalog(FEED).unwrap();
        assert_eq!(catalog.title.as_deref(), Some("Halo 3 & Friends"));
        assert_eq!(catalog.full_title.as_deref(), Some("Halo 3"));
        assert_eq!(catalog.images.len(), 2);
        assert_eq!(catalog.tile_url(), Some("http://img.example/tile.png"));
    }

    #[test]
    fn falls_back_to_full_title() {
        let xml = "<a:feed><a:entry><fullTitle>Crackdown</fullTitle></a:entry></a:feed>";
        let catalog = parse_catalog(xml).unwrap();
        assert_eq!(catalog.display_name(), Some("Crackdown"));
        assert_eq!(catalog.tile_url(), None);
    }

    #[test]
    fn rejects_documents_without_an_entry() {
        assert!(parse_catalog("404: Not Found").is_err());
        assert!(parse_catalog("<html><body>nope</body></html>").is_err());
        assert!(parse_catalog("<a:feed></a:feed>").is_err());
    }

    #[test]
    fn rejects_broken_xml() {
        assert!(parse_catalog("<a:feed><a:entry></a:feed>").is_err());
    }

    #[test]
    fn expands_url_templates() {
        let source = HttpCatalogSource::new(
            Client::new(),
            "restored-media",
            RESTORED_MEDIA_CATALOG_URL,
            Duration::from_millis(500),
        );
        let url = source.url_for(TitleId::new(0x4D5307E6));
        assert!(url.ends_with("/main/4D5307E6/4d5307e6.xml"));
        assert_eq!(default_catalog_sources(&Client::new()).len(), 3);
    }
}
