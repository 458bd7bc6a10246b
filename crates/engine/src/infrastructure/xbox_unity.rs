//! Tile image and title-record backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use xsession_domain::TitleId;

use crate::infrastructure::marketplace::expand_template;
use crate::infrastructure::ports::{
    BackendError, BackendSource, TitleIconSource, TitleInfoSource,
};

pub const XBOX_UNITY_ICON_URL: &str = "http://xboxunity.net/Resources/Lib/Icon.php?tid={title_id}";
pub const XBOX_UNITY_TITLE_URL: &str = "http://xboxunity.net/Resources/Lib/Title.php?tid={title_id}";

/// Downloads the tile listed in the title's catalog entry.
pub struct CatalogTileIconSource {
    client: Client,
    timeout: Duration,
}

impl CatalogTileIconSource {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl BackendSource for CatalogTileIconSource {
    fn name(&self) -> &str {
        "catalog-tile"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl TitleIconSource for CatalogTileIconSource {
    async fn fetch_icon(
        &self,
        title_id: TitleId,
        tile_url: Option<String>,
    ) -> Result<Vec<u8>, BackendError> {
        let url = tile_url
            .ok_or_else(|| BackendError::NotFound(format!("catalog tile for {title_id}")))?;
        download(&self.client, &url, self.timeout).await
    }
}

/// Xbox Unity icon endpoint, keyed by title id only.
pub struct XboxUnityIconSource {
    client: Client,
    timeout: Duration,
}

impl XboxUnityIconSource {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl BackendSource for XboxUnityIconSource {
    fn name(&self) -> &str {
        "xboxunity-icon"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl TitleIconSource for XboxUnityIconSource {
    async fn fetch_icon(
        &self,
        title_id: TitleId,
        _tile_url: Option<String>,
    ) -> Result<Vec<u8>, BackendError> {
        let url = expand_template(XBOX_UNITY_ICON_URL, title_id);
        download(&self.client, &url, self.timeout).await
    }
}

/// Xbox Unity title record (JSON).
pub struct XboxUnityInfoSource {
    client: Client,
    timeout: Duration,
}

impl XboxUnityInfoSource {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

impl BackendSource for XboxUnityInfoSource {
    fn name(&self) -> &str {
        "xboxunity-title"
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl TitleInfoSource for XboxUnityInfoSource {
    async fn fetch_info(&self, title_id: TitleId) -> Result<serde_json::Value, BackendError> {
        let response = self
            .client
            .get(expand_template(XBOX_UNITY_TITLE_URL, title_id))
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        let info: serde_json::Value = response.json().await?;
        accept_title_record(title_id, info)
    }
}

/// Unknown titles come back as an empty object; only records that name a
/// `TitleID` count.
pub(crate) fn accept_title_record(
    title_id: TitleId,
    info: serde_json::Value,
) -> Result<serde_json::Value, BackendError> {
    match info.get("TitleID") {
        Some(id) if !id.is_null() => Ok(info),
        _ => Err(BackendError::NotFound(format!("title record for {title_id}"))),
    }
}

async fn download(client: &Client, url: &str, timeout: Duration) -> Result<Vec<u8>, BackendError> {
    let bytes = client
        .get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    if bytes.is_empty() {
        return Err(BackendError::InvalidResponse(format!("empty body from {url}")));
    }
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_records_need_a_title_id() {
        let id = TitleId::new(0x4D5307E6);
        assert!(accept_title_record(id, json!({})).is_err());
        assert!(accept_title_record(id, json!({ "TitleID": null })).is_err());

        let record = json!({ "TitleID": "4D5307E6", "Name": "Halo 3" });
        assert_eq!(accept_title_record(id, record.clone()), Ok(record));
    }

    #[tokio::test]
    async fn catalog_tile_source_needs_a_tile_url() {
        let source = CatalogTileIconSource::new(Client::new(), Duration::from_millis(10));
        let result = source.fetch_icon(TitleId::new(1), None).await;
        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }
}
