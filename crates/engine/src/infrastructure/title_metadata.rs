//! Title metadata service.
//!
//! Name, icon and info are each resolved through an ordered chain of
//! backends. Every backend call runs under its own timeout; the first
//! success wins and failures fall through to the next backend. When the whole
//! chain fails the caller gets an empty value and nothing is cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use futures_util::future::BoxFuture;
use reqwest::Client;
use xsession_domain::TitleId;

use crate::infrastructure::cache::MemoCache;
use crate::infrastructure::marketplace::default_catalog_sources;
use crate::infrastructure::ports::{
    BackendError, BackendSource, TitleCatalog, TitleCatalogSource, TitleIconSource,
    TitleInfoSource, TitleMetadata, TitleMetadataPort,
};
use crate::infrastructure::xbox_unity::{
    CatalogTileIconSource, XboxUnityIconSource, XboxUnityInfoSource,
};

const ICON_TIMEOUT: Duration = Duration::from_millis(1000);
const INFO_TIMEOUT: Duration = Duration::from_millis(500);

/// Number of cached entries per metadata kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetadataCacheStats {
    pub catalogs: usize,
    pub icons: usize,
    pub infos: usize,
}

pub struct TitleMetadataService {
    catalog_sources: Vec<Arc<dyn TitleCatalogSource>>,
    icon_sources: Vec<Arc<dyn TitleIconSource>>,
    info_sources: Vec<Arc<dyn TitleInfoSource>>,
    catalogs: MemoCache<TitleId, TitleCatalog>,
    icons: MemoCache<TitleId, String>,
    infos: MemoCache<TitleId, serde_json::Value>,
}

impl TitleMetadataService {
    pub fn new(
        catalog_sources: Vec<Arc<dyn TitleCatalogSource>>,
        icon_sources: Vec<Arc<dyn TitleIconSource>>,
        info_sources: Vec<Arc<dyn TitleInfoSource>>,
    ) -> Self {
        Self {
            catalog_sources,
            icon_sources,
            info_sources,
            catalogs: MemoCache::new(),
            icons: MemoCache::new(),
            infos: MemoCache::new(),
        }
    }

    /// Production backend chains sharing one HTTP client.
    pub fn with_default_backends(client: &Client) -> Self {
        let catalog_sources = default_catalog_sources(client)
            .into_iter()
            .map(|source| Arc::new(source) as Arc<dyn TitleCatalogSource>)
            .collect();

        let icon_sources: Vec<Arc<dyn TitleIconSource>> = vec![
            Arc::new(CatalogTileIconSource::new(client.clone(), ICON_TIMEOUT)),
            Arc::new(XboxUnityIconSource::new(client.clone(), ICON_TIMEOUT)),
        ];

        let info_sources: Vec<Arc<dyn TitleInfoSource>> =
            vec![Arc::new(XboxUnityInfoSource::new(client.clone(), INFO_TIMEOUT))];

        Self::new(catalog_sources, icon_sources, info_sources)
    }

    pub fn cache_stats(&self) -> MetadataCacheStats {
        MetadataCacheStats {
            catalogs: self.catalogs.len(),
            icons: self.icons.len(),
            infos: self.infos.len(),
        }
    }

    /// Titles with at least one cached value, sorted.
    pub fn cached_title_ids(&self) -> Vec<TitleId> {
        let mut ids: Vec<TitleId> = self
            .catalogs
            .keys()
            .into_iter()
            .chain(self.icons.keys())
            .chain(self.infos.keys())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    async fn catalog(&self, title_id: TitleId) -> Option<TitleCatalog> {
        self.catalogs
            .get_or_fill(title_id, || {
                first_success(title_id, "catalog", self.catalog_sources.as_slice(), |source| {
                    source.fetch_catalog(title_id)
                })
            })
            .await
    }

    /// Tile image as a `data:` URI, fetched from the catalog's tile when known.
    async fn icon(&self, title_id: TitleId, catalog: Option<&TitleCatalog>) -> String {
        let tile_url = catalog.and_then(|catalog| catalog.tile_url().map(str::to_string));

        self.icons
            .get_or_fill(title_id, || async {
                let bytes = first_success(title_id, "icon", self.icon_sources.as_slice(), |source| {
                    source.fetch_icon(title_id, tile_url.clone())
                })
                .await?;

                Some(format!("data:image/png;base64,{}", STANDARD.encode(bytes)))
            })
            .await
            .unwrap_or_default()
    }
}

#[async_trait]
impl TitleMetadataPort for TitleMetadataService {
    async fn title_name(&self, title_id: TitleId) -> String {
        self.catalog(title_id)
            .await
            .and_then(|catalog| catalog.display_name().map(str::to_string))
            .unwrap_or_default()
    }

    async fn title_icon(&self, title_id: TitleId) -> String {
        if let Some(icon) = self.icons.get(&title_id) {
            return icon;
        }
        let catalog = self.catalog(title_id).await;
        self.icon(title_id, catalog.as_ref()).await
    }

    async fn title_info(&self, title_id: TitleId) -> Option<serde_json::Value> {
        self.infos
            .get_or_fill(title_id, || {
                first_success(title_id, "info", self.info_sources.as_slice(), |source| {
                    source.fetch_info(title_id)
                })
            })
            .await
    }

    async fn title_metadata(&self, title_id: TitleId) -> TitleMetadata {
        let catalog_and_icon = async {
            let catalog = self.catalog(title_id).await;
            let icon = self.icon(title_id, catalog.as_ref()).await;
            (catalog, icon)
        };
        let ((catalog, icon), info) = tokio::join!(catalog_and_icon, self.title_info(title_id));

        TitleMetadata {
            name: catalog
                .and_then(|catalog| catalog.display_name().map(str::to_string))
                .unwrap_or_default(),
            icon,
            info,
        }
    }
}

/// Try each source in order under its own timeout; the first `Ok` wins.
async fn first_success<S, T, F>(
    title_id: TitleId,
    kind: &'static str,
    sources: &[Arc<S>],
    fetch: F,
) -> Option<T>
where
    S: BackendSource + ?Sized,
    F: for<'a> Fn(&'a S) -> BoxFuture<'a, Result<T, BackendError>>,
{
    for source in sources {
        let budget = source.timeout();
        let result = match tokio::time::timeout(budget, fetch(&**source)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(budget.as_millis() as u64)),
        };

        match result {
            Ok(value) => {
                tracing::debug!(backend = source.name(), %title_id, kind, "Title metadata resolved");
                return Some(value);
            }
            Err(e) => {
                tracing::warn!(
                    backend = source.name(),
                    %title_id,
                    kind,
                    error = %e,
                    "Title metadata backend failed, trying next"
                );
            }
        }
    }

    tracing::warn!(%title_id, kind, "All title metadata backends failed");
    None
}
