//! Root document lookups.

use http::HeaderMap;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::from_document;
use crate::Client;
use cloudapi_core::Result;

/// RootDocument maps resource group names to `{"href": ..}` objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RootDocument(pub Map<String, Value>);

impl RootDocument {
    /// Get the href of a resource group.
    ///
    /// Returns `None` if the group is absent or has no string `href`.
    pub fn href(&self, group: &str) -> Option<&str> {
        self.0.get(group)?.get("href")?.as_str()
    }
}

impl Client {
    /// Fetch `{endpoint}/api/`. Never cached.
    pub async fn get_root_master(&mut self) -> Result<RootDocument> {
        info!("get root master");
        let href = format!("{}/api/", self.endpoint());
        from_document(self.get(&href, HeaderMap::new()).await?, "root")
    }

    /// Fetch `{endpoint}/api/compute`, or `{endpoint}/api/compute/tag/{tag}`.
    ///
    /// Documents are cached by href for the lifetime of the client.
    pub async fn get_root(&mut self, tag: Option<&str>) -> Result<RootDocument> {
        info!("get root for tag: {tag:?}");
        let mut href = format!("{}/api/compute", self.endpoint());
        if let Some(tag) = tag.filter(|t| !t.is_empty()) {
            href = format!("{href}/tag/{tag}");
        }

        if let Some(root) = self.cache.get(&href) {
            info!("root document cache hit for href: {href}");
            return Ok(root.clone());
        }

        let root: RootDocument = from_document(self.get(&href, HeaderMap::new()).await?, "root")?;
        self.cache.insert(href, root.clone());
        Ok(root)
    }

    /// Resolve the href of `group` in the root document of `tag`.
    ///
    /// An absolute `reference` (`http://` or `https://`, any case) is returned as is,
    /// a relative one is appended to the group href. Returns `None` when neither gives
    /// an href.
    pub async fn get_href(
        &mut self,
        group: &str,
        tag: Option<&str>,
        reference: Option<&str>,
    ) -> Result<Option<String>> {
        info!("get href for group: {group}, tag: {tag:?}, ref: {reference:?}");
        let root = self.get_root(tag).await?;
        let base = root.href(group);

        Ok(match reference.filter(|r| !r.is_empty()) {
            Some(r) if is_absolute(r) => Some(r.to_string()),
            Some(r) => base.map(|b| format!("{b}{r}")),
            None => base.map(str::to_string),
        })
    }
}

fn is_absolute(reference: &str) -> bool {
    let r = reference.to_ascii_lowercase();
    r.starts_with("http://") || r.starts_with("https://")
}
