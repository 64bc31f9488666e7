//! Paged collections.

use http::HeaderMap;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::from_document;
use crate::Client;
use cloudapi_core::Result;

/// One page of a collection: `{"items": [..], "next": {"href": ..}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items of this page.
    pub items: Vec<T>,
    /// Link to the next page, absent on the last one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
}

/// A link to another resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute or relative href.
    pub href: String,
}

impl Client {
    /// GET every page of a collection starting at `url` and return all items in order.
    ///
    /// Pages are followed through `next.href` until a page has no `next`. With
    /// `max_pages` configured, items after that many pages are dropped.
    pub async fn get_array<T: DeserializeOwned>(
        &mut self,
        url: &str,
        headers: HeaderMap,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url.to_string());
        let mut pages = 0;

        while let Some(href) = next.take() {
            if let Some(max) = self.config.max_pages {
                if pages >= max {
                    warn!("stop paging {url} after {max} pages, next page is {href}");
                    break;
                }
            }

            let page: Page<T> = from_document(self.get(&href, headers.clone()).await?, "page")?;
            pages += 1;

            next = page.next.map(|l| l.href).filter(|h| !h.is_empty());
            items.extend(page.items);
        }

        Ok(items)
    }
}
