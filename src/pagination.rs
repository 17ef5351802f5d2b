//! Marker-based pagination.
//!
//! The provider truncates list results server-side and hands back an opaque
//! marker. Paging is pull-based: nothing is fetched until the caller asks
//! for the next page, and pages are fetched strictly in order because each
//! marker comes from the previous response.

use crate::error::{Error, Result};
use crate::types::ListOptions;
use async_trait::async_trait;
use log::debug;

/// One page of a listing.
///
/// A page is either final (`truncated == false`, no marker) or truncated
/// with a non-empty marker. [`ListPage::new`] enforces this.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    /// Items in provider order.
    pub items: Vec<T>,
    pub truncated: bool,
    pub next_marker: Option<String>,
}

impl<T> ListPage<T> {
    /// Build a page, rejecting marker/truncation combinations that violate
    /// the listing contract with [`Error::Protocol`].
    pub fn new(items: Vec<T>, truncated: bool, next_marker: Option<String>) -> Result<Self> {
        match (truncated, next_marker.as_deref()) {
            (true, None) | (true, Some("")) => Err(Error::Protocol(
                "page is truncated but carries no next marker".to_string(),
            )),
            (false, Some(marker)) if !marker.is_empty() => Err(Error::Protocol(format!(
                "page is not truncated but carries next marker {marker:?}"
            ))),
            // An empty marker on a final page is how some endpoints spell "none".
            (false, _) => Ok(Self {
                items,
                truncated: false,
                next_marker: None,
            }),
            (true, Some(_)) => Ok(Self {
                items,
                truncated: true,
                next_marker,
            }),
        }
    }

    /// True when no further page exists.
    pub fn is_final(&self) -> bool {
        !self.truncated
    }
}

/// Options for the page after `page`: the same filter and limit with the
/// marker replaced by `page.next_marker`. `None` once `page` is final.
pub fn advance<T>(page: &ListPage<T>, options: &ListOptions) -> Option<ListOptions> {
    if !page.truncated {
        return None;
    }
    let marker = page.next_marker.clone()?;
    Some(ListOptions {
        marker: Some(marker),
        ..options.clone()
    })
}

/// A resource listing that can be fetched one page at a time.
#[async_trait]
pub trait PagedList: Send + Sync {
    type Item: Send;

    async fn list_page(&self, options: &ListOptions) -> Result<ListPage<Self::Item>>;
}

/// Lazy, restartable sequence of pages.
///
/// The sequence ends after the first final page or the first
/// non-retryable error. After a retryable error ([`Error::is_retryable`])
/// the pager keeps its position, and the next call to
/// [`Pager::next_page`] requests the same page again. The pager refuses to
/// continue if the provider hands back the marker it was just given, and
/// optionally after a maximum number of pages.
///
/// # Example
///
/// ```rust,no_run
/// use hwcloud::{Client, ClientConfig, Credential, ListOptions, ResourceState};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let cred = Credential::new("AK", "SK", "cn-north-1", "project-id", "domain");
///     let client = Client::new(cred)?;
///
///     let options = ListOptions::new()
///         .with_limit(2)
///         .with_state_filter(ResourceState::Enabled);
///     let mut pager = client.keys().pages(options).with_max_pages(100);
///     while let Some(page) = pager.next_page().await {
///         for key in page?.items {
///             println!("{} {}", key.id, key.alias);
///         }
///     }
///     Ok(())
/// }
/// ```
pub struct Pager<L: PagedList> {
    lister: L,
    initial: ListOptions,
    next: Option<ListOptions>,
    fetched: usize,
    max_pages: Option<usize>,
}

impl<L: PagedList> Pager<L> {
    pub fn new(lister: L, options: ListOptions) -> Self {
        Self {
            lister,
            next: Some(options.clone()),
            initial: options,
            fetched: 0,
            max_pages: None,
        }
    }

    /// Fail with [`Error::Protocol`] instead of fetching more than `max` pages.
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = Some(max);
        self
    }

    /// Number of pages fetched since the last reset.
    pub fn pages_fetched(&self) -> usize {
        self.fetched
    }

    /// Start over from the initial options.
    pub fn reset(&mut self) {
        self.next = Some(self.initial.clone());
        self.fetched = 0;
    }

    /// Fetch the next page, or `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Option<Result<ListPage<L::Item>>> {
        let options = self.next.take()?;

        if let Some(max) = self.max_pages {
            if self.fetched >= max {
                return Some(Err(Error::Protocol(format!(
                    "listing did not terminate within {max} pages"
                ))));
            }
        }

        let page = match self.lister.list_page(&options).await {
            Ok(page) => page,
            Err(err) => {
                // Keep the position so the same page can be asked for again.
                if err.is_retryable() {
                    self.next = Some(options);
                }
                return Some(Err(err));
            }
        };
        self.fetched += 1;

        if page.truncated && page.next_marker.is_some() && page.next_marker == options.marker {
            return Some(Err(Error::Protocol(format!(
                "provider returned the same marker {:?} twice",
                page.next_marker.as_deref().unwrap_or_default()
            ))));
        }

        self.next = advance(&page, &options);
        debug!(
            "fetched page {} with {} items, truncated={}",
            self.fetched,
            page.items.len(),
            page.truncated
        );
        Some(Ok(page))
    }

    /// Drain the remaining pages into one vector, in page order.
    pub async fn collect_all(mut self) -> Result<Vec<L::Item>> {
        let mut items = Vec::new();
        while let Some(page) = self.next_page().await {
            items.extend(page?.items);
        }
        Ok(items)
    }
}
