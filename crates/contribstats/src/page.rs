//! Bounded sequential pagination over list endpoints.
//!
//! The upstream APIs page at 100 items. A run only ever needs a bounded
//! slice of history, so the walk is capped at a small page ceiling instead
//! of following pagination to the end of huge histories. Results are
//! materialized into a `Vec` because aggregation folds over the full set.

use std::future::Future;

/// Items requested per page.
pub const PAGE_SIZE: u32 = 100;

/// Default upper bound on pages fetched per listing.
pub const DEFAULT_MAX_PAGES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page_size: u32,
    pub max_pages: u32,
}

impl Default for Pager {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl Pager {
    #[must_use]
    pub fn with_max_pages(max_pages: u32) -> Self {
        Self {
            max_pages,
            ..Self::default()
        }
    }

    /// Fetch pages 1..=max_pages, concatenating the returned arrays.
    ///
    /// Stops after the first page that is empty or shorter than the page
    /// size (last page), without issuing a request for the page after it.
    pub async fn collect<T, E, F, Fut>(&self, mut fetch_page: F) -> Result<Vec<T>, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        let mut all = Vec::new();
        for page in 1..=self.max_pages {
            let items = fetch_page(page).await?;
            let count = items.len();
            all.extend(items);
            if count == 0 || (count as u32) < self.page_size {
                break;
            }
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn pager(page_size: u32, max_pages: u32) -> Pager {
        Pager {
            page_size,
            max_pages,
        }
    }

    #[tokio::test]
    async fn stops_after_short_page_without_requesting_the_next() {
        let requested: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requested);

        // Pages 1..=2 are full, page 3 is short.
        let result: Vec<u32> = pager(3, 10)
            .collect(|page| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push(page);
                    let items = match page {
                        1 => vec![1, 2, 3],
                        2 => vec![4, 5, 6],
                        3 => vec![7],
                        _ => panic!("page {page} should not be requested"),
                    };
                    Ok::<_, ()>(items)
                }
            })
            .await
            .unwrap();

        assert_eq!(result, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(*requested.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn stops_on_empty_page() {
        let result: Vec<u32> = pager(2, 10)
            .collect(|page| async move {
                let items = if page == 1 { vec![1, 2] } else { Vec::new() };
                Ok::<_, ()>(items)
            })
            .await
            .unwrap();

        assert_eq!(result, vec![1, 2]);
    }

    #[tokio::test]
    async fn enforces_page_ceiling_when_every_page_is_full() {
        let requested: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&requested);

        let result: Vec<u32> = pager(2, 4)
            .collect(|page| {
                let log = Arc::clone(&log);
                async move {
                    log.lock().unwrap().push(page);
                    Ok::<_, ()>(vec![page, page])
                }
            })
            .await
            .unwrap();

        assert_eq!(result.len(), 8);
        assert_eq!(*requested.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn propagates_fetch_errors() {
        let err = pager(2, 10)
            .collect(|page| async move {
                if page == 2 {
                    Err("boom")
                } else {
                    Ok(vec![1, 2])
                }
            })
            .await
            .unwrap_err();

        assert_eq!(err, "boom");
    }
}
