//! Implements gitlab page number pagination

use reqwest::Url;
use serde::Serialize;
use tracing::{debug, error, instrument};

use crate::{error::BoxedError, gitlab::connection::Connection};

/// Number of items requested for each page (the maximum allowed by gitlab)
pub const PER_PAGE: u32 = 100;

/// Why a listing stopped before reaching an empty page
#[derive(Clone, Debug, Serialize)]
pub struct Interruption {
    /// The page that could not be fetched
    pub page: u32,
    /// What went wrong
    pub reason: String,
}

/// Result of [`PageNumberPagination::get_all`]
#[derive(Debug)]
pub struct Listing<T> {
    /// Items of all the pages fetched successfully, in the order gitlab returned them
    pub items: Vec<T>,
    /// `None` if every page has been fetched
    pub interrupted: Option<Interruption>,
}

impl<T> Listing<T> {
    /// `true` if the listing went up to the last page
    pub const fn is_complete(&self) -> bool {
        self.interrupted.is_none()
    }
}

/// cf <https://docs.gitlab.com/api/rest/#offset-based-pagination>
pub trait PageNumberPagination<T: for<'serde> serde::Deserialize<'serde>> {
    #[instrument(skip_all, fields(url = %url))]
    /// Starting from page 1, get all the items until an empty page is returned
    ///
    /// A failing page stops the listing. The items already fetched are kept
    /// and the failure is reported in [`Listing::interrupted`]
    async fn get_all(connection: &Connection, url: Url) -> Listing<T> {
        let mut items: Vec<T> = Vec::new();
        let mut page: u32 = 1;

        debug!("starting");

        loop {
            match get_page::<T>(connection, &url, page).await {
                Ok(Some(mut page_items)) => {
                    debug!("page {page}: {} items", page_items.len());
                    items.append(&mut page_items);
                    page = page.saturating_add(1);
                }
                Ok(None) => {
                    debug!("Ok! {} items", items.len());
                    return Listing {
                        items,
                        interrupted: None,
                    };
                }
                Err(err) => {
                    error!("listing stopped at page {page}: {err}");
                    return Listing {
                        items,
                        interrupted: Some(Interruption {
                            page,
                            reason: err.to_string(),
                        }),
                    };
                }
            }
        }
    }
}

/// Gets a single page, `None` means the page is empty
async fn get_page<T: for<'serde> serde::Deserialize<'serde>>(
    connection: &Connection,
    url: &Url,
    page: u32,
) -> Result<Option<Vec<T>>, BoxedError> {
    let mut page_url = url.clone();
    page_url
        .query_pairs_mut()
        .append_pair("page", &page.to_string())
        .append_pair("per_page", &PER_PAGE.to_string());

    debug!("trying to GET {page_url}");

    let resp = connection.http_client.get(page_url.clone()).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        error!("{page_url} - {status} : {body}");
        return Err(format!("{page_url} returned {status}").into());
    }

    let raw_json = resp.text().await?;
    let page_items: Option<Vec<T>> = serde_json::from_str(&raw_json).map_err(|err| {
        #[expect(clippy::absolute_paths, reason = "Use a specific Error type")]
        std::io::Error::other(format!("error decoding page {page} : {err}"))
    })?;

    Ok(page_items.filter(|val| !val.is_empty()))
}

//-------------------------------------------
//
// Unit tests
//
// ------------------------------------------
