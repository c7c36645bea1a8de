//! Defines a gitab project

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::BoxedError;
use crate::gitlab::connection::Connection;
use crate::gitlab::pagination::{Listing, PageNumberPagination};

/// Defines a [gitlab project](https://docs.gitlab.com/api/projects/#list-all-projects)
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Project id
    pub id: u64,
    /// Project display name
    pub name: String,
}

#[expect(clippy::missing_trait_methods, reason = "we don't need it")]
impl PageNumberPagination<Self> for Project {}

impl Project {
    /// Lists every project visible with the connection's token
    #[instrument(skip_all, err)]
    pub async fn get_all_visible(connection: &Connection) -> Result<Listing<Self>, BoxedError> {
        let url = connection.endpoint(["projects"])?;
        Ok(Self::get_all(connection, url).await)
    }
}
