//! Checks the existence of a [branch](https://docs.gitlab.com/api/branches/#get-single-repository-branch)

use tracing::{debug, instrument};

use crate::error::BoxedError;
use crate::gitlab::connection::Connection;

/// Returns `true` if `branch` exists in the repository of project `project_id`
///
/// Any non-success status (including `404 Not Found`) means the branch doesn't exist.
/// Only transport failures are returned as errors.
#[instrument(skip(connection), err)]
pub async fn exists(
    connection: &Connection,
    project_id: u64,
    branch: &str,
) -> Result<bool, BoxedError> {
    let id = project_id.to_string();
    let url = connection.endpoint(["projects", id.as_str(), "repository", "branches", branch])?;

    debug!("trying to GET {url}");

    let status = connection.http_client.get(url).send().await?.status();

    debug!("{status}");

    Ok(status.is_success())
}

//-------------------------------------------
//
// Unit tests
//
// ------------------------------------------
