//! Looks for a branch in every project visible to the token
//!
//! Projects are listed first, then checked one at a time in ascending id order.

use tracing::{debug, info, instrument, warn};

use crate::error::BoxedError;
use crate::gitlab::{branch, Connection, Listing, Project};
use crate::render::{Renderer, ScanEvent};

/// Drives a scan and reports its progress to a [`Renderer`]
pub struct Scanner<'conn, R: Renderer> {
    /// Connection used for every request
    connection: &'conn Connection,
    /// Receives the progress events
    renderer: R,
}

impl<'conn, R: Renderer> Scanner<'conn, R> {
    /// Creates a new [`Scanner`]
    pub const fn new(connection: &'conn Connection, renderer: R) -> Self {
        Self {
            connection,
            renderer,
        }
    }

    /// Gets all the projects, sorted by id
    #[instrument(skip_all, err)]
    pub async fn list_projects(&mut self) -> Result<Listing<Project>, BoxedError> {
        self.renderer.render(&ScanEvent::ListingStarted)?;

        let mut listing = Project::get_all_visible(self.connection).await?;
        listing.items.sort_by_key(|project| project.id);

        info!(
            "{} projects, complete: {}",
            listing.items.len(),
            listing.is_complete()
        );

        self.renderer.render(&ScanEvent::ListingFinished {
            total: listing.items.len(),
            interrupted: listing.interrupted.as_ref(),
        })?;

        Ok(listing)
    }

    /// Checks every project of `projects` in order and returns the ones containing `branch`
    ///
    /// A project that can't be checked is reported as not containing the branch
    #[instrument(skip(self, projects), err)]
    pub async fn find_branch(
        &mut self,
        branch: &str,
        projects: &[Project],
    ) -> Result<Vec<Project>, BoxedError> {
        let total = projects.len();
        let mut matches = Vec::new();

        self.renderer.render(&ScanEvent::ScanStarted { branch })?;

        for (position, project) in projects.iter().enumerate() {
            let index = position.saturating_add(1);
            self.renderer.render(&ScanEvent::Checking {
                index,
                total,
                project,
            })?;

            let found = match branch::exists(self.connection, project.id, branch).await {
                Ok(found) => found,
                Err(err) => {
                    warn!("can't check project {} (ID: {}): {err}", project.name, project.id);
                    false
                }
            };

            if found {
                info!("found in project {} (ID: {})", project.name, project.id);
                self.renderer.render(&ScanEvent::Found { index, project })?;
                matches.push(project.clone());
            } else {
                debug!("not found in project {}", project.id);
                self.renderer.render(&ScanEvent::NotFound { index, project })?;
            }
        }

        self.renderer.render(&ScanEvent::Finished {
            total,
            found: matches.len(),
        })?;

        Ok(matches)
    }
}

//-------------------------------------------
//
// Unit tests
//
// ------------------------------------------
