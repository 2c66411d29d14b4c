use log::info;

use super::GitLabClient;
use crate::error::Result;
use crate::providers::gitlab::types::{branch_names, Branch};

impl GitLabClient {
    /// Lists every branch of the project.
    pub async fn list_branches(&self, project_id: &str) -> Result<Vec<Branch>> {
        let url = self.project_url(project_id)?.join("repository/branches")?;
        let branches: Vec<Branch> = self.get_all_pages(url, &[]).await?;

        info!("Branches found: {}", branches.len());
        info!("Name of branches: {}", branch_names(&branches));

        Ok(branches)
    }

    pub async fn delete_branch(&self, project_id: &str, name: &str) -> Result<()> {
        let url = self
            .project_url(project_id)?
            .join(&format!("repository/branches/{}", urlencoding::encode(name)))?;

        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}
