use std::sync::Arc;

pub use ghsecrets_types::{
    EncryptedSecret, ListOptions, PublicKey, Repository, Secret, Secrets, SelectedRepoIds,
    SelectedReposList,
};
use serde::Serialize;

use crate::{base::BaseClient, error::Error, response::Response, utils::add_options};

/// GitHub Actions secrets endpoints, scoped to a repository or an
/// organization.
pub struct Client {
    client: Arc<BaseClient>,
}

#[derive(Serialize)]
struct SelectedRepoIdsBody<'a> {
    selected_repository_ids: &'a SelectedRepoIds,
}

fn repo_id(repo: &Repository) -> Result<i64, Error> {
    repo.id.ok_or(Error::MissingRepositoryId)
}

impl Client {
    pub(crate) fn new(client: Arc<BaseClient>) -> Self {
        Self { client }
    }

    /// Fetch the key used to encrypt repository secrets.
    #[tracing::instrument(skip(self))]
    pub async fn get_repo_public_key(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<(PublicKey, Response), Error> {
        let path = format!("repos/{owner}/{repo}/actions/secrets/public-key");
        self.client.get(path).await
    }

    /// Fetch the key used to encrypt organization secrets.
    #[tracing::instrument(skip(self))]
    pub async fn get_org_public_key(&self, org: &str) -> Result<(PublicKey, Response), Error> {
        let path = format!("orgs/{org}/actions/secrets/public-key");
        self.client.get(path).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_repo_secrets(
        &self,
        owner: &str,
        repo: &str,
        opts: Option<&ListOptions>,
    ) -> Result<(Secrets, Response), Error> {
        let path = add_options(format!("repos/{owner}/{repo}/actions/secrets"), opts)?;
        self.client.get(path).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_repo_secret(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<(Secret, Response), Error> {
        let path = format!("repos/{owner}/{repo}/actions/secrets/{name}");
        self.client.get(path).await
    }

    /// Create or replace a repository secret. The value must already be
    /// encrypted with the key from [`Client::get_repo_public_key`].
    #[tracing::instrument(skip(self, secret), fields(name = %secret.name))]
    pub async fn create_or_update_repo_secret(
        &self,
        owner: &str,
        repo: &str,
        secret: &EncryptedSecret,
    ) -> Result<Response, Error> {
        let path = format!("repos/{owner}/{repo}/actions/secrets/{}", secret.name);
        self.client.put(path, secret).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_repo_secret(
        &self,
        owner: &str,
        repo: &str,
        name: &str,
    ) -> Result<Response, Error> {
        let path = format!("repos/{owner}/{repo}/actions/secrets/{name}");
        self.client.delete(path).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_org_secrets(
        &self,
        org: &str,
        opts: Option<&ListOptions>,
    ) -> Result<(Secrets, Response), Error> {
        let path = add_options(format!("orgs/{org}/actions/secrets"), opts)?;
        self.client.get(path).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_org_secret(&self, org: &str, name: &str) -> Result<(Secret, Response), Error> {
        let path = format!("orgs/{org}/actions/secrets/{name}");
        self.client.get(path).await
    }

    /// Create or replace an organization secret. The value must already be
    /// encrypted with the key from [`Client::get_org_public_key`].
    #[tracing::instrument(skip(self, secret), fields(name = %secret.name))]
    pub async fn create_or_update_org_secret(
        &self,
        org: &str,
        secret: &EncryptedSecret,
    ) -> Result<Response, Error> {
        let path = format!("orgs/{org}/actions/secrets/{}", secret.name);
        self.client.put(path, secret).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_org_secret(&self, org: &str, name: &str) -> Result<Response, Error> {
        let path = format!("orgs/{org}/actions/secrets/{name}");
        self.client.delete(path).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_selected_repos_for_org_secret(
        &self,
        org: &str,
        name: &str,
        opts: Option<&ListOptions>,
    ) -> Result<(SelectedReposList, Response), Error> {
        let path = add_options(
            format!("orgs/{org}/actions/secrets/{name}/repositories"),
            opts,
        )?;
        self.client.get(path).await
    }

    /// Replace the whole set of repositories that can read an organization
    /// secret with `ids`. An empty set revokes access for every repository.
    #[tracing::instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn set_selected_repos_for_org_secret(
        &self,
        org: &str,
        name: &str,
        ids: &SelectedRepoIds,
    ) -> Result<Response, Error> {
        let path = format!("orgs/{org}/actions/secrets/{name}/repositories");
        let body = SelectedRepoIdsBody {
            selected_repository_ids: ids,
        };
        self.client.put(path, &body).await
    }

    #[tracing::instrument(skip(self, repo), fields(repo_id = ?repo.id))]
    pub async fn add_selected_repo_to_org_secret(
        &self,
        org: &str,
        name: &str,
        repo: &Repository,
    ) -> Result<Response, Error> {
        let path = format!(
            "orgs/{org}/actions/secrets/{name}/repositories/{}",
            repo_id(repo)?
        );
        self.client.put_empty(path).await
    }

    #[tracing::instrument(skip(self, repo), fields(repo_id = ?repo.id))]
    pub async fn remove_selected_repo_from_org_secret(
        &self,
        org: &str,
        name: &str,
        repo: &Repository,
    ) -> Result<Response, Error> {
        let path = format!(
            "orgs/{org}/actions/secrets/{name}/repositories/{}",
            repo_id(repo)?
        );
        self.client.delete(path).await
    }
}
