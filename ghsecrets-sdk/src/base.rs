use reqwest::{
    header::{HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use crate::{
    config::Config,
    error::{Error, ErrorResponse},
    response::Response,
};

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// Builds requests relative to the API url and executes them.
pub(crate) struct BaseClient {
    api_url: Url,
    token: RwLock<Option<String>>,
    http: reqwest::Client,
}

impl BaseClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let api_url = config.sanitize()?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(Error::Request)?;
        Ok(Self {
            api_url,
            token: RwLock::new(config.token.clone()),
            http,
        })
    }

    pub async fn set_token(&self, token: Option<String>) {
        let mut current = self.token.write().await;
        *current = token;
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        self.api_url.join(path).map_err(|e| Error::InvalidUrl {
            url: format!("{}{path}", self.api_url),
            reason: e.to_string(),
        })
    }

    async fn build(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Request, Error> {
        let url = self.url(path)?;
        let mut request_builder = self
            .http
            .request(method, url)
            .header(ACCEPT, MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION);
        if let Some(token) = self.token.read().await.as_ref() {
            request_builder = request_builder.bearer_auth(token);
        }
        if let Some(body) = body {
            request_builder = request_builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }
        request_builder.build().map_err(Error::Request)
    }

    /// Execute a request and return the envelope and the raw body of a
    /// successful response.
    #[tracing::instrument(level = "debug", skip_all, fields(method = %request.method(), url = %request.url()))]
    async fn execute(&self, request: reqwest::Request) -> Result<(Response, Vec<u8>), Error> {
        let method = request.method().clone();
        let url = request.url().clone();

        tracing::debug!("sending request");
        let resp = self
            .http
            .execute(request)
            .await
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
                response: None,
            })?;

        let response = Response::new(method, url, resp.status(), resp.headers().clone());
        tracing::debug!(status = %response.status, "received response");

        let body = match resp.bytes().await {
            Ok(body) => body.to_vec(),
            Err(source) => {
                return Err(Error::Transport {
                    url: response.url.to_string(),
                    source,
                    response: Some(Box::new(response)),
                })
            }
        };

        if !response.status.is_success() {
            let body = ErrorResponse::from_body(&body);
            let rate_limited = matches!(response.status.as_u16(), 403 | 429)
                && response.rate.is_exhausted();
            if rate_limited {
                tracing::warn!(reset = ?response.rate.reset, "rate limit exhausted");
                return Err(Error::RateLimited {
                    response: Box::new(response),
                    body,
                });
            }
            return Err(Error::Status {
                response: Box::new(response),
                body,
            });
        }

        Ok((response, body))
    }

    fn decode<T: DeserializeOwned>(response: Response, body: &[u8]) -> Result<(T, Response), Error> {
        match serde_json::from_slice(body) {
            Ok(value) => Ok((value, response)),
            Err(source) => Err(Error::Decode {
                response: Box::new(response),
                source,
            }),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: String) -> Result<(T, Response), Error> {
        let request = self.build(Method::GET, &path, None).await?;
        let (response, body) = self.execute(request).await?;
        Self::decode(response, &body)
    }

    pub async fn put<T: Serialize>(&self, path: String, body: &T) -> Result<Response, Error> {
        let body = serde_json::to_vec(body).map_err(Error::Body)?;
        let request = self.build(Method::PUT, &path, Some(body)).await?;
        self.execute(request).await.map(|(response, _)| response)
    }

    pub async fn put_empty(&self, path: String) -> Result<Response, Error> {
        let request = self.build(Method::PUT, &path, None).await?;
        self.execute(request).await.map(|(response, _)| response)
    }

    pub async fn delete(&self, path: String) -> Result<Response, Error> {
        let request = self.build(Method::DELETE, &path, None).await?;
        self.execute(request).await.map(|(response, _)| response)
    }
}
