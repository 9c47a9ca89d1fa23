#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![deny(clippy::pedantic)]
#![deny(clippy::get_unwrap)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

use std::sync::Arc;

use base::BaseClient;

pub mod actions;
pub(crate) mod base;
pub mod config;
pub mod error;
pub mod response;
pub(crate) mod utils;

pub use config::Config;
pub use error::{Error, ErrorDetail, ErrorResponse};
pub use response::{Pagination, Rate, Response};

pub struct Client {
    pub actions: crate::actions::Client,
    base: Arc<BaseClient>,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let base_client = Arc::new(BaseClient::new(config)?);

        let actions = crate::actions::Client::new(Arc::clone(&base_client));

        Ok(Self {
            actions,
            base: base_client,
        })
    }

    /// Client configured with [`Config::from_env`].
    pub fn from_env() -> Result<Self, Error> {
        Self::new(&Config::from_env())
    }

    /// Replace the token sent with every subsequent request.
    pub async fn set_token(&self, token: Option<String>) {
        self.base.set_token(token).await;
    }
}
