#![forbid(unsafe_code)]
#![forbid(clippy::unwrap_used)]
#![deny(clippy::pedantic)]
#![deny(clippy::get_unwrap)]
#![allow(clippy::module_name_repetitions)]

pub mod options;
pub mod repository;
pub mod secrets;
pub mod timestamp;

pub use options::ListOptions;
pub use repository::{Repository, User};
pub use secrets::{
    EncryptedSecret, PublicKey, Secret, Secrets, SelectedRepoIds, SelectedReposList,
};
pub use timestamp::Timestamp;
