use serde::{Deserialize, Serialize};

/// Pagination parameters accepted by list endpoints.
///
/// Only the fields that are set to a non-zero value end up in the query
/// string.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    #[serde(default, skip_serializing_if = "is_unset")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "is_unset")]
    pub per_page: Option<u32>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_unset(value: &Option<u32>) -> bool {
    matches!(value, None | Some(0))
}

impl ListOptions {
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }
}
