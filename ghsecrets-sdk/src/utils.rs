use serde::Serialize;

use crate::error::Error;

/// Append the encoded `opts` to `path` as a query string.
///
/// `None`, or options with no field set, leave `path` untouched.
pub(crate) fn add_options<T: Serialize>(path: String, opts: Option<&T>) -> Result<String, Error> {
    let Some(opts) = opts else {
        return Ok(path);
    };
    let query = serde_qs::to_string(opts).map_err(Error::Query)?;
    if query.is_empty() {
        Ok(path)
    } else {
        Ok(format!("{path}?{query}"))
    }
}
