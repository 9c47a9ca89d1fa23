use ghsecrets_types::Timestamp;
use reqwest::{header::HeaderMap, Method, StatusCode, Url};

/// Transport level envelope of an API call.
///
/// Populated as soon as the server answers, whether or not the body could be
/// decoded.
#[derive(Debug, Clone)]
pub struct Response {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub rate: Rate,
    pub pagination: Pagination,
}

impl Response {
    pub(crate) fn new(method: Method, url: Url, status: StatusCode, headers: HeaderMap) -> Self {
        let rate = Rate::from_headers(&headers);
        let pagination = headers
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(Pagination::parse)
            .unwrap_or_default();
        Self {
            method,
            url,
            status,
            headers,
            rate,
            pagination,
        }
    }

    #[must_use]
    pub fn next_page(&self) -> Option<u32> {
        self.pagination.next
    }

    #[must_use]
    pub fn last_page(&self) -> Option<u32> {
        self.pagination.last
    }
}

/// Rate limit state reported in the `x-ratelimit-*` headers.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rate {
    pub limit: Option<u32>,
    pub remaining: Option<u32>,
    pub used: Option<u32>,
    pub reset: Option<Timestamp>,
}

impl Rate {
    fn from_headers(headers: &HeaderMap) -> Self {
        fn header<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok())
        }

        Self {
            limit: header(headers, "x-ratelimit-limit"),
            remaining: header(headers, "x-ratelimit-remaining"),
            used: header(headers, "x-ratelimit-used"),
            reset: header::<i64>(headers, "x-ratelimit-reset").and_then(|epoch| {
                chrono::DateTime::from_timestamp(epoch, 0).map(Timestamp::from)
            }),
        }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }
}

/// Page numbers advertised in the `Link` header.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub first: Option<u32>,
    pub prev: Option<u32>,
    pub next: Option<u32>,
    pub last: Option<u32>,
}

impl Pagination {
    /// Parse a header like
    /// `<https://api.github.com/repositories/1/actions/secrets?page=2>; rel="next", <…?page=5>; rel="last"`.
    #[must_use]
    pub fn parse(link_header: &str) -> Self {
        let mut pagination = Self::default();

        for part in link_header.split(',') {
            let mut url = None;
            let mut rel = None;

            for segment in part.split(';').map(str::trim) {
                if let Some(inner) = segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
                    url = Some(inner);
                } else if let Some(value) = segment.strip_prefix("rel=") {
                    rel = Some(value.trim_matches('"'));
                }
            }

            let (Some(url), Some(rel)) = (url, rel) else {
                continue;
            };
            let Some(page) = page_from_url(url) else {
                continue;
            };
            match rel {
                "first" => pagination.first = Some(page),
                "prev" => pagination.prev = Some(page),
                "next" => pagination.next = Some(page),
                "last" => pagination.last = Some(page),
                _ => {}
            }
        }

        pagination
    }
}

fn page_from_url(url: &str) -> Option<u32> {
    let url = Url::parse(url).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
