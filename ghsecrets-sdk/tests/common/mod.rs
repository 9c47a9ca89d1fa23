use std::{
    collections::{BTreeMap, BTreeSet},
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard},
};

use ghsecrets_sdk::{Client, Config};
use hyper::{
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, StatusCode,
};
use serde_json::{json, Value};

pub const REPO_KEY_ID: &str = "012345678912345678";
pub const ORG_KEY_ID: i64 = 568_250_167_242_549_743;
pub const PUBLIC_KEY: &str = "2Sg8iYjAxxmI2LvUXpJjkYrMxURPc8r+dB7TJyvv1234";
pub const RATE_RESET: i64 = 1_372_700_873;

const CREATED_AT: &str = "2019-08-10T14:59:22Z";
const UPDATED_AT: &str = "2020-01-10T14:59:22Z";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Debug, Clone)]
pub struct StoredSecret {
    pub body: Value,
}

#[derive(Debug, Default)]
pub struct State {
    pub repo_secrets: BTreeMap<String, BTreeMap<String, StoredSecret>>,
    pub org_secrets: BTreeMap<String, BTreeMap<String, StoredSecret>>,
    pub selected_repos: BTreeMap<(String, String), BTreeSet<i64>>,
    pub requests: Vec<RecordedRequest>,
    /// Answer every request with 403 and an exhausted rate limit.
    pub rate_exhausted: bool,
    /// Answer successful GETs with a body that is not JSON.
    pub garbage_body: bool,
}

/// In-process stand-in for the GitHub Actions secrets API.
#[derive(Clone, Default)]
pub struct FakeGitHub {
    state: Arc<Mutex<State>>,
}

impl FakeGitHub {
    pub fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.state().requests.last().cloned().unwrap()
    }

    pub fn request_count(&self) -> usize {
        self.state().requests.len()
    }

    pub fn insert_org_secret(&self, org: &str, name: &str) {
        self.state()
            .org_secrets
            .entry(org.to_string())
            .or_default()
            .insert(
                name.to_string(),
                StoredSecret {
                    body: json!({ "visibility": "selected" }),
                },
            );
    }

    pub fn selected_repos(&self, org: &str, name: &str) -> BTreeSet<i64> {
        self.state()
            .selected_repos
            .get(&(org.to_string(), name.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}

/// Spawn a fake GitHub on an ephemeral port and return an SDK pointed at it.
pub async fn setup() -> (Client, FakeGitHub) {
    let fake = FakeGitHub::default();
    let state = Arc::clone(&fake.state);

    let make_svc = make_service_fn(move |_conn| {
        let state = Arc::clone(&state);
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { Ok::<_, Infallible>(handle(state, req).await) }
            }))
        }
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let server = hyper::Server::bind(&addr).serve(make_svc);
    let port = server.local_addr().port();

    tokio::spawn(async move {
        if let Err(err) = server.await {
            panic!("fake github error: {err}");
        }
    });

    let config = Config::default()
        .with_api_url(format!("http://127.0.0.1:{port}/api/v3"))
        .with_token("test-token");
    let sdk = Client::new(&config).unwrap();

    (sdk, fake)
}

fn respond(status: StatusCode, body: Option<Value>, state: &State) -> Response<Body> {
    let remaining = if state.rate_exhausted { 0 } else { 4999 };
    let builder = Response::builder()
        .status(status)
        .header("content-type", "application/json; charset=utf-8")
        .header("x-ratelimit-limit", "5000")
        .header("x-ratelimit-remaining", remaining.to_string())
        .header("x-ratelimit-used", (5000 - remaining).to_string())
        .header("x-ratelimit-reset", RATE_RESET.to_string());
    let body = match body {
        Some(body) => Body::from(body.to_string()),
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

fn not_found(state: &State) -> Response<Body> {
    respond(
        StatusCode::NOT_FOUND,
        Some(json!({
            "message": "Not Found",
            "documentation_url": "https://docs.github.com/rest/actions/secrets"
        })),
        state,
    )
}

fn secret_json(name: &str, stored: &StoredSecret) -> Value {
    let mut secret = json!({
        "name": name,
        "created_at": CREATED_AT,
        "updated_at": UPDATED_AT,
    });
    if let Some(visibility) = stored.body.get("visibility") {
        secret["visibility"] = visibility.clone();
    }
    secret
}

fn page_params(query: Option<&str>) -> (usize, usize) {
    let mut page = 1;
    let mut per_page = 30;
    for pair in query.unwrap_or_default().split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            match key {
                "page" => page = value.parse().unwrap(),
                "per_page" => per_page = value.parse().unwrap(),
                _ => {}
            }
        }
    }
    (page, per_page)
}

/// Paginate `secrets`, returning the page body and the `Link` header.
fn list_secrets(
    secrets: Option<&BTreeMap<String, StoredSecret>>,
    host: &str,
    path: &str,
    query: Option<&str>,
) -> (Value, Option<String>) {
    let all: Vec<Value> = secrets
        .map(|secrets| {
            secrets
                .iter()
                .map(|(name, stored)| secret_json(name, stored))
                .collect()
        })
        .unwrap_or_default();
    let (page, per_page) = page_params(query);
    let last = all.len().div_ceil(per_page).max(1);
    let items: Vec<Value> = all
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .cloned()
        .collect();

    let link = |rel: &str, page: usize| {
        format!(r#"<http://{host}{path}?per_page={per_page}&page={page}>; rel="{rel}""#)
    };
    let mut links = Vec::new();
    if page > 1 {
        links.push(link("first", 1));
        links.push(link("prev", page - 1));
    }
    if page < last {
        links.push(link("next", page + 1));
        links.push(link("last", last));
    }
    let link_header = (!links.is_empty()).then(|| links.join(", "));

    (
        json!({ "total_count": all.len(), "secrets": items }),
        link_header,
    )
}

async fn handle(state: Arc<Mutex<State>>, req: Request<Body>) -> Response<Body> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let query = req.uri().query().map(ToString::to_string);
    let host = req
        .headers()
        .get("host")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("127.0.0.1")
        .to_string();
    let authorization = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(ToString::to_string);
    let body = hyper::body::to_bytes(req.into_body())
        .await
        .unwrap()
        .to_vec();

    let mut state = state.lock().unwrap();
    state.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        authorization,
        body: body.clone(),
    });

    if state.rate_exhausted {
        return respond(
            StatusCode::FORBIDDEN,
            Some(json!({ "message": "API rate limit exceeded" })),
            &state,
        );
    }

    let segments: Vec<&str> = path
        .trim_start_matches("/api/v3/")
        .split('/')
        .collect();

    if state.garbage_body && method == Method::GET {
        return Response::builder()
            .status(StatusCode::OK)
            .body(Body::from("<html>definitely not json</html>"))
            .unwrap();
    }

    match (method, segments.as_slice()) {
        (Method::GET, ["repos", _, _, "actions", "secrets", "public-key"]) => respond(
            StatusCode::OK,
            Some(json!({ "key_id": REPO_KEY_ID, "key": PUBLIC_KEY })),
            &state,
        ),
        (Method::GET, ["orgs", _, "actions", "secrets", "public-key"]) => respond(
            StatusCode::OK,
            Some(json!({ "key_id": ORG_KEY_ID, "key": PUBLIC_KEY })),
            &state,
        ),

        (Method::GET, ["repos", owner, repo, "actions", "secrets"]) => {
            let (body, link) = list_secrets(
                state.repo_secrets.get(&format!("{owner}/{repo}")),
                &host,
                &path,
                query.as_deref(),
            );
            let mut resp = respond(StatusCode::OK, Some(body), &state);
            if let Some(link) = link {
                resp.headers_mut().insert("link", link.parse().unwrap());
            }
            resp
        }
        (Method::GET, ["repos", owner, repo, "actions", "secrets", name]) => {
            match state
                .repo_secrets
                .get(&format!("{owner}/{repo}"))
                .and_then(|secrets| secrets.get(*name))
            {
                Some(stored) => respond(StatusCode::OK, Some(secret_json(name, stored)), &state),
                None => not_found(&state),
            }
        }
        (Method::PUT, ["repos", owner, repo, "actions", "secrets", name]) => {
            let body: Value = serde_json::from_slice(&body).unwrap();
            let created = state
                .repo_secrets
                .entry(format!("{owner}/{repo}"))
                .or_default()
                .insert((*name).to_string(), StoredSecret { body })
                .is_none();
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::NO_CONTENT
            };
            respond(status, created.then(|| json!({})), &state)
        }
        (Method::DELETE, ["repos", owner, repo, "actions", "secrets", name]) => {
            let removed = state
                .repo_secrets
                .get_mut(&format!("{owner}/{repo}"))
                .and_then(|secrets| secrets.remove(*name));
            match removed {
                Some(_) => respond(StatusCode::NO_CONTENT, None, &state),
                None => not_found(&state),
            }
        }

        (Method::GET, ["orgs", org, "actions", "secrets"]) => {
            let (body, link) = list_secrets(
                state.org_secrets.get(*org),
                &host,
                &path,
                query.as_deref(),
            );
            let mut resp = respond(StatusCode::OK, Some(body), &state);
            if let Some(link) = link {
                resp.headers_mut().insert("link", link.parse().unwrap());
            }
            resp
        }
        (Method::GET, ["orgs", org, "actions", "secrets", name]) => {
            match state
                .org_secrets
                .get(*org)
                .and_then(|secrets| secrets.get(*name))
            {
                Some(stored) => {
                    let mut secret = secret_json(name, stored);
                    if secret.get("visibility").and_then(Value::as_str) == Some("selected") {
                        secret["selected_repositories_url"] = json!(format!(
                            "https://api.github.com/orgs/{org}/actions/secrets/{name}/repositories"
                        ));
                    }
                    respond(StatusCode::OK, Some(secret), &state)
                }
                None => not_found(&state),
            }
        }
        (Method::PUT, ["orgs", org, "actions", "secrets", name]) => {
            let body: Value = serde_json::from_slice(&body).unwrap();
            if body.get("visibility").is_none() {
                return respond(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Some(json!({
                        "message": "Validation Failed",
                        "errors": [{ "resource": "Secret", "field": "visibility", "code": "missing_field" }]
                    })),
                    &state,
                );
            }
            if let Some(ids) = body.get("selected_repository_ids").and_then(Value::as_array) {
                let ids = ids.iter().filter_map(Value::as_i64).collect();
                state
                    .selected_repos
                    .insert(((*org).to_string(), (*name).to_string()), ids);
            }
            let created = state
                .org_secrets
                .entry((*org).to_string())
                .or_default()
                .insert((*name).to_string(), StoredSecret { body })
                .is_none();
            let status = if created {
                StatusCode::CREATED
            } else {
                StatusCode::NO_CONTENT
            };
            respond(status, created.then(|| json!({})), &state)
        }
        (Method::DELETE, ["orgs", org, "actions", "secrets", name]) => {
            let removed = state
                .org_secrets
                .get_mut(*org)
                .and_then(|secrets| secrets.remove(*name));
            state
                .selected_repos
                .remove(&((*org).to_string(), (*name).to_string()));
            match removed {
                Some(_) => respond(StatusCode::NO_CONTENT, None, &state),
                None => not_found(&state),
            }
        }

        (Method::GET, ["orgs", org, "actions", "secrets", name, "repositories"]) => {
            let key = ((*org).to_string(), (*name).to_string());
            let repositories: Vec<Value> = state
                .selected_repos
                .get(&key)
                .map(|ids| {
                    ids.iter()
                        .map(|id| {
                            json!({
                                "id": id,
                                "name": format!("repo-{id}"),
                                "full_name": format!("{org}/repo-{id}"),
                                "owner": { "login": org },
                                "private": true
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            respond(
                StatusCode::OK,
                Some(json!({ "total_count": repositories.len(), "repositories": repositories })),
                &state,
            )
        }
        (Method::PUT, ["orgs", org, "actions", "secrets", name, "repositories"]) => {
            let body: Value = serde_json::from_slice(&body).unwrap();
            let Some(ids) = body.get("selected_repository_ids").and_then(Value::as_array) else {
                return respond(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Some(json!({ "message": "selected_repository_ids is required" })),
                    &state,
                );
            };
            let ids = ids.iter().filter_map(Value::as_i64).collect();
            state
                .selected_repos
                .insert(((*org).to_string(), (*name).to_string()), ids);
            respond(StatusCode::NO_CONTENT, None, &state)
        }
        (Method::PUT, ["orgs", org, "actions", "secrets", name, "repositories", id]) => {
            let id: i64 = id.parse().unwrap();
            state
                .selected_repos
                .entry(((*org).to_string(), (*name).to_string()))
                .or_default()
                .insert(id);
            respond(StatusCode::NO_CONTENT, None, &state)
        }
        (Method::DELETE, ["orgs", org, "actions", "secrets", name, "repositories", id]) => {
            let id: i64 = id.parse().unwrap();
            let removed = state
                .selected_repos
                .get_mut(&((*org).to_string(), (*name).to_string()))
                .is_some_and(|ids| ids.remove(&id));
            if removed {
                respond(StatusCode::NO_CONTENT, None, &state)
            } else {
                respond(
                    StatusCode::CONFLICT,
                    Some(json!({ "message": "Repository is not selected for this secret" })),
                    &state,
                )
            }
        }

        _ => not_found(&state),
    }
}
