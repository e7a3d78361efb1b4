//! GitHub REST API client
//!
//! Blocking `ureq` calls against the v3 REST API. Pagination follows the
//! `Link: <...>; rel="next"` response header until it disappears.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};
use ureq::http::Response;
use ureq::{Agent, Body};

use crate::config::Settings;
use crate::domain::AccessToken;
use crate::infrastructure::traits::RepositoryHost;
use crate::infrastructure::{InfraError, InfraResult};

const USER_AGENT: &str = concat!("weave-lease/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

#[derive(Deserialize)]
struct RepoSummary {
    name: String,
}

#[derive(Deserialize)]
struct RepoMeta {
    default_branch: Option<String>,
}

/// GitHub implementation of [`RepositoryHost`].
pub struct GitHubClient {
    agent: Agent,
    api_url: String,
    page_size: u32,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, page_size: u32) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self {
            agent: Agent::new_with_defaults(),
            api_url,
            page_size: page_size.clamp(1, 100),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_url.clone(), settings.page_size)
    }

    fn get(
        &self,
        token: &AccessToken,
        url: &str,
        query: &[(&str, &str)],
    ) -> InfraResult<Response<Body>> {
        debug!("GET {}", url);
        let mut request = self
            .agent
            .get(url)
            .header("Authorization", format!("Bearer {}", token.secret()))
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT);
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        request.call().map_err(|e| http_error(url, e))
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        url: &str,
        response: &mut Response<Body>,
    ) -> InfraResult<T> {
        response
            .body_mut()
            .read_json()
            .map_err(|e| InfraError::Decode {
                message: format!("{url}: {e}"),
            })
    }
}

impl RepositoryHost for GitHubClient {
    #[instrument(skip(self, token))]
    fn list_repositories(&self, token: &AccessToken, org: &str) -> InfraResult<Vec<String>> {
        let page_size = self.page_size.to_string();
        let mut url = format!("{}/orgs/{}/repos", self.api_url, org);
        let mut query = vec![("type", "all"), ("per_page", page_size.as_str())];
        let mut names = Vec::new();

        loop {
            let mut response = self.get(token, &url, &query)?;
            let next = response
                .headers()
                .get("link")
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);
            let page: Vec<RepoSummary> = Self::read_json(&url, &mut response)?;
            debug!("list_repositories: page with {} repos", page.len());
            names.extend(page.into_iter().map(|r| r.name));

            match next {
                Some(next) => {
                    // next links already carry the query string
                    url = next;
                    query.clear();
                }
                None => break,
            }
        }

        Ok(names)
    }

    #[instrument(skip(self, token))]
    fn default_branch(
        &self,
        token: &AccessToken,
        org: &str,
        repo: &str,
    ) -> InfraResult<Option<String>> {
        let url = format!("{}/repos/{}/{}", self.api_url, org, repo);
        let mut response = self.get(token, &url, &[])?;
        let meta: RepoMeta = Self::read_json(&url, &mut response)?;
        Ok(meta.default_branch.filter(|b| !b.is_empty()))
    }

    #[instrument(skip(self, token))]
    fn file_contents(
        &self,
        token: &AccessToken,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> InfraResult<Option<String>> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            org,
            repo,
            path.trim_start_matches('/')
        );
        let mut response = self.get(token, &url, &[("ref", git_ref)])?;
        let body: Value = Self::read_json(&url, &mut response)?;
        decode_content(&body)
    }
}

fn http_error(url: &str, e: ureq::Error) -> InfraError {
    match e {
        ureq::Error::StatusCode(code) => InfraError::Http {
            message: format!("GET {url}: HTTP {code}"),
            status: Some(code),
        },
        other => InfraError::Http {
            message: format!("GET {url}: {other}"),
            status: None,
        },
    }
}

/// Extract the `rel="next"` target from a `Link` header.
pub fn next_page_url(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|s| {
            let s = s.trim();
            s == r#"rel="next""# || s == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// Decode the base64 `content` field of a contents API response.
///
/// GitHub wraps the payload at 60 columns, so whitespace is stripped first.
pub fn decode_content(body: &Value) -> InfraResult<Option<String>> {
    let Some(encoded) = body.get("content").and_then(Value::as_str) else {
        return Ok(None);
    };
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| InfraError::Decode {
            message: format!("base64 content: {e}"),
        })?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}
