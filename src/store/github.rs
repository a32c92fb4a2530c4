//! GitHub Contents API backend.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{ContentStore, StoredFile};
use crate::config::GithubConfig;
use crate::error::{Error, Result};

const ACCEPT_GITHUB_JSON: &str = "application/vnd.github+json";

pub struct GithubStore {
    http: Client,
    api_url: String,
    owner: String,
    repo: String,
    branch: String,
}

#[derive(Deserialize)]
struct ContentResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

#[derive(Serialize)]
struct WriteRequest<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    branch: &'a str,
}

#[derive(Deserialize)]
struct WriteResponse {
    content: WrittenContent,
}

#[derive(Deserialize)]
struct WrittenContent {
    sha: String,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: String,
}

impl GithubStore {
    pub fn new(config: &GithubConfig, owner: String, repo: String, token: String) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("token {token}"))
            .map_err(|_| Error::MissingCredentials("token contains invalid characters".to_string()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GITHUB_JSON));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("eventops/", env!("CARGO_PKG_VERSION"))),
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner,
            repo,
            branch: config.branch.clone(),
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }
}

impl ContentStore for GithubStore {
    fn read(&self, path: &str) -> Result<Option<StoredFile>> {
        let resp = self
            .http
            .get(self.contents_url(path))
            .query(&[("ref", self.branch.as_str())])
            .send()?;

        if resp.status() == StatusCode::NOT_FOUND {
            tracing::debug!(path, "file not found on github");
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(api_error(resp));
        }

        let body: ContentResponse = resp.json()?;
        let text = decode_content(&body.content, &body.encoding)?;
        tracing::debug!(path, sha = %body.sha, "read file from github");
        Ok(Some(StoredFile {
            text,
            sha: body.sha,
        }))
    }

    fn write(&self, path: &str, text: &str, sha: Option<&str>, message: &str) -> Result<String> {
        let request = WriteRequest {
            message,
            content: STANDARD.encode(text.as_bytes()),
            sha,
            branch: &self.branch,
        };

        let resp = self.http.put(self.contents_url(path)).json(&request).send()?;
        let status = resp.status();
        if status == StatusCode::CONFLICT || status == StatusCode::UNPROCESSABLE_ENTITY {
            tracing::warn!(path, status = status.as_u16(), "github rejected stale write");
            return Err(Error::RevisionConflict(path.to_string()));
        }
        if !status.is_success() {
            return Err(api_error(resp));
        }

        let body: WriteResponse = resp.json()?;
        tracing::info!(path, sha = %body.content.sha, message, "wrote file to github");
        Ok(body.content.sha)
    }

    fn describe(&self) -> String {
        format!("github:{}/{}@{}", self.owner, self.repo, self.branch)
    }
}

fn api_error(resp: Response) -> Error {
    let status = resp.status();
    let message = resp
        .text()
        .ok()
        .and_then(|body| serde_json::from_str::<ApiMessage>(&body).ok())
        .map(|body| body.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    Error::Api {
        status: status.as_u16(),
        message,
    }
}

/// Decode the `content` field of a contents response.
///
/// GitHub wraps the base64 payload at 60 columns, so whitespace is dropped
/// before decoding.
fn decode_content(content: &str, encoding: &str) -> Result<String> {
    if encoding != "base64" {
        return Err(Error::Decode(format!(
            "unsupported content encoding '{encoding}' (file too large for the contents API?)"
        )));
    }
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|err| Error::Decode(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| Error::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(api_url: &str) -> GithubStore {
        let config = GithubConfig {
            api_url: api_url.to_string(),
            ..GithubConfig::default()
        };
        GithubStore::new(&config, "acme".into(), "ops".into(), "tok".into()).unwrap()
    }

    #[test]
    fn contents_url_joins_path() {
        let store = store("https://api.github.com/");
        assert_eq!(
            store.contents_url("data/events.csv"),
            "https://api.github.com/repos/acme/ops/contents/data/events.csv"
        );
        assert_eq!(store.describe(), "github:acme/ops@main");
    }

    #[test]
    fn decode_strips_line_wrapping() {
        let encoded = STANDARD.encode("event_id,event_name\n1,Cup\n");
        let (head, tail) = encoded.split_at(10);
        let wrapped = format!("{head}\n{tail}\n");
        assert_eq!(
            decode_content(&wrapped, "base64").unwrap(),
            "event_id,event_name\n1,Cup\n"
        );
    }

    #[test]
    fn decode_rejects_other_encodings() {
        assert!(matches!(
            decode_content("", "none"),
            Err(Error::Decode(_))
        ));
        assert!(matches!(
            decode_content("!!!", "base64"),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn write_request_omits_sha_when_creating() {
        let create = WriteRequest {
            message: "Create events.csv",
            content: STANDARD.encode("x"),
            sha: None,
            branch: "main",
        };
        let value = serde_json::to_value(&create).unwrap();
        assert!(value.get("sha").is_none());
        assert_eq!(value["branch"], "main");

        let update = WriteRequest {
            sha: Some("abc"),
            ..create
        };
        assert_eq!(serde_json::to_value(&update).unwrap()["sha"], "abc");
    }

    #[test]
    fn responses_deserialize() {
        let read: ContentResponse = serde_json::from_str(
            r#"{"sha":"abc","content":"aWQK\n","encoding":"base64","name":"events.csv"}"#,
        )
        .unwrap();
        assert_eq!(read.sha, "abc");
        assert_eq!(decode_content(&read.content, &read.encoding).unwrap(), "id\n");

        let written: WriteResponse =
            serde_json::from_str(r#"{"content":{"sha":"def","path":"x"},"commit":{}}"#).unwrap();
        assert_eq!(written.content.sha, "def");
    }
}
