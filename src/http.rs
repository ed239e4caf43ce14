//! Blocking JSON client shared by the provider implementations.

use crate::constants::USER_AGENT;
use crate::error::{Error, Result};
use log::debug;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// REST client bound to one API base URL and one set of credentials.
pub struct RestClient {
    client: Client,
    base_url: Url,
}

/// Status and raw body of a finished request.
#[derive(Debug)]
pub struct Reply {
    status: StatusCode,
    body: String,
}

impl Reply {
    pub fn is(&self, status: StatusCode) -> bool {
        self.status == status
    }

    /// Fails with `<message>, <status>` unless the reply has the expected status.
    pub fn expect(self, status: StatusCode, message: &str) -> Result<Self> {
        if self.status == status {
            Ok(self)
        } else {
            Err(Error::RemoteOperationError(format!("{message}, {}", self.status)))
        }
    }

    /// Fails with `<message>, <status>` unless the reply is a 2xx.
    pub fn success(self, message: &str) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(Error::RemoteOperationError(format!("{message}, {}", self.status)))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            Error::RemoteOperationError(format!("unexpected response body: {e}"))
        })
    }
}

impl RestClient {
    /// Creates a client that sends `header: value` with every request.
    pub fn new(base_url: &str, header: HeaderName, value: &str) -> Result<Self> {
        let mut credential = HeaderValue::from_str(value).map_err(|_| {
            Error::ProviderCredentialError(format!("invalid characters in {header} token"))
        })?;
        credential.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header, credential);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, base_url: Url::parse(base_url)? })
    }

    /// Requests below the base URL take their path as segments; each segment
    /// is percent-encoded, so `group/project` stays a single segment.
    pub fn get(&self, segments: &[&str]) -> Result<Reply> {
        self.send(self.client.get(self.url(segments)?))
    }

    pub fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<Reply> {
        self.send(self.client.post(self.url(segments)?).json(body))
    }

    pub fn put<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<Reply> {
        self.send(self.client.put(self.url(segments)?).json(body))
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::RemoteOperationError(format!("invalid API base url {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder) -> Result<Reply> {
        let response = request.send()?;
        let status = response.status();
        debug!("{} {}", status, response.url());
        let body = response.text()?;
        Ok(Reply { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use reqwest::header::AUTHORIZATION;

    fn client(base_url: &str) -> RestClient {
        RestClient::new(base_url, AUTHORIZATION, "token").unwrap()
    }

    #[test]
    fn test_url_encodes_segments() {
        let url = client("https://gitlab.com/api/v4")
            .url(&["projects", "group/my project", "badges"])
            .unwrap();
        assert_eq!(url.as_str(), "https://gitlab.com/api/v4/projects/group%2Fmy%20project/badges");
    }

    #[test]
    fn test_url_keeps_plus_and_trailing_slash() {
        let url = client("https://api.github.com/").url(&["repos", "org", "a+b"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/org/a+b");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = RestClient::new("not a url", AUTHORIZATION, "token");
        assert!(matches!(result, Err(Error::UrlError(_))));
    }

    #[test]
    fn test_reply_expect() {
        let reply = Reply { status: StatusCode::CREATED, body: "{}".to_string() };
        assert!(reply.expect(StatusCode::CREATED, "failed").is_ok());

        let reply = Reply { status: StatusCode::UNPROCESSABLE_ENTITY, body: String::new() };
        let err = reply.expect(StatusCode::CREATED, "failed to create repository x").unwrap_err();
        assert_eq!(err.to_string(), "failed to create repository x, 422 Unprocessable Entity");
    }

    #[test]
    fn test_reply_json() {
        let reply = Reply { status: StatusCode::OK, body: r#"{"login":"someone"}"#.to_string() };
        let value: serde_json::Value = reply.json().unwrap();
        assert_eq!(value["login"], "someone");

        let reply = Reply { status: StatusCode::OK, body: "not json".to_string() };
        assert!(reply.json::<serde_json::Value>().is_err());
    }
}
