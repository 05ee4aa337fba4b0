//! HTTP execution of built queries.
//!
//! [`SodaClient`] sends GET requests through a [`Transport`]. The default
//! transport is [`HttpTransport`] on top of `reqwest`; tests swap in an
//! in-memory one.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SodaConfig;
use crate::error::{SodaError, SodaResult};
use crate::query::SodaQuery;

/// Credentials sent with every request.
///
/// Docs: <https://dev.socrata.com/docs/authentication.html>
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthOptions {
    /// Application token, raises throttling limits.
    pub app_token: Option<String>,
    /// Basic auth user. Needs `password`.
    pub username: Option<String>,
    /// Basic auth password. Needs `username`.
    pub password: Option<String>,
    /// OAuth 2.0 access token. Takes precedence over Basic auth.
    pub access_token: Option<String>,
}

impl AuthOptions {
    /// Request headers for these credentials.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];

        if let Some(token) = &self.app_token {
            headers.push(("X-App-Token".to_string(), token.clone()));
        }

        let authorization = match (&self.access_token, &self.username, &self.password) {
            (Some(token), _, _) => Some(format!("OAuth {}", token)),
            (None, Some(user), Some(pass)) => {
                Some(format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass))))
            }
            _ => None,
        };
        if let Some(value) = authorization {
            headers.push(("Authorization".to_string(), value));
        }

        headers
    }
}

/// A response as seen by the client, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Performs GET requests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> SodaResult<RawResponse>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> SodaResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, headers: &[(String, String)]) -> SodaResult<RawResponse> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Dataset headers of interest from the last response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    pub raw: Vec<(String, String)>,
    pub last_modified: Option<String>,
    pub etag: Option<String>,
    /// `X-SODA2-Fields`, a JSON array of field names.
    pub fields: Option<String>,
    /// `X-SODA2-Types`, a JSON array of field types.
    pub types: Option<String>,
    pub out_of_date: Option<String>,
}

impl ResponseHeaders {
    pub fn from_raw(raw: Vec<(String, String)>) -> Self {
        let find = |name: &str| {
            raw.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
        };
        Self {
            last_modified: find("Last-Modified"),
            etag: find("ETag"),
            fields: find("X-SODA2-Fields"),
            types: find("X-SODA2-Types"),
            out_of_date: find("X-SODA2-Data-Out-Of-Date"),
            raw,
        }
    }
}

/// A decoded successful response.
#[derive(Debug, Clone)]
pub struct DataResponse<T> {
    pub status: u16,
    pub headers: ResponseHeaders,
    pub data: T,
}

/// Error body returned by the API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    message: Option<String>,
    error_code: Option<String>,
}

/// Executes [`SodaQuery`] requests.
#[derive(Clone)]
pub struct SodaClient {
    transport: Arc<dyn Transport>,
    auth: AuthOptions,
}

impl SodaClient {
    /// HTTP client with the given credentials and timeout.
    pub fn new(auth: AuthOptions, timeout: Duration) -> SodaResult<Self> {
        Ok(Self::with_transport(HttpTransport::new(timeout)?, auth))
    }

    pub fn from_config(config: &SodaConfig) -> SodaResult<Self> {
        Self::new(config.auth.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn with_transport(transport: impl Transport + 'static, auth: AuthOptions) -> Self {
        Self {
            transport: Arc::new(transport),
            auth,
        }
    }

    pub fn auth(&self) -> &AuthOptions {
        &self.auth
    }

    /// Fetch rows for the current clauses, or for a prepared query.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &SodaQuery,
        query_id: Option<&str>,
    ) -> SodaResult<DataResponse<Vec<T>>> {
        let url = query.url(query_id)?;
        self.request(&url).await
    }

    /// Fetch rows as a GeoJSON feature collection.
    pub async fn execute_geojson(
        &self,
        query: &SodaQuery,
        query_id: Option<&str>,
    ) -> SodaResult<DataResponse<serde_json::Value>> {
        let url = query.url(query_id)?.replacen(".json", ".geojson", 1);
        self.request(&url).await
    }

    /// Dataset metadata from the views API.
    pub async fn metadata(&self, query: &SodaQuery) -> SodaResult<DataResponse<serde_json::Value>> {
        let url = query.metadata_url()?;
        self.request(&url).await
    }

    async fn request<T: DeserializeOwned>(&self, url: &str) -> SodaResult<DataResponse<T>> {
        debug!(url, "GET");
        let raw = self.transport.get(url, &self.auth.headers()).await?;

        if !(200..300).contains(&raw.status) {
            let body: ApiErrorBody = serde_json::from_str(&raw.body).unwrap_or_default();
            warn!(status = raw.status, url, error_code = ?body.error_code, "request failed");
            return Err(SodaError::Api {
                status: raw.status,
                message: body.message.unwrap_or_default(),
                error_code: body.error_code,
                url: url.to_string(),
            });
        }

        let data = serde_json::from_str(&raw.body)?;
        Ok(DataResponse {
            status: raw.status,
            headers: ResponseHeaders::from_raw(raw.headers),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    type Request = (String, Vec<(String, String)>);

    /// Replies with a canned response and records each request.
    struct MockTransport {
        response: RawResponse,
        requests: Arc<Mutex<Vec<Request>>>,
    }

    impl MockTransport {
        fn new(status: u16, body: serde_json::Value) -> (Self, Arc<Mutex<Vec<Request>>>) {
            Self::with_headers(status, body, vec![])
        }

        fn with_headers(
            status: u16,
            body: serde_json::Value,
            headers: Vec<(&str, &str)>,
        ) -> (Self, Arc<Mutex<Vec<Request>>>) {
            let requests = Arc::new(Mutex::new(Vec::new()));
            let transport = Self {
                response: RawResponse {
                    status,
                    headers: headers
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                    body: body.to_string(),
                },
                requests: Arc::clone(&requests),
            };
            (transport, requests)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn get(&self, url: &str, headers: &[(String, String)]) -> SodaResult<RawResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), headers.to_vec()));
            Ok(self.response.clone())
        }
    }

    fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
        request
            .1
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn sample() -> SodaQuery {
        SodaQuery::for_dataset("test.example.com", "test")
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        test: i64,
    }

    #[test]
    fn test_default_headers() {
        let headers = AuthOptions::default().headers();
        assert_eq!(
            headers,
            vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        );
    }

    #[test]
    fn test_auth_headers() {
        let basic = AuthOptions {
            username: Some("test".into()),
            password: Some("test".into()),
            ..Default::default()
        };
        assert!(basic
            .headers()
            .contains(&("Authorization".to_string(), "Basic dGVzdDp0ZXN0".to_string())));

        let user_only = AuthOptions {
            username: Some("test".into()),
            ..Default::default()
        };
        assert!(!user_only.headers().iter().any(|(k, _)| k == "Authorization"));

        let oauth = AuthOptions {
            access_token: Some("tok".into()),
            ..basic
        };
        let authorization: Vec<_> = oauth
            .headers()
            .into_iter()
            .filter(|(k, _)| k == "Authorization")
            .collect();
        assert_eq!(authorization, vec![("Authorization".to_string(), "OAuth tok".to_string())]);
    }

    #[tokio::test]
    async fn test_execute() {
        let (transport, requests) = MockTransport::with_headers(
            200,
            json!([{ "test": 1 }]),
            vec![("Last-Modified", "Mon, 01 Jan 2001 00:00:00 GMT"), ("etag", "test")],
        );
        let client = SodaClient::with_transport(transport, AuthOptions::default());

        let response = client.execute::<Row>(&sample(), None).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.data[0].test, 1);
        assert_eq!(
            response.headers.last_modified.as_deref(),
            Some("Mon, 01 Jan 2001 00:00:00 GMT")
        );
        assert_eq!(response.headers.etag.as_deref(), Some("test"));
        assert_eq!(response.headers.fields, None);

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].0, "https://test.example.com/resource/test.json");
        assert_eq!(header(&requests[0], "Accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_execute_with_tokens() {
        let (transport, requests) = MockTransport::new(200, json!([{ "test": 1 }]));
        let auth = AuthOptions {
            app_token: Some("app".into()),
            access_token: Some("test".into()),
            ..Default::default()
        };
        let client = SodaClient::with_transport(transport, auth);
        client.execute::<Row>(&sample(), None).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(header(&requests[0], "X-App-Token"), Some("app"));
        assert_eq!(header(&requests[0], "Authorization"), Some("OAuth test"));
    }

    #[tokio::test]
    async fn test_api_error() {
        let (transport, _) = MockTransport::new(
            400,
            json!({ "message": "bad query", "errorCode": "query.soql.no-such-column" }),
        );
        let client = SodaClient::with_transport(transport, AuthOptions::default());

        let err = client.execute::<Row>(&sample(), None).await.unwrap_err();
        match err {
            SodaError::Api {
                status,
                message,
                error_code,
                url,
            } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad query");
                assert_eq!(error_code.as_deref(), Some("query.soql.no-such-column"));
                assert_eq!(url, "https://test.example.com/resource/test.json");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_api_error_without_body() {
        let (transport, _) = MockTransport::new(500, json!({}));
        let client = SodaClient::with_transport(transport, AuthOptions::default());
        let err = client.execute::<Row>(&sample(), None).await.unwrap_err();
        assert!(matches!(err, SodaError::Api { status: 500, error_code: None, .. }));
    }

    #[tokio::test]
    async fn test_geojson_and_metadata() {
        let (transport, requests) =
            MockTransport::new(200, json!({ "type": "FeatureCollection", "features": [] }));
        let client = SodaClient::with_transport(transport, AuthOptions::default());

        let geojson = client.execute_geojson(&sample(), None).await.unwrap();
        assert_eq!(geojson.data["type"], "FeatureCollection");
        client.metadata(&sample()).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].0, "https://test.example.com/resource/test.geojson");
        assert_eq!(requests[1].0, "https://test.example.com/api/views/test");
    }

    #[tokio::test]
    async fn test_missing_dataset_fails_before_request() {
        let (transport, requests) = MockTransport::new(200, json!([]));
        let client = SodaClient::with_transport(transport, AuthOptions::default());
        let query = SodaQuery::new("test.example.com");

        let err = client.execute::<Row>(&query, None).await.unwrap_err();
        assert!(matches!(err, SodaError::MissingDataset));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_response_headers() {
        let headers = ResponseHeaders::from_raw(vec![
            ("x-soda2-fields".into(), "[\"a\"]".into()),
            ("X-SODA2-Types".into(), "[\"text\"]".into()),
            ("X-SODA2-Data-Out-Of-Date".into(), "false".into()),
        ]);
        assert_eq!(headers.fields.as_deref(), Some("[\"a\"]"));
        assert_eq!(headers.types.as_deref(), Some("[\"text\"]"));
        assert_eq!(headers.out_of_date.as_deref(), Some("false"));
        assert_eq!(headers.raw.len(), 3);
    }
}
