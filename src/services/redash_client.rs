use crate::constants::env::{REDASH_API_KEY, REDASH_BASE_URL};
use crate::constants::redash::{AUTH_SCHEME, DATA_SOURCES_PATH, QUERIES_PATH, USER_AGENT};
use crate::errors::RedashError;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Base URL and API key for one call. Never cached between calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub api_key: String,
}

impl Credentials {
    pub fn from_env() -> Result<Self, RedashError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, RedashError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(REDASH_BASE_URL).unwrap_or_default();
        let api_key = lookup(REDASH_API_KEY).unwrap_or_default();
        if base_url.is_empty() || api_key.is_empty() {
            return Err(RedashError::MissingCredentials);
        }
        Ok(Self { base_url, api_key })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDetail {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// Request body shared by create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDraft {
    pub name: String,
    pub query: String,
    pub data_source_id: i64,
}

#[derive(Debug, Deserialize)]
struct QueryListResponse {
    #[serde(default)]
    results: Vec<Query>,
}

/// Thin façade over the Redash REST API. One attempt per call.
#[derive(Debug, Clone)]
pub struct RedashClient {
    http: Client,
    credentials: Credentials,
}

impl RedashClient {
    pub fn new(http: Client, credentials: Credentials) -> Self {
        Self { http, credentials }
    }

    pub fn from_env(http: Client) -> Result<Self, RedashError> {
        Ok(Self::new(http, Credentials::from_env()?))
    }

    pub fn build_http_client() -> Result<Client, RedashError> {
        Ok(Client::builder().user_agent(USER_AGENT).build()?)
    }

    pub fn base_url(&self) -> &str {
        &self.credentials.base_url
    }

    pub async fn list_queries(&self) -> Result<Vec<Query>, RedashError> {
        let response = self
            .send(self.request(Method::GET, QUERIES_PATH), &[StatusCode::OK])
            .await?;
        let list: QueryListResponse = decode(response).await?;
        Ok(list.results)
    }

    pub async fn get_query(&self, id: i64) -> Result<QueryDetail, RedashError> {
        let response = self
            .send(
                self.request(Method::GET, &query_path(id)),
                &[StatusCode::OK],
            )
            .await?;
        decode(response).await
    }

    pub async fn create_query(&self, draft: &QueryDraft) -> Result<QueryDetail, RedashError> {
        let request = self.request(Method::POST, QUERIES_PATH).json(draft);
        let response = self
            .send(request, &[StatusCode::OK, StatusCode::CREATED])
            .await?;
        decode(response).await
    }

    /// Redash updates queries with POST on the query path, not PATCH or PUT.
    pub async fn update_query(
        &self,
        id: i64,
        draft: &QueryDraft,
    ) -> Result<QueryDetail, RedashError> {
        let request = self.request(Method::POST, &query_path(id)).json(draft);
        let response = self.send(request, &[StatusCode::OK]).await?;
        decode(response).await
    }

    pub async fn archive_query(&self, id: i64) -> Result<(), RedashError> {
        self.send(
            self.request(Method::DELETE, &query_path(id)),
            &[StatusCode::OK],
        )
        .await?;
        Ok(())
    }

    /// Returns `query_result` when the response carries that key, otherwise
    /// the whole decoded object.
    pub async fn execute_query(&self, id: i64) -> Result<ExecuteOutput, RedashError> {
        let request = self
            .request(Method::POST, &format!("{}/results", query_path(id)))
            .json(&serde_json::json!({}));
        let response = self.send(request, &[StatusCode::OK]).await?;
        let mut body: serde_json::Map<String, Value> = decode(response).await?;
        Ok(match body.remove("query_result") {
            Some(result) => ExecuteOutput {
                result,
                unwrapped: true,
            },
            None => ExecuteOutput {
                result: Value::Object(body),
                unwrapped: false,
            },
        })
    }

    pub async fn list_data_sources(&self) -> Result<Vec<DataSource>, RedashError> {
        let response = self
            .send(self.request(Method::GET, DATA_SOURCES_PATH), &[StatusCode::OK])
            .await?;
        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.credentials.base_url, path)
    }

    fn authorization(&self) -> String {
        format!("{} {}", AUTH_SCHEME, self.credentials.api_key)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(AUTHORIZATION, self.authorization())
    }

    async fn send(
        &self,
        request: RequestBuilder,
        accepted: &[StatusCode],
    ) -> Result<Response, RedashError> {
        let response = request.send().await?;
        let status = response.status();
        if !accepted.contains(&status) {
            return Err(RedashError::Remote { status });
        }
        Ok(response)
    }
}

/// Result of `execute_query`. `unwrapped` is false when the remote body had
/// no `query_result` key and was passed through as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecuteOutput {
    pub result: Value,
    pub unwrapped: bool,
}

fn query_path(id: i64) -> String {
    format!("{}/{}", QUERIES_PATH, id)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, RedashError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn client(base_url: &str) -> RedashClient {
        RedashClient::new(
            Client::new(),
            Credentials {
                base_url: base_url.to_string(),
                api_key: "secret".to_string(),
            },
        )
    }

    #[test]
    fn credentials_require_both_values() {
        let missing_key = Credentials::from_lookup(lookup(&[(REDASH_BASE_URL, "http://r")]));
        assert!(matches!(missing_key, Err(RedashError::MissingCredentials)));

        let empty_url = Credentials::from_lookup(lookup(&[
            (REDASH_BASE_URL, ""),
            (REDASH_API_KEY, "k"),
        ]));
        assert!(matches!(empty_url, Err(RedashError::MissingCredentials)));

        let ok = Credentials::from_lookup(lookup(&[
            (REDASH_BASE_URL, "http://r/"),
            (REDASH_API_KEY, "k"),
        ]))
        .expect("credentials");
        assert_eq!(ok.base_url, "http://r/");
        assert_eq!(ok.api_key, "k");
    }

    #[test]
    fn credentials_debug_hides_api_key() {
        let creds = Credentials {
            base_url: "http://r".to_string(),
            api_key: "topsecret".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("topsecret"));
        assert!(rendered.contains("http://r"));
    }

    #[test]
    fn url_concatenates_without_normalizing_slashes() {
        assert_eq!(
            client("http://redash.local/").url(&query_path(5)),
            "http://redash.local//api/queries/5"
        );
        assert_eq!(
            client("http://redash.local").url(DATA_SOURCES_PATH),
            "http://redash.local/api/data_sources"
        );
    }

    #[test]
    fn authorization_uses_key_scheme() {
        assert_eq!(client("http://r").authorization(), "Key secret");
    }

    #[test]
    fn query_detail_ignores_unknown_fields_and_defaults_missing_ones() {
        let detail: QueryDetail =
            serde_json::from_str(r#"{"id":3,"name":"n","is_archived":false}"#).expect("decode");
        assert_eq!(
            detail,
            QueryDetail {
                id: 3,
                name: "n".to_string(),
                query: String::new(),
            }
        );
    }

    #[test]
    fn data_source_kind_round_trips_as_type() {
        let source: DataSource =
            serde_json::from_str(r#"{"id":1,"name":"pg","type":"pg","syntax":"sql"}"#)
                .expect("decode");
        assert_eq!(source.kind, "pg");
        let encoded = serde_json::to_string(&source).expect("encode");
        assert_eq!(encoded, r#"{"id":1,"name":"pg","type":"pg"}"#);
    }

    #[test]
    fn draft_serializes_in_wire_order() {
        let draft = QueryDraft {
            name: "A".to_string(),
            query: "select 1".to_string(),
            data_source_id: 3,
        };
        assert_eq!(
            serde_json::to_string(&draft).expect("encode"),
            r#"{"name":"A","query":"select 1","data_source_id":3}"#
        );
    }
}
