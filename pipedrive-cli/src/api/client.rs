//! Pipedrive HTTP client
//!
//! Builds request URLs per API version, attaches the API token, decodes
//! responses and follows pagination. Every call is awaited to completion; the
//! client holds no mutable state and is cheap to clone.

use futures::StreamExt;
use futures::stream::{self, Stream};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::error::ApiError;
use super::pagination::NextPage;
use super::response::{ApiResponse, Params};
use super::transport::{FilePart, HttpRequest, Method, ReqwestTransport, Transport};
use super::version::ApiVersion;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::orm::RecordId;

pub const DEFAULT_BASE_URL: &str = "https://api.pipedrive.com/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A request against a resource uri, relative to the version prefix
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub version: ApiVersion,
    pub uri: String,
    pub params: Params,
    pub json: Option<Value>,
    pub form: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl ApiRequest {
    pub fn new(method: Method, version: ApiVersion, uri: impl Into<String>) -> Self {
        Self {
            method,
            version,
            uri: uri.into(),
            params: Params::new(),
            json: None,
            form: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    pub fn form_field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.form.push((key.into(), value.to_string()));
        self
    }

    pub fn file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }
}

/// Client for the Pipedrive REST API
#[derive(Clone)]
pub struct PipedriveClient {
    transport: Arc<dyn Transport>,
    api_token: String,
    base_url: String,
    pinned: Option<ApiVersion>,
}

impl fmt::Debug for PipedriveClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipedriveClient")
            .field("base_url", &self.base_url)
            .field("pinned", &self.pinned)
            .field("api_token", &"***")
            .finish()
    }
}

impl PipedriveClient {
    /// Client talking to the public API over reqwest
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        let transport = ReqwestTransport::new(DEFAULT_TIMEOUT)?;
        Self::with_transport(Arc::new(transport), api_token)
    }

    /// Client built from loaded configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = config
            .api_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config("no API token configured".to_string()))?;
        let transport = ReqwestTransport::new(config.timeout())?;

        let mut client = Self::with_transport(Arc::new(transport), token)?
            .with_base_url(config.base_url());
        client.pinned = config.default_version;
        Ok(client)
    }

    pub fn with_transport(transport: Arc<dyn Transport>, api_token: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::Config("API token must not be empty".to_string()));
        }
        Ok(Self {
            transport,
            api_token,
            base_url: DEFAULT_BASE_URL.to_string(),
            pinned: None,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Copy of this client that routes every ORM operation to `version`
    pub fn pinned(&self, version: ApiVersion) -> Self {
        Self {
            pinned: Some(version),
            ..self.clone()
        }
    }

    pub fn pinned_version(&self) -> Option<ApiVersion> {
        self.pinned
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `https://api.pipedrive.com/api/v2/`
    pub fn endpoint_url(&self, version: ApiVersion) -> String {
        format!("{}{}/", self.base_url, version.path())
    }

    pub fn build_url(&self, version: ApiVersion, uri: &str) -> String {
        format!("{}{}", self.endpoint_url(version), uri.trim_start_matches('/'))
    }

    fn http_request(&self, request: ApiRequest) -> HttpRequest {
        let mut query = vec![("api_token".to_string(), self.api_token.clone())];
        query.extend(request.params.iter().map(|(k, v)| (k.clone(), v.clone())));

        HttpRequest {
            method: request.method,
            url: self.build_url(request.version, &request.uri),
            query,
            json: request.json,
            form: request.form,
            files: request.files,
        }
    }

    /// Send a request and decode the normalized response
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let version = request.version;
        let (method, uri) = (request.method, request.uri.clone());

        let response = self.transport.send(self.http_request(request)).await?;
        log::info!("{}:{} {}", method, response.status, uri);

        if !response.is_success() {
            let payload = serde_json::from_slice::<Value>(&response.body).unwrap_or(Value::Null);
            return Err(ApiError::from_response(response.status, version, &payload).into());
        }

        // A 2xx body can still report `success: false`
        let decoded = ApiResponse::from_body(&response.body);
        if !decoded.is_success() {
            let payload = serde_json::from_slice::<Value>(&response.body).unwrap_or(Value::Null);
            return Err(ApiError::from_response(response.status, version, &payload).into());
        }
        Ok(decoded)
    }

    /// Send a request and return the raw body (file downloads)
    pub async fn send_raw(&self, request: ApiRequest) -> Result<Vec<u8>> {
        let version = request.version;
        let (method, uri) = (request.method, request.uri.clone());

        let response = self.transport.send(self.http_request(request)).await?;
        log::info!("{}:{} {}", method, response.status, uri);

        if !response.is_success() {
            let payload = serde_json::from_slice::<Value>(&response.body).unwrap_or(Value::Null);
            return Err(ApiError::from_response(response.status, version, &payload).into());
        }
        Ok(response.body)
    }

    pub async fn get(&self, version: ApiVersion, uri: &str, params: &Params) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::Get, version, uri).params(params.clone()))
            .await
    }

    pub async fn post(&self, version: ApiVersion, uri: &str, json: Value) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::Post, version, uri).json(json))
            .await
    }

    pub async fn put(&self, version: ApiVersion, uri: &str, json: Value) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::Put, version, uri).json(json))
            .await
    }

    pub async fn patch(&self, version: ApiVersion, uri: &str, json: Value) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::Patch, version, uri).json(json))
            .await
    }

    pub async fn delete(&self, version: ApiVersion, uri: &str, params: &Params) -> Result<ApiResponse> {
        self.send(ApiRequest::new(Method::Delete, version, uri).params(params.clone()))
            .await
    }

    /// `DELETE {uri}?ids=1,2,3`
    pub async fn batch_delete(&self, version: ApiVersion, uri: &str, ids: &[RecordId]) -> Result<ApiResponse> {
        if ids.is_empty() {
            return Err(Error::InvalidArgument("batch delete needs at least one id".to_string()));
        }
        let ids = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        self.delete(version, uri, &Params::new().with("ids", ids)).await
    }

    pub async fn download(&self, version: ApiVersion, uri: &str) -> Result<Vec<u8>> {
        self.send_raw(ApiRequest::new(Method::Get, version, uri)).await
    }

    /// Successive pages of a list endpoint, following cursor or offset
    /// pagination until the server reports no more items
    pub fn pages<'a>(
        &'a self,
        version: ApiVersion,
        uri: &'a str,
        params: Params,
    ) -> impl Stream<Item = Result<ApiResponse>> + 'a {
        stream::unfold(Some(params), move |state| async move {
            let mut params = state?;
            match self.get(version, uri, &params).await {
                Err(err) => Some((Err(err), None)),
                Ok(page) => {
                    let next = NextPage::from_response(&page, &params);
                    let state = next.apply(&mut params).then_some(params);
                    Some((Ok(page), state))
                }
            }
        })
    }

    /// Every page of a list endpoint, `data` and `related_objects` concatenated
    pub async fn all(&self, version: ApiVersion, uri: &str, params: Params) -> Result<ApiResponse> {
        let mut data = Vec::new();
        let mut related = Vec::new();
        let mut page_count = 0usize;

        let mut pages = Box::pin(self.pages(version, uri, params));
        while let Some(page) = pages.next().await {
            let page = page?;
            page_count += 1;
            extend_items(&mut data, page.data);
            extend_items(&mut related, page.related_objects);
        }
        log::debug!("{} pages, {} items from {}", page_count, data.len(), uri);

        Ok(ApiResponse {
            success: Some(true),
            data: Some(Value::Array(data)),
            additional_data: None,
            related_objects: (!related.is_empty()).then_some(Value::Array(related)),
        })
    }
}

fn extend_items(items: &mut Vec<Value>, value: Option<Value>) {
    match value {
        None | Some(Value::Null) => {}
        Some(Value::Array(values)) => items.extend(values),
        Some(Value::Object(map)) if map.is_empty() => {}
        Some(other) => items.push(other),
    }
}
