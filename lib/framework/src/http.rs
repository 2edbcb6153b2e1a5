use std::collections::HashMap;
use std::time::Duration;

pub use http::HeaderName;
pub use http::header;
use reqwest::Method;
use reqwest::Request;
use reqwest::Url;
use tracing::Instrument;
use tracing::debug;
use tracing::debug_span;

use crate::exception::CoreRsResult;

pub struct HttpClient {
    client: reqwest::Client,
}

pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<HeaderName, String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: String) -> Self {
        HttpRequest {
            method,
            url,
            headers: HashMap::new(),
        }
    }

    pub fn header(&mut self, name: HeaderName, value: impl Into<String>) {
        self.headers.insert(name, value.into());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    DELETE,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::DELETE => "DELETE",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::DELETE => Method::DELETE,
        }
    }
}

pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<HeaderName, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        self.headers.get(&name).map(String::as_str)
    }
}

impl HttpClient {
    pub async fn execute(&self, request: HttpRequest) -> CoreRsResult<HttpResponse> {
        let span = debug_span!("http_client", url = request.url, method = request.method.as_str());
        async {
            let url = Url::parse(&request.url)?;
            let mut http_request = Request::new(request.method.into(), url);
            for (key, value) in request.headers {
                if key != header::AUTHORIZATION {
                    debug!("[header] {key}={value}");
                }
                http_request.headers_mut().insert(key, value.parse()?);
            }

            let response = self.client.execute(http_request).await?;
            let status = response.status().as_u16();
            debug!(status, "[response]");
            let mut headers = HashMap::new();
            for (key, value) in response.headers() {
                let value = value.to_str()?;
                debug!("[header] {key}={value}");
                headers.insert(key.to_owned(), value.to_owned());
            }

            let body = response.text().await?;
            if !body.is_empty() {
                debug!("[response] body={body}");
            }

            Ok(HttpResponse { status, headers, body })
        }
        .instrument(span)
        .await
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        HttpClient {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .pool_idle_timeout(Duration::from_secs(300))
                .connection_verbose(false)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}
