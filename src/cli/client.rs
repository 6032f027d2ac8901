use anyhow::{anyhow, Context};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use url::Url;

/// Thin HTTP client for the Jurnal Digital API envelope.
pub struct ApiClient {
    http: Client,
    base: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> anyhow::Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid API URL: {}", base_url))?;
        let http = Client::builder()
            .user_agent(concat!("jurnal-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .with_context(|| format!("invalid endpoint path: {}", path))
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> anyhow::Result<Value> {
        let request = self.request(Method::GET, path)?.query(query);
        Self::send(request).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        let request = self.request(Method::POST, path)?.json(body);
        Self::send(request).await
    }

    /// Raw status and body, for endpoints whose failure body is still useful.
    pub async fn get_raw(&self, path: &str) -> anyhow::Result<(u16, Value)> {
        let response = self.request(Method::GET, path)?.send().await?;
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    fn request(&self, method: Method, path: &str) -> anyhow::Result<RequestBuilder> {
        let mut request = self.http.request(method, self.endpoint(path)?);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request)
    }

    async fn send(request: RequestBuilder) -> anyhow::Result<Value> {
        let response = request.send().await.context("request failed")?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .with_context(|| format!("server returned {} with a non-JSON body", status))?;

        if status.is_success() && body["success"].as_bool().unwrap_or(false) {
            return Ok(body);
        }
        Err(anyhow!(describe_failure(status.as_u16(), &body)))
    }
}

/// `401 UNAUTHORIZED: Token tidak valid`, plus one line per field violation.
pub fn describe_failure(status: u16, body: &Value) -> String {
    let message = body["message"].as_str().unwrap_or("request failed");
    let mut out = match body["code"].as_str() {
        Some(code) => format!("{} {}: {}", status, code, message),
        None => format!("{}: {}", status, message),
    };
    if let Some(errors) = body["errors"].as_array() {
        for error in errors {
            out.push_str(&format!(
                "\n  {}: {}",
                error["field"].as_str().unwrap_or("?"),
                error["message"].as_str().unwrap_or("")
            ));
        }
    }
    out
}
