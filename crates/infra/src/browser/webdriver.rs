//! W3C WebDriver client
//!
//! Speaks the WebDriver wire protocol to a local driver process such as
//! chromedriver. One [`WebDriverSession`] owns one browser session.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use shiftsync_core::{BrowserSession, ElementHandle, ElementState};
use shiftsync_domain::{Locator, Result, ShiftSyncError, WebDriverConfig};
use tracing::{debug, info, warn};
use url::Url;

use crate::errors::InfraError;
use crate::http::HttpClient;

/// Key under which W3C drivers return element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

const CLICK_SCRIPT: &str = "arguments[0].click();";

/// Chrome arguments for an unattended run.
pub fn launch_args(config: &WebDriverConfig) -> Vec<String> {
    let mut args = Vec::new();
    if config.headless {
        args.push("--headless".to_string());
    }
    args.extend(["--no-sandbox", "--disable-dev-shm-usage", "--disable-gpu"].map(String::from));
    args.push(format!("--window-size={}", config.window_size));
    args.extend(config.browser_args.iter().cloned());
    args
}

/// Decoded reply to one WebDriver command.
struct Reply {
    status: StatusCode,
    value: Value,
}

impl Reply {
    /// W3C error code such as `"no such element"`, for failed commands.
    fn error_code(&self) -> Option<&str> {
        if self.status.is_success() {
            return None;
        }
        self.value.get("error").and_then(Value::as_str)
    }

    fn into_value(self, command: &str) -> Result<Value> {
        if self.status.is_success() {
            return Ok(self.value);
        }
        let code = self.value.get("error").and_then(Value::as_str).unwrap_or("unknown error");
        let message = self.value.get("message").and_then(Value::as_str).unwrap_or_default();
        let first_line = message.lines().next().unwrap_or_default();
        Err(ShiftSyncError::document(format!(
            "WebDriver {command} failed ({}): {code}: {first_line}",
            self.status.as_u16()
        )))
    }
}

pub struct WebDriverSession {
    http: HttpClient,
    session: Url,
    session_id: String,
}

impl WebDriverSession {
    /// Start a browser session on the configured driver endpoint.
    ///
    /// # Errors
    /// `Config` for an unparseable endpoint, `Transport` when the driver is
    /// unreachable, `Document` when it refuses to create the session.
    pub async fn connect(config: &WebDriverConfig) -> Result<Self> {
        let http = HttpClient::builder().timeout(COMMAND_TIMEOUT).max_attempts(1).build()?;
        Self::start(http, config).await
    }

    pub async fn start(http: HttpClient, config: &WebDriverConfig) -> Result<Self> {
        let endpoint = endpoint_url(&config.endpoint)?;
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": launch_args(config) }
                }
            }
        });

        let url = join(&endpoint, "session")?;
        let reply = send(&http, Method::POST, url, Some(capabilities)).await?;
        let value = reply.into_value("new session")?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| ShiftSyncError::document("WebDriver did not return a session id"))?
            .to_string();

        let session = join(&endpoint, &format!("session/{session_id}/"))?;
        info!(endpoint = %endpoint, session = %session_id, "Browser session started");
        Ok(Self { http, session, session_id })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Reply> {
        let url = join(&self.session, path)?;
        send(&self.http, method, url, body).await
    }

    async fn value(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        self.command(method, path, body).await?.into_value(path)
    }

    async fn string(&self, path: &str) -> Result<String> {
        let value = self.value(Method::GET, path, None).await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ShiftSyncError::document(format!("WebDriver {path} returned {value}")))
    }

    async fn flag(&self, element: &ElementHandle, property: &str) -> Result<bool> {
        let path = format!("element/{}/{property}", element.0);
        let value = self.value(Method::GET, &path, None).await?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url, "Navigating");
        self.value(Method::POST, "url", Some(json!({ "url": url }))).await?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        self.string("url").await
    }

    async fn title(&self) -> Result<String> {
        self.string("title").await
    }

    async fn find_element(&self, locator: &Locator) -> Result<Option<ElementHandle>> {
        let body = json!({ "using": "css selector", "value": locator.to_css() });
        let reply = self.command(Method::POST, "element", Some(body)).await?;
        if reply.error_code() == Some("no such element") {
            return Ok(None);
        }

        let value = reply.into_value("element")?;
        let id = value.get(ELEMENT_KEY).and_then(Value::as_str).ok_or_else(|| {
            ShiftSyncError::document(format!("no element reference returned for {locator}"))
        })?;
        Ok(Some(ElementHandle(id.to_string())))
    }

    async fn element_state(&self, element: &ElementHandle) -> Result<ElementState> {
        Ok(ElementState {
            displayed: self.flag(element, "displayed").await?,
            enabled: self.flag(element, "enabled").await?,
        })
    }

    async fn click(&self, element: &ElementHandle) -> Result<()> {
        let body = json!({ "script": CLICK_SCRIPT, "args": [element_reference(element)] });
        self.value(Method::POST, "execute/sync", Some(body)).await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> Result<()> {
        let path = format!("element/{}/value", element.0);
        self.value(Method::POST, &path, Some(json!({ "text": text }))).await?;
        Ok(())
    }

    async fn screenshot_png(&self) -> Result<Vec<u8>> {
        let encoded = self.string("screenshot").await?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(|err| ShiftSyncError::document(format!("screenshot is not base64: {err}")))
    }

    async fn page_source(&self) -> Result<String> {
        self.string("source").await
    }

    async fn quit(&self) -> Result<()> {
        let url = self.session.as_str().trim_end_matches('/').to_string();
        let url = Url::parse(&url).map_err(InfraError::from)?;
        let reply = send(&self.http, Method::DELETE, url, None).await?;
        if let Err(err) = reply.into_value("delete session") {
            warn!(error = %err, "Driver reported an error while closing the session");
            return Err(err);
        }
        info!(session = %self.session_id, "Browser session closed");
        Ok(())
    }
}

impl std::fmt::Debug for WebDriverSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDriverSession").field("session", &self.session.as_str()).finish()
    }
}

async fn send(http: &HttpClient, method: Method, url: Url, body: Option<Value>) -> Result<Reply> {
    let mut request = http.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = http.send(request).await?;
    let status = response.status();
    let text = response.text().await.map_err(InfraError::from)?;
    let mut payload: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).map_err(InfraError::from)?
    };
    Ok(Reply { status, value: payload.get_mut("value").map(Value::take).unwrap_or(Value::Null) })
}

fn element_reference(element: &ElementHandle) -> Value {
    let mut reference = serde_json::Map::new();
    reference.insert(ELEMENT_KEY.to_string(), Value::String(element.0.clone()));
    Value::Object(reference)
}

fn endpoint_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    Ok(Url::parse(&format!("{trimmed}/")).map_err(InfraError::from)?)
}

fn join(base: &Url, path: &str) -> Result<Url> {
    Ok(base.join(path).map_err(InfraError::from)?)
}
