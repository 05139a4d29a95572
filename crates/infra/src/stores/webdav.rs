//! Raw WebDAV collection store
//!
//! The configured URL is the calendar collection itself. Events are read
//! with `GET` (either one calendar body or a multistatus listing of member
//! hrefs) and created with `PUT <url>/<uid>.ics`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Method, RequestBuilder, StatusCode};
use shiftsync_core::{CalendarStore, CollectionInfo, RemoteResource};
use shiftsync_domain::constants::ICS_EXTENSION;
use shiftsync_domain::{Result, ShiftSyncError, StoreConfig};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::dav::{collection_url, expect_body, parse_multistatus, resolve, status_error};
use crate::http::HttpClient;

const DISPLAYNAME_QUERY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:"><d:prop><d:displayname/></d:prop></d:propfind>"#;

pub struct WebDavStore {
    http: HttpClient,
    base: Url,
    calendar: String,
    username: String,
    password: String,
}

impl WebDavStore {
    /// # Errors
    /// `Config` when the store URL does not parse.
    pub fn new(http: HttpClient, config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            http,
            base: collection_url(&config.url)?,
            calendar: config.calendar.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Store with an HTTP client built from the configured timeout and
    /// attempt budget.
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.request_timeout())
            .max_attempts(config.http_attempts as usize)
            .build()?;
        Self::new(http, config)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.basic_auth(&self.username, Some(&self.password))
    }

    async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        self.http.send(self.authed(self.http.request(Method::GET, url.clone()))).await
    }

    async fn fetch_members(&self, base: &Url, listing: &str) -> Result<Vec<RemoteResource>> {
        let mut resources = Vec::new();
        for response in parse_multistatus(listing)? {
            let url = resolve(base, &response.href)?;
            if url == *base || url.path().ends_with('/') {
                continue;
            }

            let member = self.get(&url).await?;
            match member.status() {
                StatusCode::OK => {
                    let ics = expect_body(member, &[200], "GET event").await?;
                    resources.push(RemoteResource { href: url.to_string(), ics });
                }
                StatusCode::NOT_FOUND => {
                    warn!(href = %url, "Listed event disappeared before it could be read");
                }
                _ => return Err(status_error(member, &format!("GET {url}")).await),
            }
        }
        Ok(resources)
    }
}

#[async_trait]
impl CalendarStore for WebDavStore {
    fn name(&self) -> &'static str {
        "webdav"
    }

    /// The collection is the configured URL; a `PROPFIND` checks that it
    /// exists and that the credentials are accepted.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let request = self
            .http
            .dav_request("PROPFIND", self.base.clone())?
            .header("Depth", "0")
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(DISPLAYNAME_QUERY);
        let response = self.http.send(self.authed(request)).await?;

        match response.status().as_u16() {
            207 => {
                let body = expect_body(response, &[207], "PROPFIND").await?;
                let display_name =
                    parse_multistatus(&body)?.into_iter().find_map(|r| r.display_name);
                info!(url = %self.base, ?display_name, "WebDAV collection reachable");
            }
            200 => info!(url = %self.base, "WebDAV collection reachable"),
            404 => return Err(ShiftSyncError::calendar_not_found(&self.calendar)),
            _ => return Err(status_error(response, &format!("PROPFIND {}", self.base)).await),
        }

        Ok(vec![CollectionInfo::new(&self.calendar, self.base.as_str())])
    }

    #[instrument(skip(self), fields(href = %collection.href))]
    async fn fetch_events(&self, collection: &CollectionInfo) -> Result<Vec<RemoteResource>> {
        let base = collection_url(&collection.href)?;
        let response = self.get(&base).await?;

        match response.status().as_u16() {
            200 => {
                let ics = expect_body(response, &[200], "GET collection").await?;
                debug!(bytes = ics.len(), "Collection served as one calendar");
                Ok(vec![RemoteResource { href: base.to_string(), ics }])
            }
            207 => {
                let listing = expect_body(response, &[207], "GET collection").await?;
                let resources = self.fetch_members(&base, &listing).await?;
                debug!(resources = resources.len(), "Collection members fetched");
                Ok(resources)
            }
            _ => Err(status_error(response, &format!("GET {base}")).await),
        }
    }

    async fn publish(&self, collection: &CollectionInfo, uid: &str, ics: &str) -> Result<()> {
        let base = collection_url(&collection.href)?;
        let url = resolve(&base, &format!("{uid}.{ICS_EXTENSION}"))?;
        let request = self
            .http
            .request(Method::PUT, url.clone())
            .header(CONTENT_TYPE, "text/calendar; charset=utf-8")
            .body(ics.to_string());
        let response = self.http.send(self.authed(request)).await?;

        if response.status() != StatusCode::CREATED {
            return Err(status_error(response, &format!("PUT {url}")).await);
        }
        debug!(href = %url, "Event created");
        Ok(())
    }
}

impl std::fmt::Debug for WebDavStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDavStore")
            .field("base", &self.base.as_str())
            .field("calendar", &self.calendar)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
