//! CalDAV store with principal discovery
//!
//! Discovery walks `current-user-principal` → `calendar-home-set` → the
//! calendar collections of the home set. Existing events are read with a
//! `calendar-query` REPORT and new ones created with a conditional `PUT`.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, IF_NONE_MATCH};
use reqwest::{Method, RequestBuilder, StatusCode};
use shiftsync_core::{CalendarStore, CollectionInfo, RemoteResource};
use shiftsync_domain::constants::ICS_EXTENSION;
use shiftsync_domain::{Result, StoreConfig};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::dav::{
    collection_url, expect_body, parse_multistatus, resolve, status_error, DavResponse,
};
use crate::http::HttpClient;

const PRINCIPAL_QUERY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:"><d:prop><d:current-user-principal/></d:prop></d:propfind>"#;

const HOME_SET_QUERY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
<d:prop><c:calendar-home-set/></d:prop></d:propfind>"#;

const COLLECTIONS_QUERY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<d:propfind xmlns:d="DAV:"><d:prop><d:displayname/><d:resourcetype/></d:prop></d:propfind>"#;

const EVENTS_QUERY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<c:calendar-query xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
<d:prop><d:getetag/><c:calendar-data/></d:prop>
<c:filter><c:comp-filter name="VCALENDAR"><c:comp-filter name="VEVENT"/></c:comp-filter></c:filter>
</c:calendar-query>"#;

pub struct CalDavStore {
    http: HttpClient,
    base: Url,
    username: String,
    password: String,
}

impl CalDavStore {
    /// # Errors
    /// `Config` when the store URL does not parse.
    pub fn new(http: HttpClient, config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            http,
            base: collection_url(&config.url)?,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

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

    async fn dav(
        &self,
        method: &str,
        url: &Url,
        depth: &str,
        body: &'static str,
    ) -> Result<Vec<DavResponse>> {
        let request = self
            .http
            .dav_request(method, url.clone())?
            .header("Depth", depth)
            .header(CONTENT_TYPE, "application/xml; charset=utf-8")
            .body(body);
        let response = self.http.send(self.authed(request)).await?;
        let body = expect_body(response, &[207], &format!("{method} {url}")).await?;
        parse_multistatus(&body)
    }

    /// Principal URL of the account, or the base URL when the server does
    /// not report one.
    async fn principal(&self) -> Result<Url> {
        let responses = self.dav("PROPFIND", &self.base, "0", PRINCIPAL_QUERY).await?;
        match responses.into_iter().find_map(|r| r.principal) {
            Some(href) => resolve(&self.base, &href),
            None => {
                debug!(url = %self.base, "No current-user-principal reported; using store URL");
                Ok(self.base.clone())
            }
        }
    }

    async fn calendar_home(&self, principal: &Url) -> Result<Url> {
        let responses = self.dav("PROPFIND", principal, "0", HOME_SET_QUERY).await?;
        match responses.into_iter().find_map(|r| r.calendar_home) {
            Some(href) => resolve(principal, &href),
            None => {
                debug!(url = %principal, "No calendar-home-set reported; using principal URL");
                Ok(principal.clone())
            }
        }
    }
}

#[async_trait]
impl CalendarStore for CalDavStore {
    fn name(&self) -> &'static str {
        "caldav"
    }

    #[instrument(skip(self))]
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>> {
        let principal = self.principal().await?;
        let home = self.calendar_home(&principal).await?;
        info!(principal = %principal, home = %home, "CalDAV discovery complete");

        let mut collections = Vec::new();
        for response in self.dav("PROPFIND", &home, "1", COLLECTIONS_QUERY).await? {
            if !response.is_calendar {
                continue;
            }
            let url = resolve(&home, &response.href)?;
            let name = response.display_name.unwrap_or_else(|| last_segment(&url));
            collections.push(CollectionInfo::new(name, url.as_str()));
        }
        Ok(collections)
    }

    #[instrument(skip(self), fields(calendar = %collection.name))]
    async fn fetch_events(&self, collection: &CollectionInfo) -> Result<Vec<RemoteResource>> {
        let url = collection_url(&collection.href)?;
        let mut resources = Vec::new();
        for response in self.dav("REPORT", &url, "1", EVENTS_QUERY).await? {
            let href = resolve(&url, &response.href)?;
            match response.calendar_data {
                Some(ics) => resources.push(RemoteResource { href: href.to_string(), ics }),
                None => warn!(href = %href, "Report entry carries no calendar data"),
            }
        }
        debug!(resources = resources.len(), "Calendar query answered");
        Ok(resources)
    }

    async fn publish(&self, collection: &CollectionInfo, uid: &str, ics: &str) -> Result<()> {
        let base = collection_url(&collection.href)?;
        let url = resolve(&base, &format!("{uid}.{ICS_EXTENSION}"))?;
        let request = self
            .http
            .request(Method::PUT, url.clone())
            .header(CONTENT_TYPE, "text/calendar; charset=utf-8")
            .header(IF_NONE_MATCH, "*")
            .body(ics.to_string());
        let response = self.http.send(self.authed(request)).await?;

        match response.status() {
            StatusCode::CREATED | StatusCode::NO_CONTENT => {
                debug!(href = %url, "Event added");
                Ok(())
            }
            _ => Err(status_error(response, &format!("PUT {url}")).await),
        }
    }
}

impl std::fmt::Debug for CalDavStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalDavStore")
            .field("base", &self.base.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

fn last_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unnamed_collections_fall_back_to_path() {
        let url = Url::parse("https://dav.example.com/calendars/worker/personal/").unwrap();
        assert_eq!(last_segment(&url), "personal");
        assert_eq!(last_segment(&Url::parse("https://dav.example.com/").unwrap()), "");
    }
}
