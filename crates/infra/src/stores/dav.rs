//! WebDAV plumbing shared by the store adapters: multistatus parsing, URL
//! resolution and status handling.

use reqwest::{Response, StatusCode};
use roxmltree::{Document, Node};
use shiftsync_domain::{Result, ShiftSyncError};
use url::Url;

use crate::errors::InfraError;

pub(crate) const DAV_NS: &str = "DAV:";
pub(crate) const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";

/// One `<response>` of a multistatus body, reduced to the properties the
/// adapters read. Properties reported with a non-2xx propstat are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DavResponse {
    pub href: String,
    pub display_name: Option<String>,
    pub is_calendar: bool,
    pub principal: Option<String>,
    pub calendar_home: Option<String>,
    pub calendar_data: Option<String>,
}

/// Parse a `207 Multi-Status` body.
pub(crate) fn parse_multistatus(xml: &str) -> Result<Vec<DavResponse>> {
    let doc = Document::parse(xml).map_err(InfraError::from)?;
    let root = doc.root_element();
    if !is(root, DAV_NS, "multistatus") {
        return Err(ShiftSyncError::transport(format!(
            "expected a DAV multistatus document, got <{}>",
            root.tag_name().name()
        )));
    }

    Ok(root.children().filter(|n| is(*n, DAV_NS, "response")).filter_map(parse_response).collect())
}

fn parse_response(node: Node<'_, '_>) -> Option<DavResponse> {
    let href = child(node, DAV_NS, "href").and_then(text)?;
    let mut response = DavResponse { href, ..DavResponse::default() };

    for propstat in node.children().filter(|n| is(*n, DAV_NS, "propstat")) {
        if !propstat_ok(propstat) {
            continue;
        }
        let Some(prop) = child(propstat, DAV_NS, "prop") else {
            continue;
        };
        for property in prop.children().filter(Node::is_element) {
            let name = property.tag_name();
            match (name.namespace(), name.name()) {
                (Some(DAV_NS), "displayname") => response.display_name = text(property),
                (Some(DAV_NS), "resourcetype") => {
                    response.is_calendar = child(property, CALDAV_NS, "calendar").is_some();
                }
                (Some(DAV_NS), "current-user-principal") => {
                    response.principal = child(property, DAV_NS, "href").and_then(text);
                }
                (Some(CALDAV_NS), "calendar-home-set") => {
                    response.calendar_home = child(property, DAV_NS, "href").and_then(text);
                }
                (Some(CALDAV_NS), "calendar-data") => response.calendar_data = text(property),
                _ => {}
            }
        }
    }

    Some(response)
}

fn is(node: Node<'_, '_>, namespace: &str, name: &str) -> bool {
    node.is_element()
        && node.tag_name().namespace() == Some(namespace)
        && node.tag_name().name() == name
}

fn child<'a, 'input>(
    node: Node<'a, 'input>,
    namespace: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children().find(|n| is(*n, namespace, name))
}

/// Concatenated text content, `None` when blank.
fn text(node: Node<'_, '_>) -> Option<String> {
    let value: String = node.descendants().filter(Node::is_text).filter_map(|n| n.text()).collect();
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// A propstat without a status line is taken as successful.
fn propstat_ok(propstat: Node<'_, '_>) -> bool {
    child(propstat, DAV_NS, "status")
        .and_then(text)
        .and_then(|line| line.split_whitespace().nth(1).map(|code| code.starts_with('2')))
        .unwrap_or(true)
}

/// Parse a collection URL, making sure member names resolve inside it.
pub(crate) fn collection_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim()).map_err(InfraError::from)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolve an `href` from a response body against the URL it came from.
pub(crate) fn resolve(base: &Url, href: &str) -> Result<Url> {
    Ok(base.join(href.trim()).map_err(InfraError::from)?)
}

/// Read the body of a response whose status is one of `accepted`.
///
/// # Errors
/// `Transport` naming `context` and the status otherwise.
pub(crate) async fn expect_body(
    response: Response,
    accepted: &[u16],
    context: &str,
) -> Result<String> {
    let status = response.status();
    if !accepted.contains(&status.as_u16()) {
        return Err(status_error(response, context).await);
    }
    Ok(response.text().await.map_err(InfraError::from)?)
}

/// Build a `Transport` error from an unexpected response.
pub(crate) async fn status_error(response: Response, context: &str) -> ShiftSyncError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    let hint = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => " (check credentials)",
        _ => "",
    };
    ShiftSyncError::transport(format!("{context} returned HTTP {status}{hint}: {}", snippet.trim()))
}
