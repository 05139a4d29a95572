//! Element locators for the login form and schedule document

use serde::{Deserialize, Serialize};

/// How to find one element in the rendered document.
///
/// Serialized as `{ by = "name", value = "loginfmt" }` in config files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Locator {
    Css(String),
    Id(String),
    Name(String),
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Equivalent CSS selector, for drivers that only speak CSS.
    pub fn to_css(&self) -> String {
        match self {
            Self::Css(selector) => selector.clone(),
            Self::Id(id) => format!("[id=\"{}\"]", escape_attr(id)),
            Self::Name(name) => format!("[name=\"{}\"]", escape_attr(name)),
        }
    }
}

fn escape_attr(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(selector) => write!(f, "css={selector}"),
            Self::Id(id) => write!(f, "id={id}"),
            Self::Name(name) => write!(f, "name={name}"),
        }
    }
}
