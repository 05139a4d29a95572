//! Selector sets for the schedule document variants

use scraper::Selector;
use shiftsync_domain::constants::DEFAULT_DATE_ATTRIBUTE;
use shiftsync_domain::{Result, SchemaVariant, SelectorOverrides, ShiftSyncError};

/// CSS selectors describing one document variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSet {
    /// Element whose presence means the schedule has rendered.
    pub container: String,
    /// One element per day, carrying the date attribute.
    pub day: String,
    pub date_attribute: String,
    /// One element per shift block within a day.
    pub shift: String,
    /// Time text within a shift block.
    pub time: String,
    /// Detail text within a shift block.
    pub detail: String,
}

impl SelectorSet {
    /// Built-in selectors observed for each variant.
    pub fn for_variant(variant: SchemaVariant) -> Self {
        match variant {
            SchemaVariant::Simple => Self {
                container: "li.listItem".to_string(),
                day: "li.listItem".to_string(),
                date_attribute: DEFAULT_DATE_ATTRIBUTE.to_string(),
                shift: "div.scheduleEntity.interactive.shift-wrapper".to_string(),
                time: "time.label".to_string(),
                detail: "div.details".to_string(),
            },
            SchemaVariant::Rich => Self {
                container: "li.withDivider".to_string(),
                day: "li.withDivider".to_string(),
                date_attribute: DEFAULT_DATE_ATTRIBUTE.to_string(),
                shift: "div.scheduleEntityWrapper, div.shiftPosition".to_string(),
                time: "p.props, time.label".to_string(),
                detail: "p.label".to_string(),
            },
        }
    }

    /// Variant defaults with any configured selector replaced.
    pub fn resolve(variant: SchemaVariant, overrides: &SelectorOverrides) -> Self {
        let defaults = Self::for_variant(variant);
        let pick = |value: &Option<String>, default: String| {
            value.as_ref().filter(|v| !v.trim().is_empty()).cloned().unwrap_or(default)
        };
        Self {
            container: pick(&overrides.container, defaults.container),
            day: pick(&overrides.day, defaults.day),
            date_attribute: pick(&overrides.date_attribute, defaults.date_attribute),
            shift: pick(&overrides.shift, defaults.shift),
            time: pick(&overrides.time, defaults.time),
            detail: pick(&overrides.detail, defaults.detail),
        }
    }

    /// # Errors
    /// Returns `ShiftSyncError::Config` naming the selector that does not
    /// parse.
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            day: parse_selector("day", &self.day)?,
            shift: parse_selector("shift", &self.shift)?,
            time: parse_selector("time", &self.time)?,
            detail: parse_selector("detail", &self.detail)?,
            date_attribute: self.date_attribute.clone(),
        })
    }
}

/// Parsed form of a [`SelectorSet`], ready to run against a document.
#[derive(Debug, Clone)]
pub struct CompiledSelectors {
    pub(crate) day: Selector,
    pub(crate) shift: Selector,
    pub(crate) time: Selector,
    pub(crate) detail: Selector,
    pub(crate) date_attribute: String,
}

fn parse_selector(role: &str, css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ShiftSyncError::config(format!("invalid {role} selector '{css}': {e:?}")))
}
