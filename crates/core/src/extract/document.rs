//! Pure parsing of a rendered schedule document into raw shifts

use std::collections::HashSet;

use scraper::{ElementRef, Html};
use shiftsync_domain::constants::PLACEHOLDER_DETAIL;
use shiftsync_domain::{strip_annotations, DateLabel, RawShift, SchemaVariant, TimeRange};
use tracing::{debug, error, info, warn};

use super::schema::CompiledSelectors;

/// Result of walking one document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScheduleScan {
    pub shifts: Vec<RawShift>,
    pub days_seen: usize,
    pub duplicates: usize,
    pub skipped: usize,
    /// Identifiers of day blocks that could not be read at all.
    pub failed_days: Vec<String>,
}

/// Walk every day and shift block of `html`.
///
/// Failures are contained to the day or shift they occur in. Identical
/// blocks rendered twice within the same document are emitted once.
pub fn scan_document(
    html: &str,
    selectors: &CompiledSelectors,
    variant: SchemaVariant,
) -> ScheduleScan {
    let document = Html::parse_document(html);
    let mut scan = ScheduleScan::default();
    let mut seen = HashSet::new();

    for (index, day) in document.select(&selectors.day).enumerate() {
        scan.days_seen += 1;
        let Some(raw_date) = day.value().attr(&selectors.date_attribute) else {
            let id = format!("day_{index}");
            error!(day = %id, attribute = %selectors.date_attribute, "Day block has no date");
            scan.failed_days.push(id);
            continue;
        };
        let label = DateLabel::from_attribute(raw_date);
        debug!(date = %label, "Processing schedule day");

        let mut found = 0usize;
        for block in day.select(&selectors.shift) {
            found += 1;
            let Some(shift) = read_shift(block, &label, selectors, variant) else {
                scan.skipped += 1;
                continue;
            };
            if seen.insert(shift.dedup_key()) {
                scan.shifts.push(shift);
            } else {
                info!(date = %label, "Duplicate shift block skipped");
                scan.duplicates += 1;
            }
        }
        debug!(date = %label, blocks = found, "Shift blocks found");
    }

    scan
}

fn read_shift(
    block: ElementRef<'_>,
    day: &DateLabel,
    selectors: &CompiledSelectors,
    variant: SchemaVariant,
) -> Option<RawShift> {
    let Some(time_text) = block.select(&selectors.time).next().map(collapsed_text) else {
        warn!(date = %day, "No time element found for shift, skipping");
        return None;
    };
    let detail = block.select(&selectors.detail).next().map(collapsed_text);

    match variant {
        SchemaVariant::Simple => {
            if detail.is_none() {
                warn!(date = %day, "No details element found for shift");
            }
            Some(RawShift::span(day.clone(), strip_annotations(&time_text), detail))
        }
        SchemaVariant::Rich => match TimeRange::parse(&time_text) {
            Ok(range) => {
                let detail = detail
                    .filter(|d| !d.is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_DETAIL.to_string());
                Some(RawShift::split(
                    day.clone(),
                    range.start,
                    range.end,
                    Some(detail),
                    range.length,
                ))
            }
            Err(err) => {
                warn!(date = %day, error = %err, "Could not parse time range, skipping shift");
                None
            }
        },
    }
}

/// Rendered text of an element with whitespace runs collapsed.
fn collapsed_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use shiftsync_domain::ShiftTimes;

    use super::*;
    use crate::extract::schema::SelectorSet;

    fn compiled(variant: SchemaVariant) -> CompiledSelectors {
        SelectorSet::for_variant(variant).compile().unwrap()
    }

    const RICH: &str = r#"
        <ul>
          <li class="withDivider" datetime="Mon Jan 06 2025 00:00:00 GMT-0500 (Eastern Standard Time)">
            <div class="scheduleEntityWrapper">
              <p class="props">9:00 AM - 5:00 PM 8.00</p>
              <p class="label">Front Desk</p>
            </div>
            <div class="shiftPosition">
              <p class="props">9:00 AM - 5:00 PM 8.00</p>
              <p class="label">Front Desk</p>
            </div>
          </li>
          <li class="withDivider" datetime="Tue Jan 07 2025 00:00:00 GMT-0500 (Eastern Standard Time)">
            <div class="scheduleEntityWrapper">
              <time class="label">1:00 PM - 9:30 PM [Close] 8.50</time>
            </div>
            <div class="scheduleEntityWrapper">
              <p class="props">Day off</p>
            </div>
          </li>
        </ul>"#;

    #[test]
    fn rich_schema_dedups_and_substitutes_placeholder() {
        let scan = scan_document(RICH, &compiled(SchemaVariant::Rich), SchemaVariant::Rich);

        assert_eq!(scan.days_seen, 2);
        assert_eq!(scan.duplicates, 1);
        assert_eq!(scan.skipped, 1);
        assert_eq!(scan.shifts.len(), 2);

        let first = &scan.shifts[0];
        assert_eq!(first.day.as_str(), "Mon Jan 06 2025");
        assert_eq!(
            first.times,
            ShiftTimes::Split { start: "9:00 AM".into(), end: "5:00 PM".into() }
        );
        assert_eq!(first.detail.as_deref(), Some("Front Desk"));
        assert_eq!(first.shift_length.as_deref(), Some("8.00"));

        let second = &scan.shifts[1];
        assert_eq!(second.detail.as_deref(), Some(PLACEHOLDER_DETAIL));
        assert_eq!(second.shift_length.as_deref(), Some("8.50"));
    }

    #[test]
    fn simple_schema_strips_annotations() {
        let html = r#"
            <li class="listItem" datetime="Mon Jan 06 2025 00:00:00 GMT-0500 (EST)">
              <div class="scheduleEntity interactive shift-wrapper">
                <time class="label">9:00 AM - 5:00 PM [Lunch]</time>
                <div class="details">  Front
                   Desk </div>
              </div>
            </li>"#;
        let scan = scan_document(html, &compiled(SchemaVariant::Simple), SchemaVariant::Simple);

        assert_eq!(scan.shifts.len(), 1);
        assert_eq!(scan.shifts[0].times, ShiftTimes::Span("9:00 AM - 5:00 PM".into()));
        assert_eq!(scan.shifts[0].detail.as_deref(), Some("Front Desk"));
    }

    #[test]
    fn day_without_date_fails_alone() {
        let html = r#"
            <li class="listItem">
              <div class="scheduleEntity interactive shift-wrapper">
                <time class="label">9:00 AM - 5:00 PM</time><div class="details">A</div>
              </div>
            </li>
            <li class="listItem" datetime="Tue Jan 07 2025 00:00:00 GMT-0500">
              <div class="scheduleEntity interactive shift-wrapper">
                <time class="label">9:00 AM - 5:00 PM</time><div class="details">B</div>
              </div>
            </li>"#;
        let scan = scan_document(html, &compiled(SchemaVariant::Simple), SchemaVariant::Simple);

        assert_eq!(scan.failed_days, vec!["day_0".to_string()]);
        assert_eq!(scan.shifts.len(), 1);
        assert_eq!(scan.shifts[0].detail.as_deref(), Some("B"));
    }

    #[test]
    fn dedup_is_scoped_to_one_scan() {
        let selectors = compiled(SchemaVariant::Rich);
        let first = scan_document(RICH, &selectors, SchemaVariant::Rich);
        let second = scan_document(RICH, &selectors, SchemaVariant::Rich);
        assert_eq!(first.shifts, second.shifts);
    }

    #[test]
    fn empty_document_yields_nothing() {
        let selectors = compiled(SchemaVariant::Rich);
        let scan = scan_document("<html></html>", &selectors, SchemaVariant::Rich);
        assert_eq!(scan, ScheduleScan::default());
    }
}
