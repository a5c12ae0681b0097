/// Photo-group aggregation
///
/// Enumerates the whole photo library page by page, drops everything
/// already staged in the delete pile, and buckets the rest into
/// month/year groups for the list screen. Groups are rebuilt from
/// scratch on every call; the facade re-runs this whenever the pile
/// version changes.
use std::collections::{HashMap, HashSet};

use chrono::{TimeZone, Utc};

use crate::error::TriageError;
use crate::source::{MediaFilter, PhotoSource};
use crate::types::{DateGroup, Photo};

/// Page size for library enumeration.
pub const DEFAULT_PAGE_SIZE: usize = 500;

/// List every non-empty month/year group, excluding `exclude_ids`
/// (the current delete pile), newest group first.
pub async fn list_groups(
    source: &dyn PhotoSource,
    exclude_ids: &HashSet<String>,
) -> Result<Vec<DateGroup>, TriageError> {
    list_groups_paged(source, exclude_ids, DEFAULT_PAGE_SIZE).await
}

/// As `list_groups`, with an explicit enumeration page size.
pub async fn list_groups_paged(
    source: &dyn PhotoSource,
    exclude_ids: &HashSet<String>,
    page_size: usize,
) -> Result<Vec<DateGroup>, TriageError> {
    let photos = enumerate_all(source, page_size).await?;

    // Bucket by month/year label, keeping enumeration order both for
    // the buckets and for the members inside each bucket
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<Photo>> = HashMap::new();

    for photo in photos {
        if exclude_ids.contains(&photo.id) {
            continue;
        }
        let Some(label) = month_label(photo.creation_time) else {
            eprintln!(
                "⚠️  Skipping photo {} with out-of-range timestamp {}",
                photo.id, photo.creation_time
            );
            continue;
        };
        if !buckets.contains_key(&label) {
            order.push(label.clone());
        }
        buckets.entry(label).or_default().push(photo);
    }

    let mut groups: Vec<DateGroup> = order
        .into_iter()
        .filter_map(|label| {
            let photos = buckets.remove(&label)?;
            if photos.is_empty() {
                return None;
            }
            Some(DateGroup {
                count: photos.len(),
                label,
                photos,
            })
        })
        .collect();

    // Newest group first, by actual max member timestamp. Label order
    // is alphabetic and therefore wrong across year boundaries.
    groups.sort_by_key(|g| {
        std::cmp::Reverse(
            g.photos
                .iter()
                .map(|p| p.creation_time)
                .max()
                .unwrap_or(i64::MIN),
        )
    });

    Ok(groups)
}

/// Follow the enumeration cursor until the source reports the end.
/// An empty page or a missing cursor terminates the loop even when
/// `has_more` claims otherwise, so a misbehaving source cannot spin
/// us forever.
pub(crate) async fn enumerate_all(
    source: &dyn PhotoSource,
    page_size: usize,
) -> Result<Vec<Photo>, TriageError> {
    let mut all = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = source
            .enumerate(MediaFilter::Photo, page_size, cursor)
            .await?;
        let empty_page = page.items.is_empty();
        all.extend(page.items);

        if !page.has_more || empty_page || page.next_cursor.is_none() {
            break;
        }
        cursor = page.next_cursor;
    }

    Ok(all)
}

/// "January 2025"-style label from epoch milliseconds. English month
/// names, independent of the host locale. Returns `None` for
/// timestamps chrono cannot represent.
pub(crate) fn month_label(creation_time_ms: i64) -> Option<String> {
    let dt = Utc.timestamp_millis_opt(creation_time_ms).single()?;
    Some(dt.format("%B %Y").to_string())
}
