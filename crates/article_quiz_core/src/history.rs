//! crates/article_quiz_core/src/history.rs
//!
//! History reconciliation: how the server-held article list and the local
//! history cache are combined into the single list the user sees.

use chrono::{DateTime, Utc};

use crate::domain::HistoryItem;

/// The name under which the local history cache is stored.
pub const HISTORY_CACHE_KEY: &str = "article-history";

/// Combines the server list and the local cache into the list shown to the user.
///
/// An authenticated user with a successfully fetched server list sees that
/// list, newest first. Otherwise (unauthenticated, or `server` is `None`
/// because the fetch failed) the local cache is used as-is.
pub fn reconcile(
    server: Option<Vec<HistoryItem>>,
    local: Vec<HistoryItem>,
    is_authenticated: bool,
) -> Vec<HistoryItem> {
    match server {
        Some(mut items) if is_authenticated => {
            items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            items
        }
        _ => local,
    }
}

/// The id given to an item that has no server-assigned article id.
pub fn local_history_id(now: DateTime<Utc>) -> String {
    now.timestamp_millis().to_string()
}

/// Formats `created_at` the way the history sidebar labels entries.
pub fn relative_label(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - created_at).num_days();
    match days {
        d if d <= 0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        d if d <= 7 => format!("{d} days ago"),
        d if d <= 30 => match d / 7 {
            1 => "1 week ago".to_string(),
            weeks => format!("{weeks} weeks ago"),
        },
        _ => created_at.format("%B %Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn item(id: &str, age_days: i64) -> HistoryItem {
        HistoryItem {
            id: id.to_string(),
            title: format!("title {id}"),
            content: "content".to_string(),
            summary: "summary".to_string(),
            created_at: Utc::now() - Duration::days(age_days),
        }
    }

    #[test]
    fn authenticated_server_list_wins() {
        let server = vec![item("old", 3), item("new", 0)];
        let local = vec![item("local", 1)];
        let merged = reconcile(Some(server), local, true);
        let ids: Vec<_> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn failed_fetch_falls_back_to_local() {
        let local = vec![item("local", 1)];
        assert_eq!(reconcile(None, local.clone(), true), local);
    }

    #[test]
    fn unauthenticated_ignores_server_list() {
        let merged = reconcile(Some(vec![item("server", 0)]), Vec::new(), false);
        assert!(merged.is_empty());
    }

    #[test]
    fn empty_server_list_still_replaces_cache() {
        let merged = reconcile(Some(Vec::new()), vec![item("local", 0)], true);
        assert!(merged.is_empty());
    }

    #[test]
    fn relative_labels() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap();
        let ago = |days| now - Duration::days(days);
        assert_eq!(relative_label(now, now), "Today");
        assert_eq!(relative_label(ago(1), now), "Yesterday");
        assert_eq!(relative_label(ago(5), now), "5 days ago");
        assert_eq!(relative_label(ago(7), now), "7 days ago");
        assert_eq!(relative_label(ago(8), now), "1 week ago");
        assert_eq!(relative_label(ago(21), now), "3 weeks ago");
        assert_eq!(relative_label(ago(45), now), "May 2024");
    }
}
