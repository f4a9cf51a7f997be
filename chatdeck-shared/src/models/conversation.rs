use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::Timestamp;

const UNTITLED: &str = "Untitled conversation";
const NO_MESSAGES: &str = "No messages yet";
const UNREAD_CAP: u32 = 99;

/// Errors raised by [`ConversationList`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SidebarError {
    /// The id does not belong to any listed conversation.
    #[error("conversation {0} is not in the sidebar")]
    UnknownConversation(Uuid),
}

/// One row of the conversation sidebar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    pub last_activity_at: Timestamp,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub participant_count: u32,
    #[serde(default)]
    pub muted: bool,
}

impl ConversationSummary {
    /// Title to render, substituting a placeholder for blank titles.
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() { UNTITLED } else { title }
    }

    /// Single-line excerpt of the last message, at most `max_chars` characters
    /// including the trailing ellipsis.
    pub fn preview(&self, max_chars: usize) -> String {
        let collapsed = self
            .last_message
            .as_deref()
            .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        if collapsed.is_empty() {
            return NO_MESSAGES.to_string();
        }
        truncate_chars(&collapsed, max_chars)
    }

    /// Up to two uppercase initials taken from the display title.
    pub fn initials(&self) -> String {
        self.display_title()
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .take(2)
            .flat_map(char::to_uppercase)
            .collect()
    }

    /// Sidebar label for the last activity relative to `now` (UTC).
    pub fn activity_label(&self, now: DateTime<Utc>) -> String {
        let at = self.last_activity_at.0;
        let today = now.date_naive();
        let day = at.date_naive();

        if at > now || day == today {
            at.format("%H:%M").to_string()
        } else if today.pred_opt() == Some(day) {
            "Yesterday".to_string()
        } else if now - at < Duration::days(7) {
            at.format("%a").to_string()
        } else {
            at.format("%Y-%m-%d").to_string()
        }
    }

    /// Badge text for unread messages; muted conversations never show one.
    pub fn unread_badge(&self) -> Option<String> {
        match self.unread_count {
            0 => None,
            _ if self.muted => None,
            count if count > UNREAD_CAP => Some(format!("{UNREAD_CAP}+")),
            count => Some(count.to_string()),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.display_title().to_lowercase().contains(needle)
            || self
                .last_message
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(needle))
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.truncate(truncated.trim_end().len());
    truncated.push('…');
    truncated
}

/// Conversations shown in the sidebar, newest activity first, plus the
/// current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationList {
    conversations: Vec<ConversationSummary>,
    selected: Option<Uuid>,
}

impl ConversationList {
    /// Builds a list from unordered summaries. Later duplicates replace
    /// earlier ones.
    pub fn new(summaries: impl IntoIterator<Item = ConversationSummary>) -> Self {
        let mut list = Self::default();
        for summary in summaries {
            list.insert_unsorted(summary);
        }
        list.sort();
        list
    }

    /// Inserts a conversation or replaces the one with the same id.
    pub fn upsert(&mut self, summary: ConversationSummary) {
        self.insert_unsorted(summary);
        self.sort();
    }

    /// Removes a conversation, dropping the selection if it pointed there.
    pub fn remove(&mut self, id: Uuid) -> Option<ConversationSummary> {
        let index = self.position(id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.conversations.remove(index))
    }

    /// Selects a listed conversation.
    ///
    /// # Errors
    /// Returns [`SidebarError::UnknownConversation`] if `id` is not listed.
    pub fn select(&mut self, id: Uuid) -> Result<(), SidebarError> {
        self.position(id)
            .ok_or(SidebarError::UnknownConversation(id))?;
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn selected(&self) -> Option<&ConversationSummary> {
        self.selected
            .and_then(|id| self.conversations.iter().find(|c| c.id == id))
    }

    /// Conversations whose title or last message contains `query`,
    /// ignoring case. A blank query matches everything.
    pub fn filter(&self, query: &str) -> Vec<&ConversationSummary> {
        let needle = query.trim().to_lowercase();
        self.conversations
            .iter()
            .filter(|conversation| needle.is_empty() || conversation.matches(&needle))
            .collect()
    }

    /// Unread messages across conversations that are not muted.
    pub fn total_unread(&self) -> u32 {
        self.conversations
            .iter()
            .filter(|conversation| !conversation.muted)
            .fold(0, |total, conversation| {
                total.saturating_add(conversation.unread_count)
            })
    }

    /// Clears the unread counter of a conversation.
    ///
    /// # Errors
    /// Returns [`SidebarError::UnknownConversation`] if `id` is not listed.
    pub fn mark_read(&mut self, id: Uuid) -> Result<(), SidebarError> {
        let index = self
            .position(id)
            .ok_or(SidebarError::UnknownConversation(id))?;
        self.conversations[index].unread_count = 0;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConversationSummary> {
        self.conversations.iter()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.conversations.iter().position(|c| c.id == id)
    }

    fn insert_unsorted(&mut self, summary: ConversationSummary) {
        match self.position(summary.id) {
            Some(index) => self.conversations[index] = summary,
            None => self.conversations.push(summary),
        }
    }

    fn sort(&mut self) {
        self.conversations.sort_by(|a, b| {
            b.last_activity_at
                .cmp(&a.last_activity_at)
                .then_with(|| a.display_title().cmp(b.display_title()))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32, minute: u32) -> Timestamp {
        Timestamp(Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap())
    }

    fn summary(title: &str, last_message: Option<&str>, activity: Timestamp) -> ConversationSummary {
        ConversationSummary {
            id: Uuid::new_v4(),
            title: title.to_string(),
            last_message: last_message.map(str::to_string),
            last_activity_at: activity,
            unread_count: 0,
            participant_count: 2,
            muted: false,
        }
    }

    #[test]
    fn display_title_falls_back_for_blank_titles() {
        let named = summary("  Design review ", None, at(8, 9, 0));
        let blank = summary("   ", None, at(8, 9, 0));

        assert_eq!(named.display_title(), "Design review");
        assert_eq!(blank.display_title(), "Untitled conversation");
        assert_eq!(blank.initials(), "UC");
    }

    #[test]
    fn initials_use_first_two_words() {
        assert_eq!(summary("ops on call rota", None, at(8, 9, 0)).initials(), "OO");
        assert_eq!(summary("émile", None, at(8, 9, 0)).initials(), "É");
    }

    #[test]
    fn preview_collapses_whitespace_and_truncates_on_char_boundary() {
        let conversation = summary("t", Some("see   you\n\ntomorrow at the café"), at(8, 9, 0));

        assert_eq!(conversation.preview(80), "see you tomorrow at the café");
        assert_eq!(conversation.preview(9), "see you…");
        assert_eq!(conversation.preview(27), "see you tomorrow at the ca…");
        assert_eq!(conversation.preview(0), "");
    }

    #[test]
    fn preview_placeholder_when_no_message() {
        assert_eq!(summary("t", None, at(8, 9, 0)).preview(20), "No messages yet");
        assert_eq!(summary("t", Some(" \n "), at(8, 9, 0)).preview(20), "No messages yet");
    }

    #[test]
    fn activity_label_buckets() {
        let now = at(12, 15, 0).0;

        assert_eq!(summary("t", None, at(12, 8, 5)).activity_label(now), "08:05");
        assert_eq!(summary("t", None, at(11, 23, 59)).activity_label(now), "Yesterday");
        // 2025-03-07 is a Friday.
        assert_eq!(summary("t", None, at(7, 10, 0)).activity_label(now), "Fri");
        assert_eq!(summary("t", None, at(1, 10, 0)).activity_label(now), "2025-03-01");
        assert_eq!(summary("t", None, at(13, 6, 30)).activity_label(now), "06:30");
    }

    #[test]
    fn unread_badge_caps_and_respects_mute() {
        let mut conversation = summary("t", None, at(8, 9, 0));
        assert_eq!(conversation.unread_badge(), None);

        conversation.unread_count = 4;
        assert_eq!(conversation.unread_badge().as_deref(), Some("4"));

        conversation.unread_count = 250;
        assert_eq!(conversation.unread_badge().as_deref(), Some("99+"));

        conversation.muted = true;
        assert_eq!(conversation.unread_badge(), None);
    }

    #[test]
    fn list_orders_by_activity_then_title() {
        let older = summary("older", None, at(5, 9, 0));
        let bravo = summary("bravo", None, at(8, 9, 0));
        let alpha = summary("alpha", None, at(8, 9, 0));
        let list = ConversationList::new([older, bravo, alpha]);

        let titles: Vec<_> = list.iter().map(ConversationSummary::display_title).collect();
        assert_eq!(titles, ["alpha", "bravo", "older"]);
    }

    #[test]
    fn upsert_replaces_and_reorders() {
        let first = summary("first", Some("hi"), at(5, 9, 0));
        let second = summary("second", None, at(6, 9, 0));
        let mut list = ConversationList::new([first.clone(), second]);

        let mut bumped = first.clone();
        bumped.last_message = Some("new reply".to_string());
        bumped.last_activity_at = at(7, 9, 0);
        list.upsert(bumped);

        assert_eq!(list.len(), 2);
        let head = list.iter().next().unwrap();
        assert_eq!(head.id, first.id);
        assert_eq!(head.last_message.as_deref(), Some("new reply"));
    }

    #[test]
    fn selection_requires_known_id_and_clears_on_remove() {
        let conversation = summary("only", None, at(5, 9, 0));
        let id = conversation.id;
        let mut list = ConversationList::new([conversation]);

        let unknown = Uuid::new_v4();
        assert_eq!(
            list.select(unknown),
            Err(SidebarError::UnknownConversation(unknown))
        );
        assert_eq!(list.selected_id(), None);

        list.select(id).unwrap();
        assert_eq!(list.selected().map(|c| c.id), Some(id));

        assert!(list.remove(id).is_some());
        assert_eq!(list.selected_id(), None);
        assert!(list.is_empty());
        assert!(list.remove(id).is_none());
    }

    #[test]
    fn filter_matches_title_and_message_case_insensitively() {
        let list = ConversationList::new([
            summary("Release Planning", Some("ship friday"), at(5, 9, 0)),
            summary("Lunch", Some("Tacos at noon?"), at(6, 9, 0)),
            summary("Random", None, at(7, 9, 0)),
        ]);

        assert_eq!(list.filter("").len(), 3);
        assert_eq!(list.filter("  release ")[0].title, "Release Planning");
        assert_eq!(list.filter("TACOS")[0].title, "Lunch");
        assert!(list.filter("nothing here").is_empty());
    }

    #[test]
    fn unread_totals_skip_muted_and_mark_read_resets() {
        let mut loud = summary("loud", None, at(5, 9, 0));
        loud.unread_count = 3;
        let mut quiet = summary("quiet", None, at(6, 9, 0));
        quiet.unread_count = 10;
        quiet.muted = true;
        let loud_id = loud.id;
        let mut list = ConversationList::new([loud, quiet]);

        assert_eq!(list.total_unread(), 3);
        list.mark_read(loud_id).unwrap();
        assert_eq!(list.total_unread(), 0);
        assert!(list.mark_read(Uuid::new_v4()).is_err());
    }

    #[test]
    fn summary_deserializes_with_defaults() {
        let json = r#"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "last_activity_at": "2025-03-08T14:30:00Z"
        }"#;
        let parsed: ConversationSummary = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.display_title(), "Untitled conversation");
        assert_eq!(parsed.unread_count, 0);
        assert!(!parsed.muted);
        assert_eq!(parsed.last_message, None);
    }
}
