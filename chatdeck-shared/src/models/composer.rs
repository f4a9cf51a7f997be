//! Message composer state: draft text, the attachment panels and scheduling.
//!
//! GIF search, voice recording and date picking happen in sibling components.
//! They hand their results back through [`ComposerState::attach`] and
//! [`ComposerState::schedule`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Timestamp;

/// Most attachments a single message may carry.
pub const MAX_ATTACHMENTS: usize = 10;

/// Quick-pick emoji offered by the emoji panel.
pub const EMOJI_PALETTE: &[&str] = &[
    "😀", "😂", "😍", "🥲", "👍", "🙏", "🎉", "❤️", "🔥", "😮",
];

/// Errors raised while editing or sending a composed message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComposerError {
    #[error("message has no text or attachments")]
    Empty,
    #[error("message is {length} characters long; the limit is {max}")]
    TooLong { length: usize, max: usize },
    #[error("a message can carry at most {max} attachments")]
    TooManyAttachments { max: usize },
    #[error("scheduled time must be in the future")]
    ScheduleInPast,
}

/// Auxiliary panels of the composer bar. At most one is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposerPanel {
    Gif,
    Voice,
    Schedule,
    Emoji,
}

impl ComposerPanel {
    /// Panels in toolbar order.
    pub const ALL: [Self; 4] = [Self::Emoji, Self::Gif, Self::Voice, Self::Schedule];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Gif => "GIF",
            Self::Voice => "Voice",
            Self::Schedule => "Schedule",
            Self::Emoji => "Emoji",
        }
    }
}

/// Something attached to an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Attachment {
    Gif { url: String, title: String },
    Voice { duration_secs: u32, blob_url: String },
}

impl Attachment {
    /// Chip label shown in the composer.
    pub fn label(&self) -> String {
        match self {
            Self::Gif { title, .. } if !title.trim().is_empty() => format!("GIF: {}", title.trim()),
            Self::Gif { .. } => "GIF".to_string(),
            Self::Voice { duration_secs, .. } => format!(
                "Voice message ({}:{:02})",
                duration_secs / 60,
                duration_secs % 60
            ),
        }
    }

    /// Panel that produces this kind of attachment.
    pub const fn source_panel(&self) -> ComposerPanel {
        match self {
            Self::Gif { .. } => ComposerPanel::Gif,
            Self::Voice { .. } => ComposerPanel::Voice,
        }
    }
}

/// A message ready to hand to the send operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_for: Option<Timestamp>,
}

/// Everything the composer bar holds between keystrokes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposerState {
    draft: String,
    open_panel: Option<ComposerPanel>,
    attachments: Vec<Attachment>,
    scheduled_for: Option<Timestamp>,
}

impl ComposerState {
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn open_panel(&self) -> Option<ComposerPanel> {
        self.open_panel
    }

    pub fn is_open(&self, panel: ComposerPanel) -> bool {
        self.open_panel == Some(panel)
    }

    /// Opens `panel`, or closes it when it is already open.
    pub fn toggle_panel(&mut self, panel: ComposerPanel) {
        self.open_panel = if self.is_open(panel) {
            None
        } else {
            Some(panel)
        };
    }

    pub fn close_panel(&mut self) {
        self.open_panel = None;
    }

    /// Appends an emoji to the draft and closes the emoji panel.
    pub fn insert_emoji(&mut self, emoji: &str) {
        self.draft.push_str(emoji);
        if self.is_open(ComposerPanel::Emoji) {
            self.open_panel = None;
        }
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Adds an attachment and closes the panel that produced it.
    ///
    /// # Errors
    /// Returns [`ComposerError::TooManyAttachments`] once [`MAX_ATTACHMENTS`]
    /// are present.
    pub fn attach(&mut self, attachment: Attachment) -> Result<(), ComposerError> {
        if self.attachments.len() >= MAX_ATTACHMENTS {
            return Err(ComposerError::TooManyAttachments {
                max: MAX_ATTACHMENTS,
            });
        }
        if self.is_open(attachment.source_panel()) {
            self.open_panel = None;
        }
        self.attachments.push(attachment);
        Ok(())
    }

    pub fn remove_attachment(&mut self, index: usize) -> Option<Attachment> {
        (index < self.attachments.len()).then(|| self.attachments.remove(index))
    }

    pub fn scheduled_for(&self) -> Option<Timestamp> {
        self.scheduled_for
    }

    /// Schedules the message for `at` and closes the schedule panel.
    ///
    /// # Errors
    /// Returns [`ComposerError::ScheduleInPast`] unless `at` is after `now`.
    pub fn schedule(&mut self, at: Timestamp, now: Timestamp) -> Result<(), ComposerError> {
        if at <= now {
            return Err(ComposerError::ScheduleInPast);
        }
        self.scheduled_for = Some(at);
        if self.is_open(ComposerPanel::Schedule) {
            self.open_panel = None;
        }
        Ok(())
    }

    pub fn clear_schedule(&mut self) {
        self.scheduled_for = None;
    }

    /// Characters left before `max_len` is reached.
    pub fn remaining_chars(&self, max_len: usize) -> usize {
        max_len.saturating_sub(self.draft.trim().chars().count())
    }

    /// Whether [`ComposerState::take_outgoing`] would succeed, ignoring the
    /// schedule.
    pub fn can_send(&self, max_len: usize) -> bool {
        self.validate(max_len).is_ok()
    }

    /// Produces the outgoing message and resets the composer.
    ///
    /// # Errors
    /// Returns [`ComposerError::Empty`] or [`ComposerError::TooLong`] when the
    /// draft cannot be sent, and [`ComposerError::ScheduleInPast`] when the
    /// scheduled time has already passed. The composer is left untouched on
    /// error.
    pub fn take_outgoing(
        &mut self,
        now: Timestamp,
        max_len: usize,
    ) -> Result<OutgoingMessage, ComposerError> {
        self.validate(max_len)?;
        if self.scheduled_for.is_some_and(|at| at <= now) {
            return Err(ComposerError::ScheduleInPast);
        }

        let state = std::mem::take(self);
        Ok(OutgoingMessage {
            text: state.draft.trim().to_string(),
            attachments: state.attachments,
            scheduled_for: state.scheduled_for,
        })
    }

    fn validate(&self, max_len: usize) -> Result<(), ComposerError> {
        let length = self.draft.trim().chars().count();
        if length == 0 && self.attachments.is_empty() {
            return Err(ComposerError::Empty);
        }
        if length > max_len {
            return Err(ComposerError::TooLong {
                length,
                max: max_len,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(hour: u32) -> Timestamp {
        Timestamp(Utc.with_ymd_and_hms(2025, 3, 8, hour, 0, 0).unwrap())
    }

    fn gif() -> Attachment {
        Attachment::Gif {
            url: "https://media.example/cat.gif".to_string(),
            title: "cat typing".to_string(),
        }
    }

    #[test]
    fn panels_are_mutually_exclusive_and_toggle_closed() {
        let mut composer = ComposerState::default();

        composer.toggle_panel(ComposerPanel::Gif);
        assert!(composer.is_open(ComposerPanel::Gif));

        composer.toggle_panel(ComposerPanel::Voice);
        assert_eq!(composer.open_panel(), Some(ComposerPanel::Voice));
        assert!(!composer.is_open(ComposerPanel::Gif));

        composer.toggle_panel(ComposerPanel::Voice);
        assert_eq!(composer.open_panel(), None);
    }

    #[test]
    fn emoji_insertion_appends_and_closes_panel() {
        let mut composer = ComposerState::default();
        composer.set_draft("nice ");
        composer.toggle_panel(ComposerPanel::Emoji);

        composer.insert_emoji(EMOJI_PALETTE[4]);

        assert_eq!(composer.draft(), "nice 👍");
        assert_eq!(composer.open_panel(), None);
    }

    #[test]
    fn attaching_closes_source_panel_only() {
        let mut composer = ComposerState::default();
        composer.toggle_panel(ComposerPanel::Gif);
        composer.attach(gif()).unwrap();
        assert_eq!(composer.open_panel(), None);

        composer.toggle_panel(ComposerPanel::Emoji);
        composer
            .attach(Attachment::Voice {
                duration_secs: 42,
                blob_url: "blob:voice".to_string(),
            })
            .unwrap();
        assert_eq!(composer.open_panel(), Some(ComposerPanel::Emoji));
        assert_eq!(composer.attachments().len(), 2);
    }

    #[test]
    fn attachment_limit_is_enforced() {
        let mut composer = ComposerState::default();
        for _ in 0..MAX_ATTACHMENTS {
            composer.attach(gif()).unwrap();
        }

        assert_eq!(
            composer.attach(gif()),
            Err(ComposerError::TooManyAttachments { max: 10 })
        );
        assert!(composer.remove_attachment(3).is_some());
        assert!(composer.remove_attachment(MAX_ATTACHMENTS).is_none());
        assert!(composer.attach(gif()).is_ok());
    }

    #[test]
    fn attachment_labels() {
        assert_eq!(gif().label(), "GIF: cat typing");
        let untitled = Attachment::Gif {
            url: "u".to_string(),
            title: " ".to_string(),
        };
        assert_eq!(untitled.label(), "GIF");
        let voice = Attachment::Voice {
            duration_secs: 125,
            blob_url: "blob:v".to_string(),
        };
        assert_eq!(voice.label(), "Voice message (2:05)");
    }

    #[test]
    fn schedule_rejects_past_and_closes_panel() {
        let mut composer = ComposerState::default();
        composer.toggle_panel(ComposerPanel::Schedule);

        assert_eq!(
            composer.schedule(ts(9), ts(10)),
            Err(ComposerError::ScheduleInPast)
        );
        assert!(composer.is_open(ComposerPanel::Schedule));

        composer.schedule(ts(12), ts(10)).unwrap();
        assert_eq!(composer.scheduled_for(), Some(ts(12)));
        assert_eq!(composer.open_panel(), None);

        composer.clear_schedule();
        assert_eq!(composer.scheduled_for(), None);
    }

    #[test]
    fn can_send_requires_content_within_limit() {
        let mut composer = ComposerState::default();
        assert!(!composer.can_send(10));

        composer.set_draft("   ");
        assert!(!composer.can_send(10));

        composer.attach(gif()).unwrap();
        assert!(composer.can_send(10));

        composer.set_draft("far too long for the limit");
        assert!(!composer.can_send(10));
        assert_eq!(composer.remaining_chars(10), 0);
        assert_eq!(composer.remaining_chars(100), 74);
    }

    #[test]
    fn take_outgoing_builds_message_and_resets() {
        let mut composer = ComposerState::default();
        composer.set_draft("  see you soon \n");
        composer.attach(gif()).unwrap();
        composer.schedule(ts(12), ts(10)).unwrap();
        composer.toggle_panel(ComposerPanel::Emoji);

        let message = composer.take_outgoing(ts(11), 4000).unwrap();

        assert_eq!(message.text, "see you soon");
        assert_eq!(message.attachments, vec![gif()]);
        assert_eq!(message.scheduled_for, Some(ts(12)));
        assert_eq!(composer, ComposerState::default());
    }

    #[test]
    fn take_outgoing_errors_leave_state_untouched() {
        let mut composer = ComposerState::default();
        assert_eq!(
            composer.take_outgoing(ts(10), 10),
            Err(ComposerError::Empty)
        );

        composer.set_draft("twelve chars");
        assert_eq!(
            composer.take_outgoing(ts(10), 5),
            Err(ComposerError::TooLong { length: 12, max: 5 })
        );
        assert_eq!(composer.draft(), "twelve chars");

        composer.schedule(ts(11), ts(10)).unwrap();
        assert_eq!(
            composer.take_outgoing(ts(11), 100),
            Err(ComposerError::ScheduleInPast)
        );
        assert_eq!(composer.scheduled_for(), Some(ts(11)));
    }

    #[test]
    fn outgoing_message_serializes_tagged_attachments() {
        let message = OutgoingMessage {
            text: "hi".to_string(),
            attachments: vec![gif()],
            scheduled_for: None,
        };
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["attachments"][0]["kind"], "gif");
        assert!(json.get("scheduled_for").is_none());
    }
}
