pub mod composer;
pub mod conversation;
pub mod timestamp;

pub use composer::{
    Attachment, ComposerError, ComposerPanel, ComposerState, EMOJI_PALETTE, MAX_ATTACHMENTS,
    OutgoingMessage,
};
pub use conversation::{ConversationList, ConversationSummary, SidebarError};
pub use timestamp::Timestamp;
