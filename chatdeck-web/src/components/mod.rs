pub(crate) mod conversation_sidebar;
pub(crate) mod error_banner;
pub(crate) mod loading;
pub(crate) mod message_composer;

// Re-export components for convenience
pub use conversation_sidebar::ConversationSidebar;
pub use error_banner::ErrorBanner;
pub use loading::Loading;
pub use message_composer::MessageComposer;
