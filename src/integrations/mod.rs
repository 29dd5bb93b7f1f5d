pub mod chat;
pub mod images;
pub mod notifier;
pub mod wordpress;

pub use chat::{ChatCompletion, ChatError, ChatMessage, ChatRequest, OpenAiChatClient};
pub use images::{
    select_image_provider, AspectRatio, GeneratedImage, ImageError, ImagePrompt, ImageProvider,
};
pub use notifier::{ErrorNotifier, LogNotifier, TelegramNotifier};
pub use wordpress::{
    PublishConfirmation, WordPressClient, WordPressCredentials, WordPressError, WordPressPost,
    WordPressPostType, WordPressTerm,
};
