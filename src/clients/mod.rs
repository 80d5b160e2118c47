pub mod draft_api;
pub mod error_codes;
pub mod wechat_client;

pub use draft_api::DraftApi;
pub use wechat_client::WeChatClient;
