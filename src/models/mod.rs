pub mod account;
pub mod content;
pub mod draft;
pub mod loaders;
pub mod stats;
pub mod upload;

pub use account::{AccountConfig, CommentPermission, ContentType, ProxyConfig};
pub use content::ContentItem;
pub use draft::{DraftArticle, DraftPayload, ImageInfo};
pub use loaders::{load_accounts, write_template};
pub use stats::{ProcessingStats, StatsRecord};
pub use upload::UploadResult;
