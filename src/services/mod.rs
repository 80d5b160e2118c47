//! 业务能力层（Services）
//!
//! 每个服务只描述“我能做什么”，只处理单篇内容或单个文件，
//! 不关心账号循环，也不决定处理顺序。

pub mod archiver;
pub mod content_scanner;
pub mod cover;
pub mod html_transform;
pub mod image_rehost;
pub mod image_set;
pub mod stats_store;
pub mod text_normalize;

pub use archiver::Archiver;
pub use content_scanner::enumerate_items;
pub use cover::{cover_candidates, select_cover, Cover};
pub use html_transform::Capabilities;
pub use image_rehost::{ImageRehoster, ImageSource};
pub use image_set::{scan_image_set, ImageSetContent};
pub use stats_store::StatsStore;
