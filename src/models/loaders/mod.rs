pub mod sheet_loader;

pub use sheet_loader::{load_accounts, write_template};
