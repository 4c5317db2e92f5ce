pub mod cat;
pub mod export;
pub mod init;
pub mod list;
pub mod mkdir;
pub mod mv;
pub mod rm;
pub mod toggle;
pub mod upload;
pub mod write;

pub use cat::{cat_command, open_command};
pub use export::export_command;
pub use init::init_command;
pub use list::{find_command, list_command};
pub use mkdir::mkdir_command;
pub use mv::{mv_command, rename_command};
pub use rm::rm_command;
pub use toggle::toggle_command;
pub use upload::upload_command;
pub use write::{save_command, touch_command};
