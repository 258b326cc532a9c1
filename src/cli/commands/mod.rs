mod info;
mod init;
mod list;
mod stats;

pub use info::cmd_info;
pub use init::cmd_init;
pub use list::cmd_list;
pub use stats::cmd_stats;
