mod activate;
mod deactivate;
mod init;
mod used;

pub use activate::cmd_use;
pub use deactivate::cmd_unuse;
pub use init::cmd_init;
pub use used::cmd_used;
