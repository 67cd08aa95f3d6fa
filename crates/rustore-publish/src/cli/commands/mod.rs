//! CLI commands

mod init;
mod publish;
mod validate;

pub use init::InitCommand;
pub use publish::PublishCommand;
pub use validate::ValidateCommand;
