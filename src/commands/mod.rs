mod auth;
mod config_cmd;
mod habit;

pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use habit::{AddCommand, DoneCommand, ListCommand, RemoveCommand};
