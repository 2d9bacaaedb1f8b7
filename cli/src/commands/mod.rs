//! Command implementations for the cabinet CLI.

pub mod auth;
pub mod list;
pub mod remove;
pub mod upload;

pub use auth::{run_reset_password, run_signin, run_signout, run_signup, run_whoami};
pub use list::run_list;
pub use remove::run_remove;
pub use upload::run_upload;
