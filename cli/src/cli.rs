use std::path::PathBuf;

use cabinet_business::DEFAULT_API_URL;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cabinet")]
#[command(about = "Upload, browse and delete your files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the cabinet service
    #[arg(long, global = true, env = "CABINET_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Show timing/latency information
    #[arg(long, global = true)]
    pub timing: bool,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Signup,
    /// Sign in with email and password
    Signin,
    /// End the current session
    Signout,
    /// Send a password reset email
    ResetPassword {
        /// Email address of the account
        email: String,
    },
    /// Show the signed-in account
    Whoami,
    /// List your files by category
    Ls {
        /// Print one table instead of per-category folders
        #[arg(long)]
        flat: bool,
    },
    /// Upload one or more files
    Upload {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Delete a file
    Rm {
        /// File id, as shown by `cabinet ls`
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}
