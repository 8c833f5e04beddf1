use crate::app::Settings;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[clap(version, about = "Wires a sample application through a typed environment")]
pub struct Args {
    /// Name the greeter introduces itself with
    #[arg(long, default_value = "regenv")]
    pub name: String,

    /// Number of pooled connections
    #[arg(long, default_value_t = 4)]
    pub pool_size: usize,

    /// Comma separated users known to the user store
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = [String::from("ada"), String::from("grace")]
    )]
    pub users: Vec<String>,

    /// Shout every greeting
    #[arg(long)]
    pub loud: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Greet a known user
    Greet {
        /// Name of the user to greet
        user: String,
    },

    /// List the services the application is wired with
    Keys,
}

impl Args {
    pub fn settings(&self) -> Settings {
        Settings {
            service_name: self.name.clone(),
            pool_size: self.pool_size,
            users: self.users.clone(),
        }
    }
}
