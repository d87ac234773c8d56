// CLI module for administrative operations requiring server access

pub mod seed;

use clap::{Parser, Subcommand};

/// RBAC backend CLI for administrative operations
#[derive(Parser)]
#[command(name = "rbac-backend")]
#[command(about = "Role-based access control backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Seed the database with the base permissions, roles and demo accounts
    Seed,
}
