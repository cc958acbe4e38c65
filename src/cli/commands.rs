//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - login/logout/whoami/register: session and account
//! - tools: list, nearby, show, create
//! - reserve/reservations: rental requests
//! - chat: show and send messages about a tool
//! - profile: show and update the logged-in user
//! - distance: haversine between two points

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// toolshare - rent tools from people nearby
#[derive(Parser, Debug)]
#[command(name = "toolshare")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL (overrides config and TOOLSHARE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the session
    Login {
        /// Account email
        email: String,

        /// Account password
        #[arg(short, long, env = "TOOLSHARE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Whoami,

    /// Create an account
    Register(RegisterArgs),

    /// Browse and list tools
    Tools {
        #[command(subcommand)]
        command: ToolCommands,
    },

    /// List tool categories
    Categories,

    /// Reserve a tool for a date range
    Reserve {
        /// Tool ID
        tool_id: i64,

        /// First day (YYYY-MM-DD)
        #[arg(short, long)]
        start: NaiveDate,

        /// Day the tool is returned (YYYY-MM-DD), must be after start
        #[arg(short, long)]
        end: NaiveDate,
    },

    /// List your reservations
    Reservations,

    /// Talk to the other side of a rental
    Chat {
        #[command(subcommand)]
        command: ChatCommands,
    },

    /// Show or update your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Great-circle distance between two points in km
    Distance {
        #[arg(allow_hyphen_values = true)]
        lat1: String,
        #[arg(allow_hyphen_values = true)]
        lon1: String,
        #[arg(allow_hyphen_values = true)]
        lat2: String,
        #[arg(allow_hyphen_values = true)]
        lon2: String,
    },
}

/// Tool subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ToolCommands {
    /// List all tools
    List {
        /// Only this category (server-side)
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Only tools at or below this daily price
        #[arg(short, long)]
        max_price: Option<f64>,
    },

    /// Tools near a position, with distances
    Nearby {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lon: String,

        /// Radius in km (defaults to config)
        #[arg(short, long, conflicts_with = "all")]
        radius: Option<f64>,

        /// Annotate every tool with its distance instead of filtering
        #[arg(short, long)]
        all: bool,

        /// Only this category
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Only tools at or below this daily price
        #[arg(short, long)]
        max_price: Option<f64>,
    },

    /// Show one tool
    Show {
        /// Tool ID
        id: i64,
    },

    /// List a new tool for rent
    Create(CreateToolArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateToolArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: String,

    /// Daily price
    #[arg(long)]
    pub price: f64,

    #[arg(long)]
    pub category: String,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: String,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: String,

    /// Initial rating (0-5)
    #[arg(long, default_value_t = 0.0)]
    pub rating: f64,

    /// available, rented or maintenance
    #[arg(long, default_value = "available")]
    pub status: String,

    /// Image URL
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "TOOLSHARE_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub cpf: String,

    #[arg(long)]
    pub address: String,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: String,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: String,
}

/// Chat subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ChatCommands {
    /// Show the conversation about a tool
    Show {
        /// Tool ID
        tool_id: i64,
    },

    /// Send a message and show the updated conversation
    Send {
        /// Tool ID
        tool_id: i64,

        /// Message text
        message: String,
    },
}

/// Profile subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProfileCommands {
    /// Show your profile
    Show,

    /// Replace your profile fields (all required)
    Update {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        cpf: String,
        #[arg(long)]
        address: String,
    },
}
