use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use roomgen_core::models::DesignStyle;

#[derive(Debug, Parser)]
#[command(name = "roomgen", version, about = "AI interior design from the terminal")]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Default, Subcommand)]
pub enum Command {
    /// Show whether a session is stored (default)
    #[default]
    Status,
    /// Log in and store the session token
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account
    Register,
    /// Request password reset instructions
    ForgotPassword { email: String },
    /// Forget the stored session token
    Logout,
    /// Profile, design count and favorites at a glance
    Home,
    /// View or edit your profile
    #[command(subcommand)]
    Profile(ProfileCommand),
    /// Manage saved designs
    #[command(subcommand)]
    Designs(DesignsCommand),
    /// Restyle a room photo with AI
    Generate(GenerateArgs),
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    Show,
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum DesignsCommand {
    List,
    Favorites,
    Show { id: String },
    Create(DesignFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: DesignEdit,
    },
    Favorite { id: String },
    Unfavorite { id: String },
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct DesignFields {
    #[arg(long)]
    pub prompt: Option<String>,
    #[arg(long)]
    pub room_type: Option<String>,
    #[arg(long)]
    pub style: Option<DesignStyle>,
    #[arg(long)]
    pub original_url: Option<String>,
    #[arg(long)]
    pub generated_url: Option<String>,
}

/// Fields an existing design can change. Image URLs are fixed at creation.
#[derive(Debug, Args)]
pub struct DesignEdit {
    #[arg(long)]
    pub prompt: Option<String>,
    #[arg(long)]
    pub room_type: Option<String>,
    #[arg(long)]
    pub style: Option<DesignStyle>,
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// JPEG photo of the room
    #[arg(long)]
    pub image: PathBuf,
    #[arg(long, default_value = "")]
    pub prompt: String,
    /// e.g. living_room, bedroom, kitchen
    #[arg(long)]
    pub room_type: String,
    #[arg(long, default_value_t = DesignStyle::Modern)]
    pub style: DesignStyle,
}
