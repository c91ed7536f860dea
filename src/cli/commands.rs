use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sprig", about = concat!("sprig v", env!("CARGO_PKG_VERSION"), " - nested todo lists, one flat file each"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show all lists
    Lists,
    /// Show a list as an indented outline
    Show(ShowArgs),
    /// Add an item to a list
    Add(AddArgs),
    /// Toggle an item's checkbox
    Toggle(ItemArgs),
    /// Indent an item one level
    Indent(ItemArgs),
    /// Outdent an item one level
    Outdent(ItemArgs),
    /// Move an item's block within its list
    Mv(MvArgs),
    /// Remove an item
    Rm(ItemArgs),
    /// Validate a list's structure
    Check(ListArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// List name
    pub list: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// List name
    pub list: String,
    /// Include completed items even when the config hides them
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// List name (created on first use)
    pub list: String,
    /// Item text
    pub text: String,
    /// Insert below the item with this id (default: end of list)
    #[arg(long)]
    pub below: Option<u64>,
}

#[derive(Args)]
pub struct ItemArgs {
    /// List name
    pub list: String,
    /// Item id
    pub id: u64,
}

#[derive(Args)]
pub struct MvArgs {
    /// List name
    pub list: String,
    /// Item id to move (its whole block moves with it)
    pub id: u64,
    /// Drop before this item
    #[arg(long, conflicts_with_all = ["after", "section_end"])]
    pub before: Option<u64>,
    /// Drop after this item's block
    #[arg(long, conflicts_with = "section_end")]
    pub after: Option<u64>,
    /// Drop at the end of the item's section
    #[arg(long)]
    pub section_end: bool,
}
