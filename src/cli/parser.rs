use clap::{Args, Parser, Subcommand};

pub const DEFAULT_BACKEND: &str = "sqlite";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://wishlist.db?mode=rwc";

#[derive(Debug, Parser)]
#[command(
    name = "wishlist",
    version,
    about = "Personal wishlist kept in a remote document store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, default_value = DEFAULT_BACKEND)]
    pub backend: String,

    #[arg(long, default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    #[arg(long, default_value_t = false, global = true)]
    pub json: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub quiet: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub no_color: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Signup,
    Signin,
    Signout,
    Status,
    List,
    Add(ItemArgs),
    Edit {
        id: String,
        #[command(flatten)]
        item: ItemArgs,
        /// Drop every detail field before applying `--detail`.
        #[arg(long, default_value_t = false)]
        clear_details: bool,
    },
    Delete {
        id: String,
    },
    Config,
}

#[derive(Debug, Args)]
pub struct ItemArgs {
    #[arg(long)]
    pub name: Option<String>,

    /// `key=value`; values that parse as JSON are stored typed.
    #[arg(long = "detail", value_parser = parse_detail)]
    pub details: Vec<(String, String)>,
}

fn parse_detail(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected key=value, got `{raw}`"));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err("detail key must not be empty".to_owned());
    }
    if key == "id" || key == "name" {
        return Err(format!("`{key}` is managed by the wishlist"));
    }
    Ok((key.to_owned(), value.to_owned()))
}
