//! Command line runner for the block catalog.
//!
//! ```sh
//! blocks list
//! blocks schema s3.get_object
//! blocks -v run s3.get_object --input-json '{"Bucket": "my-bucket", "Key": "hello.txt"}'
//! blocks run rds.describe_db_instances --connection prod.toml
//! ```
use std::path::PathBuf;

use anyhow::Context;
use blocks::{Connection, Event};
use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Sets the verbosity level
    #[clap(short, global = true, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every block in the catalog.
    List,
    /// Show the input and output fields of a block.
    Schema {
        block: String,
        /// Print the schema as JSON instead of a table.
        #[clap(long)]
        json: bool,
    },
    /// Run a single block and print what it emits.
    Run {
        block: String,
        /// Path to a JSON file holding the block's input.
        #[clap(long, conflicts_with = "input_json")]
        input: Option<PathBuf>,
        /// The block's input as inline JSON.
        #[clap(long)]
        input_json: Option<String>,
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

#[derive(clap::Args)]
struct ConnectionArgs {
    /// Path to a TOML connection file. Overrides the flags below.
    #[clap(long)]
    connection: Option<PathBuf>,
    #[clap(long, env = "AWS_REGION")]
    region: Option<String>,
    #[clap(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    access_key_id: Option<String>,
    #[clap(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    secret_access_key: Option<String>,
    #[clap(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    session_token: Option<String>,
    /// Overrides the service endpoint, ie for a local S3 stand-in.
    #[clap(long, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,
}

impl ConnectionArgs {
    fn into_connection(self) -> anyhow::Result<Connection> {
        if let Some(path) = self.connection {
            log::debug!("reading connection from {}", path.display());
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("could not read {}", path.display()))?;
            return Ok(Connection::from_toml_str(&contents)?);
        }
        Ok(Connection {
            region: self.region.context("missing --region or AWS_REGION")?,
            access_key_id: self
                .access_key_id
                .context("missing --access-key-id or AWS_ACCESS_KEY_ID")?,
            secret_access_key: self
                .secret_access_key
                .context("missing --secret-access-key or AWS_SECRET_ACCESS_KEY")?,
            session_token: self.session_token,
            endpoint_url: self.endpoint_url,
        })
    }
}

fn read_input(
    input: Option<PathBuf>,
    input_json: Option<String>,
) -> anyhow::Result<serde_json::Value> {
    let text = match (input, input_json) {
        (Some(path), _) => std::fs::read_to_string(&path)
            .with_context(|| format!("could not read {}", path.display()))?,
        (None, Some(json)) => json,
        (None, None) => return Ok(serde_json::json!({})),
    };
    serde_json::from_str(&text).context("input is not valid JSON")
}

fn list() {
    let mut service = "";
    for info in blocks::catalog() {
        let prefix = info.name.split('.').next().unwrap_or_default();
        if prefix != service {
            service = prefix;
            println!("{}", service.to_uppercase().bold());
        }
        println!("  {:<30} {}", info.name.green(), info.description.dimmed());
    }
}

fn print_fields(title: &str, fields: &[blocks::FieldSpec]) {
    println!("{}", title.bold());
    if fields.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for field in fields {
        let required = if field.required {
            "required".yellow()
        } else {
            "optional".dimmed()
        };
        println!(
            "  {:<28} {:<8} {required} {}",
            field.name.green(),
            field.kind.to_string(),
            field.description
        );
    }
}

fn schema(block: &str, json: bool) -> anyhow::Result<()> {
    let info = blocks::find_block(block).with_context(|| format!("no block named '{block}'"))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&info.schema())?);
    } else {
        println!("{} - {}", info.name.green().bold(), info.description);
        print_fields("input", &info.input);
        print_fields("output", &info.output);
    }
    Ok(())
}

#[::tokio::main]
async fn main() -> anyhow::Result<()> {
    let Cli { verbosity, command } = Cli::parse();

    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("blocks", level)
        .filter_module("aws_blocks_cli", level)
        .init();

    match command {
        Command::List => list(),
        Command::Schema { block, json } => schema(&block, json)?,
        Command::Run {
            block,
            input,
            input_json,
            connection,
        } => {
            let input = read_input(input, input_json)?;
            let connection = connection.into_connection()?;
            log::debug!("using {connection:?}");
            let emitted = blocks::handle_event(&connection, Event { block, input }).await?;
            println!("{}", serde_json::to_string_pretty(&emitted)?);
        }
    }

    Ok(())
}
