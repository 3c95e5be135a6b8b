use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hotschema_api::{OrchestrationClient, resolve_password};
use hotschema_gen::{Fragments, compile_catalog};
use hotschema_types::ResourceTypeCatalog;
use tracing::{Level, info};

/// Compile OpenStack Heat resource type catalogs into a template JSON Schema.
#[derive(Parser, Debug)]
#[command(name = "hotschema", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download resource type definitions from a running OpenStack instance
    Download {
        /// Output path for the resource type catalog
        output: PathBuf,

        /// Keystone identity endpoint, e.g. http://controller:5000/v3
        #[arg(long)]
        keystone_url: String,

        /// Login user name
        #[arg(long)]
        username: String,

        /// Login password; falls back to the OS_PASSWORD environment variable
        #[arg(long)]
        password: Option<String>,

        /// Project id to scope the token to (unscoped tokens often come
        /// without a service catalog)
        #[arg(long)]
        project_id: Option<String>,
    },

    /// Convert a resource type catalog into the template JSON Schema
    Generate {
        /// Input path to the resource type catalog (JSON or YAML)
        input: PathBuf,

        /// Output path for the generated schema
        output: PathBuf,

        /// Replace the embedded template fragment
        #[arg(long)]
        template_fragment: Option<PathBuf>,

        /// Replace the embedded resource fragment
        #[arg(long)]
        resource_fragment: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    match Cli::parse().command {
        Command::Download {
            output,
            keystone_url,
            username,
            password,
            project_id,
        } => download(output, keystone_url, username, password, project_id).await,
        Command::Generate {
            input,
            output,
            template_fragment,
            resource_fragment,
        } => generate(input, output, template_fragment, resource_fragment),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .try_init();
}

async fn download(
    output: PathBuf,
    keystone_url: String,
    username: String,
    password: Option<String>,
    project_id: Option<String>,
) -> Result<()> {
    let password = resolve_password(password)?;
    let client =
        OrchestrationClient::login(&keystone_url, &username, &password, project_id.as_deref()).await?;
    let catalog = client.download_catalog().await?;
    info!(count = catalog.resource_types.len(), "downloaded resource types");
    write_pretty_json(&output, &serde_json::to_value(&catalog).context("serialize catalog")?)
}

fn generate(
    input: PathBuf,
    output: PathBuf,
    template_fragment: Option<PathBuf>,
    resource_fragment: Option<PathBuf>,
) -> Result<()> {
    let text = fs::read_to_string(&input).with_context(|| format!("read {}", input.display()))?;
    let catalog = parse_catalog(&text)?;

    let mut fragments = Fragments::embedded()?;
    if let Some(path) = template_fragment {
        fragments.template = read_fragment(&path)?;
    }
    if let Some(path) = resource_fragment {
        fragments.resource = read_fragment(&path)?;
    }

    let schema = compile_catalog(&catalog, fragments)?;
    write_pretty_json(&output, &schema)
}

/// Catalogs may be YAML or JSON; YAML is tried first since JSON parses as
/// YAML anyway.
fn parse_catalog(text: &str) -> Result<ResourceTypeCatalog> {
    if let Ok(yaml) = serde_yaml::from_str::<serde_yaml::Value>(text) {
        let value = serde_json::to_value(yaml).context("convert yaml catalog to json")?;
        serde_json::from_value(value).context("decode resource type catalog")
    } else {
        serde_json::from_str(text).context("decode resource type catalog")
    }
}

fn read_fragment(path: &Path) -> Result<serde_json::Value> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse fragment {}", path.display()))
}

fn write_pretty_json(output: &Path, value: &serde_json::Value) -> Result<()> {
    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let json = serde_json::to_vec_pretty(value).context("serialize document")?;
    fs::write(output, &json).with_context(|| format!("write {}", output.display()))?;
    println!("wrote {} bytes to {}", json.len(), output.display());
    Ok(())
}
