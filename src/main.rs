//! blockcoach - a hint-ladder coach for block-based code
//!
//! Sends a screenshot of the student's blocks to a vision-language model,
//! then walks the student through vague-to-specific hints and questions.

use anyhow::Result;
use blockcoach::coach::{CodeImage, Event, HttpGateway, Session};
use blockcoach::{app, config, keyring};
use clap::Parser;
use std::io::{self, BufRead};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "blockcoach",
    about = "Coach a student through block-based code with graduated hints",
    version
)]
struct Args {
    /// Screenshot of the student's block code (PNG or JPEG); assessed on startup
    #[arg(short, long)]
    image: Option<PathBuf>,

    /// Problem statement (defaults to the configured problem)
    #[arg(short, long)]
    problem: Option<String>,

    /// Override the model server endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Override the model id
    #[arg(long)]
    model: Option<String>,

    /// Store an API key for the model server in the system keychain
    #[arg(long)]
    setup: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if args.setup {
        return setup_api_key();
    }

    let mut config = config::Config::load();
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    let gateway = HttpGateway::from_config(&config)?;
    info!(endpoint = gateway.endpoint(), model = %config.model, "model gateway ready");

    let mut session = Session::from_config(&config);
    if let Some(problem) = args.problem {
        session = session.handle(&gateway, Event::SetProblem(problem)).await?;
    }

    let stdout = io::stdout();
    if let Some(path) = args.image {
        let image = CodeImage::from_path(&path)?;
        eprintln!("Assessing {}...", path.display());
        let event = Event::Initialize {
            problem: None,
            image: Some(image),
        };
        match session.handle(&gateway, event).await {
            Ok(next) => {
                session = next;
                let view = session.view();
                println!("[Code Assessment]\n{}", view.assessment_body);
                println!("[Coach Hint] (level={})\n{}", view.level, view.current_hint);
            }
            Err(err) => eprintln!("error: {}", err),
        }
    }

    app::run(&gateway, session, io::stdin().lock(), stdout.lock()).await
}

fn setup_api_key() -> Result<()> {
    eprintln!("Paste the API key for your model server and press Enter:");
    let mut key = String::new();
    io::stdin().lock().read_line(&mut key)?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("No API key entered");
    }
    keyring::set_api_key(key).map_err(|e| anyhow::anyhow!("{}", e))?;
    eprintln!("  + API key saved to the system keychain.");
    Ok(())
}
