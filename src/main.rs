use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vishing_trainer::config::{Config, LogFormat};
use vishing_trainer::error::SessionError;
use vishing_trainer::provider::{prosecutor_agent_request, ElevenLabsClient};
use vishing_trainer::scenario::prosecutor;

/// Provisioning CLI for the voice-phishing training agent.
#[derive(Parser, Debug)]
#[command(name = "vishing-trainer", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage the hosted conversational agent
    Agent {
        #[command(subcommand)]
        command: AgentCommands,
    },

    /// Fetch a signed websocket URL for starting a call
    SignedUrl,

    /// Work with the scenario workflow graph
    Workflow {
        #[command(subcommand)]
        command: WorkflowCommands,
    },
}

#[derive(Subcommand, Debug)]
enum AgentCommands {
    /// Create the prosecutor agent (conversation config + workflow graph)
    Create,

    /// Push the current definition onto an existing agent
    Update,

    /// Print the hosted agent definition
    Show,
}

#[derive(Subcommand, Debug)]
enum WorkflowCommands {
    /// Print the workflow graph in provider wire form
    Export {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    match cli.command {
        Commands::Agent { command } => {
            let client = ElevenLabsClient::new(&config.elevenlabs, config.request.clone())?;
            match command {
                AgentCommands::Create => {
                    let request = prosecutor_agent_request()?;
                    let response = client.create_agent(&request).await?;
                    info!(agent_id = %response.agent_id, "Agent created");
                    println!("{}", response.agent_id);
                }
                AgentCommands::Update => {
                    let agent_id = require_agent_id(&config)?;
                    let request = prosecutor_agent_request()?;
                    client.update_agent(&agent_id, &request).await?;
                    info!(agent_id = %agent_id, "Agent updated");
                }
                AgentCommands::Show => {
                    let agent_id = require_agent_id(&config)?;
                    let definition = client.get_agent(&agent_id).await?;
                    println!("{}", serde_json::to_string_pretty(&definition)?);
                }
            }
        }
        Commands::SignedUrl => {
            let client = ElevenLabsClient::new(&config.elevenlabs, config.request.clone())?;
            let agent_id = require_agent_id(&config)?;
            let response = client.get_signed_url(&agent_id).await?;
            println!("{}", response.signed_url);
        }
        Commands::Workflow { command } => match command {
            WorkflowCommands::Export { pretty } => {
                let workflow = match prosecutor::build_graph() {
                    Ok(graph) => graph.to_workflow(),
                    Err(e) => {
                        error!(error = %e, "Workflow graph failed validation");
                        return Err(e.into());
                    }
                };
                let json = if pretty {
                    serde_json::to_string_pretty(&workflow)?
                } else {
                    serde_json::to_string(&workflow)?
                };
                println!("{}", json);
            }
        },
    }

    Ok(())
}

fn require_agent_id(config: &Config) -> Result<String, SessionError> {
    config
        .elevenlabs
        .agent_id
        .clone()
        .ok_or_else(|| SessionError::NotConfigured {
            message: "ELEVENLABS_AGENT_ID is not set".to_string(),
        })
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
