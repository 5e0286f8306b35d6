use clap::{Parser, Subcommand};
use prompt_chain::ai::client::OpenAiClient;
use prompt_chain::config::Config;
use prompt_chain::core::handlers::{handle_chain, handle_validate};
use prompt_chain::core::types::{ChainRequest, ValidationRequest};
use prompt_chain::orchestrator::ChainOrchestrator;
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "prompt-chain", version, about = "Two-step prompt chaining with structured-output schema checks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a JSON Schema against the structured-outputs subset
    Validate {
        /// Schema file; reads stdin when omitted
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },
    /// Run a chain described by a JSON request document
    Run {
        #[arg(short, long)]
        request: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::from_env()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { schema } => {
            let schema_text = match schema {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let res = handle_validate(&ValidationRequest { schema_text });
            print_json(&res.body)?;
            Ok(exit_code(res.is_success()))
        }
        Command::Run { request } => {
            let request: ChainRequest = serde_json::from_str(&std::fs::read_to_string(request)?)?;
            let orchestrator = ChainOrchestrator::new(OpenAiClient::new(&config)?, config);

            log::info!("🔗 Running chain");
            let res = handle_chain(&orchestrator, &request).await;
            if !res.is_success() {
                log::warn!("chain finished with status {}", res.status);
            }
            print_json(&res.body)?;
            Ok(exit_code(res.is_success()))
        }
    }
}

fn print_json<T: Serialize>(body: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}

fn exit_code(success: bool) -> ExitCode {
    if success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
