//! gateway - command line front end for the LLM gateway
//!
//! Reads configuration from the environment (and `.env`), sends one request and prints the
//! answer followed by usage and cost.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::debug;

use llm_gateway::{
    ChatMessage, ChatRequest, GatewayConfig, ImageInput, Manager, RequestContext, VisionRequest,
    init_logging,
};

#[derive(Parser, Debug)]
#[command(name = "gateway", version, about = "Multi-provider LLM gateway")]
struct Cli {
    /// Abort the request after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send a chat completion
    Chat {
        /// Prompt text
        #[arg(required = true)]
        prompt: Vec<String>,
        #[arg(long)]
        system: Option<String>,
        /// Override the provider's default model
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        max_tokens: Option<u32>,
        #[arg(long)]
        temperature: Option<f32>,
        /// Print the answer as it streams in
        #[arg(long)]
        stream: bool,
    },
    /// Ask a vision-capable provider about an image
    Analyze {
        /// Local image file
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value = "Describe this image.")]
        prompt: String,
        #[arg(long)]
        model: Option<String>,
    },
    /// Probe every configured provider and print its health
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match GatewayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(&config.logging);

    let manager = match Manager::from_config(config) {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut context = RequestContext::new();
    if let Some(secs) = cli.timeout {
        context = context.with_timeout(Duration::from_secs(secs));
    }
    let token = context.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let result = run(&manager, cli.command, &context).await;
    if let Err(e) = manager.close().await {
        debug!(error = %e, "Provider close failed");
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(
    manager: &Manager,
    command: Command,
    context: &RequestContext,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Chat {
            prompt,
            system,
            model,
            max_tokens,
            temperature,
            stream,
        } => {
            let mut messages = Vec::new();
            if let Some(system) = system {
                messages.push(ChatMessage::system(system));
            }
            messages.push(ChatMessage::user(prompt.join(" ")));

            let mut request = ChatRequest::new(messages);
            if let Some(model) = model {
                request = request.with_model(model);
            }
            if let Some(max_tokens) = max_tokens {
                request = request.with_max_tokens(max_tokens);
            }
            if let Some(temperature) = temperature {
                request = request.with_temperature(temperature);
            }

            if stream {
                chat_stream(manager, request, context).await
            } else {
                let response = manager.chat(request, context).await?;
                println!("{}", response.content);
                println!();
                println!(
                    "provider: {}  model: {}  tokens: {} in / {} out  cost: ${:.6}  latency: {}ms",
                    response.provider,
                    response.model,
                    response.usage.prompt_tokens,
                    response.usage.completion_tokens,
                    response.cost,
                    response.latency.as_millis()
                );
                Ok(())
            }
        }
        Command::Analyze {
            image,
            prompt,
            model,
        } => {
            let bytes = tokio::fs::read(&image).await?;
            let input = ImageInput::from_bytes(media_type(&image), &bytes);
            let mut request = VisionRequest::new(prompt, vec![input]);
            if let Some(model) = model {
                request = request.with_model(model);
            }

            let response = manager.analyze(request, context).await?;
            println!("{}", response.content);
            println!();
            println!(
                "provider: {}  model: {}  tokens: {}  cost: ${:.6}",
                response.provider, response.model, response.usage.total_tokens, response.cost
            );
            Ok(())
        }
        Command::Health => {
            manager.probe_health_now().await;
            let health = manager.get_all_provider_health();
            for name in manager.provider_names() {
                if let Some(record) = health.get(&name) {
                    println!(
                        "{:<12} {:<10} failures: {}  avg latency: {}ms",
                        name,
                        format!("{:?}", record.status()),
                        record.health_check_failures,
                        record.average_latency.as_millis()
                    );
                }
            }
            Ok(())
        }
    }
}

async fn chat_stream(
    manager: &Manager,
    request: ChatRequest,
    context: &RequestContext,
) -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;

    let (sender, mut receiver) = mpsc::channel::<llm_gateway::ChatStreamResponse>(64);
    let printer = tokio::spawn(async move {
        let mut stdout = std::io::stdout();
        while let Some(element) = receiver.recv().await {
            if let Some(error) = &element.error {
                let _ = writeln!(stdout);
                eprintln!("[{} failed: {}]", element.provider, error);
            } else if !element.done {
                let _ = write!(stdout, "{}", element.content);
                let _ = stdout.flush();
            }
        }
        let _ = writeln!(stdout);
    });

    let result = manager.chat_stream(request, context, sender).await;
    printer.await?;

    let summary = result?;
    let tokens = summary
        .usage
        .map(|u| format!("{} in / {} out", u.prompt_tokens, u.completion_tokens))
        .unwrap_or_else(|| "unreported".to_string());
    println!(
        "provider: {}  model: {}  chunks: {}  tokens: {}  cost: ${:.6}",
        summary.provider, summary.model, summary.chunks, tokens, summary.cost
    );
    Ok(())
}

fn media_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
