use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use parley::voice::{CaptureError, SpeechCapture, SpeechSynthesis, STATUS_CLEAR_DELAY};
use parley::{ApiServer, ChatController, Config, GeminiClient, RelayClient};

/// Parley - voice chat relay for conversational language practice
#[derive(Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long, env = "PARLEY_PORT")]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Send one prompt through a running relay and print the reply
    Chat {
        /// Relay base URL
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,

        /// Prompt to send
        #[arg(default_value = "Hello, how are you?")]
        prompt: String,
    },
    /// Try known model/API-version combinations against the upstream
    ProbeUpstream,
    /// Interactive console conversation through a running relay
    Talk {
        /// Relay base URL
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,parley=info",
        1 => "info,parley=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Chat { url, prompt } => chat_once(&url, &prompt).await,
            Command::ProbeUpstream => probe_upstream().await,
            Command::Talk { url } => talk(&url).await,
        };
    }

    serve(cli.port).await
}

/// Run the relay server
async fn serve(port_override: Option<u16>) -> anyhow::Result<()> {
    let mut config = Config::load();
    if let Some(port) = port_override {
        config.server.port = port;
    }

    // Fail fast: never serve chat traffic without the upstream credential
    config.require_api_key()?;

    tracing::info!(
        port = config.server.port,
        model = %config.upstream.model,
        "starting parley relay"
    );

    ApiServer::from_config(&config).run().await?;

    Ok(())
}

/// One-shot round trip through a running relay
async fn chat_once(url: &str, prompt: &str) -> anyhow::Result<()> {
    println!("Sending: \"{prompt}\"");

    let client = RelayClient::new(url);
    let reply = client
        .chat(prompt)
        .await
        .map_err(|e| anyhow::anyhow!("relay round trip failed: {e}"))?;

    println!("AI: {reply}");
    Ok(())
}

/// Model/version combinations worth probing, newest first
const PROBE_COMBOS: [(&str, &str); 4] = [
    ("gemini-1.5-flash", "v1"),
    ("gemini-1.5-flash", "v1beta"),
    ("gemini-pro", "v1"),
    ("gemini-pro", "v1beta"),
];

/// Probe the upstream directly to find a working model/version pair
async fn probe_upstream() -> anyhow::Result<()> {
    let config = Config::load();
    let key = config.require_api_key()?.clone();

    for (model, api_version) in PROBE_COMBOS {
        println!("Probing {model} ({api_version})...");

        let client = GeminiClient::with_base_url(
            key.clone(),
            model.to_string(),
            api_version.to_string(),
            config.upstream.base_url.clone(),
        );

        match client.generate("Say hello").await {
            Ok(text) => {
                let preview: String = text.chars().take(50).collect();
                println!("  ok: {preview}...");
                println!("\nWorking configuration: model={model} api_version={api_version}");
                return Ok(());
            }
            Err(e) => println!("  failed: {e}"),
        }
    }

    anyhow::bail!("no working model/version combination found; check your API key")
}

/// Interactive console conversation driving the chat controller
///
/// Typed lines stand in for speech capture and printed replies for
/// synthesis, so the full turn sequencing can be exercised without audio
/// hardware.
async fn talk(url: &str) -> anyhow::Result<()> {
    println!("Connected to relay at {url}");
    println!("Type a line and press enter to \"speak\"; Ctrl-D to quit.\n");

    let capture = Arc::new(ConsoleCapture::default());
    let mut controller = ChatController::new(
        capture.clone(),
        Arc::new(ConsolePlayback),
        Arc::new(RelayClient::new(url)),
    );

    loop {
        if controller.press() {
            controller.run_turn().await;
        }

        if capture.reached_eof() {
            println!("\nBye!");
            return Ok(());
        }

        println!("[{}]", controller.status());

        if controller.has_transient_error() {
            tokio::time::sleep(STATUS_CLEAR_DELAY).await;
            controller.clear_transient_status();
        }
    }
}

/// Console stand-in for a speech capture session
#[derive(Default)]
struct ConsoleCapture {
    eof: AtomicBool,
}

impl ConsoleCapture {
    fn reached_eof(&self) -> bool {
        self.eof.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl SpeechCapture for ConsoleCapture {
    async fn capture(&self) -> Result<String, CaptureError> {
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(b"You: ")
            .await
            .map_err(|e| CaptureError::Other(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| CaptureError::Other(e.to_string()))?;

        let mut line = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        match stdin.read_line(&mut line).await {
            Ok(0) => {
                self.eof.store(true, Ordering::Relaxed);
                Err(CaptureError::Other("end of input".to_string()))
            }
            Ok(_) => {
                let text = line.trim();
                if text.is_empty() {
                    Err(CaptureError::NoSpeech)
                } else {
                    Ok(text.to_string())
                }
            }
            Err(e) => Err(CaptureError::Other(e.to_string())),
        }
    }
}

/// Console stand-in for speech synthesis
struct ConsolePlayback;

#[async_trait]
impl SpeechSynthesis for ConsolePlayback {
    fn cancel(&self) {}

    async fn speak(&self, text: &str) -> parley::Result<()> {
        println!("AI: {text}");
        Ok(())
    }
}
