//! Operator CLI for the inference gateway.

use clap::{Parser, Subcommand};
use serde_json::Value;

use inference_gateway::trace::{Emitter, IdGenerator, TraceContext, Tracer};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the inference gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness
    Ping,
    /// Send an invocation, optionally under an existing trace
    Invoke {
        /// Input text for the model
        #[arg(long)]
        inputs: String,

        /// Trace ID to attach (bare `1-xxxxxxxx-...` form)
        #[arg(long)]
        trace_id: Option<String>,
    },
    /// Emit a synthetic trace straight at the local daemon
    Probe {
        /// Daemon datagram address
        #[arg(long, default_value = "127.0.0.1:2000")]
        daemon: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Ping => {
            let res = client.get(format!("{}/ping", cli.url)).send().await?;
            println!("{}", res.status());
        }
        Commands::Invoke { inputs, trace_id } => {
            let mut request = client
                .post(format!("{}/invocations", cli.url))
                .json(&serde_json::json!({ "inputs": inputs }));
            if let Some(trace_id) = trace_id {
                request = request.header("X-Amzn-Trace-Id", format!("Root={}", trace_id));
            }
            let res = request.send().await?;
            print_response(res).await?;
        }
        Commands::Probe { daemon } => {
            let emitter = Emitter::udp(daemon.parse()?).await?;
            let tracer = Tracer::new(emitter, IdGenerator::random(), "gateway-cli");
            let trace_id = tracer.ids().new_trace_id();
            let ctx = TraceContext::with_trace_id(trace_id.clone(), tracer.ids());

            let result: Result<(), String> = tracer
                .trace(&ctx, "probe", None, || async { Ok(()) })
                .await;
            result.expect("probe work cannot fail");
            tracer.finalize(&ctx, true, None).await;

            println!("emitted probe trace {trace_id}");
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
