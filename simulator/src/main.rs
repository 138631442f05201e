use afccore::protocol::InquiryRequest;
use afccore::{AfcConfig, HttpGateway};
use anyhow::Context;
use clap::Parser;
use server::bridge::EngineServer;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::EngineScenario;
use workflow::engine::Engine;
use workflow::inquiry::{load_request, run_inquiry};

mod generator;
mod server;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Mock AFC engine and offline inquiry driver")]
struct Args {
    /// Serve the mock AFC engine until Ctrl+C
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Load the engine scenario from YAML
    #[arg(long)]
    scenario: Option<PathBuf>,
    #[arg(long, default_value = "127.0.0.1:9000")]
    bind: SocketAddr,
    /// Submit one inquiry request JSON and print the channel classification;
    /// without a file the sample request is sent
    #[arg(long, value_name = "REQUEST", num_args = 0..=1)]
    inquire: Option<Option<PathBuf>>,
    /// AFC endpoint for --inquire; defaults to the engine started by --serve
    #[arg(long)]
    endpoint: Option<String>,
    /// AFC config JSON supplying EIRP thresholds
    #[arg(long)]
    afc_config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scenario = if let Some(path) = &args.scenario {
        EngineScenario::load(path)?
    } else {
        EngineScenario::default()
    };

    let server = if args.serve {
        Some(EngineServer::spawn(Engine::new(scenario), args.bind)?)
    } else {
        None
    };

    if let Some(request_path) = &args.inquire {
        let endpoint = match (&args.endpoint, &server) {
            (Some(endpoint), _) => endpoint.clone(),
            (None, Some(server)) => server.endpoint(),
            (None, None) => format!("http://{}/{}", args.bind, server::bridge::INQUIRY_PATH),
        };
        let config = match &args.afc_config {
            Some(path) => AfcConfig::load(path)
                .with_context(|| format!("loading AFC config {}", path.display()))?,
            None => AfcConfig::default(),
        };
        let request = match request_path {
            Some(path) => load_request(path)?,
            None => InquiryRequest::sample(),
        };

        let report = run_inquiry(&HttpGateway::new(&endpoint), &config, request);
        for group in &report.classification {
            let cells: Vec<String> = group
                .channels
                .iter()
                .filter_map(|c| c.max_eirp.map(|eirp| format!("{}:{:.1}", c.name, eirp)))
                .collect();
            println!(
                "class {} ({} MHz): {}",
                group.operating_class,
                group.channel_width_mhz,
                if cells.is_empty() {
                    "-".to_string()
                } else {
                    cells.join(" ")
                }
            );
        }
        print!("Inquiry -> {}", report.summary());

        let report_path = PathBuf::from("tools/data/inquiry_report.log");
        if let Some(parent) = report_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)?;
        file.write_all(format!("endpoint={} {}", endpoint, report.summary()).as_bytes())?;
    }

    if let Some(server) = server {
        println!(
            "Mock AFC engine on {} (Ctrl+C to stop)...",
            server.endpoint()
        );
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
        let status = server.snapshot();
        println!(
            "Served {} envelopes ({} answered, {} rejected)",
            status.envelopes, status.answered, status.rejected
        );
    }

    Ok(())
}
