use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rfa1_radio::radio::crc::Crc16;
use rfa1_radio::sim::scenario;
use rfa1_radio::constants::{FRAME_BUFFER_LEN, TRXFBST};
use rfa1_radio::util::{decode_hex, encode_hex, pretty_hex};
use rfa1_radio::{init_logger_with_level, log_info, Network, Scenario, ScenarioReport};

#[derive(Parser)]
#[command(name = "rfa1-sim")]
#[command(about = "Cycle-accurate ATmega128RFA1 radio simulator")]
struct Cli {
    /// Default log filter when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in two-node acknowledged transfer
    Demo {
        #[arg(long)]
        json: bool,
        /// Hex dump every node's frame buffer afterwards
        #[arg(long)]
        dump_buffers: bool,
    },
    /// Run a JSON scenario file
    Run {
        file: PathBuf,
        #[arg(long)]
        json: bool,
        #[arg(long)]
        dump_buffers: bool,
    },
    /// Print the demo scenario as JSON, a starting point for new scripts
    DumpDemo,
    /// Compute the on-air FCS of a hex-encoded PSDU (without FCS)
    Fcs { psdu: String },
}

fn print_report(report: &ScenarioReport, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("Failed to serialise report")?;
        println!("{text}");
    } else {
        print!("{report}");
    }
    Ok(())
}

fn dump_buffers(network: &Network) -> Result<()> {
    for index in 0..network.node_count() {
        let radio = network.node(index)?;
        let buffer = radio
            .hal()
            .registers
            .read_block(TRXFBST, FRAME_BUFFER_LEN as usize);
        println!("{} frame buffer:", network.name(index)?);
        println!("{}", pretty_hex(&buffer, 16));
    }
    Ok(())
}

fn execute(scenario: &Scenario, json: bool, dump: bool) -> Result<()> {
    let network = scenario.execute()?;
    let report: ScenarioReport = scenario::report(&network)?;
    print_report(&report, json)?;
    if dump {
        dump_buffers(&network)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger_with_level(&cli.log_level);

    match cli.command {
        Commands::Demo { json, dump_buffers } => {
            execute(&scenario::demo(), json, dump_buffers).context("Demo scenario failed")?;
        }
        Commands::Run {
            file,
            json,
            dump_buffers,
        } => {
            let scenario = Scenario::from_json_file(&file)
                .with_context(|| format!("Failed to load scenario {}", file.display()))?;
            log_info(&format!(
                "Running {} with {} nodes and {} steps",
                file.display(),
                scenario.nodes.len(),
                scenario.steps.len()
            ));
            execute(&scenario, json, dump_buffers)
                .with_context(|| format!("Scenario {} failed", file.display()))?;
        }
        Commands::DumpDemo => {
            let text = serde_json::to_string_pretty(&scenario::demo())
                .context("Failed to serialise demo scenario")?;
            println!("{text}");
        }
        Commands::Fcs { psdu } => {
            let bytes = decode_hex(&psdu).context("PSDU is not valid hex")?;
            let mut crc = Crc16::default();
            for &byte in &bytes {
                crc.push(byte);
            }
            println!("{}", encode_hex(&crc.wire_bytes()));
        }
    }

    Ok(())
}
