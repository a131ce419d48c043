//! # Scenario Scripts
//!
//! JSON description of a small network and a list of firmware actions,
//! replayed against a [`Network`]. Frames are given as hex strings.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "name": "coordinator", "pan_id": 43981, "short_addr": 1, "channel": 26 },
//!     { "name": "sensor", "pan_id": 43981, "short_addr": 2, "channel": 26 }
//!   ],
//!   "steps": [
//!     { "action": "command", "node": 1, "command": "RX_AACK_ON" },
//!     { "action": "load_frame", "node": 0, "frame": "61 88 2a cd ab 02 00 01 00 de ad" },
//!     { "action": "command", "node": 0, "command": "TX_ARET_ON" },
//!     { "action": "sleep_pin", "node": 0, "high": true },
//!     { "action": "run_until_idle", "limit_bytes": 200 }
//!   ]
//! }
//! ```

use super::network::{LinkQuality, Network};
use crate::constants::{FIRST_CHANNEL, TRX_STATE};
use crate::error::RadioError;
use crate::radio::{Command, PendingAck, RadioConfig, TracStatus};
use crate::util::hex::decode_hex;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_channel() -> u8 {
    FIRST_CHANNEL
}

/// A radio taking part in the scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub pan_id: u16,
    #[serde(default)]
    pub short_addr: u16,
    #[serde(default)]
    pub ieee_addr: u64,
    #[serde(default = "default_channel")]
    pub channel: u8,
    /// `PHY_TX_PWR[3:0]`
    #[serde(default)]
    pub tx_power: u8,
}

/// Channel conditions from one node to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub from: usize,
    pub to: usize,
    #[serde(default = "default_rssi")]
    pub rssi_dbm: f64,
    #[serde(default)]
    pub ber: f64,
    /// Link is inaudible
    #[serde(default)]
    pub blocked: bool,
}

fn default_rssi() -> f64 {
    LinkQuality::default().rssi_dbm
}

/// One firmware action or a stretch of simulated time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// State command by datasheet name
    Command { node: usize, command: String },
    /// PSDU without FCS, as hex
    LoadFrame { node: usize, frame: String },
    WriteRegister { node: usize, addr: u16, value: u8 },
    SleepPin { node: usize, high: bool },
    /// Flip bits of one on-air byte of the node's next transmission
    Corrupt { node: usize, byte: usize, mask: u8 },
    Run { bytes: u64 },
    RunUs { us: u64 },
    RunUntilIdle { limit_bytes: u64 },
}

/// A complete scenario script
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: RadioConfig,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    pub steps: Vec<Step>,
}

/// Final state of one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeReport {
    pub name: String,
    pub mode: String,
    pub trac_status: Option<String>,
    pub ack: String,
    pub last_crc_ok: bool,
    /// (microseconds, vector name)
    pub interrupts: Vec<(f64, String)>,
    /// Last received frame, if the receive buffer parses
    pub received: Option<String>,
}

/// Outcome of a scenario run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub elapsed_us: f64,
    pub nodes: Vec<NodeReport>,
}

impl std::fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Simulated {:.1} us", self.elapsed_us)?;
        for node in &self.nodes {
            writeln!(
                f,
                "{}: mode={} trac={} ack={} crc_ok={}",
                node.name,
                node.mode,
                node.trac_status.as_deref().unwrap_or("-"),
                node.ack,
                node.last_crc_ok
            )?;
            for (us, name) in &node.interrupts {
                writeln!(f, "  {us:>10.1} us  {name}")?;
            }
            if let Some(frame) = &node.received {
                writeln!(f, "  received {frame}")?;
            }
        }
        Ok(())
    }
}

impl Scenario {
    pub fn from_json_str(json: &str) -> Result<Self, RadioError> {
        let scenario: Scenario = serde_json::from_str(json)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RadioError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check node references and command names before running anything
    pub fn validate(&self) -> Result<(), RadioError> {
        self.config.validate()?;
        if self.nodes.is_empty() {
            return Err(RadioError::Scenario("no nodes".to_string()));
        }
        let check = |node: usize| {
            if node < self.nodes.len() {
                Ok(())
            } else {
                Err(RadioError::UnknownNode(node))
            }
        };
        for link in &self.links {
            check(link.from)?;
            check(link.to)?;
        }
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                Step::Command { node, command } => {
                    check(*node)?;
                    if Command::from_name(command).is_none() {
                        return Err(RadioError::Scenario(format!(
                            "step {i}: unknown command {command:?}"
                        )));
                    }
                }
                Step::LoadFrame { node, .. }
                | Step::WriteRegister { node, .. }
                | Step::SleepPin { node, .. }
                | Step::Corrupt { node, .. } => check(*node)?,
                Step::Run { .. } | Step::RunUs { .. } | Step::RunUntilIdle { .. } => {}
            }
        }
        Ok(())
    }

    /// Build the network described by the scenario
    pub fn build_network(&self) -> Result<Network, RadioError> {
        let mut network = Network::new(self.config)?;
        for spec in &self.nodes {
            let node = network.add_node(spec.name.clone());
            network.set_identity(node, spec.pan_id, spec.short_addr, spec.ieee_addr)?;
            network.set_channel(node, spec.channel)?;
            network.set_tx_power(node, spec.tx_power)?;
        }
        for link in &self.links {
            if link.blocked {
                network.block_link(link.from, link.to);
            } else {
                network.set_link(
                    link.from,
                    link.to,
                    LinkQuality {
                        rssi_dbm: link.rssi_dbm,
                        ber: link.ber,
                    },
                );
            }
        }
        Ok(network)
    }

    /// Apply one step
    pub fn apply(network: &mut Network, step: &Step) -> Result<(), RadioError> {
        match step {
            Step::Command { node, command } => {
                let cmd = Command::from_name(command)
                    .ok_or_else(|| RadioError::Scenario(format!("unknown command {command:?}")))?;
                network.command(*node, cmd)
            }
            Step::LoadFrame { node, frame } => {
                let psdu = decode_hex(frame)?;
                network.load_frame(*node, &psdu)
            }
            Step::WriteRegister { node, addr, value } => {
                network.write_register(*node, *addr, *value).map(|_| ())
            }
            Step::SleepPin { node, high } => network.set_sleep_pin(*node, *high),
            Step::Corrupt { node, byte, mask } => network.corrupt_byte(*node, *byte, *mask),
            Step::Run { bytes } => {
                network.run_for_bytes(*bytes);
                Ok(())
            }
            Step::RunUs { us } => {
                network.run_for_us(*us);
                Ok(())
            }
            Step::RunUntilIdle { limit_bytes } => network.run_until_idle(*limit_bytes).map(|_| ()),
        }
    }

    /// Run every step and hand back the network for inspection
    pub fn execute(&self) -> Result<Network, RadioError> {
        let mut network = self.build_network()?;
        for (i, step) in self.steps.iter().enumerate() {
            log::debug!("Step {i}: {step:?}");
            Self::apply(&mut network, step)?;
        }
        Ok(network)
    }

    /// Run every step and report the final state of each node
    pub fn run(&self) -> Result<ScenarioReport, RadioError> {
        report(&self.execute()?)
    }
}

/// Summarise the state of every node
pub fn report(network: &Network) -> Result<ScenarioReport, RadioError> {
    let config = network.config();
    let mut nodes = Vec::with_capacity(network.node_count());
    for index in 0..network.node_count() {
        let radio = network.node(index)?;
        let trac = TracStatus::from_register(radio.read_register(TRX_STATE));
        let ack = match radio.pending_ack() {
            PendingAck::NotRequested => "none",
            PendingAck::Awaiting => "awaiting",
            PendingAck::Succeeded => "success",
            PendingAck::Failed => "no-ack",
        };
        let received = network.received_frame(index).ok().map(|frame| {
            format!(
                "dsn={} dst={} src={} payload={} lqi={} crc={}",
                frame.dsn,
                frame.dst,
                frame.src,
                crate::util::hex::format_hex_compact(&frame.payload),
                frame.lqi & 0x7F,
                if frame.crc_valid { "ok" } else { "bad" }
            )
        });
        nodes.push(NodeReport {
            name: network.name(index)?.to_string(),
            mode: radio.mode().to_string(),
            trac_status: trac.map(|t| format!("{t:?}")),
            ack: ack.to_string(),
            last_crc_ok: radio.last_crc_ok(),
            interrupts: radio
                .hal()
                .interrupts
                .iter()
                .map(|&(cycle, vector)| (config.cycles_to_us(cycle), vector.name().to_string()))
                .collect(),
            received,
        });
    }
    Ok(ScenarioReport {
        elapsed_us: network.now_us(),
        nodes,
    })
}

/// Built-in scenario: one acknowledged data frame between two nodes
pub fn demo() -> Scenario {
    let node = |name: &str, short_addr: u16| NodeSpec {
        name: name.to_string(),
        pan_id: 0xABCD,
        short_addr,
        ieee_addr: 0x0011_2233_4455_6600 | short_addr as u64,
        channel: 26,
        tx_power: 0,
    };
    let command = |node: usize, command: &str| Step::Command {
        node,
        command: command.to_string(),
    };
    Scenario {
        config: RadioConfig::default(),
        nodes: vec![node("coordinator", 0x0001), node("sensor", 0x0002)],
        links: Vec::new(),
        steps: vec![
            command(1, "RX_AACK_ON"),
            Step::LoadFrame {
                node: 0,
                frame: "61 88 2a cd ab 02 00 01 00 de ad be ef".to_string(),
            },
            command(0, "TX_ARET_ON"),
            // SLPTR rising edge, as firmware starts an extended-mode frame
            Step::SleepPin { node: 0, high: true },
            Step::RunUntilIdle { limit_bytes: 200 },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::RadioMode;

    #[test]
    fn test_demo_succeeds() {
        let report = demo().run().unwrap();
        assert_eq!(report.nodes[0].ack, "success");
        assert_eq!(report.nodes[0].mode, RadioMode::TxAretOn.to_string());
        assert_eq!(report.nodes[0].trac_status.as_deref(), Some("Success"));
        assert!(report.nodes[1].last_crc_ok);
        assert!(report.nodes[1].received.as_deref().unwrap_or("").contains("crc=ok"));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{
            "nodes": [{ "name": "a", "pan_id": 1 }, { "name": "b" }],
            "links": [{ "from": 0, "to": 1, "ber": 0.001 }],
            "steps": [
                { "action": "command", "node": 1, "command": "rx_on" },
                { "action": "load_frame", "node": 0, "frame": "41 88 01" },
                { "action": "corrupt", "node": 0, "byte": 7, "mask": 1 },
                { "action": "run", "bytes": 10 }
            ]
        }"#;
        let scenario = Scenario::from_json_str(json).unwrap();
        assert_eq!(scenario.nodes[1].channel, 11);
        assert_eq!(scenario.links[0].rssi_dbm, -60.0);
        assert_eq!(scenario.config, RadioConfig::default());
        assert_eq!(
            scenario.steps[2],
            Step::Corrupt {
                node: 0,
                byte: 7,
                mask: 1
            }
        );
    }

    #[test]
    fn test_validation_errors() {
        let unknown_node = r#"{ "nodes": [{ "name": "a" }], "steps": [{ "action": "sleep_pin", "node": 2, "high": true }] }"#;
        assert!(matches!(
            Scenario::from_json_str(unknown_node),
            Err(RadioError::UnknownNode(2))
        ));

        let bad_command = r#"{ "nodes": [{ "name": "a" }], "steps": [{ "action": "command", "node": 0, "command": "JUMP" }] }"#;
        assert!(matches!(
            Scenario::from_json_str(bad_command),
            Err(RadioError::Scenario(_))
        ));

        let no_nodes = r#"{ "nodes": [], "steps": [] }"#;
        assert!(Scenario::from_json_str(no_nodes).is_err());

        assert!(matches!(
            Scenario::from_json_str("{"),
            Err(RadioError::Json(_))
        ));
    }

    #[test]
    fn test_bad_hex_frame() {
        let json = r#"{ "nodes": [{ "name": "a" }], "steps": [{ "action": "load_frame", "node": 0, "frame": "abc" }] }"#;
        let scenario = Scenario::from_json_str(json).unwrap();
        assert!(matches!(scenario.run(), Err(RadioError::Hex(_))));
    }

    #[test]
    fn test_json_round_trip_of_demo() {
        let json = serde_json::to_string(&demo()).unwrap();
        assert_eq!(Scenario::from_json_str(&json).unwrap(), demo());
    }

    #[test]
    fn test_report_display() {
        let text = demo().run().unwrap().to_string();
        assert!(text.contains("coordinator: mode=TX_ARET_ON"));
        assert!(text.contains("TRX24_TX_END"));
    }
}
