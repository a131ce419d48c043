//! # rfa1-radio - Cycle-Accurate ATmega128RFA1 Transceiver Model
//!
//! The rfa1-radio crate models the IEEE 802.15.4 radio built into the
//! ATmega128RFA1 microcontroller at the level firmware sees it: memory-mapped
//! registers, the `TRX_STATE` command/status state machine, the frame buffer,
//! the transceiver interrupts and the byte-by-byte over-the-air timing.
//!
//! ## Features
//!
//! - Transmit path that emits preamble, SFD, length, PSDU and FCS one byte at a time
//! - Receive path with SFD detection, address filtering and FCS checking
//! - Extended operating modes (`RX_AACK_ON`, `TX_ARET_ON`) with automatic acknowledgement
//! - Clear channel assessment, energy detection and sleep/wake timing
//! - A deterministic multi-node [`Network`] harness and JSON [`Scenario`] scripts
//!
//! ## Usage
//!
//! The model is generic over its host. Implement [`radio::Hal`] for your
//! emulator, or use the bundled [`sim::NodeHal`] and [`sim::Network`]:
//!
//! ```rust
//! use rfa1_radio::{Command, Network, RadioConfig};
//!
//! let mut net = Network::new(RadioConfig::default()).unwrap();
//! let a = net.add_node("a");
//! let b = net.add_node("b");
//! net.command(b, Command::RxOn).unwrap();
//! net.load_frame(a, &[0x41, 0x88, 0x01]).unwrap();
//! net.command(a, Command::TxStart).unwrap();
//! net.run_until_idle(200).unwrap();
//! assert!(net.node(b).unwrap().last_crc_ok());
//! ```

pub mod constants;
pub mod error;
pub mod frame;
pub mod logging;
pub mod radio;
pub mod sim;
pub mod util;

pub use crate::error::RadioError;
pub use crate::logging::{init_logger, init_logger_with_level, log_info};

// Core radio model
pub use radio::{Command, InterruptVector, Radio, RadioConfig, RadioMode, TracStatus};

// Frames
pub use frame::{Address, FrameBuilder, FrameType, ReceivedFrame};

// Simulation harness
pub use sim::{LinkQuality, Network, NodeHal, Scenario, ScenarioReport};
