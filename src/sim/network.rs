//! # Simulated Network
//!
//! Drives several radios on one shared medium with a single discrete-event
//! clock measured in MCU cycles.
//!
//! ```text
//!            ┌──────────────── EventQueue ────────────────┐
//!            │ TxByte (rank 0) │ Radio (1) │ RxTick (2)   │
//!            └──────┬──────────────┬────────────┬─────────┘
//!                   v              v            v
//!          tx_next_byte()       fire()    rx_next_byte(lock, byte)
//!                   │                           ^
//!                   └──> Transmission.bytes ────┘
//! ```
//!
//! Each registered transmitter is polled once per byte-time, starting after
//! its PLL lead time. Each registered receiver ticks once per byte-time. An
//! unlocked receiver captures the earliest-started audible transmission on
//! its channel and follows it byte by byte until that transmission ends;
//! the tick after the last byte reports the lock as lost. Overlapping
//! transmissions do not corrupt each other. A finished transmission is
//! forgotten once no receiver is still following it.

use super::memory::RegisterMemory;
use super::node::{MediumRequest, NodeHal};
use super::queue::EventQueue;
use crate::constants::*;
use crate::error::RadioError;
use crate::frame::{Address, FrameType, ReceivedFrame, MAX_PSDU_LEN};
use crate::radio::{Command, Radio, RadioConfig, RadioEvent, RegisterFile, RxState};
use crate::util::logging::log_frame_structured;
use std::collections::{BTreeMap, HashMap};

const TX_RANK: u8 = 0;
const EVENT_RANK: u8 = 1;
const RX_RANK: u8 = 2;

/// Per-link channel conditions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkQuality {
    /// Signal level seen by the receiver
    pub rssi_dbm: f64,
    /// Bit error rate reported for every delivered byte
    pub ber: f64,
}

impl Default for LinkQuality {
    fn default() -> Self {
        Self {
            rssi_dbm: -60.0,
            ber: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SimEvent {
    TxByte { node: usize, tx: usize },
    RxTick { node: usize, epoch: u64 },
    Radio { node: usize, event: RadioEvent },
}

/// One frame on the air
#[derive(Debug, Clone)]
struct Transmission {
    node: usize,
    frequency_mhz: f64,
    started_at: u64,
    bytes: Vec<u8>,
    active: bool,
}

#[derive(Debug, Clone, Copy)]
struct Lock {
    tx: usize,
    /// Index of the next byte to deliver
    next: usize,
}

#[derive(Debug, Clone, Copy)]
struct Listener {
    frequency_mhz: f64,
    epoch: u64,
    lock: Option<Lock>,
}

/// Single-shot corruption of one on-air byte
#[derive(Debug, Clone, Copy)]
struct Corruption {
    node: usize,
    byte_index: usize,
    mask: u8,
}

/// A set of radios sharing one medium
pub struct Network {
    config: RadioConfig,
    cycles_per_byte: u64,
    now: u64,
    nodes: Vec<Radio<NodeHal>>,
    names: Vec<String>,
    /// Entries of each node's medium log already applied
    medium_cursor: Vec<usize>,
    current_tx: Vec<Option<usize>>,
    listeners: Vec<Option<Listener>>,
    rx_epoch: Vec<u64>,
    /// Explicit link settings; `None` blocks the link
    links: HashMap<(usize, usize), Option<LinkQuality>>,
    default_link: LinkQuality,
    /// Frames on the air or still followed by a receiver, by id
    transmissions: BTreeMap<usize, Transmission>,
    next_tx: usize,
    corruptions: Vec<Corruption>,
    queue: EventQueue<SimEvent>,
}

impl Network {
    /// Create an empty network
    pub fn new(config: RadioConfig) -> Result<Self, RadioError> {
        config.validate()?;
        Ok(Self {
            cycles_per_byte: config.cycles_per_byte(),
            config,
            now: 0,
            nodes: Vec::new(),
            names: Vec::new(),
            medium_cursor: Vec::new(),
            current_tx: Vec::new(),
            listeners: Vec::new(),
            rx_epoch: Vec::new(),
            links: HashMap::new(),
            default_link: LinkQuality::default(),
            transmissions: BTreeMap::new(),
            next_tx: 0,
            corruptions: Vec::new(),
            queue: EventQueue::new(),
        })
    }

    /// Add a radio in TRX_OFF and return its index
    pub fn add_node(&mut self, name: impl Into<String>) -> usize {
        let index = self.nodes.len();
        let config = RadioConfig {
            seed: self.config.seed.wrapping_add(index as u64),
            ..self.config
        };
        let mut hal = NodeHal::new();
        hal.now = self.now;
        self.nodes.push(Radio::new(hal, config));
        self.names.push(name.into());
        self.medium_cursor.push(0);
        self.current_tx.push(None);
        self.listeners.push(None);
        self.rx_epoch.push(0);
        self.sync(index);
        log::debug!("Added node {index} ({})", self.names[index]);
        index
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn now_us(&self) -> f64 {
        self.config.cycles_to_us(self.now)
    }

    pub fn cycles_per_byte(&self) -> u64 {
        self.cycles_per_byte
    }

    pub fn config(&self) -> &RadioConfig {
        &self.config
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, node: usize) -> Result<&Radio<NodeHal>, RadioError> {
        self.nodes.get(node).ok_or(RadioError::UnknownNode(node))
    }

    pub fn name(&self, node: usize) -> Result<&str, RadioError> {
        self.names
            .get(node)
            .map(String::as_str)
            .ok_or(RadioError::UnknownNode(node))
    }

    pub fn read_register(&self, node: usize, addr: u16) -> Result<u8, RadioError> {
        RegisterMemory::check_register(addr)?;
        Ok(self.node(node)?.read_register(addr))
    }

    /// Parse the frame left in a node's receive buffer
    pub fn received_frame(&self, node: usize) -> Result<ReceivedFrame, RadioError> {
        let hal = self.node(node)?.hal();
        let length = hal.read_data_byte(TST_RX_LENGTH);
        let buffer = hal.registers.read_block(TRXFBST, FRAME_BUFFER_LEN as usize);
        ReceivedFrame::from_buffer(length, &buffer)
    }

    // ------------------------------------------------------------------
    // Firmware actions
    // ------------------------------------------------------------------

    /// Run `f` against a node at the current time, then apply whatever it
    /// asked of the medium and the scheduler.
    fn with_node<R>(
        &mut self,
        node: usize,
        f: impl FnOnce(&mut Radio<NodeHal>) -> R,
    ) -> Result<R, RadioError> {
        let now = self.now;
        let radio = self.nodes.get_mut(node).ok_or(RadioError::UnknownNode(node))?;
        radio.hal_mut().now = now;
        let result = f(radio);
        self.sync(node);
        Ok(result)
    }

    /// Firmware write to a transceiver register
    pub fn write_register(&mut self, node: usize, addr: u16, value: u8) -> Result<u8, RadioError> {
        RegisterMemory::check_register(addr)?;
        self.with_node(node, |radio| radio.write_register(addr, value))
    }

    /// Issue a state command through `TRX_STATE` (CCA through `PHY_CC_CCA`)
    pub fn command(&mut self, node: usize, cmd: Command) -> Result<(), RadioError> {
        match cmd.code() {
            Some(code) => {
                self.write_register(node, TRX_STATE, code)?;
            }
            None => {
                let cca = self.read_register(node, PHY_CC_CCA)?;
                self.write_register(node, PHY_CC_CCA, cca | PHY_CC_CCA_REQUEST)?;
            }
        }
        Ok(())
    }

    /// Drive the SLPTR line
    pub fn set_sleep_pin(&mut self, node: usize, high: bool) -> Result<(), RadioError> {
        let trxpr = self.read_register(node, TRXPR)?;
        let value = if high {
            trxpr | TRXPR_SLPTR
        } else {
            trxpr & !TRXPR_SLPTR
        };
        self.write_register(node, TRXPR, value)?;
        Ok(())
    }

    /// Place a PSDU (without FCS) in a node's frame buffer
    pub fn load_frame(&mut self, node: usize, psdu: &[u8]) -> Result<(), RadioError> {
        if psdu.len() + 2 > MAX_PSDU_LEN {
            return Err(RadioError::FrameTooLong(psdu.len() + 2));
        }
        self.with_node(node, |radio| radio.hal_mut().load_frame(psdu))
    }

    /// Program PAN id, short address and IEEE address
    pub fn set_identity(
        &mut self,
        node: usize,
        pan_id: u16,
        short_addr: u16,
        ieee_addr: u64,
    ) -> Result<(), RadioError> {
        let pan = pan_id.to_le_bytes();
        let short = short_addr.to_le_bytes();
        self.write_register(node, PAN_ID_0, pan[0])?;
        self.write_register(node, PAN_ID_1, pan[1])?;
        self.write_register(node, SHORT_ADDR_0, short[0])?;
        self.write_register(node, SHORT_ADDR_1, short[1])?;
        for (i, byte) in ieee_addr.to_le_bytes().into_iter().enumerate() {
            self.write_register(node, IEEE_ADDR_0 + i as u16, byte)?;
        }
        Ok(())
    }

    /// Select an IEEE 802.15.4 channel (11..=26)
    pub fn set_channel(&mut self, node: usize, channel: u8) -> Result<(), RadioError> {
        if !(FIRST_CHANNEL..=26).contains(&channel) {
            return Err(RadioError::InvalidConfig(format!("channel {channel} outside 11..=26")));
        }
        let cca = self.read_register(node, PHY_CC_CCA)?;
        let value = (cca & PHY_CC_CCA_MODE_MASK) | channel;
        self.write_register(node, PHY_CC_CCA, value)?;
        Ok(())
    }

    /// Set `PHY_TX_PWR[3:0]`
    pub fn set_tx_power(&mut self, node: usize, setting: u8) -> Result<(), RadioError> {
        let pwr = self.read_register(node, PHY_TX_PWR)?;
        self.write_register(node, PHY_TX_PWR, (pwr & !PHY_TX_PWR_MASK) | (setting & PHY_TX_PWR_MASK))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Channel conditions
    // ------------------------------------------------------------------

    /// Conditions for signals from `from` heard at `to`
    pub fn set_link(&mut self, from: usize, to: usize, quality: LinkQuality) {
        self.links.insert((from, to), Some(quality));
    }

    /// Make `from` inaudible at `to`
    pub fn block_link(&mut self, from: usize, to: usize) {
        self.links.insert((from, to), None);
    }

    /// Conditions for links without an explicit setting
    pub fn set_default_link(&mut self, quality: LinkQuality) {
        self.default_link = quality;
    }

    fn link(&self, from: usize, to: usize) -> Option<LinkQuality> {
        self.links
            .get(&(from, to))
            .copied()
            .unwrap_or(Some(self.default_link))
    }

    /// XOR `mask` into byte `byte_index` (counting from the first preamble
    /// byte) of the next transmission from `node` that gets that far
    pub fn corrupt_byte(&mut self, node: usize, byte_index: usize, mask: u8) -> Result<(), RadioError> {
        self.node(node)?;
        self.corruptions.push(Corruption {
            node,
            byte_index,
            mask,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    /// Process every event due up to and including `deadline`
    pub fn run_until(&mut self, deadline: u64) {
        while let Some((time, event)) = self.queue.pop_due(deadline) {
            self.now = time;
            self.dispatch(event);
        }
        self.now = self.now.max(deadline);
    }

    pub fn run_for_bytes(&mut self, bytes: u64) {
        self.run_until(self.now + bytes * self.cycles_per_byte);
    }

    pub fn run_for_us(&mut self, us: u64) {
        self.run_until(self.now + self.config.us_to_cycles(us));
    }

    /// Nothing on the air, no timed event pending and every receiver back
    /// to scanning
    pub fn is_idle(&self) -> bool {
        let on_air = self.transmissions.values().any(|t| t.active);
        let pending = self
            .queue
            .any(|e| !matches!(e, SimEvent::RxTick { .. }));
        let receiving = self.nodes.iter().zip(&self.listeners).any(|(radio, listener)| {
            let locked = listener.map_or(false, |l| l.lock.is_some());
            let busy = radio.is_receiving()
                && !matches!(radio.rx_state(), RxState::SfdScan | RxState::Overflow);
            locked || busy
        });
        !(on_air || pending || receiving)
    }

    /// Run until [`is_idle`](Self::is_idle), at most `limit_bytes`
    /// byte-times. Returns the cycles elapsed.
    pub fn run_until_idle(&mut self, limit_bytes: u64) -> Result<u64, RadioError> {
        let start = self.now;
        let deadline = start + limit_bytes * self.cycles_per_byte;
        while !self.is_idle() {
            if self.now >= deadline {
                return Err(RadioError::Busy(limit_bytes));
            }
            self.run_until((self.now + self.cycles_per_byte).min(deadline));
        }
        Ok(self.now - start)
    }

    // ------------------------------------------------------------------
    // Event handling
    // ------------------------------------------------------------------

    fn dispatch(&mut self, event: SimEvent) {
        match event {
            SimEvent::TxByte { node, tx } => self.transmit_byte(node, tx),
            SimEvent::RxTick { node, epoch } => self.receive_tick(node, epoch),
            SimEvent::Radio { node, event } => {
                log::debug!("{} fires {}", self.names[node], event.name());
                // Nodes are never removed
                let _ = self.with_node(node, |radio| radio.fire(event));
            }
        }
    }

    fn transmit_byte(&mut self, node: usize, tx: usize) {
        if self.current_tx[node] != Some(tx) {
            return;
        }
        self.nodes[node].hal_mut().now = self.now;
        let mut byte = self.nodes[node].tx_next_byte();

        let index = self.transmissions.get(&tx).map_or(0, |t| t.bytes.len());
        if let Some(pos) = self
            .corruptions
            .iter()
            .position(|c| c.node == node && c.byte_index == index)
        {
            let corruption = self.corruptions.remove(pos);
            log::info!(
                "Corrupting byte {index} from {}: 0x{byte:02X} ^ 0x{:02X}",
                self.names[node],
                corruption.mask
            );
            byte ^= corruption.mask;
        }
        if let Some(transmission) = self.transmissions.get_mut(&tx) {
            transmission.bytes.push(byte);
        }

        self.sync(node);
        if self.current_tx[node] == Some(tx) {
            self.queue
                .push_ranked(self.now + self.cycles_per_byte, TX_RANK, SimEvent::TxByte { node, tx });
        }
    }

    fn receive_tick(&mut self, node: usize, epoch: u64) {
        match self.listeners[node] {
            Some(listener) if listener.epoch == epoch => {}
            _ => return,
        }

        if let Some((locked, byte, link)) = self.sample_channel(node) {
            let radio = &mut self.nodes[node];
            radio.hal_mut().now = self.now;
            if let Some(link) = link {
                radio.set_signal_level(link.rssi_dbm);
                radio.record_bit_error(link.ber);
            }
            radio.rx_next_byte(locked, byte);
            self.sync(node);
        }

        if matches!(self.listeners[node], Some(l) if l.epoch == epoch) {
            self.queue.push_ranked(
                self.now + self.cycles_per_byte,
                RX_RANK,
                SimEvent::RxTick { node, epoch },
            );
        }
    }

    /// What the receiver of `node` hears this byte-time. `None` while the
    /// followed transmission has no new byte yet.
    fn sample_channel(&mut self, node: usize) -> Option<(bool, u8, Option<LinkQuality>)> {
        let listener = self.listeners[node]?;

        if let Some(Lock { tx, next }) = listener.lock {
            let Some(transmission) = self.transmissions.get(&tx) else {
                self.set_lock(node, None);
                return Some((false, 0, None));
            };
            if let Some(&byte) = transmission.bytes.get(next) {
                let link = self.link(transmission.node, node);
                self.set_lock(node, Some(Lock { tx, next: next + 1 }));
                return Some((true, byte, link));
            }
            if transmission.active {
                return None;
            }
            log::trace!("{} released lock", self.names[node]);
            self.set_lock(node, None);
            self.prune_transmissions();
            return Some((false, 0, None));
        }

        let candidate = self
            .transmissions
            .iter()
            .filter(|(_, t)| {
                t.active
                    && t.node != node
                    && !t.bytes.is_empty()
                    && (t.frequency_mhz - listener.frequency_mhz).abs() < 0.5
                    && self.link(t.node, node).is_some()
            })
            .min_by_key(|(_, t)| t.started_at)
            .map(|(&id, t)| (id, t.bytes.len() - 1, t.bytes[t.bytes.len() - 1], t.node));

        match candidate {
            Some((tx, index, byte, sender)) => {
                let link = self.link(sender, node);
                log::trace!(
                    "{} locked onto {} at byte {index}",
                    self.names[node],
                    self.names[sender]
                );
                self.set_lock(node, Some(Lock { tx, next: index + 1 }));
                Some((true, byte, link))
            }
            None => Some((false, 0, None)),
        }
    }

    fn set_lock(&mut self, node: usize, lock: Option<Lock>) {
        if let Some(listener) = self.listeners[node].as_mut() {
            listener.lock = lock;
        }
    }

    /// Drop finished transmissions that no receiver is following.
    fn prune_transmissions(&mut self) {
        let followed: Vec<usize> = self
            .listeners
            .iter()
            .filter_map(|l| l.and_then(|l| l.lock).map(|lock| lock.tx))
            .collect();
        self.transmissions
            .retain(|id, t| t.active || followed.contains(id));
    }

    /// Queue the events a node scheduled and apply its medium requests.
    fn sync(&mut self, node: usize) {
        let now = self.now;
        for (event, delay) in self.nodes[node].hal_mut().take_outbox() {
            self.queue
                .push_ranked(now + delay, EVENT_RANK, SimEvent::Radio { node, event });
        }

        let log = &self.nodes[node].hal().medium_log;
        let requests: Vec<MediumRequest> = log[self.medium_cursor[node]..]
            .iter()
            .map(|&(_, request)| request)
            .collect();
        self.medium_cursor[node] = log.len();

        for request in requests {
            self.apply_medium_request(node, request);
        }
    }

    fn apply_medium_request(&mut self, node: usize, request: MediumRequest) {
        match request {
            MediumRequest::BeginTransmit {
                frequency_mhz,
                lead_cycles,
                power_dbm,
            } => {
                let tx = self.next_tx;
                self.next_tx += 1;
                let first_byte_at = self.now + lead_cycles;
                self.transmissions.insert(
                    tx,
                    Transmission {
                        node,
                        frequency_mhz,
                        started_at: first_byte_at,
                        bytes: Vec::new(),
                        active: true,
                    },
                );
                self.current_tx[node] = Some(tx);
                self.queue
                    .push_ranked(first_byte_at, TX_RANK, SimEvent::TxByte { node, tx });
                log::debug!(
                    "{} transmitting at {power_dbm} dBm on {frequency_mhz} MHz from cycle {first_byte_at}",
                    self.names[node]
                );
            }
            MediumRequest::EndTransmit => {
                let finished = self.current_tx[node].take();
                if let Some(transmission) = finished.and_then(|tx| self.transmissions.get_mut(&tx)) {
                    transmission.active = false;
                    // SHR and PHR precede the PSDU
                    let psdu = transmission.bytes.get(6..).unwrap_or(&[]);
                    if log::log_enabled!(log::Level::Debug) {
                        let frame_type =
                            psdu.first().map(|&fcf| FrameType::from_bits(fcf).name());
                        let mut image = psdu.to_vec();
                        image.push(0);
                        let source = match ReceivedFrame::from_buffer(psdu.len() as u8, &image) {
                            Ok(ReceivedFrame {
                                src: Address::Short(addr),
                                ..
                            }) => Some(addr),
                            _ => None,
                        };
                        log_frame_structured(&self.names[node], psdu, frame_type, source);
                    }
                }
                self.prune_transmissions();
            }
            MediumRequest::BeginReceive { frequency_mhz } => {
                self.rx_epoch[node] += 1;
                let epoch = self.rx_epoch[node];
                self.listeners[node] = Some(Listener {
                    frequency_mhz,
                    epoch,
                    lock: None,
                });
                self.queue.push_ranked(
                    self.now + self.cycles_per_byte,
                    RX_RANK,
                    SimEvent::RxTick { node, epoch },
                );
            }
            MediumRequest::EndReceive => {
                self.listeners[node] = None;
                self.prune_transmissions();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radio::{InterruptVector, RadioMode};

    fn network() -> Network {
        Network::new(RadioConfig::default()).unwrap()
    }

    #[test]
    fn test_unknown_node() {
        let mut net = network();
        assert!(matches!(net.command(3, Command::RxOn), Err(RadioError::UnknownNode(3))));
    }

    #[test]
    fn test_register_range_checked() {
        let mut net = network();
        let a = net.add_node("a");
        assert!(matches!(
            net.write_register(a, 0x10, 1),
            Err(RadioError::RegisterOutOfRange(0x10))
        ));
        assert_eq!(net.write_register(a, SHORT_ADDR_0, 0x42).unwrap(), 0x42);
    }

    #[test]
    fn test_transmission_timing() {
        let mut net = network();
        let a = net.add_node("a");
        net.load_frame(a, &[0x41, 0x88, 0x01]).unwrap();
        net.command(a, Command::TxStart).unwrap();

        let cpb = net.cycles_per_byte();
        let lead = net.config().lead_cycles(0);
        // 4 preamble + SFD + PHR + 3 PSDU + 2 FCS
        net.run_until(lead + 10 * cpb - 1);
        assert!(net.node(a).unwrap().is_transmitting());
        net.run_until(lead + 10 * cpb);
        let radio = net.node(a).unwrap();
        assert_eq!(radio.mode(), RadioMode::PllOn);
        assert_eq!(radio.hal().interrupts, vec![(lead + 10 * cpb, InterruptVector::TxEnd)]);
    }

    #[test]
    fn test_finished_frames_forgotten_after_last_listener() {
        let mut net = network();
        let a = net.add_node("a");
        let b = net.add_node("b");
        net.command(b, Command::RxOn).unwrap();

        let cpb = net.cycles_per_byte();
        let lead = net.config().lead_cycles(0);
        for round in 0..3u8 {
            let start = net.now();
            net.load_frame(a, &[0x41, 0x88, round]).unwrap();
            net.command(a, Command::TxStart).unwrap();

            // Sender done, receiver still following the last byte
            net.run_until(start + lead + 10 * cpb);
            assert_eq!(net.transmissions.len(), 1);
            assert!(net.transmissions.values().all(|t| !t.active));

            net.run_until_idle(100).unwrap();
            assert!(net.transmissions.is_empty());
            assert!(net.node(b).unwrap().last_crc_ok());
        }
        assert_eq!(net.next_tx, 3);
    }

    #[test]
    fn test_unheard_frame_dropped_at_end() {
        let mut net = network();
        let a = net.add_node("a");
        net.load_frame(a, &[0x41, 0x88, 0x01]).unwrap();
        net.command(a, Command::TxStart).unwrap();
        net.run_until_idle(100).unwrap();
        assert!(net.transmissions.is_empty());
    }

    #[test]
    fn test_blocked_link_not_heard() {
        let mut net = network();
        let a = net.add_node("a");
        let b = net.add_node("b");
        net.block_link(a, b);
        net.command(b, Command::RxOn).unwrap();
        net.load_frame(a, &[0x41, 0x88, 0x01]).unwrap();
        net.command(a, Command::TxStart).unwrap();
        net.run_until_idle(100).unwrap();
        assert!(net.node(b).unwrap().hal().interrupts.is_empty());
    }

    #[test]
    fn test_different_channel_not_heard() {
        let mut net = network();
        let a = net.add_node("a");
        let b = net.add_node("b");
        net.set_channel(a, 15).unwrap();
        net.set_channel(b, 20).unwrap();
        net.command(b, Command::RxOn).unwrap();
        net.load_frame(a, &[0x41, 0x88, 0x01]).unwrap();
        net.command(a, Command::TxStart).unwrap();
        net.run_until_idle(100).unwrap();
        assert!(net.node(b).unwrap().hal().interrupts.is_empty());
        assert!(net.set_channel(a, 27).is_err());
    }

    #[test]
    fn test_run_until_idle_gives_up() {
        let mut net = network();
        let a = net.add_node("a");
        net.load_frame(a, &[0u8; 100]).unwrap();
        net.command(a, Command::TxStart).unwrap();
        assert!(matches!(net.run_until_idle(5), Err(RadioError::Busy(5))));
    }

    #[test]
    fn test_load_frame_too_long() {
        let mut net = network();
        let a = net.add_node("a");
        assert!(matches!(
            net.load_frame(a, &[0u8; 126]),
            Err(RadioError::FrameTooLong(128))
        ));
    }
}
