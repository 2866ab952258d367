//! Host side doubles of the board collaborators.



use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::string::String;
use std::vec::Vec;

use embedded_hal::digital::{ErrorType, OutputPin};

use crate::driver::{ClientHandle, Rf215Listener, RxIndication, TxConfirm, TxHandle};
use crate::hal::port::{AlarmId, InterruptSource, Platform, Resources, SpiDma, SysTime};
use crate::pal::plc::{PlcPhy, PlcTxRequest};
use crate::pal::{PalDataConfirm, PalDataIndication, PalListener, PalScheme};
use crate::sniffer::SnifferSink;



/// Shared record of interrupt source activity.
#[derive(Clone, Default)]
pub struct IntLog(Rc<RefCell<IntState>>);

#[derive(Default)]
pub struct IntState {
    events: Vec<String>,
    enabled: HashMap<&'static str, bool>,
}

impl IntLog {
    pub fn clear(&self) {
        self.0.borrow_mut().events.clear();
    }

    pub fn events(&self) -> Vec<String> {
        self.0.borrow().events.clone()
    }

    pub fn enabled(&self, name: &str) -> bool {
        self.0.borrow().enabled.get(name).copied().unwrap_or(false)
    }

    fn set(&self, name: &'static str, enabled: bool, event: String) {
        let mut state = self.0.borrow_mut();
        state.enabled.insert(name, enabled);
        state.events.push(event);
    }
}

pub struct MockInt {
    name: &'static str,
    log: IntLog,
}

impl MockInt {
    pub fn new(name: &'static str, log: &IntLog) -> Self {
        log.0.borrow_mut().enabled.insert(name, true);
        Self { name, log: log.clone() }
    }
}

impl InterruptSource for MockInt {
    fn disable(&mut self) -> bool {
        let was = self.log.enabled(self.name);
        self.log.set(self.name, false, format!("{}-", self.name));
        was
    }

    fn restore(&mut self, enabled: bool) {
        self.log.set(self.name, enabled, format!("{}={}", self.name, enabled as u8));
    }

    fn enable(&mut self) {
        self.log.set(self.name, true, format!("{}+", self.name));
    }
}



/// Register file model of the transceiver behind the SPI bus.
#[derive(Clone, Default)]
pub struct SpiLog(Rc<RefCell<SpiState>>);

#[derive(Default)]
pub struct SpiState {
    frames: Vec<Vec<u8>>,
    memory: HashMap<u16, u8>,
    active: bool,
    polls: u32,
}

/// Interrupt status registers, cleared by reading.
const CLEAR_ON_READ: core::ops::RangeInclusive<u16> = 0x0000..=0x0003;

impl SpiLog {
    /// Every frame put on the bus, header included.
    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.0.borrow().frames.clone()
    }

    /// Writes (address, payload) put on the bus, in order.
    pub fn writes(&self) -> Vec<(u16, Vec<u8>)> {
        self.frames().into_iter()
            .filter(|f| f[0] & 0xC0 == 0x80)
            .map(|f| ((((f[0] & 0x3F) as u16) << 8) | f[1] as u16, f[2..].to_vec()))
            .collect()
    }

    /// Forgets the recorded frames.
    pub fn clear_frames(&self) {
        self.0.borrow_mut().frames.clear();
    }

    /// Transfers started but not finished.
    pub fn in_flight(&self) -> usize {
        self.0.borrow().active as usize
    }

    pub fn set(&self, address: u16, bytes: &[u8]) {
        let mut state = self.0.borrow_mut();

        for (i, b) in bytes.iter().enumerate() {
            state.memory.insert(address + i as u16, *b);
        }
    }

    pub fn get(&self, address: u16) -> u8 {
        self.0.borrow().memory.get(&address).copied().unwrap_or(0)
    }

    pub fn get_range(&self, address: u16, len: usize) -> Vec<u8> {
        (0..len).map(|i| self.get(address + i as u16)).collect()
    }
}

pub struct MockSpi(SpiLog);

impl SpiDma for MockSpi {
    fn is_busy(&self) -> bool {
        let mut state = self.0.0.borrow_mut();

        if state.active {
            state.polls += 1;

            if state.polls >= 3 {
                state.active = false;
            }
        }

        state.active
    }

    fn start(&mut self, tx: &[u8]) {
        let mut state = self.0.0.borrow_mut();
        state.frames.push(tx.to_vec());
        state.active = true;
        state.polls = 0;
    }

    fn finish(&mut self, rx: &mut [u8]) {
        let mut state = self.0.0.borrow_mut();
        state.active = false;

        let Some(frame) = state.frames.last().cloned() else { return };

        let address = (((frame[0] & 0x3F) as u16) << 8) | frame[1] as u16;
        let write = frame[0] & 0xC0 == 0x80;

        rx[..2].fill(0);

        for i in 0..frame.len().saturating_sub(2).min(rx.len().saturating_sub(2)) {
            let at = address + i as u16;

            if write {
                state.memory.insert(at, frame[i + 2]);
                rx[i + 2] = 0;
            } else {
                rx[i + 2] = state.memory.get(&at).copied().unwrap_or(0);

                if CLEAR_ON_READ.contains(&at) {
                    state.memory.insert(at, 0);
                }
            }
        }
    }
}



/// Free running counter with scripted time.
#[derive(Clone)]
pub struct TimeLog(Rc<RefCell<TimeState>>);

pub struct TimeState {
    now: u64,
    step: u64,
    freq: u32,
    reads: u64,
    next: u16,
    alarms: Vec<(AlarmId, u32)>,
    cancelled: Vec<AlarmId>,
}

impl Default for TimeLog {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(TimeState {
            now: 0,
            step: 1,
            freq: 32_000_000,
            reads: 0,
            next: 0,
            alarms: Vec::new(),
            cancelled: Vec::new(),
        })))
    }
}

impl TimeLog {
    pub fn set_now(&self, now: u64) {
        self.0.borrow_mut().now = now;
    }

    /// Ticks added on every counter read.
    pub fn set_step(&self, step: u64) {
        self.0.borrow_mut().step = step;
    }

    pub fn set_frequency(&self, freq: u32) {
        self.0.borrow_mut().freq = freq;
    }

    pub fn reads(&self) -> u64 {
        self.0.borrow().reads
    }

    /// Alarms scheduled and not cancelled, with their delay.
    pub fn alarms(&self) -> Vec<(AlarmId, u32)> {
        let state = self.0.borrow();
        state.alarms.iter().filter(|(id, _)| !state.cancelled.contains(id)).copied().collect()
    }

    pub fn cancelled(&self) -> Vec<AlarmId> {
        self.0.borrow().cancelled.clone()
    }
}

pub struct MockTime(TimeLog);

impl SysTime for MockTime {
    fn counter(&self) -> u64 {
        let mut state = self.0.0.borrow_mut();
        state.now = state.now.wrapping_add(state.step);
        state.reads += 1;
        state.now
    }

    fn frequency_hz(&self) -> u32 {
        self.0.0.borrow().freq
    }

    fn alarm(&mut self, delay_us: u32) -> Option<AlarmId> {
        let mut state = self.0.0.borrow_mut();

        let id = AlarmId(state.next);
        state.next = state.next.wrapping_add(1);
        state.alarms.push((id, delay_us));

        Some(id)
    }

    fn cancel(&mut self, id: AlarmId) {
        self.0.0.borrow_mut().cancelled.push(id);
    }
}



/// Output pin level history.
#[derive(Clone, Default)]
pub struct PinLog(Rc<RefCell<Vec<bool>>>);

impl PinLog {
    pub fn history(&self) -> Vec<bool> {
        self.0.borrow().clone()
    }

    pub fn state(&self) -> bool {
        self.0.borrow().last().copied().unwrap_or(false)
    }
}

pub struct MockPin(PinLog);

impl ErrorType for MockPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.0.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.0.borrow_mut().push(true);
        Ok(())
    }
}



/// Host platform built from the doubles above.
pub struct Sim;

impl Platform for Sim {
    type Spi = MockSpi;
    type Time = MockTime;
    type Pin = MockPin;
    type Int = MockInt;
}

/// Test side handles on the simulated board.
pub struct Board {
    pub spi: SpiLog,
    pub time: TimeLog,
    pub reset: PinLog,
    pub led_rx: PinLog,
    pub led_tx: PinLog,
    pub ints: IntLog,
}

pub fn board() -> (Resources<Sim>, Board) {
    let board = Board {
        spi: SpiLog::default(),
        time: TimeLog::default(),
        reset: PinLog::default(),
        led_rx: PinLog::default(),
        led_tx: PinLog::default(),
        ints: IntLog::default(),
    };

    let resources = Resources {
        spi: MockSpi(board.spi.clone()),
        time: MockTime(board.time.clone()),
        reset: MockPin(board.reset.clone()),
        led_rx: Some(MockPin(board.led_rx.clone())),
        led_tx: Some(MockPin(board.led_tx.clone())),
        dma_int: MockInt::new("dma", &board.ints),
        timer_int: MockInt::new("timer", &board.ints),
        aux_int: MockInt::new("aux", &board.ints),
        irq_int: MockInt::new("irq", &board.ints),
    };

    (resources, board)
}



/// PLC PHY double recording transmissions.
#[derive(Default)]
pub struct MockPlc {
    pub sent: Vec<(Vec<u8>, PlcTxRequest)>,
    pub ready: bool,
    pub refuse: bool,
    pub snr: u8,
    /// 64 bit PHY time in microseconds.
    pub timer: u64,
    pub zct: u32,
    pub channel: u16,
    pub cd: bool,
    pub nl: u8,
    pub agc: u8,
    pub configuration: HashMap<u16, Vec<u8>>,
}

impl PlcPhy for MockPlc {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn transmit(&mut self, psdu: &[u8], request: &PlcTxRequest) -> bool {
        if self.refuse { return false }

        self.sent.push((psdu.to_vec(), *request));
        true
    }

    fn snr(&self) -> u8 {
        self.snr
    }

    fn zct(&self) -> u32 {
        self.zct
    }

    fn timer(&self) -> u32 {
        self.timer as u32
    }

    fn timer_extended(&self) -> u64 {
        self.timer
    }

    fn carrier_detect(&self) -> bool {
        self.cd
    }

    fn noise_level(&self) -> u8 {
        self.nl
    }

    fn agc(&self) -> u8 {
        self.agc
    }

    fn set_agc(&mut self, agc: u8) -> bool {
        self.agc = agc;
        true
    }

    fn channel(&self) -> u16 {
        self.channel
    }

    fn set_channel(&mut self, channel: u16) -> bool {
        if channel > 8 { return false }

        self.channel = channel;
        true
    }

    fn get_configuration(&self, id: u16, out: &mut [u8]) -> Option<usize> {
        let value = self.configuration.get(&id)?;

        if out.len() < value.len() { return None }

        out[..value.len()].copy_from_slice(value);
        Some(value.len())
    }

    fn set_configuration(&mut self, id: u16, value: &[u8]) -> bool {
        self.configuration.insert(id, value.to_vec());
        true
    }

    fn msg_duration(&self, len: usize, _request: &PlcTxRequest) -> u32 {
        len as u32 * 100
    }
}



/// Sniffer sink double.
#[derive(Default)]
pub struct MockSink {
    pub frames: VecDeque<Vec<u8>>,
    pub refuse: bool,
}

impl SnifferSink for MockSink {
    fn write(&mut self, frame: &[u8]) -> bool {
        if self.refuse { return false }

        self.frames.push_back(frame.to_vec());
        true
    }
}



/// Driver listener recording every indication and confirm.
#[derive(Default)]
pub struct Events {
    /// Client, PSDU, RSSI and start time.
    pub rx: Vec<(ClientHandle, Vec<u8>, i8, u64)>,

    pub cfm: Vec<(ClientHandle, TxHandle, TxConfirm, Vec<u8>)>,
}

impl Rf215Listener for Events {
    fn rx_indication(&mut self, client: ClientHandle, indication: &RxIndication<'_>) {
        self.rx.push((client, indication.psdu.to_vec(), indication.rssi_dbm, indication.time_ini_us));
    }

    fn tx_confirm(&mut self, client: ClientHandle, handle: TxHandle, confirm: &TxConfirm, psdu: &[u8]) {
        self.cfm.push((client, handle, *confirm, psdu.to_vec()));
    }
}



/// PAL listener recording every confirm and indication.
#[derive(Default)]
pub struct PalEvents {
    pub cfm: Vec<PalDataConfirm>,

    /// Physical channel, PSDU, scheme and LQI.
    pub ind: Vec<(u16, Vec<u8>, PalScheme, u8)>,
}

impl PalListener for PalEvents {
    fn data_confirm(&mut self, confirm: &PalDataConfirm) {
        self.cfm.push(*confirm);
    }

    fn data_indication(&mut self, indication: &PalDataIndication<'_>) {
        self.ind.push((indication.pch, indication.psdu.to_vec(), indication.scheme, indication.lqi));
    }
}
