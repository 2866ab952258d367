//! AT86RF215 dual transceiver driver.
//! The driver never blocks. Register accesses are queued in the HAL and
//! processed from the DMA complete handler; the chip reports events on its
//! IRQ pin, which start a read of the four interrupt status registers.
//! The board calls the interrupt entry points (`external_interrupt`,
//! `dma_complete`, `timer_expired`) and `tasks` from the main loop.



mod handle;
mod pib;
mod rx;
mod tx;



pub use handle::*;
pub use pib::*;
pub use rx::*;
pub use tx::*;



use crate::common::*;
use crate::config::*;
use crate::error::{DriverError, PibResult, TxResult};
use crate::hal::{Completion, Rf215Hal};
use crate::hal::port::{AlarmId, Platform, Resources};
use crate::Status;



/// Consecutive empty interrupt status reads tolerated before the chip is
/// considered lost.
pub const EMPTY_IRQS_LIMIT: u8 = 3;



/// Completion tokens of the driver transfers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Op {
    /// Interrupt status of both transceivers and basebands.
    Irqs,

    /// Part and version numbers.
    Identity,

    /// PHY control and received frame length.
    RxLength(Trx),

    /// PHR of the received frame.
    RxPhr(Trx),

    /// Energy of the received frame.
    RxEd(Trx),

    /// Received PSDU.
    RxPsdu(Trx),

    /// Energy measured by the clear channel assessment.
    CcaEd(Trx),

    /// TX command written.
    TxStarted(Trx),
}



/// Receives the indications and confirms of the driver.
pub trait Rf215Listener {
    /// A frame was received. The PSDU is only valid during the call.
    fn rx_indication(&mut self, client: ClientHandle, indication: &RxIndication<'_>);

    /// A transmission ended. Its handle is released after the call.
    fn tx_confirm(&mut self, client: ClientHandle, handle: TxHandle, confirm: &TxConfirm, psdu: &[u8]);
}

impl Rf215Listener for () {
    fn rx_indication(&mut self, _: ClientHandle, _: &RxIndication<'_>) {}

    fn tx_confirm(&mut self, _: ClientHandle, _: TxHandle, _: &TxConfirm, _: &[u8]) {}
}



#[derive(Clone, Copy, Default)]
struct ClientObject {
    in_use: bool,
    gen: u16,
    rx_enabled: bool,
    tx_cfm_enabled: bool,
}



/// Statistics counters of a transceiver.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TrxStats {
    pub tx_total: u32,
    pub tx_total_bytes: u32,
    pub tx_err_total: u32,
    pub tx_err_busy_tx: u32,
    pub tx_err_busy_rx: u32,
    pub tx_err_busy_chn: u32,
    pub tx_err_bad_len: u32,
    pub tx_err_timeout: u32,
    pub tx_err_aborted: u32,
    pub rx_total: u32,
    pub rx_total_bytes: u32,
    pub rx_err_total: u32,
    pub rx_err_bad_len: u32,
    pub rx_err_bad_fcs: u32,
}



/// Last values written to the incrementally updated register blocks.
#[derive(Clone, Copy, Default)]
struct Shadow {
    fsk: [u8; 6],
    phrtx: [u8; 1],
    chan: [u8; 5],
    pac: [u8; 1],
}



pub(crate) struct TrxObject {
    /// Runtime configuration (PIB writes land here).
    config: TrxConfig,

    /// Enabled and present in the part.
    present: bool,

    state: TrxState,

    /// A frame is being received.
    rx_busy: bool,

    /// Start of the frame being received.
    rx_time: u64,

    /// Length of the PSDU being read.
    rx_len: usize,

    /// Energy of the last frame.
    rx_ed: i8,

    /// The last frame was FEC coded.
    rx_fec: bool,

    /// PSDU of the last frame.
    rxbuf: [u8; PSDU_MAX_LEN],

    /// TX buffer owning the transceiver.
    tx: Option<(usize, TxStage)>,

    /// On-air timeout of the current transmission.
    tx_timeout: Option<AlarmId>,

    /// Scheduled channel switch.
    switch: Option<(AlarmId, u16)>,

    shadow: Shadow,

    stats: TrxStats,
}

impl TrxObject {
    fn new(config: TrxConfig) -> Self {
        Self {
            config,
            present: false,
            state: TrxState::Off,
            rx_busy: false,
            rx_time: 0,
            rx_len: 0,
            rx_ed: EDV_INVALID,
            rx_fec: false,
            rxbuf: [0u8; PSDU_MAX_LEN],
            tx: None,
            tx_timeout: None,
            switch: None,
            shadow: Shadow::default(),
            stats: TrxStats::default(),
        }
    }
}



/// Interrupt driven driver of both RF215 transceivers.
pub struct Rf215Driver<P: Platform> {
    /// Transfer queue and board resources.
    hal: Rf215Hal<P, Op>,

    status: Status,

    /// Part and version numbers read at initialization.
    part: Option<(PartNumber, u8)>,

    /// The identity read was issued.
    identifying: bool,

    /// Consecutive empty interrupt status reads.
    empty_irqs: u8,

    trx: [TrxObject; 2],

    clients: [[ClientObject; CLIENTS_PER_TRX]; 2],

    txbufs: [TxBuffer; TX_BUFFERS],

    /// Outcomes recorded so far, orders the confirms.
    confirms: u32,
}

impl<P: Platform> Rf215Driver<P> {
    /// Creates the driver. Nothing is sent to the chip before `initialize`.
    pub fn new(resources: Resources<P>, config: Rf215Config) -> Self {
        Self {
            hal: Rf215Hal::new(resources),
            status: Status::Uninitialized,
            part: None,
            identifying: false,
            empty_irqs: 0,
            trx: [TrxObject::new(config.trx[0]), TrxObject::new(config.trx[1])],
            clients: [[ClientObject::default(); CLIENTS_PER_TRX]; 2],
            txbufs: core::array::from_fn(|_| TxBuffer::new()),
            confirms: 0,
        }
    }

    /// Resets the chip and starts the initialization. Pending transmissions
    /// are confirmed as aborted. The status is `Busy` until the chip woke up
    /// and was configured.
    pub fn initialize(&mut self) {
        self.abort_all(TxResult::Aborted);

        for t in self.trx.iter_mut() {
            t.state = TrxState::Off;
            t.rx_busy = false;
            t.present = false;

            if let Some((id, _)) = t.switch.take() {
                self.hal.cancel_alarm(id);
            }
        }

        self.part = None;
        self.identifying = false;
        self.empty_irqs = 0;
        self.status = Status::Busy;

        #[cfg(feature = "log")]
        defmt::debug!("RF215 Driver : Resetting device");

        if self.hal.reset().is_err() {
            #[cfg(feature = "log")]
            defmt::error!("RF215 Driver : Reset line failure");

            self.status = Status::Error;
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Part and version numbers of the chip.
    pub fn identity(&self) -> Option<(PartNumber, u8)> {
        self.part
    }

    /// Main loop processing: deferred transfers and TX confirms.
    pub fn tasks<L: Rf215Listener>(&mut self, listener: &mut L) {
        self.hal.tasks();
        self.deliver_confirms(listener);
    }

    /// Opens a client of a transceiver.
    pub fn open(&mut self, trx: Trx) -> Result<ClientHandle, DriverError> {
        if self.status != Status::Ready { return Err( DriverError::NotReady ) }

        if !self.trx[trx.index()].present { return Err( DriverError::InvalidTrx ) }

        let clients = &mut self.clients[trx.index()];

        let slot = clients.iter().position(|c| !c.in_use).ok_or(DriverError::NoClient)?;

        let client = &mut clients[slot];
        client.in_use = true;
        client.gen = client.gen.wrapping_add(1);
        client.rx_enabled = false;
        client.tx_cfm_enabled = false;

        Ok( ClientHandle { trx, slot: slot as u8, gen: client.gen } )
    }

    /// Closes a client. Its pending transmissions are cancelled silently.
    pub fn close(&mut self, handle: ClientHandle) {
        if self.client(handle).is_none() { return }

        for slot in 0..TX_BUFFERS {
            let buf = &mut self.txbufs[slot];

            if buf.in_use && buf.client == Some(handle) {
                buf.client = None;
                self.finish_tx(slot, TxResult::Cancelled);
            }
        }

        self.clients[handle.trx.index()][handle.slot as usize].in_use = false;
    }

    /// Enables or disables the RX indications of a client.
    pub fn rx_ind_callback_register(&mut self, handle: ClientHandle, enable: bool) -> Result<(), DriverError> {
        let client = self.client_mut(handle).ok_or(DriverError::InvalidHandle)?;
        client.rx_enabled = enable;
        Ok( () )
    }

    /// Enables or disables the TX confirms of a client.
    pub fn tx_cfm_callback_register(&mut self, handle: ClientHandle, enable: bool) -> Result<(), DriverError> {
        let client = self.client_mut(handle).ok_or(DriverError::InvalidHandle)?;
        client.tx_cfm_enabled = enable;
        Ok( () )
    }

    /// RF215 IRQ pin handler.
    pub fn external_interrupt(&mut self) {
        if self.status == Status::Uninitialized { return }

        if self.hal.irq_event() {
            self.read_irqs();
        }
    }

    /// DMA complete handler. RX indications are delivered from here.
    pub fn dma_complete<L: Rf215Listener>(&mut self, listener: &mut L) {
        let Some(done) = self.hal.dma_complete() else { return };

        if let Some(op) = done.callback {
            self.completed(op, &done, listener);
        }

        self.hal.completion_done();

        if self.hal.take_irq_pending() {
            self.read_irqs();
        }
    }

    /// System timer alarm handler.
    pub fn timer_expired(&mut self, id: AlarmId) {
        if let Some(slot) = self.txbufs.iter().position(|b| b.in_use && b.timer == Some(id)) {
            self.txbufs[slot].timer = None;
            self.launch(slot);
            return;
        }

        for trx in Trx::ALL {
            let t = &mut self.trx[trx.index()];

            if t.tx_timeout == Some(id) {
                t.tx_timeout = None;

                if let Some((slot, _)) = t.tx {
                    #[cfg(feature = "log")]
                    defmt::warn!("RF215 Driver : TX timeout on {}", trx);

                    self.finish_tx(slot, TxResult::Timeout);
                }

                return;
            }

            if let Some((alarm, channel)) = t.switch {
                if alarm == id {
                    t.switch = None;
                    let result = self.set_channel(trx, channel);

                    if result != PibResult::Success {
                        #[cfg(feature = "log")]
                        defmt::warn!("RF215 Driver : Scheduled switch to channel {=u16} failed with {}", channel, result);
                    }

                    return;
                }
            }
        }
    }

    /// System time in microseconds.
    pub fn time_us(&self) -> u64 {
        self.hal.time_us()
    }

    /// On-air duration of a frame on a transceiver.
    pub fn ppdu_duration_us(&self, trx: Trx, psdu_len: usize) -> Option<u32> {
        let t = &self.trx[trx.index()];
        t.present.then(|| t.config.phy.ppdu_duration_us(psdu_len))
    }

    /// Current channel of a transceiver.
    pub fn channel(&self, trx: Trx) -> Option<u16> {
        let t = &self.trx[trx.index()];
        t.present.then_some(t.config.channel)
    }

    /// Current band of a transceiver.
    pub fn band(&self, trx: Trx) -> Option<Band> {
        let t = &self.trx[trx.index()];
        t.present.then_some(t.config.band)
    }

    /// Current PHY configuration of a transceiver.
    pub fn phy(&self, trx: Trx) -> Option<PhyConfig> {
        let t = &self.trx[trx.index()];
        t.present.then_some(t.config.phy)
    }

    /// Statistics counters of a transceiver.
    pub fn stats(&self, trx: Trx) -> TrxStats {
        self.trx[trx.index()].stats
    }

    /// Returns `true` if the transceiver is usable.
    pub fn trx_ready(&self, trx: Trx) -> bool {
        let t = &self.trx[trx.index()];
        self.status == Status::Ready && t.present
    }
}

impl<P: Platform> Rf215Driver<P> {
    fn client(&self, handle: ClientHandle) -> Option<&ClientObject> {
        self.clients[handle.trx.index()].get(handle.slot as usize)
            .filter(|c| c.in_use && c.gen == handle.gen)
    }

    fn client_mut(&mut self, handle: ClientHandle) -> Option<&mut ClientObject> {
        self.clients[handle.trx.index()].get_mut(handle.slot as usize)
            .filter(|c| c.in_use && c.gen == handle.gen)
    }

    /// Open client handles of a transceiver.
    fn client_handles(clients: &[ClientObject; CLIENTS_PER_TRX], trx: Trx) -> impl Iterator<Item = (ClientHandle, &ClientObject)> {
        clients.iter().enumerate()
            .filter(|(_, c)| c.in_use)
            .map(move |(slot, c)| (ClientHandle { trx, slot: slot as u8, gen: c.gen }, c))
    }

    fn read_irqs(&mut self) {
        self.hal.read(Register::IrqStatus.into(), 4, Op::Irqs);
    }

    /// Queues a transceiver command. Returns `false` if it was dropped.
    fn command(&mut self, trx: Trx, command: Command) -> bool {
        self.hal.write(trx.rf(RfRegister::Command), &[command as u8])
    }

    fn completed<L: Rf215Listener>(&mut self, op: Op, done: &Completion<Op>, listener: &mut L) {
        match op {
            Op::Irqs => if let &[rf09, rf24, bbc0, bbc1] = self.hal.read_data(done) {
                self.irqs([rf09, rf24, bbc0, bbc1], done.time);
            },

            Op::Identity => if let &[pn, vn] = self.hal.read_data(done) {
                self.identified(pn, vn);
            },

            Op::RxLength(trx) => if let &[pc, _, _, low, high] = self.hal.read_data(done) {
                self.rx_length(trx, pc, (((high & 0x07) as usize) << 8) | low as usize);
            },

            Op::RxPhr(trx) => if let &[phr] = self.hal.read_data(done) {
                self.trx[trx.index()].rx_fec = phr & phrrx::SFD != 0;
            },

            Op::RxEd(trx) => if let &[ed] = self.hal.read_data(done) {
                self.trx[trx.index()].rx_ed = ed as i8;
            },

            Op::RxPsdu(trx) => {
                let data = self.hal.read_data(done);
                let len = data.len();

                self.trx[trx.index()].rxbuf[..len].copy_from_slice(data);
                self.rx_deliver(trx, len, listener);
            },

            Op::CcaEd(trx) => if let &[ed] = self.hal.read_data(done) {
                self.cca_done(trx, ed as i8);
            },

            Op::TxStarted(trx) => self.tx_started(trx, done.time),
        }
    }

    /// Interrupt status handling.
    fn irqs(&mut self, irqs: [u8; 4], time: u64) {
        if irqs == [0; 4] {
            self.empty_irqs = self.empty_irqs.saturating_add(1);

            if self.empty_irqs >= EMPTY_IRQS_LIMIT && self.status != Status::Error {
                #[cfg(feature = "log")]
                defmt::error!("RF215 Driver : No interrupt status, device lost");

                self.status = Status::Error;
            }

            return;
        }

        self.empty_irqs = 0;

        match self.status {
            Status::Busy => {
                if (irqs[0] | irqs[1]) & rfirq::WAKEUP != 0 && !self.identifying {
                    self.identifying = true;
                    self.hal.read(Register::PartNumber.into(), 2, Op::Identity);
                }
            },

            Status::Ready => for trx in Trx::ALL {
                if self.trx[trx.index()].present {
                    self.trx_irq(trx, irqs[trx.index()], irqs[2 + trx.index()], time);
                }
            },

            _ => (),
        }
    }

    fn identified(&mut self, pn: u8, vn: u8) {
        let Some(part) = PartNumber::from_byte(pn) else {
            #[cfg(feature = "log")]
            defmt::error!("RF215 Driver : Unknown part number {=u8:#04x}", pn);

            self.status = Status::Error;
            return;
        };

        self.part = Some((part, vn));

        for trx in Trx::ALL {
            let t = &mut self.trx[trx.index()];
            t.present = t.config.enabled && part.has(trx);

            if t.present {
                self.configure(trx);
            }
        }

        self.status = match self.trx.iter().any(|t| t.present) {
            true => Status::Ready,
            false => Status::Error,
        };

        #[cfg(feature = "log")]
        defmt::debug!("RF215 Driver : Device {} v{=u8} is {}", part, vn, self.status);
    }

    /// Programs a transceiver from its runtime configuration and starts
    /// listening.
    fn configure(&mut self, trx: Trx) {
        let t = &mut self.trx[trx.index()];

        let shadow = Shadow {
            fsk: t.config.phy.fsk_registers(),
            phrtx: [t.config.phy.phr_tx()],
            chan: t.config.band.channel_registers(t.config.channel),
            pac: [PAC_CURRENT | MAX_ATTENUATION],
        };

        let edd = [pib::ed_duration(t.config.cca_duration_us)];

        t.shadow = shadow;
        t.state = TrxState::Rx;

        self.rx_end(trx);

        self.hal.write(trx.rf(RfRegister::IrqMask), &[rfirq::MASK]);
        self.hal.write(trx.bbc(BbcRegister::IrqMask), &[bbirq::MASK]);
        self.hal.write(trx.bbc(BbcRegister::PhyControl), &[pc::CONFIG]);
        self.hal.write(trx.bbc(BbcRegister::FskConfig), &shadow.fsk);
        self.hal.write(trx.bbc(BbcRegister::FskPhrTx), &shadow.phrtx);
        self.hal.write(trx.rf(RfRegister::ChannelSpacing), &shadow.chan);
        self.hal.write(trx.rf(RfRegister::EdDuration), &edd);
        self.hal.write(trx.rf(RfRegister::PaControl), &shadow.pac);

        self.command(trx, Command::Rx);
    }

    /// Event handling of one transceiver.
    fn trx_irq(&mut self, trx: Trx, rf: u8, bb: u8, time: u64) {
        if rf & rfirq::WAKEUP != 0 {
            // Transceiver reset completed.
            self.abort_tx(trx, TxResult::Aborted);
            self.configure(trx);
            return;
        }

        if rf & rfirq::TRXERR != 0 {
            match self.trx[trx.index()].tx {
                Some((slot, TxStage::Prep | TxStage::OnAir)) => self.finish_tx(slot, TxResult::Underrun),

                _ if self.trx[trx.index()].rx_busy => {
                    self.trx[trx.index()].stats.rx_err_total += 1;
                    self.rx_end(trx);
                    self.command(trx, Command::Rx);
                },

                _ => (),
            }
        }

        if rf & rfirq::EDC != 0 && self.stage(trx) == Some(TxStage::Cca) {
            self.hal.read(trx.rf(RfRegister::EdValue), 1, Op::CcaEd(trx));
        }

        if rf & rfirq::TRXRDY != 0 && self.stage(trx) == Some(TxStage::Prep) {
            self.tx_on_air(trx);
        }

        if bb & bbirq::RXFS != 0 {
            self.rx_start(trx, time);
        }

        if bb & bbirq::RXFE != 0 {
            self.rx_frame_end(trx);
        }

        if bb & bbirq::TXFE != 0 {
            if let Some((slot, TxStage::OnAir)) = self.trx[trx.index()].tx {
                self.finish_tx(slot, TxResult::Success);
            }
        }
    }

    fn stage(&self, trx: Trx) -> Option<TxStage> {
        self.trx[trx.index()].tx.map(|(_, stage)| stage)
    }
}
