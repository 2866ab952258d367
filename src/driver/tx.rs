//! Frame transmission.
//! A request owns a TX buffer until its confirm is delivered from `tasks`.
//! On a transceiver, at most one buffer goes through CCA, TXPREP and TX.



use super::*;



/// Start time of a transmission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum TxTime {
    /// As soon as possible.
    Immediate,

    /// Delay from the request, in microseconds.
    Relative(u32),

    /// Start on the driver time base, in microseconds.
    Absolute(u64),
}

/// Clear channel assessment before a transmission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum CcaMode {
    /// Transmit unconditionally.
    Off,

    /// Single energy detection against the configured threshold.
    EnergyDetect,
}



#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TxRequest {
    pub time: TxTime,

    pub cca: CcaMode,

    /// Power amplifier attenuation in dB (0 to 31).
    pub attenuation: u8,

    /// Convolutional FEC for this frame, signalled to receivers by the SFD.
    pub fec: bool,
}

impl Default for TxRequest {
    fn default() -> Self {
        Self { time: TxTime::Immediate, cca: CcaMode::Off, attenuation: 0, fec: false }
    }
}



/// Outcome of a transmission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TxConfirm {
    pub result: TxResult,

    /// Time the TX command was issued, in microseconds.
    pub time_ini_us: u64,

    /// On-air duration of the frame.
    pub ppdu_duration_us: u32,
}



pub(crate) struct TxBuffer {
    pub(super) in_use: bool,
    pub(super) gen: u16,

    /// Requesting client. Cleared when the client closes.
    pub(super) client: Option<ClientHandle>,

    pub(super) trx: Trx,
    pub(super) request: TxRequest,
    pub(super) len: usize,
    pub(super) psdu: [u8; PSDU_MAX_LEN],

    /// Alarm of a scheduled start.
    pub(super) timer: Option<AlarmId>,

    /// Set when the outcome is known. Delivered and released in `tasks`.
    pub(super) cfm_pending: bool,

    /// Order in which the outcomes became known.
    pub(super) seq: u32,

    pub(super) confirm: TxConfirm,
}

impl TxBuffer {
    pub(super) const fn new() -> Self {
        Self {
            in_use: false,
            gen: 0,
            client: None,
            trx: Trx::Rf09,
            request: TxRequest { time: TxTime::Immediate, cca: CcaMode::Off, attenuation: 0, fec: false },
            len: 0,
            psdu: [0u8; PSDU_MAX_LEN],
            timer: None,
            cfm_pending: false,
            seq: 0,
            confirm: TxConfirm { result: TxResult::Success, time_ini_us: 0, ppdu_duration_us: 0 },
        }
    }
}



impl<P: Platform> Rf215Driver<P> {
    /// Requests a transmission. The PSDU is copied. The outcome is always
    /// reported through the TX confirm of the client.
    pub fn tx_request(&mut self, client: ClientHandle, psdu: &[u8], request: &TxRequest) -> Result<TxHandle, TxResult> {
        let trx = client.trx;

        if self.client(client).is_none() || !self.trx_ready(trx) {
            return Err( TxResult::InvalidHandle );
        }

        if psdu.is_empty() || psdu.len() > PSDU_MAX_LEN {
            let stats = &mut self.trx[trx.index()].stats;
            stats.tx_err_total += 1;
            stats.tx_err_bad_len += 1;

            return Err( TxResult::InvalidLength );
        }

        if request.attenuation > MAX_ATTENUATION {
            return Err( TxResult::InvalidParam );
        }

        let slot = self.txbufs.iter().position(|b| !b.in_use).ok_or(TxResult::FullBuffers)?;

        let now = self.hal.time_us();

        let delay = match request.time {
            TxTime::Immediate => None,
            TxTime::Relative(us) => Some(us as u64),
            TxTime::Absolute(at) => Some(at.saturating_sub(now)),
        };

        let buf = &mut self.txbufs[slot];

        buf.in_use = true;
        buf.gen = buf.gen.wrapping_add(1);
        buf.client = Some(client);
        buf.trx = trx;
        buf.request = *request;
        buf.len = psdu.len();
        buf.psdu[..psdu.len()].copy_from_slice(psdu);
        buf.timer = None;
        buf.cfm_pending = false;
        buf.confirm = TxConfirm { result: TxResult::Success, time_ini_us: now, ppdu_duration_us: 0 };

        let handle = TxHandle { trx, slot: slot as u8, gen: buf.gen };

        match delay.filter(|d| *d >= TX_MIN_DELAY_US) {
            None => self.launch(slot),

            Some(delay) => match self.hal.alarm(delay.min(u32::MAX as u64) as u32) {
                Some(id) => self.txbufs[slot].timer = Some(id),

                None => {
                    #[cfg(feature = "log")]
                    defmt::warn!("TX Driver : No alarm available");

                    self.txbufs[slot].in_use = false;
                    return Err( TxResult::FullBuffers );
                },
            },
        }

        Ok( handle )
    }

    /// Cancels a transmission that has not been confirmed yet. The confirm
    /// reports `Cancelled`. Stale handles are ignored.
    pub fn tx_cancel(&mut self, handle: TxHandle) {
        if let Some(slot) = self.tx_slot(handle) {
            #[cfg(feature = "log")]
            defmt::debug!("TX Driver : Cancelling buffer {=usize}", slot);

            self.finish_tx(slot, TxResult::Cancelled);
        }
    }

    /// Returns `true` while a transmission owns the transceiver.
    pub fn tx_in_progress(&self, trx: Trx) -> bool {
        self.trx[trx.index()].tx.is_some()
    }

    /// PSDU of an unconfirmed transmission.
    pub fn tx_psdu(&self, handle: TxHandle) -> Option<&[u8]> {
        let slot = self.tx_slot(handle)?;
        let buf = &self.txbufs[slot];
        Some( &buf.psdu[..buf.len] )
    }

    fn tx_slot(&self, handle: TxHandle) -> Option<usize> {
        let slot = handle.slot as usize;
        let buf = self.txbufs.get(slot)?;

        (buf.in_use && !buf.cfm_pending && buf.gen == handle.gen && buf.trx == handle.trx).then_some(slot)
    }

    /// Starts a transmission: uploads the frame, then CCA or TXPREP.
    pub(super) fn launch(&mut self, slot: usize) {
        let (trx, len, request) = {
            let buf = &self.txbufs[slot];
            (buf.trx, buf.len, buf.request)
        };

        let t = &self.trx[trx.index()];

        let busy = if !self.trx_ready(trx) || t.state != TrxState::Rx {
            Some(TxResult::Aborted)
        } else if t.rx_busy {
            Some(TxResult::BusyRx)
        } else if t.tx.is_some() {
            Some(TxResult::BusyTx)
        } else {
            None
        };

        if let Some(result) = busy {
            self.finish_tx(slot, result);
            return;
        }

        let phy = self.trx[trx.index()].config.phy.with_fec(request.fec);

        let frame = ((len + FCS_LEN) as u16).to_le_bytes();
        let phrtx = [phy.phr_tx()];
        let pac = [PAC_CURRENT | (MAX_ATTENUATION - request.attenuation)];

        self.txbufs[slot].confirm.ppdu_duration_us = phy.ppdu_duration_us(len);

        let shadow = &mut self.trx[trx.index()].shadow;

        let uploaded = self.hal.write(trx.tx_buffer(), &self.txbufs[slot].psdu[..len])
            && self.hal.write(trx.bbc(BbcRegister::TxFrameLength), &frame)
            && self.hal.write_update(trx.bbc(BbcRegister::FskPhrTx), &phrtx, &mut shadow.phrtx).is_some()
            && self.hal.write_update(trx.rf(RfRegister::PaControl), &pac, &mut shadow.pac).is_some();

        let stage = match request.cca {
            CcaMode::EnergyDetect if uploaded && self.hal.write(trx.rf(RfRegister::EdControl), &[edc::SINGLE]) => TxStage::Cca,

            CcaMode::Off if uploaded && self.command(trx, Command::TxPrep) => TxStage::Prep,

            _ => {
                #[cfg(feature = "log")]
                defmt::warn!("TX Driver : Frame upload of buffer {=usize} dropped", slot);

                self.finish_tx(slot, TxResult::Aborted);
                return;
            },
        };

        self.trx[trx.index()].tx = Some((slot, stage));
    }

    /// Energy measured for the CCA.
    pub(super) fn cca_done(&mut self, trx: Trx, ed: i8) {
        let t = &self.trx[trx.index()];

        let Some((slot, TxStage::Cca)) = t.tx else { return };

        if ed != EDV_INVALID && ed >= t.config.cca_threshold_dbm {
            self.finish_tx(slot, TxResult::BusyChannel);
            return;
        }

        if t.rx_busy {
            self.finish_tx(slot, TxResult::BusyRx);
            return;
        }

        if !self.hal.write(trx.rf(RfRegister::EdControl), &[edc::AUTO]) || !self.command(trx, Command::TxPrep) {
            self.finish_tx(slot, TxResult::Aborted);
            return;
        }

        self.trx[trx.index()].tx = Some((slot, TxStage::Prep));
    }

    /// PLL settled: start the frame.
    pub(super) fn tx_on_air(&mut self, trx: Trx) {
        let Some((slot, TxStage::Prep)) = self.trx[trx.index()].tx else { return };

        if !self.hal.write_notify(trx.rf(RfRegister::Command), &[Command::Tx as u8], Op::TxStarted(trx)) {
            self.finish_tx(slot, TxResult::Aborted);
            return;
        }

        self.hal.led_tx(true);

        let timeout = self.txbufs[slot].confirm.ppdu_duration_us.saturating_add(TX_TIMEOUT_MARGIN_US);

        let t = &mut self.trx[trx.index()];
        t.tx = Some((slot, TxStage::OnAir));
        t.tx_timeout = self.hal.alarm(timeout);
    }

    /// TX command on the bus: stamps the start time.
    pub(super) fn tx_started(&mut self, trx: Trx, time: u64) {
        if let Some((slot, TxStage::OnAir)) = self.trx[trx.index()].tx {
            self.txbufs[slot].confirm.time_ini_us = self.hal.count_to_us(time);
        }
    }

    /// Records the outcome of a buffer and releases the transceiver.
    pub(super) fn finish_tx(&mut self, slot: usize, result: TxResult) {
        let buf = &mut self.txbufs[slot];

        if !buf.in_use || buf.cfm_pending { return }

        self.confirms = self.confirms.wrapping_add(1);

        buf.cfm_pending = true;
        buf.seq = self.confirms;
        buf.confirm.result = result;

        let (trx, len, timer) = (buf.trx, buf.len, buf.timer.take());

        if let Some(id) = timer {
            self.hal.cancel_alarm(id);
        }

        let t = &mut self.trx[trx.index()];

        if let Some((_, stage)) = t.tx.filter(|(owner, _)| *owner == slot) {
            t.tx = None;

            if let Some(id) = t.tx_timeout.take() {
                self.hal.cancel_alarm(id);
            }

            match stage {
                TxStage::Cca => {
                    self.hal.write(trx.rf(RfRegister::EdControl), &[edc::AUTO]);
                },

                TxStage::Prep | TxStage::OnAir => {
                    if stage == TxStage::OnAir {
                        self.hal.led_tx(false);
                    }

                    if result != TxResult::Success {
                        self.command(trx, Command::TrxOff);
                    }

                    self.command(trx, Command::Rx);
                },
            };
        }

        #[cfg(feature = "log")]
        defmt::debug!("TX Driver : Buffer {=usize} on {} ended with {}", slot, trx, result);

        let stats = &mut self.trx[trx.index()].stats;

        match result {
            TxResult::Success => {
                stats.tx_total += 1;
                stats.tx_total_bytes += len as u32;
            },

            TxResult::Cancelled => (),

            error => {
                stats.tx_err_total += 1;

                match error {
                    TxResult::BusyTx => stats.tx_err_busy_tx += 1,
                    TxResult::BusyRx => stats.tx_err_busy_rx += 1,
                    TxResult::BusyChannel => stats.tx_err_busy_chn += 1,
                    TxResult::Timeout => stats.tx_err_timeout += 1,
                    TxResult::Aborted | TxResult::Underrun => stats.tx_err_aborted += 1,
                    _ => (),
                }
            },
        }
    }

    /// Ends the transmission owning a transceiver.
    pub(super) fn abort_tx(&mut self, trx: Trx, result: TxResult) {
        if let Some((slot, _)) = self.trx[trx.index()].tx {
            self.finish_tx(slot, result);
        }
    }

    /// Ends every unconfirmed transmission.
    pub(super) fn abort_all(&mut self, result: TxResult) {
        for slot in 0..TX_BUFFERS {
            self.finish_tx(slot, result);
        }
    }

    /// Delivers the pending confirms, oldest outcome first, and releases
    /// their buffers.
    pub(super) fn deliver_confirms<L: Rf215Listener>(&mut self, listener: &mut L) {
        loop {
            let next = self.txbufs.iter().enumerate()
                .filter(|(_, b)| b.in_use && b.cfm_pending)
                .max_by_key(|(_, b)| self.confirms.wrapping_sub(b.seq))
                .map(|(slot, _)| slot);

            let Some(slot) = next else { return };

            let buf = &self.txbufs[slot];
            let handle = TxHandle { trx: buf.trx, slot: slot as u8, gen: buf.gen };

            if let Some(client) = buf.client {
                if self.client(client).is_some_and(|c| c.tx_cfm_enabled) {
                    listener.tx_confirm(client, handle, &buf.confirm, &buf.psdu[..buf.len]);
                }
            }

            let buf = &mut self.txbufs[slot];
            buf.in_use = false;
            buf.cfm_pending = false;
            buf.client = None;
        }
    }
}
