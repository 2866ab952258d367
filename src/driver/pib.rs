//! PHY information base of the RF215 transceivers.



use super::*;



/// Version reported by `PibAttribute::FwVersion`.
pub const DRIVER_VERSION: [u8; 3] = [1, 0, 0];

/// Number of statistics counters, identified from `STATS_BASE`.
pub const STATS_COUNT: u16 = 14;

const STATS_BASE: u16 = 0x01A0;



#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum PibAttribute {
    /// Part number (2 bytes).
    DeviceId,

    /// Driver version (3 bytes).
    FwVersion,

    /// Resets the whole chip.
    DeviceReset,

    /// Resets one transceiver.
    TrxReset,

    /// Sleep state of a transceiver (1 byte, 0 or 1).
    TrxSleep,

    /// FSK PHY configuration (4 bytes).
    PhyConfig,

    /// Band and operating mode identifier (2 bytes).
    PhyBandOperatingMode,

    /// Channel number (2 bytes).
    PhyChannelNum,

    /// Channel center frequency in Hz (4 bytes).
    PhyChannelFreqHz,

    /// CCA energy detection duration in us (2 bytes).
    PhyCcaEdDuration,

    /// CCA energy threshold in dBm (1 byte).
    PhyCcaEdThreshold,

    /// RX to TX turnaround in us (2 bytes).
    PhyTurnaroundTime,

    /// Unit backoff period in us (2 bytes).
    MacUnitBackoffPeriod,

    /// Statistics counter (4 bytes), in `TrxStats` field order.
    PhyStatistic(u8),

    /// Clears the statistics counters.
    PhyStatsReset,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Access {
    Read,
    Write,
    ReadWrite,
}

impl PibAttribute {
    pub const fn id(self) -> u16 {
        match self {
            Self::DeviceId => 0x0000,
            Self::FwVersion => 0x0001,
            Self::DeviceReset => 0x0002,
            Self::TrxReset => 0x0080,
            Self::TrxSleep => 0x0081,
            Self::PhyConfig => 0x0100,
            Self::PhyBandOperatingMode => 0x0101,
            Self::PhyChannelNum => 0x0120,
            Self::PhyChannelFreqHz => 0x0121,
            Self::PhyCcaEdDuration => 0x0141,
            Self::PhyCcaEdThreshold => 0x0142,
            Self::PhyTurnaroundTime => 0x0160,
            Self::MacUnitBackoffPeriod => 0x0200,
            Self::PhyStatistic(n) => STATS_BASE + n as u16,
            Self::PhyStatsReset => 0x01C0,
        }
    }

    pub const fn from_id(id: u16) -> Option<Self> {
        let attr = match id {
            0x0000 => Self::DeviceId,
            0x0001 => Self::FwVersion,
            0x0002 => Self::DeviceReset,
            0x0080 => Self::TrxReset,
            0x0081 => Self::TrxSleep,
            0x0100 => Self::PhyConfig,
            0x0101 => Self::PhyBandOperatingMode,
            0x0120 => Self::PhyChannelNum,
            0x0121 => Self::PhyChannelFreqHz,
            0x0141 => Self::PhyCcaEdDuration,
            0x0142 => Self::PhyCcaEdThreshold,
            0x0160 => Self::PhyTurnaroundTime,
            0x0200 => Self::MacUnitBackoffPeriod,
            0x01C0 => Self::PhyStatsReset,
            n if n >= STATS_BASE && n < STATS_BASE + STATS_COUNT => Self::PhyStatistic((n - STATS_BASE) as u8),
            _ => return None,
        };

        Some( attr )
    }

    /// Size of the attribute value in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::FwVersion => 3,

            Self::DeviceReset | Self::TrxReset | Self::TrxSleep |
            Self::PhyCcaEdThreshold | Self::PhyStatsReset => 1,

            Self::DeviceId | Self::PhyBandOperatingMode | Self::PhyChannelNum |
            Self::PhyCcaEdDuration | Self::PhyTurnaroundTime | Self::MacUnitBackoffPeriod => 2,

            Self::PhyConfig | Self::PhyChannelFreqHz | Self::PhyStatistic(_) => 4,
        }
    }

    const fn access(self) -> Access {
        match self {
            Self::DeviceReset | Self::TrxReset | Self::PhyStatsReset => Access::Write,

            Self::DeviceId | Self::FwVersion | Self::PhyChannelFreqHz |
            Self::PhyTurnaroundTime | Self::MacUnitBackoffPeriod | Self::PhyStatistic(_) => Access::Read,

            _ => Access::ReadWrite,
        }
    }
}



impl TrxStats {
    /// Counters in attribute order.
    pub const fn counters(&self) -> [u32; STATS_COUNT as usize] {
        [
            self.tx_total, self.tx_total_bytes, self.tx_err_total, self.tx_err_busy_tx,
            self.tx_err_busy_rx, self.tx_err_busy_chn, self.tx_err_bad_len, self.tx_err_timeout,
            self.tx_err_aborted, self.rx_total, self.rx_total_bytes, self.rx_err_total,
            self.rx_err_bad_len, self.rx_err_bad_fcs,
        ]
    }
}



/// RFn_EDD value for a measurement duration: the shortest time base that
/// fits the duration in the 6 bit factor.
pub(crate) const fn ed_duration(us: u16) -> u8 {
    const BASES: [u32; 4] = [2, 8, 32, 128];

    let mut dtb = 0;

    while dtb < BASES.len() {
        let df = (us as u32 + BASES[dtb] - 1) / BASES[dtb];

        if df <= 63 {
            return ((df as u8) << 2) | dtb as u8;
        }

        dtb += 1;
    }

    0xFF
}



/// Size of a PIB attribute, 0 if unknown.
pub fn pib_size(id: u16) -> usize {
    match PibAttribute::from_id(id) {
        Some(attr) => attr.size(),
        None => 0,
    }
}



impl<P: Platform> Rf215Driver<P> {
    /// Reads a PIB attribute into `value`, which must hold at least
    /// `pib_size(id)` bytes.
    pub fn get_pib(&self, trx: Trx, id: u16, value: &mut [u8]) -> PibResult {
        let Some(attr) = PibAttribute::from_id(id) else { return PibResult::InvalidAttr };

        if !self.trx_ready(trx) { return PibResult::InvalidHandle }

        if attr.access() == Access::Write { return PibResult::WriteOnly }

        let Some(value) = value.get_mut(..attr.size()) else { return PibResult::InvalidParam };

        let t = &self.trx[trx.index()];

        match attr {
            PibAttribute::DeviceId => {
                let pn = self.part.map_or(0, |(pn, _)| pn as u16);
                value.copy_from_slice(&pn.to_le_bytes());
            },

            PibAttribute::FwVersion => value.copy_from_slice(&DRIVER_VERSION),

            PibAttribute::TrxSleep => value[0] = (t.state == TrxState::Sleep) as u8,

            PibAttribute::PhyConfig => value.copy_from_slice(&t.config.phy.to_bytes()),

            PibAttribute::PhyBandOperatingMode => value.copy_from_slice(&t.config.band.id().to_le_bytes()),

            PibAttribute::PhyChannelNum => value.copy_from_slice(&t.config.channel.to_le_bytes()),

            PibAttribute::PhyChannelFreqHz => {
                let freq = t.config.band.frequency_hz(t.config.channel).unwrap_or(0);
                value.copy_from_slice(&freq.to_le_bytes());
            },

            PibAttribute::PhyCcaEdDuration => value.copy_from_slice(&t.config.cca_duration_us.to_le_bytes()),

            PibAttribute::PhyCcaEdThreshold => value[0] = t.config.cca_threshold_dbm as u8,

            PibAttribute::PhyTurnaroundTime => value.copy_from_slice(&TURNAROUND_TIME_US.to_le_bytes()),

            PibAttribute::MacUnitBackoffPeriod => {
                let period = TURNAROUND_TIME_US.saturating_add(t.config.cca_duration_us);
                value.copy_from_slice(&period.to_le_bytes());
            },

            PibAttribute::PhyStatistic(n) => {
                let counter = t.stats.counters()[n as usize];
                value.copy_from_slice(&counter.to_le_bytes());
            },

            PibAttribute::DeviceReset | PibAttribute::TrxReset | PibAttribute::PhyStatsReset => (),
        }

        PibResult::Success
    }

    /// Writes a PIB attribute. `value` must be exactly `pib_size(id)` bytes.
    pub fn set_pib(&mut self, trx: Trx, id: u16, value: &[u8]) -> PibResult {
        let Some(attr) = PibAttribute::from_id(id) else { return PibResult::InvalidAttr };

        if !self.trx_ready(trx) { return PibResult::InvalidHandle }

        if attr.access() == Access::Read { return PibResult::ReadOnly }

        if value.len() != attr.size() { return PibResult::InvalidParam }

        #[cfg(feature = "log")]
        defmt::debug!("RF215 Driver : Set {} on {}", attr, trx);

        match attr {
            PibAttribute::DeviceReset => {
                if value[0] == 0 { return PibResult::InvalidParam }
                self.initialize();
            },

            PibAttribute::TrxReset => {
                if value[0] == 0 { return PibResult::InvalidParam }
                self.trx_reset(trx);
            },

            PibAttribute::TrxSleep => match value[0] {
                0 => self.trx_wake(trx),
                1 => self.trx_sleep(trx),
                _ => return PibResult::InvalidParam,
            },

            PibAttribute::PhyConfig => {
                let Some(phy) = PhyConfig::from_bytes(value) else { return PibResult::InvalidParam };

                self.trx[trx.index()].config.phy = phy;
                self.retune(trx);
            },

            PibAttribute::PhyBandOperatingMode => {
                let band = Band::from_id(u16::from_le_bytes([value[0], value[1]]));

                let Some(band) = band.filter(|b| b.trx() == trx) else { return PibResult::InvalidParam };

                let config = &mut self.trx[trx.index()].config;
                config.band = band;
                config.phy = band.phy();

                if config.channel >= band.channels() {
                    config.channel = 0;
                }

                self.retune(trx);
            },

            PibAttribute::PhyChannelNum => return self.set_channel(trx, u16::from_le_bytes([value[0], value[1]])),

            PibAttribute::PhyCcaEdDuration => {
                let duration = u16::from_le_bytes([value[0], value[1]]);

                self.trx[trx.index()].config.cca_duration_us = duration;
                self.hal.write(trx.rf(RfRegister::EdDuration), &[ed_duration(duration)]);
            },

            PibAttribute::PhyCcaEdThreshold => self.trx[trx.index()].config.cca_threshold_dbm = value[0] as i8,

            PibAttribute::PhyStatsReset => self.trx[trx.index()].stats = TrxStats::default(),

            _ => return PibResult::ReadOnly,
        }

        PibResult::Success
    }

    /// Changes the channel of a transceiver. A transmission in progress is
    /// aborted.
    pub fn set_channel(&mut self, trx: Trx, channel: u16) -> PibResult {
        if !self.trx_ready(trx) { return PibResult::InvalidHandle }

        if channel >= self.trx[trx.index()].config.band.channels() { return PibResult::InvalidParam }

        self.trx[trx.index()].config.channel = channel;
        self.retune(trx);

        PibResult::Success
    }

    /// Changes the channel of a transceiver at a given time on the driver
    /// time base. A pending switch is replaced.
    pub fn schedule_channel_switch(&mut self, trx: Trx, time_us: u64, channel: u16) -> PibResult {
        if !self.trx_ready(trx) { return PibResult::InvalidHandle }

        if channel >= self.trx[trx.index()].config.band.channels() { return PibResult::InvalidParam }

        if let Some((id, _)) = self.trx[trx.index()].switch.take() {
            self.hal.cancel_alarm(id);
        }

        let delay = time_us.saturating_sub(self.hal.time_us());

        if delay < TX_MIN_DELAY_US {
            return self.set_channel(trx, channel);
        }

        match self.hal.alarm(delay.min(u32::MAX as u64) as u32) {
            Some(id) => {
                self.trx[trx.index()].switch = Some((id, channel));
                PibResult::Success
            },

            None => PibResult::InvalidParam,
        }
    }

    /// Applies the PHY and channel configuration to a listening transceiver.
    /// Only the changed PHY registers are written. Asleep or resetting
    /// transceivers pick the configuration up when they wake up.
    fn retune(&mut self, trx: Trx) {
        if self.trx[trx.index()].state != TrxState::Rx { return }

        self.abort_tx(trx, TxResult::Aborted);
        self.rx_end(trx);
        self.command(trx, Command::TrxOff);

        let t = &mut self.trx[trx.index()];

        let fsk = t.config.phy.fsk_registers();
        let phrtx = [t.config.phy.phr_tx()];
        let chan = t.config.band.channel_registers(t.config.channel);

        self.hal.write_update(trx.bbc(BbcRegister::FskConfig), &fsk, &mut t.shadow.fsk);
        self.hal.write_update(trx.bbc(BbcRegister::FskPhrTx), &phrtx, &mut t.shadow.phrtx);
        self.hal.write_update(trx.rf(RfRegister::ChannelSpacing), &chan[..3], &mut t.shadow.chan[..3]);

        // The channel number takes effect when written.
        self.hal.write(trx.rf(RfRegister::ChannelLow), &chan[3..]);
        t.shadow.chan[3..].copy_from_slice(&chan[3..]);

        self.command(trx, Command::Rx);
    }

    fn trx_reset(&mut self, trx: Trx) {
        self.abort_tx(trx, TxResult::Aborted);
        self.rx_end(trx);

        self.trx[trx.index()].state = TrxState::Off;

        // Reconfigured on the WAKEUP interrupt.
        self.command(trx, Command::Reset);
    }

    fn trx_sleep(&mut self, trx: Trx) {
        if self.trx[trx.index()].state == TrxState::Sleep { return }

        self.abort_tx(trx, TxResult::Aborted);
        self.rx_end(trx);

        self.command(trx, Command::TrxOff);
        self.command(trx, Command::Sleep);

        self.trx[trx.index()].state = TrxState::Sleep;
    }

    fn trx_wake(&mut self, trx: Trx) {
        if self.trx[trx.index()].state != TrxState::Sleep { return }

        self.trx[trx.index()].state = TrxState::Off;

        // Reconfigured on the WAKEUP interrupt.
        self.command(trx, Command::TrxOff);
    }
}



#[cfg(test)]
mod tests {
    use super::super::tests::{irq, pump, ready};
    use super::*;

    fn command(board: &crate::testing::Board) -> u8 {
        board.spi.get(Trx::Rf09.rf(RfRegister::Command))
    }

    #[test]
    fn attribute_sizes() {
        assert_eq!(pib_size(PibAttribute::PhyChannelNum.id()), 2);
        assert_eq!(pib_size(PibAttribute::PhyConfig.id()), PhyConfig::SIZE);
        assert_eq!(pib_size(PibAttribute::PhyStatistic(13).id()), 4);
        assert_eq!(pib_size(0x01AE), 0);
        assert_eq!(pib_size(0x7777), 0);
    }

    #[test]
    fn identifiers_round_trip() {
        for id in [0x0000, 0x0081, 0x0121, 0x01A5, 0x01C0, 0x0200] {
            assert_eq!(PibAttribute::from_id(id).map(PibAttribute::id), Some(id));
        }
    }

    #[test]
    fn energy_detection_duration_encoding() {
        // 2 us base.
        assert_eq!(ed_duration(100), 50 << 2);
        // 8 us base.
        assert_eq!(ed_duration(160), (20 << 2) | 1);
        assert_eq!(ed_duration(60_000), 0xFF);
    }

    #[test]
    fn access_rules() {
        let (mut driver, _board, _events) = ready();
        let mut value = [0u8; 4];

        assert_eq!(driver.get_pib(Trx::Rf09, 0x7777, &mut value), PibResult::InvalidAttr);
        assert_eq!(driver.get_pib(Trx::Rf09, PibAttribute::DeviceReset.id(), &mut value), PibResult::WriteOnly);
        assert_eq!(driver.set_pib(Trx::Rf09, PibAttribute::PhyChannelFreqHz.id(), &value), PibResult::ReadOnly);
        assert_eq!(driver.get_pib(Trx::Rf09, PibAttribute::PhyConfig.id(), &mut value[..2]), PibResult::InvalidParam);
        assert_eq!(driver.set_pib(Trx::Rf09, PibAttribute::PhyChannelNum.id(), &value), PibResult::InvalidParam);
    }

    #[test]
    fn disabled_transceiver_is_invalid_handle() {
        let (mut driver, _board, _events) = super::super::tests::ready_with(Rf215Config::new(), 0x36);
        let mut value = [0u8; 2];

        assert_eq!(driver.get_pib(Trx::Rf24, PibAttribute::PhyChannelNum.id(), &mut value), PibResult::InvalidHandle);
    }

    #[test]
    fn read_only_values() {
        let (mut driver, _board, _events) = ready();

        let mut id = [0u8; 2];
        assert_eq!(driver.get_pib(Trx::Rf09, PibAttribute::DeviceId.id(), &mut id), PibResult::Success);
        assert_eq!(id, [0x34, 0x00]);

        let mut freq = [0u8; 4];
        driver.get_pib(Trx::Rf09, PibAttribute::PhyChannelFreqHz.id(), &mut freq);
        assert_eq!(u32::from_le_bytes(freq), 863_125_000);

        let mut backoff = [0u8; 2];
        driver.get_pib(Trx::Rf09, PibAttribute::MacUnitBackoffPeriod.id(), &mut backoff);
        assert_eq!(u16::from_le_bytes(backoff), TURNAROUND_TIME_US + 160);
    }

    #[test]
    fn channel_change_reprograms_the_transceiver() {
        let (mut driver, board, mut events) = ready();

        assert_eq!(driver.set_pib(Trx::Rf09, PibAttribute::PhyChannelNum.id(), &[3, 0]), PibResult::Success);
        pump(&mut driver, &board, &mut events);

        assert_eq!(driver.channel(Trx::Rf09), Some(3));
        assert_eq!(board.spi.get(Trx::Rf09.rf(RfRegister::ChannelLow)), 3);
        assert_eq!(command(&board), Command::Rx as u8);

        // Spacing and center frequency unchanged: only the channel number and
        // the two commands went out.
        let writes = board.spi.writes();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[1], (Trx::Rf09.rf(RfRegister::ChannelLow), vec![3, 0]));

        let mut freq = [0u8; 4];
        driver.get_pib(Trx::Rf09, PibAttribute::PhyChannelFreqHz.id(), &mut freq);
        assert_eq!(u32::from_le_bytes(freq), 863_125_000 + 3 * 200_000);

        assert_eq!(driver.set_channel(Trx::Rf09, 34), PibResult::InvalidParam);
    }

    #[test]
    fn channel_change_aborts_transmission() {
        let (mut driver, board, mut events) = ready();

        let client = driver.open(Trx::Rf09).unwrap();
        driver.tx_cfm_callback_register(client, true).unwrap();
        driver.tx_request(client, &[1, 2], &TxRequest::default()).unwrap();
        pump(&mut driver, &board, &mut events);

        driver.set_channel(Trx::Rf09, 1);
        pump(&mut driver, &board, &mut events);

        assert_eq!(events.cfm[0].2.result, TxResult::Aborted);
        assert_eq!(command(&board), Command::Rx as u8);
    }

    #[test]
    fn phy_change_writes_only_changed_registers() {
        let (mut driver, board, mut events) = ready();

        let phy = driver.phy(Trx::Rf09).unwrap().with_fec(true);
        assert_eq!(driver.set_pib(Trx::Rf09, PibAttribute::PhyConfig.id(), &phy.to_bytes()), PibResult::Success);
        pump(&mut driver, &board, &mut events);

        assert_eq!(driver.phy(Trx::Rf09), Some(phy));
        assert_eq!(board.spi.get(Trx::Rf09.bbc(BbcRegister::FskPhrTx)), phy.phr_tx());

        let fsk_writes = board.spi.writes().into_iter()
            .filter(|(a, _)| (Trx::Rf09.bbc(BbcRegister::FskConfig)..Trx::Rf09.bbc(BbcRegister::FskConfig) + 6).contains(a))
            .count();

        // FEC only changes the PHR configuration.
        assert_eq!(fsk_writes, 0);

        let mut back = [0u8; 4];
        driver.get_pib(Trx::Rf09, PibAttribute::PhyConfig.id(), &mut back);
        assert_eq!(back, phy.to_bytes());

        assert_eq!(driver.set_pib(Trx::Rf09, PibAttribute::PhyConfig.id(), &[0xFF; 4]), PibResult::InvalidParam);
    }

    #[test]
    fn band_must_match_the_transceiver() {
        let (mut driver, _board, _events) = ready();

        let band = Band::Fsk2450Opm1.id().to_le_bytes();
        assert_eq!(driver.set_pib(Trx::Rf09, PibAttribute::PhyBandOperatingMode.id(), &band), PibResult::InvalidParam);

        let band = Band::Fsk863Opm3.id().to_le_bytes();
        assert_eq!(driver.set_pib(Trx::Rf09, PibAttribute::PhyBandOperatingMode.id(), &band), PibResult::Success);
        assert_eq!(driver.band(Trx::Rf09), Some(Band::Fsk863Opm3));
        assert_eq!(driver.phy(Trx::Rf09), Some(Band::Fsk863Opm3.phy()));
    }

    #[test]
    fn sleep_and_wake() {
        let (mut driver, board, mut events) = ready();

        let client = driver.open(Trx::Rf09).unwrap();
        driver.tx_cfm_callback_register(client, true).unwrap();

        driver.set_pib(Trx::Rf09, PibAttribute::TrxSleep.id(), &[1]);
        pump(&mut driver, &board, &mut events);
        assert_eq!(command(&board), Command::Sleep as u8);

        let mut asleep = [0u8];
        driver.get_pib(Trx::Rf09, PibAttribute::TrxSleep.id(), &mut asleep);
        assert_eq!(asleep, [1]);

        // No transmission while asleep.
        driver.tx_request(client, &[1], &TxRequest::default()).unwrap();
        pump(&mut driver, &board, &mut events);
        assert_eq!(events.cfm[0].2.result, TxResult::Aborted);

        driver.set_pib(Trx::Rf09, PibAttribute::TrxSleep.id(), &[0]);
        pump(&mut driver, &board, &mut events);
        assert_eq!(command(&board), Command::TrxOff as u8);

        irq(&mut driver, &board, &mut events, [rfirq::WAKEUP, 0, 0, 0]);
        assert_eq!(command(&board), Command::Rx as u8);

        driver.get_pib(Trx::Rf09, PibAttribute::TrxSleep.id(), &mut asleep);
        assert_eq!(asleep, [0]);
    }

    #[test]
    fn transceiver_reset_reconfigures_on_wakeup() {
        let (mut driver, board, mut events) = ready();

        driver.set_pib(Trx::Rf09, PibAttribute::TrxReset.id(), &[1]);
        pump(&mut driver, &board, &mut events);
        assert_eq!(command(&board), Command::Reset as u8);

        board.spi.clear_frames();
        irq(&mut driver, &board, &mut events, [rfirq::WAKEUP, 0, 0, 0]);

        assert_eq!(command(&board), Command::Rx as u8);
        assert_eq!(board.spi.get(Trx::Rf09.rf(RfRegister::IrqMask)), rfirq::MASK);
    }

    #[test]
    fn statistics_read_and_reset() {
        let (mut driver, board, mut events) = ready();

        let client = driver.open(Trx::Rf09).unwrap();
        driver.tx_request(client, &[], &TxRequest::default()).unwrap_err();
        pump(&mut driver, &board, &mut events);

        // tx_err_bad_len.
        let mut counter = [0u8; 4];
        driver.get_pib(Trx::Rf09, PibAttribute::PhyStatistic(6).id(), &mut counter);
        assert_eq!(u32::from_le_bytes(counter), 1);

        driver.set_pib(Trx::Rf09, PibAttribute::PhyStatsReset.id(), &[1]);
        assert_eq!(driver.stats(Trx::Rf09), TrxStats::default());
    }

    #[test]
    fn scheduled_channel_switch() {
        let (mut driver, board, mut events) = ready();

        let at = driver.time_us() + 20_000;
        assert_eq!(driver.schedule_channel_switch(Trx::Rf09, at, 5), PibResult::Success);
        assert_eq!(driver.channel(Trx::Rf09), Some(0));

        let (alarm, _) = board.time.alarms()[0];
        driver.timer_expired(alarm);
        pump(&mut driver, &board, &mut events);

        assert_eq!(driver.channel(Trx::Rf09), Some(5));
        assert_eq!(board.spi.get(Trx::Rf09.rf(RfRegister::ChannelLow)), 5);

        // A switch in the past applies immediately.
        assert_eq!(driver.schedule_channel_switch(Trx::Rf09, 0, 7), PibResult::Success);
        assert_eq!(driver.channel(Trx::Rf09), Some(7));
    }
}
