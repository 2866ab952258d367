//! Frame reception.



use super::*;



/// A received frame.
#[derive(Clone, Copy, Debug)]
pub struct RxIndication<'a> {
    /// PSDU without FCS. Borrowed from the transceiver RX buffer.
    pub psdu: &'a [u8],

    /// Start of the frame (first preamble symbol), in microseconds.
    pub time_ini_us: u64,

    /// On-air duration of the frame.
    pub ppdu_duration_us: u32,

    /// Energy of the frame in dBm.
    pub rssi_dbm: i8,

    /// Channel the frame was received on.
    pub channel: u16,

    /// The frame was FEC coded, as signalled by its SFD.
    pub fec: bool,
}



impl<P: Platform> Rf215Driver<P> {
    /// Returns `true` while a frame is being received.
    pub fn rx_in_progress(&self, trx: Trx) -> bool {
        self.trx[trx.index()].rx_busy
    }

    /// Start of frame detected.
    pub(super) fn rx_start(&mut self, trx: Trx, time: u64) {
        if let Some((slot, TxStage::Cca)) = self.trx[trx.index()].tx {
            self.finish_tx(slot, TxResult::BusyRx);
        }

        let time = self.hal.count_to_us(time);
        let t = &mut self.trx[trx.index()];

        // The interrupt fires after the synchronization header.
        t.rx_time = time.saturating_sub(t.config.phy.shr_duration_us() as u64);

        if !t.rx_busy {
            t.rx_busy = true;
            self.hal.led_rx(true);
        }
    }

    /// End of frame detected.
    pub(super) fn rx_frame_end(&mut self, trx: Trx) {
        self.hal.read(trx.bbc(BbcRegister::PhyControl), 5, Op::RxLength(trx));
        self.hal.read(trx.bbc(BbcRegister::FskPhrRx), 1, Op::RxPhr(trx));
        self.hal.read(trx.rf(RfRegister::EdValue), 1, Op::RxEd(trx));
    }

    /// Frame status read. Valid frames are read out of the frame buffer.
    pub(super) fn rx_length(&mut self, trx: Trx, pc: u8, len: usize) {
        let t = &mut self.trx[trx.index()];

        if pc & pc::FCSOK == 0 {
            #[cfg(feature = "log")]
            defmt::debug!("RX Driver : Bad FCS on {}", trx);

            t.stats.rx_err_total += 1;
            t.stats.rx_err_bad_fcs += 1;
            self.rx_end(trx);
            return;
        }

        if len <= FCS_LEN || len > FRAME_MAX_LEN {
            #[cfg(feature = "log")]
            defmt::debug!("RX Driver : Bad frame length {=usize} on {}", len, trx);

            t.stats.rx_err_total += 1;
            t.stats.rx_err_bad_len += 1;
            self.rx_end(trx);
            return;
        }

        t.rx_len = len - FCS_LEN;

        self.hal.read(trx.rx_buffer(), len - FCS_LEN, Op::RxPsdu(trx));
    }

    /// PSDU read: indicates the frame to every listening client.
    pub(super) fn rx_deliver<L: Rf215Listener>(&mut self, trx: Trx, len: usize, listener: &mut L) {
        let now = self.hal.time_us();
        let t = &mut self.trx[trx.index()];

        let duration = t.config.phy.with_fec(t.rx_fec).ppdu_duration_us(len);

        if !t.rx_busy {
            // Start of frame missed.
            t.rx_time = now.saturating_sub(duration as u64);
        }

        t.stats.rx_total += 1;
        t.stats.rx_total_bytes += len as u32;

        let indication = RxIndication {
            psdu: &t.rxbuf[..len],
            time_ini_us: t.rx_time,
            ppdu_duration_us: duration,
            rssi_dbm: t.rx_ed,
            channel: t.config.channel,
            fec: t.rx_fec,
        };

        #[cfg(feature = "log")]
        defmt::trace!("RX Driver : {=usize} bytes on {} at {=i8} dBm", len, trx, indication.rssi_dbm);

        for (handle, client) in Self::client_handles(&self.clients[trx.index()], trx) {
            if client.rx_enabled {
                listener.rx_indication(handle, &indication);
            }
        }

        self.rx_end(trx);
    }

    /// Leaves the receiving state.
    pub(super) fn rx_end(&mut self, trx: Trx) {
        let t = &mut self.trx[trx.index()];

        if t.rx_busy {
            t.rx_busy = false;
            self.hal.led_rx(false);
        }
    }
}



#[cfg(test)]
mod tests {
    use super::super::tests::{irq, pump, ready};
    use super::*;

    fn frame(board: &crate::testing::Board, psdu: &[u8], fcs_ok: bool, ed: i8) {
        let len = psdu.len() + FCS_LEN;
        let pc = if fcs_ok { pc::CONFIG | pc::FCSOK } else { pc::CONFIG };

        board.spi.set(Trx::Rf09.bbc(BbcRegister::PhyControl), &[pc, 0, 0, len as u8, (len >> 8) as u8]);
        board.spi.set(Trx::Rf09.bbc(BbcRegister::FskPhrRx), &[phrtx::DW]);
        board.spi.set(Trx::Rf09.rf(RfRegister::EdValue), &[ed as u8]);
        board.spi.set(Trx::Rf09.rx_buffer(), psdu);
    }

    #[test]
    fn received_frame_reaches_every_listening_client() {
        let (mut driver, board, mut events) = ready();

        let a = driver.open(Trx::Rf09).unwrap();
        let b = driver.open(Trx::Rf09).unwrap();
        driver.rx_ind_callback_register(a, true).unwrap();
        driver.rx_ind_callback_register(b, true).unwrap();

        irq(&mut driver, &board, &mut events, [0, 0, bbirq::RXFS, 0]);
        assert!(driver.rx_in_progress(Trx::Rf09));
        assert!(board.led_rx.state());

        frame(&board, &[0xAA, 0xBB, 0xCC], true, -70);
        irq(&mut driver, &board, &mut events, [0, 0, bbirq::RXFE, 0]);

        assert_eq!(events.rx.len(), 2);
        assert_eq!(events.rx[0].0, a);
        assert_eq!(events.rx[1].0, b);
        assert_eq!(events.rx[0].1, vec![0xAA, 0xBB, 0xCC]);
        assert_eq!(events.rx[0].2, -70);

        assert!(!driver.rx_in_progress(Trx::Rf09));
        assert!(!board.led_rx.state());
        assert_eq!(driver.stats(Trx::Rf09).rx_total, 1);
        assert_eq!(driver.stats(Trx::Rf09).rx_total_bytes, 3);
    }

    #[test]
    fn clients_without_rx_callback_are_skipped() {
        let (mut driver, board, mut events) = ready();

        let _quiet = driver.open(Trx::Rf09).unwrap();

        frame(&board, &[1, 2], true, -60);
        irq(&mut driver, &board, &mut events, [0, 0, bbirq::RXFS | bbirq::RXFE, 0]);

        assert!(events.rx.is_empty());
        assert_eq!(driver.stats(Trx::Rf09).rx_total, 1);
    }

    #[test]
    fn bad_fcs_and_bad_length_are_dropped() {
        let (mut driver, board, mut events) = ready();

        let client = driver.open(Trx::Rf09).unwrap();
        driver.rx_ind_callback_register(client, true).unwrap();

        frame(&board, &[1, 2, 3], false, -60);
        irq(&mut driver, &board, &mut events, [0, 0, bbirq::RXFS | bbirq::RXFE, 0]);

        // Length covering the FCS only.
        frame(&board, &[], true, -60);
        irq(&mut driver, &board, &mut events, [0, 0, bbirq::RXFS | bbirq::RXFE, 0]);

        assert!(events.rx.is_empty());

        let stats = driver.stats(Trx::Rf09);
        assert_eq!(stats.rx_err_bad_fcs, 1);
        assert_eq!(stats.rx_err_bad_len, 1);
        assert_eq!(stats.rx_err_total, 2);
        assert!(!board.led_rx.state());
    }

    #[test]
    fn frame_start_time_accounts_for_header() {
        let (mut driver, board, mut events) = ready();

        let client = driver.open(Trx::Rf09).unwrap();
        driver.rx_ind_callback_register(client, true).unwrap();

        // 32 MHz counter, no drift while the status is read.
        board.time.set_step(0);
        board.time.set_now(32_000_000);

        irq(&mut driver, &board, &mut events, [0, 0, bbirq::RXFS, 0]);

        frame(&board, &[7; 10], true, -80);
        irq(&mut driver, &board, &mut events, [0, 0, bbirq::RXFE, 0]);

        // 1 s minus 8 octets of preamble and 2 octets of SFD at 50 ksym/s.
        assert_eq!(events.rx[0].3, 1_000_000 - 1_600);
        pump(&mut driver, &board, &mut events);
    }

    #[test]
    fn coding_follows_the_received_sfd() {
        let (mut driver, board, _) = ready();

        let client = driver.open(Trx::Rf09).unwrap();
        driver.rx_ind_callback_register(client, true).unwrap();

        let mut seen = Coding::default();
        assert!(!driver.phy(Trx::Rf09).unwrap().fec);

        frame(&board, &[1, 2, 3, 4], true, -70);
        board.spi.set(Trx::Rf09.bbc(BbcRegister::FskPhrRx), &[phrtx::DW | phrrx::SFD]);
        board.spi.set(0x0000, &[0, 0, bbirq::RXFS | bbirq::RXFE, 0]);
        driver.external_interrupt();
        drain(&mut driver, &board, &mut seen);

        frame(&board, &[1, 2, 3, 4], true, -70);
        board.spi.set(0x0000, &[0, 0, bbirq::RXFS | bbirq::RXFE, 0]);
        driver.external_interrupt();
        drain(&mut driver, &board, &mut seen);

        let phy = driver.phy(Trx::Rf09).unwrap();
        assert_eq!(seen.0, vec![
            (true, phy.with_fec(true).ppdu_duration_us(4)),
            (false, phy.ppdu_duration_us(4)),
        ]);
    }

    /// Records the coding and duration of every indication.
    #[derive(Default)]
    struct Coding(Vec<(bool, u32)>);

    impl Rf215Listener for Coding {
        fn rx_indication(&mut self, _: ClientHandle, indication: &RxIndication<'_>) {
            self.0.push((indication.fec, indication.ppdu_duration_us));
        }

        fn tx_confirm(&mut self, _: ClientHandle, _: TxHandle, _: &TxConfirm, _: &[u8]) {}
    }

    fn drain(driver: &mut super::super::tests::Driver, board: &crate::testing::Board, listener: &mut Coding) {
        loop {
            driver.tasks(listener);

            if board.spi.in_flight() == 0 { return }

            driver.dma_complete(listener);
        }
    }
}
