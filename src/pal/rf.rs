//! RF medium of the PAL, on one transceiver of the RF215 driver.



use crate::common::Trx;
use crate::config::TX_BUFFERS;
use crate::driver::*;
use crate::error::{PalError, PalTxResult, PibResult, TxResult};
use crate::hal::port::{AlarmId, Platform};
use crate::sniffer::{Direction, SniffedFrame, Sniffer, SnifferSink};
use crate::Status;

use super::channel::{Medium, PCH_FREQUENCY_HOPPING};
use super::medium::PalMedium;
use super::rf_rm::{self, RobustMode};
use super::types::*;
use super::PalListener;



/// MAC request behind a driver transmission.
#[derive(Clone, Copy, Debug)]
struct TxEntry {
    handle: TxHandle,
    buff_id: u8,
    pch: u16,
    scheme: PalScheme,
}



/// RF medium of the PAL. Owns the driver and one client on `trx`.
pub struct PalRf<P: Platform> {
    driver: Rf215Driver<P>,

    /// Transceiver used by the PAL.
    trx: Trx,

    /// Driver client, opened once the driver is ready.
    client: Option<ClientHandle>,

    /// Transmissions in progress.
    table: [Option<TxEntry>; TX_BUFFERS],

    /// RSSI of the last received frame.
    last_rssi: Option<i8>,

    /// Policy of the robust modulation query.
    robust: RobustMode,
}

impl<P: Platform> PalRf<P> {
    pub fn new(driver: Rf215Driver<P>, trx: Trx) -> Self {
        Self { driver, trx, client: None, table: [None; TX_BUFFERS], last_rssi: None, robust: RobustMode::Auto }
    }

    /// Set the robust modulation policy.
    pub fn with_robust_mode(mut self, mode: RobustMode) -> Self {
        self.robust = mode;
        self
    }

    pub fn robust_mode(&self) -> RobustMode {
        self.robust
    }

    pub fn driver(&self) -> &Rf215Driver<P> {
        &self.driver
    }

    pub fn trx(&self) -> Trx {
        self.trx
    }

    /// Physical channel currently used.
    pub fn pch(&self) -> Option<u16> {
        self.driver.channel(self.trx).map(|ch| Medium::Rf.pch(ch))
    }

    pub fn initialize(&mut self) {
        self.client = None;
        self.table = [None; TX_BUFFERS];
        self.last_rssi = None;

        self.driver.initialize();
    }

    pub fn external_interrupt(&mut self) {
        self.driver.external_interrupt();
    }

    pub fn timer_expired(&mut self, id: AlarmId) {
        self.driver.timer_expired(id);
    }

    pub fn dma_complete<S: SnifferSink, L: PalListener>(&mut self, sniffer: &mut Sniffer<S>, listener: Option<&mut L>) {
        let mut events = Events { table: &mut self.table, last_rssi: &mut self.last_rssi, sniffer, listener };
        self.driver.dma_complete(&mut events);

        self.attach();
    }

    pub fn tasks<S: SnifferSink, L: PalListener>(&mut self, sniffer: &mut Sniffer<S>, listener: Option<&mut L>) {
        self.attach();

        let mut events = Events { table: &mut self.table, last_rssi: &mut self.last_rssi, sniffer, listener };
        self.driver.tasks(&mut events);
    }

    /// Opens the driver client once the transceiver is usable.
    fn attach(&mut self) {
        if self.client.is_some() || !self.driver.trx_ready(self.trx) { return }

        let Ok(client) = self.driver.open(self.trx) else { return };

        if self.driver.rx_ind_callback_register(client, true).is_err() || self.driver.tx_cfm_callback_register(client, true).is_err() {
            #[cfg(feature = "log")]
            defmt::warn!("PAL RF : Callbacks refused on {}", self.trx);

            self.driver.close(client);
            return;
        }

        #[cfg(feature = "log")]
        defmt::debug!("PAL RF : Attached to {}", self.trx);

        self.client = Some(client);
    }

    fn ready(&self) -> Result<(), PalError> {
        match self.driver.trx_ready(self.trx) {
            true => Ok( () ),
            false => Err( PalError::NotReady ),
        }
    }
}

/// PAL result of a driver PIB access.
fn pib(result: PibResult) -> Result<(), PalError> {
    match result {
        PibResult::Success => Ok( () ),
        PibResult::InvalidAttr => Err( PalError::NotSupported ),
        PibResult::InvalidHandle => Err( PalError::NotReady ),
        _ => Err( PalError::InvalidParam ),
    }
}

impl<P: Platform> PalMedium for PalRf<P> {
    fn status(&self) -> Status {
        match self.driver.status() {
            Status::Ready if !self.driver.trx_ready(self.trx) => Status::Error,
            Status::Ready if self.client.is_none() => Status::Busy,
            status => status,
        }
    }

    fn snr(&self) -> Result<u8, PalError> {
        self.ready()?;
        Ok( self.last_rssi.map_or(0, |rssi| rf_rm::snr_from_lqi(rf_rm::lqi_from_rssi(rssi))) )
    }

    fn zct(&self) -> Result<u32, PalError> {
        Err( PalError::NotSupported )
    }

    fn timer(&mut self) -> Result<u32, PalError> {
        Ok( self.driver.time_us() as u32 )
    }

    fn timer_extended(&mut self) -> Result<u64, PalError> {
        Ok( self.driver.time_us() )
    }

    fn carrier_detect(&self) -> Result<bool, PalError> {
        self.ready()?;
        Ok( self.driver.rx_in_progress(self.trx) )
    }

    fn noise_level(&self) -> Result<u8, PalError> {
        Err( PalError::NotSupported )
    }

    fn agc(&self) -> Result<u8, PalError> {
        Err( PalError::NotSupported )
    }

    fn set_agc(&mut self, _: u8) -> Result<(), PalError> {
        Err( PalError::NotSupported )
    }

    fn cca(&self) -> Result<bool, PalError> {
        self.ready()?;
        Ok( !self.driver.rx_in_progress(self.trx) && !self.driver.tx_in_progress(self.trx) )
    }

    fn channel(&self) -> Result<u16, PalError> {
        self.driver.channel(self.trx).ok_or(PalError::NotReady)
    }

    fn set_channel(&mut self, channel: u16) -> Result<(), PalError> {
        if channel == PCH_FREQUENCY_HOPPING { return Err( PalError::NotSupported ) }

        pib(self.driver.set_channel(self.trx, channel))
    }

    fn program_channel_switch(&mut self, time_us: u64, channel: u16) -> Result<(), PalError> {
        if channel == PCH_FREQUENCY_HOPPING { return Err( PalError::NotSupported ) }

        pib(self.driver.schedule_channel_switch(self.trx, time_us, channel))
    }

    fn get_configuration(&self, id: u16, value: &mut [u8]) -> Result<usize, PalError> {
        if PalAttribute::from_id(id) == Some(PalAttribute::RobustMode) {
            *value.first_mut().ok_or(PalError::InvalidParam)? = self.robust as u8;
            return Ok( 1 );
        }

        pib(self.driver.get_pib(self.trx, id, value))?;
        Ok( pib_size(id) )
    }

    fn set_configuration(&mut self, id: u16, value: &[u8]) -> Result<(), PalError> {
        if PalAttribute::from_id(id) == Some(PalAttribute::RobustMode) {
            let mode = match value {
                &[b] => RobustMode::from_byte(b),
                _ => None,
            };

            self.robust = mode.ok_or(PalError::InvalidParam)?;
            return Ok( () );
        }

        pib(self.driver.set_pib(self.trx, id, value))
    }

    fn msg_duration(&self, len: usize, scheme: PalScheme) -> Result<u32, PalError> {
        let phy = self.driver.phy(self.trx).ok_or(PalError::NotReady)?;

        let phy = match scheme {
            PalScheme::Rf => phy,
            PalScheme::RfFskFecOff => phy.with_fec(false),
            PalScheme::RfFskFecOn => phy.with_fec(true),
            _ => return Err( PalError::InvalidParam ),
        };

        Ok( phy.ppdu_duration_us(len) )
    }

    fn check_minimum_quality(&self, reference: PalScheme, modulation: PalScheme) -> bool {
        rf_rm::check_minimum_quality(reference, modulation)
    }

    fn less_robust_modulation(&self, a: PalScheme, b: PalScheme) -> PalScheme {
        rf_rm::less_robust_modulation(a, b)
    }

    fn robust_modulation(&self) -> Result<PalScheme, PalError> {
        self.ready()?;
        Ok( self.last_rssi.map_or(PalScheme::Rf, |rssi| rf_rm::robust_modulation(rssi, self.robust)) )
    }

    fn data_request(&mut self, channel: u16, request: &PalDataRequest<'_>) -> Result<(), PalTxResult> {
        let client = self.client.ok_or(PalTxResult::PhyError)?;

        let (scheme, fec) = match request.scheme {
            PalScheme::RfFskFecOn => (PalScheme::RfFskFecOn, true),
            PalScheme::Rf | PalScheme::RfFskFecOff => (PalScheme::RfFskFecOff, false),
            _ => return Err( PalTxResult::InvalidParam ),
        };

        if channel == PCH_FREQUENCY_HOPPING { return Err( PalTxResult::InvalidParam ) }

        if self.driver.channel(self.trx) != Some(channel) && self.driver.set_channel(self.trx, channel) != PibResult::Success {
            return Err( PalTxResult::InvalidParam );
        }

        let slot = self.table.iter().position(Option::is_none).ok_or(PalTxResult::BusyTx)?;

        let time = match request.mode {
            PalTxMode::Relative => TxTime::Relative(request.time_ini),

            PalTxMode::Absolute => {
                // PAL timer is the low word of the driver time.
                let now = self.driver.time_us();
                let delta = request.time_ini.wrapping_sub(now as u32) as i32;

                match delta > 0 {
                    true => TxTime::Absolute(now + delta as u64),
                    false => TxTime::Immediate,
                }
            },
        };

        let tx = TxRequest {
            time,
            cca: if request.cca { CcaMode::EnergyDetect } else { CcaMode::Off },
            attenuation: request.att_level,
            fec,
        };

        let handle = self.driver.tx_request(client, request.psdu, &tx).map_err(PalTxResult::from)?;

        self.table[slot] = Some(TxEntry { handle, buff_id: request.buff_id, pch: Medium::Rf.pch(channel), scheme });

        Ok( () )
    }
}



/// Driver listener translating driver events to PAL events.
struct Events<'a, S: SnifferSink, L: PalListener> {
    table: &'a mut [Option<TxEntry>; TX_BUFFERS],
    last_rssi: &'a mut Option<i8>,
    sniffer: &'a mut Sniffer<S>,
    listener: Option<&'a mut L>,
}

impl<'a, S: SnifferSink, L: PalListener> Rf215Listener for Events<'a, S, L> {
    fn rx_indication(&mut self, _: ClientHandle, indication: &RxIndication<'_>) {
        let time_ini = indication.time_ini_us as u32;
        let time_end = time_ini.wrapping_add(indication.ppdu_duration_us);
        let rssi = indication.rssi_dbm;

        let scheme = match indication.fec {
            true => PalScheme::RfFskFecOn,
            false => PalScheme::RfFskFecOff,
        };

        *self.last_rssi = Some(rssi);

        self.sniffer.record(Medium::Rf, &SniffedFrame {
            direction: Direction::Rx,
            scheme,
            channel: indication.channel,
            rssi,
            time_ini,
            time_end,
            psdu: indication.psdu,
        });

        if let Some(listener) = self.listener.as_deref_mut() {
            listener.data_indication(&PalDataIndication {
                pch: Medium::Rf.pch(indication.channel),
                psdu: indication.psdu,
                time_ini,
                time_end,
                rssi,
                lqi: rf_rm::lqi_from_rssi(rssi),
                scheme,
            });
        }
    }

    fn tx_confirm(&mut self, _: ClientHandle, handle: TxHandle, confirm: &TxConfirm, psdu: &[u8]) {
        let entry = self.table.iter_mut()
            .find(|e| e.is_some_and(|e| e.handle == handle))
            .and_then(Option::take);

        let Some(entry) = entry else {
            #[cfg(feature = "log")]
            defmt::warn!("PAL RF : Confirm of an unknown transmission");

            return;
        };

        let time_ini = confirm.time_ini_us as u32;
        let time_end = time_ini.wrapping_add(confirm.ppdu_duration_us);

        if confirm.result == TxResult::Success {
            self.sniffer.record(Medium::Rf, &SniffedFrame {
                direction: Direction::Tx,
                scheme: entry.scheme,
                channel: entry.pch & super::channel::PCH_CHANNEL_MASK,
                rssi: 0,
                time_ini,
                time_end,
                psdu,
            });
        }

        if let Some(listener) = self.listener.as_deref_mut() {
            listener.data_confirm(&PalDataConfirm {
                pch: entry.pch,
                buff_id: entry.buff_id,
                result: confirm.result.into(),
                time_ini,
                time_end,
            });
        }
    }
}
