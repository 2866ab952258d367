//! PRIME Physical Abstraction Layer.
//! Every MAC request names a physical channel (`pch`); the PAL decodes its
//! medium, strips the discriminator bits and forwards the request to the
//! medium adapter. TX and RX events of both media can be mirrored to a
//! sniffer sink.



pub mod channel;
pub mod medium;
pub mod plc;
pub mod rf;
pub mod rf_rm;
pub mod types;



pub use channel::*;
pub use medium::PalMedium;
pub use plc::{PalPlc, PlcPhy, PlcRxIndication, PlcTxConfirm, PlcTxRequest};
pub use rf_rm::RobustMode;
pub use rf::PalRf;
pub use types::*;



use crate::config::PalConfig;
use crate::driver::Rf215Driver;
use crate::error::{PalError, PalTxResult};
use crate::hal::port::{AlarmId, Platform};
use crate::sniffer::{Direction, SniffedFrame, Sniffer, SnifferSink};
use crate::Status;



/// Receives the confirms and indications of the PAL.
pub trait PalListener {
    /// A data request ended.
    fn data_confirm(&mut self, confirm: &PalDataConfirm);

    /// A frame was received. The PSDU is only valid during the call.
    fn data_indication(&mut self, indication: &PalDataIndication<'_>);
}

impl PalListener for () {
    fn data_confirm(&mut self, _: &PalDataConfirm) {}

    fn data_indication(&mut self, _: &PalDataIndication<'_>) {}
}



/// Status of the PAL from the status of its media. One medium in error
/// leaves the PAL usable on the other.
pub const fn compose_status(plc: Status, rf: Status) -> Status {
    match (plc, rf) {
        (Status::Ready, Status::Ready) | (Status::Ready, Status::Error) | (Status::Error, Status::Ready) => Status::Ready,
        (Status::Error, Status::Error) => Status::Error,
        _ => Status::Busy,
    }
}



/// PAL over an optional RF medium and an optional PLC medium.
/// An absent medium answers every request with `NoMedium`.
pub struct Pal<P: Platform, T: PlcPhy, S: SnifferSink, L: PalListener> {
    rf: Option<PalRf<P>>,

    plc: Option<PalPlc<T>>,

    sniffer: Sniffer<S>,

    /// MAC callbacks. Events are dropped until registered.
    listener: Option<L>,

    initialized: bool,
}

impl<P: Platform, T: PlcPhy, S: SnifferSink, L: PalListener> Pal<P, T, S, L> {
    /// Creates the PAL over the available media.
    pub fn new(config: &PalConfig, rf: Option<Rf215Driver<P>>, plc: Option<T>, sink: S) -> Self {
        let mut sniffer = Sniffer::new(sink);
        sniffer.enable(Medium::Rf, config.sniffer_rf);
        sniffer.enable(Medium::Plc, config.sniffer_plc);

        Self {
            rf: rf.map(|driver| PalRf::new(driver, config.rf_trx).with_robust_mode(config.robust_mode)),
            plc: plc.map(PalPlc::new),
            sniffer,
            listener: None,
            initialized: false,
        }
    }

    /// Initializes every medium. The RF medium stays `Busy` until its
    /// transceiver is configured.
    pub fn initialize(&mut self) {
        #[cfg(feature = "log")]
        defmt::debug!("PAL : Initializing");

        if let Some(rf) = self.rf.as_mut() {
            rf.initialize();
        }

        if let Some(plc) = self.plc.as_mut() {
            plc.initialize();
        }

        self.initialized = true;
    }

    pub fn status(&self) -> Status {
        if !self.initialized { return Status::Uninitialized }

        let plc = self.plc.as_ref().map_or(Status::Error, |m| m.status());
        let rf = self.rf.as_ref().map_or(Status::Error, |m| m.status());

        compose_status(plc, rf)
    }

    pub fn tasks(&mut self) {
        if let Some(rf) = self.rf.as_mut() {
            rf.tasks(&mut self.sniffer, self.listener.as_mut());
        }
    }

    /// Registers the MAC callbacks. Returns the previous listener.
    pub fn callback_register(&mut self, listener: L) -> Option<L> {
        self.listener.replace(listener)
    }

    pub fn listener(&self) -> Option<&L> {
        self.listener.as_ref()
    }

    pub fn rf(&self) -> Option<&PalRf<P>> {
        self.rf.as_ref()
    }

    pub fn plc(&self) -> Option<&PalPlc<T>> {
        self.plc.as_ref()
    }

    pub fn plc_mut(&mut self) -> Option<&mut PalPlc<T>> {
        self.plc.as_mut()
    }

    pub fn sniffer(&self) -> &Sniffer<S> {
        &self.sniffer
    }

    /// Starts a transmission on the medium of `request.pch`.
    pub fn data_request(&mut self, request: &PalDataRequest<'_>) -> Result<(), PalTxResult> {
        let (medium, channel) = decode(request.pch);

        let m = self.medium_mut(medium).map_err(|_| PalTxResult::NoMedium)?;
        m.data_request(channel, request)?;

        if medium == Medium::Plc {
            let duration = m.msg_duration(request.psdu.len(), request.scheme).unwrap_or(0);

            self.sniffer.record(Medium::Plc, &SniffedFrame {
                direction: Direction::Tx,
                scheme: request.scheme,
                channel,
                rssi: 0,
                time_ini: request.time_ini,
                time_end: request.time_ini.wrapping_add(duration),
                psdu: request.psdu,
            });
        }

        Ok( () )
    }

    pub fn get_snr(&self, pch: u16) -> Result<u8, PalError> {
        self.medium(pch)?.0.snr()
    }

    pub fn get_zct(&self, pch: u16) -> Result<u32, PalError> {
        self.medium(pch)?.0.zct()
    }

    pub fn get_timer(&mut self, pch: u16) -> Result<u32, PalError> {
        self.medium_pch_mut(pch)?.0.timer()
    }

    pub fn get_timer_extended(&mut self, pch: u16) -> Result<u64, PalError> {
        self.medium_pch_mut(pch)?.0.timer_extended()
    }

    pub fn get_cd(&self, pch: u16) -> Result<bool, PalError> {
        self.medium(pch)?.0.carrier_detect()
    }

    pub fn get_nl(&self, pch: u16) -> Result<u8, PalError> {
        self.medium(pch)?.0.noise_level()
    }

    pub fn get_agc(&self, pch: u16) -> Result<u8, PalError> {
        self.medium(pch)?.0.agc()
    }

    pub fn set_agc(&mut self, pch: u16, agc: u8) -> Result<(), PalError> {
        self.medium_pch_mut(pch)?.0.set_agc(agc)
    }

    /// Returns `true` if the channel is clear.
    pub fn get_cca(&self, pch: u16) -> Result<bool, PalError> {
        self.medium(pch)?.0.cca()
    }

    /// Physical channel in use on the medium of `pch`.
    pub fn get_channel(&self, pch: u16) -> Result<u16, PalError> {
        let (medium, _) = decode(pch);
        let channel = self.medium(pch)?.0.channel()?;

        Ok( medium.pch(channel) )
    }

    pub fn set_channel(&mut self, pch: u16) -> Result<(), PalError> {
        let (m, channel) = self.medium_pch_mut(pch)?;
        m.set_channel(channel)
    }

    /// Switches to `pch` at `time_us` on the medium timer.
    pub fn program_channel_switch(&mut self, pch: u16, time_us: u64) -> Result<(), PalError> {
        let (m, channel) = self.medium_pch_mut(pch)?;
        m.program_channel_switch(time_us, channel)
    }

    /// Reads an attribute. Returns the value length.
    pub fn get_configuration(&self, pch: u16, id: u16, value: &mut [u8]) -> Result<usize, PalError> {
        let (medium, _) = decode(pch);
        let (m, _) = self.medium(pch)?;

        match PalAttribute::from_id(id) {
            Some(PalAttribute::SnifferEnable) => {
                let out = value.first_mut().ok_or(PalError::InvalidParam)?;
                *out = self.sniffer.enabled(medium) as u8;

                Ok( 1 )
            },

            _ => m.get_configuration(id, value),
        }
    }

    pub fn set_configuration(&mut self, pch: u16, id: u16, value: &[u8]) -> Result<(), PalError> {
        let (medium, _) = decode(pch);

        match PalAttribute::from_id(id) {
            Some(PalAttribute::SnifferEnable) => {
                // Only media present can be sniffed.
                self.medium(pch)?;

                match value.first() {
                    Some(&enable) if enable <= 1 => {
                        #[cfg(feature = "log")]
                        defmt::debug!("PAL : Sniffer {} on {}", enable, medium);

                        self.sniffer.enable(medium, enable == 1);
                        Ok( () )
                    },

                    _ => Err( PalError::InvalidParam ),
                }
            },

            _ => self.medium_pch_mut(pch)?.0.set_configuration(id, value),
        }
    }

    /// On-air duration of a frame, in microseconds.
    pub fn get_msg_duration(&self, pch: u16, len: usize, scheme: PalScheme) -> Result<u32, PalError> {
        self.medium(pch)?.0.msg_duration(len, scheme)
    }

    pub fn check_minimum_quality(&self, pch: u16, reference: PalScheme, modulation: PalScheme) -> Result<bool, PalError> {
        Ok( self.medium(pch)?.0.check_minimum_quality(reference, modulation) )
    }

    pub fn get_less_robust_modulation(&self, pch: u16, a: PalScheme, b: PalScheme) -> Result<PalScheme, PalError> {
        Ok( self.medium(pch)?.0.less_robust_modulation(a, b) )
    }

    /// Scheme expected to decode at the signal level of the last frame
    /// received on the medium of `pch`, under its robust mode policy.
    pub fn get_robust_modulation(&self, pch: u16) -> Result<PalScheme, PalError> {
        self.medium(pch)?.0.robust_modulation()
    }

    /// IRQ pin of the RF215.
    pub fn rf_external_interrupt(&mut self) {
        if let Some(rf) = self.rf.as_mut() {
            rf.external_interrupt();
        }
    }

    /// SPI DMA of the RF215.
    pub fn rf_dma_complete(&mut self) {
        if let Some(rf) = self.rf.as_mut() {
            rf.dma_complete(&mut self.sniffer, self.listener.as_mut());
        }
    }

    /// Alarm of the RF215 driver.
    pub fn rf_timer_expired(&mut self, id: AlarmId) {
        if let Some(rf) = self.rf.as_mut() {
            rf.timer_expired(id);
        }
    }

    /// Transmission outcome of the PLC PHY.
    pub fn plc_tx_confirm(&mut self, confirm: &PlcTxConfirm) {
        let Some(plc) = self.plc.as_mut() else { return };

        let Some(confirm) = plc.tx_confirm(confirm) else {
            #[cfg(feature = "log")]
            defmt::warn!("PAL : PLC confirm without request");

            return;
        };

        if let Some(listener) = self.listener.as_mut() {
            listener.data_confirm(&confirm);
        }
    }

    /// Frame received by the PLC PHY.
    pub fn plc_rx_indication(&mut self, indication: &PlcRxIndication<'_>) {
        let Some(plc) = self.plc.as_ref() else { return };

        let indication = plc.rx_indication(indication);

        self.sniffer.record(Medium::Plc, &SniffedFrame {
            direction: Direction::Rx,
            scheme: indication.scheme,
            channel: indication.pch & PCH_CHANNEL_MASK,
            rssi: indication.rssi,
            time_ini: indication.time_ini,
            time_end: indication.time_end,
            psdu: indication.psdu,
        });

        if let Some(listener) = self.listener.as_mut() {
            listener.data_indication(&indication);
        }
    }

    fn medium(&self, pch: u16) -> Result<(&dyn PalMedium, u16), PalError> {
        let (medium, channel) = decode(pch);

        let m: Option<&dyn PalMedium> = match medium {
            Medium::Plc => self.plc.as_ref().map(|m| m as &dyn PalMedium),
            Medium::Rf => self.rf.as_ref().map(|m| m as &dyn PalMedium),
            Medium::Serial => None,
        };

        m.map(|m| (m, channel)).ok_or(PalError::NoMedium)
    }

    fn medium_pch_mut(&mut self, pch: u16) -> Result<(&mut dyn PalMedium, u16), PalError> {
        let (medium, channel) = decode(pch);
        Ok( (self.medium_mut(medium)?, channel) )
    }

    fn medium_mut(&mut self, medium: Medium) -> Result<&mut dyn PalMedium, PalError> {
        let m: Option<&mut dyn PalMedium> = match medium {
            Medium::Plc => self.plc.as_mut().map(|m| m as &mut dyn PalMedium),
            Medium::Rf => self.rf.as_mut().map(|m| m as &mut dyn PalMedium),
            Medium::Serial => None,
        };

        m.ok_or(PalError::NoMedium)
    }
}
