//! PLC medium of the PAL.
//! The PLC PHY is an external driver. The board forwards its TX confirms
//! and RX indications to the PAL entry points.



use crate::error::{PalError, PalTxResult};
use crate::Status;

use super::channel::Medium;
use super::medium::PalMedium;
use super::types::*;



/// PLC PHY driver.
pub trait PlcPhy {
    /// Initialization of the PHY completed.
    fn is_ready(&self) -> bool;

    /// Starts a transmission. Returns `false` if the PHY cannot take it.
    fn transmit(&mut self, psdu: &[u8], request: &PlcTxRequest) -> bool;

    fn snr(&self) -> u8;

    fn zct(&self) -> u32;

    /// PHY timer in microseconds.
    fn timer(&self) -> u32;

    /// Monotonic 64 bit PHY timer in microseconds.
    fn timer_extended(&self) -> u64;

    fn carrier_detect(&self) -> bool;

    fn noise_level(&self) -> u8;

    fn agc(&self) -> u8;

    fn set_agc(&mut self, agc: u8) -> bool;

    fn channel(&self) -> u16;

    fn set_channel(&mut self, channel: u16) -> bool;

    /// Reads a PHY attribute. Returns the value length.
    fn get_configuration(&self, id: u16, value: &mut [u8]) -> Option<usize>;

    fn set_configuration(&mut self, id: u16, value: &[u8]) -> bool;

    /// On-air duration of a frame in microseconds.
    fn msg_duration(&self, len: usize, request: &PlcTxRequest) -> u32;
}



/// Transmission parameters handed to the PLC PHY.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlcTxRequest {
    pub time_ini: u32,
    pub mode: PalTxMode,
    pub att_level: u8,
    pub scheme: PalScheme,
    pub cca: bool,
    pub disable_rx: bool,
    pub buff_id: u8,
}

impl Default for PlcTxRequest {
    fn default() -> Self {
        Self {
            time_ini: 0,
            mode: PalTxMode::Relative,
            att_level: 0,
            scheme: PalScheme::PlcDbpsk,
            cca: false,
            disable_rx: false,
            buff_id: 0,
        }
    }
}



/// Outcome of a PLC transmission, reported by the PHY.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlcTxConfirm {
    pub result: PalTxResult,
    pub time_ini: u32,
    pub time_end: u32,
}

/// Frame received by the PLC PHY.
#[derive(Clone, Copy, Debug)]
pub struct PlcRxIndication<'a> {
    pub psdu: &'a [u8],
    pub time_ini: u32,
    pub time_end: u32,
    pub rssi: i8,
    pub lqi: u8,
    pub scheme: PalScheme,
}



/// Robustness rank of the PLC schemes, higher is more robust.
pub const fn robustness(scheme: PalScheme) -> Option<u8> {
    let rank = match scheme {
        PalScheme::PlcRDbpsk => 8,
        PalScheme::PlcRDqpsk => 7,
        PalScheme::PlcDbpskC => 6,
        PalScheme::PlcDqpskC => 5,
        PalScheme::PlcDbpsk => 4,
        PalScheme::PlcD8pskC => 3,
        PalScheme::PlcDqpsk => 2,
        PalScheme::PlcD8psk => 1,
        _ => return None,
    };

    Some( rank )
}



pub struct PalPlc<T: PlcPhy> {
    phy: T,

    initialized: bool,

    /// Buffer of the transmission in progress.
    pending: Option<u8>,
}

impl<T: PlcPhy> PalPlc<T> {
    pub fn new(phy: T) -> Self {
        Self { phy, initialized: false, pending: None }
    }

    pub fn initialize(&mut self) {
        self.initialized = true;
        self.pending = None;
    }

    pub fn phy(&self) -> &T {
        &self.phy
    }

    pub fn phy_mut(&mut self) -> &mut T {
        &mut self.phy
    }

    /// Physical channel currently used.
    pub fn pch(&self) -> u16 {
        Medium::Plc.pch(self.phy.channel())
    }

    /// Matches a PHY confirm with the pending request.
    pub fn tx_confirm(&mut self, confirm: &PlcTxConfirm) -> Option<PalDataConfirm> {
        let buff_id = self.pending.take()?;

        Some( PalDataConfirm {
            pch: self.pch(),
            buff_id,
            result: confirm.result,
            time_ini: confirm.time_ini,
            time_end: confirm.time_end,
        })
    }

    pub fn rx_indication<'a>(&self, indication: &PlcRxIndication<'a>) -> PalDataIndication<'a> {
        PalDataIndication {
            pch: self.pch(),
            psdu: indication.psdu,
            time_ini: indication.time_ini,
            time_end: indication.time_end,
            rssi: indication.rssi,
            lqi: indication.lqi,
            scheme: indication.scheme,
        }
    }
}

impl<T: PlcPhy> PalMedium for PalPlc<T> {
    fn status(&self) -> Status {
        match (self.initialized, self.phy.is_ready()) {
            (false, _) => Status::Uninitialized,
            (true, true) => Status::Ready,
            (true, false) => Status::Busy,
        }
    }

    fn snr(&self) -> Result<u8, PalError> {
        Ok( self.phy.snr() )
    }

    fn zct(&self) -> Result<u32, PalError> {
        Ok( self.phy.zct() )
    }

    fn timer(&mut self) -> Result<u32, PalError> {
        Ok( self.phy.timer() )
    }

    fn timer_extended(&mut self) -> Result<u64, PalError> {
        Ok( self.phy.timer_extended() )
    }

    fn carrier_detect(&self) -> Result<bool, PalError> {
        Ok( self.phy.carrier_detect() )
    }

    fn noise_level(&self) -> Result<u8, PalError> {
        Ok( self.phy.noise_level() )
    }

    fn agc(&self) -> Result<u8, PalError> {
        Ok( self.phy.agc() )
    }

    fn set_agc(&mut self, agc: u8) -> Result<(), PalError> {
        self.phy.set_agc(agc).then_some(()).ok_or(PalError::InvalidParam)
    }

    fn cca(&self) -> Result<bool, PalError> {
        Ok( !self.phy.carrier_detect() )
    }

    fn channel(&self) -> Result<u16, PalError> {
        Ok( self.phy.channel() )
    }

    fn set_channel(&mut self, channel: u16) -> Result<(), PalError> {
        self.phy.set_channel(channel).then_some(()).ok_or(PalError::InvalidParam)
    }

    fn program_channel_switch(&mut self, _: u64, _: u16) -> Result<(), PalError> {
        Err( PalError::NotSupported )
    }

    fn get_configuration(&self, id: u16, value: &mut [u8]) -> Result<usize, PalError> {
        self.phy.get_configuration(id, value).ok_or(PalError::InvalidParam)
    }

    fn set_configuration(&mut self, id: u16, value: &[u8]) -> Result<(), PalError> {
        self.phy.set_configuration(id, value).then_some(()).ok_or(PalError::InvalidParam)
    }

    fn msg_duration(&self, len: usize, scheme: PalScheme) -> Result<u32, PalError> {
        if robustness(scheme).is_none() { return Err( PalError::InvalidParam ) }

        let request = PlcTxRequest { scheme, ..PlcTxRequest::default() };

        Ok( self.phy.msg_duration(len, &request) )
    }

    fn check_minimum_quality(&self, reference: PalScheme, modulation: PalScheme) -> bool {
        match (robustness(reference), robustness(modulation)) {
            (Some(reference), Some(modulation)) => modulation >= reference,
            _ => false,
        }
    }

    fn less_robust_modulation(&self, a: PalScheme, b: PalScheme) -> PalScheme {
        match (robustness(a), robustness(b)) {
            (Some(ra), Some(rb)) if rb < ra => b,
            (Some(_), _) => a,
            _ => b,
        }
    }

    fn robust_modulation(&self) -> Result<PalScheme, PalError> {
        Err( PalError::NotSupported )
    }

    fn data_request(&mut self, channel: u16, request: &PalDataRequest<'_>) -> Result<(), PalTxResult> {
        if self.status() != Status::Ready { return Err( PalTxResult::PhyError ) }

        if request.psdu.is_empty() { return Err( PalTxResult::InvalidLength ) }

        if robustness(request.scheme).is_none() { return Err( PalTxResult::InvalidParam ) }

        if self.pending.is_some() { return Err( PalTxResult::BusyTx ) }

        if channel != self.phy.channel() && !self.phy.set_channel(channel) {
            return Err( PalTxResult::InvalidParam );
        }

        let phy_request = PlcTxRequest {
            time_ini: request.time_ini,
            mode: request.mode,
            att_level: request.att_level,
            scheme: request.scheme,
            cca: request.cca,
            disable_rx: request.disable_rx,
            buff_id: request.buff_id,
        };

        if !self.phy.transmit(request.psdu, &phy_request) {
            #[cfg(feature = "log")]
            defmt::debug!("PAL PLC : PHY refused buffer {=u8}", request.buff_id);

            return Err( PalTxResult::BusyTx );
        }

        self.pending = Some(request.buff_id);

        Ok( () )
    }
}



#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPlc;

    fn request(psdu: &[u8]) -> PalDataRequest<'_> {
        PalDataRequest {
            pch: 1,
            psdu,
            buff_id: 7,
            time_ini: 1_000,
            mode: PalTxMode::Relative,
            att_level: 0,
            scheme: PalScheme::PlcDbpskC,
            cca: false,
            disable_rx: false,
        }
    }

    fn ready() -> PalPlc<MockPlc> {
        let mut plc = PalPlc::new(MockPlc { ready: true, channel: 1, ..MockPlc::default() });
        plc.initialize();
        plc
    }

    #[test]
    fn status_follows_the_phy() {
        let mut plc = PalPlc::new(MockPlc::default());
        assert_eq!(plc.status(), Status::Uninitialized);

        plc.initialize();
        assert_eq!(plc.status(), Status::Busy);

        plc.phy_mut().ready = true;
        assert_eq!(plc.status(), Status::Ready);
    }

    #[test]
    fn one_transmission_at_a_time() {
        let mut plc = ready();

        assert_eq!(plc.data_request(1, &request(&[1, 2])), Ok(()));
        assert_eq!(plc.data_request(1, &request(&[3])), Err(PalTxResult::BusyTx));

        let (psdu, sent) = &plc.phy().sent[0];
        assert_eq!(psdu, &vec![1, 2]);
        assert_eq!(sent.buff_id, 7);
        assert_eq!(sent.scheme, PalScheme::PlcDbpskC);

        let confirm = plc.tx_confirm(&PlcTxConfirm { result: PalTxResult::Success, time_ini: 10, time_end: 20 }).unwrap();
        assert_eq!(confirm.buff_id, 7);
        assert_eq!(confirm.pch, 1);

        // Stray confirm.
        assert!(plc.tx_confirm(&PlcTxConfirm { result: PalTxResult::Success, time_ini: 0, time_end: 0 }).is_none());
        assert_eq!(plc.data_request(1, &request(&[3])), Ok(()));
    }

    #[test]
    fn request_switches_channel() {
        let mut plc = ready();

        assert_eq!(plc.data_request(3, &request(&[1])), Ok(()));
        assert_eq!(plc.phy().channel, 3);

        let mut plc = ready();
        assert_eq!(plc.data_request(9, &request(&[1])), Err(PalTxResult::InvalidParam));
    }

    #[test]
    fn rejected_requests() {
        let mut plc = ready();

        assert_eq!(plc.data_request(1, &request(&[])), Err(PalTxResult::InvalidLength));

        let rf = PalDataRequest { scheme: PalScheme::RfFskFecOn, ..request(&[1]) };
        assert_eq!(plc.data_request(1, &rf), Err(PalTxResult::InvalidParam));

        plc.phy_mut().refuse = true;
        assert_eq!(plc.data_request(1, &request(&[1])), Err(PalTxResult::BusyTx));
        assert!(plc.tx_confirm(&PlcTxConfirm { result: PalTxResult::Success, time_ini: 0, time_end: 0 }).is_none());
    }

    #[test]
    fn modulation_ranking() {
        let plc = ready();

        assert!(plc.check_minimum_quality(PalScheme::PlcDqpsk, PalScheme::PlcDbpskC));
        assert!(!plc.check_minimum_quality(PalScheme::PlcRDbpsk, PalScheme::PlcD8psk));
        assert!(plc.check_minimum_quality(PalScheme::PlcD8pskC, PalScheme::PlcD8pskC));
        assert!(!plc.check_minimum_quality(PalScheme::PlcDbpsk, PalScheme::RfFskFecOn));

        assert_eq!(plc.less_robust_modulation(PalScheme::PlcRDqpsk, PalScheme::PlcD8psk), PalScheme::PlcD8psk);
        assert_eq!(plc.less_robust_modulation(PalScheme::PlcDbpsk, PalScheme::PlcDbpskC), PalScheme::PlcDbpsk);
    }

    #[test]
    fn extended_timer_spans_several_wraps() {
        let mut plc = ready();

        plc.phy_mut().timer = 0x1000;
        assert_eq!(plc.timer_extended(), Ok(0x1000));

        // One and a half wraps later, without a sample in between.
        plc.phy_mut().timer = 0x1_8000_1000;
        assert_eq!(plc.timer_extended(), Ok(0x1_8000_1000));
        assert_eq!(plc.timer(), Ok(0x8000_1000));
    }

    #[test]
    fn duration_and_attributes() {
        let mut plc = ready();

        assert_eq!(plc.msg_duration(10, PalScheme::PlcDbpsk), Ok(1_000));
        assert_eq!(plc.msg_duration(10, PalScheme::Rf), Err(PalError::InvalidParam));

        assert_eq!(plc.set_configuration(0x0010, &[1, 2]), Ok(()));

        let mut value = [0u8; 4];
        assert_eq!(plc.get_configuration(0x0010, &mut value), Ok(2));
        assert_eq!(&value[..2], &[1, 2]);
        assert_eq!(plc.get_configuration(0x0011, &mut value), Err(PalError::InvalidParam));

        assert_eq!(plc.program_channel_switch(0, 2), Err(PalError::NotSupported));
    }
}
