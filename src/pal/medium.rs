//! Operations every PAL medium provides.
//! Channel arguments are channel numbers of the medium, with the `pch`
//! discriminator already removed.



use crate::error::{PalError, PalTxResult};
use crate::Status;

use super::types::{PalDataRequest, PalScheme};



/// A physical medium behind the PAL.
pub trait PalMedium {
    /// Readiness of the medium. A PAL request on a medium that is not
    /// `Ready` fails.
    fn status(&self) -> Status;

    /// SNR of the last received frame, in 3 dB steps.
    fn snr(&self) -> Result<u8, PalError>;

    /// Last zero crossing time.
    fn zct(&self) -> Result<u32, PalError>;

    /// Medium timer, in microseconds.
    fn timer(&mut self) -> Result<u32, PalError>;

    /// Medium timer extended to 64 bits, in microseconds.
    fn timer_extended(&mut self) -> Result<u64, PalError>;

    /// Carrier detected.
    fn carrier_detect(&self) -> Result<bool, PalError>;

    fn noise_level(&self) -> Result<u8, PalError>;

    fn agc(&self) -> Result<u8, PalError>;

    fn set_agc(&mut self, agc: u8) -> Result<(), PalError>;

    /// Returns `true` if the channel is clear.
    fn cca(&self) -> Result<bool, PalError>;

    fn channel(&self) -> Result<u16, PalError>;

    fn set_channel(&mut self, channel: u16) -> Result<(), PalError>;

    /// Switches to `channel` at `time_us` on the medium timer.
    fn program_channel_switch(&mut self, time_us: u64, channel: u16) -> Result<(), PalError>;

    /// Reads an attribute of the medium. Returns the value length.
    fn get_configuration(&self, id: u16, value: &mut [u8]) -> Result<usize, PalError>;

    fn set_configuration(&mut self, id: u16, value: &[u8]) -> Result<(), PalError>;

    /// On-air duration of a frame, in microseconds.
    fn msg_duration(&self, len: usize, scheme: PalScheme) -> Result<u32, PalError>;

    /// Returns `true` if `modulation` meets the quality of `reference`.
    fn check_minimum_quality(&self, reference: PalScheme, modulation: PalScheme) -> bool;

    fn less_robust_modulation(&self, a: PalScheme, b: PalScheme) -> PalScheme;

    /// Scheme expected to decode at the signal level of the last frame.
    fn robust_modulation(&self) -> Result<PalScheme, PalError>;

    /// Starts a transmission on `channel`. The outcome of an accepted
    /// request arrives through the data confirm.
    fn data_request(&mut self, channel: u16, request: &PalDataRequest<'_>) -> Result<(), PalTxResult>;
}
