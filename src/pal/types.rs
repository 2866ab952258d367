//! Data types of the PAL interface.



/// Modulation scheme of a frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
#[repr(u8)]
pub enum PalScheme {
    PlcDbpsk = 0x00,
    PlcDqpsk = 0x01,
    PlcD8psk = 0x02,

    /// Convolutionally coded variants.
    PlcDbpskC = 0x04,
    PlcDqpskC = 0x05,
    PlcD8pskC = 0x06,

    /// Robust variants.
    PlcRDbpsk = 0x0C,
    PlcRDqpsk = 0x0D,

    /// RF scheme not selected.
    Rf = 0x10,

    RfFskFecOff = 0x11,
    RfFskFecOn = 0x12,
}

impl PalScheme {
    pub const fn from_byte(b: u8) -> Option<Self> {
        let scheme = match b {
            0x00 => Self::PlcDbpsk,
            0x01 => Self::PlcDqpsk,
            0x02 => Self::PlcD8psk,
            0x04 => Self::PlcDbpskC,
            0x05 => Self::PlcDqpskC,
            0x06 => Self::PlcD8pskC,
            0x0C => Self::PlcRDbpsk,
            0x0D => Self::PlcRDqpsk,
            0x10 => Self::Rf,
            0x11 => Self::RfFskFecOff,
            0x12 => Self::RfFskFecOn,
            _ => return None,
        };

        Some( scheme )
    }
}



/// Reference of the start time of a transmission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum PalTxMode {
    /// `time_ini` is a time of the PAL timer.
    Absolute,

    /// `time_ini` is a delay from the request.
    Relative,
}



/// Transmission requested by the MAC.
#[derive(Clone, Copy, Debug)]
pub struct PalDataRequest<'a> {
    pub pch: u16,

    pub psdu: &'a [u8],

    /// MAC buffer identifier, returned in the confirm.
    pub buff_id: u8,

    /// Start time in microseconds, see `mode`.
    pub time_ini: u32,

    pub mode: PalTxMode,

    /// Attenuation level of the medium.
    pub att_level: u8,

    pub scheme: PalScheme,

    /// Clear channel assessment before transmitting.
    pub cca: bool,

    /// Keep the receiver off during the transmission (PLC).
    pub disable_rx: bool,
}



/// Outcome of a `PalDataRequest`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PalDataConfirm {
    pub pch: u16,

    pub buff_id: u8,

    pub result: crate::error::PalTxResult,

    /// Start and end of the frame on the PAL timer.
    pub time_ini: u32,
    pub time_end: u32,
}



/// Frame received on a medium.
#[derive(Clone, Copy, Debug)]
pub struct PalDataIndication<'a> {
    pub pch: u16,

    /// Only valid during the indication.
    pub psdu: &'a [u8],

    /// Start and end of the frame on the PAL timer.
    pub time_ini: u32,
    pub time_end: u32,

    pub rssi: i8,

    /// Link quality of the frame.
    pub lqi: u8,

    pub scheme: PalScheme,
}



/// Attributes handled by the PAL itself, on any medium.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum PalAttribute {
    /// Sniffer output of the medium (1 byte, 0 or 1).
    SnifferEnable,

    /// Robust modulation policy of the RF medium (1 byte, `RobustMode`).
    RobustMode,
}

impl PalAttribute {
    pub const fn id(self) -> u16 {
        match self {
            Self::SnifferEnable => 0xFF00,
            Self::RobustMode => 0xFF01,
        }
    }

    pub const fn from_id(id: u16) -> Option<Self> {
        match id {
            0xFF00 => Some(Self::SnifferEnable),
            0xFF01 => Some(Self::RobustMode),
            _ => None,
        }
    }
}
