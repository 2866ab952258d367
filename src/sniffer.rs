//! Sniffer output of the PAL.
//! Every frame is serialized as a 17 byte header followed by the PSDU:
//!
//! | Offset | Size | Field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 1    | Medium (`0x10` PLC, `0x20` RF)         |
//! | 1      | 1    | Format version                         |
//! | 2      | 1    | Direction (0 RX, 1 TX)                 |
//! | 3      | 1    | Modulation scheme                      |
//! | 4      | 2    | Channel number (big endian)            |
//! | 6      | 1    | RSSI in dBm                            |
//! | 7      | 4    | Start time in us (big endian)          |
//! | 11     | 4    | End time in us (big endian)            |
//! | 15     | 2    | PSDU length (big endian)               |
//!
//! The sink is fire and forget: a refused frame is dropped and counted.



use crate::config::PSDU_MAX_LEN;
use crate::pal::{Medium, PalScheme};



/// Version of the frame format.
pub const SNIFFER_VERSION: u8 = 0x01;

pub const SNIFFER_HEADER_LEN: usize = 17;

/// Longest frame handed to the sink.
pub const SNIFFER_FRAME_MAX_LEN: usize = SNIFFER_HEADER_LEN + PSDU_MAX_LEN;



/// Serial output of the sniffer frames.
pub trait SnifferSink {
    /// Queues a frame. Returns `false` if the frame cannot be taken.
    fn write(&mut self, frame: &[u8]) -> bool;
}



/// Direction of a sniffed frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum Direction {
    Rx = 0,
    Tx = 1,
}



/// A frame seen on a medium.
#[derive(Clone, Copy, Debug)]
pub struct SniffedFrame<'a> {
    pub direction: Direction,
    pub scheme: PalScheme,
    pub channel: u16,
    pub rssi: i8,
    pub time_ini: u32,
    pub time_end: u32,
    pub psdu: &'a [u8],
}



pub struct Sniffer<S: SnifferSink> {
    sink: S,

    /// Output enabled for PLC and RF.
    plc: bool,
    rf: bool,

    /// Frames taken by the sink.
    sent: u32,

    /// Frames refused by the sink or too long.
    dropped: u32,

    buffer: [u8; SNIFFER_FRAME_MAX_LEN],
}

impl<S: SnifferSink> Sniffer<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, plc: false, rf: false, sent: 0, dropped: 0, buffer: [0u8; SNIFFER_FRAME_MAX_LEN] }
    }

    pub fn enabled(&self, medium: Medium) -> bool {
        match medium {
            Medium::Plc => self.plc,
            Medium::Rf => self.rf,
            Medium::Serial => false,
        }
    }

    /// Enables or disables the output of a medium. The serial medium is
    /// never sniffed.
    pub fn enable(&mut self, medium: Medium, enable: bool) -> bool {
        match medium {
            Medium::Plc => self.plc = enable,
            Medium::Rf => self.rf = enable,
            Medium::Serial => return false,
        }

        true
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Sends a frame if the medium is sniffed.
    pub fn record(&mut self, medium: Medium, frame: &SniffedFrame<'_>) {
        if !self.enabled(medium) { return }

        let Some(len) = serialize(medium, frame, &mut self.buffer) else {
            self.dropped = self.dropped.wrapping_add(1);
            return;
        };

        if self.sink.write(&self.buffer[..len]) {
            self.sent = self.sent.wrapping_add(1);
        } else {
            #[cfg(feature = "log")]
            defmt::trace!("Sniffer : Frame dropped");

            self.dropped = self.dropped.wrapping_add(1);
        }
    }
}



/// Writes the frame into `out`. Returns the frame length, or `None` if it
/// does not fit.
pub fn serialize(medium: Medium, frame: &SniffedFrame<'_>, out: &mut [u8]) -> Option<usize> {
    let len = SNIFFER_HEADER_LEN + frame.psdu.len();

    if len > out.len() || frame.psdu.len() > u16::MAX as usize { return None }

    let kind = match medium {
        Medium::Plc => 0x10,
        Medium::Rf => 0x20,
        Medium::Serial => return None,
    };

    out[0] = kind;
    out[1] = SNIFFER_VERSION;
    out[2] = frame.direction as u8;
    out[3] = frame.scheme as u8;
    out[4..6].copy_from_slice(&frame.channel.to_be_bytes());
    out[6] = frame.rssi as u8;
    out[7..11].copy_from_slice(&frame.time_ini.to_be_bytes());
    out[11..15].copy_from_slice(&frame.time_end.to_be_bytes());
    out[15..17].copy_from_slice(&(frame.psdu.len() as u16).to_be_bytes());
    out[17..len].copy_from_slice(frame.psdu);

    Some( len )
}
