//! `enum`s and `struct`s used in the RF215 PHY configuration.



use super::{BbcRegister, RfRegister};



/// One of the two transceivers of the chip.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum Trx {
    /// Sub-GHz transceiver (RF09 / BBC0).
    Rf09 = 0,

    /// 2.4 GHz transceiver (RF24 / BBC1).
    Rf24 = 1,
}

impl Trx {
    /// Both transceivers, in index order.
    pub const ALL: [Trx; 2] = [Trx::Rf09, Trx::Rf24];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Address of a transceiver register.
    pub const fn rf(self, reg: RfRegister) -> u16 {
        0x0100 * (self as u16 + 1) + reg as u16
    }

    /// Address of a baseband register.
    pub const fn bbc(self, reg: BbcRegister) -> u16 {
        0x0300 + 0x0100 * self as u16 + reg as u16
    }

    /// Start of the receive frame buffer.
    pub const fn rx_buffer(self) -> u16 {
        0x2000 + 0x1000 * self as u16
    }

    /// Start of the transmit frame buffer.
    pub const fn tx_buffer(self) -> u16 {
        0x2800 + 0x1000 * self as u16
    }

    /// Offset subtracted from the channel center frequency before encoding.
    pub const fn frequency_offset_hz(self) -> u32 {
        match self {
            Trx::Rf09 => 0,
            Trx::Rf24 => 1_500_000_000,
        }
    }
}



/// Part numbers reported by the RF_PN register.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum PartNumber {
    /// AT86RF215: both transceivers.
    Rf215 = 0x34,

    /// AT86RF215IQ: both transceivers, I/Q radio.
    Rf215Iq = 0x35,

    /// AT86RF215M: sub-GHz transceiver only.
    Rf215M = 0x36,
}

impl PartNumber {
    pub const fn from_byte(pn: u8) -> Option<Self> {
        match pn {
            0x34 => Some(PartNumber::Rf215),
            0x35 => Some(PartNumber::Rf215Iq),
            0x36 => Some(PartNumber::Rf215M),
            _ => None,
        }
    }

    /// Returns `true` if the part has the given transceiver.
    pub const fn has(self, trx: Trx) -> bool {
        match (self, trx) {
            (PartNumber::Rf215M, Trx::Rf24) => false,
            _ => true,
        }
    }
}



/// FSK symbol rates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum FskSymRate {
    /// 50 ksymbol/s.
    Rate50 = 0,

    /// 100 ksymbol/s.
    Rate100 = 1,

    /// 150 ksymbol/s.
    Rate150 = 2,

    /// 200 ksymbol/s.
    Rate200 = 3,

    /// 300 ksymbol/s.
    Rate300 = 4,

    /// 400 ksymbol/s.
    Rate400 = 5,
}

impl FskSymRate {
    /// Symbol rate in symbols per second.
    pub const fn hz(self) -> u32 {
        match self {
            FskSymRate::Rate50 => 50_000,
            FskSymRate::Rate100 => 100_000,
            FskSymRate::Rate150 => 150_000,
            FskSymRate::Rate200 => 200_000,
            FskSymRate::Rate300 => 300_000,
            FskSymRate::Rate400 => 400_000,
        }
    }

    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(FskSymRate::Rate50),
            1 => Some(FskSymRate::Rate100),
            2 => Some(FskSymRate::Rate150),
            3 => Some(FskSymRate::Rate200),
            4 => Some(FskSymRate::Rate300),
            5 => Some(FskSymRate::Rate400),
            _ => None,
        }
    }
}



/// FSK modulation indexes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum FskModIdx {
    /// Modulation index 0.5.
    Half = 0,

    /// Modulation index 1.0.
    One = 1,
}

impl FskModIdx {
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(FskModIdx::Half),
            1 => Some(FskModIdx::One),
            _ => None,
        }
    }
}



/// Length of the frame check sequence appended by the baseband.
pub const FCS_LEN: usize = 4;

/// Default preamble length in octets.
pub const DEFAULT_PREAMBLE: u8 = 8;

/// MR-FSK PHY configuration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub struct PhyConfig {
    /// Symbol rate.
    pub symrate: FskSymRate,

    /// Modulation index.
    pub modidx: FskModIdx,

    /// Convolutional FEC of PHR and PSDU.
    pub fec: bool,

    /// Preamble length in octets (4 minimum).
    pub preamble: u8,
}

impl PhyConfig {
    /// Size of the serialized configuration.
    pub const SIZE: usize = 4;

    pub const fn new(symrate: FskSymRate, modidx: FskModIdx) -> Self {
        Self { symrate, modidx, fec: false, preamble: DEFAULT_PREAMBLE }
    }

    /// Same configuration with FEC enabled or disabled.
    pub const fn with_fec(mut self, fec: bool) -> Self {
        self.fec = fec;
        self
    }

    pub const fn to_bytes(&self) -> [u8; Self::SIZE] {
        [self.symrate as u8, self.modidx as u8, self.fec as u8, self.preamble]
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let raw: [u8; Self::SIZE] = bytes.get(..Self::SIZE)?.try_into().ok()?;
        let [symrate, modidx, fec, preamble] = raw;

        if fec > 1 || preamble < 4 { return None }

        Some( Self {
            symrate: FskSymRate::from_byte(symrate)?,
            modidx: FskModIdx::from_byte(modidx)?,
            fec: fec == 1,
            preamble,
        })
    }

    /// On-air duration of a frame carrying `psdu_len` bytes (FCS excluded).
    pub const fn ppdu_duration_us(&self, psdu_len: usize) -> u32 {
        // PHR and PSDU (with FCS) are rate 1/2 coded with FEC.
        let payload = (2 + psdu_len + FCS_LEN) as u64 * 8;
        let coded = if self.fec { 2 * payload } else { payload };

        let bits = self.preamble as u64 * 8 + 16 + coded;
        let rate = self.symrate.hz() as u64;

        ((bits * 1_000_000 + rate - 1) / rate) as u32
    }

    /// Duration of the synchronization header (preamble and SFD).
    pub const fn shr_duration_us(&self) -> u32 {
        let bits = self.preamble as u64 * 8 + 16;
        (bits * 1_000_000 / self.symrate.hz() as u64) as u32
    }

    /// FSKC0..FSKPLL register block.
    pub(crate) const fn fsk_registers(&self) -> [u8; 6] {
        let midx: u8 = match self.modidx {
            FskModIdx::Half => 0x01 << 1,
            FskModIdx::One => 0x03 << 1,
        };

        [
            // BT = 2, MIDXS = 1, 2-FSK.
            0xC0 | 0x10 | midx,
            self.symrate as u8,
            0x00,
            0x85,
            0x00,
            self.preamble,
        ]
    }

    /// FSKPHRTX register.
    pub(crate) const fn phr_tx(&self) -> u8 {
        if self.fec { super::phrtx::DW | super::phrtx::SFD } else { super::phrtx::DW }
    }
}



/// Frequency band and operating mode of a transceiver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum Band {
    /// 863 MHz, operating mode 1 (50 ksym/s, 200 kHz).
    Fsk863Opm1,

    /// 863 MHz, operating mode 2 (100 ksym/s, 400 kHz).
    Fsk863Opm2,

    /// 863 MHz, operating mode 3 (200 ksym/s, 400 kHz).
    Fsk863Opm3,

    /// 915 MHz, operating mode 1 (50 ksym/s, 200 kHz).
    Fsk915Opm1,

    /// 2450 MHz, operating mode 1 (50 ksym/s, 200 kHz).
    Fsk2450Opm1,
}

impl Band {
    pub const fn id(self) -> u16 {
        match self {
            Band::Fsk863Opm1 => 0x0101,
            Band::Fsk863Opm2 => 0x0102,
            Band::Fsk863Opm3 => 0x0103,
            Band::Fsk915Opm1 => 0x0201,
            Band::Fsk2450Opm1 => 0x0301,
        }
    }

    pub const fn from_id(id: u16) -> Option<Self> {
        match id {
            0x0101 => Some(Band::Fsk863Opm1),
            0x0102 => Some(Band::Fsk863Opm2),
            0x0103 => Some(Band::Fsk863Opm3),
            0x0201 => Some(Band::Fsk915Opm1),
            0x0301 => Some(Band::Fsk2450Opm1),
            _ => None,
        }
    }

    /// Transceiver able to operate in this band.
    pub const fn trx(self) -> Trx {
        match self {
            Band::Fsk2450Opm1 => Trx::Rf24,
            _ => Trx::Rf09,
        }
    }

    /// Center frequency of channel 0.
    pub const fn freq0_hz(self) -> u32 {
        match self {
            Band::Fsk863Opm1 => 863_125_000,
            Band::Fsk863Opm2 | Band::Fsk863Opm3 => 863_225_000,
            Band::Fsk915Opm1 => 902_200_000,
            Band::Fsk2450Opm1 => 2_400_200_000,
        }
    }

    pub const fn spacing_hz(self) -> u32 {
        match self {
            Band::Fsk863Opm2 | Band::Fsk863Opm3 => 400_000,
            _ => 200_000,
        }
    }

    /// Number of channels.
    pub const fn channels(self) -> u16 {
        match self {
            Band::Fsk863Opm1 => 34,
            Band::Fsk863Opm2 | Band::Fsk863Opm3 => 17,
            Band::Fsk915Opm1 => 129,
            Band::Fsk2450Opm1 => 416,
        }
    }

    /// Default PHY of the operating mode.
    pub const fn phy(self) -> PhyConfig {
        match self {
            Band::Fsk863Opm2 => PhyConfig::new(FskSymRate::Rate100, FskModIdx::One),
            Band::Fsk863Opm3 => PhyConfig::new(FskSymRate::Rate200, FskModIdx::Half),
            _ => PhyConfig::new(FskSymRate::Rate50, FskModIdx::One),
        }
    }

    /// Center frequency of a channel.
    pub const fn frequency_hz(self, channel: u16) -> Option<u32> {
        if channel >= self.channels() { return None }

        Some( self.freq0_hz() + channel as u32 * self.spacing_hz() )
    }

    /// RFn_CS..RFn_CNM register block for a channel.
    pub(crate) const fn channel_registers(self, channel: u16) -> [u8; 5] {
        let f0 = (self.freq0_hz() - self.trx().frequency_offset_hz()) / 25_000;

        [
            (self.spacing_hz() / 25_000) as u8,
            f0 as u8,
            (f0 >> 8) as u8,
            channel as u8,
            ((channel >> 8) & 0x01) as u8,
        ]
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_addresses() {
        assert_eq!(Trx::Rf09.rf(RfRegister::Command), 0x0103);
        assert_eq!(Trx::Rf24.rf(RfRegister::EdValue), 0x0210);
        assert_eq!(Trx::Rf09.bbc(BbcRegister::PhyControl), 0x0301);
        assert_eq!(Trx::Rf24.bbc(BbcRegister::FskConfig), 0x0460);
        assert_eq!(Trx::Rf24.tx_buffer(), 0x3800);
    }

    #[test]
    fn channel_encoding() {
        // 863.125 MHz / 25 kHz = 34525 = 0x86DD, 200 kHz / 25 kHz = 8.
        assert_eq!(Band::Fsk863Opm1.channel_registers(3), [8, 0xDD, 0x86, 3, 0]);

        // 2.4 GHz band is encoded relative to 1.5 GHz: 900.2 MHz / 25 kHz = 36008.
        assert_eq!(Band::Fsk2450Opm1.channel_registers(300), [8, 0xA8, 0x8C, 44, 1]);

        assert_eq!(Band::Fsk863Opm1.frequency_hz(33), Some(869_725_000));
        assert_eq!(Band::Fsk863Opm1.frequency_hz(34), None);
    }

    #[test]
    fn ppdu_duration() {
        let phy = Band::Fsk863Opm1.phy();

        // 8 octets preamble + SFD + PHR + 10 bytes + FCS = 208 bits at 20 us.
        assert_eq!(phy.ppdu_duration_us(10), 4160);

        // PHR and PSDU doubled.
        assert_eq!(phy.with_fec(true).ppdu_duration_us(10), 6720);
    }

    #[test]
    fn phy_config_bytes() {
        let phy = Band::Fsk863Opm3.phy().with_fec(true);

        assert_eq!(PhyConfig::from_bytes(&phy.to_bytes()), Some(phy));
        assert_eq!(PhyConfig::from_bytes(&[9, 0, 0, 8]), None);
        assert_eq!(PhyConfig::from_bytes(&[0, 0, 0, 2]), None);
        assert_eq!(PhyConfig::from_bytes(&[0, 0]), None);
    }
}
