//! Register map of the AT86RF215.
//! Only the registers touched by the driver are listed. Transceiver and
//! baseband registers are offsets from the block base of each TRX.



/// Common chip registers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u16)]
pub enum Register {
    /// Interrupt status of RF09, RF24, BBC0 and BBC1 (4 consecutive bytes).
    /// Cleared by reading.
    IrqStatus = 0x0000,

    /// Part number.
    PartNumber = 0x000D,

    /// Version number.
    Version = 0x000E,
}

impl Into<u16> for Register {
    fn into(self) -> u16 {
        self as u16
    }
}



/// Transceiver block registers (offsets from `RF09` / `RF24` base).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u16)]
pub enum RfRegister {
    /// Interrupt mask.
    IrqMask = 0x00,

    /// Transceiver state.
    State = 0x02,

    /// Transceiver command.
    Command = 0x03,

    /// Channel spacing (25 kHz units).
    ChannelSpacing = 0x04,

    /// Channel center frequency F0, low byte (25 kHz units).
    Frequency = 0x05,

    /// Channel number, low byte.
    ChannelLow = 0x07,

    /// Channel number, high bit. Writing it applies the channel setting.
    ChannelHigh = 0x08,

    /// Energy detection configuration.
    EdControl = 0x0E,

    /// Energy detection averaging duration.
    EdDuration = 0x0F,

    /// Energy detection value (dBm, signed).
    EdValue = 0x10,

    /// Power amplifier control.
    PaControl = 0x14,
}



/// Baseband core registers (offsets from `BBC0` / `BBC1` base).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u16)]
pub enum BbcRegister {
    /// Interrupt mask.
    IrqMask = 0x00,

    /// PHY control.
    PhyControl = 0x01,

    /// Received frame length, low byte.
    RxFrameLength = 0x04,

    /// Transmit frame length, low byte.
    TxFrameLength = 0x06,

    /// First FSK configuration register (FSKC0..FSKPLL are consecutive).
    FskConfig = 0x60,

    /// FSK PHR transmit configuration.
    FskPhrTx = 0x6A,

    /// FSK PHR of the last received frame.
    FskPhrRx = 0x6B,
}



/// Transceiver interrupt bits (RFn_IRQS / RFn_IRQM).
pub mod rfirq {
    /// Wake up / reset completed.
    pub const WAKEUP: u8 = 0x01;

    /// Transceiver ready (TXPREP reached).
    pub const TRXRDY: u8 = 0x02;

    /// Energy detection completed.
    pub const EDC: u8 = 0x04;

    /// Transceiver error (PLL unlock, FIFO underrun).
    pub const TRXERR: u8 = 0x10;

    /// Interrupts enabled by the driver.
    pub const MASK: u8 = WAKEUP | TRXRDY | EDC | TRXERR;
}

/// Baseband interrupt bits (BBCn_IRQS / BBCn_IRQM).
pub mod bbirq {
    /// Frame reception started.
    pub const RXFS: u8 = 0x01;

    /// Frame reception ended.
    pub const RXFE: u8 = 0x02;

    /// Frame transmission ended.
    pub const TXFE: u8 = 0x10;

    /// Interrupts enabled by the driver.
    pub const MASK: u8 = RXFS | RXFE | TXFE;
}

/// BBCn_PC bits.
pub mod pc {
    /// PHY type MR-FSK.
    pub const PT_FSK: u8 = 0x01;

    /// Baseband enabled.
    pub const BBEN: u8 = 0x04;

    /// 16 bit FCS when set, 32 bit otherwise.
    pub const FCST: u8 = 0x08;

    /// FCS appended automatically on transmission.
    pub const TXAFCS: u8 = 0x10;

    /// FCS of the last received frame is valid.
    pub const FCSOK: u8 = 0x20;

    /// PHY control value programmed by the driver.
    pub const CONFIG: u8 = PT_FSK | BBEN | TXAFCS;
}

/// RFn_EDC modes.
pub mod edc {
    /// Automatic measurement during reception.
    pub const AUTO: u8 = 0x00;

    /// Single measurement.
    pub const SINGLE: u8 = 0x01;
}

/// FSK PHR transmit bits.
pub mod phrtx {
    /// Data whitening.
    pub const DW: u8 = 0x04;

    /// SFD1 (coded frame) selection.
    pub const SFD: u8 = 0x08;
}

/// FSK PHR receive bits.
pub mod phrrx {
    /// The frame started with SFD1 and is FEC coded.
    pub const SFD: u8 = 0x08;
}

/// Energy detection value reported when no measurement is available.
pub const EDV_INVALID: i8 = 127;

/// PA current setting kept on every RFn_PAC write.
pub const PAC_CURRENT: u8 = 0x60;
