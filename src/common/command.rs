//! Commands accepted by the RFn_CMD register of the AT86RF215 transceivers.



#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// No operation.
    NOP = 0x00,

    /// Puts the transceiver to sleep. Registers are retained.
    Sleep = 0x01,

    /// Stops any activity and wakes the transceiver up.
    TrxOff = 0x02,

    /// Settles the PLL before a transmission.
    TxPrep = 0x03,

    /// Starts transmitting the frame buffer (from `TxPrep` only).
    Tx = 0x04,

    /// Listens for frames.
    Rx = 0x05,

    /// Resets the transceiver registers.
    Reset = 0x07,
}

impl Into<u8> for Command {
    fn into(self) -> u8 {
        self as u8
    }
}
