//! Internal state flags of the RF215 transceivers.



/// Operating state of a transceiver, as driven by the driver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum TrxState {
    /// Not configured yet, or being reset.
    Off,

    /// Listening (or receiving a frame).
    Rx,

    /// Asleep, registers retained.
    Sleep,
}



/// Progress of the transmission owning a transceiver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum TxStage {
    /// Single energy detection running for the clear channel assessment.
    Cca,

    /// Waiting for the PLL to settle (TXPREP).
    Prep,

    /// TX command issued, frame on air.
    OnAir,
}
