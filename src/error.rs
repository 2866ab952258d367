//! Result codes of the RF215 driver and the PAL.
//! Synchronous failures are returned as `Err`. The outcome of a transmission
//! always arrives later through the TX confirm, carrying a `TxResult`.



/// Usage errors of the RF215 driver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum DriverError {
    /// The driver is not ready (initializing or in error).
    NotReady,

    /// The transceiver is not enabled or not present in this part.
    InvalidTrx,

    /// Every client slot of the transceiver is in use.
    NoClient,

    /// The handle does not designate an open client.
    InvalidHandle,
}



/// Results of a transmission request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum TxResult {
    /// The frame was transmitted.
    Success,

    /// PSDU length is zero or longer than the frame buffer.
    InvalidLength,

    /// Clear channel assessment found the channel busy.
    BusyChannel,

    /// A frame was being received.
    BusyRx,

    /// Another frame was being transmitted.
    BusyTx,

    /// The client handle is invalid.
    InvalidHandle,

    /// A request parameter is out of range.
    InvalidParam,

    /// Every TX buffer is in use.
    FullBuffers,

    /// The request was cancelled by its owner.
    Cancelled,

    /// The transmission was aborted by a reset, a reconfiguration or a
    /// dropped frame upload.
    Aborted,

    /// The transmission did not end in time.
    Timeout,

    /// The transceiver reported an error while transmitting.
    Underrun,
}



/// Results of a PIB access.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum PibResult {
    Success,

    /// Value out of range or buffer too small.
    InvalidParam,

    /// Unknown attribute.
    InvalidAttr,

    /// Transceiver not enabled or not ready.
    InvalidHandle,

    /// Attribute cannot be written.
    ReadOnly,

    /// Attribute cannot be read.
    WriteOnly,
}



/// Synchronous errors of the PAL.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum PalError {
    /// The physical channel designates a medium that is not available.
    NoMedium,

    /// A parameter is out of range.
    InvalidParam,

    /// The medium does not provide this operation.
    NotSupported,

    /// The medium is not ready.
    NotReady,
}



/// Results reported in the PAL data confirm.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum PalTxResult {
    Success,

    /// The frame length is not supported by the medium.
    InvalidLength,

    /// The channel was busy.
    BusyChannel,

    /// The medium was receiving.
    BusyRx,

    /// The medium was transmitting or out of TX resources.
    BusyTx,

    /// A request parameter was rejected.
    InvalidParam,

    /// The request was cancelled.
    Cancelled,

    /// The request was aborted by the medium.
    Aborted,

    /// The transmission timed out.
    Timeout,

    /// The medium failed while transmitting.
    PhyError,

    /// The medium is not available.
    NoMedium,
}

impl From<TxResult> for PalTxResult {
    fn from(result: TxResult) -> Self {
        match result {
            TxResult::Success => PalTxResult::Success,
            TxResult::InvalidLength => PalTxResult::InvalidLength,
            TxResult::BusyChannel => PalTxResult::BusyChannel,
            TxResult::BusyRx => PalTxResult::BusyRx,
            TxResult::BusyTx => PalTxResult::BusyTx,
            TxResult::InvalidHandle => PalTxResult::InvalidParam,
            TxResult::InvalidParam => PalTxResult::InvalidParam,
            TxResult::FullBuffers => PalTxResult::BusyTx,
            TxResult::Cancelled => PalTxResult::Cancelled,
            TxResult::Aborted => PalTxResult::Aborted,
            TxResult::Timeout => PalTxResult::Timeout,
            TxResult::Underrun => PalTxResult::PhyError,
        }
    }
}
