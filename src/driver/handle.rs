//! Opaque handles of the RF215 driver.
//! Both carry the generation of the slot they were issued for. A slot is
//! re-issued with a new generation, so a stale handle never matches it.



use crate::common::Trx;



/// Handle of an open client.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub struct ClientHandle {
    pub(crate) trx: Trx,
    pub(crate) slot: u8,
    pub(crate) gen: u16,
}

impl ClientHandle {
    /// Transceiver opened by the client.
    pub fn trx(&self) -> Trx {
        self.trx
    }
}



/// Handle of a transmission, valid from `tx_request` until its confirm.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub struct TxHandle {
    pub(crate) trx: Trx,
    pub(crate) slot: u8,
    pub(crate) gen: u16,
}

impl TxHandle {
    /// Transceiver carrying the transmission.
    pub fn trx(&self) -> Trx {
        self.trx
    }
}
