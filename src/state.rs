//! Module status of the RF215 driver and the PAL.



#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// `initialize` was never called.
    Uninitialized,

    /// Initialization is in progress.
    Busy,

    /// The module is operational.
    Ready,

    /// The module failed and needs a reset.
    Error,
}

#[cfg(feature = "log")]
impl defmt::Format for Status {
    fn format(&self, _: defmt::Formatter) {
        // String to format.
        let string = match self {
            Status::Uninitialized => defmt::intern!("Uninitialized"),
            Status::Busy => defmt::intern!("Busy"),
            Status::Ready => defmt::intern!("Ready"),
            Status::Error => defmt::intern!("Error"),
        };

        // Send the defmt string.
        defmt::export::istr(&string);
    }
}
