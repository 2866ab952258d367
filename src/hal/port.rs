//! Collaborator interfaces consumed by the RF215 HAL.
//! The board support code provides one implementation of each and groups
//! them with the `Platform` trait.



use embedded_hal::digital::OutputPin;



/// SPI peripheral with DMA driven completion.
/// A transfer is kicked off with `start` and finishes asynchronously. The
/// board must call `Rf215Driver::dma_complete` from the DMA-done interrupt.
pub trait SpiDma {
    /// Returns `true` while a transfer is on the bus.
    fn is_busy(&self) -> bool;

    /// Starts a full duplex transfer of `tx.len()` bytes.
    /// The implementation copies `tx` into its DMA buffer before returning.
    fn start(&mut self, tx: &[u8]);

    /// Copies the bytes clocked in by the last transfer into `rx`.
    /// Called once per transfer, from the completion handler.
    fn finish(&mut self, rx: &mut [u8]);
}



/// Identifier of an alarm scheduled on the system timer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub struct AlarmId(pub u16);

/// High resolution free running counter with an alarm service.
pub trait SysTime {
    /// Monotonic 64 bit counter. Boards with a 32 bit timer extend it in
    /// their overflow interrupt.
    fn counter(&self) -> u64;

    /// Counter frequency in Hz.
    fn frequency_hz(&self) -> u32;

    /// Schedules an alarm `delay_us` microseconds from now.
    /// The board calls `Rf215Driver::timer_expired` with the returned id
    /// from the timer interrupt. Returns `None` if no alarm is available.
    fn alarm(&mut self, delay_us: u32) -> Option<AlarmId>;

    /// Cancels a scheduled alarm. Unknown ids are ignored.
    fn cancel(&mut self, id: AlarmId);
}



/// Interrupt source handle, as exposed by the interrupt controller.
pub trait InterruptSource {
    /// Disables the source and returns whether it was enabled.
    fn disable(&mut self) -> bool;

    /// Restores the state returned by a previous `disable`.
    fn restore(&mut self, enabled: bool);

    /// Unconditionally enables the source.
    fn enable(&mut self);
}



/// Groups the concrete collaborator types of a board.
pub trait Platform {
    /// SPI bus wired to the RF215.
    type Spi: SpiDma;

    /// System time counter service.
    type Time: SysTime;

    /// Output pins (RF215 reset line and LEDs).
    type Pin: OutputPin;

    /// Interrupt source handles.
    type Int: InterruptSource;
}



/// Hardware resources handed over to the HAL at creation.
pub struct Resources<P: Platform> {
    /// SPI bus.
    pub spi: P::Spi,

    /// System time counter.
    pub time: P::Time,

    /// RF215 reset line (active low).
    pub reset: P::Pin,

    /// Optional RX activity LED.
    pub led_rx: Option<P::Pin>,

    /// Optional TX activity LED.
    pub led_tx: Option<P::Pin>,

    /// DMA transfer complete interrupt.
    pub dma_int: P::Int,

    /// System timer interrupt.
    pub timer_int: P::Int,

    /// Auxiliary external interrupt sharing the SPI bus (PLC modem pin).
    pub aux_int: P::Int,

    /// RF215 IRQ pin interrupt.
    pub irq_int: P::Int,
}
