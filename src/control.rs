//! Async control loop.
//! The interrupt handlers only post a `RadioEvent` to a channel; the loop
//! runs the handlers and the tasks of the driver (or PAL) on an executor.
//! The IRQ pin of the RF215 is awaited directly.



use embassy_futures::select::{select, Either};

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::Channel,
};

use embedded_hal_async::digital::Wait;

use crate::driver::{Rf215Driver, Rf215Listener};
use crate::hal::port::{AlarmId, Platform};
use crate::pal::{Pal, PalListener, PlcPhy};
use crate::sniffer::SnifferSink;



/// Event posted by an interrupt handler.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum RadioEvent {
    /// The SPI DMA transfer ended.
    DmaComplete,

    /// A system timer alarm fired.
    Alarm(AlarmId),

    /// Ends the control loop.
    Stop,
}



impl<P: Platform> Rf215Driver<P> {
    /// Runs the driver until a `Stop` event. Returns early on an IRQ pin
    /// error.
    pub async fn run<M: RawMutex, W: Wait, L: Rf215Listener, const N: usize>(&mut self, events: &Channel<M, RadioEvent, N>, irq: &mut W, listener: &mut L) -> Result<(), W::Error> {
        loop {
            self.tasks(listener);

            match select( events.receive(), irq.wait_for_rising_edge() ).await {
                Either::First(RadioEvent::DmaComplete) => self.dma_complete(listener),

                Either::First(RadioEvent::Alarm(id)) => self.timer_expired(id),

                Either::First(RadioEvent::Stop) => {
                    #[cfg(feature = "log")]
                    defmt::debug!("RF215 Driver : Control loop stopped");

                    return Ok( () );
                },

                Either::Second(result) => {
                    result?;
                    self.external_interrupt();
                },
            }
        }
    }
}



impl<P: Platform, T: PlcPhy, S: SnifferSink, L: PalListener> Pal<P, T, S, L> {
    /// Runs the RF medium of the PAL until a `Stop` event. PLC events are
    /// still delivered through `plc_tx_confirm` and `plc_rx_indication`.
    pub async fn run<M: RawMutex, W: Wait, const N: usize>(&mut self, events: &Channel<M, RadioEvent, N>, irq: &mut W) -> Result<(), W::Error> {
        loop {
            self.tasks();

            match select( events.receive(), irq.wait_for_rising_edge() ).await {
                Either::First(RadioEvent::DmaComplete) => self.rf_dma_complete(),

                Either::First(RadioEvent::Alarm(id)) => self.rf_timer_expired(id),

                Either::First(RadioEvent::Stop) => {
                    #[cfg(feature = "log")]
                    defmt::debug!("PAL : Control loop stopped");

                    return Ok( () );
                },

                Either::Second(result) => {
                    result?;
                    self.rf_external_interrupt();
                },
            }
        }
    }
}
