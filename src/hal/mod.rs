//! RF215 hardware abstraction layer.
//! Serializes every SPI access to the transceiver through a bounded FIFO and
//! guarantees at most one transfer on the bus. Callers on interrupt and main
//! loop contexts can enqueue work without races, because the queue is only
//! touched with the DMA, timer and auxiliary interrupts gated.



pub mod gate;
pub mod port;
pub mod queue;



use embedded_hal::digital::{ErrorType, OutputPin};

use crate::config::PSDU_MAX_LEN;
use crate::time;

use gate::{InterruptGate, IntState};
use port::{AlarmId, Platform, Resources, SpiDma, SysTime};
use queue::{command, SpiTransferQueue, TransferMode};



/// Number of transfer descriptors in the pool.
pub const SPI_TRANSFER_POOL_SIZE: usize = 24;

/// Largest payload of a single transfer (a full frame buffer access).
pub const SPI_MAX_PAYLOAD: usize = PSDU_MAX_LEN;

/// Size of the write payload ring. A frame upload fits at any alignment
/// while the frame of the other transceiver and 128 bytes of register
/// writes are still queued.
pub const SPI_PAYLOAD_RING_SIZE: usize = 3 * SPI_MAX_PAYLOAD + 128;

/// Size of the DMA staging buffers (command header + payload).
pub const SPI_BUFFER_SIZE: usize = SPI_MAX_PAYLOAD + 2;

/// Unchanged bytes tolerated inside a single `write_update` burst.
/// Splitting costs a new 2 byte command header.
pub const WRITE_UPDATE_MAX_GAP: usize = 2;



/// Error type of the platform output pins.
pub type PinError<P> = <<P as Platform>::Pin as ErrorType>::Error;



/// A finished transfer, handed back to the queue owner.
#[derive(Clone, Copy, Debug)]
pub struct Completion<C> {
    /// Token given at enqueue time.
    pub callback: Option<C>,

    /// Direction of the transfer.
    pub mode: TransferMode,

    /// Register address of the transfer.
    pub address: u16,

    /// Payload length.
    pub len: usize,

    /// Counter sampled right after the transfer was launched.
    pub time: u64,
}



/// SPI transfer queue of the RF215 with the board resources it drives.
/// `C` is the completion token the owner attaches to its transfers.
pub struct Rf215Hal<P: Platform, C> {
    /// SPI bus.
    spi: P::Spi,

    /// System time counter.
    time: P::Time,

    /// Reset line.
    reset: P::Pin,

    /// RX activity LED.
    led_rx: Option<P::Pin>,

    /// TX activity LED.
    led_tx: Option<P::Pin>,

    /// Interrupt gating.
    gate: InterruptGate<P::Int>,

    /// Pending transfers.
    queue: SpiTransferQueue<C, SPI_TRANSFER_POOL_SIZE, SPI_PAYLOAD_RING_SIZE>,

    /// DMA transmit staging buffer.
    txbuf: [u8; SPI_BUFFER_SIZE],

    /// DMA receive staging buffer.
    rxbuf: [u8; SPI_BUFFER_SIZE],

    /// The head transfer is on the bus.
    onbus: bool,

    /// The head transfer must be started from `tasks`.
    deferred: bool,

    /// A completion is being processed by the owner.
    completing: bool,

    /// Launch time of the transfer on the bus.
    launched: u64,

    /// Nesting depth of `lock`.
    locks: u8,

    /// Interrupt state saved by the outermost `lock`.
    lockstate: Option<IntState>,

    /// An IRQ pin event was latched while gated and the pin was re-armed.
    irqpending: bool,

    /// Outstanding RX LED requests.
    ledrx: u8,
}

impl<P: Platform, C: Copy> Rf215Hal<P, C> {
    /// Creates the HAL from the board resources.
    pub fn new(resources: Resources<P>) -> Self {
        let Resources { spi, time, reset, led_rx, led_tx, dma_int, timer_int, aux_int, irq_int } = resources;

        let mut hal = Self {
            spi,
            time,
            reset,
            led_rx,
            led_tx,
            gate: InterruptGate::new(dma_int, timer_int, aux_int, irq_int),
            queue: SpiTransferQueue::new(),
            txbuf: [0u8; SPI_BUFFER_SIZE],
            rxbuf: [0u8; SPI_BUFFER_SIZE],
            onbus: false,
            deferred: false,
            completing: false,
            launched: 0,
            locks: 0,
            lockstate: None,
            irqpending: false,
            ledrx: 0,
        };

        hal.led_rx(false);
        hal.led_tx(false);

        hal
    }

    /// Enqueues a register / buffer read. `callback` is reported back by
    /// `dma_complete` together with the received bytes.
    pub fn read(&mut self, address: u16, size: usize, callback: C) -> bool {
        self.enqueue(TransferMode::Read, address, size, None, Some(callback), false)
    }

    /// Enqueues a read whose start is deferred to the next `tasks` call when
    /// it reaches the head of the queue.
    pub fn read_from_tasks(&mut self, address: u16, size: usize, callback: C) -> bool {
        self.enqueue(TransferMode::Read, address, size, None, Some(callback), true)
    }

    /// Enqueues a fire and forget write. The data is copied.
    pub fn write(&mut self, address: u16, data: &[u8]) -> bool {
        self.enqueue(TransferMode::Write, address, data.len(), Some(data), None, false)
    }

    /// Enqueues a write reported back by `dma_complete` (launch time stamping).
    pub fn write_notify(&mut self, address: u16, data: &[u8], callback: C) -> bool {
        self.enqueue(TransferMode::Write, address, data.len(), Some(data), Some(callback), false)
    }

    /// Writes only the bytes of `new` that differ from `shadow`, then updates
    /// `shadow`. Changed runs separated by up to `WRITE_UPDATE_MAX_GAP`
    /// unchanged bytes share a burst. Returns the number of bursts queued,
    /// or `None` if one was dropped. The shadow of a dropped burst is kept.
    pub fn write_update(&mut self, address: u16, new: &[u8], shadow: &mut [u8]) -> Option<usize> {
        let len = new.len().min(shadow.len());

        let mut bursts = 0;
        let mut dropped = false;
        let mut run: Option<(usize, usize)> = None;

        for i in 0..=len {
            let changed = i < len && new[i] != shadow[i];

            run = match run {
                Some((start, end)) if changed && i - end - 1 <= WRITE_UPDATE_MAX_GAP => Some((start, i)),

                Some((start, end)) if changed || i == len => {
                    if self.write(address + start as u16, &new[start..=end]) {
                        shadow[start..=end].copy_from_slice(&new[start..=end]);
                        bursts += 1;
                    } else {
                        dropped = true;
                    }

                    changed.then_some((i, i))
                },

                None if changed => Some((i, i)),

                run => run,
            };
        }

        (!dropped).then_some(bursts)
    }

    /// Claims the bus: masks the IRQ pin and the interrupt sources.
    /// Returns `true` if no transfer was queued. A transfer may still be on
    /// the bus; poll before destructive actions.
    pub fn lock(&mut self) -> bool {
        self.gate.irq_disable();

        let state = self.gate.enter();

        if self.locks == 0 {
            self.lockstate = Some(state);
        }

        self.locks = self.locks.saturating_add(1);

        self.queue.is_empty()
    }

    /// Releases one `lock`.
    pub fn unlock(&mut self) {
        if self.locks == 0 { return }

        self.locks -= 1;

        if self.locks == 0 {
            if let Some(state) = self.lockstate.take() {
                self.gate.leave(state);
            }
        }

        self.release_irq();
    }

    /// Masks the interrupt sources (not the IRQ pin).
    pub fn enter_critical(&mut self) -> IntState {
        self.gate.enter()
    }

    /// Restores the interrupt sources.
    pub fn leave_critical(&mut self, state: IntState) {
        self.gate.leave(state)
    }

    /// Masks the RF215 IRQ pin (reference counted).
    pub fn irq_disable(&mut self) {
        self.gate.irq_disable();
    }

    /// Releases one RF215 IRQ pin mask.
    pub fn irq_enable(&mut self) {
        self.release_irq();
    }

    /// Called on an RF215 IRQ pin edge. Returns `true` if the event must be
    /// processed now, `false` if it was latched because the pin is gated.
    pub fn irq_event(&mut self) -> bool {
        if self.gate.irq_gated() {
            self.gate.latch_irq();
            return false;
        }

        true
    }

    /// Returns `true` once after the pin was re-armed with a latched event.
    pub fn take_irq_pending(&mut self) -> bool {
        core::mem::take(&mut self.irqpending)
    }

    /// Pulses the reset line and abandons every queued transfer. Queued
    /// callbacks never fire. Blocks until the bus is idle.
    pub fn reset(&mut self) -> Result<(), PinError<P>> {
        self.lock();

        while self.spi.is_busy() {}

        if self.onbus {
            self.onbus = false;
            self.release_irq();
        }

        self.queue.clear();
        self.deferred = false;

        #[cfg(feature = "log")]
        defmt::debug!("HAL : Queue flushed, pulsing reset");

        let pulse = time::us_q5_to_count(time::RESET_PULSE_US_Q5, self.time.frequency_hz()) as u64;

        let result = self.reset.set_low().and_then(|_| {
            let start = self.time.counter();

            while time::elapsed(start, self.time.counter()) < pulse {}

            self.reset.set_high()
        });

        self.ledrx = 0;
        self.led_rx(false);
        self.led_tx(false);

        self.unlock();

        result
    }

    /// Sum of the payload sizes of all queued transfers.
    pub fn queue_size(&self) -> usize {
        self.queue.queued_bytes()
    }

    /// RX LED. Reference counted: stays on until every `on` is matched.
    pub fn led_rx(&mut self, on: bool) {
        if on {
            self.ledrx = self.ledrx.saturating_add(1);
        } else if self.ledrx > 0 {
            self.ledrx -= 1;
        }

        if let Some(ref mut led) = self.led_rx {
            let result = if self.ledrx > 0 { led.set_high() } else { led.set_low() };

            if result.is_err() {
                #[cfg(feature = "log")]
                defmt::warn!("HAL : RX LED pin error");
            }
        }
    }

    /// TX LED.
    pub fn led_tx(&mut self, on: bool) {
        if let Some(ref mut led) = self.led_tx {
            let result = if on { led.set_high() } else { led.set_low() };

            if result.is_err() {
                #[cfg(feature = "log")]
                defmt::warn!("HAL : TX LED pin error");
            }
        }
    }

    /// Starts a transfer deferred to the main loop.
    pub fn tasks(&mut self) {
        let state = self.gate.enter();

        if self.deferred && !self.onbus && !self.completing {
            self.deferred = false;
            self.launch();
        }

        self.gate.leave(state);
    }

    /// DMA complete handler. Returns the finished transfer; its read data is
    /// available through `read_data` until `completion_done` is called.
    /// The IRQ pin stays masked and no other transfer starts until then.
    pub fn dma_complete(&mut self) -> Option<Completion<C>> {
        let state = self.gate.enter();

        if !self.onbus {
            self.gate.leave(state);
            return None;
        }

        self.onbus = false;

        let completion = self.queue.pop().map(|transfer| {
            let len = transfer.size as usize;

            self.spi.finish(&mut self.rxbuf[..len + 2]);
            self.completing = true;

            Completion {
                callback: transfer.callback,
                mode: transfer.mode,
                address: transfer.address,
                len,
                time: self.launched,
            }
        });

        self.gate.leave(state);

        if completion.is_none() {
            self.release_irq();
        }

        completion
    }

    /// Bytes read by a completed transfer, without the command header.
    pub fn read_data(&self, completion: &Completion<C>) -> &[u8] {
        match completion.mode {
            TransferMode::Read => &self.rxbuf[2..completion.len + 2],
            TransferMode::Write => &[],
        }
    }

    /// Ends the processing of a completion: starts the next transfer and
    /// re-arms the IRQ pin.
    pub fn completion_done(&mut self) {
        let state = self.gate.enter();

        if self.completing {
            self.completing = false;
            self.start_head();
        }

        self.gate.leave(state);

        self.release_irq();
    }

    /// System counter.
    pub fn counter(&self) -> u64 {
        self.time.counter()
    }

    /// System time in microseconds.
    pub fn time_us(&self) -> u64 {
        let count = self.counter();
        self.count_to_us(count)
    }

    /// Converts counter ticks to microseconds.
    pub fn count_to_us(&self, count: u64) -> u64 {
        time::count_to_us(count, self.time.frequency_hz())
    }

    /// Converts microseconds to counter ticks.
    pub fn us_to_count(&self, us: u64) -> u64 {
        time::us_to_count(us, self.time.frequency_hz())
    }

    /// Schedules an alarm on the system timer.
    pub fn alarm(&mut self, delay_us: u32) -> Option<AlarmId> {
        self.time.alarm(delay_us)
    }

    /// Cancels an alarm.
    pub fn cancel_alarm(&mut self, id: AlarmId) {
        self.time.cancel(id)
    }

    /// Returns `true` while a transfer is on the bus.
    pub fn busy(&self) -> bool {
        self.onbus
    }

    /// Number of queued transfers (including the one on the bus).
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

impl<P: Platform, C: Copy> Rf215Hal<P, C> {
    /// Queues a transfer. Pool or ring exhaustion drops the request.
    fn enqueue(&mut self, mode: TransferMode, address: u16, size: usize, data: Option<&[u8]>, callback: Option<C>, fromtasks: bool) -> bool {
        if size > SPI_MAX_PAYLOAD { return false }

        self.gate.irq_disable();

        let state = self.gate.enter();

        let queued = match self.queue.push(mode, address, size, data, callback, fromtasks) {
            Some((_, true)) => {
                if !self.completing && !self.onbus {
                    self.start_head();
                }

                true
            },

            Some(_) => true,

            None => {
                #[cfg(feature = "log")]
                defmt::warn!("HAL : Transfer dropped, queue exhausted ({=u16:#06x})", address);

                false
            },
        };

        self.gate.leave(state);

        self.release_irq();

        queued
    }

    /// Starts the head transfer now, or flags it for `tasks`.
    fn start_head(&mut self) {
        if self.onbus { return }

        let Some(index) = self.queue.head() else { return };

        if self.queue.get(index).from_tasks {
            self.deferred = true;
        } else {
            self.launch();
        }
    }

    /// Puts the head transfer on the bus.
    fn launch(&mut self) {
        let Some(index) = self.queue.head() else { return };

        let transfer = *self.queue.get(index);
        let size = transfer.size as usize;

        self.txbuf[..2].copy_from_slice(&command(transfer.mode, transfer.address));

        match transfer.mode {
            TransferMode::Write => self.txbuf[2..size + 2].copy_from_slice(self.queue.payload(&transfer)),
            TransferMode::Read => self.txbuf[2..size + 2].fill(0),
        }

        self.gate.irq_disable();
        self.onbus = true;

        self.spi.start(&self.txbuf[..size + 2]);

        self.launched = self.time.counter();
    }

    /// Releases one IRQ pin mask, remembering latched events.
    fn release_irq(&mut self) {
        if self.gate.irq_enable() {
            self.irqpending = true;
        }
    }
}
