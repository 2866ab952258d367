//! Interrupt gating for the RF215 HAL.
//! Critical sections save and restore the DMA, timer and auxiliary interrupt
//! sources. The RF215 IRQ pin has its own reference counted gate, because
//! independent operations (a transfer on the bus, a bus lock) may want it
//! masked at the same time.



use super::port::InterruptSource;



/// Maximum nesting depth of the IRQ pin gate.
pub const MAX_IRQ_NESTING: u8 = u8::MAX;



/// Saved state of the gated interrupt sources.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[must_use]
pub struct IntState {
    dma: bool,
    timer: bool,
    aux: bool,
}



/// Masks the interrupt sources sharing the transfer queue, plus a nesting
/// counter for the RF215 IRQ pin.
pub struct InterruptGate<I> {
    /// DMA transfer complete interrupt.
    dma: I,

    /// System timer interrupt.
    timer: I,

    /// Auxiliary external interrupt.
    aux: I,

    /// RF215 IRQ pin interrupt.
    irq: I,

    /// Number of outstanding IRQ pin disables.
    irq_disables: u8,

    /// An IRQ pin event arrived while the pin was gated.
    irq_latched: bool,
}

impl<I: InterruptSource> InterruptGate<I> {
    /// Creates the gate. The IRQ pin interrupt is enabled.
    pub fn new(dma: I, timer: I, aux: I, mut irq: I) -> Self {
        irq.enable();

        Self { dma, timer, aux, irq, irq_disables: 0, irq_latched: false }
    }

    /// Disables the three interrupt sources, always in the same order.
    pub fn enter(&mut self) -> IntState {
        IntState {
            dma: self.dma.disable(),
            timer: self.timer.disable(),
            aux: self.aux.disable(),
        }
    }

    /// Restores the interrupt sources, in reverse order.
    pub fn leave(&mut self, state: IntState) {
        self.aux.restore(state.aux);
        self.timer.restore(state.timer);
        self.dma.restore(state.dma);
    }

    /// Masks the IRQ pin. Nested calls need as many `irq_enable` calls.
    pub fn irq_disable(&mut self) {
        debug_assert!(self.irq_disables < MAX_IRQ_NESTING, "IRQ pin gate nesting overflow");

        if self.irq_disables == 0 {
            self.irq.disable();
        }

        self.irq_disables = self.irq_disables.saturating_add(1);
    }

    /// Releases one IRQ pin disable. Returns `true` if the pin was re-armed
    /// and an event was latched while it was masked.
    pub fn irq_enable(&mut self) -> bool {
        match self.irq_disables {
            0 => {
                debug_assert!(false, "Unbalanced IRQ pin enable");
                false
            },

            1 => {
                self.irq_disables = 0;
                self.irq.enable();

                core::mem::take(&mut self.irq_latched)
            },

            _ => {
                self.irq_disables -= 1;
                false
            },
        }
    }

    /// Returns `true` while the IRQ pin is masked.
    pub fn irq_gated(&self) -> bool {
        self.irq_disables > 0
    }

    /// Current nesting depth of the IRQ pin gate.
    pub fn irq_depth(&self) -> u8 {
        self.irq_disables
    }

    /// Records an IRQ pin event raised while the pin was masked.
    pub fn latch_irq(&mut self) {
        self.irq_latched = true;
    }
}
