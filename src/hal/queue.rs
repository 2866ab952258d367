//! SPI transfer queue.
//! A fixed pool of transfer descriptors linked as a FIFO. The descriptor at
//! the head is the only one that may be on the bus.



/// Direction of a transfer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "log", derive(defmt::Format))]
pub enum TransferMode {
    /// Register / buffer read.
    Read,

    /// Register / buffer write.
    Write,
}

impl TransferMode {
    /// Mode bits of the SPI command word.
    pub const fn bits(self) -> u16 {
        match self {
            TransferMode::Read => 0b00 << 14,
            TransferMode::Write => 0b10 << 14,
        }
    }
}

/// Builds the 16 bit SPI command word, MSB first on the wire.
pub const fn command(mode: TransferMode, address: u16) -> [u8; 2] {
    let word = mode.bits() | (address & 0x3FFF);
    [(word >> 8) as u8, word as u8]
}



/// Location of a write payload in the payload ring.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct RingSlot {
    offset: u16,
    len: u16,
    pad: u16,
}

/// FIFO byte ring holding the payloads of queued writes.
/// Payloads are contiguous; an allocation that does not fit before the end
/// skips the tail bytes. Released strictly in allocation order.
pub(crate) struct PayloadRing<const R: usize> {
    buf: [u8; R],
    write: usize,
    used: usize,
}

impl<const R: usize> PayloadRing<R> {
    pub(crate) const fn new() -> Self {
        Self { buf: [0u8; R], write: 0, used: 0 }
    }

    pub(crate) fn push(&mut self, data: &[u8]) -> Option<RingSlot> {
        let len = data.len();

        if len > R { return None }

        let pad = if self.write + len > R { R - self.write } else { 0 };

        if self.used + pad + len > R { return None }

        let offset = if pad > 0 { 0 } else { self.write };

        self.buf[offset..offset + len].copy_from_slice(data);

        self.write = (offset + len) % R;
        self.used += pad + len;

        Some( RingSlot { offset: offset as u16, len: len as u16, pad: pad as u16 } )
    }

    pub(crate) fn get(&self, slot: RingSlot) -> &[u8] {
        let start = slot.offset as usize;
        &self.buf[start..start + slot.len as usize]
    }

    pub(crate) fn release(&mut self, slot: RingSlot) {
        self.used -= (slot.pad + slot.len) as usize;

        if self.used == 0 { self.write = 0 }
    }

    pub(crate) fn clear(&mut self) {
        self.write = 0;
        self.used = 0;
    }
}



/// A transfer descriptor.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Transfer<C> {
    /// Next descriptor in the queue.
    next: Option<u8>,

    /// Direction.
    pub(crate) mode: TransferMode,

    /// 14 bit register address.
    pub(crate) address: u16,

    /// Payload size in bytes (excluding the command header).
    pub(crate) size: u16,

    /// Completion token, interpreted by the queue owner.
    pub(crate) callback: Option<C>,

    /// Write payload.
    payload: Option<RingSlot>,

    /// Slot ownership flag.
    in_use: bool,

    /// Start from the main loop instead of the enqueuing context.
    pub(crate) from_tasks: bool,
}

impl<C> Transfer<C> {
    const IDLE: Self = Self {
        next: None,
        mode: TransferMode::Read,
        address: 0,
        size: 0,
        callback: None,
        payload: None,
        in_use: false,
        from_tasks: false,
    };
}



/// Bounded FIFO of transfer descriptors.
pub struct SpiTransferQueue<C, const N: usize, const R: usize> {
    /// Descriptor pool.
    pool: [Transfer<C>; N],

    /// Head and tail of the queue. Both present or both absent.
    ends: Option<(usize, usize)>,

    /// Write payload storage.
    ring: PayloadRing<R>,

    /// Sum of the payload sizes of all queued transfers.
    queued_bytes: usize,
}

impl<C: Copy, const N: usize, const R: usize> SpiTransferQueue<C, N, R> {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            pool: core::array::from_fn(|_| Transfer::IDLE),
            ends: None,
            ring: PayloadRing::new(),
            queued_bytes: 0,
        }
    }

    /// Appends a transfer. Returns the descriptor index and whether it became
    /// the head, or `None` if the pool or the payload ring is exhausted.
    pub(crate) fn push(&mut self, mode: TransferMode, address: u16, size: usize, write: Option<&[u8]>, callback: Option<C>, from_tasks: bool) -> Option<(usize, bool)> {
        if size > u16::MAX as usize { return None }

        let index = self.pool.iter().position(|t| !t.in_use)?;

        let payload = match write {
            Some(data) => Some( self.ring.push(data)? ),
            None => None,
        };

        self.pool[index] = Transfer {
            next: None,
            mode,
            address: address & 0x3FFF,
            size: size as u16,
            callback,
            payload,
            in_use: true,
            from_tasks,
        };

        self.queued_bytes += size;

        let head = match self.ends {
            Some((head, tail)) => {
                self.pool[tail].next = Some(index as u8);
                self.ends = Some((head, index));
                false
            },

            None => {
                self.ends = Some((index, index));
                true
            },
        };

        Some( (index, head) )
    }

    /// Index of the head descriptor.
    pub(crate) fn head(&self) -> Option<usize> {
        self.ends.map(|(head, _)| head)
    }

    /// Returns the descriptor at `index`.
    pub(crate) fn get(&self, index: usize) -> &Transfer<C> {
        &self.pool[index]
    }

    /// Write payload of a descriptor (empty for reads).
    pub(crate) fn payload(&self, transfer: &Transfer<C>) -> &[u8] {
        match transfer.payload {
            Some(slot) => self.ring.get(slot),
            None => &[],
        }
    }

    /// Removes the head descriptor and frees its slot.
    pub(crate) fn pop(&mut self) -> Option<Transfer<C>> {
        let (head, tail) = self.ends?;

        let transfer = self.pool[head];

        self.ends = match transfer.next {
            Some(next) if head != tail => Some((next as usize, tail)),
            _ => None,
        };

        if let Some(slot) = transfer.payload {
            self.ring.release(slot);
        }

        self.queued_bytes -= transfer.size as usize;
        self.pool[head] = Transfer::IDLE;

        Some( transfer )
    }

    /// Abandons every queued transfer.
    pub(crate) fn clear(&mut self) {
        for transfer in self.pool.iter_mut() {
            *transfer = Transfer::IDLE;
        }

        self.ends = None;
        self.ring.clear();
        self.queued_bytes = 0;
    }

    /// Returns `true` if no transfer is queued.
    pub fn is_empty(&self) -> bool {
        self.ends.is_none()
    }

    /// Number of queued transfers.
    pub fn len(&self) -> usize {
        self.pool.iter().filter(|t| t.in_use).count()
    }

    /// Sum of the payload sizes of all queued transfers.
    pub fn queued_bytes(&self) -> usize {
        self.queued_bytes
    }

    /// Walks the queue from head to tail, checking the links.
    /// Returns the number of linked descriptors.
    #[cfg(test)]
    pub(crate) fn walk(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.head();

        while let Some(index) = cursor {
            assert!(self.pool[index].in_use);
            count += 1;

            if Some(index) == self.ends.map(|(_, tail)| tail) {
                assert!(self.pool[index].next.is_none());
                break;
            }

            cursor = self.pool[index].next.map(|n| n as usize);
        }

        count
    }
}

impl<C: Copy, const N: usize, const R: usize> Default for SpiTransferQueue<C, N, R> {
    fn default() -> Self {
        Self::new()
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    type Queue = SpiTransferQueue<u8, 4, 16>;

    #[test]
    fn command_word_framing() {
        assert_eq!(command(TransferMode::Read, 0x000D), [0x00, 0x0D]);
        assert_eq!(command(TransferMode::Write, 0x0103), [0x81, 0x03]);

        // Address is limited to 14 bits.
        assert_eq!(command(TransferMode::Write, 0xFFFF), [0xBF, 0xFF]);
    }

    #[test]
    fn fifo_order_is_preserved() {
        let mut queue = Queue::new();

        for tag in 0..4u8 {
            let (_, head) = queue.push(TransferMode::Read, tag as u16, 1, None, Some(tag), false).unwrap();
            assert_eq!(head, tag == 0);
        }

        let order: Vec<u8> = core::iter::from_fn(|| queue.pop()).map(|t| t.callback.unwrap()).collect();

        assert_eq!(order, vec![0, 1, 2, 3]);
        assert!(queue.is_empty());
        assert!(queue.head().is_none());
    }

    #[test]
    fn exhausted_pool_keeps_queue_consistent() {
        let mut queue = Queue::new();

        for tag in 0..4u8 {
            assert!(queue.push(TransferMode::Read, 0, 2, None, Some(tag), false).is_some());
        }

        assert!(queue.push(TransferMode::Read, 0, 2, None, Some(9), false).is_none());
        assert_eq!(queue.walk(), 4);
        assert_eq!(queue.queued_bytes(), 8);

        // Freed slots are reused at the tail.
        assert_eq!(queue.pop().unwrap().callback, Some(0));
        let (index, head) = queue.push(TransferMode::Read, 0, 2, None, Some(4), false).unwrap();
        assert_eq!(index, 0);
        assert!(!head);
        assert_eq!(queue.walk(), 4);

        let order: Vec<u8> = core::iter::from_fn(|| queue.pop()).map(|t| t.callback.unwrap()).collect();
        assert_eq!(order, vec![1, 2, 3, 4]);
    }

    #[test]
    fn write_payloads_survive_ring_wrap() {
        let mut queue = Queue::new();

        queue.push(TransferMode::Write, 1, 10, Some(&[1; 10]), None, false).unwrap();
        queue.push(TransferMode::Write, 2, 4, Some(&[2; 4]), None, false).unwrap();
        queue.pop().unwrap();

        // Does not fit before the end of the ring, wraps to offset 0.
        queue.push(TransferMode::Write, 3, 8, Some(&[3; 8]), None, false).unwrap();

        // Ring is now full.
        assert!(queue.push(TransferMode::Write, 4, 8, Some(&[4; 8]), None, false).is_none());
        assert_eq!(queue.walk(), 2);

        let first = queue.head().unwrap();
        assert_eq!(queue.payload(queue.get(first)), &[2; 4]);
        queue.pop().unwrap();

        let second = queue.head().unwrap();
        assert_eq!(queue.payload(queue.get(second)), &[3; 8]);
    }

    #[test]
    fn clear_abandons_everything() {
        let mut queue = Queue::new();

        queue.push(TransferMode::Write, 1, 3, Some(&[0; 3]), None, false).unwrap();
        queue.push(TransferMode::Read, 1, 5, None, Some(1), true).unwrap();

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.queued_bytes(), 0);
        assert!(queue.pop().is_none());
    }
}
