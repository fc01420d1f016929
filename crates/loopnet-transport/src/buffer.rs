/// Fixed-capacity byte queue: frames are appended at the tail and consumed
/// from the head, with remaining bytes shifted down after each consume.
pub struct ReceiveBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl ReceiveBuffer {
    /// Allocate a zeroed buffer of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Number of queued bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// The queued bytes, head first.
    pub fn queued(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Free space past the tail, for encoding the next frame in place.
    pub fn tail_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.len..]
    }

    /// Mark `n` bytes past the tail as queued.
    ///
    /// Callers check capacity before encoding; `n` must fit in the free space.
    pub fn commit(&mut self, n: usize) {
        debug_assert!(
            self.len + n <= self.data.len(),
            "commit of {n} bytes overruns receive buffer ({} of {} used)",
            self.len,
            self.data.len()
        );
        self.len += n;
    }

    /// Drop `n` bytes from the head and shift the rest down.
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        self.data.copy_within(n..self.len, 0);
        self.len -= n;
    }

    /// Discard everything queued.
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl std::fmt::Debug for ReceiveBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReceiveBuffer")
            .field("len", &self.len)
            .field("capacity", &self.data.len())
            .finish()
    }
}
