//! Backend seam between the driver and the peripheral replaying samples.

use crate::framebuffer::DmaFrameBuffer;
use crate::DisplayError;

/// A parallel output peripheral that replays a [`DmaFrameBuffer`] in a loop.
///
/// Implementations keep pointing at the buffer handed to
/// [`configure`](Self::configure) and read it concurrently with later writes
/// to it. The caller guarantees the buffer does not move until the output is
/// stopped.
pub trait ParallelOutput {
    /// Resets the peripheral, programs clock, word width and pin routing,
    /// and points it at `samples`. Leaves the output stopped.
    ///
    /// # Errors
    /// Returns an error if the peripheral cannot replay `samples`.
    fn configure(&mut self, samples: &DmaFrameBuffer) -> Result<(), DisplayError>;

    /// Starts (or restarts) replaying the configured buffer.
    fn start(&mut self);

    /// Halts replay immediately.
    fn stop(&mut self);
}

impl<T: ParallelOutput + ?Sized> ParallelOutput for &mut T {
    fn configure(&mut self, samples: &DmaFrameBuffer) -> Result<(), DisplayError> {
        (**self).configure(samples)
    }

    fn start(&mut self) {
        (**self).start();
    }

    fn stop(&mut self) {
        (**self).stop();
    }
}
