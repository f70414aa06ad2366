//=========================================================================
// Host Events
//
// The only messages that cross from the embedding host into the core.
// The platform layer (or a test harness) sends these over a bounded
// channel; the application loop drains the channel once per tick with a
// non-blocking poll.
//
//=========================================================================

//=== HostEvent ===========================================================

/// Events delivered by the host to the application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Terminate request (window close, OS shutdown, host teardown).
    ///
    /// Observed once per iteration; the loop finishes the current tick,
    /// then transitions to `ShuttingDown`.
    Quit,

    /// The host window changed size. The surface descriptor is updated
    /// and the present target recreated to match.
    Resized { width: u32, height: u32 },

    /// A HID device appeared. Informational only: enumeration is not
    /// stable, so opening stays an explicit act by the application.
    DeviceAttached { vendor_id: u16, product_id: u16 },

    /// A HID device went away. Any matching open handle is closed.
    DeviceDetached { vendor_id: u16, product_id: u16 },
}

//=========================================================================
// Unit Tests
//=========================================================================
