//=========================================================================
// Platform Event Mapper
//
// Converts Winit window events to core-level `HostEvent`s. Provides a
// clean separation between OS-specific events and the core's internal
// host vocabulary.
//
// Responsibilities:
// - Translate close and resize events
// - Ignore events the core has no use for
//
//=========================================================================

use winit::event::WindowEvent;

use crate::core::host::HostEvent;

/// Maps a Winit window event onto the host vocabulary.
///
/// Returns `None` for events the core does not consume (focus, cursor
/// movement, redraw scheduling, ...).
pub(crate) fn map_window_event(event: &WindowEvent) -> Option<HostEvent> {
    match event {
        WindowEvent::CloseRequested | WindowEvent::Destroyed => Some(HostEvent::Quit),

        WindowEvent::Resized(size) => Some(HostEvent::Resized {
            width: size.width,
            height: size.height,
        }),

        _ => None,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
