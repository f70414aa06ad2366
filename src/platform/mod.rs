//=========================================================================
// Platform Subsystem
//
// Bridges Winit (OS-level events) with the application core.
//
// Architecture:
// ```text
//  Main Thread (Winit event loop):
//  ┌──────────────────────────────┐
//  │  WinitHost                   │
//  │   ├─ resumed()               │  create window, install it in the
//  │   │                          │  WindowSlot, App::initialize()
//  │   ├─ window_event()          │  map → HostEvent → channel send
//  │   │                          │  (Quit additionally drives a tick
//  │   │                          │   so the core observes it now)
//  │   └─ RedrawRequested         │  App::tick() → request next redraw
//  └──────────────────────────────┘
// ```
//
// Key Design Decisions:
// - **RedrawRequested drives the tick**: the core is single-threaded,
//   so instead of a logic thread the host calls `App::tick` from the
//   frame boundary. Pacing comes from the display; the fixed timestep
//   accumulator keeps updates deterministic regardless.
// - **Lazy window creation in `resumed`**: required for mobile hosts,
//   which may suspend/resume the activity repeatedly.
// - **WindowSlot indirection**: the app (and its surface backend) is
//   built before any window exists. The slot is filled in `resumed`,
//   and `WinitBackend::create_target` fails with `CreationFailed`
//   until then.
// - **Main thread requirement**: Winit mandates the main thread on
//   macOS/iOS, so `WinitHost::run` must be called there.
//
//=========================================================================

//=== Submodules ==========================================================

mod event_mapper;

//=== External Crates =====================================================

use std::sync::{Arc, Mutex};

use crossbeam_channel::Sender;
use log::{error, info, warn};
use thiserror::Error;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowAttributes},
};

//=== Internal Dependencies ===============================================

use crate::app::{App, TickControl};
use crate::core::error::SurfaceError;
use crate::core::gfx::{Framebuffer, PresentTarget, SurfaceBackend, SurfaceDescriptor};
use crate::core::host::HostEvent;

//=== HostError ===========================================================

/// Platform initialization and runtime errors.
///
/// These are typically fatal: if the event loop cannot be created, the
/// windowed embedding cannot run at all.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("event loop creation failed: {0}")]
    EventLoopCreation(winit::error::EventLoopError),

    #[error("event loop error: {0}")]
    EventLoopExecution(winit::error::EventLoopError),
}

//=== WindowSlot ==========================================================

/// Shared cell holding the OS window once it exists.
///
/// Bridges the construction-order gap: the surface backend is installed
/// into the app before the host window can be created.
#[derive(Clone, Default)]
pub struct WindowSlot {
    window: Arc<Mutex<Option<Arc<Window>>>>,
}

impl WindowSlot {
    fn install(&self, window: Arc<Window>) {
        *self.window.lock().unwrap() = Some(window);
    }

    fn get(&self) -> Option<Arc<Window>> {
        self.window.lock().unwrap().clone()
    }
}

//=== WinitBackend ========================================================

/// Surface backend presenting to a real OS window.
pub struct WinitBackend {
    slot: WindowSlot,
}

impl WinitBackend {
    /// Creates the backend and the slot the host will fill once the
    /// window exists.
    pub fn new() -> (Self, WindowSlot) {
        let slot = WindowSlot::default();
        (Self { slot: slot.clone() }, slot)
    }
}

impl SurfaceBackend for WinitBackend {
    fn create_target(
        &mut self,
        _descriptor: &SurfaceDescriptor,
    ) -> Result<Box<dyn PresentTarget>, SurfaceError> {
        match self.slot.get() {
            Some(window) => Ok(Box::new(WindowTarget { window })),
            None => Err(SurfaceError::CreationFailed("no host window yet".into())),
        }
    }
}

//=== WindowTarget ========================================================

/// Present target over a live window.
///
/// The target is considered lost when the window's inner size no longer
/// matches the composed frame (an OS resize the core has not yet
/// processed); the core recovers by recreating the surface.
struct WindowTarget {
    window: Arc<Window>,
}

impl PresentTarget for WindowTarget {
    fn present(&mut self, frame: &Framebuffer) -> Result<(), SurfaceError> {
        let size = self.window.inner_size();
        if size.width != frame.width() || size.height != frame.height() {
            return Err(SurfaceError::RenderTargetLost);
        }

        self.window.pre_present_notify();
        Ok(())
    }
}

//=== WinitHost ===========================================================

/// Windowed embedding of the application core.
///
/// Owns the app and drives it from the Winit event loop: window events
/// are translated into [`HostEvent`]s and sent over the channel the app
/// polls, and every `RedrawRequested` runs one tick.
///
/// # Examples
///
/// ```no_run
/// use crustlib::platform::{WinitBackend, WinitHost};
/// use crustlib::prelude::*;
///
/// let (backend, slot) = WinitBackend::new();
/// let (app, host_events) = AppBuilder::new()
///     .with_surface(800, 600, "crust")
///     .with_surface_backend(Box::new(backend))
///     .build();
///
/// WinitHost::new(app, host_events, slot).run().unwrap();
/// ```
pub struct WinitHost {
    app: App,
    slot: WindowSlot,
    event_sender: Sender<HostEvent>,
    window: Option<Arc<Window>>,
}

impl WinitHost {
    //--- Construction -----------------------------------------------------

    pub fn new(app: App, event_sender: Sender<HostEvent>, slot: WindowSlot) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            app,
            slot,
            event_sender,
            window: None,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the Winit event loop until the core terminates or the OS
    /// tears the process down.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the event loop cannot be created or
    /// fails while executing.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS Winit
    /// requirement).
    pub fn run(mut self) -> Result<(), HostError> {
        let event_loop = EventLoop::new().map_err(HostError::EventLoopCreation)?;

        event_loop
            .run_app(&mut self)
            .map_err(HostError::EventLoopExecution)
    }

    //--- Internal Helpers -------------------------------------------------

    /// Sends one host event, tolerating a core that already exited.
    fn send_host_event(&self, event: HostEvent) {
        if self.event_sender.try_send(event).is_err() {
            warn!(target: "platform", "Dropping host event {:?} (channel unavailable)", event);
        }
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for WinitHost {
    /// Called when the app becomes active (startup or mobile resume).
    ///
    /// Creates the window on first activation, installs it in the slot,
    /// and initializes the core so its surface lands on the real window.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let descriptor = self.app.config().surface.clone();
        let attrs = WindowAttributes::default()
            .with_title(&descriptor.title)
            .with_inner_size(LogicalSize::new(descriptor.width, descriptor.height));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                event_loop.exit();
                return;
            }
        };

        info!(
            target: "platform",
            "Window created: {}x{} @ {}x DPI",
            window.inner_size().width,
            window.inner_size().height,
            window.scale_factor()
        );

        self.slot.install(Arc::clone(&window));
        window.request_redraw();
        self.window = Some(window);

        if let Err(e) = self.app.initialize() {
            error!(target: "platform", "Core initialization failed: {}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::RedrawRequested = event {
            // Frame boundary: one core tick, then schedule the next.
            if let TickControl::Exit = self.app.tick() {
                event_loop.exit();
                return;
            }
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            return;
        }

        if let Some(host_event) = event_mapper::map_window_event(&event) {
            self.send_host_event(host_event);

            // A quit must not wait for a redraw that may never come.
            if host_event == HostEvent::Quit {
                info!(target: "platform", "Window close requested");
                if let TickControl::Exit = self.app.tick() {
                    event_loop.exit();
                }
            }
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
