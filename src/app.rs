//=========================================================================
// Application Loop Controller
//
// Drives the fixed-step update/present loop and owns startup/shutdown
// ordering for the device bridge and the surface manager.
//
// Architecture:
// ```text
//     AppBuilder  ──build()──>  (App, Sender<HostEvent>)
//         │                       │
//         ├─ with_tick_rate()     ├─ initialize()   Uninitialized → Running
//         ├─ with_surface()       ├─ tick()         one loop iteration
//         └─ with_delegate()      └─ shutdown()     … → Terminated
// ```
//
// State machine:
//   Uninitialized -> Running -> ShuttingDown -> Terminated
//
// Each iteration while Running:
//   poll host events (non-blocking) → route device events to the bridge
//   → advance the fixed timestep → delegate update/compose → present.
//
// Error routing (see core::error):
//   device errors    log, close the device, keep looping
//   target lost      one surface recreation attempt
//   anything else    transition to ShuttingDown
//
// The whole loop runs on one thread; the only suspension point is the
// pacing sleep in `run`. A quit request is a flag observed once per
// iteration, never an asynchronous interrupt.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::thread;
use std::time::Instant;

//=== External Crates =====================================================

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use log::{debug, error, info, warn};

//=== Internal Dependencies ===============================================

use crate::core::config::{CoreConfig, Subsystem};
use crate::core::device::{DeviceBridge, DeviceKey, HidBackend, SimulatedHid};
use crate::core::error::{CoreError, DeviceError, SurfaceError};
use crate::core::gfx::{DrawList, HeadlessBackend, SurfaceBackend, SurfaceManager};
use crate::core::host::HostEvent;
use crate::core::tick::{FixedTimestep, FrameTick};

//=== LoopState ===========================================================

/// Lifecycle states of the application loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    ShuttingDown,
    Terminated,
}

//=== TickControl =========================================================

/// Control flow signal returned by each loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickControl {
    Continue,
    Exit,
}

//=== FrameContext ========================================================

/// Mutable access to the two dependent components, handed to the
/// delegate each tick.
pub struct FrameContext<'a> {
    pub devices: &'a mut DeviceBridge,
    pub surfaces: &'a mut SurfaceManager,
}

//=== AppDelegate =========================================================

/// Application hooks invoked by the loop controller.
///
/// All hooks have empty defaults; an app with no delegate presents empty
/// frames until the host asks it to quit.
pub trait AppDelegate {
    /// Called once after the subsystems are up, before the first tick.
    /// Open devices and load textures here. A device error is logged and
    /// ignored (devices are optional); a fatal error aborts
    /// initialization.
    fn on_start(&mut self, _ctx: &mut FrameContext) -> Result<(), CoreError> {
        Ok(())
    }

    /// Called every tick with the elapsed-time measurement.
    fn update(&mut self, _tick: FrameTick, _ctx: &mut FrameContext) -> Result<(), CoreError> {
        Ok(())
    }

    /// Fills the draw list for this frame. The list arrives cleared.
    fn compose(&mut self, _frame: &mut DrawList) {}
}

//=== AppBuilder ==========================================================

/// Builder for configuring and constructing an [`App`].
///
/// Defaults: 60 ticks per second, a 640x480 surface, all subsystems,
/// channel capacity 128, simulated HID and headless surface backends.
/// Real embeddings install the platform backends before building.
///
/// # Examples
///
/// ```
/// use crustlib::prelude::*;
///
/// let (mut app, host) = AppBuilder::new()
///     .with_tick_rate(120.0)
///     .with_surface(800, 600, "demo")
///     .build();
///
/// app.initialize().unwrap();
/// host.send(HostEvent::Quit).unwrap();
/// app.run().unwrap();
/// assert_eq!(app.state(), LoopState::Terminated);
/// ```
pub struct AppBuilder {
    config: CoreConfig,
    channel_capacity: usize,
    hid_backend: Box<dyn HidBackend>,
    surface_backend: Box<dyn SurfaceBackend>,
    delegate: Option<Box<dyn AppDelegate>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: CoreConfig::default(),
            channel_capacity: 128,
            hid_backend: Box::new(SimulatedHid::new()),
            surface_backend: Box::new(HeadlessBackend::new()),
            delegate: None,
        }
    }

    /// Replaces the whole configuration struct.
    pub fn with_config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the fixed-step update rate.
    ///
    /// # Panics
    ///
    /// Panics if `tick_rate <= 0.0`.
    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        assert!(tick_rate > 0.0, "Tick rate must be positive, got {}", tick_rate);
        self.config.tick_rate = tick_rate;
        self
    }

    /// Sets the surface dimensions and title.
    pub fn with_surface(mut self, width: u32, height: u32, title: &str) -> Self {
        self.config.surface = crate::core::gfx::SurfaceDescriptor::new(width, height, title);
        self
    }

    /// Replaces the subsystem manifest.
    pub fn with_subsystems(mut self, subsystems: Vec<Subsystem>) -> Self {
        self.config.subsystems = subsystems;
        self
    }

    /// Sets the host → core channel capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Channel capacity must be positive");
        self.channel_capacity = capacity;
        self
    }

    /// Installs the HID backend.
    pub fn with_hid_backend(mut self, backend: Box<dyn HidBackend>) -> Self {
        self.hid_backend = backend;
        self
    }

    /// Installs the surface backend.
    pub fn with_surface_backend(mut self, backend: Box<dyn SurfaceBackend>) -> Self {
        self.surface_backend = backend;
        self
    }

    /// Installs the application delegate.
    pub fn with_delegate(mut self, delegate: Box<dyn AppDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    /// Builds the app and returns it with the host event sender.
    pub fn build(self) -> (App, Sender<HostEvent>) {
        info!(
            "Building app (TPS: {}, surface: {}x{}, channel: {})",
            self.config.tick_rate,
            self.config.surface.width,
            self.config.surface.height,
            self.channel_capacity
        );

        let (tx, rx) = bounded(self.channel_capacity);
        let timestep = FixedTimestep::new(self.config.tick_rate);

        let app = App {
            state: LoopState::Uninitialized,
            config: self.config,
            devices: DeviceBridge::new(self.hid_backend),
            surfaces: SurfaceManager::new(self.surface_backend),
            timestep,
            events: rx,
            delegate: self.delegate,
            draw_list: DrawList::new(),
        };

        (app, tx)
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== App =================================================================

/// The application core runtime.
///
/// The embedding process owns the lifecycle: call
/// [`initialize`](Self::initialize) at a well-defined startup point,
/// then either [`run`](Self::run) (blocking, self-paced) or repeated
/// [`tick`](Self::tick) calls (host-paced, e.g. from a window redraw
/// callback), and finally [`shutdown`](Self::shutdown) if the loop has
/// not already terminated itself.
pub struct App {
    state: LoopState,
    config: CoreConfig,
    devices: DeviceBridge,
    surfaces: SurfaceManager,
    timestep: FixedTimestep,
    events: Receiver<HostEvent>,
    delegate: Option<Box<dyn AppDelegate>>,
    draw_list: DrawList,
}

impl App {
    //--- Lifecycle --------------------------------------------------------

    /// Brings up the subsystem manifest in order, creates the surface,
    /// and runs the delegate's `on_start` hook.
    ///
    /// On success the loop is `Running`. Devices are optional: a device
    /// error from `on_start` is logged and initialization proceeds. Any
    /// fatal error rolls the surface back and leaves the loop
    /// `Uninitialized`.
    pub fn initialize(&mut self) -> Result<(), CoreError> {
        if self.state != LoopState::Uninitialized {
            warn!("initialize() called in state {:?}, ignoring", self.state);
            return Ok(());
        }

        for subsystem in &self.config.subsystems {
            info!("Init {} ...", subsystem.name());
        }

        if !self.config.wants(Subsystem::Video) {
            return Err(CoreError::Surface(SurfaceError::CreationFailed(
                "the video subsystem is required".into(),
            )));
        }

        let descriptor = self.config.surface.clone();
        self.surfaces
            .create_surface(descriptor.width, descriptor.height, &descriptor.title)?;

        if let Some(delegate) = self.delegate.as_mut() {
            let mut ctx = FrameContext {
                devices: &mut self.devices,
                surfaces: &mut self.surfaces,
            };
            if let Err(e) = delegate.on_start(&mut ctx) {
                if e.is_fatal() {
                    error!("Delegate start-up failed: {}", e);
                    self.devices.close_all();
                    self.surfaces.destroy_surface();
                    return Err(e);
                }
                warn!("Delegate start-up device error (continuing): {}", e);
            }
        }

        self.state = LoopState::Running;
        info!("App running");
        Ok(())
    }

    /// Requests orderly termination: closes every device handle, tears
    /// the surface down, and reaches `Terminated`. Idempotent.
    pub fn shutdown(&mut self) {
        if self.state == LoopState::Terminated {
            return;
        }
        self.finish_shutdown();
    }

    //--- Execution --------------------------------------------------------

    /// Runs one loop iteration.
    ///
    /// Host-paced embeddings (a window redraw callback, a test harness)
    /// call this directly; [`run`](Self::run) wraps it with fixed-rate
    /// pacing. Returns [`TickControl::Exit`] once the loop has reached
    /// `Terminated`.
    pub fn tick(&mut self) -> TickControl {
        match self.state {
            LoopState::Uninitialized => {
                warn!("tick() before initialize(), ignoring");
                return TickControl::Exit;
            }
            LoopState::ShuttingDown => {
                self.finish_shutdown();
                return TickControl::Exit;
            }
            LoopState::Terminated => return TickControl::Exit,
            LoopState::Running => {}
        }

        //--- 1. Poll host events (non-blocking) --------------------------
        if let TickControl::Exit = self.drain_host_events() {
            self.finish_shutdown();
            return TickControl::Exit;
        }

        //--- 2. Advance the clock ----------------------------------------
        let tick = self.timestep.advance();

        //--- 3. Delegate update ------------------------------------------
        if let Some(delegate) = self.delegate.as_mut() {
            let mut ctx = FrameContext {
                devices: &mut self.devices,
                surfaces: &mut self.surfaces,
            };
            if let Err(e) = delegate.update(tick, &mut ctx) {
                if e.is_fatal() {
                    error!("Unrecoverable error from update: {}", e);
                    self.finish_shutdown();
                    return TickControl::Exit;
                }
                warn!("Device-layer error (continuing): {}", e);
            }
        }

        //--- 4. Compose and present --------------------------------------
        self.draw_list.clear();
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.compose(&mut self.draw_list);
        }

        if let Err(e) = self.surfaces.present(&self.draw_list) {
            if e.is_recoverable() {
                warn!("Render target lost, recreating surface");
                if let Err(e) = self.surfaces.recreate_surface() {
                    error!("Surface recreation failed: {}", e);
                    self.finish_shutdown();
                    return TickControl::Exit;
                }
            } else {
                error!("Present failed: {}", e);
                self.finish_shutdown();
                return TickControl::Exit;
            }
        }

        TickControl::Continue
    }

    /// Blocks until the loop terminates, pacing iterations at the
    /// configured tick rate.
    ///
    /// Initializes first when the loop is still `Uninitialized`.
    pub fn run(&mut self) -> Result<(), CoreError> {
        if self.state == LoopState::Uninitialized {
            self.initialize()?;
        }

        let frame_duration = self.timestep.step_duration();
        loop {
            let frame_start = Instant::now();

            if let TickControl::Exit = self.tick() {
                break;
            }

            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                thread::sleep(frame_duration - elapsed);
            }
        }

        info!("App loop exited in state {:?}", self.state);
        Ok(())
    }

    //--- Device Convenience -----------------------------------------------

    /// Opens a HID device, honoring the subsystem manifest.
    pub fn open_device(&mut self, vendor_id: u16, product_id: u16) -> Result<DeviceKey, DeviceError> {
        if !self.config.wants(Subsystem::Hid) {
            warn!("open_device without the hid subsystem in the manifest");
            return Err(DeviceError::NotFound {
                vendor_id,
                product_id,
            });
        }
        self.devices.open(vendor_id, product_id)
    }

    //--- Queries ----------------------------------------------------------

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn devices(&mut self) -> &mut DeviceBridge {
        &mut self.devices
    }

    pub fn surfaces(&mut self) -> &mut SurfaceManager {
        &mut self.surfaces
    }

    /// Number of device handles still open. Zero once `Terminated`.
    pub fn open_device_count(&self) -> usize {
        self.devices.open_count()
    }

    //--- Internal Helpers -------------------------------------------------

    /// Drains the host event channel without blocking. Returns `Exit`
    /// when a quit was delivered or the host hung up.
    fn drain_host_events(&mut self) -> TickControl {
        loop {
            match self.events.try_recv() {
                Ok(HostEvent::Quit) => {
                    info!("Host quit signal received");
                    return TickControl::Exit;
                }
                Ok(HostEvent::Resized { width, height }) => {
                    if let Err(e) = self.surfaces.resize_surface(width, height) {
                        error!("Resize to {}x{} failed: {}", width, height, e);
                        self.state = LoopState::ShuttingDown;
                        return TickControl::Exit;
                    }
                }
                Ok(HostEvent::DeviceAttached {
                    vendor_id,
                    product_id,
                }) => {
                    debug!(
                        target: "device",
                        "Host reports {:04x}:{:04x} attached", vendor_id, product_id
                    );
                }
                Ok(HostEvent::DeviceDetached {
                    vendor_id,
                    product_id,
                }) => {
                    self.devices.detach_matching(vendor_id, product_id);
                }
                Err(TryRecvError::Empty) => return TickControl::Continue,
                Err(TryRecvError::Disconnected) => {
                    warn!("Host event channel disconnected, shutting down");
                    return TickControl::Exit;
                }
            }
        }
    }

    /// Closes all device handles and destroys the surface, guaranteeing
    /// no leaked native resources.
    fn finish_shutdown(&mut self) {
        self.state = LoopState::ShuttingDown;
        info!("Shutting down");

        self.devices.close_all();
        self.surfaces.destroy_surface();

        self.state = LoopState::Terminated;
        info!("Terminated");
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
