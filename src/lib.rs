//=========================================================================
// crustlib — Library Root
//
// A cross-platform native application core. Three components, in
// dependency order:
//
// - Device Input Bridge: typed, ownership-safe raw HID access behind a
//   swappable backend (`core::device`)
// - Asset & Surface Manager: the single rendering surface plus decoded
//   image textures and software frame composition (`core::gfx`)
// - Application Loop Controller: a single-threaded fixed-step loop with
//   explicit `initialize()`/`shutdown()` entry points for the embedding
//   host (`App`)
//
// The embedding host delivers events (quit, resize, device hot-plug)
// over a channel and decides the pacing model: `App::run` self-paces,
// or a windowed host drives `App::tick` from its redraw callback.
//
// Typical headless usage:
// ```
// use crustlib::prelude::*;
//
// let (mut app, host) = AppBuilder::new()
//     .with_surface(800, 600, "demo")
//     .build();
//
// host.send(HostEvent::Quit).unwrap();
// app.run().unwrap();
// assert_eq!(app.state(), LoopState::Terminated);
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the component systems (device bridge, surface manager,
// timing, configuration, errors). It is exposed publicly for
// extensibility, but normal application code mostly uses the top-level
// `App` facade.
//
// `platform` contains the Winit embedding: the windowed host, its
// surface backend, and the OS event mapping. Public because real
// embeddings install `WinitBackend` before building the app.
//
pub mod core;
pub mod platform;

//--- Internal Modules ----------------------------------------------------
//
// `app` defines the loop controller and its builder.
//
mod app;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the loop controller as the main entry point so users can
// simply `use crustlib::App;` without knowing the module structure.
//
pub use app::{App, AppBuilder, AppDelegate, FrameContext, LoopState, TickControl};

pub mod prelude;
