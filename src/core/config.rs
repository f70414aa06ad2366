//=========================================================================
// Core Configuration
//
// The host-facing configuration struct consumed by `App::initialize`.
// Replaces framework-side subclassing: instead of overriding a host
// callback to name its native modules, the embedding process hands the
// core an explicit manifest of subsystems to bring up, plus the surface
// and pacing parameters.
//
//=========================================================================

use crate::core::gfx::SurfaceDescriptor;

//=== Subsystem ===========================================================

/// A native subsystem the core brings up during initialization.
///
/// Subsystems are initialized in manifest order and logged as they come
/// up, so a failed startup names exactly how far it got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    /// Windowing and surface presentation.
    Video,
    /// Image asset decoding.
    ImageCodecs,
    /// Raw HID device access.
    Hid,
}

impl Subsystem {
    /// Human-readable name used in startup logs.
    pub fn name(self) -> &'static str {
        match self {
            Subsystem::Video => "video",
            Subsystem::ImageCodecs => "image-codecs",
            Subsystem::Hid => "hid",
        }
    }
}

//=== CoreConfig ==========================================================

/// Everything the host supplies before the loop starts.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Subsystems to initialize, in order.
    pub subsystems: Vec<Subsystem>,

    /// Descriptor for the single application surface.
    pub surface: SurfaceDescriptor,

    /// Fixed-step update rate in ticks per second.
    pub tick_rate: f64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            subsystems: vec![Subsystem::Video, Subsystem::ImageCodecs, Subsystem::Hid],
            surface: SurfaceDescriptor::new(640, 480, "crust"),
            tick_rate: 60.0,
        }
    }
}

impl CoreConfig {
    /// Whether the manifest requests the given subsystem.
    pub fn wants(&self, subsystem: Subsystem) -> bool {
        self.subsystems.contains(&subsystem)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manifest_includes_all_subsystems() {
        let config = CoreConfig::default();
        assert!(config.wants(Subsystem::Video));
        assert!(config.wants(Subsystem::ImageCodecs));
        assert!(config.wants(Subsystem::Hid));
    }

    #[test]
    fn wants_respects_a_trimmed_manifest() {
        let config = CoreConfig {
            subsystems: vec![Subsystem::Video],
            ..CoreConfig::default()
        };
        assert!(config.wants(Subsystem::Video));
        assert!(!config.wants(Subsystem::Hid));
    }

    #[test]
    fn subsystem_names_are_stable() {
        assert_eq!(Subsystem::Video.name(), "video");
        assert_eq!(Subsystem::ImageCodecs.name(), "image-codecs");
        assert_eq!(Subsystem::Hid.name(), "hid");
    }
}
