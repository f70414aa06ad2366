//=========================================================================
// Surface
//
// The single on-screen rendering target. Exactly one exists for the
// process lifetime under normal operation; the descriptor survives
// target recreation so the recovery path for a lost render target can
// rebuild an identical surface.
//
//=========================================================================

//=== SurfaceDescriptor ===================================================

/// Parameters for creating (or recreating) the application surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl SurfaceDescriptor {
    pub fn new(width: u32, height: u32, title: impl Into<String>) -> Self {
        Self {
            width,
            height,
            title: title.into(),
        }
    }
}

//=== Surface =============================================================

/// The application window/rendering target.
#[derive(Debug)]
pub struct Surface {
    descriptor: SurfaceDescriptor,
    active: bool,
}

impl Surface {
    pub(crate) fn new(descriptor: SurfaceDescriptor) -> Self {
        Self {
            descriptor,
            active: true,
        }
    }

    pub fn width(&self) -> u32 {
        self.descriptor.width
    }

    pub fn height(&self) -> u32 {
        self.descriptor.height
    }

    pub fn title(&self) -> &str {
        &self.descriptor.title
    }

    /// Inactive between target loss and successful recreation.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn descriptor(&self) -> &SurfaceDescriptor {
        &self.descriptor
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.descriptor.width = width;
        self.descriptor.height = height;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_starts_active_with_descriptor_values() {
        let surface = Surface::new(SurfaceDescriptor::new(800, 600, "demo"));
        assert_eq!(surface.width(), 800);
        assert_eq!(surface.height(), 600);
        assert_eq!(surface.title(), "demo");
        assert!(surface.is_active());
    }

    #[test]
    fn resize_updates_the_descriptor() {
        let mut surface = Surface::new(SurfaceDescriptor::new(800, 600, "demo"));
        surface.resize(1024, 768);
        assert_eq!(surface.width(), 1024);
        assert_eq!(surface.height(), 768);
    }
}
