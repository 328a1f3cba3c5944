use glam::Mat4;

/// Supplies the view and projection transforms for a frame.
///
/// Cameras live outside the render core; the core only reads them.
pub trait Camera {
    fn view(&self) -> Mat4;
    fn projection(&self) -> Mat4;
}

/// A camera frozen to fixed matrices. Useful for tools and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMatrices {
    pub view: Mat4,
    pub projection: Mat4,
}

impl Default for CameraMatrices {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        }
    }
}

impl Camera for CameraMatrices {
    fn view(&self) -> Mat4 {
        self.view
    }

    fn projection(&self) -> Mat4 {
        self.projection
    }
}
