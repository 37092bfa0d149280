use std::fmt;

/// A drawing surface the entity graph renders onto.
///
/// The graph itself never touches pixels; it walks visible entities
/// and asks the canvas to place named images at resolved positions.
/// Frontends implement this for whatever backend they render with,
/// and tests implement it with a plain `Vec`.
pub trait Canvas {
    /// Place the named image with its top-left corner at `position`.
    fn blit(&mut self, image: &str, position: (f64, f64));
}

/// Renderable state attached to an entity.
pub trait Graphics: fmt::Debug {
    /// Advance per-frame graphical state, such as animation frames.
    fn refresh(&mut self) {}

    /// Draw onto the canvas at the entity's resolved position.
    fn draw(&self, canvas: &mut dyn Canvas, position: (f64, f64));
}

/// The simplest graphics: one named image.
#[derive(Debug, Clone)]
pub struct ImageGraphics {
    image: String,
}

impl ImageGraphics {
    /// Graphics that always draw the named image.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
        }
    }

    /// The image name.
    pub fn image(&self) -> &str {
        &self.image
    }
}

impl Graphics for ImageGraphics {
    fn draw(&self, canvas: &mut dyn Canvas, position: (f64, f64)) {
        canvas.blit(&self.image, position);
    }
}
