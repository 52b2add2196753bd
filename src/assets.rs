//! Image lookup for the renderer
//!
//! Images load asynchronously on the web. The renderer asks every frame and
//! falls back to primitive shapes while an image is not ready.

use std::collections::HashMap;

/// Logical name of the target image
pub const TARGET_IMAGE: &str = "john";
/// File backing the target image
pub const TARGET_IMAGE_FILE: &str = "assets/THEJOHNPORK.png";

/// Natural size of a ready image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    pub width: f32,
    pub height: f32,
}

impl ImageInfo {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width / height, 1.0 for degenerate images
    pub fn aspect(&self) -> f32 {
        if self.width > 0.0 && self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// Read-only view of the image cache
pub trait ImageSource {
    /// Size of the named image, or `None` while it is missing or still loading
    fn image(&self, name: &str) -> Option<ImageInfo>;
}

/// Fixed set of "ready" images (headless runs, tests)
#[derive(Debug, Clone, Default)]
pub struct StaticImages {
    images: HashMap<String, ImageInfo>,
}

impl StaticImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, info: ImageInfo) -> Self {
        self.images.insert(name.to_string(), info);
        self
    }
}

impl ImageSource for StaticImages {
    fn image(&self, name: &str) -> Option<ImageInfo> {
        self.images.get(name).copied()
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::ImageCache;

#[cfg(target_arch = "wasm32")]
mod web {
    use std::collections::HashMap;

    use web_sys::HtmlImageElement;

    use super::{ImageInfo, ImageSource};

    /// Browser image cache; readiness is polled from the element each frame
    #[derive(Default)]
    pub struct ImageCache {
        images: HashMap<String, HtmlImageElement>,
    }

    impl ImageCache {
        pub fn new() -> Self {
            Self::default()
        }

        /// Start loading `src` under `name` (no-op if already requested)
        pub fn load(&mut self, name: &str, src: &str) {
            if self.images.contains_key(name) {
                return;
            }
            match HtmlImageElement::new() {
                Ok(img) => {
                    img.set_src(src);
                    self.images.insert(name.to_string(), img);
                    log::info!("Loading image '{}' from {}", name, src);
                }
                Err(e) => log::warn!("Could not create image element for {}: {:?}", src, e),
            }
        }

        /// Element for a ready image
        pub fn element(&self, name: &str) -> Option<&HtmlImageElement> {
            self.images
                .get(name)
                .filter(|img| img.complete() && img.natural_width() > 0)
        }
    }

    impl ImageSource for ImageCache {
        fn image(&self, name: &str) -> Option<ImageInfo> {
            self.element(name)
                .map(|img| ImageInfo::new(img.natural_width() as f32, img.natural_height() as f32))
        }
    }
}
