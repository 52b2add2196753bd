//! Browser frame scheduling via `requestAnimationFrame`

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::{FrameHandle, FrameScheduler};

/// Callback slot filled by the host once the game is reachable from a closure
pub type FrameCallbackSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Schedules the shared frame callback on the display refresh
pub struct AnimationFrameScheduler {
    callback: FrameCallbackSlot,
}

impl AnimationFrameScheduler {
    pub fn new(callback: FrameCallbackSlot) -> Self {
        Self { callback }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        let window = web_sys::window()?;
        let slot = self.callback.borrow();
        let Some(callback) = slot.as_ref() else {
            log::warn!("Frame requested before the frame callback was installed");
            return None;
        };
        match window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(id) => Some(FrameHandle(id)),
            Err(e) => {
                log::error!("requestAnimationFrame failed: {:?}", e);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle.0);
        }
    }
}
