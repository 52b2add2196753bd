//! HUD text sinks
//!
//! The simulation only writes text; where it ends up (DOM element, log, test
//! buffer) is up to the host. Every sink is optional.

use std::cell::RefCell;
use std::rc::Rc;

/// State label while a level is in progress
pub const LABEL_PLAYING: &str = "Playing";
/// State label after a time-out
pub const LABEL_LOSE: &str = "You lose";
/// State label after the target is defeated
pub const LABEL_WIN: &str = "You win!";

/// Write-only text destination
pub trait TextSink {
    fn set_text(&mut self, text: &str);
}

/// Shared string buffer, handy for headless runs and tests
impl TextSink for Rc<RefCell<String>> {
    fn set_text(&mut self, text: &str) {
        let mut buf = self.borrow_mut();
        buf.clear();
        buf.push_str(text);
    }
}

#[cfg(target_arch = "wasm32")]
impl TextSink for web_sys::Element {
    fn set_text(&mut self, text: &str) {
        self.set_text_content(Some(text));
    }
}

/// The three HUD fields the game updates
#[derive(Default)]
pub struct UiSinks {
    pub timer: Option<Box<dyn TextSink>>,
    pub level_name: Option<Box<dyn TextSink>>,
    pub state_label: Option<Box<dyn TextSink>>,
}

impl UiSinks {
    pub fn set_timer(&mut self, text: &str) {
        if let Some(sink) = self.timer.as_mut() {
            sink.set_text(text);
        }
    }

    pub fn set_level_name(&mut self, text: &str) {
        if let Some(sink) = self.level_name.as_mut() {
            sink.set_text(text);
        }
    }

    pub fn set_state_label(&mut self, text: &str) {
        if let Some(sink) = self.state_label.as_mut() {
            sink.set_text(text);
        }
    }
}

/// Format whole seconds as `MM:SS`
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    format!("{minutes:02}:{secs:02}")
}
