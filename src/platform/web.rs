//! Browser time source and frame loop

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Performance, Window};

use super::TimeSource;

/// `performance.now()`, the same time base as `requestAnimationFrame`
pub struct PerformanceClock {
    performance: Option<Performance>,
}

impl Default for PerformanceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PerformanceClock {
    pub fn new() -> Self {
        let performance = web_sys::window().and_then(|w| w.performance());
        if performance.is_none() {
            log::warn!("performance.now() unavailable - falling back to Date.now()");
        }
        Self { performance }
    }
}

impl TimeSource for PerformanceClock {
    fn now_ms(&self) -> f64 {
        match &self.performance {
            Some(p) => p.now(),
            None => js_sys::Date::now(),
        }
    }
}

type FrameCallback = Closure<dyn FnMut(f64)>;

/// Owns a `requestAnimationFrame` chain
///
/// `stop` cancels the pending request; dropping the handle stops it and
/// frees the callback. No callback runs after either.
pub struct FrameLoop {
    window: Window,
    running: Rc<Cell<bool>>,
    pending: Rc<Cell<Option<i32>>>,
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameLoop {
    /// Wrap `on_frame`; the loop stays idle until `start`
    pub fn new(mut on_frame: impl FnMut(f64) + 'static) -> Option<Self> {
        let window = web_sys::window()?;
        let running = Rc::new(Cell::new(false));
        let pending = Rc::new(Cell::new(None));
        let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));

        let weak_callback = Rc::downgrade(&callback);
        let loop_window = window.clone();
        let loop_running = running.clone();
        let loop_pending = pending.clone();
        *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
            loop_pending.set(None);
            if !loop_running.get() {
                return;
            }
            on_frame(time);
            // on_frame may have stopped us
            if !loop_running.get() {
                return;
            }
            if let Some(cb) = weak_callback.upgrade() {
                if let Some(cb) = cb.borrow().as_ref() {
                    loop_pending.set(
                        loop_window
                            .request_animation_frame(cb.as_ref().unchecked_ref())
                            .ok(),
                    );
                }
            }
        }));

        Some(Self {
            window,
            running,
            pending,
            callback,
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Request frames until `stop`
    pub fn start(&mut self) {
        if self.running.get() {
            return;
        }
        self.running.set(true);
        if self.pending.get().is_some() {
            return;
        }
        if let Some(cb) = self.callback.borrow().as_ref() {
            self.pending.set(
                self.window
                    .request_animation_frame(cb.as_ref().unchecked_ref())
                    .ok(),
            );
        }
    }

    /// Cancel the pending frame
    pub fn stop(&mut self) {
        self.running.set(false);
        if let Some(id) = self.pending.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
        self.callback.borrow_mut().take();
    }
}
