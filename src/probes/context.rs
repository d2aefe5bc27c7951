//! Per-run probe context
//!
//! Expensive shared resources (a scratch canvas, the window handle) are
//! created once per collection run and handed to every probe explicitly,
//! instead of living in module-wide statics. Runs stay isolated and can
//! execute in parallel without sharing mutable state.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, Navigator, Screen, Window};

use crate::error::{Error, Result};

/// Shared handles for one collection run.
#[derive(Default)]
pub struct ProbeContext {
    canvas: RefCell<Option<HtmlCanvasElement>>,
}

impl ProbeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(&self) -> Result<Window> {
        web_sys::window().ok_or_else(|| Error::Environment("no window object".to_string()))
    }

    pub fn navigator(&self) -> Result<Navigator> {
        Ok(self.window()?.navigator())
    }

    pub fn document(&self) -> Result<Document> {
        self.window()?
            .document()
            .ok_or_else(|| Error::Environment("no document object".to_string()))
    }

    pub fn screen(&self) -> Result<Screen> {
        Ok(self.window()?.screen()?)
    }

    /// The run's scratch canvas, created on first use and reused by every
    /// probe that draws (canvas, WebGL and font probes resize it to taste).
    pub fn canvas(&self) -> Result<HtmlCanvasElement> {
        if let Some(canvas) = self.canvas.borrow().as_ref() {
            return Ok(canvas.clone());
        }
        let canvas: HtmlCanvasElement = self
            .document()?
            .create_element("canvas")?
            .dyn_into()
            .map_err(|_| Error::Probe("canvas element cast failed".to_string()))?;
        *self.canvas.borrow_mut() = Some(canvas.clone());
        Ok(canvas)
    }
}
