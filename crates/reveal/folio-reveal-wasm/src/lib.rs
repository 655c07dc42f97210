use js_sys::JSON;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use folio_reveal_core::{
    GroupId, Inputs, LoopKind, Outputs, Registry, RevealConfig, RevealEngine, ScrollDepth,
};

mod console;
mod dom;

pub use dom::mount_page;

#[wasm_bindgen]
pub struct FolioReveal {
    core: RevealEngine,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Whole milliseconds from a JS delta; negative/NaN deltas count as 0.
pub(crate) fn dt_from_js(dt_ms: f64) -> u64 {
    if dt_ms.is_finite() && dt_ms > 0.0 {
        dt_ms.floor() as u64
    } else {
        0
    }
}

pub(crate) fn config_from_js(config: JsValue) -> Result<RevealConfig, JsError> {
    if jsvalue_is_undefined_or_null(&config) {
        return Ok(RevealConfig::default());
    }
    let cfg: RevealConfig =
        swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?;
    cfg.validate()
        .map_err(|e| JsError::new(&format!("config error: {e}")))?;
    Ok(cfg)
}

#[wasm_bindgen]
impl FolioReveal {
    /// Create an engine from a page description and an optional config object.
    /// Example:
    ///   new FolioReveal({ groups: [{ kind: "fade", members: [...] }] }, { fade_stagger_ms: 80 })
    #[wasm_bindgen(constructor)]
    pub fn new(page: JsValue, config: JsValue) -> Result<FolioReveal, JsError> {
        console_error_panic_hook::set_once();
        console::init();

        let cfg = config_from_js(config)?;
        let registry = if jsvalue_is_undefined_or_null(&page) {
            Registry::default()
        } else {
            // Stringify the JS object so we can reuse the core parser (expects &str)
            let s = JSON::stringify(&page)
                .map_err(|e| JsError::new(&format!("page stringify error: {:?}", e)))?
                .as_string()
                .ok_or_else(|| JsError::new("page: stringify produced non-string"))?;
            Registry::from_page_json(&s).map_err(|e| JsError::new(&format!("page error: {e}")))?
        };

        let core = RevealEngine::new(cfg, registry)
            .map_err(|e| JsError::new(&format!("engine error: {e}")))?;
        Ok(FolioReveal { core })
    }

    /// Step by dt (ms) with inputs JSON (`{ intersections: [...] }`). Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn update(&mut self, dt_ms: f64, inputs_json: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = if jsvalue_is_undefined_or_null(&inputs_json) {
            Inputs::default()
        } else {
            swb::from_value(inputs_json).map_err(|e| JsError::new(&format!("inputs error: {e}")))?
        };
        let out: &Outputs = self.core.update(dt_from_js(dt_ms), inputs);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Trigger a group without a viewport signal. Returns false if it already fired.
    #[wasm_bindgen]
    pub fn trigger(&mut self, group: u32) -> bool {
        self.core.trigger(GroupId(group))
    }

    #[wasm_bindgen(js_name = is_released)]
    pub fn is_released(&self, group: u32) -> bool {
        self.core.is_released(GroupId(group))
    }

    /// Group that reveals the element with this key.
    #[wasm_bindgen(js_name = group_of)]
    pub fn group_of(&self, key: String) -> Option<u32> {
        self.core.registry().group_of(&key).map(|g| g.0)
    }

    /// Start an ambient loop (`"cursor_blink"` or `"hue_cycle"`) on an element. Returns a LoopId.
    #[wasm_bindgen(js_name = start_loop)]
    pub fn start_loop(&mut self, key: String, kind: JsValue) -> Result<u32, JsError> {
        let kind: LoopKind =
            swb::from_value(kind).map_err(|e| JsError::new(&format!("loop kind error: {e}")))?;
        Ok(self.core.start_loop(key, kind).0)
    }

    #[wasm_bindgen(js_name = active_runs)]
    pub fn active_runs(&self) -> u32 {
        self.core.active_runs() as u32
    }

    #[wasm_bindgen(js_name = now_ms)]
    pub fn now_ms(&self) -> f64 {
        self.core.now_ms() as f64
    }
}

/// Max scroll depth tracker for hosts that wire their own scroll listener.
#[wasm_bindgen]
#[derive(Default)]
pub struct ScrollTracker {
    depth: ScrollDepth,
}

#[wasm_bindgen]
impl ScrollTracker {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ScrollTracker {
        ScrollTracker::default()
    }

    /// Record a sample; returns the max depth in whole percent so far.
    #[wasm_bindgen]
    pub fn record(&mut self, scroll_y: f64, viewport_h: f64, document_h: f64) -> u32 {
        self.depth.record(scroll_y, viewport_h, document_h)
    }

    #[wasm_bindgen(js_name = max_percent)]
    pub fn max_percent(&self) -> u32 {
        self.depth.max_percent()
    }
}

/// Hero transform for a scroll offset.
#[wasm_bindgen(js_name = parallax_transform)]
pub fn parallax_transform(scroll_y: f64) -> String {
    folio_reveal_core::parallax_transform(scroll_y)
}

/// Marquee duration (s) when ticker content overflows; undefined otherwise.
#[wasm_bindgen(js_name = ticker_duration)]
pub fn ticker_duration(content_width: f64, container_width: f64) -> Option<f64> {
    folio_reveal_core::ticker_duration(content_width, container_width)
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
