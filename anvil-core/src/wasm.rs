//! WASM bindings for anvil-core
//!
//! Provides a JavaScript-friendly API over a planning session.

use wasm_bindgen::prelude::*;

use crate::session::slot_from_index;
use crate::{extract, Move, Session, Snapshot};

/// WASM-friendly wrapper around Session
#[wasm_bindgen]
pub struct WasmSession {
    inner: Session,
}

#[wasm_bindgen]
impl WasmSession {
    /// Create a session at progress 0 with no rules
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmSession {
        WasmSession { inner: Session::new() }
    }

    pub fn start(&self) -> i32 {
        self.inner.start()
    }

    pub fn target(&self) -> i32 {
        self.inner.target()
    }

    #[wasm_bindgen(js_name = setStart)]
    pub fn set_start(&mut self, progress: i32) {
        self.inner.set_start(progress);
    }

    #[wasm_bindgen(js_name = setTarget)]
    pub fn set_target(&mut self, progress: i32) {
        self.inner.set_target(progress);
    }

    /// Perform a move by name ("draw", "hard_hit", ...).
    /// Returns false for unknown names and for moves that leave the range
    /// (which also clears history).
    pub fn perform(&mut self, name: &str) -> bool {
        self.inner.perform_named(name).unwrap_or(false)
    }

    /// Clear performed history
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Cycle the move class of rule slot 0 (last), 1 or 2. Returns false for a bad slot.
    #[wasm_bindgen(js_name = cycleRuleClass)]
    pub fn cycle_rule_class(&mut self, slot: usize) -> bool {
        slot_from_index(slot)
            .map(|s| self.inner.cycle_rule_class(s))
            .is_ok()
    }

    #[wasm_bindgen(js_name = cycleRuleConstraint)]
    pub fn cycle_rule_constraint(&mut self, slot: usize) -> bool {
        slot_from_index(slot)
            .map(|s| self.inner.cycle_rule_constraint(s))
            .is_ok()
    }

    #[wasm_bindgen(js_name = clearRule)]
    pub fn clear_rule(&mut self, slot: usize) -> bool {
        slot_from_index(slot)
            .map(|s| self.inner.clear_rule(s))
            .is_ok()
    }

    /// Rules as JSON array indexed by slot (null for empty slots)
    pub fn rules(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.rules()).unwrap_or(JsValue::NULL)
    }

    /// Hint moves as an array of names, next move first.
    /// Empty array when done, null when there is no solution.
    pub fn hints(&self) -> JsValue {
        match self.inner.hints() {
            Some(hints) => {
                let names: Vec<&str> = hints.plan().into_iter().map(Move::name).collect();
                serde_wasm_bindgen::to_value(&names).unwrap_or(JsValue::NULL)
            }
            None => JsValue::NULL,
        }
    }

    /// Validation report: { valid, slots: [{ slot, status, indicators, label, matched }] }
    pub fn validation(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.validation()).unwrap_or(JsValue::NULL)
    }

    /// Last three performed moves, oldest first
    pub fn recent(&self) -> Vec<String> {
        self.inner
            .recent()
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    /// Snapshot JSON for recipe storage
    pub fn snapshot(&self) -> String {
        self.inner.snapshot().to_json().unwrap_or_default()
    }

    /// Load a snapshot JSON. Returns true if successful.
    pub fn restore(&mut self, json: &str) -> bool {
        Snapshot::from_json(json)
            .and_then(|snapshot| self.inner.restore(&snapshot))
            .is_ok()
    }

    /// Read start/target from an RGBA screenshot. Returns true if markers were found.
    #[wasm_bindgen(js_name = extractScreenshot)]
    pub fn extract_screenshot(&mut self, pixels: &[u8], width: usize, height: usize) -> bool {
        match extract(pixels, width, height) {
            Some(found) => {
                self.inner.apply_extracted(found);
                true
            }
            None => false,
        }
    }
}

impl Default for WasmSession {
    fn default() -> Self {
        Self::new()
    }
}
