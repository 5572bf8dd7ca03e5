use crate::bracket::Bracket;
use crate::storage::BrowserStorage;
use crate::store::log_rejected;
use js_sys::{Reflect, JSON};
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use yew::Callback;

/// Name of the integration object on `window`.
pub const GLOBAL_NAME: &str = "MECOM_BRACKET_V2";

pub type SharedBracket = Rc<RefCell<Bracket<BrowserStorage>>>;

/// Console and tooling access to the bracket. Failed calls are no-ops.
#[wasm_bindgen]
pub struct BracketApi {
    bracket: SharedBracket,
    refresh: Callback<()>,
}

#[wasm_bindgen]
impl BracketApi {
    /// Deep copy of the working rounds as plain JS data.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> JsValue {
        let snapshot = self.bracket.borrow().snapshot();
        match serde_json::to_string(&snapshot) {
            Ok(text) => JSON::parse(&text).unwrap_or(JsValue::NULL),
            Err(err) => {
                warn!("Failed to export bracket state: {}", err);
                JsValue::NULL
            }
        }
    }

    #[wasm_bindgen(js_name = setState)]
    pub fn set_state(&self, value: JsValue) {
        let Some(text) = JSON::stringify(&value)
            .ok()
            .and_then(|text| JsValue::from(text).as_string())
        else {
            warn!("Ignoring bracket replacement: value is not serializable");
            return;
        };

        let result = self.bracket.borrow_mut().replace_from_json(&text);
        match result {
            Ok(()) => self.refresh.emit(()),
            Err(err) => log_rejected(&err),
        }
    }

    #[wasm_bindgen(js_name = resetDefaults)]
    pub fn reset_defaults(&self) {
        self.bracket.borrow_mut().reset_to_default();
        self.refresh.emit(());
    }
}

pub fn install(bracket: SharedBracket, refresh: Callback<()>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let api = BracketApi { bracket, refresh };
    match Reflect::set(&window, &JsValue::from_str(GLOBAL_NAME), &JsValue::from(api)) {
        Ok(_) => debug!("Exposed window.{}", GLOBAL_NAME),
        Err(err) => warn!("Could not expose window.{}: {:?}", GLOBAL_NAME, err),
    }
}

pub fn uninstall() {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Err(err) = Reflect::delete_property(&window, &JsValue::from_str(GLOBAL_NAME)) {
        warn!("Could not remove window.{}: {:?}", GLOBAL_NAME, err);
    }
}
