//! JavaScript-facing handle over the session controller.
//!
//! Every move returns a plain object describing the turn. Delayed follow-ups
//! are run here on browser timers; each one that still applies is reported
//! through the `onEvent` callback.

use js_sys::{Function, Promise};
use kidsplay_game::{
    GameConfig, GameKind, PuzzleCategory, ScheduledAction, SessionController, SessionError, Turn,
};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::clock::BrowserClock;
use crate::dom;
use crate::loader::FetchSource;
use crate::storage::LocalStore;

type WebController = SessionController<FetchSource, LocalStore, BrowserClock>;

/// Error payload handed to JavaScript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<PuzzleCategory>,
    /// The game button should be disabled until reload.
    pub disabled: bool,
}

impl Failure {
    #[must_use]
    pub fn from_session(err: &SessionError) -> Self {
        let (kind, category) = match err {
            SessionError::Catalog(catalog) => ("catalog", Some(catalog.category())),
            SessionError::InvalidInput(_) => ("invalidInput", None),
            SessionError::NoSession => ("noSession", None),
            SessionError::WrongGame { .. } => ("wrongGame", None),
            SessionError::NotActive(_) => ("notActive", None),
        };
        Self {
            kind,
            message: err.to_string(),
            category,
            disabled: category.is_some(),
        }
    }

    fn unknown_game(id: &str) -> Self {
        Self {
            kind: "unknownGame",
            message: format!("unknown game: {id}"),
            category: None,
            disabled: false,
        }
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(Into::into)
}

fn reject(failure: &Failure) -> JsValue {
    to_js(failure).unwrap_or_else(|err| err)
}

#[wasm_bindgen]
pub struct KidsplayApp {
    controller: Rc<RefCell<WebController>>,
    on_event: Rc<RefCell<Option<Function>>>,
}

#[wasm_bindgen]
impl KidsplayApp {
    /// Create the app from an optional config object; missing fields keep
    /// their defaults.
    ///
    /// # Errors
    /// Returns an error if `config` does not describe a valid configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<Self, JsValue> {
        let config: GameConfig = if config.is_undefined() || config.is_null() {
            GameConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Ok(Self::with_config(config))
    }

    /// Create the app from the text of a `config.json` file.
    ///
    /// # Errors
    /// Returns an error if the JSON cannot be parsed.
    #[wasm_bindgen(js_name = fromConfigJson)]
    pub fn from_config_json(json: &str) -> Result<Self, JsValue> {
        let config = GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self::with_config(config))
    }

    /// Register the callback that receives fired follow-up actions.
    #[wasm_bindgen(js_name = setOnEvent)]
    pub fn set_on_event(&self, callback: Option<Function>) {
        *self.on_event.borrow_mut() = callback;
    }

    /// Open `game_id`, resolving with the opened game or rejecting with a
    /// failure whose `disabled` flag is set for unloadable datasets.
    #[wasm_bindgen(js_name = openGame)]
    pub fn open_game(&self, game_id: &str) -> Promise {
        let Ok(game) = game_id.parse::<GameKind>() else {
            let failure = reject(&Failure::unknown_game(game_id));
            return future_to_promise(async move { Err(failure) });
        };
        let controller = Rc::clone(&self.controller);
        future_to_promise(async move {
            let (ticket, catalog) = {
                let mut ctl = controller.borrow_mut();
                (ctl.begin_open(game), ctl.catalog())
            };
            let loaded = catalog.load(game.category()).await;
            let opened = controller.borrow_mut().finish_open(ticket, loaded);
            match opened {
                Ok(opened) => to_js(&opened),
                Err(err) => Err(reject(&Failure::from_session(&err))),
            }
        })
    }

    /// Pending follow-ups for the closed game are dropped; the page removes
    /// any celebration banner itself.
    #[wasm_bindgen(js_name = closeGame)]
    pub fn close_game(&self) -> bool {
        self.controller.borrow_mut().close()
    }

    /// # Errors
    /// Rejects guesses that are not five letters.
    #[wasm_bindgen(js_name = submitWordGuess)]
    pub fn submit_word_guess(&self, guess: &str) -> Result<JsValue, JsValue> {
        let turn = self.controller.borrow_mut().submit_word_guess(guess);
        self.deliver(turn)
    }

    /// # Errors
    /// Rejects non-numeric answers.
    #[wasm_bindgen(js_name = checkMathAnswer)]
    pub fn check_math_answer(&self, answer: &str) -> Result<JsValue, JsValue> {
        let turn = self.controller.borrow_mut().check_math_answer(answer);
        self.deliver(turn)
    }

    /// # Errors
    /// Rejects non-numeric answers.
    #[wasm_bindgen(js_name = checkPuzzleAnswer)]
    pub fn check_puzzle_answer(&self, answer: &str) -> Result<JsValue, JsValue> {
        let turn = self.controller.borrow_mut().check_pattern_answer(answer);
        self.deliver(turn)
    }

    /// # Errors
    /// Rejects an option index past the choices.
    #[wasm_bindgen(js_name = selectQuizAnswer)]
    pub fn select_quiz_answer(&self, index: usize) -> Result<JsValue, JsValue> {
        let turn = self.controller.borrow_mut().select_quiz_answer(index);
        self.deliver(turn)
    }

    /// # Errors
    /// Rejects unknown or face-up cards.
    #[wasm_bindgen(js_name = flipCard)]
    pub fn flip_card(&self, index: usize) -> Result<JsValue, JsValue> {
        let turn = self.controller.borrow_mut().flip_card(index);
        self.deliver(turn)
    }

    /// # Errors
    /// Fails when the drawing game is not open.
    #[wasm_bindgen(js_name = finishDrawing)]
    pub fn finish_drawing(&self) -> Result<JsValue, JsValue> {
        let turn = self.controller.borrow_mut().finish_drawing();
        self.deliver(turn)
    }

    /// # Errors
    /// Fails only if the stats cannot be converted.
    #[wasm_bindgen(js_name = getStatsSnapshot)]
    pub fn stats_snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.borrow().stats_snapshot())
    }

    /// # Errors
    /// Fails only if the display strings cannot be converted.
    #[wasm_bindgen(js_name = getStatsDisplay)]
    pub fn stats_display(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.borrow().stats_display())
    }

    /// # Errors
    /// Fails only if the statuses cannot be converted.
    #[wasm_bindgen(js_name = refreshDailyStatus)]
    pub fn refresh_daily_status(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.borrow().refresh_daily_status())
    }

    #[wasm_bindgen(js_name = isPremiumUser)]
    pub fn is_premium_user(&self) -> bool {
        self.controller.borrow().is_premium_user()
    }

    #[wasm_bindgen(js_name = upgradeToPremium)]
    pub fn upgrade_to_premium(&self) {
        self.controller.borrow().upgrade_to_premium();
    }

    /// Current session phase as a lower-camel string.
    ///
    /// # Errors
    /// Fails only if the phase cannot be converted.
    pub fn phase(&self) -> Result<JsValue, JsValue> {
        to_js(&self.controller.borrow().phase())
    }
}

impl KidsplayApp {
    #[must_use]
    pub fn with_config(config: GameConfig) -> Self {
        let controller = SessionController::new(FetchSource, LocalStore, BrowserClock, config);
        Self {
            controller: Rc::new(RefCell::new(controller)),
            on_event: Rc::new(RefCell::new(None)),
        }
    }

    fn deliver(&self, turn: Result<Turn, SessionError>) -> Result<JsValue, JsValue> {
        let turn = turn.map_err(|err| reject(&Failure::from_session(&err)))?;
        for scheduled in &turn.scheduled {
            self.schedule(*scheduled);
        }
        to_js(&turn)
    }

    fn schedule(&self, scheduled: ScheduledAction) {
        let controller = Rc::clone(&self.controller);
        let on_event = Rc::clone(&self.on_event);
        spawn_local(async move {
            if let Err(err) = dom::sleep_ms(scheduled.delay_ms).await {
                log::warn!("timer failed: {}", dom::js_error_message(&err));
                return;
            }
            if !controller.borrow_mut().fire(&scheduled) {
                return;
            }
            let callback = on_event.borrow().clone();
            if let Some(callback) = callback
                && let Ok(payload) = to_js(&scheduled)
                && let Err(err) = callback.call1(&JsValue::NULL, &payload)
            {
                log::warn!("onEvent failed: {}", dom::js_error_message(&err));
            }
        });
    }
}
