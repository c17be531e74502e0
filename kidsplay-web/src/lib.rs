#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod app;
pub mod clock;
pub mod dom;
pub mod loader;
pub mod logger;
pub mod storage;

pub use app::KidsplayApp;
pub use clock::BrowserClock;
pub use loader::{FetchSource, WebDataError};
pub use storage::{LocalStore, WebStorageError};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logger::init(log::LevelFilter::Info);
}
