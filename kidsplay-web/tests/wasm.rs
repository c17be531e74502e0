#![cfg(target_arch = "wasm32")]

use chrono::NaiveDate;
use kidsplay_game::{
    Clock, GameConfig, KeyValueStore, PREMIUM_KEY, PremiumFlag, PuzzleSource,
};
use kidsplay_web::{BrowserClock, FetchSource, KidsplayApp, LocalStore, dom};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_store_round_trips() {
    let store = LocalStore;
    store.set_item("kidsplay_test_key", "value").expect("write");
    assert_eq!(
        store.get_item("kidsplay_test_key").expect("read").as_deref(),
        Some("value")
    );
    assert_eq!(store.get_item("kidsplay_missing_key").expect("read"), None);
}

#[wasm_bindgen_test]
fn premium_flag_persists_in_local_storage() {
    dom::local_storage()
        .expect("storage")
        .remove_item(PREMIUM_KEY)
        .expect("clear");
    let flag = PremiumFlag::new(LocalStore);
    assert!(!flag.is_premium_user());
    flag.upgrade_to_premium();
    assert!(PremiumFlag::new(LocalStore).is_premium_user());
}

#[wasm_bindgen_test]
fn browser_clock_is_after_epoch() {
    let today = BrowserClock.today();
    assert!(today > NaiveDate::from_ymd_opt(2025, 1, 1).expect("date"));
}

#[wasm_bindgen_test]
async fn fetch_source_reports_missing_assets() {
    let err = FetchSource
        .fetch("/definitely/missing/wordPuzzles.json")
        .await
        .expect_err("missing asset");
    assert!(err.to_string().contains("wordPuzzles.json"));
}

#[wasm_bindgen_test]
async fn unknown_game_is_rejected() {
    let app = KidsplayApp::with_config(GameConfig::default());
    let result = JsFuture::from(app.open_game("chessGame")).await;
    assert!(result.is_err());
    assert!(!app.close_game());
}

#[wasm_bindgen_test]
async fn sleep_resolves() {
    dom::sleep_ms(5).await.expect("timer");
}
