//! Browser tests, run with `wasm-pack test --headless --firefox`

#![cfg(all(target_arch = "wasm32", feature = "wasm"))]

use rand::rngs::SmallRng;
use rand::SeedableRng;
use snake_core::{Error, Game, GameConfig, HighScoreStore, HIGH_SCORE_KEY};
use snake_wasm::{init_logging, LocalStorageStore};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn storage() -> web_sys::Storage {
    web_sys::window().unwrap().local_storage().unwrap().unwrap()
}

fn fresh_store() -> LocalStorageStore {
    storage().remove_item(HIGH_SCORE_KEY).unwrap();
    LocalStorageStore::new(&web_sys::window().unwrap())
}

#[wasm_bindgen_test]
fn high_score_round_trip() {
    let mut store = fresh_store();
    assert_eq!(store.load().unwrap(), None);

    store.save(70).unwrap();
    assert_eq!(store.load().unwrap(), Some(70));
    assert_eq!(storage().get_item(HIGH_SCORE_KEY).unwrap().as_deref(), Some("70"));

    // A new page load reads the same value
    let reopened = LocalStorageStore::new(&web_sys::window().unwrap());
    assert_eq!(reopened.load().unwrap(), Some(70));
}

#[wasm_bindgen_test]
fn corrupt_high_score_starts_from_zero() {
    let store = fresh_store();
    storage().set_item(HIGH_SCORE_KEY, "lots").unwrap();

    assert!(matches!(store.load(), Err(Error::InvalidScore(_))));

    init_logging(tracing::Level::WARN);
    let game = Game::new(GameConfig::default(), store, SmallRng::seed_from_u64(1));
    assert_eq!(game.high_score(), 0);
}

#[wasm_bindgen_test]
fn logging_init_is_idempotent() {
    init_logging(tracing::Level::INFO);
    init_logging(tracing::Level::DEBUG);
    tracing::warn!("still logging");
}
