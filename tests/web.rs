// Browser tests for the DOM shell (`wasm-pack test --headless --firefox`).
#![cfg(target_arch = "wasm32")]

use microgame_run::microgame::Input;
use microgame_run::{GameConfig, GameContainer, dom};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, HtmlElement, KeyboardEvent, KeyboardEventInit};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn mount_start_and_unmount() {
    dom::start_game_seeded(5).unwrap();
    let doc = web_sys::window().unwrap().document().unwrap();
    assert!(doc.get_element_by_id("mg-root").is_some());

    dom::begin_run().unwrap();
    assert!(dom::begin_run().is_err());
    assert!(dom::skip_level().is_err());
    let title = doc.get_element_by_id("mg-title").unwrap().text_content();
    assert_eq!(title.as_deref(), Some("Level 1: Color Match"));

    dom::stop_game();
    assert!(doc.get_element_by_id("mg-root").is_none());
    assert!(dom::restart_game().is_err());
}

#[cfg(feature = "serde_json")]
#[wasm_bindgen_test]
fn snapshot_is_json() {
    dom::start_game_seeded(9).unwrap();
    let json = dom::game_snapshot().unwrap();
    assert!(json.contains("\"phase\":\"idle\""));
    dom::stop_game();
}

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn press_key(doc: &Document, key: &str) {
    let init = KeyboardEventInit::new();
    init.set_key(key);
    let ev = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    doc.dispatch_event(&ev).unwrap();
}

/// A swatch index on level 1 that is not the answer for this seed.
fn wrong_swatch(seed: u64) -> usize {
    let mut game = GameContainer::new(GameConfig::seeded(seed));
    game.start(0).unwrap();
    match game.active_microgame().unwrap().puzzle().solution().as_slice() {
        [Input::Choice(target)] => (target + 1) % 4,
        other => panic!("unexpected color match solution {other:?}"),
    }
}

#[cfg(feature = "serde_json")]
fn misses() -> u64 {
    let json = dom::game_snapshot().unwrap();
    let tail = json.split("\"misses\":").nth(1).unwrap();
    tail.split(|c: char| !c.is_ascii_digit()).next().unwrap().parse().unwrap()
}

#[cfg(feature = "serde_json")]
#[wasm_bindgen_test]
fn remount_handles_each_input_once() {
    let seed = 21;
    let wrong = wrong_swatch(seed);
    dom::start_game_seeded(seed).unwrap();
    dom::stop_game();
    dom::start_game_seeded(seed).unwrap();
    dom::begin_run().unwrap();

    let doc = document();
    press_key(&doc, &(wrong + 1).to_string());
    assert_eq!(misses(), 1);

    let button: HtmlElement = doc
        .query_selector(&format!("#mg-choices [data-choice='{wrong}']"))
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    button.click();
    assert_eq!(misses(), 2);

    dom::stop_game();
    press_key(&doc, &(wrong + 1).to_string());
    assert!(dom::game_snapshot().is_err());
}
