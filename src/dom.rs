//! Browser shell. Mounts a small set of overlay elements, forwards keyboard and
//! click input to the container, and drives `tick` from `requestAnimationFrame`.
//! All drawing is plain text/HTML; the game logic never touches the DOM.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, KeyboardEvent, window};

use crate::config::GameConfig;
use crate::container::{GameContainer, Snapshot};
use crate::error::GameError;
use crate::microgame::{Attempt, Direction, Feedback, Input, MicrogameKind};
use crate::session::Phase;
use crate::views::{SkipControl, SkipRequest};

const ROOT_ID: &str = "mg-root";

thread_local! {
    static GAME: RefCell<Option<GameContainer>> = const { RefCell::new(None) };
    static LISTENERS: RefCell<Option<Listeners>> = const { RefCell::new(None) };
    static LOOP_RUNNING: Cell<bool> = const { Cell::new(false) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Document-level handlers, kept so `stop_game` can detach them.
struct Listeners {
    on_key: Closure<dyn FnMut(KeyboardEvent)>,
    on_click: Closure<dyn FnMut(Event)>,
}

pub(crate) fn performance_now() -> u64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0) as u64
}

fn to_js(err: GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn with_game<T>(f: impl FnOnce(&mut GameContainer, u64) -> T) -> Result<T, JsValue> {
    let now = performance_now();
    let out = GAME.with(|cell| cell.borrow_mut().as_mut().map(|game| f(game, now)));
    out.ok_or_else(|| JsValue::from_str("game not mounted"))
}

fn attempt_name(attempt: Attempt) -> &'static str {
    match attempt {
        Attempt::Progress => "progress",
        Attempt::Solved => "solved",
        Attempt::Incorrect => "incorrect",
        Attempt::Ignored => "ignored",
    }
}

// --- Entry points ------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game_seeded(seed: u64) -> Result<(), JsValue> {
    mount(GameConfig::seeded(seed))
}

pub(crate) fn mount(config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if doc.get_element_by_id(ROOT_ID).is_none() {
        build_overlay(&doc)?;
    }
    if LISTENERS.with(|l| l.borrow().is_none()) {
        install_listeners(&doc)?;
    }

    if let Some(mut previous) = GAME.with(|cell| cell.replace(Some(GameContainer::new(config)))) {
        previous.teardown();
    }
    log::info!("game mounted");
    render_now();
    if !LOOP_RUNNING.with(Cell::get) {
        start_frame_loop();
    }
    Ok(())
}

#[wasm_bindgen]
pub fn begin_run() -> Result<(), JsValue> {
    let result = with_game(|g, now| g.start(now))?;
    render_now();
    result.map(|_| ()).map_err(to_js)
}

#[wasm_bindgen]
pub fn skip_level() -> Result<(), JsValue> {
    let result = with_game(|g, now| match SkipControl::new(g.skip_props()).press() {
        Some(SkipRequest) => g.skip(now).map(|_| ()),
        None => Err(GameError::SkipUnavailable {
            level: g.session().current_level(),
        }),
    })?;
    render_now();
    result.map(|_| ()).map_err(to_js)
}

#[wasm_bindgen]
pub fn restart_game() -> Result<(), JsValue> {
    let result = with_game(|g, now| g.restart(now))?;
    render_now();
    result.map(|_| ()).map_err(to_js)
}

fn send(input: Input) -> Result<String, JsValue> {
    let result = with_game(|g, now| g.send_input(input, now))?;
    render_now();
    result.map(|a| attempt_name(a).to_string()).map_err(to_js)
}

#[wasm_bindgen]
pub fn send_choice(index: usize) -> Result<String, JsValue> {
    send(Input::Choice(index))
}

#[wasm_bindgen]
pub fn send_direction(name: &str) -> Result<String, JsValue> {
    let dir = Direction::from_name(name)
        .ok_or_else(|| JsValue::from_str(&format!("unknown direction '{name}'")))?;
    send(Input::Direction(dir))
}

#[wasm_bindgen]
pub fn send_tap() -> Result<String, JsValue> {
    send(Input::Tap)
}

/// Unmounts: cancels pending timers, drops the game, detaches input handlers
/// and removes the overlay.
#[wasm_bindgen]
pub fn stop_game() {
    GAME.with(|cell| {
        if let Some(mut game) = cell.borrow_mut().take() {
            game.teardown();
        }
    });
    let doc = window().and_then(|w| w.document());
    if let Some(listeners) = LISTENERS.with(|l| l.borrow_mut().take()) {
        if let Some(doc) = &doc {
            remove_listeners(doc, &listeners);
        }
    }
    if let Some(root) = doc.and_then(|d| d.get_element_by_id(ROOT_ID)) {
        root.remove();
    }
}

#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn game_snapshot() -> Result<String, JsValue> {
    let snap = with_game(|g, now| g.snapshot(now))?;
    serde_json::to_string(&snap).map_err(|e| JsValue::from_str(&e.to_string()))
}

// --- Overlay -----------------------------------------------------------------

fn build_overlay(doc: &Document) -> Result<(), JsValue> {
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    let root = doc.create_element("div")?;
    root.set_id(ROOT_ID);
    root.set_attribute("style", "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); min-width:420px; padding:24px; border-radius:18px; background:#181818; color:#eee; font-family:'Fira Code', monospace; text-align:center; box-shadow:0 0 32px 0 rgba(0,0,0,0.18); z-index:20;")?;
    for (id, tag) in [
        ("mg-clock", "div"),
        ("mg-progress", "div"),
        ("mg-title", "h2"),
        ("mg-instruction", "div"),
        ("mg-cue", "div"),
        ("mg-choices", "div"),
        ("mg-feedback", "div"),
        ("mg-skip", "button"),
        ("mg-results", "pre"),
        ("mg-start", "button"),
    ] {
        let el = doc.create_element(tag)?;
        el.set_id(id);
        root.append_child(&el)?;
    }
    if let Some(skip) = root.query_selector("#mg-skip")? {
        skip.set_attribute("data-action", "skip")?;
    }
    if let Some(cue) = root.query_selector("#mg-cue")? {
        cue.set_attribute("style", "font-size:40px; margin:12px 0;")?;
    }
    body.append_child(&root)?;
    Ok(())
}

fn set_text(doc: &Document, id: &str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        if el.text_content().as_deref() != Some(text) {
            el.set_text_content(Some(text));
        }
    }
}

fn set_hidden(el: &Element, hidden: bool) {
    let _ = if hidden {
        el.set_attribute("hidden", "")
    } else {
        el.remove_attribute("hidden")
    };
}

fn choices_html(snap: &Snapshot) -> String {
    let Some(prompt) = &snap.prompt else {
        return String::new();
    };
    prompt
        .choices
        .iter()
        .enumerate()
        .map(|(i, label)| {
            if label.starts_with('#') {
                format!("<button data-choice='{i}' style='width:56px;height:56px;margin:4px;border-radius:8px;background:{label};'></button>")
            } else {
                format!("<button data-choice='{i}' style='min-width:48px;height:48px;margin:4px;font-size:24px;'>{label}</button>")
            }
        })
        .collect()
}

fn render(doc: &Document, snap: &Snapshot) {
    set_text(doc, "mg-clock", &snap.clock);
    set_text(doc, "mg-progress", &snap.progress_row);
    let title = snap
        .microgame
        .map(|m| format!("Level {}: {}", m.level, m.kind.title()))
        .unwrap_or_default();
    set_text(doc, "mg-title", &title);
    let (instruction, cue) = snap
        .prompt
        .as_ref()
        .map(|p| (p.instruction.clone(), p.cue.clone().unwrap_or_default()))
        .unwrap_or_default();
    set_text(doc, "mg-instruction", &instruction);
    set_text(doc, "mg-cue", &cue);
    if let Some(el) = doc.get_element_by_id("mg-choices") {
        // Compare against what we wrote last; the browser normalizes inner_html.
        let html = choices_html(snap);
        if el.get_attribute("data-rendered").as_deref() != Some(html.as_str()) {
            el.set_inner_html(&html);
            let _ = el.set_attribute("data-rendered", &html);
        }
    }
    let feedback = match snap.feedback {
        Some(Feedback::Correct) => "Nice!",
        Some(Feedback::Incorrect) => "Nope, try again",
        None => "",
    };
    set_text(doc, "mg-feedback", feedback);
    if let Some(skip) = doc.get_element_by_id("mg-skip") {
        set_hidden(&skip, snap.skip_label.is_none());
        set_text(doc, "mg-skip", snap.skip_label.as_deref().unwrap_or(""));
    }
    if let Some(results) = doc.get_element_by_id("mg-results") {
        set_hidden(&results, snap.results.is_none());
        let text = snap
            .results
            .as_ref()
            .map(|r| r.to_string())
            .unwrap_or_default();
        set_text(doc, "mg-results", &text);
    }
    if let Some(start) = doc.get_element_by_id("mg-start") {
        let (action, label) = match snap.phase {
            Phase::Idle => ("start", "Start"),
            Phase::Playing => ("restart", "Give up"),
            Phase::Completed => ("restart", "Play again"),
        };
        let _ = start.set_attribute("data-action", action);
        set_text(doc, "mg-start", label);
    }
}

fn render_now() {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    let now = performance_now();
    let snap = GAME.with(|cell| cell.borrow().as_ref().map(|g| g.snapshot(now)));
    if let Some(snap) = snap {
        render(&doc, &snap);
    }
}

// --- Input -------------------------------------------------------------------

fn log_refusal<T>(result: Result<T, JsValue>) {
    if let Err(err) = result {
        log::debug!("input refused: {:?}", err.as_string());
    }
}

fn on_action(action: &str) {
    let phase = GAME.with(|cell| cell.borrow().as_ref().map(|g| g.session().phase()));
    match (action, phase) {
        ("skip", _) => log_refusal(skip_level()),
        ("start", Some(Phase::Idle)) => log_refusal(begin_run()),
        ("restart", _) => log_refusal(restart_game()),
        _ => {}
    }
}

fn on_choice(index: usize) {
    // The tap game has a single big button; any click on it counts as a tap.
    let tapping = GAME.with(|cell| {
        cell.borrow()
            .as_ref()
            .and_then(|g| g.microgame_props())
            .is_some_and(|m| m.kind == MicrogameKind::RapidTap)
    });
    if tapping {
        log_refusal(send_tap());
    } else {
        log_refusal(send_choice(index));
    }
}

fn install_listeners(doc: &Document) -> Result<(), JsValue> {
    let on_key = Closure::wrap(Box::new(move |ev: KeyboardEvent| {
        let key = ev.key();
        if let Some(dir) = Direction::from_name(&key) {
            ev.prevent_default();
            log_refusal(send(Input::Direction(dir)));
            return;
        }
        match key.as_str() {
            " " => {
                ev.prevent_default();
                log_refusal(send_tap());
            }
            "s" | "S" => on_action("skip"),
            "r" | "R" => on_action("restart"),
            "Enter" => on_action("start"),
            k => {
                if let Some(d) = k.chars().next().and_then(|c| c.to_digit(10)).filter(|d| *d > 0) {
                    on_choice(d as usize - 1);
                }
            }
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);
    doc.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;

    let on_click = Closure::wrap(Box::new(move |ev: Event| {
        let Some(target) = ev.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        if let Ok(Some(el)) = target.closest("[data-choice]") {
            if let Some(idx) = el
                .get_attribute("data-choice")
                .and_then(|v| v.parse::<usize>().ok())
            {
                on_choice(idx);
            }
        } else if let Ok(Some(el)) = target.closest("[data-action]") {
            if let Some(action) = el.get_attribute("data-action") {
                on_action(&action);
            }
        }
    }) as Box<dyn FnMut(Event)>);
    doc.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
    LISTENERS.with(|l| *l.borrow_mut() = Some(Listeners { on_key, on_click }));
    Ok(())
}

fn remove_listeners(doc: &Document, listeners: &Listeners) {
    let removed = doc
        .remove_event_listener_with_callback("keydown", listeners.on_key.as_ref().unchecked_ref())
        .and_then(|_| {
            doc.remove_event_listener_with_callback(
                "click",
                listeners.on_click.as_ref().unchecked_ref(),
            )
        });
    if let Err(err) = removed {
        log::warn!("could not detach listeners: {:?}", err.as_string());
    }
}

// --- Frame loop ----------------------------------------------------------------

fn start_frame_loop() {
    LOOP_RUNNING.with(|r| r.set(true));
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        let now = performance_now();
        let mounted = GAME.with(|cell| match cell.borrow_mut().as_mut() {
            Some(game) => {
                game.tick(now);
                true
            }
            None => false,
        });
        if !mounted {
            // No next frame once the game is gone; dropping the callback breaks the Rc cycle.
            LOOP_RUNNING.with(|r| r.set(false));
            let _ = f.borrow_mut().take();
            return;
        }
        render_now();
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
