//! Microgame Run core crate.
//!
//! Five quick microgames played back to back against a running clock. A level
//! can be skipped once its skip button appears, at a fixed time penalty; the
//! run ends with a results board. The state machine lives in [`container`] and
//! [`session`] and is plain Rust, so it runs and tests natively. The [`dom`]
//! module is the thin browser shell exposed through `start_game()`.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod container;
pub mod dom;
pub mod error;
pub mod logging;
pub mod microgame;
pub mod schedule;
pub mod session;
pub mod views;

pub use config::{GameConfig, LEVEL_COUNT, SKIP_PENALTY_MS, SKIP_REVEAL_DELAY_MS};
pub use container::{GameContainer, Snapshot};
pub use error::GameError;
pub use microgame::{Attempt, Completion, Direction, Input, MicrogameKind, MicrogameUnit};
pub use session::{Action, GameSession, LevelOutcome, Phase, Transition};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init();
}

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    // Fresh entropy every page load; use `start_game_seeded` for a fixed puzzle set.
    dom::mount(GameConfig::default())
}
