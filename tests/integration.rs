// Integration tests (native) for the `microgame-run` crate.
// These drive the container end to end with explicit clock values and a fixed
// seed, so they run under plain `cargo test` without a browser.

use microgame_run::{
    Completion, GameConfig, GameContainer, GameError, LEVEL_COUNT, LevelOutcome, Phase,
    SKIP_PENALTY_MS, SKIP_REVEAL_DELAY_MS, Transition,
};

fn container() -> GameContainer {
    GameContainer::new(GameConfig::seeded(2024))
}

/// Plays the active microgame's winning script at `now` (or once it accepts
/// input) and lets the completion signal land. Returns the delivery time.
fn solve(c: &mut GameContainer, now: u64) -> u64 {
    let (at, script) = {
        let unit = c.active_microgame().expect("a microgame should be active");
        (now.max(unit.puzzle().ready_at_ms()), unit.puzzle().solution())
    };
    for input in script {
        c.send_input(input, at).unwrap();
    }
    let delivered = at + c.config().completion_delay_ms;
    c.tick(delivered);
    delivered
}

/// Waits out the skip reveal from `now` and skips. Returns the skip time.
fn skip(c: &mut GameContainer, now: u64) -> u64 {
    let at = now + SKIP_REVEAL_DELAY_MS;
    c.tick(at);
    assert!(c.skip_props().visible);
    c.skip(at).unwrap();
    at
}

#[test]
fn honest_run_never_adds_penalty() {
    let mut c = container();
    c.start(0).unwrap();
    let mut now = 0;
    for level in 1..=LEVEL_COUNT {
        assert_eq!(c.session().current_level(), level);
        now = solve(&mut c, now + 250);
        assert_eq!(c.session().penalty_ms(), 0);
    }
    assert_eq!(c.session().phase(), Phase::Completed);
    for outcome in c.session().outcomes() {
        assert!(outcome.completed && !outcome.skipped);
    }
    assert_eq!(c.session().final_elapsed_ms(), Some(now));
}

#[test]
fn skipping_any_level_costs_exactly_one_penalty() {
    for skipped_level in 1..=LEVEL_COUNT {
        let mut c = container();
        c.start(0).unwrap();
        let mut now = 0;
        for level in 1..=LEVEL_COUNT {
            let before = c.session().penalty_ms();
            if level == skipped_level {
                now = skip(&mut c, now);
                assert_eq!(c.session().penalty_ms(), before + SKIP_PENALTY_MS);
            } else {
                now = solve(&mut c, now);
                assert_eq!(c.session().penalty_ms(), before);
            }
            if c.session().phase() == Phase::Playing {
                assert_eq!(c.session().current_level(), level + 1);
                assert!(c.session().current_level() <= LEVEL_COUNT);
            }
        }
        let outcome = c.session().outcomes()[skipped_level - 1];
        assert!(!outcome.completed && outcome.skipped, "level {skipped_level}");
        assert_eq!(c.session().penalty_ms(), SKIP_PENALTY_MS);
    }
}

#[test]
fn documented_scenario_complete_skip_complete() {
    let mut c = container();
    c.start(0).unwrap();

    // Level 1 lands at t=2000.
    let pause = c.config().completion_delay_ms;
    let t1 = solve(&mut c, 2_000 - pause);
    assert_eq!(t1, 2_000);
    assert_eq!(c.session().outcomes()[0], LevelOutcome::completed(2_000));

    // Level 2 skipped as soon as its button appears.
    let t2 = skip(&mut c, t1);
    assert_eq!(c.session().outcomes()[1], LevelOutcome::skipped(t2));

    let t3 = solve(&mut c, t2);
    let t4 = solve(&mut c, t3);
    let finish = solve(&mut c, t4);

    let kinds: Vec<_> = c
        .session()
        .outcomes()
        .iter()
        .map(|o| (o.completed, o.skipped))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (true, false),
            (false, true),
            (true, false),
            (true, false),
            (true, false)
        ]
    );
    assert_eq!(c.session().phase(), Phase::Completed);
    assert_eq!(c.session().final_elapsed_ms(), Some(finish + SKIP_PENALTY_MS));
    assert!(c.session().final_elapsed_ms().unwrap() >= c.session().penalty_ms());
    assert_eq!(c.pending_timers(), 0);
    assert!(c.active_microgame().is_none());
}

#[test]
fn skip_button_follows_the_level() {
    let mut c = container();
    c.start(0).unwrap();
    assert!(!c.skip_props().visible);
    c.tick(SKIP_REVEAL_DELAY_MS - 1);
    assert!(!c.skip_props().visible);
    c.tick(SKIP_REVEAL_DELAY_MS);
    assert!(c.skip_props().visible);

    let advanced = solve(&mut c, SKIP_REVEAL_DELAY_MS + 10);
    assert!(!c.skip_props().visible);
    // The old level's reveal is gone; the new one waits its own full delay.
    c.tick(advanced + SKIP_REVEAL_DELAY_MS - 1);
    assert!(!c.skip_props().visible);
    c.tick(advanced + SKIP_REVEAL_DELAY_MS);
    assert!(c.skip_props().visible);
}

#[test]
fn early_and_double_skips_are_refused() {
    let mut c = container();
    c.start(0).unwrap();
    assert_eq!(
        c.skip(100).unwrap_err(),
        GameError::SkipUnavailable { level: 1 }
    );
    let at = skip(&mut c, 0);
    assert_eq!(
        c.skip(at).unwrap_err(),
        GameError::SkipUnavailable { level: 2 }
    );
    assert_eq!(c.session().penalty_ms(), SKIP_PENALTY_MS);
    assert_eq!(c.session().current_level(), 2);
}

#[test]
fn repeated_completion_does_not_double_advance() {
    let mut c = container();
    c.start(0).unwrap();
    let at = solve(&mut c, 100);
    assert_eq!(c.session().current_level(), 2);
    let rev = c.session().revision();
    assert_eq!(
        c.complete_level(Completion { level: 1 }, at + 1).unwrap_err(),
        GameError::StaleCompletion { level: 1, current: 2 }
    );
    assert_eq!(c.session().current_level(), 2);
    assert_eq!(c.session().revision(), rev);
}

#[test]
fn restart_after_completion_clears_everything() {
    let mut c = container();
    c.start(0).unwrap();
    let mut now = skip(&mut c, 0);
    for _ in 2..=LEVEL_COUNT {
        now = solve(&mut c, now);
    }
    assert_eq!(c.session().phase(), Phase::Completed);
    assert!(c.results_props().is_some());

    assert_eq!(c.restart(now + 1).unwrap(), Transition::Reset);
    assert_eq!(c.session().phase(), Phase::Idle);
    assert_eq!(c.session().penalty_ms(), 0);
    assert_eq!(c.session().final_elapsed_ms(), None);
    assert!(
        c.session()
            .outcomes()
            .iter()
            .all(|o| *o == LevelOutcome::default())
    );
    assert!(c.results_props().is_none());
    assert_eq!(c.pending_timers(), 0);
}

#[test]
fn restart_mid_run_cancels_pending_timers() {
    let mut c = container();
    c.start(0).unwrap();
    let (at, script) = {
        let unit = c.active_microgame().unwrap();
        (100, unit.puzzle().solution())
    };
    for input in script {
        c.send_input(input, at).unwrap();
    }
    c.restart(200).unwrap();
    assert_eq!(c.pending_timers(), 0);
    assert!(c.tick(60_000).is_empty());
    assert_eq!(c.session().phase(), Phase::Idle);
    assert!(!c.skip_props().visible);
}

#[test]
fn same_seed_same_puzzles() {
    let mut a = container();
    let mut b = container();
    a.start(0).unwrap();
    b.start(0).unwrap();
    assert_eq!(a.snapshot(0).prompt, b.snapshot(0).prompt);
}

#[cfg(feature = "serde_json")]
#[test]
fn snapshot_serializes_to_camel_case_json() {
    let mut c = container();
    c.start(0).unwrap();
    let json = serde_json::to_string(&c.snapshot(0)).unwrap();
    assert!(json.contains("\"phase\":\"playing\""), "{json}");
    assert!(json.contains("\"currentLevel\":1"), "{json}");
}
