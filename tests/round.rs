use corridor_crawler::{Cell, ColorToken, CrawlerConfig, EffectSink, NoEffects, RoundController};

const FRAME: f32 = 1.0 / 60.0;

#[derive(Default)]
struct Ripples(Vec<(Cell, ColorToken)>);

impl EffectSink for Ripples {
    fn particle_burst(&mut self, _cell: Cell, _color: ColorToken, _count: u32) {}

    fn ripple(&mut self, cell: Cell, color: ColorToken) {
        self.0.push((cell, color));
    }
}

/// Presses toward the next corridor cell whenever the player idles.
fn steer<S: EffectSink>(round: &mut RoundController<S>) {
    let player = round.player();
    if player.sliding {
        return;
    }
    let corridor = &round.world().corridor;
    let Some(index) = corridor.position(player.cell) else {
        return;
    };
    let next = corridor.get(index + 1);
    if let Some(dir) = next.and_then(|next| player.cell.dir_to(next)) {
        let _ = round.press(dir);
    }
}

#[test]
fn autopilot_clears_the_first_floor() {
    let mut round =
        RoundController::new(CrawlerConfig::default(), NoEffects).expect("valid config");
    let coins = round.world().pickups.len() as u32;
    assert!(coins > 0);

    let mut ticks = 0;
    while round.floor() == 1 && ticks < 20_000 {
        steer(&mut round);
        round.tick(FRAME);
        ticks += 1;
    }

    assert_eq!(round.floor(), 2);
    let score = round.score();
    assert!(score.score >= coins * 10, "score {}", score.score);
    assert_eq!(score.combo, 1);
    assert_eq!(score.high_score, score.score);
    assert!(round.chaser().active);
    assert_eq!(round.player().cell, round.world().corridor.start());
}

#[test]
fn player_never_leaves_the_corridor() {
    let mut round = RoundController::new(CrawlerConfig::default().with_seed(77), NoEffects)
        .expect("valid config");
    for _ in 0..3_000 {
        steer(&mut round);
        round.tick(FRAME);

        let snapshot = round.snapshot();
        let player = snapshot.player;
        assert!(snapshot.grid.is_walkable(player.cell));
        if player.sliding {
            assert!(snapshot.grid.is_walkable(player.to));
            assert!(player.from.is_adjacent(player.to));
        }
        assert!(snapshot.grid.is_walkable(snapshot.chaser.cell));
    }
}

#[test]
fn delayed_chaser_catches_an_idle_player_once_protection_ends() {
    let mut config = CrawlerConfig::default();
    config.chaser.first_floor_spawn_delay = Some(0.1);
    let mut round = RoundController::new(config, Ripples::default()).expect("valid config");

    let mut ticks = 0;
    while !round.chaser().active && ticks < 100 {
        round.tick(FRAME);
        ticks += 1;
    }
    assert!(round.chaser().active);
    assert!(round.protection().on);

    while round.protection().on && ticks < 1_000 {
        round.tick(FRAME);
        ticks += 1;
    }
    assert!(!round.protection().on);

    let start = round.world().corridor.start();
    let near = round.world().corridor.get(2).expect("corridor is long enough");
    assert!(round.reset_player_to(start));
    assert!(round.place_chaser(near));

    for _ in 0..120 {
        round.tick(FRAME);
    }
    assert!(round
        .sink()
        .0
        .iter()
        .any(|&(cell, color)| cell == start && color == ColorToken::Catch));
    assert_eq!(round.chaser().cell, start);
}

#[test]
fn debug_helpers_ignore_walls() {
    let mut round =
        RoundController::new(CrawlerConfig::default(), NoEffects).expect("valid config");
    let before = round.player().cell;
    assert!(!round.reset_player_to(Cell::new(0, 0)));
    assert!(!round.place_chaser(Cell::new(0, 0)));
    assert_eq!(round.player().cell, before);
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = CrawlerConfig::default();
    config.slide_duration = 0.0;
    assert!(RoundController::new(config, NoEffects).is_err());
}
