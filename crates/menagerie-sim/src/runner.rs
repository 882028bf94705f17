//! Tick loop: runs a scenario for the configured number of ticks and gathers
//! the run report.

use std::time::Instant;

use menagerie_gameplay::{
    AnimationCue, CueRecorder, EntityResult, FixedAttributes, Services, SoundRecorder,
};
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::report::{EventTally, RunReport, Survivors, TickTotals};
use crate::scenario::{self, Scenario};
use crate::timing::FixedStep;

/// Bus capacity for the runner's subscription. Drained every tick.
const EVENT_CAPACITY: usize = 4096;

/// Ticks between progress lines.
const PROGRESS_INTERVAL: u64 = 300;

/// Builds the scenario described by `config`, runs it and reports.
pub fn run(config: &SimConfig) -> EntityResult<RunReport> {
    let cues = CueRecorder::new();
    let sounds = SoundRecorder::new();
    let services = Services::new()
        .with_animation(cues.clone())
        .with_audio(sounds.clone())
        .with_attributes(FixedAttributes::new(1.0));

    let mut scenario = scenario::build(config, services)?;
    let subscription = scenario.world.subscribe(EVENT_CAPACITY);

    let mut timing = FixedStep::new(config.tick_rate);
    let dt = timing.step_dt();
    let total = u64::from(config.ticks);
    let mut tally = EventTally::default();
    let mut totals = TickTotals::default();
    let mut done = 0_u64;

    timing.reset();
    while done < total {
        let due = if config.realtime {
            let elapsed = timing.delta_time();
            u64::from(timing.accumulate(elapsed))
        } else {
            1
        };

        for _ in 0..due.min(total - done) {
            let started = Instant::now();
            let report = scenario.world.tick(dt);
            timing.record_step(started.elapsed());

            totals.add(&report);
            tally.extend(&subscription.drain());
            done += 1;

            if done % PROGRESS_INTERVAL == 0 {
                debug!(
                    tick = done,
                    hostiles = scenario.survivors(&scenario.hostiles),
                    allies = scenario.survivors(&scenario.allies),
                    "progress"
                );
            }
        }

        if config.realtime {
            timing.sleep_remainder();
        }
    }

    let survivors = survivors(&scenario);
    let player_health = scenario
        .world
        .entity(scenario.player)
        .map_or(0.0, |player| player.vitals().health_fraction());
    info!(
        ticks = done,
        deaths = tally.deaths,
        attacks = tally.attacks,
        delivered = tally.loot_delivered,
        hostiles_left = survivors.hostiles,
        "run finished"
    );

    Ok(RunReport {
        app_version: env!("CARGO_PKG_VERSION").to_owned(),
        seed: config.seed,
        ticks: done,
        sim_seconds: scenario.world.now(),
        average_tick_ms: timing.average_step_ms(),
        events: tally,
        totals,
        survivors,
        player_health,
        sounds_played: sounds.sounds().len(),
        attack_animations: cues
            .cues()
            .iter()
            .filter(|cue| matches!(cue, AnimationCue::Attack(_)))
            .count(),
    })
}

fn survivors(scenario: &Scenario) -> Survivors {
    Survivors {
        player: scenario.survivors(&[scenario.player]) == 1,
        allies: scenario.survivors(&scenario.allies),
        hostiles: scenario.survivors(&scenario.hostiles),
        loot: scenario.world.loot().len(),
    }
}
