//! Heads-up display text and bars derived from the session state.

use alienu_core::GameOutcome;
use alienu_system_waves::{WavePhase, WaveState};
use alienu_world::{query, World};

/// Destination for HUD updates.
pub(crate) trait HudSink {
    /// Headline naming the wave, or the victory banner.
    fn wave_text(&mut self, text: &str);
    /// Count of enemies still alive.
    fn remaining_text(&mut self, text: &str);
    /// End-of-game message; `None` hides it.
    fn status_text(&mut self, text: Option<&str>);
    /// Health bar fill in `0.0..=1.0`.
    fn health_ratio(&mut self, ratio: f32);
    /// Boost bar fill in `0.0..=1.0`.
    fn boost_ratio(&mut self, ratio: f32);
}

/// Everything the HUD shows for one frame.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct HudFrame {
    pub(crate) wave: String,
    pub(crate) remaining: String,
    pub(crate) status: Option<&'static str>,
    pub(crate) health_ratio: f32,
    pub(crate) boost_ratio: f32,
}

impl HudFrame {
    pub(crate) fn capture(world: &World, waves: &WaveState) -> Self {
        let ship = query::ship(world);
        Self {
            wave: wave_label(waves),
            remaining: remaining_label(waves.live_enemy_count()),
            status: status_label(query::outcome(world)),
            health_ratio: ship.health_ratio(),
            boost_ratio: ship.boost_ratio(),
        }
    }

    pub(crate) fn present<S>(&self, sink: &mut S)
    where
        S: HudSink + ?Sized,
    {
        sink.wave_text(&self.wave);
        sink.remaining_text(&self.remaining);
        sink.status_text(self.status);
        sink.health_ratio(self.health_ratio);
        sink.boost_ratio(self.boost_ratio);
    }
}

pub(crate) fn wave_label(state: &WaveState) -> String {
    if state.phase() == WavePhase::Victory {
        "YOU WIN! YOU DEFEATED ALL ALIENS!".to_owned()
    } else {
        format!("WAVE {}", state.current_wave())
    }
}

pub(crate) fn remaining_label(live: u32) -> String {
    format!("{live} Alien(s) Remaining")
}

pub(crate) fn status_label(outcome: Option<GameOutcome>) -> Option<&'static str> {
    match outcome? {
        GameOutcome::Defeat => Some("You Lose! Press R to Restart!"),
        GameOutcome::Victory => Some("You Win! Press R to Restart!"),
    }
}

/// Sink that logs text whenever it changes.
#[derive(Debug, Default)]
pub(crate) struct LogHud {
    wave: String,
    remaining: String,
    status: Option<String>,
    health_percent: Option<u32>,
    boost_percent: Option<u32>,
}

impl LogHud {
    fn update_percent(slot: &mut Option<u32>, ratio: f32) -> Option<u32> {
        let percent = (ratio.clamp(0.0, 1.0) * 100.0).round() as u32;
        if *slot == Some(percent) {
            return None;
        }
        *slot = Some(percent);
        Some(percent)
    }

    pub(crate) fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

impl HudSink for LogHud {
    fn wave_text(&mut self, text: &str) {
        if self.wave != text {
            text.clone_into(&mut self.wave);
            log::info!("{text}");
        }
    }

    fn remaining_text(&mut self, text: &str) {
        if self.remaining != text {
            text.clone_into(&mut self.remaining);
            log::debug!("{text}");
        }
    }

    fn status_text(&mut self, text: Option<&str>) {
        if self.status.as_deref() == text {
            return;
        }
        self.status = text.map(str::to_owned);
        if let Some(text) = text {
            log::info!("{text}");
        }
    }

    fn health_ratio(&mut self, ratio: f32) {
        if let Some(percent) = Self::update_percent(&mut self.health_percent, ratio) {
            log::debug!("health {percent}%");
        }
    }

    fn boost_ratio(&mut self, ratio: f32) {
        if let Some(percent) = Self::update_percent(&mut self.boost_percent, ratio) {
            log::trace!("boost {percent}%");
        }
    }
}
