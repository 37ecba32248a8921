//! Demo choreography.
//!
//! Cycles through a list of moods at a fixed period and occasionally triggers
//! the confused and laugh animations at random.

use crate::config::BehaviourConfig;
use crate::eyes::{EyeAnimator, RandomSource};

/// Drives mood changes and random one-shots on top of the animator
#[derive(Debug, Clone)]
pub struct Behaviour {
    config: BehaviourConfig,
    next_mood_ms: Option<u64>,
}

impl Behaviour {
    pub fn new(config: BehaviourConfig) -> Self {
        Self {
            config,
            next_mood_ms: None,
        }
    }

    /// Behaviour that never touches the animator
    #[cfg(test)]
    pub fn disabled() -> Self {
        Self::new(BehaviourConfig {
            mood_cycle_secs: 0,
            moods: Vec::new(),
            confused_chance: 0.0,
            laugh_chance: 0.0,
        })
    }

    /// Run once per rendered frame
    pub fn update<R: RandomSource>(&mut self, eyes: &mut EyeAnimator<R>, now_ms: u64) {
        self.cycle_mood(eyes, now_ms);

        if self.config.confused_chance > 0.0
            && !eyes.is_confused()
            && eyes.rng_mut().chance(self.config.confused_chance)
        {
            tracing::debug!("Random confused");
            eyes.trigger_confused();
        }

        if self.config.laugh_chance > 0.0
            && !eyes.is_laughing()
            && eyes.rng_mut().chance(self.config.laugh_chance)
        {
            tracing::debug!("Random laugh");
            eyes.trigger_laugh();
        }
    }

    fn cycle_mood<R: RandomSource>(&mut self, eyes: &mut EyeAnimator<R>, now_ms: u64) {
        if self.config.mood_cycle_secs == 0 || self.config.moods.is_empty() {
            return;
        }

        let period = u64::from(self.config.mood_cycle_secs) * 1000;
        let due = *self.next_mood_ms.get_or_insert(now_ms + period);
        if now_ms < due {
            return;
        }

        // Continue from the current mood so manual changes are respected
        let moods = &self.config.moods;
        let next = moods
            .iter()
            .position(|m| *m == eyes.mood())
            .map(|i| (i + 1) % moods.len())
            .unwrap_or(0);

        tracing::debug!("Mood cycle: {} -> {}", eyes.mood(), moods[next]);
        eyes.set_mood(moods[next]);
        self.next_mood_ms = Some(now_ms + period);
    }
}
