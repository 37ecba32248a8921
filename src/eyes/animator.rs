//! Eye animation state machine.
//!
//! Every frame the animator:
//! 1. Tweens eye geometry toward its targets
//! 2. Re-opens eyes that finished closing while open was requested
//! 3. Runs auto-blink, idle gaze and the confused/laugh one-shots
//! 4. Applies flicker, cyclops collapse and mood eyelids
//! 5. Emits draw commands for the frame

use super::random::RandomSource;
use super::shapes::{Color, DrawCommand, Point};
use super::tween::Tween;
use super::{Mood, Position};
use crate::config::EyesConfig;
use rand::rngs::StdRng;

pub const DEFAULT_EYE_SIZE: i32 = 36;
pub const DEFAULT_BORDER_RADIUS: i32 = 8;
pub const DEFAULT_SPACE_BETWEEN: i32 = 10;
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 20;

/// Height of a fully closed eye
pub const CLOSED_HEIGHT: i32 = 1;

/// Extra height of the outer eye while looking to the side
const CURIOUS_BOOST: i32 = 8;
/// Distance from the travel limit that counts as looking to the side
const CURIOUS_MARGIN: i32 = 10;

pub const ONE_SHOT_DURATION_MS: u64 = 500;
pub const CONFUSED_AMPLITUDE: i32 = 20;
pub const LAUGH_AMPLITUDE: i32 = 5;

/// Geometry of one eye
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eye {
    pub width: Tween,
    pub height: Tween,
    pub border_radius: Tween,
    pub x: Tween,
    pub y: Tween,
    pub width_default: i32,
    pub height_default: i32,
    pub border_radius_default: i32,
    /// Open was requested; a closed eye springs back while this is set
    pub is_open: bool,
}

impl Eye {
    /// A closed eye of the given default size
    fn closed(width: i32, height: i32, radius: i32, x: i32, y: i32) -> Self {
        Self {
            width: Tween::settled(width),
            height: Tween {
                current: CLOSED_HEIGHT,
                target: height,
            },
            border_radius: Tween::settled(radius),
            x: Tween::settled(x),
            y: Tween::settled(y),
            width_default: width,
            height_default: height,
            border_radius_default: radius,
            is_open: false,
        }
    }

    /// Tween height and shift y so the eye closes around its vertical centre
    fn step_height(&mut self, boost: i32) {
        self.height.step_biased(boost);
        self.y.current += (self.height_default - self.height.current).div_euclid(2);
        self.y.current -= boost.div_euclid(2);
    }

    fn reopen_if_closed(&mut self, boost: i32) {
        if self.is_open && self.height.current <= CLOSED_HEIGHT + boost {
            self.height.target = self.height_default;
        }
    }

    fn close(&mut self) {
        self.height.target = CLOSED_HEIGHT;
        self.is_open = false;
    }

    fn open(&mut self) {
        self.is_open = true;
        self.height.target = self.height_default;
    }

    fn body(&self) -> DrawCommand {
        DrawCommand::FilledRoundedRect {
            x: self.x.current,
            y: self.y.current,
            width: self.width.current,
            height: self.height.current,
            radius: self.border_radius.current,
            color: Color::Foreground,
        }
    }

    fn top_left(&self) -> Point {
        Point::new(self.x.current, self.y.current)
    }

    fn top_right(&self) -> Point {
        Point::new(self.x.current + self.width.current, self.y.current)
    }
}

/// Continuous jitter along one axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flicker {
    pub active: bool,
    pub alternate: bool,
    pub amplitude: i32,
}

impl Flicker {
    fn set(&mut self, active: bool, amplitude: i32) {
        self.active = active;
        self.amplitude = amplitude;
    }

    /// Offset for this frame, alternating sign between frames
    fn next_offset(&mut self) -> i32 {
        if !self.active {
            return 0;
        }
        let offset = if self.alternate {
            self.amplitude
        } else {
            -self.amplitude
        };
        self.alternate = !self.alternate;
        offset
    }
}

/// Repeating animation rescheduled at a randomised interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Recurring {
    enabled: bool,
    interval_s: u32,
    variation_s: u32,
    due_ms: u64,
}

impl Recurring {
    fn configure<R: RandomSource>(
        &mut self,
        enabled: bool,
        interval_s: u32,
        variation_s: u32,
        now_ms: u64,
        rng: &mut R,
    ) {
        self.enabled = enabled;
        self.interval_s = interval_s;
        self.variation_s = variation_s;
        if enabled {
            self.schedule(now_ms, rng);
        }
    }

    fn schedule<R: RandomSource>(&mut self, now_ms: u64, rng: &mut R) {
        let variation = rng.range_inclusive(0, self.variation_s.min(i32::MAX as u32) as i32);
        self.due_ms = now_ms + u64::from(self.interval_s) * 1000 + variation.max(0) as u64 * 1000;
    }

    fn is_due(&self, now_ms: u64) -> bool {
        self.enabled && now_ms >= self.due_ms
    }
}

/// Fixed-length animation started by a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct OneShot {
    active: bool,
    /// The timer starts on the first frame after the trigger
    pending: bool,
    started_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OneShotStep {
    Idle,
    Started,
    Running,
    Finished,
}

impl OneShot {
    fn trigger(&mut self) {
        self.active = true;
        self.pending = true;
    }

    fn advance(&mut self, now_ms: u64) -> OneShotStep {
        if !self.active {
            OneShotStep::Idle
        } else if self.pending {
            self.started_ms = now_ms;
            self.pending = false;
            OneShotStep::Started
        } else if now_ms >= self.started_ms + ONE_SHOT_DURATION_MS {
            self.active = false;
            OneShotStep::Finished
        } else {
            OneShotStep::Running
        }
    }
}

/// Animation state for a pair of eyes on one screen
pub struct EyeAnimator<R: RandomSource = StdRng> {
    screen_width: i32,
    screen_height: i32,
    left: Eye,
    right: Eye,
    space_between: Tween,
    space_between_default: i32,
    mood: Mood,
    curious: bool,
    cyclops: bool,
    tired_height: Tween,
    angry_height: Tween,
    happy_offset: Tween,
    h_flicker: Flicker,
    v_flicker: Flicker,
    autoblink: Recurring,
    idle: Recurring,
    confused: OneShot,
    laugh: OneShot,
    frame_interval_ms: u64,
    last_frame_ms: Option<u64>,
    clock_ms: u64,
    frames: u64,
    rng: R,
}

impl<R: RandomSource> EyeAnimator<R> {
    /// Create an animator with closed, centred eyes of the default size
    pub fn new(screen_width: u32, screen_height: u32, rng: R) -> Self {
        let screen_width = screen_width as i32;
        let screen_height = screen_height as i32;
        let gap = DEFAULT_SPACE_BETWEEN;
        let size = DEFAULT_EYE_SIZE;

        let left_x = (screen_width - (size + gap + size)) / 2;
        let y = (screen_height - size) / 2;
        let right_x = left_x + size + gap;

        Self {
            screen_width,
            screen_height,
            left: Eye::closed(size, size, DEFAULT_BORDER_RADIUS, left_x, y),
            right: Eye::closed(size, size, DEFAULT_BORDER_RADIUS, right_x, y),
            space_between: Tween::settled(gap),
            space_between_default: gap,
            mood: Mood::Neutral,
            curious: false,
            cyclops: false,
            tired_height: Tween::default(),
            angry_height: Tween::default(),
            happy_offset: Tween::default(),
            h_flicker: Flicker::default(),
            v_flicker: Flicker::default(),
            autoblink: Recurring::default(),
            idle: Recurring::default(),
            confused: OneShot::default(),
            laugh: OneShot::default(),
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
            last_frame_ms: None,
            clock_ms: 0,
            frames: 0,
            rng,
        }
    }

    /// Create an animator and apply a configuration
    ///
    /// Eyes start closed and centred for the configured size, then open.
    pub fn with_config(screen_width: u32, screen_height: u32, config: &EyesConfig, rng: R) -> Self {
        let mut animator = Self::new(screen_width, screen_height, rng);
        animator.apply_config(config);

        // Start centred for the configured geometry instead of tweening in
        let left_x = (animator.screen_width
            - (config.width + config.space_between + config.width))
            / 2;
        let y = (animator.screen_height - config.height) / 2;
        animator.left.width.snap(config.width);
        animator.right.width.snap(config.width);
        animator.left.border_radius.snap(config.border_radius);
        animator.right.border_radius.snap(config.border_radius);
        animator.space_between.snap(config.space_between);
        animator.left.x.current = left_x;
        animator.left.y.current = y;
        animator.right.x.current = left_x + config.width + config.space_between;
        animator.right.y.current = y;
        animator.set_position(config.position);
        animator.open(true, true);
        animator
    }

    /// Apply geometry, mood and standing animations from a configuration
    pub fn apply_config(&mut self, config: &EyesConfig) {
        self.set_eye_size(config.width, config.height, config.width, config.height);
        self.set_border_radius(config.border_radius, config.border_radius);
        self.set_space_between(config.space_between);
        self.set_frame_rate(config.frame_rate);
        self.set_mood(config.mood);
        self.set_curious(config.curious);
        self.set_cyclops(config.cyclops);
        self.set_autoblink(
            config.autoblink.enabled,
            config.autoblink.interval_s,
            config.autoblink.variation_s,
        );
        self.set_idle(
            config.idle.enabled,
            config.idle.interval_s,
            config.idle.variation_s,
        );
        tracing::debug!(
            "Eyes configured: {}x{} r{} gap {} @ {} fps",
            config.width,
            config.height,
            config.border_radius,
            config.space_between,
            config.frame_rate
        );
    }

    // Setters: each writes targets only, geometry follows on later frames

    /// Maximum frames per second
    pub fn set_frame_rate(&mut self, fps: u32) {
        self.frame_interval_ms = 1000 / u64::from(fps.max(1));
    }

    pub fn set_eye_size(&mut self, left_w: i32, left_h: i32, right_w: i32, right_h: i32) {
        self.left.width.target = left_w;
        self.left.width_default = left_w;
        self.left.height.target = left_h;
        self.left.height_default = left_h;
        self.right.width.target = right_w;
        self.right.width_default = right_w;
        self.right.height.target = right_h;
        self.right.height_default = right_h;
    }

    pub fn set_border_radius(&mut self, left: i32, right: i32) {
        self.left.border_radius.target = left;
        self.left.border_radius_default = left;
        self.right.border_radius.target = right;
        self.right.border_radius_default = right;
    }

    /// Gap between the eyes, negative values overlap them
    pub fn set_space_between(&mut self, space: i32) {
        self.space_between.target = space;
        self.space_between_default = space;
    }

    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = mood;
    }

    /// Move the gaze to a preset anchor of the travel range
    pub fn set_position(&mut self, position: Position) {
        let (x_max, y_max) = self.travel_range();
        let (ax, ay) = position.anchor();
        self.left.x.target = anchor_coordinate(ax, x_max);
        self.left.y.target = anchor_coordinate(ay, y_max);
    }

    pub fn set_autoblink(&mut self, enabled: bool, interval_s: u32, variation_s: u32) {
        self.autoblink
            .configure(enabled, interval_s, variation_s, self.clock_ms, &mut self.rng);
    }

    pub fn set_idle(&mut self, enabled: bool, interval_s: u32, variation_s: u32) {
        self.idle
            .configure(enabled, interval_s, variation_s, self.clock_ms, &mut self.rng);
    }

    pub fn set_curious(&mut self, curious: bool) {
        self.curious = curious;
    }

    /// Leaving cyclops mode brings the gap back to its default
    pub fn set_cyclops(&mut self, cyclops: bool) {
        if self.cyclops && !cyclops {
            self.space_between.target = self.space_between_default;
        }
        self.cyclops = cyclops;
    }

    pub fn set_h_flicker(&mut self, enabled: bool, amplitude: i32) {
        self.h_flicker.set(enabled, amplitude);
    }

    pub fn set_v_flicker(&mut self, enabled: bool, amplitude: i32) {
        self.v_flicker.set(enabled, amplitude);
    }

    // Immediate controls

    /// Close the selected eyes; they stay closed until opened
    pub fn close(&mut self, left: bool, right: bool) {
        if left {
            self.left.close();
        }
        if right {
            self.right.close();
        }
    }

    /// Open the selected eyes; opening happens over the next frames
    pub fn open(&mut self, left: bool, right: bool) {
        if left {
            self.left.open();
        }
        if right {
            self.right.open();
        }
    }

    /// Close the selected eyes and let them spring back open
    pub fn blink(&mut self, left: bool, right: bool) {
        self.close(left, right);
        if left {
            self.left.is_open = true;
        }
        if right {
            self.right.is_open = true;
        }
    }

    /// Shake the eyes left and right for half a second
    pub fn trigger_confused(&mut self) {
        self.confused.trigger();
        self.h_flicker.set(true, CONFUSED_AMPLITUDE);
    }

    /// Shake the eyes up and down for half a second
    pub fn trigger_laugh(&mut self) {
        self.laugh.trigger();
        self.v_flicker.set(true, LAUGH_AMPLITUDE);
    }

    // Getters

    pub fn left(&self) -> &Eye {
        &self.left
    }

    pub fn right(&self) -> &Eye {
        &self.right
    }

    pub fn space_between(&self) -> Tween {
        self.space_between
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn is_curious(&self) -> bool {
        self.curious
    }

    pub fn is_cyclops(&self) -> bool {
        self.cyclops
    }

    pub fn is_confused(&self) -> bool {
        self.confused.active
    }

    pub fn is_laughing(&self) -> bool {
        self.laugh.active
    }

    pub fn h_flicker(&self) -> Flicker {
        self.h_flicker
    }

    pub fn v_flicker(&self) -> Flicker {
        self.v_flicker
    }

    pub fn autoblink_enabled(&self) -> bool {
        self.autoblink.enabled
    }

    pub fn idle_enabled(&self) -> bool {
        self.idle.enabled
    }

    /// Current (tired, angry, happy) eyelid magnitudes
    pub fn eyelids(&self) -> (i32, i32, i32) {
        (
            self.tired_height.current,
            self.angry_height.current,
            self.happy_offset.current,
        )
    }

    pub fn frame_interval_ms(&self) -> u64 {
        self.frame_interval_ms
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn screen_size(&self) -> (i32, i32) {
        (self.screen_width, self.screen_height)
    }

    pub(crate) fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Maximum (x, y) of the left eye that keeps both eyes on screen
    pub fn travel_range(&self) -> (i32, i32) {
        let x_max = if self.cyclops {
            self.screen_width - self.left.width.current
        } else {
            self.screen_width
                - self.left.width.current
                - self.space_between.current
                - self.right.width.current
        };
        let y_max = self.screen_height - self.left.height_default;
        (x_max.max(0), y_max.max(0))
    }

    /// Advance one frame if the frame interval has elapsed since the last one
    ///
    /// Returns the frame's draw commands, or `None` when called too early.
    /// An early call leaves the animator untouched.
    pub fn tick(&mut self, now_ms: u64) -> Option<Vec<DrawCommand>> {
        if let Some(last) = self.last_frame_ms {
            if now_ms.saturating_sub(last) < self.frame_interval_ms {
                return None;
            }
        }
        self.clock_ms = now_ms;
        self.last_frame_ms = Some(now_ms);
        self.frames += 1;

        self.advance(now_ms);
        Some(self.draw_commands())
    }

    fn advance(&mut self, now_ms: u64) {
        let (left_boost, right_boost) = self.curious_boosts();

        self.left.step_height(left_boost);
        self.right.step_height(right_boost);
        self.left.reopen_if_closed(left_boost);
        self.right.reopen_if_closed(right_boost);

        self.left.width.step();
        self.right.width.step();
        self.space_between.step();

        self.left.x.step();
        self.left.y.step();

        // The right eye only ever follows the left one
        self.right.x.target =
            self.left.x.target + self.left.width.current + self.space_between.current;
        self.right.y.target = self.left.y.target;
        self.right.x.step();
        self.right.y.step();

        self.left.border_radius.step();
        self.right.border_radius.step();

        self.run_timers(now_ms);

        let dx = self.h_flicker.next_offset();
        self.left.x.current += dx;
        self.right.x.current += dx;
        let dy = self.v_flicker.next_offset();
        self.left.y.current += dy;
        self.right.y.current += dy;

        if self.cyclops {
            self.right.width.current = 0;
            self.right.height.current = 0;
            self.space_between.current = 0;
        }

        self.step_eyelids();
    }

    /// Height boost for each eye looking toward its outer edge
    fn curious_boosts(&self) -> (i32, i32) {
        if !self.curious {
            return (0, 0);
        }

        let (x_max, _) = self.travel_range();
        let left_x = self.left.x.target;
        let left = if left_x <= CURIOUS_MARGIN || (self.cyclops && left_x >= x_max - CURIOUS_MARGIN)
        {
            CURIOUS_BOOST
        } else {
            0
        };

        let right_limit = self.screen_width - self.right.width.current - CURIOUS_MARGIN;
        let right = if !self.cyclops && self.right.x.target >= right_limit {
            CURIOUS_BOOST
        } else {
            0
        };

        (left, right)
    }

    fn run_timers(&mut self, now_ms: u64) {
        if self.autoblink.is_due(now_ms) {
            tracing::debug!("Auto blink");
            self.blink(true, true);
            self.autoblink.schedule(now_ms, &mut self.rng);
        }

        if self.idle.is_due(now_ms) {
            let (x_max, y_max) = self.travel_range();
            self.left.x.target = self.rng.range_inclusive(0, x_max);
            self.left.y.target = self.rng.range_inclusive(0, y_max);
            tracing::debug!(
                "Idle gaze to ({}, {})",
                self.left.x.target,
                self.left.y.target
            );
            self.idle.schedule(now_ms, &mut self.rng);
        }

        match self.confused.advance(now_ms) {
            OneShotStep::Started => self.h_flicker.set(true, CONFUSED_AMPLITUDE),
            OneShotStep::Finished => self.h_flicker.set(false, 0),
            OneShotStep::Idle | OneShotStep::Running => {}
        }

        match self.laugh.advance(now_ms) {
            OneShotStep::Started => self.v_flicker.set(true, LAUGH_AMPLITUDE),
            OneShotStep::Finished => self.v_flicker.set(false, 0),
            OneShotStep::Idle | OneShotStep::Running => {}
        }
    }

    /// Tween the mood eyelids; tired and angry never show at the same time
    fn step_eyelids(&mut self) {
        let half = self.left.height.current.div_euclid(2);

        self.tired_height.target = if self.mood == Mood::Tired && self.angry_height.current == 0 {
            half
        } else {
            0
        };
        self.tired_height.step();

        self.angry_height.target = if self.mood == Mood::Angry && self.tired_height.current == 0 {
            half
        } else {
            0
        };
        self.angry_height.step();

        self.happy_offset.target = if self.mood == Mood::Happy { half } else { 0 };
        self.happy_offset.step();
    }

    /// Draw commands for the current state, painted in order
    pub fn draw_commands(&self) -> Vec<DrawCommand> {
        let mut commands = Vec::with_capacity(8);
        let left = &self.left;
        let right = &self.right;

        commands.push(left.body());
        if !self.cyclops {
            commands.push(right.body());
        }

        let tired = self.tired_height.current;
        if tired > 0 {
            if self.cyclops {
                let mid = Point::new(left.x.current + left.width.current / 2, left.y.current);
                commands.push(DrawCommand::eyelid(
                    left.top_left(),
                    mid,
                    Point::new(left.x.current, left.y.current + tired),
                ));
                commands.push(DrawCommand::eyelid(
                    mid,
                    left.top_right(),
                    Point::new(left.x.current + left.width.current, left.y.current + tired),
                ));
            } else {
                commands.push(DrawCommand::eyelid(
                    left.top_left(),
                    left.top_right(),
                    Point::new(left.x.current, left.y.current + tired),
                ));
                commands.push(DrawCommand::eyelid(
                    right.top_left(),
                    right.top_right(),
                    Point::new(right.x.current + right.width.current, right.y.current + tired),
                ));
            }
        }

        let angry = self.angry_height.current;
        if angry > 0 {
            if self.cyclops {
                let mid_x = left.x.current + left.width.current / 2;
                let mid = Point::new(mid_x, left.y.current);
                let apex = Point::new(mid_x, left.y.current + angry);
                commands.push(DrawCommand::eyelid(left.top_left(), mid, apex));
                commands.push(DrawCommand::eyelid(mid, left.top_right(), apex));
            } else {
                commands.push(DrawCommand::eyelid(
                    left.top_left(),
                    left.top_right(),
                    Point::new(left.x.current + left.width.current, left.y.current + angry),
                ));
                commands.push(DrawCommand::eyelid(
                    right.top_left(),
                    right.top_right(),
                    Point::new(right.x.current, right.y.current + angry),
                ));
            }
        }

        let happy = self.happy_offset.current;
        if happy > 0 {
            commands.push(happy_eyelid(left, happy));
            if !self.cyclops {
                commands.push(happy_eyelid(right, happy));
            }
        }

        commands
    }
}

/// Background mask over the lower part of an eye, reaching well below it
fn happy_eyelid(eye: &Eye, offset: i32) -> DrawCommand {
    DrawCommand::FilledRoundedRect {
        x: eye.x.current - 1,
        y: eye.y.current + eye.height.current - offset,
        width: eye.width.current + 2,
        height: offset + eye.height_default,
        radius: eye.border_radius.current,
        color: Color::Background,
    }
}

/// 0, half or full of a travel range
fn anchor_coordinate(anchor: i32, max: i32) -> i32 {
    match anchor {
        0 => 0,
        1 => max / 2,
        _ => max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eyes::random::ScriptedRandom;

    const FRAME: u64 = DEFAULT_FRAME_INTERVAL_MS;

    fn animator() -> EyeAnimator<ScriptedRandom> {
        EyeAnimator::new(128, 64, ScriptedRandom::default())
    }

    /// Tick `frames` times at the default frame rate, returning the next timestamp
    fn run<R: RandomSource>(eyes: &mut EyeAnimator<R>, start_ms: u64, frames: usize) -> u64 {
        let mut now = start_ms;
        for _ in 0..frames {
            assert!(eyes.tick(now).is_some());
            now += FRAME;
        }
        now
    }

    #[test]
    fn test_starts_closed_and_centred() {
        let eyes = animator();
        assert_eq!(eyes.left().height.current, 1);
        assert_eq!(eyes.right().height.current, 1);
        assert_eq!(eyes.left().x.current, (128 - 82) / 2);
        assert_eq!(eyes.right().x.current, 23 + 36 + 10);
        assert_eq!(eyes.left().y.current, 14);
        assert!(!eyes.left().is_open);
    }

    #[test]
    fn test_open_sequence() {
        let mut eyes = animator();
        eyes.open(true, true);

        let mut heights = Vec::new();
        let mut now = 1000;
        for _ in 0..12 {
            eyes.tick(now).unwrap();
            heights.push(eyes.left().height.current);
            now += FRAME;
        }

        assert_eq!(&heights[..7], &[18, 27, 31, 33, 34, 35, 36]);
        assert!(heights.windows(2).all(|w| w[0] <= w[1]));
        assert!(heights[7..].iter().all(|h| *h == 36));
    }

    #[test]
    fn test_tick_respects_frame_interval() {
        let mut eyes = animator();
        assert!(eyes.tick(100).is_some());
        assert!(eyes.tick(110).is_none());
        assert!(eyes.tick(119).is_none());
        assert_eq!(eyes.frames(), 1);
        assert!(eyes.tick(120).is_some());
        assert_eq!(eyes.frames(), 2);

        eyes.set_frame_rate(10);
        assert!(eyes.tick(200).is_none());
        assert!(eyes.tick(220).is_some());
    }

    #[test]
    fn test_early_tick_keeps_schedule_clock() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.tick(100).unwrap();
        assert!(eyes.tick(115).is_none());

        // Scheduled from the last frame at 100, not the rejected call
        eyes.set_autoblink(true, 1, 0);
        let now = run(&mut eyes, 120, 49);
        assert_eq!(now, 1100);
        assert_eq!(eyes.left().height.target, 36);

        eyes.tick(1100).unwrap();
        assert_eq!(eyes.left().height.target, 1);
    }

    #[test]
    fn test_space_between_keeps_default() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.set_space_between(-6);
        assert_eq!(eyes.space_between().target, -6);
        assert_eq!(eyes.space_between_default, -6);

        eyes.set_cyclops(true);
        let now = run(&mut eyes, 0, 10);
        assert_eq!(eyes.space_between().current, 0);

        eyes.set_cyclops(false);
        run(&mut eyes, now, 20);
        assert_eq!(eyes.space_between().current, -6);
    }

    #[test]
    fn test_close_stays_closed() {
        let mut eyes = animator();
        eyes.open(true, true);
        let now = run(&mut eyes, 0, 10);
        assert_eq!(eyes.left().height.current, 36);

        eyes.close(true, true);
        let now = run(&mut eyes, now, 7);
        assert_eq!(eyes.left().height.current, 1);
        assert_eq!(eyes.right().height.current, 1);

        run(&mut eyes, now, 20);
        assert_eq!(eyes.left().height.current, 1);
        assert!(!eyes.left().is_open);
    }

    #[test]
    fn test_blink_reopens_without_further_calls() {
        let mut eyes = animator();
        eyes.open(true, true);
        let mut now = run(&mut eyes, 0, 10);

        eyes.blink(true, true);
        let mut heights = Vec::new();
        for _ in 0..20 {
            eyes.tick(now).unwrap();
            heights.push(eyes.left().height.current);
            now += FRAME;
        }

        let closed_at = heights.iter().position(|h| *h == 1).unwrap();
        // closing takes about log2(36) frames
        assert!(closed_at <= 7);
        let reopened_at = heights.iter().rposition(|h| *h != 36).unwrap() + 1;
        assert!(reopened_at - closed_at <= 9);
        assert_eq!(eyes.left().height.current, 36);
        assert_eq!(eyes.right().height.current, 36);
    }

    #[test]
    fn test_blink_one_eye() {
        let mut eyes = animator();
        eyes.open(true, true);
        let now = run(&mut eyes, 0, 10);

        eyes.blink(true, false);
        run(&mut eyes, now, 3);
        assert!(eyes.left().height.current < 36);
        assert_eq!(eyes.right().height.current, 36);
    }

    #[test]
    fn test_closing_keeps_vertical_centre() {
        let mut eyes = animator();
        eyes.open(true, true);
        let now = run(&mut eyes, 0, 15);
        let open_centre = eyes.left().y.current + eyes.left().height.current / 2;

        eyes.close(true, true);
        run(&mut eyes, now, 30);
        let closed_centre = eyes.left().y.current + eyes.left().height.current / 2;
        // halving truncates, so the closed line settles just above centre
        assert!((open_centre - closed_centre).abs() <= 2);
        assert!(closed_centre > 14 + 8);
    }

    #[test]
    fn test_position_north_west() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.set_position(Position::NorthWest);
        run(&mut eyes, 0, 20);

        assert_eq!((eyes.left().x.current, eyes.left().y.current), (0, 0));
        assert_eq!(eyes.right().x.current, 46);
        assert_eq!(eyes.right().y.current, 0);
    }

    #[test]
    fn test_position_presets_cover_grid() {
        let mut eyes = animator();
        let (x_max, y_max) = eyes.travel_range();
        assert_eq!((x_max, y_max), (128 - 82, 64 - 36));

        let expected = [
            (Position::Center, (23, 14)),
            (Position::North, (23, 0)),
            (Position::NorthEast, (46, 0)),
            (Position::East, (46, 14)),
            (Position::SouthEast, (46, 28)),
            (Position::South, (23, 28)),
            (Position::SouthWest, (0, 28)),
            (Position::West, (0, 14)),
            (Position::NorthWest, (0, 0)),
        ];
        for (position, target) in expected {
            eyes.set_position(position);
            assert_eq!(
                (eyes.left().x.target, eyes.left().y.target),
                target,
                "{position}"
            );
        }
    }

    #[test]
    fn test_right_eye_follows_left() {
        let mut eyes = animator();
        eyes.open(true, true);
        let mut now = 0;
        for position in [Position::East, Position::SouthWest, Position::North] {
            eyes.set_position(position);
            for _ in 0..20 {
                eyes.tick(now).unwrap();
                now += FRAME;
                let left = eyes.left();
                assert_eq!(
                    eyes.right().x.target,
                    left.x.target + left.width.current + eyes.space_between().current
                );
                assert_eq!(eyes.right().y.target, left.y.target);
            }
            let left = eyes.left();
            assert_eq!(
                eyes.right().x.current,
                left.x.current + left.width.current + eyes.space_between().current
            );
        }
    }

    #[test]
    fn test_space_between_can_be_negative() {
        let mut eyes = animator();
        eyes.set_space_between(-6);
        eyes.set_position(Position::West);
        run(&mut eyes, 0, 20);
        assert_eq!(eyes.space_between().current, -6);
        assert_eq!(eyes.right().x.current, eyes.left().x.current + 36 - 6);
    }

    #[test]
    fn test_setters_only_move_targets() {
        let mut eyes = animator();
        eyes.set_eye_size(20, 30, 22, 32);
        eyes.set_border_radius(4, 5);
        assert_eq!(eyes.left().width.current, 36);
        assert_eq!(eyes.left().width.target, 20);
        assert_eq!(eyes.right().height.target, 32);
        assert_eq!(eyes.left().border_radius.current, 8);

        run(&mut eyes, 0, 12);
        assert_eq!(eyes.left().width.current, 20);
        assert_eq!(eyes.right().width.current, 22);
        assert_eq!(eyes.left().border_radius.current, 4);
        assert_eq!(eyes.right().border_radius.current, 5);
        assert_eq!(eyes.left().height_default, 30);
    }

    #[test]
    fn test_mood_overlays_return_to_zero() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.set_mood(Mood::Happy);
        let now = run(&mut eyes, 0, 15);
        let (_, _, happy) = eyes.eyelids();
        assert_eq!(happy, 18);

        eyes.set_mood(Mood::Neutral);
        run(&mut eyes, now, 15);
        assert_eq!(eyes.eyelids(), (0, 0, 0));
    }

    #[test]
    fn test_tired_and_angry_never_overlap() {
        let mut eyes = animator();
        eyes.open(true, true);
        let mut now = 0;
        for mood in [Mood::Tired, Mood::Angry, Mood::Tired, Mood::Happy, Mood::Angry] {
            eyes.set_mood(mood);
            for _ in 0..12 {
                eyes.tick(now).unwrap();
                now += FRAME;
                let (tired, angry, _) = eyes.eyelids();
                assert!(tired == 0 || angry == 0, "tired {tired} angry {angry}");
            }
        }
        let (tired, angry, _) = eyes.eyelids();
        assert_eq!(tired, 0);
        assert_eq!(angry, 18);
    }

    #[test]
    fn test_confused_runs_half_a_second() {
        let mut eyes = animator();
        eyes.open(true, true);
        let now = run(&mut eyes, 0, 10);

        eyes.trigger_confused();
        assert!(eyes.h_flicker().active);
        assert_eq!(eyes.h_flicker().amplitude, CONFUSED_AMPLITUDE);

        let started = now;
        let mut now = now;
        while now < started + ONE_SHOT_DURATION_MS {
            eyes.tick(now).unwrap();
            assert!(eyes.h_flicker().active, "stopped early at {}", now - started);
            now += FRAME;
        }
        eyes.tick(now).unwrap();
        assert!(!eyes.h_flicker().active);
        assert!(!eyes.is_confused());
        assert!(now - started <= ONE_SHOT_DURATION_MS + FRAME);
    }

    #[test]
    fn test_confused_shakes_horizontally() {
        let mut eyes = animator();
        eyes.open(true, true);
        let now = run(&mut eyes, 0, 20);
        let rest = eyes.left().x.current;

        eyes.trigger_confused();
        eyes.tick(now).unwrap();
        let first = eyes.left().x.current;
        eyes.tick(now + FRAME).unwrap();
        let second = eyes.left().x.current;

        assert_eq!(first, rest - CONFUSED_AMPLITUDE);
        assert!(second > rest);
        assert_eq!(
            eyes.right().x.current - eyes.left().x.current,
            36 + 10
        );
    }

    #[test]
    fn test_laugh_runs_half_a_second() {
        let mut eyes = animator();
        eyes.open(true, true);
        let now = run(&mut eyes, 0, 10);

        eyes.trigger_laugh();
        assert!(eyes.v_flicker().active);
        assert_eq!(eyes.v_flicker().amplitude, LAUGH_AMPLITUDE);

        let started = now;
        let mut now = now;
        while now < started + ONE_SHOT_DURATION_MS {
            eyes.tick(now).unwrap();
            assert!(eyes.v_flicker().active);
            now += FRAME;
        }
        eyes.tick(now).unwrap();
        assert!(!eyes.v_flicker().active);
        assert!(!eyes.is_laughing());
    }

    #[test]
    fn test_manual_flicker_alternates() {
        let mut eyes = animator();
        eyes.open(true, true);
        let now = run(&mut eyes, 0, 20);
        let rest_y = eyes.left().y.current;

        eyes.set_v_flicker(true, 4);
        eyes.tick(now).unwrap();
        assert_eq!(eyes.left().y.current, rest_y - 4);
        assert_eq!(eyes.right().y.current, rest_y - 4);

        eyes.set_v_flicker(false, 0);
        run(&mut eyes, now + FRAME, 10);
        assert_eq!(eyes.left().y.current, rest_y);
    }

    #[test]
    fn test_autoblink_schedule() {
        // variation draws: 2 -> first blink due at 1000 + 2000
        let mut eyes = EyeAnimator::new(128, 64, ScriptedRandom::new([2, 0]));
        eyes.open(true, true);
        eyes.tick(0).unwrap();
        eyes.set_autoblink(true, 1, 4);
        assert!(eyes.autoblink_enabled());

        let now = run(&mut eyes, FRAME, 148);
        assert_eq!(eyes.left().height.current, 36);
        assert_eq!(now, 2980);

        eyes.tick(3000).unwrap();
        assert_eq!(eyes.left().height.target, 1);
        assert_eq!(eyes.right().height.target, 1);
        assert!(eyes.left().is_open);

        eyes.tick(3020).unwrap();
        assert!(eyes.left().height.current < 36);

        run(&mut eyes, 3040, 20);
        assert_eq!(eyes.left().height.current, 36);
    }

    #[test]
    fn test_idle_picks_position_in_range() {
        let mut eyes = EyeAnimator::new(128, 64, ScriptedRandom::new([0, 40, 7, 0]));
        eyes.set_idle(true, 1, 0);
        assert!(eyes.idle_enabled());

        run(&mut eyes, 0, 50);
        assert_eq!(eyes.left().x.target, 23);
        eyes.tick(1000).unwrap();
        assert_eq!((eyes.left().x.target, eyes.left().y.target), (40, 7));
    }

    #[test]
    fn test_idle_clamps_to_travel_range() {
        let mut eyes = EyeAnimator::new(128, 64, ScriptedRandom::new([0, 500, 500]));
        eyes.set_idle(true, 0, 0);
        eyes.tick(0).unwrap();
        let (x_max, y_max) = eyes.travel_range();
        assert_eq!(eyes.left().x.target, x_max);
        assert_eq!(eyes.left().y.target, y_max);
    }

    #[test]
    fn test_curious_boosts_outer_eye() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.set_curious(true);
        eyes.set_position(Position::West);
        run(&mut eyes, 0, 20);

        assert_eq!(eyes.left().height.current, 44);
        assert_eq!(eyes.left().height.target, 36);
        assert_eq!(eyes.right().height.current, 36);

        eyes.set_position(Position::East);
        run(&mut eyes, 400, 20);
        assert_eq!(eyes.left().height.current, 36);
        assert_eq!(eyes.right().height.current, 44);

        eyes.set_curious(false);
        run(&mut eyes, 800, 20);
        assert_eq!(eyes.right().height.current, 36);
    }

    #[test]
    fn test_cyclops_draws_single_eye() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.set_cyclops(true);
        let commands = {
            let mut now = 0;
            let mut last = Vec::new();
            for _ in 0..15 {
                last = eyes.tick(now).unwrap();
                now += FRAME;
            }
            last
        };

        assert_eq!(eyes.right().width.current, 0);
        assert_eq!(eyes.right().height.current, 0);
        assert_eq!(eyes.space_between().current, 0);
        assert_eq!(eyes.right().width.target, 36);

        let bodies: Vec<_> = commands
            .iter()
            .filter(|c| c.color() == Color::Foreground)
            .collect();
        assert_eq!(bodies.len(), 1);
        assert!(matches!(
            bodies[0],
            DrawCommand::FilledRoundedRect { width: 36, height: 36, .. }
        ));

        assert_eq!(eyes.travel_range().0, 128 - 36);
    }

    #[test]
    fn test_cyclops_off_restores_right_eye() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.set_cyclops(true);
        let now = run(&mut eyes, 0, 10);
        eyes.set_cyclops(false);
        run(&mut eyes, now, 30);
        assert_eq!(eyes.right().width.current, 36);
        assert_eq!(eyes.right().height.current, 36);
        assert_eq!(eyes.space_between().current, 10);
    }

    #[test]
    fn test_draw_commands_for_moods() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.set_mood(Mood::Tired);
        let commands = {
            let mut now = 0;
            let mut last = Vec::new();
            for _ in 0..15 {
                last = eyes.tick(now).unwrap();
                now += FRAME;
            }
            last
        };

        assert_eq!(commands.len(), 4);
        let left = eyes.left();
        let tired = eyes.eyelids().0;
        assert_eq!(
            commands[2],
            DrawCommand::FilledPolygon {
                points: vec![
                    Point::new(left.x.current, left.y.current),
                    Point::new(left.x.current + 36, left.y.current),
                    Point::new(left.x.current, left.y.current + tired),
                ],
                color: Color::Background,
            }
        );

        eyes.set_mood(Mood::Happy);
        let commands = {
            let mut now = 1000;
            let mut last = Vec::new();
            for _ in 0..15 {
                last = eyes.tick(now).unwrap();
                now += FRAME;
            }
            last
        };
        assert_eq!(commands.len(), 4);
        let left = eyes.left();
        match &commands[2] {
            DrawCommand::FilledRoundedRect {
                x,
                y,
                width,
                height,
                color,
                ..
            } => {
                assert_eq!(*x, left.x.current - 1);
                assert_eq!(*width, 38);
                assert_eq!(*y, left.y.current + 36 - 18);
                assert_eq!(*height, 18 + 36);
                assert_eq!(*color, Color::Background);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cyclops_angry_meets_in_middle() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.set_cyclops(true);
        eyes.set_mood(Mood::Angry);
        let mut now = 0;
        let mut commands = Vec::new();
        for _ in 0..15 {
            commands = eyes.tick(now).unwrap();
            now += FRAME;
        }

        let left = eyes.left();
        let mid = left.x.current + 18;
        let polygons: Vec<_> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FilledPolygon { points, .. } => Some(points.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(polygons.len(), 2);
        assert_eq!(polygons[0][2].x, mid);
        assert_eq!(polygons[1][2].x, mid);
    }

    #[test]
    fn test_cyclops_tired_splits_eye() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.set_cyclops(true);
        eyes.set_mood(Mood::Tired);
        let mut now = 0;
        let mut commands = Vec::new();
        for _ in 0..15 {
            commands = eyes.tick(now).unwrap();
            now += FRAME;
        }

        let left = eyes.left();
        let (x, y) = (left.x.current, left.y.current);
        let tired = eyes.eyelids().0;
        assert_eq!(tired, 18);
        assert_eq!(commands.len(), 3);
        assert_eq!(
            commands[1],
            DrawCommand::FilledPolygon {
                points: vec![
                    Point::new(x, y),
                    Point::new(x + 18, y),
                    Point::new(x, y + tired),
                ],
                color: Color::Background,
            }
        );
        assert_eq!(
            commands[2],
            DrawCommand::FilledPolygon {
                points: vec![
                    Point::new(x + 18, y),
                    Point::new(x + 36, y),
                    Point::new(x + 36, y + tired),
                ],
                color: Color::Background,
            }
        );
    }

    #[test]
    fn test_cyclops_curious_boosts_at_right_edge() {
        let mut eyes = animator();
        eyes.open(true, true);
        eyes.set_cyclops(true);
        eyes.set_curious(true);
        eyes.set_position(Position::East);
        assert_eq!(eyes.left().x.target, 128 - 36);

        run(&mut eyes, 0, 20);
        assert_eq!(eyes.left().x.current, 92);
        assert_eq!(eyes.left().height.current, 44);
        assert_eq!(eyes.left().height.target, 36);
        assert_eq!(eyes.right().height.current, 0);
    }

    #[test]
    fn test_with_config() {
        let config = EyesConfig {
            width: 30,
            height: 24,
            border_radius: 6,
            space_between: 8,
            mood: Mood::Angry,
            position: Position::NorthEast,
            cyclops: false,
            curious: false,
            ..EyesConfig::default()
        };
        let mut eyes = EyeAnimator::with_config(128, 64, &config, ScriptedRandom::default());
        assert_eq!(eyes.left().width.current, 30);
        assert_eq!(eyes.left().x.current, (128 - 68) / 2);
        assert_eq!(eyes.mood(), Mood::Angry);
        assert!(eyes.left().is_open);
        assert_eq!(eyes.left().x.target, 128 - 68);

        run(&mut eyes, 0, 20);
        assert_eq!(eyes.left().height.current, 24);
        assert_eq!(eyes.left().y.current, 0);
        assert_eq!(eyes.right().x.current, 60 + 30 + 8);
    }
}
