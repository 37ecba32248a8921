//! Current/target value pairs advanced by halving the distance each frame.

/// A tweened integer quantity.
///
/// Setters only ever write `target`; `current` follows one halving step per
/// frame and is what gets drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tween {
    pub current: i32,
    pub target: i32,
}

impl Tween {
    /// A pair that is already at rest on `value`
    pub const fn settled(value: i32) -> Self {
        Self {
            current: value,
            target: value,
        }
    }

    /// Advance one frame toward `target`
    pub fn step(&mut self) {
        self.step_biased(0);
    }

    /// Advance one frame toward `target + bias`
    ///
    /// The bias is transient and never written back into `target`. Floor
    /// halving stalls one pixel below its goal, so a stalled step snaps
    /// onto the goal instead.
    pub fn step_biased(&mut self, bias: i32) {
        let goal = self.target + bias;
        let next = (self.current + goal).div_euclid(2);
        self.current = if next == self.current { goal } else { next };
    }

    /// Jump straight to `value`, skipping the animation
    pub fn snap(&mut self, value: i32) {
        self.current = value;
        self.target = value;
    }
}
