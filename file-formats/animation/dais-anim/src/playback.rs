//! Playback time to clip percentage

use std::fmt;
use std::str::FromStr;

/// What happens when playback runs past either end of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde-support",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum WrapMode {
    /// Hold the first or last frame
    Clamp,
    /// Loop from the start
    #[default]
    Repeat,
    /// Play forwards then backwards
    PingPong,
}

impl WrapMode {
    pub const ALL: [Self; 3] = [Self::Clamp, Self::Repeat, Self::PingPong];

    pub fn name(self) -> &'static str {
        match self {
            Self::Clamp => "clamp",
            Self::Repeat => "repeat",
            Self::PingPong => "ping-pong",
        }
    }
}

impl fmt::Display for WrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WrapMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "repeat" | "loop" => Ok(Self::Repeat),
            "ping-pong" | "pingpong" => Ok(Self::PingPong),
            _ => Err(format!("unknown wrap mode: {s}")),
        }
    }
}

/// Wrap `time` into `[0, duration]`
///
/// Clips shorter than `f32::EPSILON` always map to zero.
pub fn wrap_time(time: f32, duration: f32, wrap: WrapMode) -> f32 {
    if duration <= f32::EPSILON {
        return 0.0;
    }
    match wrap {
        WrapMode::Clamp => time.clamp(0.0, duration),
        WrapMode::Repeat => time.rem_euclid(duration),
        WrapMode::PingPong => {
            let period = duration * 2.0;
            let t = time.rem_euclid(period);
            if t <= duration { t } else { period - t }
        }
    }
}

/// Clip percentage for a playback time in seconds
pub fn percent_at(time: f32, duration: f32, wrap: WrapMode) -> f32 {
    if duration <= f32::EPSILON {
        return 0.0;
    }
    wrap_time(time, duration, wrap) / duration
}

/// Playback position of one clip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playback {
    /// Elapsed time in seconds, unwrapped
    pub time: f32,
    /// Playback rate; negative plays backwards
    pub speed: f32,
    pub wrap: WrapMode,
}

impl Playback {
    /// Start at time zero with normal speed
    pub fn new(wrap: WrapMode) -> Self {
        Self {
            time: 0.0,
            speed: 1.0,
            wrap,
        }
    }

    /// Set the playback rate
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Advance by `dt` seconds of real time
    pub fn advance(&mut self, dt: f32) {
        self.time += dt * self.speed;
    }

    /// Jump back to the start
    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    /// Current percentage of a clip of `duration` seconds
    pub fn percent(&self, duration: f32) -> f32 {
        percent_at(self.time, duration, self.wrap)
    }

    /// Whether a clamped clip has reached either end
    pub fn is_finished(&self, duration: f32) -> bool {
        self.wrap == WrapMode::Clamp && (self.time >= duration || self.time < 0.0)
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(WrapMode::default())
    }
}
