//! The simulation clock: virtual seconds since epoch J under a variable
//! acceleration factor.

/// Upper clamp on the acceleration factor.
pub const MAX_TIME_SCALE: f64 = 1.0e6;

/// Play-state and accumulated simulation time.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    sim_time_s: f64,
    time_scale: f64,
    is_playing: bool,
}

impl SimulationClock {
    pub fn new() -> Self {
        SimulationClock {
            sim_time_s: 0.0,
            time_scale: 1.0,
            is_playing: false,
        }
    }

    /// Advance by a wall-clock delta; a no-op while paused, so sim time is
    /// monotonic non-decreasing whenever the clock is playing.
    pub fn advance(&mut self, wall_dt_s: f64) {
        if self.is_playing && wall_dt_s > 0.0 {
            self.sim_time_s += wall_dt_s * self.time_scale;
        }
    }

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// Set the acceleration factor. Positivity is validated at the command
    /// boundary; the upper clamp mirrors the interactive viewer's limit.
    pub fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale.min(MAX_TIME_SCALE);
    }

    pub fn sim_time_s(&self) -> f64 {
        self.sim_time_s
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        SimulationClock::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_clock_does_not_advance() {
        let mut clock = SimulationClock::new();
        clock.advance(10.0);
        assert_eq!(clock.sim_time_s(), 0.0);
    }

    #[test]
    fn playing_clock_scales_wall_time() {
        let mut clock = SimulationClock::new();
        clock.play();
        clock.set_time_scale(1_000.0);
        clock.advance(1.0);
        assert_eq!(clock.sim_time_s(), 1_000.0);
    }

    #[test]
    fn time_scale_is_clamped_at_the_top() {
        let mut clock = SimulationClock::new();
        clock.set_time_scale(1.0e9);
        assert_eq!(clock.time_scale(), MAX_TIME_SCALE);
    }

    #[test]
    fn sim_time_is_monotonic_across_pauses() {
        let mut clock = SimulationClock::new();
        clock.play();
        clock.advance(5.0);
        let mid = clock.sim_time_s();
        clock.pause();
        clock.advance(5.0);
        assert_eq!(clock.sim_time_s(), mid);
        clock.play();
        clock.advance(1.0);
        assert!(clock.sim_time_s() > mid);
    }
}
