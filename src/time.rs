//! Frame clock.
//!
//! The field is driven by wall-clock seconds since start. [`Time`] turns
//! `Instant`s into that value while supporting pause and a speed multiplier,
//! and keeps a frame counter and a smoothed FPS for the window title.

use std::time::{Duration, Instant};

const FPS_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub struct Time {
    last_tick: Instant,
    elapsed: f32,
    delta: f32,
    frame: u64,
    paused: bool,
    time_scale: f32,
    fps: f32,
    fps_window_start: Instant,
    fps_window_frames: u32,
}

impl Time {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(now: Instant) -> Self {
        Self {
            last_tick: now,
            elapsed: 0.0,
            delta: 0.0,
            frame: 0,
            paused: false,
            time_scale: 1.0,
            fps: 0.0,
            fps_window_start: now,
            fps_window_frames: 0,
        }
    }

    /// Advance to now. Returns elapsed seconds.
    pub fn update(&mut self) -> f32 {
        self.advance_to(Instant::now())
    }

    fn advance_to(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        // Paused time still counts frames so the title stays live.
        self.delta = if self.paused { 0.0 } else { raw * self.time_scale };
        self.elapsed += self.delta;
        self.frame += 1;

        self.fps_window_frames += 1;
        let window = now.saturating_duration_since(self.fps_window_start);
        if window >= FPS_WINDOW {
            self.fps = self.fps_window_frames as f32 / window.as_secs_f32();
            self.fps_window_frames = 0;
            self.fps_window_start = now;
        }

        self.elapsed
    }

    /// Seconds of (scaled, unpaused) time since start.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Negative scales clamp to zero.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_accumulates() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        time.advance_to(start + Duration::from_millis(250));
        let elapsed = time.advance_to(start + Duration::from_millis(500));
        assert!((elapsed - 0.5).abs() < 1e-4);
        assert!((time.delta() - 0.25).abs() < 1e-4);
        assert_eq!(time.frame(), 2);
    }

    #[test]
    fn test_pause_freezes_elapsed() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        time.advance_to(start + Duration::from_millis(100));
        time.toggle_pause();
        let frozen = time.advance_to(start + Duration::from_secs(5));
        assert!((frozen - 0.1).abs() < 1e-4);
        assert_eq!(time.delta(), 0.0);

        time.toggle_pause();
        let resumed = time.advance_to(start + Duration::from_millis(5_100));
        // the paused stretch is skipped, not replayed
        assert!((resumed - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_time_scale() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        time.set_time_scale(2.0);
        let elapsed = time.advance_to(start + Duration::from_millis(100));
        assert!((elapsed - 0.2).abs() < 1e-4);

        time.set_time_scale(-1.0);
        assert_eq!(time.time_scale(), 0.0);
    }

    #[test]
    fn test_fps_over_window() {
        let start = Instant::now();
        let mut time = Time::starting_at(start);
        for i in 1..=30 {
            time.advance_to(start + Duration::from_millis(i * 1000 / 60));
        }
        assert!((time.fps() - 60.0).abs() < 2.0);
    }
}
