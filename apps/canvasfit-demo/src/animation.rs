use std::time::Instant;

/// Frame pacing for the demo.
///
/// Frames are only drawn while the window is visible. Time keeps running
/// while hidden, so the cube resumes where the clock is, not where it stopped.
#[derive(Debug, Clone)]
pub struct AnimationLoop {
    start: Instant,
    occluded: bool,
    minimized: bool,
}

impl AnimationLoop {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            occluded: false,
            minimized: false,
        }
    }

    pub fn set_occluded(&mut self, occluded: bool) {
        if occluded != self.occluded {
            tracing::debug!(occluded, "window visibility changed");
        }
        self.occluded = occluded;
    }

    /// A zero-area window counts as minimized.
    pub fn set_window_area(&mut self, width: u32, height: u32) {
        self.minimized = width == 0 || height == 0;
    }

    pub fn should_draw(&self) -> bool {
        !self.occluded && !self.minimized
    }

    /// Seconds since the loop started.
    pub fn time_at(&self, now: Instant) -> f32 {
        now.saturating_duration_since(self.start).as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn time_is_seconds_since_start() {
        let start = Instant::now();
        let anim = AnimationLoop::new(start);
        let t = anim.time_at(start + Duration::from_millis(1500));
        assert!((t - 1.5).abs() < 1e-6);
        assert_eq!(anim.time_at(start), 0.0);
    }

    #[test]
    fn hidden_window_does_not_draw() {
        let mut anim = AnimationLoop::new(Instant::now());
        assert!(anim.should_draw());

        anim.set_occluded(true);
        assert!(!anim.should_draw());
        anim.set_occluded(false);
        assert!(anim.should_draw());

        anim.set_window_area(0, 600);
        assert!(!anim.should_draw());
        anim.set_window_area(800, 600);
        assert!(anim.should_draw());
    }
}
