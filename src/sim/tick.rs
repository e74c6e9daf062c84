/// Fixed scheduler rate: 60 ticks per second. Inertia budgets and the
/// auto-rotate speed are expressed in these ticks.
pub const TICK_DT: f64 = 1.0 / 60.0;

/// Maximum frame time to prevent spiral of death.
/// If a frame takes longer than this, we cap the accumulated time.
const MAX_FRAME_TIME: f64 = 0.25;

/// Converts irregular host frames into a whole number of fixed ticks.
pub struct FrameClock {
    pub accumulator: f64,
    pub tick_count: u64,
    pub last_frame: Option<std::time::Instant>,
    // FPS/TPS tracking
    fps_samples: Vec<f64>,
    window_ticks: u32,
    window_timer: f64,
    pub fps: f64,
    pub tps: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            tick_count: 0,
            last_frame: None,
            fps_samples: Vec::with_capacity(60),
            window_ticks: 0,
            window_timer: 0.0,
            fps: 0.0,
            tps: 0.0,
        }
    }

    /// Call at the start of each frame. Returns the frame dt (capped) if we
    /// have a previous frame, or None on the very first frame.
    pub fn begin_frame(&mut self) -> Option<f64> {
        let now = std::time::Instant::now();
        let dt = self.last_frame.map(|last| {
            let raw_dt = now.duration_since(last).as_secs_f64();
            self.record_frame_time(raw_dt);
            raw_dt.min(MAX_FRAME_TIME)
        });
        self.last_frame = Some(now);
        dt
    }

    fn record_frame_time(&mut self, raw_dt: f64) {
        if raw_dt <= 0.0 {
            return;
        }
        self.fps_samples.push(raw_dt);
        if self.fps_samples.len() > 60 {
            self.fps_samples.remove(0);
        }
        let avg: f64 = self.fps_samples.iter().sum::<f64>() / self.fps_samples.len() as f64;
        self.fps = 1.0 / avg;
    }

    /// Accumulate frame time and return how many ticks should run.
    pub fn accumulate(&mut self, frame_dt: f64) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_TIME);
        self.window_timer += frame_dt;

        let mut ticks = 0u32;
        while self.accumulator >= TICK_DT {
            self.accumulator -= TICK_DT;
            self.tick_count += 1;
            ticks += 1;
        }
        self.window_ticks += ticks;

        if self.window_timer >= 1.0 {
            self.tps = self.window_ticks as f64 / self.window_timer;
            self.window_ticks = 0;
            self.window_timer = 0.0;
        }

        ticks
    }

    /// Ticks due since the previous call; zero on the very first frame.
    pub fn advance(&mut self) -> u32 {
        match self.begin_frame() {
            Some(dt) => self.accumulate(dt),
            None => 0,
        }
    }
}
