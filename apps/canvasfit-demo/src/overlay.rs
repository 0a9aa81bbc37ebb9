use crate::config::DemoConfig;
use canvasfit_common::BufferSize;
use canvasfit_observe::ObserverStats;
use canvasfit_tools::SurfaceSummary;

/// Live sizing controls, seeded from the config and edited in the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub show_overlay: bool,
    pub follow_scale_factor: bool,
    pub multiplier: f64,
    pub cap: Option<u32>,
}

impl Controls {
    pub fn from_config(config: &DemoConfig) -> Self {
        Self {
            show_overlay: config.show_overlay,
            follow_scale_factor: config.multiplier.is_none(),
            multiplier: config.multiplier.unwrap_or(1.0),
            cap: config.max_texture_dimension_2d,
        }
    }

    /// Multiplier to resolve with for a window at `scale_factor`.
    pub fn multiplier(&self, scale_factor: f64) -> f64 {
        if self.follow_scale_factor {
            scale_factor
        } else {
            self.multiplier
        }
    }
}

/// Maps egui's window-space input onto the drawing buffer.
///
/// When one axis is clamped the buffer is stretched unevenly over the window.
/// egui draws with a single pixels-per-point, so the overlay is laid out at
/// the smaller of the two buffer/window ratios and pointer positions are
/// stretched along the other axis to land where they appear on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayFit {
    scale: f32,
    stretch: egui::Vec2,
}

impl OverlayFit {
    /// `window` is the window's physical size.
    pub fn new(window: [u32; 2], buffer: BufferSize) -> Self {
        let ratio = egui::vec2(
            buffer.width as f32 / window[0].max(1) as f32,
            buffer.height as f32 / window[1].max(1) as f32,
        );
        let scale = ratio.min_elem();
        Self {
            scale,
            stretch: ratio / scale,
        }
    }

    /// Buffer pixels per window pixel used for the overlay.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    fn map(&self, pos: egui::Pos2) -> egui::Pos2 {
        egui::pos2(pos.x * self.stretch.x, pos.y * self.stretch.y)
    }

    /// Rewrite input gathered from the window into buffer-space points.
    pub fn apply(&self, raw_input: &mut egui::RawInput) {
        if let Some(rect) = raw_input.screen_rect.as_mut() {
            *rect = egui::Rect::from_min_max(self.map(rect.min), self.map(rect.max));
        }
        let viewport = raw_input
            .viewports
            .entry(raw_input.viewport_id)
            .or_default();
        let native = viewport.native_pixels_per_point.unwrap_or(1.0);
        viewport.native_pixels_per_point = Some(native * self.scale);

        for event in &mut raw_input.events {
            match event {
                egui::Event::PointerMoved(pos)
                | egui::Event::PointerButton { pos, .. }
                | egui::Event::Touch { pos, .. } => *pos = self.map(*pos),
                _ => {}
            }
        }
    }
}

/// Draw the sizing panel.
pub fn draw(
    ctx: &egui::Context,
    summary: &SurfaceSummary,
    stats: &ObserverStats,
    controls: &mut Controls,
    device_max: u32,
    sample_count: u32,
) {
    egui::Window::new("canvasfit")
        .anchor(egui::Align2::RIGHT_TOP, [-8.0, 8.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("Surface {}", summary.id.short()));
            match summary.observed {
                Some(o) => ui.label(format!("Observed: {:.1} x {:.1}", o.width, o.height)),
                None => ui.label("Observed: nothing yet, using window size"),
            };
            ui.label(format!("Multiplier: {:.2}", summary.multiplier));
            ui.label(format!("Buffer: {}", summary.resolved));
            ui.label(format!(
                "Limit: {} (device {})",
                summary.max_dimension, device_max
            ));
            if summary.is_clamped() {
                ui.colored_label(egui::Color32::YELLOW, "Clamped to the limit");
            }
            ui.label(format!("MSAA: {sample_count}x"));

            ui.separator();
            ui.checkbox(&mut controls.follow_scale_factor, "Follow scale factor");
            ui.add_enabled(
                !controls.follow_scale_factor,
                egui::Slider::new(&mut controls.multiplier, 0.1..=4.0).text("Multiplier"),
            );

            let mut capped = controls.cap.is_some();
            ui.checkbox(&mut capped, "Cap max dimension");
            let mut cap = controls.cap.unwrap_or(device_max.min(4096));
            if capped {
                ui.add(
                    egui::Slider::new(&mut cap, 1..=device_max)
                        .logarithmic(true)
                        .text("Max dimension"),
                );
            }
            controls.cap = capped.then_some(cap);

            ui.separator();
            ui.label(format!(
                "Notifications: {} batches, {} entries",
                stats.batches, stats.entries_applied
            ));
            ui.small("F1: toggle overlay | Esc: quit");
        });
}
