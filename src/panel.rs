//! Debug panel.
//!
//! Exposes the two live tunables (angle multiplier, max travel distance),
//! the filter settings and a few frame statistics. Toggled with F1.

use crate::config::{Filters, Tuning};
use crate::swarm::FrameStats;

/// Read-only values shown at the bottom of the panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanelStatus {
    pub fps: f32,
    pub total: usize,
    pub stats: FrameStats,
    pub paused: bool,
}

#[derive(Debug, Clone)]
pub struct DebugPanel {
    pub visible: bool,
}

impl Default for DebugPanel {
    fn default() -> Self {
        Self { visible: true }
    }
}

impl DebugPanel {
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Draw the panel. Returns true if any value changed.
    pub fn show(
        &mut self,
        ctx: &egui::Context,
        tuning: &mut Tuning,
        filters: &mut Filters,
        status: &PanelStatus,
    ) -> bool {
        if !self.visible {
            return false;
        }

        let mut changed = false;

        egui::Window::new("Field")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                changed |= ui
                    .add(
                        egui::Slider::new(&mut tuning.angle_mult, Tuning::ANGLE_MULT_RANGE)
                            .step_by(0.1)
                            .text("angle mult"),
                    )
                    .changed();
                changed |= ui
                    .add(
                        egui::Slider::new(&mut tuning.max_travel_dist, Tuning::MAX_TRAVEL_RANGE)
                            .text("max travel"),
                    )
                    .changed();

                ui.collapsing("Bloom", |ui| {
                    changed |= ui.checkbox(&mut filters.bloom.enabled, "enabled").changed();
                    ui.add_enabled_ui(filters.bloom.enabled, |ui| {
                        changed |= ui
                            .add(egui::Slider::new(&mut filters.bloom.strength, 0.0..=40.0).text("strength"))
                            .changed();
                        changed |= ui
                            .add(egui::Slider::new(&mut filters.bloom.quality, 1..=8).text("quality"))
                            .changed();
                        changed |= ui
                            .add(egui::Slider::new(&mut filters.bloom.intensity, 0.0..=3.0).text("intensity"))
                            .changed();
                    });
                });

                ui.collapsing("Glow", |ui| {
                    changed |= ui.checkbox(&mut filters.glow.enabled, "enabled").changed();
                    ui.add_enabled_ui(filters.glow.enabled, |ui| {
                        changed |= ui
                            .add(egui::Slider::new(&mut filters.glow.distance, 0.0..=8.0).text("distance"))
                            .changed();
                        changed |= ui
                            .add(egui::Slider::new(&mut filters.glow.outer_strength, 0.0..=6.0).text("outer"))
                            .changed();
                        changed |= ui
                            .add(egui::Slider::new(&mut filters.glow.inner_strength, 0.0..=6.0).text("inner"))
                            .changed();
                    });
                });

                ui.separator();
                ui.label(format!("{:.0} fps", status.fps));
                ui.label(format!("{} / {} lit", status.stats.active, status.total));
                if status.stats.forced > 0 {
                    ui.label(format!("+{} forced", status.stats.forced));
                }
                if status.paused {
                    ui.colored_label(egui::Color32::YELLOW, "paused");
                }
                ui.small("F1 panel, Space pause, R scatter");
            });

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_panel(panel: &mut DebugPanel, tuning: &mut Tuning, filters: &mut Filters) -> bool {
        let ctx = egui::Context::default();
        let status = PanelStatus {
            fps: 60.0,
            total: 10,
            ..Default::default()
        };
        let mut changed = false;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            changed = panel.show(ctx, tuning, filters, &status);
        });
        changed
    }

    #[test]
    fn test_hidden_panel_changes_nothing() {
        let mut panel = DebugPanel::default();
        panel.toggle();
        assert!(!panel.visible);

        let mut tuning = Tuning::default();
        let mut filters = Filters::default();
        assert!(!run_panel(&mut panel, &mut tuning, &mut filters));
        assert_eq!(tuning, Tuning::default());
        assert_eq!(filters, Filters::default());
    }

    #[test]
    fn test_panel_without_input_leaves_values() {
        let mut panel = DebugPanel::default();
        let mut tuning = Tuning::default();
        let mut filters = Filters::default();
        assert!(!run_panel(&mut panel, &mut tuning, &mut filters));
        assert_eq!(tuning, Tuning::default());
    }
}
