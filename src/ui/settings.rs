use crate::gallery::config::GalleryConfig;
use crate::gallery::rotation::Rotation;
use crate::layout::radius::FitBasis;

/// Read-only numbers shown at the bottom of the panel.
pub struct PanelStats {
    pub fps: f64,
    pub tps: f64,
    pub rotation: Rotation,
    pub radius_px: f64,
    pub tile_count: usize,
    pub image_count: usize,
}

/// What the user did with the panel this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PanelOutcome {
    /// A setting was edited and should be applied live.
    pub changed: bool,
    /// The panel was closed and the config should be persisted.
    pub closed: bool,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum SettingsTab {
    Motion,
    Layout,
    Appearance,
    Debug,
}

pub fn settings_panel(ctx: &egui::Context, open: &mut bool, config: &mut GalleryConfig, stats: &PanelStats) -> PanelOutcome {
    let mut outcome = PanelOutcome::default();
    if !*open {
        return outcome;
    }

    egui::Window::new("Gallery settings")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::RIGHT_TOP, [-16.0, 16.0])
        .default_width(360.0)
        .show(ctx, |ui| {
            let tab_id = ui.id().with("settings_tab");
            let mut tab: SettingsTab = ui.data_mut(|d| *d.get_temp_mut_or(tab_id, SettingsTab::Motion));

            ui.horizontal(|ui| {
                ui.selectable_value(&mut tab, SettingsTab::Motion, "Motion");
                ui.selectable_value(&mut tab, SettingsTab::Layout, "Layout");
                ui.selectable_value(&mut tab, SettingsTab::Appearance, "Appearance");
                ui.selectable_value(&mut tab, SettingsTab::Debug, "Debug");
            });
            ui.data_mut(|d| d.insert_temp(tab_id, tab));
            ui.separator();

            let changed = match tab {
                SettingsTab::Motion => motion_tab(ui, config),
                SettingsTab::Layout => layout_tab(ui, config),
                SettingsTab::Appearance => appearance_tab(ui, config),
                SettingsTab::Debug => ui
                    .checkbox(&mut config.debug.log_gestures, "Log gestures to console")
                    .changed(),
            };
            outcome.changed |= changed;

            ui.separator();
            ui.label(
                egui::RichText::new(format!(
                    "{:.0} fps · {:.0} tps · tilt {:.2}° spin {:.1}° · r {:.0}px · {} tiles / {} images",
                    stats.fps,
                    stats.tps,
                    stats.rotation.tilt,
                    stats.rotation.spin,
                    stats.radius_px,
                    stats.tile_count,
                    stats.image_count,
                ))
                .small()
                .weak(),
            );

            if ui.button("Close").clicked() {
                *open = false;
                outcome.closed = true;
            }
        });

    outcome
}

fn slider_row<T: egui::emath::Numeric>(ui: &mut egui::Ui, label: &str, value: &mut T, range: std::ops::RangeInclusive<T>) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::Slider::new(value, range)).changed()
    })
    .inner
}

fn motion_tab(ui: &mut egui::Ui, config: &mut GalleryConfig) -> bool {
    let motion = &mut config.motion;
    let mut changed = false;
    changed |= slider_row(ui, "Max tilt (deg):", &mut motion.max_vertical_rotation_deg, 0.0..=90.0);
    changed |= slider_row(ui, "Drag sensitivity:", &mut motion.drag_sensitivity, 1.0..=100.0);
    changed |= slider_row(ui, "Drag dampening:", &mut motion.drag_dampening, 0.0..=1.0);
    changed |= slider_row(ui, "Auto-rotate (deg/tick):", &mut motion.auto_rotate_speed, -0.5..=0.5);
    ui.label(
        egui::RichText::new("Higher sensitivity means slower rotation per pixel dragged.")
            .small()
            .weak(),
    );
    changed
}

fn layout_tab(ui: &mut egui::Ui, config: &mut GalleryConfig) -> bool {
    let layout = &mut config.layout;
    let mut changed = false;

    ui.horizontal(|ui| {
        ui.label("Fit basis:");
        egui::ComboBox::from_id_salt("fit_basis")
            .selected_text(layout.fit_basis.display_name())
            .show_ui(ui, |ui| {
                for &basis in FitBasis::all() {
                    changed |= ui
                        .selectable_value(&mut layout.fit_basis, basis, basis.display_name())
                        .changed();
                }
            });
    });
    changed |= slider_row(ui, "Fit:", &mut layout.fit, 0.1..=2.0);
    changed |= slider_row(ui, "Min radius (px):", &mut layout.min_radius, 100.0..=3000.0);

    let mut bounded = layout.max_radius.is_finite();
    ui.horizontal(|ui| {
        if ui.checkbox(&mut bounded, "Max radius (px):").changed() {
            layout.max_radius = if bounded { layout.min_radius.max(1200.0) } else { f64::INFINITY };
            changed = true;
        }
        if bounded {
            changed |= ui.add(egui::Slider::new(&mut layout.max_radius, 100.0..=5000.0)).changed();
        } else {
            ui.label("unbounded");
        }
    });
    changed |= slider_row(ui, "Padding factor:", &mut layout.pad_factor, 0.0..=1.0);
    changed |= slider_row(ui, "Segments:", &mut config.segments, 1..=60);
    changed
}

fn appearance_tab(ui: &mut egui::Ui, config: &mut GalleryConfig) -> bool {
    let style = &mut config.style;
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label("Overlay colour:");
        changed |= ui.text_edit_singleline(&mut style.overlay_blur_color).lost_focus();
    });
    changed |= slider_row(ui, "Corner radius (px):", &mut style.image_border_radius, 0.0..=80.0);
    changed |= ui.checkbox(&mut style.grayscale, "Grayscale").changed();
    changed
}
