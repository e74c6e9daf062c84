/// Light, rounded panels that sit quietly over a bright dome.
pub fn apply_domefit_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    let bg = egui::Color32::from_rgba_unmultiplied(250, 250, 252, 235);
    let accent = egui::Color32::from_rgb(38, 110, 200);
    let border = egui::Color32::from_rgb(200, 204, 214);
    let text_color = egui::Color32::from_rgb(30, 32, 40);

    style.visuals = egui::Visuals::light();
    style.visuals.window_fill = bg;
    style.visuals.panel_fill = bg;
    style.visuals.extreme_bg_color = egui::Color32::from_rgb(236, 238, 243);

    let rounding = egui::CornerRadius::same(6);
    style.visuals.window_corner_radius = egui::CornerRadius::same(10);
    style.visuals.menu_corner_radius = rounding;
    for w in [
        &mut style.visuals.widgets.noninteractive,
        &mut style.visuals.widgets.inactive,
        &mut style.visuals.widgets.hovered,
        &mut style.visuals.widgets.active,
        &mut style.visuals.widgets.open,
    ] {
        w.corner_radius = rounding;
        w.fg_stroke.color = text_color;
    }

    style.visuals.widgets.hovered.bg_fill = accent.gamma_multiply(0.2);
    style.visuals.widgets.active.bg_fill = accent.gamma_multiply(0.35);
    style.visuals.selection.bg_fill = accent.gamma_multiply(0.5);

    style.visuals.window_stroke = egui::Stroke::new(1.0, border);
    style.spacing.slider_width = 180.0;
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);

    ctx.set_style(style);
}
