//! Colors, spacing and styled widget factories.

use eframe::egui;

#[derive(Clone, Copy)]
pub struct AppTheme {
    pub background: egui::Color32,
    pub surface: egui::Color32,
    pub surface_hover: egui::Color32,
    pub surface_active: egui::Color32,
    pub panel_fill: egui::Color32,
    pub text_primary: egui::Color32,
    pub text_secondary: egui::Color32,

    pub primary: egui::Color32,
    pub secondary: egui::Color32,
    pub success: egui::Color32,
    pub warning: egui::Color32,
    pub error: egui::Color32,

    /// Soil brown used for the impact meter and type bars
    pub earth: egui::Color32,
    pub leaf: egui::Color32,
    pub sky: egui::Color32,

    pub spacing_xs: f32,
    pub spacing_sm: f32,
    pub spacing_md: f32,
    pub spacing_lg: f32,

    pub button_small: egui::Vec2,
    pub button_medium: egui::Vec2,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self {
            // Dark forest background with leaf-green accents
            background: egui::Color32::from_rgb(18, 24, 18),
            surface: egui::Color32::from_rgb(28, 38, 28),
            surface_hover: egui::Color32::from_rgb(38, 52, 38),
            surface_active: egui::Color32::from_rgb(48, 66, 48),
            panel_fill: egui::Color32::from_rgb(22, 30, 22),
            text_primary: egui::Color32::from_rgb(232, 240, 225),
            text_secondary: egui::Color32::from_rgb(160, 176, 150),

            primary: egui::Color32::from_rgb(76, 175, 80), // #4CAF50
            secondary: egui::Color32::from_rgb(70, 84, 64),
            success: egui::Color32::from_rgb(102, 187, 106),
            warning: egui::Color32::from_rgb(255, 193, 7),
            error: egui::Color32::from_rgb(229, 115, 115),

            earth: egui::Color32::from_rgb(141, 110, 99),
            leaf: egui::Color32::from_rgb(139, 195, 74),
            sky: egui::Color32::from_rgb(100, 181, 246),

            spacing_xs: 4.0,
            spacing_sm: 8.0,
            spacing_md: 16.0,
            spacing_lg: 24.0,

            button_small: egui::vec2(72.0, 26.0),
            button_medium: egui::vec2(140.0, 34.0),
        }
    }
}

impl AppTheme {
    pub fn button_primary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary).strong())
            .fill(self.primary.gamma_multiply(0.6))
            .stroke(egui::Stroke::new(1.5, self.primary))
            .rounding(8.0)
            .min_size(self.button_medium)
    }

    pub fn button_secondary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary))
            .fill(self.surface)
            .stroke(egui::Stroke::new(1.0, self.secondary))
            .rounding(8.0)
            .min_size(self.button_medium)
    }

    /// Compact row action, tinted by `color`
    pub fn button_action(&self, text: &str, color: egui::Color32) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary).small())
            .fill(color.gamma_multiply(0.35))
            .stroke(egui::Stroke::new(1.0, color))
            .rounding(6.0)
            .min_size(self.button_small)
    }

    /// Rounded card used for every dashboard block
    pub fn frame_card(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(self.panel_fill)
            .rounding(10.0)
            .inner_margin(self.spacing_md)
            .stroke(egui::Stroke::new(1.0, self.secondary))
    }

    pub fn frame_inset(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(self.surface)
            .rounding(6.0)
            .inner_margin(self.spacing_sm)
    }
}

pub fn configure_style(ctx: &egui::Context, theme: &AppTheme) {
    let mut visuals = egui::Visuals::dark();
    visuals.window_fill = theme.background;
    visuals.panel_fill = theme.panel_fill;
    visuals.override_text_color = Some(theme.text_primary);
    visuals.hyperlink_color = theme.sky;
    visuals.selection.bg_fill = theme.primary.gamma_multiply(0.5);

    visuals.widgets.noninteractive.bg_fill = theme.surface;
    visuals.widgets.inactive.bg_fill = theme.surface;
    visuals.widgets.hovered.bg_fill = theme.surface_hover;
    visuals.widgets.active.bg_fill = theme.surface_active;
    visuals.widgets.open.bg_fill = theme.surface_active;
    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, theme.secondary);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, theme.leaf);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(1.5, theme.primary);
    visuals.window_rounding = egui::Rounding::same(10.0);
    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.text_styles.insert(
        egui::TextStyle::Heading,
        egui::FontId::new(22.0, egui::FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Body,
        egui::FontId::new(14.0, egui::FontFamily::Proportional),
    );
    ctx.set_style(style);
}
