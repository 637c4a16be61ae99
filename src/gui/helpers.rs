//! Small formatting and color helpers shared by the views.

use super::theme::AppTheme;
use crate::record::{DataType, RecordStatus};
use eframe::egui;

/// Characters of the encoded value shown in the detail modal
pub const ENCRYPTED_PREVIEW_LEN: usize = 100;

pub fn status_color(theme: &AppTheme, status: RecordStatus) -> egui::Color32 {
    match status {
        RecordStatus::Pending => theme.warning,
        RecordStatus::Verified => theme.success,
        RecordStatus::Rejected => theme.error,
    }
}

pub fn data_type_icon(data_type: DataType) -> &'static str {
    match data_type {
        DataType::SoilCarbon => "🌱",
        DataType::Moisture => "💧",
        DataType::Temperature => "🌡",
        DataType::PhLevel => "⚗",
    }
}

/// `#` plus the first six characters of a record id
pub fn short_record_id(id: &str) -> String {
    let head: String = id.chars().take(6).collect();
    format!("#{}", head)
}

/// Leading part of an encoded value followed by an ellipsis
pub fn encrypted_preview(encoded: &str) -> String {
    let head: String = encoded.chars().take(ENCRYPTED_PREVIEW_LEN).collect();
    format!("{}...", head)
}

/// Score with two decimals, as on the stat cards
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

pub fn status_badge(ui: &mut egui::Ui, theme: &AppTheme, status: RecordStatus) {
    let color = status_color(theme, status);
    egui::Frame::none()
        .fill(color.gamma_multiply(0.25))
        .rounding(8.0)
        .inner_margin(egui::Margin::symmetric(8.0, 2.0))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(status.as_str()).small().color(color));
        });
}
