//! "Add Sensor Data" modal

use crate::gui::app::GuiApp;
use crate::mock_fhe;
use crate::record::DataType;
use eframe::egui::{self, RichText};

/// Parse the value field; anything unparsable counts as no value
fn parse_value(text: &str) -> f64 {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite()).unwrap_or(0.0)
}

impl GuiApp {
    pub(crate) fn view_create_record(&mut self, ctx: &egui::Context) {
        if !self.create_form.open {
            return;
        }
        let theme = self.theme;
        let busy = self.tx_in_flight();
        let mut open = true;
        let mut submit = false;
        let mut cancel = false;

        egui::Window::new("Add Sensor Data")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .default_width(460.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                theme.frame_inset().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new("🔒 Mock FHE Encoding").strong().color(theme.warning));
                    ui.label(
                        RichText::new("The reading is encoded before it is written. This is a demonstration encoding, not real encryption.")
                            .small()
                            .color(theme.text_secondary),
                    );
                });
                ui.add_space(theme.spacing_sm);

                let form = &mut self.create_form;
                egui::Grid::new("create_record_form")
                    .num_columns(2)
                    .spacing([theme.spacing_md, theme.spacing_sm])
                    .show(ui, |ui| {
                        ui.label("Location *");
                        ui.add(
                            egui::TextEdit::singleline(&mut form.draft.location)
                                .hint_text("e.g. North field, plot 3")
                                .desired_width(280.0),
                        );
                        ui.end_row();

                        ui.label("Data Type *");
                        egui::ComboBox::from_id_source("create_data_type")
                            .selected_text(form.draft.data_type.label())
                            .width(280.0)
                            .show_ui(ui, |ui| {
                                for data_type in DataType::ALL {
                                    ui.selectable_value(&mut form.draft.data_type, data_type, data_type.label());
                                }
                            });
                        ui.end_row();

                        ui.label("Value *");
                        let response = ui.add(
                            egui::TextEdit::singleline(&mut form.value_text)
                                .hint_text("Sensor reading")
                                .desired_width(280.0),
                        );
                        if response.changed() {
                            form.draft.value = parse_value(&form.value_text);
                        }
                        ui.end_row();

                        ui.label("Notes");
                        ui.add(
                            egui::TextEdit::multiline(&mut form.draft.notes)
                                .desired_rows(3)
                                .desired_width(280.0),
                        );
                        ui.end_row();
                    });

                ui.add_space(theme.spacing_sm);
                theme.frame_inset().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.label(RichText::new("Encoding Preview").small().strong());
                    let value = form.draft.value;
                    if value == 0.0 {
                        ui.label(RichText::new("Plain value: No value entered").small().color(theme.text_secondary));
                    } else {
                        ui.label(RichText::new(format!("Plain value: {}", value)).small());
                    }
                    ui.monospace(mock_fhe::preview(value));
                });

                if let Some(err) = &form.error {
                    ui.add_space(theme.spacing_xs);
                    ui.colored_label(theme.error, err.as_str());
                }

                ui.add_space(theme.spacing_sm);
                ui.horizontal(|ui| {
                    if ui.add(theme.button_secondary("Cancel")).clicked() {
                        cancel = true;
                    }
                    let label = if busy { "Encoding..." } else { "Submit Securely" };
                    if ui.add_enabled(!busy, theme.button_primary(label)).clicked() {
                        submit = true;
                    }
                });
            });

        if !open || cancel {
            self.create_form.reset();
            return;
        }
        if submit {
            self.start_submit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("12.5"), 12.5);
        assert_eq!(parse_value("  -3 "), -3.0);
        assert_eq!(parse_value(""), 0.0);
        assert_eq!(parse_value("abc"), 0.0);
        assert_eq!(parse_value("inf"), 0.0);
    }
}
