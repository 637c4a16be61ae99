//! Record detail modal with the signature-gated reveal

use crate::gui::app::GuiApp;
use crate::gui::helpers::{data_type_icon, encrypted_preview, status_badge};
use crate::utils;
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn view_record_detail(&mut self, ctx: &egui::Context) {
        let theme = self.theme;
        let wallet_connected = self.wallet.is_some();
        let Some(detail) = &mut self.detail else {
            return;
        };

        let mut open = true;
        let mut close = false;
        let mut decrypt = false;

        egui::Window::new("Sensor Data Details")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .default_width(480.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                let record = &detail.record;
                egui::Grid::new("record_detail_grid")
                    .num_columns(2)
                    .spacing([theme.spacing_md, theme.spacing_sm])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Data Type").color(theme.text_secondary));
                        ui.label(format!("{} {}", data_type_icon(record.data_type), record.data_type.label()));
                        ui.end_row();

                        ui.label(RichText::new("Location").color(theme.text_secondary));
                        ui.label(record.location.as_str());
                        ui.end_row();

                        ui.label(RichText::new("Owner").color(theme.text_secondary));
                        ui.monospace(utils::short_address(&record.owner))
                            .on_hover_text(record.owner.as_str());
                        ui.end_row();

                        ui.label(RichText::new("Date").color(theme.text_secondary));
                        ui.label(utils::format_datetime(record.timestamp));
                        ui.end_row();

                        ui.label(RichText::new("Status").color(theme.text_secondary));
                        status_badge(ui, &theme, record.status);
                        ui.end_row();

                        if !record.notes.is_empty() {
                            ui.label(RichText::new("Notes").color(theme.text_secondary));
                            ui.label(record.notes.as_str());
                            ui.end_row();
                        }
                    });

                ui.add_space(theme.spacing_sm);
                ui.label(RichText::new("Encrypted Data").strong());
                theme.frame_inset().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    ui.add(egui::Label::new(RichText::new(encrypted_preview(&record.encrypted_data)).monospace()).wrap(true));
                });

                ui.add_space(theme.spacing_sm);
                if detail.job.is_some() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Waiting for signature...");
                    });
                } else if detail.decrypted.is_some() {
                    if ui.add(theme.button_secondary("Hide Decrypted Value")).clicked() {
                        detail.decrypted = None;
                    }
                } else if ui
                    .add_enabled(wallet_connected, theme.button_primary("Decrypt with Wallet Signature"))
                    .on_disabled_hover_text("Connect a wallet to sign the reveal")
                    .clicked()
                {
                    decrypt = true;
                }

                if let Some(value) = detail.decrypted {
                    ui.add_space(theme.spacing_sm);
                    theme.frame_card().show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new("Decrypted Value").small().color(theme.text_secondary));
                        ui.label(RichText::new(value.to_string()).size(24.0).strong().color(theme.leaf));
                        ui.label(
                            RichText::new("Decoded locally after your signature. The stored value stays encoded.")
                                .small()
                                .color(theme.text_secondary),
                        );
                    });
                }

                if let Some(err) = &detail.error {
                    ui.add_space(theme.spacing_xs);
                    ui.colored_label(theme.error, err.as_str());
                }

                ui.add_space(theme.spacing_sm);
                if ui.add(theme.button_secondary("Close")).clicked() {
                    close = true;
                }
            });

        if !open || close {
            self.detail = None;
        } else if decrypt {
            self.start_decrypt();
        }
    }
}
