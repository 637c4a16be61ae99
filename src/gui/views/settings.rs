//! Settings view implementation
//!
//! Contains the settings panel rendering including:
//! - Network & RPC configuration
//! - Sensor contract address
//! - Signer selection (local key or Ledger)
//! - Operation log viewer

use crate::config::{self, SignerKind};
use crate::gui::app::GuiApp;
use crate::operation_log;
use crate::user_settings::UserSettings;
use eframe::egui::{self, RichText};

impl GuiApp {
    /// Render the settings view
    pub(crate) fn view_settings(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;
        ui.heading("Settings");
        ui.add_space(theme.spacing_md);

        // Network & RPC
        theme.frame_card().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Network & RPC").size(17.0).strong());
            ui.add_space(theme.spacing_sm);

            let selected_text = config::find_network_by_chain_id(self.settings_form.chain_id)
                .map(|n| n.label.to_string())
                .unwrap_or_else(|| format!("Chain {}", self.settings_form.chain_id));

            egui::Grid::new("network_settings")
                .num_columns(2)
                .spacing([theme.spacing_md, theme.spacing_sm])
                .show(ui, |ui| {
                    ui.label("Network");
                    egui::ComboBox::from_id_source("settings_network")
                        .selected_text(selected_text)
                        .width(260.0)
                        .show_ui(ui, |ui| {
                            for network in config::NETWORKS.iter() {
                                let label = format!("{} (#{})", network.label, network.chain_id);
                                if ui
                                    .selectable_label(network.chain_id == self.settings_form.chain_id, label)
                                    .clicked()
                                    && network.chain_id != self.settings_form.chain_id
                                {
                                    // Per-chain values follow the selected network
                                    let chain_id = network.chain_id;
                                    self.settings_form.chain_id = chain_id;
                                    self.settings_form.rpc_url =
                                        self.user_settings.get_custom_rpc(chain_id).cloned().unwrap_or_default();
                                    self.settings_form.contract_address = self
                                        .user_settings
                                        .get_contract_address(chain_id)
                                        .cloned()
                                        .unwrap_or_default();
                                }
                            }
                        });
                    ui.end_row();

                    ui.label("Custom RPC");
                    let default_rpc = config::find_network_by_chain_id(self.settings_form.chain_id)
                        .map(|n| n.default_rpc)
                        .unwrap_or("");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.settings_form.rpc_url)
                            .hint_text(default_rpc)
                            .desired_width(360.0),
                    );
                    ui.end_row();

                    ui.label("Contract address");
                    ui.add(
                        egui::TextEdit::singleline(&mut self.settings_form.contract_address)
                            .hint_text("0x...")
                            .font(egui::TextStyle::Monospace)
                            .desired_width(360.0),
                    );
                    ui.end_row();
                });

            ui.add_space(theme.spacing_sm);
            ui.horizontal(|ui| {
                let checking = self.rpc_status_job.is_some();
                let label = if checking { "Checking..." } else { "Check RPC" };
                if ui.add_enabled(!checking, theme.button_secondary(label)).clicked() {
                    self.start_rpc_check();
                }
                ui.label(
                    RichText::new(format!("Active: {}", self.config.rpc_url))
                        .small()
                        .color(theme.text_secondary),
                );
                if let Some(latency) = self.rpc_latency_ms {
                    ui.colored_label(theme.success, format!("● {} ms", latency));
                } else if let Some(err) = &self.rpc_error {
                    ui.colored_label(theme.error, "● unreachable").on_hover_text(err.as_str());
                }
            });
        });
        ui.add_space(theme.spacing_md);

        // Signer
        theme.frame_card().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Signer").size(17.0).strong());
            ui.add_space(theme.spacing_sm);

            ui.horizontal(|ui| {
                for kind in [SignerKind::LocalKey, SignerKind::Ledger] {
                    ui.radio_value(&mut self.settings_form.signer_kind, kind, kind.display_name());
                }
            });

            match self.settings_form.signer_kind {
                SignerKind::LocalKey => {
                    let text = if self.config.private_key.is_some() {
                        "Using the key from PRIVATE_KEY."
                    } else {
                        "Set PRIVATE_KEY in the environment or .env file. Demo mode generates a throwaway key."
                    };
                    ui.label(RichText::new(text).small().color(theme.text_secondary));
                }
                SignerKind::Ledger => {
                    ui.horizontal(|ui| {
                        ui.label("Account index");
                        ui.add(egui::DragValue::new(&mut self.settings_form.ledger_index).clamp_range(0..=99));
                        ui.label(
                            RichText::new(format!("m/44'/60'/{}'/0/0", self.settings_form.ledger_index))
                                .monospace()
                                .color(theme.text_secondary),
                        );
                    });
                    ui.label(
                        RichText::new("Unlock the device and open the Ethereum app before connecting.")
                            .small()
                            .color(theme.text_secondary),
                    );
                }
            }

            ui.add_space(theme.spacing_sm);
            ui.checkbox(&mut self.settings_form.demo_mode, "Demo mode")
                .on_hover_text("Keep records in memory instead of a deployed contract");
        });
        ui.add_space(theme.spacing_md);

        ui.horizontal(|ui| {
            if ui.add(theme.button_primary("Save & Apply")).clicked() {
                self.apply_settings_form();
            }
            if ui.add(theme.button_secondary("Discard")).clicked() {
                self.settings_form = crate::gui::app::SettingsFormState::from_settings(&self.user_settings);
            }
            if let Some(err) = &self.settings_form.error {
                ui.colored_label(theme.error, err.as_str());
            }
        });
        ui.add_space(theme.spacing_md);

        // Files and operation log
        theme.frame_card().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new("Operation Log").size(17.0).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let loading = self.log_view.job.is_some();
                    if ui.add_enabled(!loading, theme.button_secondary("Refresh")).clicked() {
                        self.refresh_logs();
                    }
                });
            });
            ui.label(
                RichText::new(format!("Settings: {}", UserSettings::settings_path_display()))
                    .small()
                    .color(theme.text_secondary),
            );
            ui.label(
                RichText::new(format!("Log: {}", operation_log::log_file_path()))
                    .small()
                    .color(theme.text_secondary),
            );
            ui.add_space(theme.spacing_sm);

            if let Some(err) = &self.log_view.error {
                ui.colored_label(theme.error, err.as_str());
            }
            theme.frame_inset().show(ui, |ui| {
                ui.set_width(ui.available_width());
                egui::ScrollArea::vertical()
                    .id_source("operation_log_scroll")
                    .max_height(260.0)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        ui.label(RichText::new(self.log_view.content.as_str()).monospace().small());
                    });
            });
        });
    }
}
