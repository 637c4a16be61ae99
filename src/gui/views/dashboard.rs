//! Dashboard view
//!
//! Intro, stat cards, type distribution, impact meter and the filterable
//! record list with owner review actions.

use crate::config;
use crate::gui::app::GuiApp;
use crate::gui::helpers::{data_type_icon, format_score, short_record_id, status_badge};
use crate::record::{DataType, RecordStatus, SensorRecord};
use crate::registry::ReviewDecision;
use crate::utils;
use eframe::egui::{self, RichText};

/// Row click or action chosen while drawing the list
enum RowAction {
    Open(SensorRecord),
    Review(String, ReviewDecision),
    ClearFilter,
}

impl GuiApp {
    pub(crate) fn view_dashboard(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;

        if self.user_settings.show_intro {
            self.render_intro(ui);
            ui.add_space(theme.spacing_lg);
        }

        ui.horizontal(|ui| {
            ui.heading("Farm Data Dashboard");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let refreshing = self.records_loader.is_loading();
                let label = if refreshing { "Refreshing..." } else { "Refresh Data" };
                if ui
                    .add_enabled(!refreshing && !self.tx_in_flight(), theme.button_secondary(label))
                    .clicked()
                {
                    self.refresh_records();
                }
            });
        });
        ui.add_space(theme.spacing_sm);

        if let Some(err) = &self.records_error {
            ui.colored_label(theme.error, format!("Error loading sensor data: {}", err));
            ui.add_space(theme.spacing_sm);
        }

        self.render_stat_cards(ui);
        ui.add_space(theme.spacing_md);

        ui.columns(2, |columns| {
            self.render_distribution(&mut columns[0]);
            self.render_impact_meter(&mut columns[1]);
        });

        if let Some(receipt) = self.last_tx.clone() {
            ui.add_space(theme.spacing_sm);
            self.render_last_tx(ui, &receipt.tx_hash, receipt.block_number);
        }

        ui.add_space(theme.spacing_lg);
        self.render_record_section(ui);
    }

    fn render_intro(&self, ui: &mut egui::Ui) {
        let theme = self.theme;
        theme.frame_card().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading("Regenerative Agriculture with Private Sensor Data");
            ui.add_space(theme.spacing_xs);
            ui.label(
                "A DePIN dashboard for regenerative agriculture. Field sensors report soil \
                 carbon, moisture, temperature and pH readings, which are stored on-chain \
                 behind an encoded value and reviewed by the farmer who submitted them.",
            );
            ui.label(
                RichText::new("Values use a mock FHE encoding for demonstration; it is reversible and not encryption.")
                    .small()
                    .color(theme.warning),
            );
            ui.add_space(theme.spacing_sm);
            ui.columns(3, |columns| {
                let cards = [
                    ("🌱", "Soil Data Collection", "Sensors collect soil carbon, moisture, and other metrics"),
                    ("🔒", "Encoded Values", "Readings are encoded before they are written to the contract"),
                    ("💰", "Environmental Assets", "Verified readings add up to an environmental score"),
                ];
                for (column, (icon, title, body)) in columns.iter_mut().zip(cards) {
                    theme.frame_inset().show(column, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(icon).size(24.0));
                        ui.label(RichText::new(title).strong());
                        ui.label(RichText::new(body).small().color(theme.text_secondary));
                    });
                }
            });
        });
    }

    fn render_stat_cards(&self, ui: &mut egui::Ui) {
        let theme = self.theme;
        let stats = &self.stats;
        let cards = [
            (stats.total.to_string(), "Total Readings", theme.text_primary),
            (stats.verified.to_string(), "Verified", theme.success),
            (stats.pending.to_string(), "Pending", theme.warning),
            (stats.rejected.to_string(), "Rejected", theme.error),
            (format_score(stats.environmental_score), "Environmental Score", theme.leaf),
        ];
        ui.columns(cards.len(), |columns| {
            for (column, (value, label, color)) in columns.iter_mut().zip(cards) {
                theme.frame_card().show(column, |ui| {
                    ui.set_width(ui.available_width());
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new(value).size(26.0).strong().color(color));
                        ui.label(RichText::new(label).small().color(theme.text_secondary));
                    });
                });
            }
        });
    }

    fn render_distribution(&self, ui: &mut egui::Ui) {
        let theme = self.theme;
        theme.frame_card().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Real-time Sensor Data").size(16.0).strong());
            ui.add_space(theme.spacing_xs);
            ui.label(RichText::new("Data Type Distribution").small().color(theme.text_secondary));
            ui.add_space(theme.spacing_sm);
            egui::Grid::new("type_distribution")
                .num_columns(3)
                .spacing([theme.spacing_sm, theme.spacing_xs])
                .show(ui, |ui| {
                    for data_type in DataType::ALL {
                        ui.label(format!("{} {}", data_type_icon(data_type), data_type.short_label()));
                        ui.add(
                            egui::ProgressBar::new(self.stats.type_share(data_type))
                                .desired_width(160.0)
                                .fill(theme.leaf),
                        );
                        ui.label(self.stats.type_count(data_type).to_string());
                        ui.end_row();
                    }
                });
        });
    }

    fn render_impact_meter(&self, ui: &mut egui::Ui) {
        let theme = self.theme;
        theme.frame_card().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new("Environmental Impact").size(16.0).strong());
            ui.add_space(theme.spacing_sm);
            ui.add(
                egui::ProgressBar::new(self.stats.impact_fill())
                    .fill(theme.earth)
                    .text(format!("{} Carbon Units", format_score(self.stats.environmental_score))),
            );
            ui.add_space(theme.spacing_sm);
            ui.label(
                RichText::new(
                    "Verified environmental contributions could back sustainability rewards or be used as DeFi collateral.",
                )
                .small()
                .color(theme.text_secondary),
            );
        });
    }

    fn render_last_tx(&mut self, ui: &mut egui::Ui, tx_hash: &str, block: Option<u64>) {
        let theme = self.theme;
        ui.horizontal(|ui| {
            ui.label(RichText::new("Last transaction:").small().color(theme.text_secondary));
            ui.monospace(utils::short_address(tx_hash));
            if let Some(block) = block {
                ui.label(RichText::new(format!("block {}", block)).small().color(theme.text_secondary));
            }
            if self.config.demo_mode {
                return;
            }
            if let Some(url) = config::get_tx_explorer_url(self.config.chain_id, tx_hash) {
                if ui.link("View in explorer").clicked() {
                    self.open_url(&url);
                }
            }
        });
    }

    fn render_record_section(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;

        ui.horizontal(|ui| {
            ui.heading("Sensor Data Records");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!self.records.is_empty(), theme.button_secondary("Export CSV"))
                    .clicked()
                {
                    self.export_csv();
                }
                egui::ComboBox::from_id_source("status_filter")
                    .selected_text(self.filter.status.map(|s| s.label()).unwrap_or("All Statuses"))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.filter.status, None, "All Statuses");
                        for status in RecordStatus::ALL {
                            ui.selectable_value(&mut self.filter.status, Some(status), status.label());
                        }
                    });
                egui::ComboBox::from_id_source("type_filter")
                    .selected_text(self.filter.data_type.map(|t| t.label()).unwrap_or("All Types"))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut self.filter.data_type, None, "All Types");
                        for data_type in DataType::ALL {
                            ui.selectable_value(&mut self.filter.data_type, Some(data_type), data_type.label());
                        }
                    });
            });
        });
        ui.add_space(theme.spacing_sm);

        let mut action = None;
        theme.frame_card().show(ui, |ui| {
            ui.set_width(ui.available_width());

            if self.records.is_empty() {
                ui.vertical_centered(|ui| {
                    ui.add_space(theme.spacing_md);
                    ui.label(RichText::new("🌾").size(36.0));
                    ui.label("No sensor data found");
                    ui.add_space(theme.spacing_sm);
                    if ui
                        .add_enabled(!self.tx_in_flight(), theme.button_primary("Submit First Reading"))
                        .clicked()
                    {
                        self.create_form.open = true;
                    }
                    ui.add_space(theme.spacing_md);
                });
                return;
            }

            let viewer = self.wallet_address();
            let busy = self.tx_in_flight();
            let visible = self.filtered_records();
            if visible.is_empty() {
                ui.label(RichText::new("No records match the selected filters").color(theme.text_secondary));
                if self.filter.is_active() && ui.small_button("Clear filters").clicked() {
                    action = Some(RowAction::ClearFilter);
                }
                return;
            }

            egui::Grid::new("record_list")
                .num_columns(6)
                .striped(true)
                .spacing([theme.spacing_md, theme.spacing_sm])
                .show(ui, |ui| {
                    for header in ["ID", "Type", "Location", "Date", "Status", "Actions"] {
                        ui.label(RichText::new(header).small().strong().color(theme.text_secondary));
                    }
                    ui.end_row();

                    for record in visible {
                        if ui
                            .link(short_record_id(&record.id))
                            .on_hover_text("Show details")
                            .clicked()
                        {
                            action = Some(RowAction::Open(record.clone()));
                        }
                        ui.label(record.data_type.short_label());
                        ui.label(record.location.as_str());
                        ui.label(utils::format_date(record.timestamp));
                        status_badge(ui, &theme, record.status);
                        ui.horizontal(|ui| {
                            if record.can_review(viewer.as_deref()) {
                                if ui
                                    .add_enabled(!busy, theme.button_action("Verify", theme.success))
                                    .clicked()
                                {
                                    action = Some(RowAction::Review(record.id.clone(), ReviewDecision::Verify));
                                }
                                if ui
                                    .add_enabled(!busy, theme.button_action("Reject", theme.error))
                                    .clicked()
                                {
                                    action = Some(RowAction::Review(record.id.clone(), ReviewDecision::Reject));
                                }
                            }
                        });
                        ui.end_row();
                    }
                });
        });

        match action {
            Some(RowAction::Open(record)) => self.open_detail(record),
            Some(RowAction::Review(id, decision)) => self.start_review(&id, decision),
            Some(RowAction::ClearFilter) => self.filter = Default::default(),
            None => {}
        }
    }
}
