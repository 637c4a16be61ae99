//! Main GUI application module
//!
//! Holds `GuiApp`, its background jobs and the top-level layout. The views
//! under `views/` add `impl GuiApp` blocks for each screen.

use crate::{
    config::{self, Config, SignerKind},
    contract::{ContractStore, KvStore, MemoryStore, TxReceiptInfo},
    operation_log,
    record::{RecordDraft, SensorRecord},
    registry::{self, RecordWrite, ReviewDecision},
    stats::{DashboardStats, RecordFilter},
    user_settings::UserSettings,
    utils,
    wallet::{self, DecryptAuthorization, WalletSession},
};
use anyhow::{anyhow, Result};
use eframe::{egui, egui::RichText, App, Frame, NativeOptions};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::async_job::{spawn_job, AsyncJob};
use super::notifications::{push_notification, BannerStatus, NotificationEntry, TransactionBanner};
use super::theme::{configure_style, AppTheme};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuiSection {
    Dashboard,
    Settings,
}

/// The write a transaction job performs
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxAction {
    Submit,
    Review { id: String, decision: ReviewDecision },
}

impl TxAction {
    pub fn pending_message(&self) -> &'static str {
        match self {
            TxAction::Submit => "Encoding soil data with mock FHE...",
            TxAction::Review { .. } => "Processing encoded soil data with mock FHE...",
        }
    }

    pub fn success_message(&self) -> &'static str {
        match self {
            TxAction::Submit => "Soil data encoded and submitted!",
            TxAction::Review {
                decision: ReviewDecision::Verify,
                ..
            } => "Mock FHE verification completed successfully!",
            TxAction::Review {
                decision: ReviewDecision::Reject,
                ..
            } => "Mock FHE rejection completed successfully!",
        }
    }

    /// Prefix for "<Action> failed: ..." banners
    pub fn action_label(&self) -> &'static str {
        match self {
            TxAction::Submit => "Submission",
            TxAction::Review { decision, .. } => decision.action_label(),
        }
    }

    fn log_name(&self) -> &'static str {
        match self {
            TxAction::Submit => "Submit Sensor Record",
            TxAction::Review {
                decision: ReviewDecision::Verify,
                ..
            } => "Verify Sensor Record",
            TxAction::Review {
                decision: ReviewDecision::Reject,
                ..
            } => "Reject Sensor Record",
        }
    }
}

/// Where jobs read and write records. Opened inside each job.
#[derive(Clone)]
pub(crate) enum StoreHandle {
    Memory(MemoryStore),
    Contract {
        config: Config,
        session: Option<WalletSession>,
    },
}

impl StoreHandle {
    pub(crate) async fn open(self) -> Result<Box<dyn KvStore>> {
        match self {
            StoreHandle::Memory(store) => Ok(Box::new(store)),
            StoreHandle::Contract { config, session } => {
                Ok(Box::new(ContractStore::from_config(&config, session).await?))
            }
        }
    }
}

pub(crate) struct CreateRecordState {
    pub(crate) open: bool,
    pub(crate) draft: RecordDraft,
    /// Raw text of the value field; parsed on every edit
    pub(crate) value_text: String,
    pub(crate) error: Option<String>,
}

impl Default for CreateRecordState {
    fn default() -> Self {
        Self {
            open: false,
            draft: RecordDraft::default(),
            value_text: String::new(),
            error: None,
        }
    }
}

impl CreateRecordState {
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

pub(crate) struct RecordDetailState {
    pub(crate) record: SensorRecord,
    pub(crate) decrypted: Option<f64>,
    pub(crate) job: Option<AsyncJob<f64>>,
    pub(crate) error: Option<String>,
}

impl RecordDetailState {
    pub(crate) fn new(record: SensorRecord) -> Self {
        Self {
            record,
            decrypted: None,
            job: None,
            error: None,
        }
    }
}

/// Editable copy of the settings, applied on save
pub(crate) struct SettingsFormState {
    pub(crate) chain_id: u64,
    pub(crate) rpc_url: String,
    pub(crate) contract_address: String,
    pub(crate) signer_kind: SignerKind,
    pub(crate) ledger_index: u32,
    pub(crate) demo_mode: bool,
    pub(crate) error: Option<String>,
}

impl SettingsFormState {
    pub(crate) fn from_settings(settings: &UserSettings) -> Self {
        let chain_id = settings.selected_chain_id;
        Self {
            chain_id,
            rpc_url: settings.get_custom_rpc(chain_id).cloned().unwrap_or_default(),
            contract_address: settings.get_contract_address(chain_id).cloned().unwrap_or_default(),
            signer_kind: settings.signer_kind,
            ledger_index: settings.ledger_index,
            demo_mode: settings.demo_mode,
            error: None,
        }
    }

    /// `base` with the form's values applied; fails on an invalid contract address
    pub(crate) fn to_settings(&self, base: &UserSettings) -> Result<UserSettings> {
        let mut settings = base.clone();
        settings.selected_chain_id = self.chain_id;
        settings.set_custom_rpc(self.chain_id, self.rpc_url.clone());
        settings.set_contract_address(self.chain_id, &self.contract_address)?;
        settings.signer_kind = self.signer_kind;
        settings.ledger_index = self.ledger_index;
        settings.demo_mode = self.demo_mode;
        Ok(settings)
    }
}

fn load_job(handle: StoreHandle) -> AsyncJob<Vec<SensorRecord>> {
    spawn_job(move || async move {
        let store = handle.open().await?;
        tracing::debug!("Loading records from {}", store.describe());
        Ok(registry::load_records(store.as_ref()).await?)
    })
}

pub(crate) enum LoadOutcome {
    Current(Result<Vec<SensorRecord>>),
    /// Finished, but a reload was requested meanwhile; the caller reloads
    Stale,
}

/// The record list load. A reload requested while a load runs is queued,
/// and the running load's result is dropped since it may predate a write.
#[derive(Default)]
pub(crate) struct RecordsLoader {
    job: Option<AsyncJob<Vec<SensorRecord>>>,
    reload_requested: bool,
}

impl RecordsLoader {
    pub(crate) fn is_loading(&self) -> bool {
        self.job.is_some()
    }

    pub(crate) fn request(&mut self, handle: StoreHandle) {
        if self.job.is_some() {
            self.reload_requested = true;
            return;
        }
        self.job = Some(load_job(handle));
    }

    pub(crate) fn poll(&mut self) -> Option<LoadOutcome> {
        let res = self.job.as_mut()?.poll()?;
        self.job = None;
        if self.reload_requested {
            self.reload_requested = false;
            tracing::debug!("Discarding stale record load");
            return Some(LoadOutcome::Stale);
        }
        Some(LoadOutcome::Current(res))
    }
}

#[derive(Default)]
pub(crate) struct LogViewState {
    pub(crate) content: String,
    pub(crate) job: Option<AsyncJob<String>>,
    pub(crate) error: Option<String>,
}

pub struct GuiApp {
    pub(crate) config: Config,
    pub(crate) user_settings: UserSettings,
    pub(crate) theme: AppTheme,
    pub(crate) section: GuiSection,
    pub(crate) notifications: VecDeque<NotificationEntry>,
    pub(crate) show_notifications_popup: bool,
    pub(crate) banner: TransactionBanner,
    /// Shared by every demo-mode job so records survive between them
    pub(crate) demo_store: MemoryStore,
    // Wallet
    pub(crate) wallet: Option<WalletSession>,
    pub(crate) wallet_job: Option<AsyncJob<WalletSession>>,
    pub(crate) wallet_error: Option<String>,
    // Records
    pub(crate) records: Vec<SensorRecord>,
    pub(crate) stats: DashboardStats,
    pub(crate) records_loader: RecordsLoader,
    pub(crate) records_error: Option<String>,
    pub(crate) filter: RecordFilter,
    // Writes; at most one in flight
    pub(crate) tx_job: Option<(TxAction, AsyncJob<RecordWrite>)>,
    pub(crate) last_tx: Option<TxReceiptInfo>,
    // Modals
    pub(crate) create_form: CreateRecordState,
    pub(crate) detail: Option<RecordDetailState>,
    // Settings page
    pub(crate) settings_form: SettingsFormState,
    pub(crate) rpc_latency_ms: Option<u64>,
    pub(crate) rpc_status_job: Option<AsyncJob<u64>>,
    pub(crate) rpc_error: Option<String>,
    pub(crate) log_view: LogViewState,
}

impl GuiApp {
    fn new(config: Config, user_settings: UserSettings, ctx: &egui::Context) -> Self {
        let theme = AppTheme::default();
        configure_style(ctx, &theme);

        let settings_form = SettingsFormState::from_settings(&user_settings);
        let mut app = Self {
            config,
            user_settings,
            theme,
            section: GuiSection::Dashboard,
            notifications: VecDeque::with_capacity(20),
            show_notifications_popup: false,
            banner: TransactionBanner::default(),
            demo_store: MemoryStore::new(),
            wallet: None,
            wallet_job: None,
            wallet_error: None,
            records: Vec::new(),
            stats: DashboardStats::default(),
            records_loader: RecordsLoader::default(),
            records_error: None,
            filter: RecordFilter::default(),
            tx_job: None,
            last_tx: None,
            create_form: CreateRecordState::default(),
            detail: None,
            settings_form,
            rpc_latency_ms: None,
            rpc_status_job: None,
            rpc_error: None,
            log_view: LogViewState::default(),
        };

        // A local key can connect without user interaction; a Ledger waits for a click
        if app.config.signer_kind == SignerKind::LocalKey
            && (app.config.private_key.is_some() || app.config.demo_mode)
        {
            app.start_wallet_connect();
        }
        app.refresh_records();
        app
    }

    pub(crate) fn store_handle(&self) -> StoreHandle {
        if self.config.demo_mode {
            StoreHandle::Memory(self.demo_store.clone())
        } else {
            StoreHandle::Contract {
                config: self.config.clone(),
                session: self.wallet.clone(),
            }
        }
    }

    pub(crate) fn wallet_address(&self) -> Option<String> {
        self.wallet.as_ref().map(|w| w.address_string())
    }

    pub(crate) fn tx_in_flight(&self) -> bool {
        self.tx_job.is_some()
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>) {
        push_notification(&mut self.notifications, message);
    }

    /// Records visible under the current filter
    pub(crate) fn filtered_records(&self) -> Vec<&SensorRecord> {
        self.filter.apply(&self.records)
    }

    pub(crate) fn start_wallet_connect(&mut self) {
        if self.wallet_job.is_some() {
            return;
        }
        let config = self.config.clone();
        self.wallet_error = None;
        self.wallet_job = Some(spawn_job(move || async move { wallet::connect(&config).await }));
    }

    pub(crate) fn disconnect_wallet(&mut self) {
        if let Some(session) = self.wallet.take() {
            self.notify(format!("Disconnected {}", utils::short_address(&session.address_string())));
        }
    }

    pub(crate) fn refresh_records(&mut self) {
        let handle = self.store_handle();
        self.records_loader.request(handle);
    }

    /// Validate the create form locally, then send it
    pub(crate) fn start_submit(&mut self) {
        if self.tx_in_flight() {
            return;
        }
        if let Err(e) = self.create_form.draft.validate() {
            self.create_form.error = Some(e.to_string());
            return;
        }
        let Some(owner) = self.wallet_address() else {
            self.create_form.error = Some(registry::RegistryError::WalletNotConnected.to_string());
            return;
        };
        self.create_form.error = None;

        let handle = self.store_handle();
        let draft = self.create_form.draft.clone();
        let job = spawn_job(move || async move {
            let store = handle.open().await?;
            Ok(registry::submit_record(store.as_ref(), Some(&owner), &draft, chrono::Utc::now()).await?)
        });
        self.begin_tx(TxAction::Submit, job);
    }

    pub(crate) fn start_review(&mut self, id: &str, decision: ReviewDecision) {
        if self.tx_in_flight() {
            return;
        }
        let Some(caller) = self.wallet_address() else {
            self.fail_action(decision.action_label(), &registry::RegistryError::WalletNotConnected.to_string());
            return;
        };

        let handle = self.store_handle();
        let record_id = id.to_string();
        let job = spawn_job(move || async move {
            let store = handle.open().await?;
            Ok(registry::review_record(store.as_ref(), Some(&caller), &record_id, decision).await?)
        });
        self.begin_tx(
            TxAction::Review {
                id: id.to_string(),
                decision,
            },
            job,
        );
    }

    fn begin_tx(&mut self, action: TxAction, job: AsyncJob<RecordWrite>) {
        match &action {
            TxAction::Submit => tracing::info!("Submission started"),
            TxAction::Review { id, .. } => tracing::info!("{} of record {} started", action.action_label(), id),
        }
        self.banner.pending(action.pending_message());
        self.tx_job = Some((action, job));
    }

    fn fail_action(&mut self, action_label: &str, message: &str) {
        let text = utils::friendly_error(action_label, message);
        tracing::warn!("{}", text);
        self.banner.error(text.clone(), Instant::now());
        self.notify(text);
    }

    /// Sign the decrypt authorization for the open detail, then reveal
    pub(crate) fn start_decrypt(&mut self) {
        let Some(session) = self.wallet.clone() else {
            if let Some(detail) = &mut self.detail {
                detail.error = Some(registry::RegistryError::WalletNotConnected.to_string());
            }
            return;
        };
        let config = self.config.clone();
        let Some(detail) = &mut self.detail else {
            return;
        };
        if detail.job.is_some() {
            return;
        }
        detail.error = None;
        let encrypted = detail.record.encrypted_data.clone();
        detail.job = Some(spawn_job(move || async move {
            let auth = DecryptAuthorization::new(&config, chrono::Utc::now().timestamp());
            let delay = Duration::from_millis(config.reveal_delay_ms);
            wallet::decrypt_with_signature(&session, &auth, &encrypted, delay).await
        }));
    }

    pub(crate) fn open_detail(&mut self, record: SensorRecord) {
        self.detail = Some(RecordDetailState::new(record));
    }

    pub(crate) fn start_rpc_check(&mut self) {
        if self.rpc_status_job.is_some() {
            return;
        }
        let config = self.config.clone();
        self.rpc_error = None;
        self.rpc_status_job = Some(spawn_job(move || async move {
            use ethers::providers::Middleware;
            let start = Instant::now();
            let provider = config.get_provider().await?;
            provider.get_block_number().await?;
            Ok(start.elapsed().as_millis() as u64)
        }));
    }

    pub(crate) fn refresh_logs(&mut self) {
        if self.log_view.job.is_none() {
            self.log_view.job = Some(spawn_job(|| async move {
                match operation_log::read_log() {
                    Ok(content) if content.is_empty() => Ok("No operations logged yet.".to_string()),
                    Ok(content) => Ok(content),
                    Err(e) => Err(anyhow!("Failed to read log file: {}", e)),
                }
            }));
        }
    }

    /// Persist the settings form and rebuild config, wallet and store
    pub(crate) fn apply_settings_form(&mut self) {
        let settings = match self.settings_form.to_settings(&self.user_settings) {
            Ok(settings) => settings,
            Err(e) => {
                self.settings_form.error = Some(e.to_string());
                return;
            }
        };

        if let Err(e) = settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
            self.notify(format!("Failed to save settings: {}", e));
        }

        let config = Config::from_settings_and_env(&settings);

        let wallet_changed = config.signer_kind != self.config.signer_kind
            || config.ledger_index != self.config.ledger_index
            || config.chain_id != self.config.chain_id
            || config.demo_mode != self.config.demo_mode;

        self.user_settings = settings;
        self.config = config;
        self.settings_form.error = None;
        self.rpc_latency_ms = None;
        self.records.clear();
        self.stats = DashboardStats::default();
        self.detail = None;
        self.last_tx = None;

        if wallet_changed {
            self.wallet = None;
            if self.config.signer_kind == SignerKind::LocalKey
                && (self.config.private_key.is_some() || self.config.demo_mode)
            {
                self.start_wallet_connect();
            }
        }
        let label = self.config.network_label().to_string();
        self.notify(format!("Settings saved, using {}", label));
        self.refresh_records();
    }

    pub(crate) fn set_show_intro(&mut self, show: bool) {
        self.user_settings.show_intro = show;
        if let Err(e) = self.user_settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    pub(crate) fn export_csv(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("sensor_records.csv")
            .add_filter("CSV", &["csv"])
            .save_file()
        else {
            return;
        };
        let (count, result) = {
            let records = self.filtered_records();
            (records.len(), crate::export::export_records_csv(&path, &records))
        };
        match result {
            Ok(()) => {
                operation_log::record(
                    "Export Sensor Records",
                    self.config.chain_id,
                    format!("Exported {} records to {}", count, path.display()),
                );
                self.notify(format!("Exported {} records", count));
            }
            Err(e) => self.notify(format!("Export failed: {}", e)),
        }
    }

    pub(crate) fn open_url(&mut self, url: &str) {
        if let Err(e) = open::that(url) {
            self.notify(format!("Failed to open URL: {}", e));
        }
    }

    fn poll_jobs(&mut self) {
        if let Some(job) = &mut self.wallet_job {
            if let Some(res) = job.poll() {
                self.wallet_job = None;
                match res {
                    Ok(session) => {
                        let address = session.address_string();
                        self.notify(format!(
                            "Connected {} ({})",
                            utils::short_address(&address),
                            session.signer_label()
                        ));
                        self.wallet = Some(session);
                    }
                    Err(e) => {
                        tracing::warn!("Wallet connection failed: {}", e);
                        self.wallet_error = Some(e.to_string());
                        self.notify(format!("Wallet connection failed: {}", e));
                    }
                }
            }
        }

        match self.records_loader.poll() {
            Some(LoadOutcome::Current(Ok(records))) => {
                self.stats = DashboardStats::from_records(&records);
                // Keep an open detail in sync with the reloaded record
                if let Some(detail) = &mut self.detail {
                    if let Some(fresh) = records.iter().find(|r| r.id == detail.record.id) {
                        if fresh.encrypted_data != detail.record.encrypted_data {
                            detail.decrypted = None;
                        }
                        detail.record = fresh.clone();
                    }
                }
                self.records = records;
                self.records_error = None;
            }
            Some(LoadOutcome::Current(Err(e))) => {
                tracing::warn!("Error loading sensor data: {}", e);
                self.records_error = Some(e.to_string());
            }
            Some(LoadOutcome::Stale) => self.refresh_records(),
            None => {}
        }

        let finished = match &mut self.tx_job {
            Some((action, job)) => job.poll().map(|res| (action.clone(), res)),
            None => None,
        };
        if let Some((action, res)) = finished {
            self.tx_job = None;
            self.finish_tx(action, res);
        }

        if let Some(detail) = &mut self.detail {
            if let Some(job) = &mut detail.job {
                if let Some(res) = job.poll() {
                    detail.job = None;
                    match res {
                        Ok(value) => {
                            detail.decrypted = Some(value);
                            operation_log::record(
                                "Decrypt Sensor Value",
                                self.config.chain_id,
                                format!("Record {} revealed after signature", detail.record.id),
                            );
                        }
                        Err(e) => {
                            tracing::warn!("Decryption failed: {}", e);
                            detail.error = Some(utils::friendly_error("Decryption", &e.to_string()));
                        }
                    }
                }
            }
        }

        if let Some(job) = &mut self.rpc_status_job {
            if let Some(res) = job.poll() {
                self.rpc_status_job = None;
                match res {
                    Ok(latency) => self.rpc_latency_ms = Some(latency),
                    Err(e) => {
                        self.rpc_latency_ms = None;
                        self.rpc_error = Some(e.to_string());
                    }
                }
            }
        }

        if let Some(job) = &mut self.log_view.job {
            if let Some(res) = job.poll() {
                self.log_view.job = None;
                match res {
                    Ok(content) => {
                        self.log_view.content = content;
                        self.log_view.error = None;
                    }
                    Err(e) => self.log_view.error = Some(e.to_string()),
                }
            }
        }
    }

    fn finish_tx(&mut self, action: TxAction, res: Result<RecordWrite>) {
        match res {
            Ok(write) => {
                tracing::info!("{} confirmed: {}", action.action_label(), write.receipt.tx_hash);
                let details = format!(
                    "Record: {}\nStatus: {}\nLocation: {}\nTx: {}",
                    write.record.id,
                    write.record.status.as_str(),
                    write.record.location,
                    write.receipt.tx_hash
                );
                operation_log::record(action.log_name(), self.config.chain_id, details);
                self.banner.success(action.success_message(), Instant::now());
                self.notify(action.success_message());
                if action == TxAction::Submit {
                    self.create_form.reset();
                }
                if let Some(detail) = &mut self.detail {
                    if detail.record.id == write.record.id {
                        detail.record = write.record.clone();
                        detail.decrypted = None;
                    }
                }
                self.last_tx = Some(write.receipt);
                self.refresh_records();
            }
            Err(e) => self.fail_action(action.action_label(), &e.to_string()),
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let theme = self.theme;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(theme.spacing_sm);
            ui.horizontal(|ui| {
                ui.label(RichText::new("◆").size(24.0).color(theme.primary));
                ui.label(RichText::new("Regen").size(24.0).strong().color(theme.text_primary));
                ui.label(RichText::new("Agri").size(24.0).strong().color(theme.leaf));
                ui.label(
                    RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                        .small()
                        .color(theme.text_secondary),
                );
                if self.config.demo_mode {
                    ui.label(RichText::new("DEMO").small().strong().color(theme.warning))
                        .on_hover_text("Records are kept in memory only");
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_wallet_button(ui);

                    let intro_label = if self.user_settings.show_intro { "Hide Intro" } else { "Show Intro" };
                    if ui.add(theme.button_secondary(intro_label)).clicked() {
                        let show = !self.user_settings.show_intro;
                        self.set_show_intro(show);
                    }
                    if ui
                        .add_enabled(!self.tx_in_flight(), theme.button_primary("+ Add Sensor Data"))
                        .clicked()
                    {
                        self.create_form.open = true;
                    }
                });
            });
            ui.add_space(theme.spacing_sm);
        });
    }

    fn render_wallet_button(&mut self, ui: &mut egui::Ui) {
        let theme = self.theme;
        if let Some(session) = &self.wallet {
            let address = session.address_string();
            let label = format!("● {}", utils::short_address(&address));
            let hover = format!("{} via {}. Click to disconnect.", address, session.signer_label());
            if ui
                .add(theme.button_secondary(&label))
                .on_hover_text(hover)
                .clicked()
            {
                self.disconnect_wallet();
            }
        } else if self.wallet_job.is_some() {
            ui.add_enabled(false, theme.button_secondary("Connecting..."));
        } else {
            let response = ui.add(theme.button_primary("Connect Wallet"));
            let response = match &self.wallet_error {
                Some(err) => response.on_hover_text(err.as_str()),
                None => response.on_hover_text(self.config.signer_kind.display_name()),
            };
            if response.clicked() {
                self.start_wallet_connect();
            }
        }
    }

    fn render_nav(&mut self, ctx: &egui::Context) {
        let theme = self.theme;
        egui::SidePanel::left("nav")
            .resizable(false)
            .default_width(170.0)
            .show(ctx, |ui| {
                ui.add_space(theme.spacing_md);
                for (section, label) in [
                    (GuiSection::Dashboard, "🌾 Dashboard"),
                    (GuiSection::Settings, "⚙ Settings"),
                ] {
                    let selected = self.section == section;
                    if ui.selectable_label(selected, RichText::new(label).size(15.0)).clicked() {
                        self.section = section;
                        if section == GuiSection::Settings {
                            self.settings_form = SettingsFormState::from_settings(&self.user_settings);
                            self.refresh_logs();
                        }
                    }
                    ui.add_space(theme.spacing_xs);
                }

                ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                    ui.add_space(theme.spacing_sm);
                    ui.label(
                        RichText::new(format!("{} · #{}", self.config.network_label(), self.config.chain_id))
                            .small()
                            .color(theme.text_secondary),
                    );
                    let notification_label = format!("🔔 {}", self.notifications.len());
                    if ui
                        .button(notification_label)
                        .on_hover_text("Notification history")
                        .clicked()
                    {
                        self.show_notifications_popup = !self.show_notifications_popup;
                    }
                });
            });
    }

    fn render_banner(&self, ctx: &egui::Context) {
        let Some((status, message)) = self.banner.visible() else {
            return;
        };
        let theme = self.theme;
        let color = match status {
            BannerStatus::Pending => theme.sky,
            BannerStatus::Success => theme.success,
            BannerStatus::Error => theme.error,
        };
        egui::Area::new(egui::Id::new("transaction_banner"))
            .anchor(egui::Align2::CENTER_TOP, [0.0, 70.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                theme
                    .frame_card()
                    .stroke(egui::Stroke::new(2.0, color))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            if status == BannerStatus::Pending {
                                ui.spinner();
                            } else {
                                ui.label(RichText::new(status.icon()).size(20.0).strong().color(color));
                            }
                            ui.label(RichText::new(message).size(15.0).color(theme.text_primary));
                        });
                    });
            });
    }

    fn render_notifications_popup(&mut self, ctx: &egui::Context) {
        if !self.show_notifications_popup {
            return;
        }
        let theme = self.theme;
        let mut open = true;
        egui::Window::new("Notification History")
            .open(&mut open)
            .collapsible(false)
            .default_width(420.0)
            .anchor(egui::Align2::LEFT_BOTTOM, [180.0, -10.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(format!("{} notifications", self.notifications.len()))
                            .color(theme.text_secondary),
                    );
                    if ui.small_button("Clear").clicked() {
                        self.notifications.clear();
                    }
                });
                ui.separator();
                egui::ScrollArea::vertical().max_height(280.0).show(ui, |ui| {
                    if self.notifications.is_empty() {
                        ui.label(RichText::new("No notifications yet.").color(theme.text_secondary));
                    }
                    for entry in self.notifications.iter().rev() {
                        ui.horizontal_wrapped(|ui| {
                            ui.label(
                                RichText::new(format!("[{}]", entry.time_ago()))
                                    .small()
                                    .color(theme.text_secondary),
                            );
                            ui.label(entry.message.as_str());
                        });
                    }
                });
            });
        if !open {
            self.show_notifications_popup = false;
        }
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_jobs();
        self.banner.tick(Instant::now());

        self.render_top_bar(ctx);
        self.render_nav(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.section {
                GuiSection::Dashboard => self.view_dashboard(ui),
                GuiSection::Settings => self.view_settings(ui),
            });
        });

        self.view_create_record(ctx);
        self.view_record_detail(ctx);
        self.render_banner(ctx);
        self.render_notifications_popup(ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

pub fn launch(config: Config, user_settings: UserSettings) -> Result<()> {
    if !config.demo_mode && config.contract_address.is_none() {
        tracing::warn!(
            "No contract address configured for chain {}; set CONTRACT_ADDRESS or enable demo mode",
            config.chain_id
        );
    }
    if let Some(url) = config::get_address_explorer_url(
        config.chain_id,
        &config.contract_address_display(),
    )
    .filter(|_| config.contract_address.is_some())
    {
        tracing::info!("Contract explorer page: {}", url);
    }

    let app_creator = move |cc: &eframe::CreationContext<'_>| {
        Box::new(GuiApp::new(config, user_settings, &cc.egui_ctx)) as Box<dyn App>
    };

    let native_options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1180.0, 780.0])
            .with_min_inner_size([820.0, 560.0]),
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native(
        "RegenAgri - DePIN Sensor Dashboard",
        native_options,
        Box::new(app_creator),
    )
    .map_err(|e| anyhow!("Failed to start GUI: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tx_action_messages() {
        let verify = TxAction::Review {
            id: "1".to_string(),
            decision: ReviewDecision::Verify,
        };
        assert_eq!(TxAction::Submit.action_label(), "Submission");
        assert_eq!(verify.action_label(), "Verification");
        assert_ne!(verify.success_message(), TxAction::Submit.success_message());
        assert_eq!(
            utils::friendly_error(verify.action_label(), "boom"),
            "Verification failed: boom"
        );
    }

    #[test]
    fn test_settings_form_from_settings() {
        let mut settings = UserSettings::default();
        settings.selected_chain_id = 31337;
        settings.set_custom_rpc(31337, "http://localhost:9999".to_string());
        settings.demo_mode = true;
        let form = SettingsFormState::from_settings(&settings);
        assert_eq!(form.chain_id, 31337);
        assert_eq!(form.rpc_url, "http://localhost:9999");
        assert!(form.contract_address.is_empty());
        assert!(form.demo_mode);
    }

    #[test]
    fn test_saved_form_keeps_env_contract_address() {
        let mut form = SettingsFormState::from_settings(&UserSettings::default());
        form.ledger_index = 1;
        let settings = form.to_settings(&UserSettings::default()).unwrap();
        assert!(settings.get_contract_address(form.chain_id).is_none());

        let config = Config::from_settings_with_env(&settings, |key| {
            (key == "CONTRACT_ADDRESS").then(|| "0x00000000000000000000000000000000000000aa".to_string())
        });
        assert!(config.contract_address.is_some());
        assert_eq!(config.ledger_index, 1);
    }

    #[test]
    fn test_settings_form_rejects_bad_contract_address() {
        let mut form = SettingsFormState::from_settings(&UserSettings::default());
        form.contract_address = "0x1234".to_string();
        assert!(form.to_settings(&UserSettings::default()).is_err());
    }

    // ==================== RecordsLoader tests ====================

    fn wait_load(loader: &mut RecordsLoader) -> LoadOutcome {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(outcome) = loader.poll() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "load did not finish");
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_reload_during_load_discards_earlier_result() {
        const OWNER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
        let store = MemoryStore::new();
        let draft = RecordDraft {
            location: "North field".to_string(),
            value: 10.0,
            ..RecordDraft::default()
        };
        let write =
            tokio_test::block_on(registry::submit_record(&store, Some(OWNER), &draft, chrono::Utc::now())).unwrap();

        let mut loader = RecordsLoader::default();
        loader.request(StoreHandle::Memory(store.clone()));
        // let the first load read the pending record
        std::thread::sleep(Duration::from_millis(100));
        tokio_test::block_on(registry::verify_record(&store, Some(OWNER), &write.record.id)).unwrap();
        loader.request(StoreHandle::Memory(store.clone()));
        assert!(loader.is_loading());

        assert!(matches!(wait_load(&mut loader), LoadOutcome::Stale));
        assert!(!loader.is_loading());

        loader.request(StoreHandle::Memory(store));
        match wait_load(&mut loader) {
            LoadOutcome::Current(Ok(records)) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].status, crate::record::RecordStatus::Verified);
            }
            _ => panic!("expected a current load"),
        }
    }

    #[test]
    fn test_single_load_is_current() {
        let mut loader = RecordsLoader::default();
        loader.request(StoreHandle::Memory(MemoryStore::new()));
        match wait_load(&mut loader) {
            LoadOutcome::Current(Ok(records)) => assert!(records.is_empty()),
            _ => panic!("expected a current load"),
        }
        assert!(loader.poll().is_none());
    }

    #[tokio::test]
    async fn test_memory_store_handle_shares_records() {
        let shared = MemoryStore::new();
        let first = StoreHandle::Memory(shared.clone()).open().await.unwrap();
        first.set_data("sensor_keys", b"[\"a\"]".to_vec()).await.unwrap();
        let second = StoreHandle::Memory(shared).open().await.unwrap();
        assert_eq!(second.get_data("sensor_keys").await.unwrap(), b"[\"a\"]".to_vec());
    }
}
