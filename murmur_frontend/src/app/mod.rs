use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};

use chrono::{DateTime, Utc};
use eframe::egui::{self, Context, TextureHandle};
use log::{error, warn};

use crate::api::ApiClient;
use crate::models::{CreatePostInput, SignInInput};
use crate::session_store;

mod messages;
mod state;
mod tasks;
mod ui;

use messages::AppMessage;
use state::{ComposerState, FeedState, LoadedImage, SessionState, SignInState};

pub struct MurmurApp {
    api: ApiClient,
    tx: Sender<AppMessage>,
    rx: Receiver<AppMessage>,
    session: SessionState,
    sign_in: SignInState,
    composer: ComposerState,
    feed: FeedState,
    base_url_input: String,
    info_banner: Option<String>,
    avatar_textures: HashMap<String, TextureHandle>,
    avatar_loading: HashSet<String>,
    avatar_pending: HashMap<String, LoadedImage>,
    avatar_errors: HashMap<String, String>,
}

impl MurmurApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let default_url = std::env::var("MURMUR_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());
        let mut api = ApiClient::new(default_url.clone()).unwrap_or_else(|err| {
            error!("failed to initialise API client: {err}");
            ApiClient::new("http://127.0.0.1:8080").expect("fallback API client")
        });

        let mut session = SessionState::default();
        if let Some(token) = session_store::load_token() {
            api.set_token(Some(token));
            session.is_loading = true;
        }

        let (tx, rx) = mpsc::channel();

        let mut app = Self {
            api,
            tx,
            rx,
            session,
            sign_in: SignInState::default(),
            composer: ComposerState::default(),
            feed: FeedState::default(),
            base_url_input: default_url,
            info_banner: None,
            avatar_textures: HashMap::new(),
            avatar_loading: HashSet::new(),
            avatar_pending: HashMap::new(),
            avatar_errors: HashMap::new(),
        };

        // Start fetching the feed right away; the session check usually
        // resolves later.
        app.spawn_load_feed();
        if app.session.is_loading {
            tasks::restore_session(app.api.clone(), app.tx.clone());
        }
        app
    }

    fn spawn_load_feed(&mut self) {
        if self.feed.is_loading {
            return;
        }
        self.feed.is_loading = true;
        self.feed.error = None;
        tasks::load_feed(self.api.clone(), self.tx.clone());
    }

    fn spawn_create_post(&mut self) {
        let body = self.composer.input.trim().to_string();
        if body.is_empty() || self.composer.sending {
            return;
        }
        self.composer.sending = true;
        tasks::create_post(self.api.clone(), self.tx.clone(), CreatePostInput { body });
    }

    fn spawn_sign_in(&mut self) {
        let handle = self.sign_in.handle_input.trim().to_string();
        if handle.is_empty() {
            self.sign_in.error = Some("Pick a handle first".into());
            return;
        }
        let display_name = self.sign_in.display_name_input.trim().to_string();
        let payload = SignInInput {
            handle,
            display_name: if display_name.is_empty() {
                None
            } else {
                Some(display_name)
            },
            avatar_url: None,
        };
        self.sign_in.submitting = true;
        self.sign_in.error = None;
        tasks::sign_in(self.api.clone(), self.tx.clone(), payload);
    }

    fn spawn_sign_out(&mut self) {
        tasks::sign_out(self.api.clone(), self.tx.clone());
        self.api.set_token(None);
        self.session.user = None;
        self.composer = ComposerState::default();
        if let Err(err) = session_store::clear_token() {
            warn!("failed to clear session cache: {err}");
        }
    }

    fn toast(&mut self, message: impl Into<String>) {
        self.info_banner = Some(message.into());
    }

    fn process_messages(&mut self) {
        messages::process_messages(self);
    }
}

impl eframe::App for MurmurApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.process_messages();

        egui::TopBottomPanel::top("top_controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("API Base URL");
                ui.text_edit_singleline(&mut self.base_url_input);
                if ui.button("Apply").clicked() {
                    match self.api.set_base_url(self.base_url_input.clone()) {
                        Ok(()) => {
                            self.info_banner = Some("API URL updated".into());
                            self.spawn_load_feed();
                        }
                        Err(err) => {
                            self.info_banner = Some(format!("Failed to update URL: {err}"));
                        }
                    }
                }
                if ui.button("Refresh").clicked() {
                    self.spawn_load_feed();
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(user) = self.session.user.clone() {
                        if ui.button("Sign out").clicked() {
                            self.spawn_sign_out();
                        }
                        ui.label(format!("@{}", user.handle));
                    }
                });
            });

            if let Some(message) = self.info_banner.clone() {
                let mut dismiss = false;
                egui::Frame::group(ui.style())
                    .fill(ui.visuals().extreme_bg_color)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(message.as_str());
                            if ui.button("Dismiss").clicked() {
                                dismiss = true;
                            }
                        });
                    });
                if dismiss {
                    self.info_banner = None;
                }
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_session_strip(ui);
            ui.separator();
            self.render_feed(ui);
        });
    }
}

fn format_relative_time(ts: &str) -> String {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| relative_from(dt.with_timezone(&Utc), Utc::now()))
        .unwrap_or_else(|_| ts.to_string())
}

fn relative_from(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(dt);
    if diff.num_seconds() < 60 {
        "just now".to_string()
    } else if diff.num_minutes() < 60 {
        match diff.num_minutes() {
            1 => "1 minute ago".to_string(),
            m => format!("{m} minutes ago"),
        }
    } else if diff.num_hours() < 24 {
        match diff.num_hours() {
            1 => "1 hour ago".to_string(),
            h => format!("{h} hours ago"),
        }
    } else if diff.num_days() <= 30 {
        match diff.num_days() {
            1 => "1 day ago".to_string(),
            d => format!("{d} days ago"),
        }
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}
