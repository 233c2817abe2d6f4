use log::{error, warn};

use crate::api::ApiFailure;
use crate::models::{AuthorView, FeedEntry, SessionResponse};
use crate::session_store;

use super::state::{LoadedImage, SignInState};
use super::MurmurApp;

pub enum AppMessage {
    FeedLoaded(Result<Vec<FeedEntry>, ApiFailure>),
    PostCreated(Result<FeedEntry, ApiFailure>),
    SignedIn(Result<SessionResponse, ApiFailure>),
    SessionRestored(Result<AuthorView, ApiFailure>),
    SignedOut(Result<(), ApiFailure>),
    AvatarLoaded {
        user_id: String,
        result: Result<LoadedImage, String>,
    },
}

pub(super) fn process_messages(app: &mut MurmurApp) {
    while let Ok(message) = app.rx.try_recv() {
        match message {
            AppMessage::FeedLoaded(result) => {
                app.feed.is_loading = false;
                match result {
                    Ok(entries) => {
                        app.feed.entries = entries;
                        app.feed.error = None;
                    }
                    Err(err) => {
                        app.feed.error = Some(err.to_string());
                    }
                }
            }
            AppMessage::PostCreated(result) => {
                app.composer.sending = false;
                match result {
                    Ok(_) => {
                        app.composer.input.clear();
                        // the feed query is stale now, reload it
                        app.spawn_load_feed();
                    }
                    Err(err) => {
                        let message = err
                            .field_message("content")
                            .map(str::to_string)
                            .unwrap_or_else(|| "Failed to post! Please try again.".to_string());
                        app.toast(message);
                    }
                }
            }
            AppMessage::SignedIn(result) => {
                app.sign_in.submitting = false;
                match result {
                    Ok(session) => {
                        app.api.set_token(Some(session.token.clone()));
                        if let Err(err) = session_store::save_token(&session.token) {
                            warn!("failed to cache session token: {err}");
                        }
                        app.session.user = Some(session.user);
                        app.sign_in = SignInState::default();
                        app.spawn_load_feed();
                    }
                    Err(err) => {
                        app.sign_in.error = Some(err.to_string());
                    }
                }
            }
            AppMessage::SessionRestored(result) => {
                app.session.is_loading = false;
                match result {
                    Ok(user) => {
                        app.session.user = Some(user);
                    }
                    Err(err) => {
                        if err.is_unauthorized() {
                            // cached token expired or was revoked
                            app.api.set_token(None);
                            if let Err(err) = session_store::clear_token() {
                                warn!("failed to clear session cache: {err}");
                            }
                        } else {
                            app.toast(format!("Could not restore session: {err}"));
                        }
                    }
                }
            }
            AppMessage::SignedOut(result) => {
                if let Err(err) = result {
                    warn!("sign-out request failed: {err}");
                }
            }
            AppMessage::AvatarLoaded { user_id, result } => {
                app.avatar_loading.remove(&user_id);
                match result {
                    Ok(img) => {
                        app.avatar_pending.insert(user_id, img);
                    }
                    Err(err) => {
                        error!("failed to load avatar for {user_id}: {err}");
                        app.avatar_errors.insert(user_id, err);
                    }
                }
            }
        }
    }
}
