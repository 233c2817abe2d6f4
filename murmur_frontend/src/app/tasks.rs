use std::sync::mpsc::Sender;
use std::thread;

use log::error;

use crate::api::ApiClient;
use crate::models::{CreatePostInput, SignInInput};

use super::messages::AppMessage;
use super::state::LoadedImage;

pub fn load_feed(client: ApiClient, tx: Sender<AppMessage>) {
    thread::spawn(move || {
        let result = client.fetch_feed();
        if tx.send(AppMessage::FeedLoaded(result)).is_err() {
            error!("failed to send FeedLoaded message");
        }
    });
}

pub fn create_post(client: ApiClient, tx: Sender<AppMessage>, payload: CreatePostInput) {
    thread::spawn(move || {
        let result = client.create_post(&payload);
        if tx.send(AppMessage::PostCreated(result)).is_err() {
            error!("failed to send PostCreated message");
        }
    });
}

pub fn sign_in(client: ApiClient, tx: Sender<AppMessage>, payload: SignInInput) {
    thread::spawn(move || {
        let result = client.sign_in(&payload);
        if tx.send(AppMessage::SignedIn(result)).is_err() {
            error!("failed to send SignedIn message");
        }
    });
}

pub fn restore_session(client: ApiClient, tx: Sender<AppMessage>) {
    thread::spawn(move || {
        let result = client.current_user();
        if tx.send(AppMessage::SessionRestored(result)).is_err() {
            error!("failed to send SessionRestored message");
        }
    });
}

pub fn sign_out(client: ApiClient, tx: Sender<AppMessage>) {
    thread::spawn(move || {
        let result = client.sign_out();
        if tx.send(AppMessage::SignedOut(result)).is_err() {
            error!("failed to send SignedOut message");
        }
    });
}

pub fn download_avatar(tx: Sender<AppMessage>, user_id: String, url: String) {
    thread::spawn(move || {
        let result = (|| {
            let client = crate::api::shared_client().map_err(|e| e.to_string())?;
            let resp = client
                .get(&url)
                .send()
                .map_err(|e| format!("request error: {e}"))?;
            let bytes = resp.bytes().map_err(|e| format!("download error: {e}"))?;
            let dyn_img = image::load_from_memory(&bytes)
                .map_err(|e| format!("image decode error: {e}"))?;
            let rgba = dyn_img.to_rgba8();
            let size = [dyn_img.width() as usize, dyn_img.height() as usize];
            Ok(LoadedImage {
                size,
                pixels: rgba.as_flat_samples().as_slice().to_vec(),
            })
        })();

        let message = AppMessage::AvatarLoaded { user_id, result };
        if tx.send(message).is_err() {
            error!("failed to send AvatarLoaded message");
        }
    });
}
