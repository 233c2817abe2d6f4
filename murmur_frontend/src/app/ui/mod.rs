use eframe::egui::{self, Align2, FontId, Sense, Vec2};

use crate::models::AuthorView;

use super::{tasks, MurmurApp};

mod composer;
mod feed;
mod session;

const AVATAR_SIZE: f32 = 32.0;

impl MurmurApp {
    /// Draws the author's avatar, kicking off the download on first sight and
    /// falling back to an initial-letter disc while the image is missing,
    /// still loading, or failed to decode.
    pub(crate) fn render_avatar(&mut self, ui: &mut egui::Ui, author: &AuthorView) {
        if let Some(url) = author.avatar_url.as_deref() {
            if let Some(tex) = self.avatar_textures.get(&author.id) {
                ui.add(
                    egui::Image::from_texture(tex)
                        .fit_to_exact_size(Vec2::splat(AVATAR_SIZE))
                        .rounding(AVATAR_SIZE / 2.0),
                );
                return;
            }
            if let Some(pending) = self.avatar_pending.remove(&author.id) {
                let color = egui::ColorImage::from_rgba_unmultiplied(pending.size, &pending.pixels);
                let tex = ui
                    .ctx()
                    .load_texture(&author.id, color, egui::TextureOptions::default());
                self.avatar_textures.insert(author.id.clone(), tex.clone());
                ui.add(
                    egui::Image::from_texture(&tex)
                        .fit_to_exact_size(Vec2::splat(AVATAR_SIZE))
                        .rounding(AVATAR_SIZE / 2.0),
                );
                return;
            }
            if !self.avatar_errors.contains_key(&author.id)
                && !self.avatar_loading.contains(&author.id)
            {
                self.avatar_loading.insert(author.id.clone());
                tasks::download_avatar(self.tx.clone(), author.id.clone(), url.to_string());
            }
        }
        initial_disc(ui, author);
    }
}

fn initial_disc(ui: &mut egui::Ui, author: &AuthorView) {
    let (rect, _) = ui.allocate_exact_size(Vec2::splat(AVATAR_SIZE), Sense::hover());
    let initial = author
        .handle
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('?');
    let painter = ui.painter();
    painter.circle_filled(
        rect.center(),
        AVATAR_SIZE / 2.0,
        ui.visuals().widgets.inactive.bg_fill,
    );
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        initial,
        FontId::proportional(AVATAR_SIZE * 0.55),
        ui.visuals().strong_text_color(),
    );
}
