use eframe::egui::{self, Color32, RichText};

use crate::models::FeedEntry;

use super::super::{format_relative_time, MurmurApp};

impl MurmurApp {
    pub(crate) fn render_feed(&mut self, ui: &mut egui::Ui) {
        if self.feed.is_loading && self.feed.entries.is_empty() {
            ui.add(egui::Spinner::new());
        }
        if let Some(err) = self.feed.error.clone() {
            ui.colored_label(Color32::LIGHT_RED, err);
            if ui.button("Retry").clicked() {
                self.spawn_load_feed();
            }
            return;
        }

        let entries = self.feed.entries.clone();
        egui::ScrollArea::vertical().show(ui, |ui| {
            if entries.is_empty() && !self.feed.is_loading {
                ui.label("Nothing here yet. Post the first murmur.");
            }
            for entry in &entries {
                self.render_post_row(ui, entry);
            }
        });
    }

    fn render_post_row(&mut self, ui: &mut egui::Ui, entry: &FeedEntry) {
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .inner_margin(egui::vec2(12.0, 8.0))
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    self.render_avatar(ui, &entry.author);
                    ui.vertical(|ui| {
                        ui.horizontal(|ui| {
                            let handle = RichText::new(format!("@{}", entry.author.handle))
                                .color(ui.visuals().hyperlink_color)
                                .strong();
                            let response = ui.label(handle);
                            if let Some(name) = &entry.author.display_name {
                                response.on_hover_text(name);
                            }
                            ui.label(RichText::new("·").weak());
                            ui.label(
                                RichText::new(format_relative_time(&entry.post.created_at))
                                    .weak()
                                    .size(11.0),
                            );
                        });
                        ui.label(&entry.post.body);
                    });
                });
            });
    }
}
