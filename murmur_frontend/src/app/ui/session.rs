use eframe::egui::{self, Color32, RichText};

use super::super::MurmurApp;

impl MurmurApp {
    /// The strip above the feed: the composer when signed in, a centered
    /// sign-in control otherwise.
    pub(crate) fn render_session_strip(&mut self, ui: &mut egui::Ui) {
        if self.session.is_loading {
            ui.horizontal(|ui| {
                ui.add(egui::Spinner::new());
                ui.label("Restoring session…");
            });
            return;
        }
        if self.session.user.is_some() {
            self.render_composer(ui);
        } else {
            self.render_sign_in(ui);
        }
    }

    fn render_sign_in(&mut self, ui: &mut egui::Ui) {
        let mut should_sign_in = false;
        ui.vertical_centered(|ui| {
            egui::Frame::group(ui.style())
                .inner_margin(egui::vec2(16.0, 12.0))
                .show(ui, |ui| {
                    ui.label(RichText::new("Sign in to start posting").strong());
                    ui.add_space(6.0);
                    ui.horizontal(|ui| {
                        ui.label("Handle");
                        let response = ui.text_edit_singleline(&mut self.sign_in.handle_input);
                        if response.lost_focus()
                            && ui.input(|i| i.key_pressed(egui::Key::Enter))
                        {
                            should_sign_in = true;
                        }
                    });
                    ui.horizontal(|ui| {
                        ui.label("Display name");
                        ui.text_edit_singleline(&mut self.sign_in.display_name_input);
                    });
                    ui.add_space(6.0);
                    if self.sign_in.submitting {
                        ui.add(egui::Spinner::new());
                    } else if ui.button("Sign in").clicked() {
                        should_sign_in = true;
                    }
                    if let Some(err) = &self.sign_in.error {
                        ui.colored_label(Color32::LIGHT_RED, err);
                    }
                });
        });
        if should_sign_in && !self.sign_in.submitting {
            self.spawn_sign_in();
        }
    }
}
