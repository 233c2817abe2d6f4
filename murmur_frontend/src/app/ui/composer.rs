use eframe::egui;

use super::super::MurmurApp;

impl MurmurApp {
    pub(crate) fn render_composer(&mut self, ui: &mut egui::Ui) {
        let Some(user) = self.session.user.clone() else {
            return;
        };
        let mut should_post = false;
        ui.horizontal(|ui| {
            self.render_avatar(ui, &user);
            let input = ui.add_enabled(
                !self.composer.sending,
                egui::TextEdit::singleline(&mut self.composer.input)
                    .desired_width(ui.available_width() - 70.0)
                    .hint_text("What's on your mind?"),
            );
            if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                should_post = true;
            }
            if self.composer.sending {
                ui.add(egui::Spinner::new());
            } else if !self.composer.input.trim().is_empty() {
                if ui.button("Post").clicked() {
                    should_post = true;
                }
            }
        });
        if should_post {
            self.spawn_create_post();
        }
    }
}
