//! The annotation window.
//!
//! Shows the scaled preview of the current photograph with the crop outlines
//! drawn over it and turns clicks and key presses into session commands.

use std::path::PathBuf;
use std::time::Duration;

use barkcrop_core::{Command, Outcome, OverlayMarker, Session, SessionState};
use eframe::egui;
use egui::{Color32, Key, Pos2, Rect, Sense, Stroke, Vec2};
use log::error;

/// How often the window polls for input when nothing happens.
const POLL_INTERVAL: Duration = Duration::from_millis(30);

const OUTLINE_COLOR: Color32 = Color32::from_rgb(0, 255, 0);
const CENTER_COLOR: Color32 = Color32::from_rgb(255, 0, 0);

const KEY_HELP: &str = "click: add point | c: clear | n/Enter: save & next | q/Esc: quit";

/// Map a key press to a session command.
pub fn key_command(key: Key) -> Option<Command> {
    match key {
        Key::C => Some(Command::Clear),
        Key::N | Key::Enter => Some(Command::Commit),
        Key::Q | Key::Escape => Some(Command::Quit),
        _ => None,
    }
}

/// Preview pixel under a pointer offset (in points) from the image's corner.
pub fn display_pixel(offset: Vec2, pixels_per_point: f32) -> (u32, u32) {
    let x = (offset.x * pixels_per_point).max(0.0).floor() as u32;
    let y = (offset.y * pixels_per_point).max(0.0).floor() as u32;
    (x, y)
}

/// Message shown after a command.
fn describe(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Added(p) => Some(format!("Added point ({}, {})", p.x, p.y)),
        Outcome::Cleared(n) => Some(format!("Cleared {n} point(s)")),
        Outcome::Committed(report) if report.written.is_empty() && report.skipped == 0 => {
            Some("Nothing to save, skipped".to_string())
        }
        Outcome::Committed(report) => Some(format!(
            "Saved {} crop(s), {} skipped",
            report.written.len(),
            report.skipped
        )),
        Outcome::Quit | Outcome::Ignored => None,
    }
}

pub struct CropApp {
    session: Session,
    texture: Option<egui::TextureHandle>,
    texture_source: Option<PathBuf>,
    message: String,
}

impl CropApp {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            texture: None,
            texture_source: None,
            message: String::new(),
        }
    }

    /// Upload the preview whenever the session moved to another image.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let current = self.session.current_path().map(|p| p.to_path_buf());
        if current == self.texture_source {
            return;
        }

        self.texture = self.session.preview().map(|preview| {
            let image = egui::ColorImage::from_rgb(
                [preview.width as usize, preview.height as usize],
                &preview.pixels,
            );
            ctx.load_texture("preview", image, egui::TextureOptions::LINEAR)
        });
        self.texture_source = current;
    }

    fn status_line(&self) -> String {
        let name = self
            .session
            .current_path()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.session.position() {
            Some((index, total)) => format!(
                "[{index}/{total}] {name}: {} point(s)    {KEY_HELP}",
                self.session.points().len()
            ),
            None => KEY_HELP.to_string(),
        }
    }

    fn apply(&mut self, command: Command) {
        match self.session.handle(command) {
            Ok(outcome) => {
                if let Some(message) = describe(&outcome) {
                    self.message = message;
                }
            }
            Err(e) => {
                error!("Commit failed: {}", e);
                self.message = format!("Commit failed: {e}");
            }
        }
    }

    fn draw_preview(&self, ui: &mut egui::Ui, texture: &egui::TextureHandle) -> Option<Command> {
        let ppp = ui.ctx().pixels_per_point();
        let [width, height] = texture.size();
        let size = Vec2::new(width as f32 / ppp, height as f32 / ppp);

        let (response, painter) = ui.allocate_painter(size, Sense::click());
        let rect = response.rect;

        painter.image(
            texture.id(),
            rect,
            Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
            Color32::WHITE,
        );

        let to_screen = |x: u32, y: u32| rect.min + Vec2::new(x as f32 / ppp, y as f32 / ppp);
        for OverlayMarker { center, outline } in self.session.overlay() {
            painter.rect_stroke(
                Rect::from_min_max(to_screen(outline.x1, outline.y1), to_screen(outline.x2, outline.y2)),
                0.0,
                Stroke::new(2.0, OUTLINE_COLOR),
            );
            painter.circle_filled(to_screen(center.0, center.1), 3.0, CENTER_COLOR);
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let (x, y) = display_pixel(pos - rect.min, ppp);
                return Some(Command::Click { x, y });
            }
        }
        None
    }
}

impl eframe::App for CropApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut commands: Vec<Command> = ctx.input(|input| {
            input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        ..
                    } => key_command(*key),
                    _ => None,
                })
                .collect()
        });
        if ctx.input(|input| input.viewport().close_requested()) {
            commands.push(Command::Quit);
        }

        self.sync_texture(ctx);

        egui::TopBottomPanel::top("status").show(ctx, |ui| {
            ui.label(self.status_line());
            if !self.message.is_empty() {
                ui.label(&self.message);
            }
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(texture) = self.texture.clone() {
                egui::ScrollArea::both().show(ui, |ui| {
                    if let Some(click) = self.draw_preview(ui, &texture) {
                        // Clicks are applied before key commands of the same frame
                        commands.insert(0, click);
                    }
                });
            }
        });

        for command in commands {
            self.apply(command);
            if self.session.state().is_terminal() {
                break;
            }
        }

        match self.session.state() {
            SessionState::Finished | SessionState::Quit => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
            SessionState::Idle | SessionState::Collecting => {
                ctx.request_repaint_after(POLL_INTERVAL);
            }
        }
    }
}
