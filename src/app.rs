use eframe::egui;
use egui::{Color32, Key, Pos2, Rect, Sense, Stroke, Vec2};
use log::{error, warn};

use crate::categories::CategoryInput;
use crate::config::Config;
use crate::geometry::{CoordinateMapper, DisplayRect, Point, ScreenBox, Size};
use crate::imaging::Preview;
use crate::session::{CurrentImage, Event, Outcome, Phase, Session, Warning};

const MAX_COMPLETIONS: usize = 8;

struct Textures {
    original_size: (u32, u32),
    main: egui::TextureHandle,
    zoom: Option<egui::TextureHandle>,
}

/// Blocking message: everything else is disabled until it is dismissed.
struct Dialog {
    title: &'static str,
    message: String,
    close_app: bool,
}

pub struct SorterApp {
    session: Session,
    bound: (u32, u32),
    zoom_margin: f32,
    current: Option<CurrentImage>,
    textures: Option<Textures>,
    input: CategoryInput,
    prompt_text: String,
    dialog: Option<Dialog>,
    // non-blocking, shown beside the image
    warning: Option<String>,
    needs_reload: bool,
    focus_input: bool,
    ctrl_was_down: bool,
}

impl SorterApp {
    pub fn new(session: Session, config: &Config) -> Self {
        Self {
            session,
            bound: config.display_bound(),
            zoom_margin: config.zoom_margin,
            current: None,
            textures: None,
            input: CategoryInput::default(),
            prompt_text: String::new(),
            dialog: None,
            warning: None,
            needs_reload: true,
            focus_input: true,
            ctrl_was_down: false,
        }
    }

    fn load_current(&mut self, ctx: &egui::Context) {
        self.needs_reload = false;
        self.textures = None;
        self.warning = None;
        self.input.clear();
        self.focus_input = true;

        let Some(cur) = self.session.current() else {
            self.current = None;
            self.dialog = Some(Dialog {
                title: "Done",
                message: "All images have been sorted!".to_owned(),
                close_app: true,
            });
            return;
        };

        if let Some(Warning::NoBBox(name)) = &cur.warning {
            self.warning = Some(format!("No bounding box found for image: {}", name));
        }

        match Preview::build(&cur.path, cur.bbox, self.bound, self.zoom_margin) {
            Ok(preview) => {
                let main = load_texture(ctx, &cur.name, &preview.thumbnail);
                let zoom = preview
                    .zoom
                    .as_ref()
                    .map(|z| load_texture(ctx, &format!("{}#zoom", cur.name), z));
                self.textures = Some(Textures { original_size: preview.original_size, main, zoom });
            }
            Err(e) => {
                error!("cannot display {}: {}", cur.path.display(), e);
                self.show_error(e.to_string());
            }
        }
        self.current = Some(cur);
    }

    fn show_error(&mut self, message: String) {
        self.dialog = Some(Dialog { title: "Error", message, close_app: false });
    }

    fn dispatch(&mut self, event: Event) {
        match self.session.handle(event) {
            Ok(Outcome::Classified(_)) | Ok(Outcome::Skipped(_)) => self.needs_reload = true,
            Ok(Outcome::PromptOpened(_)) => {
                self.prompt_text = self.session.last_category().unwrap_or_default().to_owned();
            }
            Ok(Outcome::CropSaved(_)) | Ok(Outcome::PromptClosed) => {
                self.prompt_text.clear();
                self.focus_input = true;
            }
            Ok(Outcome::Drawing) | Ok(Outcome::Unchanged) => {}
            Err(e) => {
                warn!("{}", e);
                self.show_error(e.to_string());
            }
        }
    }

    fn submit_input(&mut self) {
        let text = self.input.resolve(self.session.last_category());
        self.dispatch(Event::Submit(text));
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(dialog) = &self.dialog else { return };
        let mut dismissed = false;
        egui::Window::new(dialog.title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&dialog.message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            let close_app = dialog.close_app;
            self.dialog = None;
            self.focus_input = true;
            if close_app {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn show_prompt(&mut self, ctx: &egui::Context, bbox_label: String) {
        let mut accept = false;
        let mut reject = false;
        egui::Window::new("Classify box")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Box {}", bbox_label));
                let resp = ui.text_edit_singleline(&mut self.prompt_text);
                if !resp.has_focus() && !resp.lost_focus() {
                    resp.request_focus();
                }
                if resp.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                    accept = true;
                }
                ui.horizontal(|ui| {
                    if ui.button("Accept").clicked() {
                        accept = true;
                    }
                    if ui.button("Reject").clicked() || ui.input(|i| i.key_pressed(Key::Escape)) {
                        reject = true;
                    }
                });
            });
        if accept {
            let text = self.prompt_text.clone();
            self.dispatch(Event::PromptAccepted(text));
        } else if reject {
            self.dispatch(Event::PromptRejected);
        }
    }

    fn show_input_panel(&mut self, ui: &mut egui::Ui) {
        let hint = self.session.last_category().unwrap_or_default().to_owned();
        ui.horizontal(|ui| {
            ui.label("Category:");
            if ui.button("Skip").clicked() {
                self.dispatch(Event::Skip);
            }
            let edit = egui::TextEdit::singleline(&mut self.input.text)
                .hint_text(hint)
                .lock_focus(true)
                .desired_width(f32::INFINITY);
            let resp = ui.add(edit);
            if self.focus_input {
                resp.request_focus();
                self.focus_input = false;
            }

            if let Some(rest) = self.input.ghost(self.session.categories()) {
                let font_id = egui::TextStyle::Body.resolve(ui.style());
                let typed = ui
                    .painter()
                    .layout_no_wrap(self.input.text.clone(), font_id.clone(), Color32::GRAY);
                let pos = Pos2::new(resp.rect.left() + 4.0 + typed.size().x, resp.rect.center().y);
                ui.painter().text(pos, egui::Align2::LEFT_CENTER, rest, font_id, Color32::GRAY);
            }

            if resp.has_focus() && ui.input(|i| i.key_pressed(Key::Tab)) {
                self.input.accept_suggestion(self.session.categories());
            }
            if resp.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                self.submit_input();
                self.focus_input = true;
            }
        });

        let completions: Vec<String> = self
            .session
            .categories()
            .completions(self.input.text.trim())
            .into_iter()
            .take(MAX_COMPLETIONS)
            .map(str::to_owned)
            .collect();
        if !completions.is_empty() {
            ui.horizontal_wrapped(|ui| {
                for c in completions {
                    if ui.selectable_label(false, &c).clicked() {
                        self.input.choose(&c);
                        self.focus_input = true;
                    }
                }
            });
        }
    }

    fn show_primary(&mut self, ui: &mut egui::Ui, interactive: bool) {
        let container = ui.available_rect_before_wrap();
        let (container, _) = ui.allocate_exact_size(container.size(), Sense::click_and_drag());
        let Some(tex) = &self.textures else { return };
        let rect = DisplayRect::fit_centered(size_of(&tex.main), to_display_rect(container));
        let img_rect = to_egui_rect(rect);
        let painter = ui.painter_at(container);
        painter.image(tex.main.id(), img_rect, full_uv(), Color32::WHITE);

        let mapper = CoordinateMapper::new(rect, Size::from_pixels(tex.original_size));
        if let Some(b) = self.current.as_ref().and_then(|c| c.bbox) {
            painter.rect_stroke(screen_rect(mapper.to_screen_px(b)), 0.0, Stroke::new(1.0, Color32::RED));
        }
        if let Some(b) = self.session.drag_preview() {
            painter.rect_stroke(
                screen_rect(mapper.to_screen_px(b)),
                0.0,
                Stroke::new(2.0, Color32::from_rgb(100, 200, 200)),
            );
        }

        if !interactive {
            return;
        }
        let pointer = ui.input(|i| i.pointer.clone());
        let at = pointer.interact_pos().and_then(|p| mapper.to_image(Point::new(p.x, p.y)));
        if pointer.primary_pressed() {
            self.dispatch(Event::PointerPressed(at));
        }
        if self.session.phase() == Phase::Dragging {
            if pointer.is_moving() {
                self.dispatch(Event::PointerMoved(at));
            }
            if pointer.primary_released() {
                self.dispatch(Event::PointerReleased);
            }
        }
    }

    fn show_zoom(&self, ui: &mut egui::Ui) {
        let container = ui.available_rect_before_wrap();
        let (container, _) = ui.allocate_exact_size(container.size(), Sense::hover());
        let Some(zoom) = self.textures.as_ref().and_then(|t| t.zoom.as_ref()) else {
            return;
        };
        let rect = DisplayRect::fit_centered(size_of(zoom), to_display_rect(container));
        ui.painter_at(container)
            .image(zoom.id(), to_egui_rect(rect), full_uv(), Color32::WHITE);
    }
}

impl eframe::App for SorterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.needs_reload {
            self.load_current(ctx);
        }

        let blocked = self.dialog.is_some();
        let prompting = matches!(self.session.phase(), Phase::Prompting(_));
        let interactive = !blocked && !prompting && !self.session.is_done();

        // Ctrl on its own skips the current image
        let ctrl = ctx.input(|i| i.modifiers.ctrl);
        if interactive && ctrl && !self.ctrl_was_down {
            self.dispatch(Event::Skip);
        }
        self.ctrl_was_down = ctrl;

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(cur) = &self.current {
                    ui.label(format!("Image {} of {}", self.session.index() + 1, self.session.total()));
                    ui.separator();
                    ui.label(&cur.name);
                }
            });
        });

        egui::TopBottomPanel::bottom("input_panel").show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| self.show_input_panel(ui));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(w) = &self.warning {
                ui.colored_label(Color32::YELLOW, w);
            }
            ui.columns(2, |cols| {
                self.show_primary(&mut cols[0], interactive);
                self.show_zoom(&mut cols[1]);
            });
        });

        if let Phase::Prompting(b) = self.session.phase() {
            if !blocked {
                self.show_prompt(ctx, b.to_string());
            }
        }
        self.show_dialog(ctx);

        if self.needs_reload {
            ctx.request_repaint();
        }
    }
}

/// Shows a single fatal message, then exits the event loop.
pub struct FatalApp {
    message: String,
}

impl FatalApp {
    pub fn new(message: String) -> Self {
        Self { message }
    }
}

impl eframe::App for FatalApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Error");
            ui.label(&self.message);
            if ui.button("OK").clicked() || ui.input(|i| i.key_pressed(Key::Enter)) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });
    }
}

fn load_texture(ctx: &egui::Context, name: &str, rgba: &image::RgbaImage) -> egui::TextureHandle {
    let size = [rgba.width() as usize, rgba.height() as usize];
    let image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
    ctx.load_texture(name, image, egui::TextureOptions::LINEAR)
}

fn size_of(tex: &egui::TextureHandle) -> Size {
    let s = tex.size_vec2();
    Size::new(s.x, s.y)
}

fn full_uv() -> Rect {
    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0))
}

fn to_display_rect(r: Rect) -> DisplayRect {
    DisplayRect::new(r.left(), r.top(), r.width(), r.height())
}

fn to_egui_rect(r: DisplayRect) -> Rect {
    Rect::from_min_size(Pos2::new(r.x, r.y), Vec2::new(r.w, r.h))
}

fn screen_rect(b: ScreenBox) -> Rect {
    Rect::from_min_max(Pos2::new(b.left, b.top), Pos2::new(b.right, b.bottom))
}
