use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{
    self, Align, Color32, CornerRadius, Frame, Layout, Margin, RichText, Stroke, Vec2,
};
use log::{error, warn};
use tokio::runtime::{Builder, Runtime};

use crate::catalog::filter::{self, CatalogView};
use crate::catalog::models::{FIXED_GAME, Game};
use crate::catalog::{CatalogFetcher, CatalogSource};
use crate::host::DesktopHost;
use crate::popup::PopupController;
use crate::storage::{StorageManager, Theme};
use crate::util::truncate_text;

const SEARCH_HINT: &str = "Search games...";
const NO_RESULTS: &str = "No games found.";
const SUGGESTIONS_HEADING: &str = "Suggested Games:";
const LOADING_LABEL: &str = "Loading...";
const ERROR_LABEL: &str = "Error Occurred";
const MENU_WIDTH: f32 = 260.0;
const DESCRIPTION_MAX_CHARS: usize = 90;
const LOADING_REPAINT: Duration = Duration::from_millis(100);
const CARD_THUMB_SIZE: f32 = 56.0;
const SUGGESTION_THUMB_SIZE: f32 = 24.0;
const FEATURED_THUMB_SIZE: f32 = 120.0;

/// Everything the popup needs to know at startup.
#[derive(Clone, Debug)]
pub struct PopupOptions {
    pub catalog_url: String,
    pub extension_id: Option<String>,
    pub timeout: Duration,
    pub theme: Theme,
    pub storage: StorageManager,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ThemePalette {
    bg: Color32,
    panel: Color32,
    surface: Color32,
    border: Color32,
    text_primary: Color32,
    text_muted: Color32,
    accent: Color32,
    danger: Color32,
}

impl ThemePalette {
    fn for_theme(theme: Theme) -> Self {
        let [r, g, b] = theme.background_rgb();
        let bg = Color32::from_rgb(r, g, b);
        match theme {
            Theme::Light => Self {
                bg,
                panel: Color32::from_rgb(236, 240, 246),
                surface: Color32::from_rgb(245, 248, 252),
                border: Color32::from_rgb(195, 205, 221),
                text_primary: Color32::from_rgb(28, 38, 52),
                text_muted: Color32::from_rgb(80, 99, 121),
                accent: Color32::from_rgb(27, 170, 152),
                danger: Color32::from_rgb(219, 83, 83),
            },
            Theme::Dark => Self {
                bg,
                panel: Color32::from_rgb(17, 22, 29),
                surface: Color32::from_rgb(24, 31, 39),
                border: Color32::from_rgb(45, 57, 72),
                text_primary: Color32::from_rgb(228, 235, 244),
                text_muted: Color32::from_rgb(167, 182, 197),
                accent: Color32::from_rgb(92, 219, 195),
                danger: Color32::from_rgb(239, 117, 117),
            },
        }
    }
}

fn apply_theme(ctx: &egui::Context, theme: Theme, colors: &ThemePalette) {
    let mut visuals = match theme {
        Theme::Light => egui::Visuals::light(),
        Theme::Dark => egui::Visuals::dark(),
    };
    visuals.panel_fill = colors.bg;
    visuals.window_fill = colors.surface;
    visuals.override_text_color = Some(colors.text_primary);
    visuals.hyperlink_color = colors.accent;
    visuals.selection.bg_fill = colors.accent;
    ctx.set_visuals(visuals);
}

fn card_frame(colors: &ThemePalette) -> Frame {
    Frame::new()
        .fill(colors.surface)
        .stroke(Stroke::new(1.0, colors.border))
        .corner_radius(CornerRadius::same(10))
        .inner_margin(Margin::same(10))
}

fn build_runtime() -> Result<Arc<Runtime>, String> {
    match Runtime::new() {
        Ok(rt) => Ok(Arc::new(rt)),
        Err(err) => {
            warn!(
                "ui: failed to create multithreaded runtime ({}); trying single-threaded runtime",
                err
            );
            Builder::new_current_thread()
                .enable_all()
                .build()
                .map(Arc::new)
                .map_err(|fallback_err| {
                    format!("failed to create any Tokio runtime: {fallback_err}")
                })
        }
    }
}

/// Loading and error fallbacks wrapped around the popup body.
enum Shell {
    Ready {
        // Dropped after the controller, which still holds a handle to it.
        controller: PopupController,
        _runtime: Arc<Runtime>,
    },
    Failed(String),
}

pub struct PopupApp {
    shell: Shell,
    storage: StorageManager,
    theme: Theme,
    action_error: Option<String>,
}

impl PopupApp {
    pub fn new(cc: &eframe::CreationContext<'_>, options: PopupOptions) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        let shell = match build_runtime() {
            Ok(runtime) => {
                let source: Arc<dyn CatalogSource> =
                    Arc::new(CatalogFetcher::new(options.catalog_url, options.timeout));
                let host = Box::new(DesktopHost::new(options.extension_id));
                let mut controller =
                    PopupController::new(runtime.handle().clone(), source, host);
                controller.on_mount();
                Shell::Ready {
                    controller,
                    _runtime: runtime,
                }
            }
            Err(err) => {
                error!("ui: {err}");
                Shell::Failed(err)
            }
        };

        Self {
            shell,
            storage: options.storage,
            theme: options.theme,
            action_error: None,
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(err) = self.storage.write_theme(self.theme) {
            warn!("failed to persist theme: {}", err);
        }
    }

    fn report(&mut self, result: Result<(), String>) {
        match result {
            Ok(()) => self.action_error = None,
            Err(err) => self.action_error = Some(err),
        }
    }
}

/// Image URI for a thumbnail, or `None` when the entry has nothing loadable.
fn thumbnail_uri(thumb: &str) -> Option<&str> {
    let thumb = thumb.trim();
    (thumb.starts_with("https://") || thumb.starts_with("http://")).then_some(thumb)
}

fn render_thumbnail(ui: &mut egui::Ui, thumb: &str, size: f32, colors: &ThemePalette) {
    match thumbnail_uri(thumb) {
        Some(uri) => {
            ui.add(
                egui::Image::from_uri(uri)
                    .fit_to_exact_size(Vec2::splat(size))
                    .corner_radius(CornerRadius::same(6)),
            );
        }
        None => {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(size), egui::Sense::hover());
            ui.painter()
                .rect_filled(rect, CornerRadius::same(6), colors.border);
        }
    }
}

fn render_game_card(ui: &mut egui::Ui, game: &Game, colors: &ThemePalette) -> bool {
    let mut clicked = false;
    ui.push_id(game.id, |ui| {
        card_frame(colors).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_top(|ui| {
                render_thumbnail(ui, &game.thumb, CARD_THUMB_SIZE, colors);
                ui.vertical(|ui| {
                    clicked = ui
                        .link(RichText::new(&game.name).strong().size(16.0))
                        .on_hover_text(game.link.as_str())
                        .clicked();
                    if !game.description.is_empty() {
                        ui.label(
                            RichText::new(truncate_text(&game.description, DESCRIPTION_MAX_CHARS))
                                .color(colors.text_muted)
                                .small(),
                        );
                    }
                });
            });
        });
    });
    clicked
}

fn render_suggestion(ui: &mut egui::Ui, game: &Game, colors: &ThemePalette) -> bool {
    let mut clicked = false;
    ui.push_id(("suggestion", game.id), |ui| {
        ui.horizontal(|ui| {
            render_thumbnail(ui, &game.thumb, SUGGESTION_THUMB_SIZE, colors);
            clicked = ui.link(game.name.as_str()).clicked();
        });
    });
    clicked
}

/// Draw the game menu; returns the game the user picked, if any.
fn render_menu(
    ui: &mut egui::Ui,
    controller: &mut PopupController,
    colors: &ThemePalette,
) -> Option<Game> {
    let mut term = controller.search_term().to_owned();
    let resp = ui.add(
        egui::TextEdit::singleline(&mut term)
            .hint_text(SEARCH_HINT)
            .desired_width(f32::INFINITY),
    );
    if resp.changed() {
        controller.on_search_input(term);
    }
    ui.add_space(6.0);

    if controller.is_loading() {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label(RichText::new(LOADING_LABEL).color(colors.text_muted));
        });
    }

    let mut picked = None;
    egui::ScrollArea::vertical().show(ui, |ui| match controller.view() {
        CatalogView::Matches(games) => {
            for game in games {
                if render_game_card(ui, game, colors) {
                    picked = Some(game.clone());
                }
                ui.add_space(4.0);
            }
        }
        CatalogView::NoResults { suggestions } => {
            ui.label(RichText::new(NO_RESULTS).color(colors.text_muted));
            ui.add_space(4.0);
            ui.label(RichText::new(SUGGESTIONS_HEADING).strong());
            for game in suggestions {
                if render_suggestion(ui, game, colors) {
                    picked = Some(game.clone());
                }
            }
        }
    });
    picked
}

/// Plain-text rendering of the menu for the headless `--list` mode.
pub fn render_listing(catalog: &[Game], term: &str) -> String {
    let mut out = String::new();
    match filter::catalog_view(catalog, term) {
        CatalogView::Matches(games) => {
            for game in games {
                let _ = writeln!(out, "{:>4}  {}  {}", game.id, game.name, game.link);
            }
        }
        CatalogView::NoResults { suggestions } => {
            let _ = writeln!(out, "{NO_RESULTS}");
            let _ = writeln!(out, "{SUGGESTIONS_HEADING}");
            for game in suggestions {
                let _ = writeln!(out, "{:>4}  {}  {}", game.id, game.name, game.link);
            }
        }
    }
    out
}

fn render_featured(ui: &mut egui::Ui, colors: &ThemePalette) -> bool {
    let mut play = false;
    ui.push_id(FIXED_GAME.id, |ui| {
        card_frame(colors).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_top(|ui| {
                render_thumbnail(ui, FIXED_GAME.thumb, FEATURED_THUMB_SIZE, colors);
                ui.vertical(|ui| {
                    ui.heading(RichText::new(FIXED_GAME.name).color(colors.accent));
                    ui.label(RichText::new(FIXED_GAME.description).color(colors.text_muted));
                    ui.add_space(8.0);
                    ui.hyperlink_to(FIXED_GAME.link, FIXED_GAME.link);
                    ui.add_space(8.0);
                    play = ui
                        .add(
                            egui::Button::new(RichText::new("▶ Play").strong())
                                .fill(colors.accent)
                                .min_size(Vec2::new(120.0, 34.0)),
                        )
                        .clicked();
                });
            });
        });
    });
    play
}

impl eframe::App for PopupApp {
    fn update(&mut self, ctx: &eframe::egui::Context, _frame: &mut eframe::Frame) {
        let colors = ThemePalette::for_theme(self.theme);
        apply_theme(ctx, self.theme, &colors);

        let controller = match &mut self.shell {
            Shell::Ready { controller, .. } => controller,
            Shell::Failed(err) => {
                let detail = err.clone();
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(40.0);
                        ui.heading(RichText::new(ERROR_LABEL).color(colors.danger));
                        ui.label(RichText::new(detail).color(colors.text_muted).small());
                    });
                });
                return;
            }
        };

        controller.sync();
        if controller.is_loading() {
            ctx.request_repaint_after(LOADING_REPAINT);
        }

        let mut toggle_theme = false;
        let mut outcome: Option<Result<(), String>> = None;

        egui::TopBottomPanel::top("top_bar")
            .frame(
                Frame::new()
                    .fill(colors.panel)
                    .stroke(Stroke::new(1.0, colors.border))
                    .inner_margin(Margin::symmetric(12, 8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let menu_icon = if controller.menu_open() { "✕" } else { "☰" };
                    if ui.button(menu_icon).clicked() {
                        controller.on_toggle_menu();
                    }
                    ui.heading(RichText::new("Retro Games").color(colors.accent));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let label = match self.theme {
                            Theme::Light => "🌙",
                            Theme::Dark => "☀",
                        };
                        toggle_theme = ui.button(label).clicked();
                    });
                });
            });

        egui::TopBottomPanel::bottom("action_buttons")
            .frame(
                Frame::new()
                    .fill(colors.panel)
                    .stroke(Stroke::new(1.0, colors.border))
                    .inner_margin(Margin::symmetric(12, 8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if ui.button("⛶ Fullscreen").clicked() {
                        outcome = Some(controller.open_fullscreen());
                    }
                    let rate = ui
                        .add_enabled(controller.can_rate(), egui::Button::new("★ Rate"))
                        .on_disabled_hover_text("No extension id configured");
                    if rate.clicked() {
                        outcome = Some(controller.open_rating_link());
                    }
                    if let Some(err) = &self.action_error {
                        ui.label(RichText::new(err).color(colors.danger).small());
                    }
                });
            });

        if controller.menu_open() {
            egui::SidePanel::left("game_menu")
                .resizable(false)
                .exact_width(MENU_WIDTH)
                .frame(
                    Frame::new()
                        .fill(colors.panel)
                        .inner_margin(Margin::same(10)),
                )
                .show(ctx, |ui| {
                    if let Some(game) = render_menu(ui, controller, &colors) {
                        outcome = Some(controller.open_game(&game));
                    }
                });
        }

        egui::CentralPanel::default()
            .frame(Frame::new().fill(colors.bg).inner_margin(Margin::same(14)))
            .show(ctx, |ui| {
                if render_featured(ui, &colors) {
                    outcome = Some(controller.open_featured());
                }
            });

        if toggle_theme {
            self.toggle_theme();
        }
        if let Some(result) = outcome {
            self.report(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(id: i64, name: &str) -> Game {
        Game {
            id,
            name: name.to_owned(),
            description: String::new(),
            thumb: String::new(),
            link: format!("https://games.example/{id}"),
        }
    }

    #[test]
    fn listing_prints_matches_only() {
        let catalog = vec![game(1, "Pac-Man"), game(2, "Tetris")];
        let listing = render_listing(&catalog, "pac");
        assert_eq!(listing, "   1  Pac-Man  https://games.example/1\n");
    }

    #[test]
    fn listing_falls_back_to_suggestions() {
        let catalog: Vec<Game> = (1..=5).map(|id| game(id, &format!("Game {id}"))).collect();
        let listing = render_listing(&catalog, "zzz");
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines[0], NO_RESULTS);
        assert_eq!(lines[1], SUGGESTIONS_HEADING);
        assert_eq!(lines.len(), 5);
        assert!(lines[4].contains("Game 3"));
    }

    #[test]
    fn listing_of_empty_catalog_has_no_suggestions() {
        assert_eq!(
            render_listing(&[], ""),
            format!("{NO_RESULTS}\n{SUGGESTIONS_HEADING}\n")
        );
    }

    #[test]
    fn thumbnails_load_only_from_web_urls() {
        assert_eq!(
            thumbnail_uri(" https://thumbs.example/1.png "),
            Some("https://thumbs.example/1.png")
        );
        assert_eq!(thumbnail_uri("http://t/2.jpg"), Some("http://t/2.jpg"));
        assert_eq!(thumbnail_uri(""), None);
        assert_eq!(thumbnail_uri("javascript:alert(1)"), None);
    }

    #[test]
    fn featured_thumbnail_is_loadable() {
        assert_eq!(thumbnail_uri(FIXED_GAME.thumb), Some(FIXED_GAME.thumb));
    }

    #[test]
    fn palette_background_follows_theme() {
        assert_eq!(ThemePalette::for_theme(Theme::Light).bg, Color32::WHITE);
        assert_eq!(ThemePalette::for_theme(Theme::Dark).bg, Color32::BLACK);
    }
}
