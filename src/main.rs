use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use eframe::egui;
use log::{error, warn};

mod app;
mod bbox;
mod categories;
mod config;
mod drawing;
mod error;
mod geometry;
mod imaging;
mod queue;
mod session;
mod storage;

use app::{FatalApp, SorterApp};
use config::Config;
use session::Session;

const APP_TITLE: &str = "Image Sorter";

fn native_options(config: &Config) -> eframe::NativeOptions {
    let mut viewport = egui::ViewportBuilder::default()
        .with_title(APP_TITLE)
        .with_inner_size([
            config.display_width as f32 * 2.0 + 48.0,
            config.display_height as f32 + 140.0,
        ]);
    if let Some(path) = config.icon_path() {
        match imaging::load_icon(&path) {
            Ok((rgba, width, height)) => {
                viewport = viewport.with_icon(Arc::new(egui::viewport::IconData { rgba, width, height }));
            }
            Err(e) => warn!("ignoring window icon: {}", e),
        }
    }
    eframe::NativeOptions { viewport, ..Default::default() }
}

fn main() -> Result<()> {
    env_logger::init();
    let config = Config::parse();
    let options = native_options(&config);

    let session = match Session::open(&config) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            let message = if e.is_fatal() {
                e.to_string()
            } else {
                format!("Cannot start: {}", e)
            };
            let shown = eframe::run_native(
                APP_TITLE,
                options,
                Box::new(move |cc| {
                    cc.egui_ctx.set_visuals(egui::Visuals::dark());
                    Box::new(FatalApp::new(message))
                }),
            );
            if let Err(window) = shown {
                warn!("could not show startup error window: {}", window);
            }
            return Err(e.into());
        }
    };

    let app = SorterApp::new(session, &config);
    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow!("{}", e))
}
