/*
 * Quesuene
 * Version: 1.0
 * Copyright (c) 2025 Peter Leukanič
 * Under MIT License
 * Feel free to share and modify
 *
 * Per-application volume overlay for Linux PulseAudio/PipeWire desktops
 */

use gtk::Application;
use gtk::prelude::*;
use quesuene::{AudioControl, FatalSlot, Overlay, OverlayConfig, style};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const APP_ID: &str = "io.github.quesuene";

fn main() -> glib::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quesuene=info")),
        )
        .init();

    let config = match OverlayConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return glib::ExitCode::FAILURE;
        }
    };

    let audio: Rc<dyn AudioControl> = match config.pactl() {
        Ok(pactl) => Rc::new(pactl),
        Err(e) => {
            error!("{}", e);
            return glib::ExitCode::FAILURE;
        }
    };

    // Every launch gets its own overlay
    let app = Application::new(Some(APP_ID), gio::ApplicationFlags::NON_UNIQUE);

    let fatal: FatalSlot = Rc::default();
    let overlay: Rc<RefCell<Option<Overlay>>> = Rc::default();

    {
        let fatal = Rc::clone(&fatal);
        let overlay = Rc::clone(&overlay);
        app.connect_activate(move |app| {
            style::install(&config.font);

            match Overlay::new(app, &config, Rc::clone(&audio), Rc::clone(&fatal)) {
                Ok(built) => {
                    built.present();
                    overlay.replace(Some(built));
                }
                Err(e) => {
                    error!("Failed to list sink inputs: {}", e);
                    *fatal.borrow_mut() = Some(e);
                }
            }
        });
    }

    let exit_code = app.run();

    if let Some(e) = fatal.borrow_mut().take() {
        error!("Exiting after failure: {}", e);
        return glib::ExitCode::FAILURE;
    }

    info!("Overlay closed");
    exit_code
}
