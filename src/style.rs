/*
 * Quesuene - Style Module
 * Version: 1.0
 * Copyright (c) 2025 Peter Leukanič
 * Under MIT License
 * Feel free to share and modify
 */

use gtk::prelude::*;
use gtk::{CssProvider, STYLE_PROVIDER_PRIORITY_APPLICATION, StyleContext};
use tracing::warn;

const APP_CSS: &str = r#"
window.quesuene {
    background-color: rgba(0, 0, 0, 0.55);
}

window.quesuene label {
    color: white;
    font: @FONT@;
}

window.quesuene scale trough {
    background-color: #F1F1F5;
    min-height: 5px;
    border-radius: 4px;
    border: none;
}

window.quesuene scale highlight {
    background-color: #47A6E6;
    border: 1px solid #777777;
    border-radius: 4px;
}

window.quesuene scale slider {
    background-color: #F0F1F5;
    background-image: none;
    border: none;
    min-width: 9px;
    min-height: 9px;
    margin: -2px 0;
    border-radius: 3px;
}
"#;

/// Stylesheet with the label font substituted in.
pub fn stylesheet(font: &str) -> String {
    APP_CSS.replace("@FONT@", &css_font(font))
}

/// Turn a Pango description like "Sans Serif 11" into a CSS font shorthand.
fn css_font(font: &str) -> String {
    let font = font.trim();
    match font.rsplit_once(' ') {
        Some((family, size)) if size.parse::<f64>().is_ok() => {
            format!("{}pt \"{}\"", size, family.trim())
        }
        _ => format!("11pt \"{}\"", font),
    }
}

/// Install the application stylesheet on the default screen.
pub fn install(font: &str) {
    let provider = CssProvider::new();
    if let Err(e) = provider.load_from_data(stylesheet(font).as_bytes()) {
        warn!("Failed to load stylesheet: {}", e);
        return;
    }

    match gtk::gdk::Screen::default() {
        Some(screen) => StyleContext::add_provider_for_screen(
            &screen,
            &provider,
            STYLE_PROVIDER_PRIORITY_APPLICATION,
        ),
        None => warn!("No default screen, stylesheet not installed"),
    }
}
