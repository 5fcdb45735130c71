/*
 * Quesuene - User Interface Module
 * Version: 1.0
 * Copyright (c) 2025 Peter Leukanič
 * Under MIT License
 * Feel free to share and modify
 *
 * Transient overlay with one volume slider per sink input
 */

use glib::ControlFlow;
use gtk::gdk::{self, Rectangle};
use gtk::prelude::*;
use gtk::{Application, ApplicationWindow, Box as GtkBox, Label, Orientation, Scale};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::audio::{AudioControl, AudioError, SinkInput};
use crate::config::OverlayConfig;
use crate::control::VolumeBinding;
use crate::idle::{IdleSession, Scheduler};

/// Where a failure that must end the process is recorded for `main`.
pub type FatalSlot = Rc<RefCell<Option<AudioError>>>;

pub struct StreamControl {
    pub container: GtkBox,
    pub label: Label,
    pub slider: Scale,
    binding: Rc<VolumeBinding>,
}

impl StreamControl {
    pub fn new(binding: VolumeBinding, config: &OverlayConfig, on_error: Rc<dyn Fn(AudioError)>) -> Self {
        let binding = Rc::new(binding);

        let container = GtkBox::new(Orientation::Horizontal, 12);

        let label = Label::new(Some(&binding.sink_input().app_name));
        label.set_halign(gtk::Align::Start);
        label.set_hexpand(true);
        label.set_max_width_chars(24);
        label.set_ellipsize(gtk::pango::EllipsizeMode::End);

        let upper = binding.slider_upper_bound(config.max_volume);
        let slider = Scale::with_range(Orientation::Horizontal, 0.0, upper, 1.0);
        slider.set_digits(0);
        slider.set_draw_value(false);
        slider.set_increments(1.0, 10.0);
        slider.set_size_request(config.slider_width, -1);
        slider.set_value(binding.initial_value());

        container.pack_start(&label, true, true, 0);
        container.pack_start(&slider, false, false, 0);

        let control = Self {
            container,
            label,
            slider,
            binding,
        };
        control.setup_signals(on_error);
        control
    }

    fn setup_signals(&self, on_error: Rc<dyn Fn(AudioError)>) {
        let binding = Rc::clone(&self.binding);

        self.slider.connect_value_changed(move |slider| {
            if let Err(e) = binding.value_changed(slider.value()) {
                on_error(e);
            }
        });
    }

    pub fn sink_input(&self) -> &SinkInput {
        self.binding.sink_input()
    }
}

/// `Scheduler` backed by one-shot glib timeout sources on the main loop.
pub struct GlibScheduler;

impl Scheduler for GlibScheduler {
    type Handle = glib::SourceId;

    fn schedule(&self, after: Duration, on_expire: Box<dyn FnOnce()>) -> glib::SourceId {
        let mut on_expire = Some(on_expire);
        glib::timeout_add_local(after, move || {
            if let Some(on_expire) = on_expire.take() {
                on_expire();
            }
            ControlFlow::Break
        })
    }

    fn cancel(&self, handle: glib::SourceId) {
        handle.remove();
    }
}

pub struct Overlay {
    window: ApplicationWindow,
    session: Rc<IdleSession<GlibScheduler>>,
    pub controls: Vec<StreamControl>,
}

impl Overlay {
    /// Enumerate sink inputs once and build one slider per stream.
    pub fn new(
        app: &Application,
        config: &OverlayConfig,
        audio: Rc<dyn AudioControl>,
        fatal: FatalSlot,
    ) -> Result<Self, AudioError> {
        let sink_inputs = audio.list_sink_inputs()?;
        info!(streams = sink_inputs.len(), "Found sink inputs");

        let window = ApplicationWindow::new(app);
        window.set_title("Quesuene");
        window.style_context().add_class("quesuene");
        // taskbarless and frameless
        window.set_decorated(false);
        window.set_skip_taskbar_hint(true);
        window.set_skip_pager_hint(true);
        window.set_type_hint(gdk::WindowTypeHint::Utility);
        window.set_keep_above(true);
        window.set_resizable(false);
        enable_translucency(&window);

        let session = {
            let window = window.clone();
            IdleSession::new(config.idle_timer(), GlibScheduler, move || window.close())
        };

        let main_box = GtkBox::new(Orientation::Vertical, 6);
        main_box.set_margin_top(12);
        main_box.set_margin_bottom(12);
        main_box.set_margin_start(12);
        main_box.set_margin_end(12);

        let on_activity: Rc<dyn Fn()> = {
            let weak = Rc::downgrade(&session);
            Rc::new(move || {
                if let Some(session) = weak.upgrade() {
                    session.record_activity();
                }
            })
        };

        let on_error: Rc<dyn Fn(AudioError)> = {
            let weak = Rc::downgrade(&session);
            Rc::new(move |e: AudioError| {
                error!("Failed to set volume: {}", e);
                fatal.borrow_mut().get_or_insert(e);
                if let Some(session) = weak.upgrade() {
                    session.close();
                }
            })
        };

        let controls: Vec<StreamControl> = sink_inputs
            .into_iter()
            .map(|sink_input| {
                let binding = VolumeBinding::new(sink_input, Rc::clone(&audio), Rc::clone(&on_activity));
                StreamControl::new(binding, config, Rc::clone(&on_error))
            })
            .collect();

        for control in &controls {
            main_box.pack_start(&control.container, false, false, 0);
        }
        window.add(&main_box);

        let overlay = Self {
            window,
            session,
            controls,
        };
        overlay.setup_signals();
        Ok(overlay)
    }

    fn setup_signals(&self) {
        let weak = Rc::downgrade(&self.session);
        self.window.connect_key_press_event(move |_, event| {
            if event.keyval() == gdk::keys::constants::Escape {
                if let Some(session) = weak.upgrade() {
                    info!("Overlay dismissed");
                    session.close();
                }
                return glib::Propagation::Stop;
            }
            glib::Propagation::Proceed
        });

        let weak = Rc::downgrade(&self.session);
        self.window.connect_destroy(move |_| {
            if let Some(session) = weak.upgrade() {
                session.shutdown();
            }
        });
    }

    pub fn window(&self) -> &ApplicationWindow {
        &self.window
    }

    /// Center on the primary monitor, show, and start the idle countdown.
    pub fn present(&self) {
        let window = &self.window;
        window.show_all();

        let (_, natural) = window.preferred_size();
        match primary_monitor_geometry() {
            Some(area) => {
                let (x, y) = centered_origin(&area, natural.width, natural.height);
                window.move_(x, y);
            }
            None => {
                warn!("No monitor found, leaving placement to the window manager");
                window.set_position(gtk::WindowPosition::Center);
            }
        }

        self.session.start();
    }
}

/// RGBA visual for the CSS background alpha. The window stays
/// non-app-paintable so GTK renders that background.
fn enable_translucency(window: &ApplicationWindow) {
    let Some(screen) = WidgetExt::screen(window) else {
        return;
    };
    match screen.rgba_visual() {
        Some(visual) if screen.is_composited() => window.set_visual(Some(&visual)),
        _ => warn!("No compositing manager, overlay background will be opaque"),
    }
}

fn primary_monitor_geometry() -> Option<Rectangle> {
    let display = gdk::Display::default()?;
    display
        .primary_monitor()
        .or_else(|| display.monitor(0))
        .map(|monitor| monitor.geometry())
}

/// Top-left position that centers a window of the given size in `area`.
pub fn centered_origin(area: &Rectangle, width: i32, height: i32) -> (i32, i32) {
    (
        area.x() + (area.width() - width) / 2,
        area.y() + (area.height() - height) / 2,
    )
}
