//! Square Catch entry point
//!
//! Wires the browser (canvas, DOM controls, input events, session signals)
//! to the simulation and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlButtonElement, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent};

    use square_catch::auth::{self, AuthHub};
    use square_catch::hud::{self, Controls};
    use square_catch::renderer::{RenderState, scene};
    use square_catch::sim::{Command, KeyAction, Session, WallClock, dispatch, tick};
    use square_catch::{ConfigError, GameConfig};

    /// Game instance holding all state
    struct Game {
        session: Session,
        render_state: Option<RenderState>,
        hub: Rc<RefCell<AuthHub>>,
        /// Log revision last copied into the DOM
        shown_log_revision: Option<u64>,
    }

    impl Game {
        fn new(
            config: GameConfig,
            seed: u64,
            hub: Rc<RefCell<AuthHub>>,
        ) -> Result<Self, ConfigError> {
            let authenticated = hub.borrow().is_authenticated();
            let mut session = Session::new(config, seed, authenticated)?;
            session.clock = wall_clock();
            Ok(Self {
                session,
                render_state: None,
                hub,
                shown_log_revision: None,
            })
        }

        /// Apply a command now. Rejections are already in the event log.
        fn send(&mut self, command: Command) {
            if let Err(rejection) = dispatch(&mut self.session, command, now_ms()) {
                log::debug!("{:?} rejected: {}", command, rejection);
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let vertices = scene(&self.session);
            let surface = self.session.surface;
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices, surface) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let session = &self.session;

            set_text(&document, "score-label", &session.points.to_string());
            set_text(&document, "time-label", &hud::format_time(session.remaining_ms));
            set_text(&document, "state-label", hud::state_label(session));
            if let Some((x, y)) = session.pointer {
                set_text(&document, "mouse-log", &hud::pointer_label(x, y));
            }

            let user = self
                .hub
                .borrow()
                .user()
                .map(|u| u.label().to_string())
                .unwrap_or_default();
            set_text(&document, "user-label", &user);

            let controls = Controls::from_session(session);
            set_disabled(&document, "btn-start", !controls.start_enabled);
            set_disabled(&document, "btn-pause", !controls.pause_enabled);
            set_disabled(&document, "btn-reset", !controls.reset_enabled);
            set_text(&document, "btn-pause", controls.pause_label);

            if let Some(el) = document.get_element_by_id("game-surface") {
                let classes = el.class_list();
                for (class, on) in hud::surface_classes(session) {
                    let _ = classes.toggle_with_force(class, on);
                }
            }

            let revision = session.log.revision();
            if self.shown_log_revision != Some(revision) {
                if let Some(list) = document.get_element_by_id("event-log") {
                    list.set_inner_html("");
                    for entry in session.log.entries() {
                        if let Ok(item) = document.create_element("li") {
                            item.set_text_content(Some(&entry.to_string()));
                            let _ = list.append_child(&item);
                        }
                    }
                }
                self.shown_log_revision = Some(revision);
            }
        }
    }

    /// Host clock shared by every command and frame
    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Anchor performance time to the local wall clock for log timestamps
    fn wall_clock() -> WallClock {
        let date = js_sys::Date::new_0();
        WallClock {
            origin_epoch_ms: js_sys::Date::now() - now_ms(),
            utc_offset_minutes: -(date.get_timezone_offset() as i32),
        }
    }

    fn set_text(document: &web_sys::Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_disabled(document: &web_sys::Document, id: &str, disabled: bool) {
        if let Some(btn) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
        {
            btn.set_disabled(disabled);
        }
    }

    /// Focus on a text field or contenteditable element
    fn is_editable(target: Option<web_sys::EventTarget>) -> bool {
        let Some(el) = target.and_then(|t| t.dyn_into::<HtmlElement>().ok()) else {
            return false;
        };
        matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT") || el.is_content_editable()
    }

    /// Show queued notices. The game borrow is released before the blocking
    /// alert so nothing re-enters a live borrow.
    fn show_notices(game: &Rc<RefCell<Game>>) {
        let texts: Vec<String> = {
            let mut g = game.borrow_mut();
            let notices = g.session.drain_notices();
            notices
                .iter()
                .map(|n| hud::notice_text(n, &g.session.config))
                .collect()
        };
        if let Some(window) = web_sys::window() {
            for text in texts {
                let _ = window.alert_with_message(&text);
            }
        }
    }

    /// Dispatch and surface any notice the command raised
    fn send(game: &Rc<RefCell<Game>>, command: Command) {
        game.borrow_mut().send(command);
        show_notices(game);
    }

    /// Canvas backing size in physical pixels plus the CSS-pixel surface
    fn fit_canvas(canvas: &HtmlCanvasElement) -> ((u32, u32), (f32, f32)) {
        let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
        let (css_w, css_h) = match canvas.parent_element() {
            Some(parent) if parent.client_width() > 0 && parent.client_height() > 0 => {
                (parent.client_width(), parent.client_height())
            }
            _ => (canvas.client_width(), canvas.client_height()),
        };
        let width = (css_w as f64 * dpr) as u32;
        let height = (css_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);
        ((width, height), (css_w as f32, css_h as f32))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Square Catch starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game-canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let ((width, height), (surface_w, surface_h)) = fit_canvas(&canvas);

        let config = GameConfig::load();
        let hub = auth::browser::install_bridge();
        let seed = js_sys::Date::now() as u64;
        let game = match Game::new(config, seed, hub.clone()) {
            Ok(game) => Rc::new(RefCell::new(game)),
            Err(e) => {
                log::error!("Invalid game config: {}", e);
                return;
            }
        };
        game.borrow_mut().send(Command::Resize {
            width: surface_w,
            height: surface_h,
        });

        log::info!("Game initialized with seed: {}", seed);

        // Session signals become commands
        {
            let mut hub = hub.borrow_mut();
            let on_login = game.clone();
            hub.on_login(move |_| send(&on_login, Command::Login));
            let on_logout = game.clone();
            hub.on_logout(move |_| send(&on_logout, Command::Logout));
        }

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height).await {
                            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                            Err(e) => log::error!("No render device: {}", e),
                        }
                    }
                    Err(e) => log::error!("No graphics adapter: {}", e),
                }
            }
            Err(e) => log::error!("Failed to create surface: {}", e),
        }

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_resize(&canvas, game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Square Catch running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = KeyAction::from_code(&event.code());
                let editable_target = is_editable(event.target());
                if !editable_target && key.blocks_default() {
                    event.prevent_default();
                }
                send(&game, Command::KeyDown { key, editable_target });
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = KeyAction::from_code(&event.code());
                send(&game, Command::KeyUp { key });
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move, relative to the canvas
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                send(
                    &game,
                    Command::PointerMove {
                        x: event.offset_x(),
                        y: event.offset_y(),
                    },
                );
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                send(
                    &game,
                    Command::Click {
                        x: event.offset_x(),
                        y: event.offset_y(),
                    },
                );
            });
            let _ = canvas
                .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Right click never opens the browser menu over the surface
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                event.prevent_default();
                send(&game, Command::ContextMenu);
            });
            let _ = canvas
                .add_event_listener_with_callback("contextmenu", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };

        for (id, command) in [
            ("btn-start", Command::Start),
            ("btn-pause", Command::TogglePause),
            ("btn-reset", Command::Reset),
        ] {
            if let Some(btn) = document.get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    send(&game, command);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let ((width, height), (surface_w, surface_h)) = fit_canvas(&canvas);
            let mut g = game.borrow_mut();
            g.send(Command::Resize {
                width: surface_w,
                height: surface_h,
            });
            if let Some(ref mut render_state) = g.render_state {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    log::info!("Tab hidden");
                    send(&game, Command::FocusLost);
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                log::info!("Window blurred");
                send(&game, Command::FocusLost);
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            tick(&mut g.session, time);
            g.render();
            g.update_hud();
        }
        show_notices(&game);

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Square Catch (native) starting...");
    log::info!("The playable build runs in the browser - use `trunk serve` for the web version");

    demo_match();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted match: steer toward the target for a few seconds, click, end.
#[cfg(not(target_arch = "wasm32"))]
fn demo_match() {
    use square_catch::hud;
    use square_catch::sim::{KeyAction, MovementKey, dispatch, tick};
    use square_catch::{Command, GameConfig, Session};

    const FRAME_MS: f64 = 1000.0 / 60.0;

    let mut session = match Session::new(GameConfig::load(), 7, false) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Invalid game config: {}", e);
            return;
        }
    };
    let mut now = 0.0;

    fn send(session: &mut Session, command: Command, now: f64) {
        if let Err(rejection) = dispatch(session, command, now) {
            println!("rejected: {}", rejection);
        }
    }

    send(&mut session, Command::Start, now);
    send(&mut session, Command::Login, now);
    send(&mut session, Command::Start, now);

    let steer = [
        (MovementKey::ArrowLeft, MovementKey::ArrowRight, 0usize),
        (MovementKey::ArrowUp, MovementKey::ArrowDown, 1usize),
    ];

    for _ in 0..(5.0 * 1000.0 / FRAME_MS) as u32 {
        now += FRAME_MS;
        if session.target.active {
            let delta = session.target.pos - session.player.pos;
            for (neg, pos, axis) in steer {
                let d = delta[axis];
                for key in [neg, pos] {
                    send(&mut session, Command::KeyUp { key: KeyAction::Move(key) }, now);
                }
                if d.abs() > 2.0 {
                    let key = if d < 0.0 { neg } else { pos };
                    send(
                        &mut session,
                        Command::KeyDown {
                            key: KeyAction::Move(key),
                            editable_target: false,
                        },
                        now,
                    );
                }
            }
        }
        tick(&mut session, now);
    }

    send(&mut session, Command::Click { x: 10, y: 10 }, now);
    send(&mut session, Command::Click { x: 10, y: 10 }, now + 100.0);
    now += 300.0;
    tick(&mut session, now);
    send(&mut session, Command::End, now);

    for notice in session.drain_notices() {
        println!("[notice] {}", hud::notice_text(&notice, &session.config));
    }
    let entries: Vec<_> = session.log.entries().collect();
    for entry in entries.iter().rev() {
        println!("{}", entry);
    }
    println!(
        "{} | {} | time {}",
        hud::state_label(&session),
        session.points,
        hud::format_time(session.remaining_ms)
    );
}
