//! John Chase entry point
//!
//! On the web this wires the DOM (canvas, HUD, level list, weapon picker) to the
//! game. Natively it runs a headless auto-play through the level catalog.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod web_app {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use glam::Vec2;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::convert::FromWasmAbi;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, MouseEvent,
    };

    use john_chase::assets::{ImageCache, TARGET_IMAGE, TARGET_IMAGE_FILE};
    use john_chase::platform::Viewport;
    use john_chase::platform::web::{AnimationFrameScheduler, FrameCallbackSlot};
    use john_chase::renderer::CanvasSurface;
    use john_chase::ui::{TextSink, UiSinks};
    use john_chase::weapons::{WeaponCatalog, WeaponSelection};
    use john_chase::{Game, LevelCatalog, LevelEvent, Settings};

    /// Everything a frame callback touches
    struct App {
        game: Game,
        images: ImageCache,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
    }

    impl App {
        fn render_frame(&mut self, now: f64) {
            let display = Vec2::new(
                self.canvas.client_width() as f32,
                self.canvas.client_height() as f32,
            );
            self.game.set_display_size(display);

            let App {
                game,
                images,
                canvas,
                ctx,
            } = self;
            let images: &ImageCache = images;
            let mut surface = CanvasSurface::new(canvas, ctx, images);
            game.frame(now, images, &mut surface);
        }
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map_or(0.0, |p| p.now())
    }

    fn viewport_of(canvas: &HtmlCanvasElement) -> Viewport {
        let rect = canvas.get_bounding_client_rect();
        Viewport::new(
            rect.left() as f32,
            rect.top() as f32,
            rect.width() as f32,
            rect.height() as f32,
        )
    }

    fn text_sink(document: &Document, id: &str) -> Option<Box<dyn TextSink>> {
        let el = document.get_element_by_id(id);
        if el.is_none() {
            log::warn!("HUD element #{} not found", id);
        }
        el.map(|el| Box::new(el) as Box<dyn TextSink>)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {e}").into());
        }

        log::info!("John Chase starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("game")
            .ok_or("no #game canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let size = Vec2::new(
            canvas.client_width().max(1) as f32,
            canvas.client_height().max(1) as f32,
        );
        canvas.set_width(size.x as u32);
        canvas.set_height(size.y as u32);

        let catalog = LevelCatalog::default();
        let weapons = WeaponCatalog::default();

        let mut images = ImageCache::new();
        images.load(TARGET_IMAGE, TARGET_IMAGE_FILE);
        for weapon in weapons.iter() {
            images.load(&weapon.id, &weapon.file);
        }

        let slot: FrameCallbackSlot = Rc::new(RefCell::new(None));
        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(
            catalog.clone(),
            size,
            seed,
            Box::new(AnimationFrameScheduler::new(slot.clone())),
        );
        game.set_ui(UiSinks {
            timer: text_sink(&document, "timer"),
            level_name: text_sink(&document, "levelName"),
            state_label: text_sink(&document, "state"),
        });
        log::info!("Game initialized with seed: {}", seed);

        let settings = Rc::new(RefCell::new(Settings::load()));

        let app = Rc::new(RefCell::new(App {
            game,
            images,
            canvas: canvas.clone(),
            ctx,
        }));

        {
            let app = Rc::downgrade(&app);
            *slot.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(move |now: f64| {
                if let Some(app) = app.upgrade() {
                    app.borrow_mut().render_frame(now);
                }
            }));
        }

        // Secret unlock on clearing the last regular level
        {
            let settings = settings.clone();
            let catalog = catalog.clone();
            let document = document.clone();
            let weak = Rc::downgrade(&app);
            app.borrow_mut().game.on_level_event(move |event| {
                let LevelEvent::Complete { index } = event else {
                    return;
                };
                if catalog.unlocks_secret(index) && settings.borrow_mut().unlock_secret() {
                    log::info!("Secret levels unlocked");
                    settings.borrow().save();
                    schedule_level_list_rebuild(&document, &catalog, weak.clone());
                }
            });
        }

        setup_canvas_input(&canvas, app.clone());
        setup_buttons(&document, app.clone());
        build_level_list(&document, &catalog, settings.borrow().secret_unlocked, app.clone());

        let selection = Rc::new(RefCell::new(WeaponSelection::new(weapons)));
        setup_weapon_picker(&document, selection.clone(), app.clone(), settings.clone());

        let saved = settings.borrow().weapon.clone();
        if let Some(id) = saved {
            selection.borrow_mut().select(&id);
        }
        selection.borrow_mut().select_default();

        app.borrow_mut().game.start_level(0, now_ms());
        log::info!("John Chase running!");
        Ok(())
    }

    fn add_listener<E: FromWasmAbi + 'static>(
        target: &web_sys::EventTarget,
        kind: &str,
        handler: impl FnMut(E) + 'static,
    ) {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        {
            log::warn!("Could not listen for {}: {:?}", kind, e);
        }
        closure.forget();
    }

    fn setup_canvas_input(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            add_listener(canvas, "mousemove", move |event: MouseEvent| {
                let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
                app.borrow_mut()
                    .game
                    .on_pointer_move(client, viewport_of(&canvas_clone));
            });
        }

        let canvas_clone = canvas.clone();
        add_listener(canvas, "click", move |event: MouseEvent| {
            let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
            let outcome = app.borrow_mut().game.on_pointer_click(
                client,
                viewport_of(&canvas_clone),
                now_ms(),
            );
            log::debug!("Click: {:?}", outcome);
        });
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        if let Some(btn) = document.get_element_by_id("restart") {
            let app = app.clone();
            add_listener(&btn, "click", move |_event: MouseEvent| {
                app.borrow_mut().game.restart_level(now_ms());
            });
        }

        if let Some(btn) = document.get_element_by_id("next") {
            add_listener(&btn, "click", move |_event: MouseEvent| {
                app.borrow_mut().game.next_level(now_ms());
            });
        }
    }

    fn build_level_list(
        document: &Document,
        catalog: &LevelCatalog,
        secret_unlocked: bool,
        app: Rc<RefCell<App>>,
    ) {
        let Some(list) = document.get_element_by_id("levels") else {
            log::warn!("Level list #levels not found");
            return;
        };
        list.set_inner_html("");

        for (index, label) in catalog.listing(secret_unlocked) {
            let Ok(item) = document.create_element("li") else {
                continue;
            };
            item.set_text_content(Some(&label));
            let _ = item.set_attribute("style", "cursor: pointer");

            let app = app.clone();
            add_listener(&item, "click", move |_event: MouseEvent| {
                app.borrow_mut().game.start_level(index, now_ms());
            });
            let _ = list.append_child(&item);
        }
    }

    /// Rebuild the level list (secret levels shown) once the current event
    /// handler returns. The game is mutably borrowed while level events fire.
    fn schedule_level_list_rebuild(document: &Document, catalog: &LevelCatalog, app: Weak<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let document = document.clone();
        let catalog = catalog.clone();
        let callback = Closure::once_into_js(move || {
            if let Some(app) = app.upgrade() {
                build_level_list(&document, &catalog, true, app);
            }
        });
        if let Err(e) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), 0)
        {
            log::warn!("Could not schedule level list rebuild: {:?}", e);
        }
    }

    fn setup_weapon_picker(
        document: &Document,
        selection: Rc<RefCell<WeaponSelection>>,
        app: Rc<RefCell<App>>,
        settings: Rc<RefCell<Settings>>,
    ) {
        // Game cursor + persistence
        selection.borrow_mut().subscribe(move |weapon| {
            app.borrow_mut().game.set_weapon(&weapon.id);
            if settings.borrow_mut().set_weapon(&weapon.id) {
                settings.borrow().save();
            }
        });

        // Picker highlight and preview
        {
            let document = document.clone();
            selection.borrow_mut().subscribe(move |weapon| {
                show_selected_weapon(&document, &weapon.id, &weapon.file, &weapon.label)
            });
        }

        let Some(container) = document.get_element_by_id("arsenal") else {
            log::warn!("Weapon picker #arsenal not found");
            return;
        };
        container.set_inner_html("");

        let weapons: Vec<_> = selection.borrow().catalog().iter().cloned().collect();
        for weapon in weapons {
            let Ok(el) = document.create_element("div") else {
                continue;
            };
            el.set_class_name("weapon");
            let _ = el.set_attribute("tabindex", "0");
            let _ = el.set_attribute("data-weapon-id", &weapon.id);

            if let Ok(img) = document.create_element("img") {
                let _ = img.set_attribute("src", &weapon.file);
                let _ = img.set_attribute("alt", &weapon.label);
                let _ = el.append_child(&img);
            }
            if let Ok(label) = document.create_element("div") {
                label.set_class_name("weapon-label");
                label.set_text_content(Some(&weapon.label));
                let _ = el.append_child(&label);
            }

            {
                let selection = selection.clone();
                let id = weapon.id.clone();
                add_listener(&el, "click", move |_event: MouseEvent| {
                    selection.borrow_mut().select(&id);
                });
            }
            {
                let selection = selection.clone();
                let id = weapon.id.clone();
                add_listener(&el, "keydown", move |event: web_sys::KeyboardEvent| {
                    if matches!(event.key().as_str(), "Enter" | " ") {
                        selection.borrow_mut().select(&id);
                    }
                });
            }
            let _ = container.append_child(&el);
        }
    }

    fn show_selected_weapon(document: &Document, id: &str, file: &str, label: &str) {
        if let Ok(Some(prev)) = document.query_selector(".weapon.selected") {
            let _ = prev.class_list().remove_1("selected");
        }
        let selector = format!(".weapon[data-weapon-id=\"{}\"]", id);
        if let Ok(Some(el)) = document.query_selector(&selector) {
            let _ = el.class_list().add_1("selected");
        }

        if let Some(preview) = document
            .get_element_by_id("weaponPreview")
            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
        {
            preview.set_src(file);
            preview.set_alt(label);
        }
        if let Some(name) = document.get_element_by_id("selectedName") {
            name.set_text_content(Some(label));
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    web_app::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use john_chase::assets::{ImageInfo, StaticImages, TARGET_IMAGE};
    use john_chase::platform::{ManualScheduler, Viewport};
    use john_chase::renderer::DrawCommand;
    use john_chase::sim::ClickOutcome;
    use john_chase::weapons::DEFAULT_WEAPON;
    use john_chase::{Game, GamePhase, LevelCatalog, LevelEvent, Settings};

    const CANVAS: Vec2 = Vec2::new(1280.0, 720.0);
    /// Simulated display refresh
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// How fast the bot can move the pointer (pixels/s)
    const BOT_SPEED: f32 = 1400.0;
    /// Minimum gap between bot clicks
    const BOT_CLICK_COOLDOWN_MS: f64 = 120.0;
    /// Frames to keep running after the level ends (lets the win animation play)
    const TAIL_FRAMES: u32 = 90;

    /// Result of one auto-played level
    #[derive(Debug)]
    pub struct LevelRun {
        pub index: usize,
        pub name: String,
        pub phase: GamePhase,
        pub seconds_played: f64,
        pub clicks: u32,
        pub hits: u32,
    }

    pub fn play_all(catalog: LevelCatalog, seed: u64) -> Vec<LevelRun> {
        let scheduler = ManualScheduler::new();
        let mut game = Game::new(catalog, CANVAS, seed, Box::new(scheduler.clone()));
        let images = StaticImages::new()
            .with(TARGET_IMAGE, ImageInfo::new(256.0, 256.0))
            .with(DEFAULT_WEAPON, ImageInfo::new(64.0, 64.0));
        let mut surface: Vec<DrawCommand> = Vec::new();

        let settings = Rc::new(RefCell::new(Settings::load()));
        {
            let settings = settings.clone();
            let catalog = game.levels().clone();
            game.on_level_event(move |event| {
                log::info!("Level event: {:?}", event);
                if let LevelEvent::Complete { index } = event {
                    if catalog.unlocks_secret(index) && settings.borrow_mut().unlock_secret() {
                        log::info!("Secret levels unlocked");
                        settings.borrow().save();
                    }
                }
            });
        }

        let viewport = Viewport::new(0.0, 0.0, CANVAS.x, CANVAS.y);
        let mut now = 0.0;
        let mut runs = Vec::new();

        for index in 0..game.levels().len() {
            game.start_level(index, now);
            let started = now;
            let mut pointer = Vec2::new(CANVAS.x / 2.0, CANVAS.y - 1.0);
            let mut last_click = f64::MIN;
            let (mut clicks, mut hits) = (0, 0);
            let mut tail = 0;

            while scheduler.fire().is_some() {
                now += FRAME_MS;

                if game.phase() == GamePhase::Running {
                    let target = game.target();
                    let (target_pos, reach) = (target.pos, target.hit_radius() * 0.8);
                    let to_target = target_pos - pointer;
                    let step = BOT_SPEED * (FRAME_MS / 1000.0) as f32;
                    pointer += to_target.clamp_length_max(step);
                    game.on_pointer_move(pointer, viewport);

                    if pointer.distance(target_pos) <= reach
                        && now - last_click >= BOT_CLICK_COOLDOWN_MS
                    {
                        last_click = now;
                        clicks += 1;
                        match game.on_pointer_click(pointer, viewport, now) {
                            ClickOutcome::Hit { .. } | ClickOutcome::Defeated => hits += 1,
                            ClickOutcome::Miss | ClickOutcome::Ignored => {}
                        }
                    }
                } else {
                    tail += 1;
                    if tail > TAIL_FRAMES {
                        break;
                    }
                }

                game.frame(now, &images, &mut surface);
            }

            let level = game.current_level().map(|l| l.name.clone()).unwrap_or_default();
            let run = LevelRun {
                index,
                name: level,
                phase: game.phase(),
                seconds_played: (now - started) / 1000.0,
                clicks,
                hits,
            };
            log::info!(
                "Level {} '{}': {:?} after {:.1}s ({} clicks, {} hits, {} draw commands last frame)",
                run.index + 1,
                run.name,
                run.phase,
                run.seconds_played,
                run.clicks,
                run.hits,
                surface.len()
            );
            runs.push(run);
        }

        game.stop();
        runs
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use john_chase::LevelCatalog;

    env_logger::init();
    log::info!("John Chase (native) starting headless auto-play...");

    let catalog = match std::env::args().nth(1) {
        Some(path) => {
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|json| LevelCatalog::from_json(&json).map_err(|e| e.to_string()));
            match loaded {
                Ok(catalog) => catalog,
                Err(e) => {
                    log::error!("Could not load levels from {}: {}", path, e);
                    return std::process::ExitCode::FAILURE;
                }
            }
        }
        None => LevelCatalog::default(),
    };

    let seed = std::env::var("JOHN_CHASE_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5EED);

    let runs = headless::play_all(catalog, seed);
    let won = runs
        .iter()
        .filter(|r| r.phase == john_chase::GamePhase::Won)
        .count();
    println!("Auto-play finished: {}/{} levels won (seed {})", won, runs.len(), seed);
    std::process::ExitCode::SUCCESS
}
