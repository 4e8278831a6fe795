//! Spinning text demo
//!
//! Draws one text quad rotating about its center. Keys:
//!
//! - Space: next phrase
//! - F: next font family
//! - C: next color
//! - Up / Down: font size +/- 5
//! - `=` / `-`: scale the quad
//! - P: save the current raster to `text_raster.png`
//! - Escape: quit

mod config;
mod window;

use std::path::Path;
use std::rc::Rc;

use glfw::{Action, Key, WindowEvent};
use text_quad::foundation::logging;
use text_quad::foundation::math::Vec2;
use text_quad::{Color, Config, FontBook, GlowContext, GlowShader, Rect, TextEntity, TextResult};

use crate::config::DemoConfig;
use crate::window::Window;

const CONFIG_PATH: &str = "config/demo.toml";

const PALETTE: [Color; 5] = [
    Color::WHITE,
    Color::rgba(255, 80, 80, 255),
    Color::rgba(80, 220, 120, 255),
    Color::rgba(90, 140, 255, 255),
    Color::rgba(255, 210, 60, 200),
];

type DemoText = TextEntity<GlowContext, GlowShader>;

// Fields drop in order: GL objects go before the window's context
struct TextDemo {
    text: DemoText,
    ctx: Rc<GlowContext>,
    window: Window,
    config: DemoConfig,
    phrase: usize,
    font: usize,
    color: usize,
}

impl TextDemo {
    fn new(mut config: DemoConfig) -> Result<Self, Box<dyn std::error::Error>> {
        config.resolve_paths();

        log::info!("Creating window...");
        let mut window = Window::new(
            &config.window.title,
            config.window.width,
            config.window.height,
            config.window.vsync,
        )?;

        // The window's context stays current on this thread until the demo ends
        let ctx = Rc::new(unsafe {
            GlowContext::from_loader_function(|name| window.get_proc_address(name))
        });
        let (width, height) = window.get_framebuffer_size();
        ctx.set_viewport(width, height);

        let shader = GlowShader::from_files(Rc::clone(&ctx), &config.shaders)?;

        let scene = &config.scene;
        let shape = Rect::new(
            Vec2::new(scene.position[0], scene.position[1]),
            Vec2::new(scene.extent[0], scene.extent[1]),
        );
        let first_phrase = scene.phrases.first().cloned().unwrap_or_default();
        let text = TextEntity::with_config(
            Rc::clone(&ctx),
            shader,
            first_phrase,
            shape,
            &config.text,
            FontBook::system(),
        )?;
        log::info!(
            "Text entity ready, font '{}' resolved to {:?}",
            text.font_family(),
            text.resolved_font_family()
        );

        Ok(Self {
            text,
            ctx,
            window,
            config,
            phrase: 0,
            font: 0,
            color: 0,
        })
    }

    fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        log::info!("Starting text demo...");
        let mut last_frame = self.window.time();

        while !self.window.should_close() {
            self.window.poll_events();
            for event in self.window.flush_events() {
                self.handle_event(&event)?;
            }

            let now = self.window.time();
            let delta = (now - last_frame) as f32;
            last_frame = now;
            self.text
                .shape_mut()
                .rotate_by(self.config.scene.spin_speed * delta);

            self.ctx.clear(self.config.scene.clear_color);
            self.text.render();
            self.window.swap_buffers();
        }

        log::info!("Text demo completed");
        Ok(())
    }

    fn handle_event(&mut self, event: &WindowEvent) -> TextResult<()> {
        match *event {
            WindowEvent::Key(Key::Escape, _, Action::Press, _) | WindowEvent::Close => {
                self.window.set_should_close(true);
            }
            WindowEvent::FramebufferSize(width, height) => {
                self.ctx.set_viewport(width, height);
            }
            WindowEvent::Key(key, _, Action::Press | Action::Repeat, _) => self.handle_key(key)?,
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: Key) -> TextResult<()> {
        match key {
            Key::Space => {
                let phrases = &self.config.scene.phrases;
                if !phrases.is_empty() {
                    self.phrase = (self.phrase + 1) % phrases.len();
                    self.text.set_text(phrases[self.phrase].clone())?;
                }
            }
            Key::F => {
                let fonts = &self.config.scene.fonts;
                if !fonts.is_empty() {
                    self.font = (self.font + 1) % fonts.len();
                    self.text.set_font(fonts[self.font].clone())?;
                    log::info!(
                        "Font '{}' resolved to {:?}",
                        self.text.font_family(),
                        self.text.resolved_font_family()
                    );
                }
            }
            Key::C => {
                self.color = (self.color + 1) % PALETTE.len();
                self.text.set_color(PALETTE[self.color])?;
            }
            Key::Up | Key::Down => {
                let step = if key == Key::Up { 5 } else { -5 };
                let size = i32::try_from(self.text.font_size()).unwrap_or(i32::MAX);
                match self.text.set_font_size(size.saturating_add(step)) {
                    Ok(()) => log::info!("Font size {}", self.text.font_size()),
                    Err(e) if e.is_invalid_argument() => log::warn!("{}", e),
                    Err(e) => return Err(e),
                }
            }
            Key::Equal => self.text.scale(1.1),
            Key::Minus => self.text.scale(1.0 / 1.1),
            Key::P => match self.text.raster() {
                Ok(raster) => {
                    if let Err(e) = raster.save_png("text_raster.png") {
                        log::warn!("Failed to save raster: {}", e);
                    } else {
                        log::info!("Saved raster to text_raster.png");
                    }
                }
                Err(e) => log::warn!("Failed to rasterize: {}", e),
            },
            _ => {}
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default("info");
    log::info!("Starting text quad demo");

    let config_path = [CONFIG_PATH.to_string(), format!("text_demo/{CONFIG_PATH}")]
        .into_iter()
        .find(|path| Path::new(path).exists())
        .unwrap_or_else(|| CONFIG_PATH.to_string());
    log::info!("Loading config from {}", config_path);
    let config = DemoConfig::load_or_default(&config_path)?;

    let mut demo = TextDemo::new(config)?;
    let result = demo.run();
    if let Err(e) = &result {
        log::error!("Application error: {:?}", e);
    }
    result
}
