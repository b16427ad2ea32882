/// Terminal front end: rasterizes a mesh buffer and a camera frustum overlay
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use frustview_core::{Camera, MeshBuffer, ModelTransform};
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod config;
pub mod renderer;

pub use config::ViewerConfig;
pub use renderer::AsciiRenderer;

/// Errors surfaced by the viewer binary
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] frustview_core::Error),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// Radians per key press
const ROTATE_STEP: f32 = 0.1;

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    mesh: MeshBuffer,
    transform: ModelTransform,
    config: ViewerConfig,
    camera: Camera,
    prop_camera: Camera,
    renderer: AsciiRenderer,
    wireframe: bool,
    show_frustum: bool,
    frustum_warned: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Take ownership of an assembled mesh; it is only read from here on.
    pub fn new(mesh: MeshBuffer, config: ViewerConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        Ok(Self {
            transform: config.model.transform(),
            camera: config.camera.camera(width, height),
            prop_camera: config.prop_camera.camera(),
            renderer: AsciiRenderer::new(width as usize, height as usize),
            wireframe: config.render.wireframe,
            show_frustum: config.render.show_frustum,
            frustum_warned: false,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            mesh,
            config,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        info!(fps = self.fps, "Viewer closed");
        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / u64::from(self.config.render.target_fps.max(1)));

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            // Update
            self.transform.rotate(0.0, self.config.render.spin_speed);

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
                debug!(fps = self.fps, "Frame rate");
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent { code, kind, .. }) if kind != KeyEventKind::Release => {
                self.handle_key(code);
            }
            Event::Resize(width, height) => {
                self.camera = self.config.camera.camera(width, height);
                self.renderer = AsciiRenderer::new(width as usize, height as usize);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('w') | KeyCode::Up => {
                self.transform.rotate(ROTATE_STEP, 0.0);
            }
            KeyCode::Char('s') | KeyCode::Down => {
                self.transform.rotate(-ROTATE_STEP, 0.0);
            }
            KeyCode::Char('a') | KeyCode::Left => {
                self.transform.rotate(0.0, -ROTATE_STEP);
            }
            KeyCode::Char('d') | KeyCode::Right => {
                self.transform.rotate(0.0, ROTATE_STEP);
            }
            KeyCode::Char('l') => {
                self.wireframe = !self.wireframe;
            }
            KeyCode::Char('f') => {
                self.show_frustum = !self.show_frustum;
            }
            _ => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        // Clear renderer
        self.renderer.clear();

        // Render mesh
        self.renderer.render_mesh(&self.mesh, &self.transform, &self.camera);
        if self.wireframe {
            self.renderer
                .render_wireframe(&self.mesh, &self.transform.matrix(), &self.camera);
        }

        // Frustum is rebuilt from the current prop camera every frame
        if self.show_frustum {
            match self.prop_camera.frustum() {
                Ok(frustum) => self.renderer.render_frustum(&frustum, &self.camera),
                Err(err) if !self.frustum_warned => {
                    warn!(error = %err, "Skipping frustum overlay");
                    self.frustum_warned = true;
                }
                Err(_) => {}
            }
        }

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "frustview | FPS: {:.1} | {} tris | WASD/Arrows=Rotate L=Wireframe F=Frustum Q=Quit",
                self.fps,
                self.mesh.triangle_count()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
