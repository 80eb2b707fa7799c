/// Terminal host for the orbiting building view
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use nalgebra::Point3;
use skyline_core::projection::TraceObserver;
use skyline_core::{Layer, ProjectionTransform, RenderLoop, TickOutcome, ViewerConfig};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod canvas;
pub mod demo;

pub use canvas::CharCanvas;

/// Manual orbit per arrow key press, in degrees.
const MANUAL_ORBIT_DEGREES: f64 = 5.0;
const ZOOM_IN: f64 = 0.9;
const ZOOM_OUT: f64 = 1.0 / ZOOM_IN;
/// Input poll timeout while the animation is stopped.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Main application struct for terminal rendering
pub struct TerminalApp {
    layers: Vec<Layer>,
    render_loop: RenderLoop,
    canvas: CharCanvas,
    running: bool,
    tick_pending: bool,
    trace_projection: bool,
    epoch: Instant,
}

impl TerminalApp {
    pub fn new(layers: Vec<Layer>, config: &ViewerConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        let canvas = CharCanvas::new(width as usize, height as usize);
        let camera = config.initial_camera(&layers, canvas.viewport());
        log::info!(
            "camera at {:?} looking at {:?}",
            camera.position,
            camera.target
        );

        Ok(Self {
            layers,
            render_loop: RenderLoop::new(camera, config.loop_settings()),
            canvas,
            running: true,
            tick_pending: false,
            trace_projection: false,
            epoch: Instant::now(),
        })
    }

    /// Log every projection stage of one sample vertex per drawn frame.
    pub fn with_projection_trace(self, trace_projection: bool) -> Self {
        Self {
            trace_projection,
            ..self
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.redraw()?;

        while self.running {
            let timeout = if self.tick_pending {
                Duration::from_secs_f64(self.render_loop.settings().frame_interval_ms.max(0.0) / 1000.0)
            } else {
                IDLE_POLL
            };

            // Handle input
            if event::poll(timeout)? {
                self.handle_input()?;
            }

            // The next tick is only taken once the previous frame is on screen
            if self.tick_pending {
                let now_ms = self.epoch.elapsed().as_secs_f64() * 1000.0;
                let transform = self.render_loop.transform();
                let tick = self
                    .render_loop
                    .tick(now_ms, &mut self.canvas, &self.layers);
                self.tick_pending = tick.reschedule;
                if let TickOutcome::Rendered(stats) = tick.outcome {
                    log::trace!("frame {}: {:?}", self.render_loop.frames(), stats);
                    self.trace_sample(&transform);
                    self.present()?;
                }
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.running = false;
                }
                KeyCode::Char(' ') => {
                    if self.render_loop.is_running() {
                        self.render_loop.stop();
                    } else if self.render_loop.start() {
                        self.tick_pending = true;
                    }
                    self.present()?;
                }
                KeyCode::Left | KeyCode::Char('a') => {
                    self.move_camera(|c| c.orbit(-MANUAL_ORBIT_DEGREES.to_radians()))?;
                }
                KeyCode::Right | KeyCode::Char('d') => {
                    self.move_camera(|c| c.orbit(MANUAL_ORBIT_DEGREES.to_radians()))?;
                }
                KeyCode::Up | KeyCode::Char('w') => {
                    self.move_camera(|c| c.zoom(ZOOM_IN))?;
                }
                KeyCode::Down | KeyCode::Char('s') => {
                    self.move_camera(|c| c.zoom(ZOOM_OUT))?;
                }
                _ => {}
            },
            Event::Resize(width, height) => {
                self.canvas.resize(width as usize, height as usize);
                let viewport = self.canvas.viewport();
                self.move_camera(|c| c.with_viewport(viewport))?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Replace the camera; redraw right away when the animation is stopped.
    fn move_camera<F>(&mut self, update: F) -> io::Result<()>
    where
        F: FnOnce(&skyline_core::Camera) -> skyline_core::Camera,
    {
        let camera = update(self.render_loop.camera());
        self.render_loop.submit_camera(camera);
        if !self.render_loop.is_running() {
            self.redraw()?;
        }
        Ok(())
    }

    fn redraw(&mut self) -> io::Result<()> {
        self.render_loop.redraw(&mut self.canvas, &self.layers);
        self.trace_sample(&self.render_loop.transform());
        self.present()
    }

    fn trace_sample(&self, transform: &ProjectionTransform) {
        if !self.trace_projection {
            return;
        }
        if let Some(point) = sample_vertex(&self.layers) {
            let screen = transform.project_observed(point, &mut TraceObserver);
            log::trace!("sample {point:?} -> screen {screen:?}");
        }
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.canvas.draw(&mut stdout)?;

        // Draw UI overlay
        let state = if self.render_loop.is_running() {
            "orbiting"
        } else {
            "stopped"
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Skyline | {} | frame {} | Space=Start/Stop Arrows=Orbit/Zoom Q=Quit",
                state,
                self.render_loop.frames()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

/// First vertex of the first non-empty ring across all layers.
fn sample_vertex(layers: &[Layer]) -> Option<&Point3<f64>> {
    layers
        .iter()
        .flat_map(|layer| layer.planes.iter())
        .find_map(|ring| ring.points().first())
}
