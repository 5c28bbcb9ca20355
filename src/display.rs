use crate::framebuffer::{FRAMEBUFFER_BYTES, HEIGHT, WIDTH};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::{Constraint, Direction, Layout, Rect};
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Terminal;

/// Display is used by the environment to put the framebuffer on a screen. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// draw a packed 1bpp plane, optionally with debug text alongside
    fn draw(&mut self, data: &[u8], overlay: Option<&str>) -> Result<(), io::Error>;

    /// how big the display data should be
    fn get_display_size_bytes(&self) -> usize;
}

// store useful metadata about the screen: width, height, bits per pixel
struct Resolution(usize, usize, usize);

impl Resolution {
    fn pixel_count(&self) -> usize {
        self.0 * self.1
    }
    fn byte_count(&self) -> usize {
        self.0 * self.1 * self.2 / 8
    }

    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every pixel whose bit equals `bitplane`
    fn bitplane_from_data<'a>(
        &self,
        data: &'a [u8],
        bitplane: u8,
    ) -> impl std::iter::Iterator<Item = (f64, f64)> + 'a {
        let mut count = self.pixel_count();
        let w = self.0;
        std::iter::from_fn(move || {
            while count > 0 {
                count -= 1;
                let bit = 1 & (data[count / 8] >> (7 - count % 8));
                if bit == bitplane {
                    return Some((
                        (count % w) as f64,        // x
                        -1.0 * (count / w) as f64, // y
                    ));
                }
            }
            None
        })
    }
}

/// width of the register panel next to the screen
const OVERLAY_COLUMNS: u16 = 32;

/// monochrome display in a terminal, rendered using TUI and Crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(WIDTH, HEIGHT, 1),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        // nothing useful to do if the terminal won't come back
        let _ = self.terminal.show_cursor();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, data: &[u8], overlay: Option<&str>) -> Result<(), io::Error> {
        // make sure we're given exactly the right amount of data to draw
        if data.len() != self.resolution.byte_count() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "MonoTermDisplay needs {} bytes to draw, got {}",
                    self.resolution.byte_count(),
                    data.len()
                ),
            ));
        }

        // expand each bitplane into x, y float coords, suitable for rendering
        // with TUI. this just prints blocky points for now
        let unlit: Vec<_> = self.resolution.bitplane_from_data(data, 0).collect();
        let lit: Vec<_> = self.resolution.bitplane_from_data(data, 1).collect();
        let x_bounds = self.resolution.x_bounds();
        let y_bounds = self.resolution.y_bounds();

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        let screen = Rect::new(
            0,
            0,
            2 + self.resolution.0 as u16,
            2 + self.resolution.1 as u16,
        );
        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(x_bounds)
                .y_bounds(y_bounds)
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &unlit,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });

            match overlay {
                Some(text) => {
                    let columns = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([
                            Constraint::Length(screen.width),
                            Constraint::Length(OVERLAY_COLUMNS),
                            Constraint::Min(0),
                        ])
                        .split(Rect::new(0, 0, f.size().width, screen.height));
                    f.render_widget(canvas, columns[0]);
                    let registers = Paragraph::new(text.to_string())
                        .block(Block::default().title("registers").borders(Borders::ALL));
                    f.render_widget(registers, columns[1]);
                }
                None => f.render_widget(canvas, screen),
            }
        })?;
        Ok(())
    }

    /// how big the display data should be
    fn get_display_size_bytes(&self) -> usize {
        self.resolution.byte_count()
    }
}

/// useful for testing non-display routines; remembers what it was asked to draw
#[derive(Default)]
pub struct DummyDisplay {
    pub frames: usize,
    pub last_frame: Vec<u8>,
    pub last_overlay: Option<String>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, data: &[u8], overlay: Option<&str>) -> Result<(), io::Error> {
        self.frames += 1;
        self.last_frame = data.to_vec();
        self.last_overlay = overlay.map(str::to_string);
        Ok(())
    }

    fn get_display_size_bytes(&self) -> usize {
        FRAMEBUFFER_BYTES
    }
}
