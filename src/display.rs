use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// The 64x32 monochrome pixel grid, row-major. Sprites are XORed in with
/// toroidal wraparound on both axes.
pub struct FrameBuffer {
    pixels: [bool; WIDTH * HEIGHT],
    dirty: bool,
}

impl FrameBuffer {
    pub fn new() -> Self {
        FrameBuffer {
            pixels: [false; WIDTH * HEIGHT],
            dirty: false,
        }
    }

    /// turn every pixel off
    pub fn clear(&mut self) {
        self.pixels = [false; WIDTH * HEIGHT];
        self.dirty = true;
    }

    /// XOR a sprite (one byte per row, MSB leftmost) in at (x, y); returns
    /// true if any lit pixel was turned off
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let mut collision = false;
        for (row, bits) in sprite.iter().enumerate() {
            let py = (y as usize + row) % HEIGHT;
            for col in 0..8 {
                if bits & (0x80 >> col) == 0 {
                    continue;
                }
                let px = (x as usize + col) % WIDTH;
                let cell = &mut self.pixels[py * WIDTH + px];
                collision |= *cell;
                *cell = !*cell;
            }
        }
        self.dirty = true;
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.pixels[(y % HEIGHT) * WIDTH + x % WIDTH]
    }

    /// rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        self.pixels.chunks(WIDTH)
    }

    /// whether anything changed since the last call, resetting the flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Display is used by the interpreter to put the frame on a screen. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    /// paint the whole frame
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error>;

    /// give back whatever the display took over (e.g. the terminal)
    fn release(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}

// store useful metadata about the terminal canvas
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coordinates of every pixel in the given state
    fn points(&self, frame: &FrameBuffer, lit: bool) -> Vec<(f64, f64)> {
        frame
            .rows()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(move |(_, px)| **px == lit)
                    .map(move |(x, _)| (x as f64, -1.0 * y as f64))
            })
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
    released: bool,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(WIDTH, HEIGHT),
            released: false,
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> Result<(), io::Error> {
        let resolution = &self.resolution;
        let off = resolution.points(frame, false);
        let on = resolution.points(frame, true);

        // 1:1 between chip8 pixels and terminal cells, plus a border
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8 - ESC to exit")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &off,
                        color: Color::Black,
                    });
                    ctx.draw(&Points {
                        coords: &on,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }

    fn release(&mut self) -> Result<(), io::Error> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.terminal.clear()?;
        self.terminal.show_cursor()?;
        io::stdout().execute(LeaveAlternateScreen)?;
        Ok(())
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("failed to restore terminal: {}", e);
        }
    }
}

/// useful for testing non-display routines; counts the frames it is given
#[derive(Default)]
pub struct DummyDisplay {
    pub frames_drawn: usize,
    pub released: bool,
}

impl DummyDisplay {
    pub fn new() -> Self {
        DummyDisplay::default()
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, _frame: &FrameBuffer) -> Result<(), io::Error> {
        self.frames_drawn += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<(), io::Error> {
        self.released = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: [u8; 2] = [0xff, 0xff];

    fn lit_count(fb: &FrameBuffer) -> usize {
        fb.rows().flatten().filter(|px| **px).count()
    }

    #[test]
    fn test_new_is_blank_and_clean() {
        let mut fb = FrameBuffer::new();
        assert_eq!(lit_count(&fb), 0);
        assert!(!fb.take_dirty());
    }

    #[test]
    fn test_draw_sets_pixels() {
        let mut fb = FrameBuffer::new();
        let collision = fb.draw_sprite(4, 2, &[0x81]);
        assert!(!collision);
        assert!(fb.pixel(4, 2));
        assert!(fb.pixel(11, 2));
        assert!(!fb.pixel(5, 2));
        assert_eq!(lit_count(&fb), 2);
        assert!(fb.take_dirty());
        assert!(!fb.take_dirty());
    }

    #[test]
    fn test_draw_wraps_columns() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(62, 0, &[0xff]);
        assert!(fb.pixel(62, 0));
        assert!(fb.pixel(63, 0));
        for x in 0..6 {
            assert!(fb.pixel(x, 0), "column {} should be lit", x);
        }
        assert!(!fb.pixel(6, 0));
        assert_eq!(lit_count(&fb), 8);
    }

    #[test]
    fn test_draw_wraps_rows() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 31, &BLOCK);
        assert!(fb.pixel(0, 31));
        assert!(fb.pixel(0, 0));
    }

    #[test]
    fn test_draw_twice_collides_and_erases() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.draw_sprite(10, 10, &BLOCK));
        assert!(fb.draw_sprite(10, 10, &BLOCK));
        assert_eq!(lit_count(&fb), 0);
    }

    #[test]
    fn test_partial_overlap_collides() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &[0x80]);
        assert!(fb.draw_sprite(0, 0, &[0xc0]));
        assert!(!fb.pixel(0, 0));
        assert!(fb.pixel(1, 0));
    }

    #[test]
    fn test_clear() {
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(0, 0, &BLOCK);
        fb.take_dirty();
        fb.clear();
        assert_eq!(lit_count(&fb), 0);
        assert!(fb.take_dirty());
    }

    // Resolution tests
    #[test]
    fn test_x_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.x_bounds(), [0.0, 63.0]);
    }

    #[test]
    fn test_y_bounds() {
        let r = Resolution(64, 32);
        assert_eq!(r.y_bounds(), [-31.0, 0.0]);
    }

    #[test]
    fn test_points_split_frame() {
        let r = Resolution(64, 32);
        let mut fb = FrameBuffer::new();
        fb.draw_sprite(3, 1, &[0x80]);
        assert_eq!(r.points(&fb, true), vec![(3.0, -1.0)]);
        assert_eq!(r.points(&fb, false).len(), WIDTH * HEIGHT - 1);
    }

    #[test]
    fn test_dummy_counts_frames() -> Result<(), io::Error> {
        let mut d = DummyDisplay::new();
        let fb = FrameBuffer::new();
        d.draw(&fb)?;
        d.draw(&fb)?;
        assert_eq!(d.frames_drawn, 2);
        Ok(())
    }
}
