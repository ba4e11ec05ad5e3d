/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// Stands in for the 8×8 LED matrix: each pixel of the `ColorGrid` is
/// drawn as a block two terminal columns wide.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::board::GRID_SIZE;
use crate::domain::projector::ColorGrid;
use crate::domain::tile::ColorIndex;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }
}

// ── Palette ──

/// Terminal color for a lit pixel. `Off` is a dim unlit LED.
pub fn palette(color: ColorIndex) -> Color {
    match color {
        ColorIndex::Off => Color::Rgb { r: 38, g: 38, b: 52 },
        ColorIndex::Green => Color::Rgb { r: 60, g: 220, b: 90 },
        ColorIndex::Red => Color::Rgb { r: 235, g: 60, b: 60 },
        ColorIndex::Yellow => Color::Rgb { r: 240, g: 210, b: 60 },
    }
}

// ── Layout ──

/// Each pixel = 2 terminal columns, with a 1-column gap between pixels.
const PIXEL_W: usize = 2;
const PIXEL_PITCH: usize = PIXEL_W + 1;

const TITLE_ROW: usize = 0;
const GRID_ROW: usize = 2;
const GRID_COL: usize = 2;
const BANNER_ROW: usize = GRID_ROW + GRID_SIZE + 1;
const STATUS_ROW: usize = BANNER_ROW + 2;
const HELP_ROW: usize = STATUS_ROW + 1;

/// Everything the display needs for one tick.
pub struct Frame<'a> {
    pub pixels: &'a ColorGrid,
    pub banner: Option<&'a str>,
    pub status: &'a str,
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(8192, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, frame: &Frame) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        compose(&mut self.front, frame);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

// ── Compose: build front buffer content ──

fn compose(fb: &mut FrameBuffer, frame: &Frame) {
    let title_fg = Color::Rgb { r: 240, g: 210, b: 60 };
    fb.put_str(GRID_COL, TITLE_ROW, "B L I N K   2 0 4 8", title_fg, Color::Reset);

    for (gy, row) in frame.pixels.iter().enumerate() {
        for (gx, &color) in row.iter().enumerate() {
            let col = GRID_COL + gx * PIXEL_PITCH;
            let px = Cell::new(' ', Color::White, palette(color));
            for dx in 0..PIXEL_W {
                fb.set(col + dx, GRID_ROW + gy, px);
            }
        }
    }

    if let Some(msg) = frame.banner {
        let grid_w = GRID_SIZE * PIXEL_PITCH - 1;
        let text = format!(" {msg} ");
        let x = GRID_COL + grid_w.saturating_sub(text.chars().count()) / 2;
        fb.put_str(x, BANNER_ROW, &text, Color::Black, Color::Rgb { r: 240, g: 210, b: 60 });
    }

    fb.put_str(GRID_COL, STATUS_ROW, frame.status, Color::Grey, Color::Reset);
    fb.put_str(
        GRID_COL,
        HELP_ROW,
        "Arrows/WASD: Move  R: Restart  Q/Esc: Quit",
        Color::DarkGrey,
        Color::Reset,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_grid() -> ColorGrid {
        [[ColorIndex::Off; GRID_SIZE]; GRID_SIZE]
    }

    #[test]
    fn pixels_are_two_columns_wide() {
        let mut pixels = blank_grid();
        pixels[0][1] = ColorIndex::Red;
        let mut fb = FrameBuffer::new(60, 20);
        compose(&mut fb, &Frame { pixels: &pixels, banner: None, status: "" });

        let red = palette(ColorIndex::Red);
        let x = GRID_COL + PIXEL_PITCH;
        assert_eq!(fb.get(x, GRID_ROW).bg, red);
        assert_eq!(fb.get(x + 1, GRID_ROW).bg, red);
        assert_ne!(fb.get(x + 2, GRID_ROW).bg, red);
        assert_eq!(fb.get(GRID_COL, GRID_ROW).bg, palette(ColorIndex::Off));
    }

    #[test]
    fn banner_is_drawn_under_the_grid() {
        let pixels = blank_grid();
        let mut fb = FrameBuffer::new(60, 20);
        compose(&mut fb, &Frame { pixels: &pixels, banner: Some("YOU WON!"), status: "" });
        let row: String = (0..fb.width).map(|x| fb.get(x, BANNER_ROW).ch).collect();
        assert!(row.contains("YOU WON!"));
    }

    #[test]
    fn tiny_terminal_clips_instead_of_panicking() {
        let pixels = blank_grid();
        let mut fb = FrameBuffer::new(5, 3);
        compose(&mut fb, &Frame { pixels: &pixels, banner: Some("GAME OVER!"), status: "x" });
        assert_eq!(fb.cells.len(), 15);
    }

    #[test]
    fn palette_is_distinct() {
        let all = [ColorIndex::Off, ColorIndex::Green, ColorIndex::Red, ColorIndex::Yellow];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(palette(*a), palette(*b));
            }
        }
    }
}
