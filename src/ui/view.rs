/// Debug view: double-buffered, diff-based terminal grid.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// ## Screen layout
///   row 0       stage name, tick, win state
///   row 2..     one glyph pair per grid cell
///   below map   one line per player, then the status line
///
/// ## Glyphs
///   `. `  floor          `  `  hole
///   `# `  locked prop    `T `  win prop
///   `h `  obstacle       `H `  armed obstacle
///   `1`..`4` player slot, followed by its facing (`>` `<` `^` `v`),
///            `*` while stunned
///   other props: first letter of the prefab name

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use roomies::domain::catalog::{Catalog, Locks};
use roomies::domain::direction::Direction;
use roomies::domain::entity::{CharacterState, ItemKind};
use roomies::sim::world::GridWorld;

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

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
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

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width {
                break;
            }
            self.set(x + i, y, Cell { ch, fg, bg: Cell::BASE_BG });
        }
    }
}

// ── Glyphs ──

/// Each grid cell is two terminal columns wide.
const CELL_W: usize = 2;
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const PLAYER_COLORS: [Color; 4] = [Color::Cyan, Color::Magenta, Color::Green, Color::Yellow];

/// Two characters and a color for one grid cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Glyph {
    pub text: [char; 2],
    pub fg: Color,
    pub bg: Color,
}

fn floor_bg(variant: i32) -> Color {
    if variant % 2 == 0 {
        Color::Rgb { r: 44, g: 40, b: 52 }
    } else {
        Color::Rgb { r: 52, g: 48, b: 60 }
    }
}

fn facing_mark(facing: Direction) -> char {
    match facing {
        Direction::Right => '>',
        Direction::Left => '<',
        Direction::Up => '^',
        Direction::Down => 'v',
        Direction::None => ' ',
    }
}

/// Glyph for the cell at `tile_index`, or `None` for a hole.
pub fn cell_glyph(world: &GridWorld, catalog: &Catalog, tile_index: i32) -> Option<Glyph> {
    let tile = world.tile(tile_index)?;
    let bg = floor_bg(tile.data.tile_prefab_variant);
    let floor = Glyph { text: ['.', ' '], fg: Color::DarkGrey, bg };

    let Some(item) = tile.occupant.and_then(|id| world.items.get(id)) else {
        return Some(floor);
    };

    let glyph = match &item.kind {
        ItemKind::Character(c) => {
            let digit = char::from_digit((c.slot + 1) as u32 % 10, 10).unwrap_or('?');
            let mark = if c.state == CharacterState::Stunned { '*' } else { facing_mark(c.facing) };
            Glyph { text: [digit, mark], fg: PLAYER_COLORS[c.slot % PLAYER_COLORS.len()], bg }
        }
        ItemKind::Obstacle { armed, .. } => {
            let ch = if armed.is_some() { 'H' } else { 'h' };
            Glyph { text: [ch, ' '], fg: Color::DarkYellow, bg }
        }
        ItemKind::Prop(p) if p.is_win => Glyph { text: ['T', ' '], fg: Color::Yellow, bg },
        ItemKind::Prop(p) if p.locks == Locks::ALL => Glyph { text: ['#', '#'], fg: Color::Grey, bg },
        ItemKind::Prop(p) => {
            let ch = usize::try_from(p.prefab)
                .ok()
                .and_then(|i| catalog.props.get(i))
                .and_then(|prefab| prefab.name.chars().next())
                .map_or('o', |c| c.to_ascii_lowercase());
            Glyph { text: [ch, ' '], fg: Color::White, bg }
        }
    };
    Some(glyph)
}

/// One status line per player.
pub fn player_line(world: &GridWorld, catalog: &Catalog, slot: usize) -> Option<String> {
    let item = world.character(slot)?;
    let c = item.character()?;
    let name = usize::try_from(c.prefab)
        .ok()
        .and_then(|i| catalog.characters.get(i))
        .map_or("?", String::as_str);
    let place = if world.is_placed(world.characters[slot]) {
        format!("tile {:>3}", item.tile_index)
    } else {
        "unplaced".to_string()
    };
    Some(format!(
        "P{} {:<6} {:<8} {:<8} v={:>5.2} off=({:>5.2},{:>5.2})",
        slot + 1,
        name,
        place,
        format!("{:?}", c.state),
        c.velocity,
        item.push_offset.x,
        item.push_offset.y,
    ))
}

// ── View ──

pub struct View {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
}

impl View {
    pub fn new() -> Self {
        View {
            writer: BufWriter::with_capacity(16384, io::stdout()),
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
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &GridWorld, catalog: &Catalog, status: &str) -> io::Result<()> {
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
        self.compose(world, catalog, status);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn compose(&mut self, world: &GridWorld, catalog: &Catalog, status: &str) {
        let stage = &world.stage;

        let outcome = match world.win_claimed {
            Some(slot) => format!("P{} WINS!  [F2] again", slot + 1),
            None => "push the TV".to_string(),
        };
        let hud = format!(" {}  {}x{}  tick {}  {}", stage.stage_id, stage.columns, stage.rows, world.tick, outcome);
        self.front.put_str(0, HUD_ROW, &hud, Color::White);

        for row in 0..stage.rows.max(0) {
            for column in 0..stage.columns.max(0) {
                let index = row * stage.columns + column;
                let x = column as usize * CELL_W;
                let y = MAP_ROW + row as usize;
                if let Some(g) = cell_glyph(world, catalog, index) {
                    for (i, ch) in g.text.iter().enumerate() {
                        self.front.set(x + i, y, Cell { ch: *ch, fg: g.fg, bg: g.bg });
                    }
                }
            }
        }

        let mut y = MAP_ROW + stage.rows.max(0) as usize + 1;
        for slot in 0..world.characters.len() {
            if let Some(line) = player_line(world, catalog, slot) {
                self.front.put_str(1, y, &line, PLAYER_COLORS[slot % PLAYER_COLORS.len()]);
                y += 1;
            }
        }
        self.front.put_str(1, y + 1, status, Color::DarkGrey);
        self.front.put_str(1, y + 2, "[F2] reset  [Esc] quit", Color::DarkGrey);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
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
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }
}
