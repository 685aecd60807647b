use std::io::{self, Stdout, Write};

use corridor_crawler::hazards::SpikePhase;
use corridor_crawler::level::PickupKind;
use corridor_crawler::powerups::PowerUpKind;
use corridor_crawler::{Cell, ColorToken, Dir, EffectSink, RoundSnapshot, Theme, Tile};
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

const CELL_W: usize = 2;
const RIPPLE_SECS: f32 = 0.45;
const BURST_SECS: f32 = 0.25;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Glyph {
    Wall,
    Open,
    Coin,
    BigCoin,
    PowerUp(PowerUpKind),
    Spike(SpikePhase),
    Player,
    Chaser,
    Ripple,
    Spark,
}

#[derive(Clone, Copy, PartialEq)]
struct ScreenCell {
    glyph: Glyph,
    color: Color,
}

impl ScreenCell {
    const BLANK: ScreenCell = ScreenCell {
        glyph: Glyph::Open,
        color: Color::Reset,
    };
}

#[derive(Clone, Copy)]
struct Flash {
    cell: Cell,
    token: ColorToken,
    ttl: f32,
    ripple: bool,
}

/// Short-lived flashes drawn over the maze for bursts and ripples.
#[derive(Default)]
pub struct FlashEffects {
    flashes: Vec<Flash>,
}

impl FlashEffects {
    pub fn decay(&mut self, dt: f32) {
        for flash in &mut self.flashes {
            flash.ttl -= dt;
        }
        self.flashes.retain(|flash| flash.ttl > 0.0);
    }

    fn at(&self, cell: Cell) -> Option<&Flash> {
        self.flashes.iter().rev().find(|flash| flash.cell == cell)
    }

    fn push(&mut self, cell: Cell, token: ColorToken, ttl: f32, ripple: bool) {
        self.flashes.push(Flash {
            cell,
            token,
            ttl,
            ripple,
        });
    }
}

impl EffectSink for FlashEffects {
    fn particle_burst(&mut self, cell: Cell, color: ColorToken, count: u32) {
        // One spark per neighbour, capped by the requested count.
        let sparks = Dir::ALL
            .into_iter()
            .filter_map(|dir| cell.step(dir))
            .take(count as usize);
        for spark in sparks {
            self.push(spark, color, BURST_SECS, false);
        }
    }

    fn ripple(&mut self, cell: Cell, color: ColorToken) {
        self.push(cell, color, RIPPLE_SECS, true);
    }
}

pub struct Renderer {
    last: Vec<ScreenCell>,
    width: usize,
    height: usize,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            last: Vec::new(),
            width: 0,
            height: 0,
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    /// Forces a full redraw on the next frame, e.g. after regaining focus.
    pub fn invalidate(&mut self) {
        self.needs_full = true;
    }

    pub fn render(
        &mut self,
        stdout: &mut Stdout,
        snapshot: &RoundSnapshot<'_>,
        effects: &FlashEffects,
    ) -> io::Result<()> {
        let (width, height) = (snapshot.grid.width(), snapshot.grid.height());
        if !self.fit(stdout, width, height)? {
            return stdout.flush();
        }

        let hud = hud_line(snapshot);
        if self.needs_full || hud != self.last_hud {
            stdout
                .queue(MoveTo(self.origin_x, self.origin_y - 1))?
                .queue(Clear(ClearType::CurrentLine))?
                .queue(SetForegroundColor(Color::White))?
                .queue(Print(&hud))?
                .queue(ResetColor)?;
            self.last_hud = hud;
        }

        let player_cell = shown_player_cell(snapshot);
        for (idx, cell) in (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(x, y)))
            .enumerate()
        {
            let screen = cell_for(snapshot, effects, player_cell, cell);
            if self.needs_full || screen != self.last[idx] {
                self.last[idx] = screen;
                self.draw_cell(stdout, cell, screen)?;
            }
        }
        self.needs_full = false;
        stdout.flush()
    }

    /// Sizes the buffer to the floor and centres it. Returns `false` and shows a
    /// notice when the terminal cannot hold the grid plus the HUD row.
    fn fit(&mut self, stdout: &mut Stdout, width: usize, height: usize) -> io::Result<bool> {
        let grid_changed = width != self.width || height != self.height;
        if grid_changed {
            self.width = width;
            self.height = height;
            self.last = vec![ScreenCell::BLANK; width * height];
        }

        let need_cols = (width * CELL_W) as u16;
        let need_rows = (height + 2) as u16;
        let (cols, rows) = terminal::size()?;
        if cols < need_cols || rows < need_rows {
            self.needs_full = true;
            stdout
                .queue(Clear(ClearType::All))?
                .queue(MoveTo(0, 0))?
                .queue(Print(format!(
                    "Floor needs a {need_cols}x{need_rows} terminal, this one is {cols}x{rows}."
                )))?;
            return Ok(false);
        }

        let origin = ((cols - need_cols) / 2, (rows - need_rows) / 2 + 1);
        if grid_changed || self.needs_full || origin != (self.origin_x, self.origin_y) {
            (self.origin_x, self.origin_y) = origin;
            self.needs_full = true;
            stdout.queue(Clear(ClearType::All))?;
        }
        Ok(true)
    }

    fn draw_cell(&self, stdout: &mut Stdout, cell: Cell, screen: ScreenCell) -> io::Result<()> {
        let text = glyph_text(screen.glyph);
        // Emoji and box glyphs differ in width; pad every cell to two columns.
        let pad = CELL_W.saturating_sub(UnicodeWidthStr::width(text));
        let x = self.origin_x + (cell.x * CELL_W) as u16;
        let y = self.origin_y + cell.y as u16;
        stdout
            .queue(MoveTo(x, y))?
            .queue(SetForegroundColor(screen.color))?
            .queue(Print(text))?
            .queue(Print(" ".repeat(pad)))?
            .queue(ResetColor)?;
        Ok(())
    }
}

fn glyph_text(glyph: Glyph) -> &'static str {
    match glyph {
        Glyph::Wall => "██",
        Glyph::Open => "  ",
        Glyph::Coin => "· ",
        Glyph::BigCoin => "● ",
        Glyph::PowerUp(PowerUpKind::Speed) => "⚡",
        Glyph::PowerUp(PowerUpKind::Invulnerable) => "⭐",
        Glyph::PowerUp(PowerUpKind::Magnet) => "🧲",
        Glyph::PowerUp(PowerUpKind::SlowTime) => "⌛",
        Glyph::Spike(SpikePhase::Dormant) => "..",
        Glyph::Spike(SpikePhase::Warning) => "^^",
        Glyph::Spike(SpikePhase::Armed) => "▲▲",
        Glyph::Player => "😃",
        Glyph::Chaser => "👹",
        Glyph::Ripple => "◎ ",
        Glyph::Spark => "✦ ",
    }
}

fn hud_line(snapshot: &RoundSnapshot<'_>) -> String {
    let score = snapshot.score;
    let mut hud = format!(
        "Floor: {}  Score: {}  Combo: x{}  Best: {}  Coins: {}",
        score.floor,
        score.score,
        score.combo,
        score.high_score,
        snapshot.pickups.len()
    );
    for kind in PowerUpKind::ALL {
        let timer = snapshot.powerups.timer(kind);
        if timer.on {
            hud.push_str(&format!("  {}: {:.1}s", power_label(kind), timer.remaining()));
        }
    }
    if snapshot.protection.on {
        hud.push_str("  Safe");
    }
    hud.push_str("  (q to quit)");
    hud
}

fn power_label(kind: PowerUpKind) -> &'static str {
    match kind {
        PowerUpKind::Speed => "Speed",
        PowerUpKind::Invulnerable => "Shield",
        PowerUpKind::Magnet => "Magnet",
        PowerUpKind::SlowTime => "Slow",
    }
}

/// Nearest whole cell to the interpolated slide position.
fn shown_player_cell(snapshot: &RoundSnapshot<'_>) -> Cell {
    let (x, y) = snapshot.player.position(snapshot.slide_duration);
    Cell::new(x.round() as usize, y.round() as usize)
}

fn rgb(theme: &Theme, token: ColorToken) -> Color {
    let (r, g, b) = theme.color(token).to_rgb();
    Color::Rgb { r, g, b }
}

fn cell_for(
    snapshot: &RoundSnapshot<'_>,
    effects: &FlashEffects,
    player_cell: Cell,
    cell: Cell,
) -> ScreenCell {
    let theme = &snapshot.theme;
    if cell == player_cell {
        let color = if snapshot.powerups.is_on(PowerUpKind::Invulnerable) {
            Color::Cyan
        } else {
            Color::Yellow
        };
        return ScreenCell {
            glyph: Glyph::Player,
            color,
        };
    }
    if snapshot.chaser.active && snapshot.chaser.cell == cell {
        let color = if snapshot.protection.on || snapshot.powerups.is_on(PowerUpKind::SlowTime) {
            Color::DarkGrey
        } else {
            rgb(theme, ColorToken::Chaser)
        };
        return ScreenCell {
            glyph: Glyph::Chaser,
            color,
        };
    }
    if let Some(flash) = effects.at(cell) {
        let glyph = if flash.ripple { Glyph::Ripple } else { Glyph::Spark };
        return ScreenCell {
            glyph,
            color: rgb(theme, flash.token),
        };
    }
    if let Some(pickup) = snapshot.pickups.iter().find(|pickup| pickup.cell == cell) {
        let (glyph, token) = match pickup.kind {
            PickupKind::Coin => (Glyph::Coin, ColorToken::Coin),
            PickupKind::BigCoin => (Glyph::BigCoin, ColorToken::BigCoin),
            PickupKind::PowerUp(kind) => (Glyph::PowerUp(kind), ColorToken::PowerUp),
        };
        return ScreenCell {
            glyph,
            color: rgb(theme, token),
        };
    }
    if let Some(spike) = snapshot.spikes.iter().find(|spike| spike.cell == cell) {
        let color = match spike.phase {
            SpikePhase::Dormant => Color::DarkGrey,
            SpikePhase::Warning => Color::Yellow,
            SpikePhase::Armed => rgb(theme, ColorToken::Trap),
        };
        return ScreenCell {
            glyph: Glyph::Spike(spike.phase),
            color,
        };
    }
    match snapshot.grid.tile(cell) {
        Some(Tile::Open) => ScreenCell::BLANK,
        _ => ScreenCell {
            glyph: Glyph::Wall,
            color: rgb(theme, ColorToken::Path),
        },
    }
}
