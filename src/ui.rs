//! Layout and drawing: board, sidebar, game over, leaderboard, clear fade.

use crate::board::{Cell, Coord, Grid};
use crate::game::{GameState, Settlement, Status};
use crate::leaderboard::Entry;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns/rows per board cell (3 for the gem block + 1 gap).
const CELL_WIDTH: u16 = 4;
const CELL_HEIGHT: u16 = 2;
const SIDEBAR_WIDTH: u16 = 28;

/// Cascade phase being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Matched gems still in place, fading out.
    Matched,
    Cleared,
    Compacted,
    Refilled,
}

impl Phase {
    fn label(self) -> &'static str {
        match self {
            Self::Matched => "match!",
            Self::Cleared => "cleared",
            Self::Compacted => "dropping",
            Self::Refilled => "refill",
        }
    }
}

/// One frame of a cascade animation.
#[derive(Debug, Clone)]
pub struct PhaseFrame {
    pub phase: Phase,
    pub step: u32,
    pub multiplier_pct: u32,
    pub points: u32,
    pub grid: Grid,
    pub cleared: BTreeSet<Coord>,
}

/// Result of the last scoring move, for the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveSummary {
    pub points: u32,
    pub cleared: usize,
    /// Rounds after the first.
    pub combos: usize,
}

/// Everything the renderer reads. The engine never reads anything back.
pub struct View<'a> {
    pub state: &'a GameState,
    pub theme: &'a Theme,
    pub cursor: Coord,
    /// Current animation frame, if a chain is being shown.
    pub frame: Option<&'a PhaseFrame>,
    pub last_move: Option<MoveSummary>,
    pub settlement: Option<Settlement>,
    pub notice: Option<&'a str>,
    pub fault: Option<&'a str>,
    pub player: &'a str,
    /// Some(None) = leaderboard open but unavailable.
    pub leaderboard: Option<Option<&'a [Entry]>>,
    pub fade_ms: u32,
}

fn board_pixel_size(size: usize) -> (u16, u16) {
    let n = size as u16;
    (n * CELL_WIDTH + 1 + 2, n * CELL_HEIGHT + 2)
}

/// Draw the whole screen. While a Matched frame is shown, runs the TachyonFX fade over
/// the matched cells, creating it on first use and updating `fade_time` for the delta.
pub fn draw(
    frame: &mut Frame,
    view: &View,
    fade: &mut Option<Effect>,
    fade_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    let size = view.state.grid().size();
    let (bw, bh) = board_pixel_size(size);
    let total_w = bw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(bh.max(16)),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let board_area = Rect {
        height: bh.min(inner[0].height),
        ..inner[0]
    };

    let board_rect = draw_board(frame, view, board_area);
    draw_sidebar(frame, view, inner[1]);

    match view.frame {
        Some(f) if f.phase == Phase::Matched => {
            apply_fade(frame, view, f, board_rect, fade, fade_time, now);
        }
        _ => {
            *fade = None;
            *fade_time = None;
        }
    }

    if view.state.is_game_over() {
        draw_game_over(frame, view, vert[1]);
    }
    if let Some(entries) = view.leaderboard {
        draw_leaderboard(frame, view.theme, entries, view.player, vert[1]);
    }
}

/// Board with border; returns the inner rect the cells occupy.
fn draw_board(frame: &mut Frame, view: &View, area: Rect) -> Rect {
    let theme = view.theme;
    let title = match view.frame {
        Some(f) => format!(
            " Gemtui  {} x{:.2} ",
            f.phase.label(),
            f64::from(f.multiplier_pct) / 100.0
        ),
        None => " Gemtui ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let grid = view.frame.map_or(view.state.grid(), |f| &f.grid);
    let highlight = view.frame.map(|f| &f.cleared);
    let buf = frame.buffer_mut();
    for row in 0..grid.size() {
        for col in 0..grid.size() {
            let at = Coord::new(row, col);
            let Some(rect) = cell_rect(inner, at) else {
                continue;
            };
            let cell = grid.get(at).unwrap_or(Cell::Empty);
            let cursor = view.frame.is_none() && at == view.cursor;
            let selected = view.state.selection() == Some(at);
            let matched = highlight.is_some_and(|h| h.contains(&at));
            draw_cell(buf, rect, cell, theme, cursor, selected, matched);
        }
    }
    inner
}

/// Buffer rect of a board cell, clipped out if it does not fit.
fn cell_rect(inner: Rect, at: Coord) -> Option<Rect> {
    let x = inner.x + (at.col as u16) * CELL_WIDTH + 1;
    let y = inner.y + (at.row as u16) * CELL_HEIGHT;
    let rect = Rect {
        x,
        y,
        width: CELL_WIDTH - 1,
        height: CELL_HEIGHT,
    };
    (rect.right() <= inner.right() && rect.bottom() <= inner.bottom()).then_some(rect)
}

fn draw_cell(
    buf: &mut Buffer,
    rect: Rect,
    cell: Cell,
    theme: &Theme,
    cursor: bool,
    selected: bool,
    matched: bool,
) {
    let Cell::Gem(gem) = cell else {
        let style = Style::default().bg(theme.bg);
        for y in rect.top()..rect.bottom() {
            buf.set_string(rect.x, y, " ".repeat(rect.width as usize), style);
        }
        if cursor {
            buf.set_string(rect.x, rect.y, "[ ]", Style::default().fg(theme.title).bg(theme.bg));
        }
        return;
    };
    let color = theme.gem_color(gem);
    let mut style = Style::default().fg(theme.bg).bg(color);
    if cursor {
        style = style.add_modifier(Modifier::REVERSED);
    }
    if matched {
        style = style.add_modifier(Modifier::BOLD);
    }
    let top = format!(" {} ", gem.glyph());
    buf.set_string(rect.x, rect.y, top, style);
    let bottom = if selected { "▀▀▀" } else { "   " };
    let bottom_style = if selected {
        style.fg(theme.title).add_modifier(Modifier::BOLD)
    } else {
        style
    };
    for y in (rect.y + 1)..rect.bottom() {
        buf.set_string(rect.x, y, bottom, bottom_style);
    }
}

/// Buffer positions covered by the matched cells.
fn matched_positions(board: Rect, cleared: &BTreeSet<Coord>) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &at in cleared {
        if let Some(r) = cell_rect(board, at) {
            for x in r.left()..r.right() {
                for y in r.top()..r.bottom() {
                    set.insert((x, y));
                }
            }
        }
    }
    set
}

fn apply_fade(
    frame: &mut Frame,
    view: &View,
    phase: &PhaseFrame,
    board: Rect,
    fade: &mut Option<Effect>,
    fade_time: &mut Option<Instant>,
    now: Instant,
) {
    let delta = fade_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *fade_time = Some(now);

    if fade.is_none() {
        let cells = matched_positions(board, &phase.cleared);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            cells.contains(&(pos.x, pos.y))
        }));
        let bg = view.theme.bg;
        let effect = fx::fade_to(bg, bg, (view.fade_ms, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board);
        *fade = Some(effect);
    }
    if let Some(effect) = fade {
        frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_sidebar(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line))
        .style(Style::default().bg(theme.bg))
        .title(Span::styled(format!(" {} ", view.player), theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Min(0),
        ])
        .split(inner);

    let fg = Style::default().fg(theme.main_fg);
    let scores = vec![
        Line::from(vec![
            Span::styled(" Score ", fg),
            Span::styled(state.score().to_string(), fg.add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled(" Best  ", fg),
            Span::styled(state.best_score().to_string(), Style::default().fg(theme.title)),
        ]),
    ];
    Paragraph::new(scores).render(chunks[0], frame.buffer_mut());

    let total = state.config().initial_moves.max(1);
    let left = state.moves_remaining();
    Paragraph::new(Line::from(Span::styled(
        format!(" Moves {} / {}", left, total),
        fg,
    )))
    .render(chunks[1], frame.buffer_mut());
    let gauge_color = if moves_running_low(left, total) { Color::Red } else { theme.title };
    Gauge::default()
        .gauge_style(Style::default().fg(gauge_color).bg(theme.div_line))
        .ratio(f64::from(left) / f64::from(total))
        .label("")
        .render(
            Rect {
                x: chunks[2].x + 1,
                width: chunks[2].width.saturating_sub(2),
                ..chunks[2]
            },
            frame.buffer_mut(),
        );

    let status = match state.status() {
        Status::Idle => "Your move",
        Status::Selected(_) => "Pick a neighbour",
        Status::Resolving => "Resolving...",
        Status::GameOver => "Game over",
    };
    let mut info: Vec<Line> = vec![Line::from(Span::styled(
        format!(" {status}"),
        Style::default().fg(theme.inactive_fg),
    ))];
    if let Some(f) = view.frame {
        info.push(Line::from(Span::styled(
            format!(" Chain {}  +{}", f.step + 1, f.points),
            Style::default().fg(theme.title),
        )));
    } else if let Some(m) = view.last_move {
        info.push(Line::from(Span::styled(
            format!(" Last  +{} ({} gems)", m.points, m.cleared),
            fg,
        )));
        if m.combos > 0 {
            info.push(Line::from(Span::styled(
                format!(
                    " Combo x{:.2} ({} more)",
                    state.scoring().multiplier(m.combos as u32),
                    m.combos
                ),
                Style::default().fg(theme.title),
            )));
        }
    }
    if let Some(notice) = view.notice {
        info.push(Line::from(Span::styled(
            format!(" {notice}"),
            Style::default().fg(theme.inactive_fg),
        )));
    }
    Paragraph::new(info).render(chunks[3], frame.buffer_mut());

    let hint = Style::default().fg(theme.inactive_fg);
    let help = vec![
        Line::from(Span::styled(" ←↓↑→/hjkl  move", hint)),
        Line::from(Span::styled(" Enter/Space select", hint)),
        Line::from(Span::styled(" R restart  Tab board", hint)),
        Line::from(Span::styled(" Q quit", hint)),
    ];
    Paragraph::new(help).render(chunks[4], frame.buffer_mut());
}

/// A quarter or less of the moves left.
fn moves_running_low(left: u32, total: u32) -> bool {
    u64::from(left) * 4 <= u64::from(total)
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_game_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let state = view.state;
    let fg = Style::default().fg(theme.main_fg);
    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Game Over ",
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score()), fg)),
        Line::from(Span::styled(format!(" Best: {} ", state.best_score()), fg)),
    ];
    if view.settlement.is_some_and(|s| s.new_best) {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
    }
    if let Some(fault) = view.fault {
        lines.push(Line::from(Span::styled(
            format!(" Engine fault: {fault} "),
            Style::default().fg(Color::Red),
        )));
    }
    // Enter only restarts once the moves are spent.
    let again = if state.moves_remaining() == 0 { "Enter" } else { "R" };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" {again}: play again   Tab: board   Q: quit "),
        fg,
    )));
    let h = lines.len() as u16 + 2;
    let popup = centered(area, 48, h);
    ratatui::widgets::Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .style(Style::default().bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

fn draw_leaderboard(
    frame: &mut Frame,
    theme: &Theme,
    entries: Option<&[Entry]>,
    player: &str,
    area: Rect,
) {
    let fg = Style::default().fg(theme.main_fg);
    let mut lines: Vec<Line> = vec![Line::from("")];
    match entries {
        None => lines.push(Line::from(Span::styled(
            " Leaderboard unavailable ",
            Style::default().fg(theme.inactive_fg),
        ))),
        Some([]) => lines.push(Line::from(Span::styled(" No scores yet ", fg))),
        Some(entries) => {
            for (i, e) in entries.iter().enumerate() {
                let style = if e.user_name == player {
                    Style::default().fg(theme.title).add_modifier(Modifier::BOLD)
                } else {
                    fg
                };
                lines.push(Line::from(Span::styled(
                    format!(" {:>2}. {:<16} {:>6} ", i + 1, truncate(&e.user_name, 16), e.score),
                    style,
                )));
            }
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " any key to close ",
        Style::default().fg(theme.inactive_fg),
    )));
    let h = lines.len() as u16 + 2;
    let popup = centered(area, 36, h);
    ratatui::widgets::Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .style(Style::default().bg(theme.bg))
                .title(Span::styled(" Leaderboard ", theme.title)),
        )
        .render(popup, frame.buffer_mut());
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_rect_layout() {
        let inner = Rect::new(10, 5, 25, 12);
        let r = cell_rect(inner, Coord::new(0, 0)).unwrap();
        assert_eq!((r.x, r.y, r.width, r.height), (11, 5, 3, 2));
        let r = cell_rect(inner, Coord::new(5, 5)).unwrap();
        assert_eq!((r.x, r.y), (31, 15));
        assert!(cell_rect(inner, Coord::new(6, 0)).is_none());
    }

    #[test]
    fn test_matched_positions_cover_cells() {
        let inner = Rect::new(0, 0, 25, 12);
        let cleared: BTreeSet<_> = [Coord::new(0, 0), Coord::new(0, 1)].into();
        let set = matched_positions(inner, &cleared);
        assert_eq!(set.len(), 12);
        assert!(set.contains(&(1, 0)));
        assert!(set.contains(&(7, 1)));
        assert!(!set.contains(&(0, 0)));
    }

    #[test]
    fn test_moves_running_low() {
        assert!(moves_running_low(5, 20));
        assert!(!moves_running_low(6, 20));
        assert!(moves_running_low(0, 1));
        assert!(!moves_running_low(u32::MAX, u32::MAX));
        assert!(!moves_running_low(u32::MAX / 2, u32::MAX));
    }

    #[test]
    fn test_board_size_fits_cells() {
        let (w, h) = board_pixel_size(6);
        assert_eq!((w, h), (27, 14));
        let inner = Rect::new(1, 1, w - 2, h - 2);
        assert!(cell_rect(inner, Coord::new(5, 5)).is_some());
    }
}
