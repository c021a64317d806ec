use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use koth_terminal::config::{Config, config_path};
use koth_terminal::queue::FIRST_WAITING_SLOT;
use koth_terminal::ranking::{RankingEntry, leader};
use koth_terminal::scoreboard::{Scoreboard, Snapshot};
use koth_terminal::timer::TimerState;

/// Rows in the upcoming list drawn with emphasis, like a "next up" marquee.
const HIGHLIGHT_UPCOMING: usize = 3;
const LOG_LINES: u16 = 3;

struct App {
    board: Scoreboard,
    should_quit: bool,
    help_overlay: bool,
    tick_rate: Duration,
}

impl App {
    fn new(board: Scoreboard, tick_rate: Duration) -> Self {
        Self {
            board,
            should_quit: false,
            help_overlay: false,
            tick_rate,
        }
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        // Rejections are already recorded in the board log.
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            KeyCode::Char('a') => {
                let _ = self.board.adjust_king_score(1);
            }
            KeyCode::Char('z') => {
                let _ = self.board.adjust_king_score(-1);
            }
            KeyCode::Char('x') => {
                let _ = self.board.rotate_king_to_queue();
            }
            KeyCode::Char('k') => {
                let _ = self.board.adjust_challenger_score(1);
            }
            KeyCode::Char('m') => {
                let _ = self.board.adjust_challenger_score(-1);
            }
            KeyCode::Char('b') => {
                let _ = self.board.return_challenger_to_queue();
            }
            KeyCode::Char('p') => {
                let _ = self.board.promote_challenger_to_king();
            }
            KeyCode::Char(c @ '1'..='9') => {
                let row = c as usize - '1' as usize;
                let _ = self.board.select(FIRST_WAITING_SLOT + row);
            }
            KeyCode::Char('c') => {
                self.board.clear_selection();
            }
            KeyCode::Up => {
                let _ = self.board.move_selection_up();
            }
            KeyCode::Down => {
                let _ = self.board.move_selection_down();
            }
            KeyCode::Char(' ') => {
                self.board.toggle_timer(now);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.board.nudge_timer(true),
            KeyCode::Char('-') | KeyCode::Char('_') => self.board.nudge_timer(false),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let path = config_path(std::env::args().nth(1));
    let cfg = Config::load(&path)?;
    let board = Scoreboard::from_config(&cfg, Instant::now());

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(board, Duration::from_millis(cfg.tick_ms));
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.board.poll_timer(Instant::now());

        let snapshot = app.board.snapshot();
        terminal.draw(|f| ui(f, app, &snapshot))?;

        if event::poll(app.tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key, Instant::now());
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App, snap: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(LOG_LINES + 1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let top = leader(app.board.queue().contestants());
    let header = Paragraph::new(header_text(snap, top))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);
    render_ranking(frame, body[0], snap);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(body[1]);
    render_fight(frame, right[0], snap);
    render_upcoming(frame, right[1], snap);
    render_timer(frame, right[2], snap);

    let logs = Paragraph::new(log_text(app, LOG_LINES as usize))
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(logs, chunks[2]);

    let footer = Paragraph::new(
        "a/z King ±1 | x King to queue | k/m Challenger ±1 | b Back to queue | p Make king | 1-9 Select | ↑/↓ Move | space Clock | +/- Adjust | ? Help | q Quit",
    )
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area, app.board.timer_step_secs());
    }
}

fn header_text(snap: &Snapshot, leader: Option<RankingEntry>) -> String {
    let leader = leader
        .map(|e| format!("{} ({})", e.contestant.name, e.contestant.score))
        .unwrap_or_else(|| "-".to_string());
    let clock = match snap.timer.state {
        TimerState::Running => "RUNNING",
        TimerState::Paused => "PAUSED",
    };
    format!(
        " KING OF THE HILL | Leader: {leader} | Clock: {} {clock}",
        snap.timer.clock
    )
}

fn render_ranking(frame: &mut Frame, area: Rect, snap: &Snapshot) {
    let king_id = snap.king.as_ref().map(|c| c.id);
    let challenger_id = snap.challenger.as_ref().map(|c| c.id);
    let lines: Vec<Line> = snap
        .ranking
        .iter()
        .map(|entry| {
            let c = &entry.contestant;
            let style = if Some(c.id) == king_id {
                Style::default().fg(Color::Red)
            } else if Some(c.id) == challenger_id {
                Style::default().fg(Color::Blue)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{:>3}. ", entry.position), style),
                Span::styled(format!("{:<24}", c.name), style),
                Span::styled(format!("{:>5}", c.score), style.add_modifier(Modifier::BOLD)),
            ])
        })
        .collect();
    let ranking = Paragraph::new(lines).block(Block::default().title("Ranking").borders(Borders::ALL));
    frame.render_widget(ranking, area);
}

fn render_fight(frame: &mut Frame, area: Rect, snap: &Snapshot) {
    let block = Block::default().title("Now fighting").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(10),
            Constraint::Percentage(45),
        ])
        .split(inner);

    render_fighter(frame, cols[0], snap.king.as_ref(), Color::Red, "a/z ±1  x queue");
    let vs = Paragraph::new("\nVersus").alignment(Alignment::Center);
    frame.render_widget(vs, cols[1]);
    render_fighter(
        frame,
        cols[2],
        snap.challenger.as_ref(),
        Color::Blue,
        "k/m ±1  b queue  p king",
    );
}

fn render_fighter(
    frame: &mut Frame,
    area: Rect,
    who: Option<&koth_terminal::contestant::Contestant>,
    color: Color,
    keys: &str,
) {
    let (name, score) = match who {
        Some(c) => (c.name.clone(), c.score.to_string()),
        None => ("-".to_string(), String::new()),
    };
    let lines = vec![
        Line::from(Span::styled(
            name,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(score, Style::default().fg(color))),
        Line::from(""),
        Line::from(Span::styled(keys.to_string(), Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_upcoming(frame: &mut Frame, area: Rect, snap: &Snapshot) {
    let block = Block::default()
        .title("Upcoming contenders")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if snap.waiting.is_empty() {
        let empty = Paragraph::new("Nobody waiting").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }

    let selected = snap.waiting.iter().position(|row| row.selected).unwrap_or(0);
    let (start, end) = visible_range(selected, snap.waiting.len(), inner.height as usize);
    let lines: Vec<Line> = snap.waiting[start..end]
        .iter()
        .enumerate()
        .map(|(offset, row)| {
            let idx = start + offset;
            let key = if idx < 9 {
                format!("{}.", idx + 1)
            } else {
                "  ".to_string()
            };
            let mut style = Style::default();
            if idx < HIGHLIGHT_UPCOMING {
                style = style.add_modifier(Modifier::BOLD);
            }
            if row.selected {
                style = style.fg(Color::White).bg(Color::DarkGray);
            }
            Line::from(Span::styled(
                format!("{key} {} ({})", row.contestant.name, row.contestant.score),
                style,
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_timer(frame: &mut Frame, area: Rect, snap: &Snapshot) {
    let style = if snap.timer.clock.starts_with('-') {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let timer = Paragraph::new(snap.timer.text.clone())
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().title("Clock").borders(Borders::ALL));
    frame.render_widget(timer, area);
}

fn log_text(app: &App, lines: usize) -> String {
    let logs = app.board.logs();
    let skip = logs.len().saturating_sub(lines);
    logs.iter().skip(skip).cloned().collect::<Vec<_>>().join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 || visible == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect, step_secs: i64) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "King of the Hill - Help".to_string(),
        String::new(),
        "Fight:".to_string(),
        "  a / z        King +1 / -1".to_string(),
        "  x            King back to queue".to_string(),
        "  k / m        Challenger +1 / -1".to_string(),
        "  b            Challenger back to queue".to_string(),
        "  p            Challenger becomes king".to_string(),
        String::new(),
        "Queue:".to_string(),
        "  1-9          Select / unselect waiting row".to_string(),
        "  ↑ / ↓        Move selected contender".to_string(),
        "  c            Clear selection".to_string(),
        String::new(),
        "Clock:".to_string(),
        "  space        Start / pause".to_string(),
        format!("  + / -        Adjust by {step_secs}s"),
        String::new(),
        "  ?            Toggle help".to_string(),
        "  q / Esc      Quit".to_string(),
    ]
    .join("\n");

    let help = Paragraph::new(text).block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn help_overlay_lists_the_clock_step() {
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).expect("terminal");
        terminal
            .draw(|f| {
                let area = f.size();
                render_help_overlay(f, area, 45);
            })
            .expect("draw");
        let text = screen_text(&terminal);
        assert!(text.contains("Help"), "{text}");
        assert!(text.contains("Adjust by 45s"), "{text}");
    }

    #[test]
    fn header_names_the_ranking_leader() {
        let mut board = Scoreboard::from_names(["Ann", "Ben", "Cy"], 90, Instant::now());
        board.adjust_challenger_score(2).unwrap();
        let snap = board.snapshot();
        let header = header_text(&snap, leader(board.queue().contestants()));
        assert!(header.contains("Leader: Ben (2)"), "{header}");
        assert!(header.contains("Clock: 01:30 PAUSED"), "{header}");
    }
}
