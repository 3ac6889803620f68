use crate::config;
use crate::dual_list::Side;
use crate::model::{PlaybackEvent, Theme};
use crate::player::Player;
use crate::selector::SelectorState;
use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::Rect;
use std::io::{Stdout, stdout};
use std::path::Path;
use std::time::{Duration, Instant};

const VOLUME_STEP: f32 = 0.05;

#[derive(Debug, Default, Clone)]
pub struct AppStartupOptions {
    pub theme: Option<Theme>,
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn enter_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn leave_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

pub fn run_selector(items: Vec<String>, options: AppStartupOptions) -> Result<()> {
    let mut persisted = config::load_state()?;
    let mut theme = options.theme.unwrap_or(persisted.theme);

    let mut state = SelectorState::from_snapshot(&persisted.selector);
    if !items.is_empty() {
        state.list.set_available(items);
        state.list.clear_selected();
    }
    tracing::info!(
        available = state.list.len(Side::Available),
        selected = state.list.len(Side::Selected),
        "selector started"
    );

    let mut terminal = enter_terminal()?;
    let mut panes = [Rect::default(); 2];

    let result: Result<()> = loop {
        if state.dirty {
            terminal.draw(|frame| {
                panes = crate::ui::selector_panes(frame.area());
                crate::ui::draw_selector(frame, &state, theme)
            })?;
            state.dirty = false;
        }

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        let event = event::read()?;
        if let Event::Mouse(mouse) = event {
            handle_selector_mouse(&mut state, mouse, panes);
            continue;
        }
        if let Event::Resize(..) = event {
            state.dirty = true;
            continue;
        }

        let Event::Key(key) = event else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break Ok(()),
            KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
            KeyCode::Tab | KeyCode::BackTab => state.switch_focus(),
            KeyCode::Left => state.focus_on(Side::Available),
            KeyCode::Right => state.focus_on(Side::Selected),
            KeyCode::Down | KeyCode::Char('j') => state.select_next(),
            KeyCode::Up | KeyCode::Char('k') => state.select_prev(),
            KeyCode::Char(' ') => state.toggle_mark_under_cursor(),
            KeyCode::Char('>') | KeyCode::Enter if state.focus == Side::Available => {
                state.move_to_selected();
            }
            KeyCode::Char('<') | KeyCode::Enter if state.focus == Side::Selected => {
                state.move_to_available();
            }
            KeyCode::Char('>') => {
                state.move_to_selected();
            }
            KeyCode::Char('<') => {
                state.move_to_available();
            }
            KeyCode::Char('c') => state.clear(state.focus),
            KeyCode::Char('t') => {
                theme = theme.next();
                state.dirty = true;
            }
            _ => {}
        }
    };

    leave_terminal(&mut terminal)?;

    persisted.theme = theme;
    persisted.selector = state.snapshot();
    let save_result = config::save_state(&persisted);
    result?;
    save_result?;
    Ok(())
}

fn handle_selector_mouse(state: &mut SelectorState, mouse: MouseEvent, panes: [Rect; 2]) {
    let side = if point_in_rect(mouse.column, mouse.row, panes[0]) {
        Side::Available
    } else if point_in_rect(mouse.column, mouse.row, panes[1]) {
        Side::Selected
    } else {
        return;
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => state.focus_on(side),
        MouseEventKind::ScrollDown => {
            state.focus_on(side);
            state.select_next();
        }
        MouseEventKind::ScrollUp => {
            state.focus_on(side);
            state.select_prev();
        }
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    x >= rect.x
        && x < rect.x.saturating_add(rect.width)
        && y >= rect.y
        && y < rect.y.saturating_add(rect.height)
}

pub fn run_player(path: &Path, options: AppStartupOptions) -> Result<()> {
    let mut persisted = config::load_state()?;
    let mut theme = options.theme.unwrap_or(persisted.theme);

    let player = Player::open(path).with_context(|| format!("cannot load {}", path.display()))?;
    player.set_volume(persisted.saved_volume)?;
    let events = player.subscribe();

    let mut status = match player.play() {
        Ok(()) => String::from("Playing"),
        Err(err) => format!("playback error: {err:#}"),
    };

    let mut terminal = enter_terminal()?;
    let mut dirty = true;
    let mut last_draw = Instant::now();

    let result: Result<()> = loop {
        for event in events.try_iter() {
            status = event_status(event).to_string();
            dirty = true;
        }

        if dirty || last_draw.elapsed() > Duration::from_millis(250) {
            terminal.draw(|frame| crate::ui::draw_player(frame, &player, &status, theme))?;
            dirty = false;
            last_draw = Instant::now();
        }

        if !event::poll(Duration::from_millis(33))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            dirty = true;
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let outcome = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break Ok(()),
            KeyCode::Char('q') | KeyCode::Esc => break Ok(()),
            KeyCode::Char('p') | KeyCode::Enter => player.play(),
            KeyCode::Char(' ') => player.toggle(),
            KeyCode::Char('s') => player.stop(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                player.set_volume(player.volume() + VOLUME_STEP)
            }
            KeyCode::Char('-') => player.set_volume(player.volume() - VOLUME_STEP),
            KeyCode::Char('t') => {
                theme = theme.next();
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(err) = outcome {
            tracing::warn!("transport command failed: {err:#}");
            status = format!("playback error: {err:#}");
        }
        dirty = true;
    };

    leave_terminal(&mut terminal)?;
    let stop_result = player.stop();

    persisted.theme = theme;
    persisted.saved_volume = player.volume();
    let save_result = config::save_state(&persisted);
    result?;
    stop_result?;
    save_result?;
    Ok(())
}

fn event_status(event: PlaybackEvent) -> &'static str {
    match event {
        PlaybackEvent::Started => "Playing",
        PlaybackEvent::Paused => "Paused",
        PlaybackEvent::Resumed => "Resumed",
        PlaybackEvent::Stopped => "Stopped",
        PlaybackEvent::Finished => "Reached end of track",
    }
}
