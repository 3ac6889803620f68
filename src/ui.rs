use crate::dual_list::Side;
use crate::model::{PlaybackState, Theme};
use crate::player::Player;
use crate::selector::SelectorState;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use std::time::Duration;

const APP_TITLE: &str = "duotune  ";

#[derive(Clone, Copy)]
struct ThemePalette {
    bg: Color,
    panel_bg: Color,
    border: Color,
    focus_border: Color,
    text: Color,
    muted: Color,
    accent: Color,
    alert: Color,
    marked: Color,
    selected_bg: Color,
}

fn palette(theme: Theme) -> ThemePalette {
    match theme {
        Theme::Dark => ThemePalette {
            bg: Color::Rgb(10, 15, 24),
            panel_bg: Color::Rgb(19, 29, 43),
            border: Color::Rgb(69, 121, 176),
            focus_border: Color::Rgb(100, 203, 184),
            text: Color::Rgb(214, 228, 248),
            muted: Color::Rgb(149, 173, 204),
            accent: Color::Rgb(100, 203, 184),
            alert: Color::Rgb(249, 174, 88),
            marked: Color::Rgb(156, 186, 255),
            selected_bg: Color::Rgb(34, 55, 82),
        },
        Theme::PitchBlack => ThemePalette {
            bg: Color::Rgb(0, 0, 0),
            panel_bg: Color::Rgb(8, 8, 8),
            border: Color::Rgb(74, 74, 74),
            focus_border: Color::Rgb(212, 212, 212),
            text: Color::Rgb(242, 242, 242),
            muted: Color::Rgb(150, 150, 150),
            accent: Color::Rgb(212, 212, 212),
            alert: Color::Rgb(235, 176, 97),
            marked: Color::Rgb(178, 195, 220),
            selected_bg: Color::Rgb(26, 26, 26),
        },
        Theme::Matrix => ThemePalette {
            bg: Color::Rgb(4, 12, 4),
            panel_bg: Color::Rgb(8, 22, 8),
            border: Color::Rgb(39, 143, 62),
            focus_border: Color::Rgb(95, 255, 122),
            text: Color::Rgb(180, 255, 185),
            muted: Color::Rgb(102, 177, 115),
            accent: Color::Rgb(95, 255, 122),
            alert: Color::Rgb(219, 234, 114),
            marked: Color::Rgb(142, 244, 152),
            selected_bg: Color::Rgb(18, 43, 20),
        },
    }
}

pub fn selector_panes(area: Rect) -> [Rect; 2] {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vertical[1]);

    [body[0], body[1]]
}

pub fn draw_selector(frame: &mut Frame, state: &SelectorState, theme: Theme) {
    let colors = palette(theme);
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            APP_TITLE,
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("Available {}", state.list.len(Side::Available)),
            Style::default().fg(colors.text),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(
            format!("Selected {}", state.list.len(Side::Selected)),
            Style::default().fg(colors.alert),
        ),
    ]))
    .block(panel_block("Dual List", colors.panel_bg, colors.text, colors.border));
    frame.render_widget(header, vertical[0]);

    let panes = selector_panes(frame.area());
    for (side, area) in [(Side::Available, panes[0]), (Side::Selected, panes[1])] {
        draw_side(frame, state, side, area, &colors);
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(state.status.as_str(), Style::default().fg(colors.text)),
        Span::styled(
            "   Tab focus  Space mark  > >>  < <<  c clear  t theme  q quit",
            Style::default().fg(colors.muted),
        ),
    ]))
    .wrap(Wrap { trim: true })
    .block(panel_block("Status", colors.panel_bg, colors.text, colors.border));
    frame.render_widget(footer, vertical[2]);
}

fn draw_side(
    frame: &mut Frame,
    state: &SelectorState,
    side: Side,
    area: Rect,
    colors: &ThemePalette,
) {
    let items: Vec<ListItem> = state
        .list
        .items(side)
        .map(|item| {
            let marked = state.list.is_marked(side, item);
            let (marker, style) = if marked {
                ("[x] ", Style::default().fg(colors.marked))
            } else {
                ("[ ] ", Style::default().fg(colors.text))
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(colors.muted)),
                Span::styled(item.as_str(), style),
            ]))
        })
        .collect();

    let focused = state.focus == side;
    let border = if focused {
        colors.focus_border
    } else {
        colors.border
    };
    let button = match side {
        Side::Available => ">>",
        Side::Selected => "<<",
    };

    let mut list_state = ListState::default();
    list_state.select((focused && state.list.len(side) > 0).then_some(state.cursor(side)));

    let list = List::new(items)
        .block(
            panel_block(side.title(), colors.panel_bg, colors.text, border)
                .title_bottom(Line::from(format!(" {button} ")).right_aligned()),
        )
        .highlight_style(
            Style::default()
                .bg(colors.selected_bg)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("-> ");
    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn draw_player(frame: &mut Frame, player: &Player, status: &str, theme: Theme) {
    let colors = palette(theme);
    frame.render_widget(
        Block::default().style(Style::default().bg(colors.bg)),
        frame.area(),
    );

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(7),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let state = player.state();
    let state_color = match state {
        PlaybackState::Playing => colors.accent,
        PlaybackState::Paused => colors.alert,
        _ => colors.muted,
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            APP_TITLE,
            Style::default()
                .fg(colors.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            state.label(),
            Style::default().fg(state_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(
            format!("Volume {}%", (player.volume() * 100.0).round() as u16),
            Style::default().fg(colors.text),
        ),
        Span::styled("  |  ", Style::default().fg(colors.muted)),
        Span::styled(
            format!("Output {}", player.backend_name()),
            Style::default().fg(colors.muted),
        ),
    ]))
    .block(panel_block("Player", colors.panel_bg, colors.text, colors.border));
    frame.render_widget(header, vertical[0]);

    let field = |label: &str, value: Option<&str>| {
        Line::from(vec![
            Span::styled(
                format!("{label:<8}"),
                Style::default()
                    .fg(colors.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                value.unwrap_or("-").to_string(),
                Style::default().fg(colors.text),
            ),
        ])
    };
    let heading = player.track().display_title();
    let info = Paragraph::new(vec![
        field("Title", player.title()),
        field("Artist", player.artist()),
        field("Album", player.album()),
        field("Track", player.track_number()),
        field("Tempo", player.tempo()),
        Line::from(Span::styled(
            player.path().display().to_string(),
            Style::default().fg(colors.muted),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(panel_block(
        &heading,
        colors.panel_bg,
        colors.text,
        colors.border,
    ));
    frame.render_widget(info, vertical[1]);

    let width = usize::from(vertical[2].width.saturating_sub(20)).max(10);
    frame.render_widget(
        Paragraph::new(timeline_line(player.position(), player.duration(), width))
            .style(Style::default().fg(colors.text))
            .block(panel_block("Progress", colors.panel_bg, colors.text, colors.border)),
        vertical[2],
    );

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(status, Style::default().fg(colors.text)),
        Span::styled(
            "   p play  Space toggle  s stop  +/- volume  t theme  q quit",
            Style::default().fg(colors.muted),
        ),
    ]))
    .wrap(Wrap { trim: true })
    .block(panel_block("Status", colors.panel_bg, colors.text, colors.border));
    frame.render_widget(footer, vertical[3]);
}

fn panel_block(title: &str, bg: Color, text: Color, border: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(text).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(bg))
}

fn timeline_line(position: Duration, duration: Option<Duration>, width: usize) -> String {
    let ratio = duration
        .filter(|total| !total.is_zero())
        .map(|total| position.as_secs_f64() / total.as_secs_f64());
    let total = duration.map_or_else(|| String::from("--:--"), format_duration);
    format!(
        "{} {} / {}",
        progress_bar(ratio, width),
        format_duration(position),
        total
    )
}

fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

fn progress_bar(ratio: Option<f64>, width: usize) -> String {
    let clamped = ratio.unwrap_or(0.0).clamp(0.0, 1.0);
    let filled = (clamped * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    bar.push_str(&"#".repeat(filled));
    bar.push_str(&"-".repeat(width.saturating_sub(filled)));
    bar.push(']');
    bar
}
