use chrono::{Datelike, NaiveDate, Weekday};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, InputMode};
use atmosphere_core::{Language, WeatherKind, WeatherRecord};

/// Outer height of one weather card, borders included
const CARD_HEIGHT: u16 = 9;
/// Narrowest a card gets before the grid drops a column
const CARD_MIN_WIDTH: u16 = 22;
const CARDS_PER_ROW: u16 = 4;
/// Rows of ambient animation inside a card
const AMBIENT_ROWS: usize = 3;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// User-facing text for one language
struct Strings {
    title: &'static str,
    search_placeholder: &'static str,
    design: &'static str,
    pin: &'static str,
    searching: &'static str,
    no_result: &'static str,
    high: &'static str,
    low: &'static str,
    search_result: &'static str,
    saved_cities: &'static str,
    empty: &'static str,
    /// Badge naming the language `L` switches to
    switch_badge: &'static str,
}

const ZH: Strings = Strings {
    title: "天气",
    search_placeholder: "搜索城市...",
    design: "加利福尼亚设计",
    pin: "添加",
    searching: "搜索中...",
    no_result: "未找到",
    high: "高",
    low: "低",
    search_result: "搜索结果",
    saved_cities: "已保存城市",
    empty: "暂无保存城市，请搜索并添加",
    switch_badge: "EN",
};

const EN: Strings = Strings {
    title: "Weather",
    search_placeholder: "Search City...",
    design: "DESIGNED IN CALIFORNIA",
    pin: "Pin",
    searching: "Searching...",
    no_result: "No Result",
    high: "H",
    low: "L",
    search_result: "Search Result",
    saved_cities: "Saved Cities",
    empty: "No saved cities. Search to add.",
    switch_badge: "中",
};

fn strings(language: Language) -> &'static Strings {
    match language {
        Language::Chinese => &ZH,
        Language::English => &EN,
    }
}

/// Long date for the header, e.g. "Friday, March 1" or "3月1日星期五"
pub fn date_line(language: Language, date: NaiveDate) -> String {
    match language {
        Language::English => date.format("%A, %B %-d").to_string(),
        Language::Chinese => {
            let weekday = match date.weekday() {
                Weekday::Mon => "星期一",
                Weekday::Tue => "星期二",
                Weekday::Wed => "星期三",
                Weekday::Thu => "星期四",
                Weekday::Fri => "星期五",
                Weekday::Sat => "星期六",
                Weekday::Sun => "星期日",
            };
            format!("{}月{}日{}", date.month(), date.day(), weekday)
        }
    }
}

fn kind_color(kind: WeatherKind) -> Color {
    match kind {
        WeatherKind::Sunny => Color::Yellow,
        WeatherKind::Rainy => Color::LightBlue,
        WeatherKind::Snowy => Color::White,
        WeatherKind::Windy => Color::Gray,
    }
}

/// Whole-screen tint following the active city
fn background_tint(kind: Option<WeatherKind>) -> Color {
    match kind {
        Some(WeatherKind::Sunny) => Color::Rgb(38, 20, 6),
        Some(WeatherKind::Rainy) => Color::Rgb(6, 16, 38),
        Some(WeatherKind::Snowy) => Color::Rgb(24, 28, 34),
        Some(WeatherKind::Windy) => Color::Rgb(22, 22, 22),
        None => Color::Black,
    }
}

/// Card fill, a step brighter than the background
fn card_tint(kind: WeatherKind) -> Color {
    match kind {
        WeatherKind::Sunny => Color::Rgb(70, 40, 10),
        WeatherKind::Rainy => Color::Rgb(14, 32, 70),
        WeatherKind::Snowy => Color::Rgb(46, 52, 62),
        WeatherKind::Windy => Color::Rgb(44, 44, 44),
    }
}

/// One row of the per-kind ambient animation, exactly `width` chars wide.
///
/// Rain falls one row per tick, snow every other tick, wind streaks drift
/// right, and sun sparkles twinkle in place.
pub fn ambient_row(kind: WeatherKind, frame: u16, row: usize, width: usize) -> String {
    let f = frame as usize;
    (0..width)
        .map(|col| match kind {
            WeatherKind::Sunny => match (col * 5 + row * 3 + f) % 11 {
                0 => '*',
                5 => '·',
                _ => ' ',
            },
            WeatherKind::Rainy => {
                if (col * 3 + row + 5 - f % 5) % 5 == 0 {
                    '\''
                } else {
                    ' '
                }
            }
            WeatherKind::Snowy => match (col * 7 + row + 9 - (f / 2) % 9) % 9 {
                0 => '*',
                4 => '·',
                _ => ' ',
            },
            WeatherKind::Windy => {
                if (col + row * 5 + 12 - f % 12) % 12 < 3 {
                    if row % 2 == 0 { '─' } else { '~' }
                } else {
                    ' '
                }
            }
        })
        .collect()
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let t = strings(app.controller.language());

    let tint = background_tint(app.controller.active().map(|w| w.kind));
    frame.render_widget(Block::default().style(Style::default().bg(tint)), area);

    let result_height = if app.controller.search_result().is_some() {
        CARD_HEIGHT + 1
    } else {
        0
    };

    let [header_area, search_area, description_area, result_area, grid_area, footer_area] =
        Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(result_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(app, t, frame, header_area);
    render_search_bar(app, t, frame, search_area);
    render_description(app, frame, description_area);
    if let Some(result) = app.controller.search_result() {
        render_search_result(result, app.animation_frame, t, frame, result_area);
    }
    render_saved_cities(app, t, frame, grid_area);
    render_footer(app, t, frame, footer_area);
}

fn render_header(app: &App, t: &Strings, frame: &mut Frame, area: Rect) {
    let language = app.controller.language();
    let date = date_line(language, chrono::Local::now().date_naive());

    let [left, right] = Layout::horizontal([Constraint::Min(0), Constraint::Length(24)]).areas(area);

    let title = Text::from(vec![
        Line::from(Span::styled(format!(" {}", t.title), Style::default().fg(Color::White).bold())),
        Line::from(Span::styled(
            format!(" {}", date.to_uppercase()),
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(Paragraph::new(title), left);

    let status = Line::from(vec![
        Span::styled(app.provider.display_name(), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!(" {} ", t.switch_badge),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        Span::raw(" "),
    ])
    .right_aligned();
    frame.render_widget(Paragraph::new(status), right);
}

fn render_search_bar(app: &App, t: &Strings, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let query = app.controller.query();

    let status = if app.controller.search_in_flight() {
        let spinner = SPINNER[app.animation_frame as usize % SPINNER.len()];
        Line::from(Span::styled(
            format!(" {} {} ", spinner, t.searching),
            Style::default().fg(Color::White),
        ))
    } else if app.controller.search_missed() {
        Line::from(Span::styled(format!(" {} ", t.no_result), Style::default().fg(Color::Red)))
    } else {
        Line::default()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title_bottom(status.right_aligned());

    let input = if query.is_empty() && !editing {
        Paragraph::new(Span::styled(t.search_placeholder, Style::default().fg(Color::DarkGray)))
    } else {
        Paragraph::new(Span::styled(query, Style::default().fg(Color::Cyan)))
    };
    frame.render_widget(input.block(block), area);

    if editing {
        let before: String = query.chars().take(app.query_cursor).collect();
        let cursor_x = Span::raw(before).width() as u16;
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

fn render_description(app: &App, frame: &mut Frame, area: Rect) {
    let area = Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(2),
        ..area
    };

    if app.controller.description_loading() {
        let lit = app.animation_frame as usize % 3;
        let dots: Vec<Span> = (0..3)
            .map(|i| {
                let color = if i == lit { Color::White } else { Color::DarkGray };
                Span::styled("● ", Style::default().fg(color))
            })
            .collect();
        frame.render_widget(Paragraph::new(Line::from(dots)), area);
        return;
    }

    let mut style = Style::default().fg(Color::White);
    if app.controller.language() == Language::English {
        style = style.add_modifier(Modifier::ITALIC);
    }
    let description = Paragraph::new(Span::styled(app.controller.description(), style))
        .wrap(Wrap { trim: true });
    frame.render_widget(description, area);
}

fn render_search_result(result: &WeatherRecord, animation_frame: u16, t: &Strings, frame: &mut Frame, area: Rect) {
    let [label_area, card_row] = Layout::vertical([Constraint::Length(1), Constraint::Length(CARD_HEIGHT)]).areas(area);

    let label = Line::from(vec![
        Span::styled(format!(" {} ", t.search_result.to_uppercase()), Style::default().fg(Color::DarkGray)),
        Span::styled(" p ", Style::default().bg(Color::Blue).fg(Color::White)),
        Span::styled(format!(" + {} ", t.pin), Style::default().fg(Color::Blue)),
    ]);
    frame.render_widget(Paragraph::new(label), label_area);

    let width = card_width(card_row.width);
    let card_area = Rect { width, ..card_row };
    render_card(
        frame,
        card_area,
        result,
        CardLook {
            active: true,
            focused: false,
            closable: false,
        },
        animation_frame,
        t,
    );
}

fn cards_per_row(width: u16) -> u16 {
    (width / CARD_MIN_WIDTH).clamp(1, CARDS_PER_ROW)
}

fn card_width(width: u16) -> u16 {
    width / cards_per_row(width)
}

fn render_saved_cities(app: &mut App, t: &Strings, frame: &mut Frame, area: Rect) {
    app.card_areas.clear();

    let pinned = app.controller.pinned();
    if pinned.is_empty() {
        if app.controller.search_result().is_none() {
            let placeholder = Paragraph::new(Span::styled(t.empty, Style::default().fg(Color::DarkGray)))
                .centered()
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                );
            let height = area.height.min(5);
            frame.render_widget(placeholder, Rect { height, ..area });
        }
        return;
    }

    let [title_area, cards_area] = Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
    frame.render_widget(
        Paragraph::new(Span::styled(
            format!(" {}", t.saved_cities.to_uppercase()),
            Style::default().fg(Color::DarkGray),
        )),
        title_area,
    );

    let per_row = cards_per_row(cards_area.width) as usize;
    let width = card_width(cards_area.width);
    let visible_rows = (cards_area.height / CARD_HEIGHT) as usize;
    if visible_rows == 0 {
        return;
    }

    // Scroll so the focused card's row stays on screen
    let focused_row = app.focused_card / per_row;
    let first_row = focused_row.saturating_sub(visible_rows - 1);

    let mut areas = Vec::new();
    for (index, city) in pinned.iter().enumerate() {
        let row = index / per_row;
        if row < first_row || row >= first_row + visible_rows {
            continue;
        }
        let col = (index % per_row) as u16;
        let card_area = Rect {
            x: cards_area.x + col * width,
            y: cards_area.y + (row - first_row) as u16 * CARD_HEIGHT,
            width,
            height: CARD_HEIGHT,
        };
        let look = CardLook {
            active: app.controller.is_active(&city.id),
            focused: index == app.focused_card,
            closable: true,
        };
        render_card(frame, card_area, city, look, app.animation_frame, t);
        areas.push((card_area, city.id.clone()));
    }
    app.card_areas = areas;
}

struct CardLook {
    active: bool,
    focused: bool,
    closable: bool,
}

fn render_card(
    frame: &mut Frame,
    area: Rect,
    weather: &WeatherRecord,
    look: CardLook,
    animation_frame: u16,
    t: &Strings,
) {
    let border_color = if look.focused {
        Color::Cyan
    } else if look.active {
        Color::White
    } else {
        Color::DarkGray
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    if look.active {
        block = block.style(Style::default().bg(card_tint(weather.kind)));
    }
    if look.closable {
        block = block.title_top(Line::from(Span::styled(" × ", Style::default().fg(Color::DarkGray))).right_aligned());
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let ambient_style = Style::default().fg(kind_color(weather.kind)).add_modifier(Modifier::DIM);

    let mut lines = vec![
        Line::from(Span::styled(weather.city.as_str(), Style::default().fg(Color::White).bold())),
        Line::from(Span::styled(weather.label.as_str(), Style::default().fg(Color::Gray))),
    ];
    for row in 0..AMBIENT_ROWS {
        lines.push(Line::from(Span::styled(
            ambient_row(weather.kind, animation_frame, row, inner_width),
            ambient_style,
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("{}°", weather.temperature),
        Style::default().fg(Color::White).bold(),
    )));
    lines.push(Line::from(Span::styled(
        format!("{}:{}°  {}:{}°", t.high, weather.high, t.low, weather.low),
        Style::default().fg(Color::Gray),
    )));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_footer(app: &App, t: &Strings, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::Gray);

    let keys: &[(&str, &str)] = match app.input_mode {
        InputMode::Editing => &[("Enter", "search"), ("Esc", "cancel")],
        InputMode::Normal => &[
            ("/", "search"),
            ("h/l", "move"),
            ("Enter", "select"),
            ("p", "pin"),
            ("d", "delete"),
            ("L", "language"),
            ("q", "quit"),
        ],
    };

    let mut hints: Vec<Span> = Vec::new();
    for (key, label) in keys {
        hints.push(Span::styled(format!(" {} ", key), key_style));
        hints.push(Span::styled(format!(" {} ", label), label_style));
    }

    let [hints_area, design_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(Span::raw(t.design).width() as u16 + 2),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(Line::from(hints)), hints_area);
    frame.render_widget(
        Paragraph::new(Span::styled(t.design, Style::default().fg(Color::DarkGray))),
        design_area,
    );
}
