use anyhow::Result;
use crossterm::event::{self, KeyCode, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, List, ListItem, ListState, Paragraph, Row, Table,
        Wrap,
    },
};

use wgersync::ExerciseStore;
use wgersync::catalog::WgerClient;
use wgersync::report::{
    Aggregate, Dashboard, ListingEntry, NO_CHART_DATA_NOTICE, NO_EXERCISES_NOTICE,
    exercise_listing,
};
use wgersync::sync::{SyncReport, sync_exercises};

use crate::describe_failure;

const HOME_HELP: &str = "s: sync | l: list exercises | v: visualise | q: quit";
const LIST_HELP: &str = "j/k: scroll | s: sync | v: visualise | q: quit";
const CHART_HELP: &str = "tab: next chart | s: sync | l: list exercises | q: quit";

const CHART_COLORS: [Color; 3] = [Color::LightBlue, Color::Rgb(255, 165, 0), Color::Green];

enum View {
    Home,
    Listing,
    Charts,
}

enum StatusKind {
    Info,
    Success,
    Failure,
}

struct Status {
    kind: StatusKind,
    message: String,
}

impl Status {
    fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Failure,
            message: message.into(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::White),
            StatusKind::Success => Style::default().fg(Color::Green),
            StatusKind::Failure => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        }
    }
}

struct ExerciseApp<'a> {
    store: &'a ExerciseStore,
    client: &'a WgerClient,
    view: View,
    listing: Vec<ListingEntry>,
    selected: usize,
    dashboard: Option<Dashboard>,
    chart: usize,
    status: Status,
}

impl<'a> ExerciseApp<'a> {
    fn new(store: &'a ExerciseStore, client: &'a WgerClient) -> Self {
        Self {
            store,
            client,
            view: View::Home,
            listing: Vec::new(),
            selected: 0,
            dashboard: None,
            chart: 0,
            status: Status::info(HOME_HELP),
        }
    }

    fn scroll_down(&mut self) {
        if !self.listing.is_empty() && self.selected < self.listing.len() - 1 {
            self.selected += 1;
        }
    }

    fn scroll_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn next_chart(&mut self) {
        self.chart = (self.chart + 1) % CHART_COLORS.len();
    }

    async fn sync(&mut self) {
        let result = sync_exercises(self.client, self.store).await;
        self.finish_sync(result);
    }

    fn finish_sync(&mut self, result: wgersync::Result<SyncReport>) {
        match result {
            Ok(report) => {
                self.status = Status::success(format!(
                    "Sync succeeded. Total records saved: {}",
                    report.saved
                ));
                match self.view {
                    View::Listing => self.reload_listing(false),
                    View::Charts => self.reload_dashboard(false),
                    View::Home => {}
                }
            }
            // The views keep their previous data so the failure stays visible.
            Err(e) => self.status = Status::failure(describe_failure("Sync failed", &e)),
        }
    }

    fn show_listing(&mut self) {
        self.view = View::Listing;
        self.selected = 0;
        self.reload_listing(true);
    }

    fn show_charts(&mut self) {
        self.view = View::Charts;
        self.chart = 0;
        self.reload_dashboard(true);
    }

    fn reload_listing(&mut self, announce: bool) {
        match exercise_listing(self.store) {
            Ok(listing) => {
                self.listing = listing;
                if self.selected >= self.listing.len() {
                    self.selected = self.listing.len().saturating_sub(1);
                }
                if announce {
                    self.status = Status::info(LIST_HELP);
                }
            }
            Err(e) => {
                self.listing.clear();
                self.status = Status::failure(describe_failure("Could not read exercises", &e));
            }
        }
    }

    fn reload_dashboard(&mut self, announce: bool) {
        match Dashboard::load(self.store) {
            Ok(dashboard) => {
                self.dashboard = dashboard;
                if announce {
                    self.status = Status::info(CHART_HELP);
                }
            }
            Err(e) => {
                self.dashboard = None;
                self.status = Status::failure(describe_failure("Could not read exercises", &e));
            }
        }
    }
}

fn listing_item(entry: &ListingEntry, highlighted: bool) -> ListItem<'static> {
    let label = Style::default().fg(Color::Gray);
    let field = |name: &'static str, value: String| {
        Line::from(vec![Span::styled(format!("  {}: ", name), label), Span::raw(value)])
    };

    let mut title_style = Style::default().add_modifier(Modifier::BOLD);
    if highlighted {
        title_style = title_style.fg(Color::Black).bg(Color::Cyan);
    }

    ListItem::new(Text::from(vec![
        Line::from(Span::styled(entry.name.clone(), title_style)),
        field("Category", entry.category.clone()),
        field("Equipment", entry.equipment.join(", ")),
        field("Primary muscles", entry.muscles.join(", ")),
        field("Secondary muscles", entry.secondary_muscles.join(", ")),
        Line::from("─".repeat(40)).style(Style::default().fg(Color::DarkGray)),
    ]))
}

fn draw_listing(frame: &mut Frame, area: Rect, page: &ExerciseApp) {
    if page.listing.is_empty() {
        let empty_msg = Paragraph::new(NO_EXERCISES_NOTICE)
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title("Exercises"));
        frame.render_widget(empty_msg, area);
        return;
    }

    let items: Vec<ListItem> = page
        .listing
        .iter()
        .enumerate()
        .map(|(idx, entry)| listing_item(entry, idx == page.selected))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Exercises ({} total)", page.listing.len())),
    );

    let mut list_state = ListState::default();
    list_state.select(Some(page.selected));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_aggregate(frame: &mut Frame, area: Rect, aggregate: &Aggregate, color: Color) {
    let chunks = Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let header = Row::new(vec![aggregate.x_label, aggregate.y_label])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = aggregate
        .rows
        .iter()
        .map(|r| Row::new(vec![r.label.clone(), r.count.to_string()]));
    let table = Table::new(rows, [Constraint::Percentage(70), Constraint::Percentage(30)])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(aggregate.title));
    frame.render_widget(table, chunks[0]);

    let bars: Vec<Bar> = aggregate
        .rows
        .iter()
        .map(|r| {
            Bar::default()
                .value(r.count)
                .label(Line::from(r.label.clone()))
                .text_value(r.count.to_string())
        })
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(aggregate.title)
                .title_bottom(format!("{} by {}", aggregate.y_label, aggregate.x_label)),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .bar_style(Style::default().fg(color))
        .value_style(Style::default().fg(Color::Black).bg(color))
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, chunks[1]);
}

fn draw_charts(frame: &mut Frame, area: Rect, page: &ExerciseApp) {
    let Some(dashboard) = &page.dashboard else {
        let empty_msg = Paragraph::new(NO_CHART_DATA_NOTICE)
            .style(Style::default().fg(Color::Yellow))
            .block(Block::default().borders(Borders::ALL).title("Visualisation"));
        frame.render_widget(empty_msg, area);
        return;
    };

    let aggregate = dashboard.aggregates()[page.chart];
    draw_aggregate(frame, area, aggregate, CHART_COLORS[page.chart]);
}

fn draw(frame: &mut Frame, page: &ExerciseApp) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(3),
    ])
    .split(frame.area());

    // Header
    let header = Paragraph::new("WGER Exercise Sync")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    match page.view {
        View::Home => {
            let intro = Paragraph::new(
                "Press 's' to pull the latest exercises from wger,\n\
                 'l' to browse stored exercises, or 'v' to chart them.",
            )
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Home"));
            frame.render_widget(intro, chunks[1]);
        }
        View::Listing => draw_listing(frame, chunks[1], page),
        View::Charts => draw_charts(frame, chunks[1], page),
    }

    // Footer with status
    let footer = Paragraph::new(page.status.message.as_str())
        .style(page.status.style())
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(footer, chunks[2]);
}

pub async fn run_exercise_page(
    mut terminal: DefaultTerminal,
    store: &ExerciseStore,
    client: &WgerClient,
) -> Result<()> {
    let mut page = ExerciseApp::new(store, client);

    loop {
        terminal.draw(|frame| draw(frame, &page))?;

        let event::Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                return Ok(());
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                page.status = Status::info("Syncing exercises from wger, please wait...");
                terminal.draw(|frame| draw(frame, &page))?;
                page.sync().await;
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                page.show_listing();
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                page.show_charts();
            }
            KeyCode::Char('j') | KeyCode::Down => {
                page.scroll_down();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                page.scroll_up();
            }
            KeyCode::Tab => {
                if matches!(page.view, View::Charts) {
                    page.next_chart();
                }
            }
            _ => {}
        }
    }
}
