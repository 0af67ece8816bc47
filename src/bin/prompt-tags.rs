use std::{
    io,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use tracing::{info, warn};

use prompt_tags::catalog::{RenderEntry, TagCatalog};
use prompt_tags::config::Config;
use prompt_tags::field::{PromptField, PromptFields};
use prompt_tags::logging;
use prompt_tags::render::{entry_line, render_field};
use prompt_tags::sources::SourceSet;
use prompt_tags::splice::{Removal, Target};
use prompt_tags::template::{Expander, RoundRobin, SelectionMode};
use prompt_tags::theme::Theme;

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const PAGE_ROWS: usize = 10;

fn main() -> Result<()> {
    let config = Config::parse();
    let _log_guard = logging::init(config.log_file.clone()).context("failed to set up logging")?;
    run(config)
}

fn run(config: Config) -> Result<()> {
    let mut app = App::new(config);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("failed to initialize terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .ok();
    terminal.show_cursor().ok();

    res?;
    app.print_prompts();
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    while !app.should_quit() {
        if needs_redraw {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            needs_redraw = false;
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt);
            needs_redraw = true;
        }

        if last_tick.elapsed() >= tick_rate {
            let had_message_before = app.has_status_message();
            app.on_tick();
            last_tick = Instant::now();
            if had_message_before && !app.has_status_message() {
                needs_redraw = true;
            }
        }
    }

    Ok(())
}

fn is_route_modifier(modifiers: KeyModifiers) -> bool {
    modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Focus {
    Prompt,
    Negative,
    Tags,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Prompt => Focus::Negative,
            Focus::Negative => Focus::Tags,
            Focus::Tags => Focus::Prompt,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Prompt => Focus::Tags,
            Focus::Negative => Focus::Prompt,
            Focus::Tags => Focus::Negative,
        }
    }

    fn field(self) -> Option<Target> {
        match self {
            Focus::Prompt => Some(Target::Primary),
            Focus::Negative => Some(Target::Secondary),
            Focus::Tags => None,
        }
    }
}

#[derive(Default)]
struct Areas {
    prompt: Rect,
    negative: Rect,
    tags: Rect,
}

struct App {
    sources: SourceSet,
    seed: Option<u64>,
    mode: SelectionMode,
    cycles: [RoundRobin; 2],
    catalog: TagCatalog,
    catalog_index: usize,
    entries: Vec<RenderEntry>,
    list_state: ListState,
    fields: PromptFields,
    focus: Focus,
    to_negative: bool,
    theme: Theme,
    should_quit: bool,
    status_message: Option<(String, Instant)>,
    load_warning: Option<String>,
    preview: Option<String>,
    areas: Areas,
}

impl App {
    fn new(config: Config) -> Self {
        let mut app = Self {
            sources: config.sources(),
            seed: config.seed,
            mode: config.mode,
            cycles: Default::default(),
            catalog: TagCatalog::new(),
            catalog_index: 0,
            entries: Vec::new(),
            list_state: ListState::default(),
            fields: PromptFields::new(config.prompt, config.negative_prompt),
            focus: Focus::Tags,
            to_negative: config.negative,
            theme: Theme::default(),
            should_quit: false,
            status_message: None,
            load_warning: None,
            preview: None,
            areas: Areas::default(),
        };
        app.reload();
        app
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn has_status_message(&self) -> bool {
        self.status_message.is_some()
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    fn on_tick(&mut self) {
        if let Some((_, instant)) = &self.status_message
            && instant.elapsed() > STATUS_TIMEOUT
        {
            self.status_message = None;
        }
    }

    fn print_prompts(&self) {
        println!("{}", self.fields.primary.text());
        if !self.fields.secondary.is_empty() {
            println!("{}", self.fields.secondary.text());
        }
    }

    fn reload(&mut self) {
        let previous = self.current_name().map(str::to_string);
        let report = self.sources.load();

        self.load_warning = report.warnings.first().map(|first| {
            if report.warnings.len() > 1 {
                format!("{first} (+{} more)", report.warnings.len() - 1)
            } else {
                first.to_string()
            }
        });
        self.catalog = report.catalog;
        self.reset_cycles();
        self.catalog_index = previous
            .and_then(|name| self.catalog.names().iter().position(|n| *n == name))
            .unwrap_or(0);
        self.refresh_entries();

        let message = format!("Loaded {} tag catalogs", self.catalog.len());
        info!("{message}");
        self.set_status(message);
    }

    fn current_name(&self) -> Option<&str> {
        self.catalog.names().get(self.catalog_index).copied()
    }

    fn refresh_entries(&mut self) {
        self.entries = match self.current_name() {
            Some(name) => self.catalog.render_entries(name).unwrap_or_else(|err| {
                warn!("{err}");
                Vec::new()
            }),
            None => Vec::new(),
        };
        self.list_state = ListState::default();
        if !self.entries.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    fn select_catalog(&mut self, delta: isize) {
        let len = self.catalog.len();
        if len == 0 {
            return;
        }
        self.catalog_index = (self.catalog_index as isize + delta).rem_euclid(len as isize) as usize;
        self.refresh_entries();
    }

    fn move_selection(&mut self, delta: isize) {
        if self.entries.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0) as isize;
        let last = self.entries.len() as isize - 1;
        self.list_state
            .select(Some((current + delta).clamp(0, last) as usize));
    }

    fn selected_entry(&self) -> Option<&RenderEntry> {
        self.list_state
            .selected()
            .and_then(|idx| self.entries.get(idx))
    }

    /// Inserts or removes the selected entry in the routed field.
    fn activate(&mut self, insert: bool, modifier_held: bool) {
        let Some(entry) = self.selected_entry() else {
            return;
        };
        let snippet = entry.value.clone();
        let target = Target::route(self.to_negative, modifier_held);
        let field = self.fields.get_mut(target);
        if insert {
            field.insert_tag(&snippet);
        } else if field.remove_tag(&snippet) == Removal::Absent {
            self.set_status(format!("'{snippet}' is not in the prompt"));
        }
    }

    fn reset_cycles(&mut self) {
        for cycle in &mut self.cycles {
            cycle.reset();
        }
    }

    fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
        self.reset_cycles();
        self.set_status(format!("Previews pick {}", self.mode.label()));
    }

    fn show_preview(&mut self) {
        match self.mode {
            SelectionMode::Random => self.show_random_preview(),
            SelectionMode::RoundRobin => self.show_round_robin_preview(),
        }
    }

    fn show_round_robin_preview(&mut self) {
        let texts = [self.fields.primary.text(), self.fields.secondary.text()];
        let expanded = self
            .cycles
            .iter_mut()
            .zip(texts)
            .map(|(cycle, text)| cycle.expand(&self.catalog, text))
            .collect::<Result<Vec<_>, _>>();
        match expanded {
            Ok(lines) => self.preview = Some(lines.join("\n\n")),
            Err(err) => self.set_status(format!("Preview failed: {err}")),
        }
    }

    fn show_random_preview(&mut self) {
        let expanded = {
            let mut expander = match self.seed {
                Some(seed) => Expander::with_seed(&self.catalog, seed),
                None => Expander::new(&self.catalog),
            };
            [self.fields.primary.text(), self.fields.secondary.text()]
                .into_iter()
                .map(|text| expander.expand(text))
                .collect::<Result<Vec<_>, _>>()
        };
        match expanded {
            Ok(lines) => self.preview = Some(lines.join("\n\n")),
            Err(err) => self.set_status(format!("Preview failed: {err}")),
        }
    }

    fn focused_field_mut(&mut self) -> Option<&mut PromptField> {
        let target = self.focus.field()?;
        Some(self.fields.get_mut(target))
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(area);
        self.areas = Areas {
            prompt: vertical[1],
            negative: vertical[2],
            tags: vertical[3],
        };

        let titles: Vec<Line<'static>> = self
            .catalog
            .names()
            .into_iter()
            .map(|name| Line::from(name.to_string()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.catalog_index)
            .style(self.theme.tab_style())
            .highlight_style(self.theme.tab_active_style())
            .divider("|");
        frame.render_widget(tabs, vertical[0]);

        self.draw_field(frame, Target::Primary, vertical[1]);
        self.draw_field(frame, Target::Secondary, vertical[2]);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| ListItem::new(entry_line(entry, &self.theme)))
            .collect();
        let list = List::new(items)
            .highlight_style(self.theme.selected_style())
            .block(
                Block::default()
                    .title(self.current_name().unwrap_or("No tags").to_string())
                    .borders(Borders::ALL)
                    .border_style(self.theme.border_style(self.focus == Focus::Tags)),
            );
        frame.render_stateful_widget(list, vertical[3], &mut self.list_state);

        frame.render_widget(self.status_line(), vertical[4]);

        if self.preview.is_some() {
            self.draw_preview(frame, area);
        }
    }

    fn draw_field(&self, frame: &mut Frame, target: Target, area: Rect) {
        let field = self.fields.get(target);
        let focused = self.focus.field() == Some(target);
        let routed = Target::route(self.to_negative, false) == target;

        let mut title = vec![Span::raw(match target {
            Target::Primary => "Prompt",
            Target::Secondary => "Negative prompt",
        })];
        if routed {
            title.push(Span::styled(" *", self.theme.target_style()));
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        let view = render_field(
            field.text(),
            field.cursor(),
            field.selection(),
            inner_width,
            &self.theme,
        );
        let paragraph = Paragraph::new(view.line).block(
            Block::default()
                .title(Line::from(title))
                .borders(Borders::ALL)
                .border_style(self.theme.border_style(focused)),
        );
        frame.render_widget(paragraph, area);

        if focused && area.width > 2 && area.height > 2 {
            let x = area.x + 1 + view.cursor_column.min(area.width - 3);
            frame.set_cursor_position(Position::new(x, area.y + 1));
        }
    }

    fn draw_preview(&self, frame: &mut Frame, area: Rect) {
        let Some(preview) = &self.preview else {
            return;
        };
        let width = area.width.saturating_sub(8).max(10.min(area.width));
        let height = area.height.saturating_sub(6).max(3.min(area.height));
        let popup = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, popup);
        let paragraph = Paragraph::new(preview.clone())
            .wrap(Wrap { trim: false })
            .style(self.theme.literal_style())
            .block(
                Block::default()
                    .title("Preview (Esc to close)")
                    .borders(Borders::ALL)
                    .border_style(self.theme.border_style(true)),
            );
        frame.render_widget(paragraph, popup);
    }

    fn status_line(&self) -> Paragraph<'static> {
        if let Some((message, _)) = &self.status_message {
            return Paragraph::new(message.clone()).style(self.theme.status_bar_style());
        }
        if let Some(warning) = &self.load_warning {
            return Paragraph::new(warning.clone()).style(self.theme.warning_style());
        }
        let target = if self.to_negative { "negative" } else { "prompt" };
        let mode = self.mode.label();
        Paragraph::new(format!(
            "tags -> {target} | {mode} | Enter:Add Del:Remove ^/Alt:Negative Tab:Focus F2:Preview F3:Mode F5:Reload F6:Target ^Q:Quit"
        ))
        .style(self.theme.status_bar_style())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code, modifiers),
            Event::Mouse(mouse) => self.handle_mouse_event(mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if self.preview.is_some() {
            if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::F(2)) {
                self.preview = None;
            }
            return;
        }

        match (code, modifiers) {
            (KeyCode::Char('q') | KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::F(2), _) => self.show_preview(),
            (KeyCode::F(3), _) => self.toggle_mode(),
            (KeyCode::F(5), _) => self.reload(),
            (KeyCode::F(6), _) => {
                self.to_negative = !self.to_negative;
                let message = if self.to_negative {
                    "Tags go to the negative prompt"
                } else {
                    "Tags go to the prompt"
                };
                self.set_status(message);
            }
            (KeyCode::Tab, _) => self.focus = self.focus.next(),
            (KeyCode::BackTab, _) => self.focus = self.focus.previous(),
            _ if self.focus == Focus::Tags => self.handle_tags_key(code, modifiers),
            _ => self.handle_field_key(code, modifiers),
        }
    }

    fn handle_tags_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-(PAGE_ROWS as isize)),
            KeyCode::PageDown => self.move_selection(PAGE_ROWS as isize),
            KeyCode::Home => self.move_selection(isize::MIN / 2),
            KeyCode::End => self.move_selection(isize::MAX / 2),
            KeyCode::Left => self.select_catalog(-1),
            KeyCode::Right => self.select_catalog(1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.activate(true, is_route_modifier(modifiers))
            }
            KeyCode::Delete | KeyCode::Backspace => {
                self.activate(false, is_route_modifier(modifiers))
            }
            _ => {}
        }
    }

    fn handle_field_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let extend = modifiers.contains(KeyModifiers::SHIFT);
        let Some(field) = self.focused_field_mut() else {
            return;
        };
        match code {
            KeyCode::Char('a') if modifiers.contains(KeyModifiers::CONTROL) => field.select_all(),
            KeyCode::Char(ch)
                if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                field.insert_char(ch)
            }
            KeyCode::Backspace => {
                field.backspace();
            }
            KeyCode::Delete => {
                field.delete();
            }
            KeyCode::Left => {
                field.move_left(extend);
            }
            KeyCode::Right => {
                field.move_right(extend);
            }
            KeyCode::Home => {
                field.move_home(extend);
            }
            KeyCode::End => {
                field.move_end(extend);
            }
            KeyCode::Enter | KeyCode::Esc => self.focus = Focus::Tags,
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, event: MouseEvent) {
        if self.preview.is_some() {
            if matches!(event.kind, MouseEventKind::Down(_)) {
                self.preview = None;
            }
            return;
        }

        let position = Position::new(event.column, event.row);
        match event.kind {
            MouseEventKind::ScrollUp => self.move_selection(-1),
            MouseEventKind::ScrollDown => self.move_selection(1),
            MouseEventKind::Down(button) => {
                if self.areas.prompt.contains(position) {
                    self.focus = Focus::Prompt;
                } else if self.areas.negative.contains(position) {
                    self.focus = Focus::Negative;
                } else if let Some(idx) = self.entry_at(position) {
                    self.focus = Focus::Tags;
                    self.list_state.select(Some(idx));
                    let modifier = is_route_modifier(event.modifiers);
                    match button {
                        MouseButton::Left => self.activate(true, modifier),
                        MouseButton::Right => self.activate(false, modifier),
                        MouseButton::Middle => {}
                    }
                }
            }
            _ => {}
        }
    }

    fn entry_at(&self, position: Position) -> Option<usize> {
        let area = self.areas.tags;
        let inner = Rect::new(
            area.x + 1,
            area.y + 1,
            area.width.saturating_sub(2),
            area.height.saturating_sub(2),
        );
        if !inner.contains(position) {
            return None;
        }
        let idx = self.list_state.offset() + (position.y - inner.y) as usize;
        (idx < self.entries.len()).then_some(idx)
    }
}
