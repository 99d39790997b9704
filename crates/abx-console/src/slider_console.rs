//! Interactive traffic editor.
//!
//! A TUI showing an experiment's variants as segments of one traffic bar.
//! Each variant's right edge is a slider handle; moving it shifts traffic
//! between that variant and the next one (in id order). Variants can be
//! added and removed, and the result saved back to the backend.
//!
//! Launch with `abx edit <experiment-id>`.

use std::io::{self, Stdout};
use std::time::Duration;

use abx_allocator::VariantEditor;
use abx_protocol::Experiment;
use abx_results::series_color;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};

use crate::commands::format_percent;
use crate::context::ConsoleContext;

/// Handle step in percentage points; Shift multiplies it by five.
const STEP: f64 = 1.0;

/// What the event loop should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleAction {
    Continue,
    Save,
    Quit,
}

pub struct SliderConsole {
    experiment: Experiment,
    editor: VariantEditor,
    /// Selected variant, as an index into the slider (id) order.
    selected: usize,
    /// Edits not yet saved.
    dirty: bool,
    messages: Vec<(chrono::DateTime<chrono::Utc>, String, Color)>,
}

impl SliderConsole {
    pub fn new(mut experiment: Experiment) -> Self {
        let editor = VariantEditor::new(std::mem::take(&mut experiment.variants));
        let mut console = Self {
            experiment,
            editor,
            selected: 0,
            dirty: false,
            messages: Vec::new(),
        };
        console.add_message(
            "Left/Right move the selected handle, Tab selects, a adds, d removes, s saves, q quits.",
            Color::DarkGray,
        );
        console
    }

    /// The experiment with the edited variants.
    pub fn experiment(&self) -> Experiment {
        Experiment {
            variants: self.editor.variants().to_vec(),
            ..self.experiment.clone()
        }
    }

    pub fn editor(&self) -> &VariantEditor {
        &self.editor
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.add_message("Saved.", Color::Green);
    }

    pub fn add_message(&mut self, msg: &str, color: Color) {
        self.messages.push((chrono::Utc::now(), msg.to_string(), color));
        if self.messages.len() > 200 {
            self.messages.remove(0);
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> ConsoleAction {
        let step = if modifiers.contains(KeyModifiers::SHIFT) { STEP * 5.0 } else { STEP };
        match (code, modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return ConsoleAction::Quit,
            (KeyCode::Char('q'), _) | (KeyCode::Esc, _) => return ConsoleAction::Quit,
            (KeyCode::Char('s'), _) => return ConsoleAction::Save,
            (KeyCode::Tab, _) | (KeyCode::Down, _) => self.select_next(),
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => self.select_previous(),
            (KeyCode::Left, _) => self.move_handle(-step),
            (KeyCode::Right, _) => self.move_handle(step),
            (KeyCode::Char('a'), _) => self.add_variant(),
            (KeyCode::Char('d'), _) => self.remove_selected(),
            _ => {}
        }
        ConsoleAction::Continue
    }

    fn select_next(&mut self) {
        let count = self.editor.variants().len();
        if count > 0 {
            self.selected = (self.selected + 1) % count;
        }
    }

    fn select_previous(&mut self) {
        let count = self.editor.variants().len();
        if count > 0 {
            self.selected = (self.selected + count - 1) % count;
        }
    }

    /// Move the right edge of the selected variant by `delta` points,
    /// without crossing the neighbouring handles.
    fn move_handle(&mut self, delta: f64) {
        let stack = self.editor.stack();
        let mut positions = stack.positions();
        let handle = self.selected + 1;
        if handle + 1 >= positions.len() {
            self.add_message("The last variant takes the remaining traffic.", Color::Yellow);
            return;
        }
        let moved = (positions[handle] + delta).clamp(positions[handle - 1], positions[handle + 1]);
        if moved == positions[handle] {
            return;
        }
        positions[handle] = moved;
        match self.editor.drag(&positions) {
            Ok(()) => self.dirty = true,
            Err(e) => self.add_message(&e.to_string(), Color::Red),
        }
    }

    fn add_variant(&mut self) {
        match self.editor.add() {
            Ok(id) => {
                self.dirty = true;
                self.select_id(&id);
                self.add_message(&format!("Added variant {id}."), Color::Cyan);
            }
            Err(e) => self.add_message(&e.to_string(), Color::Red),
        }
    }

    fn remove_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        match self.editor.remove(&id) {
            Ok(()) => {
                self.dirty = true;
                let count = self.editor.variants().len();
                self.selected = self.selected.min(count.saturating_sub(1));
                self.add_message(&format!("Removed variant {id}."), Color::Cyan);
            }
            Err(e) => self.add_message(&e.to_string(), Color::Red),
        }
    }

    fn selected_id(&self) -> Option<String> {
        self.editor
            .stack()
            .order()
            .get(self.selected)
            .map(|v| v.id.clone())
    }

    fn select_id(&mut self, id: &str) {
        if let Some(i) = self.editor.stack().order().iter().position(|v| v.id == id) {
            self.selected = i;
        }
    }

    /// Render the full editor layout.
    pub fn render(&self, frame: &mut Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(4), // Traffic bar
                Constraint::Min(5),    // Variants
                Constraint::Length(6), // Messages
            ])
            .split(frame.area());

        self.render_title(frame, outer[0]);
        self.render_bar(frame, outer[1]);
        self.render_variants(frame, outer[2]);
        self.render_messages(frame, outer[3]);
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Traffic allocation ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let line = Line::from(vec![
            Span::styled("  Experiment: ", Style::default().fg(Color::Gray)),
            Span::styled(&self.experiment.name, Style::default().fg(Color::White)),
            Span::styled(format!(" ({})", self.experiment.id), Style::default().fg(Color::DarkGray)),
            Span::styled("  |  Total: ", Style::default().fg(Color::Gray)),
            Span::styled(format_percent(self.editor.sum()), Style::default().fg(Color::Green)),
            Span::styled(
                if self.dirty { "  |  modified" } else { "" },
                Style::default().fg(Color::Yellow),
            ),
        ]);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn render_bar(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Slider ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta));
        let width = area.width.saturating_sub(2) as usize;
        let stack = self.editor.stack();

        let mut segments = Vec::new();
        let mut labels = Vec::new();
        let mut used = 0usize;
        for (i, variant) in stack.order().iter().enumerate() {
            let cells = if i + 1 == stack.len() {
                width.saturating_sub(used)
            } else {
                ((variant.traffic * width as f64).round() as usize).min(width.saturating_sub(used))
            };
            used += cells;
            let color = hex_color(series_color(i));
            let mut style = Style::default().bg(color);
            if i == self.selected {
                style = style.add_modifier(Modifier::REVERSED);
            }
            segments.push(Span::styled(" ".repeat(cells), style));
            let label = format!("{}:{}", variant.id, format_percent(variant.traffic));
            let label: String = label.chars().take(cells).collect();
            labels.push(Span::styled(
                format!("{label:<cells$}"),
                Style::default().fg(color),
            ));
        }

        let text = vec![Line::from(segments), Line::from(labels)];
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn render_variants(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Variants ({}) ", self.editor.variants().len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        let stack = self.editor.stack();
        if stack.is_empty() {
            let text = Paragraph::new(Line::from(Span::styled(
                "  No variants. Press a to add one.",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block);
            frame.render_widget(text, area);
            return;
        }

        let rows: Vec<Row> = stack
            .order()
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let marker = if i == self.selected { "> " } else { "  " };
                Row::new(vec![
                    Cell::from(Span::styled(
                        format!("{marker}{}", v.id),
                        Style::default().fg(hex_color(series_color(i))),
                    )),
                    Cell::from(v.name.clone()),
                    Cell::from(format_percent(v.traffic)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(20),
                Constraint::Percentage(60),
                Constraint::Percentage(20),
            ],
        )
        .block(block)
        .header(
            Row::new(vec!["  Id", "Name", "Traffic"])
                .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)),
        );
        frame.render_widget(table, area);
    }

    fn render_messages(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Messages ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));
        let inner_height = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(inner_height);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|(ts, msg, color)| {
                Line::from(vec![
                    Span::styled(
                        format!("  [{}] ", ts.format("%H:%M:%S")),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(msg.as_str(), Style::default().fg(*color)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }
}

/// Parse a `#rrggbb` palette entry. Anything else falls back to the
/// terminal's default colour.
fn hex_color(hex: &str) -> Color {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Color::Reset;
    }
    match u32::from_str_radix(hex, 16) {
        Ok(rgb) => Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8),
        Err(_) => Color::Reset,
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the traffic editor for experiment `id` until the operator quits.
pub async fn run_slider_console(ctx: &ConsoleContext, id: &str) -> Result<(), anyhow::Error> {
    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!("The traffic editor requires a terminal (TTY)."));
    }

    let experiment = ctx.client.fetch(id).await?;
    let mut console = SliderConsole::new(experiment);

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal()?;
    let tick_rate = Duration::from_millis(100);

    loop {
        terminal.draw(|frame| console.render(frame))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind != KeyEventKind::Press {
                    continue;
                }
                match console.handle_key(key_event.code, key_event.modifiers) {
                    ConsoleAction::Continue => {}
                    ConsoleAction::Quit => break,
                    ConsoleAction::Save => match ctx.client.update(id, &console.experiment()).await {
                        Ok(_) => console.mark_saved(),
                        Err(e) => {
                            tracing::warn!(experiment = %id, error = %e, "saving traffic failed");
                            console.add_message(&format!("Save failed: {e}"), Color::Red);
                        }
                    },
                }
            }
        }
    }

    restore_terminal(&mut terminal)?;
    if console.is_dirty() {
        tracing::warn!(experiment = %id, "traffic editor closed with unsaved changes");
    }
    Ok(())
}
