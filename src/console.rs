//! # Console Interface Module
//!
//! Interactive terminal front end for the breadboard. Renders both pin
//! sections, a summary pane and a command bar; typed commands are parsed by
//! [`crate::command`] and applied to the active circuit of a [`Workbench`].
//!
//! ## Legend
//! - `.` empty pin, `*` wired pin (or its propagated value)
//! - `+` Vcc, `-` Gnd, `0`/`1` input value
//! - `o`/`O` output off/on, `#` IC pin, `L`/`H` IC output value

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::debug;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

use crate::circuit::Circuit;
use crate::command::{self, Command, HELP};
use crate::config::ConsoleConfig;
use crate::pin::PinState;
use crate::registry::PinFunction;
use crate::session::Workbench;
use crate::types::{Coordinate, COLUMNS, ROWS};

const MAX_MESSAGES: usize = 6;

/// Console UI application state
pub struct ConsoleApp {
    workbench: Workbench,
    config: ConsoleConfig,
    running: bool,
    command_buffer: String,
    show_help: bool,
    messages: Vec<String>,
}

/// Character shown for one pin
pub fn pin_glyph(circuit: &Circuit, coord: Coordinate, show_signals: bool) -> char {
    let Some(attr) = circuit.grid().attribute(coord) else {
        return ' ';
    };
    if let Some(info) = circuit.registry().info(coord) {
        if info.function == PinFunction::Output {
            return if circuit.pin_value(coord) == 1 { 'H' } else { 'L' };
        }
        return '#';
    }
    match attr.state {
        PinState::OutputMarker => {
            if circuit.visual_state(coord) {
                'O'
            } else {
                'o'
            }
        }
        PinState::Empty if attr.is_wired() => match (show_signals, circuit.effective_value(coord)) {
            (true, Some(1)) => '1',
            (true, Some(_)) => '0',
            _ => '*',
        },
        state => state.to_char(),
    }
}

/// Text rows for both sections, top section first, column ruler on top
pub fn board_lines(circuit: &Circuit, show_signals: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let ruler: String = (0..COLUMNS)
        .map(|c| if c % 10 == 0 { char::from(b'0' + (c / 10)) } else { ' ' })
        .collect();
    lines.push(format!("      {}", ruler));

    for section in 0..2u8 {
        if section == 1 {
            lines.push(format!("      {}", "~".repeat(COLUMNS as usize)));
        }
        for row in 0..ROWS {
            let pins: String = (0..COLUMNS)
                .map(|column| pin_glyph(circuit, Coordinate::new(section, row, column), show_signals))
                .collect();
            lines.push(format!("{}:{}  {}", section, row, pins));
        }
    }
    lines
}

impl ConsoleApp {
    pub fn new(workbench: Workbench, config: ConsoleConfig) -> Self {
        Self {
            workbench,
            config,
            running: false,
            command_buffer: String::new(),
            show_help: false,
            messages: Vec::new(),
        }
    }

    pub fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        enable_raw_mode().map_err(|e| format!("Failed to enable raw mode: {}", e))?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| format!("Failed to enter alternate screen: {}", e))?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        self.running = true;
        let refresh = Duration::from_millis(self.config.refresh_rate_ms);
        let mut last_draw = Instant::now() - refresh;

        while self.running {
            if event::poll(Duration::from_millis(10))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key.code);
                    }
                }
            }

            if last_draw.elapsed() >= refresh {
                terminal.draw(|f| self.draw_ui(f))?;
                last_draw = Instant::now();
            }
        }

        disable_raw_mode().map_err(|e| format!("Failed to disable raw mode: {}", e))?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| format!("Failed to leave alternate screen: {}", e))?;
        terminal
            .show_cursor()
            .map_err(|e| format!("Failed to show cursor: {}", e))?;

        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyCode) {
        if self.show_help {
            self.show_help = false;
            return;
        }
        match key {
            KeyCode::Esc => self.running = false,
            KeyCode::Backspace => {
                self.command_buffer.pop();
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.command_buffer);
                self.submit(&line);
            }
            KeyCode::Char(c) => self.command_buffer.push(c),
            _ => {}
        }
    }

    fn submit(&mut self, line: &str) {
        debug!("Console command: '{}'", line);
        let outcome = match Command::parse(line) {
            Ok(command) => command::execute(&mut self.workbench, command),
            Err(e) => {
                self.push_message(format!("Error: {}", e));
                return;
            }
        };

        if outcome.quit {
            self.running = false;
        }
        self.show_help = outcome.show_help;
        if !outcome.message.is_empty() {
            self.push_message(outcome.message);
        }

        let events = self.workbench.with_circuit(|c| c.take_events());
        if !events.is_empty() {
            self.push_message(format!("{} outputs changed", events.len()));
        }
    }

    fn push_message(&mut self, message: String) {
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }

    fn draw_ui(&self, f: &mut Frame) {
        let size = f.size();

        if self.show_help {
            self.draw_help_screen(f);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(14),
                Constraint::Min(5),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_board(f, chunks[0]);

        let lower = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[1]);
        if self.config.show_summary {
            self.draw_summary(f, lower[0]);
        }
        self.draw_messages(f, lower[1]);

        let command_text = if self.command_buffer.is_empty() {
            "Enter command (type 'help' for help, Esc to quit)..."
        } else {
            self.command_buffer.as_str()
        };
        let command_bar = Paragraph::new(command_text)
            .style(Style::default().fg(Color::White))
            .block(Block::default().borders(Borders::ALL).title("Command"));
        f.render_widget(command_bar, chunks[2]);
    }

    fn draw_board(&self, f: &mut Frame, area: Rect) {
        let (title, lines) = self.workbench.with_circuit(|c| {
            (
                format!("Breadboard: {}", c.name()),
                board_lines(c, self.config.show_signals),
            )
        });
        let text: Vec<Line> = lines.into_iter().map(Line::from).collect();
        let board = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
        );
        f.render_widget(board, area);
    }

    fn draw_summary(&self, f: &mut Frame, area: Rect) {
        let lines = self.workbench.with_circuit(|c| {
            let summary = c.summary();
            let lit = c.outputs().filter(|o| c.visual_state(*o)).count();
            vec![
                Line::from(format!("Circuit: {}", self.workbench.active_id())),
                Line::from(format!("ICs: {}", summary.ic_count)),
                Line::from(format!("Inputs: {}", summary.input_count)),
                Line::from(format!("Outputs: {} ({} lit)", summary.output_count, lit)),
                Line::from(format!("Power pins: {}", summary.power_pin_count)),
                Line::from(format!("Wires: {}", summary.wire_count)),
                Line::from(format!("Conflicts: {}", c.conflicts().len())),
            ]
        });
        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Summary"))
            .wrap(Wrap { trim: true });
        f.render_widget(widget, area);
    }

    fn draw_messages(&self, f: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .messages
            .iter()
            .map(|m| Line::from(m.as_str()))
            .collect();
        let widget = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Messages"))
            .wrap(Wrap { trim: true });
        f.render_widget(widget, area);
    }

    fn draw_help_screen(&self, f: &mut Frame) {
        let size = f.size();
        let mut help_text = vec![
            Line::from(vec![Span::styled(
                "Breadboard Console Help",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
        ];
        for (usage, description) in HELP {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {}", usage), Style::default().fg(Color::Yellow)),
                Span::raw(format!("  {}", description)),
            ]));
        }
        help_text.push(Line::from(""));
        help_text.push(Line::from("Press any key to return to the board..."));

        let help = Paragraph::new(help_text)
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Help"));
        f.render_widget(help, size);
    }
}

/// Public interface for launching the console
pub fn run_console(
    workbench: Workbench,
    config: ConsoleConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = ConsoleApp::new(workbench, config);
    app.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::gates::GateKind;
    use crate::components::ComponentKind;

    #[test]
    fn test_board_lines_shape() {
        let circuit = Circuit::new("render");
        let lines = board_lines(&circuit, true);
        assert_eq!(lines.len(), 1 + 2 * ROWS as usize + 1);
        assert!(lines[1].starts_with("0:0  "));
        assert_eq!(lines[1].chars().filter(|c| *c == '.').count(), COLUMNS as usize);
    }

    #[test]
    fn test_glyphs() {
        let mut circuit = Circuit::new("glyphs");
        circuit.place_component(Coordinate::new(0, 0, 5), ComponentKind::Vcc).unwrap();
        circuit.place_component(Coordinate::new(0, 2, 5), ComponentKind::Output).unwrap();
        circuit.place_ic(Coordinate::new(1, 0, 10), GateKind::Not).unwrap();
        circuit.add_wire(Coordinate::new(0, 1, 5), Coordinate::new(1, 1, 40)).unwrap();

        assert_eq!(pin_glyph(&circuit, Coordinate::new(0, 0, 5), true), '+');
        assert_eq!(pin_glyph(&circuit, Coordinate::new(0, 2, 5), true), 'O');
        assert_eq!(pin_glyph(&circuit, Coordinate::new(1, 0, 10), true), '#');
        assert_eq!(pin_glyph(&circuit, Coordinate::new(1, 0, 11), true), 'L');
        assert_eq!(pin_glyph(&circuit, Coordinate::new(1, 1, 40), true), '1');
        assert_eq!(pin_glyph(&circuit, Coordinate::new(1, 1, 40), false), '*');
    }
}
