pub mod wave_view;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use orbit::{engine::Mode, util::truncate_to_width};

use crate::{
    ui::wave_view::{rgb, LiquidWave},
    App, AppState,
};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const FLOW_ACCENT: Color = Color::Rgb(251, 191, 36);

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snap = self.session.snapshot();

        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().fg(Color::DarkGray);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);
        let accent_style = Style::default()
            .fg(rgb(snap.colors.start))
            .add_modifier(Modifier::BOLD);

        buf.set_style(area, Style::default().bg(rgb(snap.colors.background)));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(2), // title
                    Constraint::Length(2), // task
                    Constraint::Length(1), // mode toggle / flow indicator
                    Constraint::Min(3),    // wave
                    Constraint::Length(1), // noise + reset
                    Constraint::Length(1), // legend
                ]
                .as_ref(),
            )
            .split(area);

        Paragraph::new(vec![
            Line::from(Span::styled("Orbit", bold_style.fg(Color::White))),
            Line::from(Span::styled("Stay focused, stay productive", dim_style)),
        ])
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let max_task_width = chunks[1].width.saturating_sub(1) as usize;
        let task_lines = match self.state {
            AppState::EditingTask => vec![
                Line::from(vec![
                    Span::styled(
                        truncate_to_width(&self.task_draft, max_task_width),
                        bold_style.add_modifier(Modifier::UNDERLINED),
                    ),
                    Span::styled("▏", accent_style),
                ]),
                Line::from(Span::styled("editing", dim_style)),
            ],
            AppState::Timer => vec![
                Line::from(Span::styled(
                    truncate_to_width(&snap.task_label, max_task_width),
                    bold_style,
                )),
                Line::from(Span::styled("(e) to edit", dim_style)),
            ],
        };
        Paragraph::new(task_lines)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let mode_line = if snap.mode == Mode::Flow {
            Line::from(vec![
                Span::styled("✨ Flow Mode Active", bold_style.fg(FLOW_ACCENT)),
                Span::styled("  Keep going!", dim_style),
            ])
        } else {
            let tab = |label: &'static str, mode: Mode| {
                if snap.mode == mode {
                    Span::styled(
                        format!(" {label} "),
                        accent_style.add_modifier(Modifier::REVERSED),
                    )
                } else {
                    Span::styled(format!(" {label} "), dim_style)
                }
            };
            Line::from(vec![
                tab("Focus", Mode::Focus),
                Span::raw(" "),
                tab("Break", Mode::Break),
            ])
        };
        Paragraph::new(mode_line)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        // keep the wave roughly square: terminal cells are about twice as tall as wide
        let wave_area = chunks[3];
        let wave_width = (wave_area.height.saturating_mul(2)).min(wave_area.width);
        let wave_rect = Rect {
            x: wave_area.x + (wave_area.width - wave_width) / 2,
            width: wave_width,
            ..wave_area
        };
        LiquidWave::new(&snap).render(wave_rect, buf);

        let noise = if snap.noise_enabled {
            Span::styled("♪ noise on", Style::default().fg(Color::Cyan))
        } else {
            Span::styled("♪ noise off", dim_style)
        };
        let mut controls = vec![noise];
        if !snap.running {
            controls.push(Span::styled("   ↺ (r)eset", dim_style));
        }
        Paragraph::new(Line::from(controls))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        let legend = match self.state {
            AppState::EditingTask => "(enter) save / (esc) cancel",
            AppState::Timer if snap.mode == Mode::Flow => {
                "(space) start/pause / (r)eset / (e)dit task / (n)oise / (q)uit"
            }
            AppState::Timer => {
                "(space) start/pause / (f)ocus / (b)reak / (e)dit task / (n)oise / (q)uit"
            }
        };
        Paragraph::new(Span::styled(legend, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use orbit::config::Config;
    use orbit::engine::FOCUS_DURATION;

    fn create_test_app(args: &[&str]) -> App {
        let mut argv = vec!["orbit"];
        argv.extend_from_slice(args);
        App::new(Cli::parse_from(argv), Config::default())
    }

    fn render_to_string(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_ui_widget_paused_focus() {
        let app = create_test_app(&["-t", "ship release"]);
        let rendered = render_to_string(&app, 80, 30);

        assert!(rendered.contains("Orbit"));
        assert!(rendered.contains("ship release"));
        assert!(rendered.contains("Focus"));
        assert!(rendered.contains("Break"));
        assert!(rendered.contains("25:00"));
        assert!(rendered.contains("PAUSED"));
        assert!(rendered.contains("(r)eset"));
        assert!(rendered.contains("noise off"));
    }

    #[test]
    fn test_ui_widget_running_hides_reset() {
        let mut app = create_test_app(&["--noise"]);
        app.session.toggle();
        for _ in 0..5 {
            app.session.on_tick();
        }
        let rendered = render_to_string(&app, 80, 30);

        assert!(rendered.contains("24:55"));
        assert!(rendered.contains("RUNNING"));
        assert!(!rendered.contains("(r)eset"));
        assert!(rendered.contains("noise on"));
    }

    #[test]
    fn test_ui_widget_flow() {
        let mut app = create_test_app(&[]);
        app.session.toggle();
        for _ in 0..FOCUS_DURATION + 65 {
            app.session.on_tick();
        }
        let rendered = render_to_string(&app, 80, 30);

        assert!(rendered.contains("Flow Mode Active"));
        assert!(rendered.contains("Keep going!"));
        assert!(rendered.contains("01:05"));
        assert!(rendered.contains("FLOW"));
        assert!(!rendered.contains("(f)ocus"));
    }

    #[test]
    fn test_ui_widget_editing_task() {
        let mut app = create_test_app(&[]);
        app.on_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE));
        app.task_draft = "draft text".to_string();
        let rendered = render_to_string(&app, 80, 30);

        assert!(rendered.contains("draft text"));
        assert!(rendered.contains("(enter) save"));
    }

    #[test]
    fn test_ui_widget_long_task_truncated() {
        let long = "a".repeat(200);
        let app = create_test_app(&["-t", long.as_str()]);
        let rendered = render_to_string(&app, 40, 24);
        assert!(rendered.contains('…'));
    }

    #[test]
    fn test_ui_widget_small_area() {
        let app = create_test_app(&[]);
        let _ = render_to_string(&app, 20, 5);
        let _ = render_to_string(&app, 1, 1);
    }
}
