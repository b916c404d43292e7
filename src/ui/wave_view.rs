use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use orbit::session::Snapshot;
use orbit::wave::{Rgb, WaveParams, LAYERS, SURFACE_SIZE};

pub fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

/// How opaque the liquid is at surface point (x, y), combining every layer
/// that covers it
pub fn coverage(params: &WaveParams, x: f64, y: f64) -> f64 {
    let clear = LAYERS
        .iter()
        .filter(|layer| y >= params.surface_at(layer, x))
        .fold(1.0, |acc, layer| acc * (1.0 - layer.opacity));
    1.0 - clear
}

/// Liquid-filled timer face with the time and status drawn over it
pub struct LiquidWave<'a> {
    pub snapshot: &'a Snapshot,
}

impl<'a> LiquidWave<'a> {
    pub fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    fn params(&self) -> WaveParams {
        WaveParams {
            fill_fraction: self.snapshot.fill_fraction,
            phase: self.snapshot.phase,
            colors: self.snapshot.colors,
        }
    }
}

impl Widget for LiquidWave<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snap = self.snapshot;
        let colors = snap.colors;
        let glow = if snap.running {
            colors.glow
        } else {
            colors.glow.scale(0.5)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(rgb(glow)));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let params = self.params();
        for row in 0..inner.height {
            // map each cell centre onto the reference surface
            let y = (row as f64 + 0.5) / inner.height as f64 * SURFACE_SIZE;
            let depth = y / SURFACE_SIZE;
            for col in 0..inner.width {
                let x = (col as f64 + 0.5) / inner.width as f64 * SURFACE_SIZE;
                let alpha = coverage(&params, x, y);
                if alpha <= 0.0 {
                    continue;
                }
                let color = colors.background.lerp(colors.at(depth), alpha);
                if let Some(cell) = buf.cell_mut((inner.x + col, inner.y + row)) {
                    cell.set_symbol(" ");
                    cell.set_bg(rgb(color));
                }
            }
        }

        if inner.height < 2 {
            return;
        }
        let text_area = Rect {
            x: inner.x,
            y: inner.y + (inner.height - 2) / 2,
            width: inner.width,
            height: 2,
        };
        let overlay = Paragraph::new(vec![
            Line::from(Span::styled(
                snap.time_text(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                snap.status_text().to_uppercase(),
                Style::default().fg(Color::Gray),
            )),
        ])
        .alignment(Alignment::Center);
        overlay.render(text_area, buf);
    }
}
