use anyhow::Result;
use ratatui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};

use super::Renderer;
use crate::data::Sample;

const COLOR_HEADER: Color = Color::Cyan;
const COLOR_VALUE: Color = Color::Green;

fn render_summary(frame: &mut Frame, area: Rect, sample: &Sample) {
    let header = Style::default().fg(COLOR_HEADER).add_modifier(Modifier::BOLD);
    let value = Style::default().fg(COLOR_VALUE);

    let lines = vec![
        Line::from(Span::styled("GPU Monitoring Tool", header)),
        Line::from(Span::styled("-------------------", header)),
        Line::from(vec![
            Span::raw("SM Utilization: "),
            Span::styled(format!("{}%", sample.sm_util), value),
        ]),
        Line::from(vec![
            Span::raw("Power Usage   : "),
            Span::styled(format!("{:.2} W", sample.power_watts()), value),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

/// Full-screen summary, wiped and redrawn for every sample
pub struct Dashboard<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> Dashboard<B> {
    pub fn new(backend: B) -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
        })
    }
}

impl<B: Backend> Renderer for Dashboard<B> {
    fn render(&mut self, sample: &Sample) -> Result<()> {
        self.terminal.clear()?;
        self.terminal.draw(|frame| {
            let area = frame.area();
            render_summary(frame, area, sample);
        })?;
        Ok(())
    }
}
