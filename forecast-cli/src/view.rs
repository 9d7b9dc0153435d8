use console::{Term, style};
use forecast_core::{ForecastView, Header, Row, Screen};
use std::io;

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Redraw the whole screen: the input line, then the projected regions.
pub fn draw(term: &Term, input: &str, screen: &Screen, frame: usize) -> io::Result<()> {
    term.clear_screen()?;
    term.write_line(&format!("{} {}_", style(">").cyan().bold(), input))?;
    term.write_line("")?;
    for line in render_lines(screen, frame) {
        term.write_line(&line)?;
    }
    term.write_line("")?;
    term.write_line(&style("esc to quit").dim().to_string())?;
    Ok(())
}

pub fn render_lines(screen: &Screen, frame: usize) -> Vec<String> {
    match screen {
        Screen::Spinner => {
            let c = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
            vec![format!("  {c} Loading...")]
        }
        Screen::Forecast(view) => forecast_lines(view),
    }
}

fn forecast_lines(view: &ForecastView) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(header) = &view.header {
        lines.extend(header_lines(header));
        lines.push(String::new());
    }

    if let Some(error) = &view.error {
        lines.push(format!("  {}", style(error).red()));
    }

    if let Some(placeholder) = &view.placeholder {
        lines.push(format!("  {}", style(placeholder.message()).dim()));
    }

    lines.extend(view.rows.iter().map(row_line));
    lines
}

fn header_lines(header: &Header) -> Vec<String> {
    vec![
        format!(
            "  {} {}",
            style(format!("{}°C", header.temperature)).bold(),
            glyph(&header.condition_code)
        ),
        format!(
            "  {}  {}",
            style(&header.time).italic(),
            capitalize_words(&header.description)
        ),
    ]
}

fn row_line(row: &Row) -> String {
    format!(
        "  {:<10} {} {:<24} {}  {:>5}",
        style(&row.day).bold(),
        glyph(&row.condition_code),
        capitalize_words(&row.description),
        style(&row.time).italic(),
        format!("{}°C", row.temperature),
    )
}

/// Terminal stand-in for the condition icon, keyed by the code family.
fn glyph(code: &str) -> &'static str {
    match code.get(..2) {
        Some("01") => "☀",
        Some("02") => "⛅",
        Some("03") | Some("04") => "☁",
        Some("09") | Some("10") => "☂",
        Some("11") => "⚡",
        Some("13") => "❄",
        Some("50") => "≋",
        _ => "·",
    }
}

fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
