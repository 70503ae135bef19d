use crate::config::NodeSizingConfig;
use crate::ir::{Port, PortDirection};

/// Size and text rows of one measured module box.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeMetrics {
    pub(crate) width: f32,
    pub(crate) height: f32,
    /// Distance from the box top to the first port row.
    pub(crate) port_offset: f32,
    pub(crate) in_ports: usize,
    pub(crate) out_ports: usize,
    pub(crate) summary_lines: Vec<String>,
}

/// Measures a module box from its name, optional summary (with provenance
/// tag) and ports.
pub(crate) fn measure_node(
    name: &str,
    summary: Option<&str>,
    summary_source: Option<&str>,
    ports: &[Port],
    config: &NodeSizingConfig,
) -> NodeMetrics {
    let pad = config.padding_x;
    let mut title_width = text_width(name, config.title_font_size);
    if let Some(source) = summary_source.filter(|source| !source.trim().is_empty()) {
        // Provenance badge sits at the right end of the title row.
        title_width += text_width(source.trim(), config.port_font_size) + pad * 1.5;
    }

    let summary_lines = summary
        .map(|text| {
            wrap_words(
                text,
                config.summary_chars_per_line,
                config.max_summary_lines,
            )
        })
        .unwrap_or_default();
    let summary_width = summary_lines
        .iter()
        .map(|line| text_width(line, config.summary_font_size))
        .fold(0.0, f32::max);

    let mut in_ports = 0usize;
    let mut out_ports = 0usize;
    let mut widest_in = 0.0f32;
    let mut widest_out = 0.0f32;
    for port in ports {
        let name = truncate_chars(&port.name, config.port_label_max_chars);
        match port.direction {
            PortDirection::In => {
                in_ports += 1;
                widest_in = widest_in.max(text_width(&format!("IN {name}"), config.port_font_size));
            }
            PortDirection::Out => {
                out_ports += 1;
                widest_out =
                    widest_out.max(text_width(&format!("OUT {name}"), config.port_font_size));
            }
        }
    }
    // In labels hug the left edge, out labels the right one; the port dots
    // take roughly one padding on each side.
    let port_width = widest_in + widest_out + pad * 4.0;

    let content = (title_width + pad * 2.0)
        .max(summary_width + pad * 2.0)
        .max(port_width);
    let max_width = config.max_width.max(config.min_width);
    let width = content.clamp(config.min_width, max_width);

    let summary_height = summary_lines.len() as f32 * config.summary_line_height;
    let port_rows = in_ports.max(out_ports) as f32;
    let height = config.base_height + summary_height + port_rows * config.port_line_height;

    NodeMetrics {
        width,
        height,
        port_offset: config.port_start_offset + summary_height,
        in_ports,
        out_ports,
        summary_lines,
    }
}

/// Relative glyph advance per character, in ems.
pub(crate) fn char_width_factor(ch: char) -> f32 {
    match ch {
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '|' | '!' | '\'' => 0.26,
        'f' | 't' | 'r' | ' ' | '(' | ')' | '[' | ']' | '{' | '}' | '/' | '\\' | '-' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.9,
        'A'..='Z' => 0.68,
        'a'..='z' | '0'..='9' => 0.57,
        c if c.is_ascii() => 0.57,
        // CJK and other wide scripts.
        _ => 1.0,
    }
}

pub(crate) fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width_factor).sum::<f32>() * font_size
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Greedy word wrap to `chars_per_line`, keeping at most `max_lines` rows.
/// The last kept row gets an ellipsis when text is cut.
pub(crate) fn wrap_words(text: &str, chars_per_line: usize, max_lines: usize) -> Vec<String> {
    let chars_per_line = chars_per_line.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word = truncate_chars(word, chars_per_line);
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > chars_per_line && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if max_lines == 0 {
        return Vec::new();
    }
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let keep = chars_per_line.saturating_sub(1);
            *last = last.chars().take(keep).collect::<String>();
            last.push('…');
        }
    }
    lines
}
