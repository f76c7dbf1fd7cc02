use ratatui::style::Color;

/// Parse a theme color: a terminal color name, `#RRGGBB`, `#RGB` or
/// `rgb(r, g, b)`. Anything else is white.
pub fn parse_color(color_str: &str) -> Color {
    let s = color_str.trim().to_lowercase();
    named_color(&s)
        .or_else(|| s.strip_prefix('#').and_then(parse_hex))
        .or_else(|| s.strip_prefix("rgb(").and_then(|rest| rest.strip_suffix(')')).and_then(parse_rgb))
        .unwrap_or(Color::White)
}

/// Terminal palette names; the first spelling of a color is the one shown.
const NAMED: [(&str, Color); 21] = [
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("gray", Color::Gray),
    ("grey", Color::Gray),
    ("lightgray", Color::Gray),
    ("lightgrey", Color::Gray),
    ("darkgray", Color::DarkGray),
    ("darkgrey", Color::DarkGray),
    ("lightred", Color::LightRed),
    ("lightgreen", Color::LightGreen),
    ("lightyellow", Color::LightYellow),
    ("lightblue", Color::LightBlue),
    ("lightmagenta", Color::LightMagenta),
    ("lightcyan", Color::LightCyan),
    ("reset", Color::Reset),
];

fn named_color(name: &str) -> Option<Color> {
    NAMED.iter().find(|(n, _)| *n == name).map(|(_, color)| *color)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => {
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
            Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
        }
        3 => {
            // #abc is #aabbcc
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(Color::Rgb(channel(0)?, channel(1)?, channel(2)?))
        }
        _ => None,
    }
}

fn parse_rgb(body: &str) -> Option<Color> {
    let channels: Vec<u8> = body
        .split(',')
        .map(|part| part.trim().parse::<u8>().ok())
        .collect::<Option<_>>()?;
    match channels.as_slice() {
        [r, g, b] => Some(Color::Rgb(*r, *g, *b)),
        _ => None,
    }
}

/// Inverse of [`parse_color`] for the colors it produces.
pub fn format_color_for_display(color: &Color) -> String {
    match color {
        Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
        Color::Indexed(i) => format!("indexed({})", i),
        other => NAMED
            .iter()
            .find(|(_, named)| named == other)
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| "white".to_string()),
    }
}

/// Black or white, whichever reads better on `background`.
///
/// RGB colors use WCAG relative luminance. Named colors depend on the
/// terminal palette, so only the usual dark ones get white text.
pub fn get_contrast_text_color(background: Color) -> Color {
    match background {
        Color::Rgb(r, g, b) => {
            if relative_luminance(r, g, b) < 0.5 {
                Color::White
            } else {
                Color::Black
            }
        }
        Color::Black | Color::Blue | Color::Magenta | Color::Red | Color::DarkGray => Color::White,
        _ => Color::Black,
    }
}

fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    let linear = |channel: u8| {
        let c = channel as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_notation() {
        assert_eq!(parse_color("Blue"), Color::Blue);
        assert_eq!(parse_color("#ff8000"), Color::Rgb(255, 128, 0));
        assert_eq!(parse_color("#f80"), Color::Rgb(255, 136, 0));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Color::Rgb(1, 2, 3));
        assert_eq!(parse_color("chartreuse"), Color::White);
        assert_eq!(parse_color("rgb(1,2)"), Color::White);
    }

    #[test]
    fn display_round_trips_rgb() {
        let color = Color::Rgb(217, 201, 163);
        assert_eq!(parse_color(&format_color_for_display(&color)), color);
        assert_eq!(format_color_for_display(&Color::Gray), "gray");
        assert_eq!(parse_color("LightGray"), Color::Gray);
    }

    #[test]
    fn contrast_follows_brightness() {
        assert_eq!(get_contrast_text_color(Color::Rgb(10, 10, 10)), Color::White);
        assert_eq!(get_contrast_text_color(Color::Rgb(240, 240, 200)), Color::Black);
        assert_eq!(get_contrast_text_color(Color::Blue), Color::White);
        assert_eq!(get_contrast_text_color(Color::Cyan), Color::Black);
    }
}
