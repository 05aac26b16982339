use spidergram::{Chart, ChartCommand, ChartConfig, Item};

use rand::Rng;
use std::env;
use std::fs;
use std::io::{self, BufRead};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

// Font lookup when --font is not given. Labels are skipped when none of
// these exist either.
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn default_items() -> Vec<Item> {
    vec![
        Item::new("Metal", 0.32),
        Item::new("Wood", 0.55),
        Item::new("Water", 0.41),
        Item::new("Fire", 0.78),
        Item::new("Earth", 0.98),
    ]
}

/// Parses `--items "Metal=0.32,Wood=0.55"` into the item list.
fn parse_items(arg: &str) -> Vec<Item> {
    arg.split(',')
        .filter_map(|part| {
            let (label, value) = part.split_once('=')?;
            let value = value.trim().parse().ok()?;
            Some(Item::new(label.trim(), value))
        })
        .collect()
}

fn load_font(path: Option<&str>) -> Option<Vec<u8>> {
    if let Some(path) = path {
        match fs::read(path) {
            Ok(data) => return Some(data),
            Err(error) => {
                tracing::warn!(%path, %error, "could not read font, trying fallbacks");
            }
        }
    }
    FALLBACK_FONTS
        .iter()
        .find_map(|candidate| fs::read(candidate).ok())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut items = default_items();
    let mut title = "Spidergram".to_string();
    let mut size: u32 = 1000;
    let mut padding = 100.0;
    let mut offset = 100.0;
    let mut rotate = 0.0;
    let mut font_path: Option<String> = None;
    let mut demo = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--items" => {
                if let Some(list) = args.next() {
                    let parsed = parse_items(&list);
                    if parsed.is_empty() {
                        tracing::warn!(%list, "no items parsed, keeping defaults");
                    } else {
                        items = parsed;
                    }
                }
            }
            "--title" => {
                if let Some(value) = args.next() {
                    title = value;
                }
            }
            "--size" => {
                if let Some(value) = args.next().and_then(|v| v.parse().ok()) {
                    size = value;
                }
            }
            "--padding" => {
                if let Some(value) = args.next().and_then(|v| v.parse().ok()) {
                    padding = value;
                }
            }
            "--offset" => {
                if let Some(value) = args.next().and_then(|v| v.parse().ok()) {
                    offset = value;
                }
            }
            "--rotate" => {
                if let Some(value) = args.next().and_then(|v| v.parse().ok()) {
                    rotate = value;
                }
            }
            "--font" => {
                font_path = args.next();
            }
            "--demo" => {
                demo = true;
            }
            other => {
                tracing::warn!(%other, "unrecognized argument ignored");
            }
        }
    }

    let font_data = load_font(font_path.as_deref());
    if font_data.is_none() {
        tracing::warn!("no usable font found, labels will not be drawn");
    }

    let config = ChartConfig::builder()
        .title(title)
        .size(size)
        .padding(padding)
        .offset(offset)
        .rotate(rotate)
        .maybe_font_data(font_data)
        .build();

    let item_count = items.len();
    let mut chart = Chart::new(config, items)?;

    let (sender, receiver) = mpsc::channel();

    // Live updates arrive on stdin, one per line:
    //   "<label> <value>"  or  "<index> <value>"  sets one axis,
    //   "offset <px>"      moves the curve bow,
    //   "rotate <deg>"     spins the whole chart.
    let stdin_sender = sender.clone();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let mut parts = line.split_whitespace();
            let (Some(target), Some(raw)) = (parts.next(), parts.next()) else {
                continue;
            };
            let Ok(value) = raw.parse::<f64>() else {
                tracing::debug!(%line, "ignoring unparsable input line");
                continue;
            };
            let command = match target {
                "offset" => ChartCommand::SetOffset(value),
                "rotate" => ChartCommand::SetRotate(value),
                label => match label.parse::<usize>() {
                    Ok(index) => ChartCommand::SetValue(index, value),
                    Err(_) => ChartCommand::SetValueByLabel(label.to_string(), value),
                },
            };
            if stdin_sender.send(command).is_err() {
                break;
            }
        }
    });

    if demo {
        // Random-walk the axis values while nothing is piped in.
        let demo_sender = sender;
        thread::spawn(move || {
            let mut rng = rand::rng();
            loop {
                let values = (0..item_count)
                    .map(|_| rng.random_range(0.05..1.0))
                    .collect();
                if demo_sender.send(ChartCommand::SetAllValues(values)).is_err() {
                    break;
                }
                thread::sleep(Duration::from_millis(400));
            }
        });
    }

    chart.show_with_commands(receiver)
}
