use spidergram::{Chart, ChartCommand, ChartConfig, Item};

use rand::Rng;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configure the chart with the bon-generated builder; unset fields
    // keep their defaults.
    let config = ChartConfig::builder()
        .title("Spidergram demo".to_string())
        .offset(80.0)
        .rotate(270.0)
        .curve_width(8.0)
        .build();

    let items = vec![
        Item::new("Metal", 0.32),
        Item::new("Wood", 0.55),
        Item::new("Water", 0.41),
        Item::new("Fire", 0.78),
        Item::new("Earth", 0.98),
    ];
    let mut chart = Chart::new(config, items)?;

    // Create a channel for sending random commands
    let (sender, receiver) = mpsc::channel();

    // Spawn a thread that keeps nudging the chart inputs
    thread::spawn(move || {
        let mut rng = rand::rng();
        loop {
            let commands = [
                ChartCommand::SetAllValues(
                    (0..5).map(|_| rng.random_range(0.1..1.0)).collect(),
                ),
                ChartCommand::SetOffset(rng.random_range(-150.0..150.0)),
            ];

            if commands.iter().any(|cmd| sender.send(cmd.clone()).is_err()) {
                break;
            }

            thread::sleep(Duration::from_millis(500));
        }
    });

    println!("Displaying a spider chart with randomly moving inputs:");
    println!("- all five axis values change every 500 ms");
    println!("- the curve bow offset wanders between -150 and 150 px");
    println!("Press Ctrl+C to exit");

    chart.show_with_commands(receiver)
}
