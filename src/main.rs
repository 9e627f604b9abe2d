//! tonegen - play sine tones from the command line
//!
//! Usage:
//!   tonegen list                     print the tone catalog
//!   tonegen play <hz> [secs] [vol]   play one frequency
//!   tonegen chord <hz> <hz>... [--secs N]
//!   tonegen                          short demo chord

use std::time::Duration;

use tonegen::{catalog, AppSettings, MultiTonePlayer, TonePlayer, DEFAULT_SAMPLE_RATE};

fn main() {
    env_logger::init();
    log::info!("Starting tonegen");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = AppSettings::load();

    match args.first().map(String::as_str) {
        Some("list") => list_catalog(&settings),
        Some("play") => play_one(&args[1..], &settings),
        Some("chord") => play_chord(&args[1..], &settings),
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Usage: tonegen [list | play <hz> [secs] [vol] | chord <hz> <hz>...]");
            std::process::exit(2);
        }
        None => demo(&settings),
    }
}

fn list_catalog(settings: &AppSettings) {
    for entry in catalog::entries() {
        let star = if settings.is_favorite(entry.id) { "*" } else { " " };
        println!(
            "{} {:>3}  {:<16} {:>8.1} Hz  {}",
            star, entry.id, entry.name, entry.frequency, entry.description
        );
    }
}

fn play_one(args: &[String], settings: &AppSettings) {
    let Some(frequency) = args.first().and_then(|s| s.parse::<f64>().ok()) else {
        eprintln!("Usage: tonegen play <hz> [secs] [vol]");
        std::process::exit(2);
    };
    let secs = args
        .get(1)
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(3.0);
    let volume = args
        .get(2)
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or_else(|| settings.default_volume());

    println!("Playing {} Hz for {:.1}s at volume {:.2}", frequency, secs, volume);
    let player = TonePlayer::with_default_output();
    player.play_frequency(frequency, DEFAULT_SAMPLE_RATE, volume);
    if !player.is_currently_playing() {
        eprintln!("Could not open an audio output");
        std::process::exit(1);
    }
    std::thread::sleep(Duration::from_secs_f64(secs));
    player.release();
}

fn play_chord(args: &[String], settings: &AppSettings) {
    let frequencies: Vec<f64> = args.iter().filter_map(|s| s.parse().ok()).collect();
    if frequencies.is_empty() {
        eprintln!("Usage: tonegen chord <hz> <hz>...");
        std::process::exit(2);
    }

    let player = MultiTonePlayer::with_default_output();
    for &frequency in &frequencies {
        player.play_frequency(frequency, DEFAULT_SAMPLE_RATE, settings.default_volume());
    }
    println!("Playing {:?} for 3s", player.active_frequencies());
    std::thread::sleep(Duration::from_secs(3));
    player.release();
}

fn demo(settings: &AppSettings) {
    // A major chord on concert pitch
    let player = MultiTonePlayer::with_default_output();
    for &frequency in &[440.0, 554.37, 659.25] {
        player.play_frequency(frequency, DEFAULT_SAMPLE_RATE, settings.default_volume());
    }
    if player.active_frequencies().is_empty() {
        eprintln!("Could not open an audio output");
        std::process::exit(1);
    }
    println!("Playing demo chord for 2s (try `tonegen list`)");
    std::thread::sleep(Duration::from_secs(2));
    player.release();
}
