use crate::AppError::ConfigError;
use clap::Parser;
use config::Config;
use smf_notes::{decode_file_with, MidiFile, SmfError, TruncationPolicy};
use std::io;
use std::path::PathBuf;

mod config;

fn main() {
    let result = main_result();
    std::process::exit(match result {
        Ok(()) => 0,
        Err(err) => {
            // use Display instead of Debug for user friendly error messages
            log::error!("{err}");
            1
        }
    });
}

pub fn main_result() -> Result<(), AppError> {
    // setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("smf_notes=info"))
        .init();

    // args
    let args = CliArgs::parse();
    let midi_file_path = PathBuf::from(&args.midi_file);
    if !midi_file_path.exists() {
        let err = ConfigError(format!("MIDI file not found {midi_file_path:?}"));
        return Err(err);
    }

    // read config and apply overrides
    let config_path = args.config.as_ref().map(PathBuf::from);
    let mut local_config = Config::read_config(config_path.as_deref())?;
    let options = local_config.decode_options_mut();
    if args.strict {
        options.strict_chunk_ids = true;
    }
    if args.no_format_check {
        options.validate_format = false;
    }
    if args.fail_on_truncation {
        options.truncation = TruncationPolicy::Fail;
    }

    log::info!("Decoding {midi_file_path:?}");
    let file_data = std::fs::read(&midi_file_path)?;
    let midi = decode_file_with(&file_data, local_config.decode_options())?;

    // go!
    print_summary(&midi, args.notes);
    Ok(())
}

fn print_summary(midi: &MidiFile, with_notes: bool) {
    println!(
        "format:{} tracks:{}/{} division:{}",
        midi.format,
        midi.tracks.len(),
        midi.track_count,
        midi.division
    );
    match (midi.tempo_micros_per_quarter, midi.bpm()) {
        (Some(tempo), Some(bpm)) => println!("tempo:{tempo} ({bpm}bpm)"),
        _ => println!("tempo: none"),
    }
    for (index, track) in midi.tracks.iter().enumerate() {
        println!(
            "track {index} name:{:?} instrument:{:?} events:{} notes:{} keys:{}-{}",
            track.name.as_deref().unwrap_or_default(),
            track.instrument.as_deref().unwrap_or_default(),
            track.events.len(),
            track.notes.len(),
            track.min_key,
            track.max_key
        );
        if with_notes {
            for note in &track.notes {
                println!(
                    "  key:{} velocity:{} start:{} duration:{}",
                    note.key, note.velocity, note.start_tick, note.duration
                );
            }
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the Standard MIDI File to decode.
    midi_file: String,
    /// Optional path to a JSON config file (defaults to ~/.smf-notes/config.json).
    #[arg(long)]
    config: Option<String>,
    /// Require `MThd`/`MTrk` chunk ids.
    #[arg(long, default_value_t = false)]
    strict: bool,
    /// Accept header formats other than 0, 1 and 2.
    #[arg(long, default_value_t = false)]
    no_format_check: bool,
    /// Fail instead of keeping partial tracks on truncated input.
    #[arg(long, default_value_t = false)]
    fail_on_truncation: bool,
    /// Print every resolved note.
    #[arg(long, default_value_t = false)]
    notes: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("parsing error: {0}")]
    ParsingError(String),
    #[error("other error: {0}")]
    OtherError(String),
}

impl From<SmfError> for AppError {
    fn from(error: SmfError) -> Self {
        match error {
            SmfError::ConfigError(s) => Self::ConfigError(s),
            SmfError::IoError(s) => Self::OtherError(s),
            parse_error => Self::ParsingError(parse_error.to_string()),
        }
    }
}

impl From<io::Error> for AppError {
    fn from(error: io::Error) -> Self {
        Self::OtherError(error.to_string())
    }
}
