use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use structopt::StructOpt;

use fdxread::format::{Formatter, JsonLines, Nmea0183, SignalkDelta};
use fdxread::{ByteSource, HexdumpSource, Pipeline, RawDumpSource, SerialSource, Step};

#[derive(StructOpt, Debug)]
#[structopt(
    about = "Read FDX protocol data from a Garmin GND10 gateway (or a capture of one) and translate it to NMEA 0183, JSON or structured deltas. Report protocol findings at <https://github.com/fdxread/fdxread>."
)]
struct Opt {
    #[structopt(
        name = "INPUT",
        help = "Serial port or capture file to read from. Examples: /dev/ttyACM0, COM3, ./boat.dump, ./race.nxb"
    )]
    input: String,

    #[structopt(
        long,
        default_value = "sentences",
        help = "Output mode: sentences, json, structured or raw"
    )]
    output: String,

    #[structopt(short, long, help = "Verbose output")]
    verbose: bool,

    #[structopt(
        long,
        default_value = "0",
        help = "Seek this many bytes into the file before starting (files only)"
    )]
    seek: u64,

    #[structopt(
        long,
        default_value = "20",
        help = "Pace replay to n messages per second (files only; 0 disables)"
    )]
    pace: f64,

    #[structopt(
        long,
        help = "Send the FDX mode change to the gateway after each port open"
    )]
    send_init: bool,
}

fn main() {
    let opt = Opt::from_args();

    env_logger::Builder::from_default_env()
        .filter_level(if opt.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    let formatter: Box<dyn Formatter> = match opt.output.as_str() {
        "sentences" => Box::new(Nmea0183::new()),
        "json" => Box::new(JsonLines::new(false)),
        "raw" => Box::new(JsonLines::new(true)),
        "structured" => Box::new(SignalkDelta::new()),
        other => {
            eprintln!("unknown output mode: {}", other);
            process::exit(1);
        }
    };

    if let Err(e) = run(&opt, formatter) {
        eprintln!("Error: {:#}", e);
        process::exit(2);
    }
}

fn run(opt: &Opt, mut formatter: Box<dyn Formatter>) -> Result<()> {
    let is_file = Path::new(&opt.input).is_file();
    let source: Box<dyn ByteSource> = if is_file {
        if opt.input.ends_with(".nxb") {
            Box::new(
                RawDumpSource::open(&opt.input, opt.seek)
                    .with_context(|| format!("cannot replay {}", opt.input))?,
            )
        } else {
            Box::new(
                HexdumpSource::open(&opt.input, opt.seek)
                    .with_context(|| format!("cannot replay {}", opt.input))?,
            )
        }
    } else {
        Box::new(SerialSource::new(&opt.input, opt.send_init))
    };

    let pace = if is_file && opt.pace > 0.0 {
        Some(Duration::from_secs_f64(1.0 / opt.pace))
    } else {
        None
    };

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let mut pipeline = Pipeline::new(source);

    for step in &mut pipeline {
        match step? {
            Step::Idle => debug!("no data"),
            Step::Event(msg) => {
                if let Some(line) = formatter.format(&msg) {
                    // A broken pipe downstream just means we are done.
                    if writeln!(stdout, "{}", line).is_err() {
                        break;
                    }
                    if stdout.flush().is_err() {
                        break;
                    }
                }
                if let Some(delay) = pace {
                    thread::sleep(delay);
                }
            }
        }
    }

    info!(
        "replay complete: {} messages, {} errors",
        pipeline.n_msg(),
        pipeline.n_errors()
    );
    Ok(())
}
