use anyhow::{Context, Result};
use clap::{Arg, Command};
use encly::{ConvertOptions, Document};

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}: {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn print_document(doc: &Document) {
    eprintln!("{}", doc.header);
    for staff in &doc.staves {
        eprintln!(
            "staff {} {:?} clef {} transposition {}",
            staff.id,
            staff.display_name(),
            staff.clef,
            staff.transposition
        );
    }
    for line in &doc.lines {
        eprintln!(
            "system {} measures {}..{}",
            line.id,
            line.measure_start(),
            line.measure_end()
        );
    }
    for measure in &doc.measures {
        let (num, den) = measure.time_signature();
        eprintln!(
            "measure {} at tick {} time {}/{} length {}",
            measure.id, measure.absolute_tick, num, den, measure.duration_ticks
        );
        for element in &measure.elements {
            eprintln!(
                "  {:>5} staff {} voice {} {} ({} bytes)",
                element.tick(),
                element.staff(),
                element.voice(),
                element.type_name(),
                element.raw.len()
            );
        }
    }
}

fn main() -> Result<()> {
    let matches = Command::new("encly")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Encore to LilyPond converter")
        .arg(
            Arg::new("input")
                .help("Input Encore file (.enc)")
                .required(true)
                .value_name("INPUT_FILE")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .help("Output LilyPond file, stdout if omitted")
                .short('o')
                .long("output")
                .value_name("OUTPUT_FILE"),
        )
        .arg(
            Arg::new("debug")
                .help("Print the decoded document to stderr")
                .long("debug")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .help("Enable verbose output")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-staff-names")
                .help("Do not print staff names")
                .long("no-staff-names")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let input_file = matches
        .get_one::<String>("input")
        .context("No input file given")?;
    let output_file = matches.get_one::<String>("output");
    let debug = matches.get_flag("debug");
    let verbose = matches.get_flag("verbose");

    let level = if verbose || debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(level))
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    let options = ConvertOptions {
        staff_names: !matches.get_flag("no-staff-names"),
    };

    if verbose {
        eprintln!("Reading Encore file: {}", input_file);
    }
    let bytes = std::fs::read(input_file)
        .with_context(|| format!("Failed to read input file: {}", input_file))?;
    let doc = encly::read_document(&bytes)
        .with_context(|| format!("Failed to decode Encore file: {}", input_file))?;

    if debug {
        print_document(&doc);
    }

    let conversion = encly::convert_document(&doc, &options)
        .with_context(|| format!("Failed to convert {}", input_file))?;

    if verbose {
        eprintln!(
            "{} voices, {} anomalies, {} warnings",
            conversion.score.voices().count(),
            conversion.anomalies.len(),
            conversion.warnings.len()
        );
    }

    let output_content = conversion.score.to_string();
    match output_file {
        Some(output_file) => {
            if verbose {
                eprintln!("Writing LilyPond file: {}", output_file);
            }
            std::fs::write(output_file, output_content)
                .with_context(|| format!("Failed to write output file: {}", output_file))?;
        }
        None => print!("{}", output_content),
    }

    Ok(())
}
