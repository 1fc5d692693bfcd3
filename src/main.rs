mod shell;

use clap::Parser;
use datepick::{Picker, PickerOptions, ViewMode};
use shell::{Command, ShellError};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "datepick", version, about = "Drive a date/time picker from the terminal")]
struct Cli {
    /// Script of picker commands, one per line
    file: Option<PathBuf>,

    /// Run inline commands separated by `;`
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Display and parse pattern, e.g. `yyyy-MM-dd HH:mm`
    #[arg(long)]
    format: Option<String>,

    /// Extra patterns accepted when parsing typed text
    #[arg(long = "alt-format")]
    alt_formats: Vec<String>,

    #[arg(long)]
    locale: Option<String>,

    /// IANA zone name
    #[arg(long)]
    time_zone: Option<String>,

    #[arg(long)]
    min: Option<String>,

    #[arg(long)]
    max: Option<String>,

    #[arg(long = "default")]
    default_date: Option<String>,

    /// Select several dates
    #[arg(long)]
    multi: bool,

    #[arg(long, default_value = ", ")]
    separator: String,

    #[arg(long, default_value_t = 1)]
    stepping: u32,

    #[arg(long)]
    keep_invalid: bool,

    #[arg(long)]
    keep_open: bool,

    #[arg(long)]
    side_by_side: bool,

    #[arg(long)]
    no_use_current: bool,

    #[arg(long, value_parser = parse_view)]
    min_view: Option<ViewMode>,

    /// Initial text of the field
    #[arg(long, default_value = "")]
    value: String,
}

fn parse_view(name: &str) -> Result<ViewMode, String> {
    ViewMode::parse(name).ok_or_else(|| format!("expected years, months or days, got `{name}`"))
}

impl Cli {
    fn options(&self) -> PickerOptions {
        let mut options = PickerOptions::new()
            .with_minute_stepping(self.stepping)
            .with_use_current(!self.no_use_current)
            .with_keep_invalid(self.keep_invalid)
            .with_keep_open(self.keep_open)
            .with_side_by_side(self.side_by_side);
        options.format = self.format.clone();
        options.alt_formats = self.alt_formats.clone();
        options.locale = self.locale.clone();
        options.time_zone = self.time_zone.clone();
        options.min_date = self.min.clone().map(Into::into);
        options.max_date = self.max.clone().map(Into::into);
        options.default_date = self.default_date.clone().map(Into::into);
        options.min_view = self.min_view;
        if self.multi {
            options = options.with_multi_date(self.separator.clone());
        }
        options
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("DATEPICK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

enum Flow {
    Continue,
    Quit,
}

fn run_line(picker: &mut Picker, line: &str) -> Result<Flow, ShellError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Flow::Continue);
    }
    let command = Command::parse(line)?;
    if command == Command::Quit {
        return Ok(Flow::Quit);
    }
    let output = shell::execute(picker, command)?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }
    Ok(Flow::Continue)
}

fn run_script<'a>(picker: &mut Picker, lines: impl Iterator<Item = &'a str>) -> ExitCode {
    for line in lines {
        match run_line(picker, line) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::from(1);
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_file(picker: &mut Picker, path: &Path) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            return ExitCode::from(1);
        }
    };
    run_script(picker, source.lines())
}

fn run_repl(picker: &mut Picker) -> ExitCode {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("datepick v{}", env!("CARGO_PKG_VERSION"));
    println!("Type `help` for commands. Press Ctrl-D to exit.");
    print!("{}", shell::render(picker));

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        let read_result = stdin.lock().read_line(&mut line);

        match read_result {
            Ok(0) => break,
            Ok(_) => match run_line(picker, &line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => eprintln!("{e}"),
            },
            Err(e) => {
                eprintln!("Read error: {e}");
                return ExitCode::from(1);
            }
        }
    }

    println!();
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let mut picker = match shell::bind(&cli.value, cli.options()) {
        Ok(picker) => picker,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };
    let format = picker.format().to_string();
    picker.on_change(move |event| println!("{}", shell::describe_change(event, &format)));

    if let Some(code) = &cli.eval {
        return run_script(&mut picker, code.split(';'));
    }

    if let Some(path) = &cli.file {
        return run_file(&mut picker, path);
    }

    run_repl(&mut picker)
}
