//! Interactive region browser
//!
//! Reads one command per line and applies it to a viewing session, printing
//! a summary whenever the image changes.

use crate::commands::peek;
use crate::export::save_image;
use anyhow::{bail, Context, Result};
use memviz::{MemorySource, Session, SessionSettings};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

/// Bytes shown by `peek` when no count is given
const DEFAULT_PEEK_BYTES: usize = 68;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjust {
    To(usize),
    By(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    Next,
    Byte(usize),
    Pixel(Adjust),
    Width(Adjust),
    Format(String),
    Info,
    Peek(usize),
    Save(Option<PathBuf>),
    Help,
    Quit,
}

/// `+n` / `-n` adjust relative to the current value, plain `n` sets it
fn parse_adjust(arg: &str) -> Result<Adjust> {
    if arg.starts_with('+') || arg.starts_with('-') {
        let delta = arg
            .parse::<i64>()
            .with_context(|| format!("Invalid amount: {}", arg))?;
        Ok(Adjust::By(delta))
    } else {
        let value = arg
            .parse::<usize>()
            .with_context(|| format!("Invalid number: {}", arg))?;
        Ok(Adjust::To(value))
    }
}

fn parse_count(arg: Option<&str>, what: &str) -> Result<usize> {
    let arg = arg.with_context(|| format!("Missing {}", what))?;
    arg.parse()
        .with_context(|| format!("Invalid {}: {}", what, arg))
}

/// Parse one input line; blank lines yield `None`
pub fn parse_command(line: &str) -> Result<Option<ViewCommand>> {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let command = match word {
        "next" | "n" => ViewCommand::Next,
        // Quick byte alignment, one key per offset
        "1" | "2" | "3" | "4" => ViewCommand::Byte(parse_count(Some(word), "offset")? - 1),
        "byte" | "b" => ViewCommand::Byte(parse_count(arg, "byte offset")?),
        "pixel" | "p" => {
            ViewCommand::Pixel(parse_adjust(arg.context("Missing pixel offset")?)?)
        }
        "width" | "w" => ViewCommand::Width(parse_adjust(arg.context("Missing width")?)?),
        "format" | "f" => ViewCommand::Format(arg.context("Missing format name")?.to_string()),
        "info" | "i" => ViewCommand::Info,
        "peek" => match arg {
            Some(_) => ViewCommand::Peek(parse_count(arg, "byte count")?),
            None => ViewCommand::Peek(DEFAULT_PEEK_BYTES),
        },
        "save" | "s" => ViewCommand::Save(arg.map(PathBuf::from)),
        "help" | "h" | "?" => ViewCommand::Help,
        "quit" | "q" | "exit" => ViewCommand::Quit,
        other => bail!("Unknown command: {} (try 'help')", other),
    };

    Ok(Some(command))
}

/// Apply a command to the session
///
/// Returns `false` when the session should end. Recoverable failures (bad
/// format names, unreadable memory) are reported and the session continues.
pub fn apply<S: MemorySource + ?Sized>(
    session: &mut Session<'_, S>,
    command: ViewCommand,
    default_output: &std::path::Path,
) -> Result<bool> {
    match command {
        ViewCommand::Next => {
            let region = session.next_region()?;
            println!("{:#x} ({} bytes)", region.start, region.size());
        }
        ViewCommand::Byte(offset) => session.set_byte_offset(offset),
        ViewCommand::Pixel(Adjust::To(offset)) => session.set_pixel_offset(offset),
        ViewCommand::Pixel(Adjust::By(delta)) => session.shift_pixel_offset(delta),
        ViewCommand::Width(Adjust::To(width)) => session.set_width(width)?,
        ViewCommand::Width(Adjust::By(delta)) => session.adjust_width(delta),
        ViewCommand::Format(name) => {
            // Unknown names are logged by the session; keep going
            let _ = session.select_format(&name);
        }
        ViewCommand::Info => print_info(session),
        ViewCommand::Peek(count) => {
            let start = session.region().start;
            let count = count.min(session.region().size());
            if let Err(e) = peek::dump(session.source(), start, count) {
                warn!("{:#}", e);
            }
        }
        ViewCommand::Save(path) => {
            let path = path.unwrap_or_else(|| default_output.to_path_buf());
            match session.image() {
                Some(image) => save_image(image, &path)?,
                None => warn!("No image to save yet"),
            }
        }
        ViewCommand::Help => print_help(),
        ViewCommand::Quit => return Ok(false),
    }

    if session.is_stale() {
        refresh(session);
    }

    Ok(true)
}

/// Decode if needed and print the new image size
///
/// Failures are logged by the session and the previous image stays current.
fn refresh<S: MemorySource + ?Sized>(session: &mut Session<'_, S>) {
    if session.refresh().is_err() {
        return;
    }
    if let Some(image) = session.image() {
        println!(
            "{} x {} {}",
            image.width,
            image.height,
            describe(session.params())
        );
    }
}

fn describe(params: &memviz::DisplayParams) -> String {
    format!(
        "{} (byte offset {}, pixel offset {})",
        params.format, params.byte_offset, params.pixel_offset
    )
}

fn print_info<S: MemorySource + ?Sized>(session: &Session<'_, S>) {
    let region = session.region();
    println!(
        "Region: {:#x}-{:#x} ({} bytes) {} {}",
        region.start,
        region.end,
        region.size(),
        region.perms,
        region.path.as_deref().unwrap_or("")
    );
    println!(
        "Layout: {} px wide, {}",
        session.params().width,
        describe(session.params())
    );
    match session.image() {
        Some(image) => println!("Image: {} x {}", image.width, image.height),
        None => println!("Image: none"),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  next, n              move to the next region");
    println!("  1 | 2 | 3 | 4        byte offset 0-3");
    println!("  byte, b <n>          set the byte offset");
    println!("  pixel, p <n|+n|-n>   set or shift the pixel offset");
    println!("  width, w <n|+n|-n>   set or change the width");
    println!("  format, f <name>     Mono8, RGB24, BGR24, RGBA32, ABGR32");
    println!("  info, i              show the current region and layout");
    println!("  peek [n]             hex dump the start of the region");
    println!("  save, s [path]       save the current image");
    println!("  quit, q              exit");
}

/// Handle the View command, reading commands from stdin
pub fn handle(
    source: &dyn MemorySource,
    settings: SessionSettings,
    default_output: PathBuf,
) -> Result<()> {
    let mut session = Session::open(source, settings)?;
    println!(
        "{:#x} ({} bytes)",
        session.region().start,
        session.region().size()
    );
    refresh(&mut session);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read command")?;

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match apply(&mut session, command, &default_output) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("{:#}", e),
        }
    }

    Ok(())
}
