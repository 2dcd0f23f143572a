//! Raw memory hex dump

use anyhow::{Context, Result};
use memviz::MemorySource;
use std::io::{self, Write};

/// Parse a hex or decimal address string
pub fn parse_address(address: &str) -> Result<usize> {
    if let Some(hex) = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
    {
        usize::from_str_radix(hex, 16).context("Invalid hex address")
    } else {
        address.parse::<usize>().context("Invalid address")
    }
}

/// Handle the Peek command
///
/// Reads bytes from memory and displays them as a hex dump.
pub fn handle(source: &dyn MemorySource, address: &str, size: usize) -> Result<()> {
    let addr = parse_address(address)?;
    dump(source, addr, size)
}

/// Read `size` bytes at `addr` and print them
pub fn dump<S: MemorySource + ?Sized>(source: &S, addr: usize, size: usize) -> Result<()> {
    let data = source.read_bytes(addr, size)?;

    println!("Reading {} bytes at {:#x}:", size, addr);
    let stdout = io::stdout();
    write_hexdump(&mut stdout.lock(), addr, &data)?;
    Ok(())
}

/// Write a classic 16-bytes-per-line hex dump with an ASCII column
pub fn write_hexdump<W: Write>(out: &mut W, addr: usize, data: &[u8]) -> io::Result<()> {
    for (i, chunk) in data.chunks(16).enumerate() {
        write!(out, "{:08x}  ", addr + i * 16)?;
        for (j, byte) in chunk.iter().enumerate() {
            write!(out, "{:02x} ", byte)?;
            if j == 7 {
                write!(out, " ")?;
            }
        }
        // Pad if last line is short
        for j in chunk.len()..16 {
            write!(out, "   ")?;
            if j == 7 {
                write!(out, " ")?;
            }
        }
        write!(out, " |")?;
        for &byte in chunk {
            let c = byte as char;
            if c.is_ascii_graphic() || c == ' ' {
                write!(out, "{}", c)?;
            } else {
                write!(out, ".")?;
            }
        }
        writeln!(out, "|")?;
    }
    Ok(())
}
