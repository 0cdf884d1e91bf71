//! Line-oriented command surface over the scan engine
//!
//! The REPL is strictly synchronous: one command runs to completion before
//! the next prompt. It owns the process-wide current where-type and performs
//! all value parsing, so the engine below only ever sees typed values.

mod parse;

pub use parse::{parse_count, parse_offset, tokenize};

use crate::config::ScannerConfig;
use crate::core::types::{MemoryError, Offset, ScalarKind, ScalarValue};
use crate::memory::{MemorySource, PointerReverseIndex, ScanEngine};
use std::io::{self, BufRead};

pub struct Repl<S> {
    engine: ScanEngine<S>,
    current_where_type: ScalarKind,
    max_string_bytes: usize,
    running: bool,
}

impl<S: MemorySource> Repl<S> {
    pub fn new(engine: ScanEngine<S>, config: &ScannerConfig) -> Self {
        Repl {
            engine,
            current_where_type: ScalarKind::I32,
            max_string_bytes: config.max_string_bytes,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_where_type(&self) -> ScalarKind {
        self.current_where_type
    }

    pub fn engine(&self) -> &ScanEngine<S> {
        &self.engine
    }

    /// Reads and runs commands until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut line = String::new();

        while self.running {
            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
            self.dispatch(&line);
        }

        Ok(())
    }

    /// Runs a single command line.
    pub fn dispatch(&mut self, line: &str) {
        let tokens = tokenize(line);
        let Some((&verb, args)) = tokens.split_first() else {
            return;
        };

        match verb {
            "where" | "w" => self.cmd_where(args),
            "became" | "b" => self.cmd_became(args),
            "changed" | "c" => self.cmd_changed(args),
            "scan" | "s" => self.cmd_scan(args),
            "pointers" | "p" => self.cmd_pointers(args),
            "help" | "h" => print_help(),
            "quit" | "q" => self.running = false,
            _ => println!("Invalid command\n"),
        }
    }

    fn cmd_where(&mut self, args: &[&str]) {
        if args.is_empty() {
            return;
        }

        // A leading apostrophe makes the rest of the line (tokens rejoined
        // with single spaces) a byte-string search that leaves the chain
        // alone.
        if let Some(rest) = args[0].strip_prefix('\'') {
            let needle = if args.len() > 1 {
                format!("{} {}", rest, args[1..].join(" "))
            } else {
                rest.to_string()
            };

            println!("Scanning...");
            let offsets = self.engine.where_val_str(&needle);
            print_offsets(&offsets);
            println!("Finished.");
            return;
        }

        let kind = args
            .get(1)
            .copied()
            .and_then(ScalarKind::from_code)
            .unwrap_or(ScalarKind::I32);

        let value = match ScalarValue::parse(args[0], kind) {
            Ok(value) => value,
            Err(err) => {
                println!("{}", err);
                return;
            }
        };

        self.current_where_type = kind;

        println!("Scanning...");
        let offsets = self.engine.where_val(value).to_vec();
        print_offsets(&offsets);
        println!("Finished.");
    }

    fn cmd_became(&mut self, args: &[&str]) {
        if args.is_empty() {
            return;
        }

        let kind = self.current_where_type;
        let value = match ScalarValue::parse(args[0], kind) {
            Ok(value) => value,
            Err(err) => {
                println!("{}", err);
                return;
            }
        };

        let offsets = match self.engine.where_became(value) {
            Ok(offsets) => offsets.to_vec(),
            Err(err) => {
                println!("{}", err);
                return;
            }
        };

        for &offset in &offsets {
            let current = self.engine.read_value_at(offset, kind).unwrap_or(value);
            println!("0x{:x} => {}", offset, format_value(current));
        }
        println!("Addresses: {}", offsets.len());
    }

    fn cmd_changed(&mut self, _args: &[&str]) {
        let kind = self.current_where_type;

        let previous = match self.engine.chain_value() {
            Some(value) => value,
            None => {
                println!("{}", MemoryError::EmptyChain);
                return;
            }
        };

        let offsets = match self.engine.where_changed(kind) {
            Ok(offsets) => offsets.to_vec(),
            Err(err) => {
                println!("{}", err);
                return;
            }
        };

        for &offset in &offsets {
            match self.engine.read_value_at(offset, kind) {
                Some(current) => {
                    println!("0x{:x} : {}\t->\t{}", offset, previous, current)
                }
                None => println!("0x{:x} : {}\t->\t?", offset, previous),
            }
        }
        println!("Addresses changed: {}", offsets.len());
    }

    fn cmd_scan(&mut self, args: &[&str]) {
        if args.is_empty() {
            return;
        }

        let offset = match parse_offset(args[0]) {
            Ok(offset) => offset,
            Err(err) => {
                println!("{}", err);
                return;
            }
        };

        let type_code = args.get(1).copied().unwrap_or("i");
        let count = match args.get(2) {
            Some(text) => match parse_count(text) {
                Ok(count) => count,
                Err(err) => {
                    println!("{}", err);
                    return;
                }
            },
            None => 1,
        };

        if count == 0 {
            return;
        }

        if type_code == "t" {
            println!(
                "{}",
                self.engine.read_string_at(offset, self.max_string_bytes)
            );
            return;
        }

        let kind = ScalarKind::from_code(type_code).unwrap_or(ScalarKind::I32);
        let width = kind.width() as u64;

        // A negative count scans upward: the run of elements ends at the
        // given offset instead of starting there.
        let (start, count) = if count < 0 {
            let count = count.unsigned_abs() as usize;
            let start = offset.wrapping_sub((count as u64 - 1) * width);
            (start, count)
        } else {
            (offset, count as usize)
        };

        let Some(values) = self.engine.read_values_at(start, kind, count) else {
            println!("Read unsuccessful.");
            return;
        };

        for (index, value) in values.iter().enumerate() {
            let at = start.wrapping_add(index as u64 * width);
            print!("0x{:x} - {}", at, format_value(*value));

            // A pointer-width integer may be a pointer; show what it leads
            // to when it dereferences to something printable.
            if self.engine.is_pointer_width(kind) {
                if let Some(bits) = value.unsigned_bits() {
                    if let Some(preview) = self.engine.deref_preview(bits) {
                        print!(" -> *({})", preview);
                    }
                }
            }

            println!();
        }
    }

    fn cmd_pointers(&mut self, args: &[&str]) {
        if args.is_empty() {
            return;
        }

        let offset = match parse_offset(args[0]) {
            Ok(offset) => offset,
            Err(err) => {
                println!("{}", err);
                return;
            }
        };

        let type_code = args.get(1).copied().unwrap_or("i");
        let range = match args.get(2) {
            Some(text) => match parse_count(text) {
                Ok(range) => range.max(1),
                Err(err) => {
                    println!("{}", err);
                    return;
                }
            },
            None => 1,
        };

        let kind = ScalarKind::from_code(type_code).unwrap_or(ScalarKind::I32);
        let width = kind.width() as u64;

        println!("Scanning...");

        // `range` consecutive type-sized slots ending at the given offset.
        let start = offset.wrapping_sub((range as u64 - 1) * width);
        for slot in 0..range as u64 {
            let anchor = start.wrapping_add(slot * width);
            println!("0x{:x}", anchor);

            let index = PointerReverseIndex::build(&self.engine, anchor);
            let mut path = vec![anchor];
            print_pointer_tree(&index, anchor, 1, &mut path);
        }

        println!("Finished.");
    }
}

fn print_offsets(offsets: &[Offset]) {
    for offset in offsets {
        println!("0x{:x}", offset);
    }
    println!("Addresses: {}", offsets.len());
}

/// Integers print as decimal with the hex bit pattern alongside; floats
/// print plain.
fn format_value(value: ScalarValue) -> String {
    match value.unsigned_bits() {
        Some(bits) => format!("{}\t( 0x{:x} )", value, bits),
        None => value.to_string(),
    }
}

/// Prints the candidate pointers to `site` as an indented tree. A pointer
/// already on the current path is printed but not descended into, so cyclic
/// and self-referential graphs terminate.
fn print_pointer_tree(
    index: &PointerReverseIndex,
    site: Offset,
    level: usize,
    path: &mut Vec<Offset>,
) {
    let Some(pointers) = index.pointers_to(site) else {
        return;
    };

    for &pointer in pointers {
        for _ in 0..level {
            print!("\t");
        }
        println!("<- 0x{:x}", pointer);

        if path.contains(&pointer) {
            continue;
        }
        path.push(pointer);
        print_pointer_tree(index, pointer, level + 1, path);
        path.pop();
    }
}

/// The canned help text, also printed once at startup.
pub fn print_help() {
    println!("Types:");
    println!("Integer types can be combined with a leading 'u' to find and print unsigned values.");
    println!("c: 8 bit int");
    println!("s: 16 bit int");
    println!("i: 32 bit int (default)");
    println!("l: 64 bit int");
    println!("f: float");
    println!("d: double");
    println!("t: string (used only by the scan command)\n");

    println!("Commands:");
    println!("where [value] (type)");
    println!("\tAlias: w");
    println!("\tPrints a list of offsets where the value is located.");
    println!("\tIf the value begins with an apostrophe ('), the value and all subsequent characters will be interpreted as a string.");
    println!("\tIf the value is not a string, this command starts a chain and can be used with multiple 'became' commands or one 'changed' command.\n");

    println!("became [value]");
    println!("\tAlias: b");
    println!("\tFilters the current offsets located by where, prints offsets where the value is now [value].\n");

    println!("changed");
    println!("\tAlias: c");
    println!("\tFilters the current offsets located by where, prints offsets where the value is different from the initial value.");
    println!("\tThis command is particularly useful for finding floating point numbers.");
    println!("\tFinishes the 'where' chain.\n");

    println!("scan [address] (type) (range = 1)");
    println!("\tAlias: s");
    println!("\tScans at the given address for value(s) of a given type.");
    println!("\tRange can be a negative number to instead scan upwards from the given address.");
    println!("\tIf scanning for an integer the size of a pointer,");
    println!("\t\twill additionally indicate whether the value is potentially a pointer.");
    println!("\t\tIf the pointer points to a printable string, will additionally print the first few characters of that string.\n");

    println!("pointers [address] (type) (range = 1)");
    println!("\tAlias: p");
    println!("\tSearches for possible pointers to the given address, then recursively searches for pointers to those pointers.");
    println!("\tA range can be given to additionally scan for pointers to addresses at offsets equal to the given type's byte size above the given address.\n");

    println!("quit");
    println!("\tAlias: q");
    println!("\tExits the program.\n");

    println!("help");
    println!("\tAlias: h");
    println!("\tDisplays this help message.\n");
}
