use moops::definitions::{Word, KEYBOARD_BUFFER_SIZE};
use moops::parse::assemble;
use moops::parse::lexer::parse_literal;
use moops::simulators::cpu::command::{listing_row, Register};
use moops::simulators::cpu::Cpu;
use moops::simulators::{RunOutcome, Session};
use moops::util::to_hex;

use clap::{arg, command, value_parser, ArgAction};
use lazy_static::lazy_static;
use log::info;
use regex::Regex;
use std::error::Error;
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

/// `reg=value`, checked after the program halted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    register: Register,
    value: Word,
}

fn parse_expectation(text: &str) -> Result<Expectation, String> {
    lazy_static! {
        static ref RE: Regex =
            Regex::new(r"^\s*(?P<reg>\w+)\s*=\s*(?P<value>\S+)\s*$").unwrap();
    }

    let caps = RE
        .captures(text)
        .ok_or_else(|| format!("expected REG=VALUE, got '{}'", text))?;
    let register = Register::try_from(&caps["reg"])
        .map_err(|_| format!("'{}' is not a general register", &caps["reg"]))?;
    let value = parse_literal(&caps["value"])
        .ok_or_else(|| format!("'{}' is not a number", &caps["value"]))?;
    Ok(Expectation { register, value })
}

#[derive(Debug)]
pub struct ComparisonError {
    register: Register,
    expected: Word,
    actual: Word,
}

impl fmt::Display for ComparisonError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Expected {} to be {} ({}), but it is {} ({})",
            self.register,
            to_hex(self.expected),
            self.expected,
            to_hex(self.actual),
            self.actual
        )
    }
}

impl Error for ComparisonError {}

#[derive(Debug, Default)]
pub struct Options {
    steps: Option<u64>,
    input: Vec<u8>,
    expectations: Vec<Expectation>,
    dump: bool,
    listing: bool,
}

/// Forwards stdin to the keyboard, one byte at a time
fn spawn_stdin_worker() -> mpsc::Receiver<u8> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut stdin = io::stdin().lock();
        let mut buf = [0u8; 32];
        loop {
            let n = match stdin.read(&mut buf) {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            for &c in &buf[..n] {
                if tx.send(c).is_err() {
                    return;
                }
            }
        }
    });
    rx
}

fn write_listing(source: &str, writer: &mut dyn Write) -> Result<(), Box<dyn Error>> {
    let program = assemble(source)?;
    for (address, instruction) in program.iter() {
        writeln!(writer, "{}", listing_row(address, instruction))?;
    }

    let mut labels: Vec<_> = program.labels().iter().collect();
    labels.sort_by_key(|&(name, address)| (address, name));
    if !labels.is_empty() {
        writeln!(writer)?;
    }
    for (name, address) in labels {
        writeln!(writer, "{}  {}:", to_hex(address), name)?;
    }
    Ok(())
}

pub fn execute(
    source: &str,
    options: &Options,
    keys: Option<mpsc::Receiver<u8>>,
    writer: &mut dyn Write,
) -> Result<(), Box<dyn Error>> {
    if options.listing {
        return write_listing(source, writer);
    }

    let mut session = Session::new();
    let mut input = options.input.iter().copied();
    let mut seen = 0;
    let mut write_error = None;

    let result = session.run(source, options.steps, |cpu: &mut Cpu| {
        // --input can be longer than the keyboard buffer, the rest waits until there is space
        while cpu.keyboard().len() < KEYBOARD_BUFFER_SIZE {
            match input.next() {
                Some(key) => cpu.push_key(key),
                None => break,
            };
        }

        if let Some(keys) = &keys {
            while let Ok(key) = keys.try_recv() {
                cpu.push_key(key);
            }
        }

        let fresh = cpu.display().since(seen);
        if !fresh.is_empty() {
            if let Err(e) = writer.write_all(fresh).and_then(|_| writer.flush()) {
                write_error = Some(e);
                return ControlFlow::Break(());
            }
            seen = cpu.display().written();
        }
        ControlFlow::Continue(())
    });

    if let Some(e) = write_error {
        return Err(e.into());
    }
    // a failing instruction may still have written to the display
    writer.write_all(session.cpu().display().since(seen))?;

    if options.dump {
        write!(writer, "{}", session.cpu().registers())?;
    }
    writer.flush()?;

    let summary = result?;
    if summary.outcome == RunOutcome::Halted {
        info!("program halted after {} steps", summary.steps);
    }

    let registers = session.cpu().registers();
    for expectation in options.expectations.iter() {
        let actual = registers.get(expectation.register);
        if actual != expectation.value {
            return Err(Box::new(ComparisonError {
                register: expectation.register,
                expected: expectation.value,
                actual,
            }));
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let env = env_logger::Env::default().filter_or("MOOPS_LOG", "warn");
    env_logger::init_from_env(env);

    let file_arg = arg!([file] "The assembly source file")
        .required(true)
        .value_parser(value_parser!(PathBuf));

    let steps_arg = arg!(-s --steps <N> "Fail if the program does not halt within N steps")
        .value_parser(value_parser!(u64));

    let input_arg = arg!(--input <TEXT> "Put these bytes into the keyboard buffer before running");

    let stdin_arg = arg!(--stdin "Forward stdin to the keyboard while the program runs")
        .action(ArgAction::SetTrue);

    let expect_arg =
        arg!(--expect <EXPECTATION> "Check a register after the program halted, e.g. r0=5050")
            .action(ArgAction::Append)
            .value_parser(parse_expectation);

    let dump_arg =
        arg!(--dump "Print the registers after the program stopped").action(ArgAction::SetTrue);

    let listing_arg = arg!(--listing "Print the assembled program instead of running it")
        .action(ArgAction::SetTrue);

    let matches = command!()
        .arg(file_arg)
        .arg(steps_arg)
        .arg(input_arg)
        .arg(stdin_arg)
        .arg(expect_arg)
        .arg(dump_arg)
        .arg(listing_arg)
        .get_matches();

    let path = matches
        .get_one::<PathBuf>("file")
        .ok_or("missing source file")?;
    let source = fs::read_to_string(path)?;

    let options = Options {
        steps: matches.get_one::<u64>("steps").copied(),
        input: matches
            .get_one::<String>("input")
            .map(|text| text.as_bytes().to_vec())
            .unwrap_or_default(),
        expectations: matches
            .get_many::<Expectation>("expect")
            .map(|values| values.copied().collect())
            .unwrap_or_default(),
        dump: matches.get_flag("dump"),
        listing: matches.get_flag("listing"),
    };

    let keys = matches.get_flag("stdin").then(spawn_stdin_worker);

    let mut out = io::stdout().lock();
    execute(&source, &options, keys, &mut out)
}
