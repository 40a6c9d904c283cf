//! # SSH Config Parser
//!
//! Reads `Host` blocks out of an OpenSSH client config and turns every
//! concrete host into a [`HostEntry`].
//!
//! Only three keywords matter here:
//! * `Host <label> [...]` starts a new entry. The first pattern is the label.
//! * `HostName <addr>` overrides the address that is probed.
//! * `Port <n>` overrides the port that is probed.
//!
//! Everything else is ignored. An entry is only committed once the next
//! `Host`/`Match` line or the end of input is seen, because its overrides
//! follow the declaration.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use sshcheck_common::error::{ConfigError, MalformedLine};
use sshcheck_common::host::{GroupedEntries, HostEntry};
use tracing::{debug, trace};

const PATTERN_CHARS: &[char] = &['*', '?', '!'];

/// What a single line of the config asks for.
#[derive(Debug, PartialEq, Eq)]
enum Directive<'a> {
    Host(&'a str),
    /// A `Host` line whose label is a wildcard pattern.
    HostPattern(&'a str),
    Match,
    HostName(&'a str),
    Port(u16),
    Ignored,
}

enum ParserState {
    NoCurrentEntry,
    BuildingEntry(HostEntry),
}

/// Line-driven parser. Feed lines in order, then call [`ConfigParser::finish`].
pub struct ConfigParser {
    separator: char,
    state: ParserState,
    entries: GroupedEntries,
}

impl ConfigParser {
    pub fn new(separator: char) -> Self {
        Self {
            separator,
            state: ParserState::NoCurrentEntry,
            entries: GroupedEntries::new(),
        }
    }

    /// Applies one line. An `Err` means the line was skipped; the parser
    /// stays usable.
    pub fn feed_line(&mut self, line: &str) -> Result<(), MalformedLine> {
        match classify(line)? {
            Directive::Host(label) => {
                self.commit_current();
                self.state = ParserState::BuildingEntry(HostEntry::new(label, self.separator));
            }
            Directive::HostPattern(pattern) => {
                self.commit_current();
                return Err(MalformedLine::Pattern(pattern.to_string()));
            }
            Directive::Match => self.commit_current(),
            Directive::HostName(hostname) => match &mut self.state {
                ParserState::BuildingEntry(entry) => entry.hostname = hostname.to_string(),
                ParserState::NoCurrentEntry => trace!("HostName outside of a host block"),
            },
            Directive::Port(port) => match &mut self.state {
                ParserState::BuildingEntry(entry) => entry.port = port,
                ParserState::NoCurrentEntry => trace!("Port outside of a host block"),
            },
            Directive::Ignored => {}
        }
        Ok(())
    }

    /// Commits the pending entry, if any, and returns everything parsed.
    pub fn finish(mut self) -> GroupedEntries {
        self.commit_current();
        self.entries
    }

    fn commit_current(&mut self) {
        if let ParserState::BuildingEntry(entry) =
            std::mem::replace(&mut self.state, ParserState::NoCurrentEntry)
        {
            self.entries.push(entry);
        }
    }
}

/// Parses config text that is already in memory.
pub fn parse(source: &str, separator: char) -> GroupedEntries {
    let mut parser = ConfigParser::new(separator);
    for (idx, line) in source.lines().enumerate() {
        feed(&mut parser, idx + 1, line);
    }
    parser.finish()
}

/// Streams the config file at `path` line by line.
///
/// Fails only when the file is missing or cannot be read. Lines that are not
/// valid UTF-8 are decoded lossily.
pub fn parse_file(path: &Path, separator: char) -> Result<GroupedEntries, ConfigError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
        _ => ConfigError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let read_error = |source: io::Error| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(file);
    let mut parser = ConfigParser::new(separator);
    let mut buf: Vec<u8> = Vec::new();
    let mut line_no: usize = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(read_error)? == 0 {
            break;
        }
        line_no += 1;
        feed(&mut parser, line_no, &String::from_utf8_lossy(&buf));
    }

    Ok(parser.finish())
}

fn feed(parser: &mut ConfigParser, line_no: usize, line: &str) {
    if let Err(e) = parser.feed_line(line) {
        debug!("Skipping line {line_no}: {e}");
    }
}

fn classify(line: &str) -> Result<Directive<'_>, MalformedLine> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(Directive::Ignored);
    }

    let (keyword, args) = split_keyword(line);
    let first_arg = args.split_whitespace().next().map(|arg| arg.trim_matches('"'));

    if keyword.eq_ignore_ascii_case("host") {
        let label = first_arg
            .filter(|label| !label.is_empty())
            .ok_or_else(|| MalformedLine::MissingValue("Host".into()))?;
        if label.contains(PATTERN_CHARS) {
            return Ok(Directive::HostPattern(label));
        }
        return Ok(Directive::Host(label));
    }

    if keyword.eq_ignore_ascii_case("match") {
        return Ok(Directive::Match);
    }

    if keyword.eq_ignore_ascii_case("hostname") {
        let hostname = first_arg
            .filter(|hostname| !hostname.is_empty())
            .ok_or_else(|| MalformedLine::MissingValue("HostName".into()))?;
        return Ok(Directive::HostName(hostname));
    }

    if keyword.eq_ignore_ascii_case("port") {
        let value = first_arg.ok_or_else(|| MalformedLine::MissingValue("Port".into()))?;
        return match value.parse::<u16>() {
            Ok(port) if port != 0 => Ok(Directive::Port(port)),
            _ => Err(MalformedLine::InvalidPort(value.to_string())),
        };
    }

    Ok(Directive::Ignored)
}

/// Splits `Keyword value`, `Keyword=value` and `Keyword = value`.
fn split_keyword(line: &str) -> (&str, &str) {
    let end = line
        .find(|c: char| c.is_whitespace() || c == '=')
        .unwrap_or(line.len());
    let (keyword, rest) = line.split_at(end);
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    (keyword, rest.trim())
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
