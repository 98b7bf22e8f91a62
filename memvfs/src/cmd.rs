//! The line oriented command surface over `Vfs`.
//!
//! Each command produces the status text a shell prints for it. Failures are
//! reported in that text and never stop the session.

use std::io::{BufRead, Write};

use log::debug;
use thiserror::Error;

use crate::error::VfsError;
use crate::fs::Vfs;
use crate::io::BlockStorage;
use crate::node::NodeKind;
use crate::path::{self, SEPARATOR};

pub const BANNER: &str = "Compact VFS ready. Type 'exit' to quit.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mkdir(String),
    Create(String),
    Ls(Option<String>),
    Pwd,
    Cd(String),
    Rmdir(String),
    Write { target: String, content: String },
    Read(String),
    Delete(String),
    Df,
    Exit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("Error: missing filename")]
    MissingTarget,
    #[error("Unknown command: {0}")]
    Unknown(String),
}

impl Command {
    /// Parses one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim_matches(|c: char| c == '\n' || c == '\r').trim_start();
        let (verb, rest) = match line.find(char::is_whitespace) {
            Some(i) => (&line[..i], line[i..].trim_start()),
            None => (line, ""),
        };
        let args = rest.trim_end();
        let required = |usage: &'static str| {
            if args.is_empty() {
                Err(ParseError::Usage(usage))
            } else {
                Ok(args.to_string())
            }
        };

        let command = match verb {
            "" => return Ok(None),
            "mkdir" => Command::Mkdir(required("mkdir <name>")?),
            "create" => Command::Create(required("create <filename>")?),
            "ls" => Command::Ls(Some(args.to_string()).filter(|a| !a.is_empty())),
            "pwd" => Command::Pwd,
            "cd" => Command::Cd(required("cd <path>")?),
            "rmdir" => Command::Rmdir(required("rmdir <dirname>")?),
            "write" => {
                if args.is_empty() {
                    return Err(ParseError::Usage("write <filename> \"content\""));
                }
                let (target, content) = parse_write_args(rest);
                if target.is_empty() {
                    return Err(ParseError::MissingTarget);
                }
                Command::Write { target, content }
            }
            "read" => Command::Read(required("read <filename>")?),
            "delete" => Command::Delete(required("delete <filename>")?),
            "df" => Command::Df,
            "exit" => Command::Exit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Splits `write` arguments into the target and the content. Content wrapped
/// in single or double quotes runs to the matching quote, or to the end of the
/// line when unterminated; otherwise the bare remainder of the line is used.
pub fn parse_write_args(args: &str) -> (String, String) {
    let args = args.trim_start();
    let (target, rest) = match args.find(char::is_whitespace) {
        Some(i) => (&args[..i], args[i..].trim_start()),
        None => (args, ""),
    };

    let content = match rest.chars().next() {
        Some(quote @ ('"' | '\'')) => {
            let body = &rest[1..];
            match body.find(quote) {
                Some(end) => &body[..end],
                None => body,
            }
        }
        _ => rest.trim_end_matches(|c: char| c == '\n' || c == '\r'),
    };
    (target.to_string(), content.to_string())
}

/// Drives a `Vfs` one command at a time.
pub struct Shell<T: BlockStorage> {
    vfs: Vfs<T>,
    running: bool,
}

impl<T: BlockStorage> Shell<T> {
    pub fn new(vfs: Vfs<T>) -> Self {
        Self { vfs, running: true }
    }

    pub fn vfs(&self) -> &Vfs<T> {
        &self.vfs
    }

    /// False once `exit` has run.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn prompt(&self) -> String {
        format!("{} > ", self.vfs.pwd())
    }

    /// Parses and executes one line, returning the text to print. Blank lines
    /// produce nothing.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        match Command::parse(line) {
            Ok(Some(command)) => Some(self.execute(command)),
            Ok(None) => None,
            Err(e) => Some(e.to_string()),
        }
    }

    pub fn execute(&mut self, command: Command) -> String {
        debug!("executing {:?}", command);
        match command {
            Command::Mkdir(name) => match self.vfs.mkdir(&name) {
                Ok(_) => format!("Directory '{}' created", name),
                Err(e) => self.describe(&e, &name, "directory"),
            },
            Command::Create(name) => match self.vfs.create(&name) {
                Ok(_) => format!("File '{}' created", name),
                Err(e) => self.describe(&e, &name, "file"),
            },
            Command::Ls(path) => self.list(path.as_deref().unwrap_or("")),
            Command::Pwd => self.vfs.pwd(),
            Command::Cd(path) => match self.vfs.cd(&path) {
                Ok(_) => format!("Moved to {}", self.vfs.pwd()),
                Err(VfsError::NotFound(component)) => {
                    format!("Error: path component '{}' not found", component)
                }
                Err(e) => format!("Error: {}", e),
            },
            Command::Rmdir(name) => match self.vfs.rmdir(&name) {
                Ok(()) => format!("Directory '{}' removed", name),
                Err(e) => self.describe(&e, &name, "directory"),
            },
            Command::Write { target, content } => {
                match self.vfs.write(&target, content.as_bytes()) {
                    Ok(id) => format!(
                        "Data written ({} bytes) to {}",
                        content.len(),
                        self.vfs.absolute_path(id)
                    ),
                    Err(e) => self.describe(&e, &target, "file"),
                }
            }
            Command::Read(name) => match self.vfs.read(&name) {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => self.describe(&e, &name, "file"),
            },
            Command::Delete(name) => match self.vfs.delete(&name) {
                Ok(()) => format!("File '{}' deleted", name),
                Err(e @ VfsError::NotAFile(_)) => format!("Error: {}. Use rmdir", e),
                Err(e) => self.describe(&e, &name, "file"),
            },
            Command::Df => {
                let usage = self.vfs.usage();
                format!(
                    "Total Blocks: {}\nUsed Blocks: {}\nFree Blocks: {}\nDisk Usage: {:.2}%",
                    usage.total_blocks,
                    usage.used_blocks,
                    usage.free_blocks,
                    usage.usage_percent()
                )
            }
            Command::Exit => {
                self.vfs.teardown();
                self.running = false;
                "Memory released. Exiting...".to_string()
            }
        }
    }

    /// Diagnostic for a failed command operating on `target`. `noun` names what
    /// the command expected to find there.
    fn describe(&self, err: &VfsError, target: &str, noun: &str) -> String {
        match err {
            VfsError::NotFound(_) if self.parent_exists(target) => {
                format!("Error: {} '{}' not found", noun, target)
            }
            VfsError::NotFound(component) => {
                format!("Error: path component '{}' not found", component)
            }
            VfsError::AlreadyExists(_) => format!("Error: {} '{}' already exists", noun, target),
            VfsError::NotEmpty(_) => "Error: directory not empty".to_string(),
            VfsError::InsufficientSpace { .. } => "Error: not enough disk space".to_string(),
            other => format!("Error: {}", other),
        }
    }

    /// Whether every directory leading up to the last component of `target`
    /// resolves, so a lookup failure can only be the entry itself.
    fn parent_exists(&self, target: &str) -> bool {
        path::resolve_parent(self.vfs.namespace(), self.vfs.cwd(), target).is_ok()
    }

    fn list(&self, path: &str) -> String {
        let entries = match self.vfs.list(path) {
            Ok(entries) => entries,
            Err(e) => return self.describe(&e, path, "directory"),
        };
        if entries.is_empty() {
            return "(empty)".to_string();
        }
        entries
            .iter()
            .map(|entry| match entry.kind {
                NodeKind::Directory => format!("{}{}", entry.name, SEPARATOR),
                NodeKind::File => entry.name.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Reads commands from `input` until `exit` or end of input, writing each
    /// reply to `output` on its own line. With `prompt` set, the working
    /// directory prompt is written before every line is read.
    ///
    /// End of input tears the file system down just like `exit`.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        mut input: R,
        mut output: W,
        prompt: bool,
    ) -> std::io::Result<()> {
        writeln!(output, "{}", BANNER)?;
        let mut buf = Vec::new();
        while self.running {
            if prompt {
                write!(output, "{}", self.prompt())?;
                output.flush()?;
            }
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                if prompt {
                    writeln!(output)?;
                }
                self.vfs.teardown();
                break;
            }
            // Invalid UTF-8 is replaced rather than ending the session.
            let line = String::from_utf8_lossy(&buf);
            if let Some(reply) = self.handle_line(&line) {
                writeln!(output, "{}", reply)?;
            }
        }
        output.flush()
    }
}
