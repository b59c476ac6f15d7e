//! The pgsolver text format.
//!
//! ```text
//! parity <max_id>;
//! <id> <priority> <owner> <succ>(,<succ>)* ["<name>"];
//! ```
//!
//! Node lines may appear in any order, but every id in `0..=max_id` must
//! be defined exactly once. Whitespace (including newlines) between
//! tokens is insignificant.

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use tracing::debug;

use super::{Game, NodeId, Player, Priority};
use crate::error::{GameError, Result};

/// Whether node names are written back out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Labels {
    #[default]
    Omit,
    Keep,
}

struct NodeLine {
    id: NodeId,
    priority: Priority,
    owner: Player,
    successors: Vec<NodeId>,
    label: Option<String>,
    line: usize,
}

struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    const fn new(src: &'a str) -> Self {
        Self {
            src: src.as_bytes(),
            pos: 0,
            line: 1,
        }
    }

    fn skip_ws(&mut self) {
        while let Some(&b) = self.src.get(self.pos) {
            if b == b'\n' {
                self.line += 1;
            } else if !b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_ws();
        self.src.get(self.pos).copied()
    }

    fn at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    fn error(&self, message: impl Into<String>) -> GameError {
        GameError::parse(self.line, message)
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == byte => {
                self.pos += 1;
                Ok(())
            }
            Some(b) => Err(self.error(format!(
                "expected `{}`, found `{}`",
                char::from(byte),
                char::from(b)
            ))),
            None => Err(self.error(format!("expected `{}`, found end of input", char::from(byte)))),
        }
    }

    fn keyword(&mut self, word: &str) -> Result<()> {
        self.skip_ws();
        let end = self.pos + word.len();
        if self.src.get(self.pos..end) == Some(word.as_bytes()) {
            self.pos = end;
            Ok(())
        } else {
            Err(self.error(format!("expected `{word}` header")))
        }
    }

    fn number(&mut self, what: &str) -> Result<u64> {
        self.skip_ws();
        let start = self.pos;
        while self.src.get(self.pos).is_some_and(u8::is_ascii_digit) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error(format!("expected {what}")));
        }
        std::str::from_utf8(&self.src[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or_else(|| self.error(format!("{what} is too large")))
    }

    fn quoted(&mut self) -> Result<String> {
        self.expect(b'"')?;
        let start = self.pos;
        while let Some(&b) = self.src.get(self.pos) {
            if b == b'"' {
                let name = String::from_utf8_lossy(&self.src[start..self.pos]).into_owned();
                self.pos += 1;
                return Ok(name);
            }
            if b == b'\n' {
                self.line += 1;
            }
            self.pos += 1;
        }
        Err(self.error("unterminated node name"))
    }
}

fn node_id(cursor: &mut Cursor<'_>, what: &str, max_id: u64) -> Result<NodeId> {
    let value = cursor.number(what)?;
    if value > max_id {
        return Err(cursor.error(format!("{what} {value} exceeds max id {max_id}")));
    }
    usize::try_from(value).map_err(|_| cursor.error(format!("{what} {value} does not fit in memory")))
}

fn node_line(cursor: &mut Cursor<'_>, max_id: u64) -> Result<NodeLine> {
    cursor.skip_ws();
    let line = cursor.line;
    let id = node_id(cursor, "node id", max_id)?;
    let priority = cursor.number("priority")?;
    let priority = Priority::try_from(priority)
        .map_err(|_| cursor.error(format!("priority {priority} is too large")))?;
    let owner = cursor.number("owner")?;
    let owner = u8::try_from(owner)
        .ok()
        .and_then(Player::from_bit)
        .ok_or_else(|| cursor.error(format!("owner must be 0 or 1, found {owner}")))?;

    let mut successors = vec![node_id(cursor, "successor", max_id)?];
    while cursor.peek() == Some(b',') {
        cursor.expect(b',')?;
        successors.push(node_id(cursor, "successor", max_id)?);
    }

    let label = if cursor.peek() == Some(b'"') {
        Some(cursor.quoted()?)
    } else {
        None
    };
    cursor.expect(b';')?;

    Ok(NodeLine {
        id,
        priority,
        owner,
        successors,
        label,
        line,
    })
}

impl FromStr for Game {
    type Err = GameError;

    fn from_str(src: &str) -> Result<Self> {
        let mut cursor = Cursor::new(src);
        cursor.keyword("parity")?;
        let max_id = cursor.number("max id")?;
        cursor.expect(b';')?;

        let mut lines = Vec::new();
        while !cursor.at_end() {
            lines.push(node_line(&mut cursor, max_id)?);
        }

        let n_nodes = usize::try_from(max_id)
            .ok()
            .and_then(|m| m.checked_add(1))
            .ok_or_else(|| cursor.error("max id does not fit in memory"))?;
        if lines.len() < n_nodes {
            return Err(cursor.error(format!(
                "header declares {n_nodes} nodes but only {} are defined",
                lines.len()
            )));
        }

        let mut game = Self::new(n_nodes);
        let mut defined = vec![false; n_nodes];
        for entry in lines {
            if std::mem::replace(&mut defined[entry.id], true) {
                return Err(GameError::parse(entry.line, format!("node {} defined twice", entry.id)));
            }
            game.owner[entry.id] = entry.owner;
            game.priority[entry.id] = entry.priority;
            game.label[entry.id] = entry.label;
            for to in entry.successors {
                game.add_edge(entry.id, to);
            }
        }

        debug!(nodes = game.n_nodes(), edges = game.edge_count(), "parsed pgsolver game");
        Ok(game)
    }
}

/// Display adapter rendering a game in pgsolver syntax.
pub struct Pgsolver<'a> {
    game: &'a Game,
    labels: Labels,
}

impl fmt::Display for Pgsolver<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let game = self.game;
        match game.n_nodes().checked_sub(1) {
            Some(max_id) => writeln!(f, "parity {max_id};")?,
            None => writeln!(f, "parity -1;")?,
        }
        for node in 0..game.n_nodes() {
            write!(f, "{} {} {} ", node, game.priority(node), game.owner(node).bit())?;
            for (i, to) in game.successors(node).iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{to}")?;
            }
            if let (Labels::Keep, Some(label)) = (self.labels, game.label(node)) {
                write!(f, " \"{}\"", label.replace('"', "'"))?;
            }
            f.write_str(";\n")?;
        }
        Ok(())
    }
}

impl Game {
    /// Read a whole pgsolver document.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::Io`] if reading fails and [`GameError::Parse`]
    /// for malformed input.
    pub fn parse_pgsolver<R: Read>(mut input: R) -> Result<Self> {
        let mut src = String::new();
        input.read_to_string(&mut src)?;
        src.parse()
    }

    /// Display adapter for the pgsolver rendering of this game.
    ///
    /// An empty game renders as `parity -1;`, which does not parse back.
    #[must_use]
    pub const fn pgsolver(&self, labels: Labels) -> Pgsolver<'_> {
        Pgsolver { game: self, labels }
    }

    /// Write this game in pgsolver syntax.
    ///
    /// # Errors
    ///
    /// Propagates write failures as [`GameError::Io`].
    pub fn write_pgsolver<W: Write>(&self, mut output: W, labels: Labels) -> Result<()> {
        write!(output, "{}", self.pgsolver(labels))?;
        output.flush()?;
        Ok(())
    }
}
