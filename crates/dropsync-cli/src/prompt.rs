//! Console prompt adapter
//!
//! Terminal implementation of the decision prompts: destination selection
//! for new drop-directory entries and the post-upload delete confirmation.
//!
//! ## Design Notes
//!
//! - One async mutex serializes complete prompt/answer exchanges, so two
//!   concurrent askers never interleave their questions on screen.
//! - stdin reads run on the blocking pool; the event loop is never parked
//!   on the terminal.
//! - A closed stdin is an error, not a default answer. Deletion however
//!   defaults to "no" for any answer that is not an explicit yes.

use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::sync::Mutex;

use dropsync_core::ports::IDecisionPrompt;

/// Interactive terminal prompts
pub struct ConsolePrompt {
    /// Held across one full prompt/answer exchange
    io_lock: Mutex<()>,
}

impl ConsolePrompt {
    pub fn new() -> Self {
        Self {
            io_lock: Mutex::new(()),
        }
    }
}

impl Default for ConsolePrompt {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads one trimmed line from stdin on the blocking pool
///
/// Returns `None` at end of input.
async fn read_line() -> Result<Option<String>> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(line.trim().to_string())),
            Err(err) => Err(err.into()),
        }
    })
    .await
    .context("stdin reader task failed")?
}

/// Parses a 1-based menu selection into an index
fn parse_selection(input: &str, count: usize) -> Option<usize> {
    let n: usize = input.trim().parse().ok()?;
    if n >= 1 && n <= count {
        Some(n - 1)
    } else {
        None
    }
}

/// Interprets a yes/no answer; anything but an explicit yes means no
fn parse_yes_no(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait::async_trait]
impl IDecisionPrompt for ConsolePrompt {
    async fn choose_destination(&self, candidates: &[String]) -> Result<String> {
        if candidates.is_empty() {
            bail!("no destination folders configured (set drive.destinations in config.yaml)");
        }
        // A single candidate needs no question
        if candidates.len() == 1 {
            return Ok(candidates[0].clone());
        }

        let _guard = self.io_lock.lock().await;
        println!("Choose a destination folder:");
        for (i, name) in candidates.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
        loop {
            print!("Selection [1-{}]: ", candidates.len());
            let _ = std::io::stdout().flush();
            let line = match read_line().await? {
                Some(line) => line,
                None => bail!("input closed while waiting for a destination selection"),
            };
            match parse_selection(&line, candidates.len()) {
                Some(index) => return Ok(candidates[index].clone()),
                None => println!("Enter a number between 1 and {}.", candidates.len()),
            }
        }
    }

    async fn confirm_local_delete(&self, path: &Path) -> Result<bool> {
        let _guard = self.io_lock.lock().await;
        print!(
            "Upload complete. Delete local copy of {}? [y/N] ",
            path.display()
        );
        let _ = std::io::stdout().flush();
        match read_line().await? {
            Some(line) => Ok(parse_yes_no(&line)),
            None => bail!("input closed while waiting for a delete confirmation"),
        }
    }
}

// ============================================================================
// Unit tests
// ============================================================================
