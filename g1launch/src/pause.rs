//! Hold the window open after a failed run.

use std::io::{self, IsTerminal, Read, Write};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal;

/// Blocks until the user acknowledges a failure.
pub trait Pause {
    /// Show `prompt` and wait for one keystroke.
    fn pause(&mut self, prompt: &str) -> io::Result<()>;
}

impl<P: Pause + ?Sized> Pause for Box<P> {
    fn pause(&mut self, prompt: &str) -> io::Result<()> {
        (**self).pause(prompt)
    }
}

/// Reads a single key in raw mode when stdin is a terminal, else a single byte.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPause;

impl Pause for TerminalPause {
    fn pause(&mut self, prompt: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        write!(stdout, "{}", prompt)?;
        stdout.flush()?;
        if io::stdin().is_terminal() {
            read_one_key()?;
        } else {
            let mut buf = [0u8; 1];
            let _ = io::stdin().read(&mut buf)?;
        }
        writeln!(stdout)?;
        Ok(())
    }
}

fn read_one_key() -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let result = loop {
        match event::read() {
            // Windows reports press and release; count the press only
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => break Ok(()),
            Ok(_) => continue,
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode()?;
    result
}

/// `--no-pause`: never blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPause;

impl Pause for NoPause {
    fn pause(&mut self, _prompt: &str) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_pause_returns_immediately() {
        assert!(NoPause.pause("Press any key").is_ok());
    }

    #[test]
    fn test_boxed_pause_delegates() {
        struct Count(usize);
        impl Pause for Count {
            fn pause(&mut self, _prompt: &str) -> io::Result<()> {
                self.0 += 1;
                Ok(())
            }
        }
        let mut boxed: Box<Count> = Box::new(Count(0));
        boxed.pause("x").unwrap();
        boxed.pause("x").unwrap();
        assert_eq!(boxed.0, 2);
    }
}
