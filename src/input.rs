use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// raw code for the escape key; ends the run wherever it is read
pub const EXIT_KEY: u8 = 0x1b;

/// Source of raw key codes. Codes are ASCII bytes; `EXIT_KEY` asks for
/// shutdown.
pub trait Input {
    /// one non-blocking read; None if no key is waiting
    fn poll_key(&mut self) -> Result<Option<u8>, io::Error>;

    /// block until a key arrives
    fn read_key(&mut self) -> Result<u8, io::Error>;
}

/// implementation of Input using the terminal in raw mode
pub struct StdinInput {
    _private: (),
}

impl StdinInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput { _private: () })
    }

    /// map a terminal event to a raw key code
    fn translate(event: Event) -> Option<u8> {
        match event {
            // raw mode swallows SIGINT, so treat ctrl-c like escape
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers,
            }) if modifiers.contains(KeyModifiers::CONTROL) => Some(EXIT_KEY),
            Event::Key(KeyEvent {
                code: KeyCode::Esc, ..
            }) => Some(EXIT_KEY),
            Event::Key(KeyEvent {
                code: KeyCode::Char(key),
                ..
            }) if key.is_ascii() => Some(key.to_ascii_lowercase() as u8),
            Event::Key(evt) => {
                log::debug!("ignoring key event {:?}", evt);
                None
            }
            _ => None,
        }
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            log::warn!("failed to leave raw mode: {}", e);
        }
    }
}

impl Input for StdinInput {
    fn poll_key(&mut self) -> Result<Option<u8>, io::Error> {
        if poll(Duration::from_millis(0))? {
            return Ok(Self::translate(read()?));
        }
        Ok(None)
    }

    fn read_key(&mut self) -> Result<u8, io::Error> {
        loop {
            if let Some(code) = Self::translate(read()?) {
                return Ok(code);
            }
        }
    }
}

/// dummy Input implementation for testing; replays a fixed sequence of
/// polls, then reports no key (or EXIT_KEY for blocking reads)
pub struct DummyInput {
    polls: VecDeque<Option<u8>>,
}

impl DummyInput {
    pub fn new(polls: &[Option<u8>]) -> Self {
        DummyInput {
            polls: polls.iter().copied().collect(),
        }
    }

    /// a source that only ever yields these keys, in order
    pub fn keys(keys: &[u8]) -> Self {
        DummyInput {
            polls: keys.iter().map(|k| Some(*k)).collect(),
        }
    }
}

impl Input for DummyInput {
    fn poll_key(&mut self) -> Result<Option<u8>, io::Error> {
        Ok(self.polls.pop_front().flatten())
    }

    fn read_key(&mut self) -> Result<u8, io::Error> {
        while let Some(poll) = self.polls.pop_front() {
            if let Some(code) = poll {
                return Ok(code);
            }
        }
        // a test that blocks forever would hang, so run out as an exit
        Ok(EXIT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent { code, modifiers })
    }

    #[test]
    fn test_translate_chars() {
        assert_eq!(
            StdinInput::translate(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(b'q')
        );
        assert_eq!(
            StdinInput::translate(key(KeyCode::Char('Q'), KeyModifiers::SHIFT)),
            Some(b'q')
        );
    }

    #[test]
    fn test_translate_exit() {
        assert_eq!(
            StdinInput::translate(key(KeyCode::Esc, KeyModifiers::NONE)),
            Some(EXIT_KEY)
        );
        assert_eq!(
            StdinInput::translate(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(EXIT_KEY)
        );
    }

    #[test]
    fn test_translate_ignores_others() {
        assert_eq!(
            StdinInput::translate(key(KeyCode::Up, KeyModifiers::NONE)),
            None
        );
        assert_eq!(StdinInput::translate(Event::Resize(80, 24)), None);
    }

    #[test]
    fn test_dummy_replays_polls() -> Result<(), io::Error> {
        let mut input = DummyInput::new(&[None, Some(b'w')]);
        assert_eq!(input.poll_key()?, None);
        assert_eq!(input.poll_key()?, Some(b'w'));
        assert_eq!(input.poll_key()?, None);
        Ok(())
    }

    #[test]
    fn test_dummy_blocking_read() -> Result<(), io::Error> {
        let mut input = DummyInput::new(&[None, Some(b'p'), Some(b'x')]);
        assert_eq!(input.read_key()?, b'p');
        assert_eq!(input.read_key()?, b'x');
        assert_eq!(input.read_key()?, EXIT_KEY);
        Ok(())
    }
}
