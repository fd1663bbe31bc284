//! Interactive stdin/stdout transport for exercising flows from a shell.
//! Owns the input filtering a telephony platform would do: out-of-set or
//! wrong-length entries are re-prompted and never reach the flows.

use super::{CallTransport, DigitConstraints, TransportError};
use std::io::{self, BufRead, Write};

pub struct ConsoleTransport {
    called_number: String,
}

impl ConsoleTransport {
    pub fn new(called_number: impl Into<String>) -> Self {
        Self {
            called_number: called_number.into(),
        }
    }

    fn read_line(&self) -> Result<String, TransportError> {
        let mut line = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|err| TransportError::Protocol(format!("stdin read failed: {err}")))?;
        if read == 0 {
            return Err(TransportError::Disconnected);
        }
        Ok(line.trim().to_string())
    }

    fn say(&self, message: &str) -> Result<(), TransportError> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "[voice] {message}")
            .and_then(|_| stdout.flush())
            .map_err(|err| TransportError::Protocol(format!("stdout write failed: {err}")))
    }
}

impl CallTransport for ConsoleTransport {
    fn called_number(&self) -> &str {
        &self.called_number
    }

    fn play(&mut self, message: &str) -> Result<(), TransportError> {
        self.say(message)
    }

    fn collect_digits(
        &mut self,
        prompt: &str,
        constraints: &DigitConstraints,
    ) -> Result<String, TransportError> {
        self.say(prompt)?;
        loop {
            let entry = self.read_line()?;
            if constraints.accepts(&entry) {
                return Ok(entry);
            }
            self.say("That entry is not accepted here.")?;
            self.say(prompt)?;
        }
    }

    fn confirm(&mut self, prompt: &str, yes: &str, no: &str) -> Result<bool, TransportError> {
        self.say(&format!("{prompt} Press 1 to {yes}, 2 to {no}."))?;
        loop {
            match self.read_line()?.as_str() {
                "1" => return Ok(true),
                "2" => return Ok(false),
                _ => self.say("Press 1 or 2.")?,
            }
        }
    }

    fn terminate(&mut self, message: &str) -> Result<(), TransportError> {
        self.say(message)?;
        self.say("-- call ended --")
    }
}
