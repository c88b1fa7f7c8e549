//! Line-oriented terminal prompts

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::Result;

/// `yes`/`y`/`no`/`n` in any case.
pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// One trimmed line, `None` at end of input.
    pub fn ask_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt} ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Repeat until the answer is yes or no; `None` at end of input.
    pub fn ask_yes_no(&mut self, question: &str) -> Result<Option<bool>> {
        loop {
            let Some(line) = self.ask_line(&format!("{question} (yes/no)"))? else {
                return Ok(None);
            };
            match parse_yes_no(&line) {
                Some(answer) => return Ok(Some(answer)),
                None => self.say("Please reply with 'yes' or 'no'.")?,
            }
        }
    }

    /// Parsed value; an empty line keeps `default`. Rejected values are
    /// asked again.
    pub fn ask_parsed<T>(&mut self, prompt: &str, default: T) -> Result<T>
    where
        T: FromStr + std::fmt::Display,
    {
        loop {
            let Some(line) = self.ask_line(&format!("{prompt} [{default}]"))? else {
                return Ok(default);
            };
            if line.is_empty() {
                return Ok(default);
            }
            match line.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(_) => self.say(&format!("Could not read '{line}', try again."))?,
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_parse_yes_no() {
        assert_eq!(parse_yes_no("YES"), Some(true));
        assert_eq!(parse_yes_no(" n "), Some(false));
        assert_eq!(parse_yes_no("maybe"), None);
    }

    #[test]
    fn test_yes_no_retries_until_valid() {
        let mut p = prompter("perhaps\nno\n");
        assert_eq!(p.ask_yes_no("Do you experience fever?").unwrap(), Some(false));

        let output = String::from_utf8(p.into_output()).unwrap();
        assert!(output.contains("Please reply with 'yes' or 'no'."));
    }

    #[test]
    fn test_yes_no_end_of_input() {
        let mut p = prompter("");
        assert_eq!(p.ask_yes_no("Do you experience fever?").unwrap(), None);
    }

    #[test]
    fn test_ask_parsed_defaults_and_retries() {
        let mut p = prompter("\nabc\n42\n");
        assert_eq!(p.ask_parsed("Age", 25u32).unwrap(), 25);
        assert_eq!(p.ask_parsed("Age", 25u32).unwrap(), 42);
    }
}
