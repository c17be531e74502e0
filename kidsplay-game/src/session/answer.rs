//! Single-shot answer checks for math, pattern and quiz games.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Number(i64),
    Choice { correct: usize, options: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAnswer {
    #[error("Enter a number!")]
    NotANumber,
    #[error("Pick one of the {0} answers!")]
    NoSuchOption(usize),
    #[error("This game takes a {0}")]
    WrongShape(&'static str),
}

impl Expected {
    /// Parse typed input and compare. No attempt limit.
    ///
    /// # Errors
    ///
    /// Returns `NotANumber` for blank or non-integer input.
    pub fn check_number(self, raw: &str) -> Result<bool, InvalidAnswer> {
        let Self::Number(expected) = self else {
            return Err(InvalidAnswer::WrongShape("choice"));
        };
        let answer: i64 = raw.trim().parse().map_err(|_| InvalidAnswer::NotANumber)?;
        Ok(answer == expected)
    }

    /// Compare a selected option index.
    ///
    /// # Errors
    ///
    /// Returns `NoSuchOption` for an index past the option list.
    pub fn check_choice(self, index: usize) -> Result<bool, InvalidAnswer> {
        let Self::Choice { correct, options } = self else {
            return Err(InvalidAnswer::WrongShape("number"));
        };
        if index >= options {
            return Err(InvalidAnswer::NoSuchOption(options));
        }
        Ok(index == correct)
    }
}
