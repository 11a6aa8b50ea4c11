//! Single-select cycling control backing the year / month / day filters.

use std::fmt;

use dash_data::options::Choice;

/// Which single-select filter a command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Year,
    Month,
    Day,
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Control::Year => "Year",
            Control::Month => "Month",
            Control::Day => "Day",
        })
    }
}

/// A list of choices with a cursor.  The first choice is always
/// [`Choice::All`] and is the reset position.
#[derive(Debug, Clone)]
pub struct Selector<T> {
    choices: Vec<Choice<T>>,
    index: usize,
}

impl<T: PartialEq> Selector<T> {
    pub fn new(choices: Vec<Choice<T>>) -> Self {
        let choices = if choices.is_empty() {
            vec![Choice::All]
        } else {
            choices
        };
        Self { choices, index: 0 }
    }

    pub fn current(&self) -> &Choice<T> {
        &self.choices[self.index]
    }

    /// Currently selected value, `None` for "All".
    pub fn value(&self) -> Option<&T> {
        self.current().value()
    }

    pub fn choices(&self) -> &[Choice<T>] {
        &self.choices
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Advance one step, wrapping from the last choice back to "All".
    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.choices.len();
    }

    /// Step back one, wrapping from "All" to the last choice.
    pub fn prev(&mut self) {
        self.index = (self.index + self.choices.len() - 1) % self.choices.len();
    }

    pub fn step(&mut self, forward: bool) {
        if forward {
            self.next();
        } else {
            self.prev();
        }
    }

    /// Move the cursor to `value`.  Returns `false`, leaving the cursor
    /// unchanged, when `value` is not among the choices.
    pub fn select(&mut self, value: &T) -> bool {
        match self.choices.iter().position(|c| c.value() == Some(value)) {
            Some(idx) => {
                self.index = idx;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}
