use dialoguer::{Confirm, Input, Password};
use std::io;

use crate::resolver::Prompter;
use crate::schema::FieldSpec;

/// Terminal prompter backed by `dialoguer`.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

fn to_io(err: dialoguer::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

impl Prompter for TerminalPrompter {
    fn text(&mut self, spec: &FieldSpec, default: Option<&str>) -> io::Result<String> {
        let mut input = Input::<String>::new()
            .with_prompt(spec.label)
            .allow_empty(!spec.required);
        if let Some(d) = default {
            input = input.default(d.to_string());
        }
        input.interact_text().map_err(to_io)
    }

    fn confirm(&mut self, spec: &FieldSpec, default: bool) -> io::Result<bool> {
        Confirm::new()
            .with_prompt(spec.label)
            .default(default)
            .interact()
            .map_err(to_io)
    }
}

/// Hidden input for secrets.
pub fn read_secret(prompt: &str) -> io::Result<String> {
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(to_io)
}

pub fn confirm(prompt: &str, default: bool) -> io::Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(to_io)
}
