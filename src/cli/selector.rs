//! Interactive operation selector.
//!
//! Reads from any `BufRead` and writes prompts to any `Write`, so the prompt
//! loop runs the same against a terminal or an in-memory script.

use std::io::{BufRead, Write};

use tracing::warn;

use crate::domain::{MENU_OPTIONS, Operation};
use crate::error::AppError;

/// Print the menu, read a valid choice, and (for the single-state pull) a FIPS
/// code unless `fips` already supplies one.
pub fn select_operation<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    fips: Option<&str>,
) -> Result<Operation, AppError> {
    print_menu(output)?;
    let prompt = format!("Enter choice (1-{}): ", MENU_OPTIONS.len());
    let choice = get_user_input(input, output, &prompt, Some(&MENU_OPTIONS[..]))?;
    operation_for_choice(input, output, &choice, fips)
}

/// Turn a validated menu choice into an operation. A blank `fips` counts as
/// absent; choice 2 prompts for one then.
pub fn operation_for_choice<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    choice: &str,
    fips: Option<&str>,
) -> Result<Operation, AppError> {
    let fips = fips.map(str::trim).filter(|f| !f.is_empty());
    let fips = match (choice, fips) {
        ("2", Some(fips)) => Some(fips.to_string()),
        ("2", None) => Some(prompt_for_fips(input, output)?),
        (_, Some(fips)) => {
            warn!(fips, choice, "--fips only applies to operation 2; ignoring it");
            None
        }
        (_, None) => None,
    };

    Operation::from_choice(choice, fips)
        .ok_or_else(|| AppError::selection(format!("Invalid choice '{choice}'. Exiting.")))
}

fn prompt_for_fips<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String, AppError> {
    get_user_input(
        input,
        output,
        "Enter 2-digit state FIPS code (e.g., 06 for CA): ",
        None,
    )
}

/// Check a choice given on the command line against the menu.
pub fn validate_choice(raw: &str) -> Result<String, AppError> {
    let choice = raw.trim().to_lowercase();
    if MENU_OPTIONS.contains(&choice.as_str()) {
        Ok(choice)
    } else {
        Err(AppError::selection(format!(
            "Invalid operation '{raw}'. Please choose from: {}",
            MENU_OPTIONS.join(", ")
        )))
    }
}

fn print_menu<W: Write>(output: &mut W) -> Result<(), AppError> {
    let mut lines = vec!["Which dataset would you like to pull?".to_string()];
    for choice in MENU_OPTIONS {
        let label = Operation::menu_label(choice).unwrap_or_default();
        lines.push(format!("{choice}. {label}"));
    }
    for line in lines {
        writeln!(output, "{line}").map_err(write_failed)?;
    }
    Ok(())
}

/// Prompt until the answer is acceptable.
///
/// Answers are trimmed and lowercased. With `options`, only listed answers
/// are accepted; without, any non-empty answer is. There is no retry limit;
/// only end of input ends the loop without an answer.
pub fn get_user_input<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
    options: Option<&[&str]>,
) -> Result<String, AppError> {
    loop {
        write!(output, "{prompt}").map_err(write_failed)?;
        output.flush().map_err(write_failed)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::selection(format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::selection("No input received. Exiting."));
        }

        let answer = line.trim().to_lowercase();
        match options {
            Some(options) if !options.contains(&answer.as_str()) => {
                writeln!(output, "Invalid input. Please choose from: {}", options.join(", "))
                    .map_err(write_failed)?;
            }
            None if answer.is_empty() => {
                writeln!(output, "A value is required.").map_err(write_failed)?;
            }
            _ => return Ok(answer),
        }
    }
}

fn write_failed(e: std::io::Error) -> AppError {
    AppError::selection(format!("Failed to write prompt: {e}"))
}
