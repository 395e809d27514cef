use std::io::{self, BufRead, Write};

use crate::features::{FeatureVector, RawStats, ingest};

const QUESTIONS: [&str; 6] = [
    "Enter your K/D ratio: ",
    "Enter your total kills: ",
    "Enter your total deaths: ",
    "Enter your damage per round: ",
    "Enter your total rounds played: ",
    "Enter your headshot % (e.g. 45, 50, 53): ",
];

/// Asks for the six raw stats until they all parse into a feature vector.
/// Returns `None` if input ends first.
pub fn prompt_features<R, W>(input: &mut R, output: &mut W) -> io::Result<Option<FeatureVector>>
where
    R: BufRead,
    W: Write,
{
    loop {
        let mut answers: Vec<String> = Vec::with_capacity(QUESTIONS.len());
        for question in QUESTIONS {
            write!(output, "{question}")?;
            output.flush()?;
            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            answers.push(line.trim().to_string());
        }

        let parsed = RawStats::parse_fields(
            &answers[0],
            &answers[1],
            &answers[2],
            &answers[3],
            &answers[4],
            &answers[5],
        )
        .and_then(|raw| ingest(&raw));
        match parsed {
            Ok(features) => return Ok(Some(features)),
            Err(err) => writeln!(output, "Invalid input ({err}). Please enter numeric values.")?,
        }
    }
}
