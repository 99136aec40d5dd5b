use std::io::{self, Write};

/// Writes to stdout, treating a closed pipe (`subtrack detect ... | head`) as success.
pub fn write_stdout_text(text: &str) -> io::Result<()> {
    write_to(&mut io::stdout().lock(), text, false)
}

pub fn write_stdout_line(text: &str) -> io::Result<()> {
    write_to(&mut io::stdout().lock(), text, true)
}

fn write_to(writer: &mut dyn Write, text: &str, newline: bool) -> io::Result<()> {
    tolerate_broken_pipe(writer.write_all(text.as_bytes()))?;
    if newline {
        tolerate_broken_pipe(writer.write_all(b"\n"))?;
    }
    tolerate_broken_pipe(writer.flush())
}

fn tolerate_broken_pipe(result: io::Result<()>) -> io::Result<()> {
    match result {
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}
