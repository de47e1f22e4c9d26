// Longest run of blank lines kept verbatim; longer runs collapse to one
const MAX_BLANK_RUN: usize = 2;

/// Normalize raw email text before it is sent to a model.
///
/// Line endings become `\n`, control characters other than tab and newline
/// are dropped, runs of three or more blank lines collapse to a single empty
/// line, and surrounding whitespace is trimmed.
pub fn clean_email_text(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

    let printable: String = normalized
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let mut lines: Vec<&str> = Vec::new();
    let mut blank_run: Vec<&str> = Vec::new();
    for line in printable.split('\n') {
        if line.trim().is_empty() {
            blank_run.push(line);
            continue;
        }
        flush_blank_run(&mut lines, &mut blank_run);
        lines.push(line);
    }
    flush_blank_run(&mut lines, &mut blank_run);

    lines.join("\n").trim().to_string()
}

fn flush_blank_run<'a>(lines: &mut Vec<&'a str>, run: &mut Vec<&'a str>) {
    if run.len() > MAX_BLANK_RUN {
        lines.push("");
    } else {
        lines.extend(run.iter().copied());
    }
    run.clear();
}
