//! Removal of template indentation from multi-line descriptions

const WIDE_INDENT: usize = 10;
const NARROW_INDENT: usize = 8;

fn leading_spaces(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

fn strip_line(line: &str) -> &str {
    let run = leading_spaces(line);
    if run >= WIDE_INDENT {
        &line[WIDE_INDENT..]
    } else if run == NARROW_INDENT {
        &line[NARROW_INDENT..]
    } else {
        line
    }
}

/// Strip one template indent from each line.
///
/// A line beginning with 10 spaces loses those 10; otherwise a line whose
/// leading run is exactly 8 spaces loses those 8. Other lines are unchanged.
pub fn strip_template_indent(text: &str) -> String {
    text.split('\n').map(strip_line).collect::<Vec<_>>().join("\n")
}
