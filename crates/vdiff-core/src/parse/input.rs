/// Lines of a unified diff without its file and hunk headers
///
/// Drops `diff `, `index ` and `@@` lines, `--- `/`+++ ` file header pairs
/// and `\ No newline at end of file` markers so the remaining lines can be
/// fed to the parser. A lone `--- ` line is a removed `-- ` line and stays.
pub fn strip_unified_headers(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out = String::with_capacity(text.len());
    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];
        let next = lines.get(index + 1);
        if line.starts_with("--- ") && next.is_some_and(|n| n.starts_with("+++ ")) {
            index += 2;
            continue;
        }
        let is_header = line.starts_with("diff ")
            || line.starts_with("index ")
            || line.starts_with("@@")
            || line.starts_with("\\ No newline");
        if !is_header {
            out.push_str(line);
            out.push('\n');
        }
        index += 1;
    }
    out
}
