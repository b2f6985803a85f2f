/// Configuration for script output logging.
#[derive(Debug, Clone, Copy)]
pub struct LogConfig {
    /// Max line length before truncation.
    pub max_line_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_line_length: 4096,
        }
    }
}

impl LogConfig {
    /// Cut `line` to at most `max_line_length` bytes on a char boundary.
    pub(crate) fn clip<'a>(&self, line: &'a str) -> &'a str {
        if line.len() <= self.max_line_length {
            return line;
        }
        let mut end = self.max_line_length;
        while !line.is_char_boundary(end) {
            end -= 1;
        }
        &line[..end]
    }
}
