/// Output of one query, accumulated line by line.
#[derive(Debug, Clone)]
pub struct Transcript {
    marker: String,
    lines: Vec<String>,
    decision: Option<String>,
}

impl Transcript {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            lines: Vec::new(),
            decision: None,
        }
    }

    /// Append one line (without its terminator). A line carrying the marker
    /// replaces any earlier decision line and still stays in the body.
    pub fn push(&mut self, line: String) {
        if !self.marker.is_empty() && line.contains(&self.marker) {
            self.decision = Some(line.trim().to_string());
        }
        self.lines.push(line);
    }

    pub fn decision(&self) -> Option<&str> {
        self.decision.as_deref()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Every line followed by `\n`.
    pub fn body(&self) -> String {
        let cap = self.lines.iter().map(|l| l.len() + 1).sum();
        let mut out = String::with_capacity(cap);
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Decision line, a blank separator, then the body; or the body alone.
    pub fn render(&self) -> String {
        match &self.decision {
            Some(decision) => format!("{decision}\n\n{}", self.body()),
            None => self.body(),
        }
    }
}
