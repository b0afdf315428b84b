//! In-place terminal redraw by erasing the previous frame's lines

/// Move the cursor to the start of the previous line and clear it
pub const ERASE_LINE: &str = "\x1b[F\x1b[2K";

/// A block of text printed in one write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    text: String,
}

impl Frame {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self { text: text.into() }
    }

    /// Lines the frame moves the cursor down by: its line breaks
    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Erase sequence for `lines` lines above the cursor
pub fn erase_sequence(lines: usize) -> String {
    ERASE_LINE.repeat(lines)
}

/// Bytes that replace a display of `previous_lines` lines by `frame`
pub fn diff(previous_lines: usize, frame: &Frame) -> String {
    let mut output = erase_sequence(previous_lines);
    output.push_str(frame.as_str());
    output
}

/// Tracks how many lines are currently on screen (the redraw cursor)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBuffer {
    lines_drawn: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines_drawn(&self) -> usize {
        self.lines_drawn
    }

    /// Bytes to print for `frame`; the cursor becomes the frame's line count
    pub fn present(&mut self, frame: &Frame) -> String {
        let output = diff(self.lines_drawn, frame);
        self.lines_drawn = frame.line_count();
        output
    }

    /// Account for lines printed below the current frame.
    /// Callers pass a fixed count; wrapped lines are not detected.
    pub fn advance(&mut self, lines: usize) {
        self.lines_drawn += lines;
    }

    /// Bytes that erase everything on screen; the cursor resets to 0
    pub fn clear(&mut self) -> String {
        let output = erase_sequence(self.lines_drawn);
        self.lines_drawn = 0;
        output
    }
}
