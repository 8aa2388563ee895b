//! # Drawing sessions
//!
//! Binds a [`Canvas`] to a [`BoundedHistory`] of its snapshots. Strokes are painted live, and
//! the finished result is recorded when the stroke ends. Undo and redo repaint the canvas from
//! the history.

use std::num::NonZeroUsize;

use crate::{
    canvas::{Brush, Canvas, CanvasError, Snapshot},
    color::Color,
    history::{self, BoundedHistory},
    story::{AgeGroup, InputType, StoryRequest},
};

#[derive(Clone, Debug)]
pub struct DrawingConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub brush: Brush,
    pub history_capacity: NonZeroUsize,
}
impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: Color::WHITE,
            brush: Brush::default(),
            history_capacity: history::DEFAULT_CAPACITY,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("input type {0:?} does not carry an image")]
    NotAnImage(InputType),
    #[error(transparent)]
    Encode(#[from] png::EncodingError),
}

/// A stroke that has been started but not yet recorded.
struct ActiveStroke {
    last: [f32; 2],
    points: usize,
}

pub struct DrawingSession {
    canvas: Canvas,
    history: BoundedHistory<Snapshot>,
    brush: Brush,
    active: Option<ActiveStroke>,
}
impl DrawingSession {
    /// Start a session on a blank canvas.
    pub fn new(config: &DrawingConfig) -> Result<Self, CanvasError> {
        let canvas = Canvas::new(config.width, config.height, config.background)?;
        Ok(Self::with_canvas(canvas, config))
    }
    /// Start a session on top of an existing image. The image size takes precedence
    /// over the configured size.
    #[must_use]
    pub fn from_image(image: &Snapshot, config: &DrawingConfig) -> Self {
        let canvas = Canvas::from_snapshot(image, config.background);
        Self::with_canvas(canvas, config)
    }
    fn with_canvas(canvas: Canvas, config: &DrawingConfig) -> Self {
        let history = BoundedHistory::with_initial(config.history_capacity, canvas.snapshot());
        log::debug!(
            "Started drawing session {}x{}, history capacity {}",
            canvas.width(),
            canvas.height(),
            config.history_capacity
        );
        Self {
            canvas,
            history,
            brush: config.brush,
            active: None,
        }
    }
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
    #[must_use]
    pub fn history(&self) -> &BoundedHistory<Snapshot> {
        &self.history
    }
    #[must_use]
    pub fn brush(&self) -> &Brush {
        &self.brush
    }
    /// Change the brush. Affects the next segment painted, even mid-stroke.
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }
    pub fn brush_mut(&mut self) -> &mut Brush {
        &mut self.brush
    }
    #[must_use]
    pub fn is_stroking(&self) -> bool {
        self.active.is_some()
    }
    /// Put the pen down. If a stroke was already in progress it is finished first.
    pub fn begin_stroke(&mut self, at: [f32; 2]) {
        if self.active.is_some() {
            log::warn!("Stroke started while another was active, finishing the old one.");
            self.end_stroke();
        }
        self.canvas.paint_dot(at, &self.brush);
        self.active = Some(ActiveStroke {
            last: at,
            points: 1,
        });
    }
    /// Drag the pen to `to`. Ignored if no stroke is in progress.
    pub fn extend_stroke(&mut self, to: [f32; 2]) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        self.canvas.paint_segment(active.last, to, &self.brush);
        active.last = to;
        active.points += 1;
    }
    /// Lift the pen, recording the result. Returns false if no stroke was in progress.
    pub fn end_stroke(&mut self) -> bool {
        let Some(active) = self.active.take() else {
            return false;
        };
        log::trace!("Stroke finished with {} points", active.points);
        self.record();
        true
    }
    /// Paint and record a whole stroke at once. Does nothing for an empty stroke.
    pub fn draw_stroke(&mut self, points: &[[f32; 2]]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.begin_stroke(*first);
        for point in rest {
            self.extend_stroke(*point);
        }
        self.end_stroke();
    }
    /// Clear to the background. This is recorded and may be undone.
    pub fn clear(&mut self) {
        self.cancel_stroke();
        self.canvas.clear();
        self.record();
    }
    /// Returns true if the canvas changed.
    pub fn undo(&mut self) -> bool {
        self.cancel_stroke();
        match self.history.undo() {
            Some(snapshot) => Self::repaint(&mut self.canvas, snapshot),
            None => false,
        }
    }
    /// Returns true if the canvas changed.
    pub fn redo(&mut self) -> bool {
        self.cancel_stroke();
        match self.history.redo() {
            Some(snapshot) => Self::repaint(&mut self.canvas, snapshot),
            None => false,
        }
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }
    /// Bytes held by all retained snapshots.
    #[must_use]
    pub fn history_bytes(&self) -> usize {
        self.history.iter().map(Snapshot::byte_len).sum()
    }
    /// Export the canvas as the image of a story request.
    pub fn to_story_request(
        &self,
        input_type: InputType,
        age_group: AgeGroup,
        language: &str,
    ) -> Result<StoryRequest, ExportError> {
        if !input_type.carries_image() {
            return Err(ExportError::NotAnImage(input_type));
        }
        let data_uri = self.canvas.snapshot().to_data_uri()?;
        Ok(StoryRequest::image(input_type, data_uri, age_group, language))
    }

    fn record(&mut self) {
        self.history.record(self.canvas.snapshot());
        log::debug!(
            "History at {}/{}, holding {}",
            self.history.index().map_or(0, |index| index + 1),
            self.history.len(),
            human_bytes::human_bytes(self.history_bytes() as f64),
        );
    }
    /// Throw away an unfinished stroke, restoring the last recorded state.
    fn cancel_stroke(&mut self) {
        if self.active.take().is_none() {
            return;
        }
        log::debug!("Cancelling unfinished stroke");
        if let Some(current) = self.history.current() {
            Self::repaint(&mut self.canvas, current);
        }
    }
    // Associated fn, as the snapshot borrows from self.history.
    fn repaint(canvas: &mut Canvas, snapshot: &Snapshot) -> bool {
        match canvas.restore(snapshot) {
            Ok(()) => true,
            Err(e) => {
                // Every snapshot comes from this canvas, so sizes always match.
                log::error!("Failed to restore history: {e}");
                false
            }
        }
    }
}
