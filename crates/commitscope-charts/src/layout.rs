//! Chart geometry, independent of any drawing backend.
//!
//! Donut coordinates live on a unit circle with the y axis pointing up;
//! [`Viewport`] maps them to pixels. Bar placement is left to plotters.

/// Fraction of the radius taken by the donut ring.
pub const RING_WIDTH: f64 = 0.4;

/// Distance of the leader elbow and label text from the centre.
pub const LABEL_RADIUS: f64 = 1.3;

/// Angular extent of one donut wedge, in degrees, counter-clockwise from +x.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeSpan {
    /// Start angle.
    pub start: f64,
    /// End angle.
    pub end: f64,
}

impl WedgeSpan {
    /// Angle halfway through the wedge: `(end - start) / 2 + start`.
    ///
    /// # Examples
    ///
    /// ```
    /// use commitscope_charts::layout::WedgeSpan;
    ///
    /// let span = WedgeSpan { start: 90.0, end: 180.0 };
    /// assert_eq!(span.mid_angle(), 135.0);
    /// ```
    pub fn mid_angle(&self) -> f64 {
        (self.end - self.start) / 2.0 + self.start
    }

    /// Angular size in degrees.
    pub fn sweep(&self) -> f64 {
        self.end - self.start
    }
}

/// Split the full circle proportionally to `counts`, starting at 0°.
///
/// Returns an empty list when all counts are zero.
///
/// # Examples
///
/// ```
/// use commitscope_charts::layout::wedge_spans;
///
/// let spans = wedge_spans(&[1, 3]);
/// assert_eq!(spans[0].end, 90.0);
/// assert_eq!(spans[1].end, 360.0);
/// ```
pub fn wedge_spans(counts: &[usize]) -> Vec<WedgeSpan> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut start = 0.0;
    let mut cumulative = 0usize;
    counts
        .iter()
        .map(|&count| {
            cumulative += count;
            // Cumulative end keeps the last wedge closing exactly at 360.
            let end = 360.0 * cumulative as f64 / total as f64;
            let span = WedgeSpan { start, end };
            start = end;
            span
        })
        .collect()
}

/// Horizontal anchoring of a wedge label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAlign {
    /// Text extends to the right of its anchor.
    Left,
    /// Text ends at its anchor.
    Right,
}

/// Placement of one wedge annotation in unit-circle coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotation {
    /// Point on the outer edge at the wedge's mid angle.
    pub anchor: (f64, f64),
    /// Leader elbow, `LABEL_RADIUS` times the anchor.
    pub elbow: (f64, f64),
    /// Where the label text is anchored.
    pub text: (f64, f64),
    /// How the text sits relative to `text`.
    pub align: LabelAlign,
}

impl Annotation {
    /// Leader polyline from the wedge edge to the label.
    pub fn leader(&self) -> [(f64, f64); 3] {
        [self.anchor, self.elbow, self.text]
    }
}

/// Annotation for a wedge.
///
/// The text sits at `(1.3 * sign(x), 1.3 * y)`; labels on the left half are
/// right-aligned.
///
/// # Examples
///
/// ```
/// use commitscope_charts::layout::{annotate, LabelAlign, WedgeSpan};
///
/// let left = annotate(&WedgeSpan { start: 90.0, end: 270.0 });
/// assert_eq!(left.align, LabelAlign::Right);
/// assert!((left.text.0 + 1.3).abs() < 1e-9);
/// ```
pub fn annotate(span: &WedgeSpan) -> Annotation {
    let theta = span.mid_angle().to_radians();
    let (x, y) = (theta.cos(), theta.sin());
    let (side, align) = if x < 0.0 {
        (-1.0, LabelAlign::Right)
    } else {
        (1.0, LabelAlign::Left)
    };
    Annotation {
        anchor: (x, y),
        elbow: (LABEL_RADIUS * x, LABEL_RADIUS * y),
        text: (LABEL_RADIUS * side, LABEL_RADIUS * y),
        align,
    }
}

/// Outline of a ring wedge: outer arc forward, inner arc back.
///
/// Arcs are sampled at least once per degree.
pub fn wedge_outline(span: &WedgeSpan) -> Vec<(f64, f64)> {
    let inner = 1.0 - RING_WIDTH;
    let steps = span.sweep().abs().ceil().max(1.0) as usize;
    let at = |i: usize| (span.start + span.sweep() * i as f64 / steps as f64).to_radians();

    let mut points = Vec::with_capacity(2 * (steps + 1));
    for i in 0..=steps {
        let t = at(i);
        points.push((t.cos(), t.sin()));
    }
    for i in (0..=steps).rev() {
        let t = at(i);
        points.push((inner * t.cos(), inner * t.sin()));
    }
    points
}

/// Maps unit-circle coordinates to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Pixel x of the origin.
    pub cx: f64,
    /// Pixel y of the origin.
    pub cy: f64,
    /// Pixels per unit.
    pub scale: f64,
}

impl Viewport {
    /// Pixel position of `point`; the y axis is flipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use commitscope_charts::layout::Viewport;
    ///
    /// let view = Viewport { cx: 100.0, cy: 100.0, scale: 50.0 };
    /// assert_eq!(view.to_pixel((1.0, 1.0)), (150, 50));
    /// ```
    pub fn to_pixel(&self, (x, y): (f64, f64)) -> (i32, i32) {
        (
            (self.cx + x * self.scale).round() as i32,
            (self.cy - y * self.scale).round() as i32,
        )
    }
}

/// Viewport centring the donut below the title band of a `width` x `height` image.
///
/// The label radius plus a small margin fills half the remaining height.
pub fn donut_viewport(width: u32, height: u32) -> Viewport {
    let title_band = f64::from(height) * 0.12;
    let plot_height = f64::from(height) - title_band;
    Viewport {
        cx: f64::from(width) / 2.0,
        cy: title_band + plot_height / 2.0,
        scale: plot_height / 2.0 / (LABEL_RADIUS + 0.2),
    }
}

/// Top of the count axis for a tallest bar of `max_count`, with headroom for
/// the count printed above it.
///
/// # Examples
///
/// ```
/// use commitscope_charts::layout::y_axis_top;
///
/// assert_eq!(y_axis_top(0), 1);
/// assert_eq!(y_axis_top(4), 5);
/// assert_eq!(y_axis_top(40), 44);
/// ```
pub fn y_axis_top(max_count: usize) -> u32 {
    let max = u32::try_from(max_count).unwrap_or(u32::MAX);
    max.saturating_add((max / 10).max(1))
}
