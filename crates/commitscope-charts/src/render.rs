//! PNG rendering of the category donut and the severity bar chart.
//!
//! The donut is drawn straight onto a pixel drawing area; the bar chart goes
//! through a plotters [`ChartBuilder`]. Donut text goes through [`Canvas`],
//! which silently skips it when no font could be registered.

use std::fmt::Display;
use std::path::Path;

use commitscope_core::{ChartConfig, ScopeError};
use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::font::{ensure_font, FONT_FAMILY};
use crate::layout::{
    annotate, donut_viewport, wedge_outline, wedge_spans, y_axis_top, LabelAlign,
};
use crate::tally::Distribution;

/// Title of the category donut.
pub const DONUT_TITLE: &str = "Distribution of Git Commits by Category";
/// Title of the severity bar chart.
pub const BAR_TITLE: &str = "Distribution of Commit Severity";
/// X axis label of the severity bar chart.
pub const BAR_X_LABEL: &str = "Severity Level (1=Least Critical, 5=Most Critical)";
/// Y axis label of the severity bar chart.
pub const BAR_Y_LABEL: &str = "Number of Commits";

/// Wedge colours, cycled.
const PALETTE: [RGBColor; 10] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
    RGBColor(0x8c, 0x56, 0x4b),
    RGBColor(0xe3, 0x77, 0xc2),
    RGBColor(0x7f, 0x7f, 0x7f),
    RGBColor(0xbc, 0xbd, 0x22),
    RGBColor(0x17, 0xbe, 0xcf),
];

const BAR_COLOR: RGBColor = RGBColor(255, 165, 0);

fn chart_err<E: Display>(e: E) -> ScopeError {
    ScopeError::Chart(e.to_string())
}

/// Drawing area plus the sizing every chart element derives from the image height.
struct Canvas<'a, DB: DrawingBackend> {
    area: &'a DrawingArea<DB, Shift>,
    has_font: bool,
    height: u32,
}

impl<'a, DB: DrawingBackend> Canvas<'a, DB> {
    fn font_px(&self, divisor: u32) -> f64 {
        f64::from((self.height / divisor).max(8))
    }

    fn line_px(&self) -> u32 {
        (self.height / 500).max(1)
    }

    fn style(&self, size: f64, pos: Pos) -> TextStyle<'static> {
        TextStyle::from(FontDesc::new(FontFamily::Name(FONT_FAMILY), size, FontStyle::Normal))
            .color(&BLACK)
            .pos(pos)
    }

    /// Draw one line of text; a no-op without a font.
    fn text(&self, text: &str, style: &TextStyle<'_>, at: (i32, i32)) -> Result<(), ScopeError> {
        if !self.has_font {
            return Ok(());
        }
        self.area.draw_text(text, style, at).map_err(chart_err)
    }

    /// Width and height of `text`; zero without a font.
    fn measure(&self, text: &str, style: &TextStyle<'_>) -> Result<(u32, u32), ScopeError> {
        if !self.has_font {
            return Ok((0, 0));
        }
        self.area.estimate_text_size(text, style).map_err(chart_err)
    }

    fn title(&self, text: &str, width: u32) -> Result<(), ScopeError> {
        let style = self.style(self.font_px(28), Pos::new(HPos::Center, VPos::Top));
        let top = (self.height / 25) as i32;
        self.text(text, &style, ((width / 2) as i32, top))
    }
}

fn prepare_output(path: &Path, config: &ChartConfig) -> Result<(), ScopeError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    if config.width == 0 || config.height == 0 {
        return Err(ScopeError::Chart(format!(
            "invalid chart size {}x{}",
            config.width, config.height
        )));
    }
    Ok(())
}

fn font_available(config: &ChartConfig) -> bool {
    let available = ensure_font(config.font.as_deref());
    if !available {
        tracing::warn!("no usable font found, charts are drawn without text");
    }
    available
}

/// Render the category donut to a PNG at `path`.
///
/// # Errors
///
/// Returns [`ScopeError::Io`] if the output directory cannot be created, or
/// [`ScopeError::Chart`] if drawing or encoding fails.
pub fn render_donut(
    path: &Path,
    dist: &Distribution,
    config: &ChartConfig,
) -> Result<(), ScopeError> {
    prepare_output(path, config)?;
    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    draw_donut(&root, dist, config)?;
    root.present().map_err(chart_err)?;
    tracing::debug!(path = %path.display(), "wrote donut chart");
    Ok(())
}

/// Draw the category donut onto `root`.
///
/// Wedges start at 0° and run counter-clockwise, one per category in
/// `dist.categories` order, each annotated with its label and percentage.
pub fn draw_donut<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    dist: &Distribution,
    config: &ChartConfig,
) -> Result<(), ScopeError> {
    let (width, height) = root.dim_in_pixel();
    root.fill(&WHITE).map_err(chart_err)?;
    let canvas = Canvas {
        area: root,
        has_font: font_available(config),
        height,
    };
    canvas.title(DONUT_TITLE, width)?;

    let view = donut_viewport(width, height);
    let counts: Vec<usize> = dist.categories.iter().map(|c| c.count).collect();
    let spans = wedge_spans(&counts);
    if spans.is_empty() {
        tracing::warn!("no categorized commits, donut chart has no wedges");
    }

    for (i, span) in spans.iter().enumerate() {
        let points: Vec<(i32, i32)> = wedge_outline(span)
            .into_iter()
            .map(|p| view.to_pixel(p))
            .collect();
        root.draw(&Polygon::new(points, PALETTE[i % PALETTE.len()].filled()))
            .map_err(chart_err)?;
    }

    let line = BLACK.stroke_width(canvas.line_px());
    let label_size = canvas.font_px(42);
    let pad = (label_size * 0.3).round() as i32;

    for (span, share) in spans.iter().zip(&dist.categories) {
        let note = annotate(span);
        let leader: Vec<(i32, i32)> = note.leader().iter().map(|&p| view.to_pixel(p)).collect();
        root.draw(&PathElement::new(leader, line)).map_err(chart_err)?;

        let label = share.label();
        let lines: Vec<&str> = label.lines().collect();
        let (hpos, sign) = match note.align {
            LabelAlign::Left => (HPos::Left, 1),
            LabelAlign::Right => (HPos::Right, -1),
        };
        let style = canvas.style(label_size, Pos::new(hpos, VPos::Center));

        let mut text_width = 0;
        for text in &lines {
            text_width = text_width.max(canvas.measure(text, &style)?.0 as i32);
        }
        let line_height = (label_size * 1.2).round() as i32;
        let block_height = line_height * lines.len() as i32;

        let (tx, ty) = view.to_pixel(note.text);
        let inner_edge = tx;
        let outer_edge = tx + sign * (text_width + 2 * pad);
        let top = ty - block_height / 2 - pad;
        let bottom = ty + block_height / 2 + pad;
        let corners = [
            (inner_edge.min(outer_edge), top),
            (inner_edge.max(outer_edge), bottom),
        ];
        root.draw(&Rectangle::new(corners, WHITE.filled()))
            .map_err(chart_err)?;
        root.draw(&Rectangle::new(corners, line))
            .map_err(chart_err)?;

        let text_x = tx + sign * pad;
        let first_y = ty - block_height / 2 + line_height / 2;
        for (row, text) in lines.iter().enumerate() {
            canvas.text(text, &style, (text_x, first_y + row as i32 * line_height))?;
        }
    }

    tracing::debug!(wedges = spans.len(), "drew donut chart");
    Ok(())
}

/// Render the severity bar chart to a PNG at `path`.
///
/// # Errors
///
/// Returns [`ScopeError::Io`] if the output directory cannot be created, or
/// [`ScopeError::Chart`] if drawing or encoding fails.
pub fn render_severity_bar(
    path: &Path,
    dist: &Distribution,
    config: &ChartConfig,
) -> Result<(), ScopeError> {
    prepare_output(path, config)?;
    let root = BitMapBackend::new(path, (config.width, config.height)).into_drawing_area();
    draw_severity_bar(&root, dist, config)?;
    root.present().map_err(chart_err)?;
    tracing::debug!(path = %path.display(), "wrote severity bar chart");
    Ok(())
}

/// Draw the severity bar chart onto `root`: one orange bar per level 1..5
/// with its count above it.
///
/// Without a font the axis label areas are dropped so plotters never lays out
/// text.
pub fn draw_severity_bar<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    dist: &Distribution,
    config: &ChartConfig,
) -> Result<(), ScopeError> {
    let (width, height) = root.dim_in_pixel();
    root.fill(&WHITE).map_err(chart_err)?;
    let canvas = Canvas {
        area: root,
        has_font: font_available(config),
        height,
    };
    let (w, h) = (width as i32, height as i32);

    let mut builder = ChartBuilder::on(root);
    builder.margin(h / 40).margin_right(w / 25);
    if canvas.has_font {
        builder
            .caption(
                BAR_TITLE,
                canvas.style(canvas.font_px(28), Pos::new(HPos::Center, VPos::Top)),
            )
            .x_label_area_size(h / 8)
            .y_label_area_size(w / 10);
    }
    let mut chart = builder
        .build_cartesian_2d(
            (1u32..5u32).into_segmented(),
            0u32..y_axis_top(dist.max_severity_count()),
        )
        .map_err(chart_err)?;

    let line = BLACK.stroke_width(canvas.line_px());
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh().axis_style(line);
    if canvas.has_font {
        mesh.x_desc(BAR_X_LABEL)
            .y_desc(BAR_Y_LABEL)
            .axis_desc_style(canvas.style(canvas.font_px(40), Pos::new(HPos::Center, VPos::Center)))
            .label_style(canvas.style(canvas.font_px(50), Pos::new(HPos::Center, VPos::Center)));
    }
    mesh.draw().map_err(chart_err)?;

    let bars = dist
        .severities
        .iter()
        .filter(|bar| bar.count > 0)
        .map(|bar| (u32::from(bar.level.get()), count_value(bar.count)));
    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin((width / 60).max(1))
                .data(bars),
        )
        .map_err(chart_err)?;

    if canvas.has_font {
        let above = canvas.style(canvas.font_px(50), Pos::new(HPos::Center, VPos::Bottom));
        chart
            .draw_series(dist.severities.iter().map(|bar| {
                Text::new(
                    bar.count.to_string(),
                    (
                        SegmentValue::CenterOf(u32::from(bar.level.get())),
                        count_value(bar.count),
                    ),
                    above.clone(),
                )
            }))
            .map_err(chart_err)?;
    }

    tracing::debug!(top = dist.max_severity_count(), "drew severity bar chart");
    Ok(())
}

fn count_value(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
