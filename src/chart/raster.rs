use std::io::Cursor;

use image::{ImageFormat, Pixel, Rgba, RgbaImage};
use palette::Srgba;

use super::{smooth_path, ChartError, ChartOption, ColorStop};
use crate::color::{mix, parse_css_color};

const SMOOTH_SEGMENTS: usize = 12;

/// Plot-area margins as fractions of the canvas (left, right, top, bottom).
const MARGINS: (f64, f64, f64, f64) = (0.08, 0.04, 0.14, 0.10);

/// Rasterize `option` to PNG bytes on a white background.
///
/// `width`/`height` are logical sizes; the bitmap is scaled by `pixel_ratio`.
/// Text is not drawn; legend entries appear as colour swatches.
pub fn render_png(
    option: &ChartOption,
    width: f32,
    height: f32,
    pixel_ratio: f32,
) -> Result<Vec<u8>, ChartError> {
    let w = (width * pixel_ratio).round();
    let h = (height * pixel_ratio).round();
    if !(w >= 1.0 && h >= 1.0) {
        return Err(ChartError::EmptyCanvas);
    }
    let mut img = RgbaImage::from_pixel(w as u32, h as u32, Rgba([255, 255, 255, 255]));
    let canvas = Canvas::new(w as f64, h as f64, option);

    let axis = parse_css_color(&option.text_color).unwrap_or(Srgba::new(55, 65, 81, 255));
    let stroke = f64::from(pixel_ratio.max(1.0));

    // x axis along the baseline, y axis on the left edge
    draw_segment(
        &mut img,
        [canvas.left, canvas.baseline()],
        [canvas.right, canvas.baseline()],
        stroke,
        axis,
    );
    draw_segment(
        &mut img,
        [canvas.left, canvas.top],
        [canvas.left, canvas.bottom],
        stroke,
        axis,
    );

    for series in &option.series {
        let knots: Vec<[f64; 2]> = series
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| [canvas.x_at(i), canvas.y_at(v)])
            .collect();
        let path = if series.smooth {
            smooth_path(&knots, SMOOTH_SEGMENTS)
        } else {
            knots
        };

        fill_area(&mut img, &path, &canvas, &series.area);

        let line = parse_css_color(&series.line_color).unwrap_or(Srgba::new(0, 0, 0, 255));
        let line_width = f64::from(series.line_width * pixel_ratio);
        for pair in path.windows(2) {
            draw_segment(&mut img, pair[0], pair[1], line_width, line);
        }
    }

    draw_legend(&mut img, option, &canvas, pixel_ratio);

    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}

/// Pixel geometry of the plot area and the value → y mapping.
struct Canvas {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    n: usize,
    y_min: f64,
    y_max: f64,
}

impl Canvas {
    fn new(w: f64, h: f64, option: &ChartOption) -> Self {
        let (ml, mr, mt, mb) = MARGINS;
        let values = option.series.iter().flat_map(|s| s.data.iter().copied());
        let (lo, hi) = values.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let y_max = if hi > 0.0 { hi * 1.1 } else { 1.0 };
        Self {
            left: w * ml,
            right: w * (1.0 - mr),
            top: h * mt,
            bottom: h * (1.0 - mb),
            n: option.categories.len(),
            y_min: lo * 1.1,
            y_max,
        }
    }

    fn x_at(&self, i: usize) -> f64 {
        if self.n <= 1 {
            return (self.left + self.right) / 2.0;
        }
        self.left + (self.right - self.left) * i as f64 / (self.n - 1) as f64
    }

    fn y_at(&self, v: f64) -> f64 {
        let t = (v - self.y_min) / (self.y_max - self.y_min);
        self.bottom - t * (self.bottom - self.top)
    }

    fn baseline(&self) -> f64 {
        self.y_at(0.0)
    }
}

fn blend(img: &mut RgbaImage, x: i64, y: i64, color: Srgba<u8>) {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return;
    }
    let src = Rgba([color.red, color.green, color.blue, color.alpha]);
    let pixel = img.get_pixel_mut(x as u32, y as u32);
    if color.alpha == u8::MAX {
        *pixel = src;
    } else {
        pixel.blend(&src);
    }
}

/// Thick segment: every pixel whose centre lies within `width / 2` of it.
fn draw_segment(img: &mut RgbaImage, a: [f64; 2], b: [f64; 2], width: f64, color: Srgba<u8>) {
    let r = (width / 2.0).max(0.5);
    let (dx, dy) = (b[0] - a[0], b[1] - a[1]);
    let len2 = dx * dx + dy * dy;

    let (x0, x1) = (a[0].min(b[0]) - r, a[0].max(b[0]) + r);
    let (y0, y1) = (a[1].min(b[1]) - r, a[1].max(b[1]) + r);

    for y in y0.floor() as i64..=y1.ceil() as i64 {
        for x in x0.floor() as i64..=x1.ceil() as i64 {
            let (px, py) = (x as f64 + 0.5, y as f64 + 0.5);
            let t = if len2 > 0.0 {
                (((px - a[0]) * dx + (py - a[1]) * dy) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let (cx, cy) = (a[0] + dx * t, a[1] + dy * t);
            if (px - cx).powi(2) + (py - cy).powi(2) <= r * r {
                blend(img, x, y, color);
            }
        }
    }
}

/// Fill between `path` and the baseline with a vertical gradient.
fn fill_area(img: &mut RgbaImage, path: &[[f64; 2]], canvas: &Canvas, stops: &[ColorStop]) {
    if stops.is_empty() || path.len() < 2 {
        return;
    }
    let parsed: Vec<(f32, Srgba<u8>)> = stops
        .iter()
        .filter_map(|s| Some((s.offset, parse_css_color(&s.color)?)))
        .collect();
    if parsed.is_empty() {
        return;
    }
    let base = canvas.baseline();
    let span = canvas.bottom - canvas.top;

    for pair in path.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b[0] <= a[0] {
            continue;
        }
        for x in a[0].ceil() as i64..b[0].ceil() as i64 {
            let t = (x as f64 - a[0]) / (b[0] - a[0]);
            let y_line = a[1] + (b[1] - a[1]) * t;
            let (from, to) = if y_line < base { (y_line, base) } else { (base, y_line) };
            for y in from.round() as i64..to.round() as i64 {
                let offset = ((y as f64 - canvas.top) / span) as f32;
                blend(img, x, y, gradient_at(&parsed, offset));
            }
        }
    }
}

fn gradient_at(stops: &[(f32, Srgba<u8>)], offset: f32) -> Srgba<u8> {
    let first = stops[0];
    let last = stops[stops.len() - 1];
    if offset <= first.0 {
        return first.1;
    }
    if offset >= last.0 {
        return last.1;
    }
    for pair in stops.windows(2) {
        let ((o0, c0), (o1, c1)) = (pair[0], pair[1]);
        if offset >= o0 && offset <= o1 {
            let t = if o1 > o0 { (offset - o0) / (o1 - o0) } else { 0.0 };
            return mix(c0, c1, t);
        }
    }
    last.1
}

fn draw_legend(img: &mut RgbaImage, option: &ChartOption, canvas: &Canvas, pixel_ratio: f32) {
    let swatch_w = 25.0 * f64::from(pixel_ratio);
    let swatch_h = 4.0 * f64::from(pixel_ratio);
    let gap = 20.0 * f64::from(pixel_ratio);
    let total = option.series.len() as f64 * (swatch_w + gap) - gap;
    let mut x = (f64::from(img.width()) - total) / 2.0;
    let y = canvas.top / 2.0;

    for series in &option.series {
        let color = parse_css_color(&series.line_color).unwrap_or(Srgba::new(0, 0, 0, 255));
        for py in (y - swatch_h / 2.0) as i64..(y + swatch_h / 2.0) as i64 {
            for px in x as i64..(x + swatch_w) as i64 {
                blend(img, px, py, color);
            }
        }
        x += swatch_w + gap;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{build_line_chart, ChartStyle};
    use crate::data::model::SeriesPoint;

    fn option() -> ChartOption {
        let points: Vec<SeriesPoint> = (2015..=2020)
            .map(|year| SeriesPoint {
                year,
                domestic_total: f64::from(year - 2010) * 10.0,
                nondomestic_total: 20.0,
            })
            .collect();
        build_line_chart(&points, &ChartStyle::default())
    }

    #[test]
    fn produces_png_at_pixel_ratio() {
        let bytes = render_png(&option(), 160.0, 90.0, 2.0).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 180));
    }

    #[test]
    fn empty_canvas_is_rejected() {
        assert!(matches!(
            render_png(&option(), 0.0, 90.0, 2.0),
            Err(ChartError::EmptyCanvas)
        ));
    }

    #[test]
    fn draws_line_colour_into_plot() {
        let bytes = render_png(&option(), 200.0, 120.0, 1.0).unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgba8();
        let primary = Rgba([30, 64, 175, 255]);
        assert!(img.pixels().any(|p| *p == primary));
    }

    #[test]
    fn gradient_interpolates_between_stops() {
        let stops = [
            (0.0, Srgba::new(0, 0, 0, 100)),
            (1.0, Srgba::new(0, 0, 0, 0)),
        ];
        assert_eq!(gradient_at(&stops, 0.5).alpha, 50);
        assert_eq!(gradient_at(&stops, -1.0).alpha, 100);
    }
}
