// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fitting and aligning a source size inside a container rectangle.

use kurbo::{Point, Rect, Size, Vec2};

/// Horizontal alignment inside a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorzAlign {
    /// Flush with the left edge.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush with the right edge.
    Right,
}

/// Vertical alignment inside a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VertAlign {
    /// Flush with the top edge.
    #[default]
    Top,
    /// Centered.
    Middle,
    /// Flush with the bottom edge.
    Bottom,
}

/// How a source is scaled to a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FitMode {
    /// Keep the source's own size.
    #[default]
    None,
    /// Scale uniformly so the source fits entirely inside.
    Fit,
    /// Scale each axis to match the container exactly.
    Stretch,
    /// Scale uniformly so the source covers the container.
    Cover,
    /// Scale uniformly to match the container's width.
    FitWidth,
    /// Scale uniformly to match the container's height.
    FitHeight,
}

/// Returns the alignment as a fraction of the container, `(0, 0)` being
/// top-left.
#[must_use]
pub fn anchor(h: HorzAlign, v: VertAlign) -> Vec2 {
    let x = match h {
        HorzAlign::Left => 0.0,
        HorzAlign::Center => 0.5,
        HorzAlign::Right => 1.0,
    };
    let y = match v {
        VertAlign::Top => 0.0,
        VertAlign::Middle => 0.5,
        VertAlign::Bottom => 1.0,
    };
    Vec2::new(x, y)
}

/// Returns the per-axis scale that applies `mode` to `source` in
/// `container`.
#[must_use]
pub fn scale_to_fit(source: Size, container: Size, mode: FitMode) -> Vec2 {
    let sx = container.width / source.width;
    let sy = container.height / source.height;
    match mode {
        FitMode::None => Vec2::new(1.0, 1.0),
        FitMode::Fit => Vec2::new(sx.min(sy), sx.min(sy)),
        FitMode::Stretch => Vec2::new(sx, sy),
        FitMode::Cover => Vec2::new(sx.max(sy), sx.max(sy)),
        FitMode::FitWidth => Vec2::new(sx, sx),
        FitMode::FitHeight => Vec2::new(sy, sy),
    }
}

/// Where a source lands in a container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Destination rectangle in container space.
    pub dest: Rect,
    /// Sub-rectangle of the source in source units, when cropped.
    pub source: Option<Rect>,
}

/// Scales and aligns `source` within `container`.
///
/// With `crop`, the destination is clipped to the container and `source`
/// names the visible part of the source.
#[must_use]
pub fn place(
    source: Size,
    container: Rect,
    mode: FitMode,
    h: HorzAlign,
    v: VertAlign,
    crop: bool,
) -> Placement {
    let scale = scale_to_fit(source, container.size(), mode);
    let scaled = Size::new(source.width * scale.x, source.height * scale.y);
    let a = anchor(h, v);
    let container_anchor = container.origin()
        + Vec2::new(a.x * container.width(), a.y * container.height());
    let origin = container_anchor - Vec2::new(a.x * scaled.width, a.y * scaled.height);
    let full = Rect::from_origin_size(origin, scaled);

    if !crop {
        return Placement {
            dest: full,
            source: None,
        };
    }

    let p0 = Point::new(full.x0.max(container.x0), full.y0.max(container.y0));
    let p1 = Point::new(full.x1.min(container.x1), full.y1.min(container.y1));
    let to_source = |p: Point| Point::new((p.x - origin.x) / scale.x, (p.y - origin.y) / scale.y);
    Placement {
        dest: Rect::from_points(p0, p1),
        source: Some(Rect::from_points(to_source(p0), to_source(p1))),
    }
}
