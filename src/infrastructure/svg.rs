//! SVG rendering of a computed layout.
//!
//! Draws one curve per edge and one marker + label per node. Node groups carry
//! `data-id` so a host page can map clicks back to selections.

use std::fmt::{self, Write};

use crate::domain::{Layout, LayoutConfig};

/// Colours and sizes of the drawing.
#[derive(Debug, Clone)]
pub struct SvgStyle {
    pub width: f64,
    pub min_height: f64,
    /// Height reserved per node when sizing the canvas
    pub row_height: f64,
    pub margin: f64,
    pub background: String,
    pub link_color: String,
    pub link_opacity: f64,
    pub link_width: f64,
    pub marker_stroke: String,
    pub marker_fill: String,
    pub label_color: String,
    pub label_offset: f64,
    pub font_family: String,
    pub font_size: f64,
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            width: 1200.0,
            min_height: 600.0,
            row_height: 28.0,
            margin: 40.0,
            background: "#111".into(),
            link_color: "#2dd4bf".into(),
            link_opacity: 0.7,
            link_width: 1.2,
            marker_stroke: "#a3a3a3".into(),
            marker_fill: "#111".into(),
            label_color: "#e5e5e5".into(),
            label_offset: 10.0,
            font_family: "system-ui, sans-serif".into(),
            font_size: 12.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SvgRenderer {
    style: SvgStyle,
    marker_radius: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(SvgStyle::default(), &LayoutConfig::default())
    }
}

impl SvgRenderer {
    pub fn new(style: SvgStyle, layout: &LayoutConfig) -> Self {
        Self {
            style,
            marker_radius: layout.marker_radius,
        }
    }

    pub fn render(&self, layout: &Layout) -> String {
        let mut out = String::new();
        match self.write_document(&mut out, layout) {
            Ok(()) => out,
            Err(_) => String::new(),
        }
    }

    fn write_document(&self, out: &mut String, layout: &Layout) -> fmt::Result {
        let s = &self.style;
        let (min_x, min_y, content_width, content_height) = match layout.bounds() {
            Some(b) => (b.min.x, b.min.y, b.width(), b.height()),
            None => (0.0, 0.0, 0.0, 0.0),
        };
        let width = s.width.max(content_width + 2.0 * s.margin);
        let height = s
            .min_height
            .max(layout.nodes.len() as f64 * s.row_height)
            .max(content_height + 2.0 * s.margin);

        write!(
            out,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
             viewBox=\"0 0 {width} {height}\" style=\"background:{}\">",
            s.background
        )?;
        write!(
            out,
            "<g transform=\"translate({},{})\">",
            s.margin - min_x,
            s.margin - min_y
        )?;

        write!(
            out,
            "<g fill=\"none\" stroke=\"{}\" stroke-opacity=\"{}\" stroke-width=\"{}\">",
            s.link_color, s.link_opacity, s.link_width
        )?;
        for edge in &layout.edges {
            out.push_str("<path data-source=\"");
            attr_escape_into(out, &edge.source);
            out.push_str("\" data-target=\"");
            attr_escape_into(out, &edge.target);
            write!(out, "\" d=\"{}\"/>", edge.svg_path())?;
        }
        out.push_str("</g>");

        write!(
            out,
            "<g font-family=\"{}\" font-size=\"{}px\">",
            s.font_family, s.font_size
        )?;
        for node in &layout.nodes {
            out.push_str("<g class=\"node\" data-id=\"");
            attr_escape_into(out, &node.id);
            write!(
                out,
                "\" transform=\"translate({},{})\"><circle r=\"{}\" stroke=\"{}\" fill=\"{}\"/>",
                node.x, node.y, self.marker_radius, s.marker_stroke, s.marker_fill
            )?;
            write!(
                out,
                "<text dy=\"0.32em\" x=\"{}\" fill=\"{}\">",
                s.label_offset, s.label_color
            )?;
            text_escape_into(out, &node.label);
            out.push_str("</text></g>");
        }
        out.push_str("</g></g></svg>");
        Ok(())
    }
}

fn attr_escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn text_escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
}
