//! SVG composition of an export plan.
//!
//! Everything vector goes into one document: solid and gradient backgrounds,
//! text blocks with their stroke, shadow and gradient fill, and the
//! call-to-action button. Raster layers (background image, texture, logo)
//! are drawn around it by the rasterizer.

use crate::background::{farthest_corner_radius, linear_gradient_line};
use crate::plan::{BackgroundPlan, CtaPlan, ExportPlan, TextPaint, TextPlan};
use kurbo::Rect;
use pc_core::Color;
use pc_core::style::Alignment;
use std::fmt::Write;

const DEFAULT_FONT_STACK: &str = "sans-serif";
const TEXT_GRADIENT_ANGLE: f64 = 135.0;

/// Escape text for XML content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// `fill="…"` style paint attributes, with the alpha split out.
fn paint_attrs(attr: &str, color: Color) -> String {
    if color.a >= 1.0 {
        format!("{attr}=\"{}\"", color.to_hex_rgb())
    } else {
        format!(
            "{attr}=\"{}\" {attr}-opacity=\"{}\"",
            color.to_hex_rgb(),
            color.a
        )
    }
}

fn stop(offset: f64, color: Color) -> String {
    let mut s = format!("<stop offset=\"{offset}%\" stop-color=\"{}\"", color.to_hex_rgb());
    if color.a < 1.0 {
        let _ = write!(s, " stop-opacity=\"{}\"", color.a);
    }
    s.push_str("/>");
    s
}

fn linear_gradient(id: &str, rect: Rect, css_angle: f64, stops: [(f64, Color); 2]) -> String {
    let (p0, p1) = linear_gradient_line(rect, css_angle);
    format!(
        "<linearGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">{}{}</linearGradient>",
        p0.x,
        p0.y,
        p1.x,
        p1.y,
        stop(stops[0].0, stops[0].1),
        stop(stops[1].0, stops[1].1),
    )
}

fn font_family_attr(family: Option<&str>) -> String {
    match family {
        Some(f) => {
            let name: String = f.chars().filter(|c| !matches!(c, '"' | '\\')).collect();
            escape(&format!("\"{name}\", {DEFAULT_FONT_STACK}"))
        }
        None => DEFAULT_FONT_STACK.to_string(),
    }
}

fn anchor(align: Alignment) -> &'static str {
    match align {
        Alignment::Left => "start",
        Alignment::Center => "middle",
        Alignment::Right => "end",
    }
}

fn text_id(text: &TextPlan) -> &'static str {
    match text.role {
        pc_core::TextRole::Header => "header",
        pc_core::TextRole::Subtext => "subtext",
    }
}

/// `<text>` element of a block with the given paint attributes.
fn text_element(text: &TextPlan, paint: &str) -> String {
    let mut el = format!(
        "<text font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" text-anchor=\"{}\" {paint}>",
        font_family_attr(text.font_family.as_deref()),
        text.font_size,
        text.font_weight,
        anchor(text.align),
    );
    for (i, line) in text.lines.iter().enumerate() {
        let _ = write!(
            el,
            "<tspan x=\"{}\" y=\"{}\">{}</tspan>",
            text.anchor_x,
            text.baseline(i),
            escape(line)
        );
    }
    el.push_str("</text>");
    el
}

fn text_block(text: &TextPlan, defs: &mut String, body: &mut String) {
    let id = text_id(text);

    let fill = match &text.paint {
        TextPaint::Solid(c) => paint_attrs("fill", *c),
        TextPaint::Gradient(start, end) => {
            let gid = format!("{id}-fill");
            defs.push_str(&linear_gradient(
                &gid,
                text.bounds,
                TEXT_GRADIENT_ANGLE,
                [(0.0, *start), (100.0, *end)],
            ));
            format!("fill=\"url(#{gid})\"")
        }
    };

    let filter = match text.shadow {
        Some(s) => {
            let fid = format!("{id}-shadow");
            let _ = write!(
                defs,
                "<filter id=\"{fid}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">\
                 <feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{}\" flood-opacity=\"{}\"/></filter>",
                s.dx,
                s.dy,
                s.blur / 2.0,
                s.color.to_hex_rgb(),
                s.color.a,
            );
            format!(" filter=\"url(#{fid})\"")
        }
        None => String::new(),
    };

    let _ = write!(body, "<g id=\"{id}\" opacity=\"{}\">", text.opacity);
    // The outline sits under the fill, like a text-stroke span behind the text.
    if let Some(stroke) = text.stroke {
        let attrs = format!(
            "fill=\"none\" {} stroke-width=\"{}\" stroke-linejoin=\"round\"",
            paint_attrs("stroke", stroke.color),
            stroke.width
        );
        body.push_str(&text_element(text, &attrs));
    }
    body.push_str(&text_element(text, &format!("{fill}{filter}")));
    body.push_str("</g>");
}

fn cta_button(cta: &CtaPlan, body: &mut String) {
    let r = cta.rect;
    let _ = write!(
        body,
        "<g id=\"cta\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" {}/>",
        r.x0,
        r.y0,
        r.width(),
        r.height(),
        cta.radius,
        paint_attrs("fill", cta.fill),
    );
    let _ = write!(
        body,
        "<text x=\"{}\" y=\"{}\" font-family=\"{DEFAULT_FONT_STACK}\" font-size=\"{}\" font-weight=\"600\" text-anchor=\"middle\" {}>{}</text></g>",
        r.center().x,
        cta.baseline(),
        cta.font_size,
        paint_attrs("fill", cta.text_color),
        escape(&cta.text),
    );
}

fn svg_open(width: u32, height: u32) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    )
}

/// The vector layer of an export. When the background is an image the
/// document leaves it transparent so the raster underneath shows through.
pub fn compose(plan: &ExportPlan) -> String {
    let bounds = plan.bounds();
    let mut defs = String::new();
    let mut body = String::new();

    let rect = |paint: &str| {
        format!(
            "<rect id=\"background\" x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" {paint}/>",
            plan.width, plan.height
        )
    };
    match &plan.background {
        BackgroundPlan::Solid(c) => body.push_str(&rect(&paint_attrs("fill", *c))),
        BackgroundPlan::Linear {
            start,
            end,
            stops,
            css_angle,
        } => {
            defs.push_str(&linear_gradient(
                "bg",
                bounds,
                *css_angle,
                [(stops.0, *start), (stops.1, *end)],
            ));
            body.push_str(&rect("fill=\"url(#bg)\""));
        }
        BackgroundPlan::Radial { start, end, stops } => {
            let c = bounds.center();
            let _ = write!(
                defs,
                "<radialGradient id=\"bg\" gradientUnits=\"userSpaceOnUse\" cx=\"{}\" cy=\"{}\" r=\"{}\">{}{}</radialGradient>",
                c.x,
                c.y,
                farthest_corner_radius(bounds),
                stop(stops.0, *start),
                stop(stops.1, *end),
            );
            body.push_str(&rect("fill=\"url(#bg)\""));
        }
        BackgroundPlan::Image { .. } => {}
    }

    for text in &plan.texts {
        text_block(text, &mut defs, &mut body);
    }
    if let Some(cta) = &plan.cta {
        cta_button(cta, &mut body);
    }

    let mut svg = svg_open(plan.width, plan.height);
    if !defs.is_empty() {
        let _ = write!(svg, "<defs>{defs}</defs>");
    }
    svg.push_str(&body);
    svg.push_str("</svg>");
    svg
}

/// Glyph coverage of one text block, in opaque white on transparent. Used as
/// the clip mask of the texture overlay.
pub fn glyph_mask(plan: &ExportPlan, text: &TextPlan) -> String {
    let mut svg = svg_open(plan.width, plan.height);
    svg.push_str(&text_element(text, "fill=\"#FFFFFF\""));
    svg.push_str("</svg>");
    svg
}
