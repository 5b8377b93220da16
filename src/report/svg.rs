use crate::core::scene::{Anchor, Element, Rect, Scene, Text};
use anyhow::{Context, Result};
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

pub fn render(scene: &Scene) -> Result<String> {
    let mut out = String::with_capacity(64 * 1024 + scene.element_count() * 120);
    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\" font-family=\"Arial,Helvetica,sans-serif\">",
        scene.width, scene.height, scene.width, scene.height
    )?;
    writeln!(
        out,
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#fff\"/>",
        scene.width, scene.height
    )?;
    writeln!(
        out,
        "<g transform=\"translate({},{})\">",
        scene.offset.0, scene.offset.1
    )?;
    for layer in &scene.layers {
        writeln!(out, "<g class=\"{}\">", layer.panel.as_str())?;
        for el in &layer.elements {
            write_element(&mut out, el)?;
        }
        writeln!(out, "</g>")?;
    }
    writeln!(out, "</g>")?;
    writeln!(out, "</svg>")?;
    Ok(out)
}

pub fn write(path: &Path, scene: &Scene) -> Result<()> {
    let svg = render(scene)?;
    fs::write(path, svg).with_context(|| format!("failed to write {}", path.display()))
}

fn write_element(out: &mut String, el: &Element) -> Result<()> {
    match el {
        Element::Rect(r) => write_rect(out, r)?,
        Element::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        } => {
            writeln!(
                out,
                "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" shape-rendering=\"crispEdges\"/>",
                fmt_coord(*x1),
                fmt_coord(*y1),
                fmt_coord(*x2),
                fmt_coord(*y2),
                stroke
            )?;
        }
        Element::Polyline {
            points,
            stroke,
            stroke_width,
        } => {
            if points.is_empty() {
                return Ok(());
            }
            let mut path = String::new();
            for (i, (x, y)) in points.iter().enumerate() {
                if i == 0 {
                    write!(path, "M {} {}", fmt_coord(*x), fmt_coord(*y))?;
                } else {
                    write!(path, " L {} {}", fmt_coord(*x), fmt_coord(*y))?;
                }
            }
            writeln!(
                out,
                "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}px\"/>",
                path, stroke, stroke_width
            )?;
        }
        Element::Text(t) => write_text(out, t)?,
    }
    Ok(())
}

fn write_rect(out: &mut String, r: &Rect) -> Result<()> {
    write!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"",
        fmt_coord(r.x),
        fmt_coord(r.y),
        fmt_coord(r.width.max(0.0)),
        fmt_coord(r.height.max(0.0)),
        escape_svg(&r.fill)
    )?;
    if let Some(op) = r.fill_opacity {
        write!(out, " fill-opacity=\"{}\"", op)?;
    }
    if let Some(stroke) = &r.stroke {
        write!(out, " stroke=\"{}\"", escape_svg(stroke))?;
    }
    writeln!(out, "/>")?;
    Ok(())
}

fn write_text(out: &mut String, t: &Text) -> Result<()> {
    let anchor = match t.anchor {
        Anchor::Start => "start",
        Anchor::End => "end",
    };
    write!(
        out,
        "<text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"#000\" text-anchor=\"{}\"",
        fmt_coord(t.x),
        fmt_coord(t.y),
        t.size,
        anchor
    )?;
    if let Some(deg) = t.rotate {
        write!(
            out,
            " transform=\"rotate({} {} {})\"",
            deg,
            fmt_coord(t.x),
            fmt_coord(t.y)
        )?;
    }
    writeln!(out, ">{}</text>", escape_svg(&t.text))?;
    Ok(())
}

fn fmt_coord(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let r = (v * 100.0).round() / 100.0;
    if r == r.trunc() {
        format!("{}", r as i64)
    } else {
        format!("{}", r)
    }
}

pub fn escape_svg(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
