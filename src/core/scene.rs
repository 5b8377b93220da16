//! Declarative description of one rendered chart.
//!
//! Panels append layers of primitive shapes in canvas coordinates (before the
//! root offset). Writers in `report` turn a `Scene` into SVG or PDF.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Panel {
    SetMembership,
    TopHistogram,
    ReadHeatmap,
    Abundance,
}

impl Panel {
    pub fn as_str(self) -> &'static str {
        match self {
            Panel::SetMembership => "set-membership",
            Panel::TopHistogram => "top-histogram",
            Panel::ReadHeatmap => "read-heatmap",
            Panel::Abundance => "abundance",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Anchor {
    Start,
    End,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    pub fill_opacity: Option<f64>,
    pub stroke: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub size: f64,
    pub anchor: Anchor,
    /// Degrees, rotated around (x, y).
    pub rotate: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Rect(Rect),
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        stroke: String,
        stroke_width: f64,
    },
    Text(Text),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub panel: Panel,
    pub elements: Vec<Element>,
}

impl Layer {
    pub fn new(panel: Panel) -> Self {
        Self {
            panel,
            elements: Vec::new(),
        }
    }

    pub fn rect(&mut self, rect: Rect) {
        self.elements.push(Element::Rect(rect));
    }

    pub fn text(&mut self, text: Text) {
        self.elements.push(Element::Text(text));
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        self.elements.push(Element::Line {
            x1,
            y1,
            x2,
            y2,
            stroke: stroke.to_string(),
        });
    }

    #[cfg(test)]
    pub fn rects(&self) -> impl Iterator<Item = &Rect> {
        self.elements.iter().filter_map(|e| match e {
            Element::Rect(r) => Some(r),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn texts(&self) -> impl Iterator<Item = &Text> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub offset: (f64, f64),
    pub layers: Vec<Layer>,
}

impl Scene {
    #[cfg(test)]
    pub fn layer(&self, panel: Panel) -> Option<&Layer> {
        self.layers.iter().find(|l| l.panel == panel)
    }

    pub fn element_count(&self) -> usize {
        self.layers.iter().map(|l| l.elements.len()).sum()
    }
}

pub fn text(x: f64, y: f64, label: impl Into<String>, size: f64, anchor: Anchor) -> Text {
    Text {
        x,
        y,
        text: label.into(),
        size,
        anchor,
        rotate: None,
    }
}
