//! SVG export serializer.
//!
//! Writes one placed image as an SVG document the size of the plan's
//! container, using the [`svg`] crate for document construction and XML
//! escaping:
//!
//! - a `<clipPath>` on the frame rectangle,
//! - an `<image>` at natural source size carrying the plan's
//!   source-to-container `matrix(...)`,
//! - optional `<title>`, `<desc>`, and structured `<metadata>`.
//!
//! Any SVG viewer then shows exactly the crop the editor showed.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use calframe_geometry::RenderPlan;
use svg::Document;
use svg::node::element::{
    ClipPath, Definitions, Description, Element, Group, Image, Rectangle, Title,
};
use svg::node::{Node, Text};

/// Identifier of the frame clip path inside exported documents.
const CLIP_ID: &str = "calframe-frame";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped by the `svg`
/// crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized snapshot entry JSON, emitted inside `<metadata>` in a
    /// namespaced `<calframe:placement>` element so the file can be
    /// re-imported with its exact transform.
    pub placement_json: Option<&'a str>,

    /// Fill for the frame area behind the image (visible only when the
    /// image was fitted rather than filled).
    pub background: Option<&'a str>,
}

fn format_matrix(m: [f64; 6]) -> String {
    format!("matrix({} {} {} {} {} {})", m[0], m[1], m[2], m[3], m[4], m[5])
}

/// Serialize a render plan to an SVG document.
///
/// `href` is the image reference written to the `<image>` element (a
/// relative path, URL, or `data:` URI).
#[must_use]
pub fn to_svg(plan: &RenderPlan, href: &str, metadata: &SvgMetadata<'_>) -> String {
    let w = plan.container.width;
    let h = plan.container.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(json) = metadata.placement_json {
        let mut placement_el = Element::new("calframe:placement");
        placement_el.assign("xmlns:calframe", "https://calframe.app/ns/1");
        placement_el.append(Text::new(json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(placement_el);
        doc = doc.add(metadata_el);
    }

    let frame = plan.frame_rect;
    let frame_rect = || {
        Rectangle::new()
            .set("x", frame.x)
            .set("y", frame.y)
            .set("width", frame.width)
            .set("height", frame.height)
    };

    doc = doc.add(Definitions::new().add(ClipPath::new().set("id", CLIP_ID).add(frame_rect())));

    let mut group = Group::new().set("clip-path", format!("url(#{CLIP_ID})"));
    if let Some(fill) = metadata.background {
        group = group.add(frame_rect().set("fill", fill));
    }
    let image = Image::new()
        .set("href", href)
        .set("x", 0)
        .set("y", 0)
        .set("width", plan.source.width)
        .set("height", plan.source.height)
        .set("preserveAspectRatio", "none")
        .set(
            "transform",
            format_matrix(plan.source_to_container().to_array()),
        );
    group = group.add(image);
    doc = doc.add(group);

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
