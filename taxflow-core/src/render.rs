// Rendering a SankeyFigure to HTML, SVG and raster/vector image bytes

use crate::error::{Result, TaxflowError};
use crate::figure::SankeyFigure;
use crate::layout::{MARGINS, compute_layout};
use resvg::tiny_skia::{Color, Pixmap, Transform};
use std::fmt::Write;
use std::io::Cursor;
use tracing::debug;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Plotly's default trace colours
const NODE_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const FONT_FAMILY: &str = "'Open Sans', verdana, arial, sans-serif";
const TITLE_SCALE: f64 = 1.7;
const LABEL_GAP: f64 = 6.0;

pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Interactive page: Plotly.js from the CDN drawing the embedded figure
pub fn render_html(figure: &SankeyFigure) -> Result<String> {
    // `</` inside the JSON would close the script element early
    let figure_json = serde_json::to_string(&figure.to_plotly_json())?.replace("</", "<\\/");

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<script src="{cdn}" charset="utf-8"></script>
</head>
<body>
<div id="sankey" style="width:{width}px;height:{height}px;"></div>
<script type="text/javascript">
const figure = {figure_json};
Plotly.newPlot("sankey", figure.data, figure.layout, {{"responsive": true}});
</script>
</body>
</html>
"#,
        title = escape_xml(&figure.title),
        cdn = PLOTLY_CDN,
        width = figure.style.width,
        height = figure.style.height,
        figure_json = figure_json,
    );

    Ok(html)
}

/// Static diagram laid out natively; each link carries its hover text as a
/// `<title>` tooltip
pub fn render_svg(figure: &SankeyFigure) -> Result<String> {
    let style = &figure.style;
    let graph = &figure.graph;
    let layout = compute_layout(graph, style);
    let font_size = f64::from(style.font_size);
    let (left, _, top, _) = MARGINS;
    let midpoint = f64::from(style.width) / 2.0;

    let mut svg = String::new();
    write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}" font-size="{size}">
"#,
        w = style.width,
        h = style.height,
        font = FONT_FAMILY,
        size = style.font_size,
    )?;
    writeln!(svg, r##"  <rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    writeln!(
        svg,
        r##"  <text class="title" x="{:.1}" y="{:.1}" font-size="{:.1}" fill="#444444">{}</text>"##,
        left,
        top / 2.0,
        font_size * TITLE_SCALE,
        escape_xml(&figure.title)
    )?;

    svg.push_str("  <g class=\"links\" fill=\"none\" stroke=\"#000000\" stroke-opacity=\"0.2\">\n");
    for (band, hover) in layout.links.iter().zip(&graph.hover_texts) {
        let mid_x = (band.x0 + band.x1) / 2.0;
        writeln!(
            svg,
            r#"    <path d="M{:.2},{:.2} C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}" stroke-width="{:.2}"><title>{}</title></path>"#,
            band.x0,
            band.y0,
            mid_x,
            band.y0,
            mid_x,
            band.y1,
            band.x1,
            band.y1,
            band.width.max(1.0),
            escape_xml(&hover.replace("<br>", "\n"))
        )?;
    }
    svg.push_str("  </g>\n");

    svg.push_str("  <g class=\"nodes\">\n");
    for (id, (node, label)) in layout.nodes.iter().zip(&graph.nodes).enumerate() {
        let label = escape_xml(label);
        writeln!(
            svg,
            r##"    <rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="#444444" stroke-width="0.5"><title>{}</title></rect>"##,
            node.x0,
            node.y0,
            node.x1 - node.x0,
            node.height(),
            NODE_PALETTE[id % NODE_PALETTE.len()],
            label
        )?;

        let (text_x, anchor) = if node.x0 < midpoint {
            (node.x1 + LABEL_GAP, "start")
        } else {
            (node.x0 - LABEL_GAP, "end")
        };
        writeln!(
            svg,
            r##"    <text x="{:.2}" y="{:.2}" dominant-baseline="middle" text-anchor="{}" fill="#444444">{}</text>"##,
            text_x,
            node.center_y(),
            anchor,
            label
        )?;
    }
    svg.push_str("  </g>\n");
    svg.push_str("</svg>\n");

    debug!(
        "Rendered SVG with {} nodes in {} columns",
        layout.nodes.len(),
        layout.columns
    );
    Ok(svg)
}

fn rasterize(figure: &SankeyFigure) -> Result<Pixmap> {
    let svg = render_svg(figure)?;

    let mut options = resvg::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = resvg::usvg::Tree::from_str(&svg, &options).map_err(|err| {
        TaxflowError::RenderError(format!("failed to parse generated SVG: {err}"))
    })?;

    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        TaxflowError::RenderError(format!(
            "failed to allocate {}x{} surface",
            size.width(),
            size.height()
        ))
    })?;
    pixmap.fill(Color::WHITE);
    resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

    Ok(pixmap)
}

pub fn render_png(figure: &SankeyFigure) -> Result<Vec<u8>> {
    rasterize(figure)?
        .encode_png()
        .map_err(|err| TaxflowError::RenderError(format!("failed to encode PNG output: {err}")))
}

pub fn render_jpeg(figure: &SankeyFigure) -> Result<Vec<u8>> {
    let pixmap = rasterize(figure)?;

    // Opaque background, so premultiplied RGBA equals straight RGB
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    let image = image::RgbImage::from_raw(pixmap.width(), pixmap.height(), rgb)
        .ok_or_else(|| TaxflowError::RenderError("pixel buffer size mismatch".to_string()))?;

    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image)
        .write_to(&mut bytes, image::ImageFormat::Jpeg)
        .map_err(|err| TaxflowError::RenderError(format!("failed to encode JPEG output: {err}")))?;

    Ok(bytes.into_inner())
}

pub fn render_pdf(figure: &SankeyFigure) -> Result<Vec<u8>> {
    let svg = render_svg(figure)?;

    let mut options = svg2pdf::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = svg2pdf::usvg::Tree::from_str(&svg, &options).map_err(|err| {
        TaxflowError::RenderError(format!("failed to parse generated SVG: {err}"))
    })?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|err| TaxflowError::RenderError(format!("failed to convert to PDF: {err:?}")))
}
