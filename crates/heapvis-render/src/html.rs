//! HTML report.
//!
//! [`HtmlReport`] writes the `index.html` markup for a set of split heaps
//! and pushes the images it references into an [`ImageSink`]. The markup
//! links [`STYLESHEET_NAME`]; callers store [`STYLESHEET`] under that name.

use std::borrow::Cow;
use std::io::Write;

use heapvis_core::{ConfigError, Geometry, Heap, Page};

use crate::error::RenderError;
use crate::raster::PageRaster;
use crate::sink::ImageSink;
use crate::stats::HeapStats;
use crate::MAX_BLOCK_SCALE;

/// File name the markup expects the stylesheet under.
pub const STYLESHEET_NAME: &str = "stylesheet.css";

/// File name of the shared clean-page placeholder image.
pub const CLEAN_PAGE_IMAGE_NAME: &str = "page-clean.png";

/// Stylesheet for the report markup.
pub const STYLESHEET: &str = r#"
body {
  font-family: sans-serif;
}

heap {
  display: block;
  border: solid 1px black;
  margin-bottom: 2rem;
}

page-title {
  display: none;
}

heap-title,
heap-content {
  display: block;
}

heap-title {
  padding: 1rem;
}

heap-title h2 {
  margin: 0;
}

heap-title .stats td,
heap-title .stats th {
  text-align: right;
  padding-right: 1em;
}

page {
  display: inline-block;
  vertical-align: top;
  border: solid 1px #777;
}
"#;

/// Image file name for a maybe-dirty page.
pub fn page_image_name(page: &Page) -> String {
    format!("page-{:x}.png", page.addr())
}

/// Escape `&`, `<`, `>`, `"` and `'` for use in markup.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Writes the HTML report for split heaps.
pub struct HtmlReport<W: Write> {
    out: W,
    geometry: Geometry,
    block_scale: u32,
}

impl<W: Write> HtmlReport<W> {
    /// Create a report writing markup to `out`.
    ///
    /// `block_scale` is the pixel edge of one block, in `1..=64`, and the
    /// resulting page raster may be at most
    /// [`MAX_RASTER_EDGE`](crate::MAX_RASTER_EDGE) pixels wide.
    pub fn new(out: W, geometry: Geometry, block_scale: u32) -> Result<Self, RenderError> {
        geometry.validate()?;
        if !(1..=MAX_BLOCK_SCALE).contains(&block_scale) {
            return Err(ConfigError::BlockScaleOutOfRange {
                value: block_scale,
                max: MAX_BLOCK_SCALE,
            }
            .into());
        }
        PageRaster::edge(&geometry, block_scale)?;
        Ok(Self {
            out,
            geometry,
            block_scale,
        })
    }

    /// Write the whole document and every referenced image, returning the
    /// markup writer.
    ///
    /// The clean-page placeholder is written once, first; then one image
    /// per maybe-dirty page.
    pub fn render<S: ImageSink + ?Sized>(
        mut self,
        heaps: &[Heap],
        images: &mut S,
    ) -> Result<W, RenderError> {
        self.start_of_document()?;
        images.write_image(
            CLEAN_PAGE_IMAGE_NAME,
            &PageRaster::clean(&self.geometry, self.block_scale)?,
        )?;
        for (i, heap) in heaps.iter().enumerate() {
            tracing::info!(
                heap = %heap.number(),
                addr = format_args!("{:#x}", heap.addr()),
                progress = format_args!("{}/{}", i + 1, heaps.len()),
                "writing heap"
            );
            self.heap(heap, images)?;
        }
        self.end_of_document()?;
        self.out.flush()?;
        Ok(self.out)
    }

    fn start_of_document(&mut self) -> Result<(), RenderError> {
        writeln!(self.out, "<html>")?;
        writeln!(self.out, "<head>")?;
        writeln!(self.out, "\t<title>Heap visualizer</title>")?;
        writeln!(
            self.out,
            "\t<link rel=\"stylesheet\" href=\"{STYLESHEET_NAME}\">"
        )?;
        writeln!(self.out, "</head>")?;
        writeln!(self.out, "<body>")?;
        Ok(())
    }

    fn heap<S: ImageSink + ?Sized>(&mut self, heap: &Heap, images: &mut S) -> Result<(), RenderError> {
        let stats = HeapStats::of(heap, &self.geometry);
        writeln!(self.out, "<heap>")?;
        write!(
            self.out,
            r#"
  <heap-title>
    <h2>Heap {number} &mdash; 0x{addr:08x}</h2>
    <table class="stats">
      <tr>
        <th>Virtual</th>
        <td>{virt:.1} MB</td>
        <td>{total} pages</td>
      </tr>
      <tr>
        <th>Dirty</th>
        <td>{dirty_mib:.1} MB</td>
        <td>{dirty} pages</td>
        <td>{dirty_pct}%</td>
      </tr>
      <tr>
        <th>Clean</th>
        <td>{clean_mib:.1} MB</td>
        <td>{clean} pages</td>
        <td>{clean_pct}%</td>
      </tr>
    </table>
  </heap-title>
"#,
            number = heap.number(),
            addr = heap.addr(),
            virt = stats.virtual_mib(),
            total = stats.total_pages,
            dirty_mib = stats.maybe_dirty_mib(),
            dirty = stats.maybe_dirty_pages,
            dirty_pct = stats.maybe_dirty_percent(),
            clean_mib = stats.clean_mib(),
            clean = stats.clean_pages,
            clean_pct = stats.clean_percent(),
        )?;
        write!(self.out, "\t<heap-content>")?;
        for page in heap.pages() {
            self.page(heap, page, images)?;
        }
        writeln!(self.out, "</heap-content>")?;
        writeln!(self.out, "</heap>")?;
        Ok(())
    }

    fn page<S: ImageSink + ?Sized>(
        &mut self,
        heap: &Heap,
        page: &Page,
        images: &mut S,
    ) -> Result<(), RenderError> {
        let end = page.addr().saturating_add(self.geometry.page_size);
        write!(
            self.out,
            "<page><page-title>{:08x}-{end:08x}</page-title>",
            page.addr()
        )?;
        let title = format!("0x{:x}", page.addr());
        let src = if page.maybe_dirty() {
            let name = page_image_name(page);
            let raster = PageRaster::render(heap, page, &self.geometry, self.block_scale)?;
            images.write_image(&name, &raster)?;
            Cow::Owned(name)
        } else {
            Cow::Borrowed(CLEAN_PAGE_IMAGE_NAME)
        };
        write!(
            self.out,
            "<img src=\"{}\" class=\"page-content\" title=\"{}\">",
            escape_html(&src),
            escape_html(&title)
        )?;
        write!(self.out, "</page>")?;
        Ok(())
    }

    fn end_of_document(&mut self) -> Result<(), RenderError> {
        writeln!(self.out, "</body>")?;
        writeln!(self.out, "</html>")?;
        Ok(())
    }
}
