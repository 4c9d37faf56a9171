//! PDF serialization of laid-out pages

use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use super::font::win_ansi;
use super::layout::{Item, Page, FONT_SIZE, PAGE_HEIGHT, PAGE_WIDTH};

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

/// A JPEG ready to embed
pub struct EncodedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Sequential object ids
struct Refs(i32);

impl Refs {
    fn next(&mut self) -> Ref {
        self.0 += 1;
        Ref::new(self.0)
    }
}

fn xobject_name(exchange: usize) -> String {
    format!("Im{exchange}")
}

/// Serialize `pages`. `images[i]` is the image of exchange `i`, if any.
pub fn write(pages: &[Page], images: &[Option<EncodedImage>], title: &str) -> Vec<u8> {
    let mut refs = Refs(0);
    let catalog_id = refs.next();
    let tree_id = refs.next();
    let info_id = refs.next();
    let regular_id = refs.next();
    let bold_id = refs.next();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.document_info(info_id).title(TextStr(title));
    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let mut image_ids: Vec<Option<Ref>> = Vec::with_capacity(images.len());
    for image in images {
        let Some(image) = image else {
            image_ids.push(None);
            continue;
        };
        let id = refs.next();
        let mut xobject = pdf.image_xobject(id, &image.jpeg);
        xobject.filter(Filter::DctDecode);
        xobject.width(i32::try_from(image.width).unwrap_or(i32::MAX));
        xobject.height(i32::try_from(image.height).unwrap_or(i32::MAX));
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();
        image_ids.push(Some(id));
    }

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = refs.next();
        let content_id = refs.next();
        page_ids.push(page_id);

        let placed: Vec<(String, Ref)> = page
            .items
            .iter()
            .filter_map(|item| match item {
                Item::Image { exchange, .. } => image_ids
                    .get(*exchange)
                    .copied()
                    .flatten()
                    .map(|id| (xobject_name(*exchange), id)),
                Item::Line { .. } => None,
            })
            .collect();

        let mut writer = pdf.page(page_id);
        writer.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        writer.parent(tree_id);
        writer.contents(content_id);
        let mut resources = writer.resources();
        resources.fonts().pair(REGULAR, regular_id).pair(BOLD, bold_id);
        if !placed.is_empty() {
            let mut xobjects = resources.x_objects();
            for (name, id) in &placed {
                xobjects.pair(Name(name.as_bytes()), *id);
            }
            xobjects.finish();
        }
        resources.finish();
        writer.finish();

        let content = page_content(page, &image_ids);
        pdf.stream(content_id, &content);
    }

    let count = i32::try_from(page_ids.len()).unwrap_or(i32::MAX);
    pdf.pages(tree_id).kids(page_ids).count(count);

    pdf.finish()
}

fn page_content(page: &Page, image_ids: &[Option<Ref>]) -> Vec<u8> {
    let mut content = Content::new();
    for item in &page.items {
        match item {
            Item::Line { x, y, label, text } => {
                content.begin_text();
                content.next_line(*x, *y);
                match label {
                    Some(label) => {
                        content.set_font(BOLD, FONT_SIZE);
                        content.show(Str(label.as_bytes()));
                        content.set_font(REGULAR, FONT_SIZE);
                        content.show(Str(&win_ansi(&format!(" {text}"))));
                    }
                    None => {
                        content.set_font(REGULAR, FONT_SIZE);
                        content.show(Str(&win_ansi(text)));
                    }
                }
                content.end_text();
            }
            Item::Image { x, y, size, exchange } => {
                if image_ids.get(*exchange).copied().flatten().is_none() {
                    continue;
                }
                let name = xobject_name(*exchange);
                content.save_state();
                content.transform([*size, 0.0, 0.0, *size, *x, *y]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
        }
    }
    content.finish()
}
