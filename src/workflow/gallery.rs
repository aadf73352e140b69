// Gallery entries for generated visuals
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GalleryItem {
    pub index: usize,
    /// Web path of the image, always rooted at `/`
    pub src: String,
    pub alt: String,
    pub caption: String,
    pub download_href: String,
}

/// Root a backend path at `/`, converting Windows separators. Runs of
/// separators collapse to one, so `a\\b` and `a\b` both become `/a/b`.
pub fn web_path(path: &str) -> String {
    if path.starts_with('/') {
        return path.to_string();
    }
    let segments: Vec<&str> = path.split(['\\', '/']).filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// One entry per generated visual, in backend order.
pub fn gallery_items(visuals: &[String]) -> Vec<GalleryItem> {
    visuals
        .iter()
        .enumerate()
        .map(|(index, path)| {
            let src = web_path(path);
            GalleryItem {
                index,
                alt: format!("visual-{}", index),
                caption: format!("Visual {}", index + 1),
                download_href: src.clone(),
                src,
            }
        })
        .collect()
}
