pub const LOADED_CLASS: &str = "loaded";
pub const LAZY_IMAGE_SELECTOR: &str = r#"img[loading="lazy"]"#;

pub trait LazyImage {
    fn is_loaded(&self) -> bool;

    fn mark_loaded(&self);
}

/// The intersection watcher an image is registered with.
pub trait ImageWatcher<I> {
    fn unobserve(&self, image: &I);
}

pub struct IntersectionReport<I> {
    pub image: I,
    pub is_intersecting: bool,
}

/// Marks every newly visible image as loaded and stops watching it.
/// Returns how many images were marked by this batch.
pub fn handle_intersections<I, W>(
    reports: impl IntoIterator<Item = IntersectionReport<I>>,
    watcher: &W,
) -> usize
where
    I: LazyImage,
    W: ImageWatcher<I>,
{
    let mut marked = 0;

    for report in reports {
        if !report.is_intersecting {
            continue;
        }

        if !report.image.is_loaded() {
            report.image.mark_loaded();
            marked += 1;
        }
        watcher.unobserve(&report.image);
    }

    marked
}
