mod app;
mod gallery;
mod layout;
mod render;
mod sim;
mod ui;

use std::path::Path;

use app::{App, SavedPool};
use gallery::config::GalleryConfig;
use gallery::tiles::ImageRef;
use winit::event_loop::EventLoop;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

fn image_ref_for(path: &Path) -> ImageRef {
    let alt = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    ImageRef::new(path.to_string_lossy().into_owned(), alt)
}

/// Image pool named on the command line: either one directory (its images,
/// sorted by file name) or a list of image files. `None` keeps the configured pool.
fn images_from_args(args: &[String]) -> Option<Vec<ImageRef>> {
    if let [single] = args {
        let dir = Path::new(single);
        if dir.is_dir() {
            let mut paths: Vec<_> = match std::fs::read_dir(dir) {
                Ok(entries) => entries
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|p| p.is_file() && has_image_extension(p))
                    .collect(),
                Err(e) => {
                    log::warn!("Failed to read image directory {}: {e}", dir.display());
                    return None;
                }
            };
            if paths.is_empty() {
                log::warn!("No images found in {}. Using configured images.", dir.display());
                return None;
            }
            paths.sort();
            return Some(paths.iter().map(|p| image_ref_for(p)).collect());
        }
    }

    if args.is_empty() {
        return None;
    }
    Some(args.iter().map(|a| image_ref_for(Path::new(a))).collect())
}

fn main() {
    env_logger::init();

    let mut config = GalleryConfig::load();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let saved_pool = images_from_args(&args).map(|images| {
        log::info!("showing {} images from the command line", images.len());
        SavedPool {
            images: std::mem::replace(&mut config.images, images),
            image_root: config.image_root.take(),
        }
    });

    let event_loop = EventLoop::new().expect("failed to create event loop");
    let mut app = App::new(config, saved_pool);
    event_loop.run_app(&mut app).expect("event loop error");
}
