use std::path::{Path, PathBuf};

/// Thumbnail path for a video: the video's stem with `.png` appended,
/// inside the output directory. Appending keeps dotted stems intact.
pub fn thumbnail_output_path(video_path: &Path, output_dir: &Path) -> PathBuf {
    let mut name = video_path.file_stem().unwrap_or_default().to_os_string();
    name.push(".png");
    output_dir.join(name)
}
