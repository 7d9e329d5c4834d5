//! Best-effort reads of what is inside an uploaded file.
//!
//! Nothing here fails an upload: a file that cannot be read just yields no
//! extra metadata.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use imagesize::ImageError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;
use zip::ZipArchive;

use crate::ZipEntry;

/// Files in a ZIP archive with their uncompressed sizes. Directories are left out.
pub fn zip_listing(path: &Path) -> Option<Vec<ZipEntry>> {
    let file = File::open(path).ok()?;
    let mut archive = match ZipArchive::new(BufReader::new(file)) {
        Ok(archive) => archive,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "not a readable zip");
            return None;
        }
    };

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let Ok(entry) = archive.by_index_raw(index) else {
            continue;
        };
        if entry.is_dir() {
            continue;
        }
        entries.push(ZipEntry {
            name: entry.name().to_string(),
            size: entry.size(),
        });
    }
    Some(entries)
}

/// Pixel width and height read from the image header.
pub fn image_dimensions(path: &Path) -> Option<(u32, u32)> {
    match imagesize::size(path) {
        Ok(size) => Some((u32::try_from(size.width).ok()?, u32::try_from(size.height).ok()?)),
        Err(ImageError::NotSupported) => None,
        Err(e) => {
            debug!(path = %path.display(), error = ?e, "unreadable image header");
            None
        }
    }
}

/// Length in seconds of the longest track the container declares.
pub fn media_duration(path: &Path) -> Option<f64> {
    let file = File::open(path).ok()?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = match symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    ) {
        Ok(probed) => probed,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable media container");
            return None;
        }
    };

    longest_track(probed.format.as_ref())
}

fn longest_track(format: &dyn FormatReader) -> Option<f64> {
    format
        .tracks()
        .iter()
        .filter_map(|track| {
            let params = &track.codec_params;
            let frames = params.n_frames?;
            match params.time_base {
                Some(base) => {
                    let time = base.calc_time(frames);
                    Some(time.seconds as f64 + time.frac)
                }
                None => params.sample_rate.map(|rate| frames as f64 / rate as f64),
            }
        })
        .fold(None, |longest: Option<f64>, secs| Some(longest.map_or(secs, |l| l.max(secs))))
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn lists_files_but_not_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bundle.zip");
        write_zip(
            &path,
            &[("docs/minutes.txt", b"hello".as_slice()), ("photo.jpg", [0u8; 300].as_slice())],
        );

        let entries = zip_listing(&path).unwrap();
        assert_eq!(
            entries,
            vec![
                ZipEntry { name: "docs/minutes.txt".into(), size: 5 },
                ZipEntry { name: "photo.jpg".into(), size: 300 },
            ]
        );
    }

    #[test]
    fn reads_png_dimensions() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("banner.png");
        write_png_header(&path, 640, 360);
        assert_eq!(image_dimensions(&path), Some((640, 360)));
    }

    #[test]
    fn reads_wav_duration() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("speech.wav");
        write_wav(&path, 2);
        let secs = media_duration(&path).unwrap();
        assert!((secs - 2.0).abs() < 1e-6, "got {secs}");
    }

    #[test]
    fn garbage_yields_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fake.mp4");
        std::fs::write(&path, b"not really a video").unwrap();
        assert_eq!(media_duration(&path), None);
        assert_eq!(image_dimensions(&path), None);
        assert_eq!(zip_listing(&path), None);
    }
}
